use crate::error::Error;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

fn rom_bank_count(code: u8) -> usize {
    match code {
        0..=8 => 2usize << code,
        _ => {
            log::warn!("unknown ROM size code 0x{:02X}, defaulting to 2 banks", code);
            2
        }
    }
}

fn ram_bank_count(code: u8) -> usize {
    match code {
        0 => 0,
        1 => 0,
        2 => 1,
        3 => 4,
        4 => 16,
        5 => 8,
        _ => {
            log::warn!("unknown RAM size code 0x{:02X}, defaulting to 0 banks", code);
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RtcRegister {
    Seconds,
    Minutes,
    Hours,
    DayLow,
    DayHigh,
}

/// Stubbed real-time clock: addressable and latchable so cartridge software
/// probing for its presence sees sane values, but it never advances.
#[derive(Debug, Clone)]
struct Rtc {
    latched: [u8; 5],
}

impl Rtc {
    fn new() -> Self {
        Rtc { latched: [0; 5] }
    }

    fn read(&self, reg: RtcRegister) -> u8 {
        self.latched[reg as usize]
    }

    fn write(&mut self, reg: RtcRegister, val: u8) {
        self.latched[reg as usize] = val;
    }

    fn latch(&mut self) {
        // Wall-clock time is a non-goal; latching is a no-op that keeps the
        // protocol shape without advancing anything.
    }
}

fn rtc_register_for_select(sel: u8) -> Option<RtcRegister> {
    match sel {
        0x08 => Some(RtcRegister::Seconds),
        0x09 => Some(RtcRegister::Minutes),
        0x0A => Some(RtcRegister::Hours),
        0x0B => Some(RtcRegister::DayLow),
        0x0C => Some(RtcRegister::DayHigh),
        _ => None,
    }
}

/// Tagged-variant MBC representation: a finite, known set of bank
/// controllers matched on each access rather than dispatched through a
/// trait object.
enum Mbc {
    RomOnly,
    Mbc1 {
        ram_enable: bool,
        rom_bank: u8,
        ram_bank: u8,
        mode: u8,
    },
    Mbc3 {
        ram_and_rtc_enable: bool,
        rom_bank: u8,
        ram_bank_or_rtc_select: u8,
        rtc: Rtc,
        rtc_latch_prev_write: Option<u8>,
    },
}

pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_banks: usize,
    ram_banks: usize,
    mbc: Mbc,
}

impl Cartridge {
    pub fn new(rom: Vec<u8>) -> Result<Self, Error> {
        if rom.len() < 0x150 {
            log::error!(
                "ROM image too small: expected at least 0x150 bytes, got {}",
                rom.len()
            );
            return Err(Error::InvalidRomImage {
                expected_min_len: 0x150,
                actual_len: rom.len(),
            });
        }

        let cart_type = rom[0x147];
        let rom_banks = rom_bank_count(rom[0x148]);
        let ram_banks = ram_bank_count(rom[0x149]);
        let ram = vec![0u8; ram_banks.max(1) * RAM_BANK_SIZE];

        let mbc = match cart_type {
            0x00 => Mbc::RomOnly,
            0x01..=0x03 => Mbc::Mbc1 {
                ram_enable: false,
                rom_bank: 1,
                ram_bank: 0,
                mode: 0,
            },
            0x0F..=0x13 => Mbc::Mbc3 {
                ram_and_rtc_enable: false,
                rom_bank: 1,
                ram_bank_or_rtc_select: 0,
                rtc: Rtc::new(),
                rtc_latch_prev_write: None,
            },
            other => {
                log::error!("unsupported cartridge type byte 0x{:02X}", other);
                return Err(Error::UnsupportedCartridgeType(other));
            }
        };

        Ok(Cartridge {
            rom,
            ram,
            rom_banks,
            ram_banks: ram_banks.max(1),
            mbc,
        })
    }

    pub fn title(&self) -> String {
        self.rom[0x134..=0x142]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect()
    }

    fn rom_read(&self, bank: usize, addr: u16) -> u8 {
        let offset = bank * ROM_BANK_SIZE + (addr as usize & (ROM_BANK_SIZE - 1));
        self.rom.get(offset).copied().unwrap_or(0xFF)
    }

    pub fn read(&self, addr: u16) -> u8 {
        match &self.mbc {
            Mbc::RomOnly => match addr {
                0x0000..=0x7FFF => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
                0xA000..=0xBFFF => self
                    .ram
                    .get((addr - 0xA000) as usize)
                    .copied()
                    .unwrap_or(0xFF),
                _ => 0xFF,
            },
            Mbc::Mbc1 {
                ram_enable,
                rom_bank,
                ram_bank,
                mode,
            } => match addr {
                0x0000..=0x3FFF => {
                    let bank = if *mode == 1 {
                        (*ram_bank as usize) << 5
                    } else {
                        0
                    };
                    self.rom_read(bank % self.rom_banks, addr)
                }
                0x4000..=0x7FFF => {
                    let bank = ((*ram_bank as usize) << 5) | (*rom_bank as usize);
                    self.rom_read(bank % self.rom_banks, addr)
                }
                0xA000..=0xBFFF => {
                    if !*ram_enable {
                        return 0xFF;
                    }
                    let bank = if *mode == 1 { *ram_bank as usize } else { 0 };
                    let offset = (bank % self.ram_banks) * RAM_BANK_SIZE
                        + (addr - 0xA000) as usize;
                    self.ram.get(offset).copied().unwrap_or(0xFF)
                }
                _ => 0xFF,
            },
            Mbc::Mbc3 {
                ram_and_rtc_enable,
                rom_bank,
                ram_bank_or_rtc_select,
                rtc,
                ..
            } => match addr {
                0x0000..=0x3FFF => self.rom_read(0, addr),
                0x4000..=0x7FFF => self.rom_read((*rom_bank as usize) % self.rom_banks, addr),
                0xA000..=0xBFFF => {
                    if !*ram_and_rtc_enable {
                        return 0xFF;
                    }
                    if let Some(reg) = rtc_register_for_select(*ram_bank_or_rtc_select) {
                        rtc.read(reg)
                    } else {
                        let bank = (*ram_bank_or_rtc_select as usize) % self.ram_banks;
                        let offset = bank * RAM_BANK_SIZE + (addr - 0xA000) as usize;
                        self.ram.get(offset).copied().unwrap_or(0xFF)
                    }
                }
                _ => 0xFF,
            },
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        match &mut self.mbc {
            Mbc::RomOnly => {
                if let 0xA000..=0xBFFF = addr {
                    let idx = (addr - 0xA000) as usize;
                    if idx < self.ram.len() {
                        self.ram[idx] = val;
                    }
                }
            }
            Mbc::Mbc1 {
                ram_enable,
                rom_bank,
                ram_bank,
                mode,
            } => match addr {
                0x0000..=0x1FFF => *ram_enable = (val & 0x0F) == 0x0A,
                0x2000..=0x3FFF => {
                    let bank = val & 0x1F;
                    *rom_bank = if bank == 0 { 1 } else { bank };
                }
                0x4000..=0x5FFF => *ram_bank = val & 0x03,
                0x6000..=0x7FFF => *mode = val & 0x01,
                0xA000..=0xBFFF => {
                    if !*ram_enable {
                        log::warn!("write to cartridge RAM while disabled, ignored");
                        return;
                    }
                    let bank = if *mode == 1 { *ram_bank as usize } else { 0 };
                    let ram_banks = self.ram_banks;
                    let offset = (bank % ram_banks) * RAM_BANK_SIZE + (addr - 0xA000) as usize;
                    if let Some(slot) = self.ram.get_mut(offset) {
                        *slot = val;
                    }
                }
                _ => {}
            },
            Mbc::Mbc3 {
                ram_and_rtc_enable,
                rom_bank,
                ram_bank_or_rtc_select,
                rtc,
                rtc_latch_prev_write,
            } => match addr {
                0x0000..=0x1FFF => *ram_and_rtc_enable = (val & 0x0F) == 0x0A,
                0x2000..=0x3FFF => {
                    let bank = val & 0x7F;
                    *rom_bank = if bank == 0 { 1 } else { bank };
                }
                0x4000..=0x5FFF => *ram_bank_or_rtc_select = val,
                0x6000..=0x7FFF => {
                    if *rtc_latch_prev_write == Some(0x00) && val == 0x01 {
                        rtc.latch();
                    }
                    *rtc_latch_prev_write = Some(val);
                }
                0xA000..=0xBFFF => {
                    if !*ram_and_rtc_enable {
                        log::warn!("write to cartridge RAM/RTC while disabled, ignored");
                        return;
                    }
                    if let Some(reg) = rtc_register_for_select(*ram_bank_or_rtc_select) {
                        rtc.write(reg, val);
                    } else {
                        let bank = (*ram_bank_or_rtc_select as usize) % self.ram_banks;
                        let offset = bank * RAM_BANK_SIZE + (addr - 0xA000) as usize;
                        if let Some(slot) = self.ram.get_mut(offset) {
                            *slot = val;
                        }
                    }
                }
                _ => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rom(cart_type: u8, rom_size_code: u8, ram_size_code: u8, banks: usize) -> Vec<u8> {
        let mut rom = vec![0u8; banks * ROM_BANK_SIZE];
        rom[0x147] = cart_type;
        rom[0x148] = rom_size_code;
        rom[0x149] = ram_size_code;
        rom
    }

    #[test]
    fn rom_only_reads_directly() {
        let mut rom = make_rom(0x00, 0, 0, 2);
        rom[0x4000] = 0xAB;
        let cart = Cartridge::new(rom).unwrap();
        assert_eq!(cart.read(0x4000), 0xAB);
    }

    #[test]
    fn unsupported_type_is_fatal() {
        let rom = make_rom(0xFF, 0, 0, 2);
        let err = Cartridge::new(rom).unwrap_err();
        assert_eq!(err, Error::UnsupportedCartridgeType(0xFF));
    }

    #[test]
    fn too_small_image_is_fatal() {
        let err = Cartridge::new(vec![0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::InvalidRomImage { .. }));
    }

    #[test]
    fn mbc1_bank_zero_is_coerced_to_one() {
        let mut rom = make_rom(0x01, 1, 0, 4);
        rom[3 * ROM_BANK_SIZE] = 0xCD;
        let mut cart = Cartridge::new(rom).unwrap();
        cart.write(0x2000, 0x00);
        cart.write(0x2000, 0x03);
        assert_eq!(cart.read(0x4000), 0xCD);
    }

    #[test]
    fn mbc1_ram_bank_register_masked_to_two_bits() {
        let rom = make_rom(0x03, 0, 3, 2);
        let mut cart = Cartridge::new(rom).unwrap();
        cart.write(0x0000, 0x0A);
        cart.write(0x6000, 0x01);
        cart.write(0x4000, 0xFF);
        if let Mbc::Mbc1 { ram_bank, .. } = cart.mbc {
            assert_eq!(ram_bank, 0x03);
        } else {
            panic!("expected mbc1");
        }
    }

    #[test]
    fn mbc1_ram_disabled_reads_ff() {
        let rom = make_rom(0x03, 0, 2, 2);
        let cart = Cartridge::new(rom).unwrap();
        assert_eq!(cart.read(0xA000), 0xFF);
    }

    #[test]
    fn mbc1_ram_round_trips_when_enabled() {
        let rom = make_rom(0x03, 0, 2, 2);
        let mut cart = Cartridge::new(rom).unwrap();
        cart.write(0x0000, 0x0A);
        cart.write(0xA010, 0x7E);
        assert_eq!(cart.read(0xA010), 0x7E);
    }

    #[test]
    fn mbc3_rom_bank_select_masks_seven_bits() {
        let mut rom = make_rom(0x12, 7, 3, 130);
        rom[127 * ROM_BANK_SIZE] = 0x42;
        let mut cart = Cartridge::new(rom).unwrap();
        cart.write(0x2000, 0xFF);
        assert_eq!(cart.read(0x4000), 0x42);
    }

    #[test]
    fn mbc3_rtc_register_is_addressable_and_stable() {
        let rom = make_rom(0x10, 0, 2, 2);
        let mut cart = Cartridge::new(rom).unwrap();
        cart.write(0x0000, 0x0A);
        cart.write(0x4000, 0x08);
        cart.write(0xA000, 0x33);
        assert_eq!(cart.read(0xA000), 0x33);
        cart.write(0x6000, 0x00);
        cart.write(0x6000, 0x01);
        assert_eq!(cart.read(0xA000), 0x33);
    }

    #[test]
    fn title_reads_null_terminated_ascii() {
        let mut rom = make_rom(0x00, 0, 0, 2);
        rom[0x134..0x134 + 5].copy_from_slice(b"TETRI");
        let cart = Cartridge::new(rom).unwrap();
        assert_eq!(cart.title(), "TETRI");
    }
}

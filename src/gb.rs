use crate::bus::{Bus, BOOT_ROM_SIZE};
use crate::cart::Cartridge;
use crate::cpu::Cpu;
use crate::error::Error;
use crate::joypad::JoypadButton;
use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// One full frame's worth of cycles at 4.194304 MHz / 59.7 Hz, and an exact
/// multiple of the PPU's 456-cycle scanline (70224 / 456 = 154 lines).
pub const CYCLES_PER_FRAME: u32 = 70224;

/// Emulator-wide options the original hardware doesn't expose as registers.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub enable_boot_rom: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enable_boot_rom: false,
        }
    }
}

/// Top-level console: owns the CPU and the bus (and, through it, every
/// peripheral) and drives the fetch/execute/interrupt loop frame by frame.
pub struct GameBoy {
    cpu: Cpu,
    bus: Bus,
}

impl GameBoy {
    pub fn new(rom: Vec<u8>, boot_rom: Option<[u8; BOOT_ROM_SIZE]>) -> Result<Self, Error> {
        Self::with_config(rom, boot_rom, Config::default())
    }

    pub fn with_config(
        rom: Vec<u8>,
        boot_rom: Option<[u8; BOOT_ROM_SIZE]>,
        config: Config,
    ) -> Result<Self, Error> {
        let cart = Cartridge::new(rom)?;
        let boot_rom = if config.enable_boot_rom { boot_rom } else { None };
        let mut bus = Bus::new(cart, boot_rom);
        let mut cpu = Cpu::new();

        if !bus.boot_rom_active() {
            // Skip straight to the documented post-boot CPU/PPU snapshot.
            cpu.registers_post_boot_reset();
            bus.ppu.post_boot_reset();
        }

        Ok(GameBoy { cpu, bus })
    }

    /// Runs instructions and peripheral ticks until one frame (70224 cycles)
    /// has elapsed, servicing at most one interrupt before each instruction.
    pub fn step_frame(&mut self) {
        let mut elapsed = 0u32;
        while elapsed < CYCLES_PER_FRAME {
            let service_cycles = self.cpu.service_pending_interrupt(&mut self.bus);
            let cycles = if service_cycles > 0 {
                self.bus.advance(service_cycles);
                service_cycles
            } else {
                let cycles = self.cpu.step(&mut self.bus);
                self.bus.advance(cycles);
                cycles
            };
            elapsed += cycles;
        }
    }

    pub fn framebuffer(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3] {
        &self.bus.ppu.framebuffer
    }

    pub fn press(&mut self, button: JoypadButton) {
        self.bus.joypad.press(button);
    }

    pub fn release(&mut self, button: JoypadButton) {
        self.bus.joypad.release(button);
    }

    pub fn cartridge_title(&self) -> String {
        self.bus.cart_title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x147] = 0x00;
        rom[0x148] = 0x00;
        rom[0x149] = 0x00;
        rom
    }

    #[test]
    fn new_without_boot_rom_applies_post_boot_snapshot() {
        let gb = GameBoy::new(test_rom(), None).unwrap();
        assert_eq!(gb.cpu.registers.read_r16(crate::cpu::Reg16::PC), 0x0100);
    }

    #[test]
    fn step_frame_advances_exactly_one_frame_of_cycles() {
        let mut gb = GameBoy::new(test_rom(), None).unwrap();
        let before = gb.cpu.cycles;
        gb.step_frame();
        assert!(gb.cpu.cycles - before >= CYCLES_PER_FRAME as u64);
    }

    #[test]
    fn press_and_release_do_not_panic_across_a_frame() {
        let mut gb = GameBoy::new(test_rom(), None).unwrap();
        gb.press(JoypadButton::Start);
        gb.step_frame();
        gb.release(JoypadButton::Start);
    }
}

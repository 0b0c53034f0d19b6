//! Cycle-based DMG emulation core: SM83 CPU, memory bus, scanline PPU,
//! timer, interrupts, joypad and cartridge/MBC support. No windowing or
//! audio output lives here; callers drive [`GameBoy::step_frame`] and read
//! back the framebuffer each frame.

pub mod bus;
pub mod cart;
pub mod cpu;
pub mod error;
pub mod gb;
pub mod interrupts;
pub mod joypad;
pub mod ppu;
pub mod serial;
pub mod timer;

pub use bus::Bus;
pub use cart::Cartridge;
pub use cpu::Cpu;
pub use error::Error;
pub use gb::{Config, GameBoy, CYCLES_PER_FRAME};
pub use joypad::JoypadButton;

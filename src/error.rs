use std::fmt;

/// Conditions that stop emulation before it can start. Everything else
/// (unmapped bus access, illegal opcodes, a missing/malformed boot ROM)
/// is recoverable and handled in place, logged through the `log` facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnsupportedCartridgeType(u8),
    InvalidRomImage {
        expected_min_len: usize,
        actual_len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedCartridgeType(id) => {
                write!(f, "unsupported cartridge type byte 0x{:02X}", id)
            }
            Error::InvalidRomImage {
                expected_min_len,
                actual_len,
            } => write!(
                f,
                "ROM image too small: expected at least {} bytes, got {}",
                expected_min_len, actual_len
            ),
        }
    }
}

impl std::error::Error for Error {}

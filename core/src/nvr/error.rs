use std::fmt;
use std::io;

/// Errors surfaced by NVR operations.
///
/// Validation errors are raised before any hardware access, so a failed
/// operation never leaves a partial write behind. Persistence errors carry
/// the underlying cause and are fatal to the current operation; nothing in
/// this crate retries.
#[derive(Debug)]
pub enum NvrError {
    /// Underlying I/O error (file not found, permission denied, etc.)
    Io(io::Error),

    /// Image file is not a 64-byte NVR image (or a 128-byte double-size
    /// CMOS image, accepted for backward compatibility).
    ImageSize { actual: u64 },

    /// A user-supplied string did not parse (time, date, number, ...).
    Format {
        what: &'static str,
        expected: &'static str,
    },

    /// A field value is outside its valid range.
    Range {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A fill range is inverted or extends past the store.
    FillRange { start: u8, end: u8 },
}

impl fmt::Display for NvrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ImageSize { actual } => {
                write!(f, "image is {actual} bytes, expected 64 or 128")
            }
            Self::Format { what, expected } => {
                write!(f, "bad {what}: expected {expected}")
            }
            Self::Range {
                what,
                value,
                min,
                max,
            } => write!(f, "{what} {value} out of range ({min}-{max})"),
            Self::FillRange { start, end } => {
                write!(f, "bad fill range 0x{start:02X}-0x{end:02X} (store is 0x00-0x3F)")
            }
        }
    }
}

impl std::error::Error for NvrError {}

impl From<io::Error> for NvrError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Validate that `value` lies in `min..=max`, naming the field on failure.
pub fn check_range(what: &'static str, value: i64, min: i64, max: i64) -> Result<(), NvrError> {
    if value < min || value > max {
        return Err(NvrError::Range {
            what,
            value,
            min,
            max,
        });
    }
    Ok(())
}

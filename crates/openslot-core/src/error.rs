//! Core error types.
//!
//! The slot engine does no I/O, so its error surface is narrow: invalid
//! configuration is rejected at construction time, never tolerated inside
//! the window generator or scanner.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by the core slot engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Working hours do not describe a forward window.
    #[error("invalid working hours: end hour {end_hour} must be after start hour {start_hour}")]
    InvalidWorkingHours {
        /// Configured start of the working day.
        start_hour: u32,
        /// Configured end of the working day.
        end_hour: u32,
    },

    /// An hour value outside `0..=23`.
    #[error("hour out of range: {0} (expected 0..=23)")]
    HourOutOfRange(u32),

    /// A timezone name not present in the IANA database.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = CoreError::InvalidWorkingHours {
            start_hour: 17,
            end_hour: 9,
        };
        assert_eq!(
            err.to_string(),
            "invalid working hours: end hour 9 must be after start hour 17"
        );

        assert_eq!(
            CoreError::HourOutOfRange(24).to_string(),
            "hour out of range: 24 (expected 0..=23)"
        );

        assert_eq!(
            CoreError::UnknownTimezone("Mars/Olympus".into()).to_string(),
            "unknown timezone: Mars/Olympus"
        );
    }
}

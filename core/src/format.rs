//! Timestamp formatting shared by every projection.
//!
//! The list and the detail screen must render the same raw timestamp the
//! same way, so both go through one [`TimestampFormat`].

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use thiserror::Error;

/// Default `strftime` pattern: `04/03/2025 09:30`.
pub const DEFAULT_PATTERN: &str = "%d/%m/%Y %H:%M";

/// Error building a [`TimestampFormat`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidFormat {
    /// The pattern contains an unknown `strftime` specifier.
    #[error("Invalid timestamp pattern: {0}")]
    Pattern(String),

    /// The UTC offset is out of range.
    #[error("Invalid UTC offset: {0} minutes")]
    Offset(i32),
}

/// Formatting rule for ticket timestamps.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use helpdesk_core::format::TimestampFormat;
///
/// let format = TimestampFormat::new("%d/%m/%Y %H:%M", -180).unwrap();
/// let ts = Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap();
/// assert_eq!(format.format(ts), "04/03/2025 09:00");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampFormat {
    pattern: String,
    offset: FixedOffset,
}

impl TimestampFormat {
    /// Create a format from a `strftime` pattern and a UTC offset in minutes.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFormat`] if the pattern has an unknown specifier or
    /// the offset is outside ±24h.
    pub fn new(pattern: impl Into<String>, utc_offset_minutes: i32) -> Result<Self, InvalidFormat> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(InvalidFormat::Pattern(pattern));
        }
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(InvalidFormat::Offset(utc_offset_minutes))?;
        Ok(Self { pattern, offset })
    }

    /// Render a timestamp.
    #[must_use]
    pub fn format(&self, timestamp: DateTime<Utc>) -> String {
        timestamp
            .with_timezone(&self.offset)
            .format(&self.pattern)
            .to_string()
    }

    /// The `strftime` pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            offset: Utc.fix(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn default_format_renders_day_first() {
        let ts = chrono::Utc.with_ymd_and_hms(2025, 3, 4, 9, 30, 0).unwrap();
        assert_eq!(TimestampFormat::default().format(ts), "04/03/2025 09:30");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(matches!(
            TimestampFormat::new("%Q", 0),
            Err(InvalidFormat::Pattern(_))
        ));
    }

    #[test]
    fn invalid_offset_is_rejected() {
        assert_eq!(
            TimestampFormat::new(DEFAULT_PATTERN, 24 * 60),
            Err(InvalidFormat::Offset(24 * 60))
        );
    }

    proptest! {
        #[test]
        fn zero_offset_matches_utc_rendering(secs in 0i64..4_000_000_000) {
            let ts = chrono::Utc.timestamp_opt(secs, 0).unwrap();
            prop_assert_eq!(
                TimestampFormat::default().format(ts),
                ts.format(DEFAULT_PATTERN).to_string()
            );
        }
    }
}

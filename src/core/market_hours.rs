//! Trading-hours clock
//!
//! Pure predicate over a configured weekday trading window in a fixed
//! reference offset. The scheduler consults it every tick to pick the
//! polling interval; nothing here holds state or touches the system clock,
//! so tests inject whatever instant they need.

use crate::infrastructure::config::MarketConfig;
use time::macros::format_description;
use time::{OffsetDateTime, Time, UtcOffset, Weekday};

/// Market open/close window, Monday through Friday
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    open: Time,
    close: Time,
    offset: UtcOffset,
}

impl MarketHours {
    /// Build a trading window. `open` must precede `close`.
    pub fn new(open: Time, close: Time, offset: UtcOffset) -> Result<Self, MarketHoursError> {
        if open >= close {
            return Err(MarketHoursError::InvalidWindow);
        }
        Ok(Self {
            open,
            close,
            offset,
        })
    }

    /// Build from configuration ("HH:MM" strings plus a whole-hour offset).
    pub fn from_config(config: &MarketConfig) -> Result<Self, MarketHoursError> {
        let open = parse_hhmm(&config.open)?;
        let close = parse_hhmm(&config.close)?;
        let offset = UtcOffset::from_hms(config.utc_offset_hours, 0, 0)
            .map_err(|_| MarketHoursError::InvalidOffset(config.utc_offset_hours))?;
        Self::new(open, close, offset)
    }

    /// Is the market open at the given instant?
    ///
    /// Open on Monday through Friday within `[open, close)` of the
    /// reference offset; the close minute itself is already closed.
    pub fn is_open_at(&self, at: OffsetDateTime) -> bool {
        let local = at.to_offset(self.offset);
        if matches!(local.weekday(), Weekday::Saturday | Weekday::Sunday) {
            return false;
        }
        let time = local.time();
        time >= self.open && time < self.close
    }
}

fn parse_hhmm(raw: &str) -> Result<Time, MarketHoursError> {
    let format = format_description!("[hour]:[minute]");
    Time::parse(raw, &format).map_err(|_| MarketHoursError::InvalidTime(raw.to_string()))
}

/// Trading-window configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketHoursError {
    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("market open must precede close")]
    InvalidWindow,

    #[error("invalid UTC offset {0} hours")]
    InvalidOffset(i8),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    /// 09:30-16:00 at UTC-5 (US equities regular session)
    fn us_hours() -> MarketHours {
        MarketHours::from_config(&MarketConfig {
            open: "09:30".to_string(),
            close: "16:00".to_string(),
            utc_offset_hours: -5,
        })
        .unwrap()
    }

    #[test]
    fn test_open_midday_weekday() {
        // Friday 2024-01-05, 10:00 local
        assert!(us_hours().is_open_at(datetime!(2024-01-05 15:00 UTC)));
    }

    #[test]
    fn test_closed_evening_weekday() {
        // Friday 2024-01-05, 17:00 local
        assert!(!us_hours().is_open_at(datetime!(2024-01-05 22:00 UTC)));
    }

    #[test]
    fn test_closed_before_open() {
        // Friday 2024-01-05, 08:00 local
        assert!(!us_hours().is_open_at(datetime!(2024-01-05 13:00 UTC)));
    }

    #[test]
    fn test_closed_on_weekend() {
        // Saturday 2024-01-06 and Sunday 2024-01-07, midday local
        assert!(!us_hours().is_open_at(datetime!(2024-01-06 17:00 UTC)));
        assert!(!us_hours().is_open_at(datetime!(2024-01-07 17:00 UTC)));
    }

    #[test]
    fn test_open_edge_inclusive() {
        // Friday, exactly 09:30 local
        assert!(us_hours().is_open_at(datetime!(2024-01-05 14:30 UTC)));
    }

    #[test]
    fn test_close_edge_exclusive() {
        // Friday, exactly 16:00 local
        assert!(!us_hours().is_open_at(datetime!(2024-01-05 21:00 UTC)));
    }

    #[test]
    fn test_weekday_follows_reference_offset() {
        // Saturday 00:30 UTC is still Friday 19:30 at UTC-5: a weekday,
        // but after close
        assert!(!us_hours().is_open_at(datetime!(2024-01-06 00:30 UTC)));
        // Monday 14:00 UTC-5 reached from Monday 19:00 UTC
        assert!(us_hours().is_open_at(datetime!(2024-01-08 19:00 UTC)));
    }

    #[test]
    fn test_rejects_inverted_window() {
        let result = MarketHours::from_config(&MarketConfig {
            open: "16:00".to_string(),
            close: "09:30".to_string(),
            utc_offset_hours: -5,
        });
        assert_eq!(result, Err(MarketHoursError::InvalidWindow));
    }

    #[test]
    fn test_rejects_malformed_time() {
        let result = MarketHours::from_config(&MarketConfig {
            open: "930".to_string(),
            close: "16:00".to_string(),
            utc_offset_hours: -5,
        });
        assert!(matches!(result, Err(MarketHoursError::InvalidTime(_))));
    }
}

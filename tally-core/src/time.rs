//! Settlement-day anchoring: every activity date is pinned to market close
//! in the exchange's local zone.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Converts bare calendar dates into market-close instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementClock {
    tz: Tz,
    close: NaiveTime,
}

impl Default for SettlementClock {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::New_York,
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl SettlementClock {
    /// Build a clock from an IANA zone like "America/New_York" and a
    /// close time like "16:00".
    pub fn new(tz: &str, close: &str) -> Result<Self> {
        let tz: Tz = tz
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
        let close = NaiveTime::parse_from_str(close, "%H:%M")
            .map_err(|e| anyhow::anyhow!("invalid market close '{close}': {e}"))?;
        Ok(Self { tz, close })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    /// Pin `date` to market close. Returns `None` only when the close time
    /// falls in a DST gap or overlap for that day.
    pub fn anchor(&self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        self.tz
            .from_local_datetime(&date.and_time(self.close))
            .single()
            .map(|dt| dt.fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_anchor_is_new_york_close() {
        let clock = SettlementClock::default();
        // June is EDT (UTC-4)
        let dt = clock.anchor(NaiveDate::from_ymd_opt(2022, 6, 2).unwrap()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2022-06-02T16:00:00-04:00");
    }

    #[test]
    fn test_winter_anchor_uses_standard_time() {
        let clock = SettlementClock::default();
        let dt = clock.anchor(NaiveDate::from_ymd_opt(2022, 1, 14).unwrap()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2022-01-14T16:00:00-05:00");
    }

    #[test]
    fn test_custom_zone_and_close() {
        let clock = SettlementClock::new("America/Chicago", "15:00").unwrap();
        let dt = clock.anchor(NaiveDate::from_ymd_opt(2026, 2, 20).unwrap()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-02-20T15:00:00-06:00");
    }

    #[test]
    fn test_rejects_bad_zone_and_close() {
        assert!(SettlementClock::new("Mars/Olympus", "16:00").is_err());
        assert!(SettlementClock::new("America/New_York", "4pm").is_err());
    }

    #[test]
    fn test_dst_gap_has_no_anchor() {
        // 02:30 does not exist in New York on the spring-forward day
        let clock = SettlementClock::new("America/New_York", "02:30").unwrap();
        assert!(clock.anchor(NaiveDate::from_ymd_opt(2022, 3, 13).unwrap()).is_none());
    }
}

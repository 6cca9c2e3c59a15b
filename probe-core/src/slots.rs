use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};

/// Calendar day whose 24 hours make up the selectable slots.
const REFERENCE_YMD: (i32, u32, u32) = (2025, 1, 1);

/// Number of selectable slots: one per hour of the reference day.
pub const SLOT_COUNT: usize = 24;

/// One of the 24 selectable hourly timestamps, UTC.
///
/// The textual form is `YYYY-MM-DDTHH:MM:SSZ`: stable, lexicographically
/// sortable, and round-trippable through `Display`/`FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(DateTime<Utc>);

impl TimeSlot {
    /// Slot for hour `h` of the reference day; `None` unless `h < 24`.
    pub fn from_hour(h: u32) -> Option<Self> {
        if h as usize >= SLOT_COUNT {
            return None;
        }
        Some(Self(reference_midnight() + Duration::hours(i64::from(h))))
    }

    /// Hour of day this slot stands for, `0..24`.
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

impl FromStr for TimeSlot {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

/// All selectable slots, chronological. Deterministic and side-effect
/// free; the catalog never changes for the life of the process.
pub fn all_slots() -> Vec<TimeSlot> {
    (0..SLOT_COUNT as u32)
        .map(|h| TimeSlot::from_hour(h).expect("hour below 24"))
        .collect()
}

/// The earliest selectable slot (midnight of the reference day).
pub fn default_slot() -> TimeSlot {
    TimeSlot::from_hour(0).expect("hour below 24")
}

fn reference_midnight() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(REFERENCE_YMD.0, REFERENCE_YMD.1, REFERENCE_YMD.2, 0, 0, 0)
        .single()
        .expect("reference day is a valid calendar date")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_24_hourly_slots_in_order() {
        let slots = all_slots();
        assert_eq!(slots.len(), 24);

        for (h, pair) in slots.windows(2).enumerate() {
            assert!(pair[0] < pair[1], "slots out of order at hour {h}");
            assert_eq!(pair[1].timestamp() - pair[0].timestamp(), Duration::hours(1));
        }
    }

    #[test]
    fn default_slot_is_first() {
        assert_eq!(default_slot(), all_slots()[0]);
        assert_eq!(default_slot().hour(), 0);
    }

    #[test]
    fn from_hour_rejects_out_of_range() {
        assert!(TimeSlot::from_hour(23).is_some());
        assert!(TimeSlot::from_hour(24).is_none());
    }

    #[test]
    fn textual_form_round_trips_and_sorts() {
        for slot in all_slots() {
            let text = slot.to_string();
            let parsed: TimeSlot = text.parse().expect("round trip should succeed");
            assert_eq!(slot, parsed);
        }

        let mut texts: Vec<String> = all_slots().iter().map(TimeSlot::to_string).collect();
        let chronological = texts.clone();
        texts.sort();
        assert_eq!(texts, chronological);
    }

    #[test]
    fn display_format_is_stable() {
        let slot = TimeSlot::from_hour(5).expect("valid hour");
        assert_eq!(slot.to_string(), "2025-01-01T05:00:00Z");
    }
}

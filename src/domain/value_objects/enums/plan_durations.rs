use std::fmt::Display;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Calendar rule used to push a subscription's expiry forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanDuration {
    Monthly,
    Yearly,
}

impl PlanDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanDuration::Monthly => "monthly",
            PlanDuration::Yearly => "yearly",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(PlanDuration::Monthly),
            "yearly" => Some(PlanDuration::Yearly),
            _ => None,
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            PlanDuration::Monthly => 1,
            PlanDuration::Yearly => 12,
        }
    }

    /// Calendar arithmetic: the day of month is kept and clamped to the last
    /// day of a shorter target month (Jan 31 -> Feb 28/29, Feb 29 -> Feb 28).
    /// `None` only when the result falls outside chrono's representable range.
    pub fn expiry_from(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        start.checked_add_months(Months::new(self.months()))
    }
}

impl Display for PlanDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn monthly_keeps_day_of_month_and_time() {
        assert_eq!(
            PlanDuration::Monthly.expiry_from(at(2025, 3, 15)),
            Some(at(2025, 4, 15))
        );
        assert_eq!(
            PlanDuration::Monthly.expiry_from(at(2025, 12, 5)),
            Some(at(2026, 1, 5))
        );
    }

    #[test]
    fn monthly_clamps_to_end_of_shorter_month() {
        assert_eq!(
            PlanDuration::Monthly.expiry_from(at(2025, 1, 31)),
            Some(at(2025, 2, 28))
        );
        assert_eq!(
            PlanDuration::Monthly.expiry_from(at(2024, 1, 31)),
            Some(at(2024, 2, 29))
        );
    }

    #[test]
    fn yearly_is_one_calendar_year() {
        assert_eq!(
            PlanDuration::Yearly.expiry_from(at(2025, 6, 1)),
            Some(at(2026, 6, 1))
        );
        assert_eq!(
            PlanDuration::Yearly.expiry_from(at(2024, 2, 29)),
            Some(at(2025, 2, 28))
        );
    }

    #[test]
    fn only_known_duration_classes_parse() {
        assert_eq!(PlanDuration::from_str("monthly"), Some(PlanDuration::Monthly));
        assert_eq!(PlanDuration::from_str("yearly"), Some(PlanDuration::Yearly));
        assert_eq!(PlanDuration::from_str("weekly"), None);
        assert_eq!(PlanDuration::from_str("Monthly"), None);
    }
}

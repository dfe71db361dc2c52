use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Cancelled,
    Expired,
    /// Reserved. No transition produces it, and every guarded mutation rejects it.
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Cancelled => "CANCELLED",
            SubscriptionStatus::Expired => "EXPIRED",
            SubscriptionStatus::Inactive => "INACTIVE",
        }
    }

    /// Unknown stored values read back as `Inactive`.
    pub fn from_str(value: &str) -> Self {
        match value {
            "ACTIVE" => SubscriptionStatus::Active,
            "CANCELLED" => SubscriptionStatus::Cancelled,
            "EXPIRED" => SubscriptionStatus::Expired,
            _ => SubscriptionStatus::Inactive,
        }
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_parse_back() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Cancelled,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Inactive,
        ] {
            assert_eq!(SubscriptionStatus::from_str(&status.to_string()), status);
        }
    }

    #[test]
    fn unknown_value_is_inactive() {
        assert_eq!(
            SubscriptionStatus::from_str("active"),
            SubscriptionStatus::Inactive
        );
        assert_eq!(SubscriptionStatus::from_str(""), SubscriptionStatus::Inactive);
    }

    #[test]
    fn serializes_uppercase() {
        let json = serde_json::to_string(&SubscriptionStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}

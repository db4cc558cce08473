use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::timestamp;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseKeyStatus {
    /// The license key is active and can be used.
    Active,
    /// The license key is inactive and cannot be used.
    Inactive,
    /// The license key has expired and can no longer be used.
    Expired,
    /// The license key has been disabled and cannot be used.
    Disabled,
}

impl LicenseKeyStatus {
    pub const ALL: [LicenseKeyStatus; 4] = [
        LicenseKeyStatus::Active,
        LicenseKeyStatus::Inactive,
        LicenseKeyStatus::Expired,
        LicenseKeyStatus::Disabled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LicenseKeyStatus::Active => "active",
            LicenseKeyStatus::Inactive => "inactive",
            LicenseKeyStatus::Expired => "expired",
            LicenseKeyStatus::Disabled => "disabled",
        }
    }
}

impl Display for LicenseKeyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "unknown license key status `{}`", self.0)
    }
}

impl StdError for UnknownStatus {}

impl FromStr for LicenseKeyStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LicenseKeyStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LicenseKey {
    pub id: u64,
    pub status: LicenseKeyStatus,
    /// The full license key string.
    pub key: String,
    /// The maximum number of instances this key can be activated on.
    pub activation_limit: u64,
    /// The number of instances this key is currently activated on.
    pub activation_usage: u64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// `None` when the license never expires.
    #[serde(with = "timestamp::option", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl LicenseKey {
    #[must_use]
    pub const fn remaining_activations(&self) -> u64 {
        self.activation_limit.saturating_sub(self.activation_usage)
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// An activated instance of a license key, e.g. one machine.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LicenseInstance {
    pub id: String,
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Store, order and customer details attached to a successful response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LicenseMeta {
    pub store_id: u64,
    pub order_id: u64,
    pub order_item_id: u64,
    pub product_id: u64,
    pub product_name: String,
    pub variant_id: u64,
    pub variant_name: String,
    pub customer_id: u64,
    pub customer_name: String,
    pub customer_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn license_key_json(status: &str, expires_at: serde_json::Value) -> serde_json::Value {
        json!({
            "id": 1,
            "status": status,
            "key": "test-key",
            "activation_limit": 3,
            "activation_usage": 1,
            "created_at": "2021-04-06T14:15:07.000000Z",
            "expires_at": expires_at,
        })
    }

    #[test]
    fn status_test() {
        for status in LicenseKeyStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.as_str().parse::<LicenseKeyStatus>(), Ok(status));
        }
        assert_eq!(
            "Active".parse::<LicenseKeyStatus>(),
            Err(UnknownStatus("Active".into()))
        );
        assert!(serde_json::from_str::<LicenseKeyStatus>("\"unknown_value\"").is_err());
    }

    #[test]
    fn license_key_test() {
        let key: LicenseKey =
            serde_json::from_value(license_key_json("active", serde_json::Value::Null)).unwrap();
        let created_at = Utc.with_ymd_and_hms(2021, 4, 6, 14, 15, 7).unwrap();

        assert_eq!(key.id, 1);
        assert_eq!(key.status, LicenseKeyStatus::Active);
        assert_eq!(key.key, "test-key");
        assert_eq!(key.created_at, created_at);
        assert_eq!(key.expires_at, None);
        assert_eq!(key.remaining_activations(), 2);
        assert!(!key.is_expired_at(created_at));
    }

    #[test]
    fn expires_at_matches_created_at() {
        let key: LicenseKey =
            serde_json::from_value(license_key_json("expired", json!("2021-04-06T14:15:07.000000Z")))
                .unwrap();
        assert_eq!(key.expires_at, Some(key.created_at));
        assert!(key.is_expired_at(key.created_at));
    }

    #[test]
    fn missing_expires_at_is_no_expiry() {
        let mut value = license_key_json("active", serde_json::Value::Null);
        value.as_object_mut().unwrap().remove("expires_at");
        let key: LicenseKey = serde_json::from_value(value).unwrap();
        assert_eq!(key.expires_at, None);
    }

    #[test]
    fn rejects_bad_fields() {
        assert!(serde_json::from_value::<LicenseKey>(license_key_json(
            "unknown_value",
            serde_json::Value::Null
        ))
        .is_err());
        assert!(serde_json::from_value::<LicenseKey>(license_key_json(
            "active",
            json!("2021-04-06T14:15:07Z")
        ))
        .is_err());

        let mut value = license_key_json("active", serde_json::Value::Null);
        value.as_object_mut().unwrap().remove("key");
        assert!(serde_json::from_value::<LicenseKey>(value).is_err());
    }

    #[test]
    fn usage_over_limit_saturates() {
        let mut key: LicenseKey =
            serde_json::from_value(license_key_json("active", serde_json::Value::Null)).unwrap();
        key.activation_usage = 5;
        assert_eq!(key.remaining_activations(), 0);
    }

    #[test]
    fn serializes_wire_format() {
        let value = license_key_json("disabled", json!("2022-01-01T00:00:00.250000Z"));
        let key: LicenseKey = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&key).unwrap(), value);
    }
}

//! Conversion between the note store's 2001 epoch and the Unix epoch.
//!
//! The store keeps timestamps as seconds since 2001-01-01T00:00:00Z
//! (Core Data reference date), usually as a REAL with a fractional part.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Seconds between 1970-01-01T00:00:00Z and 2001-01-01T00:00:00Z.
pub const STORE_EPOCH_OFFSET: i64 = 978_307_200;

/// Converts whole store-epoch seconds to Unix seconds.
#[must_use]
pub const fn store_to_unix_seconds(store_secs: i64) -> i64 {
    store_secs + STORE_EPOCH_OFFSET
}

/// A timestamp as stored in the note store (seconds since 2001-01-01 UTC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StoreTimestamp(pub f64);

impl StoreTimestamp {
    /// The same instant as a UTC datetime, keeping sub-second precision.
    ///
    /// Returns `None` for non-finite values or instants chrono cannot represent.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if !self.0.is_finite() {
            return None;
        }

        let whole = self.0.floor();
        #[allow(clippy::cast_possible_truncation)]
        let secs = whole as i64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = (((self.0 - whole) * 1e9).round() as u32).min(999_999_999);

        secs.checked_add(STORE_EPOCH_OFFSET)?;
        DateTime::from_timestamp(store_to_unix_seconds(secs), nanos)
    }

    /// The same instant as a `SystemTime`, suitable for file timestamps.
    #[must_use]
    pub fn to_system_time(self) -> Option<SystemTime> {
        self.to_datetime().map(SystemTime::from)
    }
}

impl From<i64> for StoreTimestamp {
    #[allow(clippy::cast_precision_loss)]
    fn from(secs: i64) -> Self {
        Self(secs as f64)
    }
}

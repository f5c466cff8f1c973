//! Transaction deadlines.
//!
//! On the wire a deadline is the number of milliseconds since the network's
//! epoch adjustment (the nemesis block timestamp, in Unix seconds). The
//! conversion to wall-clock time therefore always needs that adjustment.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DeadlinePolicy;
use crate::error::{Error, Result};
use crate::model::uint64::UInt64;

/// Time unit for relative deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeadlineUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl DeadlineUnit {
    fn millis(self, amount: i64) -> Option<i64> {
        let factor: i64 = match self {
            Self::Millis => 1,
            Self::Seconds => 1_000,
            Self::Minutes => 60_000,
            Self::Hours => 3_600_000,
            Self::Days => 86_400_000,
        };
        amount.checked_mul(factor)
    }
}

/// Expiry instant of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deadline(UInt64);

impl Deadline {
    /// `now + amount * unit` under the default policy (at most 24 hours).
    pub fn create(epoch_adjustment: i64, amount: i64, unit: DeadlineUnit) -> Result<Self> {
        Self::create_with_policy(epoch_adjustment, amount, unit, &DeadlinePolicy::default())
    }

    pub fn create_with_policy(
        epoch_adjustment: i64,
        amount: i64,
        unit: DeadlineUnit,
        policy: &DeadlinePolicy,
    ) -> Result<Self> {
        Self::create_at(Utc::now(), epoch_adjustment, amount, unit, policy)
    }

    /// Same as [`Deadline::create_with_policy`] with an explicit "now".
    pub fn create_at(
        now: DateTime<Utc>,
        epoch_adjustment: i64,
        amount: i64,
        unit: DeadlineUnit,
        policy: &DeadlinePolicy,
    ) -> Result<Self> {
        if amount <= 0 {
            return Err(Error::invalid_argument(format!(
                "deadline amount must be positive, got {}",
                amount
            )));
        }
        let window = unit
            .millis(amount)
            .ok_or_else(|| Error::invalid_argument("deadline window overflows"))?;
        if window <= policy.min_window_ms || window > policy.max_window_ms {
            return Err(Error::invalid_argument(format!(
                "deadline window of {} ms must be greater than {} ms and at most {} ms",
                window, policy.min_window_ms, policy.max_window_ms
            )));
        }

        let expiry = now
            .timestamp_millis()
            .checked_add(window)
            .ok_or_else(|| Error::invalid_argument("deadline overflows"))?;
        let adjusted = epoch_adjustment
            .checked_mul(1_000)
            .and_then(|epoch_ms| expiry.checked_sub(epoch_ms))
            .ok_or_else(|| {
                Error::invalid_argument(format!("epoch adjustment {} is out of range", epoch_adjustment))
            })?;
        if adjusted < 0 {
            return Err(Error::invalid_argument(format!(
                "deadline {} is before the network epoch",
                expiry
            )));
        }
        Ok(Self(UInt64::new(adjusted as u64)))
    }

    /// Wraps a wire value as-is.
    pub fn from_adjusted(value: impl Into<UInt64>) -> Self {
        Self(value.into())
    }

    /// Parses a deadline as carried by node DTOs: a decimal string, a JSON
    /// number or a `[lower, higher]` word pair.
    pub fn create_from_dto(value: &serde_json::Value) -> Result<Self> {
        UInt64::deserialize(value)
            .map(Self)
            .map_err(|e| Error::invalid_argument(format!("deadline: {}", e)))
    }

    /// Milliseconds since the epoch adjustment.
    pub fn adjusted_value(self) -> UInt64 {
        self.0
    }

    /// Wall-clock instant of this deadline.
    pub fn to_local_date_time(self, epoch_adjustment: i64) -> Result<DateTime<Utc>> {
        let millis = i64::try_from(self.0.value())
            .ok()
            .and_then(|v| v.checked_add(epoch_adjustment.checked_mul(1_000)?))
            .ok_or_else(|| Error::invalid_argument("deadline is out of range"))?;
        DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| Error::invalid_argument("deadline is out of range"))
    }

    /// `true` once `now` is past the deadline.
    pub fn is_expired(self, now: DateTime<Utc>, epoch_adjustment: i64) -> bool {
        match self.to_local_date_time(epoch_adjustment) {
            Ok(at) => now > at,
            Err(_) => false,
        }
    }

    /// Time left until the deadline; negative once expired.
    pub fn remaining(self, now: DateTime<Utc>, epoch_adjustment: i64) -> Result<Duration> {
        Ok(self.to_local_date_time(epoch_adjustment)? - now)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TESTNET_EPOCH_ADJUSTMENT;
    use crate::error::ErrorKind;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn relative_deadline_is_adjusted() {
        let d = Deadline::create_at(
            now(),
            TESTNET_EPOCH_ADJUSTMENT,
            2,
            DeadlineUnit::Hours,
            &DeadlinePolicy::default(),
        )
        .unwrap();
        let expected = (1_700_000_000 - TESTNET_EPOCH_ADJUSTMENT) * 1_000 + 2 * 3_600_000;
        assert_eq!(d.adjusted_value().value(), expected as u64);
        assert_eq!(
            d.to_local_date_time(TESTNET_EPOCH_ADJUSTMENT).unwrap(),
            now() + Duration::hours(2)
        );
    }

    #[test]
    fn non_positive_amount_rejected() {
        for amount in [0, -1] {
            let err = Deadline::create(TESTNET_EPOCH_ADJUSTMENT, amount, DeadlineUnit::Hours)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn window_above_ceiling_rejected() {
        let err = Deadline::create(TESTNET_EPOCH_ADJUSTMENT, 2, DeadlineUnit::Days).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(Deadline::create(TESTNET_EPOCH_ADJUSTMENT, 1, DeadlineUnit::Days).is_ok());
        assert!(Deadline::create(TESTNET_EPOCH_ADJUSTMENT, 25, DeadlineUnit::Hours).is_err());
    }

    #[test]
    fn custom_policy_floor() {
        let policy = DeadlinePolicy {
            min_window_ms: 60_000,
            max_window_ms: 3_600_000,
        };
        let at = |amount, unit| Deadline::create_at(now(), 0, amount, unit, &policy);
        assert!(at(1, DeadlineUnit::Minutes).is_err());
        assert!(at(2, DeadlineUnit::Minutes).is_ok());
        assert!(at(2, DeadlineUnit::Hours).is_err());
    }

    #[test]
    fn extreme_epoch_adjustment_rejected() {
        let policy = DeadlinePolicy::default();
        for epoch in [i64::MAX, i64::MIN, i64::MAX / 1_000 + 1] {
            let err = Deadline::create_at(now(), epoch, 2, DeadlineUnit::Hours, &policy).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn window_past_end_of_time_rejected() {
        let policy = DeadlinePolicy {
            min_window_ms: 0,
            max_window_ms: i64::MAX,
        };
        let err = Deadline::create_at(now(), 0, i64::MAX, DeadlineUnit::Millis, &policy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn before_epoch_rejected() {
        let far_future_epoch = now().timestamp() + 100_000;
        let err = Deadline::create_at(
            now(),
            far_future_epoch,
            1,
            DeadlineUnit::Hours,
            &DeadlinePolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn dto_forms() {
        let from_str = Deadline::create_from_dto(&serde_json::json!("123456")).unwrap();
        let from_words = Deadline::create_from_dto(&serde_json::json!([123456, 0])).unwrap();
        let from_number = Deadline::create_from_dto(&serde_json::json!(123456)).unwrap();
        assert_eq!(from_str, Deadline::from_adjusted(123_456u64));
        assert_eq!(from_words, from_str);
        assert_eq!(from_number, from_str);
        assert!(Deadline::create_from_dto(&serde_json::json!("-5")).is_err());
    }

    #[test]
    fn expiry_checks() {
        let d = Deadline::create_at(now(), 0, 1, DeadlineUnit::Minutes, &DeadlinePolicy::default())
            .unwrap();
        assert!(!d.is_expired(now(), 0));
        assert!(d.is_expired(now() + Duration::minutes(2), 0));
        assert_eq!(d.remaining(now(), 0).unwrap(), Duration::minutes(1));
    }
}

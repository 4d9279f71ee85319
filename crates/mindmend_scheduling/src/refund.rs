// --- File: crates/mindmend_scheduling/src/refund.rs ---
//! Cancellation refund policy.
//!
//! The refund share depends only on how much notice the client gives. With
//! the default ladder:
//!
//! | notice before session | refund |
//! |-----------------------|--------|
//! | 48 h or more          | 80 %   |
//! | 24 h up to 48 h       | 50 %   |
//! | under 24 h            | 0 %    |
//!
//! The refunded amount is rounded to a whole major currency unit.

use crate::error::SchedulingError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use mindmend_config::RefundConfig;
use serde::{Deserialize, Serialize};

/// Minor currency units (paise, cents) per major unit.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundTier {
    pub min_hours_before: i64,
    pub percentage: u8,
}

/// Ordered refund ladder, most notice first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundPolicy {
    tiers: Vec<RefundTier>,
}

impl Default for RefundPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                RefundTier {
                    min_hours_before: 48,
                    percentage: 80,
                },
                RefundTier {
                    min_hours_before: 24,
                    percentage: 50,
                },
            ],
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundQuote {
    #[cfg_attr(feature = "openapi", schema(example = 80))]
    pub percentage: u8,
    #[cfg_attr(feature = "openapi", schema(example = 8000))]
    pub amount_minor_units: i64,
    #[cfg_attr(
        feature = "openapi",
        schema(example = "Cancelled 48 or more hours before the session: 80% refund")
    )]
    pub reason_text: String,
    /// Whole hours of notice; negative once the session has started.
    #[cfg_attr(feature = "openapi", schema(example = 49))]
    pub hours_before_session: i64,
}

impl RefundPolicy {
    /// Builds a policy from tiers in any order.
    ///
    /// Percentages must be at most 100 and must not grow as notice shrinks.
    pub fn new(mut tiers: Vec<RefundTier>) -> Result<Self, SchedulingError> {
        tiers.sort_by(|a, b| b.min_hours_before.cmp(&a.min_hours_before));

        if let Some(tier) = tiers.iter().find(|tier| tier.percentage > 100) {
            return Err(SchedulingError::InvalidPolicy(format!(
                "tier at {}h refunds {}%",
                tier.min_hours_before, tier.percentage
            )));
        }
        if let Some(tier) = tiers.iter().find(|tier| tier.min_hours_before < 0) {
            return Err(SchedulingError::InvalidPolicy(format!(
                "tier at {}h has negative notice",
                tier.min_hours_before
            )));
        }
        if let Some(pair) = tiers
            .windows(2)
            .find(|pair| pair[1].percentage > pair[0].percentage)
        {
            return Err(SchedulingError::InvalidPolicy(format!(
                "{}% at {}h exceeds {}% at {}h",
                pair[1].percentage,
                pair[1].min_hours_before,
                pair[0].percentage,
                pair[0].min_hours_before
            )));
        }

        Ok(Self { tiers })
    }

    /// Uses the configured tiers, or the default ladder when none are configured.
    pub fn from_config(config: &RefundConfig) -> Result<Self, SchedulingError> {
        if config.tiers.is_empty() {
            return Ok(Self::default());
        }
        Self::new(
            config
                .tiers
                .iter()
                .map(|tier| RefundTier {
                    min_hours_before: tier.min_hours_before,
                    percentage: tier.percentage,
                })
                .collect(),
        )
    }

    pub fn tiers(&self) -> &[RefundTier] {
        &self.tiers
    }

    fn tier_for(&self, notice: Duration) -> Option<&RefundTier> {
        if notice < Duration::zero() {
            return None;
        }
        self.tiers
            .iter()
            .find(|tier| notice >= Duration::hours(tier.min_hours_before))
    }

    /// Quotes the refund for cancelling a session at `scheduled_at` at time `now`.
    pub fn quote(
        &self,
        scheduled_at: DateTime<Utc>,
        now: DateTime<Utc>,
        original_amount_minor_units: i64,
    ) -> Result<RefundQuote, SchedulingError> {
        if original_amount_minor_units < 0 {
            return Err(SchedulingError::InvalidAmount(original_amount_minor_units));
        }

        let notice = scheduled_at - now;
        let tier = self.tier_for(notice);
        let percentage = tier.map_or(0, |tier| tier.percentage);

        let reason_text = match tier {
            Some(tier) if tier.percentage > 0 => format!(
                "Cancelled {} or more hours before the session: {}% refund",
                tier.min_hours_before, tier.percentage
            ),
            Some(tier) => format!(
                "Cancelled {} or more hours before the session: no refund",
                tier.min_hours_before
            ),
            None if notice < Duration::zero() => {
                "Session has already started: no refund".to_string()
            }
            None => match self.tiers.last() {
                Some(lowest) => format!(
                    "Cancelled less than {} hours before the session: no refund",
                    lowest.min_hours_before
                ),
                None => "No refund policy applies: no refund".to_string(),
            },
        };

        Ok(RefundQuote {
            percentage,
            amount_minor_units: refund_amount(original_amount_minor_units, percentage)?,
            reason_text,
            hours_before_session: notice.num_hours(),
        })
    }
}

/// Rounds `amount × percentage` to the nearest whole major unit, halves up.
fn refund_amount(amount_minor_units: i64, percentage: u8) -> Result<i64, SchedulingError> {
    let scaled = i128::from(amount_minor_units) * i128::from(percentage);
    let per_major = i128::from(MINOR_UNITS_PER_MAJOR) * 100;
    let major = (scaled + per_major / 2) / per_major;
    i64::try_from(major * i128::from(MINOR_UNITS_PER_MAJOR))
        .map_err(|_| SchedulingError::InvalidAmount(amount_minor_units))
}

/// Quotes a refund with the default 48h/24h ladder.
pub fn compute_refund(
    scheduled_at: DateTime<Utc>,
    now: DateTime<Utc>,
    original_amount_minor_units: i64,
) -> Result<RefundQuote, SchedulingError> {
    RefundPolicy::default().quote(scheduled_at, now, original_amount_minor_units)
}

/// Resolves an appointment's local date and time in `time_zone` to UTC.
///
/// Times falling into a DST gap are rejected; ambiguous times take the
/// earlier instant.
pub fn scheduled_at_in_zone(
    date: NaiveDate,
    time: NaiveTime,
    time_zone: Tz,
) -> Result<DateTime<Utc>, SchedulingError> {
    time_zone
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            SchedulingError::TimeParseError(format!(
                "{} {} does not exist in {}",
                date, time, time_zone
            ))
        })
}

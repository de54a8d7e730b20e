//! Sponsor lifecycle — derived state, window math, and slot capacity.
//!
//! Sponsorship is never stored as an explicit state column. It is computed
//! at read time from the listing's payment fields and wall-clock time, so
//! expiry needs no scheduled job: once `now` passes the priority window the
//! listing simply stops counting.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::{Listing, SubmissionPlan};

/// Length of a purchased sponsor window.
pub const SPONSOR_WINDOW_DAYS: i64 = 7;

/// Default number of concurrent sponsor slots.
pub const DEFAULT_MAX_SPONSOR_SLOTS: u32 = 3;

// ─── Derived state ───────────────────────────────────────────────────────────

/// Lifecycle position of a listing, computed at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SponsorState {
  /// No sponsorship in play.
  Free,
  /// An upgrade order exists but no capture has been received.
  PendingPayment { order_ref: String },
  /// Paid, inside the priority window.
  Active { until: DateTime<Utc> },
  /// Paid, window elapsed. Stored fields are untouched; this variant only
  /// ever exists in memory.
  Expired { ended: DateTime<Utc> },
}

impl SponsorState {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active { .. }) }
}

/// Compute the sponsor state of `listing` as of `now`.
pub fn sponsor_state(listing: &Listing, now: DateTime<Utc>) -> SponsorState {
  if listing.submission_plan == SubmissionPlan::Sponsor
    && listing.payment_ref.is_some()
    && let Some(until) = listing.sponsor_priority_until
  {
    if until > now {
      return SponsorState::Active { until };
    }
    return SponsorState::Expired { ended: until };
  }
  if let Some(order_ref) = &listing.pending_order_ref {
    return SponsorState::PendingPayment { order_ref: order_ref.clone() };
  }
  SponsorState::Free
}

// ─── Slot capacity ───────────────────────────────────────────────────────────

/// Answer to "can a new sponsor be accepted right now?".
///
/// Advisory only: the capacity check and the eventual payment confirmation
/// are separate requests, so two concurrent upgrades can both pass the check
/// and both confirm. The slot count gates marketing display, not data
/// correctness, and that overshoot is tolerated by design.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SponsorCapacity {
  pub can_accept:      bool,
  pub current_count:   u32,
  pub max_count:       u32,
  pub slots_remaining: u32,
}

impl SponsorCapacity {
  pub fn evaluate(current_count: u32, max_count: u32) -> Self {
    SponsorCapacity {
      can_accept:      current_count < max_count,
      current_count,
      max_count,
      slots_remaining: max_count.saturating_sub(current_count),
    }
  }
}

// ─── Activation ──────────────────────────────────────────────────────────────

/// The field set written when a payment capture activates a sponsorship.
/// Built once from the capture time so every timestamp agrees.
#[derive(Debug, Clone)]
pub struct SponsorActivation {
  pub order_ref:      String,
  pub paid_at:        DateTime<Utc>,
  pub featured_until: DateTime<Utc>,
  pub priority_until: DateTime<Utc>,
}

impl SponsorActivation {
  pub fn starting_at(order_ref: String, now: DateTime<Utc>) -> Self {
    let until = now + Duration::days(SPONSOR_WINDOW_DAYS);
    SponsorActivation {
      order_ref,
      paid_at:        now,
      featured_until: until,
      priority_until: until,
    }
  }
}

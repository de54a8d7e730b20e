//! Advertisement — a separately paid creative unit shown alongside listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display placement for an advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdType {
  Banner,
  Card,
  Popup,
}

impl AdType {
  pub const ALL: [AdType; 3] = [AdType::Banner, AdType::Card, AdType::Popup];

  /// The lowercase discriminant stored in the database.
  pub fn as_str(self) -> &'static str {
    match self {
      AdType::Banner => "banner",
      AdType::Card => "card",
      AdType::Popup => "popup",
    }
  }

  /// Stable index into per-type tables (rotation counters).
  pub(crate) fn index(self) -> usize {
    match self {
      AdType::Banner => 0,
      AdType::Card => 1,
      AdType::Popup => 2,
    }
  }
}

/// Moderation status of an advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
  Pending,
  Approved,
  Rejected,
}

/// A paid ad unit. Records are never deleted; expired or deactivated ads are
/// retained for their impression/click history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advertisement {
  pub ad_id:             Uuid,
  pub ad_type:           AdType,
  pub owner_id:          Option<Uuid>,
  pub status:            AdStatus,
  pub headline:          String,
  pub destination_url:   String,
  pub logo_url:          Option<String>,
  pub pending_order_ref: Option<String>,
  pub payment_ref:       Option<String>,
  /// Set when the payment capture lands; cleared on deactivation.
  pub is_active:         bool,
  pub start_date:        Option<DateTime<Utc>>,
  pub end_date:          Option<DateTime<Utc>>,
  pub impressions:       i64,
  pub clicks:            i64,
  pub created_at:        DateTime<Utc>,
}

impl Advertisement {
  /// Whether this ad may enter rotation at `now`: approved by moderation,
  /// paid, active, and not past its end date.
  pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
    self.status == AdStatus::Approved
      && self.payment_ref.is_some()
      && self.is_active
      && self.end_date.is_none_or(|end| end > now)
  }
}

/// Input to [`Directory::submit_ad`](crate::Directory::submit_ad).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdvertisement {
  pub ad_type:         AdType,
  pub owner_id:        Option<Uuid>,
  pub headline:        String,
  pub destination_url: String,
  pub logo_url:        Option<String>,
  pub end_date:        Option<DateTime<Utc>>,
}

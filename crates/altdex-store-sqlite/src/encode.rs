//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enum discriminants are
//! stored lowercase. UUIDs are stored as hyphenated lowercase strings.

use altdex_core::{
  ad::{AdStatus, AdType, Advertisement},
  listing::{Listing, ModerationStatus, SubmissionPlan},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_uuid_opt(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Listing discriminants ───────────────────────────────────────────────────

pub fn encode_status(s: ModerationStatus) -> &'static str {
  match s {
    ModerationStatus::Pending => "pending",
    ModerationStatus::Approved => "approved",
    ModerationStatus::Rejected => "rejected",
  }
}

pub fn decode_status(s: &str) -> Result<ModerationStatus> {
  match s {
    "pending" => Ok(ModerationStatus::Pending),
    "approved" => Ok(ModerationStatus::Approved),
    "rejected" => Ok(ModerationStatus::Rejected),
    other => Err(Error::Decode(format!("unknown moderation status: {other:?}"))),
  }
}

pub fn encode_plan(p: SubmissionPlan) -> &'static str {
  match p {
    SubmissionPlan::Free => "free",
    SubmissionPlan::Sponsor => "sponsor",
  }
}

pub fn decode_plan(s: &str) -> Result<SubmissionPlan> {
  match s {
    "free" => Ok(SubmissionPlan::Free),
    "sponsor" => Ok(SubmissionPlan::Sponsor),
    other => Err(Error::Decode(format!("unknown submission plan: {other:?}"))),
  }
}

// ─── Advertisement discriminants ─────────────────────────────────────────────

pub fn decode_ad_type(s: &str) -> Result<AdType> {
  match s {
    "banner" => Ok(AdType::Banner),
    "card" => Ok(AdType::Card),
    "popup" => Ok(AdType::Popup),
    other => Err(Error::Decode(format!("unknown ad type: {other:?}"))),
  }
}

pub fn encode_ad_status(s: AdStatus) -> &'static str {
  match s {
    AdStatus::Pending => "pending",
    AdStatus::Approved => "approved",
    AdStatus::Rejected => "rejected",
  }
}

pub fn decode_ad_status(s: &str) -> Result<AdStatus> {
  match s {
    "pending" => Ok(AdStatus::Pending),
    "approved" => Ok(AdStatus::Approved),
    "rejected" => Ok(AdStatus::Rejected),
    other => Err(Error::Decode(format!("unknown ad status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `listings` row.
pub struct RawListing {
  pub listing_id:             String,
  pub name:                   String,
  pub slug:                   String,
  pub url:                    String,
  pub repo_url:               Option<String>,
  pub description:            String,
  pub status:                 String,
  pub submission_plan:        String,
  pub owner_id:               Option<String>,
  pub submitter_email:        Option<String>,
  pub pending_order_ref:      Option<String>,
  pub payment_ref:            Option<String>,
  pub sponsor_paid_at:        Option<String>,
  pub sponsor_featured_until: Option<String>,
  pub sponsor_priority_until: Option<String>,
  pub newsletter_included:    bool,
  pub rejection_reason:       Option<String>,
  pub rejected_at:            Option<String>,
  pub created_at:             String,
}

impl RawListing {
  pub fn into_listing(self) -> Result<Listing> {
    Ok(Listing {
      listing_id:             decode_uuid(&self.listing_id)?,
      name:                   self.name,
      slug:                   self.slug,
      url:                    self.url,
      repo_url:               self.repo_url,
      description:            self.description,
      status:                 decode_status(&self.status)?,
      submission_plan:        decode_plan(&self.submission_plan)?,
      owner_id:               decode_uuid_opt(self.owner_id.as_deref())?,
      submitter_email:        self.submitter_email,
      pending_order_ref:      self.pending_order_ref,
      payment_ref:            self.payment_ref,
      sponsor_paid_at:        decode_dt_opt(self.sponsor_paid_at.as_deref())?,
      sponsor_featured_until: decode_dt_opt(self.sponsor_featured_until.as_deref())?,
      sponsor_priority_until: decode_dt_opt(self.sponsor_priority_until.as_deref())?,
      newsletter_included:    self.newsletter_included,
      rejection_reason:       self.rejection_reason,
      rejected_at:            decode_dt_opt(self.rejected_at.as_deref())?,
      created_at:             decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `advertisements` row.
pub struct RawAd {
  pub ad_id:             String,
  pub ad_type:           String,
  pub owner_id:          Option<String>,
  pub status:            String,
  pub headline:          String,
  pub destination_url:   String,
  pub logo_url:          Option<String>,
  pub pending_order_ref: Option<String>,
  pub payment_ref:       Option<String>,
  pub is_active:         bool,
  pub start_date:        Option<String>,
  pub end_date:          Option<String>,
  pub impressions:       i64,
  pub clicks:            i64,
  pub created_at:        String,
}

impl RawAd {
  pub fn into_ad(self) -> Result<Advertisement> {
    Ok(Advertisement {
      ad_id:             decode_uuid(&self.ad_id)?,
      ad_type:           decode_ad_type(&self.ad_type)?,
      owner_id:          decode_uuid_opt(self.owner_id.as_deref())?,
      status:            decode_ad_status(&self.status)?,
      headline:          self.headline,
      destination_url:   self.destination_url,
      logo_url:          self.logo_url,
      pending_order_ref: self.pending_order_ref,
      payment_ref:       self.payment_ref,
      is_active:         self.is_active,
      start_date:        decode_dt_opt(self.start_date.as_deref())?,
      end_date:          decode_dt_opt(self.end_date.as_deref())?,
      impressions:       self.impressions,
      clicks:            self.clicks,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

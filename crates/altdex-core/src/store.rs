//! The `DirectoryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `altdex-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.
//! All filters are simple equality/range predicates; nothing here requires
//! backend-specific query machinery.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  ad::{AdStatus, AdType, Advertisement},
  listing::{Listing, ModerationStatus, SubmissionPlan},
  sponsor::SponsorActivation,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`DirectoryStore::list_listings`].
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
  /// Free-text filter over name and description.
  pub text:   Option<String>,
  pub status: Option<ModerationStatus>,
  pub plan:   Option<SubmissionPlan>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an altdex storage backend.
///
/// Every mutation is a single-document update scoped by identifier; the
/// core's invariants require no cross-document transaction. All methods
/// return `Send` futures so the trait can be used from multi-threaded async
/// runtimes (e.g. tokio with `axum`).
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Listings ──────────────────────────────────────────────────────────

  /// Persist a fully-built listing. Slug and repository uniqueness are
  /// enforced by the backend as a final guard; the service performs the
  /// user-facing duplicate check first.
  fn create_listing(
    &self,
    listing: Listing,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_listing(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Listing>, Self::Error>> + Send + '_;

  fn get_listing_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Listing>, Self::Error>> + Send + 'a;

  fn get_listing_by_repo<'a>(
    &'a self,
    repo_url: &'a str,
  ) -> impl Future<Output = Result<Option<Listing>, Self::Error>> + Send + 'a;

  /// Look up the listing carrying `order_ref` as either its pending or its
  /// captured payment reference.
  fn find_listing_by_order<'a>(
    &'a self,
    order_ref: &'a str,
  ) -> impl Future<Output = Result<Option<Listing>, Self::Error>> + Send + 'a;

  /// Listings matching `query`, active sponsors (as of `now`) ranked first,
  /// then newest submissions.
  fn list_listings(
    &self,
    query: ListingQuery,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Listing>, Self::Error>> + Send + '_;

  /// Number of listings with `submission_plan = sponsor`, a captured
  /// payment, and an unexpired priority window. Recomputed on every call;
  /// there is no cached counter to drift.
  fn count_active_sponsors(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn set_pending_order(
    &self,
    listing_id: Uuid,
    order_ref: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn clear_pending_order(
    &self,
    listing_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply a [`SponsorActivation`]: plan becomes sponsor, moderation flips
  /// to approved, window timestamps and the captured payment reference are
  /// written, the pending order and any prior rejection fields are cleared.
  fn activate_sponsor(
    &self,
    listing_id: Uuid,
    activation: SponsorActivation,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_listing_status(
    &self,
    listing_id: Uuid,
    status: ModerationStatus,
    reason: Option<String>,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Advertisements ────────────────────────────────────────────────────

  fn create_ad(
    &self,
    ad: Advertisement,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_ad(
    &self,
    ad_id: Uuid,
  ) -> impl Future<Output = Result<Option<Advertisement>, Self::Error>> + Send + '_;

  fn find_ad_by_order<'a>(
    &'a self,
    order_ref: &'a str,
  ) -> impl Future<Output = Result<Option<Advertisement>, Self::Error>> + Send + 'a;

  /// Approved, paid, active, unexpired ads of `ad_type` in stable creation
  /// order. The rotation engine applies per-view ordering on top.
  fn list_eligible_ads(
    &self,
    ad_type: AdType,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Advertisement>, Self::Error>> + Send + '_;

  fn set_ad_status(
    &self,
    ad_id: Uuid,
    status: AdStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_ad_active(
    &self,
    ad_id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark the payment captured: move `order_ref` into the captured payment
  /// reference, activate the ad, and record its start date.
  fn activate_ad(
    &self,
    ad_id: Uuid,
    order_ref: String,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn clear_ad_pending_order(
    &self,
    ad_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn record_impression(
    &self,
    ad_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn record_click(
    &self,
    ad_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

//! The directory service — every operation the request-handler layer calls.
//!
//! [`Directory`] composes a [`DirectoryStore`] backend, a [`PaymentGateway`],
//! and the in-process [`AdRotator`]. It owns the sponsor lifecycle
//! transitions and the ad pipeline; handlers translate its typed results to
//! transport codes and nothing more.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  ad::{AdStatus, AdType, Advertisement, NewAdvertisement},
  error::{Error, Result},
  listing::{self, ActingUser, Listing, ModerationStatus, NewListing, SubmissionPlan},
  payment::{CaptureStatus, OrderMetadata, PaymentGateway, PaymentKind, PaymentNotice, PaymentOrder},
  rotation::{self, AdRotator, FeedItem, intersperse_ads},
  sponsor::{self, SponsorActivation, SponsorCapacity},
  store::{DirectoryStore, ListingQuery},
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Tunables for a [`Directory`].
#[derive(Debug, Clone)]
pub struct DirectoryOptions {
  /// Maximum number of concurrently active sponsors.
  pub max_sponsor_slots: u32,
  /// Listings between interleaved card ads in feeds.
  pub card_interval:     usize,
}

impl Default for DirectoryOptions {
  fn default() -> Self {
    DirectoryOptions {
      max_sponsor_slots: sponsor::DEFAULT_MAX_SPONSOR_SLOTS,
      card_interval:     rotation::DEFAULT_CARD_INTERVAL,
    }
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of applying a payment notice.
///
/// Replayed captures are reported as `*AlreadyActive` and treated as success
/// so the gateway's own retry logic can safely re-deliver a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
  SponsorActivated { listing_id: Uuid },
  SponsorAlreadyActive { listing_id: Uuid },
  SponsorCancelled { listing_id: Uuid },
  AdActivated { ad_id: Uuid },
  AdAlreadyActive { ad_id: Uuid },
  AdCancelled { ad_id: Uuid },
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct Directory<S, G> {
  store:   S,
  gateway: G,
  rotator: AdRotator,
  options: DirectoryOptions,
}

impl<S, G> Directory<S, G>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  pub fn new(store: S, gateway: G, options: DirectoryOptions) -> Self {
    Directory {
      store,
      gateway,
      rotator: AdRotator::new(),
      options,
    }
  }

  pub fn options(&self) -> &DirectoryOptions { &self.options }

  // ── Listings ──────────────────────────────────────────────────────────

  /// Validate and persist a new listing (plan free, moderation pending).
  ///
  /// Duplicate slugs and repository URLs are reported with the conflicting
  /// listing's id so the caller can offer a claim flow. The check-then-insert
  /// pair is not transactional; the backend's uniqueness constraints are the
  /// final guard against a racing submission.
  pub async fn submit_listing(&self, input: NewListing) -> Result<Listing> {
    let name = input.name.trim();
    if name.is_empty() {
      return Err(Error::Validation("listing name is required".into()));
    }
    if input.url.trim().is_empty() {
      return Err(Error::Validation("listing url is required".into()));
    }
    let slug = listing::slugify(name);
    if slug.is_empty() {
      return Err(Error::Validation(
        "listing name must contain at least one alphanumeric character".into(),
      ));
    }

    if let Some(existing) = self
      .store
      .get_listing_by_slug(&slug)
      .await
      .map_err(Error::store)?
    {
      return Err(Error::Duplicate { existing_id: existing.listing_id, field: "slug" });
    }
    if let Some(repo) = input.repo_url.as_deref()
      && let Some(existing) = self
        .store
        .get_listing_by_repo(repo)
        .await
        .map_err(Error::store)?
    {
      return Err(Error::Duplicate { existing_id: existing.listing_id, field: "repo_url" });
    }

    let listing = Listing {
      listing_id:             Uuid::new_v4(),
      name:                   name.to_string(),
      slug,
      url:                    input.url.trim().to_string(),
      repo_url:               input.repo_url,
      description:            input.description,
      status:                 ModerationStatus::Pending,
      submission_plan:        SubmissionPlan::Free,
      owner_id:               input.owner_id,
      submitter_email:        input.submitter_email,
      pending_order_ref:      None,
      payment_ref:            None,
      sponsor_paid_at:        None,
      sponsor_featured_until: None,
      sponsor_priority_until: None,
      newsletter_included:    false,
      rejection_reason:       None,
      rejected_at:            None,
      created_at:             Utc::now(),
    };
    self
      .store
      .create_listing(listing.clone())
      .await
      .map_err(Error::store)?;
    Ok(listing)
  }

  pub async fn get_listing(&self, id: Uuid) -> Result<Listing> {
    self
      .store
      .get_listing(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("listing {id}")))
  }

  pub async fn get_listing_by_slug(&self, slug: &str) -> Result<Listing> {
    self
      .store
      .get_listing_by_slug(slug)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("listing with slug {slug:?}")))
  }

  /// Listings matching `query`, active sponsors ranked first, then newest.
  pub async fn listings(&self, query: ListingQuery) -> Result<Vec<Listing>> {
    self
      .store
      .list_listings(query, Utc::now())
      .await
      .map_err(Error::store)
  }

  // ── Sponsor slots ─────────────────────────────────────────────────────

  /// Remaining sponsor capacity, recomputed from the store on every call.
  ///
  /// Advisory: see [`SponsorCapacity`]. A store failure means capacity
  /// cannot be determined; the error propagates and the caller must deny
  /// rather than risk exceeding the pool.
  pub async fn sponsor_status(&self) -> Result<SponsorCapacity> {
    let current = self
      .store
      .count_active_sponsors(Utc::now())
      .await
      .map_err(Error::store)?;
    Ok(SponsorCapacity::evaluate(current as u32, self.options.max_sponsor_slots))
  }

  /// `Free -> PendingPayment`: create a gateway order for a sponsor upgrade
  /// and record its reference on the listing.
  ///
  /// Requires the acting user to own the listing and capacity to be
  /// available at order-creation time. The order is created before any
  /// store write so a gateway failure leaves the listing untouched.
  pub async fn request_sponsor_upgrade(
    &self,
    listing_id: Uuid,
    acting: &ActingUser,
  ) -> Result<PaymentOrder> {
    let listing = self.get_listing(listing_id).await?;
    if !listing.is_owned_by(acting) {
      return Err(Error::Unauthorized { listing_id });
    }
    if sponsor::sponsor_state(&listing, Utc::now()).is_active() {
      return Err(Error::Validation(format!(
        "listing {listing_id} is already an active sponsor"
      )));
    }

    let capacity = self.sponsor_status().await?;
    if !capacity.can_accept {
      return Err(Error::CapacityFull {
        current: capacity.current_count,
        max:     capacity.max_count,
      });
    }

    let order = self
      .gateway
      .create_order(PaymentKind::SponsorUpgrade, OrderMetadata {
        reference_id: listing_id,
        description:  format!("7-day sponsor slot for \"{}\"", listing.name),
      })
      .await?;

    self
      .store
      .set_pending_order(listing_id, order.order_id.clone())
      .await
      .map_err(Error::store)?;
    Ok(order)
  }

  /// Apply an out-of-band payment notice to whichever record carries the
  /// order reference. Safe to call repeatedly with the same notice.
  pub async fn apply_payment_notice(&self, notice: &PaymentNotice) -> Result<PaymentOutcome> {
    if let Some(listing) = self
      .store
      .find_listing_by_order(&notice.order_ref)
      .await
      .map_err(Error::store)?
    {
      return self.settle_sponsor_order(&listing, notice).await;
    }
    if let Some(ad) = self
      .store
      .find_ad_by_order(&notice.order_ref)
      .await
      .map_err(Error::store)?
    {
      return self.settle_ad_order(&ad, notice).await;
    }
    Err(Error::NotFound(format!("order {}", notice.order_ref)))
  }

  /// `PendingPayment -> ActiveSponsor` on capture, `-> Free` on failure.
  ///
  /// Idempotent: a replayed capture for an order that already activated this
  /// listing is a no-op success and never extends the window a second time.
  async fn settle_sponsor_order(
    &self,
    listing: &Listing,
    notice: &PaymentNotice,
  ) -> Result<PaymentOutcome> {
    let listing_id = listing.listing_id;
    if listing.payment_ref.as_deref() == Some(notice.order_ref.as_str()) {
      return Ok(PaymentOutcome::SponsorAlreadyActive { listing_id });
    }
    match notice.status {
      CaptureStatus::Captured => {
        let activation = SponsorActivation::starting_at(notice.order_ref.clone(), Utc::now());
        self
          .store
          .activate_sponsor(listing_id, activation)
          .await
          .map_err(Error::store)?;
        Ok(PaymentOutcome::SponsorActivated { listing_id })
      }
      CaptureStatus::Failed => {
        // Nothing was optimistically mutated at upgrade time; dropping the
        // pending reference returns the listing to Free.
        self
          .store
          .clear_pending_order(listing_id)
          .await
          .map_err(Error::store)?;
        Ok(PaymentOutcome::SponsorCancelled { listing_id })
      }
    }
  }

  async fn settle_ad_order(
    &self,
    ad: &Advertisement,
    notice: &PaymentNotice,
  ) -> Result<PaymentOutcome> {
    let ad_id = ad.ad_id;
    if ad.payment_ref.as_deref() == Some(notice.order_ref.as_str()) {
      return Ok(PaymentOutcome::AdAlreadyActive { ad_id });
    }
    match notice.status {
      CaptureStatus::Captured => {
        self
          .store
          .activate_ad(ad_id, notice.order_ref.clone(), Utc::now())
          .await
          .map_err(Error::store)?;
        Ok(PaymentOutcome::AdActivated { ad_id })
      }
      CaptureStatus::Failed => {
        self
          .store
          .clear_ad_pending_order(ad_id)
          .await
          .map_err(Error::store)?;
        Ok(PaymentOutcome::AdCancelled { ad_id })
      }
    }
  }

  // ── Advertisements ────────────────────────────────────────────────────

  /// Create a pending ad and its payment order. The ad enters rotation only
  /// once moderation approves it and the capture lands, in either order.
  pub async fn submit_ad(&self, input: NewAdvertisement) -> Result<(Advertisement, PaymentOrder)> {
    if input.headline.trim().is_empty() {
      return Err(Error::Validation("ad headline is required".into()));
    }
    if input.destination_url.trim().is_empty() {
      return Err(Error::Validation("ad destination url is required".into()));
    }

    let ad_id = Uuid::new_v4();
    let order = self
      .gateway
      .create_order(PaymentKind::Advertisement, OrderMetadata {
        reference_id: ad_id,
        description:  format!("{} ad: {}", input.ad_type.as_str(), input.headline.trim()),
      })
      .await?;

    let ad = Advertisement {
      ad_id,
      ad_type:           input.ad_type,
      owner_id:          input.owner_id,
      status:            AdStatus::Pending,
      headline:          input.headline.trim().to_string(),
      destination_url:   input.destination_url.trim().to_string(),
      logo_url:          input.logo_url,
      pending_order_ref: Some(order.order_id.clone()),
      payment_ref:       None,
      is_active:         false,
      start_date:        None,
      end_date:          input.end_date,
      impressions:       0,
      clicks:            0,
      created_at:        Utc::now(),
    };
    self.store.create_ad(ad.clone()).await.map_err(Error::store)?;
    Ok((ad, order))
  }

  pub async fn get_ad(&self, ad_id: Uuid) -> Result<Advertisement> {
    self
      .store
      .get_ad(ad_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("advertisement {ad_id}")))
  }

  /// Eligible ads of `ad_type`, ordered for this page view.
  ///
  /// An empty pool is not an error: placements simply render without ads.
  pub async fn rotated_ads(&self, ad_type: AdType) -> Result<Vec<Advertisement>> {
    let pool = self
      .store
      .list_eligible_ads(ad_type, Utc::now())
      .await
      .map_err(Error::store)?;
    Ok(self.rotator.rotate(ad_type, pool))
  }

  /// Listings merged with card ads, one per `every_n` (defaulting to the
  /// configured interval). `cursor` continues the ad cycle across pages.
  ///
  /// The card pool is taken in stable creation order, not per-view rotated:
  /// interleaving must be deterministic for a given input ordering so
  /// pagination stays stable. An unavailable ad pool degrades to a plain
  /// listing feed; it never fails the render.
  pub async fn listing_feed(
    &self,
    query: ListingQuery,
    every_n: Option<usize>,
    cursor: usize,
  ) -> Result<Vec<FeedItem>> {
    let every_n = every_n.unwrap_or(self.options.card_interval);
    let listings = self.listings(query).await?;
    let ads = match self.store.list_eligible_ads(AdType::Card, Utc::now()).await {
      Ok(ads) => ads,
      Err(_) => Vec::new(),
    };
    Ok(intersperse_ads(listings, &ads, every_n, cursor))
  }

  pub async fn record_impression(&self, ad_id: Uuid) -> Result<()> {
    let _ = self.get_ad(ad_id).await?;
    self.store.record_impression(ad_id).await.map_err(Error::store)
  }

  pub async fn record_click(&self, ad_id: Uuid) -> Result<()> {
    let _ = self.get_ad(ad_id).await?;
    self.store.record_click(ad_id).await.map_err(Error::store)
  }

  // ── Moderation ────────────────────────────────────────────────────────

  pub async fn moderate_listing(
    &self,
    listing_id: Uuid,
    status: ModerationStatus,
    reason: Option<String>,
  ) -> Result<Listing> {
    let _ = self.get_listing(listing_id).await?;
    self
      .store
      .set_listing_status(listing_id, status, reason, Utc::now())
      .await
      .map_err(Error::store)?;
    self.get_listing(listing_id).await
  }

  pub async fn moderate_ad(&self, ad_id: Uuid, status: AdStatus) -> Result<Advertisement> {
    let _ = self.get_ad(ad_id).await?;
    self
      .store
      .set_ad_status(ad_id, status)
      .await
      .map_err(Error::store)?;
    self.get_ad(ad_id).await
  }

  /// Pull an ad out of rotation (or return it) without touching its history.
  pub async fn set_ad_active(&self, ad_id: Uuid, active: bool) -> Result<Advertisement> {
    let _ = self.get_ad(ad_id).await?;
    self
      .store
      .set_ad_active(ad_id, active)
      .await
      .map_err(Error::store)?;
    self.get_ad(ad_id).await
  }
}

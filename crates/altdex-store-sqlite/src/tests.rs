//! Integration tests for `SqliteStore` against an in-memory database,
//! including the full sponsor and ad lifecycles driven through
//! [`Directory`] with a mock payment gateway.

use std::sync::{
  atomic::{AtomicU32, Ordering},
  Arc,
};

use chrono::{Duration, Utc};
use uuid::Uuid;

use altdex_core::{
  ad::{AdStatus, AdType, NewAdvertisement},
  listing::{ActingUser, ModerationStatus, NewListing, SubmissionPlan},
  payment::{
    CaptureStatus, OrderMetadata, PaymentError, PaymentGateway, PaymentKind,
    PaymentNotice, PaymentOrder,
  },
  sponsor::{sponsor_state, SponsorActivation, SponsorState},
  store::{DirectoryStore, ListingQuery},
  Directory, Error,
};
use altdex_core::directory::{DirectoryOptions, PaymentOutcome};

use crate::SqliteStore;

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// Gateway that hands out sequential order ids without any I/O.
struct MockGateway {
  orders: Arc<AtomicU32>,
}

impl PaymentGateway for MockGateway {
  async fn create_order(
    &self,
    _kind: PaymentKind,
    _metadata: OrderMetadata,
  ) -> Result<PaymentOrder, PaymentError> {
    let n = self.orders.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(PaymentOrder {
      order_id:     format!("ord-{n}"),
      approval_url: format!("https://pay.example/approve/ord-{n}"),
    })
  }
}

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A directory over a fresh in-memory store. Returns the store clone for
/// direct inspection and the gateway's order counter.
async fn directory() -> (
  Directory<SqliteStore, MockGateway>,
  SqliteStore,
  Arc<AtomicU32>,
) {
  let s = store().await;
  let orders = Arc::new(AtomicU32::new(0));
  let gateway = MockGateway { orders: Arc::clone(&orders) };
  let dir = Directory::new(s.clone(), gateway, DirectoryOptions::default());
  (dir, s, orders)
}

fn new_listing(name: &str) -> NewListing {
  NewListing {
    name:            name.to_string(),
    url:             format!("https://{}.example.com", altdex_core::listing::slugify(name)),
    repo_url:        None,
    description:     String::new(),
    owner_id:        None,
    submitter_email: Some("maintainer@example.com".into()),
  }
}

fn maintainer() -> ActingUser {
  ActingUser {
    user_id: None,
    email:   Some("maintainer@example.com".into()),
  }
}

fn new_ad(ad_type: AdType, headline: &str) -> NewAdvertisement {
  NewAdvertisement {
    ad_type,
    owner_id:        None,
    headline:        headline.to_string(),
    destination_url: "https://advertiser.example.com".into(),
    logo_url:        None,
    end_date:        None,
  }
}

fn captured(order_ref: &str) -> PaymentNotice {
  PaymentNotice {
    order_ref: order_ref.to_string(),
    status:    CaptureStatus::Captured,
    amount:    Some("49.00".into()),
  }
}

fn failed(order_ref: &str) -> PaymentNotice {
  PaymentNotice {
    order_ref: order_ref.to_string(),
    status:    CaptureStatus::Failed,
    amount:    None,
  }
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_and_get_listing() {
  let (dir, _, _) = directory().await;

  let listing = dir.submit_listing(new_listing("Jellyfin")).await.unwrap();
  assert_eq!(listing.slug, "jellyfin");
  assert_eq!(listing.status, ModerationStatus::Pending);
  assert_eq!(listing.submission_plan, SubmissionPlan::Free);

  let fetched = dir.get_listing(listing.listing_id).await.unwrap();
  assert_eq!(fetched.listing_id, listing.listing_id);
  assert_eq!(fetched.name, "Jellyfin");

  let by_slug = dir.get_listing_by_slug("jellyfin").await.unwrap();
  assert_eq!(by_slug.listing_id, listing.listing_id);
}

#[tokio::test]
async fn get_listing_missing_is_not_found() {
  let (dir, _, _) = directory().await;
  let err = dir.get_listing(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn duplicate_slug_reports_existing_listing() {
  let (dir, _, _) = directory().await;

  let first = dir.submit_listing(new_listing("Nextcloud")).await.unwrap();
  let err = dir.submit_listing(new_listing("Nextcloud")).await.unwrap_err();
  match err {
    Error::Duplicate { existing_id, field } => {
      assert_eq!(existing_id, first.listing_id);
      assert_eq!(field, "slug");
    }
    other => panic!("expected duplicate error, got {other:?}"),
  }
}

#[tokio::test]
async fn duplicate_repo_url_reports_existing_listing() {
  let (dir, _, _) = directory().await;

  let mut a = new_listing("Gitea");
  a.repo_url = Some("https://github.com/go-gitea/gitea".into());
  let first = dir.submit_listing(a).await.unwrap();

  let mut b = new_listing("Gitea Fork");
  b.repo_url = Some("https://github.com/go-gitea/gitea".into());
  let err = dir.submit_listing(b).await.unwrap_err();
  match err {
    Error::Duplicate { existing_id, field } => {
      assert_eq!(existing_id, first.listing_id);
      assert_eq!(field, "repo_url");
    }
    other => panic!("expected duplicate error, got {other:?}"),
  }
}

#[tokio::test]
async fn blank_name_is_rejected() {
  let (dir, _, _) = directory().await;
  let mut input = new_listing("  ");
  input.url = "https://example.com".into();
  let err = dir.submit_listing(input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn listings_filterable_by_text_and_status() {
  let (dir, _, _) = directory().await;

  let mut photo = new_listing("PhotoPrism");
  photo.description = "photo management".into();
  let photo = dir.submit_listing(photo).await.unwrap();
  dir.submit_listing(new_listing("Vaultwarden")).await.unwrap();

  dir
    .moderate_listing(photo.listing_id, ModerationStatus::Approved, None)
    .await
    .unwrap();

  let hits = dir
    .listings(ListingQuery { text: Some("photo".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].listing_id, photo.listing_id);

  let approved = dir
    .listings(ListingQuery {
      status: Some(ModerationStatus::Approved),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(approved.len(), 1);
  assert_eq!(approved[0].listing_id, photo.listing_id);
}

#[tokio::test]
async fn active_sponsors_rank_before_newer_free_listings() {
  let (dir, s, _) = directory().await;

  let sponsor = dir.submit_listing(new_listing("Older Sponsor")).await.unwrap();
  let free = dir.submit_listing(new_listing("Newer Free")).await.unwrap();

  s.activate_sponsor(
    sponsor.listing_id,
    SponsorActivation::starting_at("ord-x".into(), Utc::now()),
  )
  .await
  .unwrap();

  let all = dir.listings(ListingQuery::default()).await.unwrap();
  assert_eq!(all[0].listing_id, sponsor.listing_id);
  assert_eq!(all[1].listing_id, free.listing_id);
}

// ─── Moderation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn rejection_records_reason_and_approval_clears_it() {
  let (dir, _, _) = directory().await;
  let listing = dir.submit_listing(new_listing("Some Tool")).await.unwrap();

  let rejected = dir
    .moderate_listing(
      listing.listing_id,
      ModerationStatus::Rejected,
      Some("not open source".into()),
    )
    .await
    .unwrap();
  assert_eq!(rejected.status, ModerationStatus::Rejected);
  assert_eq!(rejected.rejection_reason.as_deref(), Some("not open source"));
  assert!(rejected.rejected_at.is_some());

  let approved = dir
    .moderate_listing(listing.listing_id, ModerationStatus::Approved, None)
    .await
    .unwrap();
  assert_eq!(approved.status, ModerationStatus::Approved);
  assert!(approved.rejection_reason.is_none());
  assert!(approved.rejected_at.is_none());
}

// ─── Sponsor lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn upgrade_and_capture_activates_a_seven_day_window() {
  let (dir, _, _) = directory().await;
  let listing = dir.submit_listing(new_listing("Penpot")).await.unwrap();

  let order = dir
    .request_sponsor_upgrade(listing.listing_id, &maintainer())
    .await
    .unwrap();

  let pending = dir.get_listing(listing.listing_id).await.unwrap();
  assert_eq!(
    sponsor_state(&pending, Utc::now()),
    SponsorState::PendingPayment { order_ref: order.order_id.clone() },
  );

  let before = Utc::now();
  let outcome = dir.apply_payment_notice(&captured(&order.order_id)).await.unwrap();
  assert_eq!(
    outcome,
    PaymentOutcome::SponsorActivated { listing_id: listing.listing_id },
  );

  let active = dir.get_listing(listing.listing_id).await.unwrap();
  assert_eq!(active.submission_plan, SubmissionPlan::Sponsor);
  assert_eq!(active.status, ModerationStatus::Approved);
  assert_eq!(active.payment_ref.as_deref(), Some(order.order_id.as_str()));
  assert!(active.pending_order_ref.is_none());
  assert!(active.newsletter_included);
  assert!(sponsor_state(&active, Utc::now()).is_active());

  let until = active.sponsor_featured_until.unwrap();
  let expected = before + Duration::days(7);
  assert!((until - expected).abs() < Duration::seconds(30));
  assert_eq!(active.sponsor_priority_until, active.sponsor_featured_until);

  assert_eq!(dir.sponsor_status().await.unwrap().current_count, 1);
}

#[tokio::test]
async fn replayed_capture_is_a_no_op() {
  let (dir, _, _) = directory().await;
  let listing = dir.submit_listing(new_listing("Umami")).await.unwrap();
  let order = dir
    .request_sponsor_upgrade(listing.listing_id, &maintainer())
    .await
    .unwrap();

  dir.apply_payment_notice(&captured(&order.order_id)).await.unwrap();
  let first = dir.get_listing(listing.listing_id).await.unwrap();

  // The gateway may re-deliver; the window must not move.
  let outcome = dir.apply_payment_notice(&captured(&order.order_id)).await.unwrap();
  assert_eq!(
    outcome,
    PaymentOutcome::SponsorAlreadyActive { listing_id: listing.listing_id },
  );
  let second = dir.get_listing(listing.listing_id).await.unwrap();
  assert_eq!(second.sponsor_featured_until, first.sponsor_featured_until);
  assert_eq!(second.sponsor_paid_at, first.sponsor_paid_at);
}

#[tokio::test]
async fn failed_capture_returns_listing_to_free() {
  let (dir, _, _) = directory().await;
  let listing = dir.submit_listing(new_listing("Forgejo")).await.unwrap();
  let order = dir
    .request_sponsor_upgrade(listing.listing_id, &maintainer())
    .await
    .unwrap();

  let outcome = dir.apply_payment_notice(&failed(&order.order_id)).await.unwrap();
  assert_eq!(
    outcome,
    PaymentOutcome::SponsorCancelled { listing_id: listing.listing_id },
  );

  let after = dir.get_listing(listing.listing_id).await.unwrap();
  assert_eq!(sponsor_state(&after, Utc::now()), SponsorState::Free);
  assert!(after.pending_order_ref.is_none());
  assert!(after.payment_ref.is_none());
}

#[tokio::test]
async fn unknown_order_reference_is_not_found() {
  let (dir, _, _) = directory().await;
  let err = dir.apply_payment_notice(&captured("ord-unknown")).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn upgrade_requires_ownership() {
  let (dir, _, orders) = directory().await;
  let listing = dir.submit_listing(new_listing("Outline")).await.unwrap();

  let stranger = ActingUser {
    user_id: Some(Uuid::new_v4()),
    email:   Some("stranger@example.com".into()),
  };
  let err = dir
    .request_sponsor_upgrade(listing.listing_id, &stranger)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Unauthorized { .. }));

  // No order was created and the listing was not touched.
  assert_eq!(orders.load(Ordering::SeqCst), 0);
  let after = dir.get_listing(listing.listing_id).await.unwrap();
  assert!(after.pending_order_ref.is_none());
}

#[tokio::test]
async fn upgrade_denied_at_capacity_without_creating_an_order() {
  let (dir, s, orders) = directory().await;

  // Fill every slot.
  for i in 0..dir.options().max_sponsor_slots {
    let l = dir.submit_listing(new_listing(&format!("Sponsor {i}"))).await.unwrap();
    s.activate_sponsor(
      l.listing_id,
      SponsorActivation::starting_at(format!("seed-{i}"), Utc::now()),
    )
    .await
    .unwrap();
  }
  let capacity = dir.sponsor_status().await.unwrap();
  assert!(!capacity.can_accept);
  assert_eq!(capacity.slots_remaining, 0);

  let hopeful = dir.submit_listing(new_listing("Hopeful")).await.unwrap();
  let orders_before = orders.load(Ordering::SeqCst);
  let err = dir
    .request_sponsor_upgrade(hopeful.listing_id, &maintainer())
    .await
    .unwrap_err();
  match err {
    Error::CapacityFull { current, max } => {
      assert_eq!(current, max);
    }
    other => panic!("expected capacity error, got {other:?}"),
  }
  assert_eq!(orders.load(Ordering::SeqCst), orders_before);
  let after = dir.get_listing(hopeful.listing_id).await.unwrap();
  assert!(after.pending_order_ref.is_none());
}

#[tokio::test]
async fn expired_sponsor_frees_its_slot_without_any_job() {
  let (dir, s, _) = directory().await;
  let listing = dir.submit_listing(new_listing("Faded Glory")).await.unwrap();

  // Activation whose window already elapsed.
  s.activate_sponsor(
    listing.listing_id,
    SponsorActivation::starting_at("ord-old".into(), Utc::now() - Duration::days(10)),
  )
  .await
  .unwrap();

  let stored = dir.get_listing(listing.listing_id).await.unwrap();
  assert_eq!(stored.submission_plan, SubmissionPlan::Sponsor);
  assert!(matches!(
    sponsor_state(&stored, Utc::now()),
    SponsorState::Expired { .. },
  ));

  let capacity = dir.sponsor_status().await.unwrap();
  assert_eq!(capacity.current_count, 0);
  assert!(capacity.can_accept);
}

#[tokio::test]
async fn already_active_sponsor_cannot_order_again() {
  let (dir, _, _) = directory().await;
  let listing = dir.submit_listing(new_listing("Healthy")).await.unwrap();
  let order = dir
    .request_sponsor_upgrade(listing.listing_id, &maintainer())
    .await
    .unwrap();
  dir.apply_payment_notice(&captured(&order.order_id)).await.unwrap();

  let err = dir
    .request_sponsor_upgrade(listing.listing_id, &maintainer())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn re_request_replaces_the_pending_order() {
  let (dir, _, _) = directory().await;
  let listing = dir.submit_listing(new_listing("Waffles")).await.unwrap();

  let first = dir
    .request_sponsor_upgrade(listing.listing_id, &maintainer())
    .await
    .unwrap();
  let second = dir
    .request_sponsor_upgrade(listing.listing_id, &maintainer())
    .await
    .unwrap();
  assert_ne!(first.order_id, second.order_id);

  let stored = dir.get_listing(listing.listing_id).await.unwrap();
  assert_eq!(stored.pending_order_ref.as_deref(), Some(second.order_id.as_str()));

  // The superseded order can no longer settle anything.
  let err = dir.apply_payment_notice(&captured(&first.order_id)).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

// ─── Advertisements ──────────────────────────────────────────────────────────

#[tokio::test]
async fn ad_needs_both_approval_and_capture_in_either_order() {
  let (dir, _, _) = directory().await;

  // Capture first, approve second.
  let (ad_a, order_a) = dir.submit_ad(new_ad(AdType::Banner, "Try A")).await.unwrap();
  dir.apply_payment_notice(&captured(&order_a.order_id)).await.unwrap();
  assert!(dir.rotated_ads(AdType::Banner).await.unwrap().is_empty());
  dir.moderate_ad(ad_a.ad_id, AdStatus::Approved).await.unwrap();
  assert_eq!(dir.rotated_ads(AdType::Banner).await.unwrap().len(), 1);

  // Approve first, capture second.
  let (ad_b, order_b) = dir.submit_ad(new_ad(AdType::Card, "Try B")).await.unwrap();
  dir.moderate_ad(ad_b.ad_id, AdStatus::Approved).await.unwrap();
  assert!(dir.rotated_ads(AdType::Card).await.unwrap().is_empty());
  dir.apply_payment_notice(&captured(&order_b.order_id)).await.unwrap();
  assert_eq!(dir.rotated_ads(AdType::Card).await.unwrap().len(), 1);
}

#[tokio::test]
async fn ended_and_deactivated_ads_leave_rotation() {
  let (dir, s, _) = directory().await;

  let mut input = new_ad(AdType::Banner, "Short run");
  input.end_date = Some(Utc::now() - Duration::hours(1));
  let (ended, order) = dir.submit_ad(input).await.unwrap();
  dir.moderate_ad(ended.ad_id, AdStatus::Approved).await.unwrap();
  dir.apply_payment_notice(&captured(&order.order_id)).await.unwrap();
  assert!(dir.rotated_ads(AdType::Banner).await.unwrap().is_empty());

  let (live, order2) = dir.submit_ad(new_ad(AdType::Banner, "Long run")).await.unwrap();
  dir.moderate_ad(live.ad_id, AdStatus::Approved).await.unwrap();
  dir.apply_payment_notice(&captured(&order2.order_id)).await.unwrap();
  assert_eq!(dir.rotated_ads(AdType::Banner).await.unwrap().len(), 1);

  let paused = dir.set_ad_active(live.ad_id, false).await.unwrap();
  assert!(!paused.is_active);
  assert!(dir.rotated_ads(AdType::Banner).await.unwrap().is_empty());

  // History survives deactivation.
  let kept = s.get_ad(live.ad_id).await.unwrap().unwrap();
  assert_eq!(kept.payment_ref.as_deref(), Some(order2.order_id.as_str()));
}

#[tokio::test]
async fn failed_ad_capture_clears_the_pending_order() {
  let (dir, _, _) = directory().await;
  let (ad, order) = dir.submit_ad(new_ad(AdType::Popup, "Never paid")).await.unwrap();

  let outcome = dir.apply_payment_notice(&failed(&order.order_id)).await.unwrap();
  assert_eq!(outcome, PaymentOutcome::AdCancelled { ad_id: ad.ad_id });

  let after = dir.get_ad(ad.ad_id).await.unwrap();
  assert!(after.pending_order_ref.is_none());
  assert!(after.payment_ref.is_none());
  assert!(!after.is_active);
}

#[tokio::test]
async fn replayed_ad_capture_is_a_no_op() {
  let (dir, _, _) = directory().await;
  let (ad, order) = dir.submit_ad(new_ad(AdType::Card, "Replay")).await.unwrap();
  dir.apply_payment_notice(&captured(&order.order_id)).await.unwrap();

  let first = dir.get_ad(ad.ad_id).await.unwrap();
  let outcome = dir.apply_payment_notice(&captured(&order.order_id)).await.unwrap();
  assert_eq!(outcome, PaymentOutcome::AdAlreadyActive { ad_id: ad.ad_id });
  let second = dir.get_ad(ad.ad_id).await.unwrap();
  assert_eq!(second.start_date, first.start_date);
}

#[tokio::test]
async fn impressions_and_clicks_accumulate() {
  let (dir, _, _) = directory().await;
  let (ad, _) = dir.submit_ad(new_ad(AdType::Banner, "Counted")).await.unwrap();

  dir.record_impression(ad.ad_id).await.unwrap();
  dir.record_impression(ad.ad_id).await.unwrap();
  dir.record_click(ad.ad_id).await.unwrap();

  let after = dir.get_ad(ad.ad_id).await.unwrap();
  assert_eq!(after.impressions, 2);
  assert_eq!(after.clicks, 1);
}

#[tokio::test]
async fn counters_for_missing_ad_are_not_found() {
  let (dir, _, _) = directory().await;
  let err = dir.record_impression(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn eligible_ads_keep_stable_creation_order() {
  let (dir, s, _) = directory().await;

  let mut ids = Vec::new();
  for i in 0..3 {
    let (ad, order) = dir
      .submit_ad(new_ad(AdType::Card, &format!("Creative {i}")))
      .await
      .unwrap();
    dir.moderate_ad(ad.ad_id, AdStatus::Approved).await.unwrap();
    dir.apply_payment_notice(&captured(&order.order_id)).await.unwrap();
    ids.push(ad.ad_id);
  }

  let pool = s.list_eligible_ads(AdType::Card, Utc::now()).await.unwrap();
  let pool_ids: Vec<_> = pool.iter().map(|a| a.ad_id).collect();
  assert_eq!(pool_ids, ids);
}

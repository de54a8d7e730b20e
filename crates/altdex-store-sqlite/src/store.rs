//! [`SqliteStore`] — the SQLite implementation of [`DirectoryStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use altdex_core::{
  ad::{AdStatus, AdType, Advertisement},
  listing::{Listing, ModerationStatus},
  sponsor::SponsorActivation,
  store::{DirectoryStore, ListingQuery},
};

use crate::{
  encode::{
    encode_ad_status, encode_dt, encode_plan, encode_status, encode_uuid,
    RawAd, RawListing,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Row mapping ─────────────────────────────────────────────────────────────

const LISTING_COLS: &str = "listing_id, name, slug, url, repo_url, \
   description, status, submission_plan, owner_id, submitter_email, \
   pending_order_ref, payment_ref, sponsor_paid_at, sponsor_featured_until, \
   sponsor_priority_until, newsletter_included, rejection_reason, \
   rejected_at, created_at";

const AD_COLS: &str = "ad_id, ad_type, owner_id, status, headline, \
   destination_url, logo_url, pending_order_ref, payment_ref, is_active, \
   start_date, end_date, impressions, clicks, created_at";

fn listing_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawListing> {
  Ok(RawListing {
    listing_id:             row.get(0)?,
    name:                   row.get(1)?,
    slug:                   row.get(2)?,
    url:                    row.get(3)?,
    repo_url:               row.get(4)?,
    description:            row.get(5)?,
    status:                 row.get(6)?,
    submission_plan:        row.get(7)?,
    owner_id:               row.get(8)?,
    submitter_email:        row.get(9)?,
    pending_order_ref:      row.get(10)?,
    payment_ref:            row.get(11)?,
    sponsor_paid_at:        row.get(12)?,
    sponsor_featured_until: row.get(13)?,
    sponsor_priority_until: row.get(14)?,
    newsletter_included:    row.get(15)?,
    rejection_reason:       row.get(16)?,
    rejected_at:            row.get(17)?,
    created_at:             row.get(18)?,
  })
}

fn ad_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAd> {
  Ok(RawAd {
    ad_id:             row.get(0)?,
    ad_type:           row.get(1)?,
    owner_id:          row.get(2)?,
    status:            row.get(3)?,
    headline:          row.get(4)?,
    destination_url:   row.get(5)?,
    logo_url:          row.get(6)?,
    pending_order_ref: row.get(7)?,
    payment_ref:       row.get(8)?,
    is_active:         row.get(9)?,
    start_date:        row.get(10)?,
    end_date:          row.get(11)?,
    impressions:       row.get(12)?,
    clicks:            row.get(13)?,
    created_at:        row.get(14)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An altdex directory store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a single listing matching `WHERE {clause}` with one bound value.
  async fn fetch_listing_where(
    &self,
    clause: &'static str,
    value: String,
  ) -> Result<Option<Listing>> {
    let raw: Option<RawListing> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {LISTING_COLS} FROM listings WHERE {clause}"),
            rusqlite::params![value],
            listing_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawListing::into_listing).transpose()
  }

  /// Fetch a single ad matching `WHERE {clause}` with one bound value.
  async fn fetch_ad_where(
    &self,
    clause: &'static str,
    value: String,
  ) -> Result<Option<Advertisement>> {
    let raw: Option<RawAd> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {AD_COLS} FROM advertisements WHERE {clause}"),
            rusqlite::params![value],
            ad_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAd::into_ad).transpose()
  }

  /// Run an UPDATE statement with a leading listing/ad id parameter.
  async fn execute(
    &self,
    sql: &'static str,
    params: Vec<String>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(sql, rusqlite::params_from_iter(params.iter()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Listings ──────────────────────────────────────────────────────────────

  async fn create_listing(&self, listing: Listing) -> Result<()> {
    let id_str        = encode_uuid(listing.listing_id);
    let status_str    = encode_status(listing.status).to_owned();
    let plan_str      = encode_plan(listing.submission_plan).to_owned();
    let owner_str     = listing.owner_id.map(encode_uuid);
    let paid_str      = listing.sponsor_paid_at.map(encode_dt);
    let featured_str  = listing.sponsor_featured_until.map(encode_dt);
    let priority_str  = listing.sponsor_priority_until.map(encode_dt);
    let rejected_str  = listing.rejected_at.map(encode_dt);
    let created_str   = encode_dt(listing.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO listings (
             listing_id, name, slug, url, repo_url, description,
             status, submission_plan, owner_id, submitter_email,
             pending_order_ref, payment_ref, sponsor_paid_at,
             sponsor_featured_until, sponsor_priority_until,
             newsletter_included, rejection_reason, rejected_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
          rusqlite::params![
            id_str,
            listing.name,
            listing.slug,
            listing.url,
            listing.repo_url,
            listing.description,
            status_str,
            plan_str,
            owner_str,
            listing.submitter_email,
            listing.pending_order_ref,
            listing.payment_ref,
            paid_str,
            featured_str,
            priority_str,
            listing.newsletter_included,
            listing.rejection_reason,
            rejected_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>> {
    self
      .fetch_listing_where("listing_id = ?1", encode_uuid(id))
      .await
  }

  async fn get_listing_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> Result<Option<Listing>> {
    self.fetch_listing_where("slug = ?1", slug.to_owned()).await
  }

  async fn get_listing_by_repo<'a>(
    &'a self,
    repo_url: &'a str,
  ) -> Result<Option<Listing>> {
    self
      .fetch_listing_where("repo_url = ?1", repo_url.to_owned())
      .await
  }

  async fn find_listing_by_order<'a>(
    &'a self,
    order_ref: &'a str,
  ) -> Result<Option<Listing>> {
    self
      .fetch_listing_where(
        "pending_order_ref = ?1 OR payment_ref = ?1",
        order_ref.to_owned(),
      )
      .await
  }

  async fn list_listings(
    &self,
    query: ListingQuery,
    now: DateTime<Utc>,
  ) -> Result<Vec<Listing>> {
    let text_pattern = query.text.as_deref().map(|t| format!("%{t}%"));
    let status_str   = query.status.map(encode_status).map(str::to_owned);
    let plan_str     = query.plan.map(encode_plan).map(str::to_owned);
    // SQLite treats LIMIT -1 as "no limit".
    let limit_val    = query.limit.map(|l| l as i64).unwrap_or(-1);
    let offset_val   = query.offset.unwrap_or(0) as i64;
    let now_str      = encode_dt(now);

    let raws: Vec<RawListing> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; only referenced params are bound.
        let mut conds: Vec<&'static str> = vec![];
        if text_pattern.is_some() {
          conds.push("(name LIKE :text OR description LIKE :text)");
        }
        if status_str.is_some() {
          conds.push("status = :status");
        }
        if plan_str.is_some() {
          conds.push("submission_plan = :plan");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {LISTING_COLS} FROM listings
           {where_clause}
           ORDER BY
             CASE WHEN submission_plan = 'sponsor'
                    AND payment_ref IS NOT NULL
                    AND sponsor_priority_until > :now
                  THEN 0 ELSE 1 END,
             created_at DESC
           LIMIT :limit OFFSET :offset"
        );

        let mut params: Vec<(&'static str, &dyn rusqlite::ToSql)> = vec![
          (":now", &now_str),
          (":limit", &limit_val),
          (":offset", &offset_val),
        ];
        if let Some(ref t) = text_pattern {
          params.push((":text", t));
        }
        if let Some(ref s) = status_str {
          params.push((":status", s));
        }
        if let Some(ref p) = plan_str {
          params.push((":plan", p));
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params.as_slice(), listing_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawListing::into_listing).collect()
  }

  async fn count_active_sponsors(&self, now: DateTime<Utc>) -> Result<u64> {
    let now_str = encode_dt(now);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM listings
           WHERE submission_plan = 'sponsor'
             AND payment_ref IS NOT NULL
             AND sponsor_priority_until > ?1",
          rusqlite::params![now_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  async fn set_pending_order(
    &self,
    listing_id: Uuid,
    order_ref: String,
  ) -> Result<()> {
    self
      .execute(
        "UPDATE listings SET pending_order_ref = ?2 WHERE listing_id = ?1",
        vec![encode_uuid(listing_id), order_ref],
      )
      .await
  }

  async fn clear_pending_order(&self, listing_id: Uuid) -> Result<()> {
    self
      .execute(
        "UPDATE listings SET pending_order_ref = NULL WHERE listing_id = ?1",
        vec![encode_uuid(listing_id)],
      )
      .await
  }

  async fn activate_sponsor(
    &self,
    listing_id: Uuid,
    activation: SponsorActivation,
  ) -> Result<()> {
    self
      .execute(
        "UPDATE listings SET
           submission_plan        = 'sponsor',
           status                 = 'approved',
           payment_ref            = ?2,
           pending_order_ref      = NULL,
           sponsor_paid_at        = ?3,
           sponsor_featured_until = ?4,
           sponsor_priority_until = ?5,
           newsletter_included    = 1,
           rejection_reason       = NULL,
           rejected_at            = NULL
         WHERE listing_id = ?1",
        vec![
          encode_uuid(listing_id),
          activation.order_ref,
          encode_dt(activation.paid_at),
          encode_dt(activation.featured_until),
          encode_dt(activation.priority_until),
        ],
      )
      .await
  }

  async fn set_listing_status(
    &self,
    listing_id: Uuid,
    status: ModerationStatus,
    reason: Option<String>,
    at: DateTime<Utc>,
  ) -> Result<()> {
    let id_str     = encode_uuid(listing_id);
    let status_str = encode_status(status).to_owned();
    let rejected   = matches!(status, ModerationStatus::Rejected);
    let at_str     = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        if rejected {
          conn.execute(
            "UPDATE listings SET
               status = ?2, rejection_reason = ?3, rejected_at = ?4
             WHERE listing_id = ?1",
            rusqlite::params![id_str, status_str, reason, at_str],
          )?;
        } else {
          conn.execute(
            "UPDATE listings SET
               status = ?2, rejection_reason = NULL, rejected_at = NULL
             WHERE listing_id = ?1",
            rusqlite::params![id_str, status_str],
          )?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Advertisements ────────────────────────────────────────────────────────

  async fn create_ad(&self, ad: Advertisement) -> Result<()> {
    let id_str      = encode_uuid(ad.ad_id);
    let type_str    = ad.ad_type.as_str().to_owned();
    let owner_str   = ad.owner_id.map(encode_uuid);
    let status_str  = encode_ad_status(ad.status).to_owned();
    let start_str   = ad.start_date.map(encode_dt);
    let end_str     = ad.end_date.map(encode_dt);
    let created_str = encode_dt(ad.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO advertisements (
             ad_id, ad_type, owner_id, status, headline,
             destination_url, logo_url, pending_order_ref, payment_ref,
             is_active, start_date, end_date, impressions, clicks, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                     ?10, ?11, ?12, ?13, ?14, ?15)",
          rusqlite::params![
            id_str,
            type_str,
            owner_str,
            status_str,
            ad.headline,
            ad.destination_url,
            ad.logo_url,
            ad.pending_order_ref,
            ad.payment_ref,
            ad.is_active,
            start_str,
            end_str,
            ad.impressions,
            ad.clicks,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_ad(&self, ad_id: Uuid) -> Result<Option<Advertisement>> {
    self.fetch_ad_where("ad_id = ?1", encode_uuid(ad_id)).await
  }

  async fn find_ad_by_order<'a>(
    &'a self,
    order_ref: &'a str,
  ) -> Result<Option<Advertisement>> {
    self
      .fetch_ad_where(
        "pending_order_ref = ?1 OR payment_ref = ?1",
        order_ref.to_owned(),
      )
      .await
  }

  async fn list_eligible_ads(
    &self,
    ad_type: AdType,
    now: DateTime<Utc>,
  ) -> Result<Vec<Advertisement>> {
    let type_str = ad_type.as_str().to_owned();
    let now_str  = encode_dt(now);

    let raws: Vec<RawAd> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {AD_COLS} FROM advertisements
           WHERE ad_type = ?1
             AND status = 'approved'
             AND payment_ref IS NOT NULL
             AND is_active = 1
             AND (end_date IS NULL OR end_date > ?2)
           ORDER BY created_at ASC, ad_id ASC"
        ))?;

        let rows = stmt
          .query_map(rusqlite::params![type_str, now_str], ad_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAd::into_ad).collect()
  }

  async fn set_ad_status(&self, ad_id: Uuid, status: AdStatus) -> Result<()> {
    self
      .execute(
        "UPDATE advertisements SET status = ?2 WHERE ad_id = ?1",
        vec![encode_uuid(ad_id), encode_ad_status(status).to_owned()],
      )
      .await
  }

  async fn set_ad_active(&self, ad_id: Uuid, active: bool) -> Result<()> {
    let id_str = encode_uuid(ad_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE advertisements SET is_active = ?2 WHERE ad_id = ?1",
          rusqlite::params![id_str, active],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn activate_ad(
    &self,
    ad_id: Uuid,
    order_ref: String,
    at: DateTime<Utc>,
  ) -> Result<()> {
    self
      .execute(
        "UPDATE advertisements SET
           payment_ref       = ?2,
           pending_order_ref = NULL,
           is_active         = 1,
           start_date        = ?3
         WHERE ad_id = ?1",
        vec![encode_uuid(ad_id), order_ref, encode_dt(at)],
      )
      .await
  }

  async fn clear_ad_pending_order(&self, ad_id: Uuid) -> Result<()> {
    self
      .execute(
        "UPDATE advertisements SET pending_order_ref = NULL WHERE ad_id = ?1",
        vec![encode_uuid(ad_id)],
      )
      .await
  }

  async fn record_impression(&self, ad_id: Uuid) -> Result<()> {
    self
      .execute(
        "UPDATE advertisements SET impressions = impressions + 1
         WHERE ad_id = ?1",
        vec![encode_uuid(ad_id)],
      )
      .await
  }

  async fn record_click(&self, ad_id: Uuid) -> Result<()> {
    self
      .execute(
        "UPDATE advertisements SET clicks = clicks + 1 WHERE ad_id = ?1",
        vec![encode_uuid(ad_id)],
      )
      .await
  }
}

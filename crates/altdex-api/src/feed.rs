//! Handler for the combined listing/ad feed.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/feed` | Listing filters plus optional `every_n` ad interval |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;

use altdex_core::{
  listing::{ModerationStatus, SubmissionPlan},
  payment::PaymentGateway,
  rotation::FeedItem,
  store::{DirectoryStore, ListingQuery},
  Directory,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
  pub text:    Option<String>,
  pub status:  Option<ModerationStatus>,
  pub plan:    Option<SubmissionPlan>,
  pub limit:   Option<usize>,
  pub offset:  Option<usize>,
  /// Listings between interleaved card ads; defaults to the server's
  /// configured interval.
  pub every_n: Option<usize>,
}

/// `GET /feed[?text=...][&status=...][&plan=...][&limit=...][&offset=...][&every_n=...]`
///
/// Pagination stays ad-stable: the ad cycle continues from where the
/// previous page left off, derived from `offset`.
pub async fn handler<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Query(params): Query<FeedParams>,
) -> Result<Json<Vec<FeedItem>>, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  let every_n = params.every_n.unwrap_or(dir.options().card_interval);
  let cursor = match every_n {
    0 => 0,
    n => params.offset.unwrap_or(0) / n,
  };
  let query = ListingQuery {
    text:   params.text,
    status: params.status,
    plan:   params.plan,
    limit:  params.limit,
    offset: params.offset,
  };
  let feed = dir.listing_feed(query, Some(every_n), cursor).await?;
  Ok(Json(feed))
}

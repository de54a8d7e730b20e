//! Handlers for `/listings` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/listings` | Optional `text`, `status`, `plan`, `limit`, `offset` |
//! | `GET`  | `/listings/:id` | Single listing with derived sponsor state |
//! | `GET`  | `/listings/by-slug/:slug` | Slug lookup |
//! | `POST` | `/listings` | Body: [`NewListing`]; returns 201 + stored listing |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use altdex_core::{
  listing::{Listing, ModerationStatus, NewListing, SubmissionPlan},
  payment::PaymentGateway,
  sponsor::{sponsor_state, SponsorState},
  store::{DirectoryStore, ListingQuery},
  Directory,
};

use crate::error::ApiError;

/// A listing as returned over the wire: the stored fields plus the sponsor
/// state derived at response time.
#[derive(Debug, Serialize)]
pub struct ListingView {
  #[serde(flatten)]
  pub listing: Listing,
  pub sponsor: SponsorState,
}

impl ListingView {
  pub fn now(listing: Listing) -> Self {
    let sponsor = sponsor_state(&listing, Utc::now());
    ListingView { listing, sponsor }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Free-text filter over name and description.
  pub text:   Option<String>,
  pub status: Option<ModerationStatus>,
  pub plan:   Option<SubmissionPlan>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl From<ListParams> for ListingQuery {
  fn from(p: ListParams) -> Self {
    ListingQuery {
      text:   p.text,
      status: p.status,
      plan:   p.plan,
      limit:  p.limit,
      offset: p.offset,
    }
  }
}

/// `GET /listings[?text=...][&status=...][&plan=...][&limit=...][&offset=...]`
pub async fn list<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ListingView>>, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  let listings = dir.listings(ListingQuery::from(params)).await?;
  Ok(Json(listings.into_iter().map(ListingView::now).collect()))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /listings/:id`
pub async fn get_one<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ListingView>, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  Ok(Json(ListingView::now(dir.get_listing(id).await?)))
}

/// `GET /listings/by-slug/:slug`
pub async fn get_by_slug<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Path(slug): Path<String>,
) -> Result<Json<ListingView>, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  Ok(Json(ListingView::now(dir.get_listing_by_slug(&slug).await?)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /listings` — returns 201 + the stored listing.
pub async fn create<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Json(body): Json<NewListing>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  let listing = dir.submit_listing(body).await?;
  Ok((StatusCode::CREATED, Json(ListingView::now(listing))))
}

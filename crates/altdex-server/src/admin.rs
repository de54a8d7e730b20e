//! Admin moderation endpoints, Basic-auth gated.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin/listings/:id/approve` | |
//! | `POST` | `/admin/listings/:id/reject` | Body: `{"reason":"..."}` (optional) |
//! | `POST` | `/admin/ads/:id/approve` | |
//! | `POST` | `/admin/ads/:id/reject` | |
//! | `POST` | `/admin/ads/:id/activate` | Return a paused ad to rotation |
//! | `POST` | `/admin/ads/:id/deactivate` | Pull an ad from rotation |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use altdex_core::{
  ad::{AdStatus, Advertisement},
  listing::{Listing, ModerationStatus},
  payment::PaymentGateway,
  store::DirectoryStore,
};

use crate::{AppState, auth::AdminAuth, error::Error};

/// `POST /admin/listings/:id/approve`
pub async fn approve_listing<S, G>(
  _auth: AdminAuth,
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Listing>, Error>
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  let listing = state
    .directory
    .moderate_listing(id, ModerationStatus::Approved, None)
    .await?;
  Ok(Json(listing))
}

#[derive(Debug, Deserialize, Default)]
pub struct RejectBody {
  pub reason: Option<String>,
}

/// `POST /admin/listings/:id/reject` — body: `{"reason":"..."}` (optional).
pub async fn reject_listing<S, G>(
  _auth: AdminAuth,
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
  body: Option<Json<RejectBody>>,
) -> Result<Json<Listing>, Error>
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  let reason = body.and_then(|Json(b)| b.reason);
  let listing = state
    .directory
    .moderate_listing(id, ModerationStatus::Rejected, reason)
    .await?;
  Ok(Json(listing))
}

/// `POST /admin/ads/:id/approve`
pub async fn approve_ad<S, G>(
  _auth: AdminAuth,
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Advertisement>, Error>
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  Ok(Json(state.directory.moderate_ad(id, AdStatus::Approved).await?))
}

/// `POST /admin/ads/:id/reject`
pub async fn reject_ad<S, G>(
  _auth: AdminAuth,
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Advertisement>, Error>
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  Ok(Json(state.directory.moderate_ad(id, AdStatus::Rejected).await?))
}

/// `POST /admin/ads/:id/activate`
pub async fn activate_ad<S, G>(
  _auth: AdminAuth,
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Advertisement>, Error>
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  Ok(Json(state.directory.set_ad_active(id, true).await?))
}

/// `POST /admin/ads/:id/deactivate`
pub async fn deactivate_ad<S, G>(
  _auth: AdminAuth,
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Advertisement>, Error>
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  Ok(Json(state.directory.set_ad_active(id, false).await?))
}

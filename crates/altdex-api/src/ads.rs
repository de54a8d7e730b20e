//! Handlers for `/ads` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/ads` | Body: [`NewAdvertisement`]; returns 201 + ad and payment order |
//! | `GET`  | `/ads/:ad_type` | Rotated eligible ads for one placement |
//! | `POST` | `/ads/:id/impression` | Returns 204 |
//! | `POST` | `/ads/:id/click` | Returns 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use altdex_core::{
  ad::{AdType, Advertisement, NewAdvertisement},
  payment::{PaymentGateway, PaymentOrder},
  store::DirectoryStore,
  Directory,
};

use crate::error::ApiError;

/// Response to `POST /ads`: the pending ad and the order to approve.
#[derive(Debug, Serialize)]
pub struct CreatedAd {
  pub ad:    Advertisement,
  pub order: PaymentOrder,
}

/// `POST /ads` — returns 201. The ad stays out of rotation until moderation
/// approves it and its payment capture arrives.
pub async fn create<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Json(body): Json<NewAdvertisement>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  let (ad, order) = dir.submit_ad(body).await?;
  Ok((StatusCode::CREATED, Json(CreatedAd { ad, order })))
}

/// `GET /ads/:ad_type` — eligible ads of one placement, ordered for this
/// page view. Empty pools return an empty array, not an error.
pub async fn rotation<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Path(ad_type): Path<AdType>,
) -> Result<Json<Vec<Advertisement>>, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  Ok(Json(dir.rotated_ads(ad_type).await?))
}

/// `POST /ads/:id/impression`
pub async fn impression<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  dir.record_impression(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /ads/:id/click`
pub async fn click<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  dir.record_click(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

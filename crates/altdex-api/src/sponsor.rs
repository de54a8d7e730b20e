//! Handlers for sponsor-slot endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sponsor/status` | Current slot capacity |
//! | `POST` | `/listings/:id/sponsor` | Body: [`ActingUser`]; creates an upgrade order |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use uuid::Uuid;

use altdex_core::{
  listing::ActingUser,
  payment::{PaymentGateway, PaymentOrder},
  sponsor::SponsorCapacity,
  store::DirectoryStore,
  Directory,
};

use crate::error::ApiError;

/// `GET /sponsor/status`
///
/// The answer is advisory; a slot reported free here can be taken by the
/// time an upgrade order settles.
pub async fn status<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
) -> Result<Json<SponsorCapacity>, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  Ok(Json(dir.sponsor_status().await?))
}

/// `POST /listings/:id/sponsor` — body identifies the acting user; returns
/// the created payment order with its approval URL.
pub async fn upgrade<S, G>(
  State(dir): State<Arc<Directory<S, G>>>,
  Path(id): Path<Uuid>,
  Json(acting): Json<ActingUser>,
) -> Result<Json<PaymentOrder>, ApiError>
where
  S: DirectoryStore,
  G: PaymentGateway,
{
  Ok(Json(dir.request_sponsor_upgrade(id, &acting).await?))
}

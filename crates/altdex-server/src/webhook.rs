//! Payment webhook ingestion.
//!
//! The gateway delivers capture results as `POST /webhooks/payment` with a
//! JSON [`PaymentNotice`] body. When a webhook secret is configured, the
//! request must carry an `x-webhook-signature` header holding
//! `hex(sha256(secret || body))` over the raw body bytes. Delivery is
//! at-least-once; replays settle as `*_already_active` with a 200 so the
//! gateway stops retrying.

use axum::{
  Json,
  extract::State,
  http::HeaderMap,
};
use bytes::Bytes;
use sha2::{Digest, Sha256};

use altdex_core::{
  directory::PaymentOutcome,
  payment::{PaymentGateway, PaymentNotice},
  store::DirectoryStore,
};

use crate::{AppState, error::Error};

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Compute the expected signature for `body` under `secret`.
pub fn webhook_signature(secret: &str, body: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(secret.as_bytes());
  hasher.update(body);
  hex::encode(hasher.finalize())
}

fn verify_signature(
  secret: &str,
  headers: &HeaderMap,
  body: &[u8],
) -> Result<(), Error> {
  let presented = headers
    .get(SIGNATURE_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::BadSignature)?;
  if presented != webhook_signature(secret, body) {
    return Err(Error::BadSignature);
  }
  Ok(())
}

/// `POST /webhooks/payment`
pub async fn handler<S, G>(
  State(state): State<AppState<S, G>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<PaymentOutcome>, Error>
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  if let Some(secret) = &state.config.webhook_secret {
    verify_signature(secret, &headers, &body)?;
  }

  let notice: PaymentNotice = serde_json::from_slice(&body)
    .map_err(|e| Error::BadRequest(format!("invalid notice body: {e}")))?;

  tracing::info!(
    order_ref = %notice.order_ref,
    status = ?notice.status,
    amount = ?notice.amount,
    "payment notice received",
  );

  let outcome = state.directory.apply_payment_notice(&notice).await?;
  Ok(Json(outcome))
}

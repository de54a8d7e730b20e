//! Payment gateway contract.
//!
//! Order creation is the only call the core makes against the gateway;
//! captures arrive out of band as webhook notices. An order that never
//! receives its capture leaves no stored mutation beyond the pending order
//! reference on the record that requested it.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// What an order is paying for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
  SponsorUpgrade,
  Advertisement,
}

/// Caller-supplied context attached to an order; gateways that support it
/// echo the description onto the buyer's invoice line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderMetadata {
  pub reference_id: Uuid,
  pub description:  String,
}

/// A created order awaiting buyer approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
  pub order_id:     String,
  pub approval_url: String,
}

/// Terminal result of a payment as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
  Captured,
  Failed,
}

/// An out-of-band confirmation delivered to the webhook endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotice {
  pub order_ref: String,
  pub status:    CaptureStatus,
  /// Opaque amount string as reported by the gateway; logged, never parsed.
  pub amount:    Option<String>,
}

#[derive(Debug, Error)]
pub enum PaymentError {
  /// Gateway could not be reached or returned a transport-level failure.
  #[error("payment gateway unavailable: {0}")]
  Unavailable(String),

  /// Gateway rejected the order request.
  #[error("payment order rejected: {0}")]
  Rejected(String),
}

/// Abstraction over an external order-creation service.
pub trait PaymentGateway: Send + Sync {
  fn create_order(
    &self,
    kind: PaymentKind,
    metadata: OrderMetadata,
  ) -> impl Future<Output = Result<PaymentOrder, PaymentError>> + Send + '_;
}

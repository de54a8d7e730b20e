//! Error taxonomy for `altdex-core`.
//!
//! Every [`Directory`](crate::Directory) operation returns these as typed
//! results; the API layer alone maps them to transport status codes.

use thiserror::Error;
use uuid::Uuid;

use crate::payment::PaymentError;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input; reported to the caller, never retried.
  #[error("validation error: {0}")]
  Validation(String),

  /// Acting identity does not own the target listing.
  #[error("user is not the owner of listing {listing_id}")]
  Unauthorized { listing_id: Uuid },

  /// Sponsor slot pool exhausted at request time. Distinguishable so the
  /// caller can present a waitlist/retry UX instead of a generic failure.
  #[error("sponsor capacity full: {current}/{max} slots taken")]
  CapacityFull { current: u32, max: u32 },

  /// Slug or repository collision on submission. Carries the conflicting
  /// listing id to support "claim this listing" flows.
  #[error("duplicate {field}: already taken by listing {existing_id}")]
  Duplicate {
    existing_id: Uuid,
    field:       &'static str,
  },

  /// Payment gateway unreachable or returned failure; no local state was
  /// mutated.
  #[error("payment error: {0}")]
  Payment(#[from] PaymentError),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

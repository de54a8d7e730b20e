//! JSON REST API for the altdex directory.
//!
//! Exposes an axum [`Router`] backed by any
//! [`altdex_core::store::DirectoryStore`] and
//! [`altdex_core::payment::PaymentGateway`] pair. Auth, webhook ingestion,
//! TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", altdex_api::api_router(directory.clone()))
//! ```

pub mod ads;
pub mod error;
pub mod feed;
pub mod listings;
pub mod sponsor;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use altdex_core::{payment::PaymentGateway, store::DirectoryStore, Directory};

pub use error::ApiError;

/// Build a fully-materialised API router for `directory`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, G>(directory: Arc<Directory<S, G>>) -> Router<()>
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  Router::new()
    // Listings
    .route(
      "/listings",
      get(listings::list::<S, G>).post(listings::create::<S, G>),
    )
    .route("/listings/{id}", get(listings::get_one::<S, G>))
    .route("/listings/by-slug/{slug}", get(listings::get_by_slug::<S, G>))
    // Sponsorship
    .route("/sponsor/status", get(sponsor::status::<S, G>))
    .route("/listings/{id}/sponsor", post(sponsor::upgrade::<S, G>))
    // Advertisements
    .route("/ads", post(ads::create::<S, G>))
    .route("/ads/{ad_type}", get(ads::rotation::<S, G>))
    .route("/ads/{id}/impression", post(ads::impression::<S, G>))
    .route("/ads/{id}/click", post(ads::click::<S, G>))
    // Feed
    .route("/feed", get(feed::handler::<S, G>))
    .with_state(directory)
}

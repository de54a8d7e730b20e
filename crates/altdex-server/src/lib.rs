//! HTTP server for the altdex directory.
//!
//! Mounts the public JSON API under `/api`, the payment webhook at
//! `/webhooks/payment`, and Basic-auth-gated moderation routes under
//! `/admin`, all backed by any [`DirectoryStore`] / [`PaymentGateway`] pair.

pub mod admin;
pub mod auth;
pub mod error;
pub mod gateway;
pub mod webhook;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::post};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use altdex_core::{
  directory::DirectoryOptions, payment::PaymentGateway, store::DirectoryStore,
  Directory,
};

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `ALTDEX_`-prefixed environment overrides.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub admin_username:      String,
  pub admin_password_hash: String,
  /// Shared secret for webhook signature verification. When unset,
  /// signatures are not checked; only do that behind a trusted proxy.
  pub webhook_secret:      Option<String>,
  pub payment_api_url:     Option<String>,
  pub payment_api_key:     Option<String>,
  pub max_sponsor_slots:   Option<u32>,
  pub card_interval:       Option<usize>,
}

impl ServerConfig {
  pub fn directory_options(&self) -> DirectoryOptions {
    let defaults = DirectoryOptions::default();
    DirectoryOptions {
      max_sponsor_slots: self.max_sponsor_slots.unwrap_or(defaults.max_sponsor_slots),
      card_interval:     self.card_interval.unwrap_or(defaults.card_interval),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the webhook and admin handlers.
pub struct AppState<S: DirectoryStore, G: PaymentGateway> {
  pub directory: Arc<Directory<S, G>>,
  pub config:    Arc<ServerConfig>,
  pub auth:      Arc<AuthConfig>,
}

impl<S: DirectoryStore, G: PaymentGateway> Clone for AppState<S, G> {
  fn clone(&self) -> Self {
    AppState {
      directory: Arc::clone(&self.directory),
      config:    Arc::clone(&self.config),
      auth:      Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full axum [`Router`] for the server.
pub fn router<S, G>(state: AppState<S, G>) -> Router
where
  S: DirectoryStore + 'static,
  G: PaymentGateway + 'static,
{
  let hooks = Router::new()
    .route("/webhooks/payment", post(webhook::handler::<S, G>))
    .with_state(state.clone());

  let admin = Router::new()
    .route("/listings/{id}/approve", post(admin::approve_listing::<S, G>))
    .route("/listings/{id}/reject", post(admin::reject_listing::<S, G>))
    .route("/ads/{id}/approve", post(admin::approve_ad::<S, G>))
    .route("/ads/{id}/reject", post(admin::reject_ad::<S, G>))
    .route("/ads/{id}/activate", post(admin::activate_ad::<S, G>))
    .route("/ads/{id}/deactivate", post(admin::deactivate_ad::<S, G>))
    .with_state(state.clone());

  Router::new()
    .nest("/api", altdex_api::api_router(Arc::clone(&state.directory)))
    .nest("/admin", admin)
    .merge(hooks)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

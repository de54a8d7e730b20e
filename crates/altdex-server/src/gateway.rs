//! HTTP payment gateway client.
//!
//! Talks to an external order-creation service over JSON. When no gateway is
//! configured the server still runs: every order request fails with
//! `Unavailable`, which surfaces as a 502 on the upgrade endpoints while the
//! rest of the directory keeps working.

use serde::Serialize;
use uuid::Uuid;

use altdex_core::payment::{
  OrderMetadata, PaymentError, PaymentGateway, PaymentKind, PaymentOrder,
};

/// Request body sent to the gateway's order endpoint.
#[derive(Serialize)]
struct OrderRequest<'a> {
  kind:         PaymentKind,
  reference_id: Uuid,
  description:  &'a str,
}

pub struct HttpGateway {
  client:   reqwest::Client,
  base_url: String,
  api_key:  String,
}

impl HttpGateway {
  pub fn new(base_url: String, api_key: String) -> Self {
    HttpGateway {
      client: reqwest::Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key,
    }
  }

  async fn create_order(
    &self,
    kind: PaymentKind,
    metadata: OrderMetadata,
  ) -> Result<PaymentOrder, PaymentError> {
    let body = OrderRequest {
      kind,
      reference_id: metadata.reference_id,
      description:  &metadata.description,
    };

    let resp = self
      .client
      .post(format!("{}/v1/orders", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| PaymentError::Unavailable(e.to_string()))?;

    if !resp.status().is_success() {
      return Err(PaymentError::Rejected(format!(
        "gateway returned {}",
        resp.status()
      )));
    }

    resp
      .json::<PaymentOrder>()
      .await
      .map_err(|e| PaymentError::Unavailable(e.to_string()))
  }
}

/// The gateway used by the server binary: a real HTTP client, or a stand-in
/// that refuses orders when no gateway is configured.
pub enum PaymentClient {
  Http(HttpGateway),
  Disabled,
}

impl PaymentClient {
  /// Build from optional config values; both must be present to enable.
  pub fn from_config(base_url: Option<String>, api_key: Option<String>) -> Self {
    match (base_url, api_key) {
      (Some(url), Some(key)) => PaymentClient::Http(HttpGateway::new(url, key)),
      _ => {
        tracing::warn!("no payment gateway configured; upgrade orders will fail");
        PaymentClient::Disabled
      }
    }
  }
}

impl PaymentGateway for PaymentClient {
  async fn create_order(
    &self,
    kind: PaymentKind,
    metadata: OrderMetadata,
  ) -> Result<PaymentOrder, PaymentError> {
    match self {
      PaymentClient::Http(gateway) => gateway.create_order(kind, metadata).await,
      PaymentClient::Disabled => Err(PaymentError::Unavailable(
        "no payment gateway configured".to_string(),
      )),
    }
  }
}

//! HTTP implementation of the media control API client.
//!
//! Maps control API responses onto [`MediaApiError`]: 404 becomes
//! `NotFound`, 400 becomes `Rejected` (or `Incompatible` when the body
//! carries the INCOMPATIBLE_CAPABILITIES code), and network failures or
//! 5xx become `Unavailable`.

use super::{MediaApi, MediaApiError};
use crate::config::Config;
use crate::observability::metrics;
use async_trait::async_trait;
use common::rtp::{DtlsParameters, RtpCapabilities, RtpParameters};
use common::types::{ConsumerInfo, MediaKind, ProducerInfo, RoomInfo, TransportDirection, TransportInfo};
use std::time::{Duration, Instant};

/// HTTP client for the media-engine control API.
pub struct HttpMediaClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMediaClient {
    /// Build the client from service configuration.
    pub fn new(config: &Config) -> Result<Self, MediaApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.media_api_timeout_seconds))
            .build()
            .map_err(|e| MediaApiError::Unavailable(format!("failed to build client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.media_api_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a POST with a JSON body and decode the expected response.
    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        op: &'static str,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, MediaApiError> {
        let start = Instant::now();
        let result = self.http.post(self.url(path)).json(&body).send().await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::record_media_call(op, "unavailable", start.elapsed());
                return Err(MediaApiError::Unavailable(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            metrics::record_media_call(op, "success", start.elapsed());
            return response
                .json::<T>()
                .await
                .map_err(|e| MediaApiError::Unavailable(format!("invalid response body: {e}")));
        }

        metrics::record_media_call(op, "error", start.elapsed());
        Err(error_from_response(status, response).await)
    }
}

/// Decode an error response body (`{error: {code, message}}`) into the
/// matching `MediaApiError` variant.
async fn error_from_response(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> MediaApiError {
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let code = body
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .unwrap_or("");
    let message = body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("media engine error")
        .to_string();

    match status.as_u16() {
        404 => MediaApiError::NotFound(message),
        400 if code == "INCOMPATIBLE_CAPABILITIES" => MediaApiError::Incompatible(message),
        400 => MediaApiError::Rejected(message),
        _ => MediaApiError::Unavailable(format!("media engine returned {status}: {message}")),
    }
}

#[async_trait]
impl MediaApi for HttpMediaClient {
    async fn create_room(&self, room_id: &str) -> Result<RoomInfo, MediaApiError> {
        self.post_json(
            "create_room",
            "/rooms",
            serde_json::json!({ "roomId": room_id }),
        )
        .await
    }

    async fn close_room(&self, room_id: &str) -> Result<(), MediaApiError> {
        let start = Instant::now();
        let result = self
            .http
            .delete(self.url(&format!("/rooms/{room_id}")))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::record_media_call("close_room", "unavailable", start.elapsed());
                return Err(MediaApiError::Unavailable(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            metrics::record_media_call("close_room", "success", start.elapsed());
            return Ok(());
        }

        metrics::record_media_call("close_room", "error", start.elapsed());
        Err(error_from_response(status, response).await)
    }

    async fn create_transport(
        &self,
        room_id: &str,
        direction: TransportDirection,
    ) -> Result<TransportInfo, MediaApiError> {
        self.post_json(
            "create_transport",
            &format!("/rooms/{room_id}/transports"),
            serde_json::json!({ "direction": direction }),
        )
        .await
    }

    async fn connect_transport(
        &self,
        room_id: &str,
        transport_id: &str,
        dtls_parameters: DtlsParameters,
    ) -> Result<(), MediaApiError> {
        let _: serde_json::Value = self
            .post_json(
                "connect_transport",
                &format!("/rooms/{room_id}/transports/{transport_id}/connect"),
                serde_json::json!({ "dtlsParameters": dtls_parameters }),
            )
            .await?;
        Ok(())
    }

    async fn create_producer(
        &self,
        room_id: &str,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
    ) -> Result<ProducerInfo, MediaApiError> {
        self.post_json(
            "create_producer",
            &format!("/rooms/{room_id}/producers"),
            serde_json::json!({
                "transportId": transport_id,
                "kind": kind,
                "rtpParameters": rtp_parameters,
            }),
        )
        .await
    }

    async fn create_consumer(
        &self,
        room_id: &str,
        transport_id: &str,
        producer_id: &str,
        rtp_capabilities: RtpCapabilities,
    ) -> Result<ConsumerInfo, MediaApiError> {
        self.post_json(
            "create_consumer",
            &format!("/rooms/{room_id}/consumers"),
            serde_json::json!({
                "transportId": transport_id,
                "producerId": producer_id,
                "rtpCapabilities": rtp_capabilities,
            }),
        )
        .await
    }
}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::QueryError;
use crate::model::{QueryKey, RawReadings};
use crate::slots::TimeSlot;

use super::ReadingsFetcher;

/// Adapter for the black-box location service behind `GET /location`.
///
/// The service takes the quantized coordinates and the slot timestamp as
/// query-string parameters and answers with Kelvin temperature plus wind
/// fields. Transport detail never leaves this module: callers see only
/// `QueryError` categories.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: String,
    http: Client,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: Client::new() }
    }

    async fn request(&self, key: &QueryKey) -> Result<RawReadings, QueryError> {
        let url = format!("{}/location", self.base_url.trim_end_matches('/'));

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", format!("{:.2}", key.latitude())),
                ("long", format!("{:.2}", key.longitude())),
                ("time", rfc1123(key.slot())),
            ])
            .send()
            .await
            .map_err(|err| {
                warn!(%err, "failed to reach location service");
                QueryError::Network
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            warn!(%err, "failed to read location service response body");
            QueryError::Network
        })?;

        if status == StatusCode::NOT_FOUND {
            debug!(key = %key, "location service has no reading for this key");
            return Err(QueryError::NoData);
        }

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "location service returned an error");
            return Err(QueryError::Network);
        }

        let parsed: LocationResponse = serde_json::from_str(&body).map_err(|err| {
            warn!(%err, body = %truncate_body(&body), "failed to parse location service JSON");
            QueryError::Network
        })?;

        Ok(RawReadings {
            temperature_k: parsed.temperature,
            wind_speed_mps: parsed.wind_speed,
            wind_direction_deg: parsed.wind_direction,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LocationResponse {
    /// Kelvin.
    temperature: f64,
    /// Meters per second.
    wind_speed: f64,
    /// Degrees, 0..360.
    wind_direction: f64,
}

#[async_trait]
impl ReadingsFetcher for HttpFetcher {
    async fn fetch(
        &self,
        key: &QueryKey,
        cancel: CancellationToken,
    ) -> Result<RawReadings, QueryError> {
        tokio::select! {
            () = cancel.cancelled() => Err(QueryError::Cancelled),
            res = self.request(key) => res,
        }
    }
}

/// RFC-1123-style timestamp the service expects in the `time` parameter.
fn rfc1123(slot: TimeSlot) -> String {
    slot.timestamp().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // Slicing at a fixed byte offset can land inside a multibyte
    // character; walk back to the nearest boundary.
    let mut cut = MAX;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &body[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::default_slot;

    #[test]
    fn slot_formats_as_rfc1123() {
        assert_eq!(rfc1123(default_slot()), "Wed, 01 Jan 2025 00:00:00 GMT");

        let five = TimeSlot::from_hour(5).expect("valid hour");
        assert_eq!(rfc1123(five), "Wed, 01 Jan 2025 05:00:00 GMT");
    }

    #[test]
    fn response_json_parses_service_units() {
        let body = r#"{"temperature": 300.0, "wind_speed": 3.5, "wind_direction": 271.0}"#;
        let parsed: LocationResponse = serde_json::from_str(body).expect("valid body");

        assert_eq!(parsed.temperature, 300.0);
        assert_eq!(parsed.wind_speed, 3.5);
        assert_eq!(parsed.wind_direction, 271.0);
    }

    #[test]
    fn long_bodies_are_clamped_for_logging() {
        let body = "x".repeat(500);
        let clamped = truncate_body(&body);
        assert_eq!(clamped.len(), 203);
        assert!(clamped.ends_with("..."));

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn clamp_respects_multibyte_boundaries() {
        // 100 three-byte characters: byte 200 falls inside the 67th one.
        let body = "€".repeat(100);
        let clamped = truncate_body(&body);

        assert!(clamped.ends_with("..."));
        assert_eq!(clamped, format!("{}...", "€".repeat(66)));

        // A body just over the limit with a multibyte tail must not panic
        // either.
        let mut tail = "x".repeat(199);
        tail.push_str("€€");
        assert!(truncate_body(&tail).ends_with("..."));
    }
}

//! Cal.com API client implementing the `SchedulingProvider` port.

use std::time::Duration;

use async_trait::async_trait;
use calbridge_core::SchedulingProvider;
use calbridge_domain::{
    AvailabilityWindow, BookingRequest, CalBridgeError, ProviderBooking, ProviderConfig, Result,
};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::types::{BookingBody, SlotsByDay, V2Envelope};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// The provider rejects bookings without an invitee email; local bookings
/// frequently only have a phone number.
const PLACEHOLDER_EMAIL: &str = "invitee@placeholder.invalid";

/// Cal.com client with transparent v2→v1 fallback.
pub struct CalComClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    default_timezone: String,
}

impl CalComClient {
    /// Create a new client from provider configuration.
    ///
    /// The inner HTTP client runs with a single attempt per call so the
    /// version fallback is the only retry a provider failure triggers.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(15))
            .max_attempts(1)
            .user_agent("calbridge")
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            default_timezone: config.default_timezone.clone(),
        })
    }

    fn timezone<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.filter(|tz| !tz.is_empty()).unwrap_or(&self.default_timezone)
    }

    /// Send a request and parse the body as JSON, treating any non-2xx
    /// status as a failure that carries the provider's error payload.
    async fn read_json(&self, builder: RequestBuilder, api: &str) -> Result<Value> {
        let response = self.http.send(builder).await?;
        let status = response.status();
        let body = response.text().await.map_err(InfraError::from)?;

        if !status.is_success() {
            return Err(CalBridgeError::Network(format!(
                "Cal.com {api} error ({status}): {body}"
            )));
        }

        serde_json::from_str(&body).map_err(|err| {
            CalBridgeError::Network(format!("failed to parse Cal.com {api} response: {err}"))
        })
    }

    async fn fetch_slots_v2(
        &self,
        event_type_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        time_zone: &str,
    ) -> Result<Vec<DateTime<Utc>>> {
        let url = format!("{}/v2/slots/available", self.base_url);
        let builder = self
            .http
            .request(Method::GET, &url)
            .bearer_auth(&self.api_key)
            .query(&[
                ("eventTypeId", event_type_id.to_string()),
                ("startTime", rfc3339(start)),
                ("endTime", rfc3339(end)),
                ("timeZone", time_zone.to_string()),
            ]);

        let body = self.read_json(builder, "v2 slots").await?;
        let envelope: V2Envelope<SlotsByDay> = serde_json::from_value(body).map_err(|err| {
            CalBridgeError::Network(format!("unexpected Cal.com v2 slots shape: {err}"))
        })?;
        Ok(parse_slot_times(&envelope.data))
    }

    async fn fetch_slots_v1(
        &self,
        event_type_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        time_zone: &str,
    ) -> Result<Vec<DateTime<Utc>>> {
        let url = format!("{}/v1/slots", self.base_url);
        let builder = self.http.request(Method::GET, &url).query(&[
            ("apiKey", self.api_key.clone()),
            ("eventTypeId", event_type_id.to_string()),
            ("startTime", rfc3339(start)),
            ("endTime", rfc3339(end)),
            ("timeZone", time_zone.to_string()),
        ]);

        let body = self.read_json(builder, "v1 slots").await?;
        let slots: SlotsByDay = serde_json::from_value(body).map_err(|err| {
            CalBridgeError::Network(format!("unexpected Cal.com v1 slots shape: {err}"))
        })?;
        Ok(parse_slot_times(&slots))
    }

    fn booking_payload(&self, event_type_id: i64, request: &BookingRequest) -> Value {
        let email =
            request.invitee.email.clone().unwrap_or_else(|| PLACEHOLDER_EMAIL.to_string());

        json!({
            "eventTypeId": event_type_id,
            "start": rfc3339(request.start_ts),
            "end": rfc3339(request.end_ts),
            "timeZone": self.timezone(request.time_zone.as_deref()),
            "language": "en",
            "metadata": {},
            "responses": {
                "name": request.invitee.name,
                "email": email,
                "phone": request.invitee.phone,
                "notes": request.notes,
            }
        })
    }

    async fn create_booking_v2(
        &self,
        event_type_id: i64,
        request: &BookingRequest,
    ) -> Result<ProviderBooking> {
        let url = format!("{}/v2/bookings", self.base_url);
        let builder = self
            .http
            .request(Method::POST, &url)
            .bearer_auth(&self.api_key)
            .json(&self.booking_payload(event_type_id, request));

        let body = self.read_json(builder, "v2 bookings").await?;
        let envelope: V2Envelope<BookingBody> =
            serde_json::from_value(body.clone()).map_err(|err| {
                CalBridgeError::Network(format!("unexpected Cal.com v2 booking shape: {err}"))
            })?;
        into_provider_booking(envelope.data, body)
    }

    async fn create_booking_v1(
        &self,
        event_type_id: i64,
        request: &BookingRequest,
    ) -> Result<ProviderBooking> {
        let url = format!("{}/v1/bookings", self.base_url);
        let builder = self
            .http
            .request(Method::POST, &url)
            .query(&[("apiKey", self.api_key.clone())])
            .json(&self.booking_payload(event_type_id, request));

        let body = self.read_json(builder, "v1 bookings").await?;
        let booking: BookingBody = serde_json::from_value(body.clone()).map_err(|err| {
            CalBridgeError::Network(format!("unexpected Cal.com v1 booking shape: {err}"))
        })?;
        into_provider_booking(booking, body)
    }
}

#[async_trait]
impl SchedulingProvider for CalComClient {
    async fn query_availability(
        &self,
        event_type_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        time_zone: Option<&str>,
    ) -> Result<AvailabilityWindow> {
        let tz = self.timezone(time_zone);

        let slots = match self.fetch_slots_v2(event_type_id, start, end, tz).await {
            Ok(slots) => slots,
            Err(v2_err) => {
                warn!(error = %v2_err, "v2 availability failed; retrying against v1");
                self.fetch_slots_v1(event_type_id, start, end, tz).await.map_err(|v1_err| {
                    CalBridgeError::Upstream(format!(
                        "availability query failed on both API versions; v2: {v2_err}; v1: {v1_err}"
                    ))
                })?
            }
        };

        // Exact-instant membership, not range containment: the caller asked
        // for a specific start, and adjacent slots are not a substitute.
        let available = slots.contains(&start);
        debug!(event_type_id, available, slot_count = slots.len(), "availability resolved");

        Ok(AvailabilityWindow { available, slots })
    }

    async fn create_booking(
        &self,
        event_type_id: i64,
        request: &BookingRequest,
    ) -> Result<ProviderBooking> {
        match self.create_booking_v2(event_type_id, request).await {
            Ok(booking) => Ok(booking),
            Err(v2_err) => {
                warn!(error = %v2_err, "v2 booking failed; retrying against v1");
                self.create_booking_v1(event_type_id, request).await.map_err(|v1_err| {
                    CalBridgeError::Upstream(format!(
                        "booking creation failed on both API versions; v2: {v2_err}; v1: {v1_err}"
                    ))
                })
            }
        }
    }
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_slot_times(slots: &SlotsByDay) -> Vec<DateTime<Utc>> {
    let mut times: Vec<DateTime<Utc>> = slots
        .slots
        .values()
        .flatten()
        .filter_map(|entry| {
            DateTime::parse_from_rfc3339(&entry.time).ok().map(|dt| dt.with_timezone(&Utc))
        })
        .collect();
    times.sort_unstable();
    times.dedup();
    times
}

fn into_provider_booking(body: BookingBody, raw: Value) -> Result<ProviderBooking> {
    let booking_id = body
        .uid
        .or_else(|| body.id.map(|id| id.to_string()))
        .ok_or_else(|| CalBridgeError::Network("Cal.com booking response carried no id".into()))?;

    Ok(ProviderBooking { booking_id, booking_url: body.booking_url, raw })
}

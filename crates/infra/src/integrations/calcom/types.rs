//! Serde shapes for the Cal.com v1 and v2 APIs.

use std::collections::HashMap;

use serde::Deserialize;

/// v2 responses wrap the payload in a `data` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct V2Envelope<T> {
    pub data: T,
}

/// Slot listing shared by both generations: candidate start instants grouped
/// by calendar day.
#[derive(Debug, Deserialize)]
pub(crate) struct SlotsByDay {
    #[serde(default)]
    pub slots: HashMap<String, Vec<SlotEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlotEntry {
    pub time: String,
}

/// Booking body shared by both generations; v1 returns it bare, v2 inside
/// the envelope. The uid is preferred; older v1 accounts only return the
/// numeric id.
#[derive(Debug, Deserialize)]
pub(crate) struct BookingBody {
    pub uid: Option<String>,
    pub id: Option<i64>,
    #[serde(rename = "bookingUrl")]
    pub booking_url: Option<String>,
}

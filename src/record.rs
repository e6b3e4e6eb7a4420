use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Whether a record is still open, derived from its start time.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Open,
    Closed,
}

impl Status {
    /// A record is open only while its start time is strictly in the
    /// future relative to `evaluated_at`.
    pub fn at(advertised_start_time: OffsetDateTime, evaluated_at: OffsetDateTime) -> Self {
        if advertised_start_time > evaluated_at {
            Status::Open
        } else {
            Status::Closed
        }
    }
}

/// A single race or sport event.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Record {
    /// The ID of the record.
    pub id: u64,

    /// The meeting (parent group) the record belongs to.
    pub meeting_id: u64,

    pub name: String,

    /// Position within the meeting.
    pub number: i64,

    /// Whether the record should be shown in general listings.
    pub visible: bool,

    #[serde(with = "time::serde::rfc3339")]
    pub advertised_start_time: OffsetDateTime,

    /// Never stored; recomputed on every read.
    pub status: Status,
}

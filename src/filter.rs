use serde::{Deserialize, Serialize};

/// Restricts and orders a listing. Every field is optional on the wire.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ListFilter {
    /// Only records belonging to one of these meetings. Empty means
    /// no restriction.
    pub meeting_ids: Vec<u64>,

    /// Only records flagged as visible.
    pub visible_only: bool,

    /// Name of the field to sort by, ascending. Unknown names fall back
    /// to the advertised start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by_field_name: Option<String>,
}

impl ListFilter {
    pub fn sort_field(&self) -> SortField {
        SortField::parse(self.sort_by_field_name.as_deref())
    }
}

/// The fields a listing can be sorted by.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortField {
    Id,
    MeetingId,
    Name,
    Number,
    Visible,
    AdvertisedStartTime,
}

impl SortField {
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            Some("id") => SortField::Id,
            Some("meeting_id") | Some("parent_group_id") => SortField::MeetingId,
            Some("name") => SortField::Name,
            Some("number") | Some("sequence_number") => SortField::Number,
            Some("visible") => SortField::Visible,
            _ => SortField::AdvertisedStartTime,
        }
    }
}

impl Default for SortField {
    fn default() -> Self {
        SortField::AdvertisedStartTime
    }
}

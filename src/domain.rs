//! Per-domain descriptors. Everything that differs between races and
//! sports lives here; the query engine, repository and service are
//! shared.

use crate::filter::SortField;

/// Column names of a domain's table.
#[derive(Clone, Copy, Debug)]
pub struct Columns {
    pub id: &'static str,
    pub meeting_id: &'static str,
    pub name: &'static str,
    pub number: &'static str,
    pub visible: &'static str,
    pub advertised_start_time: &'static str,
}

impl Columns {
    /// The projection used by every read, in row order.
    pub fn all(&self) -> [&'static str; 6] {
        [
            self.id,
            self.meeting_id,
            self.name,
            self.number,
            self.visible,
            self.advertised_start_time,
        ]
    }

    /// Maps a sort field onto its column. Only ever returns one of the
    /// names above, so it is safe to splice into SQL.
    pub fn for_sort_field(&self, field: SortField) -> &'static str {
        match field {
            SortField::Id => self.id,
            SortField::MeetingId => self.meeting_id,
            SortField::Name => self.name,
            SortField::Number => self.number,
            SortField::Visible => self.visible,
            SortField::AdvertisedStartTime => self.advertised_start_time,
        }
    }
}

const COLUMNS: Columns = Columns {
    id: "id",
    meeting_id: "meeting_id",
    name: "name",
    number: "number",
    visible: "visible",
    advertised_start_time: "advertised_start_time",
};

/// Describes one catalog: where it is stored, what its RPC methods are
/// called and how it is addressed.
#[derive(Debug)]
pub struct Domain {
    /// Short name used in logs and configuration.
    pub name: &'static str,

    pub table: &'static str,
    pub columns: Columns,

    /// RPC service path, e.g. `racing.Racing`.
    pub service: &'static str,
    pub get_method: &'static str,
    pub list_method: &'static str,

    /// JSON key wrapping a single record in responses.
    pub record_key: &'static str,
    /// JSON key wrapping a list of records in responses.
    pub records_key: &'static str,

    /// Gateway path segment for single-record fetches (`/v1/<path>/<id>`).
    pub gateway_path: &'static str,
    /// Gateway path segment for listing (`/v1/<path>`).
    pub gateway_list_path: &'static str,

    pub address_variable: &'static str,
    pub default_address: &'static str,
    pub database_variable: &'static str,
    pub default_database: &'static str,
}

impl Domain {
    /// The base `SELECT` every read starts from.
    pub fn select(&self) -> String {
        format!("SELECT {} FROM {}", self.columns.all().join(", "), self.table)
    }

    /// Looks a domain up by its short name. Used by the `seed` helper to
    /// parse its command line.
    pub fn by_name(name: &str) -> Option<&'static Domain> {
        DOMAINS.iter().copied().find(|domain| domain.name == name)
    }
}

pub static RACING: Domain = Domain {
    name: "racing",
    table: "races",
    columns: COLUMNS,
    service: "racing.Racing",
    get_method: "GetRace",
    list_method: "ListRaces",
    record_key: "race",
    records_key: "races",
    gateway_path: "races",
    gateway_list_path: "list-races",
    address_variable: "LISTINGS_RACING_ADDRESS",
    default_address: "127.0.0.1:9000",
    database_variable: "LISTINGS_RACING_DB",
    default_database: "sqlite:racing.db",
};

pub static SPORTS: Domain = Domain {
    name: "sports",
    table: "sports",
    columns: COLUMNS,
    service: "sport.Sports",
    get_method: "GetSport",
    list_method: "ListSports",
    record_key: "sport",
    records_key: "sports",
    gateway_path: "sports",
    gateway_list_path: "list-sports",
    address_variable: "LISTINGS_SPORTS_ADDRESS",
    default_address: "127.0.0.1:5000",
    database_variable: "LISTINGS_SPORTS_DB",
    default_database: "sqlite:sports.db",
};

pub static DOMAINS: [&Domain; 2] = [&RACING, &SPORTS];

use std::sync::Arc;

use thiserror::Error;

/// Enumerates errors returned while preparing a repository.
///
/// Cloneable so that every caller waiting on the same initialization
/// receives the same outcome.
#[derive(Clone, Debug, Error)]
pub enum InitError {
    /// Represents a failure to create the table.
    #[error("could not create table `{table}`")]
    Schema {
        table: &'static str,
        source: Arc<sqlx::Error>,
    },

    /// Represents a failure to insert the seed rows.
    #[error("could not seed table `{table}`")]
    Seed {
        table: &'static str,
        source: Arc<sqlx::Error>,
    },
}

/// Enumerates errors returned by repository reads.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a row that did not have the expected shape.
    #[error("could not decode row")]
    Decode {
        #[from]
        source: DecodeError,
    },
}

/// Enumerates ways in which a row can fail to map onto a record.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Represents a column whose value could not be read as the
    /// expected type.
    #[error("could not decode column `{column}`")]
    Column {
        column: &'static str,
        source: sqlx::Error,
    },

    /// Represents an identifier column holding a negative value.
    #[error("column `{column}` holds out-of-range value {value}")]
    OutOfRange { column: &'static str, value: i64 },
}

/// Enumerates high-level errors surfaced over HTTP.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Represents a failed repository read.
    #[error("{source}")]
    Query {
        #[from]
        source: QueryError,
    },

    /// Represents a listing service that could not be reached.
    #[error("{domain} service is unreachable")]
    Unreachable {
        domain: &'static str,
        source: reqwest::Error,
    },

    /// Represents an error reported by a listing service.
    #[error("{domain} service failed with status {status}: {message}")]
    Upstream {
        domain: &'static str,
        status: u16,
        message: String,
    },

    /// Represents a listing service response that could not be parsed.
    #[error("malformed response from {domain} service")]
    MalformedResponse {
        domain: &'static str,
        source: reqwest::Error,
    },

    /// Represents a listing service response without the expected field.
    #[error("response from {domain} service is missing `{field}`")]
    MissingField {
        domain: &'static str,
        field: &'static str,
    },
}

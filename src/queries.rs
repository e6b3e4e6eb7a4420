//! Builds the SQL sent to the store. Values supplied by callers are
//! always bound as parameters; only names taken from a [`Domain`]
//! descriptor are spliced into the text.

use std::str::FromStr;

use crate::domain::Domain;
use crate::filter::{ListFilter, SortField};

/// How to order records whose sort keys are equal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TieBreak {
    /// Leave ties in whatever order the store returns them.
    StoreDefined,
    /// Order ties by ascending ID.
    Id,
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::Id
    }
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(TieBreak::StoreDefined),
            "id" => Ok(TieBreak::Id),
            _ => Err(format!("unknown tie-break `{}`", s)),
        }
    }
}

/// A query together with its positional arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub arguments: Vec<i64>,
}

/// Returns a query to list a domain's records.
pub fn list(domain: &Domain, filter: Option<&ListFilter>, tie_break: TieBreak) -> Statement {
    build(domain.select(), domain, filter, tie_break)
}

/// Returns a query to retrieve a single record by ID. The ID is bound
/// as the only parameter.
pub fn retrieval(domain: &Domain) -> String {
    format!("{} WHERE {} = ?", domain.select(), domain.columns.id)
}

/// Returns a query to count a domain's records.
pub fn count(domain: &Domain) -> String {
    format!("SELECT COUNT(*) FROM {}", domain.table)
}

/// Returns a query to create a domain's table if it doesn't exist.
pub fn creation(domain: &Domain) -> String {
    let c = &domain.columns;

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({} INTEGER PRIMARY KEY, {} INTEGER NOT NULL, {} TEXT NOT NULL, {} INTEGER NOT NULL, {} BOOLEAN NOT NULL, {} DATETIME NOT NULL)",
        domain.table, c.id, c.meeting_id, c.name, c.number, c.visible, c.advertised_start_time
    )
}

/// Returns a query to insert a record; the store assigns the ID.
pub fn insertion(domain: &Domain) -> String {
    let c = &domain.columns;

    format!(
        "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
        domain.table, c.meeting_id, c.name, c.number, c.visible, c.advertised_start_time
    )
}

/// Appends the filter's predicate and ordering to `query`.
///
/// An absent filter adds no predicate and no arguments but still orders
/// by the default field.
pub fn build(
    mut query: String,
    domain: &Domain,
    filter: Option<&ListFilter>,
    tie_break: TieBreak,
) -> Statement {
    let columns = &domain.columns;
    let mut clauses: Vec<String> = vec![];
    let mut arguments: Vec<i64> = vec![];

    if let Some(filter) = filter {
        if !filter.meeting_ids.is_empty() {
            // IDs beyond i64::MAX can't be stored, so they can never
            // match; dropping them must not widen the restriction
            arguments.extend(
                filter
                    .meeting_ids
                    .iter()
                    .filter_map(|&id| i64::try_from(id).ok()),
            );

            if arguments.is_empty() {
                clauses.push("FALSE".to_owned());
            } else {
                clauses.push(format!(
                    "{} IN ({})",
                    columns.meeting_id,
                    vec!["?"; arguments.len()].join(", ")
                ));
            }
        }

        if filter.visible_only {
            clauses.push(format!("{} IS TRUE", columns.visible));
        }
    }

    if !clauses.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&clauses.join(" AND "));
    }

    let sort_field = filter.map(ListFilter::sort_field).unwrap_or_default();
    let column = columns.for_sort_field(sort_field);

    query.push_str(" ORDER BY ");
    query.push_str(column);

    if tie_break == TieBreak::Id && sort_field != SortField::Id {
        query.push_str(", ");
        query.push_str(columns.id);
    }

    Statement {
        sql: query,
        arguments,
    }
}

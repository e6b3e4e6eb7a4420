//! Creates a domain's table and fills it with generated records the
//! first time it is found empty.

use std::sync::Arc;

use log::{debug, info, Logger};
use rand::Rng;
use sqlx::sqlite::SqlitePool;
use time::format_description::well_known::Iso8601;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::domain::Domain;
use crate::errors::InitError;
use crate::queries;

const PLACES: &[&str] = &[
    "Ascot", "Bendigo", "Caulfield", "Doomben", "Eagle Farm", "Flemington", "Gosford",
    "Hawkesbury", "Ipswich", "Kembla", "Launceston", "Moonee Valley", "Newcastle", "Randwick",
    "Sandown", "Warrnambool",
];

const EVENTS: &[&str] = &[
    "Cup", "Classic", "Derby", "Handicap", "Guineas", "Mile", "Plate", "Sprint", "Stakes",
    "Trophy",
];

/// The widest distance between now and a generated start time.
const START_TIME_SPREAD: Duration = Duration::days(2);

/// A record to insert; the store assigns its ID.
#[derive(Clone, Debug)]
pub struct NewRecord {
    pub meeting_id: i64,
    pub name: String,
    pub number: i64,
    pub visible: bool,
    pub advertised_start_time: OffsetDateTime,
}

pub(crate) async fn initialize(
    pool: SqlitePool,
    domain: &'static Domain,
    count: u32,
    logger: Arc<Logger>,
) -> Result<(), InitError> {
    let table = domain.table;

    debug!(logger, "Creating table...");
    sqlx::query(&queries::creation(domain))
        .execute(&pool)
        .await
        .map_err(|e| InitError::Schema {
            table,
            source: Arc::new(e),
        })?;

    let seed_error = |e| InitError::Seed {
        table,
        source: Arc::new(e),
    };

    let (existing,): (i64,) = sqlx::query_as(&queries::count(domain))
        .fetch_one(&pool)
        .await
        .map_err(seed_error)?;

    if existing > 0 {
        info!(logger, "Table already populated, skipping seed"; "rows" => existing);
        return Ok(());
    }

    let records = generate(count, OffsetDateTime::now_utc());

    debug!(logger, "Seeding table..."; "rows" => records.len());
    insert(&pool, domain, &records).await.map_err(seed_error)?;
    info!(logger, "Seeded table"; "rows" => records.len());

    Ok(())
}

/// Inserts `records` in a single transaction.
pub async fn insert(
    pool: &SqlitePool,
    domain: &Domain,
    records: &[NewRecord],
) -> Result<(), sqlx::Error> {
    let sql = queries::insertion(domain);
    let mut transaction = pool.begin().await?;

    for record in records {
        let advertised_start_time = stored_time(record.advertised_start_time)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(&sql)
            .bind(record.meeting_id)
            .bind(record.name.as_str())
            .bind(record.number)
            .bind(record.visible)
            .bind(advertised_start_time)
            .execute(&mut *transaction)
            .await?;
    }

    transaction.commit().await
}

/// Renders a start time as UTC with all nine fractional digits, so that
/// stored values have a fixed width and compare as text in
/// chronological order.
pub(crate) fn stored_time(at: OffsetDateTime) -> Result<String, time::error::Format> {
    at.to_offset(UtcOffset::UTC).format(&Iso8601::DEFAULT)
}

/// Generates `count` records spread over ten meetings, starting within
/// two days either side of `now`.
pub fn generate(count: u32, now: OffsetDateTime) -> Vec<NewRecord> {
    let mut rng = rand::thread_rng();
    let spread = START_TIME_SPREAD.whole_seconds();

    (0..count)
        .map(|_| {
            let place = PLACES[rng.gen_range(0..PLACES.len())];
            let event = EVENTS[rng.gen_range(0..EVENTS.len())];

            NewRecord {
                meeting_id: rng.gen_range(1..=10),
                name: format!("{} {}", place, event),
                number: rng.gen_range(1..=12),
                visible: rng.gen_bool(0.5),
                advertised_start_time: now + Duration::seconds(rng.gen_range(-spread..=spread)),
            }
        })
        .collect()
}

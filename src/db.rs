use futures::future::BoxFuture;

use crate::errors::{InitError, QueryError};
use crate::filter::ListFilter;
use crate::record::Record;

#[cfg(test)]
pub(crate) mod mock;
pub mod seed;

/// Read access to one domain's records.
pub trait Repository {
    /// Prepares the store. Only the first call does any work; every
    /// caller observes that call's outcome.
    fn init(&self) -> BoxFuture<Result<(), InitError>>;

    /// Returns the record with the given ID, or `None` if there is none.
    fn get_by_id(&self, id: u64) -> BoxFuture<Result<Option<Record>, QueryError>>;

    /// Returns every record matching `filter`, in the order it asks for.
    fn list(&self, filter: Option<ListFilter>) -> BoxFuture<Result<Vec<Record>, QueryError>>;
}

pub use self::sqlite::*;

mod sqlite {
    use std::str::FromStr;
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use log::{debug, o, trace, Logger};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
    use sqlx::{self, Row, Sqlite};
    use time::OffsetDateTime;

    use super::seed;
    use crate::domain::{Columns, Domain};
    use crate::environment::Config;
    use crate::errors::{DecodeError, InitError, QueryError};
    use crate::filter::ListFilter;
    use crate::init::Initializer;
    use crate::queries;
    use crate::record::{Record, Status};

    /// Opens a pool on the given database, creating the file if needed.
    pub async fn connect(connection_string: &str) -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(connection_string)?.create_if_missing(true);

        SqlitePoolOptions::new().connect_with(options).await
    }

    /// Opens a pool on a private in-memory database. The pool keeps its
    /// single connection alive, since closing it discards the data.
    pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
    }

    pub struct SqliteRepository {
        domain: &'static Domain,
        pool: SqlitePool,
        config: Config,
        initializer: Initializer,
        logger: Arc<Logger>,
    }

    impl SqliteRepository {
        pub fn new(
            domain: &'static Domain,
            pool: SqlitePool,
            config: Config,
            logger: Arc<Logger>,
        ) -> Self {
            SqliteRepository {
                domain,
                pool,
                initializer: Initializer::new(config.init_policy),
                config,
                logger: Arc::new(logger.new(o!("table" => domain.table))),
            }
        }

        pub fn domain(&self) -> &'static Domain {
            self.domain
        }

        #[cfg(test)]
        pub(crate) fn pool(&self) -> &SqlitePool {
            &self.pool
        }
    }

    impl super::Repository for SqliteRepository {
        fn init(&self) -> BoxFuture<Result<(), InitError>> {
            let pool = self.pool.clone();
            let domain = self.domain;
            let count = self.config.seed_count;
            let logger = self.logger.clone();

            self.initializer
                .run(move || seed::initialize(pool, domain, count, logger).boxed())
                .boxed()
        }

        fn get_by_id(&self, id: u64) -> BoxFuture<Result<Option<Record>, QueryError>> {
            async move {
                // nothing larger than i64::MAX can be stored
                let id = match i64::try_from(id) {
                    Ok(id) => id,
                    Err(_) => return Ok(None),
                };

                let sql = queries::retrieval(self.domain);
                trace!(self.logger, "Retrieving record..."; "sql" => &sql, "id" => id);

                let evaluated_at = OffsetDateTime::now_utc();
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                let record = row
                    .map(|row| map_row(&row, &self.domain.columns, evaluated_at))
                    .transpose()?;

                Ok(record)
            }
            .boxed()
        }

        fn list(&self, filter: Option<ListFilter>) -> BoxFuture<Result<Vec<Record>, QueryError>> {
            async move {
                let statement = queries::list(self.domain, filter.as_ref(), self.config.tie_break);
                trace!(self.logger, "Listing records..."; "sql" => &statement.sql, "arguments" => ?statement.arguments);

                let query = statement
                    .arguments
                    .iter()
                    .fold(sqlx::query(&statement.sql), |query, argument| {
                        query.bind(*argument)
                    });

                let evaluated_at = OffsetDateTime::now_utc();
                let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
                let records = map_rows(&rows, &self.domain.columns, evaluated_at)?;

                debug!(self.logger, "Listed records"; "count" => records.len());

                Ok(records)
            }
            .boxed()
        }
    }

    /// Maps every row, all against the same evaluation time. The first
    /// row that fails to decode fails the whole batch.
    pub fn map_rows(
        rows: &[SqliteRow],
        columns: &Columns,
        evaluated_at: OffsetDateTime,
    ) -> Result<Vec<Record>, DecodeError> {
        rows.iter()
            .map(|row| map_row(row, columns, evaluated_at))
            .collect()
    }

    pub fn map_row(
        row: &SqliteRow,
        columns: &Columns,
        evaluated_at: OffsetDateTime,
    ) -> Result<Record, DecodeError> {
        let advertised_start_time: OffsetDateTime = try_get(row, columns.advertised_start_time)?;

        Ok(Record {
            id: try_get_unsigned(row, columns.id)?,
            meeting_id: try_get_unsigned(row, columns.meeting_id)?,
            name: try_get(row, columns.name)?,
            number: try_get(row, columns.number)?,
            visible: try_get(row, columns.visible)?,
            advertised_start_time,
            status: Status::at(advertised_start_time, evaluated_at),
        })
    }

    fn try_get<'a, T: sqlx::Type<Sqlite> + sqlx::decode::Decode<'a, Sqlite>>(
        row: &'a SqliteRow,
        column: &'static str,
    ) -> Result<T, DecodeError> {
        row.try_get(column)
            .map_err(|source| DecodeError::Column { column, source })
    }

    fn try_get_unsigned(row: &SqliteRow, column: &'static str) -> Result<u64, DecodeError> {
        let value: i64 = try_get(row, column)?;

        u64::try_from(value).map_err(|_| DecodeError::OutOfRange { column, value })
    }

    fn map_sqlx_error(error: sqlx::Error) -> QueryError {
        QueryError::Sqlx { source: error }
    }
}

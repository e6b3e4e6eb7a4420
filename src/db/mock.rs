use std::sync::Mutex;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::db::Repository;
use crate::errors::{InitError, QueryError};
use crate::filter::ListFilter;
use crate::record::Record;

/// A repository that serves fixed records and remembers what it was
/// asked for.
#[derive(Default)]
pub(crate) struct MockRepository {
    records: Vec<Record>,
    failing: bool,
    pub(crate) filters: Mutex<Vec<Option<ListFilter>>>,
}

impl MockRepository {
    pub fn new(records: Vec<Record>) -> Self {
        MockRepository {
            records,
            ..Default::default()
        }
    }

    /// A repository whose reads all fail.
    pub fn failing() -> Self {
        MockRepository {
            failing: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), QueryError> {
        if self.failing {
            Err(QueryError::Sqlx {
                source: sqlx::Error::PoolClosed,
            })
        } else {
            Ok(())
        }
    }
}

impl Repository for MockRepository {
    fn init(&self) -> BoxFuture<Result<(), InitError>> {
        async { Ok(()) }.boxed()
    }

    fn get_by_id(&self, id: u64) -> BoxFuture<Result<Option<Record>, QueryError>> {
        async move {
            self.check()?;

            Ok(self.records.iter().find(|r| r.id == id).cloned())
        }
        .boxed()
    }

    fn list(&self, filter: Option<ListFilter>) -> BoxFuture<Result<Vec<Record>, QueryError>> {
        async move {
            self.filters.lock().unwrap().push(filter);
            self.check()?;

            Ok(self.records.clone())
        }
        .boxed()
    }
}

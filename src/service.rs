use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::Repository;
use crate::domain::Domain;
use crate::errors::QueryError;
use crate::filter::ListFilter;
use crate::record::Record;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GetRequest {
    pub id: u64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ListRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ListFilter>,
}

#[derive(Clone, Debug)]
pub struct GetResponse {
    pub record: Option<Record>,
}

#[derive(Clone, Debug)]
pub struct ListResponse {
    pub records: Vec<Record>,
}

/// Answers RPC calls for one domain by delegating to its repository.
pub struct ListingService {
    domain: &'static Domain,
    repository: Arc<dyn Repository + Send + Sync>,
}

impl ListingService {
    pub fn new(domain: &'static Domain, repository: Arc<dyn Repository + Send + Sync>) -> Self {
        Self { domain, repository }
    }

    pub fn domain(&self) -> &'static Domain {
        self.domain
    }

    pub async fn get_one(&self, request: GetRequest) -> Result<GetResponse, QueryError> {
        let record = self.repository.get_by_id(request.id).await?;

        Ok(GetResponse { record })
    }

    pub async fn list_many(&self, request: ListRequest) -> Result<ListResponse, QueryError> {
        let records = self.repository.list(request.filter).await?;

        Ok(ListResponse { records })
    }
}

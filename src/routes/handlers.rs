use log::debug;
use warp::reply::json;

use super::rejection::{Context, Rejection};
use super::response::Keyed;
use super::RouteResult;
use crate::environment::Environment;
use crate::service::{GetRequest, ListRequest};

pub async fn get_one(environment: Environment, request: GetRequest) -> RouteResult {
    timed! {
        let Environment { logger, service } = environment;
        let domain = service.domain();
        let id = request.id;

        debug!(logger, "Retrieving record..."; "id" => id);

        let response = service
            .get_one(request)
            .await
            .map_err(|e| Rejection::reject(Context::get(domain.name, id), e))?;

        json(&Keyed::new(domain.record_key, &response.record))
    }
}

pub async fn list_many(environment: Environment, request: ListRequest) -> RouteResult {
    timed! {
        let Environment { logger, service } = environment;
        let domain = service.domain();

        debug!(logger, "Listing records..."; "filter" => ?request.filter);

        let response = service
            .list_many(request)
            .await
            .map_err(|e| Rejection::reject(Context::list(domain.name), e))?;

        debug!(logger, "Listed records"; "count" => response.records.len());

        json(&Keyed::new(domain.records_key, &response.records))
    }
}

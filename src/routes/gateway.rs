//! Routes of the HTTP gateway, forwarding to the listing services.

use log::debug;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::path::end;
use warp::reply::{json, with_status};
use warp::{body, get as g, path as p, path::param as par, post, Filter, Reply};

use super::rejection::{Context, Rejection};
use super::response::Keyed;
use super::{RouteResult, MAX_CONTENT_LENGTH};
use crate::environment::Upstream;
use crate::service::ListRequest;

type Route = BoxedFilter<(Box<dyn Reply>,)>;

/// `GET /v1/<records>/<id>`
pub fn make_get_route(upstream: Upstream) -> Route {
    let domain = upstream.client.domain();

    warp::any()
        .map(move || upstream.clone())
        .and(p("v1"))
        .and(p(domain.gateway_path))
        .and(par::<u64>())
        .and(end())
        .and(g())
        .and_then(get)
        .boxed()
}

/// `POST /v1/list-<records>`
pub fn make_list_route(upstream: Upstream) -> Route {
    let domain = upstream.client.domain();

    warp::any()
        .map(move || upstream.clone())
        .and(p("v1"))
        .and(p(domain.gateway_list_path))
        .and(end())
        .and(post())
        .and(body::content_length_limit(MAX_CONTENT_LENGTH))
        .and(body::json())
        .and_then(list)
        .boxed()
}

async fn get(upstream: Upstream, id: u64) -> RouteResult {
    timed! {
        let Upstream { logger, client } = upstream;
        let domain = client.domain();

        debug!(logger, "Forwarding retrieval..."; "domain" => domain.name, "id" => id);

        let record = client
            .get_one(id)
            .await
            .map_err(|e| Rejection::reject(Context::get(domain.name, id), e))?;

        match record {
            Some(record) => with_status(
                json(&Keyed::new(domain.record_key, &record)),
                StatusCode::OK,
            ),
            None => with_status(json(&()), StatusCode::NOT_FOUND),
        }
    }
}

async fn list(upstream: Upstream, request: ListRequest) -> RouteResult {
    timed! {
        let Upstream { logger, client } = upstream;
        let domain = client.domain();

        debug!(logger, "Forwarding listing..."; "domain" => domain.name, "filter" => ?request.filter);

        let records = client
            .list_many(&request)
            .await
            .map_err(|e| Rejection::reject(Context::list(domain.name), e))?;

        json(&Keyed::new(domain.records_key, &records))
    }
}

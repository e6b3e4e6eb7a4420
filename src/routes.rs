use std::sync::Arc;
use std::time::Duration;

use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::{Environment, Upstream};
use crate::errors::ListingError;

const SERVER_TIMING_HEADER: &str = "server-timing";

/// The largest request body accepted. Requests only carry an ID or a
/// filter, so this is generous.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = ::std::time::Instant::now();

        let result = { $($expression)+ };

        Ok(Box::new(::warp::reply::with_header(
            result,
            $crate::routes::SERVER_TIMING_HEADER,
            $crate::routes::format_server_timing(start.elapsed()),
        )) as Box<dyn ::warp::reply::Reply>)
    };
}

pub mod admin;
pub mod gateway;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// Every route served by a listing service.
pub fn listing_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + Send + Sync + 'static
{
    let logger = environment.logger.clone();

    make_get_route(environment.clone())
        .or(make_list_route(environment))
        .or(admin::make_healthz_route())
        .recover(move |r| format_rejection(logger.clone(), r))
}

/// Every route served by the gateway.
pub fn gateway_routes(
    racing: Upstream,
    sports: Upstream,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + Send + Sync + 'static
{
    let logger = racing.logger.clone();

    gateway::make_get_route(racing.clone())
        .or(gateway::make_list_route(racing))
        .or(gateway::make_get_route(sports.clone()))
        .or(gateway::make_list_route(sports))
        .or(admin::make_healthz_route())
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Listing error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    Err(rej)
}

fn status_code_for(e: &ListingError) -> StatusCode {
    match e {
        ListingError::Query { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ListingError::Upstream { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        ListingError::Unreachable { .. }
        | ListingError::MalformedResponse { .. }
        | ListingError::MissingField { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn format_server_timing(elapsed: Duration) -> String {
    format!("handler;dur={}", elapsed.as_secs_f64() * 1000.0)
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{body, path as p, post};

    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route {
        ($name:ident => $handler:ident, $method:ident) => (
            pub fn $name(environment: Environment) -> Route {
                let domain = environment.service.domain();

                warp::any()
                    .map(move || environment.clone())
                    .and(p(domain.service))
                    .and(p(domain.$method))
                    .and(end())
                    .and(post())
                    .and(body::content_length_limit(MAX_CONTENT_LENGTH))
                    .and(body::json())
                    .and_then(handlers::$handler)
                    .boxed()
            }
        );
    }

    route!(make_get_route => get_one, get_method);
    route!(make_list_route => list_many, list_method);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QueryError;

    #[test]
    fn store_failures_are_server_errors() {
        let error = ListingError::from(QueryError::Sqlx {
            source: sqlx::Error::PoolClosed,
        });

        assert_eq!(status_code_for(&error), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_statuses_are_preserved() {
        let error = ListingError::Upstream {
            domain: "racing",
            status: 503,
            message: "unavailable".to_owned(),
        };

        assert_eq!(status_code_for(&error), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn broken_upstream_responses_are_bad_gateways() {
        let error = ListingError::MissingField {
            domain: "sports",
            field: "sports",
        };

        assert_eq!(status_code_for(&error), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn server_timing_is_in_milliseconds() {
        assert_eq!(
            format_server_timing(Duration::from_millis(250)),
            "handler;dur=250"
        );
    }
}

//! Process entry points shared by the binaries.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, initialize_logger, o, Logger};

use crate::client::ListingClient;
use crate::config::{get_variable_or, parse_variable_or};
use crate::db::{connect, Repository, SqliteRepository};
use crate::domain::{Domain, RACING, SPORTS};
use crate::environment::{Config, Environment, Upstream};
use crate::routes;
use crate::service::ListingService;

const API_ADDRESS_VARIABLE: &str = "LISTINGS_API_ADDRESS";
const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8000";

/// Resolves when the process is asked to stop.
async fn shutdown_signal(logger: Arc<Logger>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(logger, "Failed to listen for Ctrl-C"; "error" => %e);
    }

    info!(logger, "Shutting down...");
}

/// Runs the listing service for `domain` until interrupted. The store
/// is prepared before the listener is bound; if that fails, nothing is
/// served.
pub async fn run_listing_service(domain: &'static Domain) -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = Arc::new(initialize_logger().new(o!("service" => domain.service)));

    let address: SocketAddr =
        parse_variable_or(domain.address_variable, domain.default_address.parse()?);
    let connection_string = get_variable_or(domain.database_variable, domain.default_database);
    let config = Config::from_env();

    info!(logger, "Starting..."; "address" => %address, "database" => &connection_string, "config" => ?config);

    let pool = connect(&connection_string).await?;
    let repository = Arc::new(SqliteRepository::new(domain, pool, config, logger.clone()));

    if let Err(e) = repository.init().await {
        error!(logger, "Failed to prepare store"; "error" => %e);
        return Err(e.into());
    }

    let service = Arc::new(ListingService::new(domain, repository));
    let environment = Environment::new(logger.clone(), service);

    let (bound, server) = warp::serve(routes::listing_routes(environment))
        .try_bind_with_graceful_shutdown(address, shutdown_signal(logger.clone()))?;

    info!(logger, "Listening..."; "address" => %bound);
    server.await;
    info!(logger, "Exiting gracefully...");

    Ok(())
}

/// Runs the HTTP gateway in front of both listing services until
/// interrupted.
pub async fn run_gateway() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = Arc::new(initialize_logger().new(o!("service" => "gateway")));

    let address: SocketAddr =
        parse_variable_or(API_ADDRESS_VARIABLE, DEFAULT_API_ADDRESS.parse()?);

    let upstream = |domain: &'static Domain| -> Result<Upstream, url::ParseError> {
        let target = get_variable_or(domain.address_variable, domain.default_address);
        info!(logger, "Forwarding..."; "domain" => domain.name, "target" => &target);

        let client = ListingClient::new(domain, &target)?;

        Ok(Upstream::new(logger.clone(), Arc::new(client)))
    };

    let racing = upstream(&RACING)?;
    let sports = upstream(&SPORTS)?;

    let (bound, server) = warp::serve(routes::gateway_routes(racing, sports))
        .try_bind_with_graceful_shutdown(address, shutdown_signal(logger.clone()))?;

    info!(logger, "Listening..."; "address" => %bound);
    server.await;
    info!(logger, "Exiting gracefully...");

    Ok(())
}

use std::error::Error;

use dotenv::dotenv;
use log::{info, initialize_logger};
use structopt::StructOpt;
use time::OffsetDateTime;

use listings::config::get_variable_or;
use listings::db::{connect, seed};
use listings::domain::Domain;
use listings::queries;

fn parse_domain(name: &str) -> Result<&'static Domain, String> {
    Domain::by_name(name).ok_or_else(|| format!("unknown domain `{}`", name))
}

#[derive(Debug, StructOpt)]
#[structopt(name = "seed", about = "Append generated records to a domain's table")]
struct Opt {
    /// The domain to seed (`racing` or `sports`)
    #[structopt(parse(try_from_str = parse_domain))]
    domain: &'static Domain,

    /// How many records to generate
    #[structopt(short, long, default_value = "100")]
    count: u32,

    /// The database to write to; defaults to the domain's configured
    /// database
    #[structopt(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();
    let domain = opt.domain;

    let logger = initialize_logger();

    let connection_string = opt
        .database
        .unwrap_or_else(|| get_variable_or(domain.database_variable, domain.default_database));

    info!(logger, "Seeding..."; "domain" => domain.name, "database" => &connection_string, "count" => opt.count);

    let pool = connect(&connection_string).await?;
    sqlx::query(&queries::creation(domain)).execute(&pool).await?;

    let records = seed::generate(opt.count, OffsetDateTime::now_utc());
    seed::insert(&pool, domain, &records).await?;

    info!(logger, "Seeded"; "count" => records.len());

    Ok(())
}

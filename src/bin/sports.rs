use std::error::Error;

use listings::domain::SPORTS;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    listings::server::run_listing_service(&SPORTS).await
}

use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    listings::server::run_gateway().await
}

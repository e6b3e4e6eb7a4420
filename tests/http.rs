use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use sqlx::sqlite::SqlitePool;
use time::{Duration, OffsetDateTime};
use warp::http::StatusCode;

use listings::client::ListingClient;
use listings::db::seed::{self, NewRecord};
use listings::db::{connect_in_memory, Repository, SqliteRepository};
use listings::domain::{Domain, RACING, SPORTS};
use listings::environment::{Config, Environment, Upstream};
use listings::init::InitPolicy;
use listings::queries::TieBreak;
use listings::routes;
use listings::service::ListingService;

fn record(meeting_id: i64, name: &str, number: i64, visible: bool, offset: Duration) -> NewRecord {
    NewRecord {
        meeting_id,
        name: name.to_owned(),
        number,
        visible,
        advertised_start_time: OffsetDateTime::now_utc() + offset,
    }
}

fn races() -> Vec<NewRecord> {
    vec![
        record(1, "Aldgate Stakes", 3, true, Duration::hours(-1)),
        record(2, "Bramble Cup", 1, false, Duration::hours(1)),
        record(1, "Cobalt Derby", 5, false, Duration::hours(2)),
        record(3, "Marlow Mile", 2, true, Duration::hours(3)),
    ]
}

fn sports() -> Vec<NewRecord> {
    vec![
        record(7, "Harbour Open", 1, true, Duration::days(1)),
        record(8, "Summit Final", 2, true, Duration::days(-1)),
    ]
}

async fn make_environment(domain: &'static Domain, records: &[NewRecord]) -> (Environment, SqlitePool) {
    let logger = Arc::new(log::discard());
    let pool = connect_in_memory().await.expect("open in-memory database");
    let config = Config::new(InitPolicy::Once, TieBreak::Id, 0);

    let repository = Arc::new(SqliteRepository::new(domain, pool.clone(), config, logger.clone()));
    repository.init().await.expect("initialize repository");
    seed::insert(&pool, domain, records)
        .await
        .expect("insert records");

    let service = Arc::new(ListingService::new(domain, repository));

    (Environment::new(logger, service), pool)
}

async fn start_listing_service(domain: &'static Domain, records: &[NewRecord]) -> (SocketAddr, SqlitePool) {
    let (environment, pool) = make_environment(domain, records).await;

    let (address, server) =
        warp::serve(routes::listing_routes(environment)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    (address, pool)
}

fn upstream(domain: &'static Domain, address: SocketAddr) -> Upstream {
    let client = ListingClient::new(domain, &address.to_string()).expect("create client");

    Upstream::new(Arc::new(log::discard()), Arc::new(client))
}

fn start_gateway(racing: SocketAddr, sports: SocketAddr) -> String {
    let routes = routes::gateway_routes(upstream(&RACING, racing), upstream(&SPORTS, sports));

    let (address, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    format!("http://{}", address)
}

fn unused_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind listener");
    listener.local_addr().expect("get address")
}

fn names(body: &Value, key: &str) -> Vec<String> {
    body[key]
        .as_array()
        .expect("get records")
        .iter()
        .map(|r| r["name"].as_str().expect("get name").to_owned())
        .collect()
}

fn rpc(path: &str, body: Value) -> warp::test::RequestBuilder {
    let bytes = serde_json::to_vec(&body).expect("serialize body");

    warp::test::request()
        .method("POST")
        .path(path)
        .header("content-type", "application/json")
        .header("content-length", bytes.len().to_string())
        .body(bytes)
}

#[tokio::test]
async fn listing_filters_by_meeting_in_start_time_order() {
    let (environment, _pool) = make_environment(&RACING, &races()).await;
    let filter = routes::listing_routes(environment);

    let response = rpc(
        "/racing.Racing/ListRaces",
        json!({ "filter": { "meeting_ids": [1] } }),
    )
    .reply(&filter)
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("server-timing"));

    let body: Value = serde_json::from_slice(response.body()).expect("parse body");
    assert_eq!(names(&body, "races"), vec!["Aldgate Stakes", "Cobalt Derby"]);
    assert_eq!(body["races"][0]["status"], "CLOSED");
    assert_eq!(body["races"][1]["status"], "OPEN");
    assert_eq!(body["races"][1]["meeting_id"], 1);
    assert_eq!(body["races"][1]["number"], 5);
}

#[tokio::test]
async fn listing_sorts_by_the_requested_field() {
    let (environment, _pool) = make_environment(&RACING, &races()).await;
    let filter = routes::listing_routes(environment);

    let response = rpc(
        "/racing.Racing/ListRaces",
        json!({ "filter": { "sort_by_field_name": "number" } }),
    )
    .reply(&filter)
    .await;
    let body: Value = serde_json::from_slice(response.body()).expect("parse body");

    assert_eq!(
        names(&body, "races"),
        vec!["Bramble Cup", "Marlow Mile", "Aldgate Stakes", "Cobalt Derby"]
    );

    let response = rpc(
        "/racing.Racing/ListRaces",
        json!({ "filter": { "sort_by_field_name": "name; DROP TABLE races" } }),
    )
    .reply(&filter)
    .await;
    let body: Value = serde_json::from_slice(response.body()).expect("parse body");

    assert_eq!(
        names(&body, "races"),
        vec!["Aldgate Stakes", "Bramble Cup", "Cobalt Derby", "Marlow Mile"]
    );
}

#[tokio::test]
async fn retrieving_a_missing_record_returns_null() {
    let (environment, _pool) = make_environment(&SPORTS, &sports()).await;
    let filter = routes::listing_routes(environment);

    let response = rpc("/sport.Sports/GetSport", json!({ "id": 2 }))
        .reply(&filter)
        .await;
    let body: Value = serde_json::from_slice(response.body()).expect("parse body");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["sport"]["name"], "Summit Final");
    assert_eq!(body["sport"]["status"], "CLOSED");

    let response = rpc("/sport.Sports/GetSport", json!({ "id": 42 }))
        .reply(&filter)
        .await;
    let body: Value = serde_json::from_slice(response.body()).expect("parse body");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body, json!({ "sport": null }));
}

#[tokio::test]
async fn malformed_requests_are_rejected() {
    let (environment, _pool) = make_environment(&RACING, &races()).await;
    let filter = routes::listing_routes(environment);

    let response = rpc("/racing.Racing/GetRace", json!({ "id": "seven" }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_failures_are_reported() {
    let (environment, pool) = make_environment(&RACING, &races()).await;
    let filter = routes::listing_routes(environment);
    pool.close().await;

    let response = rpc("/racing.Racing/ListRaces", json!({})).reply(&filter).await;
    let body: Value = serde_json::from_slice(response.body()).expect("parse body");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["domain"], "racing");
    assert_eq!(body["message"], "SQLx error");
}

#[tokio::test]
async fn healthz_reports_the_version() {
    let (environment, _pool) = make_environment(&RACING, &[]).await;
    let filter = routes::listing_routes(environment);

    let response = warp::test::request()
        .method("GET")
        .path("/healthz")
        .reply(&filter)
        .await;
    let body: Value = serde_json::from_slice(response.body()).expect("parse body");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["version"], info::VERSION);
}

#[tokio::test]
async fn gateway_forwards_to_both_services() {
    let (racing, _racing_pool) = start_listing_service(&RACING, &races()).await;
    let (sports, _sports_pool) = start_listing_service(&SPORTS, &sports()).await;
    let base = start_gateway(racing, sports);
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/v1/races/3", base))
        .send()
        .await
        .expect("get race");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("server-timing"));
    let body: Value = response.json().await.expect("parse body");
    assert_eq!(body["race"]["id"], 3);
    assert_eq!(body["race"]["name"], "Cobalt Derby");

    let response = client
        .post(&format!("{}/v1/list-races", base))
        .json(&json!({ "filter": { "visible_only": true } }))
        .send()
        .await
        .expect("list races");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("parse body");
    assert_eq!(names(&body, "races"), vec!["Aldgate Stakes", "Marlow Mile"]);

    let response = client
        .post(&format!("{}/v1/list-sports", base))
        .json(&json!({}))
        .send()
        .await
        .expect("list sports");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("parse body");
    assert_eq!(names(&body, "sports"), vec!["Summit Final", "Harbour Open"]);
    assert_eq!(body["sports"][1]["status"], "OPEN");
}

#[tokio::test]
async fn gateway_returns_not_found_for_missing_records() {
    let (racing, _racing_pool) = start_listing_service(&RACING, &races()).await;
    let base = start_gateway(racing, unused_address());

    let response = reqwest::get(&format!("{}/v1/races/99", base))
        .await
        .expect("get race");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_reports_unreachable_services() {
    let (racing, _racing_pool) = start_listing_service(&RACING, &races()).await;
    let base = start_gateway(racing, unused_address());

    let response = reqwest::get(&format!("{}/v1/sports/1", base))
        .await
        .expect("get sport");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: Value = response.json().await.expect("parse body");
    assert_eq!(body["domain"], "sports");
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn gateway_passes_service_failures_through() {
    let (racing, racing_pool) = start_listing_service(&RACING, &races()).await;
    let base = start_gateway(racing, unused_address());
    racing_pool.close().await;

    let response = reqwest::Client::new()
        .post(&format!("{}/v1/list-races", base))
        .json(&json!({}))
        .send()
        .await
        .expect("list races");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

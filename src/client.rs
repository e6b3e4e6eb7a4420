use std::collections::HashMap;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::Domain;
use crate::errors::ListingError;
use crate::record::Record;
use crate::service::{GetRequest, ListRequest};

/// The body of an error reported by a listing service.
#[derive(Debug, Deserialize)]
struct Failure {
    message: String,
}

/// Calls one listing service's RPC methods.
pub struct ListingClient {
    domain: &'static Domain,
    http: Client,
    get_url: Url,
    list_url: Url,
}

impl ListingClient {
    /// Creates a client for the service listening on `address`
    /// (`host:port`).
    pub fn new(domain: &'static Domain, address: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(&format!("http://{}/", address))?;

        Ok(Self {
            domain,
            http: Client::new(),
            get_url: base.join(&format!("{}/{}", domain.service, domain.get_method))?,
            list_url: base.join(&format!("{}/{}", domain.service, domain.list_method))?,
        })
    }

    pub fn domain(&self) -> &'static Domain {
        self.domain
    }

    pub async fn get_one(&self, id: u64) -> Result<Option<Record>, ListingError> {
        self.call(&self.get_url, &GetRequest { id }, self.domain.record_key)
            .await
    }

    pub async fn list_many(&self, request: &ListRequest) -> Result<Vec<Record>, ListingError> {
        self.call(&self.list_url, request, self.domain.records_key)
            .await
    }

    async fn call<Q, R>(&self, url: &Url, request: &Q, key: &'static str) -> Result<R, ListingError>
    where
        Q: Serialize,
        R: DeserializeOwned,
    {
        let domain = self.domain.name;

        let response = self
            .http
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|source| ListingError::Unreachable { domain, source })?;

        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<Failure>().await {
                Ok(failure) => failure.message,
                Err(_) => status.to_string(),
            };

            return Err(ListingError::Upstream {
                domain,
                status: status.as_u16(),
                message,
            });
        }

        let mut body: HashMap<String, R> = response
            .json()
            .await
            .map_err(|source| ListingError::MalformedResponse { domain, source })?;

        body.remove(key)
            .ok_or(ListingError::MissingField { domain, field: key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RACING, SPORTS};

    #[test]
    fn method_urls_follow_the_service_path() {
        let client = ListingClient::new(&RACING, "127.0.0.1:9000").expect("create client");

        assert_eq!(
            client.get_url.as_str(),
            "http://127.0.0.1:9000/racing.Racing/GetRace"
        );
        assert_eq!(
            client.list_url.as_str(),
            "http://127.0.0.1:9000/racing.Racing/ListRaces"
        );

        let client = ListingClient::new(&SPORTS, "localhost:5000").expect("create client");
        assert_eq!(
            client.list_url.as_str(),
            "http://localhost:5000/sport.Sports/ListSports"
        );
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        assert!(ListingClient::new(&RACING, "not an address").is_err());
    }

    #[tokio::test]
    async fn closed_ports_are_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let address = listener.local_addr().expect("get address");
        drop(listener);

        let client = ListingClient::new(&SPORTS, &address.to_string()).expect("create client");

        assert!(matches!(
            client.get_one(1).await,
            Err(ListingError::Unreachable {
                domain: "sports",
                ..
            })
        ));
    }
}

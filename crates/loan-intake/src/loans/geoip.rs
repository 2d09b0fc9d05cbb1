use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::country::{CountryLookup, LookupError};

/// `CountryLookup` backed by an ipapi-compatible JSON endpoint
/// (`GET {endpoint}/{address}/json/`).
#[derive(Debug, Clone)]
pub struct GeoIpClient {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GeoIpPayload {
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl GeoIpClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn url_for(&self, address: IpAddr) -> String {
        format!("{}/{}/json/", self.endpoint.trim_end_matches('/'), address)
    }
}

/// Rejects anything other than a literal IP address before it is placed in
/// the request path.
fn parse_address(address: &str) -> Result<IpAddr, LookupError> {
    address
        .trim()
        .parse()
        .map_err(|_| LookupError::Rejected(format!("not an IP address: {address}")))
}

fn parse_payload(body: &[u8]) -> Result<String, LookupError> {
    let payload: GeoIpPayload =
        serde_json::from_slice(body).map_err(|err| LookupError::Malformed(err.to_string()))?;

    if payload.error {
        return Err(LookupError::Rejected(
            payload.reason.unwrap_or_else(|| "unspecified".to_string()),
        ));
    }

    Ok(payload.country_code.unwrap_or_default())
}

#[async_trait]
impl CountryLookup for GeoIpClient {
    async fn lookup_country(&self, address: &str) -> Result<String, LookupError> {
        let url = self.url_for(parse_address(address)?);
        debug!(%url, "looking up country");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_payload(&body)
    }
}

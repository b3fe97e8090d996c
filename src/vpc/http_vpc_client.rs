use http::{
    HeaderValue, Request, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::http_client::{HttpClient, join_segments};
use crate::options::ApiKey;
use crate::TokenRetriever;

use super::error::VpcClientError;
use super::region::service_url_for_region;
use super::{CreateKeyOptions, Key, VpcClient, VpcClientFactory};

/// Version date sent with every VPC API request.
pub const VPC_API_VERSION: &str = "2024-04-30";
const VPC_API_GENERATION: &str = "2";

/// Error body of the VPC API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    message: String,
}

/// VPC client for a single regional endpoint.
pub struct HttpVpcClient<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    http_client: C,
    token_retriever: T,
    service_url: Url,
}

impl<C, T> HttpVpcClient<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    pub fn new(http_client: C, token_retriever: T, service_url: Url) -> Self {
        Self {
            http_client,
            token_retriever,
            service_url,
        }
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    fn build_request(&self, options: &CreateKeyOptions) -> Result<Request<Vec<u8>>, VpcClientError> {
        let token = self.token_retriever.retrieve()?;

        let mut url = join_segments(&self.service_url, &["keys"])
            .map_err(|e| VpcClientError::Encoder(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("version", VPC_API_VERSION)
            .append_pair("generation", VPC_API_GENERATION);

        let json_body = serde_json::to_vec(options)
            .map_err(|e| VpcClientError::Encoder(format!("Failed to encode JSON: {e}")))?;

        let mut bearer_token_header = HeaderValue::from_str(&token.to_string()).map_err(|_| {
            VpcClientError::Encoder("invalid HTTP header value set for Authorization".to_string())
        })?;
        bearer_token_header.set_sensitive(true);

        Request::post(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, bearer_token_header)
            .body(json_body)
            .map_err(|e| VpcClientError::Encoder(format!("Failed to build request: {e}")))
    }
}

impl<C, T> VpcClient for HttpVpcClient<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    fn create_key(&self, options: &CreateKeyOptions) -> Result<Key, VpcClientError> {
        let request = self.build_request(options)?;

        debug!(key_name = %options.name, "creating VPC key");
        let response = self
            .http_client
            .send(request)
            .map_err(|e| VpcClientError::Transport(e.to_string()))?;
        let body = response.body();
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => serde_json::from_slice(body).map_err(|e| {
                VpcClientError::Decoder(format!(
                    "Failed to decode JSON response for key creation: {e}. Response body: {}",
                    String::from_utf8_lossy(body)
                ))
            }),
            status => Err(VpcClientError::Api(status.as_u16(), api_error_reason(body))),
        }
    }
}

/// First error message of a VPC API error body, or the raw body when it has another shape.
fn api_error_reason(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorResponse>(body)
        .ok()
        .and_then(|response| response.errors.into_iter().next())
        .map(|error| match error.code {
            Some(code) => format!("{code}: {}", error.message),
            None => error.message,
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).to_string())
}

/// Builds [HttpVpcClient]s sharing one transport and one token retriever.
pub struct HttpVpcClientFactory<C, T>
where
    C: HttpClient + Clone,
    T: TokenRetriever + Clone,
{
    http_client: C,
    token_retriever: T,
    api_key: ApiKey,
    endpoint_override: Option<Url>,
}

impl<C, T> HttpVpcClientFactory<C, T>
where
    C: HttpClient + Clone,
    T: TokenRetriever + Clone,
{
    pub fn new(http_client: C, token_retriever: T, api_key: ApiKey) -> Self {
        Self {
            http_client,
            token_retriever,
            api_key,
            endpoint_override: None,
        }
    }

    /// Sends every request to `endpoint` instead of the regional endpoint.
    pub fn with_endpoint(self, endpoint: Option<Url>) -> Self {
        Self {
            endpoint_override: endpoint,
            ..self
        }
    }
}

impl<C, T> VpcClientFactory for HttpVpcClientFactory<C, T>
where
    C: HttpClient + Clone,
    T: TokenRetriever + Clone,
{
    type Client = HttpVpcClient<C, T>;

    fn new_client(&self, region: &str) -> Result<Self::Client, VpcClientError> {
        if self.api_key.is_empty() {
            return Err(VpcClientError::MissingApiKey);
        }
        let service_url = match &self.endpoint_override {
            Some(endpoint) => endpoint.clone(),
            None => service_url_for_region(region)?,
        };
        debug!(region, %service_url, "VPC client configured");

        Ok(HttpVpcClient::new(
            self.http_client.clone(),
            self.token_retriever.clone(),
            service_url,
        ))
    }
}

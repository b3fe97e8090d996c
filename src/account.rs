use http::header::{ACCEPT, AUTHORIZATION};
use http::{HeaderValue, Request, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::http_client::{HttpClient, join_segments};
use crate::options::ApiKey;
use crate::{TokenRetriever, TokenRetrieverError};

const IAM_APIKEY_HEADER: &str = "IAM-ApiKey";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("could not retrieve account id")]
    NotFound,
    #[error(transparent)]
    Token(#[from] TokenRetrieverError),
    #[error("error computing the request: `{0}`")]
    Encoder(String),
    #[error("error decoding the response payload: `{0}`")]
    Decoder(String),
    #[error("transport error: `{0}`")]
    Transport(String),
    #[error("IAM identity error: Status code: `{0}`, Reason: `{1}`")]
    Response(u16, String),
}

/// Resolves the account the configured credentials belong to.
pub trait AccountIdResolver {
    fn account_id(&self) -> Result<String, AccountError>;
}

/// Subset of the IAM identity API key details.
#[derive(Debug, Deserialize)]
struct ApiKeyDetails {
    account_id: Option<String>,
}

/// Looks the account id up through the IAM identity "API key details" endpoint.
pub struct HttpAccountResolver<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    http_client: C,
    token_retriever: T,
    api_key: ApiKey,
    iam_url: Url,
}

impl<C, T> HttpAccountResolver<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    pub fn new(http_client: C, token_retriever: T, api_key: ApiKey, iam_url: Url) -> Self {
        Self {
            http_client,
            token_retriever,
            api_key,
            iam_url,
        }
    }

    fn build_request(&self) -> Result<Request<Vec<u8>>, AccountError> {
        let token = self.token_retriever.retrieve()?;
        let url = join_segments(&self.iam_url, &["v1", "apikeys", "details"])
            .map_err(|e| AccountError::Encoder(e.to_string()))?;

        let mut authorization = HeaderValue::from_str(&token.to_string()).map_err(|_| {
            AccountError::Encoder("invalid HTTP header value set for Authorization".to_string())
        })?;
        authorization.set_sensitive(true);
        let mut api_key = HeaderValue::from_str(self.api_key.as_str()).map_err(|_| {
            AccountError::Encoder(format!("invalid HTTP header value set for {IAM_APIKEY_HEADER}"))
        })?;
        api_key.set_sensitive(true);

        Request::get(url.as_str())
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, authorization)
            .header(IAM_APIKEY_HEADER, api_key)
            .body(Vec::new())
            .map_err(|e| AccountError::Encoder(e.to_string()))
    }
}

impl<C, T> AccountIdResolver for HttpAccountResolver<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    fn account_id(&self) -> Result<String, AccountError> {
        let request = self.build_request()?;

        let response = self
            .http_client
            .send(request)
            .map_err(|e| AccountError::Transport(e.to_string()))?;
        let body = response.body();

        if response.status() != StatusCode::OK {
            return Err(AccountError::Response(
                response.status().as_u16(),
                String::from_utf8_lossy(body).to_string(),
            ));
        }

        let details: ApiKeyDetails = serde_json::from_slice(body).map_err(|e| {
            AccountError::Decoder(format!(
                "{e}. Response body: {}",
                String::from_utf8_lossy(body)
            ))
        })?;

        let account_id = details
            .account_id
            .filter(|id| !id.is_empty())
            .ok_or(AccountError::NotFound)?;
        debug!(%account_id, "account id resolved");
        Ok(account_id)
    }
}

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Request, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::{Url, form_urlencoded};

use crate::http_client::{HttpClient, join_segments};
use crate::options::ApiKey;
use crate::token::{AccessToken, Token, TokenError};

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Error, Debug)]
pub enum AuthenticateError {
    #[error("unable to serialize request: `{0}`")]
    SerializeError(String),
    #[error("unable to deserialize token: `{0}`")]
    DeserializeError(String),
    #[error("IAM server error: Status code: `{0}`, Reason: `{1}`")]
    HttpResponseError(u16, String),
    #[error("http transport error: `{0}`")]
    HttpTransportError(String),
    #[error("invalid token: `{0}`")]
    InvalidToken(#[from] TokenError),
}

pub trait Authenticator {
    fn authenticate(&self) -> Result<Token, AuthenticateError>;
}

/// The Authenticator exchanges an IBM Cloud API key for an IAM access token.
pub struct IamAuthenticator<C> {
    /// HTTP client
    http_client: C,
    /// IAM base url, the token path is appended to it.
    url: Url,
    api_key: ApiKey,
}

impl<C> IamAuthenticator<C> {
    pub fn new(http_client: C, url: Url, api_key: ApiKey) -> Self {
        Self {
            http_client,
            url,
            api_key,
        }
    }

    fn build_request(&self) -> Result<Request<Vec<u8>>, AuthenticateError> {
        let token_url = join_segments(&self.url, &["identity", "token"])
            .map_err(|e| AuthenticateError::SerializeError(e.to_string()))?;
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", APIKEY_GRANT_TYPE)
            .append_pair("apikey", self.api_key.as_str())
            .finish();

        Request::post(token_url.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(body.into_bytes())
            .map_err(|e| AuthenticateError::SerializeError(e.to_string()))
    }
}

impl<C> Authenticator for IamAuthenticator<C>
where
    C: HttpClient,
{
    /// Executes a POST request to the IAM token endpoint and returns the resulting `Token`.
    fn authenticate(&self) -> Result<Token, AuthenticateError> {
        let request = self.build_request()?;

        debug!("requesting IAM access token");
        let response = self
            .http_client
            .send(request)
            .map_err(|e| AuthenticateError::HttpTransportError(e.to_string()))?;

        let body = String::from_utf8(response.body().clone()).map_err(|e| {
            AuthenticateError::DeserializeError(format!("invalid utf8 response: {e}"))
        })?;

        if response.status() != StatusCode::OK {
            return Err(AuthenticateError::HttpResponseError(
                response.status().as_u16(),
                body,
            ));
        }

        let token_response: TokenResponse = serde_json::from_str(body.as_str())
            .map_err(|e| AuthenticateError::DeserializeError(e.to_string()))?;

        Ok(Token::try_from(token_response)?)
    }
}

/// Relevant fields of the IAM token endpoint response. Refresh tokens are not used.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: AccessToken,
    pub token_type: String,
    /// The lifetime in seconds of the access token.
    pub expires_in: u64,
}

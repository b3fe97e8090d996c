use http::header::{ACCEPT, AUTHORIZATION};
use http::{HeaderValue, Request, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::http_client::{HttpClient, join_segments};
use crate::{TokenRetriever, TokenRetrieverError};

#[derive(Debug, Error)]
pub enum ResourceGroupError {
    #[error("could not retrieve resource group id for {0:?}")]
    NotFound(String),
    #[error(transparent)]
    Token(#[from] TokenRetrieverError),
    #[error("error computing the request: `{0}`")]
    Encoder(String),
    #[error("error decoding the response payload: `{0}`")]
    Decoder(String),
    #[error("transport error: `{0}`")]
    Transport(String),
    #[error("resource manager error: Status code: `{0}`, Reason: `{1}`")]
    Response(u16, String),
}

/// Resolves a resource group name to its id within an account.
pub trait ResourceGroupResolver {
    fn resource_group_id(&self, name: &str, account_id: &str)
    -> Result<String, ResourceGroupError>;
}

#[derive(Debug, Deserialize)]
struct ResourceGroupList {
    #[serde(default)]
    resources: Vec<ResourceGroup>,
}

#[derive(Debug, Deserialize)]
struct ResourceGroup {
    id: String,
}

/// Resolves resource groups through the Resource Manager v2 API.
pub struct HttpResourceGroupResolver<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    http_client: C,
    token_retriever: T,
    resource_manager_url: Url,
}

impl<C, T> HttpResourceGroupResolver<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    pub fn new(http_client: C, token_retriever: T, resource_manager_url: Url) -> Self {
        Self {
            http_client,
            token_retriever,
            resource_manager_url,
        }
    }

    fn build_request(
        &self,
        name: &str,
        account_id: &str,
    ) -> Result<Request<Vec<u8>>, ResourceGroupError> {
        let token = self.token_retriever.retrieve()?;
        let mut url = join_segments(&self.resource_manager_url, &["v2", "resource_groups"])
            .map_err(|e| ResourceGroupError::Encoder(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("account_id", account_id)
            .append_pair("name", name);

        let mut authorization = HeaderValue::from_str(&token.to_string()).map_err(|_| {
            ResourceGroupError::Encoder(
                "invalid HTTP header value set for Authorization".to_string(),
            )
        })?;
        authorization.set_sensitive(true);

        Request::get(url.as_str())
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, authorization)
            .body(Vec::new())
            .map_err(|e| ResourceGroupError::Encoder(e.to_string()))
    }
}

impl<C, T> ResourceGroupResolver for HttpResourceGroupResolver<C, T>
where
    C: HttpClient,
    T: TokenRetriever,
{
    /// Returns the id of the first resource group matching `name`.
    fn resource_group_id(
        &self,
        name: &str,
        account_id: &str,
    ) -> Result<String, ResourceGroupError> {
        let request = self.build_request(name, account_id)?;

        let response = self
            .http_client
            .send(request)
            .map_err(|e| ResourceGroupError::Transport(e.to_string()))?;
        let body = response.body();

        if response.status() != StatusCode::OK {
            return Err(ResourceGroupError::Response(
                response.status().as_u16(),
                String::from_utf8_lossy(body).to_string(),
            ));
        }

        let list: ResourceGroupList = serde_json::from_slice(body).map_err(|e| {
            ResourceGroupError::Decoder(format!(
                "{e}. Response body: {}",
                String::from_utf8_lossy(body)
            ))
        })?;

        let resource_group = list
            .resources
            .into_iter()
            .next()
            .ok_or_else(|| ResourceGroupError::NotFound(name.to_string()))?;
        debug!(resource_group_name = name, resource_group_id = %resource_group.id, "resource group resolved");
        Ok(resource_group.id)
    }
}

//! Explicit configuration handed to the VPC commands.
//!
//! Everything a command needs from the outside (region, credentials, service endpoints and HTTP
//! settings) is collected here once, from CLI arguments and the environment, so handlers never
//! reach for process-wide state.

use std::env;
use std::env::VarError;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::http::config::HttpConfig;
use crate::key_material::PublicKeySource;

pub const IBMCLOUD_API_KEY_ENV_NAME: &str = "IBMCLOUD_API_KEY";

const IAM_ENDPOINT_STR: &str = "https://iam.cloud.ibm.com";
const RESOURCE_MANAGER_ENDPOINT_STR: &str = "https://resource-controller.cloud.ibm.com";

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("the required flag name must not be empty")]
    EmptyName,
    #[error(
        "the required flags either key-path of vpc key or the public-key within double quotation marks is not found"
    )]
    KeySource,
}

/// IBM Cloud API key. Never printed.
#[derive(Clone, Default, PartialEq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Reads the key from `IBMCLOUD_API_KEY`. A missing variable yields an empty key, which the
    /// service clients reject when they are built.
    pub fn from_env() -> Self {
        Self::with_env(env::var)
    }

    fn with_env<F>(env_var: F) -> Self
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        Self(env_var(IBMCLOUD_API_KEY_ENV_NAME).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<S: AsRef<str>> From<S> for ApiKey {
    fn from(key: S) -> Self {
        ApiKey(key.as_ref().to_string())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Base urls of the IBM Cloud services involved in a command.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEndpoints {
    pub iam: Url,
    pub resource_manager: Url,
    /// Overrides the regional VPC endpoint when set.
    pub vpc: Option<Url>,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            iam: Url::parse(IAM_ENDPOINT_STR).expect("Failed to parse known URL: IAM_ENDPOINT"),
            resource_manager: Url::parse(RESOURCE_MANAGER_ENDPOINT_STR)
                .expect("Failed to parse known URL: RESOURCE_MANAGER_ENDPOINT"),
            vpc: None,
        }
    }
}

/// Options shared by every `vpc` command.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalOptions {
    pub region: String,
    pub api_key: ApiKey,
    pub endpoints: ServiceEndpoints,
    pub http: HttpConfig,
}

impl GlobalOptions {
    pub fn new(region: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            region: region.into(),
            api_key,
            endpoints: ServiceEndpoints::default(),
            http: HttpConfig::default(),
        }
    }

    pub fn with_endpoints(self, endpoints: ServiceEndpoints) -> Self {
        Self { endpoints, ..self }
    }

    pub fn with_http_config(self, http: HttpConfig) -> Self {
        Self { http, ..self }
    }
}

/// A validated `vpc key create` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCreateRequest {
    pub name: String,
    pub public_key: PublicKeySource,
    pub resource_group_name: Option<String>,
}

impl KeyCreateRequest {
    /// Validates the flags of `vpc key create`. Empty strings count as not given.
    ///
    /// Exactly one of `public_key` and `key_path` must be present.
    pub fn new(
        name: String,
        public_key: Option<String>,
        key_path: Option<PathBuf>,
        resource_group_name: Option<String>,
    ) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let public_key = public_key.filter(|k| !k.is_empty());
        let key_path = key_path.filter(|p| !p.as_os_str().is_empty());
        let public_key = match (public_key, key_path) {
            (Some(key), None) => PublicKeySource::Literal(key),
            (None, Some(path)) => PublicKeySource::File(path),
            _ => return Err(ValidationError::KeySource),
        };

        Ok(Self {
            name,
            public_key,
            resource_group_name: resource_group_name.filter(|n| !n.is_empty()),
        })
    }
}

use chrono::{DateTime, Utc};
use error::VpcClientError;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod http_vpc_client;
pub mod region;

/// Operations of the VPC API used by the key commands.
pub trait VpcClient {
    fn create_key(&self, options: &CreateKeyOptions) -> Result<Key, VpcClientError>;
}

/// Builds region scoped [VpcClient]s.
pub trait VpcClientFactory {
    type Client: VpcClient;

    fn new_client(&self, region: &str) -> Result<Self::Client, VpcClientError>;
}

// Accept closures as VpcClientFactory implementations
impl<F, C> VpcClientFactory for F
where
    F: Fn(&str) -> Result<C, VpcClientError>,
    C: VpcClient,
{
    type Client = C;

    fn new_client(&self, region: &str) -> Result<Self::Client, VpcClientError> {
        self(region)
    }
}

/// Identifies a resource group by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupIdentity {
    pub id: String,
}

/// Body of the "create key" request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateKeyOptions {
    pub name: String,
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceGroupIdentity>,
}

impl CreateKeyOptions {
    pub fn new(name: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_key: public_key.into(),
            resource_group: None,
        }
    }

    pub fn with_resource_group(self, resource_group: Option<ResourceGroupIdentity>) -> Self {
        Self {
            resource_group,
            ..self
        }
    }
}

/// Reference to the resource group a key belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceGroupReference {
    pub id: String,
    pub name: Option<String>,
}

/// A VPC key as returned by the API. Only `name` is guaranteed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Key {
    pub name: String,
    pub id: Option<String>,
    pub crn: Option<String>,
    pub href: Option<String>,
    pub fingerprint: Option<String>,
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub length: Option<u32>,
    pub public_key: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub resource_group: Option<ResourceGroupReference>,
}

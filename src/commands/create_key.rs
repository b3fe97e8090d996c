use thiserror::Error;
use tracing::{debug, info};

use crate::account::{AccountError, AccountIdResolver};
use crate::key_material::{KeyMaterialError, validate_authorized_key};
use crate::options::{GlobalOptions, KeyCreateRequest};
use crate::resource_group::{ResourceGroupError, ResourceGroupResolver};
use crate::vpc::error::VpcClientError;
use crate::vpc::{CreateKeyOptions, Key, ResourceGroupIdentity, VpcClient, VpcClientFactory};

/// Every error is returned as produced by the failing stage.
#[derive(Error, Debug)]
pub enum CreateKeyError {
    #[error(transparent)]
    KeyMaterial(#[from] KeyMaterialError),
    #[error(transparent)]
    Vpc(#[from] VpcClientError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    ResourceGroup(#[from] ResourceGroupError),
}

/// Handler of `vpc key create`.
pub struct CreateKeyCommand<F, A, R>
where
    F: VpcClientFactory,
    A: AccountIdResolver,
    R: ResourceGroupResolver,
{
    vpc_client_factory: F,
    account_resolver: A,
    resource_group_resolver: R,
}

impl<F, A, R> CreateKeyCommand<F, A, R>
where
    F: VpcClientFactory,
    A: AccountIdResolver,
    R: ResourceGroupResolver,
{
    pub fn new(vpc_client_factory: F, account_resolver: A, resource_group_resolver: R) -> Self {
        Self {
            vpc_client_factory,
            account_resolver,
            resource_group_resolver,
        }
    }

    /// Reads and validates the public key, then registers it in the VPC of `options.region`.
    ///
    /// Nothing is sent to IBM Cloud unless the key is a valid authorized key.
    pub fn run(
        &self,
        options: &GlobalOptions,
        request: &KeyCreateRequest,
    ) -> Result<Key, CreateKeyError> {
        let public_key = request.public_key.resolve()?;
        let public_key = validate_authorized_key(&public_key)?;

        let key = self.create_key(
            &options.region,
            &request.name,
            public_key,
            request.resource_group_name.as_deref(),
        )?;
        info!("key-name" = %key.name, "VPC Key created successfully");
        Ok(key)
    }

    // client -> account id -> resource group id -> create
    fn create_key(
        &self,
        region: &str,
        name: &str,
        public_key: &str,
        resource_group_name: Option<&str>,
    ) -> Result<Key, CreateKeyError> {
        let vpc_client = self.vpc_client_factory.new_client(region)?;
        let account_id = self.account_resolver.account_id()?;

        let resource_group = resource_group_name
            .map(|name| {
                self.resource_group_resolver
                    .resource_group_id(name, &account_id)
                    .map(|id| ResourceGroupIdentity { id })
            })
            .transpose()?;
        debug!(?resource_group, "creating key");

        let options = CreateKeyOptions::new(name, public_key).with_resource_group(resource_group);
        Ok(vpc_client.create_key(&options)?)
    }
}

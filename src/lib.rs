pub mod account;
pub mod authenticator;
pub mod commands;
pub mod http;
pub mod http_client;
pub mod key_material;
pub mod options;
pub mod parameters;
pub mod resource_group;
pub mod token;
pub mod token_retriever;
pub mod vpc;

use std::sync::Arc;

use crate::token::Token;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenRetrieverError {
    #[error("fetching access token: `{0}`")]
    AuthenticatorError(#[from] authenticator::AuthenticateError),
    #[error("acquiring cache mutex lock")]
    PoisonError,
}

/// The TokenRetriever is responsible for handing out a valid IAM access token to every service
/// client that needs to authorize a request.
pub trait TokenRetriever {
    fn retrieve(&self) -> Result<Token, TokenRetrieverError>;
}

// A single retriever is shared between the account, resource group and VPC clients.
impl<T> TokenRetriever for Arc<T>
where
    T: TokenRetriever,
{
    fn retrieve(&self) -> Result<Token, TokenRetrieverError> {
        self.as_ref().retrieve()
    }
}

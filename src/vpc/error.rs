use thiserror::Error;

use crate::TokenRetrieverError;

#[derive(Debug, Error)]
pub enum VpcClientError {
    #[error("service URL for region {0:?} not found")]
    UnknownRegion(String),
    #[error("IBMCLOUD_API_KEY environment variable is not set")]
    MissingApiKey,
    #[error(transparent)]
    Token(#[from] TokenRetrieverError),
    #[error("error computing the payload: `{0}`")]
    Encoder(String),
    #[error("error decoding the response payload: `{0}`")]
    Decoder(String),
    #[error("transport error: `{0}`")]
    Transport(String),
    /// The API refused the request, e.g. a duplicated key name or an exhausted quota.
    #[error("VPC API error: Status code: `{0}`, Reason: `{1}`")]
    Api(u16, String),
}

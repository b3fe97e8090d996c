use crate::authenticator::Authenticator;
use crate::token::Token;
use crate::{TokenRetriever, TokenRetrieverError};

use std::sync::Mutex;
use tracing::debug;

/// Retrieves IAM tokens from an [Authenticator] and keeps the last one around until it expires.
#[derive(Debug)]
pub struct TokenRetrieverWithCache<A>
where
    A: Authenticator,
{
    tokens: Mutex<Option<Token>>,
    authenticator: A,
}

impl<A> TokenRetriever for TokenRetrieverWithCache<A>
where
    A: Authenticator,
{
    fn retrieve(&self) -> Result<Token, TokenRetrieverError> {
        let mut cached_token = self
            .tokens
            .lock()
            .map_err(|_| TokenRetrieverError::PoisonError)?;

        match cached_token.as_ref() {
            Some(token) if !token.is_expired() => Ok(token.to_owned()),
            _ => {
                let token = self.authenticator.authenticate()?;
                debug!("authorization token refreshed");
                *cached_token = Some(token.clone());
                Ok(token)
            }
        }
    }
}

impl<A> TokenRetrieverWithCache<A>
where
    A: Authenticator,
{
    pub fn new(authenticator: A) -> Self {
        Self {
            tokens: Mutex::new(None),
            authenticator,
        }
    }
}

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::authenticator::TokenResponse;

pub type AccessToken = String;

/// Tokens are considered expired slightly before IAM says so, so a request started right before
/// the deadline still carries a valid token.
const EXPIRATION_MARGIN: TimeDelta = TimeDelta::seconds(60);

#[derive(Error, Debug, PartialEq)]
pub enum TokenError {
    #[error("invalid token type: `{0}`")]
    InvalidType(String),
    #[error("invalid token expiration: `{0}`")]
    InvalidExpiration(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum TokenType {
    Bearer,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Token {
    expires_at: DateTime<Utc>,
    access_token: AccessToken,
    token_type: TokenType,
}

impl TryFrom<&str> for TokenType {
    type Error = TokenError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Bearer" | "bearer" => Ok(TokenType::Bearer),
            _ => Err(TokenError::InvalidType(value.to_string())),
        }
    }
}

impl Token {
    pub fn new(
        access_token: AccessToken,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Token {
            access_token,
            token_type,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at - EXPIRATION_MARGIN <= Utc::now()
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Bearer => write!(f, "Bearer"),
        }
    }
}

/// Renders the token as an `Authorization` header value.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.token_type, self.access_token)
    }
}

impl TryFrom<TokenResponse> for Token {
    type Error = TokenError;

    fn try_from(response: TokenResponse) -> Result<Self, Self::Error> {
        let token_type = TokenType::try_from(response.token_type.as_str())?;

        // IAM reports the lifetime of the token in seconds
        let time_delta = TimeDelta::from_std(Duration::from_secs(response.expires_in))
            .map_err(|e| TokenError::InvalidExpiration(e.to_string()))?;

        let expires_at = Utc::now().checked_add_signed(time_delta).ok_or_else(|| {
            TokenError::InvalidExpiration("failed to calculate expiration time".to_string())
        })?;

        Ok(Token::new(response.access_token, token_type, expires_at))
    }
}

use clap::{error::Error as ClapError, error::ErrorKind};
use std::env;
use std::env::VarError;
use std::fmt::Display;
use std::time::Duration;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub(crate) timeout: Duration,
    pub(crate) conn_timeout: Duration,
    pub(crate) proxy: ProxyConfig,
}

impl HttpConfig {
    pub fn new(timeout: Duration, conn_timeout: Duration, proxy: ProxyConfig) -> Self {
        Self {
            timeout,
            conn_timeout,
            proxy,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_REQUEST_TIMEOUT,
            DEFAULT_CONNECT_TIMEOUT,
            ProxyConfig::default(),
        )
    }
}

const HTTP_PROXY_ENV_NAME: &str = "HTTP_PROXY";
const HTTPS_PROXY_ENV_NAME: &str = "HTTPS_PROXY";

#[derive(thiserror::Error, Debug)]
pub enum ProxyError {
    #[error("invalid proxy url `{0}`: `{1}`")]
    InvalidUrl(String, String),
}

/// Proxy used by every IBM Cloud service client.
///
/// An empty proxy means requests go out directly.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ProxyConfig {
    /// <protocol>://<user>:<password>@<host>:<port>
    url: Option<Url>,
}

impl TryFrom<&str> for ProxyConfig {
    type Error = ProxyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        let url =
            Url::parse(s).map_err(|err| ProxyError::InvalidUrl(s.to_string(), err.to_string()))?;
        Ok(Self { url: Some(url) })
    }
}

impl Display for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{url}"),
            None => write!(f, ""),
        }
    }
}

impl ProxyConfig {
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Returns a new instance whose url is taken from the standard environment variables if needed.
    pub fn try_with_url_from_env(self) -> Result<Self, ProxyError> {
        self.with_env_aware_url(env::var)
    }

    /// Returns a new instance using the provided `env_var` function to read the proxy from the
    /// environment when no url was configured explicitly. `HTTPS_PROXY` wins over `HTTP_PROXY`.
    fn with_env_aware_url<F>(self, env_var: F) -> Result<Self, ProxyError>
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        if self.url.is_some() {
            return Ok(self);
        }
        env_var(HTTPS_PROXY_ENV_NAME)
            .or_else(|_| env_var(HTTP_PROXY_ENV_NAME))
            .unwrap_or_default()
            .as_str()
            .try_into()
    }
}

impl From<ProxyError> for ClapError {
    fn from(err: ProxyError) -> ClapError {
        ClapError::raw(ErrorKind::InvalidValue, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ProxyConfig, ProxyError};
    use assert_matches::assert_matches;
    use std::{collections::HashMap, env::VarError};

    fn proxy(url: &str) -> ProxyConfig {
        ProxyConfig::try_from(url).unwrap()
    }

    #[test]
    fn test_system_proxy_values() {
        struct TestCase {
            name: &'static str,
            env_values: HashMap<&'static str, &'static str>,
            config: ProxyConfig,
            expected: ProxyConfig,
        }

        impl TestCase {
            fn run(&self) {
                let config = self.config.clone().with_env_aware_url(|k| {
                    self.env_values
                        .get(k)
                        .map(|v| v.to_string())
                        .ok_or(VarError::NotPresent)
                });
                assert_eq!(config.unwrap(), self.expected, "Test name {}", self.name)
            }
        }
        let test_cases = [
            TestCase {
                name: "No system proxy and no proxy flag",
                env_values: HashMap::from([("IBMCLOUD_API_KEY", "some-key")]),
                config: ProxyConfig::default(),
                expected: ProxyConfig::default(),
            },
            TestCase {
                name: "Proxy flag without system proxy",
                env_values: HashMap::new(),
                config: proxy("http://localhost:3128"),
                expected: proxy("http://localhost:3128"),
            },
            TestCase {
                name: "Proxy flag has priority over system proxy",
                env_values: HashMap::from([("HTTPS_PROXY", "http://corp.proxy:8080")]),
                config: proxy("http://localhost:3128"),
                expected: proxy("http://localhost:3128"),
            },
            TestCase {
                name: "HTTPS_PROXY is used",
                env_values: HashMap::from([("HTTPS_PROXY", "http://corp.proxy:8080")]),
                config: ProxyConfig::default(),
                expected: proxy("http://corp.proxy:8080"),
            },
            TestCase {
                name: "HTTP_PROXY is used",
                env_values: HashMap::from([("HTTP_PROXY", "http://plain.proxy:8080")]),
                config: ProxyConfig::default(),
                expected: proxy("http://plain.proxy:8080"),
            },
            TestCase {
                name: "HTTPS_PROXY wins over HTTP_PROXY",
                env_values: HashMap::from([
                    ("HTTPS_PROXY", "http://corp.proxy:8080"),
                    ("HTTP_PROXY", "http://plain.proxy:8080"),
                ]),
                config: ProxyConfig::default(),
                expected: proxy("http://corp.proxy:8080"),
            },
        ];

        for test_case in test_cases {
            test_case.run();
        }
    }

    #[test]
    fn invalid_system_proxy() {
        let result = ProxyConfig::default().with_env_aware_url(|_| Ok("not a url".to_string()));
        assert_matches!(result.unwrap_err(), ProxyError::InvalidUrl(s, _) => {
            assert_eq!(s, "not a url".to_string())
        });
    }

    #[test]
    fn empty_proxy_displays_empty() {
        assert_eq!(ProxyConfig::default().to_string(), "");
        assert!(ProxyConfig::default().url().is_none());
    }
}

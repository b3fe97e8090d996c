use http::{Request, Response};
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum HttpClientError {
    /// Represents an http transport crate error.
    #[error("HTTP Transport error: `{0}`")]
    TransportError(String),
    /// Represents an error building the request url or body.
    #[error("error encoding `{0}`")]
    EncoderError(String),
    /// Represents an unexpected response.
    #[error("invalid http response: `{0}`")]
    InvalidResponse(String),
}

/// A synchronous trait that defines the internal methods for HTTP clients.
pub trait HttpClient {
    /// A synchronous function sends a request. The method and url are defined inside the Request.
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError>;
}

// Accept closures as HttpClient implementations
impl<F> HttpClient for F
where
    F: Fn(Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError>,
{
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        self(req)
    }
}

/// Appends `segments` to the path of `base`, keeping any path the base url already has.
///
/// `Url::join` would replace the last segment of a base without a trailing slash, which breaks
/// service urls such as `https://us-south.iaas.cloud.ibm.com/v1`.
pub fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, HttpClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| HttpClientError::EncoderError(format!("`{base}` cannot be used as base url")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ssh_key::Certificate;
use ssh_key::authorized_keys::Entry;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum KeyMaterialError {
    #[error("unable to open file. {0}")]
    OpenFile(#[source] io::Error),
    #[error("unable to read file. {0}")]
    ReadFile(#[source] io::Error),
    #[error("the provided VPC key is invalid. {0}")]
    InvalidKey(#[source] ssh_key::Error),
}

/// Where the public key of a new VPC key comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PublicKeySource {
    /// The key was given inline, e.g. `--public-key "ssh-ed25519 AAAA... dev@example.com"`.
    Literal(String),
    /// Path of a public key file.
    File(PathBuf),
}

impl PublicKeySource {
    /// Returns the public key string, reading the file if needed.
    pub fn resolve(&self) -> Result<String, KeyMaterialError> {
        match self {
            PublicKeySource::Literal(key) => Ok(key.to_owned()),
            PublicKeySource::File(path) => read_last_line(path),
        }
    }
}

/// Returns the last non-empty line of the file at `path`, or an empty string for an empty file.
///
/// Every line read replaces the previous one, so a file holding several keys yields the last key.
pub fn read_last_line(path: &Path) -> Result<String, KeyMaterialError> {
    let file = File::open(path).map_err(KeyMaterialError::OpenFile)?;

    let mut public_key = String::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(KeyMaterialError::ReadFile)?;
        if !line.trim().is_empty() {
            public_key = line;
        }
    }
    Ok(public_key)
}

/// Checks that `public_key` holds a valid OpenSSH authorized key line,
/// `[options] <algorithm> <base64 key> [comment]`, or an OpenSSH certificate.
///
/// Blank lines and `#` comments before the key are skipped. Returns the key line without
/// surrounding whitespace, which is what gets registered.
pub fn validate_authorized_key(public_key: &str) -> Result<&str, KeyMaterialError> {
    let public_key = public_key
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or_default();

    match Entry::from_str(public_key) {
        Ok(entry) => debug!(
            algorithm = %entry.public_key().algorithm(),
            comment = entry.public_key().comment(),
            "public key validated"
        ),
        Err(err) => {
            let certificate =
                Certificate::from_str(public_key).map_err(|_| KeyMaterialError::InvalidKey(err))?;
            debug!(
                algorithm = %certificate.algorithm(),
                key_id = certificate.key_id(),
                "certificate validated"
            );
        }
    }
    Ok(public_key)
}

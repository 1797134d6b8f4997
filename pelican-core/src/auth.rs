//! Shared-secret gate in front of every registry route.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("bad credential syntax: {0}")]
    BadCredentialSyntax(&'static str),

    #[error("authorization failed")]
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "cloud".to_owned(),
            password: "pelican".to_owned(),
        }
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value for an `Authorization` header carrying these credentials.
    pub fn header_value(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }

    /// Check an `Authorization` header as received off the wire.
    pub fn verify_raw(&self, header: Option<&[u8]>) -> Result<(), AuthError> {
        let Some(raw) = header else {
            return self.verify(None);
        };
        if !raw.is_ascii() {
            return Err(AuthError::BadCredentialSyntax("header is not ascii"));
        }
        let header = std::str::from_utf8(raw)
            .map_err(|_| AuthError::BadCredentialSyntax("header is not ascii"))?;
        self.verify(Some(header))
    }

    /// Check a decoded `Authorization` header against these credentials.
    pub fn verify(&self, header: Option<&str>) -> Result<(), AuthError> {
        let Some(header) = header else {
            return Err(AuthError::Unauthorized);
        };

        let Some((scheme, token)) = header.trim().split_once(' ') else {
            return Err(AuthError::BadCredentialSyntax("expected '<scheme> <token>'"));
        };
        if scheme != "Basic" {
            return Err(AuthError::BadCredentialSyntax("unsupported scheme"));
        }

        let decoded = STANDARD
            .decode(token.trim())
            .map_err(|_| AuthError::BadCredentialSyntax("token is not base64"))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| AuthError::BadCredentialSyntax("token is not utf-8"))?;
        let Some((username, password)) = decoded.split_once(':') else {
            return Err(AuthError::BadCredentialSyntax("expected 'user:password'"));
        };

        if username == self.username && password == self.password {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        }
    }
}

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use oauth2::{AccessToken, RefreshToken};
use url::Url;

use crate::client::DEFAULT_TIMEOUT;
use crate::error::{Error, Result};
use crate::oauth::KeyPair;
use crate::token::TokenStore;

/// Runtime configuration, read once at startup from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub organization: Option<String>,
    pub page_size: Option<u32>,
    pub csv_path: PathBuf,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_cache: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads the configuration surface from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: parse_url("BASE_URL", &required("BASE_URL")?)?,
            token_url: parse_url("TOKEN_URL", &required("TOKEN_URL")?)?,
            client_id: required("CLIENT_ID")?,
            client_secret: optional("CLIENT_SECRET"),
            organization: optional("ORG_ID"),
            page_size: optional("PAGE_SIZE")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&n| n > 0)
                .or(Some(50)),
            csv_path: optional("CSV_FILE")
                .map_or_else(|| PathBuf::from("invoices.csv"), PathBuf::from),
            access_token: required("ACCESS_TOKEN")?,
            refresh_token: optional("REFRESH_TOKEN"),
            token_cache: optional("TOKEN_CACHE").map(PathBuf::from),
            request_timeout: optional("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
        })
    }

    #[must_use]
    pub fn key_pair(&self) -> KeyPair {
        KeyPair::new(self.client_id.clone(), self.client_secret.clone())
    }

    /// Builds the token store, preferring a previously persisted cache file
    /// over the environment-seeded pair.
    #[must_use]
    pub fn token_store(&self) -> TokenStore {
        if let Some(path) = &self.token_cache {
            match TokenStore::load(path) {
                Ok(store) => return store,
                Err(err) => {
                    debug!(path = %path.display(), error = ?err, "no usable token cache, seeding from environment");
                }
            }
        }
        let store = TokenStore::new(
            AccessToken::new(self.access_token.clone()),
            self.refresh_token.clone().map(RefreshToken::new),
        );
        match &self.token_cache {
            Some(path) => store.with_cache_path(path),
            None => store,
        }
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| Error::Config {
        key: key.to_string(),
    })
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|_| Error::Config {
        key: key.to_string(),
    })
}

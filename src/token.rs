use std::fs;
use std::path::PathBuf;

use oauth2::{AccessToken, RefreshToken};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The credential pair persisted between runs.
#[derive(Debug, Serialize, Deserialize)]
struct Credential {
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
}

/// Exclusive owner of the access/refresh credential pair.
///
/// All readers go through [`TokenStore::access_token`]; the only mutation
/// path is [`TokenStore::apply_refresh`], which also persists the pair to the
/// cache file when one is configured.
#[derive(Debug)]
pub struct TokenStore {
    credential: Credential,
    cache_path: Option<PathBuf>,
}

impl TokenStore {
    #[must_use]
    pub fn new(access_token: AccessToken, refresh_token: Option<RefreshToken>) -> Self {
        Self {
            credential: Credential {
                access_token,
                refresh_token,
            },
            cache_path: None,
        }
    }

    /// Persist credential updates to `path` so the next run can pick up a
    /// rotated pair.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Recovers a previously persisted credential pair from `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = fs::read_to_string(&path).map_err(Error::TokenCache)?;
        let credential = serde_json::from_str(&raw)?;
        Ok(Self {
            credential,
            cache_path: Some(path),
        })
    }

    #[must_use]
    pub fn access_token(&self) -> &AccessToken {
        &self.credential.access_token
    }

    /// # Errors
    /// `Error::NoRefreshToken` when no refresh token is held; the run cannot
    /// recover without interactive re-authorization.
    pub fn refresh_token(&self) -> Result<&RefreshToken> {
        self.credential
            .refresh_token
            .as_ref()
            .ok_or(Error::NoRefreshToken)
    }

    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        self.credential.refresh_token.is_some()
    }

    /// Replaces the access token; replaces the refresh token only when the
    /// token endpoint rotated it. Persists the pair as a side effect.
    pub fn apply_refresh(
        &mut self,
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
    ) -> Result<()> {
        self.credential.access_token = access_token;
        if let Some(refresh_token) = refresh_token {
            self.credential.refresh_token = Some(refresh_token);
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.cache_path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.credential)?;
        fs::write(path, json).map_err(Error::TokenCache)?;
        trace!(path = %path.display(), "persisted credential pair");
        Ok(())
    }
}

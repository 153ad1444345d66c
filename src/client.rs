use core::fmt;
use std::time::Duration;

use reqwest::{StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::endpoints::Endpoint;
use crate::entities::{contact, invoice};
use crate::error::{Error, Result};
use crate::oauth::{self, KeyPair};
use crate::token::TokenStore;

/// Default per-request timeout; bounds worst-case latency per call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The authenticated HTTP client for the accounting API.
///
/// Wraps a `reqwest::Client` with bearer authentication from the owned
/// [`TokenStore`] and performs at most one token refresh per logical request
/// when the API answers 401.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    token_url: Url,
    key_pair: KeyPair,
    tokens: TokenStore,
}

impl Client {
    pub fn new(base_url: Url, token_url: Url, key_pair: KeyPair, tokens: TokenStore) -> Result<Self> {
        Self::with_timeout(base_url, token_url, key_pair, tokens, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: Url,
        token_url: Url,
        key_pair: KeyPair,
        tokens: TokenStore,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Transport)?;
        Ok(Self {
            http,
            base_url,
            token_url,
            key_pair,
            tokens,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Resolves a target: absolute URLs are used verbatim (pagination cursors
    /// come back as full URLs); anything else is a path under the base URL.
    fn resolve_url(&self, target: &str) -> Result<Url> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Url::parse(target).map_err(|_| Error::InvalidEndpoint);
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = target.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(|_| Error::InvalidEndpoint)
    }

    /// Build a request object with authentication headers.
    fn build_request(&self, url: Url) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(self.tokens.access_token().secret())
    }

    /// Perform an authenticated `GET` against a relative path or an absolute
    /// URL.
    #[instrument(skip(self, query))]
    pub async fn get<R: DeserializeOwned, T: Serialize + Sized + fmt::Debug>(
        &mut self,
        target: &str,
        query: &T,
    ) -> Result<R> {
        let url = self.resolve_url(target)?;
        self.get_url(url, query).await
    }

    /// Perform an authenticated `GET` against a typed endpoint.
    #[instrument(skip(self, query))]
    pub async fn get_endpoint<R: DeserializeOwned, T: Serialize + Sized + fmt::Debug>(
        &mut self,
        endpoint: Endpoint,
        query: &T,
    ) -> Result<R> {
        let url = endpoint.to_url(&self.base_url)?;
        self.get_url(url, query).await
    }

    async fn get_url<R: DeserializeOwned, T: Serialize + Sized + fmt::Debug>(
        &mut self,
        url: Url,
        query: &T,
    ) -> Result<R> {
        trace!(?query, %url, "making GET request");
        let response = self
            .build_request(url.clone())
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;

        // One refresh per logical request; a second 401 goes back to the
        // caller via handle_response.
        let response = if response.status() == StatusCode::UNAUTHORIZED {
            debug!(%url, "access token rejected, refreshing");
            self.refresh_access_token().await?;
            self.build_request(url)
                .query(query)
                .send()
                .await
                .map_err(Error::Transport)?
        } else {
            response
        };

        Self::handle_response(response).await
    }

    /// Refreshes the access token using the stored refresh token and persists
    /// the new credential pair.
    pub async fn refresh_access_token(&mut self) -> Result<()> {
        let refresh_token = self.tokens.refresh_token()?.clone();
        let (access_token, new_refresh_token) = oauth::exchange_refresh_token(
            &self.http,
            &self.key_pair,
            &self.token_url,
            &refresh_token,
        )
        .await?;
        self.tokens.apply_refresh(access_token, new_refresh_token)
    }

    async fn handle_response<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        let url = response.url().to_string();
        let entity_type = std::any::type_name::<R>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
            .to_string();
        debug!(%url, %status, %entity_type, "response received");

        let text = response.text().await.map_err(Error::Transport)?;
        match status {
            StatusCode::UNAUTHORIZED => Err(Error::AuthExpired {
                url,
                response_body: Some(text),
            }),
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                entity: entity_type,
                url,
                status_code: status,
                response_body: Some(text),
            }),
            status if status.is_success() => match serde_json::from_str(&text) {
                Ok(result) => Ok(result),
                Err(e) => {
                    error!("failed to deserialize response: {e}");
                    Err(Error::Deserialization(e, Some(text)))
                }
            },
            status => Err(Error::RemoteApi {
                status_code: status,
                url,
                response_body: Some(text),
            }),
        }
    }

    /// Access the invoices API
    #[must_use]
    pub fn invoices(&mut self) -> InvoicesApi<'_> {
        InvoicesApi { client: self }
    }

    /// Access the contacts API
    #[must_use]
    pub fn contacts(&mut self) -> ContactsApi<'_> {
        ContactsApi { client: self }
    }
}

/// API handler for invoice endpoints
#[derive(Debug)]
pub struct InvoicesApi<'a> {
    client: &'a mut Client,
}

impl InvoicesApi<'_> {
    /// Retrieve one page of the invoice collection.
    pub async fn list(&mut self, parameters: invoice::ListParameters) -> Result<invoice::PageBody> {
        invoice::list(self.client, &parameters).await
    }

    /// Retrieve a single invoice with its line items.
    pub async fn get(&mut self, invoice_id: &str) -> Result<invoice::RawInvoice> {
        invoice::get(self.client, invoice_id).await
    }
}

/// API handler for contact endpoints
#[derive(Debug)]
pub struct ContactsApi<'a> {
    client: &'a mut Client,
}

impl ContactsApi<'_> {
    /// Retrieve a single contact by id.
    pub async fn get(&mut self, contact_id: &str) -> Result<contact::ContactRecord> {
        contact::get(self.client, contact_id).await
    }
}

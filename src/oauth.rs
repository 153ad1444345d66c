use oauth2::basic::BasicClient;
use oauth2::{
    AccessToken, AuthUrl, AuthorizationCode, CsrfToken, RedirectUrl, RefreshToken, TokenResponse,
    TokenUrl,
};
use url::Url;

use crate::error::{Error, Result};
use crate::scope::Scope;

/// Stores the OAuth 2 client ID and client secret.
#[derive(Debug, Clone)]
pub struct KeyPair(
    pub(crate) oauth2::ClientId,
    pub(crate) Option<oauth2::ClientSecret>,
);

impl KeyPair {
    /// Creates a new `KeyPair` from the provided `client_id` and `client_secret` strings.
    #[must_use]
    pub fn new(client_id: String, client_secret: Option<String>) -> Self {
        Self(
            oauth2::ClientId::new(client_id),
            client_secret.map(oauth2::ClientSecret::new),
        )
    }
}

/// Generates an authorization URL for the one-time code flow bootstrap.
///
/// Opening this URL in a browser and capturing the redirect is an interactive
/// step outside the fetch pipeline; the code it yields goes through
/// [`exchange_code`].
#[must_use]
pub fn authorize_url(
    key_pair: KeyPair,
    auth_url: Url,
    redirect_url: Url,
    scopes: impl Into<Scope>,
) -> (Url, CsrfToken) {
    let scope = scopes.into();
    BasicClient::new(key_pair.0)
        .set_auth_uri(AuthUrl::from_url(auth_url))
        .set_redirect_uri(RedirectUrl::from_url(redirect_url))
        .authorize_url(CsrfToken::new_random)
        .add_scopes(vec![scope.into_oauth2()])
        .url()
}

/// Exchanges an authorization code for an initial credential pair.
#[instrument(skip(http, code))]
pub async fn exchange_code(
    http: &reqwest::Client,
    key_pair: KeyPair,
    token_url: Url,
    redirect_url: Url,
    code: String,
) -> Result<(AccessToken, Option<RefreshToken>)> {
    let client = BasicClient::new(key_pair.0);
    let client = match key_pair.1 {
        Some(secret) => client.set_client_secret(secret),
        None => client,
    };
    let token = client
        .set_token_uri(TokenUrl::from_url(token_url))
        .set_redirect_uri(RedirectUrl::from_url(redirect_url))
        .exchange_code(AuthorizationCode::new(code))
        .request_async(http)
        .await
        .map_err(Error::OAuth2)?;

    Ok((
        token.access_token().clone(),
        token.refresh_token().cloned(),
    ))
}

/// Exchanges a refresh token for a fresh access token via the `refresh_token`
/// grant. The endpoint does not always rotate the refresh token, so the
/// second element may be `None`.
#[instrument(skip(http, refresh_token))]
pub async fn exchange_refresh_token(
    http: &reqwest::Client,
    key_pair: &KeyPair,
    token_url: &Url,
    refresh_token: &RefreshToken,
) -> Result<(AccessToken, Option<RefreshToken>)> {
    let client = BasicClient::new(key_pair.0.clone());
    let client = match &key_pair.1 {
        Some(secret) => client.set_client_secret(secret.clone()),
        None => client,
    };
    let token = client
        .set_token_uri(TokenUrl::from_url(token_url.clone()))
        .exchange_refresh_token(refresh_token)
        .request_async(http)
        .await
        .map_err(Error::OAuth2)?;

    Ok((
        token.access_token().clone(),
        token.refresh_token().cloned(),
    ))
}

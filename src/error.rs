use miette::Diagnostic;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while fetching invoices or writing the export.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("error making request: {0:?}")]
    #[diagnostic(
        code(invoice_export::transport_error),
        help("Check your network connection and the accounting API availability")
    )]
    Transport(#[source] reqwest::Error),

    /// The API rejected the access token again after a refresh. One refresh
    /// is attempted per logical request; this is what a second 401 becomes.
    #[error("authorization expired (url: {url})")]
    #[diagnostic(
        code(invoice_export::auth_expired),
        help("The access token was rejected twice; re-run the interactive authorization")
    )]
    AuthExpired {
        url: String,
        response_body: Option<String>,
    },

    /// Fatal for the run: a refresh was required but no refresh token is
    /// held. Cannot recover without re-authorizing interactively.
    #[error("no refresh token available")]
    #[diagnostic(
        code(invoice_export::no_refresh_token),
        help("Re-run the interactive authorization to obtain a new credential pair")
    )]
    NoRefreshToken,

    /// An error returned during `OAuth2` token exchanges.
    #[error("oauth2 error: {0:?}")]
    #[diagnostic(
        code(invoice_export::oauth2_error),
        help("Verify your OAuth2 configuration and client credentials")
    )]
    OAuth2(
        oauth2::RequestTokenError<
            oauth2::HttpClientError<reqwest::Error>,
            oauth2::basic::BasicErrorResponse,
        >,
    ),

    #[error("object not found: {entity} (url: {url})")]
    #[diagnostic(
        code(invoice_export::not_found),
        help("Verify that the {entity} exists and that you have permission to access it")
    )]
    NotFound {
        entity: String,
        url: String,
        status_code: StatusCode,
        response_body: Option<String>,
    },

    /// Any non-success status the client does not handle more specifically.
    #[error("remote api error: {status_code} (url: {url})")]
    #[diagnostic(
        code(invoice_export::remote_api),
        help("The accounting API rejected the request; the response body carries the details")
    )]
    RemoteApi {
        status_code: StatusCode,
        url: String,
        response_body: Option<String>,
    },

    #[error("error decoding response: {0:?}")]
    #[diagnostic(
        code(invoice_export::deserialization_error),
        help("The API returned data in an unexpected format")
    )]
    Deserialization(#[source] serde_json::Error, Option<String>),

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(invoice_export::invalid_endpoint),
        help("Check that the configured base URL and endpoint paths are well formed")
    )]
    InvalidEndpoint,

    #[error("missing configuration value: {key}")]
    #[diagnostic(
        code(invoice_export::missing_config),
        help("Set {key} in the environment or in the .env file")
    )]
    Config { key: String },

    #[error("error persisting credentials: {0}")]
    #[diagnostic(
        code(invoice_export::token_cache),
        help("Check that the token cache path is writable")
    )]
    TokenCache(#[source] std::io::Error),

    #[error("error writing export: {0}")]
    #[diagnostic(
        code(invoice_export::csv_error),
        help("Check that the output path is writable")
    )]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    #[diagnostic(code(invoice_export::io_error))]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Deserialization(e, None)
    }
}

/// Type alias for results from this crate.
pub type Result<O> = std::result::Result<O, Error>;

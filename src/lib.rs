//! # invoice-export
//!
//! Fetches invoice records and their line items from an OAuth2-protected
//! accounting API and renders them as a console table plus a CSV snapshot.
//! Records are normalized and deduplicated across paginated responses, with
//! customer identifiers resolved to display names along the way.
//!
//! The pipeline is deliberately sequential: one request is in flight at a
//! time, so the pagination cursor needs no synchronization. The client
//! refreshes its access token at most once per logical request when the API
//! answers 401; every other failure ends the run gracefully with the rows
//! gathered so far.
//!
//! ## Tracing
//!
//! Set up tracing with `ErrorLayer` so errors carry span traces:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .init();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod config;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod export;
pub mod normalize;
pub mod oauth;
pub mod pagination;
pub mod resolver;
pub mod scope;
pub mod token;
pub mod utils;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::Client;
pub use config::Config;
pub use endpoints::Endpoint;
pub use error::{Error, Result};
pub use export::Exporter;
pub use normalize::ExportRow;
pub use oauth::KeyPair;
pub use pagination::{FetchReport, PageCursor, PaginationEngine};
pub use resolver::ContactResolver;
pub use scope::{Permission, Scope, ScopeType};
pub use token::TokenStore;

// Re-export the raw record types for callers that drive the client directly.
pub use entities::contact::ContactRecord;
pub use entities::invoice::{ListParameters, PageBody, RawInvoice, RawLineItem};

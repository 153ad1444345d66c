//! Sentry integration for invoice-export errors.
//!
//! This module provides integration with Sentry for error reporting and
//! breadcrumb capture. It is only available when the `sentry` feature is
//! enabled.
//!
//! # Usage
//!
//! Enable the `sentry` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! invoice-export = { version = "0.1", features = ["sentry"] }
//! ```
//!
//! Then set up tracing with `ErrorLayer` and `sentry-tracing`; errors can be
//! attached to the scope as breadcrumbs wherever the pipeline reports them.

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::Error;

/// Convert an invoice-export [`Error`] into a Sentry breadcrumb.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let (category, message, data) = match error {
            Error::Transport(source) => (
                "http.request",
                format!("HTTP request error: {source}"),
                BTreeMap::new(),
            ),

            Error::AuthExpired { url, .. } => {
                let mut data = BTreeMap::new();
                data.insert("url".to_string(), Value::from(url.clone()));
                (
                    "auth",
                    "access token rejected after refresh".to_string(),
                    data,
                )
            }

            Error::NoRefreshToken => (
                "auth",
                "no refresh token available".to_string(),
                BTreeMap::new(),
            ),

            Error::OAuth2(_) => ("auth", "OAuth2 exchange failed".to_string(), BTreeMap::new()),

            Error::NotFound {
                entity,
                url,
                status_code,
                ..
            } => {
                let mut data = BTreeMap::new();
                data.insert("entity".to_string(), Value::from(entity.clone()));
                data.insert("url".to_string(), Value::from(url.clone()));
                data.insert(
                    "status_code".to_string(),
                    Value::from(status_code.as_u16()),
                );
                ("http.response", format!("{entity} not found"), data)
            }

            Error::RemoteApi {
                status_code, url, ..
            } => {
                let mut data = BTreeMap::new();
                data.insert("url".to_string(), Value::from(url.clone()));
                data.insert(
                    "status_code".to_string(),
                    Value::from(status_code.as_u16()),
                );
                (
                    "http.response",
                    format!("remote API error: {status_code}"),
                    data,
                )
            }

            Error::Deserialization(source, _) => (
                "http.response",
                format!("failed to decode response: {source}"),
                BTreeMap::new(),
            ),

            other => ("pipeline", other.to_string(), BTreeMap::new()),
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(message),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}

/// Extracts relevant information from an error for use as additional Sentry
/// context.
#[must_use]
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();
    context.insert("error".to_string(), Value::from(error.to_string()));
    if let Error::RemoteApi {
        response_body: Some(body),
        ..
    }
    | Error::AuthExpired {
        response_body: Some(body),
        ..
    } = error
    {
        context.insert("response_body".to_string(), Value::from(body.clone()));
    }
    context
}

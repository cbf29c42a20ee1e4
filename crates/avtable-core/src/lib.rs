//! # avtable core
//!
//! Request/response normalization for the Alpha Vantage query API.
//!
//! ## Overview
//!
//! Alpha Vantage answers every `function` with a differently shaped CSV or
//! JSON payload, and reports many failures as `200 OK` JSON. This crate turns
//! every successful call into one [`Table`] with canonical column names and
//! ascending `timestamp` order, and every failure into a typed [`AvError`].
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`query`] | Parameter sets, currency-pair expansion, URL building |
//! | [`classify`] | Response shape detection |
//! | [`normalize`] | One table builder per response shape |
//! | [`canonicalize`] | Column naming and row ordering |
//! | [`client`] | The [`AvClient`] orchestrator |
//! | [`credential`] | API key accessors |
//! | [`config`] | Client configuration |
//! | [`domain`] | [`Table`], [`Cell`], [`MarketSymbol`] |
//! | [`error`] | [`AvError`] and its kinds |
//! | [`http_client`] | Transport abstraction and reqwest implementation |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use avtable_core::{AvClient, ParameterSet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), avtable_core::AvError> {
//!     let client = AvClient::from_env();
//!     let params = ParameterSet::new().with("outputsize", "compact");
//!     let table = client.get(Some("IBM"), "TIME_SERIES_DAILY", &params).await?;
//!     println!("{} rows, columns {:?}", table.len(), table.columns());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use avtable_core::{AvError, AvErrorKind};
//!
//! fn describe(error: &AvError) -> &'static str {
//!     match error.kind() {
//!         AvErrorKind::MissingCredential => "configure an API key",
//!         AvErrorKind::Api if error.is_rate_limit_notice() => "slow down",
//!         AvErrorKind::Api => "check the function and parameters",
//!         _ => "request failed",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! The API key is redacted from every error message and log event.

pub mod canonicalize;
pub mod classify;
pub mod client;
pub mod config;
pub mod credential;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod query;

pub use canonicalize::{canonical_column_name, canonicalize};
pub use classify::{classify, ResponseShape};
pub use client::AvClient;
pub use config::ClientConfig;
pub use credential::{CredentialSource, CredentialStore, EnvCredentials, StaticCredentials};
pub use domain::{Cell, MarketSymbol, Table};
pub use error::{AvError, AvErrorKind, CallContext, PayloadError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use normalize::normalize;
pub use query::{ParameterSet, Query, QueryBuilder};

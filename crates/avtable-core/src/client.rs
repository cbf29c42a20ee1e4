//! Call orchestration.
//!
//! ```text
//! credential -> query -> send -> classify -> normalize -> canonicalize -> Table
//! ```
//!
//! Any step may fail with an [`AvError`]; nothing is retried.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::canonicalize::canonicalize;
use crate::classify::classify;
use crate::config::ClientConfig;
use crate::credential::{CredentialSource, EnvCredentials};
use crate::domain::Table;
use crate::error::AvError;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::normalize::normalize;
use crate::query::{ParameterSet, Query, QueryBuilder};

/// Alpha Vantage client returning every function's output as a [`Table`].
#[derive(Clone)]
pub struct AvClient {
    http_client: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialSource>,
    config: ClientConfig,
}

impl Default for AvClient {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AvClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        credentials: Arc<dyn CredentialSource>,
        config: ClientConfig,
    ) -> Self {
        Self {
            http_client,
            credentials,
            config,
        }
    }

    /// reqwest transport, environment credentials and environment config.
    pub fn from_env() -> Self {
        Self::new(
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(EnvCredentials),
            ClientConfig::from_env(),
        )
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the query for a call without sending it.
    ///
    /// # Errors
    ///
    /// - [`AvError::MissingCredential`] when no API key is configured
    /// - [`AvError::InvalidSymbolFormat`] for a malformed currency pair
    pub fn build_query(
        &self,
        symbol: Option<&str>,
        function: &str,
        params: &ParameterSet,
    ) -> Result<Query, AvError> {
        let api_key = self
            .credentials
            .api_key()
            .ok_or(AvError::MissingCredential)?;
        QueryBuilder::build(symbol, function, params, &api_key)
    }

    /// Calls `function` and returns its output as a canonical table.
    ///
    /// `symbol` is omitted for function-only calls such as `SECTOR`; a
    /// `FROM/TO` symbol is sent as a currency pair.
    ///
    /// # Errors
    ///
    /// Every [`AvError`] variant; the transport is never reached when the
    /// credential is missing or the symbol is malformed.
    pub async fn get(
        &self,
        symbol: Option<&str>,
        function: &str,
        params: &ParameterSet,
    ) -> Result<Table, AvError> {
        let result = self.execute(symbol, function, params).await;
        if let Err(error) = &result {
            warn!(code = error.code(), function, "alphavantage call failed: {error}");
        }
        result
    }

    async fn execute(
        &self,
        symbol: Option<&str>,
        function: &str,
        params: &ParameterSet,
    ) -> Result<Table, AvError> {
        let query = self.build_query(symbol, function, params)?;

        debug!(
            url = %query.redacted_url(&self.config.base_url),
            "sending alphavantage request"
        );
        let request = HttpRequest::get(query.url(&self.config.base_url))
            .with_header("user-agent", self.config.user_agent.as_str())
            .with_timeout_ms(self.config.timeout_ms);

        let response = self.http_client.execute(request).await?;

        let shape = classify(&response, query.function(), query.is_forex())
            .map_err(|error| error.with_context(query.context()))?;
        debug!(
            shape = shape.name(),
            status = response.status,
            "classified alphavantage response"
        );

        let table = normalize(shape, &query)?;
        Ok(canonicalize(table))
    }
}

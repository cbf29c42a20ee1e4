//! Query construction.
//!
//! [`QueryBuilder::build`] turns a symbol, a function name and caller
//! parameters into the parameter set sent upstream. Currency pairs written as
//! `FROM/TO` are expanded into both the `from_currency`/`to_currency` and the
//! `from_symbol`/`to_symbol` spellings because different functions expect
//! different names for the same pair.

use crate::domain::MarketSymbol;
use crate::error::{AvError, CallContext, REDACTION_MARKER};

/// `datatype` value forced on every call.
pub const FORCED_DATATYPE: &str = "csv";

const FUNCTION_KEY: &str = "function";
const SYMBOL_KEY: &str = "symbol";
const API_KEY: &str = "apikey";
const DATATYPE_KEY: &str = "datatype";

/// Ordered parameter mapping. Re-inserting a key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// A fully built call: function name plus the parameters sent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    function: String,
    symbol: Option<MarketSymbol>,
    params: ParameterSet,
}

impl Query {
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn symbol(&self) -> Option<&MarketSymbol> {
        self.symbol.as_ref()
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn is_forex(&self) -> bool {
        self.symbol
            .as_ref()
            .is_some_and(MarketSymbol::is_currency_pair)
    }

    /// Request URL; `function` always comes first.
    pub fn url(&self, base_url: &str) -> String {
        self.render_url(base_url, |_, value| value)
    }

    /// Request URL with the API key replaced by the redaction marker.
    pub fn redacted_url(&self, base_url: &str) -> String {
        self.render_url(base_url, |key, value| {
            if key == API_KEY {
                REDACTION_MARKER
            } else {
                value
            }
        })
    }

    /// Parameters echoed in error messages: key redacted, forced `datatype` dropped.
    ///
    /// A plain `symbol` is reported once, in the context header.
    pub fn context(&self) -> CallContext {
        let params = self
            .params
            .iter()
            .filter(|(key, _)| *key != DATATYPE_KEY && *key != SYMBOL_KEY)
            .map(|(key, value)| {
                let value = if key == API_KEY { REDACTION_MARKER } else { value };
                (key.to_owned(), value.to_owned())
            })
            .collect();

        CallContext {
            symbol: self.symbol.as_ref().map(MarketSymbol::to_string),
            function: self.function.clone(),
            params,
        }
    }

    fn render_url<'a>(
        &'a self,
        base_url: &str,
        value_for: impl Fn(&str, &'a str) -> &'a str,
    ) -> String {
        let mut url = format!(
            "{}?{FUNCTION_KEY}={}",
            base_url.trim_end_matches('?'),
            urlencoding::encode(&self.function)
        );
        for (key, value) in self.params.iter() {
            url.push('&');
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value_for(key, value)));
        }
        url
    }
}

/// Builds [`Query`] values from caller input.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryBuilder;

impl QueryBuilder {
    /// Builds the parameter set for one call.
    ///
    /// Caller parameters come first in their given order, followed by the
    /// symbol keys, `apikey` and `datatype`. A caller `function` or `symbol`
    /// entry is dropped in favour of the explicit arguments, and `apikey` and
    /// `datatype` always overwrite caller values.
    ///
    /// # Errors
    ///
    /// [`AvError::InvalidSymbolFormat`] when a symbol containing `/` is not a
    /// `FROM/TO` pair.
    pub fn build(
        symbol: Option<&str>,
        function: &str,
        extra: &ParameterSet,
        api_key: &str,
    ) -> Result<Query, AvError> {
        let symbol = symbol.map(MarketSymbol::parse).transpose()?;

        let mut params = extra.clone();
        if params.remove(FUNCTION_KEY).is_some() {
            tracing::warn!(function, "ignoring caller-supplied function parameter");
        }
        if params.remove(SYMBOL_KEY).is_some() {
            tracing::warn!(function, "ignoring caller-supplied symbol parameter");
        }

        match &symbol {
            Some(MarketSymbol::Plain(value)) => params.insert(SYMBOL_KEY, value.as_str()),
            Some(MarketSymbol::CurrencyPair { from, to }) => {
                params.insert("from_currency", from.as_str());
                params.insert("to_currency", to.as_str());
                params.insert("from_symbol", from.as_str());
                params.insert("to_symbol", to.as_str());
            }
            None => {}
        }

        params.insert(API_KEY, api_key);
        params.insert(DATATYPE_KEY, FORCED_DATATYPE);

        Ok(Query {
            function: function.to_owned(),
            symbol,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AvErrorKind;

    #[test]
    fn parameter_set_overwrites_in_place() {
        let mut params = ParameterSet::new().with("interval", "5min").with("outputsize", "full");
        params.insert("interval", "60min");

        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            vec![("interval", "60min"), ("outputsize", "full")]
        );
    }

    #[test]
    fn plain_symbol_orders_keys_after_extras() {
        let extra = ParameterSet::new().with("outputsize", "compact");
        let query = QueryBuilder::build(Some("IBM"), "TIME_SERIES_DAILY", &extra, "key-1")
            .expect("query builds");

        assert_eq!(
            query.params().keys().collect::<Vec<_>>(),
            vec!["outputsize", "symbol", "apikey", "datatype"]
        );
        assert!(!query.is_forex());
    }

    #[test]
    fn forex_symbol_emits_both_key_spellings() {
        let query = QueryBuilder::build(Some("EUR/USD"), "FX_DAILY", &ParameterSet::new(), "k")
            .expect("query builds");
        let params = query.params();

        assert!(query.is_forex());
        assert!(!params.contains_key("symbol"));
        assert_eq!(params.get("from_currency"), Some("EUR"));
        assert_eq!(params.get("from_symbol"), Some("EUR"));
        assert_eq!(params.get("to_currency"), Some("USD"));
        assert_eq!(params.get("to_symbol"), Some("USD"));
    }

    #[test]
    fn caller_cannot_override_datatype_or_key() {
        let extra = ParameterSet::new()
            .with("datatype", "json")
            .with("apikey", "caller")
            .with("function", "OTHER");
        let query = QueryBuilder::build(None, "SECTOR", &extra, "real").expect("query builds");

        assert_eq!(query.params().get("datatype"), Some(FORCED_DATATYPE));
        assert_eq!(query.params().get("apikey"), Some("real"));
        assert!(!query.params().contains_key("function"));
        assert!(!query.params().contains_key("symbol"));
    }

    #[test]
    fn rejects_malformed_pair() {
        let err = QueryBuilder::build(Some("A/B/C"), "FX_DAILY", &ParameterSet::new(), "k")
            .expect_err("must fail");
        assert_eq!(err.kind(), AvErrorKind::InvalidSymbolFormat);
    }

    #[test]
    fn url_starts_with_function() {
        let extra = ParameterSet::new().with("interval", "5min");
        let query =
            QueryBuilder::build(Some("IBM"), "SMA", &extra, "secret").expect("query builds");

        assert_eq!(
            query.url("https://www.alphavantage.co/query"),
            "https://www.alphavantage.co/query?function=SMA&interval=5min&symbol=IBM&apikey=secret&datatype=csv"
        );
        let redacted = query.redacted_url("https://www.alphavantage.co/query");
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("apikey=HIDDEN_FOR_YOUR_SAFETY"));
    }

    #[test]
    fn context_redacts_key_and_drops_datatype() {
        let extra = ParameterSet::new().with("interval", "weekly");
        let query =
            QueryBuilder::build(Some("IBM"), "RSI", &extra, "secret").expect("query builds");
        let rendered = query.context().to_string();

        assert_eq!(
            rendered,
            "API parameters used: symbol=IBM, function=RSI, interval=weekly, apikey=HIDDEN_FOR_YOUR_SAFETY"
        );
    }
}

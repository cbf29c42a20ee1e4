use std::fmt::{Display, Formatter};

use crate::error::AvError;

/// Symbol argument of a call, split into its equity or currency-pair form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarketSymbol {
    /// Any symbol without a `/`, passed upstream as `symbol`.
    Plain(String),
    /// `FROM/TO` currency pair, passed upstream as `from_*`/`to_*` keys.
    CurrencyPair { from: String, to: String },
}

impl MarketSymbol {
    /// Splits `FROM/TO` pairs; anything without a `/` is a plain symbol.
    ///
    /// A `/` that does not yield exactly two non-empty segments is rejected.
    pub fn parse(input: &str) -> Result<Self, AvError> {
        let Some((from, to)) = input.split_once('/') else {
            return Ok(Self::Plain(input.to_owned()));
        };

        if from.is_empty() || to.is_empty() || to.contains('/') {
            return Err(AvError::InvalidSymbolFormat {
                symbol: input.to_owned(),
            });
        }

        Ok(Self::CurrencyPair {
            from: from.to_owned(),
            to: to.to_owned(),
        })
    }

    pub const fn is_currency_pair(&self) -> bool {
        matches!(self, Self::CurrencyPair { .. })
    }
}

impl Display for MarketSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(symbol) => f.write_str(symbol),
            Self::CurrencyPair { from, to } => write!(f, "{from}/{to}"),
        }
    }
}

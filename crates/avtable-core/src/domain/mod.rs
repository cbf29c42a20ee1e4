//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MarketSymbol`] | Call symbol, plain or `FROM/TO` currency pair |
//! | [`Table`] | Normalized tabular output of every call |
//! | [`Cell`] | Typed scalar in a table row |

mod symbol;
mod table;

pub use symbol::MarketSymbol;
pub use table::{Cell, Table};

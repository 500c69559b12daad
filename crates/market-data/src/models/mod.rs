//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `symbol` - Validated ticker symbol (Symbol)
//! - `quote` - Normalized quote (Quote) and per-symbol batch result (BatchQuote)
//! - `profile` - Company profile data (CompanyProfile)
//! - `status` - Provider introspection (ProviderStatus)

mod profile;
mod quote;
mod status;
mod symbol;

pub use profile::CompanyProfile;
pub use quote::{BatchQuote, Quote};
pub use status::ProviderStatus;
pub use symbol::Symbol;

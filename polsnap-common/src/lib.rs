//! # polsnap Common Library
//!
//! Shared code for the snapshot builder and any tooling around it:
//! - Error and result types
//! - TOML configuration model and loading
//! - Compiled defaults (country catalog, override tables)

pub mod config;
pub mod countries;
pub mod error;

pub use countries::CountryRef;
pub use error::{Error, Result};

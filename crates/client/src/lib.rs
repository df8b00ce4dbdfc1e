//! HTTP client for the wiki backend.
//!
//! [`WikiApi`] is the contract the editor depends on; [`HttpWikiApi`]
//! implements it over REST with [`reqwest`]. Configuration comes from the
//! environment via [`ClientConfig::from_env`].

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod token;

pub use api::WikiApi;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use http::HttpWikiApi;
pub use token::TokenStore;

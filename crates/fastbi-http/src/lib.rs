//! Centralized HTTP client for the FastBI console
//!
//! Provides a mockable, configurable HTTP client wrapper for the console crates.
//!
//! ## Features
//!
//! - **Trait-based design**: Mockable via `HttpClientTrait`
//! - **Configurable**: Base URL, API key, timeouts, proxy, user-agent
//! - **Authentication**: Every request carries the `X-API-KEY` header
//! - **Connection pooling**: Managed by underlying reqwest client
//! - **Testing support**: Easy mocking with wiremock

pub mod client;
pub mod config;
pub mod error;

pub use client::{shared_client, HttpClient, HttpClientTrait, API_KEY_HEADER};
pub use config::HttpConfig;
pub use error::{HttpError, Result};

/// Re-export commonly used types
pub use reqwest::{header, Method, Response, StatusCode};

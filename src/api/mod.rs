//! # API Module
//!
//! HTTP endpoints served by the local callback server during `sonicsync auth`.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the redirect from Spotify's authorization server,
//!   checks the CSRF `state` and exchanges the authorization code for a token.
//! - [`health`] - Reports status and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use sonicsync::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;

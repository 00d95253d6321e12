//! # CLI Module
//!
//! The command-line layer of Sonic Sync. Each command loads the stored
//! credential, calls into [`crate::spotify`] or [`crate::mood`], and renders
//! the result as a table or as JSON.
//!
//! ## Commands
//!
//! - [`auth`] / [`logout`] - Sign in with Spotify, or forget the stored token
//! - [`profile`] - Show the signed-in user and token lifetime
//! - [`top`] - Top tracks, optionally with audio features
//! - [`recent`] - Recently played tracks with their time segment
//! - [`features`] - Audio features for given track ids
//! - [`analyze`] - Mood profile per time-of-day segment
//! - [`segments`] - The fixed segment table
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management Layer (Token storage and refresh)
//!     ↓
//! Mood Layer (Segmentation and aggregation)
//!     ↓
//! Spotify Layer (HTTP requests)
//! ```
//!
//! The CLI is the caller that owns the credential: it checks expiry and
//! refreshes before every command. Failures end the program with a message
//! through the `error!` macro.
//!
//! ## Usage Patterns
//!
//! ```bash
//! sonicsync auth                          # Authenticate with Spotify
//! sonicsync analyze --days 7              # Mood profile for the last week
//! sonicsync analyze --json > mood.json    # Same, machine readable
//! sonicsync top --time-range short_term --features
//! ```

mod analysis;
mod auth;
mod profile;
mod tracks;

pub use analysis::analyze;
pub use analysis::segments;
pub use auth::auth;
pub use auth::logout;
pub use profile::profile;
pub use tracks::features;
pub use tracks::recent;
pub use tracks::top;

use crate::{config::Config, error, management::TokenManager};

async fn access_token(config: &Config) -> String {
    let mut token_mgr = match TokenManager::load().await {
        Ok(t) => t,
        Err(e) => {
            error!(
                "Failed to load token. Please run sonicsync auth\n Error: {}",
                e
            );
        }
    };

    match token_mgr.get_valid_token(config).await {
        Ok(token) => token,
        Err(e) => {
            error!(
                "Failed to get a valid token. Please run sonicsync auth\n Error: {}",
                e
            );
        }
    }
}

mod auth;

pub use auth::EXPIRY_MARGIN_SECS;
pub use auth::TokenError;
pub use auth::TokenManager;

use crate::{config::Config, error, info, management::TokenManager, spotify, success, warning};

pub async fn auth(config: Config) {
    info!("Waiting for Spotify authorization...");

    let token = match spotify::auth::authorize(config).await {
        Ok(token) => token,
        Err(e) => error!("Authentication failed. Err: {}", e),
    };

    if token.refresh_token.is_none() {
        warning!("Spotify did not issue a refresh token. You will need to sign in again in an hour.");
    }

    if let Err(e) = TokenManager::new(token).persist().await {
        error!("Failed to save token to cache: {}", e);
    }

    success!("Authentication successful!");
}

pub async fn logout() {
    match TokenManager::clear().await {
        Ok(true) => success!("Logged out."),
        Ok(false) => info!("Not logged in."),
        Err(e) => error!("Failed to remove stored token: {}", e),
    }
}

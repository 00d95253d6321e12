use chrono::Utc;

use crate::{
    cli::access_token, config::Config, error, info, management::TokenManager,
    spotify::SpotifyClient, utils,
};

/// Shows the signed-in user's profile and how long the stored token lasts.
///
/// # Output Example
///
/// ```text
/// [o] Name: Jane Doe
/// [o] Spotify ID: janedoe
/// [o] Email: jane@example.com
/// [o] Country: DE
/// [o] Product: premium
/// [o] Token expires in 52 minutes.
/// ```
pub async fn profile(config: Config) {
    let token = access_token(&config).await;
    let client = SpotifyClient::new(config);

    let pb = utils::spinner("Fetching profile...");
    let profile = match client.get_profile(&token).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch profile: {}", e);
        }
    };
    pb.finish_and_clear();

    info!(
        "Name: {}",
        profile.display_name.as_deref().unwrap_or(&profile.id)
    );
    info!("Spotify ID: {}", profile.id);
    if let Some(email) = &profile.email {
        info!("Email: {}", email);
    }
    if let Some(country) = &profile.country {
        info!("Country: {}", country);
    }
    if let Some(product) = &profile.product {
        info!("Product: {}", product);
    }
    if let Some(image) = profile.profile_image() {
        info!("Image: {}", image);
    }

    if let Ok(mgr) = TokenManager::load().await {
        let remaining = mgr.current_token().remaining(Utc::now());
        info!("Token expires in {} minutes.", remaining / 60);
    }
}

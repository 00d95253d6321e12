use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    config::Config,
    server::start_api_server,
    spotify::SpotifyError,
    types::{AuthSession, Token, TokenErrorResponse, TokenResponse},
    utils, warning,
};

/// Everything the callback handler needs to finish a pending authorization.
pub struct AuthContext {
    pub config: Config,
    pub session: Mutex<Option<AuthSession>>,
}

impl AuthContext {
    pub fn new(config: Config) -> Self {
        AuthContext {
            config,
            session: Mutex::new(None),
        }
    }
}

/// Runs the interactive OAuth 2.0 authorization code flow with Spotify.
///
/// This function orchestrates the entire authentication process:
/// 1. Generating a CSRF `state` and a PKCE code verifier and challenge
/// 2. Starting the local callback server
/// 3. Opening the authorization URL in the user's browser
/// 4. Waiting up to 60 seconds for the callback to deliver a token
///
/// # Arguments
///
/// * `config` - Application configuration; the redirect URI must point at
///   the callback server's `/callback` route
///
/// # Returns
///
/// The freshly issued [`Token`]. Persisting it is up to the caller.
///
/// # Errors
///
/// Returns [`SpotifyError::Auth`] if no token arrives before the timeout,
/// and [`SpotifyError::InvalidUrl`] if the authorization URL cannot be built.
///
/// # Example
///
/// ```ignore
/// let token = spotify::auth::authorize(config).await?;
/// TokenManager::new(token).persist().await?;
/// ```
pub async fn authorize(config: Config) -> Result<Token, SpotifyError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let auth_url = authorize_url(&config, &state, &code_challenge)?;
    let context = Arc::new(AuthContext::new(config));

    // Store verifier and state before the redirect can come back
    {
        let mut lock = context.session.lock().await;
        *lock = Some(AuthSession {
            state,
            code_verifier,
            token: None,
        });
    }

    let server_context = Arc::clone(&context);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_context).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    wait_for_token(&context)
        .await
        .ok_or_else(|| SpotifyError::Auth("authentication failed or timed out".to_string()))
}

/// Builds the Spotify authorization URL.
///
/// The URL carries the client id, the redirect URI, the CSRF `state`, the
/// PKCE S256 challenge and the requested scope. `show_dialog=true` makes
/// Spotify ask again even if the user approved the app before, which lets
/// a user switch accounts.
pub fn authorize_url(
    config: &Config,
    state: &str,
    code_challenge: &str,
) -> Result<String, SpotifyError> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("state", state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", config.scope.as_str()),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| SpotifyError::InvalidUrl(format!("{}: {}", config.auth_url, e)))?;

    Ok(url.to_string())
}

async fn wait_for_token(context: &AuthContext) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = context.session.lock().await;
        if let Some(token) = lock.as_ref().and_then(|s| s.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for a credential.
///
/// # Arguments
///
/// * `config` - Application configuration
/// * `code` - Authorization code received by the callback
/// * `verifier` - PKCE code verifier generated at the start of the flow
///
/// # Errors
///
/// Returns [`SpotifyError::Auth`] with Spotify's `error_description` when the
/// code is invalid, expired or does not match the verifier.
pub async fn exchange_code(
    config: &Config,
    code: &str,
    verifier: &str,
) -> Result<Token, SpotifyError> {
    request_token(
        config,
        vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_verifier", verifier),
        ],
    )
    .await
}

/// Exchanges a refresh token for a new credential.
///
/// The response may not contain a new refresh token. In that case the old
/// one remains valid and the caller must keep it, see
/// [`Token::retain_refresh_token`].
///
/// # Example
///
/// ```ignore
/// let fresh = refresh_token(&config, old.refresh_token.as_deref().unwrap())
///     .await?
///     .retain_refresh_token(&old);
/// ```
pub async fn refresh_token(config: &Config, refresh_token: &str) -> Result<Token, SpotifyError> {
    request_token(
        config,
        vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ],
    )
    .await
}

async fn request_token<'a>(
    config: &'a Config,
    mut form: Vec<(&'a str, &'a str)>,
) -> Result<Token, SpotifyError> {
    let client = Client::new();
    let mut request = client.post(&config.token_url);

    match &config.client_secret {
        Some(secret) => {
            request = request.header(
                AUTHORIZATION,
                utils::basic_auth_header(&config.client_id, secret),
            );
        }
        None => form.push(("client_id", config.client_id.as_str())),
    }

    let res = request.form(&form).send().await?;

    if !res.status().is_success() {
        let status = res.status();
        let message = match res.json::<TokenErrorResponse>().await {
            Ok(body) => body.error_description.unwrap_or(body.error),
            Err(_) => status.to_string(),
        };
        return Err(SpotifyError::Auth(message));
    }

    let json: TokenResponse = res.json().await?;
    Ok(Token::from_response(json, Utc::now()))
}

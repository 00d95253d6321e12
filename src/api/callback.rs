use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{
    spotify::auth::{AuthContext, exchange_code},
    warning,
};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(context): Extension<Arc<AuthContext>>,
) -> Html<String> {
    if let Some(error) = params.get("error") {
        warning!("Spotify auth error: {}", error);
        return Html(format!("<h4>Spotify auth error: {}</h4>", error));
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>".to_string());
    };

    // Take verifier from state, without holding the lock across the exchange
    let verifier = {
        let session = context.session.lock().await;
        let Some(pending) = session.as_ref() else {
            return Html("<h4>Missing PKCE code verifier.</h4>".to_string());
        };

        if params.get("state") != Some(&pending.state) {
            warning!("Callback state does not match the pending authorization.");
            return Html("<h4>State mismatch. Please restart the login.</h4>".to_string());
        }

        pending.code_verifier.clone()
    };

    match exchange_code(&context.config, code, &verifier).await {
        Ok(token) => {
            if let Some(pending) = context.session.lock().await.as_mut() {
                pending.token = Some(token);
            }
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>".to_string())
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>".to_string())
        }
    }
}

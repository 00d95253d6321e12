use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{Res, api, spotify::auth::AuthContext};

pub fn router(context: Arc<AuthContext>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(context)))
}

pub async fn start_api_server(context: Arc<AuthContext>) -> Res<()> {
    let addr = SocketAddr::from_str(&context.config.server_address)
        .map_err(|e| format!("Failed to parse server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(context)).await?;
    Ok(())
}

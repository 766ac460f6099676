pub mod config;

mod app;
mod assets;
mod issues;
mod session;
mod state;
mod store;
mod templates;

use std::net::SocketAddr;

pub use app::app;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app(config)).await.expect("server error");
}

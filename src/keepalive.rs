use axum::Router;
use axum::routing::get;
use std::io;
use std::net::SocketAddr;
use tracing::info;

// 외부 업타임 체크용. 봇 상태와는 무관하다
pub fn router() -> Router {
    Router::new().route("/", get(alive))
}

async fn alive() -> &'static str {
    "I'm alive"
}

pub async fn serve(addr: SocketAddr) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("keep-alive endpoint listening on {}", addr);
    axum::serve(listener, router()).await
}

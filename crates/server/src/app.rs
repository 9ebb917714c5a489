use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::{AppState, routes};

pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let router = routes::router(self.state);
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "listening");
        axum::serve(listener, router).await?;
        Ok(())
    }
}

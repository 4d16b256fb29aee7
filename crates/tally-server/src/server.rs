use std::sync::Arc;

use tokio::net::TcpListener;

use tally_node::TallyNode;

use crate::auth::{AllowAllAuth, AuthProvider};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Shared state behind every request handler.
#[derive(Clone)]
pub struct AppState {
    pub node: Arc<TallyNode>,
    pub auth: Arc<dyn AuthProvider>,
    pub config: ServerConfig,
}

/// HTTP front end for an embedded tally node.
pub struct TallyServer {
    state: AppState,
}

impl TallyServer {
    /// A server with its own node and the allow-all auth provider.
    pub fn new(config: ServerConfig) -> Self {
        let node = Arc::new(TallyNode::with_config(config.node_config()));
        Self::with_node(node, Arc::new(AllowAllAuth), config)
    }

    pub fn with_node(
        node: Arc<TallyNode>,
        auth: Arc<dyn AuthProvider>,
        config: ServerConfig,
    ) -> Self {
        Self {
            state: AppState { node, auth, config },
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    pub fn node(&self) -> &Arc<TallyNode> {
        &self.state.node
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests. The live indexing task runs for the life
    /// of the server so the view follows appends without explicit
    /// refresh calls.
    pub async fn serve(self) -> ServerResult<()> {
        let live = self.state.node.start_live();
        let app = self.router();
        let listener = TcpListener::bind(&self.state.config.bind_addr).await?;
        tracing::info!("tally server listening on {}", self.state.config.bind_addr);
        let result = axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()));
        live.abort();
        result
    }
}

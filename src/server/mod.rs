use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::agent_engine::engine::Planner;
use crate::commands;
use crate::errors::{AgentError, AgentResult};

pub mod error;

pub struct ServerState {
    pub planner: Planner,
    pub started: Instant,
    pub started_at: DateTime<Utc>,
    /// `/command` requests seen. Relaxed ordering; diagnostics only.
    pub requests: AtomicU64,
}

impl ServerState {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner,
            started: Instant::now(),
            started_at: Utc::now(),
            requests: AtomicU64::new(0),
        }
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/", get(commands::status_text))
        .route("/status", get(commands::status_text))
        .route("/health", get(commands::health))
        .route("/command", post(commands::command))
        .route("/models", get(commands::models))
        .route(
            "/settings",
            get(commands::get_settings).post(commands::update_settings),
        )
        .fallback(commands::not_found)
        .with_state(state)
        .layer(cors)
}

/// A running listener. Dropping it stops the server.
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Server {
    pub async fn start(state: Arc<ServerState>, host: &str, port: u16) -> AgentResult<Self> {
        let listener = TcpListener::bind((host, port)).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                AgentError::Server(format!(
                    "port {port} is already in use; pick another port or stop the existing process"
                ))
            } else {
                AgentError::Server(format!("failed to bind {host}:{port}: {e}"))
            }
        })?;
        let addr = listener.local_addr()?;
        let app = router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "server loop exited with error");
            }
        });

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) -> AgentResult<()> {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| AgentError::Server(format!("server task failed: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }
}

//! HTTP server that publishes `.torrent` descriptors.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;

struct Published {
    files: HashMap<String, Vec<u8>>,
    hits: AtomicUsize,
}

/// Every path not published answers `404 Not Found`.
pub struct DescriptorServer {
    addr: SocketAddr,
    published: Arc<Published>,
    handle: JoinHandle<()>,
}

impl DescriptorServer {
    /// # Panics
    ///
    /// Will panic if the server can not bind a local port.
    pub async fn start(files: Vec<(&str, Vec<u8>)>) -> Self {
        let published = Arc::new(Published {
            files: files.into_iter().map(|(name, bytes)| (name.to_owned(), bytes)).collect(),
            hits: AtomicUsize::new(0),
        });

        let app = Router::new().route("/{name}", get(serve)).with_state(published.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, published, handle }
    }

    pub fn url(&self, name: &str) -> String {
        format!("http://{}/{name}", self.addr)
    }

    /// Number of requests received, published or not.
    pub fn hits(&self) -> usize {
        self.published.hits.load(Ordering::SeqCst)
    }
}

impl Drop for DescriptorServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(State(published): State<Arc<Published>>, Path(name): Path<String>) -> Response {
    published.hits.fetch_add(1, Ordering::SeqCst);

    match published.files.get(&name) {
        Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

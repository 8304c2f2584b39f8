//! Shared utilities for integration tests.

use std::net::SocketAddr;

use dynamic_headers::config::loader::parse_config;
use dynamic_headers::{HttpServer, MiddlewareRegistry, Shutdown};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Parse `toml_src` with the default registry and serve it on 127.0.0.1:0.
pub async fn start_server(toml_src: &str) -> TestServer {
    let registry = MiddlewareRegistry::default();
    let config = parse_config(toml_src, &registry).expect("valid config");
    let server = HttpServer::new(config, &registry).expect("routes compile");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    TestServer { addr, shutdown, handle }
}

/// HTTP client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

//! Shared utilities for integration tests.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::net::TcpListener;

use pagetree::config::PagetreeConfig;
use pagetree::handler::HandlerCache;
use pagetree::http::HttpServer;
use pagetree::routing::RouteTable;

/// Writes a file under `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Builds a route table over `root` with the default handler file name.
#[allow(dead_code)]
pub fn build_table(root: &Path) -> RouteTable {
    RouteTable::build(root, "route.rhai", 0).unwrap()
}

/// Boots a server over `root` on an ephemeral port and returns its address.
///
/// The server task is left running; it dies with the test process.
#[allow(dead_code)]
pub async fn start_server(root: &Path) -> SocketAddr {
    let mut config = PagetreeConfig::default();
    config.app.root = root.to_path_buf();

    let table = RouteTable::build(&config.app.root, &config.app.route_file, 0).unwrap();
    let table = Arc::new(ArcSwap::from_pointee(table));
    let handlers = Arc::new(HandlerCache::new());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, table, handlers);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

/// HTTP client that talks straight to the test server, without following
/// redirects.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

use crate::harness::init_test_tracing;
use pelican_core::auth::Credentials;
use pelican_core::conf::SupervisorConfig;
use pelican_core::filter::FilterStore;
use pelican_core::server::build_pingora_server;
use reqwest::blocking::{Client, RequestBuilder};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const USERNAME: &str = "cloud";
pub const PASSWORD: &str = "pelican";

/// Handle to a running supervisor on a private port.
pub struct TestServer {
    base_url: String,
    client: Client,
    store: Arc<FilterStore>,
}

impl TestServer {
    /// Start a supervisor with an empty registry.
    ///
    /// Every call gets its own port and store, so tests can run in parallel.
    pub fn start() -> Self {
        init_test_tracing();

        let listen_port = free_port();

        let mut cfg = SupervisorConfig::default();
        cfg.server.listen = format!("127.0.0.1:{listen_port}");
        cfg.server.threads = Some(1);
        cfg.auth = Self::credentials();
        cfg.validate().expect("test config is valid");

        let store = Arc::new(FilterStore::new());
        let server =
            build_pingora_server(&cfg, store.clone()).expect("failed to build pelican server");

        // Run server in background thread
        thread::spawn(move || {
            server.run_forever();
        });

        let base_url = format!("http://127.0.0.1:{listen_port}");
        wait_for_server(&base_url);

        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .expect("failed to build client");

        Self {
            base_url,
            client,
            store,
        }
    }

    pub fn credentials() -> Credentials {
        Credentials::new(USERNAME, PASSWORD)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The registry the server is serving, for asserting on state directly.
    pub fn store(&self) -> &Arc<FilterStore> {
        &self.store
    }

    /// Request with no `Authorization` header.
    pub fn anonymous(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Request authenticated as the test user.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.anonymous(method, path)
            .basic_auth(USERNAME, Some(PASSWORD))
    }
}

/// Poll until the server responds (or panic).
fn wait_for_server(listen_addr: &str) {
    let addr = listen_addr.strip_prefix("http://").unwrap_or(listen_addr);

    let deadline = Instant::now() + Duration::from_secs(2);

    loop {
        match TcpStream::connect(addr) {
            Ok(_) => return,
            Err(_) => {
                if Instant::now() > deadline {
                    panic!("server failed to start at {}", listen_addr);
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

/// Allocate a free port on localhost.
fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

//! Shared integration test fixtures.

use std::time::Duration;

/// A server instance running in a background task for one test.
pub struct TestServer {
    port: u16,
}

impl TestServer {
    /// Spawn the server on the given port and wait until it answers health
    /// checks. Each test uses its own port so tests can run in parallel.
    pub async fn start(port: u16) -> Self {
        tokio::spawn(async move {
            if let Err(e) = codepair_rs::run_server("127.0.0.1", port, codepair_rs::ui::DEFAULT_SWEEP_INTERVAL).await {
                eprintln!("test server error: {e}");
            }
        });

        let server = Self { port };
        server.wait_until_ready().await;
        server
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    #[allow(dead_code)] // not every test binary opens websockets
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    async fn wait_until_ready(&self) {
        let client = reqwest::Client::new();
        let url = format!("{}/api/health", self.base_url());
        for _ in 0..50 {
            if let Ok(response) = client.get(&url).send().await
                && response.status() == 200
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("server on port {} did not become ready", self.port);
    }
}

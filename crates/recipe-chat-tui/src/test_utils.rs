//! Shared helpers for the terminal client's unit tests.

use std::time::Duration;

use recipe_chat_core::RasaClient;

use crate::app::App;

/// Loopback port 9 (discard): nothing listens, connections are refused.
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9/webhooks/rest/webhook";

/// App whose agent can never be reached, so every request fails fast.
pub fn unreachable_app() -> App {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    App::new(RasaClient::with_client(UNREACHABLE_ENDPOINT, client))
}

/// Poll until the outstanding request has been settled.
pub async fn settle(app: &mut App) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while app.is_busy() {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.poll_pending().await;
        }
    })
    .await
    .expect("request never settled");
}

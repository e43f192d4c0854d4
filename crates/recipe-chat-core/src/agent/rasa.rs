use reqwest::Client;
use tracing::{debug, info};

use super::{Agent, OutboundMessage, Reply};
use crate::error::DeliveryError;

/// Rasa REST channel webhook on a locally running assistant.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5005/webhooks/rest/webhook";

/// Client for a Rasa `rest` channel webhook.
#[derive(Clone)]
pub struct RasaClient {
    client: Client,
    endpoint: String,
}

impl RasaClient {
    pub fn new(endpoint: &str) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: &str, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Agent for RasaClient {
    async fn deliver(&self, message: &OutboundMessage) -> Result<Vec<Reply>, DeliveryError> {
        info!(endpoint = %self.endpoint, chars = message.message.chars().count(), "sending message to agent");

        // No credentials, no cookies: a plain JSON post.
        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }

        let body = response.bytes().await?;
        let replies: Vec<Reply> = serde_json::from_slice(&body)?;
        debug!(count = replies.len(), "agent replied");
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn test_client(endpoint: &str) -> RasaClient {
        let client = Client::builder().no_proxy().build().unwrap();
        RasaClient::with_client(endpoint, client)
    }

    /// Accept one connection, answer it with `status` and `body`, and hand back
    /// the raw request that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{addr}/webhooks/rest/webhook"), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_deliver_posts_json_and_parses_replies() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"recipient_id":"user","text":"hi!"},{"recipient_id":"user","text":"how can I help?"}]"#,
        )
        .await;

        let replies = test_client(&url)
            .deliver(&OutboundMessage::new("hello"))
            .await
            .unwrap();
        assert_eq!(replies, vec![Reply::new("hi!"), Reply::new("how can I help?")]);

        let request = server.await.unwrap();
        let lowered = request.to_lowercase();
        assert!(lowered.starts_with("post /webhooks/rest/webhook http/1.1"));
        assert!(lowered.contains("content-type: application/json"));
        assert!(!lowered.contains("cookie:"));
        assert!(request.ends_with(r#"{"sender":"user","message":"hello"}"#));
    }

    #[tokio::test]
    async fn test_empty_reply_list_is_success() {
        let (url, server) = serve_once("200 OK", "[]").await;

        let replies = test_client(&url)
            .deliver(&OutboundMessage::new("anything"))
            .await
            .unwrap();
        assert!(replies.is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;

        let err = test_client(&url)
            .deliver(&OutboundMessage::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Status(code) if code.as_u16() == 500));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_shape_is_malformed() {
        let (url, server) = serve_once("200 OK", r#"{"text":"not a list"}"#).await;

        let err = test_client(&url)
            .deliver(&OutboundMessage::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Malformed(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_agent_is_transport_error() {
        // Grab a free port, then close it so nothing is listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = test_client(&format!("http://{addr}/webhooks/rest/webhook"))
            .deliver(&OutboundMessage::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }

    #[test]
    fn test_default_endpoint_is_rasa_rest_channel() {
        assert_eq!(RasaClient::new(DEFAULT_ENDPOINT).endpoint(), DEFAULT_ENDPOINT);
    }
}

//! HTTP transport seam
//!
//! Operations hand a fully built [`ODataRequest`] to an [`HttpTransport`] and get
//! back the status code and decoded body. [`ReqwestTransport`] is the default;
//! hosts and tests can supply their own.

use async_trait::async_trait;
use log::{debug, trace};
use serde_json::Value;

use super::request::ODataRequest;
use crate::error::TransportError;

/// Status code and decoded body of a completed request
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request; `Err` only when no status code is available
    async fn send(&self, request: &ODataRequest) -> Result<RawResponse, TransportError>;
}

/// Transport backed by a `reqwest::Client`, using the client's own timeouts
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ODataRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| {
                TransportError::with_source("failed to serialize request body", e)
            })?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!("{} {} -> {}", request.method, request.url, status);
        trace!("Response body: {}", text);

        Ok(RawResponse {
            status,
            body: decode_body(&text),
        })
    }
}

/// Decode a response body: JSON when it parses, a JSON string otherwise, `null` when empty
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Request line, lowercase header map and body as seen on the wire
    struct Captured {
        request_line: String,
        headers: HashMap<String, String>,
        body: String,
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    /// Accept one connection, answer it with `status_line` and `reply`, return what was sent
    async fn serve_once(
        status_line: &'static str,
        reply: &'static str,
    ) -> (String, tokio::task::JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = find_header_end(&buf) {
                    break end;
                }
            };

            let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
            let mut lines = head.lines();
            let request_line = lines.next().unwrap_or_default().to_string();
            let headers: HashMap<String, String> = lines
                .filter_map(|line| line.split_once(':'))
                .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
                .collect();

            let content_length = headers
                .get("content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < head_end + 4 + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let body = String::from_utf8_lossy(&buf[head_end + 4..]).to_string();

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                reply.len(),
                reply
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            Captured {
                request_line,
                headers,
                body,
            }
        });

        (format!("http://{}", addr), handle)
    }

    fn local_transport() -> ReqwestTransport {
        ReqwestTransport::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("  \n"), Value::Null);
        assert_eq!(decode_body(r#"{"value": []}"#), json!({"value": []}));
        assert_eq!(decode_body("plain text"), json!("plain text"));
    }

    #[tokio::test]
    async fn test_post_sends_headers_and_json_body() {
        let (base, server) = serve_once("HTTP/1.1 201 Created", r#"{"accountid":"a-1"}"#).await;

        let request = ODataRequest::new(Method::POST, format!("{}/accounts", base), "T")
            .with_body(json!({"name": "Acme"}));
        let response = local_transport().send(&request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, json!({"accountid": "a-1"}));

        let captured = server.await.unwrap();
        assert!(captured.request_line.starts_with("POST /accounts "));
        assert_eq!(captured.headers.get("authorization").map(String::as_str), Some("T"));
        assert_eq!(captured.headers.get("odata-version").map(String::as_str), Some("4.0"));
        assert_eq!(captured.headers.get("odata-maxversion").map(String::as_str), Some("4.0"));
        assert_eq!(
            captured.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(captured.body, r#"{"name":"Acme"}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let (base, server) = serve_once("HTTP/1.1 404 Not Found", r#"{"error":{"code":"0x80040217"}}"#).await;

        let request = ODataRequest::new(Method::DELETE, format!("{}/accounts(a-1)", base), "T");
        let response = local_transport().send(&request).await.unwrap();

        assert_eq!(response.status, 404);
        let captured = server.await.unwrap();
        assert!(captured.request_line.starts_with("DELETE /accounts(a-1) "));
        assert!(captured.body.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = ODataRequest::new(Method::GET, format!("http://{}/accounts", addr), "T");
        let result = local_transport().send(&request).await;

        assert!(result.is_err());
    }
}

//! Mock rules API server for testing
//!
//! This module provides a mock HTTP server that simulates the filtered
//! stream rules endpoint, allowing the blocking transport to be exercised
//! end-to-end without credentials or network access.
//!
//! The mock implements the same response structure as the real API:
//! - GET returns `{ data: [{id, value, tag}, ...] }`
//! - POST decodes `{add, delete}` and returns `{ data, meta: { summary } }`
//! - API-level rejections return `{ errors: [{title, type, details}] }`

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value as JsonValue};

/// Mock rules API server for testing
pub struct MockRulesServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for mock behaviour
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Rules returned by the listing endpoint, as (id, value, tag)
    pub seed_rules: Vec<(String, String, String)>,
    /// Whether to reject every request with 401
    pub fail_auth: bool,
    /// Whether POSTs report a logical error (`errors` array, HTTP 200)
    pub reject_rules: bool,
}

impl MockRulesServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let next_id = Arc::new(AtomicU64::new(100));

        // Non-blocking accept loop allows graceful shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let ids = next_id.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &ids);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Endpoint URL to hand to the transport under test
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}/2/tweets/search/stream/rules", self.port)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockRulesServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, next_id: &AtomicU64) {
    let request = match read_request(&mut stream) {
        Some(req) => req,
        None => return,
    };

    let first_line = request.lines().next().unwrap_or("");
    let method = first_line.split_whitespace().next().unwrap_or("");

    if config.fail_auth || !request.to_lowercase().contains("authorization: bearer ") {
        send_response(
            &mut stream,
            401,
            "Unauthorized",
            r#"{"title": "Unauthorized", "status": 401}"#,
        );
        return;
    }

    match method {
        "GET" => {
            let data: Vec<JsonValue> = config
                .seed_rules
                .iter()
                .map(|(id, value, tag)| json!({"id": id, "value": value, "tag": tag}))
                .collect();
            let body = if data.is_empty() {
                json!({"meta": {"result_count": 0}})
            } else {
                json!({"data": data, "meta": {"result_count": data.len()}})
            };
            send_response(&mut stream, 200, "OK", &body.to_string());
        }
        "POST" => {
            let body = request
                .split_once("\r\n\r\n")
                .map(|(_, b)| b)
                .unwrap_or("");
            let payload: JsonValue = serde_json::from_str(body).unwrap_or(json!({}));
            let response = build_bulk_response(config, &payload, next_id);
            send_response(&mut stream, 200, "OK", &response.to_string());
        }
        _ => {
            send_response(
                &mut stream,
                405,
                "Method Not Allowed",
                r#"{"title": "Method Not Allowed"}"#,
            );
        }
    }
}

fn build_bulk_response(config: &MockConfig, payload: &JsonValue, next_id: &AtomicU64) -> JsonValue {
    if config.reject_rules {
        return json!({
            "errors": [
                {"title": "Invalid Rule", "type": "invalid_rule", "details": ["bad syntax"]}
            ]
        });
    }

    let mut data = Vec::new();
    let mut created = 0u64;
    let mut deleted = 0u64;

    if let Some(adds) = payload.get("add").and_then(JsonValue::as_array) {
        for entry in adds {
            let id = next_id.fetch_add(1, Ordering::SeqCst);
            data.push(json!({
                "id": id.to_string(),
                "value": entry.get("value").cloned().unwrap_or(JsonValue::Null),
                "tag": entry.get("tag").cloned().unwrap_or(JsonValue::Null),
            }));
            created += 1;
        }
    }

    if let Some(ids) = payload
        .get("delete")
        .and_then(|d| d.get("ids"))
        .and_then(JsonValue::as_array)
    {
        deleted = ids.len() as u64;
    }

    let mut response = json!({
        "meta": {
            "summary": {
                "created": created,
                "not_created": 0,
                "deleted": deleted,
                "not_deleted": 0,
                "valid": created,
                "invalid": 0,
            }
        }
    });
    if !data.is_empty() {
        response["data"] = JsonValue::Array(data);
    }
    response
}

/// Read the request head plus as much body as Content-Length promises
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            if buffer.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    Some(String::from_utf8_lossy(&buffer).into_owned())
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::HttpTransport;
    use crate::domain::result::Error;
    use crate::ports::RulesTransport;
    use crate::services::RuleService;
    use crate::wire::BulkOperations;
    use crate::Rule;
    use std::sync::Arc;

    fn service_for(server: &MockRulesServer) -> RuleService {
        let transport =
            HttpTransport::new_with_endpoint("test-token", &server.endpoint()).unwrap();
        RuleService::new(Arc::new(transport))
    }

    #[test]
    fn test_mock_server_starts() {
        let server = MockRulesServer::start(MockConfig::default()).unwrap();
        assert!(server.port > 0);
    }

    #[test]
    fn test_list_rules_end_to_end() {
        let server = MockRulesServer::start(MockConfig {
            seed_rules: vec![
                ("1".into(), "cat".into(), "animals".into()),
                ("2".into(), "dog".into(), "animals".into()),
            ],
            ..Default::default()
        })
        .unwrap();

        let rules = service_for(&server).all().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id(), Some("1"));
        assert_eq!(rules[1].value(), "dog");
    }

    #[test]
    fn test_empty_listing_end_to_end() {
        let server = MockRulesServer::start(MockConfig::default()).unwrap();
        let rules = service_for(&server).all().unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_create_assigns_server_id() {
        let server = MockRulesServer::start(MockConfig::default()).unwrap();
        let rule = service_for(&server).create("cat has:images", None).unwrap();
        assert!(rule.is_persisted());
        assert_eq!(rule.value(), "cat has:images");
    }

    #[test]
    fn test_bulk_delete_end_to_end() {
        let server = MockRulesServer::start(MockConfig::default()).unwrap();
        let outcome = service_for(&server)
            .bulk(BulkOperations::new().delete(vec![Rule::new("cat").with_id("1")]))
            .unwrap();
        assert_eq!(outcome.summary.unwrap().deleted, 1);
    }

    #[test]
    fn test_auth_failure_propagates_as_transport_error() {
        let server = MockRulesServer::start(MockConfig {
            fail_auth: true,
            ..Default::default()
        })
        .unwrap();

        let result = service_for(&server).all();
        match result.unwrap_err() {
            Error::Transport(msg) => assert!(msg.contains("Authentication failed")),
            other => panic!("expected Transport error, got: {other:?}"),
        }
    }

    #[test]
    fn test_api_rejection_surfaces_remote_error() {
        let server = MockRulesServer::start(MockConfig {
            reject_rules: true,
            ..Default::default()
        })
        .unwrap();

        let result = service_for(&server).create("malformed ((", None);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid Rule: bad syntax(invalid_rule)"
        );
    }

    #[test]
    fn test_transport_fetch_raw_body() {
        let server = MockRulesServer::start(MockConfig {
            seed_rules: vec![("9".into(), "fish".into(), "fish".into())],
            ..Default::default()
        })
        .unwrap();

        let transport =
            HttpTransport::new_with_endpoint("test-token", &server.endpoint()).unwrap();
        let body = transport.fetch_rules().unwrap();
        assert_eq!(body["data"][0]["id"], "9");
    }
}

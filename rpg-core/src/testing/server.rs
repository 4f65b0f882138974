//! Loopback `/chat/completions` server for HTTP-level tests.

use super::lock;
use serde_json::{json, Value};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Largest request body the server will read.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A stalled client is dropped after this long.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// How the mock server answers `/chat/completions`.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Always answer with one choice carrying this text.
    Completion(String),
    /// Answer with `reply` only when the last user message equals `prompt`;
    /// anything else gets a 400.
    ForPrompt { prompt: String, reply: String },
    /// Send this status and body verbatim.
    Raw { status: u16, body: String },
}

/// A request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Content of the last user message in the body.
    pub fn prompt(&self) -> Option<&str> {
        self.body["messages"]
            .as_array()?
            .iter()
            .rev()
            .find(|m| m["role"] == "user")
            .and_then(|m| m["content"].as_str())
    }
}

/// A tiny single-threaded HTTP/1.1 server bound to an ephemeral loopback port.
///
/// Each connection carries one request and is closed after the response.
/// The server stops when dropped.
pub struct MockCompletionServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockCompletionServer {
    pub fn start(reply: MockReply) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let requests = Arc::clone(&requests);
            let shutdown = Arc::clone(&shutdown);
            std::thread::spawn(move || {
                for stream in listener.incoming() {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Ok(stream) = stream {
                        let _ = handle_connection(stream, &reply, &requests);
                    }
                }
            })
        };

        Ok(Self {
            addr,
            requests,
            shutdown,
            handle: Some(handle),
        })
    }

    /// Shorthand for [`MockReply::Completion`].
    pub fn completion(text: impl Into<String>) -> io::Result<Self> {
        Self::start(MockReply::Completion(text.into()))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL including the `/v1` prefix, ready for `OPENAI_BASE_URL`.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop so it sees the flag.
        let _ = TcpStream::connect_timeout(&self.addr, IO_TIMEOUT);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A parsed request head.
struct Head {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
}

impl Head {
    /// Declared body length, `Ok(0)` when absent.
    fn content_length(&self) -> Result<usize, String> {
        let Some((_, value)) = self.headers.iter().find(|(k, _)| k == "content-length") else {
            return Ok(0);
        };
        let length: usize = value
            .parse()
            .map_err(|_| format!("invalid content-length: {value}"))?;
        if length > MAX_BODY_BYTES {
            return Err(format!("body of {length} bytes exceeds {MAX_BODY_BYTES}"));
        }
        Ok(length)
    }
}

fn read_head(reader: &mut impl BufRead) -> io::Result<Option<Head>> {
    let mut request_line = String::new();
    if reader.read_line(&mut request_line)? == 0 {
        return Ok(None);
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    Ok(Some(Head {
        method,
        path,
        headers,
    }))
}

fn handle_connection(
    mut stream: TcpStream,
    reply: &MockReply,
    requests: &Mutex<Vec<RecordedRequest>>,
) -> io::Result<()> {
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;
    let mut reader = BufReader::new(stream.try_clone()?);

    let Some(head) = read_head(&mut reader)? else {
        return Ok(());
    };

    let (status, payload) = match head.content_length() {
        Err(message) => (400, error_body(&message)),
        Ok(length) => {
            let mut body = vec![0u8; length];
            reader.read_exact(&mut body)?;
            let recorded = RecordedRequest {
                method: head.method,
                path: head.path,
                headers: head.headers,
                body: serde_json::from_slice(&body).unwrap_or(Value::Null),
            };
            let response = respond(reply, &recorded);
            lock(requests).push(recorded);
            response
        }
    };

    write!(
        stream,
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        reason_phrase(status),
        payload.len()
    )?;
    stream.flush()
}

fn respond(reply: &MockReply, request: &RecordedRequest) -> (u16, String) {
    if request.method != "POST" || !request.path.ends_with("/chat/completions") {
        return (404, error_body("not found"));
    }
    let model = request.body["model"].as_str().unwrap_or("mock");

    match reply {
        MockReply::Completion(text) => (200, completion_body(model, text)),
        MockReply::ForPrompt { prompt, reply } => {
            if request.prompt() == Some(prompt.as_str()) {
                (200, completion_body(model, reply))
            } else {
                (400, error_body("unexpected prompt"))
            }
        }
        MockReply::Raw { status, body } => (*status, body.clone()),
    }
}

fn completion_body(model: &str, text: &str) -> String {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 0,
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0 }
    })
    .to_string()
}

fn error_body(message: &str) -> String {
    json!({ "error": { "message": message } }).to_string()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

//! Shared helpers for integration tests
//!
//! - [`StubTransport`]: in-process transport with a canned reply
//! - [`serve_once`]: one-shot HTTP server on localhost that captures the raw request

#![allow(dead_code)]

use async_trait::async_trait;
use bgremove_api::{
    BgRemovalError, ImagePayload, PreparedRequest, Result, ServiceId, Transport, TransportResponse,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Small JPEG-typed payload named `photo.jpg`
pub fn jpeg_payload() -> ImagePayload {
    ImagePayload::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3], "image/jpeg").with_file_name("photo.jpg")
}

/// Transport replying with a fixed response (or failure), counting calls
#[derive(Clone)]
pub struct StubTransport {
    reply: std::result::Result<TransportResponse, String>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    services: Arc<std::sync::Mutex<Vec<ServiceId>>>,
}

impl StubTransport {
    pub fn respond(status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
        Self {
            reply: Ok(TransportResponse {
                status,
                content_type: content_type.map(str::to_owned),
                body: body.to_vec(),
            }),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            services: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn png() -> Self {
        Self::respond(200, Some("image/png"), &PNG_MAGIC)
    }

    pub fn fail(message: &str) -> Self {
        let mut stub = Self::png();
        stub.reply = Err(message.to_string());
        stub
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn services(&self) -> Vec<ServiceId> {
        self.services.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &PreparedRequest<'_>) -> Result<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.services.lock().unwrap().push(request.service);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(BgRemovalError::transport(message.clone())),
        }
    }
}

/// Raw request captured by [`serve_once`]
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// Value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Accept one connection, capture the request, answer with the given response
///
/// Returns the base URL and a task resolving to the captured request.
pub async fn serve_once(
    status_line: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v1/removebg", listener.local_addr().unwrap());

    let task = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;

        let mut response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(&body);
        socket.write_all(&response).await.unwrap();
        socket.shutdown().await.ok();
        captured
    });

    (url, task)
}

/// Accept one connection and never answer
pub async fn serve_silently() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v1/removebg", listener.local_addr().unwrap());

    let task = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    (url, task)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).into_owned();
    let mut captured = CapturedRequest {
        head,
        body: Vec::new(),
    };

    let chunked = captured
        .header("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));
    let expected = captured
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok());

    loop {
        let received = buffer.len() - head_end;
        let complete = match expected {
            Some(length) => received >= length,
            None if chunked => buffer.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        if complete {
            break;
        }
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    captured.body = buffer[head_end..].to_vec();
    captured
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

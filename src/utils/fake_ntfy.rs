//! A scripted stand-in for a ntfy server, used by tests that need a response
//! body which trickles in or never ends (something a canned mock cannot do).
//!
//! POST requests are recorded and answered with `publish_status`. GET requests
//! are recorded and answered with a chunked body made of `lines`; the server
//! then either finishes the body or holds the socket until the client hangs up.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub title: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub lines: Vec<String>,
    pub hold_open: bool,
    pub publish_status: u16,
    pub stream_status: u16,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            hold_open: false,
            publish_status: 200,
            stream_status: 200,
        }
    }
}

impl Script {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn publish_status(mut self, status: u16) -> Self {
        self.publish_status = status;
        self
    }

    pub fn stream_status(mut self, status: u16) -> Self {
        self.stream_status = status;
        self
    }
}

/// A JSON stream line for a message event.
pub(crate) fn payload_line(topic: &str, body: &str) -> String {
    serde_json::json!({
        "id": "msg1",
        "time": 1678886400,
        "event": "message",
        "topic": topic,
        "message": body,
    })
    .to_string()
}

pub(crate) fn keepalive_line(topic: &str) -> String {
    serde_json::json!({
        "id": "ka1",
        "time": 1678886400,
        "event": "keepalive",
        "topic": topic,
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub(crate) struct FakeNtfy {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnects: Arc<AtomicUsize>,
}

impl FakeNtfy {
    pub async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake ntfy");
        let addr = listener.local_addr().expect("fake ntfy address");

        let server = Self {
            url: format!("http://{addr}"),
            requests: Arc::default(),
            disconnects: Arc::default(),
        };

        let shared = server.clone();
        let script = Arc::new(script);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let shared = shared.clone();
                let script = script.clone();
                tokio::spawn(async move {
                    let _ = shared.handle(socket, &script).await;
                });
            }
        });

        server
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Poll until a held-open stream has seen its client hang up.
    pub async fn wait_for_disconnect(&self) -> bool {
        for _ in 0..200 {
            if self.disconnects.load(Ordering::SeqCst) > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    async fn handle(&self, socket: TcpStream, script: &Script) -> io::Result<()> {
        let mut reader = BufReader::new(socket);

        loop {
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).await? == 0 {
                return Ok(());
            }
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut content_length = 0usize;
            let mut title = None;
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).await? == 0 {
                    return Ok(());
                }
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    let value = value.trim();
                    match name.to_ascii_lowercase().as_str() {
                        "content-length" => content_length = value.parse().unwrap_or(0),
                        "title" => title = Some(value.to_string()),
                        _ => {}
                    }
                }
            }

            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).await?;

            self.requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path,
                title,
                body: String::from_utf8_lossy(&body).into_owned(),
            });

            if method == "POST" {
                let head = format!(
                    "HTTP/1.1 {} {}\r\ncontent-length: 0\r\n\r\n",
                    script.publish_status,
                    reason(script.publish_status)
                );
                reader.get_mut().write_all(head.as_bytes()).await?;
                continue;
            }

            return self.stream(reader, script).await;
        }
    }

    async fn stream(&self, mut reader: BufReader<TcpStream>, script: &Script) -> io::Result<()> {
        if script.stream_status != 200 {
            let body = r#"{"code":40401,"http":404,"error":"page not found"}"#;
            let response = format!(
                "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                script.stream_status,
                reason(script.stream_status),
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).await?;
            return Ok(());
        }

        let socket = reader.get_mut();
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson; charset=utf-8\r\ntransfer-encoding: chunked\r\n\r\n",
            )
            .await?;
        for line in &script.lines {
            let data = format!("{line}\n");
            let chunk = format!("{:x}\r\n{}\r\n", data.len(), data);
            socket.write_all(chunk.as_bytes()).await?;
            socket.flush().await?;
        }

        if script.hold_open {
            let mut buf = [0u8; 256];
            loop {
                match reader.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => continue,
                }
            }
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        } else {
            socket.write_all(b"0\r\n\r\n").await?;
            socket.shutdown().await?;
        }
        Ok(())
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        _ => "Internal Server Error",
    }
}

/// Client for local test servers, bypassing any proxy set in the environment.
pub(crate) fn local_client(url: &str) -> crate::client::NtfyClient {
    let http = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build test http client");
    crate::client::NtfyClient::with_http_client(url, http)
}

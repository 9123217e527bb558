#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::JoinHandle;
use std::time::Duration;

use leaklens_cli::config::Config;
use leaklens_cli::ui::terminal::{Terminal, Tone};

/// Terminal fed from a fixed list of answers. Running out of answers reads as
/// end of input.
pub struct ScriptedTerminal {
    inputs: VecDeque<String>,
    pub output: Vec<(Tone, String)>,
}

impl ScriptedTerminal {
    pub fn new(lines: &[&str]) -> Self {
        ScriptedTerminal {
            inputs: lines.iter().map(|l| l.to_string()).collect(),
            output: Vec::new(),
        }
    }

    pub fn printed(&self) -> String {
        self.output
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn printed_with(&self, tone: Tone) -> Vec<&str> {
        self.output
            .iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, line)| line.as_str())
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_line(&mut self, _prompt: &str) -> io::Result<String> {
        self.inputs
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        let answer = self.read_line(prompt)?;
        Ok(match answer.trim() {
            "" => default,
            a => a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"),
        })
    }

    fn say(&mut self, tone: Tone, text: &str) {
        self.output.push((tone, text.to_string()));
    }

    fn pause(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn http_response(status: u16, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status,
        match status {
            200 => "OK",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        },
        body.len(),
        body
    )
}

/// Serve the given responses to consecutive connections on an ephemeral
/// port. The handle yields the request line of every request served.
pub fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind to ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    let handle = std::thread::spawn(move || {
        let mut request_lines = Vec::new();
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let text = String::from_utf8_lossy(&request);
            request_lines.push(text.lines().next().unwrap_or_default().to_string());
            let _ = stream.write_all(http_response(status, &body).as_bytes());
            let _ = stream.flush();
        }
        request_lines
    });

    (format!("http://{}/lookup", addr), handle)
}

/// Test configuration rooted at `root` and pointed at `api_url`.
pub fn config(root: &Path, api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        api_key: "test-key".into(),
        api_timeout: Duration::from_secs(5),
        probe_timeout: Duration::from_secs(5),
        system_proxy: false,
        ..Config::for_root(root)
    }
}

pub const ONE_ACCOUNT: &str =
    r#"{"users_accounts":[{"username":"u1","password":"p1"}],"total_accounts":1,"time":"120ms"}"#;

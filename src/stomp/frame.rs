use std::io::{Error, ErrorKind, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// A single STOMP frame: command line, header lines, optional body,
/// NUL-terminated on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Frame {
    pub fn new(command: &str) -> Self {
        Frame {
            command: command.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Serializes the frame for the wire.
    ///
    /// Header values are escaped per STOMP 1.2, except on CONNECT frames
    /// which STOMP keeps 1.0-compatible with literal headers.
    pub fn encode(&self) -> Vec<u8> {
        let escape_headers = self.command != "CONNECT" && self.command != "CONNECTED";
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.command.as_bytes());
        out.push(b'\n');
        for (name, value) in &self.headers {
            if escape_headers {
                out.extend_from_slice(escape(name).as_bytes());
                out.push(b':');
                out.extend_from_slice(escape(value).as_bytes());
            } else {
                out.extend_from_slice(name.as_bytes());
                out.push(b':');
                out.extend_from_slice(value.as_bytes());
            }
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out.push(b'\0');
        out
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            ':' => escaped.push_str("\\c"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape(raw: &str) -> Result<String> {
    let mut unescaped = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('r') => unescaped.push('\r'),
            Some('n') => unescaped.push('\n'),
            Some('c') => unescaped.push(':'),
            other => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("invalid header escape sequence: \\{:?}", other),
                ))
            }
        }
    }
    Ok(unescaped)
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Err(Error::new(
            ErrorKind::UnexpectedEof,
            "connection closed mid-frame",
        ));
    }
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line).map_err(|e| Error::new(ErrorKind::InvalidData, e))
}

/// Reads one frame, skipping any heart-beat EOLs preceding it.
pub async fn read_frame<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Frame> {
    // Command line; empty lines between frames are server heart-beats.
    let command = loop {
        let line = read_line(reader).await?;
        if !line.is_empty() {
            break line;
        }
    };

    let escaped_headers = command != "CONNECT" && command != "CONNECTED";
    let mut headers = Vec::new();
    loop {
        let line = read_line(reader).await?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':').ok_or_else(|| {
            Error::new(ErrorKind::InvalidData, format!("malformed header: {line}"))
        })?;
        if escaped_headers {
            headers.push((unescape(name)?, unescape(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok());

    let body = match content_length {
        Some(length) => {
            let mut body = vec![0u8; length];
            reader.read_exact(&mut body).await?;
            let mut terminator = [0u8; 1];
            reader.read_exact(&mut terminator).await?;
            if terminator[0] != b'\0' {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    "frame body not NUL-terminated",
                ));
            }
            body
        }
        None => {
            let mut body = Vec::new();
            reader.read_until(b'\0', &mut body).await?;
            if body.pop() != Some(b'\0') {
                return Err(Error::new(
                    ErrorKind::UnexpectedEof,
                    "connection closed mid-frame",
                ));
            }
            body
        }
    };

    Ok(Frame {
        command,
        headers,
        body,
    })
}

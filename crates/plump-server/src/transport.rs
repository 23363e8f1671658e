use crate::config::Timeouts;
use crate::render::render;
use plump_core::protocol::{Message, write_frame};
use std::io::{self, BufRead, BufReader, StdinLock, Stdout, Write};
use std::net::{SocketAddr, TcpStream};

/// A line-oriented conversation with whoever sits in a seat.
pub trait Transport {
    fn send(&mut self, message: &Message) -> io::Result<()>;

    /// Next reply line with surrounding whitespace trimmed.
    fn read_line(&mut self) -> io::Result<String>;

    fn prompt(&mut self, message: &Message) -> io::Result<String> {
        self.send(message)?;
        self.read_line()
    }

    /// Short label for log events.
    fn describe(&self) -> String;
}

fn read_trimmed<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "peer closed the connection",
        ));
    }
    Ok(line.trim().to_string())
}

/// Plain text over any reader/writer pair; the local operator uses stdin/stdout.
pub struct ConsoleTransport<R, W> {
    reader: R,
    writer: W,
}

impl ConsoleTransport<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> Transport for ConsoleTransport<R, W> {
    fn send(&mut self, message: &Message) -> io::Result<()> {
        let text = render(message);
        if message.is_prompt() {
            write!(self.writer, "{text}")?;
        } else {
            writeln!(self.writer, "{text}")?;
        }
        self.writer.flush()
    }

    fn read_line(&mut self) -> io::Result<String> {
        read_trimmed(&mut self.reader)
    }

    fn describe(&self) -> String {
        "console".to_string()
    }
}

/// How messages are encoded for a network seat. Replies are always text lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireFormat {
    #[default]
    Text,
    Json,
    Binary,
}

impl WireFormat {
    pub const JSON_PREFIX: char = '|';
    pub const BINARY_PREFIX: char = '#';

    /// Splits a handshake reply into the selected format and the bare name.
    pub fn from_name_reply(reply: &str) -> (WireFormat, &str) {
        if let Some(name) = reply.strip_prefix(Self::JSON_PREFIX) {
            (WireFormat::Json, name.trim())
        } else if let Some(name) = reply.strip_prefix(Self::BINARY_PREFIX) {
            (WireFormat::Binary, name.trim())
        } else {
            (WireFormat::Text, reply.trim())
        }
    }
}

pub struct NetworkTransport {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    format: WireFormat,
    peer: Option<SocketAddr>,
}

impl NetworkTransport {
    pub fn new(stream: TcpStream, timeouts: Timeouts) -> io::Result<Self> {
        stream.set_read_timeout(Some(timeouts.read))?;
        stream.set_write_timeout(Some(timeouts.write))?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr().ok();
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            writer: stream,
            reader,
            format: WireFormat::Text,
            peer,
        })
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    pub fn set_format(&mut self, format: WireFormat) {
        self.format = format;
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl Transport for NetworkTransport {
    fn send(&mut self, message: &Message) -> io::Result<()> {
        match self.format {
            WireFormat::Text => self.write_line(&render(message)),
            WireFormat::Json => {
                let json = message.to_json().map_err(io::Error::other)?;
                self.write_line(&json)
            }
            WireFormat::Binary => write_frame(&mut self.writer, message),
        }
    }

    fn read_line(&mut self) -> io::Result<String> {
        read_trimmed(&mut self.reader)
    }

    fn describe(&self) -> String {
        self.peer
            .map_or_else(|| "network".to_string(), |addr| addr.to_string())
    }
}

use crate::config::{NAME_MAX_LEN, Timeouts};
use crate::transport::{NetworkTransport, Transport, WireFormat};
use plump_core::model::player::PlayerName;
use plump_core::protocol::Message;
use std::collections::HashSet;
use std::io;
use std::net::{SocketAddr, TcpListener};
use thiserror::Error;
use tracing::{Level, event};

const NAME_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to accept a connection: {0}")]
    Accept(#[source] io::Error),
}

/// A network client that completed the name handshake.
pub struct RemoteSeat {
    pub name: PlayerName,
    pub transport: NetworkTransport,
}

/// Asks for a name until the reply is non-empty, short enough and not in `taken`.
///
/// A leading `|` or `#` on the reply selects JSON or binary messages and is not part of
/// the name.
pub fn negotiate_name<T: Transport + ?Sized>(
    transport: &mut T,
    taken: &HashSet<String>,
) -> io::Result<(PlayerName, WireFormat)> {
    for attempt in 1..=NAME_ATTEMPTS {
        let reply = transport.prompt(&Message::RequestPlayerName)?;
        let (format, name) = WireFormat::from_name_reply(&reply);
        let rejection = if name.is_empty() {
            Some("empty")
        } else if name.len() > NAME_MAX_LEN {
            Some("too long")
        } else if taken.contains(name) {
            Some("taken")
        } else {
            None
        };

        match rejection {
            None => return Ok((PlayerName::new(name), format)),
            Some(reason) => event!(
                target: "plump_server::lobby",
                Level::DEBUG,
                peer = %transport.describe(),
                attempt,
                reason,
                "name rejected"
            ),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "no acceptable player name offered",
    ))
}

pub struct Lobby {
    listener: TcpListener,
    timeouts: Timeouts,
}

impl Lobby {
    pub fn bind(addr: SocketAddr, timeouts: Timeouts) -> Result<Self, LobbyError> {
        let listener =
            TcpListener::bind(addr).map_err(|source| LobbyError::Bind { addr, source })?;
        Ok(Self { listener, timeouts })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts clients until `count` of them are seated. A client that fails the
    /// handshake is dropped and its seat stays open. Accepted names join `taken`.
    pub fn fill(
        &self,
        count: usize,
        taken: &mut HashSet<String>,
    ) -> Result<Vec<RemoteSeat>, LobbyError> {
        let mut seated = Vec::with_capacity(count);
        while seated.len() < count {
            let (stream, addr) = self.listener.accept().map_err(LobbyError::Accept)?;
            event!(
                target: "plump_server::lobby",
                Level::INFO,
                peer = %addr,
                open = count - seated.len(),
                "client connected"
            );

            let handshake =
                NetworkTransport::new(stream, self.timeouts).and_then(|mut transport| {
                    let (name, format) = negotiate_name(&mut transport, &*taken)?;
                    transport.set_format(format);
                    Ok(RemoteSeat { name, transport })
                });

            match handshake {
                Ok(seat) => {
                    event!(
                        target: "plump_server::lobby",
                        Level::INFO,
                        peer = %addr,
                        name = %seat.name,
                        format = ?seat.transport.format(),
                        "seat taken"
                    );
                    taken.insert(seat.name.as_str().to_string());
                    seated.push(seat);
                }
                Err(err) => event!(
                    target: "plump_server::lobby",
                    Level::WARN,
                    peer = %addr,
                    error = %err,
                    "handshake failed"
                ),
            }
        }
        Ok(seated)
    }
}

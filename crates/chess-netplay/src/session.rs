//! The single TCP connection between the two peers.
//!
//! The Host listens and accepts exactly one peer; the Joiner connects to
//! the Host. Once connected, [`Connection::spawn`] splits the stream into
//! a reader task that turns inbound lines into controller events and a
//! writer task that sends committed local moves.

use crate::controller::ControllerEvent;
use chess_core::{Color, Move, WireError, MAX_WIRE_LEN};
use chess_engine::RemoteMoveError;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Failures that end a session. None of them are retried.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed move record '{line}': {source}")]
    Malformed {
        line: String,
        #[source]
        source: WireError,
    },

    #[error("boards out of sync: {0}")]
    Desync(#[from] RemoteMoveError),

    #[error("peer closed the connection")]
    Closed,
}

/// Which side of the connection this peer is. Fixed for the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Listens for the peer and plays White.
    Host,
    /// Connects to the Host and plays Black.
    Joiner,
}

impl Role {
    pub const fn color(self) -> Color {
        match self {
            Role::Host => Color::White,
            Role::Joiner => Color::Black,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "Host"),
            Role::Joiner => write!(f, "Joiner"),
        }
    }
}

/// An established connection to the other peer.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

/// Handles of the tasks started by [`Connection::spawn`].
pub struct SessionTasks {
    /// Send committed local moves here.
    pub outbound: mpsc::UnboundedSender<Move>,
    pub reader: JoinHandle<()>,
    pub writer: JoinHandle<()>,
}

impl Connection {
    /// Binds `addr` and waits for the Joiner.
    pub async fn host(addr: impl ToSocketAddrs) -> Result<Self, SessionError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            "Hosting on {}, waiting for a player to join",
            listener.local_addr()?
        );
        Self::accept(listener).await
    }

    /// Accepts the first peer on an already bound listener, then closes it.
    pub async fn accept(listener: TcpListener) -> Result<Self, SessionError> {
        let (stream, peer) = listener.accept().await?;
        tracing::info!("Player joined from {}", peer);
        Self::from_stream(stream, peer)
    }

    /// Connects to the Host at `addr`.
    pub async fn join(addr: impl ToSocketAddrs) -> Result<Self, SessionError> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr()?;
        tracing::info!("Connected to host at {}", peer);
        Self::from_stream(stream, peer)
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr) -> Result<Self, SessionError> {
        // One short line per move; do not let Nagle hold it back.
        stream.set_nodelay(true)?;
        Ok(Connection { stream, peer })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Starts the reader and writer tasks.
    ///
    /// Inbound moves arrive on `events` as [`ControllerEvent::RemoteMove`].
    /// The first malformed record, I/O error or end of stream is reported
    /// as [`ControllerEvent::Disconnected`] and stops the reader.
    pub fn spawn(self, events: mpsc::Sender<ControllerEvent>) -> SessionTasks {
        let (read_half, mut write_half) = self.stream.into_split();
        let peer = self.peer;
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Move>();

        let inbound_events = events.clone();
        let reader = tokio::spawn(async move {
            let mut reader = BufReader::new(read_half);
            let mut record = Vec::with_capacity(MAX_WIRE_LEN + 1);
            let failure = loop {
                match read_record(&mut reader, &mut record).await {
                    Ok(true) => match Move::from_wire_bytes(&record) {
                        Ok(mv) => {
                            tracing::debug!("Received {} from {}", mv, peer);
                            if inbound_events
                                .send(ControllerEvent::RemoteMove(mv))
                                .await
                                .is_err()
                            {
                                return;
                            }
                        }
                        Err(source) => {
                            break SessionError::Malformed {
                                line: String::from_utf8_lossy(&record).into_owned(),
                                source,
                            }
                        }
                    },
                    Ok(false) => break SessionError::Closed,
                    Err(e) => break SessionError::Io(e),
                }
            };
            tracing::debug!("Reader for {} stopping: {}", peer, failure);
            inbound_events
                .send(ControllerEvent::Disconnected(failure))
                .await
                .ok();
        });

        let writer = tokio::spawn(async move {
            while let Some(mv) = outbound_rx.recv().await {
                let line = format!("{}\n", mv.to_wire());
                let sent = async {
                    write_half.write_all(line.as_bytes()).await?;
                    write_half.flush().await
                };
                if let Err(e) = sent.await {
                    tracing::error!("Failed to send {} to {}: {}", mv, peer, e);
                    events.send(ControllerEvent::Disconnected(e.into())).await.ok();
                    return;
                }
                tracing::debug!("Sent {} to {}", mv, peer);
            }
        });

        SessionTasks {
            outbound,
            reader,
            writer,
        }
    }
}

/// Reads one newline-terminated record into `record`, without the newline.
///
/// At most one byte more than [`MAX_WIRE_LEN`] is buffered, so an
/// unterminated flood comes back as an over-long record instead of growing
/// without bound. Returns `false` at end of stream.
async fn read_record<R>(reader: &mut R, record: &mut Vec<u8>) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    record.clear();
    let limit = MAX_WIRE_LEN as u64 + 1;
    let n = reader.take(limit).read_until(b'\n', record).await?;
    if n == 0 {
        return Ok(false);
    }
    if record.last() == Some(&b'\n') {
        record.pop();
    }
    Ok(true)
}

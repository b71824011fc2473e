//! TCP transport: a framed line reader and writer over one socket.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, warn};

use crate::error::ConnectionError;
use crate::line::{LineCodec, LineCodecError};

impl From<LineCodecError> for ConnectionError {
    fn from(err: LineCodecError) -> Self {
        match err {
            LineCodecError::LineTooLong { limit } => ConnectionError::LineTooLong { limit },
            LineCodecError::Io(err) => ConnectionError::Io(Arc::new(err)),
        }
    }
}

/// One connection to the server.
///
/// The socket is split so reading and writing never wait on each other.
/// Writes go through the framed sink, which buffers and applies
/// backpressure rather than dropping lines.
pub struct Transport {
    reader: FramedRead<OwnedReadHalf, LineCodec>,
    writer: FramedWrite<OwnedWriteHalf, LineCodec>,
}

impl Transport {
    /// Dial `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self, ConnectionError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|err| ConnectionError::Connect {
                addr: addr.to_owned(),
                source: Arc::new(err),
            })?;
        debug!(addr, "tcp connected");
        Ok(Self::tcp(stream))
    }

    /// Wrap an established stream.
    pub fn tcp(stream: TcpStream) -> Self {
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        let (read, write) = stream.into_split();
        Self {
            reader: FramedRead::new(read, LineCodec::new()),
            writer: FramedWrite::new(write, LineCodec::new()),
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }

    /// Next complete line. `None` once the server closed the connection.
    pub async fn read_line(&mut self) -> Option<Result<String, ConnectionError>> {
        self.reader
            .next()
            .await
            .map(|res| res.map_err(ConnectionError::from))
    }

    /// Write CRLF-terminated lines and flush them.
    pub async fn write_lines(&mut self, lines: Vec<String>) -> Result<(), ConnectionError> {
        for line in lines {
            self.writer.feed(line).await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Flush and shut down the write half.
    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        self.writer.close().await?;
        Ok(())
    }
}

use futures::{SinkExt, StreamExt};
use protocol::{Packet, RconCodec};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;

use crate::error::{ClientError, Result};

/// One TCP socket wrapped in the RCON codec. Owned exclusively by the
/// session manager; never shared across sessions.
#[derive(Debug)]
pub struct Connection {
    framed: Framed<TcpStream, RconCodec>,
    io_timeout: Duration,
}

impl Connection {
    pub async fn open(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Result<Self> {
        let addr = format!("{host}:{port}");
        debug!("Connecting to RCON server: {}", addr);

        let stream = match tokio::time::timeout(connect_timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ClientError::Connection(e.to_string())),
            Err(_) => {
                return Err(ClientError::Connection(format!("Connect timeout: {addr}")));
            }
        };

        // Control-plane traffic: latency matters, throughput does not.
        let _ = stream.set_nodelay(true);

        Ok(Self {
            framed: Framed::new(stream, RconCodec::new()),
            io_timeout,
        })
    }

    pub async fn send(&mut self, packet: Packet) -> Result<()> {
        match tokio::time::timeout(self.io_timeout, self.framed.send(packet)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ClientError::Connection("Write timeout".to_string())),
        }
    }

    /// Read the next frame. No deadline here: the authenticator and
    /// correlator wrap their whole read loops in one, so a slow
    /// multi-frame response is not cut off mid-stream.
    pub async fn recv(&mut self) -> Result<Packet> {
        match self.framed.next().await {
            Some(Ok(packet)) => Ok(packet),
            Some(Err(e)) => Err(e.into()),
            None => Err(ClientError::Connection(
                "Server closed the connection".to_string(),
            )),
        }
    }

    /// Non-destructive liveness probe, checked before reusing an idle
    /// session so a peer that closed the socket is detected before a
    /// command is committed to the wire. Bytes that do arrive here are
    /// stray responses; they go back into the decode buffer untouched.
    pub fn is_alive(&mut self) -> bool {
        let mut buf = [0u8; 256];
        match self.framed.get_ref().try_read(&mut buf) {
            Ok(0) => false,
            Ok(n) => {
                self.framed.read_buffer_mut().extend_from_slice(&buf[..n]);
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => true,
            Err(_) => false,
        }
    }

    /// Idempotent; errors on an already-dead socket are ignored.
    pub async fn close(&mut self) {
        let _ = self.framed.close().await;
    }
}

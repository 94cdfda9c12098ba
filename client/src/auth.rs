use protocol::{AUTH_FAILURE_ID, Packet, PacketType};
use std::time::Duration;
use tracing::debug;

use crate::connection::Connection;
use crate::error::{ClientError, Result};

/// One-time login handshake.
///
/// Sends a Login frame carrying the password, then reads until a
/// Command-typed frame arrives: that is the auth response in the
/// server -> client direction. Servers differ in whether they precede
/// it with empty acknowledgement frames, so anything else is skipped
/// rather than counted.
pub async fn authenticate(
    conn: &mut Connection,
    password: &str,
    request_id: i32,
    deadline: Duration,
) -> Result<()> {
    conn.send(Packet::login(request_id, password)).await?;

    let response = tokio::time::timeout(deadline, wait_for_auth_response(conn))
        .await
        .map_err(|_| ClientError::HandshakeTimeout)??;

    if response.request_id == AUTH_FAILURE_ID {
        return Err(ClientError::InvalidCredentials);
    }
    if response.request_id != request_id {
        return Err(ClientError::Connection(format!(
            "Auth response for unexpected request id {}",
            response.request_id
        )));
    }

    debug!("RCON handshake complete");
    Ok(())
}

async fn wait_for_auth_response(conn: &mut Connection) -> Result<Packet> {
    loop {
        let packet = conn.recv().await?;
        if packet.packet_type == PacketType::Command {
            return Ok(packet);
        }
        debug!(
            request_id = packet.request_id,
            "Skipping pre-auth acknowledgement frame"
        );
    }
}

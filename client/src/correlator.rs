use protocol::Packet;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use crate::connection::Connection;
use crate::error::{ClientError, Result};

/// Ids remembered after a timeout so their late responses can be
/// classified as abandoned when dropped. Ids are never reused within a
/// session, so overflow only loses debug-log precision.
const ABANDONED_CAPACITY: usize = 64;

/// Monotonic request-id source for one session. Stays in 1..=i32::MAX
/// and wraps back to 1, so the auth-failure sentinel (-1) can never be
/// produced and ids are effectively never reused.
#[derive(Debug)]
pub struct RequestIds {
    next: i32,
}

impl RequestIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next(&mut self) -> i32 {
        let id = self.next;
        self.next = if self.next == i32::MAX { 1 } else { self.next + 1 };
        id
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one command on an authenticated connection and reassemble its
/// possibly multi-frame response.
///
/// The wire format has no continuation flag, so completion is detected
/// with a sentinel: an empty command sent immediately after the real
/// one. The server processes requests in order, so once the sentinel's
/// response appears, every frame of the real response has arrived.
pub async fn execute_on(
    conn: &mut Connection,
    ids: &mut RequestIds,
    abandoned: &mut HashSet<i32>,
    command: &str,
    deadline: Duration,
) -> Result<String> {
    let request_id = ids.next();
    let sentinel_id = ids.next();

    conn.send(Packet::command(request_id, command)).await?;
    conn.send(Packet::command(sentinel_id, "")).await?;

    let collect = collect_response(conn, abandoned, request_id, sentinel_id);
    match tokio::time::timeout(deadline, collect).await {
        Ok(result) => result,
        Err(_) => {
            remember_abandoned(abandoned, request_id);
            remember_abandoned(abandoned, sentinel_id);
            debug!(
                request_id,
                sentinel_id, "Abandoning request after exec deadline"
            );
            Err(ClientError::ExecTimeout)
        }
    }
}

async fn collect_response(
    conn: &mut Connection,
    abandoned: &mut HashSet<i32>,
    request_id: i32,
    sentinel_id: i32,
) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();
    loop {
        let packet = conn.recv().await?;

        if packet.request_id == sentinel_id {
            // The sentinel's own empty response; the real response is
            // complete.
            return Ok(String::from_utf8_lossy(&body).into_owned());
        }
        if packet.request_id == request_id {
            body.extend_from_slice(&packet.body);
            continue;
        }

        // Stray response from a previously abandoned request. Dropped
        // silently: raising it would fail an unrelated command.
        if abandoned.remove(&packet.request_id) {
            debug!(
                request_id = packet.request_id,
                "Dropping stray response for abandoned request"
            );
        } else {
            debug!(
                request_id = packet.request_id,
                "Dropping response with unknown request id"
            );
        }
    }
}

fn remember_abandoned(abandoned: &mut HashSet<i32>, id: i32) {
    if abandoned.len() >= ABANDONED_CAPACITY {
        abandoned.clear();
    }
    abandoned.insert(id);
}

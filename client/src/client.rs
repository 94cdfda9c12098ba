use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::{SessionManager, SessionState};

/// The facade external collaborators depend on: the command scheduler,
/// the REST command endpoint, and the interactive console all call
/// `execute` and never touch wire-level concepts.
///
/// Cloning shares the underlying session, so one server target gets
/// one serialized, authenticated connection by default. Callers that
/// need isolation build a second client at the cost of an additional
/// authenticated connection.
#[derive(Debug, Clone)]
pub struct RconClient {
    sessions: Arc<SessionManager>,
}

impl RconClient {
    /// Lazy handle: the session is established on first use.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(config)),
        }
    }

    /// Eager handle: connects and verifies the password up front so a
    /// bad configuration fails here rather than on the first command.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config);
        client.sessions.connect().await?;
        Ok(client)
    }

    /// Send one command and return its full response text. Blocks up
    /// to the configured exec timeout; concurrent callers queue.
    pub async fn execute(&self, command: &str) -> Result<String> {
        self.sessions.execute(command).await
    }

    pub async fn close(&self) {
        self.sessions.close().await;
    }

    pub async fn state(&self) -> SessionState {
        self.sessions.state().await
    }
}

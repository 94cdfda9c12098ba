use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth;
use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::correlator::{self, RequestIds};
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticating,
    Ready,
    /// Auth was rejected. A later call still re-attempts the
    /// handshake, surfacing the same error while the password stays
    /// wrong.
    Failed,
}

#[derive(Debug)]
struct Session {
    state: SessionState,
    connection: Option<Connection>,
    ids: RequestIds,
    abandoned: HashSet<i32>,
    last_activity: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            connection: None,
            ids: RequestIds::new(),
            abandoned: HashSet::new(),
            last_activity: Instant::now(),
        }
    }

    async fn teardown(&mut self, state: SessionState) {
        if let Some(mut conn) = self.connection.take() {
            conn.close().await;
        }
        self.state = state;
    }
}

/// Owns one session per server target: the connection, the request-id
/// counter, and the serialization lock.
///
/// The lock is protocol-mandated, not an optimization: two in-flight
/// commands on one connection would make the sentinel-based fragment
/// boundary detection ambiguous. Concurrent callers queue on the mutex
/// and run strictly one at a time.
#[derive(Debug)]
pub struct SessionManager {
    session: Arc<Mutex<Session>>,
    config: Arc<ClientConfig>,
}

impl SessionManager {
    pub fn new(config: ClientConfig) -> Self {
        let config = Arc::new(config);
        let session = Arc::new(Mutex::new(Session::new()));

        // Background reaper: closes a session idle past the timeout so
        // a socket is not held against a server that may have
        // restarted. Stops once the last handle is dropped.
        let weak = Arc::downgrade(&session);
        let idle_timeout = config.idle_timeout();
        tokio::spawn(async move {
            let interval = (idle_timeout / 2).max(std::time::Duration::from_secs(1));
            loop {
                tokio::time::sleep(interval).await;
                let Some(session) = weak.upgrade() else {
                    break;
                };
                let mut session = session.lock().await;
                if session.state == SessionState::Ready
                    && session.last_activity.elapsed() >= idle_timeout
                {
                    info!("Closing idle RCON session");
                    session.teardown(SessionState::Disconnected).await;
                }
            }
        });

        Self { session, config }
    }

    /// Run one command under the session lock, (re)connecting and
    /// re-authenticating first if needed.
    pub async fn execute(&self, command: &str) -> Result<String> {
        let mut session = self.session.lock().await;
        self.ensure_ready(&mut session).await?;

        let Session {
            connection,
            ids,
            abandoned,
            ..
        } = &mut *session;
        let conn = connection.as_mut().ok_or_else(|| {
            ClientError::Connection("Session has no live connection".to_string())
        })?;

        let result =
            correlator::execute_on(conn, ids, abandoned, command, self.config.exec_timeout())
                .await;
        session.last_activity = Instant::now();

        match result {
            Ok(text) => Ok(text),
            Err(e) => {
                if e.is_fatal() {
                    debug!(error = %e, "Tearing down session after fatal error");
                    session.teardown(SessionState::Disconnected).await;
                }
                // The command is never re-sent across a reconnect:
                // many commands are not idempotent, so retrying is the
                // caller's decision.
                Err(e)
            }
        }
    }

    /// Eagerly establish and authenticate the session.
    pub async fn connect(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        self.ensure_ready(&mut session).await
    }

    pub async fn close(&self) {
        let mut session = self.session.lock().await;
        session.teardown(SessionState::Disconnected).await;
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state
    }

    async fn ensure_ready(&self, session: &mut Session) -> Result<()> {
        if session.state == SessionState::Ready {
            if session.last_activity.elapsed() >= self.config.idle_timeout() {
                debug!("Session idle past timeout, reconnecting");
                session.teardown(SessionState::Disconnected).await;
            } else {
                let alive = match session.connection.as_mut() {
                    Some(conn) => conn.is_alive(),
                    None => false,
                };
                if alive {
                    return Ok(());
                } else {
                    // Dead socket found before anything was sent on
                    // it, so reconnecting here loses no command.
                    debug!("Connection no longer alive, reconnecting");
                    session.teardown(SessionState::Disconnected).await;
                }
            }
        }

        let mut backoff = self.config.reconnect_backoff();
        let mut last_error = None;

        for attempt in 1..=self.config.max_reconnect_attempts {
            match self.connect_and_authenticate(session).await {
                Ok(()) => {
                    session.state = SessionState::Ready;
                    session.last_activity = Instant::now();
                    info!(addr = %self.config.addr(), "RCON session ready");
                    return Ok(());
                }
                Err(ClientError::InvalidCredentials) => {
                    session.teardown(SessionState::Failed).await;
                    return Err(ClientError::InvalidCredentials);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "RCON connect attempt failed");
                    session.teardown(SessionState::Disconnected).await;
                    last_error = Some(e);
                    if attempt < self.config.max_reconnect_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ClientError::Connection("No connect attempts made".to_string())))
    }

    async fn connect_and_authenticate(&self, session: &mut Session) -> Result<()> {
        session.state = SessionState::Connecting;
        let mut conn = Connection::open(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout(),
            self.config.io_timeout(),
        )
        .await?;

        session.state = SessionState::Authenticating;
        let auth_id = session.ids.next();
        auth::authenticate(
            &mut conn,
            self.config.password.expose(),
            auth_id,
            self.config.io_timeout(),
        )
        .await?;

        session.connection = Some(conn);
        Ok(())
    }
}

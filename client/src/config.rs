use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// RCON password. The protocol sends it in cleartext on the wire, but
/// this component never logs it or writes it back out; `Debug` and
/// `Display` are redacted.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// The cleartext, for the wire only.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self(password.to_string())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub password: Password,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Deadline for individual reads and writes. RCON traffic is small
    /// control-plane messages, so this stays short.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,

    /// Deadline for a full command round trip, multi-frame responses
    /// included.
    #[serde(default = "default_exec_timeout_secs")]
    pub exec_timeout_secs: u64,

    /// Sessions idle past this are closed so sockets are not held
    /// against a server that may have restarted.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Base delay between reconnect attempts, doubled per attempt.
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,
}

fn default_port() -> u16 {
    25575
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_io_timeout_secs() -> u64 {
    5
}

fn default_exec_timeout_secs() -> u64 {
    10
}

fn default_idle_timeout_secs() -> u64 {
    60
}

fn default_max_reconnect_attempts() -> u32 {
    3
}

fn default_reconnect_backoff_ms() -> u64 {
    250
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<Password>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            connect_timeout_secs: default_connect_timeout_secs(),
            io_timeout_secs: default_io_timeout_secs(),
            exec_timeout_secs: default_exec_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }

    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}

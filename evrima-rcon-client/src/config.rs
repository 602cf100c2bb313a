use crate::RconError;
use std::ops::RangeInclusive;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

const TIMEOUT_RANGE: RangeInclusive<Duration> =
    Duration::from_millis(100)..=Duration::from_millis(60_000);
const MAX_RECONNECT_ATTEMPTS_RANGE: RangeInclusive<u32> = 0..=10;
const RECONNECT_DELAY_RANGE: RangeInclusive<Duration> =
    Duration::from_millis(100)..=Duration::from_millis(60_000);

/// Address and credentials of an RCON server.
///
/// Constructed once per session and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    host: String,
    port: u16,
    password: String,
}

impl ServerConfig {
    /// Validates and creates a server configuration.
    ///
    /// The host may be an IP literal or a hostname. The port must be non-zero and the password
    /// must not be empty.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        password: impl Into<String>,
    ) -> crate::Result<Self> {
        let host = host.into().trim().to_string();
        let password = password.into();

        if host.is_empty() {
            return Err(RconError::InvalidConfig("host must not be empty".to_string()).into());
        }
        if port == 0 {
            return Err(RconError::InvalidConfig("port must be between 1 and 65535".to_string()).into());
        }
        if password.is_empty() {
            return Err(RconError::InvalidConfig("password must not be empty".to_string()).into());
        }

        Ok(ServerConfig {
            host,
            port,
            password,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

/// Tunables for a client session.
///
/// Every field has a default; use the `with_*` methods to override individual values.
/// Options are validated when the session is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Upper bound for each connect, send and receive. Default: 5 s.
    pub timeout: Duration,
    /// Reconnect automatically on connection loss. Default: `true`.
    pub auto_reconnect: bool,
    /// Reconnect attempts before a failure is surfaced. Default: 3.
    pub max_reconnect_attempts: u32,
    /// Base delay of the exponential backoff. Default: 1 s.
    pub reconnect_delay: Duration,
    /// Emit debug-level log lines for this session. Default: `false`.
    pub debug: bool,
    /// Display label used in log lines. Defaults to `host:port`.
    pub name: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            timeout: DEFAULT_TIMEOUT,
            auto_reconnect: true,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            debug: false,
            name: None,
        }
    }
}

impl ClientOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auto_reconnect(mut self, auto_reconnect: bool) -> Self {
        self.auto_reconnect = auto_reconnect;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Checks every option against its allowed range.
    pub fn validate(&self) -> crate::Result<()> {
        if !TIMEOUT_RANGE.contains(&self.timeout) {
            return Err(RconError::InvalidConfig(format!(
                "timeout must be between {} and {} ms, got {}",
                TIMEOUT_RANGE.start().as_millis(),
                TIMEOUT_RANGE.end().as_millis(),
                self.timeout.as_millis()
            ))
            .into());
        }

        if !MAX_RECONNECT_ATTEMPTS_RANGE.contains(&self.max_reconnect_attempts) {
            return Err(RconError::InvalidConfig(format!(
                "max reconnect attempts must be between {} and {}, got {}",
                MAX_RECONNECT_ATTEMPTS_RANGE.start(),
                MAX_RECONNECT_ATTEMPTS_RANGE.end(),
                self.max_reconnect_attempts
            ))
            .into());
        }

        if !RECONNECT_DELAY_RANGE.contains(&self.reconnect_delay) {
            return Err(RconError::InvalidConfig(format!(
                "reconnect delay must be between {} and {} ms, got {}",
                RECONNECT_DELAY_RANGE.start().as_millis(),
                RECONNECT_DELAY_RANGE.end().as_millis(),
                self.reconnect_delay.as_millis()
            ))
            .into());
        }

        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(RconError::InvalidConfig("name must not be blank".to_string()).into());
        }

        Ok(())
    }

    /// The label used for this session, falling back to `host:port`.
    pub fn display_name(&self, server: &ServerConfig) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}:{}", server.host(), server.port()),
        }
    }
}

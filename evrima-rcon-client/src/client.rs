use crate::command::{self, Command};
use crate::config::{ClientOptions, ServerConfig};
use crate::logger::SessionLogger;
use crate::packet::{build_auth_packet, build_command_packet};
use crate::parse::{self, PlayerData, PlayerRecord, ServerDetails};
use crate::transport::Transport;
use crate::RconError;
use std::time::{Duration, SystemTime};

pub use crate::transport::ConnectionState;

/// Upper bound of the reconnect backoff.
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Parsed payload of a command response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Text(String),
    Players(Vec<PlayerRecord>),
    ServerDetails(ServerDetails),
    PlayerData(PlayerData),
}

/// Outcome of one executed command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub success: bool,
    pub command: String,
    pub data: ResponseData,
    /// Response text exactly as received.
    pub raw: String,
    pub timestamp: SystemTime,
}

impl CommandResult {
    fn success(command: Command, raw: String) -> Self {
        let data = match command {
            Command::Players => ResponseData::Players(parse::parse_player_list(&raw)),
            Command::ServerDetails => ResponseData::ServerDetails(parse::parse_server_details(&raw)),
            Command::PlayerData => ResponseData::PlayerData(parse::parse_player_data(&raw)),
            _ => ResponseData::Text(raw.trim_end_matches('\0').to_string()),
        };

        CommandResult {
            success: true,
            command: command.name().to_string(),
            data,
            raw,
            timestamp: SystemTime::now(),
        }
    }

    fn failure(command: &str, message: String) -> Self {
        CommandResult {
            success: false,
            command: command.to_string(),
            data: ResponseData::Text(message),
            raw: String::new(),
            timestamp: SystemTime::now(),
        }
    }

    /// The response text with the frame terminator removed.
    pub fn text(&self) -> &str {
        match &self.data {
            ResponseData::Text(text) => text,
            _ => self.raw.trim_end_matches('\0'),
        }
    }
}

/// Reconnect delay for the given 1-based attempt: `base * 2^(attempt - 1)`, capped at
/// [`MAX_RECONNECT_DELAY`].
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.checked_mul(factor)
        .unwrap_or(MAX_RECONNECT_DELAY)
        .min(MAX_RECONNECT_DELAY)
}

/// An RCON session with one server.
///
/// The session owns at most one connection at a time and replaces it on every reconnect.
/// Commands take `&mut self`, so only one can be in flight; share a session between tasks by
/// wrapping it in a mutex.
#[derive(Debug)]
pub struct RconClient {
    server: ServerConfig,
    options: ClientOptions,
    transport: Option<Transport>,
    reconnect_attempts: u32,
    log: SessionLogger,
}

impl RconClient {
    /// Validates the options and creates a disconnected session.
    pub fn new(server: ServerConfig, options: ClientOptions) -> crate::Result<Self> {
        options.validate()?;
        let log = SessionLogger::new(options.display_name(&server), options.debug);

        Ok(RconClient {
            server,
            options,
            transport: None,
            reconnect_attempts: 0,
            log,
        })
    }

    pub fn name(&self) -> &str {
        self.log.name()
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn state(&self) -> ConnectionState {
        self.transport
            .as_ref()
            .map_or(ConnectionState::Disconnected, Transport::state)
    }

    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().map_or(false, Transport::is_connected)
    }

    /// Reconnect attempts since the last successful connection.
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Connects and authenticates.
    ///
    /// Does nothing if already connected. Failed attempts are retried with exponential backoff
    /// while auto-reconnect is enabled and attempts remain; after that the last error is
    /// returned.
    pub async fn connect(&mut self) -> crate::Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        loop {
            match self.try_connect().await {
                Ok(()) => {
                    if self.reconnect_attempts > 0 {
                        self.log.info(format_args!(
                            "reconnected after {} attempt(s)",
                            self.reconnect_attempts
                        ));
                    }
                    self.reconnect_attempts = 0;
                    return Ok(());
                }
                Err(err) => {
                    self.teardown();

                    if !self.options.auto_reconnect
                        || self.reconnect_attempts >= self.options.max_reconnect_attempts
                    {
                        self.log.error(format_args!("connection failed: {}", err));
                        return Err(err);
                    }

                    self.reconnect_attempts += 1;
                    let delay = backoff_delay(self.options.reconnect_delay, self.reconnect_attempts);
                    self.log.warn(format_args!(
                        "connection failed: {}; retrying in {}ms (attempt {}/{})",
                        err,
                        delay.as_millis(),
                        self.reconnect_attempts,
                        self.options.max_reconnect_attempts
                    ));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Closes the connection. Safe to call at any time.
    pub fn disconnect(&mut self) {
        if self.transport.is_some() {
            self.log.info(format_args!("disconnected"));
        }
        self.teardown();
    }

    /// Executes one command and waits for its response.
    ///
    /// Unknown command names produce a result with `success == false` rather than an error.
    /// Connection failures are retried once after reconnecting when auto-reconnect is enabled.
    pub async fn send_command(
        &mut self,
        name: &str,
        params: Option<&str>,
    ) -> crate::Result<CommandResult> {
        if !self.is_connected() {
            if !self.options.auto_reconnect {
                return Err(RconError::NotConnected.into());
            }
            self.log.debug(format_args!("not connected, connecting before `{}`", name));
            self.connect().await?;
        }

        let definition = match command::definition_for(name) {
            Some(definition) => definition,
            None => {
                self.log.warn(format_args!("unknown command `{}`", name));
                return Ok(CommandResult::failure(
                    name,
                    format!("Unknown command: {}", name),
                ));
            }
        };

        let params = params.filter(|p| !p.is_empty());
        if definition.requires_params && params.is_none() {
            return Err(RconError::InvalidCommand(format!(
                "`{}` requires parameters",
                definition.name
            ))
            .into());
        }

        match self.dispatch(definition.command, params).await {
            Ok(raw) => Ok(CommandResult::success(definition.command, raw)),
            Err(err) if err.is_connection_error() && self.options.auto_reconnect => {
                self.log.warn(format_args!(
                    "`{}` failed: {}; reconnecting and retrying once",
                    name, err
                ));
                self.teardown();
                self.connect().await?;

                let raw = self.dispatch(definition.command, params).await?;
                Ok(CommandResult::success(definition.command, raw))
            }
            Err(err) if err.is_protocol_error() => Err(err),
            Err(err) => {
                self.log.error(format_args!("`{}` failed: {}", name, err));
                Ok(CommandResult::failure(name, err.to_string()))
            }
        }
    }

    /// Executes commands strictly in order, one result per entry.
    ///
    /// A failed entry does not stop the batch; only errors that [`send_command`] itself returns
    /// do.
    ///
    /// [`send_command`]: RconClient::send_command
    pub async fn batch<'a, I>(&mut self, commands: I) -> crate::Result<Vec<CommandResult>>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut results = Vec::new();
        for (name, params) in commands {
            results.push(self.send_command(name, params).await?);
        }
        Ok(results)
    }

    async fn try_connect(&mut self) -> crate::Result<()> {
        self.log.debug(format_args!(
            "connecting to {}:{}",
            self.server.host(),
            self.server.port()
        ));

        let transport = self.transport.insert(Transport::new(self.options.timeout));
        transport.connect(self.server.host(), self.server.port()).await?;

        self.log.debug(format_args!("authenticating"));
        transport
            .authenticate(&build_auth_packet(self.server.password()))
            .await?;

        self.log.info(format_args!("connected"));
        Ok(())
    }

    async fn dispatch(&mut self, command: Command, params: Option<&str>) -> crate::Result<String> {
        let packet = build_command_packet(command.name(), params)?;
        let transport = self.transport.as_mut().ok_or(RconError::NotConnected)?;

        self.log.debug(format_args!(
            "-> {} (0x{:02x}) {:?}",
            command,
            command.opcode(),
            params.unwrap_or("")
        ));
        let raw = transport.send_and_receive(&packet).await?;
        self.log.debug(format_args!("<- {:?}", raw));

        Ok(raw)
    }

    fn teardown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn backoff_doubles_then_caps() {
        let base = Duration::from_millis(1000);
        let delays: Vec<u64> = (1..=7)
            .map(|attempt| backoff_delay(base, attempt).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000, 30000, 30000]);
    }

    #[test]
    fn backoff_never_overflows() {
        assert_eq!(backoff_delay(Duration::from_millis(100), 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(Duration::from_secs(60), 1), MAX_RECONNECT_DELAY);
        assert_eq!(backoff_delay(Duration::from_millis(100), 64), MAX_RECONNECT_DELAY);
    }

    #[test]
    fn results_pick_a_parser_by_command() {
        let players = CommandResult::success(Command::Players, "PlayerList\n1,\nA,\0".to_string());
        assert!(players.success);
        assert_eq!(players.command, "players");
        assert!(matches!(&players.data, ResponseData::Players(list) if list.len() == 1));

        let save = CommandResult::success(Command::Save, "World saved\0".to_string());
        assert_eq!(save.data, ResponseData::Text("World saved".to_string()));
        assert_eq!(save.raw, "World saved\0");
        assert_eq!(save.text(), "World saved");
    }

    #[tokio::test]
    async fn commands_fail_fast_without_auto_reconnect() {
        let server = ServerConfig::new("127.0.0.1", 8888, "pw").unwrap();
        let options = ClientOptions::default().with_auto_reconnect(false);
        let mut client = RconClient::new(server, options).unwrap();

        assert_eq!(client.state(), ConnectionState::Disconnected);
        let err = client.send_command("save", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConnected);
    }

    #[test]
    fn invalid_options_are_rejected_at_construction() {
        let server = ServerConfig::new("127.0.0.1", 8888, "pw").unwrap();
        let options = ClientOptions::default().with_max_reconnect_attempts(99);
        assert_eq!(
            RconClient::new(server, options).unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
    }
}

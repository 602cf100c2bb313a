use log::Level;
use std::fmt::Arguments;

const TARGET: &str = "evrima_rcon_client";

/// Per-session log sink.
///
/// Prefixes every line with the session's display name. Debug lines are only emitted when the
/// session was created with `debug` enabled.
#[derive(Debug, Clone)]
pub(crate) struct SessionLogger {
    name: String,
    debug: bool,
}

impl SessionLogger {
    pub fn new(name: String, debug: bool) -> Self {
        SessionLogger { name, debug }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, args: Arguments<'_>) {
        if self.debug {
            self.log(Level::Debug, args);
        }
    }

    pub fn info(&self, args: Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn warn(&self, args: Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn error(&self, args: Arguments<'_>) {
        self.log(Level::Error, args);
    }

    fn log(&self, level: Level, args: Arguments<'_>) {
        log::log!(target: TARGET, level, "[{}] {}", self.name, args);
    }
}

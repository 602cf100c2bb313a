//! Blocking facade over [`RconClient`](crate::RconClient).
//!
//! Each client drives its own single-threaded Tokio runtime, so it can be used from code that
//! has no async runtime of its own. Do not use it from inside an async context.

use crate::{ClientOptions, CommandResult, ConnectionState, ServerConfig};
use tokio::runtime::{Builder, Runtime};

pub struct RconClient {
    runtime: Runtime,
    inner: crate::RconClient,
}

impl RconClient {
    pub fn new(server: ServerConfig, options: ClientOptions) -> crate::Result<Self> {
        let inner = crate::RconClient::new(server, options)?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(RconClient { runtime, inner })
    }

    pub fn connect(&mut self) -> crate::Result<()> {
        self.runtime.block_on(self.inner.connect())
    }

    pub fn send_command(&mut self, name: &str, params: Option<&str>) -> crate::Result<CommandResult> {
        self.runtime.block_on(self.inner.send_command(name, params))
    }

    pub fn batch<'a, I>(&mut self, commands: I) -> crate::Result<Vec<CommandResult>>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        self.runtime.block_on(self.inner.batch(commands))
    }

    pub fn disconnect(&mut self) {
        self.inner.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Borrows the async session, e.g. to call one of its convenience wrappers through
    /// [`block_on`](RconClient::block_on).
    pub fn inner_mut(&mut self) -> &mut crate::RconClient {
        &mut self.inner
    }

    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

use crate::packet::{decode_latin1, is_auth_accepted};
use crate::RconError;
use futures::FutureExt;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const READ_CHUNK_LEN: usize = 64 * 1024;

/// Connection state of a single transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Authenticating,
    Connected,
    Error,
}

/// One TCP connection to the RCON server.
///
/// Every blocking operation is bounded by `timeout`. Dropping the transport closes the socket.
#[derive(Debug)]
pub(crate) struct Transport {
    stream: Option<TcpStream>,
    state: ConnectionState,
    timeout: Duration,
}

impl Transport {
    pub fn new(timeout: Duration) -> Self {
        Transport {
            stream: None,
            state: ConnectionState::Disconnected,
            timeout,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub async fn connect(&mut self, host: &str, port: u16) -> crate::Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;

        // On timeout the pending connect future is dropped, which closes the half-open socket.
        let stream = match tokio::time::timeout(self.timeout, TcpStream::connect((host, port))).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                self.state = ConnectionState::Error;
                return Err(RconError::ConnectionFailed(err).into());
            }
            Err(_) => {
                self.state = ConnectionState::Error;
                return Err(self.timed_out("connect"));
            }
        };

        stream.set_nodelay(true).ok();
        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Sends the auth packet and checks the reply for the success marker.
    pub async fn authenticate(&mut self, auth_packet: &[u8]) -> crate::Result<()> {
        self.state = ConnectionState::Authenticating;

        let reply = match self.exchange(auth_packet).await {
            Ok(reply) => reply,
            Err(err) => {
                self.state = ConnectionState::Error;
                return Err(err);
            }
        };

        if is_auth_accepted(&reply) {
            self.state = ConnectionState::Connected;
            Ok(())
        } else {
            self.state = ConnectionState::Error;
            Err(RconError::AuthFailed(reply.trim_end_matches('\0').trim().to_string()).into())
        }
    }

    pub async fn send(&mut self, buf: &[u8]) -> crate::Result<()> {
        if self.state != ConnectionState::Connected {
            return Err(RconError::NotConnected.into());
        }
        self.write(buf).await
    }

    /// Waits for exactly one inbound delivery and decodes it.
    pub async fn receive(&mut self) -> crate::Result<String> {
        if self.state != ConnectionState::Connected {
            return Err(RconError::NotConnected.into());
        }
        self.read().await
    }

    pub async fn send_and_receive(&mut self, buf: &[u8]) -> crate::Result<String> {
        self.send(buf).await?;
        self.receive().await
    }

    pub fn disconnect(&mut self) {
        self.stream = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Whether the connection is established and the remote end has not closed it.
    pub fn is_connected(&self) -> bool {
        if self.state != ConnectionState::Connected {
            return false;
        }
        let stream = match &self.stream {
            Some(stream) => stream,
            None => return false,
        };

        // A single poll of a peek: ready with zero bytes means the peer hung up.
        let mut byte = [0u8; 1];
        match stream.peek(&mut byte).now_or_never() {
            None => true,
            Some(Ok(0)) | Some(Err(_)) => false,
            Some(Ok(_)) => true,
        }
    }

    async fn exchange(&mut self, buf: &[u8]) -> crate::Result<String> {
        self.write(buf).await?;
        self.read().await
    }

    async fn write(&mut self, buf: &[u8]) -> crate::Result<()> {
        let timeout = self.timeout;
        let stream = self.stream.as_mut().ok_or(RconError::NotConnected)?;

        let res = with_timeout(timeout, "send", stream.write_all(buf)).await;
        match res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                self.state = ConnectionState::Error;
                Err(RconError::Socket(err).into())
            }
            Err(err) => {
                self.state = ConnectionState::Error;
                Err(err)
            }
        }
    }

    async fn read(&mut self) -> crate::Result<String> {
        let timeout = self.timeout;
        let stream = self.stream.as_mut().ok_or(RconError::NotConnected)?;

        let mut buf = vec![0u8; READ_CHUNK_LEN];
        let res = with_timeout(timeout, "receive", stream.read(&mut buf)).await;
        let read_len = match res {
            Ok(Ok(0)) => {
                self.state = ConnectionState::Error;
                return Err(RconError::Closed.into());
            }
            Ok(Ok(len)) => len,
            Ok(Err(err)) => {
                self.state = ConnectionState::Error;
                return Err(RconError::Socket(err).into());
            }
            Err(err) => {
                self.state = ConnectionState::Error;
                return Err(err);
            }
        };

        Ok(decode_latin1(&buf[..read_len]))
    }

    fn timed_out(&self, operation: &'static str) -> crate::Error {
        RconError::Timeout {
            operation,
            after: self.timeout,
        }
        .into()
    }
}

async fn with_timeout<F: Future>(
    timeout: Duration,
    operation: &'static str,
    fut: F,
) -> crate::Result<F::Output> {
    tokio::time::timeout(timeout, fut).await.map_err(|_| {
        RconError::Timeout {
            operation,
            after: timeout,
        }
        .into()
    })
}

use std::net::TcpStream;
use std::time::Duration;
use log::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};
use crate::drivers::DashboardError;
/// How long one read may block before the worker gets to check its commands.
pub const READ_TIMEOUT: Duration = Duration::from_millis(200);
/// One poll of a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Incoming {
    Payload(String),
    /// Nothing arrived within the read timeout; poll again.
    Idle,
    /// The stream ended; there is no replay.
    Closed,
}
/// Anything that yields device payloads in arrival order.
pub trait Transport {
    fn next_message(&mut self) -> Result<Incoming, DashboardError>;
}
/// In-memory transport for deterministic playback in tests.
#[cfg(test)]
pub struct ManualTransport {
    queue: std::collections::VecDeque<String>,
}
#[cfg(test)]
impl ManualTransport {
    pub fn new<S: Into<String>>(payloads: impl IntoIterator<Item = S>) -> Self {
        Self {
            queue: payloads.into_iter().map(Into::into).collect(),
        }
    }
}
#[cfg(test)]
impl Transport for ManualTransport {
    fn next_message(&mut self) -> Result<Incoming, DashboardError> {
        Ok(self.queue.pop_front().map_or(Incoming::Closed, Incoming::Payload))
    }
}
/// Blocking client for the monitor's `/ws` endpoint.
pub struct WebSocketTransport {
    url: String,
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}
impl WebSocketTransport {
    pub fn connect(url: &str) -> Result<Self, DashboardError> {
        let (socket, response) = tungstenite::connect(url)?;
        info!("connected to {url} (HTTP {})", response.status());
        match socket.get_ref() {
            MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(READ_TIMEOUT))?,
            _ => warn!("{url}: no read timeout on this stream, commands wait for the next frame"),
        }
        Ok(Self {
            url: url.to_owned(),
            socket,
        })
    }
    pub fn url(&self) -> &str {
        &self.url
    }
}
impl Transport for WebSocketTransport {
    fn next_message(&mut self) -> Result<Incoming, DashboardError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Incoming::Payload(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Ok(Incoming::Payload(text)),
                    Err(_) => debug!("dropping non-UTF-8 binary frame from {}", self.url),
                },
                Ok(Message::Close(frame)) => {
                    info!("{} closed the socket: {frame:?}", self.url);
                    return Ok(Incoming::Closed);
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(err))
                    if matches!(
                        err.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    return Ok(Incoming::Idle)
                }
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(Incoming::Closed)
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        let _ = self.socket.close(None);
    }
}

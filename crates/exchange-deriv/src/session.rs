//! One WebSocket connection to the broker, owned by a single trade.
//!
//! Sessions are not pooled: every trade opens its own channel and closes it
//! on the way out, so nothing here needs locking. Every call is bounded by a
//! timeout; nothing blocks past it.

use crate::error::{DerivError, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub struct DerivSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    call_timeout: Duration,
}

impl DerivSession {
    /// Opens a connection to the broker endpoint.
    ///
    /// # Errors
    /// Returns `DerivError::Connect` if the handshake fails or times out.
    pub async fn connect(url: &str, call_timeout: Duration) -> Result<Self> {
        tracing::debug!(%url, "opening broker connection");
        let (stream, response) = timeout(call_timeout, connect_async(url))
            .await
            .map_err(|_| DerivError::Connect(format!("connect to {url} timed out")))?
            .map_err(|err| DerivError::Connect(format!("connect to {url} failed: {err}")))?;
        tracing::debug!(status = %response.status(), "broker connection established");
        Ok(Self {
            stream,
            call_timeout,
        })
    }

    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Sends one request message.
    ///
    /// # Errors
    /// Returns an error if the send fails or exceeds the call timeout.
    pub async fn send(&mut self, payload: &Value) -> Result<()> {
        let message = Message::Text(payload.to_string());
        timeout(self.call_timeout, self.stream.send(message))
            .await
            .map_err(|_| DerivError::Timeout(self.call_timeout))?
            .map_err(DerivError::from)
    }

    /// Receives the next JSON message, waiting at most `wait`.
    ///
    /// Control frames and unparseable payloads are skipped, not consumed
    /// destructively: this channel carries a single trade, so anything
    /// unrecognized is simply not the message being waited for.
    ///
    /// # Errors
    /// Returns `DerivError::Timeout` when the wait elapses and
    /// `DerivError::ConnectionClosed` if the remote hangs up.
    pub async fn recv_within(&mut self, wait: Duration) -> Result<Value> {
        let deadline = Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(DerivError::Timeout(wait));
            }
            let frame = timeout(remaining, self.stream.next())
                .await
                .map_err(|_| DerivError::Timeout(wait))?;
            match frame {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<Value>(&text) {
                    Ok(value) => return Ok(value),
                    Err(err) => tracing::debug!(%err, "skipping unparseable frame"),
                },
                Some(Ok(Message::Close(_))) | None => return Err(DerivError::ConnectionClosed),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
            }
        }
    }

    /// Receives the next JSON message within the default call timeout.
    ///
    /// # Errors
    /// Same as [`DerivSession::recv_within`].
    pub async fn recv(&mut self) -> Result<Value> {
        self.recv_within(self.call_timeout).await
    }

    /// Closes the channel. Close failures are logged and swallowed; by this
    /// point the trade already has its outcome.
    pub async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            tracing::debug!(%err, "error closing broker connection");
        }
    }
}

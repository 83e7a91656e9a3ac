//! Websocket transport to the host application.
//!
//! The host listens on `ws://localhost:<port>`. After connecting, the plugin
//! registers with `{"event": <registerEvent>, "uuid": <pluginUUID>}`; from
//! then on every text frame carries exactly one JSON message.

use async_trait::async_trait;
use deck_events::{encode, Command};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use super::{Inbound, Outbound};
use crate::config::Registration;
use crate::error::ChannelError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Receiving half of a websocket connection.
pub struct WsInbound {
    stream: SplitStream<WsStream>,
    finished: bool,
}

/// Sending half of a websocket connection.
pub struct WsOutbound {
    sink: Mutex<SplitSink<WsStream, Message>>,
}

/// Connects to the host and completes registration.
///
/// The host drops the first log line a plugin writes, so a priming
/// `logMessage` is sent before the halves are handed out.
pub async fn connect(registration: &Registration) -> Result<(WsInbound, WsOutbound), ChannelError> {
    let url = format!("ws://localhost:{}", registration.port);
    debug!(url = %url, "Connecting to host");

    let (stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| ChannelError::Connect(e.to_string()))?;
    let (sink, stream) = stream.split();

    let outbound = WsOutbound {
        sink: Mutex::new(sink),
    };
    let register = json!({
        "event": registration.register_event,
        "uuid": registration.plugin_uuid,
    });
    outbound
        .send_message(register.to_string())
        .await
        .map_err(|e| ChannelError::Connect(format!("registration failed: {e}")))?;

    let priming = encode(&Command::log("deck: connected"), &registration.plugin_uuid)
        .map_err(|e| ChannelError::Connect(e.to_string()))?;
    outbound.send_message(priming).await?;

    info!(
        port = registration.port,
        plugin_uuid = %registration.plugin_uuid,
        "Registered with host"
    );

    Ok((
        WsInbound {
            stream,
            finished: false,
        },
        outbound,
    ))
}

#[async_trait]
impl Inbound for WsInbound {
    async fn next_message(&mut self) -> Result<Option<String>, ChannelError> {
        if self.finished {
            return Ok(None);
        }
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Host closed the connection");
                    self.finished = true;
                    return Ok(None);
                }
                // Ping, pong, binary and raw frames carry no events.
                Some(Ok(_)) => continue,
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    self.finished = true;
                    return Ok(None);
                }
                Some(Err(e)) => {
                    // tungstenite does not recover after a read error.
                    self.finished = true;
                    return Err(ChannelError::Transport(e.to_string()));
                }
            }
        }
    }
}

#[async_trait]
impl Outbound for WsOutbound {
    async fn send_message(&self, raw: String) -> Result<(), ChannelError> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::text(raw)).await.map_err(|e| match e {
            WsError::ConnectionClosed | WsError::AlreadyClosed => ChannelError::Closed,
            other => ChannelError::Transport(other.to_string()),
        })
    }
}

// Connection seam for the realtime channel.
//
// `ChannelManager` only ever sees a `Connection`: a sink of outbound text
// frames and a stream of inbound ones that ends when the peer closes. The
// production connector speaks WebSocket; tests plug in channel pairs.

use std::pin::Pin;

use futures_util::future::{BoxFuture, ready};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use url::Url;

use crate::error::Error;

/// One open duplex text channel.
pub struct Connection {
    pub sink: Pin<Box<dyn Sink<String, Error = Error> + Send>>,
    pub stream: Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>,
}

impl Connection {
    pub fn new<S, R>(sink: S, stream: R) -> Self
    where
        S: Sink<String, Error = Error> + Send + 'static,
        R: Stream<Item = Result<String, Error>> + Send + 'static,
    {
        Self {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens connections for a [`ChannelManager`](super::ChannelManager).
pub trait Connector: Send + Sync {
    fn connect(&self, url: Url) -> BoxFuture<'static, Result<Connection, Error>>;
}

/// WebSocket connector built on `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: Url) -> BoxFuture<'static, Result<Connection, Error>> {
        Box::pin(connect_ws(url))
    }
}

async fn connect_ws(url: Url) -> Result<Connection, Error> {
    tracing::info!(url = %url, "connecting to realtime channel");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let (ws_stream, _response) = tokio_tungstenite::connect_async(ClientRequestBuilder::new(uri))
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    let (write, read) = ws_stream.split();

    let sink = write
        .sink_map_err(|e| Error::WebSocketClosed(e.to_string()))
        .with(|text: String| ready(Ok::<_, Error>(Message::text(text))));

    // A close frame ends the stream; non-text frames are skipped
    // (tungstenite answers pings itself).
    let stream = read
        .take_while(|frame| ready(!matches!(frame, Ok(Message::Close(_)))))
        .filter_map(|frame| {
            ready(match frame {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(_) => None,
                Err(e) => Some(Err(Error::WebSocketClosed(e.to_string()))),
            })
        });

    Ok(Connection::new(sink, stream))
}

//! Turns bus messages into local fan-out.
//!
//! Every instance runs exactly one relay task. The task pattern-subscribes to
//! all topic channels and hands each message to the local
//! [`Manager::publish`]. A message that cannot be routed or decoded is logged
//! and skipped. If Redis drops the subscription the relay reconnects with
//! capped exponential backoff.
use crate::error::{Error, SseErrorKind};
use crate::manager::Manager;
use crate::message::Envelope;
use crate::topic::Topic;
use futures::{future, Stream, StreamExt};
use log::*;
use redis::{aio::PubSub, Client, Msg};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// A raw message as received from the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayMessage {
    pub channel: String,
    pub payload: String,
}

impl RelayMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    fn from_redis(msg: Msg) -> Option<Self> {
        let channel = msg.get_channel_name().to_string();
        match msg.get_payload::<String>() {
            Ok(payload) => Some(Self { channel, payload }),
            Err(e) => {
                warn!("Skipping non-text payload on {channel}: {e}");
                None
            }
        }
    }
}

pub struct Relay {
    manager: Arc<Manager>,
    patterns: Vec<String>,
}

impl Relay {
    pub fn new(manager: Arc<Manager>) -> Self {
        Self {
            manager,
            patterns: Topic::channel_patterns(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Route one bus message to local connections. Returns the number of
    /// connections that received it.
    pub fn handle_message(&self, message: &RelayMessage) -> Result<usize, Error> {
        let topic = Topic::from_channel(&message.channel).ok_or_else(|| Error {
            source: None,
            error_kind: SseErrorKind::UnknownChannel(message.channel.clone()),
        })?;
        let envelope = Envelope::decode(&message.payload)?;

        Ok(self.manager.publish(&topic, &envelope))
    }

    /// Drain a message stream until it ends. Errors on single messages never
    /// stop the loop.
    pub async fn run<S>(&self, messages: S)
    where
        S: Stream<Item = RelayMessage>,
    {
        let mut messages = std::pin::pin!(messages);
        while let Some(message) = messages.next().await {
            match self.handle_message(&message) {
                Ok(delivered) => trace!(
                    "Relayed message on {} to {delivered} local connection(s)",
                    message.channel
                ),
                Err(e) => warn!("Skipping relayed message on {}: {e}", message.channel),
            }
        }
    }

    async fn subscribe(&self, client: &Client) -> Result<PubSub, Error> {
        let mut pubsub = client.get_async_pubsub().await.map_err(Error::bus)?;
        for pattern in &self.patterns {
            pubsub.psubscribe(pattern).await.map_err(Error::bus)?;
        }
        Ok(pubsub)
    }

    /// Subscribe and relay forever, reconnecting whenever the subscription
    /// fails or ends.
    pub async fn listen(self, client: Client) {
        let mut delay = INITIAL_BACKOFF;
        loop {
            match self.subscribe(&client).await {
                Ok(pubsub) => {
                    info!("SSE relay subscribed to {:?}", self.patterns);
                    delay = INITIAL_BACKOFF;
                    let messages = pubsub
                        .into_on_message()
                        .filter_map(|msg| future::ready(RelayMessage::from_redis(msg)));
                    self.run(messages).await;
                    warn!("SSE relay subscription ended");
                }
                Err(e) => error!("SSE relay failed to subscribe: {e}"),
            }

            info!("SSE relay reconnecting in {delay:?}");
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_BACKOFF);
        }
    }

    /// Start the relay on its own task.
    pub fn spawn(self, client: Client) -> JoinHandle<()> {
        tokio::spawn(self.listen(client))
    }
}

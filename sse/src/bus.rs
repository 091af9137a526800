//! Cross-instance message bus.
//!
//! Publishing instances push encoded envelopes onto a per-topic channel; every
//! instance's [`Relay`](crate::relay::Relay) turns them back into local fan-out.
use crate::error::Error;
use async_trait::async_trait;
use log::*;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

#[async_trait]
pub trait Bus: Send + Sync {
    async fn publish(&self, channel: &str, payload: String) -> Result<(), Error>;
}

/// Redis pub/sub publisher.
#[derive(Clone)]
pub struct RedisBus {
    connection: ConnectionManager,
}

impl RedisBus {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl Bus for RedisBus {
    async fn publish(&self, channel: &str, payload: String) -> Result<(), Error> {
        let mut conn = self.connection.clone();
        let receivers: i64 = conn
            .publish(channel, payload)
            .await
            .map_err(Error::bus)?;
        trace!("Published to {channel}, {receivers} instance(s) listening");
        Ok(())
    }
}

/// A Redis client for the relay's dedicated pub/sub connection, plus a
/// multiplexed connection shared by presence commands and publishing.
#[derive(Clone)]
pub struct RedisConnection {
    pub client: Client,
    pub manager: ConnectionManager,
}

pub async fn connect(redis_url: &str) -> Result<RedisConnection, Error> {
    let client = Client::open(redis_url).map_err(Error::bus)?;
    let manager = ConnectionManager::new(client.clone())
        .await
        .map_err(Error::bus)?;

    info!("Connected to Redis for SSE presence and relay");

    Ok(RedisConnection { client, manager })
}

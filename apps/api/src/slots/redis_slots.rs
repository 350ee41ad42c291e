use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use super::{SlotBackend, SlotError};

/// Slots kept in Redis, one string key per slot.
#[derive(Clone)]
pub struct RedisSlots {
    conn: MultiplexedConnection,
}

impl RedisSlots {
    pub async fn connect(redis_url: &str) -> Result<Self, SlotError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis slot store connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SlotBackend for RedisSlots {
    async fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SlotError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), SlotError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(keys).await?;
        Ok(())
    }
}

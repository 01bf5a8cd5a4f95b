//! Postgres `LISTEN` adapter.
//!
//! Expects triggers on `stock_moves` and `items` that `NOTIFY` the configured
//! channels. Payloads are ignored.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgListener;

use super::{ChangeFeed, ChangeNotice};

pub struct PgListenFeed {
    listener: PgListener,
}

impl PgListenFeed {
    pub async fn connect(database_url: &str, channels: &[String]) -> Result<Self, sqlx::Error> {
        let mut listener = PgListener::connect(database_url).await?;
        listener
            .listen_all(channels.iter().map(String::as_str))
            .await?;
        tracing::info!(?channels, "listening for change notifications");
        Ok(Self { listener })
    }
}

#[async_trait]
impl ChangeFeed for PgListenFeed {
    async fn next(&mut self) -> Option<ChangeNotice> {
        match self.listener.recv().await {
            Ok(notification) => Some(ChangeNotice::for_channel(notification.channel())),
            Err(err) => {
                // The listener reconnects on the next `recv`; anything sent in
                // between is lost, so report a change to force a refresh.
                tracing::warn!(error = %err, "change notification connection lost; retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
                Some(ChangeNotice::Movements)
            }
        }
    }
}

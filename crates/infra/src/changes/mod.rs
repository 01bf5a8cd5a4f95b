//! Change notifications from the movement and item tables.
//!
//! Notices are content-less, unordered and delivered at least once; consumers
//! only use them as a "something changed, refresh" signal.

mod pg_listen;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use pg_listen::PgListenFeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeNotice {
    Movements,
    Items,
}

impl ChangeNotice {
    /// Map a notification channel name to the table it reports on.
    pub fn for_channel(channel: &str) -> Self {
        if channel.starts_with("items") {
            Self::Items
        } else {
            Self::Movements
        }
    }
}

/// Stream of change notices. `None` means the feed is closed.
#[async_trait]
pub trait ChangeFeed: Send {
    async fn next(&mut self) -> Option<ChangeNotice>;
}

/// Sending half of an in-process feed.
#[derive(Debug, Clone)]
pub struct ChangeSender(mpsc::UnboundedSender<ChangeNotice>);

impl ChangeSender {
    /// Deliver a notice; silently dropped once every receiver is gone.
    pub fn notify(&self, notice: ChangeNotice) {
        let _ = self.0.send(notice);
    }
}

/// Receiving half of an in-process feed.
#[derive(Debug)]
pub struct ChannelFeed(mpsc::UnboundedReceiver<ChangeNotice>);

pub fn channel() -> (ChangeSender, ChannelFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChangeSender(tx), ChannelFeed(rx))
}

#[async_trait]
impl ChangeFeed for ChannelFeed {
    async fn next(&mut self) -> Option<ChangeNotice> {
        self.0.recv().await
    }
}

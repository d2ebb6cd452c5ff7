//! Notifier implementations.
//!
//! `LogNotifier` renders events into the process log stream;
//! `ChannelNotifier` forwards them into an mpsc channel for an external
//! control surface (CLI/GUI) to display. Anything heavier - OS popups,
//! image thumbnails - belongs in an external implementation of
//! [`Notifier`](crate::traits::Notifier).

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::traits::notifier::Notifier;
use crate::types::NotificationEvent;

/// Emits one structured log line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a log notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: NotificationEvent) {
        match event {
            NotificationEvent::NewListing {
                keyword, listing, ..
            } => {
                info!(
                    keyword = %keyword,
                    id = %listing.id,
                    name = %listing.name,
                    price = %listing.price,
                    link = %listing.link,
                    "new listing"
                );
            }
            NotificationEvent::PriceDrop {
                keyword,
                listing,
                previous_price,
                current_price,
                ..
            } => {
                info!(
                    keyword = %keyword,
                    id = %listing.id,
                    name = %listing.name,
                    previous_price,
                    current_price,
                    link = %listing.link,
                    "price drop"
                );
            }
        }
    }
}

/// Forwards events into an unbounded channel.
///
/// The receiving half is the read-only event stream a control surface
/// consumes. A dropped receiver is not an error - delivery is
/// best-effort and the session keeps looping either way.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<NotificationEvent>,
}

impl ChannelNotifier {
    /// Create a notifier together with its event stream.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotificationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, event: NotificationEvent) {
        if self.tx.send(event).is_err() {
            debug!("notification receiver dropped, event discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Listing;

    #[tokio::test]
    async fn channel_notifier_forwards_events() {
        let (notifier, mut rx) = ChannelNotifier::channel();

        notifier
            .notify(NotificationEvent::new_listing("kw", Listing::new("m1")))
            .await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.keyword(), "kw");
        assert_eq!(event.listing().id, "m1");
    }

    #[tokio::test]
    async fn dropped_receiver_is_tolerated() {
        let (notifier, rx) = ChannelNotifier::channel();
        drop(rx);

        // must not panic or block
        notifier
            .notify(NotificationEvent::new_listing("kw", Listing::new("m1")))
            .await;
    }
}

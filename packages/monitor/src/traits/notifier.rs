//! The notifier seam.

use crate::types::NotificationEvent;

/// Receives notification events decided by poll sessions.
///
/// Delivery is best-effort and asynchronous from the session's point of
/// view: implementations swallow their own failures, and nothing a
/// notifier does affects session state or looping. Rendering (console,
/// OS popup, UI feed) is entirely the implementation's concern.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one event.
    async fn notify(&self, event: NotificationEvent);
}

//! Notification sink between the HTTP layer and the UI.
//!
//! One subscriber at a time. The UI registers a handler when it mounts its
//! toast renderer; the gateway publishes into the sink without knowing
//! whether anyone is listening.

use std::sync::Arc;

use lyceum_domain::Notification;
use parking_lot::RwLock;

/// Callback receiving published notifications.
pub type NotificationHandler = Arc<dyn Fn(Notification) + Send + Sync>;

/// Single-subscriber publish point for toasts.
///
/// - Registering replaces the current handler; handlers do not stack.
/// - Unregistering only takes effect for the handler currently
///   registered, compared by `Arc` identity.
/// - Publishing with no handler drops the notification.
#[derive(Default)]
pub struct NotificationSink {
    handler: RwLock<Option<NotificationHandler>>,
}

impl NotificationSink {
    /// Creates a sink with no subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler`, returning the one it replaced.
    pub fn register(&self, handler: NotificationHandler) -> Option<NotificationHandler> {
        let previous = self.handler.write().replace(handler);
        if previous.is_some() {
            tracing::debug!("notification handler replaced");
        }
        previous
    }

    /// Removes `handler` if it is the one currently registered.
    ///
    /// Returns true if it was removed.
    pub fn unregister(&self, handler: &NotificationHandler) -> bool {
        let mut current = self.handler.write();
        if current.as_ref().is_some_and(|h| Arc::ptr_eq(h, handler)) {
            *current = None;
            true
        } else {
            false
        }
    }

    /// Returns true if a handler is registered.
    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Delivers `notification` to the registered handler.
    ///
    /// Returns false if there was no handler and the notification was
    /// dropped. The handler runs outside the sink's lock, so it may
    /// register or unregister itself.
    pub fn publish(&self, notification: Notification) -> bool {
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => {
                handler(notification);
                true
            }
            None => {
                tracing::trace!(message = %notification.message, "no notification handler, dropped");
                false
            }
        }
    }
}

impl std::fmt::Debug for NotificationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSink")
            .field("has_subscriber", &self.has_subscriber())
            .finish()
    }
}

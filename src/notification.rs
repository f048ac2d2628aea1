use std::sync::Arc;

use tracing::{info, warn};

use crate::config::NotificationConfig;
use crate::error::PlatformError;
use crate::traits::{ChannelSpec, Notifier, PersistentNotification};

/// Result of pressing "activate notification".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Posted,
    /// The notification service is missing or the feature is switched off.
    Inert,
    Failed,
}

/// Owns the persistent status notification.
///
/// The channel is registered on the first successful activation only. Once the
/// service reports itself unavailable, activation becomes a no-op.
pub struct StatusNotification {
    notifier: Arc<dyn Notifier>,
    channel: ChannelSpec,
    content: PersistentNotification,
    channel_created: bool,
    inert: bool,
}

impl StatusNotification {
    pub fn new(config: &NotificationConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            channel: ChannelSpec {
                id: config.channel_id.clone(),
                name: config.channel_name.clone(),
            },
            content: PersistentNotification {
                channel_id: config.channel_id.clone(),
                title: config.title.clone(),
                body: config.message.clone(),
            },
            channel_created: false,
            inert: !config.enabled,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn activate(&mut self) -> NotificationStatus {
        if self.inert {
            return NotificationStatus::Inert;
        }

        match self.post() {
            Ok(()) => {
                info!("Persistent notification posted on {}", self.channel.id);
                NotificationStatus::Posted
            }
            Err(e) if e.is_unavailable() => {
                warn!("Notifications disabled: {}", e);
                self.inert = true;
                NotificationStatus::Inert
            }
            Err(e) => {
                warn!("Failed to post notification: {}", e);
                NotificationStatus::Failed
            }
        }
    }

    fn post(&mut self) -> Result<(), PlatformError> {
        if !self.channel_created {
            self.notifier.create_channel(&self.channel)?;
            self.channel_created = true;
        }
        self.notifier.post_persistent(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockNotifier, UnavailableNotifier};

    #[test]
    fn test_channel_created_once() {
        let notifier = MockNotifier::new();
        let mut status = StatusNotification::new(&NotificationConfig::default(), Arc::new(notifier.clone()));

        assert_eq!(status.activate(), NotificationStatus::Posted);
        assert_eq!(status.activate(), NotificationStatus::Posted);

        assert_eq!(notifier.channels().len(), 1);
        assert_eq!(notifier.channels()[0].id, "pocket_lock_channel");
        assert_eq!(notifier.post_count(), 2);
    }

    #[test]
    fn test_posted_content_comes_from_config() {
        let notifier = MockNotifier::new();
        let mut status = StatusNotification::new(&NotificationConfig::default(), Arc::new(notifier.clone()));
        status.activate();

        let post = &notifier.posts()[0];
        assert_eq!(post.title, "Pocket Lock Active");
        assert_eq!(post.body, "Tap here to open Controls (Lock/Screen Off)");
        assert_eq!(post.channel_id, "pocket_lock_channel");
    }

    #[test]
    fn test_unavailable_service_goes_inert() {
        let mut status =
            StatusNotification::new(&NotificationConfig::default(), Arc::new(UnavailableNotifier));
        assert_eq!(status.activate(), NotificationStatus::Inert);
        assert!(status.is_inert());
        assert_eq!(status.activate(), NotificationStatus::Inert);
    }

    #[test]
    fn test_disabled_config_is_inert() {
        let notifier = MockNotifier::new();
        let config = NotificationConfig {
            enabled: false,
            ..NotificationConfig::default()
        };
        let mut status = StatusNotification::new(&config, Arc::new(notifier.clone()));
        assert_eq!(status.activate(), NotificationStatus::Inert);
        assert_eq!(notifier.post_count(), 0);
    }
}

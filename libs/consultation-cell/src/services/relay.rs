use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::ConsultationMessage;

const CHANNEL_CAPACITY: usize = 100;

/// Live publish/subscribe relay for consultation messages.
///
/// One broadcast channel per consultation id; every open chat view holds its
/// own [`Subscription`]. Delivery guarantee is "messages published while the
/// subscription is live, in publish order" - there is no replay or catch-up.
/// Channels with no remaining subscribers are removed on the next publish.
pub struct MessageRelay {
    channels: RwLock<HashMap<Uuid, broadcast::Sender<ConsultationMessage>>>,
}

impl MessageRelay {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Opens an independent subscription to one consultation's messages.
    /// Dropping the returned handle unsubscribes.
    pub async fn subscribe(&self, consultation_id: Uuid) -> Subscription {
        let mut channels = self.channels.write().await;
        let sender = channels.entry(consultation_id).or_insert_with(|| {
            debug!("Opening relay channel for consultation {}", consultation_id);
            broadcast::channel(CHANNEL_CAPACITY).0
        });

        Subscription {
            consultation_id,
            receiver: sender.subscribe(),
        }
    }

    /// Forwards a newly created message to all current subscribers of its
    /// consultation. Returns the number of subscribers it reached.
    pub async fn publish(&self, message: ConsultationMessage) -> usize {
        let consultation_id = message.consultation_id;

        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&consultation_id) {
                Some(sender) => sender.send(message).unwrap_or(0),
                None => 0,
            }
        };

        if delivered == 0 {
            // Last subscriber is gone (or none ever existed); drop the channel.
            let mut channels = self.channels.write().await;
            if let Some(sender) = channels.get(&consultation_id) {
                if sender.receiver_count() == 0 {
                    channels.remove(&consultation_id);
                    debug!("Closed relay channel for consultation {}", consultation_id);
                }
            }
        }

        delivered
    }

    pub async fn active_channels(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for MessageRelay {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-consumer receiving end of the relay. Each viewer of a consultation
/// holds one; no fan-out deduplication happens across handles.
pub struct Subscription {
    consultation_id: Uuid,
    receiver: broadcast::Receiver<ConsultationMessage>,
}

impl Subscription {
    pub fn consultation_id(&self) -> Uuid {
        self.consultation_id
    }

    /// Next message published after this subscription started. `None` once
    /// the channel is closed. A slow consumer that overflows the channel
    /// skips the lost messages and keeps receiving.
    pub async fn recv(&mut self) -> Option<ConsultationMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        "Relay subscriber for {} lagged, skipped {} messages",
                        self.consultation_id, skipped
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SenderType;
    use chrono::Utc;

    fn message(consultation_id: Uuid, body: &str) -> ConsultationMessage {
        ConsultationMessage {
            id: Uuid::new_v4(),
            consultation_id,
            sender_id: "u1".to_string(),
            sender_type: SenderType::User,
            message: body.to_string(),
            message_type: "text".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivers_in_publish_order() {
        let relay = MessageRelay::new();
        let consultation = Uuid::new_v4();
        let mut sub = relay.subscribe(consultation).await;

        for body in ["first", "second", "third"] {
            assert_eq!(relay.publish(message(consultation, body)).await, 1);
        }

        assert_eq!(sub.recv().await.unwrap().message, "first");
        assert_eq!(sub.recv().await.unwrap().message, "second");
        assert_eq!(sub.recv().await.unwrap().message, "third");
    }

    #[tokio::test]
    async fn no_replay_for_late_subscribers() {
        let relay = MessageRelay::new();
        let consultation = Uuid::new_v4();

        let _early = relay.subscribe(consultation).await;
        relay.publish(message(consultation, "before")).await;

        let mut late = relay.subscribe(consultation).await;
        relay.publish(message(consultation, "after")).await;

        assert_eq!(late.recv().await.unwrap().message, "after");
    }

    #[tokio::test]
    async fn subscribers_are_independent_per_consultation() {
        let relay = MessageRelay::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut sub_a = relay.subscribe(a).await;
        let mut sub_b = relay.subscribe(b).await;

        relay.publish(message(a, "for a")).await;
        relay.publish(message(b, "for b")).await;

        assert_eq!(sub_a.recv().await.unwrap().message, "for a");
        assert_eq!(sub_b.recv().await.unwrap().message, "for b");
    }

    #[tokio::test]
    async fn multiple_viewers_each_receive() {
        let relay = MessageRelay::new();
        let consultation = Uuid::new_v4();

        let mut first = relay.subscribe(consultation).await;
        let mut second = relay.subscribe(consultation).await;

        assert_eq!(relay.publish(message(consultation, "hello")).await, 2);
        assert_eq!(first.recv().await.unwrap().message, "hello");
        assert_eq!(second.recv().await.unwrap().message, "hello");
    }

    #[tokio::test]
    async fn dropped_subscriptions_close_the_channel() {
        let relay = MessageRelay::new();
        let consultation = Uuid::new_v4();

        let sub = relay.subscribe(consultation).await;
        assert_eq!(relay.active_channels().await, 1);

        drop(sub);
        assert_eq!(relay.publish(message(consultation, "nobody")).await, 0);
        assert_eq!(relay.active_channels().await, 0);
    }
}

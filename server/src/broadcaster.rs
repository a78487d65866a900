use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio::sync::mpsc::error::TrySendError;

use common::proto::ServerMessage;
use common::{ConnectionId, RoomId, log};

use crate::room::{GameMessage, RoomBroadcast, RoomChannel};

pub type ConnectionSender = mpsc::Sender<ServerMessage>;

pub trait RoomBroadcaster: Send + Sync + Clone + 'static {
    fn publish(&self, room_id: RoomId, broadcast: RoomBroadcast) -> impl Future<Output = ()> + Send;

    fn broadcast_to_all(&self, message: GameMessage) -> impl Future<Output = ()> + Send;
}

#[derive(Default)]
struct Subscriptions {
    connections: HashMap<ConnectionId, ConnectionSender>,
    channels: HashMap<(RoomId, RoomChannel), HashSet<ConnectionId>>,
}

/// Fans room broadcasts out to the outbound queues of subscribed connections.
/// Delivery never waits on a slow connection: a full queue drops the message
/// for that connection only.
#[derive(Clone, Default)]
pub struct ChannelBroadcaster {
    inner: Arc<RwLock<Subscriptions>>,
}

impl std::fmt::Debug for ChannelBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelBroadcaster").finish()
    }
}

impl ChannelBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, connection_id: ConnectionId, sender: ConnectionSender) {
        self.inner.write().await.connections.insert(connection_id, sender);
    }

    pub async fn unregister(&self, connection_id: &ConnectionId) {
        let mut inner = self.inner.write().await;
        inner.connections.remove(connection_id);
        inner.channels.retain(|_, subscribers| {
            subscribers.remove(connection_id);
            !subscribers.is_empty()
        });
    }

    /// Subscribes the connection to both the chat and the move channel of the room.
    pub async fn subscribe(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        let mut inner = self.inner.write().await;
        for channel in [RoomChannel::Chat, RoomChannel::Move] {
            inner
                .channels
                .entry((room_id.clone(), channel))
                .or_default()
                .insert(connection_id.clone());
        }
    }

    pub async fn unsubscribe(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        let mut inner = self.inner.write().await;
        for channel in [RoomChannel::Chat, RoomChannel::Move] {
            let key = (room_id.clone(), channel);
            if let Some(subscribers) = inner.channels.get_mut(&key) {
                subscribers.remove(connection_id);
                if subscribers.is_empty() {
                    inner.channels.remove(&key);
                }
            }
        }
    }

    pub async fn subscriber_count(&self, room_id: &RoomId, channel: RoomChannel) -> usize {
        self.inner
            .read()
            .await
            .channels
            .get(&(room_id.clone(), channel))
            .map_or(0, HashSet::len)
    }

    fn deliver(connection_id: &ConnectionId, sender: &ConnectionSender, message: ServerMessage) {
        match sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log!("Outbound queue full for {}, dropping message", connection_id);
            }
            Err(TrySendError::Closed(_)) => {
                log!("Outbound queue closed for {}", connection_id);
            }
        }
    }
}

impl RoomBroadcaster for ChannelBroadcaster {
    async fn publish(&self, room_id: RoomId, broadcast: RoomBroadcast) {
        let message = broadcast
            .message
            .to_server_message(Some(&room_id), broadcast.channel);

        let inner = self.inner.read().await;
        let Some(subscribers) = inner.channels.get(&(room_id.clone(), broadcast.channel)) else {
            return;
        };
        for connection_id in subscribers {
            if let Some(sender) = inner.connections.get(connection_id) {
                Self::deliver(connection_id, sender, message.clone());
            }
        }
    }

    async fn broadcast_to_all(&self, message: GameMessage) {
        let message = message.to_server_message(None, RoomChannel::Chat);
        let inner = self.inner.read().await;
        for (connection_id, sender) in inner.connections.iter() {
            Self::deliver(connection_id, sender, message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::MessageKind;
    use common::proto;

    fn chat(content: &str) -> RoomBroadcast {
        RoomBroadcast::chat(GameMessage::new(MessageKind::Chat, "Alice", "a1").with_content(content))
    }

    #[tokio::test]
    async fn test_publish_reaches_only_room_subscribers() {
        let broadcaster = ChannelBroadcaster::new();
        let (tx_in, mut rx_in) = mpsc::channel(8);
        let (tx_out, mut rx_out) = mpsc::channel(8);
        let inside = ConnectionId::new("inside");
        let outside = ConnectionId::new("outside");
        broadcaster.register(inside.clone(), tx_in).await;
        broadcaster.register(outside.clone(), tx_out).await;
        broadcaster.subscribe(&RoomId::new("R1"), &inside).await;
        broadcaster.subscribe(&RoomId::new("R2"), &outside).await;

        broadcaster.publish(RoomId::new("R1"), chat("hi")).await;

        let received = rx_in.try_recv().unwrap();
        assert_eq!(received.room_id, "R1");
        assert_eq!(received.channel, i32::from(proto::Channel::Chat));
        assert_eq!(received.message.unwrap().content, "hi");
        assert!(rx_out.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let broadcaster = ChannelBroadcaster::new();
        let (tx, mut rx) = mpsc::channel(8);
        let connection = ConnectionId::new("c");
        let room_id = RoomId::new("R1");
        broadcaster.register(connection.clone(), tx).await;
        broadcaster.subscribe(&room_id, &connection).await;
        assert_eq!(broadcaster.subscriber_count(&room_id, RoomChannel::Move).await, 1);

        broadcaster.unsubscribe(&room_id, &connection).await;
        broadcaster.publish(room_id.clone(), chat("hi")).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(broadcaster.subscriber_count(&room_id, RoomChannel::Chat).await, 0);
    }

    #[tokio::test]
    async fn test_full_queue_drops_instead_of_blocking() {
        let broadcaster = ChannelBroadcaster::new();
        let (tx, mut rx) = mpsc::channel(1);
        let connection = ConnectionId::new("slow");
        let room_id = RoomId::new("R1");
        broadcaster.register(connection.clone(), tx).await;
        broadcaster.subscribe(&room_id, &connection).await;

        broadcaster.publish(room_id.clone(), chat("first")).await;
        broadcaster.publish(room_id.clone(), chat("second")).await;

        assert_eq!(rx.try_recv().unwrap().message.unwrap().content, "first");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_removes_all_subscriptions() {
        let broadcaster = ChannelBroadcaster::new();
        let (tx, _rx) = mpsc::channel(8);
        let connection = ConnectionId::new("c");
        broadcaster.register(connection.clone(), tx).await;
        broadcaster.subscribe(&RoomId::new("R1"), &connection).await;
        broadcaster.subscribe(&RoomId::new("R2"), &connection).await;

        broadcaster.unregister(&connection).await;

        assert_eq!(broadcaster.subscriber_count(&RoomId::new("R1"), RoomChannel::Chat).await, 0);
        assert_eq!(broadcaster.subscriber_count(&RoomId::new("R2"), RoomChannel::Move).await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_to_all_reaches_unsubscribed_connections() {
        let broadcaster = ChannelBroadcaster::new();
        let (tx, mut rx) = mpsc::channel(8);
        broadcaster.register(ConnectionId::new("c"), tx).await;

        broadcaster
            .broadcast_to_all(GameMessage::system(MessageKind::ServerShutdown, "bye"))
            .await;

        let received = rx.try_recv().unwrap();
        assert!(received.room_id.is_empty());
        assert_eq!(received.message.unwrap().content, "bye");
    }

    #[tokio::test]
    async fn test_publishes_to_different_rooms_share_the_lock() {
        let broadcaster = ChannelBroadcaster::new();
        let (tx_one, mut rx_one) = mpsc::channel(8);
        let (tx_two, mut rx_two) = mpsc::channel(8);
        let one = ConnectionId::new("one");
        let two = ConnectionId::new("two");
        broadcaster.register(one.clone(), tx_one).await;
        broadcaster.register(two.clone(), tx_two).await;
        broadcaster.subscribe(&RoomId::new("R1"), &one).await;
        broadcaster.subscribe(&RoomId::new("R2"), &two).await;

        let held = broadcaster.inner.read().await;
        let both = async {
            tokio::join!(
                broadcaster.publish(RoomId::new("R1"), chat("one")),
                broadcaster.publish(RoomId::new("R2"), chat("two")),
            )
        };
        let finished = tokio::time::timeout(std::time::Duration::from_secs(1), both).await;
        drop(held);

        assert!(finished.is_ok());
        assert_eq!(rx_one.try_recv().unwrap().message.unwrap().content, "one");
        assert_eq!(rx_two.try_recv().unwrap().message.unwrap().content, "two");
    }
}

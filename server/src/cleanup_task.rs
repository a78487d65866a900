use std::time::Duration;

use common::log;

use crate::room_registry::RoomRegistry;

/// Reaps rooms that were created but have sat empty for longer than the TTL.
pub struct CleanupTask {
    registry: RoomRegistry,
    check_interval: Duration,
    empty_room_ttl: Duration,
}

impl CleanupTask {
    pub fn new(registry: RoomRegistry, check_interval: Duration, empty_room_ttl: Duration) -> Self {
        Self {
            registry,
            check_interval,
            empty_room_ttl,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            interval.tick().await;
            self.cleanup_empty_rooms().await;
        }
    }

    async fn cleanup_empty_rooms(&self) -> usize {
        let removed = self.registry.remove_idle_empty(self.empty_room_ttl).await;
        if removed.is_empty() {
            return 0;
        }

        for room_id in &removed {
            log!("Cleaned up empty room: {}", room_id);
        }
        log!("{} room(s) remain after cleanup", self.registry.room_count().await);
        removed.len()
    }
}

use crate::packet::ServerMessage;
use rbp_core::Serial;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

/// A connected client's outbound link, plus the two flags the orchestrator
/// consults before it will count that client toward "everyone is ready".
#[derive(Debug, Clone)]
pub struct Avatar {
    sender: UnboundedSender<ServerMessage>,
    processing_hand: bool,
    ready_to_play: bool,
}

impl Avatar {
    pub fn new(sender: UnboundedSender<ServerMessage>) -> Self {
        Self {
            sender,
            processing_hand: false,
            ready_to_play: false,
        }
    }

    pub fn send(&self, message: ServerMessage) {
        // A closed receiver means the client already disconnected; the
        // watchdog's next sweep will notice and evict it. Dropping here
        // keeps send() infallible for callers.
        let _ = self.sender.send(message);
    }

    pub fn is_processing_hand(&self) -> bool {
        self.processing_hand
    }
    pub fn set_processing_hand(&mut self, value: bool) {
        self.processing_hand = value;
    }
    pub fn is_ready_to_play(&self) -> bool {
        self.ready_to_play
    }
    pub fn set_ready_to_play(&mut self, value: bool) {
        self.ready_to_play = value;
    }
}

/// Maps a table's connected avatars by player identity, plus a separate
/// pool of observers who hold no seat. A player may have more than one
/// avatar connected at once (multiple browser tabs); every fan-out reaches
/// all of them.
#[derive(Debug, Default)]
pub struct AvatarIndex {
    by_player: HashMap<Serial, Vec<Avatar>>,
    observers: Vec<Avatar>,
}

impl AvatarIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, player: Serial, avatar: Avatar) {
        self.by_player.entry(player).or_default().push(avatar);
    }

    pub fn remove(&mut self, player: Serial, sender: &UnboundedSender<ServerMessage>) {
        if let Some(avatars) = self.by_player.get_mut(&player) {
            avatars.retain(|a| !a.sender.same_channel(sender));
            if avatars.is_empty() {
                self.by_player.remove(&player);
            }
        }
    }

    pub fn get(&self, player: Serial) -> &[Avatar] {
        self.by_player.get(&player).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn get_mut(&mut self, player: Serial) -> impl Iterator<Item = &mut Avatar> {
        self.by_player.get_mut(&player).into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty() && self.observers.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = Serial> + '_ {
        self.by_player.keys().copied()
    }

    pub fn unicast(&self, player: Serial, message: ServerMessage) {
        for avatar in self.get(player) {
            avatar.send(message.clone());
        }
    }

    pub fn broadcast(&self, message: ServerMessage) {
        for avatars in self.by_player.values() {
            for avatar in avatars {
                avatar.send(message.clone());
            }
        }
        for observer in &self.observers {
            observer.send(message.clone());
        }
    }

    pub fn add_observer(&mut self, avatar: Avatar) {
        self.observers.push(avatar);
    }

    pub fn remove_observer(&mut self, sender: &UnboundedSender<ServerMessage>) {
        self.observers.retain(|a| !a.sender.same_channel(sender));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (UnboundedSender<ServerMessage>, tokio::sync::mpsc::UnboundedReceiver<ServerMessage>) {
        tokio::sync::mpsc::unbounded_channel()
    }

    #[test]
    fn add_and_remove_clears_empty_entry() {
        let mut index = AvatarIndex::new();
        let (tx, _rx) = channel();
        index.add(7, Avatar::new(tx.clone()));
        assert!(!index.is_empty());
        index.remove(7, &tx);
        assert!(index.is_empty());
    }

    #[test]
    fn unicast_reaches_every_avatar_for_a_player() {
        let mut index = AvatarIndex::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        index.add(7, Avatar::new(tx1));
        index.add(7, Avatar::new(tx2));
        index.unicast(7, ServerMessage::player_left(7));
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn broadcast_reaches_observers() {
        let mut index = AvatarIndex::new();
        let (tx, mut rx) = channel();
        index.add_observer(Avatar::new(tx));
        index.broadcast(ServerMessage::player_left(1));
        assert!(rx.try_recv().is_ok());
    }
}

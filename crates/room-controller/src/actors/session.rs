//! Live room session and the listener registrations coupled to it.
//!
//! The controller actor exclusively owns the [`RoomSession`]. Listeners hold
//! only a weak mailbox sender back to the actor; the [`ListenerRegistry`]
//! holds only listener ids and a weak context reference for removal.

use super::messages::{ControllerMessage, ListenerEvent};
use crate::models::{RoomIdentity, RoomInfo};
use crate::services::{
    AudioPlayback, RoomContext, RoomEvent, RoomEventListener, SeatEvent, SeatEventListener,
};
use chrono::{DateTime, Utc};
use common::types::{ListenerId, RoomId};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Audio playback held for one room. Released on drop.
pub struct PlaybackLease {
    audio: Arc<dyn AudioPlayback>,
    room_id: RoomId,
}

impl PlaybackLease {
    /// Prepare playback for `room_id`.
    pub fn acquire(audio: Arc<dyn AudioPlayback>, room_id: RoomId) -> Self {
        audio.prepare(&room_id);
        Self { audio, room_id }
    }
}

impl Drop for PlaybackLease {
    fn drop(&mut self) {
        self.audio.destroy(&self.room_id);
        debug!(
            target: "room.session",
            room_id = %self.room_id,
            "Audio playback released"
        );
    }
}

/// The currently joined room.
///
/// Exists only while both channels are joined for `context`.
pub struct RoomSession {
    identity: RoomIdentity,
    context: Arc<dyn RoomContext>,
    metadata: RoomInfo,
    /// Held only to be dropped with the session.
    _playback: PlaybackLease,
    joined_at: DateTime<Utc>,
}

impl RoomSession {
    pub fn new(
        identity: RoomIdentity,
        context: Arc<dyn RoomContext>,
        metadata: RoomInfo,
        playback: PlaybackLease,
    ) -> Self {
        Self {
            identity,
            context,
            metadata,
            _playback: playback,
            joined_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &RoomIdentity {
        &self.identity
    }

    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.identity.room_id
    }

    #[must_use]
    pub fn context(&self) -> &Arc<dyn RoomContext> {
        &self.context
    }

    #[must_use]
    pub fn metadata(&self) -> &RoomInfo {
        &self.metadata
    }

    /// Store refreshed metadata.
    pub fn set_metadata(&mut self, metadata: RoomInfo) {
        self.metadata = metadata;
    }

    #[must_use]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}

/// Listener registered on a room context. Forwards every event into the
/// controller mailbox without blocking the context.
pub struct SessionListener {
    room_id: RoomId,
    mailbox: mpsc::WeakSender<ControllerMessage>,
}

impl SessionListener {
    #[must_use]
    pub fn new(room_id: RoomId, mailbox: mpsc::WeakSender<ControllerMessage>) -> Self {
        Self { room_id, mailbox }
    }

    fn forward(&self, event: ListenerEvent) {
        // Controller gone: nothing left to notify
        let Some(sender) = self.mailbox.upgrade() else {
            return;
        };

        let message = ControllerMessage::Listener {
            room_id: self.room_id.clone(),
            event,
        };
        match sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(
                    target: "room.session",
                    room_id = %self.room_id,
                    "Controller mailbox full, dropping room event"
                );
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

impl RoomEventListener for SessionListener {
    fn on_room_event(&self, event: RoomEvent) {
        self.forward(ListenerEvent::Room(event));
    }
}

impl SeatEventListener for SessionListener {
    fn on_seat_event(&self, event: SeatEvent) {
        self.forward(ListenerEvent::Seat(event));
    }
}

struct Registration {
    room_id: RoomId,
    room_listener: ListenerId,
    seat_listener: ListenerId,
    context: Weak<dyn RoomContext>,
}

/// Listener registrations of the live session.
///
/// Holds ids and a non-owning context reference only.
#[derive(Default)]
pub struct ListenerRegistry {
    registration: Option<Registration>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register room and seat listeners on `context`, replacing any previous registration.
    pub fn register(
        &mut self,
        context: &Arc<dyn RoomContext>,
        mailbox: &mpsc::WeakSender<ControllerMessage>,
    ) {
        self.unregister_all();

        let room_id = context.room_id().clone();
        let listener = Arc::new(SessionListener::new(room_id.clone(), mailbox.clone()));
        let room_listener =
            context.add_room_listener(Arc::clone(&listener) as Arc<dyn RoomEventListener>);
        let seat_listener = context.add_seat_listener(listener as Arc<dyn SeatEventListener>);

        debug!(
            target: "room.session",
            room_id = %room_id,
            "Room and seat listeners registered"
        );

        self.registration = Some(Registration {
            room_id,
            room_listener,
            seat_listener,
            context: Arc::downgrade(context),
        });
    }

    /// Remove every registration. Safe to call when nothing is registered.
    pub fn unregister_all(&mut self) {
        let Some(registration) = self.registration.take() else {
            return;
        };

        match registration.context.upgrade() {
            Some(context) => {
                let room_removed = context.remove_room_listener(registration.room_listener);
                let seat_removed = context.remove_seat_listener(registration.seat_listener);
                debug!(
                    target: "room.session",
                    room_id = %registration.room_id,
                    room_removed,
                    seat_removed,
                    "Listeners unregistered"
                );
            }
            None => {
                debug!(
                    target: "room.session",
                    room_id = %registration.room_id,
                    "Context already dropped, listeners went with it"
                );
            }
        }
    }

    /// Number of listeners currently registered.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.registration.is_some() {
            2
        } else {
            0
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registration.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingAudio {
        prepared: AtomicUsize,
        destroyed: AtomicUsize,
    }

    impl AudioPlayback for CountingAudio {
        fn prepare(&self, _room_id: &RoomId) {
            self.prepared.fetch_add(1, Ordering::SeqCst);
        }

        fn destroy(&self, _room_id: &RoomId) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_playback_lease_releases_once_on_drop() {
        let audio = Arc::new(CountingAudio::default());
        let lease = PlaybackLease::acquire(
            Arc::clone(&audio) as Arc<dyn AudioPlayback>,
            RoomId::new("R1"),
        );
        assert_eq!(audio.prepared.load(Ordering::SeqCst), 1);
        assert_eq!(audio.destroyed.load(Ordering::SeqCst), 0);

        drop(lease);
        assert_eq!(audio.destroyed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listener_forwards_into_mailbox() {
        let (tx, mut rx) = mpsc::channel(4);
        let listener = SessionListener::new(RoomId::new("R1"), tx.downgrade());

        listener.on_room_event(RoomEvent::MemberLeft {
            user_id: "bob".to_string(),
        });

        let message = rx.recv().await;
        assert!(matches!(
            message,
            Some(ControllerMessage::Listener {
                ref room_id,
                event: ListenerEvent::Room(RoomEvent::MemberLeft { ref user_id }),
            }) if room_id.as_str() == "R1" && user_id == "bob"
        ));
    }

    #[tokio::test]
    async fn test_listener_is_silent_once_controller_is_gone() {
        let (tx, rx) = mpsc::channel::<ControllerMessage>(4);
        let listener = SessionListener::new(RoomId::new("R1"), tx.downgrade());
        drop(tx);
        drop(rx);

        // Must not panic or block
        listener.on_seat_event(SeatEvent::SeatKicked {
            index: 1,
            user_id: "bob".to_string(),
        });
    }

    #[test]
    fn test_empty_registry_unregister_is_noop() {
        let mut registry = ListenerRegistry::new();
        registry.unregister_all();
        registry.unregister_all();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}

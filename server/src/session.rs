//! Player session tracking for the trivia server
//!
//! This module handles the server-side bookkeeping of joined players, including:
//! - Username registration with capacity and uniqueness checks
//! - Connection handles used to deliver outbound messages
//! - Disconnect handling that keeps the player's score for final standings
//!
//! Sessions are indexed both by username and by connection id so neither
//! lookup needs a scan of the roster.

use log::info;
use shared::Message;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Server-assigned identifier of an accepted connection
pub type ConnectionId = u64;

/// Send capability for one connection.
///
/// The connection task owns the socket and keeps running while this handle
/// exists. Dropping the handle closes the outbound queue, after which the
/// connection task flushes what is already queued and closes the socket.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<Message>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a message for the connection task.
    pub fn send(&self, message: Message) -> Result<(), SendError> {
        self.sender
            .send(message)
            .map_err(|_| SendError::Closed(self.id))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SendError {
    #[error("connection {0} is closed")]
    Closed(ConnectionId),

    #[error("session {0} has no open connection")]
    NoConnection(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("username {0:?} has already joined")]
    AlreadyJoined(String),

    #[error("game is full")]
    Full,
}

/// A joined player
///
/// Sessions outlive their connections: a player who disconnects keeps
/// their points and still appears in the final standings.
#[derive(Debug)]
pub struct Session {
    /// Unique while the game runs; never reused after a disconnect
    pub username: String,
    /// Correct answers so far
    pub points: u32,
    handle: Option<ConnectionHandle>,
    active: bool,
}

impl Session {
    pub fn new(username: String, handle: ConnectionHandle) -> Self {
        Self {
            username,
            points: 0,
            handle: Some(handle),
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.handle.as_ref().map(ConnectionHandle::id)
    }

    pub fn send(&self, message: Message) -> Result<(), SendError> {
        match &self.handle {
            Some(handle) => handle.send(message),
            None => Err(SendError::NoConnection(self.username.clone())),
        }
    }

    /// Drops the connection handle and marks the session inactive.
    fn release(&mut self) -> Option<ConnectionHandle> {
        self.active = false;
        self.handle.take()
    }
}

/// Roster of every player that joined the current game
pub struct SessionRegistry {
    /// Sessions in join order
    sessions: Vec<Session>,
    by_username: HashMap<String, usize>,
    /// Only sessions whose connection is still open
    by_connection: HashMap<ConnectionId, usize>,
    capacity: usize,
}

impl SessionRegistry {
    /// Creates an empty registry that admits at most `capacity` players
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: Vec::new(),
            by_username: HashMap::new(),
            by_connection: HashMap::new(),
            capacity,
        }
    }

    /// Checks whether `username` could join right now.
    ///
    /// Capacity counts every registered session, including disconnected
    /// ones, and usernames of disconnected players stay taken.
    pub fn admit(&self, username: &str) -> Result<(), RegistryError> {
        if self.sessions.len() >= self.capacity {
            return Err(RegistryError::Full);
        }
        if self.by_username.contains_key(username) {
            return Err(RegistryError::AlreadyJoined(username.to_string()));
        }
        Ok(())
    }

    /// Registers a new player on the given connection
    pub fn register(
        &mut self,
        username: String,
        handle: ConnectionHandle,
    ) -> Result<&Session, RegistryError> {
        self.admit(&username)?;

        let index = self.sessions.len();
        info!(
            "Session added: {} on connection {} ({}/{})",
            username,
            handle.id(),
            index + 1,
            self.capacity
        );
        self.by_connection.insert(handle.id(), index);
        self.by_username.insert(username.clone(), index);
        self.sessions.push(Session::new(username, handle));

        Ok(&self.sessions[index])
    }

    /// Releases the session bound to `connection`.
    ///
    /// The session stays in the roster with its points but is no longer
    /// active and receives no more messages. Returns `None` if the
    /// connection has no active session, so repeated calls are harmless.
    pub fn drop_connection(&mut self, connection: ConnectionId) -> Option<&Session> {
        let index = self.by_connection.remove(&connection)?;
        let session = &mut self.sessions[index];
        // Dropping the handle closes the connection's outbound queue
        drop(session.release());
        info!(
            "Session dropped: {} ({}/{} active)",
            session.username,
            self.by_connection.len(),
            self.capacity
        );
        Some(&self.sessions[index])
    }

    /// Releases every open connection, returning how many were open
    pub fn release_all(&mut self) -> usize {
        let released = self.by_connection.len();
        for (_, index) in self.by_connection.drain() {
            drop(self.sessions[index].release());
        }
        released
    }

    pub fn get(&self, username: &str) -> Option<&Session> {
        self.by_username.get(username).map(|&i| &self.sessions[i])
    }

    pub fn by_connection(&self, connection: ConnectionId) -> Option<&Session> {
        self.by_connection
            .get(&connection)
            .map(|&i| &self.sessions[i])
    }

    pub fn by_connection_mut(&mut self, connection: ConnectionId) -> Option<&mut Session> {
        self.by_connection
            .get(&connection)
            .map(|&i| &mut self.sessions[i])
    }

    /// Sessions whose connection is still open, in join order
    pub fn active_sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.is_active())
    }

    pub fn active_usernames(&self) -> impl Iterator<Item = &str> {
        self.active_sessions().map(|s| s.username.as_str())
    }

    /// Every session ever registered, in join order
    pub fn all_sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_count(&self) -> usize {
        self.by_connection.len()
    }

    /// Returns the number of registered sessions, active or not
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sessions.len() >= self.capacity
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle(id: ConnectionId) -> (ConnectionHandle, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new(id, tx), rx)
    }

    #[test]
    fn test_registry_creation() {
        let registry = SessionRegistry::new(3);
        assert_eq!(registry.capacity(), 3);
        assert!(registry.is_empty());
        assert!(!registry.is_full());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_register() {
        let mut registry = SessionRegistry::new(2);
        let (handle, _rx) = test_handle(1);

        let session = registry.register("alice".to_string(), handle).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.points, 0);
        assert!(session.is_active());
        assert_eq!(session.connection_id(), Some(1));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.by_connection(1).unwrap().username, "alice");
        assert_eq!(registry.get("alice").unwrap().connection_id(), Some(1));
    }

    #[test]
    fn test_register_full() {
        let mut registry = SessionRegistry::new(1);
        let (h1, _rx1) = test_handle(1);
        let (h2, _rx2) = test_handle(2);

        registry.register("alice".to_string(), h1).unwrap();
        assert!(registry.is_full());
        assert_eq!(
            registry.register("bob".to_string(), h2).unwrap_err(),
            RegistryError::Full
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.by_connection(2).is_none());
    }

    #[test]
    fn test_register_duplicate_username() {
        let mut registry = SessionRegistry::new(3);
        let (h1, _rx1) = test_handle(1);
        let (h2, _rx2) = test_handle(2);

        registry.register("alice".to_string(), h1).unwrap();
        assert_eq!(
            registry.register("alice".to_string(), h2).unwrap_err(),
            RegistryError::AlreadyJoined("alice".to_string())
        );
    }

    #[test]
    fn test_username_not_recycled_after_drop() {
        let mut registry = SessionRegistry::new(3);
        let (h1, _rx1) = test_handle(1);
        let (h2, _rx2) = test_handle(2);

        registry.register("alice".to_string(), h1).unwrap();
        registry.drop_connection(1).unwrap();

        assert_eq!(
            registry.admit("alice"),
            Err(RegistryError::AlreadyJoined("alice".to_string()))
        );
        assert!(registry.register("alice".to_string(), h2).is_err());
    }

    #[test]
    fn test_drop_connection_keeps_score() {
        let mut registry = SessionRegistry::new(2);
        let (h1, _rx1) = test_handle(1);
        let (h2, _rx2) = test_handle(2);
        registry.register("alice".to_string(), h1).unwrap();
        registry.register("bob".to_string(), h2).unwrap();
        registry.by_connection_mut(1).unwrap().points = 2;

        let dropped = registry.drop_connection(1).unwrap();
        assert_eq!(dropped.username, "alice");
        assert!(!dropped.is_active());
        assert_eq!(dropped.connection_id(), None);

        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("alice").unwrap().points, 2);
        let active: Vec<&str> = registry.active_usernames().collect();
        assert_eq!(active, vec!["bob"]);
    }

    #[test]
    fn test_drop_connection_is_idempotent() {
        let mut registry = SessionRegistry::new(2);
        let (h1, _rx1) = test_handle(1);
        registry.register("alice".to_string(), h1).unwrap();

        assert!(registry.drop_connection(1).is_some());
        assert!(registry.drop_connection(1).is_none());
        assert!(registry.drop_connection(99).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_drop_closes_outbound_queue() {
        let mut registry = SessionRegistry::new(1);
        let (h1, mut rx1) = test_handle(1);
        registry.register("alice".to_string(), h1).unwrap();

        registry.get("alice").unwrap().send(Message::Bye).unwrap();
        registry.drop_connection(1);

        assert_eq!(rx1.try_recv(), Ok(Message::Bye));
        assert_eq!(
            rx1.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
        assert_eq!(
            registry.get("alice").unwrap().send(Message::Bye),
            Err(SendError::NoConnection("alice".to_string()))
        );
    }

    #[test]
    fn test_release_all() {
        let mut registry = SessionRegistry::new(2);
        let (h1, mut rx1) = test_handle(1);
        let (h2, mut rx2) = test_handle(2);
        registry.register("alice".to_string(), h1).unwrap();
        registry.register("bob".to_string(), h2).unwrap();
        registry.drop_connection(2);

        assert_eq!(registry.release_all(), 1);
        assert_eq!(registry.active_count(), 0);
        assert_eq!(registry.active_sessions().count(), 0);
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_send_to_closed_connection() {
        let (handle, rx) = test_handle(7);
        drop(rx);
        assert_eq!(handle.send(Message::Bye), Err(SendError::Closed(7)));
    }
}

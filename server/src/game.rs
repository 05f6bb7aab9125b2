//! Game orchestration: the round-based state machine
//!
//! [`Game`] is the single owner of the session registry, the active round and
//! the game state. Connection tasks never touch that state directly; they
//! funnel [`ServerEvent`]s through one channel that [`Game::run`] consumes, so
//! every mutation happens on the orchestrator task in arrival order.
//!
//! ```text
//! WAITING_FOR_PLAYERS --(roster full, READY, interval)--> QUESTION
//! QUESTION --(all active members answered | deadline)--> BETWEEN_ROUNDS | FINISHED
//! BETWEEN_ROUNDS --(interval)--> QUESTION
//! ```
//!
//! Round completion races two sources: the deadline timer, and ANSWER/BYE
//! events that satisfy the completion check. Whichever happens first ends the
//! round; the other is simply never acted on.

use crate::config::ServerConfig;
use crate::round::{self, QuestionSource, Round};
use crate::scoring;
use crate::session::{ConnectionHandle, ConnectionId, SessionRegistry};
use log::{debug, error, info, warn};
use shared::Message;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    WaitingForPlayers,
    Question,
    BetweenRounds,
    Finished,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::WaitingForPlayers => "WAITING_FOR_PLAYERS",
            GameState::Question => "QUESTION",
            GameState::BetweenRounds => "BETWEEN_ROUNDS",
            GameState::Finished => "FINISHED",
        };
        f.write_str(name)
    }
}

/// Events sent from connection tasks to the orchestrator
#[derive(Debug)]
pub enum ServerEvent {
    Connected {
        id: ConnectionId,
        handle: ConnectionHandle,
    },
    MessageReceived {
        id: ConnectionId,
        message: Message,
    },
    /// End of stream or transport failure, handled like BYE
    Disconnected { id: ConnectionId },
    /// External stop request: finish the game now
    Shutdown,
}

pub struct Game {
    config: ServerConfig,
    questions: Box<dyn QuestionSource>,
    registry: SessionRegistry,
    /// Connections that have not joined (yet)
    pending: HashMap<ConnectionId, ConnectionHandle>,
    state: GameState,
    round_number: usize,
    round: Option<Round>,
    /// When the READY wait or the between-rounds pause ends
    next_round_at: Option<Instant>,
}

impl Game {
    pub fn new(config: ServerConfig, questions: Box<dyn QuestionSource>) -> Self {
        info!(
            "Game initialised: awaiting {} players, {} rounds, state={}",
            config.players,
            config.round_count(),
            GameState::WaitingForPlayers
        );
        Self {
            registry: SessionRegistry::new(config.players),
            config,
            questions,
            pending: HashMap::new(),
            state: GameState::WaitingForPlayers,
            round_number: 0,
            round: None,
            next_round_at: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Next instant at which time alone can move the game forward
    pub fn wake_at(&self) -> Option<Instant> {
        match self.state {
            GameState::WaitingForPlayers | GameState::BetweenRounds => self.next_round_at,
            GameState::Question => self.round.as_ref().map(|r| r.deadline),
            GameState::Finished => None,
        }
    }

    /// Consumes events until the game reaches FINISHED.
    ///
    /// If every event sender is gone the game is finished immediately.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<ServerEvent>) {
        self.advance(Instant::now());

        while self.state != GameState::Finished {
            let wake_at = self.wake_at();
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event, Instant::now()),
                    None => {
                        warn!("Event channel closed, finishing game");
                        self.finish("event channel closed");
                    }
                },
                _ = sleep_until(wake_at.unwrap_or_else(Instant::now)), if wake_at.is_some() => {
                    self.advance(Instant::now());
                }
            }
        }

        info!("Orchestrator stopped");
    }

    /// Applies one event and any transitions it makes due
    pub fn handle_event(&mut self, event: ServerEvent, now: Instant) {
        match event {
            ServerEvent::Connected { id, handle } => {
                if self.state == GameState::Finished {
                    return;
                }
                debug!("Connection {} opened", id);
                self.pending.insert(id, handle);
            }
            ServerEvent::MessageReceived { id, message } => self.handle_message(id, message),
            ServerEvent::Disconnected { id } => self.disconnect(id),
            ServerEvent::Shutdown => {
                self.finish("shutdown requested");
            }
        }
        self.advance(now);
    }

    fn handle_message(&mut self, id: ConnectionId, message: Message) {
        let sender = self
            .registry
            .by_connection(id)
            .map(|s| s.username.clone())
            .unwrap_or_else(|| format!("<connection {}>", id));
        debug!("Recv <- {} | {:?}", sender, message);

        match message {
            Message::Hi { username } => self.join(id, username),
            Message::Bye => self.disconnect(id),
            Message::Answer { answer } => self.answer(id, answer),
            other => warn!("Ignoring client-bound {} from {}", other.kind(), sender),
        }
    }

    /// Registers the connection under `username`.
    ///
    /// A full game or a taken username is not reported to the client; the
    /// connection simply never receives game traffic.
    fn join(&mut self, id: ConnectionId, username: String) {
        if self.registry.by_connection(id).is_some() {
            warn!("Connection {} sent HI after joining, ignoring", id);
            return;
        }
        if let Err(e) = self.registry.admit(&username) {
            warn!("Rejected HI from connection {}: {}", id, e);
            return;
        }
        let Some(handle) = self.pending.remove(&id) else {
            warn!("HI from unknown connection {}", id);
            return;
        };
        if let Err(e) = self.registry.register(username, handle) {
            error!("Registration failed after admission: {}", e);
        }
    }

    /// Releases the connection; a no-op if it is already gone
    fn disconnect(&mut self, id: ConnectionId) {
        if self.pending.remove(&id).is_some() {
            debug!("Connection {} closed before joining", id);
            return;
        }
        if let Some(session) = self.registry.drop_connection(id) {
            info!("{} left the game", session.username);
        }
    }

    fn answer(&mut self, id: ConnectionId, answer: String) {
        if answer.is_empty() {
            return;
        }
        let (GameState::Question, Some(round)) = (self.state, self.round.as_mut()) else {
            debug!("ANSWER from connection {} outside a question round", id);
            return;
        };

        let correct = round.is_correct(&answer);
        let feedback = self
            .config
            .render_feedback(correct, &answer, &round.correct_answer);
        let reply = Message::Result { correct, feedback };

        let sent = match self.registry.by_connection_mut(id) {
            Some(session) => {
                if !round::record_answer(round, session, &answer) {
                    debug!("Answer from {} not recorded", session.username);
                }
                session.send(reply)
            }
            None => match self.pending.get(&id) {
                Some(handle) => handle.send(reply),
                None => return,
            },
        };
        if let Err(e) = sent {
            error!("Failed to send RESULT: {}", e);
        }
    }

    /// Takes every transition that is due at `now`
    pub fn advance(&mut self, now: Instant) {
        while self.step(now) {}
    }

    fn step(&mut self, now: Instant) -> bool {
        match self.state {
            GameState::WaitingForPlayers => match self.next_round_at {
                None if self.registry.is_full() => {
                    info!("Everyone has joined!");
                    self.broadcast(Message::Ready {
                        info: self.config.render_ready_info(),
                    });
                    self.next_round_at = Some(now + self.config.interval_duration());
                    true
                }
                Some(at) if now >= at => {
                    self.start_next_round(now);
                    true
                }
                _ => false,
            },
            GameState::Question => {
                let complete = match &self.round {
                    Some(round) => round::is_complete(round, self.registry.active_usernames(), now),
                    None => true,
                };
                if complete {
                    self.complete_round(now);
                }
                complete
            }
            GameState::BetweenRounds => match self.next_round_at {
                Some(at) if now >= at => {
                    self.start_next_round(now);
                    true
                }
                _ => false,
            },
            GameState::Finished => false,
        }
    }

    fn start_next_round(&mut self, now: Instant) {
        self.next_round_at = None;
        self.round_number += 1;
        let round = round::start_round(
            &self.config,
            &mut *self.questions,
            self.round_number,
            self.registry.active_usernames(),
            now,
        );
        self.transition(
            GameState::Question,
            &format!("starting round {}", self.round_number),
        );
        self.broadcast(round.question_message());
        self.round = Some(round);
    }

    fn complete_round(&mut self, now: Instant) {
        if let Some(round) = self.round.take() {
            info!(
                "Round {} complete: {}/{} answered, correct answer {:?}",
                round.round_number,
                round.answered_count(),
                round.members().count(),
                round.correct_answer
            );
        }

        if self.round_number >= self.config.round_count() {
            self.finish("all question types completed");
        } else {
            let state = self.leaderboard();
            self.transition(GameState::BetweenRounds, "round finished");
            self.broadcast(Message::Leaderboard { state });
            self.next_round_at = Some(now + self.config.interval_duration());
        }
    }

    /// Broadcasts final standings and releases every connection
    fn finish(&mut self, reason: &str) {
        if self.state == GameState::Finished {
            return;
        }
        self.round = None;
        self.next_round_at = None;
        self.transition(GameState::Finished, reason);

        let final_standings = self.final_standings();
        self.broadcast(Message::Finished { final_standings });

        let released = self.registry.release_all() + self.pending.len();
        self.pending.clear();
        info!("Released {} connections", released);
    }

    fn leaderboard(&self) -> String {
        let standings = scoring::rank(self.standings_input());
        scoring::format_leaderboard(&standings, &self.config)
    }

    fn final_standings(&self) -> String {
        let standings = scoring::rank(self.standings_input());
        scoring::format_final_standings(&standings, &self.config)
    }

    fn standings_input(&self) -> impl Iterator<Item = (&str, u32)> {
        self.registry
            .all_sessions()
            .iter()
            .map(|s| (s.username.as_str(), s.points))
    }

    fn transition(&mut self, new_state: GameState, reason: &str) {
        info!("State {} -> {} ({})", self.state, new_state, reason);
        self.state = new_state;
    }

    /// Sends to every active session; a failed send is logged and the
    /// session is left for its connection task to report.
    fn broadcast(&self, message: Message) {
        let mut recipients = Vec::new();
        for session in self.registry.active_sessions() {
            match session.send(message.clone()) {
                Ok(()) => recipients.push(session.username.as_str()),
                Err(e) => error!("Broadcast send error to {}: {}", session.username, e),
            }
        }
        info!("Broadcast {} -> {:?}", message.kind(), recipients);
    }
}

use crate::config::{ClientConfig, ClientMode};
use crate::error::ClientError;
use crate::input::Command;
use log::{debug, info, warn};
use shared::{write_message, Message, MessageReader, ProtocolError};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// How a game session on one connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// FINISHED was received
    Finished,
    /// The player typed DISCONNECT or the server closed the connection
    Disconnected,
    /// The player typed EXIT or stdin closed
    Exit,
}

pub struct Client {
    reader: MessageReader<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    mode: ClientMode,
    /// Deadline of the open question in `you` mode
    answer_deadline: Option<Instant>,
}

impl Client {
    /// Connects to `addr` and joins with the configured username.
    pub async fn connect(addr: &str, config: &ClientConfig) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        info!("Connected to {}", addr);

        let (read_half, write_half) = stream.into_split();
        let mut client = Client {
            reader: MessageReader::new(BufReader::new(read_half)),
            writer: write_half,
            mode: config.client_mode,
            answer_deadline: None,
        };
        client
            .send(&Message::Hi {
                username: config.username.clone(),
            })
            .await?;
        Ok(client)
    }

    async fn send(&mut self, message: &Message) -> Result<(), ProtocolError> {
        debug!("-> {}", message.kind());
        write_message(&mut self.writer, message).await
    }

    /// Plays until the game finishes, the connection drops or the player
    /// leaves. `lines` carries terminal input.
    pub async fn play(
        &mut self,
        lines: &mut mpsc::UnboundedReceiver<String>,
    ) -> Result<SessionOutcome, ClientError> {
        loop {
            let wake_at = self.answer_deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                inbound = self.reader.next_message() => match inbound {
                    Ok(Some(message)) => {
                        if let Some(outcome) = self.handle_message(message).await? {
                            return Ok(outcome);
                        }
                    }
                    Ok(None) => {
                        println!("Server closed the connection");
                        return Ok(SessionOutcome::Disconnected);
                    }
                    Err(ProtocolError::Malformed(e)) => {
                        warn!("Ignoring malformed message: {}", e);
                    }
                    Err(e) => return Err(e.into()),
                },
                line = lines.recv() => match line {
                    Some(line) => {
                        if let Some(outcome) = self.handle_line(&line).await? {
                            return Ok(outcome);
                        }
                    }
                    None => {
                        self.leave().await;
                        return Ok(SessionOutcome::Exit);
                    }
                },
                _ = sleep_until(wake_at), if self.answer_deadline.is_some() => {
                    self.answer_deadline = None;
                    println!("Time is up");
                }
            }
        }
    }

    async fn handle_message(
        &mut self,
        message: Message,
    ) -> Result<Option<SessionOutcome>, ProtocolError> {
        if let Some(text) = display_text(&message) {
            println!("{}", text);
        }

        match &message {
            Message::Question { time_limit, .. } => match self.mode {
                ClientMode::Auto => {
                    if let Some(answer) = auto_answer(&message) {
                        println!("{}", answer);
                        self.send(&Message::Answer { answer }).await?;
                    }
                }
                ClientMode::You => {
                    self.answer_deadline =
                        Some(Instant::now() + Duration::from_secs(*time_limit));
                }
            },
            Message::Result { .. } => self.answer_deadline = None,
            Message::Finished { .. } => {
                self.answer_deadline = None;
                return Ok(Some(SessionOutcome::Finished));
            }
            _ => {}
        }
        Ok(None)
    }

    async fn handle_line(&mut self, line: &str) -> Result<Option<SessionOutcome>, ProtocolError> {
        match Command::parse(line) {
            Command::Disconnect => {
                self.leave().await;
                Ok(Some(SessionOutcome::Disconnected))
            }
            Command::Exit => {
                self.leave().await;
                Ok(Some(SessionOutcome::Exit))
            }
            Command::Connect(_) => {
                println!("Already connected; DISCONNECT first");
                Ok(None)
            }
            Command::Text(answer) => {
                if answer.is_empty() {
                    return Ok(None);
                }
                match self.answer_deadline.take() {
                    Some(deadline) if Instant::now() < deadline => {
                        self.send(&Message::Answer { answer }).await?;
                    }
                    _ => println!("No question is open"),
                }
                Ok(None)
            }
        }
    }

    /// Sends BYE and closes the connection
    async fn leave(&mut self) {
        if let Err(e) = self.send(&Message::Bye).await {
            debug!("Failed to send BYE: {}", e);
        }
        if let Err(e) = self.writer.shutdown().await {
            debug!("Shutdown failed: {}", e);
        }
    }
}

/// Text printed for a server message
pub fn display_text(message: &Message) -> Option<&str> {
    match message {
        Message::Ready { info } => Some(info.as_str()),
        Message::Question {
            trivia_question, ..
        } => Some(trivia_question.as_str()),
        Message::Result { feedback, .. } => Some(feedback.as_str()),
        Message::Leaderboard { state } => Some(state.as_str()),
        Message::Finished { final_standings } => Some(final_standings.as_str()),
        Message::Hi { .. } | Message::Bye | Message::Answer { .. } => None,
    }
}

/// Answer computed locally for a QUESTION
pub fn auto_answer(message: &Message) -> Option<String> {
    match message {
        Message::Question {
            question_type,
            short_question,
            ..
        } => Some(shared::answers::correct_answer(question_type, short_question)),
        _ => None,
    }
}

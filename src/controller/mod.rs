//! The voice interaction controller.
//!
//! A single long-lived state machine owns the whole conversation: it
//! receives finalized transcripts from the capture port, classifies them
//! against the command table, dispatches browser actions or remote
//! completions, speaks the outcome, and settles back to a ready state on
//! every failure path. There is exactly one of these per session, driven
//! by one event loop; capture, remote completion, and synthesis are
//! awaited one at a time, never concurrently.

use crate::actions::ActionDispatcher;
use crate::capture::{CaptureErrorKind, CaptureEvent, SpeechCapture};
use crate::commands::{CommandOutcome, CommandRegistry};
use crate::config::{AssistantConfig, EndOfCapturePolicy};
use crate::error::Result;
use crate::remote::CompletionPort;
use crate::synthesis::{SpeechSynthesis, Utterance};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod messages;

/// Buffer size for the conversation event broadcast.
const EVENT_CHANNEL_SIZE: usize = 64;

/// Interaction lifecycle status. Exactly one value at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Ready; nothing in flight, not capturing.
    #[default]
    Idle,
    /// Capture is open and waiting for speech.
    Listening,
    /// A transcript is being classified or a remote reply is pending.
    Processing,
    /// A reply is being rendered as speech.
    Speaking,
    /// A failure is being communicated; settles back on its own.
    Errored,
}

/// Who said a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One line of the session transcript.
///
/// The history is append-only: entries are never edited, removed, or
/// reordered, and a user entry always precedes its assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Events published to observers (transcript view, status indicator).
#[derive(Debug, Clone)]
pub enum ConversationEvent {
    /// A new entry was appended to the history.
    EntryAppended(ConversationEntry),
}

/// Commands accepted by the running controller.
#[derive(Debug)]
enum ControllerCommand {
    ToggleListening,
}

/// Outcome of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The toggle was accepted and will start or stop capture.
    Accepted,
    /// A turn is in flight; the toggle was refused.
    Busy,
}

/// Handle for driving and observing a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    cmd_tx: mpsc::UnboundedSender<ControllerCommand>,
    status_rx: watch::Receiver<Status>,
    event_tx: broadcast::Sender<ConversationEvent>,
    cancel: CancellationToken,
}

impl ControllerHandle {
    /// Current status.
    #[must_use]
    pub fn status(&self) -> Status {
        *self.status_rx.borrow()
    }

    /// Watch status transitions.
    #[must_use]
    pub fn status_stream(&self) -> watch::Receiver<Status> {
        self.status_rx.clone()
    }

    /// Subscribe to conversation entries.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.event_tx.subscribe()
    }

    /// Start listening if idle, stop listening if capturing.
    ///
    /// Refused while a turn is in flight, so a stale toggle cannot fire
    /// after the turn completes.
    pub fn toggle_listening(&self) -> ToggleOutcome {
        match self.status() {
            Status::Processing | Status::Speaking => ToggleOutcome::Busy,
            _ => {
                let _ = self.cmd_tx.send(ControllerCommand::ToggleListening);
                ToggleOutcome::Accepted
            }
        }
    }

    /// Stop the controller loop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// What the run loop is waiting on.
enum Input {
    Cancelled,
    Command(Option<ControllerCommand>),
    Capture(Option<CaptureEvent>),
}

/// The interaction state machine.
pub struct InteractionController {
    config: AssistantConfig,
    registry: CommandRegistry,
    capture: Box<dyn SpeechCapture>,
    synthesis: Box<dyn SpeechSynthesis>,
    remote: Box<dyn CompletionPort>,
    dispatcher: Box<dyn ActionDispatcher>,
    status: Status,
    status_tx: watch::Sender<Status>,
    event_tx: broadcast::Sender<ConversationEvent>,
    cmd_rx: mpsc::UnboundedReceiver<ControllerCommand>,
    handle: ControllerHandle,
    conversation: Vec<ConversationEntry>,
    capture_rx: Option<mpsc::Receiver<CaptureEvent>>,
    /// Set on a session-fatal capture error; capture is never reopened.
    session_fatal: Option<CaptureErrorKind>,
    cancel: CancellationToken,
}

impl InteractionController {
    /// Create a controller over the given ports, with the built-in
    /// command table.
    #[must_use]
    pub fn new(
        config: AssistantConfig,
        capture: Box<dyn SpeechCapture>,
        synthesis: Box<dyn SpeechSynthesis>,
        remote: Box<dyn CompletionPort>,
        dispatcher: Box<dyn ActionDispatcher>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(Status::Idle);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        let handle = ControllerHandle {
            cmd_tx,
            status_rx,
            event_tx: event_tx.clone(),
            cancel: cancel.clone(),
        };

        Self {
            config,
            registry: CommandRegistry::with_default_commands(),
            capture,
            synthesis,
            remote,
            dispatcher,
            status: Status::Idle,
            status_tx,
            event_tx,
            cmd_rx,
            handle,
            conversation: Vec::new(),
            capture_rx: None,
            session_fatal: None,
            cancel,
        }
    }

    /// A cloneable handle for driving and observing this controller.
    #[must_use]
    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// The session transcript so far.
    #[must_use]
    pub fn conversation(&self) -> &[ConversationEntry] {
        &self.conversation
    }

    /// Run the interaction loop until shutdown.
    ///
    /// Every port failure is translated into a conversation message and a
    /// status transition here; none escapes the loop.
    ///
    /// # Errors
    ///
    /// Currently infallible at runtime; the `Result` is part of the task
    /// contract so spawned loops can be joined uniformly.
    pub async fn run(mut self) -> Result<()> {
        info!("interaction controller started");
        loop {
            let input = match self.capture_rx.as_mut() {
                Some(rx) => tokio::select! {
                    () = self.cancel.cancelled() => Input::Cancelled,
                    cmd = self.cmd_rx.recv() => Input::Command(cmd),
                    event = rx.recv() => Input::Capture(event),
                },
                None => tokio::select! {
                    () = self.cancel.cancelled() => Input::Cancelled,
                    cmd = self.cmd_rx.recv() => Input::Command(cmd),
                },
            };

            match input {
                Input::Cancelled | Input::Command(None) => break,
                Input::Command(Some(ControllerCommand::ToggleListening)) => {
                    self.toggle_listening().await;
                }
                Input::Capture(Some(event)) => self.handle_capture_event(event).await,
                Input::Capture(None) => {
                    // The engine dropped its stream without saying goodbye.
                    self.capture_rx = None;
                    self.handle_capture_ended().await;
                }
            }
        }

        self.capture.close().await;
        self.synthesis.cancel_all().await;
        info!("interaction controller stopped");
        Ok(())
    }

    async fn toggle_listening(&mut self) {
        match self.status {
            Status::Listening => self.stop_listening().await,
            Status::Processing | Status::Speaking => {
                warn!("toggle ignored while {:?}", self.status);
            }
            Status::Idle | Status::Errored => self.start_listening().await,
        }
    }

    async fn start_listening(&mut self) {
        if self.capture_rx.is_some() {
            warn!("capture already open, not opening twice");
            return;
        }
        if let Some(kind) = &self.session_fatal {
            warn!("capture not reopened after fatal error: {kind:?}");
            return;
        }

        // The microphone must not hear our own playback.
        self.synthesis.cancel_all().await;

        match self.capture.open(&self.config.capture.language).await {
            Ok(rx) => {
                // Status flips to Listening on the port's Started event.
                self.capture_rx = Some(rx);
            }
            Err(e) => {
                warn!("capture failed to open: {e}");
                self.handle_capture_error(CaptureErrorKind::AudioCapture)
                    .await;
            }
        }
    }

    async fn stop_listening(&mut self) {
        self.capture.close().await;
        self.capture_rx = None;
        self.set_status(Status::Idle);
    }

    async fn handle_capture_event(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Started => self.set_status(Status::Listening),
            CaptureEvent::Transcript(text) => self.handle_transcript(&text).await,
            CaptureEvent::Error(kind) => self.handle_capture_error(kind).await,
            CaptureEvent::Ended => {
                self.capture_rx = None;
                self.handle_capture_ended().await;
            }
        }
    }

    /// One full turn: classify, act or ask, speak, settle.
    async fn handle_transcript(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            // Whitespace-only recognition results are a no-op, not an error.
            return;
        }

        // History reflects what was heard even if the turn fails downstream.
        self.append_entry(Speaker::User, trimmed.to_owned());
        self.set_status(Status::Processing);

        match self.registry.match_transcript(trimmed) {
            Some(CommandOutcome::Matched(matched)) => {
                info!(
                    "command matched: {} (argument: {:?})",
                    matched.canonical, matched.argument
                );
                match self.dispatcher.dispatch(&matched.action).await {
                    Ok(()) => self.respond(matched.response).await,
                    Err(e) => {
                        warn!("action dispatch failed: {e}");
                        self.communicate_failure(messages::ACTION_FAILED.to_owned())
                            .await;
                    }
                }
            }
            Some(CommandOutcome::ArgumentRejected {
                canonical,
                response,
            }) => {
                info!("trailing words rejected for no-argument command: {canonical}");
                self.respond(response).await;
            }
            None => self.ask_remote(trimmed).await,
        }
    }

    /// Forward an utterance to the remote assistant and speak the outcome.
    async fn ask_remote(&mut self, utterance: &str) {
        match self.remote.complete(utterance).await {
            Ok(reply) => self.respond(reply).await,
            Err(e) => {
                warn!("remote completion failed: {e}");
                self.communicate_failure(messages::remote_failure(&e)).await;
            }
        }
    }

    /// Append an assistant entry, speak it, settle.
    async fn respond(&mut self, text: String) {
        self.append_entry(Speaker::Assistant, text.clone());
        self.speak_best_effort(&text).await;
        self.settle();
    }

    /// Like [`respond`](Self::respond), but the machine passes through
    /// `Errored` so observers see that a failure is being communicated.
    async fn communicate_failure(&mut self, text: String) {
        self.set_status(Status::Errored);
        self.append_entry(Speaker::Assistant, text.clone());
        self.speak_best_effort(&text).await;
        self.settle();
    }

    /// Speak and swallow playback failures: the entry is already recorded,
    /// and a mute session is still a usable session.
    async fn speak_best_effort(&mut self, text: &str) {
        if self.status != Status::Errored {
            self.set_status(Status::Speaking);
        }
        let utterance = Utterance::new(text, &self.config.synthesis);
        if let Err(e) = self.synthesis.speak(&utterance).await {
            warn!("synthesis failed: {e}");
        }
    }

    /// Return to the ready state for the next turn: listening while
    /// capture is still open, idle otherwise.
    fn settle(&mut self) {
        let next = if self.capture_rx.is_some() {
            Status::Listening
        } else {
            Status::Idle
        };
        self.set_status(next);
    }

    async fn handle_capture_error(&mut self, kind: CaptureErrorKind) {
        if kind.is_silent() {
            // No speech detected: recoverable, and never surfaced.
            return;
        }
        warn!("capture error: {kind:?}");
        if kind.is_fatal() {
            self.capture.close().await;
            self.capture_rx = None;
            self.session_fatal = Some(kind.clone());
        }
        self.communicate_failure(messages::capture_failure(&kind).to_owned())
            .await;
    }

    /// The engine stopped on its own; apply the configured policy.
    async fn handle_capture_ended(&mut self) {
        self.capture.close().await;
        if self.status == Status::Errored {
            return;
        }
        match self.config.conversation.end_of_capture {
            EndOfCapturePolicy::ReturnToIdle => self.set_status(Status::Idle),
            EndOfCapturePolicy::Restart => {
                if self.session_fatal.is_some() {
                    self.set_status(Status::Idle);
                    return;
                }
                tokio::time::sleep(Duration::from_millis(
                    self.config.conversation.restart_delay_ms,
                ))
                .await;
                self.start_listening().await;
            }
        }
    }

    fn append_entry(&mut self, speaker: Speaker, text: String) {
        let entry = ConversationEntry {
            speaker,
            text,
            at: Utc::now(),
        };
        self.conversation.push(entry.clone());
        let _ = self.event_tx.send(ConversationEvent::EntryAppended(entry));
    }

    fn set_status(&mut self, status: Status) {
        if self.status != status {
            info!("status: {:?} -> {:?}", self.status, status);
            self.status = status;
            let _ = self.status_tx.send(status);
        }
    }
}

//! Habla: voice-driven assistant front end.
//!
//! Turns finalized speech transcripts into either a local browser action
//! (open a URL, run a web search) or a remote chat completion, and speaks
//! the result back.
//!
//! # Architecture
//!
//! A single long-lived [`controller::InteractionController`] orchestrates
//! four ports, each an external collaborator:
//! - **Capture**: continuous speech recognition behind
//!   [`capture::SpeechCapture`], normalized to one event stream
//! - **Synthesis**: best-effort spoken output behind
//!   [`synthesis::SpeechSynthesis`]
//! - **Commands**: the static phrase table in [`commands::CommandRegistry`],
//!   resolving to browser actions executed through
//!   [`actions::ActionDispatcher`]
//! - **Remote**: an OpenAI-compatible completion endpoint behind
//!   [`remote::CompletionPort`]
//!
//! The controller serializes the three awaited operations (transcript
//! events, remote completion, speech output) so exactly one turn is in
//! flight at a time, and every failure path settles back to a ready state.

pub mod actions;
pub mod capture;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod remote;
pub mod synthesis;

pub use config::AssistantConfig;
pub use controller::{ControllerHandle, InteractionController, Status};
pub use error::{AssistantError, Result};

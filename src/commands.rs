//! Static command table and transcript matching.
//!
//! The registry is an immutable, ordered list of plain data records:
//! trigger phrases, a tagged action, a response template. It classifies a
//! transcript and computes the response text; executing the resulting
//! action is the controller's job, never the registry's.
//!
//! Matching is deliberately a substring test, not exact equality, so a
//! transcript carrying extra words ("buscar en google gatos") still
//! triggers its command. The argument is whatever remains after removing
//! the first occurrence of the trigger.

use crate::actions::{BrowserAction, SearchEngine};

/// URL opened by the assistant-chat command.
const ASSISTANT_CHAT_URL: &str = "https://chat.openai.com";

/// What a command does, as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    /// Open a fixed URL; trailing words are ignored.
    OpenUrl { url: &'static str },
    /// Search for the extracted argument.
    Search { engine: SearchEngine },
    /// Open the assistant chat; rejects any trailing words so a stray
    /// "abrir chatgpt ..." mid-sentence does not hijack the utterance.
    OpenAssistantChat,
}

/// Response text for a command, rendered with the extracted argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseTemplate {
    Static(&'static str),
    /// `{}` is replaced with the argument.
    WithArgument(&'static str),
}

impl ResponseTemplate {
    fn render(&self, argument: &str) -> String {
        match self {
            Self::Static(text) => (*text).to_owned(),
            Self::WithArgument(template) => template.replacen("{}", argument, 1),
        }
    }
}

/// A single voice command: trigger phrases plus the action they resolve to.
#[derive(Debug, Clone)]
struct CommandDefinition {
    canonical: &'static str,
    aliases: &'static [&'static str],
    kind: CommandKind,
    response: ResponseTemplate,
}

impl CommandDefinition {
    /// Canonical phrase and aliases, in matching order.
    fn triggers(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.canonical).chain(self.aliases.iter().copied())
    }

    fn resolve(&self, trigger: &'static str, argument: String) -> CommandOutcome {
        match self.kind {
            CommandKind::OpenUrl { url } => CommandOutcome::Matched(CommandMatch {
                canonical: self.canonical,
                trigger,
                response: self.response.render(&argument),
                argument,
                action: BrowserAction::OpenUrl {
                    url: url.to_owned(),
                },
            }),
            CommandKind::Search { engine } => CommandOutcome::Matched(CommandMatch {
                canonical: self.canonical,
                trigger,
                response: self.response.render(&argument),
                action: BrowserAction::WebSearch {
                    engine,
                    query: argument.clone(),
                },
                argument,
            }),
            CommandKind::OpenAssistantChat => {
                if argument.is_empty() {
                    CommandOutcome::Matched(CommandMatch {
                        canonical: self.canonical,
                        trigger,
                        response: self.response.render(&argument),
                        argument,
                        action: BrowserAction::OpenUrl {
                            url: ASSISTANT_CHAT_URL.to_owned(),
                        },
                    })
                } else {
                    CommandOutcome::ArgumentRejected {
                        canonical: self.canonical,
                        response: rejection_response(self.canonical),
                    }
                }
            }
        }
    }
}

/// A matched command with its extracted argument and rendered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    /// Canonical phrase of the matched command.
    pub canonical: &'static str,
    /// The trigger substring that matched (canonical phrase or alias).
    pub trigger: &'static str,
    /// Transcript with the first trigger occurrence removed, trimmed.
    pub argument: String,
    /// The action to dispatch.
    pub action: BrowserAction,
    /// The response to speak.
    pub response: String,
}

/// Result of classifying a transcript against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A command matched; the action may be dispatched.
    Matched(CommandMatch),
    /// A no-argument command matched with trailing words. A user error,
    /// distinct from "no match": the action must not run and the
    /// utterance must not fall through to the remote assistant.
    ArgumentRejected {
        /// Canonical phrase of the rejecting command.
        canonical: &'static str,
        /// Corrective response to speak instead.
        response: String,
    },
}

/// Corrective response for a no-argument command with trailing words.
fn rejection_response(canonical: &str) -> String {
    format!("El comando \"{canonical}\" no lleva texto adicional. Dilo tal cual para abrirlo.")
}

/// Ordered, immutable table of voice commands.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<CommandDefinition>,
}

impl CommandRegistry {
    /// The built-in Spanish command table.
    #[must_use]
    pub fn with_default_commands() -> Self {
        Self {
            commands: vec![
                CommandDefinition {
                    canonical: "abrir youtube",
                    aliases: &["abre youtube"],
                    kind: CommandKind::OpenUrl {
                        url: "https://www.youtube.com",
                    },
                    response: ResponseTemplate::Static("Abriendo YouTube"),
                },
                CommandDefinition {
                    canonical: "abrir google",
                    aliases: &["abre google"],
                    kind: CommandKind::OpenUrl {
                        url: "https://www.google.com",
                    },
                    response: ResponseTemplate::Static("Abriendo Google"),
                },
                CommandDefinition {
                    canonical: "buscar en google",
                    aliases: &["busca en google"],
                    kind: CommandKind::Search {
                        engine: SearchEngine::Google,
                    },
                    response: ResponseTemplate::WithArgument(r#"Buscando "{}" en Google"#),
                },
                CommandDefinition {
                    canonical: "buscar en youtube",
                    aliases: &["busca en youtube"],
                    kind: CommandKind::Search {
                        engine: SearchEngine::YouTube,
                    },
                    response: ResponseTemplate::WithArgument(r#"Buscando "{}" en YouTube"#),
                },
                CommandDefinition {
                    canonical: "abrir chatgpt",
                    aliases: &["abre chatgpt"],
                    kind: CommandKind::OpenAssistantChat,
                    response: ResponseTemplate::Static("Abriendo ChatGPT"),
                },
            ],
        }
    }

    /// Classify a transcript.
    ///
    /// The transcript is lowercased and trimmed before matching. Commands
    /// are tried in table order, the canonical phrase before its aliases;
    /// the first trigger found as a substring wins. Returns `None` when no
    /// trigger matches, in which case the utterance belongs to the remote
    /// assistant.
    #[must_use]
    pub fn match_transcript(&self, transcript: &str) -> Option<CommandOutcome> {
        let normalized = transcript.trim().to_lowercase();
        for command in &self.commands {
            for trigger in command.triggers() {
                let Some(at) = normalized.find(trigger) else {
                    continue;
                };
                let argument = strip_trigger(&normalized, trigger, at);
                return Some(command.resolve(trigger, argument));
            }
        }
        None
    }
}

/// Remove the first occurrence of the trigger and trim what remains.
fn strip_trigger(transcript: &str, trigger: &str, at: usize) -> String {
    let mut rest = String::with_capacity(transcript.len() - trigger.len());
    rest.push_str(&transcript[..at]);
    rest.push_str(&transcript[at + trigger.len()..]);
    rest.trim().to_owned()
}

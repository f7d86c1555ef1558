//! Headless console driver for the assistant.
//!
//! Typed lines stand in for finalized transcripts and the conversation is
//! printed as it grows, so the whole interaction loop can be exercised
//! without microphone or speaker hardware. The remote endpoint is real:
//! point `[remote]` in the config at any OpenAI-compatible server.
//!
//! Usage: `habla-console [config.toml]`

use anyhow::Context;
use async_trait::async_trait;
use habla::actions::LoggingDispatcher;
use habla::capture::{CAPTURE_CHANNEL_SIZE, CaptureEvent, SpeechCapture};
use habla::config::AssistantConfig;
use habla::controller::{ConversationEvent, InteractionController, Speaker};
use habla::remote::RemoteAssistantClient;
use habla::synthesis::NullSynthesis;
use std::path::Path;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Capture port backed by stdin: each line is a finalized transcript.
#[derive(Default)]
struct StdinCapture {
    reader: Option<JoinHandle<()>>,
}

#[async_trait]
impl SpeechCapture for StdinCapture {
    async fn open(&mut self, _language: &str) -> habla::Result<mpsc::Receiver<CaptureEvent>> {
        let (tx, rx) = mpsc::channel(CAPTURE_CHANNEL_SIZE);
        self.reader = Some(tokio::spawn(async move {
            let _ = tx.send(CaptureEvent::Started).await;
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(CaptureEvent::Transcript(line)).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(CaptureEvent::Ended).await;
        }));
        Ok(rx)
    }

    async fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            AssistantConfig::load(Path::new(&path)).context("loading configuration")?
        }
        None => AssistantConfig::default(),
    };

    let remote = RemoteAssistantClient::new(&config.remote).context("building remote client")?;
    let controller = InteractionController::new(
        config,
        Box::new(StdinCapture::default()),
        Box::new(NullSynthesis),
        Box::new(remote),
        Box::new(LoggingDispatcher),
    );
    let handle = controller.handle();

    let mut events = handle.subscribe();
    tokio::spawn(async move {
        while let Ok(ConversationEvent::EntryAppended(entry)) = events.recv().await {
            let who = match entry.speaker {
                Speaker::User => "tú",
                Speaker::Assistant => "asistente",
            };
            println!("{who}> {}", entry.text);
        }
    });

    handle.toggle_listening();
    let loop_task = tokio::spawn(controller.run());

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    handle.shutdown();
    loop_task.await.context("joining controller loop")??;
    Ok(())
}

use super::check::check_story;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::delivery::{DeliveryScheduler, StoryHandler};
use crate::sessions::InMemorySessionStore;
use crate::story::StoryHandle;
use crate::transport::gateway::{AppState, run_gateway};
use crate::transport::{Channel, TelegramChannel};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Incoming messages buffered between the poller and the handlers.
const POLL_QUEUE_DEPTH: usize = 100;

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            config.validate()?;
            serve(&config).await
        }
        Commands::Poll => {
            config.validate()?;
            poll(&config).await
        }
        Commands::Check { story, i18n } => {
            if let Some(story) = story {
                config.story.path = story;
            }
            if i18n.is_some() {
                config.story.i18n_path = i18n;
            }
            config.validate_story()?;
            let summary = check_story(&config.story)?;
            println!("{summary}");
            Ok(())
        }
    }
}

fn telegram_channel(config: &Config) -> Arc<TelegramChannel> {
    Arc::new(
        TelegramChannel::new(config.telegram.bot_token.clone())
            .with_api_base(config.telegram.api_base.clone())
            .with_poll_timeout(config.telegram.poll_timeout_secs),
    )
}

/// Load the story and wire sessions, scheduler and `channel` into a handler.
pub fn build_handler(config: &Config, channel: Arc<dyn Channel>) -> Result<StoryHandler> {
    let story = StoryHandle::from_source(config.story.source()).with_context(|| {
        format!("Failed to load story {}", config.story.path.display())
    })?;
    {
        let loaded = story.load_full();
        anyhow::ensure!(!loaded.is_empty(), crate::error::StoryError::EmptyStory);
        loaded.validate()?;
        tracing::info!(
            path = %config.story.path.display(),
            steps = loaded.len(),
            languages = ?loaded.i18n().languages(),
            "story loaded"
        );
    }

    let scheduler = DeliveryScheduler::new(channel, config.delivery.retry_policy());
    Ok(StoryHandler::new(
        story,
        Arc::new(InMemorySessionStore::new()),
        Arc::new(scheduler),
    )
    .with_reset_command(config.story.reset_command()))
}

async fn serve(config: &Config) -> Result<()> {
    let handler = build_handler(config, telegram_channel(config))?;
    let reloader = spawn_reload_on_hangup(handler.story().clone())?;

    let state =
        AppState::new(handler.clone()).with_secret_token(config.gateway.secret_token.as_deref());
    let result = run_gateway(
        &config.gateway.host,
        config.gateway.port,
        &config.gateway.bot_path,
        state,
        shutdown_signal(),
    )
    .await;

    reloader.abort();
    let dropped = handler.scheduler().shutdown();
    if dropped > 0 {
        tracing::info!(dropped, "pending deliveries cancelled on shutdown");
    }
    result
}

async fn poll(config: &Config) -> Result<()> {
    let channel = telegram_channel(config);
    let handler = build_handler(config, channel.clone())?;
    let reloader = spawn_reload_on_hangup(handler.story().clone())?;

    let (tx, mut rx) = mpsc::channel(POLL_QUEUE_DEPTH);
    let listener = tokio::spawn(async move { channel.listen(tx).await });

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else {
                    tracing::warn!("poller stopped");
                    break;
                };
                let handler = handler.clone();
                tokio::spawn(async move {
                    if let Err(error) = handler.handle(message).await {
                        tracing::error!(%error, "failed to handle message");
                    }
                });
            }
            () = &mut shutdown => break,
        }
    }

    listener.abort();
    reloader.abort();
    let dropped = handler.scheduler().shutdown();
    if dropped > 0 {
        tracing::info!(dropped, "pending deliveries cancelled on shutdown");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

/// Re-read story and translations on every SIGHUP.
#[cfg(unix)]
fn spawn_reload_on_hangup(story: StoryHandle) -> Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).context("install SIGHUP handler")?;
    Ok(tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            if let Err(error) = story.reload() {
                tracing::error!(%error, "story reload failed, keeping the current story");
            }
        }
    }))
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_story: StoryHandle) -> Result<tokio::task::JoinHandle<()>> {
    Ok(tokio::spawn(async {}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::ChatId;
    use crate::transport::{IncomingMessage, RecordingChannel};
    use std::fs;
    use tempfile::TempDir;

    fn config_with_story(dir: &TempDir, story: &str) -> Config {
        let path = dir.path().join("story.json");
        fs::write(&path, story).unwrap();
        let mut config = Config::default();
        config.telegram.bot_token = "123:ABC".into();
        config.story.path = path;
        config
    }

    #[tokio::test]
    async fn built_handler_answers_from_the_story_file() {
        let dir = TempDir::new().unwrap();
        let config = config_with_story(
            &dir,
            r#"[{"expect": "42", "response": "Correct!", "fail": "Try again."}]"#,
        );
        let channel = Arc::new(RecordingChannel::new());
        let handler = build_handler(&config, channel.clone()).unwrap();

        handler.handle(IncomingMessage::text(ChatId(5), "41")).await.unwrap();
        handler.handle(IncomingMessage::text(ChatId(5), "42")).await.unwrap();

        assert_eq!(channel.texts(ChatId(5)), vec!["Try again.", "Correct!"]);
    }

    #[test]
    fn empty_story_is_refused_at_startup() {
        let dir = TempDir::new().unwrap();
        let config = config_with_story(&dir, "[]");
        let channel = Arc::new(RecordingChannel::new());
        assert!(build_handler(&config, channel).is_err());
    }

    #[test]
    fn missing_story_names_the_path() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_story(&dir, "[]");
        config.story.path = dir.path().join("gone.json");
        let Err(err) = build_handler(&config, Arc::new(RecordingChannel::new())) else {
            panic!("story file is missing, handler must not build");
        };
        assert!(format!("{err:#}").contains("gone.json"));
    }

    #[tokio::test]
    async fn check_runs_without_a_bot_token() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_story(&dir, r#"[{"response": "hello"}]"#);
        config.telegram.bot_token.clear();
        let cli = Cli {
            config: None,
            command: Commands::Check {
                story: None,
                i18n: None,
            },
        };
        dispatch(cli, config).await.unwrap();
    }

    #[tokio::test]
    async fn serve_without_a_token_is_rejected() {
        let cli = Cli {
            config: None,
            command: Commands::Serve {
                port: Some(0),
                host: None,
            },
        };
        assert!(dispatch(cli, Config::default()).await.is_err());
    }
}

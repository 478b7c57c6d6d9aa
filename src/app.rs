use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::core::{
    config::{AppConfig, PreferenceStore},
    context::AlertContext,
    feed::{self, FeedMessage},
    platform::desktop::{DesktopChannelHost, DesktopPlatform},
};

/// Build the alert context for the desktop and run setup-time calls.
pub async fn setup(config: &AppConfig) -> AlertContext {
    let platform = Arc::new(DesktopPlatform::new(&config.origin));
    let channel_host = Arc::new(DesktopChannelHost::new());
    let store = PreferenceStore::new(config.config_dir.clone());

    let mut ctx = AlertContext::new(platform, channel_host, store, config.channel_scope());
    ctx.register_channel().await;
    if let Some(message) = ctx.status_message() {
        log::warn!("{}", message);
    }
    ctx
}

async fn handle_message(ctx: &mut AlertContext, message: FeedMessage) {
    match message {
        FeedMessage::Entries { entries } => {
            let outcome = ctx.process_batch(&entries);
            if !outcome.decisions.is_empty() {
                log::info!(
                    "Tick: {} entries, {} alerts fired, {} delivered",
                    entries.len(),
                    outcome.decisions.len(),
                    outcome.delivered
                );
            }
        }
        FeedMessage::Enable => {
            if ctx.set_enabled(true).await {
                log::info!("Alerts enabled");
            } else {
                log::warn!(
                    "Alerts not enabled: {}",
                    ctx.status_message().unwrap_or("permission not granted")
                );
            }
        }
        FeedMessage::Disable => {
            if ctx.set_enabled(false).await {
                log::info!("Alerts disabled");
            }
        }
        FeedMessage::Sound { enabled } => {
            if ctx.set_sound_enabled(enabled) {
                log::info!("Alert sound {}", if enabled { "on" } else { "off" });
            }
        }
        FeedMessage::Test => {
            let outcome = ctx.dispatch_test();
            log::info!(
                "Test alert: notification shown={}, sound played={}",
                outcome.notification_shown,
                outcome.sound_played
            );
        }
        FeedMessage::Status => {
            let caps = ctx.capabilities();
            log::info!(
                "Status: permission={:?} secure={} channel={} settings={:?}",
                caps.permission,
                caps.secure_context,
                ctx.channel_state().registered,
                ctx.settings()
            );
            if let Some(message) = ctx.status_message() {
                log::info!("{}", message);
            }
        }
    }
}

/// Consume feed lines until EOF, one message at a time.
/// Returns how many messages were handled.
pub async fn drive<R: AsyncBufRead + Unpin>(ctx: &mut AlertContext, input: R) -> usize {
    let mut lines = input.lines();
    let mut handled = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::warn!("Failed to read feed: {}", e);
                break;
            }
        };
        match feed::parse_line(&line) {
            None => continue,
            Some(Ok(message)) => {
                handle_message(ctx, message).await;
                handled += 1;
            }
            Some(Err(e)) => log::warn!("Skipping malformed feed line: {}", e),
        }
    }
    handled
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("error while building the tokio runtime");

    runtime.block_on(async move {
        let mut ctx = setup(&config).await;
        log::info!(
            "Reading detection feed from stdin (origin {}, settings in {:?})",
            config.origin,
            config.config_dir
        );
        let handled = drive(&mut ctx, BufReader::new(tokio::io::stdin())).await;
        log::info!("Feed closed after {} messages", handled);
    });
}

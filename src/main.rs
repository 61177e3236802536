use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;

use agent_responder::{
    config::Config,
    cursor::JsonCursorStore,
    logging::init_tracing,
    responder::Responder,
    tmux::TmuxBackend,
    transport::TelegramTransport,
    usage_log::UsageLog,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing("info");
    let config = Config::parse();

    tracing::info!(target = "agent_responder::loop", "Telegram responder starting");

    let transport = TelegramTransport::from_env(UsageLog::new(config.usage_log()))
        .context("failed to connect to Telegram")?;
    match transport.describe_bot().await {
        Ok(bot) => tracing::info!(
            target = "agent_responder::loop",
            bot = bot.username.as_deref().unwrap_or("unknown"),
            chat_id = ?transport.chat_id(),
            "connected to Telegram bot"
        ),
        Err(error) => tracing::warn!(target = "agent_responder::loop", error = %error, "could not describe bot, continuing"),
    }

    let responder = Responder::with_backend(
        transport,
        config.state_dir(),
        TmuxBackend::new(),
        JsonCursorStore::new(config.cursor_file()),
        config.settings(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    responder.run(shutdown_rx).await;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    let mut sigterm =
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(error) => {
                tracing::warn!(error = %error, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

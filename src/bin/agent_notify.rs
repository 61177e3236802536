use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use agent_responder::{
    cursor::JsonCursorStore,
    logging::init_tracing,
    notify::{fetch_replies, render_replies, render_sent, send_message, Action, NotifyArgs},
    transport::TelegramTransport,
    usage_log::UsageLog,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing("warn");
    let args = NotifyArgs::parse();

    let Some(action) = args.action() else {
        let _ = NotifyArgs::command().print_help();
        return ExitCode::from(1);
    };

    let transport = match TelegramTransport::from_env(UsageLog::new(args.usage_log())) {
        Ok(transport) => transport,
        Err(error) => return fail(&error),
    };

    match action {
        Action::Send { text, hint } => match send_message(&transport, &text, hint).await {
            Ok(sent) => {
                if let Some(out) = render_sent(&text, sent, args.json, args.quiet) {
                    println!("{out}");
                }
            }
            Err(error) => return fail(&error),
        },
        Action::Replies { only_new } => {
            let store = JsonCursorStore::new(args.cursor_file());
            let messages = fetch_replies(&transport, &store, only_new).await;
            if let Some(out) = render_replies(&messages, args.json, args.quiet) {
                println!("{out}");
            }
        }
    }

    ExitCode::SUCCESS
}

fn fail(error: &dyn std::fmt::Display) -> ExitCode {
    eprintln!("ERROR: {error}");
    ExitCode::from(1)
}

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, bail, Result};

use crate::{
    cli::{Cli, Command},
    domain::{
        chat::Chat,
        message::{Message, Sender},
        status::ConnectionStatus,
    },
    gowa::envelope::describe_for_log,
    sync::{IntervalWorker, ReconnectPlanner},
    usecases::{
        bootstrap,
        connect_wizard::{run_connect_wizard, StdTerminal, ThreadPacer, WizardOutcome, WizardTerminal},
        context::AppContext,
        list_chats::ListChatsError,
        load_messages::{load_messages, LoadMessagesError, LoadMessagesQuery},
        send_message::SendMessageError,
        session,
    },
};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command_or_default() {
        Command::Login { username } => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            let username = match username {
                Some(username) => username,
                None => {
                    let mut terminal = StdTerminal;
                    terminal
                        .prompt_line("Username: ")?
                        .ok_or_else(|| anyhow!("login cancelled"))?
                }
            };
            let password = rpassword::prompt_password("Password: ")?;

            let session = session::login(
                &context.client,
                &context.store,
                &context.credentials,
                &context.tracker,
                &username,
                &password,
            )?;
            println!(
                "Logged in as {} ({}). Session saved.",
                session.username,
                session.role.as_label()
            );

            let status = context.hub.refresh_status();
            context.tracker.on_status(status.clone());
            println!("whatsapp: {}", status.as_label());
        }
        Command::Logout => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            session::logout(&context.store, &context.credentials, &context.tracker)?;
            println!("Logged out. Requests now use the configured default credentials.");
        }
        Command::Status => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            restore_session(&context);

            let snapshot = context.tracker.snapshot();
            println!("session:  {}", snapshot.phase.as_label());
            if let Some(session) = &snapshot.session {
                println!("operator: {} ({})", session.username, session.role.as_label());
            }
            println!("whatsapp: {}", context.hub.app_status().as_label());
        }
        Command::Connect => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            restore_session(&context);

            let mut terminal = StdTerminal;
            let mut pacer = ThreadPacer;
            let outcome = run_connect_wizard(
                &mut terminal,
                &context.hub,
                &mut pacer,
                Duration::from_secs(context.config.sync.status_poll_secs),
            )?;

            match outcome {
                WizardOutcome::Connected => println!("WhatsApp account linked."),
                WizardOutcome::Cancelled => println!("Connect wizard cancelled."),
                WizardOutcome::Failed { reason } => bail!("linking failed: {reason}"),
            }
        }
        Command::Chats { search } => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            restore_session(&context);

            let chats = context
                .hub
                .chats(search.as_deref())
                .map_err(|error| anyhow!(describe_chats_error(error)))?;

            if chats.is_empty() {
                println!("No chats.");
            }
            for chat in &chats {
                println!("{}", chat_line(chat));
            }
        }
        Command::Messages { jid, limit } => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            restore_session(&context);

            let mut query = LoadMessagesQuery::new(jid.clone());
            if let Some(limit) = limit {
                query.limit = limit;
            }
            let output = load_messages(&context.client, query)
                .map_err(|error| anyhow!(describe_messages_error(error)))?;

            if output.messages.is_empty() {
                println!("No messages in {jid}.");
            }
            for message in &output.messages {
                println!("{}", message_line(message));
            }
        }
        Command::Send { jid, text } => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            restore_session(&context);

            context
                .hub
                .send(&jid, &text)
                .map_err(|error| anyhow!(describe_send_error(error)))?;
            println!("Message sent to {jid}.");
        }
        Command::Watch => {
            let context = bootstrap::bootstrap(cli.config.as_deref())?;
            restore_session(&context);
            watch(context)?;
        }
    }

    Ok(())
}

/// Best-effort revival of the persisted session. Commands still work with the
/// configured default credentials when nothing is stored.
fn restore_session(context: &AppContext) {
    match session::restore(
        &context.client,
        &context.store,
        &context.credentials,
        &context.tracker,
    ) {
        Ok(Some(session)) => {
            tracing::info!(username = %session.username, "session restored");
        }
        Ok(None) => {
            tracing::debug!("no stored session, using configured credentials");
        }
        Err(error) => {
            tracing::warn!(error = %error, "session restore failed, using configured credentials");
        }
    }
}

/// Foreground loop: a background worker keeps the status fresh on the session
/// refresh interval, while this thread reports changes and drives the single
/// delayed reconnect attempt.
fn watch(context: AppContext) -> Result<()> {
    let worker_client = context.client.clone();
    let worker_tracker = Arc::clone(&context.tracker);
    let _refresh_worker = IntervalWorker::start(
        "session-refresh",
        Duration::from_secs(context.config.sync.session_refresh_secs),
        move || {
            let status = worker_client.app_status().unwrap_or_else(|error| {
                tracing::debug!(
                    error = %describe_for_log(&error),
                    "background status refresh failed"
                );
                ConnectionStatus::disconnected()
            });
            worker_tracker.on_status(status);
        },
    )?;

    context.tracker.on_status(context.hub.refresh_status());
    let mut planner = ReconnectPlanner::new(Duration::from_secs(
        context.config.sync.reconnect_delay_secs,
    ));
    let mut last_connected: Option<bool> = None;
    println!("Watching the WhatsApp link. Press Ctrl-C to stop.");

    loop {
        let snapshot = context.tracker.snapshot();
        let connected = snapshot.status.connected;

        if last_connected != Some(connected) {
            println!("whatsapp: {}", snapshot.status.as_label());
            planner.note_status(connected, false, Instant::now());
            last_connected = Some(connected);
        }

        if planner.take_due(Instant::now()) {
            tracing::info!("link is down, requesting a reconnect");
            if let Err(error) = context.hub.reconnect() {
                tracing::warn!(error = %describe_for_log(&error), "reconnect request failed");
            }
            context.tracker.on_status(context.hub.refresh_status());
        }

        thread::sleep(Duration::from_secs(1));
    }
}

fn chat_line(chat: &Chat) -> String {
    let when = chat
        .timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "---------- --:--".to_owned());

    format!(
        "{when}  {:<24} {:<16} unread {:>3}  {}",
        chat.name, chat.phone, chat.unread_count, chat.last_message
    )
}

fn message_line(message: &Message) -> String {
    let when = message
        .timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "---------- --:--".to_owned());
    let who = match message.sender {
        Sender::User => "you",
        Sender::Contact => "them",
    };

    format!("{when}  {who:>4} [{}] {}", message.status.as_label(), message.text)
}

fn describe_chats_error(error: ListChatsError) -> &'static str {
    match error {
        ListChatsError::Unauthorized => "the backend rejected the credentials",
        ListChatsError::TemporarilyUnavailable => "the backend is unreachable, try again later",
        ListChatsError::DataContractViolation => "the backend returned an unexpected payload",
    }
}

fn describe_messages_error(error: LoadMessagesError) -> &'static str {
    match error {
        LoadMessagesError::Unauthorized => "the backend rejected the credentials",
        LoadMessagesError::TemporarilyUnavailable => "the backend is unreachable, try again later",
        LoadMessagesError::DataContractViolation => "the backend returned an unexpected payload",
        LoadMessagesError::ChatNotFound => "no such chat on the backend",
    }
}

fn describe_send_error(error: SendMessageError) -> &'static str {
    match error {
        SendMessageError::EmptyMessage => "refusing to send an empty message",
        SendMessageError::Unauthorized => "the backend rejected the credentials",
        SendMessageError::ChatNotFound => "no such chat on the backend",
        SendMessageError::TemporarilyUnavailable => "the backend is unreachable, try again later",
    }
}

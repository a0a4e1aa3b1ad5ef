use clap::Parser;
use tokio::sync::mpsc;

use chat_widget::config::load_config;
use chat_widget::error::WidgetError;
use chat_widget::widget::{ChatWindow, MessageId, SubmitOutcome, WidgetEvent};

use crate::args::CliArgs;
use crate::logging::init_logging;
use crate::terminal::TerminalView;

const QUIT_COMMAND: &str = "/quit";

enum Input {
    Line(Option<String>),
    Widget(WidgetEvent),
}

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let mut loaded = load_config(args.config.clone())?;
    init_logging(&loaded.config.logging, &loaded.log_target)?;
    args.apply(&mut loaded.config);
    let config = loaded.config;

    let view = TerminalView::new(config.bot_name.clone());
    let mut window = ChatWindow::connect(&config, view)?;
    for message in window.messages().to_vec() {
        window.scroll_mut().print_message(&message)?;
    }

    if let Some(prompt) = args.prompt.as_deref() {
        submit(&mut window, prompt, &config.placeholder_text)?;
        while window.is_streaming() || window.revealing_id().is_some() {
            let event = window.next_event().await;
            render(&mut window, event)?;
        }
        return Ok(());
    }

    let (line_tx, mut line_rx) = mpsc::channel(16);
    spawn_line_reader(line_tx);
    loop {
        let input = tokio::select! {
            line = line_rx.recv() => Input::Line(line),
            event = window.next_event() => Input::Widget(event),
        };
        match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) if line.trim() == QUIT_COMMAND => break,
            Input::Line(Some(line)) => submit(&mut window, &line, &config.placeholder_text)?,
            Input::Widget(event) => render(&mut window, event)?,
        }
    }
    window.close();
    Ok(())
}

fn submit(
    window: &mut ChatWindow<TerminalView>,
    text: &str,
    placeholder: &str,
) -> anyhow::Result<()> {
    match window.submit(text)? {
        SubmitOutcome::Sent {
            session,
            interrupted,
        } => {
            log::debug!("submitted message in session {session}");
            if let Some(id) = interrupted {
                let text = message_text(window, id);
                window.scroll_mut().finish_reply(&text)?;
            }
            window.scroll_mut().print_placeholder(placeholder)?;
        }
        SubmitOutcome::Busy => window
            .scroll_mut()
            .print_notice("still answering, please wait")?,
        SubmitOutcome::Ignored => {}
    }
    Ok(())
}

fn render(window: &mut ChatWindow<TerminalView>, event: WidgetEvent) -> anyhow::Result<()> {
    match event {
        WidgetEvent::Streaming { len } => log::trace!("buffered {len} bytes"),
        WidgetEvent::Reply { id, error } => {
            if let Some(err) = error {
                window.scroll_mut().clear_placeholder()?;
                window
                    .scroll_mut()
                    .print_notice(&format!("connection interrupted: {err}"))?;
            }
            window.scroll_mut().start_reply()?;
            if window.revealing_id() != Some(id) {
                let text = message_text(window, id);
                window.scroll_mut().finish_reply(&text)?;
            }
        }
        WidgetEvent::EmptyReply { error } => {
            window.scroll_mut().clear_placeholder()?;
            if !matches!(error, WidgetError::EmptyCompletion) {
                window.scroll_mut().print_notice(&format!("no reply: {error}"))?;
            }
            // Either the fallback reply or the placeholder left in place.
            if let Some(last) = window.messages().last().cloned() {
                window.scroll_mut().print_message(&last)?;
            }
        }
        WidgetEvent::Revealing { text, .. } => window.scroll_mut().print_progress(&text)?,
        WidgetEvent::Settled { id } => {
            let text = message_text(window, id);
            window.scroll_mut().finish_reply(&text)?;
        }
    }
    Ok(())
}

fn message_text(window: &ChatWindow<TerminalView>, id: MessageId) -> String {
    window
        .messages()
        .iter()
        .find(|message| message.id == id)
        .map(|message| message.text.clone())
        .unwrap_or_default()
}

fn spawn_line_reader(sender: mpsc::Sender<String>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
    });
}

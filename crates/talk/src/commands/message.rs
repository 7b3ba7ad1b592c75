//! Message commands: history, one-shot send and streamed chat.

use anyhow::Result;
use colored::Colorize;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::{self, Write};
use std::time::Duration;
use talk_core::api::MESSAGES_PAGE_SIZE;
use talk_core::types::{ChatEvent, Message, MessageRole, SendMessage};
use talk_core::ApiClient;
use tracing::debug;

use super::format_time;
use crate::cli::{MessageAction, MessageCommand};
use crate::config::Config;

pub async fn execute(cmd: MessageCommand, config: &Config) -> Result<()> {
    let client = super::logged_in_client(config)?;

    match cmd.action {
        MessageAction::List {
            conversation_id,
            page,
            json,
        } => {
            let messages = client
                .messages(conversation_id)
                .list(page.to_page(MESSAGES_PAGE_SIZE))
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&messages)?);
            } else if messages.is_empty() {
                println!("{}", "No messages on this page.".dimmed());
            } else {
                for message in &messages {
                    print_message(message);
                }
            }
        }
        MessageAction::Send {
            conversation_id,
            content,
        } => {
            let spinner = spinner("Waiting for reply...");
            let result = client
                .messages(conversation_id)
                .send(&SendMessage { content })
                .await;
            spinner.finish_and_clear();

            let exchange = result?;
            print_message(&exchange.1);
        }
        MessageAction::Chat {
            conversation_id,
            content,
            raw,
        } => chat(&client, conversation_id, content, raw).await?,
    }

    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn role_label(role: MessageRole) -> colored::ColoredString {
    match role {
        MessageRole::User => "you".green().bold(),
        MessageRole::Assistant => "ai".cyan().bold(),
        MessageRole::System => "system".yellow().bold(),
    }
}

fn print_message(message: &Message) {
    println!(
        "{} {}",
        role_label(message.role),
        format_time(message.created_at).dimmed()
    );
    println!("{}", message.content);
    println!();
}

/// Stream a reply to the terminal until `done`, end of stream or ctrl-c
async fn chat(client: &ApiClient, conversation_id: i64, content: String, raw: bool) -> Result<()> {
    let spinner = spinner("Thinking...");
    let mut events = match client
        .messages(conversation_id)
        .stream::<Value>(&SendMessage { content })
        .await
    {
        Ok(events) => events,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    let mut renderer = ReplyRenderer::default();
    let consume = async {
        let mut stdout = io::stdout();
        while let Some(record) = events.next().await {
            let record = record?;
            if raw {
                spinner.suspend(|| println!("{}", record));
                continue;
            }

            let event = serde_json::from_value(record).unwrap_or(ChatEvent::Unknown);
            if renderer.is_idle() && matches!(event, ChatEvent::AiChunk { .. } | ChatEvent::Error { .. }) {
                spinner.finish_and_clear();
            }
            renderer.render(&event, &mut stdout)?;
            if event.is_terminal() {
                break;
            }
        }
        Ok::<_, anyhow::Error>(())
    };

    let result = tokio::select! {
        result = consume => result,
        _ = tokio::signal::ctrl_c() => {
            debug!("Chat interrupted, dropping stream");
            println!();
            println!("{}", "Interrupted.".yellow());
            Ok(())
        }
    };
    spinner.finish_and_clear();
    debug!(chars = renderer.reply.chars().count(), "Chat reply finished");
    result
}

/// Turns chat events into terminal output
#[derive(Debug, Default)]
struct ReplyRenderer {
    reply: String,
    printed: bool,
}

impl ReplyRenderer {
    /// No reply text has been printed yet
    fn is_idle(&self) -> bool {
        !self.printed
    }

    fn render<W: Write>(&mut self, event: &ChatEvent, out: &mut W) -> io::Result<()> {
        match event {
            ChatEvent::AiChunk { content } => {
                if !self.printed {
                    write!(out, "{} ", role_label(MessageRole::Assistant))?;
                    self.printed = true;
                }
                self.reply.push_str(content);
                write!(out, "{}", content)?;
                out.flush()?;
            }
            ChatEvent::AiComplete { message } => {
                // Some failures only show up in the stored reply
                if !self.printed && !message.content.is_empty() {
                    write!(out, "{} {}", role_label(MessageRole::Assistant), message.content)?;
                    self.reply = message.content.clone();
                    self.printed = true;
                }
                writeln!(out)?;
            }
            ChatEvent::Error { message } => {
                self.printed = true;
                writeln!(out)?;
                writeln!(out, "{} {}", "✗".red(), message)?;
            }
            ChatEvent::UserMessage { .. } | ChatEvent::AiStart | ChatEvent::Done | ChatEvent::Unknown => {}
        }
        Ok(())
    }
}

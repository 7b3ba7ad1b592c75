//! Conversation commands.

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use talk_core::api::CONVERSATIONS_PAGE_SIZE;
use talk_core::types::{Conversation, CreateConversation, UpdateConversation};

use super::{format_time, truncate};
use crate::cli::{ConversationAction, ConversationCommand};
use crate::config::Config;

pub async fn execute(cmd: ConversationCommand, config: &Config) -> Result<()> {
    let client = super::logged_in_client(config)?;
    let api = client.conversations();

    match cmd.action {
        ConversationAction::List { page, json } => {
            let page = page.to_page(CONVERSATIONS_PAGE_SIZE);
            let conversations = api.list(page).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&conversations)?);
                return Ok(());
            }
            if conversations.is_empty() {
                println!("{}", "No conversations on this page.".dimmed());
                return Ok(());
            }

            println!(
                "{:>6}  {:<40}  {:>8}  {}",
                "ID".bold(),
                "TITLE".bold(),
                "MESSAGES".bold(),
                "UPDATED".bold()
            );
            for conv in &conversations {
                print_row(conv);
            }
            println!(
                "{}",
                format!("page {} · {} shown", page.page, conversations.len()).dimmed()
            );
        }
        ConversationAction::Create { title } => {
            let req = title
                .map(|title| CreateConversation { title })
                .unwrap_or_default();
            let conv = api.create(&req).await?;
            println!("{} Created conversation {} '{}'", "✓".green(), conv.id, conv.title);
        }
        ConversationAction::Show { id, json } => {
            let conv = api.get(id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&conv)?);
            } else {
                print_details(&conv);
            }
        }
        ConversationAction::Rename { id, title } => {
            let conv = api.update(id, &UpdateConversation { title }).await?;
            println!("{} Renamed conversation {} to '{}'", "✓".green(), conv.id, conv.title);
        }
        ConversationAction::Delete { id, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete conversation {} and all its messages?", id))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Aborted.");
                    return Ok(());
                }
            }
            api.delete(id).await?;
            println!("{} Deleted conversation {}", "✓".green(), id);
        }
    }

    Ok(())
}

fn print_row(conv: &Conversation) {
    let count = conv
        .message_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>6}  {:<40}  {:>8}  {}",
        conv.id,
        truncate(&conv.title, 40),
        count,
        format_time(conv.updated_at).dimmed()
    );
}

fn print_details(conv: &Conversation) {
    println!("{}", format!("Conversation {}", conv.id).cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Title:    {}", conv.title);
    if let Some(count) = conv.message_count {
        println!("  Messages: {}", count);
    }
    println!("  Created:  {}", format_time(conv.created_at));
    println!("  Updated:  {}", format_time(conv.updated_at));
}

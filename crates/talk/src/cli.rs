//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// AI Talk command-line client
///
/// Log in, manage conversations and chat with streamed AI replies.
#[derive(Parser, Debug)]
#[command(name = "talk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Account management (register, login, logout)
    Auth(AuthCommand),

    /// Conversation management
    #[command(alias = "conv")]
    Conversation(ConversationCommand),

    /// Messages of a conversation (list, send, chat)
    #[command(alias = "msg")]
    Message(MessageCommand),

    /// Show or initialize configuration
    Config(ConfigCommand),

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub action: AuthAction,
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Create an account
    Register {
        /// Username (3-50 characters)
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "TALK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in and store the access token
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "TALK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Show the logged-in user
    #[command(alias = "whoami")]
    Status,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversation Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ConversationCommand {
    #[command(subcommand)]
    pub action: ConversationAction,
}

#[derive(Subcommand, Debug)]
pub enum ConversationAction {
    /// List conversations, most recent first
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Create a conversation
    Create {
        /// Title (server default when omitted)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Show a conversation
    Show {
        /// Conversation ID
        id: i64,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Rename a conversation
    Rename {
        /// Conversation ID
        id: i64,

        /// New title
        title: String,
    },

    /// Delete a conversation and all its messages
    Delete {
        /// Conversation ID
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Message Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct MessageCommand {
    #[command(subcommand)]
    pub action: MessageAction,
}

#[derive(Subcommand, Debug)]
pub enum MessageAction {
    /// List messages in chronological order
    List {
        /// Conversation ID
        conversation_id: i64,

        #[command(flatten)]
        page: PageArgs,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Send a message and wait for the full reply
    Send {
        /// Conversation ID
        conversation_id: i64,

        /// Message content
        content: String,
    },

    /// Send a message and print the reply as it streams in
    Chat {
        /// Conversation ID
        conversation_id: i64,

        /// Message content
        content: String,

        /// Print raw stream records instead of the reply text
        #[arg(long)]
        raw: bool,
    },
}

/// 1-based pagination arguments
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Page size (20 for conversations, 50 for messages)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub size: Option<u32>,
}

impl PageArgs {
    /// The requested page, using `default_size` when no size was given
    pub fn to_page(self, default_size: u32) -> talk_core::Page {
        talk_core::Page::new(self.page, self.size.unwrap_or(default_size))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the effective configuration to the config file
    Init,

    /// Print the config file path
    Path,
}

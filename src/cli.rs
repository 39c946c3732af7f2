use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gowactl", about = "WhatsApp admin client for a GOWA backend")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in with backend credentials and remember the session
    Login {
        /// Username; prompted for when omitted
        username: Option<String>,
    },
    /// Forget the stored login and fall back to configured credentials
    Logout,
    /// Show the session and WhatsApp connection state
    Status,
    /// Link the WhatsApp account via QR code or pairing code
    Connect,
    /// List chats, most recent first
    Chats {
        /// Server-side name filter
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show messages in a chat
    Messages {
        /// Chat JID, e.g. 6289685028129@s.whatsapp.net
        jid: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Send a text message to a chat
    Send { jid: String, text: String },
    /// Keep the session fresh and reconnect automatically when the link drops
    Watch,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Status)
    }
}

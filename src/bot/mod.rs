//! Chat-command front end

pub mod commands;
pub mod telegram;

pub use commands::{addressed_elsewhere, Command, CommandError, CommandHandler};
pub use telegram::{run_bot, TelegramClient};

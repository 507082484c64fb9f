//! Command parsing and replies
//!
//! Transport-agnostic: `CommandHandler::handle` takes the raw message text
//! and returns the reply, or None when the text is not a command.

use crate::error::AppError;
use crate::evaluator::SafetyEvaluator;
use crate::metrics::MetricsState;
use crate::models::{Rule, TokenAddress, Verdict};
use crate::policy::{PolicyField, PolicyStore};
use crate::watchlist::{PositionBook, Watchlist};
use std::fmt::Write as _;
use std::sync::Arc;

const HELP_TEXT: &str = "🛡 Pair Sentinel\n\
\n\
/watch <address> - run security checks and watch the token\n\
/unwatch <address> - stop watching a token\n\
/positions - list open positions\n\
/stop_loss <pct> - set stop loss (e.g. -10)\n\
/take_profit <pct> - set take profit (e.g. 50)\n\
/policy - show current thresholds";

/// A recognised command with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Watch(String),
    Unwatch(String),
    Positions,
    StopLoss(String),
    TakeProfit(String),
    Policy,
}

/// Why a command-looking message could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Known command, wrong number of arguments
    Usage(&'static str),
    /// Not a known command
    Unknown(String),
}

impl Command {
    /// Parse a chat message.
    ///
    /// Returns None for text that does not start with `/`. A `@botname`
    /// suffix is stripped; use `addressed_elsewhere` to drop commands
    /// meant for another bot.
    pub fn parse(text: &str) -> Option<Result<Command, CommandError>> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let single_arg = |usage: &'static str| match args.as_slice() {
            [arg] => Ok(arg.to_string()),
            _ => Err(CommandError::Usage(usage)),
        };

        let command = match name.as_str() {
            "start" | "help" => Ok(Command::Start),
            "watch" => single_arg("/watch <address>").map(Command::Watch),
            "unwatch" => single_arg("/unwatch <address>").map(Command::Unwatch),
            "positions" => Ok(Command::Positions),
            "stop_loss" => single_arg("/stop_loss <percent>").map(Command::StopLoss),
            "take_profit" => single_arg("/take_profit <percent>").map(Command::TakeProfit),
            "policy" => Ok(Command::Policy),
            _ => Err(CommandError::Unknown(name)),
        };
        Some(command)
    }
}

/// Whether a `/cmd@name` message targets a bot other than `bot_username`
pub fn addressed_elsewhere(text: &str, bot_username: &str) -> bool {
    let Some(head) = text.split_whitespace().next() else {
        return false;
    };
    match head.strip_prefix('/').and_then(|cmd| cmd.split_once('@')) {
        Some((_, target)) => !target.eq_ignore_ascii_case(bot_username),
        None => false,
    }
}

/// Executes commands against the shared services
pub struct CommandHandler {
    evaluator: Arc<SafetyEvaluator>,
    watchlist: Arc<Watchlist>,
    positions: Arc<PositionBook>,
    policy: Arc<PolicyStore>,
    metrics: Arc<MetricsState>,
}

impl CommandHandler {
    pub fn new(
        evaluator: Arc<SafetyEvaluator>,
        watchlist: Arc<Watchlist>,
        positions: Arc<PositionBook>,
        policy: Arc<PolicyStore>,
        metrics: Arc<MetricsState>,
    ) -> Self {
        Self {
            evaluator,
            watchlist,
            positions,
            policy,
            metrics,
        }
    }

    /// Reply to a message, or None if it is not a command
    pub async fn handle(&self, text: &str) -> Option<String> {
        let reply = match Command::parse(text)? {
            Ok(command) => self.execute(command).await,
            Err(CommandError::Usage(usage)) => format!("Usage: {}", usage),
            Err(CommandError::Unknown(name)) => {
                tracing::debug!(command = %name, "Unknown command");
                format!("Unknown command /{}. Send /start for the command list.", name)
            }
        };
        Some(reply)
    }

    async fn execute(&self, command: Command) -> String {
        match command {
            Command::Start => HELP_TEXT.to_string(),
            Command::Watch(raw) => self.watch(&raw).await,
            Command::Unwatch(raw) => self.unwatch(&raw),
            Command::Positions => self.list_positions(),
            Command::StopLoss(raw) => match self.policy.set_stop_loss(&raw) {
                Ok(value) => format!("✅ Stop loss set to {}%", value),
                Err(e) => format!("❌ {}", user_message(&e)),
            },
            Command::TakeProfit(raw) => match self.policy.set_take_profit(&raw) {
                Ok(value) => format!("✅ Take profit set to {}%", value),
                Err(e) => format!("❌ {}", user_message(&e)),
            },
            Command::Policy => self.show_policy(),
        }
    }

    async fn watch(&self, raw: &str) -> String {
        let address = match TokenAddress::parse(raw) {
            Ok(address) => address,
            Err(e) => return format!("❌ {}", user_message(&e)),
        };

        if self.watchlist.contains(&address) {
            return format!("ℹ️ {} is already on the watchlist", address);
        }

        let verdict = self.evaluator.evaluate(&address).await;
        if verdict.admitted {
            return if self.watchlist.insert(verdict) {
                self.sync_watchlist_gauge();
                tracing::info!(address = %address, "Address added to watchlist");
                format!(
                    "✅ {} passed all security checks and was added to the watchlist",
                    address
                )
            } else {
                format!("ℹ️ {} is already on the watchlist", address)
            };
        }

        rejection_message(&verdict)
    }

    fn unwatch(&self, raw: &str) -> String {
        let address = match TokenAddress::parse(raw) {
            Ok(address) => address,
            Err(e) => return format!("❌ {}", user_message(&e)),
        };

        if self.watchlist.remove(&address) {
            self.sync_watchlist_gauge();
            tracing::info!(address = %address, "Address removed from watchlist");
            format!("🗑 {} removed from the watchlist", address)
        } else {
            format!("ℹ️ {} is not in the watchlist", address)
        }
    }

    fn sync_watchlist_gauge(&self) {
        self.metrics.watchlist_size.set(self.watchlist.len() as i64);
    }

    fn list_positions(&self) -> String {
        let positions = self.positions.list();
        if positions.is_empty() {
            return "No active positions".to_string();
        }

        let mut reply = String::from("📊 Active positions:");
        for position in positions {
            let _ = write!(
                reply,
                "\n{}: {} @ ${}",
                position.token, position.amount, position.entry_price
            );
        }
        reply
    }

    fn show_policy(&self) -> String {
        let policy = self.policy.snapshot();
        let mut reply = String::from("⚙️ Current policy:");
        for field in PolicyField::ALL {
            let _ = write!(reply, "\n{} = {}", field.key(), policy.get(field));
        }
        reply
    }
}

fn rejection_message(verdict: &Verdict) -> String {
    if verdict.is_blacklisted() {
        return format!("⛔ {} is blacklisted", verdict.address);
    }

    if verdict.has_data_gaps() {
        let sources: Vec<&str> = verdict.unavailable.iter().map(|s| s.as_str()).collect();
        let mut reply = format!(
            "⚠️ Could not verify {}: {} data unavailable. Nothing was added.",
            verdict.address,
            sources.join(" and ")
        );
        let confirmed: Vec<&str> = verdict.confirmed_failures().iter().map(Rule::id).collect();
        if !confirmed.is_empty() {
            let _ = write!(reply, " Also failed: {}", confirmed.join(", "));
        }
        return reply;
    }

    format!(
        "❌ {} failed security checks: {}",
        verdict.address,
        verdict.reasons().join(", ")
    )
}

/// Strip the error-kind prefix for chat replies
fn user_message(error: &AppError) -> String {
    match error {
        AppError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

use std::sync::Arc;
use teloxide::macros::BotCommands;
use teloxide::prelude::*;
use teloxide::utils::command::{BotCommands as _, ParseError};

use crate::bot::{handlers, AppState, HandlerResult};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "📊 Expense tracker. Commands:")]
pub enum BotCommand {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "<amount> <category> - add an expense")]
    Add(String),
    #[command(description = "last 10 expenses")]
    List,
    #[command(description = "<category> [week/month] - total for one category")]
    StatsCategory(String),
    #[command(description = "[week/month] - categories ranked by spending")]
    TopCategories(String),
    #[command(description = "export all expenses as CSV")]
    Export,
    #[command(description = "clear your cached replies")]
    ClearCache,
    #[command(description = "<id> <amount> [category] - change an expense")]
    Edit(String),
    #[command(description = "<id> - delete an expense")]
    Delete(String),
}

impl BotCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Start => "start",
            BotCommand::Help => "help",
            BotCommand::Add(_) => "add",
            BotCommand::List => "list",
            BotCommand::StatsCategory(_) => "stats_category",
            BotCommand::TopCategories(_) => "top_categories",
            BotCommand::Export => "export",
            BotCommand::ClearCache => "clear_cache",
            BotCommand::Edit(_) => "edit",
            BotCommand::Delete(_) => "delete",
        }
    }
}

/// `/cmd@other_bot` in a group chat is meant for another bot.
pub fn is_for_other_bot(text: &str, bot_username: &str) -> bool {
    matches!(
        BotCommand::parse(text, bot_username),
        Err(ParseError::WrongBotName(_))
    )
}

pub fn help_text() -> String {
    BotCommand::descriptions().to_string()
}

/// Runs one command for `user_id` and returns the reply text.
pub async fn reply_for(state: &AppState, user_id: i64, cmd: BotCommand) -> String {
    crate::telemetry::record_command(cmd.name());

    match cmd {
        BotCommand::Start | BotCommand::Help => help_text(),
        BotCommand::Add(args) => handlers::add(state, user_id, &args).await,
        BotCommand::List => handlers::list(state, user_id).await,
        BotCommand::StatsCategory(args) => handlers::stats_category(state, user_id, &args).await,
        BotCommand::TopCategories(args) => handlers::top_categories(state, user_id, &args).await,
        BotCommand::Export => handlers::export(state, user_id).await,
        BotCommand::ClearCache => handlers::clear_cache(state, user_id).await,
        BotCommand::Edit(args) => handlers::edit(state, user_id, &args).await,
        BotCommand::Delete(args) => handlers::delete(state, &args).await,
    }
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    state: Arc<AppState>,
) -> HandlerResult {
    let Some(user_id) = msg.from.as_ref().map(|u| u.id.0 as i64) else {
        tracing::debug!(chat_id = msg.chat.id.0, "Ignoring command without sender");
        return Ok(());
    };

    tracing::info!(user_id, command = cmd.name(), "Handling command");

    let reply = reply_for(&state, user_id, cmd).await;
    crate::bot::send_reply(&bot, msg.chat.id, reply).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_passes_raw_arguments() {
        assert_eq!(
            BotCommand::parse("/add 150.5 dinner out", "money_bot").unwrap(),
            BotCommand::Add("150.5 dinner out".to_string())
        );
        assert_eq!(
            BotCommand::parse("/stats_category food month", "money_bot").unwrap(),
            BotCommand::StatsCategory("food month".to_string())
        );
        assert_eq!(
            BotCommand::parse("/list@money_bot", "money_bot").unwrap(),
            BotCommand::List
        );
    }

    #[test]
    fn test_trailing_arguments_on_plain_commands_are_ignored() {
        assert_eq!(BotCommand::parse("/list extra", "money_bot").unwrap(), BotCommand::List);
        assert_eq!(BotCommand::parse("/export now", "money_bot").unwrap(), BotCommand::Export);
        assert_eq!(BotCommand::parse("/start deeplink", "money_bot").unwrap(), BotCommand::Start);
        assert_eq!(
            BotCommand::parse("/clear_cache x", "money_bot").unwrap(),
            BotCommand::ClearCache
        );
    }

    #[test]
    fn test_commands_for_other_bots_are_recognised() {
        assert!(is_for_other_bot("/list@other_bot", "money_bot"));
        assert!(!is_for_other_bot("/list@money_bot", "money_bot"));
        assert!(!is_for_other_bot("/list", "money_bot"));
        assert!(!is_for_other_bot("/nope", "money_bot"));
        assert!(!is_for_other_bot("hello", "money_bot"));
    }

    #[test]
    fn test_parse_rejects_unknown_and_partial_names() {
        assert!(BotCommand::parse("/ad 5", "money_bot").is_err());
        assert!(BotCommand::parse("/stats 5", "money_bot").is_err());
        assert!(BotCommand::parse("/remove 5", "money_bot").is_err());
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for name in [
            "/add",
            "/list",
            "/stats_category",
            "/top_categories",
            "/export",
            "/clear_cache",
            "/edit",
            "/delete",
        ] {
            assert!(help.contains(name), "help text is missing {}", name);
        }
    }
}

pub mod commands;
pub mod handlers;
pub mod period;
pub mod render;

use std::sync::Arc;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::dptree;
use teloxide::prelude::*;

use crate::cache::CacheStore;
use crate::db::ExpenseStore;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

/// Shared application state, accessible from all handlers.
pub struct AppState {
    pub store: Arc<dyn ExpenseStore>,
    pub cache: Arc<dyn CacheStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ExpenseStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }
}

/// Build the teloxide update handler tree.
pub fn build_handler() -> UpdateHandler<HandlerError> {
    let command_handler = Update::filter_message()
        .filter_command::<commands::BotCommand>()
        .endpoint(commands::handle_command);

    let message_handler = Update::filter_message().endpoint(handlers::handle_message);

    dptree::entry()
        .branch(command_handler)
        .branch(message_handler)
}

/// Sends one text reply. Failures are logged, never retried.
pub(crate) async fn send_reply(bot: &Bot, chat_id: ChatId, text: String) {
    if let Err(e) = bot.send_message(chat_id, text).await {
        crate::telemetry::record_send_failure();
        tracing::error!(chat_id = chat_id.0, error = %e, "Failed to send reply");
    }
}

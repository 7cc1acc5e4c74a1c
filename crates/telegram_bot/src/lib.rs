//! Telegram bot.
//!
//! The bot is a thin client of [`engine::Dispatcher`]: it reads prefixed
//! commands from chats and answers every command with one reply message.

use chrono_tz::Tz;
use engine::Currency;
use teloxide::prelude::*;

mod handlers;
mod parsing;
mod ui;

const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Jakarta;

#[derive(Clone)]
pub struct ConfigParameters {
    dispatcher: engine::Dispatcher,
    rendering: ui::Rendering,
}

pub struct Bot {
    token: String,
    dispatcher: engine::Dispatcher,
    timezone: Tz,
}

impl Bot {
    pub fn new(token: &str, dispatcher: engine::Dispatcher, timezone: Tz) -> Result<Self, String> {
        if token.trim().is_empty() {
            return Err("missing telegram token".to_string());
        }

        Ok(Self {
            token: token.to_string(),
            dispatcher,
            timezone,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let parameters = ConfigParameters {
            rendering: ui::Rendering {
                currency: Currency::Idr,
                timezone: self.timezone,
                prefix: self.dispatcher.prefix().to_string(),
                pagination: self.dispatcher.table().options().pagination,
            },
            dispatcher: self.dispatcher.clone(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::trace!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    dispatcher: Option<engine::Dispatcher>,
    timezone: Option<Tz>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn dispatcher(mut self, dispatcher: engine::Dispatcher) -> BotBuilder {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Time zone used to show transaction timestamps.
    pub fn timezone(mut self, timezone: Tz) -> BotBuilder {
        self.timezone = Some(timezone);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let dispatcher = self
            .dispatcher
            .ok_or_else(|| "missing ledger dispatcher".to_string())?;
        Bot::new(
            &self.token,
            dispatcher,
            self.timezone.unwrap_or(DEFAULT_TIMEZONE),
        )
    }
}

pub mod admin;
pub mod callbacks;
pub mod commands;
pub mod dispatcher;
pub mod flows;
pub mod keyboards;
pub mod messenger;
pub mod state;
pub mod update;

use std::sync::Arc;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    prelude::*,
};

use crate::bot::dispatcher::UpdateDispatcher;
use crate::bot::update::IncomingUpdate;

/// Wires the Telegram update stream to the dispatcher.
pub struct BotHandler {
    pub dispatcher: Arc<UpdateDispatcher>,
}

impl BotHandler {
    pub fn new(dispatcher: Arc<UpdateDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        let on_message = self.dispatcher.clone();
        let on_callback = self.dispatcher.clone();

        dptree::entry()
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let dispatcher = on_message.clone();
                async move {
                    if let Some(update) = IncomingUpdate::from_message(&msg) {
                        dispatcher.dispatch(update).await;
                    }
                    Ok(())
                }
            }))
            .branch(Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
                let dispatcher = on_callback.clone();
                async move {
                    if let Some(update) = IncomingUpdate::from_callback(&q) {
                        dispatcher.dispatch(update).await;
                    }
                    Ok(())
                }
            }))
    }
}

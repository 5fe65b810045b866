//! Maps one inbound update to exactly one handler invocation.
//!
//! Resolution order for messages:
//! 1. admin table, if the sender has the privilege;
//! 2. the sender's conversation step, if not idle;
//! 3. the static command/label tables (exact match, emoji included);
//! 4. catalog labels from the cache;
//! 5. free-text catalog search fallback (which also produces the
//!    "nothing found" reply).
//!
//! Any error escaping a handler is caught here, logged and turned into a
//! generic failure message. Conversation state is deliberately left
//! untouched so the user can retry the same step.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::{error, info, warn};

use crate::bot::callbacks::{CallbackAction, OrderStatus, PaymentMethod};
use crate::bot::commands::{AdminCommand, MenuCommand, SlashCommand};
use crate::bot::flows;
use crate::bot::keyboards;
use crate::bot::messenger::Messenger;
use crate::bot::state::{StateStore, Step};
use crate::bot::update::{IncomingCallback, IncomingMessage, IncomingUpdate};
use crate::database::connection::DatabaseManager;
use crate::database::models::User;
use crate::localization::t;
use crate::services::cache::CatalogCache;
use crate::services::metrics::Metrics;
use crate::services::notify::AdminNotifier;

/// Shared capabilities handed to every flow handler.
#[derive(Clone)]
pub struct Ctx {
    pub messenger: Arc<dyn Messenger>,
    pub db: DatabaseManager,
    pub state: StateStore,
    pub cache: CatalogCache,
    pub notifier: AdminNotifier,
    pub metrics: Metrics,
}

pub struct UpdateDispatcher {
    ctx: Ctx,
    /// One async mutex per user: updates from the same user are applied in
    /// arrival order even though the transport may deliver them on
    /// concurrent tasks. Different users proceed in parallel.
    lanes: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl UpdateDispatcher {
    pub fn new(ctx: Ctx) -> Self {
        Self {
            ctx,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    pub fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    fn lane(&self, user_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut lanes = match self.lanes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        lanes.entry(user_id).or_default().clone()
    }

    /// Entry point: serializes per user, routes, and converts any handler
    /// error into a generic user-facing failure.
    pub async fn dispatch(&self, update: IncomingUpdate) {
        self.ctx.metrics.record_update();

        let lane = self.lane(update.user_id());
        let _guard = lane.lock().await;

        let outcome = match &update {
            IncomingUpdate::Message(msg) => self.route_message(msg).await,
            IncomingUpdate::Callback(cb) => self.route_callback(cb).await,
        };

        if let Err(e) = outcome {
            self.ctx.metrics.record_handler_error();
            error!(
                "Handler failed for user {} in chat {}: {:#}",
                update.user_id(),
                update.chat_id(),
                e
            );
            // State is intentionally not cleared: the user's next message
            // re-enters the same step.
            if let Err(e) = self
                .ctx
                .messenger
                .send_message(update.chat_id(), t("ru", "generic_error"), None)
                .await
            {
                error!("Failed to deliver failure message: {:#}", e);
            }
        }
    }

    async fn route_message(&self, msg: &IncomingMessage) -> Result<()> {
        let ctx = &self.ctx;
        let text = msg.text.as_deref().unwrap_or("");

        info!(
            "Message from user {} in chat {}: '{}'",
            msg.user_id,
            msg.chat_id,
            text.chars().take(50).collect::<String>()
        );

        let user = User::find_by_telegram_id(&ctx.db.pool, msg.user_id).await?;

        // Unregistered users only get /start and their in-flight
        // registration steps.
        let Some(user) = user else {
            let step = ctx.state.get(msg.user_id);
            if !step.is_idle() {
                return flows::registration::handle_step(ctx, msg, step).await;
            }
            if text == "/start" {
                return flows::registration::start(ctx, msg).await;
            }
            ctx.messenger
                .send_message(msg.chat_id, t("ru", "registration_required"), None)
                .await?;
            return Ok(());
        };

        // 1. Elevated-privilege routing.
        if user.is_admin {
            if let Some(command) = AdminCommand::parse(text) {
                return crate::bot::admin::handle_command(ctx, msg, &user, command).await;
            }
        }

        // 2. Conversation state wins over static routing. A top-level slash
        // command overrides and cancels the in-flight flow.
        let step = ctx.state.get(msg.user_id);
        if !step.is_idle() {
            if SlashCommand::parse(text).is_some() {
                ctx.state.clear(msg.user_id);
            } else {
                return self.route_step(msg, &user, step).await;
            }
        }

        // 3. Static tables.
        if let Some(command) = SlashCommand::parse(text) {
            return self.route_slash(msg, &user, command).await;
        }
        if let Some(command) = MenuCommand::parse(text) {
            return self.route_menu(msg, &user, command).await;
        }

        // 4. Dynamic catalog labels from the cache.
        if let Some(category) = ctx.cache.category_by_label(text) {
            return flows::catalog::show_category(ctx, msg.chat_id, &category).await;
        }
        if let Some(subcategory) = ctx.cache.subcategory_by_label(text) {
            return flows::catalog::show_subcategory(ctx, msg.chat_id, &subcategory).await;
        }
        if let Some(product) = ctx.cache.product_by_label(text) {
            return flows::catalog::show_product(ctx, msg.chat_id, &product).await;
        }

        // Unknown slash commands are not search queries.
        if text.starts_with('/') || text.is_empty() {
            ctx.messenger
                .send_message(
                    msg.chat_id,
                    t(&user.language, "unknown_command"),
                    Some(keyboards::main_menu(&user.language)),
                )
                .await?;
            return Ok(());
        }

        // 5. Free-text catalog search fallback.
        flows::search::fallback(ctx, msg, text).await
    }

    async fn route_step(&self, msg: &IncomingMessage, user: &User, step: Step) -> Result<()> {
        let ctx = &self.ctx;
        match step {
            Step::RegistrationName
            | Step::RegistrationPhone
            | Step::RegistrationEmail
            | Step::RegistrationLanguage => flows::registration::handle_step(ctx, msg, step).await,
            Step::SellerName
            | Step::SellerPhone
            | Step::SellerBrand
            | Step::SellerProducts => flows::seller::handle_step(ctx, msg, user, step).await,
            Step::Searching => flows::search::handle_query(ctx, msg, user).await,
            Step::OrderAddress => flows::checkout::handle_address(ctx, msg, user).await,
            Step::ChangingLanguage => flows::language::handle_choice(ctx, msg, user).await,
            Step::RatingProduct { product_id } => {
                flows::rating::handle_comment(ctx, msg, user, product_id).await
            }
            Step::ConfirmClearCart { cart_owner_id } => {
                flows::cart::handle_clear_confirm(ctx, msg, user, cart_owner_id).await
            }
            Step::Idle => Ok(()),
        }
    }

    async fn route_slash(
        &self,
        msg: &IncomingMessage,
        user: &User,
        command: SlashCommand,
    ) -> Result<()> {
        let ctx = &self.ctx;
        match command {
            SlashCommand::Start => {
                ctx.messenger
                    .send_message(
                        msg.chat_id,
                        t(&user.language, "welcome_back"),
                        Some(keyboards::main_menu(&user.language)),
                    )
                    .await?;
                Ok(())
            }
            SlashCommand::Help => {
                ctx.messenger
                    .send_message(
                        msg.chat_id,
                        t(&user.language, "help"),
                        Some(keyboards::main_menu(&user.language)),
                    )
                    .await?;
                Ok(())
            }
            SlashCommand::Order(order_id) => {
                flows::orders::show_detail(ctx, msg.chat_id, user, order_id).await
            }
        }
    }

    async fn route_menu(
        &self,
        msg: &IncomingMessage,
        user: &User,
        command: MenuCommand,
    ) -> Result<()> {
        let ctx = &self.ctx;
        match command {
            MenuCommand::Catalog | MenuCommand::BackToCategories => {
                flows::catalog::show_catalog(ctx, msg.chat_id).await
            }
            MenuCommand::Cart => flows::cart::show(ctx, msg.chat_id, user).await,
            MenuCommand::MyOrders => flows::orders::show_list(ctx, msg.chat_id, user).await,
            MenuCommand::Profile => flows::profile::show(ctx, msg.chat_id, user).await,
            MenuCommand::Search => flows::search::start(ctx, msg, user).await,
            MenuCommand::BecomeSeller => flows::seller::start(ctx, msg, user).await,
            MenuCommand::Help => {
                ctx.messenger
                    .send_message(
                        msg.chat_id,
                        t(&user.language, "help"),
                        Some(keyboards::main_menu(&user.language)),
                    )
                    .await?;
                Ok(())
            }
            MenuCommand::Contact => {
                let text = if user.language == "uz" {
                    "📞 <b>Biz bilan bog'lanish</b>\n\n• Chat: @shop_support\n• Telefon: +998 71 200 00 00"
                } else {
                    "📞 <b>Связаться с нами</b>\n\n• Чат: @shop_support\n• Телефон: +998 71 200 00 00"
                };
                ctx.messenger
                    .send_message(msg.chat_id, text, Some(keyboards::main_menu(&user.language)))
                    .await?;
                Ok(())
            }
            MenuCommand::MainMenu => {
                ctx.messenger
                    .send_message(
                        msg.chat_id,
                        t(&user.language, "main_menu"),
                        Some(keyboards::main_menu(&user.language)),
                    )
                    .await?;
                Ok(())
            }
            MenuCommand::ChangeLanguage => flows::language::start(ctx, msg).await,
            MenuCommand::Checkout => flows::checkout::start(ctx, msg, user).await,
            MenuCommand::ClearCart => flows::cart::start_clear(ctx, msg, user).await,
        }
    }

    async fn route_callback(&self, cb: &IncomingCallback) -> Result<()> {
        let ctx = &self.ctx;

        info!(
            "Callback from user {} in chat {}: '{}'",
            cb.user_id, cb.chat_id, cb.data
        );

        let action = match CallbackAction::parse(&cb.data) {
            Ok(action) => action,
            Err(e) => {
                // Parse failure leaves conversation state unchanged.
                warn!("{}", e);
                ctx.messenger
                    .answer_callback(&cb.callback_id, "❌ Неизвестное действие")
                    .await?;
                return Ok(());
            }
        };

        let Some(user) = User::find_by_telegram_id(&ctx.db.pool, cb.user_id).await? else {
            ctx.messenger
                .answer_callback(&cb.callback_id, t("ru", "registration_required"))
                .await?;
            return Ok(());
        };

        match action {
            CallbackAction::QtyStep {
                product_id,
                quantity,
            } => flows::catalog::handle_qty_step(ctx, cb, product_id, quantity).await,
            CallbackAction::AddToCart {
                product_id,
                quantity,
            } => flows::cart::handle_add(ctx, cb, &user, product_id, quantity).await,
            CallbackAction::ShowReviews { product_id } => {
                flows::catalog::show_reviews(ctx, cb, &user, product_id).await
            }
            CallbackAction::RateProduct { product_id } => {
                flows::rating::open_keyboard(ctx, cb, product_id).await
            }
            CallbackAction::SubmitRating { product_id, rating } => {
                flows::rating::handle_submit(ctx, cb, &user, product_id, rating).await
            }
            CallbackAction::CartIncrease { item_id } => {
                flows::cart::handle_item_action(ctx, cb, &user, item_id, 1).await
            }
            CallbackAction::CartDecrease { item_id } => {
                flows::cart::handle_item_action(ctx, cb, &user, item_id, -1).await
            }
            CallbackAction::CartRemove { item_id } => {
                flows::cart::handle_item_action(ctx, cb, &user, item_id, 0).await
            }
            CallbackAction::Pay { method } => {
                self.route_payment(cb, &user, method).await
            }
            CallbackAction::GoToCart => {
                ctx.messenger.answer_callback(&cb.callback_id, "🛒").await?;
                flows::cart::show(ctx, cb.chat_id, &user).await
            }
            CallbackAction::BackToCategories => {
                ctx.messenger.answer_callback(&cb.callback_id, "🛍").await?;
                flows::catalog::show_catalog(ctx, cb.chat_id).await
            }
            CallbackAction::SetOrderStatus { order_id, status } => {
                self.route_admin_status(cb, &user, order_id, status).await
            }
        }
    }

    async fn route_payment(
        &self,
        cb: &IncomingCallback,
        user: &User,
        method: PaymentMethod,
    ) -> Result<()> {
        flows::checkout::handle_payment(&self.ctx, cb, user, method).await
    }

    async fn route_admin_status(
        &self,
        cb: &IncomingCallback,
        user: &User,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<()> {
        if !user.is_admin {
            self.ctx
                .messenger
                .answer_callback(&cb.callback_id, "⛔ Недостаточно прав")
                .await?;
            return Ok(());
        }
        crate::bot::admin::handle_set_status(&self.ctx, cb, order_id, status).await
    }
}

//! Static command and button-label routing tables.
//!
//! Button labels are matched exactly, emoji prefix included, in both
//! locales; no fuzzy matching. The tables keep locale strings out of the
//! dispatcher's control flow.

/// Slash commands available to every registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Start,
    Help,
    /// `/order_<id>`: order detail view.
    Order(i64),
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "/start" => Some(SlashCommand::Start),
            "/help" => Some(SlashCommand::Help),
            _ => {
                let id = text.strip_prefix("/order_")?;
                id.parse().ok().map(SlashCommand::Order)
            }
        }
    }
}

/// Reply-keyboard menu actions, one per button label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Catalog,
    Cart,
    MyOrders,
    Profile,
    Search,
    BecomeSeller,
    Help,
    Contact,
    MainMenu,
    ChangeLanguage,
    Checkout,
    ClearCart,
    BackToCategories,
}

/// `(label, command)` pairs across both locales. Extend here, not in the
/// dispatcher.
const MENU_LABELS: &[(&str, MenuCommand)] = &[
    ("🛍 Каталог", MenuCommand::Catalog),
    ("🛍 Katalog", MenuCommand::Catalog),
    ("🛍 Перейти в каталог", MenuCommand::Catalog),
    ("➕ Добавить товары", MenuCommand::Catalog),
    ("🛒 Корзина", MenuCommand::Cart),
    ("🛒 Savat", MenuCommand::Cart),
    ("📋 Мои заказы", MenuCommand::MyOrders),
    ("📋 Mening buyurtmalarim", MenuCommand::MyOrders),
    ("👤 Профиль", MenuCommand::Profile),
    ("👤 Profil", MenuCommand::Profile),
    ("🔍 Поиск", MenuCommand::Search),
    ("🔍 Qidiruv", MenuCommand::Search),
    ("🧑‍💼 Стать продавцом", MenuCommand::BecomeSeller),
    ("🧑‍💼 Sotuvchi bo'lish", MenuCommand::BecomeSeller),
    ("ℹ️ Помощь", MenuCommand::Help),
    ("ℹ️ Yordam", MenuCommand::Help),
    ("📞 Связаться с нами", MenuCommand::Contact),
    ("📞 Biz bilan bog'lanish", MenuCommand::Contact),
    ("🏠 Главная", MenuCommand::MainMenu),
    ("🔙 Главная", MenuCommand::MainMenu),
    ("🏠 Bosh sahifa", MenuCommand::MainMenu),
    ("🌍 Сменить язык", MenuCommand::ChangeLanguage),
    ("🌍 Tilni o'zgartirish", MenuCommand::ChangeLanguage),
    ("📦 Оформить заказ", MenuCommand::Checkout),
    ("📦 Buyurtma berish", MenuCommand::Checkout),
    ("🗑 Очистить корзину", MenuCommand::ClearCart),
    ("🗑 Savatni tozalash", MenuCommand::ClearCart),
    ("🔙 К категориям", MenuCommand::BackToCategories),
];

impl MenuCommand {
    pub fn parse(text: &str) -> Option<Self> {
        MENU_LABELS
            .iter()
            .find(|(label, _)| *label == text)
            .map(|(_, cmd)| *cmd)
    }
}

/// Commands reserved for elevated-privilege users. The dispatcher checks
/// these before anything else, but only routes them when `users.is_admin`
/// is set for the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Menu,
    Orders,
    Stats,
    UserMode,
}

const ADMIN_LABELS: &[(&str, AdminCommand)] = &[
    ("/admin", AdminCommand::Menu),
    ("📦 Заказы", AdminCommand::Orders),
    ("📊 Статистика", AdminCommand::Stats),
    ("🔙 Пользовательский режим", AdminCommand::UserMode),
];

impl AdminCommand {
    pub fn parse(text: &str) -> Option<Self> {
        ADMIN_LABELS
            .iter()
            .find(|(label, _)| *label == text)
            .map(|(_, cmd)| *cmd)
    }
}

/// Auxiliary in-flow button labels shared by several step handlers.
pub mod labels {
    pub const CANCEL: &str = "❌ Отмена";
    pub const BACK: &str = "🔙 Назад";
    pub const SKIP: &str = "⏭ Пропустить";
    pub const ENTER_ADDRESS: &str = "✍️ Ввести адрес";
    pub const CONFIRM_YES: &str = "✅ Да";
    pub const CONFIRM_NO: &str = "❌ Нет";
    pub const LANG_RU: &str = "🇷🇺 Русский";
    pub const LANG_UZ: &str = "🇺🇿 O'zbekcha";

    /// Inputs that cancel the current flow from any step.
    pub fn is_cancel(text: &str) -> bool {
        matches!(text, CANCEL | BACK | "🏠 Главная" | "🏠 Bosh sahifa")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_commands() {
        assert_eq!(SlashCommand::parse("/start"), Some(SlashCommand::Start));
        assert_eq!(SlashCommand::parse("/help"), Some(SlashCommand::Help));
        assert_eq!(
            SlashCommand::parse("/order_42"),
            Some(SlashCommand::Order(42))
        );
        assert_eq!(SlashCommand::parse("/order_abc"), None);
        assert_eq!(SlashCommand::parse("/unknown"), None);
    }

    #[test]
    fn test_menu_labels_exact_match() {
        assert_eq!(MenuCommand::parse("🛍 Каталог"), Some(MenuCommand::Catalog));
        assert_eq!(MenuCommand::parse("🛍 Katalog"), Some(MenuCommand::Catalog));
        // exact match only, no trimming
        assert_eq!(MenuCommand::parse("Каталог"), None);
        assert_eq!(MenuCommand::parse("🛍 Каталог "), None);
    }

    #[test]
    fn test_admin_labels() {
        assert_eq!(AdminCommand::parse("/admin"), Some(AdminCommand::Menu));
        assert_eq!(AdminCommand::parse("📦 Заказы"), Some(AdminCommand::Orders));
        assert_eq!(AdminCommand::parse("📦 Мои заказы"), None);
    }

    #[test]
    fn test_cancel_labels() {
        assert!(labels::is_cancel("❌ Отмена"));
        assert!(labels::is_cancel("🔙 Назад"));
        assert!(labels::is_cancel("🏠 Главная"));
        assert!(!labels::is_cancel("отмена"));
    }
}

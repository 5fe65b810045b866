//! Keyboard builders. Reply keyboards drive the menu navigation, inline
//! keyboards drive product/cart/payment callbacks.

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    ReplyMarkup,
};

use crate::bot::commands::labels;
use crate::database::models::{CartLine, Category, Product, Subcategory};

fn reply(rows: Vec<Vec<KeyboardButton>>) -> ReplyMarkup {
    ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard(true))
}

pub fn main_menu(language: &str) -> ReplyMarkup {
    let rows = if language == "uz" {
        vec![
            vec![
                KeyboardButton::new("🛍 Katalog"),
                KeyboardButton::new("🛒 Savat"),
            ],
            vec![
                KeyboardButton::new("📋 Mening buyurtmalarim"),
                KeyboardButton::new("👤 Profil"),
            ],
            vec![
                KeyboardButton::new("🔍 Qidiruv"),
                KeyboardButton::new("🧑‍💼 Sotuvchi bo'lish"),
            ],
            vec![
                KeyboardButton::new("ℹ️ Yordam"),
                KeyboardButton::new("📞 Biz bilan bog'lanish"),
            ],
            vec![KeyboardButton::new("🌍 Сменить язык")],
        ]
    } else {
        vec![
            vec![
                KeyboardButton::new("🛍 Каталог"),
                KeyboardButton::new("🛒 Корзина"),
            ],
            vec![
                KeyboardButton::new("📋 Мои заказы"),
                KeyboardButton::new("👤 Профиль"),
            ],
            vec![
                KeyboardButton::new("🔍 Поиск"),
                KeyboardButton::new("🧑‍💼 Стать продавцом"),
            ],
            vec![
                KeyboardButton::new("ℹ️ Помощь"),
                KeyboardButton::new("📞 Связаться с нами"),
            ],
            vec![KeyboardButton::new("🌍 Сменить язык")],
        ]
    };
    reply(rows)
}

pub fn admin_menu() -> ReplyMarkup {
    reply(vec![
        vec![
            KeyboardButton::new("📦 Заказы"),
            KeyboardButton::new("📊 Статистика"),
        ],
        vec![KeyboardButton::new("🔙 Пользовательский режим")],
    ])
}

pub fn back_keyboard() -> ReplyMarkup {
    reply(vec![vec![
        KeyboardButton::new(labels::BACK),
        KeyboardButton::new("🏠 Главная"),
    ]])
}

pub fn cancel_keyboard() -> ReplyMarkup {
    reply(vec![vec![KeyboardButton::new(labels::CANCEL)]])
}

/// Name prompt with the sender's profile name as a one-tap suggestion.
pub fn registration_name(suggested: &str) -> ReplyMarkup {
    let mut rows = Vec::new();
    if !suggested.trim().is_empty() {
        rows.push(vec![KeyboardButton::new(suggested)]);
    }
    rows.push(vec![KeyboardButton::new(labels::CANCEL)]);
    reply(rows)
}

pub fn registration_phone() -> ReplyMarkup {
    reply(vec![
        vec![KeyboardButton::new("📱 Поделиться номером").request(ButtonRequest::Contact)],
        vec![
            KeyboardButton::new(labels::SKIP),
            KeyboardButton::new(labels::CANCEL),
        ],
    ])
}

/// Skip-or-cancel keyboard for optional form fields.
pub fn skip_cancel_keyboard() -> ReplyMarkup {
    reply(vec![vec![
        KeyboardButton::new(labels::SKIP),
        KeyboardButton::new(labels::CANCEL),
    ]])
}

pub fn language_keyboard() -> ReplyMarkup {
    reply(vec![
        vec![
            KeyboardButton::new(labels::LANG_RU),
            KeyboardButton::new(labels::LANG_UZ),
        ],
        vec![KeyboardButton::new(labels::CANCEL)],
    ])
}

pub fn confirmation_keyboard() -> ReplyMarkup {
    reply(vec![vec![
        KeyboardButton::new(labels::CONFIRM_YES),
        KeyboardButton::new(labels::CONFIRM_NO),
    ]])
}

/// Address prompt: share location, type it out, or back out.
pub fn address_keyboard() -> ReplyMarkup {
    reply(vec![
        vec![KeyboardButton::new("📍 Отправить геолокацию").request(ButtonRequest::Location)],
        vec![KeyboardButton::new(labels::ENTER_ADDRESS)],
        vec![
            KeyboardButton::new(labels::BACK),
            KeyboardButton::new("🏠 Главная"),
        ],
    ])
}

pub fn categories_keyboard(categories: &[Category]) -> ReplyMarkup {
    let mut rows: Vec<Vec<KeyboardButton>> = Vec::new();
    for pair in categories.chunks(2) {
        rows.push(pair.iter().map(|c| KeyboardButton::new(c.label())).collect());
    }
    rows.push(vec![KeyboardButton::new("🏠 Главная")]);
    reply(rows)
}

pub fn subcategories_keyboard(subcategories: &[Subcategory]) -> ReplyMarkup {
    let mut rows: Vec<Vec<KeyboardButton>> = Vec::new();
    for pair in subcategories.chunks(2) {
        rows.push(pair.iter().map(|s| KeyboardButton::new(s.label())).collect());
    }
    rows.push(vec![
        KeyboardButton::new("🔙 К категориям"),
        KeyboardButton::new("🏠 Главная"),
    ]);
    reply(rows)
}

pub fn products_keyboard(products: &[Product]) -> ReplyMarkup {
    let mut rows: Vec<Vec<KeyboardButton>> = products
        .iter()
        .map(|p| vec![KeyboardButton::new(p.label())])
        .collect();
    rows.push(vec![
        KeyboardButton::new("🔙 К категориям"),
        KeyboardButton::new("🏠 Главная"),
    ]);
    reply(rows)
}

pub fn cart_keyboard(language: &str) -> ReplyMarkup {
    let rows = if language == "uz" {
        vec![
            vec![KeyboardButton::new("📦 Buyurtma berish")],
            vec![
                KeyboardButton::new("🗑 Savatni tozalash"),
                KeyboardButton::new("🛍 Katalog"),
            ],
            vec![KeyboardButton::new("🏠 Bosh sahifa")],
        ]
    } else {
        vec![
            vec![KeyboardButton::new("📦 Оформить заказ")],
            vec![
                KeyboardButton::new("🗑 Очистить корзину"),
                KeyboardButton::new("➕ Добавить товары"),
            ],
            vec![KeyboardButton::new("🏠 Главная")],
        ]
    };
    reply(rows)
}

/// Product card: quantity stepper, add-to-cart and review actions.
pub fn product_inline(product_id: i64, quantity: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("➖", format!("qty:{}:{}", product_id, quantity - 1)),
            InlineKeyboardButton::callback(format!("{quantity} шт."), format!("qty:{product_id}:{quantity}")),
            InlineKeyboardButton::callback("➕", format!("qty:{}:{}", product_id, quantity + 1)),
        ],
        vec![InlineKeyboardButton::callback(
            "🛒 В корзину",
            format!("cart:add:{product_id}:{quantity}"),
        )],
        vec![
            InlineKeyboardButton::callback("💬 Отзывы", format!("reviews:{product_id}")),
            InlineKeyboardButton::callback("⭐ Оценить", format!("rate:{product_id}")),
        ],
        vec![InlineKeyboardButton::callback("🛒 Перейти в корзину", "nav:cart".to_string())],
    ])
}

/// One row per cart line: quantity stepper plus removal.
pub fn cart_item_inline(item_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("➖", format!("cartitem:dec:{item_id}")),
        InlineKeyboardButton::callback("➕", format!("cartitem:inc:{item_id}")),
        InlineKeyboardButton::callback("🗑", format!("cartitem:del:{item_id}")),
    ]])
}

pub fn rating_keyboard(product_id: i64) -> InlineKeyboardMarkup {
    let row: Vec<InlineKeyboardButton> = (1..=5)
        .map(|n: usize| {
            InlineKeyboardButton::callback("⭐".repeat(n), format!("rate:{product_id}:{n}"))
        })
        .collect();
    InlineKeyboardMarkup::new(vec![row])
}

pub fn payment_methods(language: &str) -> InlineKeyboardMarkup {
    let (online, cash) = if language == "uz" {
        ("💳 Onlayn to'lov", "💵 Qabul qilishda naqd")
    } else {
        ("💳 Онлайн оплата", "💵 Наличными при получении")
    };
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(online, "pay:online".to_string())],
        vec![InlineKeyboardButton::callback(cash, "pay:cash".to_string())],
    ])
}

/// Admin: order status transitions.
pub fn order_status_inline(order_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("✅ Подтвердить", format!("astatus:{order_id}:confirmed")),
            InlineKeyboardButton::callback("🚚 В пути", format!("astatus:{order_id}:shipped")),
        ],
        vec![
            InlineKeyboardButton::callback("📦 Доставлен", format!("astatus:{order_id}:delivered")),
            InlineKeyboardButton::callback("❌ Отменить", format!("astatus:{order_id}:cancelled")),
        ],
    ])
}

/// Mixed cart keyboard for line rendering in a single message.
pub fn cart_lines_inline(lines: &[CartLine]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = lines
        .iter()
        .map(|line| {
            vec![
                InlineKeyboardButton::callback(
                    format!("➖ {}", line.name),
                    format!("cartitem:dec:{}", line.id),
                ),
                InlineKeyboardButton::callback("➕", format!("cartitem:inc:{}", line.id)),
                InlineKeyboardButton::callback("🗑", format!("cartitem:del:{}", line.id)),
            ]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

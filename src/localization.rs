//! User-facing strings in Russian and Uzbek.
//!
//! Keys are stable identifiers; the matching is exact. Unknown keys fall
//! back to the key itself so a missing translation is visible, not fatal.

/// Returns the translation of `key` for `language` (`"ru"` or `"uz"`,
/// anything else falls back to Russian).
pub fn t(language: &str, key: &str) -> &'static str {
    match language {
        "uz" => t_uz(key),
        _ => t_ru(key),
    }
}

fn t_ru(key: &str) -> &'static str {
    match key {
        "welcome_back" => "👋 С возвращением! Выберите раздел:",
        "welcome_new" => {
            "🛍 Добро пожаловать в наш магазин!\n\nДля начала работы пройдите короткую регистрацию."
        }
        "registration_complete" => "✅ Регистрация завершена! Добро пожаловать в магазин 🛍",
        "registration_cancelled" => "❌ Регистрация отменена",
        "ask_name" => "👤 Как вас зовут?",
        "ask_phone" => "📱 Поделитесь номером телефона или пропустите этот шаг:",
        "ask_email" => "📧 Введите email или пропустите:",
        "ask_language" => "🌍 Выберите язык / Tilni tanlang:",
        "name_too_short" => "❌ Имя слишком короткое. Попробуйте еще раз:",
        "bad_phone" => "❌ Неверный формат телефона. Попробуйте еще раз:",
        "bad_email" => "❌ Неверный формат email. Попробуйте еще раз:",
        "pick_language" => "❌ Выберите язык из предложенных вариантов:",
        "language_changed" => "✅ Язык изменен на русский",
        "main_menu" => "🏠 Главное меню",
        "help" => {
            "ℹ️ <b>Помощь</b>\n\n🛍 Каталог — просмотр товаров\n🛒 Корзина — ваши покупки\n📋 Мои заказы — история и статусы\n🔍 Поиск — поиск по названию\n\nКоманды:\n/start — главное меню\n/help — эта справка"
        }
        "empty_cart" => "🛒 Ваша корзина пуста\n\nПерейдите в каталог, чтобы добавить товары",
        "cart_cleared" => "🗑 Корзина очищена",
        "cancelled" => "Отменено.",
        "generic_error" => "❌ Произошла ошибка. Попробуйте еще раз.",
        "unknown_command" => {
            "🤔 Я не понял команду.\n\nВоспользуйтесь кнопками меню или /help"
        }
        "registration_required" => {
            "👋 Добро пожаловать!\n\nДля использования бота необходимо пройти регистрацию.\n\nНажмите /start для начала."
        }
        "search_prompt" => "🔍 <b>Поиск товаров</b>\n\nВведите название товара для поиска:",
        "ask_address" => "📍 Введите адрес доставки:",
        "address_too_short" => "❌ Адрес слишком короткий. Введите полный адрес:",
        "pick_payment" => "💳 Выберите способ оплаты:",
        "pick_payment_options" => "❌ Выберите способ оплаты из предложенных",
        "seller_thanks" => {
            "✅ Спасибо! Ваша заявка отправлена. Мы свяжемся с вами в ближайшее время."
        }
        "rate_comment_prompt" => "💬 Напишите короткий отзыв о товаре или пропустите:",
        "rate_thanks" => "✅ Спасибо за оценку!",
        "review_saved" => "✅ Отзыв сохранен. Спасибо!",
        "confirm_clear_cart" => "🗑 Вы уверены, что хотите очистить корзину?",
        "confirm_options" => "❌ Выберите «Да» или «Нет»",
        other => unknown_key(other),
    }
}

fn t_uz(key: &str) -> &'static str {
    match key {
        "welcome_back" => "👋 Qaytganingiz bilan! Bo'limni tanlang:",
        "welcome_new" => {
            "🛍 Do'konimizga xush kelibsiz!\n\nBoshlash uchun qisqa ro'yxatdan o'ting."
        }
        "registration_complete" => "✅ Ro'yxatdan o'tish yakunlandi! Xush kelibsiz 🛍",
        "registration_cancelled" => "❌ Ro'yxatdan o'tish bekor qilindi",
        "ask_name" => "👤 Ismingiz nima?",
        "ask_phone" => "📱 Telefon raqamingizni yuboring yoki bu qadamni o'tkazib yuboring:",
        "ask_email" => "📧 Email kiriting yoki o'tkazib yuboring:",
        "ask_language" => "🌍 Выберите язык / Tilni tanlang:",
        "name_too_short" => "❌ Ism juda qisqa. Qayta urinib ko'ring:",
        "bad_phone" => "❌ Telefon formati noto'g'ri. Qayta urinib ko'ring:",
        "bad_email" => "❌ Email formati noto'g'ri. Qayta urinib ko'ring:",
        "pick_language" => "❌ Taklif qilingan tillardan birini tanlang:",
        "language_changed" => "✅ Til o'zbekchaga o'zgartirildi",
        "main_menu" => "🏠 Asosiy menyu",
        "help" => {
            "ℹ️ <b>Yordam</b>\n\n🛍 Katalog — mahsulotlar\n🛒 Savat — xaridlaringiz\n📋 Mening buyurtmalarim — tarix va holatlar\n🔍 Qidiruv — nomi bo'yicha qidirish\n\nBuyruqlar:\n/start — asosiy menyu\n/help — ushbu yordam"
        }
        "empty_cart" => "🛒 Savatingiz bo'sh\n\nMahsulot qo'shish uchun katalogga o'ting",
        "cart_cleared" => "🗑 Savat tozalandi",
        "cancelled" => "Bekor qilindi.",
        "generic_error" => "❌ Xatolik yuz berdi. Qayta urinib ko'ring.",
        "unknown_command" => "🤔 Buyruqni tushunmadim.\n\nMenyu tugmalaridan foydalaning yoki /help",
        "registration_required" => {
            "👋 Xush kelibsiz!\n\nBotdan foydalanish uchun ro'yxatdan o'tish kerak.\n\nBoshlash uchun /start bosing."
        }
        "search_prompt" => "🔍 <b>Mahsulot qidirish</b>\n\nQidirish uchun mahsulot nomini kiriting:",
        "ask_address" => "📍 Yetkazib berish manzilini kiriting:",
        "address_too_short" => "❌ Manzil juda qisqa. To'liq manzilni kiriting:",
        "pick_payment" => "💳 To'lov usulini tanlang:",
        "pick_payment_options" => "❌ Taklif qilingan to'lov usullaridan birini tanlang",
        "seller_thanks" => {
            "✅ Rahmat! Arizangiz yuborildi. Tez orada siz bilan bog'lanamiz."
        }
        "rate_comment_prompt" => "💬 Mahsulot haqida qisqa fikr yozing yoki o'tkazib yuboring:",
        "rate_thanks" => "✅ Bahoyingiz uchun rahmat!",
        "review_saved" => "✅ Fikringiz saqlandi. Rahmat!",
        "confirm_clear_cart" => "🗑 Savatni tozalashga ishonchingiz komilmi?",
        "confirm_options" => "❌ «Ha» yoki «Yo'q»ni tanlang",
        other => unknown_key(other),
    }
}

fn unknown_key(key: &str) -> &'static str {
    tracing::warn!("Missing translation key: {}", key);
    "…"
}

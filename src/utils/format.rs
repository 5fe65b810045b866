use chrono::NaiveDateTime;

/// Formats an amount for display, e.g. `1234.5` -> `$1234.50`.
pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Formats a `datetime('now')` column value as `dd.mm.YYYY HH:MM`.
/// Values that don't parse are shown as stored.
pub fn format_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Escapes text interpolated into HTML-mode messages.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_length.saturating_sub(3)).collect();
    format!("{cut}...")
}

/// Renders a star row for a 1..=5 rating.
pub fn stars_display(rating: i64) -> String {
    "⭐".repeat(rating.clamp(0, 5) as usize)
}

pub fn order_status_emoji(status: &str) -> &'static str {
    match status {
        "pending" => "⏳",
        "confirmed" => "✅",
        "shipped" => "🚚",
        "delivered" => "📦",
        "cancelled" => "❌",
        _ => "📋",
    }
}

pub fn order_status_text(status: &str) -> &'static str {
    match status {
        "pending" => "Ожидает подтверждения",
        "confirmed" => "Подтвержден",
        "shipped" => "В пути",
        "delivered" => "Доставлен",
        "cancelled" => "Отменен",
        _ => "Неизвестно",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1234.5), "$1234.50");
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(9.999), "$10.00");
    }

    #[test]
    fn test_format_date_valid() {
        assert_eq!(format_date("2024-03-05 09:30:00"), "05.03.2024 09:30");
    }

    #[test]
    fn test_format_date_passthrough() {
        assert_eq!(format_date("garbage"), "garbage");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 100), "short");
        assert_eq!(truncate_text("abcdefgh", 6), "abc...");
    }

    #[test]
    fn test_stars_display() {
        assert_eq!(stars_display(3), "⭐⭐⭐");
        assert_eq!(stars_display(0), "");
        assert_eq!(stars_display(9), "⭐⭐⭐⭐⭐");
    }

    #[test]
    fn test_order_status_text() {
        assert_eq!(order_status_emoji("pending"), "⏳");
        assert_eq!(order_status_text("shipped"), "В пути");
        assert_eq!(order_status_emoji("unknown"), "📋");
    }
}

use chrono::{DateTime, Utc};

/// Group thousands with spaces: `1234567` -> `"1 234 567"`.
pub fn format_amount(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }

    if negative {
        format!("-{out}")
    } else {
        out
    }
}

/// `dd.mm.yyyy hh:mm`, UTC.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d.%m.%Y %H:%M").to_string()
}

/// Escape the characters Telegram's HTML parse mode treats specially.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Pad or truncate a string to exactly `width` display columns.
/// Longer text is cut on a char boundary and ends in "..".
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    if sw <= width {
        return format!("{}{}", s, " ".repeat(width - sw));
    }
    if width < 3 {
        return s.chars().take_while(|ch| ch.width().unwrap_or(0) <= width).take(1).collect();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    // Wide chars can leave one column unfilled.
    format!("{out}..{}", " ".repeat(budget - used))
}

/// `1850000` -> `Rp 1,850,000`
pub(crate) fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("Rp {sign}{grouped}")
}

/// Render an optional value, blank when absent.
pub(crate) fn or_blank<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

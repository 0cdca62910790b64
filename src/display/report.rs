//! Formatting helpers shared by the report views

use crate::models::Money;

/// Money with the configured currency symbol, e.g. `R$ 1500.00`
pub fn format_money(amount: Money, symbol: &str) -> String {
    amount.format_with_symbol(symbol)
}

/// Ratio for display; a zero budget has no ratio and shows as `n/a`
pub fn format_percent(pct: Option<f64>) -> String {
    match pct {
        None => "n/a".to_string(),
        Some(p) if p.abs() < 10.0 => format!("{:.1}%", p),
        Some(p) => format!("{:.0}%", p),
    }
}

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

pub fn double_separator(width: usize) -> String {
    "═".repeat(width)
}

/// Truncate to `max_len` characters with an ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Display width of the widest value, at least `min`
pub fn column_width<'a>(values: impl IntoIterator<Item = &'a str>, min: usize) -> usize {
    values
        .into_iter()
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(min)
        .max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(None), "n/a");
        assert_eq!(format_percent(Some(5.24)), "5.2%");
        assert_eq!(format_percent(Some(40.0)), "40%");
        assert_eq!(format_percent(Some(-12.4)), "-12%");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(50.0, 100.0, 10), "█████░░░░░");
        assert_eq!(format_bar(0.0, 100.0, 4), "    ");
        assert_eq!(format_bar(200.0, 100.0, 4), "████");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Construções", 20), "Construções");
        assert_eq!(truncate("Construções Ltda", 10), "Constru...");
        assert_eq!(truncate("abcdef", 2), "..");
    }

    #[test]
    fn test_column_width() {
        assert_eq!(column_width(["ab", "çãoxx"], 3), 5);
        assert_eq!(column_width(Vec::<&str>::new(), 4), 4);
    }
}

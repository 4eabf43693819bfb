//! Alert message formatting.
//!
//! One message per batch:
//!
//! ```text
//! Top Picks:
//! BUY TCS.NS @ 3512.40 | SL 3442.15 | TP 3688.02 | Volume spike, 20&gt;50 EMA, RSI 61
//! ```
//!
//! The payload is sent with HTML parse mode, so dynamic text is escaped.

use crate::domain::Classification;

/// Escape the three characters Telegram's HTML mode treats as markup.
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

/// Merge eligible classifications into a single message, one line each.
pub fn format_alert_message(picks: &[&Classification]) -> String {
    let mut lines = Vec::with_capacity(picks.len() + 1);
    lines.push("Top Picks:".to_string());
    for c in picks {
        let mut line = format!("{} {} @ {:.2}", c.direction, escape_html(&c.symbol), c.price);
        if let Some(levels) = c.levels {
            line.push_str(&format!(
                " | SL {:.2} | TP {:.2}",
                levels.stop_loss, levels.take_profit
            ));
        }
        if !c.reasons.is_empty() {
            line.push_str(" | ");
            line.push_str(&escape_html(&c.reason_summary()));
        }
        lines.push(line);
    }
    lines.join("\n")
}

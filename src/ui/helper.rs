use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

use crate::precision::{normalize_amount, NormalizedAmount, PrecisionMap};
use crate::rpc::decode::DecodedTx;
use crate::rpc::Coin;

// ============================================================================
// Helper Functions
// ============================================================================

pub fn truncate_hash(hash: &str) -> String {
    if hash.len() > 20 {
        format!("{}...{}", &hash[..10], &hash[hash.len() - 6..])
    } else {
        hash.to_string()
    }
}

/// Clip free text to `max` chars on a char boundary
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let clipped: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{clipped}…")
    } else {
        text.to_string()
    }
}

pub fn format_tx_list_item<'a>(index: usize, tx: &DecodedTx, selected: bool) -> ListItem<'a> {
    let action = truncate_text(&tx.summary(), 22);
    let fee = if tx.fee.is_empty() {
        "—".to_string()
    } else {
        format_coins(&tx.fee)
    };
    let memo = truncate_text(&tx.memo, 24);

    let line = Line::from(vec![
        Span::styled(
            format!("{index:>3} "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(truncate_hash(&tx.hash), Style::default().fg(Color::Cyan)),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{action:<22}"),
            if tx.dropped() > 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            },
        ),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{fee:>16}"), Style::default().fg(Color::Magenta)),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(memo, Style::default().fg(Color::DarkGray)),
    ]);

    let style = if selected {
        Style::default().bg(Color::Cyan).fg(Color::Black)
    } else {
        Style::default()
    };

    ListItem::new(line).style(style)
}

pub fn format_tx_list_header<'a>() -> ListItem<'a> {
    let line = Line::from(vec![
        Span::styled("    ", Style::default()), // index space
        Span::styled(
            format!("{:^19}", "Hash"),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:<22}", "Messages"),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:>16}", "Fee"),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled("Memo", Style::default().fg(Color::DarkGray)),
    ]);

    ListItem::new(line).style(Style::default())
}

pub fn format_kv(key: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
    ])
}

pub fn format_kv_link(key: &str, value: &str, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED)
    };

    Line::from(vec![
        Span::styled(format!("{key}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), style),
    ])
}

/// `2024-05-01T12:30:45.123456789Z` -> `2024-05-01 12:30:45 UTC`
pub fn format_block_time(time: &str) -> String {
    let Some((date, rest)) = time.split_once('T') else {
        return time.to_string();
    };
    let clock: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    if clock.is_empty() {
        return time.to_string();
    }
    format!("{date} {clock} UTC")
}

pub fn format_amount(amount: &NormalizedAmount) -> String {
    format!("{} {}", amount.formatted, amount.base_denom)
}

/// Coins without asset metadata; minimal-unit prefixes still resolve
pub fn format_coins(coins: &[Coin]) -> String {
    let map = PrecisionMap::new();
    coins
        .iter()
        .map(|c| format_amount(&normalize_amount(&c.amount, &c.denom, None, &map)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_gas(gas: u64) -> String {
    if gas >= 1_000_000 {
        format!("{:.2}M", gas as f64 / 1_000_000.0)
    } else if gas >= 1_000 {
        format!("{:.2}K", gas as f64 / 1_000.0)
    } else {
        gas.to_string()
    }
}

pub fn spinner_frame() -> &'static str {
    const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    FRAMES[(millis / 100) as usize % FRAMES.len()]
}

pub fn centered_rect(percent_x: u16, area: Rect) -> Rect {
    let popup_layout = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(area);

    popup_layout[1]
}

pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Length(height),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .split(area);

    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .split(vertical[1]);

    horizontal[1]
}

pub fn padded_rect(area: Rect, padding: u16) -> Rect {
    Rect {
        x: area.x + padding,
        y: area.y + padding,
        width: area.width.saturating_sub(padding * 2),
        height: area.height.saturating_sub(padding * 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== truncate_hash tests ====================

    #[test]
    fn test_truncate_hash_long() {
        let hash = "5C504ED432CB51138BCF09AA5E8A410DD4A1E204EF84BFED1BE16DFBA1B22060";
        let truncated = truncate_hash(hash);
        assert!(truncated.contains("..."));
        assert!(truncated.starts_with("5C504ED432"));
        assert!(truncated.ends_with("B22060"));
    }

    #[test]
    fn test_truncate_hash_short() {
        let short = "ABCD";
        assert_eq!(truncate_hash(short), short);
    }

    #[test]
    fn test_truncate_text_multibyte() {
        assert_eq!(truncate_text("héllo wörld", 6), "héllo…");
        assert_eq!(truncate_text("short", 10), "short");
    }

    // ==================== format_gas tests ====================

    #[test]
    fn test_format_gas_small() {
        assert_eq!(format_gas(500), "500");
        assert_eq!(format_gas(21000), "21.00K");
    }

    #[test]
    fn test_format_gas_large() {
        assert_eq!(format_gas(1_000_000), "1.00M");
        assert_eq!(format_gas(30_000_000), "30.00M");
    }

    // ==================== format_block_time tests ====================

    #[test]
    fn test_format_block_time_drops_fraction() {
        assert_eq!(
            format_block_time("2024-05-01T12:30:45.123456789Z"),
            "2024-05-01 12:30:45 UTC"
        );
    }

    #[test]
    fn test_format_block_time_passthrough() {
        assert_eq!(format_block_time("unknown"), "unknown");
        assert_eq!(format_block_time(""), "");
    }

    // ==================== format_coins tests ====================

    #[test]
    fn test_format_coins_resolves_prefixes() {
        let coins = vec![
            Coin {
                denom: "adydx".into(),
                amount: "2500000000000000".into(),
            },
            Coin {
                denom: "uusdc".into(),
                amount: "1000000".into(),
            },
        ];
        assert_eq!(format_coins(&coins), "0.0025 dydx, 1 usdc");
    }

    #[test]
    fn test_format_coins_unknown_denom_raw() {
        let coins = vec![Coin {
            denom: "ibc/ABC".into(),
            amount: "42".into(),
        }];
        assert_eq!(format_coins(&coins), "42 ibc/ABC");
    }

    // ==================== padded_rect tests ====================

    #[test]
    fn test_padded_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let padded = padded_rect(area, 5);
        assert_eq!(padded.x, 5);
        assert_eq!(padded.y, 5);
        assert_eq!(padded.width, 90);
        assert_eq!(padded.height, 40);
    }

    #[test]
    fn test_padded_rect_small_area() {
        let area = Rect::new(0, 0, 10, 10);
        let padded = padded_rect(area, 20); // Padding larger than area
        assert_eq!(padded.width, 0);
        assert_eq!(padded.height, 0);
    }
}

use super::helper::*;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{AccountResult, BalanceView};
use crate::indexer::{PerpetualPosition, PositionSide};
use crate::precision::format_decimal;

const NAV_HELP_ACCOUNT: &str = "[ ] IBC page • s page size • r refresh • b back • h home • Esc quit";

fn section(title: String, color: Color) -> Line<'static> {
    Line::from(vec![Span::styled(title, Style::default().fg(color))])
}

fn balance_line(balance: &BalanceView) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("  {:>20} ", balance.amount.formatted),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            balance.amount.base_denom.clone(),
            Style::default().fg(Color::Yellow),
        ),
    ];
    if balance.amount.was_converted && balance.amount.base_denom != balance.coin.denom {
        spans.push(Span::styled(
            format!(" ({})", balance.coin.denom),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn side_color(side: PositionSide) -> Color {
    match side {
        PositionSide::Long => Color::Green,
        PositionSide::Short => Color::Red,
    }
}

fn perpetual_line(position: &PerpetualPosition) -> Line<'static> {
    let pnl = position.unrealized_pnl.as_deref().unwrap_or("-");
    let pnl_color = if pnl.starts_with('-') { Color::Red } else { Color::Green };
    Line::from(vec![
        Span::raw("        "),
        Span::styled(
            format!("{:<6}", position.side.as_str()),
            Style::default().fg(side_color(position.side)),
        ),
        Span::styled(
            format!("{} {}", position.size, position.market),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("  entry {}", position.entry_price.as_deref().unwrap_or("-")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("  pnl {pnl}"), Style::default().fg(pnl_color)),
    ])
}

pub fn draw_account_result(frame: &mut Frame, result: &AccountResult) {
    let area = frame.area();
    let overview = &result.overview;

    let chunks = Layout::vertical([
        Constraint::Min(10),   // Account info
        Constraint::Length(1), // Nav help
    ])
    .split(padded_rect(area, 1));

    let kind = match &overview.account {
        Some(account) if account.module_name.is_some() => "Module Account",
        Some(_) => "Account",
        None => "Unknown Account",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" 👤 {kind} "));

    let mut lines = vec![format_kv("Address", &overview.address)];

    match &overview.account {
        Some(account) => {
            if let Some(name) = &account.module_name {
                lines.push(Line::from(vec![
                    Span::styled("Module: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        name.clone(),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
            }
            lines.push(format_kv("Account Number", &account.account_number.to_string()));
            lines.push(format_kv("Sequence", &account.sequence.to_string()));
            if let Some(key_type) = &account.pub_key_type {
                lines.push(format_kv("Public Key", key_type));
            }
        }
        None => lines.push(
            Line::from("Account not found on chain").style(Style::default().fg(Color::DarkGray)),
        ),
    }

    // Native balances
    lines.push(Line::from(""));
    lines.push(section(
        format!("── Balances ({}) ──", result.balances.len()),
        Color::Yellow,
    ));
    if result.balances.is_empty() {
        lines.push(Line::from("  None").style(Style::default().fg(Color::DarkGray)));
    }
    lines.extend(result.balances.iter().map(balance_line));

    // Staking
    if !result.delegations.is_empty() {
        lines.push(Line::from(""));
        lines.push(section(
            format!("── Delegations ({}) ──", result.delegations.len()),
            Color::Magenta,
        ));
        for (validator, amount) in &result.delegations {
            let amount = amount
                .as_ref()
                .map(format_amount)
                .unwrap_or_else(|| "—".to_string());
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", truncate_hash(validator)), Style::default().fg(Color::Cyan)),
                Span::styled(amount, Style::default().fg(Color::White)),
            ]));
        }
    }

    // IBC vouchers, paged
    if !result.ibc_tokens.is_empty() {
        let pager = &result.ibc_pager;
        lines.push(Line::from(""));
        lines.push(section(
            format!(
                "── IBC Tokens ({}) ── page {}/{} · {} per page",
                pager.total_items(),
                pager.current_page(),
                pager.total_pages(),
                pager.page_size()
            ),
            Color::Blue,
        ));
        lines.extend(result.visible_ibc_tokens().iter().map(balance_line));
    }

    // Indexer subaccounts
    if !result.parent.subaccounts.is_empty() {
        lines.push(Line::from(""));
        lines.push(section("── Subaccounts ──".to_string(), Color::Green));
        if let Some(equity) = &result.parent.equity {
            lines.push(format_kv("  Total Equity", equity));
        }
        if let Some(free) = &result.parent.free_collateral {
            lines.push(format_kv("  Free Collateral", free));
        }
        for sub in &result.parent.subaccounts {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  #{:<4}", sub.subaccount_number),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("equity {}  free {}", sub.equity, sub.free_collateral),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    if sub.margin_enabled { "  margin" } else { "  no margin" },
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            lines.extend(sub.open_perpetual_positions.values().map(perpetual_line));
        }
    }

    if !result.positions.is_empty() {
        lines.push(Line::from(""));
        lines.push(section(
            format!("── Asset Positions ({}) ──", result.positions.len()),
            Color::Green,
        ));
        for position in &result.positions {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  #{:<4}", position.subaccount_number),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<6}", position.side.as_str()),
                    Style::default().fg(side_color(position.side)),
                ),
                Span::styled(
                    format!("{:>20} ", position.amount.formatted),
                    Style::default().fg(Color::White),
                ),
                Span::styled(position.symbol.clone(), Style::default().fg(Color::Yellow)),
                Span::styled(
                    position
                        .name
                        .as_ref()
                        .map(|n| format!(" ({n})"))
                        .unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    result
                        .price_of(&position.symbol)
                        .and_then(|p| p.price.map(|price| (price, p.percent_change_24h)))
                        .map(|(price, change)| match change {
                            Some(change) => format!(
                                "  @ ${} ({}%)",
                                format_decimal(price, 4),
                                format_decimal(change, 2)
                            ),
                            None => format!("  @ ${}", format_decimal(price, 4)),
                        })
                        .unwrap_or_default(),
                    Style::default().fg(Color::Gray),
                ),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, chunks[0]);

    let help = Paragraph::new(NAV_HELP_ACCOUNT)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[1]);
}

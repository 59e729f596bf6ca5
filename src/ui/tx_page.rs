use super::helper::*;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{TxResult, MAX_VISIBLE_MESSAGES};
use crate::rpc::decode::DecodedMessage;
use crate::ui::NAV_HELP_SIMPLE;

fn link_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED)
    }
}

/// Non-navigable fields of a message
fn message_details(msg: &DecodedMessage) -> Vec<(&'static str, String)> {
    match msg {
        DecodedMessage::Send { amount, .. } => vec![("Amount", format_coins(amount))],
        DecodedMessage::Delegate {
            validator, amount, ..
        }
        | DecodedMessage::Undelegate {
            validator, amount, ..
        } => {
            let mut details = vec![("Validator", validator.clone())];
            if let Some(coin) = amount {
                details.push(("Amount", format_coins(std::slice::from_ref(coin))));
            }
            details
        }
        DecodedMessage::Redelegate {
            source,
            destination,
            amount,
            ..
        } => {
            let mut details = vec![("From Validator", source.clone()), ("To Validator", destination.clone())];
            if let Some(coin) = amount {
                details.push(("Amount", format_coins(std::slice::from_ref(coin))));
            }
            details
        }
        DecodedMessage::WithdrawReward { validator, .. } => vec![("Validator", validator.clone())],
        DecodedMessage::Vote {
            proposal_id,
            option,
            ..
        } => vec![
            ("Proposal", format!("#{proposal_id}")),
            ("Option", option.clone()),
        ],
        DecodedMessage::Opaque { type_url, size } => vec![
            ("Type", type_url.clone()),
            ("Size", format!("{size} bytes")),
        ],
    }
}

pub fn draw_tx_result(frame: &mut Frame, result: &TxResult) {
    let area = frame.area();
    let record = &result.record;

    let chunks = Layout::vertical([
        Constraint::Min(20),   // Tx info
        Constraint::Length(1), // Nav help
    ])
    .split(padded_rect(area, 1));

    let status_str = if record.is_success() {
        "✓ Success".to_string()
    } else {
        format!("✗ Failed (code {})", record.code)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" 📄 Transaction ({status_str}) "));

    let mut link_idx = 0;

    let mut lines = vec![format_kv("Hash", &record.hash)];

    lines.push(format_kv_link(
        "Block",
        &format!("#{}", record.height),
        result.selected_link == link_idx,
    ));
    link_idx += 1;
    lines.push(format_kv("Index", &record.index.to_string()));

    if !record.is_success() {
        if !record.codespace.is_empty() {
            lines.push(format_kv("Codespace", &record.codespace));
        }
        lines.push(
            Line::from(truncate_text(&record.log, 200)).style(Style::default().fg(Color::Red)),
        );
    }

    lines.push(Line::from(""));
    lines.push(format_kv(
        "Gas Used",
        &format!(
            "{} / {}",
            format_gas(record.gas_used),
            format_gas(record.gas_wanted)
        ),
    ));

    let Some(decoded) = &result.decoded else {
        lines.push(Line::from(""));
        lines.push(
            Line::from(format!(
                "Transaction body could not be decoded ({} bytes)",
                record.raw.len()
            ))
            .style(Style::default().fg(Color::Yellow)),
        );
        render(frame, lines, block, &chunks);
        return;
    };

    if !decoded.fee.is_empty() {
        lines.push(format_kv("Fee", &format_coins(&decoded.fee)));
    }
    lines.push(format_kv("Gas Limit", &format_gas(decoded.gas_limit)));
    if !decoded.memo.is_empty() {
        lines.push(format_kv("Memo", &decoded.memo));
    }
    if decoded.timeout_height > 0 {
        lines.push(format_kv("Timeout Height", &decoded.timeout_height.to_string()));
    }
    lines.push(format_kv("Signatures", &decoded.signatures.to_string()));

    // Messages - scrollable list with navigable accounts
    lines.push(Line::from(""));
    let header_text = if result.message_scroll > 0 {
        format!(
            "── Messages ({}) ── ↑{} more",
            decoded.message_count, result.message_scroll
        )
    } else {
        format!("── Messages ({}) ──", decoded.message_count)
    };
    lines.push(Line::from(vec![Span::styled(
        header_text,
        Style::default().fg(Color::Yellow),
    )]));

    if decoded.dropped() > 0 {
        lines.push(
            Line::from(format!("  {} message(s) failed to decode", decoded.dropped()))
                .style(Style::default().fg(Color::Red)),
        );
    }

    let visible_end = (result.message_scroll + MAX_VISIBLE_MESSAGES).min(decoded.messages.len());
    let scroll = result.message_scroll.min(visible_end);

    // Skip link indices of scrolled-out messages
    for msg in &decoded.messages[..scroll] {
        link_idx += msg.accounts().len();
    }

    for (i, msg) in decoded.messages[scroll..visible_end].iter().enumerate() {
        let msg_num = scroll + i + 1; // 1-indexed

        lines.push(Line::from(vec![
            Span::styled(
                format!("  {msg_num:>3}. "),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                msg.label().to_string(),
                if msg.is_opaque() {
                    Style::default().fg(Color::Gray)
                } else {
                    Style::default().fg(Color::White)
                },
            ),
        ]));

        for account in msg.accounts() {
            lines.push(Line::from(vec![
                Span::styled("         ", Style::default()),
                Span::styled(account.to_string(), link_style(result.selected_link == link_idx)),
            ]));
            link_idx += 1;
        }

        for (key, value) in message_details(msg) {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("         {key}: "),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(value, Style::default().fg(Color::Yellow)),
            ]));
        }
    }

    if visible_end < decoded.messages.len() {
        lines.push(Line::from(vec![Span::styled(
            format!("  ↓ {} more messages", decoded.messages.len() - visible_end),
            Style::default().fg(Color::DarkGray),
        )]));
    }

    render(frame, lines, block, &chunks);
}

fn render(frame: &mut Frame, lines: Vec<Line<'static>>, block: Block, chunks: &[ratatui::layout::Rect]) {
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[0]);

    let help = Paragraph::new(NAV_HELP_SIMPLE)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[1]);
}

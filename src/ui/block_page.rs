use super::helper::*;

use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::NAV_HELP;

use crate::app::BlockResult;

pub fn draw_block_result(frame: &mut Frame, result: &BlockResult) {
    let area = frame.area();
    let info = &result.info;
    let padded = padded_rect(area, 1);

    let block_info_height: u16 = 12;

    // Each tx takes 1 line plus 2 for borders, between 3 txs and half the terminal
    let min_tx_height: u16 = 5;
    let max_tx_height = padded.height / 2;
    let remaining = padded.height.saturating_sub(block_info_height + 1); // +1 for nav help
    let tx_list_height = remaining.max(min_tx_height).min(max_tx_height);

    let chunks = Layout::vertical([
        Constraint::Length(padded.height.saturating_sub(tx_list_height + 1)), // Block info takes what's left
        Constraint::Length(tx_list_height),                                   // Transaction list
        Constraint::Length(1),                                                // Nav help
    ])
    .split(padded);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" 📦 Block #{} ", info.height));

    let parent = if info.height > 1 {
        format!("#{}", info.height - 1)
    } else {
        "—".to_string()
    };

    let mut lines = vec![
        format_kv("Hash", info.hash.as_deref().unwrap_or("—")),
        format_kv_link("Parent Block", &parent, !result.list_mode),
        format_kv("Time", &format_block_time(&info.time)),
        format_kv("Chain", &info.chain_id),
        format_kv("Proposer", &info.proposer),
        Line::from(""),
        format_kv("Transactions", &info.tx_count().to_string()),
        format_kv("Signatures", &info.signatures.to_string()),
        format_kv("App Hash", &truncate_hash(&info.app_hash)),
    ];

    if result.undecoded > 0 {
        lines.push(
            Line::from(format!(
                "{} transaction(s) could not be decoded",
                result.undecoded
            ))
            .style(Style::default().fg(Color::Yellow)),
        );
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, chunks[0]);

    let tx_title = if result.list_mode {
        format!(" Transactions ({}) [selected] ", result.transactions.len())
    } else {
        format!(
            " Transactions ({}) [Tab to select] ",
            result.transactions.len()
        )
    };

    let tx_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if result.list_mode {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(tx_title);

    if result.transactions.is_empty() {
        let empty_msg = Paragraph::new("No transactions in this block")
            .block(tx_block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty_msg, chunks[1]);
    } else {
        let visible_count = (chunks[1].height.saturating_sub(3)) as usize; // -2 borders, -1 header
        let start = result.selected_index.saturating_sub(visible_count / 2);

        let mut items: Vec<ListItem> = vec![format_tx_list_header()];

        items.extend(
            result
                .transactions
                .iter()
                .enumerate()
                .skip(start)
                .take(visible_count)
                .map(|(i, tx)| {
                    let is_selected = result.list_mode && i == result.selected_index;
                    format_tx_list_item(i, tx, is_selected)
                }),
        );

        let list = List::new(items).block(tx_block);
        frame.render_widget(list, chunks[1]);
    }

    let help = Paragraph::new(NAV_HELP)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[2]);
}

use super::helper::*;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{FeedFocus, LiveFeed, MAX_VISIBLE_FEED};
use crate::rpc::StreamKind;
use crate::session::Session;
use crate::ui::NAV_HELP;

fn feed_block(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(title)
}

fn item_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::Cyan).fg(Color::Black)
    } else {
        Style::default()
    }
}

fn stream_badge(session: &Session, kind: StreamKind) -> Span<'static> {
    match session.subscription_status(kind) {
        Some(status) if status.is_active() => Span::styled("● live", Style::default().fg(Color::Green)),
        _ => Span::styled("○ idle", Style::default().fg(Color::DarkGray)),
    }
}

pub fn draw_live_feed(frame: &mut Frame, feed: &LiveFeed, session: &Session) {
    let area = frame.area();
    let state = &session.state;

    let chunks = Layout::vertical([
        Constraint::Length(1), // Stream status
        Constraint::Min(5),    // Feeds
        Constraint::Length(1), // Nav help
    ])
    .split(padded_rect(area, 1));

    let status = Line::from(vec![
        Span::styled("Blocks ", Style::default().fg(Color::DarkGray)),
        stream_badge(session, StreamKind::NewBlock),
        Span::raw("   "),
        Span::styled("Txs ", Style::default().fg(Color::DarkGray)),
        stream_badge(session, StreamKind::Tx),
    ]);
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), chunks[0]);

    let columns =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).split(chunks[1]);

    let blocks_focused = feed.focus == FeedFocus::Blocks;
    let block_items: Vec<ListItem> = state
        .blocks
        .iter()
        .rev()
        .take(MAX_VISIBLE_FEED)
        .enumerate()
        .map(|(i, block)| {
            let line = Line::from(vec![
                Span::styled(format!("#{:<10}", block.height), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{:>4} txs  ", block.tx_count()),
                    Style::default().fg(Color::White),
                ),
                Span::styled(format_block_time(&block.time), Style::default().fg(Color::DarkGray)),
            ]);
            ListItem::new(line).style(item_style(blocks_focused && i == feed.selected_index))
        })
        .collect();

    let blocks_title = format!(" 📦 New Blocks ({}) ", state.blocks.len());
    if block_items.is_empty() {
        let waiting = Paragraph::new("Waiting for blocks...")
            .block(feed_block(blocks_title, blocks_focused))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(waiting, columns[0]);
    } else {
        frame.render_widget(
            List::new(block_items).block(feed_block(blocks_title, blocks_focused)),
            columns[0],
        );
    }

    let txs_focused = feed.focus == FeedFocus::Txs;
    let tx_items: Vec<ListItem> = state
        .txs
        .iter()
        .rev()
        .take(MAX_VISIBLE_FEED)
        .enumerate()
        .map(|(i, tx)| {
            let (mark, color) = if tx.is_success() {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            let line = Line::from(vec![
                Span::styled(format!("{mark} "), Style::default().fg(color)),
                Span::styled(truncate_hash(&tx.hash), Style::default().fg(Color::Cyan)),
                Span::styled(format!("  #{}", tx.height), Style::default().fg(Color::White)),
                Span::styled(
                    format!("  gas {}", format_gas(tx.gas_used)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            ListItem::new(line).style(item_style(txs_focused && i == feed.selected_index))
        })
        .collect();

    let txs_title = format!(" 📄 Transactions ({}) ", state.txs.len());
    if tx_items.is_empty() {
        let waiting = Paragraph::new("Waiting for transactions...")
            .block(feed_block(txs_title, txs_focused))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(waiting, columns[1]);
    } else {
        frame.render_widget(
            List::new(tx_items).block(feed_block(txs_title, txs_focused)),
            columns[1],
        );
    }

    let help = Paragraph::new(NAV_HELP)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[2]);
}

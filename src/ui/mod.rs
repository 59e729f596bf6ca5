mod account_page;
mod block_page;
mod helper;
mod live_page;
mod params_page;
mod tx_page;

use account_page::draw_account_result;
use block_page::draw_block_result;
use helper::*;
use live_page::draw_live_feed;
use params_page::draw_params;
use tx_page::draw_tx_result;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::config::DEFAULT_RPC_URL;

const TITLE_ART: &str = r#"
██████╗ ██╗   ██╗███████╗██╗  ██╗
██╔══██╗╚██╗ ██╔╝██╔════╝╚██╗██╔╝
██║  ██║ ╚████╔╝ █████╗   ╚███╔╝ 
██║  ██║  ╚██╔╝  ██╔══╝   ██╔██╗ 
██████╔╝   ██║   ███████╗██╔╝ ██╗
╚═════╝    ╚═╝   ╚══════╝╚═╝  ╚═╝
"#;

const SUBTITLE: &str = "dYdX Chain Explorer";

const NAV_HELP: &str = "↑↓ navigate • Enter select • Tab toggle • b back • h home • Esc quit";
const NAV_HELP_SIMPLE: &str = "↑↓ navigate • Enter select • b back • h home • Esc quit";
const NAV_HELP_NO_LIST: &str = "b back • h home • Esc quit";
const NAV_HELP_ERROR: &str = "r retry • b back • h home • Esc quit";

pub fn draw(frame: &mut Frame, app: &App) {
    match &app.screen {
        Screen::Home => draw_home(frame, app),
        Screen::Loading(msg) => draw_loading(frame, msg),
        Screen::BlockResult(result) => draw_block_result(frame, result),
        Screen::TxResult(result) => draw_tx_result(frame, result),
        Screen::AccountResult(result) => draw_account_result(frame, result),
        Screen::LiveFeed(feed) => draw_live_feed(frame, feed, &app.session),
        Screen::Params => draw_params(frame, &app.session.state.params),
        Screen::Error(msg) => draw_error(frame, msg),
    }
}

fn draw_home(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.needs_rpc_setup() {
        draw_rpc_setup(frame, app, area);
    } else {
        draw_search_home(frame, app, area);
    }
}

fn draw_rpc_setup(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(9), // Title
        Constraint::Length(1), // Subtitle
        Constraint::Length(3), // Spacing
        Constraint::Length(5), // RPC input box
        Constraint::Length(2), // Failure reason
        Constraint::Length(1), // Help
        Constraint::Min(0),    // Padding
    ])
    .split(area);

    // Title
    let title = Paragraph::new(TITLE_ART)
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let subtitle = Paragraph::new(SUBTITLE)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    frame.render_widget(subtitle, chunks[1]);

    // RPC input box
    let rpc_area = centered_rect(70, chunks[3]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(if app.session.connection_error() {
            " ⚠ Connection Failed "
        } else {
            " ⚡ RPC Configuration Required "
        })
        .title_style(Style::default().fg(Color::Yellow));

    let inner_area = block.inner(rpc_area);
    frame.render_widget(block, rpc_area);

    // Input field inside the box
    let input_chunks = Layout::vertical([
        Constraint::Length(1), // Label
        Constraint::Length(1), // Input
    ])
    .split(inner_area);

    let label = Paragraph::new("Enter a dYdX node RPC URL (leave empty for the default node):")
        .style(Style::default().fg(Color::White));
    frame.render_widget(label, input_chunks[0]);

    let inner_width = input_chunks[1].width as usize;
    let scroll = app.rpc_input.visual_scroll(inner_width);

    let display_text = if app.rpc_input.value().is_empty() {
        Span::styled(DEFAULT_RPC_URL, Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(app.rpc_input.value(), Style::default().fg(Color::White))
    };

    let input = Paragraph::new(display_text).scroll((0, scroll as u16));
    frame.render_widget(input, input_chunks[1]);

    // Cursor
    let cursor_x =
        input_chunks[1].x + (app.rpc_input.visual_cursor().saturating_sub(scroll)) as u16;
    let cursor_y = input_chunks[1].y;
    if cursor_x < input_chunks[1].x + input_chunks[1].width {
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    if let Some(reason) = &app.connection_failure {
        let failure = Paragraph::new(truncate_text(reason, 100))
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(failure, chunks[4]);
    }

    let help = Paragraph::new("Press Enter to connect • Esc to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[5]);
}

fn draw_search_home(frame: &mut Frame, app: &App, area: Rect) {
    let recent_searches = app.get_recent_searches();
    let has_history = !recent_searches.is_empty();

    // Calculate history section height (max 5 items + 2 for border)
    let history_height = if has_history {
        (recent_searches.len().min(5) + 2) as u16
    } else {
        0
    };

    let chunks = Layout::vertical([
        Constraint::Length(9),              // Title
        Constraint::Length(1),              // Subtitle
        Constraint::Length(2),              // Spacing
        Constraint::Length(3),              // Search bar
        Constraint::Length(1),              // Spacing
        Constraint::Length(history_height), // History
        Constraint::Length(1),              // Spacing
        Constraint::Length(1),              // RPC status
    let (status_text, status_color) = if app.has_rpc() {
        ("connected", Color::Green)
    } else {
        ("connecting", Color::Yellow)
    };
    let rpc_status = if let Some(ref url) = app.rpc_url {
        Line::from(vec![
            Span::styled("RPC: ", Style::default().fg(Color::DarkGray)),
            Span::styled(truncate_text(url, 50), Style::default().fg(Color::Green)),
            Span::styled(format!(" ({status_text})"), Style::default().fg(status_color)),
        ])
    } else {
        Line::from(vec![
            Span::styled("RPC: ", Style::default().fg(Color::DarkGray)),
            Span::styled("Not configured", Style::default().fg(Color::Yellow)),
        ])
    };
    let rpc_widget = Paragraph::new(rpc_status).alignment(Alignment::Center);
    frame.render_widget(rpc_widget, chunks[7]);

    let help_text = if has_history {
        "Enter search • ↑↓ history • Del remove • Tab live • Ctrl-P params • Esc quit"
    } else {
        "Enter to search • Tab live feed • Ctrl-P params • Esc quit"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[8]);

    // Network info (if available)
    let state = &app.session.state;
    if let Some(node) = &state.node {
        let net_block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Network Status ");

        let height = state
            .latest_height()
            .map(|h| format!("#{h}"))
            .unwrap_or_else(|| "—".to_string());

        let mut lines = vec![Line::from(vec![
            Span::styled("Network: ", Style::default().fg(Color::DarkGray)),
            Span::styled(node.network.clone(), Style::default().fg(Color::White)),
            Span::raw("  "),
            Span::styled("Block: ", Style::default().fg(Color::DarkGray)),
            Span::styled(height, Style::default().fg(Color::White)),
        ])];

        if let Some(block) = &state.latest_block {
            lines[0].spans.push(Span::raw("  "));
            lines[0]
                .spans
                .push(Span::styled("Txs: ", Style::default().fg(Color::DarkGray)));
            lines[0].spans.push(Span::styled(
                block.tx_count().to_string(),
                Style::default().fg(Color::White),
            ));
        }

        lines.push(Line::from(vec![
            Span::styled("Node: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{} v{}", node.moniker, node.version),
                Style::default().fg(Color::Gray),
            ),
        ]));

        if let Some(tx) = &state.latest_tx {
            lines.push(Line::from(vec![
                Span::styled("Latest Tx: ", Style::default().fg(Color::DarkGray)),
                Span::styled(truncate_hash(&tx.hash), Style::default().fg(Color::Gray)),
            ]));
        }

        let net_para = Paragraph::new(lines)
            .block(net_block)
            .alignment(Alignment::Center);
        frame.render_widget(net_para, chunks[9]);
    }
}

fn draw_search_bar_with_selection(frame: &mut Frame, app: &App, area: Rect, selected: bool) {
    let border_color = if selected {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" 🔍 Search ")
        .title_style(Style::default().fg(border_color));

    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll = app.search_input.visual_scroll(inner_width);

    let display_text = if app.search_input.value().is_empty() {
        Span::styled(
            "Search by Address / Tx Hash / Block / latest",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(app.search_input.value(), Style::default().fg(Color::White))
    };

    let input = Paragraph::new(display_text)
        .block(block)
        .scroll((0, scroll as u16));

    frame.render_widget(input, area);

    // Only show cursor if search bar is selected
    if selected {
        let cursor_x =
            area.x + 1 + (app.search_input.visual_cursor().saturating_sub(scroll)) as u16;
        let cursor_y = area.y + 1;

        if cursor_x < area.x + area.width - 1 {
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }
}

fn draw_history_list(frame: &mut Frame, app: &App, area: Rect) {
    let recent_searches = app.get_recent_searches();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Recent Searches ");

    let items: Vec<ListItem> = recent_searches
        .iter()
        .enumerate()
        .take(5)
        .map(|(i, query)| {
            let is_selected = app.selected_history_index == Some(i);
            let style = if is_selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };

            // Truncate long queries
            let display = truncate_text(query, 60);

            ListItem::new(format!(" {display}")).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn draw_loading(frame: &mut Frame, msg: &str) {
    let area = frame.area();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Loading ");

    let text = format!("{} {}", spinner_frame(), msg);
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));

    let centered = centered_rect_fixed(50, 5, area);
    frame.render_widget(paragraph, centered);
}

fn draw_error(frame: &mut Frame, msg: &str) {
    let area = frame.area();
    let padded = padded_rect(area, 1);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ❌ Error ");

    // Split message into lines and format them
    let mut lines: Vec<Line> = msg
        .lines()
        .map(|line| Line::from(line.to_string()).fg(Color::Red))
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(NAV_HELP_ERROR).fg(Color::DarkGray));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(ratatui::widgets::Wrap { trim: false });

    frame.render_widget(paragraph, padded);
}

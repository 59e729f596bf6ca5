use super::helper::*;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::rpc::{ChainParams, ParamsModule};
use crate::ui::NAV_HELP_NO_LIST;

pub fn draw_params(frame: &mut Frame, params: &ChainParams) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Min(5),    // Params
        Constraint::Length(1), // Nav help
    ])
    .split(padded_rect(area, 1));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" ⚙ Chain Parameters ");

    let mut lines = Vec::new();

    for module in ParamsModule::ALL {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(vec![Span::styled(
            format!("── {} ──", module.as_str()),
            Style::default().fg(Color::Yellow),
        )]));

        match params.get(module) {
            Some(values) => {
                for (key, value) in values {
                    lines.push(format_kv(&format!("  {key}"), value));
                }
            }
            None => lines.push(
                Line::from("  unavailable").style(Style::default().fg(Color::DarkGray)),
            ),
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[0]);

    let help = Paragraph::new(NAV_HELP_NO_LIST)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[1]);
}

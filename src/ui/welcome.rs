use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::models::TimerMode;
use crate::ui::format_remaining;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Fill(1),
    ])
    .split(area);

    let settings = app.session().settings();
    let timing = match settings.timer {
        TimerMode::PerQuestion => "Timed per question".to_string(),
        TimerMode::WholeSession { seconds } => {
            format!("{} for the whole quiz", format_remaining(seconds))
        }
    };
    let summary = format!("{} Questions · {}", app.sitting_size(), timing);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            app.label().to_uppercase(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(summary, Style::default().fg(Color::DarkGray))),
        Line::from(""),
    ];
    match app.error_message() {
        Some(message) => content.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        ))),
        None => content.push(Line::from("")),
    }
    content.extend([
        Line::from(""),
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from("to start  ·  q to quit".fg(Color::DarkGray)),
    ]);

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::{App, SetupField};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "AI QUIZ",
        Style::default().fg(Color::Cyan).bold(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let form = app.form();
    let placeholders = app.placeholders();
    render_text_field(
        frame,
        chunks[1],
        "Subject",
        &form.subject,
        &placeholders.subject,
        form.focus == SetupField::Subject,
    );
    render_text_field(
        frame,
        chunks[2],
        "Topic (optional)",
        &form.topic,
        &placeholders.topic,
        form.focus == SetupField::Topic,
    );
    render_choice(
        frame,
        chunks[3],
        "Number of questions",
        form.count.to_string(),
        form.focus == SetupField::Count,
    );
    render_choice(
        frame,
        chunks[4],
        "Difficulty",
        form.difficulty.to_string(),
        form.focus == SetupField::Difficulty,
    );

    if let Some(message) = app.error_message() {
        let widget = Paragraph::new(message.to_string())
            .alignment(Alignment::Center)
            .fg(Color::Red);
        frame.render_widget(widget, chunks[5]);
    }

    let controls = if app.is_generating() {
        "generating..."
    } else {
        "tab next field  ·  ←/→ change  ·  enter generate  ·  esc quit"
    };
    let widget = Paragraph::new(controls)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, chunks[7]);
}

fn field_block(label: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(label)
        .borders(Borders::ALL)
        .border_style(border)
        .padding(Padding::horizontal(1))
}

fn render_text_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    placeholder: &str,
    focused: bool,
) {
    let line = if value.is_empty() {
        Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray).italic(),
        ))
    } else {
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::styled(value.to_string(), Style::default().fg(Color::White)),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ])
    };
    frame.render_widget(Paragraph::new(line).block(field_block(label, focused)), area);
}

fn render_choice(frame: &mut Frame, area: Rect, label: &str, value: String, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::Gray)
    };
    let line = Line::from(vec![
        Span::styled("< ", Style::default().fg(Color::DarkGray)),
        Span::styled(value, style),
        Span::styled(" >", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line).block(field_block(label, focused)), area);
}

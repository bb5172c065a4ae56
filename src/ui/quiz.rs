use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{Phase, Question};
use crate::ui::{centered, format_remaining};

const OPTION_LABELS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];
const LOW_TIME_SECONDS: u32 = 10;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let Some(question) = session.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_status(frame, chunks[0], app);
    render_question_text(frame, chunks[1], &question.text);
    render_options(
        frame,
        chunks[2],
        question,
        app.selected_option(),
        session.answer_for(session.current_index()),
    );
    render_controls(frame, chunks[3], app);

    if session.phase() == Phase::AwaitingConfirmation {
        render_confirmation(frame, area, app);
    }
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let [progress_area, timer_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(20)]).areas(area);

    let progress = format!(
        "Question {}/{}",
        session.current_index() + 1,
        session.total_questions()
    );
    frame.render_widget(Paragraph::new(progress).fg(Color::DarkGray), progress_area);

    let remaining = session.time_remaining();
    let color = if remaining <= LOW_TIME_SECONDS {
        Color::Red
    } else {
        Color::Yellow
    };
    let timer = Paragraph::new(format!("Time left {}", format_remaining(remaining)))
        .alignment(Alignment::Right)
        .fg(color)
        .bold();
    frame.render_widget(timer, timer_area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    selected: usize,
    answered: Option<usize>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(question.options.len() * 2);

    for (index, option) in question.options.iter().enumerate() {
        let is_selected = index == selected;
        let is_answer = answered == Some(index);
        let style = if is_answer {
            Style::default().fg(Color::Green).bold()
        } else if is_selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { ">" } else { " " };
        let label = OPTION_LABELS.get(index).copied().unwrap_or('?');

        let mut spans = vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(format!("{label}. "), style),
            Span::styled(option.as_str(), style),
        ];
        if is_answer {
            spans.push(Span::styled("  ✓", Style::default().fg(Color::Green)));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let next = if session.is_last() { "finish" } else { "next" };
    let back = if session.settings().allow_back {
        "  ·  p prev"
    } else {
        ""
    };
    let text = format!("j/k navigate  ·  enter select  ·  n {next}{back}  ·  s submit  ·  q quit");
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn render_confirmation(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let unanswered = session.total_questions() - session.answers().len();
    let detail = match unanswered {
        0 => "All questions answered.".to_string(),
        1 => "1 question is unanswered.".to_string(),
        n => format!("{n} questions are unanswered."),
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Submit quiz?",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from("y submit  ·  n keep going".fg(Color::DarkGray)),
    ];

    let popup = centered(area, 44, 8);
    frame.render_widget(Clear, popup);
    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::Yellow),
    );
    frame.render_widget(widget, popup);
}

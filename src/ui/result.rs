use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::ai::ExplanationState;
use crate::app::App;
use crate::models::{QuestionOutcome, ScoreReport};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(report) = app.report() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(9),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], report);
    render_question_breakdown(frame, chunks[1], report, app);
    render_detail(frame, chunks[2], report, app);
    render_controls(frame, chunks[3], app);
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, report: &ScoreReport) {
    let percentage = report.percentage();
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({:.0}%)",
                report.correct_count, report.total, percentage
            ),
            Style::default().fg(get_grade_color(percentage)).bold(),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, report: &ScoreReport, app: &App) {
    let questions = app.session().questions();
    let cursor = app.result_cursor();

    let lines: Vec<Line> = report
        .per_question
        .iter()
        .zip(questions)
        .map(|(outcome, question)| {
            let (symbol, color) = if outcome.is_correct {
                ("+", Color::Green)
            } else {
                ("-", Color::Red)
            };
            let text_style = if outcome.question_index == cursor {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };

            Line::from(vec![
                Span::styled(format!(" {symbol} "), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", outcome.question_index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(truncate_question(&question.text), text_style),
            ])
        })
        .collect();

    let visible = area.height.max(1) as usize;
    let scroll = cursor.saturating_sub(visible - 1);
    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn render_detail(frame: &mut Frame, area: Rect, report: &ScoreReport, app: &App) {
    let cursor = app.result_cursor();
    let (Some(outcome), Some(question)) = (
        report.per_question.get(cursor),
        app.session().questions().get(cursor),
    ) else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            question.text.clone(),
            Style::default().fg(Color::White).bold(),
        )),
        answer_line(outcome, &question.options),
        Line::from(vec![
            Span::styled("Correct answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                question.correct_option().to_string(),
                Style::default().fg(Color::Green),
            ),
        ]),
    ];

    match app.explanations().get(cursor) {
        Some(ExplanationState::Loading(_)) => {
            lines.push(Line::from("Loading explanation...".fg(Color::DarkGray)));
        }
        Some(ExplanationState::Ready(text)) => {
            lines.push(Line::from(""));
            lines.extend(text.lines().map(|l| Line::from(l.to_string())));
        }
        Some(ExplanationState::Failed(reason)) => {
            lines.push(Line::from(Span::styled(
                format!("Explanation unavailable: {reason}"),
                Style::default().fg(Color::Red),
            )));
        }
        None => {}
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn answer_line<'a>(outcome: &QuestionOutcome, options: &'a [String]) -> Line<'a> {
    let label = Span::styled("Your answer: ", Style::default().fg(Color::DarkGray));
    match outcome.selected_index.and_then(|i| options.get(i)) {
        Some(text) => {
            let color = if outcome.is_correct {
                Color::Green
            } else {
                Color::Red
            };
            Line::from(vec![
                label,
                Span::styled(text.as_str(), Style::default().fg(color)),
            ])
        }
        None => Line::from(vec![
            label,
            Span::styled("not answered", Style::default().fg(Color::Red).italic()),
        ]),
    }
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let text = if app.can_explain() {
        "j/k select  ·  e explain  ·  r restart  ·  q quit"
    } else {
        "j/k select  ·  r restart  ·  q quit"
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_question() {
        assert_eq!(truncate_question("short"), "short");
        let long = "x".repeat(60);
        let truncated = truncate_question(&long);
        assert_eq!(truncated.chars().count(), QUESTION_PREVIEW_LENGTH + 3);
        assert!(truncated.ends_with("..."));
    }
}

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::{App, Toast};
use crate::models::{Question, Theme};

use super::markup::plain_text;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session() else {
        return;
    };
    let (Some(theme), Some(question)) = (session.current_theme(), session.current_question())
    else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Min(6),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], theme);
    render_progress(
        frame,
        chunks[1],
        question,
        session.question_number(),
        session.total_questions(),
    );
    render_question_text(frame, chunks[2], question, session.question_number());
    render_options(frame, chunks[3], &question.choices, app.highlighted());
    if let Some(toast) = app.toast() {
        render_toast(frame, chunks[4], toast);
    }
    render_controls(frame, chunks[5]);
}

fn render_header(frame: &mut Frame, area: Rect, theme: Theme) {
    let widget = Paragraph::new(theme.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(widget, area);
}

fn render_progress(frame: &mut Frame, area: Rect, question: &Question, number: usize, total: usize) {
    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Length(12)]).split(area);

    let source = Paragraph::new(format!("{}회 출제 문제", question.source_exam)).fg(Color::Gray);
    frame.render_widget(source, chunks[0]);

    let progress = Paragraph::new(format!("{}/{}", number, total))
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(progress, chunks[1]);
}

fn render_question_text(frame: &mut Frame, area: Rect, question: &Question, number: usize) {
    let text = format!("{}. {}", number, plain_text(&question.text));
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .fg(Color::White)
        .bold()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray)
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, choices: &[String], highlighted: Option<usize>) {
    let mut lines: Vec<Line> = Vec::with_capacity(choices.len() * 2);

    for (index, choice) in choices.iter().enumerate() {
        let number = index + 1;
        let is_selected = highlighted == Some(number);
        let style = if is_selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { ">" } else { " " };

        let text = plain_text(choice);
        let mut choice_lines = text.lines();
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", number), style),
            Span::styled(choice_lines.next().unwrap_or_default().to_string(), style),
        ]));
        for rest in choice_lines {
            lines.push(Line::from(Span::styled(format!("      {}", rest), style)));
        }
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast) {
    let feedback = &toast.feedback;
    let (headline, color) = if feedback.is_correct {
        ("✅ 정답입니다!", Color::Green)
    } else {
        ("❌ 오답입니다!", Color::Red)
    };

    let content = vec![
        Line::from(Span::styled(headline, Style::default().fg(color).bold())),
        Line::from(Span::styled(
            format!(
                "정답: {}. {}",
                feedback.correct_choice,
                plain_text(&feedback.correct_text)
            ),
            Style::default().fg(Color::White),
        )),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP).border_style(color));
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("1-9 or j/k select  ·  enter submit  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

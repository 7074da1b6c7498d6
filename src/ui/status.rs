//! Screens shown while no quiz is running.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

const TITLE: &str = "정보처리산업기사 기출";

pub fn render_loading(frame: &mut Frame, area: Rect, app: &App) {
    let content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(
            app.selection().to_string(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("문제를 불러오는 중... ({})", app.source_label()),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from("q quit".fg(Color::DarkGray)),
    ];

    render_box(frame, area, content, Color::DarkGray);
}

pub fn render_load_failed(frame: &mut Frame, area: Rect, app: &App) {
    let (headline, reason) = match app.load_error() {
        Some(error) => (
            format!("문제를 불러올 수 없습니다 (status {})", error.status()),
            error.to_string(),
        ),
        None => ("문제를 불러올 수 없습니다".to_string(), String::new()),
    };

    let content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(
            app.selection().to_string(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(headline, Style::default().fg(Color::Red).bold())),
        Line::from(Span::styled(reason, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from("r retry  ·  q quit".fg(Color::DarkGray)),
    ];

    render_box(frame, area, content, Color::Red);
}

pub fn render_nothing_to_show(frame: &mut Frame, area: Rect, app: &App) {
    let content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(
            app.selection().to_string(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "풀 수 있는 문제가 없습니다",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from("r retry  ·  q quit".fg(Color::DarkGray)),
    ];

    render_box(frame, area, content, Color::DarkGray);
}

fn title_line() -> Line<'static> {
    Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()))
}

fn render_box(frame: &mut Frame, area: Rect, content: Vec<Line>, border: Color) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(content.len() as u16 + 2),
        Constraint::Fill(1),
    ])
    .split(area);

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(border));

    frame.render_widget(widget, chunks[1]);
}

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table, Wrap},
};

use crate::app::App;
use crate::models::Theme;
use crate::session::{AnswerRecord, ScoreReport, SessionState, PASS_AVERAGE, SUBJECT_MINIMUM};

use super::markup::plain_text;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session() else {
        return;
    };
    let report = session.report();

    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(report.themes.len() as u16 + 4),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_verdict(frame, chunks[0], &report);
    render_score_table(frame, chunks[1], &report);
    render_rules(frame, chunks[2]);
    render_review(frame, chunks[3], session, app.result_scroll());
    render_controls(frame, chunks[4]);
}

fn render_verdict(frame: &mut Frame, area: Rect, report: &ScoreReport) {
    let (verdict, color) = if report.passed {
        ("합격", Color::Green)
    } else {
        ("불합격", Color::Red)
    };

    let mut detail = format!("평균 {}점", report.average);
    let failed: Vec<String> = report
        .failed_themes()
        .map(|row| format!("{}과목", row.theme.number()))
        .collect();
    if !failed.is_empty() {
        detail.push_str(&format!("  ·  과락: {}", failed.join(", ")));
    }

    let content = vec![
        Line::from(Span::styled(
            "문제 풀이 결과",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(verdict, Style::default().fg(color).bold()),
            Span::styled(format!("  ({})", detail), Style::default().fg(Color::Gray)),
        ]),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_score_table(frame: &mut Frame, area: Rect, report: &ScoreReport) {
    let header = Row::new(["과목명", "맞은 개수", "틀린 개수", "점수"])
        .style(Style::default().fg(Color::Cyan).bold());

    let mut rows: Vec<Row> = report
        .themes
        .iter()
        .map(|row| {
            let score_style = if row.failed_minimum {
                Style::default().fg(Color::Red).bold()
            } else {
                Style::default().fg(Color::White)
            };
            Row::new([
                Cell::from(row.theme.name()),
                Cell::from(row.correct.to_string()),
                Cell::from(row.wrong.to_string()),
                Cell::from(row.score.to_string()).style(score_style),
            ])
        })
        .collect();

    rows.push(
        Row::new([
            Cell::from("평균 점수"),
            Cell::from(""),
            Cell::from(""),
            Cell::from(report.average.to_string()),
        ])
        .style(Style::default().bold()),
    );

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(table, area);
}

fn render_rules(frame: &mut Frame, area: Rect) {
    let rules = format!(
        "한 과목 {}점 미만일 시 과락  ·  평균 {}점 이상 시 합격",
        SUBJECT_MINIMUM, PASS_AVERAGE
    );
    let widget = Paragraph::new(rules)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn render_review(frame: &mut Frame, area: Rect, session: &SessionState, scroll: usize) {
    let (wrong, right) = session.review();

    let mut lines: Vec<Line> = Vec::new();
    if !wrong.is_empty() {
        push_section(&mut lines, "틀린 문제", Color::Red, &wrong, true);
    }
    if !right.is_empty() {
        push_section(&mut lines, "맞은 문제", Color::Green, &right, false);
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Color::DarkGray)
                .padding(Padding::horizontal(1)),
        )
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn push_section(
    lines: &mut Vec<Line<'static>>,
    title: &'static str,
    color: Color,
    records: &[&AnswerRecord],
    show_selected: bool,
) {
    lines.push(Line::from(Span::styled(
        title,
        Style::default().fg(color).bold(),
    )));

    let mut themes: Vec<Theme> = records.iter().map(|record| record.question.theme).collect();
    themes.sort();
    themes.dedup();

    for theme in themes {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            theme.to_string(),
            Style::default().fg(Color::Cyan).bold(),
        )));

        for record in records.iter().filter(|record| record.question.theme == theme) {
            push_record(lines, record, show_selected);
        }
    }
    lines.push(Line::from(""));
}

fn push_record(lines: &mut Vec<Line<'static>>, record: &AnswerRecord, show_selected: bool) {
    let question = &record.question;
    let dim = Style::default().fg(Color::DarkGray);
    let plain = Style::default().fg(Color::Gray);

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("{}회 출제 문제", question.source_exam),
        dim,
    )));
    for line in plain_text(&question.text).lines() {
        lines.push(Line::from(Span::styled(
            line.to_string(),
            Style::default().fg(Color::White),
        )));
    }
    for (index, choice) in question.choices.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("  {}. {}", index + 1, plain_text(choice)),
            plain,
        )));
    }

    if show_selected {
        let selected = record
            .selected_text()
            .map(plain_text)
            .unwrap_or_else(|| "선택 안함".to_string());
        lines.push(Line::from(Span::styled(
            format!("입력한 답: {}", selected),
            Style::default().fg(Color::Red),
        )));
    }
    let correct = question
        .correct_answer()
        .map(plain_text)
        .unwrap_or_else(|| format!("{}번", question.correct_choice));
    lines.push(Line::from(Span::styled(
        format!("정답: {}", correct),
        Style::default().fg(Color::Green),
    )));

    if let Some(explanation) = &question.explanation {
        lines.push(Line::from(Span::styled(
            format!("해설: {}", plain_text(explanation)),
            dim,
        )));
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r 다시 풀기  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

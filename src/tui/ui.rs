//! UI rendering for the monitor.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::circuit::{ElementSnapshot, ElementState};
use crate::Trit;
use super::app::MonitorApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &MonitorApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65),
            Constraint::Percentage(35),
        ])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_elements(frame, left_chunks[0], app);
    draw_status(frame, left_chunks[1], app);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(5),
        ])
        .split(chunks[1]);

    draw_summary(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw one line per element with colored port values.
fn draw_elements(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let rows = (area.height as usize).saturating_sub(2);

    let items: Vec<ListItem> = app
        .visible(rows)
        .iter()
        .map(|el| ListItem::new(element_line(el)))
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Elements ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

fn element_line(el: &ElementSnapshot) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("#{:<4}", el.id), Style::default().fg(Color::Yellow)),
        Span::styled(format!("{:<20}", el.name), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" in "),
    ];
    spans.extend(trit_spans(&el.inputs));
    spans.push(Span::raw("  out "));
    spans.extend(trit_spans(&el.outputs));
    match el.state {
        Some(ElementState::Latch(t)) => {
            spans.push(Span::raw("  q="));
            spans.push(Span::styled(t.to_string(), trit_style(t)));
        }
        Some(ElementState::Count { count, max }) => {
            spans.push(Span::styled(format!("  {}/{}", count, max), Style::default().fg(Color::Cyan)));
        }
        None => {}
    }
    Line::from(spans)
}

fn trit_spans(values: &[Trit]) -> Vec<Span<'static>> {
    if values.is_empty() {
        return vec![Span::styled("·", Style::default().fg(Color::DarkGray))];
    }
    values.iter().map(|t| Span::styled(t.to_string(), trit_style(*t))).collect()
}

/// Draw step counter and circuit size.
fn draw_summary(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let circuit = app.sim.circuit();
    let content = vec![
        Line::from(vec![
            Span::raw("Steps: "),
            Span::styled(format!("{}", app.sim.steps()), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::raw("Elements: "),
            Span::styled(format!("{}", circuit.len()), Style::default().fg(Color::White)),
            Span::raw("   Connections: "),
            Span::styled(format!("{}", circuit.connections().len()), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("Driver: "),
            Span::styled(
                if app.running { "running" } else { "stopped" },
                if app.running {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                },
            ),
            Span::raw(format!("   {} ms", app.interval.as_millis())),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Circuit ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause"),
        Line::from("x: Reset  ↑↓: Scroll  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

/// Get color style for a trit.
fn trit_style(t: Trit) -> Style {
    match t {
        Trit::N => Style::default().fg(Color::Red),
        Trit::O => Style::default().fg(Color::Gray),
        Trit::P => Style::default().fg(Color::Green),
    }
}

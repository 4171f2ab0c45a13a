use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context},
        Block, Borders, Paragraph, Widget,
    },
};
use time_humanize::HumanTime;
use unicode_width::UnicodeWidthStr;

use startype::session::Phase;

use crate::{App, Screen, ORBIT_SPAN};

const HORIZONTAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Playing => render_field(self, area, buf),
            Screen::GameOver => render_game_over(self, area, buf),
        }
    }
}

fn render_field(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Min(5), Constraint::Length(3)].as_ref())
        .split(area);

    let field = chunks[0];
    let targets = app.controller.snapshot();
    // One canvas unit per game unit; characters are ~2x taller than
    // wide, so x needs a width-aware nudge when centering text.
    let units_per_cell = ORBIT_SPAN / field.width.max(1) as f64;

    let title = format!(
        " score {}  ·  {} ",
        app.controller.score(),
        app.controller.difficulty()
    );
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_bounds([0.0, ORBIT_SPAN])
        .y_bounds([0.0, ORBIT_SPAN])
        .paint(move |ctx: &mut Context| {
            let half = ORBIT_SPAN / 2.0;
            ctx.print(
                half,
                half,
                Line::styled("((*))", Style::default().fg(Color::Yellow)),
            );
            for target in &targets {
                let (x, y) = target.position();
                let text = target.text().to_string();
                let offset = text.width() as f64 * units_per_cell / 2.0;
                // Canvas y grows upward; game y grows downward.
                ctx.print(
                    (x as f64 - offset).clamp(0.0, ORBIT_SPAN),
                    (ORBIT_SPAN - y as f64).clamp(0.0, ORBIT_SPAN),
                    Line::styled(text, Style::default().fg(Color::Cyan)),
                );
            }
        });
    canvas.render(field, buf);

    if app.controller.phase() == Phase::Paused {
        let overlay = Paragraph::new(Span::styled(
            "PAUSED - esc to resume",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        let row = Rect {
            x: field.x,
            y: field.y + field.height / 2,
            width: field.width,
            height: 1,
        };
        overlay.render(row, buf);
    }

    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" type a word, enter to fire · esc pauses "),
    );
    input.render(chunks[1], buf);
}

fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::styled(
            "GAME OVER",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(format!("final score: {}", app.controller.score())),
        Line::default(),
        Line::styled("top scores", Style::default().add_modifier(Modifier::BOLD)),
    ];

    if app.top_scores.is_empty() {
        lines.push(Line::from("no scores recorded yet"));
    }
    for (rank, entry) in app.top_scores.iter().enumerate() {
        let age_secs = (Local::now() - entry.recorded_at).num_seconds();
        lines.push(Line::from(format!(
            "{}. {} - {}  ({})",
            rank + 1,
            entry.name,
            entry.score,
            HumanTime::from(-age_secs),
        )));
    }

    lines.push(Line::default());
    if app.score_saved {
        lines.push(Line::styled(
            "saved! enter to play again · esc to quit",
            Style::default().fg(Color::Green),
        ));
    } else {
        lines.push(Line::from(format!("save as: {}", app.player_name)));
        lines.push(Line::from(
            "type to edit name · enter to save · esc to quit",
        ));
    }

    let vertical_pad = (area.height.saturating_sub(lines.len() as u16)) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(vertical_pad),
                Constraint::Min(lines.len() as u16),
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}

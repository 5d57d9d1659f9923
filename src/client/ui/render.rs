//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use crate::client::state::{ClientApp, ClientState};
use crate::models::Game;

use super::{name_entry, waiting_room};

pub(super) const TITLE: &str = "GAME LOBBY";

/// Render the client UI based on current state.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.state {
        ClientState::Connecting => render_connecting(frame, area, app),
        ClientState::NameEntry { .. } => name_entry::render(frame, area, app),
        ClientState::WaitingRoom(room) => waiting_room::render(frame, area, room),
        ClientState::Started { game } => render_started(frame, area, game),
        ClientState::Disconnected { message, alert } => {
            render_disconnected(frame, area, message, alert.as_deref())
        }
    }
}

fn centered(area: Rect, height: u16) -> Rect {
    Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(height),
        Constraint::Percentage(40),
    ])
    .split(area)[1]
}

fn title_line() -> Line<'static> {
    Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()))
}

fn render_connecting(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(
            format!("Connecting to {}...", app.server_url),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, centered(area, 7));
}

fn render_started(frame: &mut Frame, area: Rect, game: &Game) {
    let content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(
            "The game has started!",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from(Span::styled(
            format!("Game {} with {} players", game.code, game.players.len()),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press [Q] to exit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, centered(area, 9));
}

fn render_disconnected(frame: &mut Frame, area: Rect, message: &str, alert: Option<&str>) {
    let content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red).bold())),
        Line::from(""),
        Line::from(Span::styled(
            alert.unwrap_or(""),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(
            "Press [Q] to exit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, centered(area, 9));
}

//! Waiting room screen: join code, player list and the start control.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::badge::{Badge, BadgeVariant};
use crate::lobby::{MIN_PLAYERS, WaitingRoom};
use crate::models::{MAX_PLAYERS, Player};

use super::alert;
use super::render::TITLE;

/// Render the waiting room.
pub fn render(frame: &mut Frame, area: Rect, room: &WaitingRoom) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Length(6), // Game code
        Constraint::Min(5),    // Players
        Constraint::Length(1), // Waiting indicator
        Constraint::Length(3), // Start control
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0]);
    render_code(frame, chunks[1], room);
    render_players(frame, chunks[2], room);
    render_waiting(frame, chunks[3]);
    render_start(frame, chunks[4], room);
    render_controls(frame, chunks[5], room);

    if let Some(text) = room.alert() {
        alert::render(frame, area, text);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(
            "Waiting for players to join",
            Style::default().fg(Color::Gray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_code(frame: &mut Frame, area: Rect, room: &WaitingRoom) {
    let content = vec![
        Line::from(Span::styled("Game Code", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            room.game().code.as_str(),
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Share this code with other players",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(widget, area);
}

fn render_players(frame: &mut Frame, area: Rect, room: &WaitingRoom) {
    let players = &room.game().players;

    let lines: Vec<Line> = players
        .iter()
        .flat_map(|player| player_lines(player, player.user_id == room.user_id()))
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Players ({}/{}) ", players.len(), MAX_PLAYERS))
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn player_lines(player: &Player, is_you: bool) -> Vec<Line<'static>> {
    let name_style = if is_you {
        Style::default().fg(Color::Green).bold()
    } else {
        Style::default().fg(Color::White)
    };
    let ready = Badge::new("Ready")
        .variant(BadgeVariant::Secondary)
        .status("completed");

    let mut name_line = vec![
        Span::styled(format!("{:<18}", player.user.name), name_style),
        ready.to_span(),
    ];
    if is_you {
        name_line.push(Span::styled(" <- You", Style::default().fg(Color::Green)));
    }

    let mut lines = vec![Line::from(name_line)];
    if player.is_creator {
        lines.push(Line::from(vec![
            Span::styled("  ♛ ", Style::default().fg(Color::Yellow)),
            Span::styled("Game Creator", Style::default().fg(Color::DarkGray)),
        ]));
    }
    lines
}

fn render_waiting(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(Line::from(vec![
        Span::styled("● ● ● ", Style::default().fg(Color::Red)),
        Span::styled(
            "Waiting for more players...",
            Style::default().fg(Color::Gray),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_start(frame: &mut Frame, area: Rect, room: &WaitingRoom) {
    let style = if room.start_enabled() {
        Style::default().fg(Color::White).bg(Color::Red).bold()
    } else if room.start_state().is_pending() {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let widget = Paragraph::new(room.start_label())
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, room: &WaitingRoom) {
    let hint = if !room.is_creator() {
        "Waiting for the game creator to start"
    } else if room.game().players.len() < MIN_PLAYERS {
        "At least 2 players are needed to start"
    } else {
        "[S] start game"
    };

    let widget = Paragraph::new(format!("{}  ·  [Q] quit", hint))
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

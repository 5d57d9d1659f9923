//! Blocking alert shown over the current screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

pub fn render(frame: &mut Frame, area: Rect, text: &str) {
    let popup = popup_area(area, 50, 7);
    frame.render_widget(Clear, popup);

    let content = vec![
        Line::from(Span::styled(text, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error ")
                .title_style(Style::default().fg(Color::Red).bold())
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, popup);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

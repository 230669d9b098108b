//! Overlay rendering (notification, help popup, forms, playlist picker)

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::model::{FormState, NotificationKind, UiState};

use super::utils::centered_rect;

pub fn render_notification(frame: &mut Frame, ui_state: &UiState) {
    let Some(notification) = &ui_state.notification else {
        return;
    };
    let area = frame.area();

    let (color, title) = match notification.kind {
        NotificationKind::Error => (Color::Red, " Error (Esc to dismiss) "),
        NotificationKind::Info => (Color::Green, " Info "),
    };

    // Fixed width popup (responsive to screen size)
    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize; // account for borders

    // Calculate how many lines the message will take when wrapped
    let line_count = notification.message.chars().count().div_ceil(inner_width) as u16;

    // Height: top border (1) + message lines + bottom border (1)
    let popup_height = 2 + line_count.max(1);

    // Info sits at the bottom right, errors in the middle
    let popup_area = match notification.kind {
        NotificationKind::Error => centered_rect(area, popup_width, popup_height),
        NotificationKind::Info => {
            let mut rect = centered_rect(area, popup_width, popup_height);
            rect.x = area.width.saturating_sub(rect.width + 1);
            rect.y = area.height.saturating_sub(rect.height + 3);
            rect
        }
    };

    // Clear the area behind the popup first
    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(notification.message.clone())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(widget, popup_area);
}

pub fn render_form(frame: &mut Frame, form: &FormState) {
    let area = frame.area();
    // Each field takes a label line, a value line and a spacer
    let popup_height = form.fields.len() as u16 * 3 + 3;
    let popup_area = centered_rect(area, 56, popup_height);

    frame.render_widget(Clear, popup_area);

    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let shown = if field.masked {
            "•".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let cursor = if focused { "▏" } else { "" };

        lines.push(Line::from(Span::styled(field.label, label_style)));
        lines.push(Line::from(vec![
            Span::raw("> "),
            Span::styled(shown, Style::default().fg(Color::White)),
            Span::styled(cursor, Style::default().fg(Color::Green)),
        ]));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Tab next field · Enter submit · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", form.title()))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(widget, popup_area);
}

pub fn render_playlist_picker(frame: &mut Frame, ui_state: &UiState) {
    let area = frame.area();

    // Calculate popup size based on number of playlists
    let max_name_len = ui_state
        .playlists
        .iter()
        .map(|p| p.name.chars().count() + 4)
        .max()
        .unwrap_or(30);

    let popup_width = (max_name_len as u16 + 6).clamp(35, 60);
    let popup_height = (ui_state.playlists.len() as u16 + 2).max(6);
    let popup_area = centered_rect(area, popup_width, popup_height);

    // Clear the area behind the popup first
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = ui_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let style = if i == ui_state.picker_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("♫ {}", playlist.name)).style(style)
        })
        .collect();

    let title = match &ui_state.picker_track {
        Some(track) => format!(" Add \"{}\" to (↑↓ Enter Esc) ", track.title),
        None => " Add to playlist ".to_string(),
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.picker_selected));

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    // Define keybindings organized by category
    let keybindings = [
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓  j / k", "Move selection"),
        ("← / →", "Switch home row"),
        ("Enter", "Open / Play"),
        ("Backspace / Esc", "Go back"),
        ("/", "Focus search"),
        ("U", "Show queue"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N", "Next track"),
        ("P", "Previous track"),
        ("", ""),
        ("", "── Actions ──"),
        ("l", "Like / Unlike track"),
        ("E", "Add to queue"),
        ("A", "Add to playlist"),
        ("d / Delete", "Remove from queue or playlist"),
        ("C", "Create playlist"),
        ("I", "Import local files"),
        ("", ""),
        ("", "── General ──"),
        ("Shift+L", "Sign out"),
        ("?", "Toggle this help"),
        ("Q / Ctrl+C", "Quit"),
    ];

    let popup_height = keybindings.len() as u16 + 2;
    let popup_area = centered_rect(area, 62, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    // Create help text lines
    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (? or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}

//! Layout rendering (top bar, sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, UiState};

use super::utils::truncate_string;

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, device_name: &str) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(30), // Account
            Constraint::Length(25), // Device name
        ])
        .split(area);

    let search_active = ui_state.active_section == ActiveSection::Search;
    let search_style = if search_active {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Search for songs, artists... (/)"
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if search_active {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let account = match &ui_state.signed_in_as {
        Some(email) => truncate_string(email, chunks[1].width.saturating_sub(4) as usize),
        None => "Signed out".to_string(),
    };
    let account = Paragraph::new(account)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(" Account "));
    frame.render_widget(account, chunks[1]);

    let device = Paragraph::new(format!("🎵 {}", device_name))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Device "));
    frame.render_widget(device, chunks[2]);
}

fn item_style(is_selected: bool, is_focused: bool) -> Style {
    if is_selected && is_focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn section_border(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Library (4 items + 2 borderlines)
            Constraint::Min(0),    // Playlists (fills remaining space)
        ])
        .split(area);

    let library_focused = ui_state.active_section == ActiveSection::Library;
    let library_items: Vec<ListItem> = ui_state
        .library_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            ListItem::new(item.name.clone())
                .style(item_style(i == ui_state.library_selected, library_focused))
        })
        .collect();

    let library = List::new(library_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Library ")
            .padding(Padding::horizontal(1))
            .border_style(section_border(library_focused)),
    );
    frame.render_widget(library, chunks[0]);

    let playlists_focused = ui_state.active_section == ActiveSection::Playlists;
    let playlist_items: Vec<ListItem> = if ui_state.playlists.is_empty() {
        vec![ListItem::new("No playlists yet (c to create)").style(Style::default().fg(Color::DarkGray))]
    } else {
        ui_state
            .playlists
            .iter()
            .enumerate()
            .map(|(i, item)| {
                ListItem::new(item.name.clone())
                    .style(item_style(i == ui_state.playlist_selected, playlists_focused))
            })
            .collect()
    };

    let playlists = List::new(playlist_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Playlists ")
                .padding(Padding::horizontal(1))
                .border_style(section_border(playlists_focused)),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.playlist_selected));

    frame.render_stateful_widget(playlists, chunks[1], &mut list_state);
}

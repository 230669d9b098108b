//! Main content area rendering (home rows, search results, track lists)

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph, Wrap},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{
    ActiveSection, ContentState, ContentView, HomeRow, HomeRows, PlaylistDetail, Track, UiState,
};
use super::utils::{calculate_num_width, render_scrollable_list, truncate_string};

/// What every track row needs besides the track itself
struct RowContext<'a> {
    is_focused: bool,
    current_id: Option<&'a str>,
    liked: &'a HashSet<String>,
}

impl RowContext<'_> {
    fn border_style(&self) -> Style {
        if self.is_focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        }
    }
}

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    current_id: Option<&str>,
    liked: &HashSet<String>,
) {
    let ctx = RowContext {
        is_focused: ui_state.active_section == ActiveSection::MainContent,
        current_id,
        liked,
    };

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .border_style(ctx.border_style()),
            );
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => {
            let content = Paragraph::new("Open Home from the library or press / to search\n\nUse Tab to navigate between sections\nUse ↑/↓ to select items\nPress Enter to play\nPress ? for all keys")
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .padding(Padding::horizontal(1))
                        .border_style(ctx.border_style()),
                );
            frame.render_widget(content, area);
        }
        ContentView::Home { rows, row, selected_index } => {
            render_home(frame, area, rows, *row, *selected_index, &ctx);
        }
        ContentView::SearchResults { query, tracks, selected_index } => {
            let title = format!(" Results for \"{}\" ", query);
            let empty = format!("No results found for \"{}\"", query);
            render_track_list(frame, area, &title, &empty, tracks, *selected_index, &ctx);
        }
        ContentView::LikedSongs { tracks, selected_index } => {
            let title = format!(" Liked Songs ({}) ", tracks.len());
            render_track_list(
                frame,
                area,
                &title,
                "No liked songs yet. Songs you like will appear here (l).",
                tracks,
                *selected_index,
                &ctx,
            );
        }
        ContentView::LocalFiles { tracks, selected_index } => {
            render_track_list(
                frame,
                area,
                " Local Files ",
                "No local files imported. Press i to import files or folders.",
                tracks,
                *selected_index,
                &ctx,
            );
        }
        ContentView::Queue { currently_playing, queue, selected_index } => {
            render_queue(frame, area, currently_playing.as_ref(), queue, *selected_index, &ctx);
        }
        ContentView::PlaylistDetail { detail, selected_index } => {
            render_playlist_detail(frame, area, detail, *selected_index, &ctx);
        }
    }
}

fn render_home(
    frame: &mut Frame,
    area: Rect,
    rows: &HomeRows,
    row: HomeRow,
    selected_index: usize,
    ctx: &RowContext,
) {
    // Split into tabs area and content area
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Row tabs
            Constraint::Min(0),    // Tracks of the selected row
        ])
        .split(area);

    let tabs_content: Vec<Span> = HomeRow::ALL
        .iter()
        .flat_map(|tab| {
            let title = format!(" {} ({}) ", tab.title(), rows.row(*tab).len());
            let style = if *tab == row {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            vec![Span::styled(title, style), Span::raw("  ")]
        })
        .collect();

    let tabs = Paragraph::new(Line::from(tabs_content)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Home (←/→ to switch) ")
            .border_style(ctx.border_style()),
    );
    frame.render_widget(tabs, chunks[0]);

    render_track_list(
        frame,
        chunks[1],
        "",
        "Nothing here right now",
        rows.row(row),
        selected_index,
        ctx,
    );
}

fn render_track_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    empty_msg: &str,
    tracks: &[Track],
    selected_index: usize,
    ctx: &RowContext,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .padding(Padding::horizontal(1))
        .border_style(ctx.border_style());

    if tracks.is_empty() {
        let empty = Paragraph::new(format!("  {}", empty_msg))
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let refs: Vec<&Track> = tracks.iter().collect();
    let items = track_items(&refs, selected_index, ctx, content_width);

    // +1 for header row
    render_scrollable_list(frame, area, items, selected_index + 1, block);
}

fn render_playlist_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &PlaylistDetail,
    selected_index: usize,
    ctx: &RowContext,
) {
    let description = detail.playlist.description.as_deref().unwrap_or("");
    let header_height = if description.is_empty() { 3 } else { 4 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(0)])
        .split(area);

    let mut lines = vec![Line::from(vec![
        Span::styled(
            detail.playlist.name.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} song(s)", detail.entries.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    if !description.is_empty() {
        lines.push(Line::from(Span::styled(
            description.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }

    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Playlist (Esc to go back) ")
            .padding(Padding::horizontal(1))
            .border_style(ctx.border_style()),
    );
    frame.render_widget(header, chunks[0]);

    let tracks: Vec<Track> = detail.entries.iter().map(|e| e.song_data.clone()).collect();
    render_track_list(
        frame,
        chunks[1],
        "",
        "No songs in this playlist yet. Add one with a.",
        &tracks,
        selected_index,
        ctx,
    );
}

fn render_queue(
    frame: &mut Frame,
    area: Rect,
    currently_playing: Option<&Track>,
    queue: &[Track],
    selected_index: usize,
    ctx: &RowContext,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Now playing
            Constraint::Min(0),    // Next up
        ])
        .split(area);

    let now_playing = match currently_playing {
        Some(track) => Line::from(vec![
            Span::styled(
                format!("▶ {}", track.title),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" - "),
            Span::styled(track.artist.clone(), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("  {}", track.duration_label),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        None => Line::from(Span::styled(
            "Nothing playing",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let now_playing = Paragraph::new(now_playing).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Now Playing ")
            .padding(Padding::horizontal(1))
            .border_style(ctx.border_style()),
    );
    frame.render_widget(now_playing, chunks[0]);

    let title = format!(
        " Next Up ({} {}) (Del to remove) ",
        queue.len(),
        if queue.len() == 1 { "song" } else { "songs" }
    );
    render_track_list(
        frame,
        chunks[1],
        &title,
        "Queue is empty. Add tracks with e.",
        queue,
        selected_index,
        ctx,
    );
}

fn track_items(
    tracks: &[&Track],
    selected_index: usize,
    ctx: &RowContext,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(tracks.len());
    let liked_width = 2;
    let duration_width = 8;
    let fixed_width = 1 + num_width + 3 + liked_width + 3 + 3 + 3 + duration_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let artist_width = remaining_width.saturating_sub(title_width);

    // Create header as first item
    let mut items = vec![
        ListItem::new(format!(
            " {:<num_width$}   {}   {:<title_width$}   {:<artist_width$}   {}",
            "#", "  ", "Title", "Artist", "Duration",
            num_width = num_width,
            title_width = title_width,
            artist_width = artist_width
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    ];

    let track_items = tracks.iter().enumerate().map(|(i, track)| {
        let is_playing = ctx.current_id == Some(track.id.as_str());
        let style = if i == selected_index && ctx.is_focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_playing {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if i == selected_index {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let liked_indicator = if ctx.liked.contains(&track.id) { "💚" } else { "  " };
        let playing_indicator = if is_playing { "▶" } else { " " };
        let track_num = format!("{}{:<num_width$}", playing_indicator, i + 1, num_width = num_width);

        let title_str = truncate_string(&track.title, title_width);
        let artist_str = truncate_string(&track.artist, artist_width);

        ListItem::new(format!(
            "{}   {}   {}   {}   {}",
            track_num, liked_indicator, title_str, artist_str, track.duration_label
        ))
        .style(style)
    });

    items.extend(track_items);
    items
}

//! Now-playing bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::track::format_clock;
use crate::model::PlaybackInfo;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let Some(track) = &playback.track else {
        let idle = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" No track playing "))
            .gauge_style(Style::default().fg(Color::DarkGray))
            .ratio(0.0)
            .label("");
        frame.render_widget(idle, area);
        return;
    };

    let icon = if playback.is_playing { " ▶" } else { "⏸ " };
    let heart = if playback.liked { " 💚" } else { "" };
    let title = format!("{} {} | {}{} ", icon, track.title, track.artist, heart);

    let time_str = format!(
        "{} / {}",
        format_clock(playback.elapsed_secs),
        format_clock(playback.duration_secs)
    );

    let progress_ratio = if playback.duration_secs > 0 {
        (playback.elapsed_secs as f64 / playback.duration_secs as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let controls_info = format!(" Queue: {} | ? for help ", playback.queue_len);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}

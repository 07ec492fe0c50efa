//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It is
//! a pure view: it reads the app state and the transient input mode and
//! owns nothing of its own.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, ToastKind};
use crate::config::Settings;
use crate::playback::{PlaybackInfo, format_duration};

/// The transient edit state driving the input line. Owned by the event
/// loop; the view only renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a file or directory path to add.
    AddPath { buffer: String },
    /// Renaming a folder; Enter commits, Escape reverts.
    RenameFolder { folder_id: u64, buffer: String },
    /// Editing the seek time field; while active the field shows the
    /// buffer, not the live position.
    SeekText { buffer: String },
    ConfirmRemoveTrack { track_id: u64 },
    ConfirmRemoveFolder { folder_id: u64 },
    ConfirmClear,
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    input: &InputMode,
    playback: &PlaybackInfo,
    settings: &Settings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], settings);
    draw_queue(frame, chunks[1], app);
    draw_playback(frame, chunks[2], app, input, playback);
    draw_status(frame, chunks[3], app, input);
    draw_footer(frame, chunks[4], settings);
    draw_toast(frame, chunks[1], app);
}

fn draw_header(frame: &mut Frame, area: Rect, settings: &Settings) {
    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" attacca ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, area);
}

fn draw_queue(frame: &mut Frame, area: Rect, app: &App) {
    let mut items: Vec<ListItem> = Vec::new();
    let mut selected_row: Option<usize> = None;

    for folder in &app.folders {
        let marker = if folder.is_open { "▾" } else { "▸" };
        let mut folder_style = Style::default();
        if app.selected_folder_id == Some(folder.id) {
            folder_style = folder_style.add_modifier(Modifier::BOLD);
        }
        items.push(
            ListItem::new(format!("{marker} {} ({})", folder.name, folder.items.len()))
                .style(folder_style),
        );

        if !folder.is_open {
            continue;
        }

        for track in &folder.items {
            let play_marker = if app.playing_id == Some(track.id) {
                if app.primitive_paused { "‖ " } else { "▶ " }
            } else {
                "  "
            };
            let duration = track
                .duration_seconds
                .map(format_duration)
                .unwrap_or_else(|| "--:--".to_string());

            if app.selected_id == Some(track.id) {
                selected_row = Some(items.len());
            }
            items.push(ListItem::new(format!(
                "  {play_marker}{}  [{duration}]",
                track.display
            )));
        }
    }

    let title = format!(" queue • {} ", app.queue_summary());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ratatui::widgets::ListState::default();
    state.select(selected_row);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_playback(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    input: &InputMode,
    playback: &PlaybackInfo,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .margin(1)
        .split(area);

    let block = Block::default().borders(Borders::ALL).title(" playback ");
    frame.render_widget(block, area);

    frame.render_widget(Paragraph::new(app.now_playing_line()), rows[0]);

    let elapsed = playback.elapsed.as_secs_f64();
    let total = app.playing_duration();

    // The editable seek field shows the edit buffer while it has focus;
    // everything else keeps tracking the live position.
    let position_text = match input {
        InputMode::SeekText { buffer } => format!("[{buffer}█]"),
        _ => format_duration(elapsed.min(total.unwrap_or(elapsed))),
    };

    match total {
        Some(total) if total > 0.0 => {
            let ratio = (elapsed / total).clamp(0.0, 1.0);
            let gauge = Gauge::default()
                .ratio(ratio)
                .label(format!("{position_text} / {}", format_duration(total)))
                .gauge_style(Style::default().fg(Color::Cyan));
            frame.render_widget(gauge, rows[1]);
        }
        _ => {
            // Unknown or non-positive duration: a disabled, zeroed timeline.
            let gauge = Gauge::default()
                .ratio(0.0)
                .label(format!("{position_text} / 00:00"))
                .gauge_style(Style::default().fg(Color::DarkGray));
            frame.render_widget(gauge, rows[1]);
        }
    }
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App, input: &InputMode) {
    let text = match input {
        InputMode::Normal => {
            let volume = (app.volume * 100.0).round() as u32;
            let persistence = if app.persistence_enabled {
                ""
            } else {
                " • local save disabled"
            };
            format!("{} • vol {volume}%{persistence}", app.status)
        }
        InputMode::AddPath { buffer } => format!("Add path: {buffer}█"),
        InputMode::RenameFolder { buffer, .. } => format!("Rename folder: {buffer}█"),
        InputMode::SeekText { buffer } => {
            format!("Seek to (ss, mm:ss or hh:mm:ss): {buffer}█")
        }
        InputMode::ConfirmRemoveTrack { track_id } => {
            let name = app.track_display(*track_id).unwrap_or("track");
            format!("Remove \"{name}\" from queue? (y/n)")
        }
        InputMode::ConfirmRemoveFolder { folder_id } => {
            let name = app
                .folders
                .iter()
                .find(|f| f.id == *folder_id)
                .map(|f| f.name.as_str())
                .unwrap_or("folder");
            format!("Delete folder \"{name}\" and its tracks? (y/n)")
        }
        InputMode::ConfirmClear => "Clear all folders and tracks? (y/n)".to_string(),
    };

    let status = Paragraph::new(text)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, settings: &Settings) {
    let footer_text = format!(
        "[j/k] select | [J/K] move | [m] to folder end | [enter/space] play/pause | [x] stop | \
         [←/→] seek -/+{}s | [t] seek to | [+/-] volume | [a] add | [n] folder | [o] open/close | \
         [ [/] ] folder select | [r] rename | [d] remove | [D] del folder | [c] clear | \
         [R] reset saved | [q] quit",
        settings.controls.seek_seconds
    );
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, area);
}

fn draw_toast(frame: &mut Frame, list_area: Rect, app: &App) {
    let Some(toast) = &app.toast else {
        return;
    };

    let style = match toast.kind {
        ToastKind::Saved => Style::default().fg(Color::Green),
        ToastKind::Saving => Style::default().fg(Color::Yellow),
        ToastKind::Error => Style::default().fg(Color::Red),
    };

    // Pin the toast to the top-right corner of the queue area.
    let width = (toast.message.chars().count() as u16 + 4)
        .min(list_area.width.saturating_sub(2))
        .max(10);
    let popup = Rect {
        x: list_area.x + list_area.width.saturating_sub(width + 1),
        y: list_area.y + 1,
        width,
        height: 3,
    };

    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(toast.message.as_str())
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, popup);
}

//! Main weather screen
//!
//! Lays out the city input, the suggestion list, the current-weather and
//! forecast panels, and the toast line. Everything shown comes from
//! `ViewState`; nothing here mutates state.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::notify::{Toast, ToastKind};
use crate::view::{Focus, Theme, ViewState};

/// Colours used for one theme
struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    muted: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            muted: Color::Gray,
        },
        Theme::Dark => Palette {
            fg: Color::White,
            bg: Color::Black,
            accent: Color::Cyan,
            muted: Color::DarkGray,
        },
    }
}

/// Renders the whole screen
pub fn render(frame: &mut Frame, view: &ViewState, toast: Option<&Toast>) {
    let colors = palette(view.theme);
    let base = Style::default().fg(colors.fg).bg(colors.bg);
    let area = frame.area();
    frame.render_widget(Block::default().style(base), area);

    // Suggestions take space only while there are any
    let suggestion_height = if view.suggestions.is_empty() {
        0
    } else {
        view.suggestions.len() as u16 + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(suggestion_height),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_input(frame, chunks[0], view, &colors);
    if !view.suggestions.is_empty() {
        render_suggestions(frame, chunks[1], view, &colors);
    }
    render_panels(frame, chunks[2], view, &colors);
    render_status(frame, chunks[3], toast, &colors);
}

fn render_input(frame: &mut Frame, area: Rect, view: &ViewState, colors: &Palette) {
    let border = if view.focus == Focus::Input {
        colors.accent
    } else {
        colors.muted
    };

    let text = if view.input.is_empty() {
        Span::styled("Enter city name", Style::default().fg(colors.muted))
    } else {
        Span::raw(view.input.clone())
    };

    let block = Block::default()
        .title(" City ")
        .title_top(Line::from(format!(" {} ", view.theme.icon())).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);
}

fn render_suggestions(frame: &mut Frame, area: Rect, view: &ViewState, colors: &Palette) {
    let items: Vec<ListItem> = view
        .suggestions
        .iter()
        .map(|s| ListItem::new(s.display_name.clone()))
        .collect();

    let mut state = ListState::default();
    if view.focus == Focus::Suggestions {
        state.select(Some(view.selected_suggestion));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.muted)),
        )
        .highlight_style(
            Style::default()
                .fg(colors.bg)
                .bg(colors.accent)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_panels(frame: &mut Frame, area: Rect, view: &ViewState, colors: &Palette) {
    let Some(panels) = &view.panels else {
        let empty = Paragraph::new("No weather data yet").style(Style::default().fg(colors.muted));
        frame.render_widget(empty, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(33), Constraint::Percentage(67)])
        .split(area);

    let current = Paragraph::new(vec![
        Line::from(panels.current.temperature.clone()),
        Line::from(panels.current.wind_speed.clone()),
    ])
    .block(
        Block::default()
            .title(format!(" {} ", panels.current.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.accent)),
    );
    frame.render_widget(current, columns[0]);

    let items: Vec<ListItem> = panels
        .forecast
        .iter()
        .map(|line| ListItem::new(line.clone()))
        .collect();
    let forecast = List::new(items).block(
        Block::default()
            .title(" Weekly Forecast ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.accent)),
    );
    frame.render_widget(forecast, columns[1]);
}

fn render_status(frame: &mut Frame, area: Rect, toast: Option<&Toast>, colors: &Palette) {
    let line = match toast {
        Some(toast) => {
            let color = match toast.kind {
                ToastKind::Success => Color::Green,
                ToastKind::Error => Color::Red,
            };
            Line::from(Span::styled(
                toast.message.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(Span::styled(
            "F1 help  Ctrl+T theme  Esc quit",
            Style::default().fg(colors.muted),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

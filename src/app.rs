//! Application state for the wxlookup terminal UI
//!
//! Routes key presses to the controller and tracks what only the terminal
//! front-end cares about: the help overlay and whether to quit.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;
use crate::controller::Controller;
use crate::view::Focus;

/// Main application struct
pub struct App {
    /// Weather lookup controller owning the view state
    pub controller: Controller,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
}

impl App {
    /// Creates a new App using the given configuration
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            controller: Controller::new(config)?,
            should_quit: false,
            show_help: false,
        })
    }

    /// Handles a key press
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::F(1) => self.show_help = false,
                KeyCode::Char('c') if ctrl => self.should_quit = true,
                _ => {} // Ignore other keys when help is shown
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('t') if ctrl => self.controller.toggle_theme(),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.show_help = true,
            // "Get Weather" button
            KeyCode::F(5) => self.controller.submit_query(),
            _ => match self.controller.view.focus {
                Focus::Input => self.handle_input_key(key_event),
                Focus::Suggestions => self.handle_suggestion_key(key_event),
            },
        }
    }

    fn handle_input_key(&mut self, key_event: KeyEvent) {
        let view = &mut self.controller.view;
        match key_event.code {
            KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                view.input.push(c);
                self.controller.submit_query();
            }
            KeyCode::Backspace => {
                if view.input.pop().is_some() {
                    self.controller.submit_query();
                }
            }
            KeyCode::Enter => self.controller.submit_query(),
            KeyCode::Down | KeyCode::Tab => {
                if !view.suggestions.is_empty() {
                    view.focus = Focus::Suggestions;
                    view.selected_suggestion = 0;
                }
            }
            _ => {}
        }
    }

    fn handle_suggestion_key(&mut self, key_event: KeyEvent) {
        let view = &mut self.controller.view;
        match key_event.code {
            KeyCode::Up => {
                if view.selected_suggestion == 0 {
                    view.focus = Focus::Input;
                } else {
                    view.selected_suggestion -= 1;
                }
            }
            KeyCode::Down => {
                if view.selected_suggestion + 1 < view.suggestions.len() {
                    view.selected_suggestion += 1;
                }
            }
            KeyCode::Tab => view.focus = Focus::Input,
            KeyCode::Enter => {
                let index = view.selected_suggestion;
                self.controller.select_suggestion(index);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CitySuggestion;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app() -> App {
        App::new(Config {
            locate_on_start: false,
            ..Config::default()
        })
        .expect("app should build")
    }

    fn with_suggestions(app: &mut App, names: &[&str]) {
        app.controller.view.set_suggestions(
            names
                .iter()
                .map(|name| CitySuggestion {
                    display_name: name.to_string(),
                    latitude: 1.0,
                    longitude: 2.0,
                })
                .collect(),
        );
    }

    #[tokio::test]
    async fn test_typing_edits_input() {
        let mut app = app();
        for c in "Lyon".chars() {
            app.handle_key(key_event(KeyCode::Char(c)));
        }
        app.handle_key(key_event(KeyCode::Backspace));

        assert_eq!(app.controller.view.input, "Lyo");
    }

    #[tokio::test]
    async fn test_esc_quits() {
        let mut app = app();
        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_help() {
        let mut app = app();
        app.handle_key(key_event(KeyCode::F(1)));
        assert!(app.show_help);
        app.handle_key(ctrl('c'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_help_swallows_keys() {
        let mut app = app();
        app.handle_key(key_event(KeyCode::F(1)));
        app.handle_key(key_event(KeyCode::Char('x')));
        assert!(app.controller.view.input.is_empty());

        app.handle_key(key_event(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_ctrl_t_toggles_theme_without_typing() {
        let mut app = app();
        app.handle_key(ctrl('t'));
        assert!(app.controller.view.theme.is_dark());
        assert!(app.controller.view.input.is_empty());

        app.handle_key(ctrl('t'));
        assert!(!app.controller.view.theme.is_dark());
    }

    #[tokio::test]
    async fn test_down_moves_focus_into_suggestions() {
        let mut app = app();
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.controller.view.focus, Focus::Input);

        with_suggestions(&mut app, &["Lyon, France", "Lyons, Colorado"]);
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.controller.view.focus, Focus::Suggestions);

        app.handle_key(key_event(KeyCode::Down));
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.controller.view.selected_suggestion, 1);

        app.handle_key(key_event(KeyCode::Up));
        app.handle_key(key_event(KeyCode::Up));
        assert_eq!(app.controller.view.focus, Focus::Input);
    }

    #[tokio::test]
    async fn test_enter_on_suggestion_selects_it() {
        let mut app = app();
        with_suggestions(&mut app, &["Lyon, France", "Lyons, Colorado"]);

        app.handle_key(key_event(KeyCode::Down));
        app.handle_key(key_event(KeyCode::Down));
        app.handle_key(key_event(KeyCode::Enter));

        let view = &app.controller.view;
        assert_eq!(view.input, "Lyons, Colorado");
        assert!(view.suggestions.is_empty());
        assert_eq!(view.focus, Focus::Input);
    }
}

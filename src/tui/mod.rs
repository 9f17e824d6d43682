pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::task::JoinHandle;

use crate::payload::ScoringRequest;
use crate::scoring::{self, RawScoringResponse, ScoringClient, SubmitFailure};
use crate::wizard::{Phase, SessionToken};
use event::{Event, EventHandler};

/// Run the questionnaire TUI until the user quits.
///
/// The event loop is the single writer of the wizard state. The scoring
/// round trip runs as a background task whose JoinHandle is polled each
/// pass; its outcome is applied through the session-token check, so a
/// response that outlives a restart is discarded instead of landing in
/// the new session.
pub async fn run_tui<C>(mut app: App, client: C) -> anyhow::Result<()>
where
    C: ScoringClient + Clone + Send + 'static,
{
    let mut terminal = ratatui::init();

    // 100ms tick keeps the score animation and spinner smooth.
    let mut events = EventHandler::new(100);

    let mut pending_submit: Option<(
        SessionToken,
        JoinHandle<Result<RawScoringResponse, SubmitFailure>>,
    )> = None;

    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        match events.next().await {
            Event::Key(key) => {
                if let Some((request, token)) = handle_key_event(&mut app, key) {
                    let task_client = client.clone();
                    pending_submit = Some((
                        token,
                        tokio::spawn(async move { task_client.submit(request).await }),
                    ));
                }
            }
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Check if the background submission has completed
        if let Some((_, handle)) = &mut pending_submit {
            if handle.is_finished() {
                let (token, handle) = pending_submit.take().unwrap();
                let outcome = match handle.await {
                    Ok(Ok(raw)) => Ok(scoring::normalize(&raw)),
                    Ok(Err(failure)) => Err(failure.to_string()),
                    Err(e) => Err(format!("scoring task failed: {}", e)),
                };
                // Stale outcomes (restart happened meanwhile) are dropped
                // inside apply_submission.
                app.apply_submission(token, outcome);
            }
        }

        if app.should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

/// Route a key press. Returns the request to send when the final advance
/// started a submission.
fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<(ScoringRequest, SessionToken)> {
    // Ctrl-C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return None;
    }

    match app.wizard.phase {
        Phase::Active => {
            if app.is_number_step() {
                handle_number_key(app, key)
            } else {
                handle_options_key(app, key)
            }
        }
        Phase::Submitting => {
            // A second submission attempt is refused, not buffered; only
            // quitting is allowed while the request is in flight.
            if key.code == KeyCode::Char('q') {
                app.should_quit = true;
            }
            None
        }
        Phase::Finished(_) => {
            match key.code {
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('r') => app.restart(),
                KeyCode::Char('x') => {
                    if !app.feedback_flag.is_dismissed() {
                        app.dismiss_feedback();
                    }
                }
                _ => {}
            }
            None
        }
        Phase::Failed(_) => {
            match key.code {
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('r') => app.restart(),
                _ => {}
            }
            None
        }
    }
}

fn handle_options_key(app: &mut App, key: KeyEvent) -> Option<(ScoringRequest, SessionToken)> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_cursor_down();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_cursor_up();
            None
        }

        // Select without advancing
        KeyCode::Char(' ') => {
            app.select_highlighted();
            None
        }

        // Quick pick by number
        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
            app.select_index(c.to_digit(10).unwrap() as usize);
            None
        }

        // Select highlighted and move on
        KeyCode::Enter => {
            app.select_highlighted();
            app.advance()
        }

        // Back
        KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
            app.retreat();
            None
        }

        _ => None,
    }
}

fn handle_number_key(app: &mut App, key: KeyEvent) -> Option<(ScoringRequest, SessionToken)> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }

        KeyCode::Enter => app.advance(),

        KeyCode::Esc => {
            app.retreat();
            None
        }

        KeyCode::Backspace => {
            app.pop_input_char();
            None
        }

        // Digits plus either decimal separator
        KeyCode::Char(c) if c.is_ascii_digit() || c == ',' || c == '.' => {
            app.push_input_char(c);
            None
        }

        // Ignore everything else (don't propagate to option handling)
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feedback::FeedbackFlag;
    use crate::registry::QuestionKind;
    use crossterm::event::KeyEvent;
    use std::path::PathBuf;

    fn test_app() -> App {
        App::new(Config::default(), FeedbackFlag::new(), PathBuf::new())
    }

    fn press(app: &mut App, code: KeyCode) -> Option<(ScoringRequest, SessionToken)> {
        handle_key_event(app, KeyEvent::from(code))
    }

    /// Walk the whole catalog with valid keys; the final Enter must yield
    /// exactly one submission request.
    fn complete_questionnaire(app: &mut App) -> (ScoringRequest, SessionToken) {
        loop {
            let question = app.wizard.current_question().unwrap();
            let outcome = match question.kind {
                QuestionKind::Choice { .. } | QuestionKind::Scale { .. } => {
                    press(app, KeyCode::Enter)
                }
                QuestionKind::Number { .. } => {
                    press(app, KeyCode::Char('3'));
                    press(app, KeyCode::Enter)
                }
            };
            if let Some(submit) = outcome {
                return submit;
            }
        }
    }

    #[test]
    fn test_enter_selects_and_advances() {
        let mut app = test_app();
        assert!(press(&mut app, KeyCode::Enter).is_none());
        assert_eq!(app.wizard.step_index, 1);
        assert!(app.wizard.answers.contains_key("gender"));
    }

    #[test]
    fn test_full_walk_produces_submission() {
        let mut app = test_app();
        let (request, _) = complete_questionnaire(&mut app);
        assert_eq!(app.wizard.phase, Phase::Submitting);
        assert_eq!(request.len(), 15);
        assert!(request.values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_keys_refused_while_submitting() {
        let mut app = test_app();
        complete_questionnaire(&mut app);
        assert!(press(&mut app, KeyCode::Enter).is_none());
        assert_eq!(app.wizard.phase, Phase::Submitting);
    }

    #[test]
    fn test_escape_goes_back_without_clearing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.wizard.step_index, 0);
        assert!(app.wizard.answers.contains_key("gender"));
    }

    #[test]
    fn test_number_step_ignores_letters() {
        let mut app = test_app();
        // gender, hometown, income then ssc_grade
        for _ in 0..3 {
            press(&mut app, KeyCode::Enter);
        }
        assert!(app.is_number_step());
        press(&mut app, KeyCode::Char('a'));
        assert!(app.input.is_empty());
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char(','));
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.input, "4,5");
    }
}

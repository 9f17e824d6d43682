use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::feedback::{self, FeedbackFlag};
use crate::payload::ScoringRequest;
use crate::present::ScoreAnimation;
use crate::registry::{Answer, QuestionKind};
use crate::scoring::CanonicalResult;
use crate::wizard::{
    AdvanceOutcome, CompletionOutcome, Phase, SessionToken, WizardState,
};

pub struct App {
    pub wizard: WizardState,
    pub config: Config,
    /// Highlighted option index for Choice/Scale questions.
    pub cursor: usize,
    /// Text buffer for Number questions; mirrors the stored answer.
    pub input: String,
    /// Score bar animation for the current session's result view.
    pub animation: Option<ScoreAnimation>,
    pub feedback_flag: FeedbackFlag,
    pub feedback_path: PathBuf,
    pub flash_message: Option<(String, Instant)>,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, feedback_flag: FeedbackFlag, feedback_path: PathBuf) -> Self {
        let mut app = Self {
            wizard: WizardState::new(),
            config,
            cursor: 0,
            input: String::new(),
            animation: None,
            feedback_flag,
            feedback_path,
            flash_message: None,
            spinner_frame: 0,
            should_quit: false,
        };
        app.sync_step();
        app
    }

    /// Option labels for the current question: declared options for
    /// Choice, the integer range for Scale, empty for Number.
    pub fn option_labels(&self) -> Vec<String> {
        match self.wizard.current_question().map(|q| &q.kind) {
            Some(QuestionKind::Choice { options }) => {
                options.iter().map(|o| o.to_string()).collect()
            }
            Some(QuestionKind::Scale { min, max }) => {
                (*min..=*max).map(|n| n.to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn is_number_step(&self) -> bool {
        matches!(
            self.wizard.current_question().map(|q| &q.kind),
            Some(QuestionKind::Number { .. })
        )
    }

    /// Align cursor and input buffer with whatever answer is already
    /// stored for the step being shown, so re-visited steps show the
    /// prior answer.
    pub fn sync_step(&mut self) {
        self.cursor = 0;
        self.input.clear();

        let Some(question) = self.wizard.current_question() else {
            return;
        };
        let Some(answer) = self.wizard.answers.get(question.id) else {
            return;
        };

        match (&question.kind, answer) {
            (QuestionKind::Choice { options }, Answer::Text(text)) => {
                if let Some(pos) = options.iter().position(|o| *o == text.as_str()) {
                    self.cursor = pos;
                }
            }
            (QuestionKind::Scale { min, .. }, Answer::Number(n)) => {
                let offset = (*n as i64).saturating_sub(*min);
                if offset >= 0 {
                    self.cursor = offset as usize;
                }
            }
            (QuestionKind::Number { .. }, Answer::Number(n)) => {
                self.input = format_input_number(*n);
            }
            (QuestionKind::Number { .. }, Answer::Text(text)) => {
                self.input = text.clone();
            }
            _ => {}
        }
    }

    pub fn move_cursor_down(&mut self) {
        let count = self.option_labels().len();
        if count == 0 {
            return;
        }
        self.cursor = if self.cursor + 1 >= count {
            0
        } else {
            self.cursor + 1
        };
    }

    pub fn move_cursor_up(&mut self) {
        let count = self.option_labels().len();
        if count == 0 {
            return;
        }
        self.cursor = if self.cursor == 0 {
            count - 1
        } else {
            self.cursor - 1
        };
    }

    /// Store the highlighted option as the answer to the current question.
    pub fn select_highlighted(&mut self) {
        let labels = self.option_labels();
        let Some(label) = labels.get(self.cursor) else {
            return;
        };
        if let Some(question) = self.wizard.current_question() {
            let id = question.id;
            self.wizard.select_answer(id, label);
        }
    }

    /// Jump-select the nth option (1-based, from a digit key).
    pub fn select_index(&mut self, n: usize) {
        let labels = self.option_labels();
        if n >= 1 && n <= labels.len() {
            self.cursor = n - 1;
            self.select_highlighted();
        }
    }

    pub fn push_input_char(&mut self, c: char) {
        if !self.is_number_step() {
            return;
        }
        self.input.push(c);
        self.store_input();
    }

    pub fn pop_input_char(&mut self) {
        if !self.is_number_step() {
            return;
        }
        self.input.pop();
        self.store_input();
    }

    fn store_input(&mut self) {
        if let Some(question) = self.wizard.current_question() {
            let id = question.id;
            let raw = self.input.clone();
            self.wizard.select_answer(id, &raw);
        }
    }

    /// Try to move forward. On the last step this starts the submission;
    /// the caller spawns the round trip and reports back through
    /// `apply_submission`.
    pub fn advance(&mut self) -> Option<(ScoringRequest, SessionToken)> {
        match self.wizard.advance() {
            AdvanceOutcome::Stepped => {
                self.sync_step();
                None
            }
            AdvanceOutcome::SubmitStarted(request, token) => Some((request, token)),
            AdvanceOutcome::Rejected => {
                if let Some(hint) = self.wizard.validation_hint() {
                    self.show_flash(hint);
                }
                None
            }
        }
    }

    pub fn retreat(&mut self) {
        self.wizard.retreat();
        self.sync_step();
    }

    pub fn restart(&mut self) {
        self.wizard.restart();
        self.animation = None;
        self.sync_step();
        self.show_flash("Questionnaire restarted".to_string());
    }

    /// Apply a finished submission. Stale outcomes (the session was
    /// restarted while the request was in flight) are dropped without
    /// touching state.
    pub fn apply_submission(
        &mut self,
        token: SessionToken,
        outcome: Result<CanonicalResult, String>,
    ) -> CompletionOutcome {
        let applied = self.wizard.complete_submission(token, outcome);
        if applied == CompletionOutcome::Applied {
            if let Phase::Finished(result) = &self.wizard.phase {
                self.animation = Some(ScoreAnimation::new(
                    result.self_discipline_percent,
                    self.config.score_animation,
                ));
            }
        }
        applied
    }

    /// The score value currently shown on the bar.
    pub fn displayed_score(&self) -> f64 {
        self.animation.as_ref().map(|a| a.value()).unwrap_or(0.0)
    }

    pub fn dismiss_feedback(&mut self) {
        self.feedback_flag.dismiss();
        if let Err(e) = feedback::save_feedback_flag(&self.feedback_path, &self.feedback_flag) {
            self.show_flash(format!("Failed to save feedback flag: {}", e));
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}

fn format_input_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_app() -> App {
        App::new(Config::default(), FeedbackFlag::new(), PathBuf::new())
    }

    #[test]
    fn test_select_highlighted_stores_option_text() {
        let mut app = test_app();
        app.move_cursor_down();
        app.select_highlighted();

        let question = app.wizard.current_question().unwrap();
        let answer = app.wizard.answers.get(question.id).unwrap();
        assert_eq!(answer, &Answer::Text("Female".to_string()));
    }

    #[test]
    fn test_revisited_step_restores_cursor() {
        let mut app = test_app();
        app.select_index(3);
        assert!(app.advance().is_none());

        app.retreat();
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn test_number_input_mirrors_to_answers() {
        let mut app = test_app();
        // Walk to the first Number question (ssc_grade, step 3).
        for _ in 0..3 {
            app.select_highlighted();
            app.advance();
        }
        assert!(app.is_number_step());

        for c in "4,17".chars() {
            app.push_input_char(c);
        }
        let question = app.wizard.current_question().unwrap();
        assert_eq!(
            app.wizard.answers.get(question.id),
            Some(&Answer::Number(4.17))
        );
        assert!(app.wizard.can_advance());
    }

    #[test]
    fn test_rejected_advance_flashes_hint() {
        let mut app = test_app();
        assert!(app.advance().is_none());
        // No answer yet: no hint text, but also no panic and no step change.
        assert_eq!(app.wizard.step_index, 0);
    }

    #[test]
    fn test_restart_clears_animation() {
        let mut app = test_app();
        app.animation = Some(ScoreAnimation::new(
            50.0,
            std::time::Duration::from_millis(900),
        ));
        app.restart();
        assert!(app.animation.is_none());
    }
}

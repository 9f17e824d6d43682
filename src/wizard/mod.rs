//! Questionnaire state machine.
//!
//! `WizardState` is a plain serializable value with transition methods; it
//! never touches the network. `advance()` on the last step hands the built
//! request and a session token to the caller, which performs the round trip
//! and reports back through `complete_submission`. Responses carrying a
//! token from a session that has since been restarted are discarded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::payload::{self, ScoringRequest};
use crate::registry::{self, Answer, QuestionDefinition};
use crate::scoring::CanonicalResult;

pub type AnswerMap = HashMap<String, Answer>;

/// Opaque tag distinguishing one submission/session instance from the
/// next. Bumped on every restart so late responses can be attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "data", rename_all = "snake_case")]
pub enum Phase {
    Active,
    Submitting,
    Finished(CanonicalResult),
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardState {
    pub step_index: usize,
    pub answers: AnswerMap,
    pub phase: Phase,
    session: SessionToken,
}

/// What `advance()` did.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Moved to the next question.
    Stepped,
    /// Last question answered; the caller must send this request and
    /// report the outcome with the token.
    SubmitStarted(ScoringRequest, SessionToken),
    /// Current answer invalid, or a submission is already in flight.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Applied,
    /// The token belonged to an abandoned session; nothing was changed.
    Stale,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            step_index: 0,
            answers: AnswerMap::new(),
            phase: Phase::Active,
            session: SessionToken(0),
        }
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }

    pub fn current_question(&self) -> Option<&'static QuestionDefinition> {
        registry::question(self.step_index)
    }

    pub fn current_answer(&self) -> Option<&Answer> {
        self.current_question()
            .and_then(|q| self.answers.get(q.id))
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index + 1 == registry::question_count()
    }

    /// Store an answer. The only side effect is string→number coercion for
    /// Scale/Number kinds; validation happens in `can_advance`.
    pub fn select_answer(&mut self, question_id: &str, raw: &str) {
        if self.phase != Phase::Active {
            return;
        }
        if let Some(question) = registry::find(question_id) {
            self.answers
                .insert(question.id.to_string(), question.coerce(raw));
        }
    }

    /// Re-derived on every call, never cached.
    pub fn can_advance(&self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        match (self.current_question(), self.current_answer()) {
            (Some(question), Some(answer)) => question.is_valid(answer),
            _ => false,
        }
    }

    /// Validation message for the current answer, for inline display.
    /// None when there is no answer yet or the answer is valid.
    pub fn validation_hint(&self) -> Option<String> {
        let question = self.current_question()?;
        let answer = self.answers.get(question.id)?;
        question.check(answer).err()
    }

    pub fn advance(&mut self) -> AdvanceOutcome {
        if !self.can_advance() {
            return AdvanceOutcome::Rejected;
        }

        if self.is_last_step() {
            self.phase = Phase::Submitting;
            let request = payload::build_request(&self.answers);
            AdvanceOutcome::SubmitStarted(request, self.session)
        } else {
            self.step_index += 1;
            AdvanceOutcome::Stepped
        }
    }

    /// Go back one step. Only meaningful while Active (never during a
    /// submission); never clears the answer of the step being left.
    pub fn retreat(&mut self) {
        if self.phase == Phase::Active && self.step_index > 0 {
            self.step_index -= 1;
        }
    }

    /// Reset to the initial state, discarding answers and results. The
    /// session token is bumped so any in-flight response becomes stale.
    pub fn restart(&mut self) {
        let next = SessionToken(self.session.0 + 1);
        *self = Self::new();
        self.session = next;
    }

    /// Apply a submission outcome. Outcomes from a previous session, or
    /// arriving when no submission is in flight, are silently discarded.
    pub fn complete_submission(
        &mut self,
        token: SessionToken,
        outcome: Result<CanonicalResult, String>,
    ) -> CompletionOutcome {
        if token != self.session || self.phase != Phase::Submitting {
            return CompletionOutcome::Stale;
        }
        self.phase = match outcome {
            Ok(result) => Phase::Finished(result),
            Err(message) => Phase::Failed(message),
        };
        CompletionOutcome::Applied
    }
}

use crate::domain::quiz::{self, QuizError, QuizOutcome, QuizPayload, QUESTIONS};
use std::collections::HashMap;
use tokio::task::JoinHandle;

pub const EMAIL_INPUT: &str = "email";

/// What the results panel shows once the quiz is scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub title: &'static str,
    pub score_line: String,
    pub message: &'static str,
    pub tshirt_congrats: bool,
}

impl ResultCard {
    pub fn from_outcome(outcome: &QuizOutcome) -> Self {
        Self {
            title: outcome.tier.name(),
            score_line: format!("You scored {} out of {}", outcome.score, outcome.total),
            message: outcome.tier.message(),
            tshirt_congrats: outcome.is_perfect(),
        }
    }
}

pub trait QuizView: Send {
    fn email(&self) -> String;
    fn selection(&self, question_id: &str) -> Option<String>;
    /// Moves focus to the email input or a question's first option.
    fn focus(&mut self, target: &str);
    /// Hides the form and shows the result panel.
    fn show_result(&mut self, card: &ResultCard);
}

pub struct Completion {
    pub outcome: QuizOutcome,
    /// Background save. Awaiting it is optional; it never reports failure.
    pub save: JoinHandle<()>,
}

pub struct QuizClient {
    endpoint: String,
    client: reqwest::Client,
}

impl QuizClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Scores the quiz, shows the result, then saves it without waiting.
    ///
    /// Returns `None` when the user still has something to fill in; focus is
    /// moved there. Must run inside a Tokio runtime.
    pub fn complete<V: QuizView>(&self, view: &mut V, lead_ref: Option<String>) -> Option<Completion> {
        let email = view.email().trim().to_string();
        if email.is_empty() {
            view.focus(EMAIL_INPUT);
            return None;
        }

        let selections: HashMap<String, String> = QUESTIONS
            .iter()
            .filter_map(|q| view.selection(q.id).map(|s| (q.id.to_string(), s)))
            .collect();
        let outcome = match quiz::score(&selections) {
            Ok(outcome) => outcome,
            Err(QuizError::Unanswered(id)) | Err(QuizError::UnknownOption { question: id, .. }) => {
                view.focus(id);
                return None;
            }
        };

        view.show_result(&ResultCard::from_outcome(&outcome));

        let payload = QuizPayload::new(&email, &outcome, lead_ref);
        let save = self.save_in_background(payload);
        Some(Completion { outcome, save })
    }

    /// Posts the result on a detached task. The user already has their
    /// results, so failures are only logged.
    pub fn save_in_background(&self, payload: QuizPayload) -> JoinHandle<()> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            match client.post(&endpoint).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!("Quiz result saved for tier {}", payload.tier)
                }
                Ok(resp) => tracing::warn!("Quiz result not saved, gateway answered {}", resp.status()),
                Err(e) => tracing::warn!("Quiz result not saved: {}", e),
            }
        })
    }
}

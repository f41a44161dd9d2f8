//! AI risk knowledge quiz: answer key, tiers and scoring.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub struct QuizQuestion {
    pub id: &'static str,
    pub text: &'static str,
    /// `(option, label)` pairs in display order.
    pub options: &'static [(&'static str, &'static str)],
    pub answer: &'static str,
}

pub static QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        id: "q1",
        text: "What does \"alignment\" mean in AI safety?",
        options: &[
            ("A", "Making AI systems run faster on aligned hardware"),
            ("B", "Ensuring AI systems pursue the goals their designers intend"),
            ("C", "Lining up training data in the right order"),
            ("D", "Getting governments to agree on AI policy"),
        ],
        answer: "B",
    },
    QuizQuestion {
        id: "q2",
        text: "Which is an example of an \"existential risk\" from advanced AI?",
        options: &[
            ("A", "A chatbot giving a wrong answer"),
            ("B", "Job losses in one industry"),
            ("C", "Higher electricity bills for data centers"),
            ("D", "A highly capable system acting against humanity's long-term survival"),
        ],
        answer: "D",
    },
    QuizQuestion {
        id: "q3",
        text: "What is \"the control problem\" in AI safety?",
        options: &[
            ("A", "Keeping AI source code away from competitors"),
            ("B", "Designing better game controllers with AI"),
            ("C", "Keeping systems smarter than us under meaningful human oversight"),
            ("D", "Limiting how many people can use an AI product"),
        ],
        answer: "C",
    },
    QuizQuestion {
        id: "q4",
        text: "Why do researchers worry about \"instrumental convergence\"?",
        options: &[
            ("A", "Many different goals lead an agent to seek power and resources"),
            ("B", "All AI labs converge on the same instruments"),
            ("C", "Musical AI tools sound too similar"),
            ("D", "Models trained longer always converge to the truth"),
        ],
        answer: "A",
    },
    QuizQuestion {
        id: "q5",
        text: "What role does public awareness play in AI safety?",
        options: &[
            ("A", "None, it is purely a technical problem"),
            ("B", "It mostly causes unnecessary panic"),
            ("C", "It builds the pressure needed for responsible development and policy"),
            ("D", "It only matters for AI researchers"),
        ],
        answer: "C",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Novice,
    Informed,
    Pro,
}

pub struct TierBand {
    pub tier: Tier,
    pub min: u32,
    pub max: u32,
    pub name: &'static str,
    pub message: &'static str,
}

/// Inclusive score bands. Together they cover `0..=QUESTIONS.len()` exactly once.
pub static TIERS: &[TierBand] = &[
    TierBand {
        tier: Tier::Novice,
        min: 0,
        max: 1,
        name: "AI Novice",
        message: "You're just getting started. Check out our resources to learn more about AI risk.",
    },
    TierBand {
        tier: Tier::Informed,
        min: 2,
        max: 3,
        name: "Informed Citizen",
        message: "You have a solid foundation. Keep learning and sharing with your community.",
    },
    TierBand {
        tier: Tier::Pro,
        min: 4,
        max: 5,
        name: "AI Safety Pro",
        message: "You really know your stuff! Consider becoming a City Lead.",
    },
];

impl Tier {
    pub fn band(&self) -> &'static TierBand {
        // Every variant has exactly one band.
        TIERS
            .iter()
            .find(|b| b.tier == *self)
            .unwrap_or(&TIERS[0])
    }

    pub fn name(&self) -> &'static str {
        self.band().name
    }

    pub fn message(&self) -> &'static str {
        self.band().message
    }
}

pub fn tier_for(score: u32) -> Option<Tier> {
    TIERS
        .iter()
        .find(|b| score >= b.min && score <= b.max)
        .map(|b| b.tier)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuizError {
    #[error("question {0} has no selection")]
    Unanswered(&'static str),
    #[error("question {question} has no option {option:?}")]
    UnknownOption { question: &'static str, option: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerBreakdown {
    pub question: &'static str,
    pub chosen_option: String,
    pub chosen_label: &'static str,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: u32,
    pub total: u32,
    pub tier: Tier,
    pub breakdown: Vec<AnswerBreakdown>,
}

impl QuizOutcome {
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }
}

/// Scores a full set of selections against the answer key.
///
/// Every question needs a selection; the first one missing is reported so the
/// caller can send the user back to it.
pub fn score(selections: &HashMap<String, String>) -> Result<QuizOutcome, QuizError> {
    let mut breakdown = Vec::with_capacity(QUESTIONS.len());
    let mut score = 0;

    for q in QUESTIONS {
        let chosen = selections
            .get(q.id)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or(QuizError::Unanswered(q.id))?;
        let label = q
            .options
            .iter()
            .find(|(opt, _)| *opt == chosen)
            .map(|(_, label)| *label)
            .ok_or_else(|| QuizError::UnknownOption {
                question: q.id,
                option: chosen.to_string(),
            })?;

        let is_correct = chosen == q.answer;
        if is_correct {
            score += 1;
        }
        breakdown.push(AnswerBreakdown {
            question: q.text,
            chosen_option: chosen.to_string(),
            chosen_label: label,
            is_correct,
        });
    }

    let tier = tier_for(score).unwrap_or(Tier::Novice);
    Ok(QuizOutcome {
        score,
        total: QUESTIONS.len() as u32,
        tier,
        breakdown,
    })
}

/// Entry of the `answers` column, as the results table has always stored it.
#[derive(Debug, Serialize)]
struct StoredAnswer<'a> {
    question: &'a str,
    picked: &'a str,
    answer: &'a str,
    correct: bool,
}

/// Body the quiz client posts to the quiz gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizPayload {
    pub email: String,
    pub score: u32,
    #[serde(rename = "totalQuestions")]
    pub total_questions: u32,
    pub tier: String,
    pub answers: String,
    #[serde(rename = "tshirtQualified")]
    pub tshirt_qualified: bool,
    #[serde(rename = "leadRef", skip_serializing_if = "Option::is_none")]
    pub lead_ref: Option<String>,
}

impl QuizPayload {
    pub fn new(email: &str, outcome: &QuizOutcome, lead_ref: Option<String>) -> Self {
        let stored: Vec<StoredAnswer> = outcome
            .breakdown
            .iter()
            .map(|b| StoredAnswer {
                question: b.question,
                picked: &b.chosen_option,
                answer: b.chosen_label,
                correct: b.is_correct,
            })
            .collect();

        Self {
            email: email.to_string(),
            score: outcome.score,
            total_questions: outcome.total,
            tier: outcome.tier.name().to_string(),
            answers: serde_json::to_string(&stored).unwrap_or_else(|_| "[]".to_string()),
            tshirt_qualified: outcome.is_perfect(),
            lead_ref: lead_ref.filter(|r| !r.is_empty()),
        }
    }
}

pub mod normalize;
pub mod quiz;
pub mod submissions;

pub use submissions::{AarSubmission, LeadLink, LeadSubmission, QuizSubmission, Submission};

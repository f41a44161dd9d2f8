//! Browser-side pieces: the generic form submitter and the quiz client.

pub mod form;
pub mod quiz;
pub mod schemas;

pub use form::{FormSpec, FormSubmitter, FormView, SubmitOutcome};
pub use quiz::{QuizClient, QuizView};
pub use schemas::{AAR_FORM, LEAD_FORM};

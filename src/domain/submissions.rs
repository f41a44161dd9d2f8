use crate::domain::normalize::{self, date_stamp, FieldSet};
use crate::store::{Fields, AARS_TABLE, LEADS_TABLE, QUIZ_RESULTS_TABLE};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub const LEAD_LINK_FIELD: &str = "Lead";

/// How a record finds the Lead it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadLink {
    /// Record type has no Lead column.
    None,
    /// Caller already knows the Lead record id.
    RecordId(String),
    /// Look the Lead up by email at write time.
    Email(String),
    /// Record type links to Leads but the post carries nothing to match on.
    Unresolvable,
}

/// One form post, decoded at the gateway boundary.
pub trait Submission: DeserializeOwned + Send {
    /// Store table the record is written to.
    const TABLE: &'static str;
    /// Short name used in logs.
    const KIND: &'static str;

    fn lead_link(&self) -> LeadLink;

    /// Maps the post onto store columns. `lead_id` is the resolved link, if any.
    fn into_fields(self, today: NaiveDate, lead_id: Option<&str>) -> Fields;
}

fn link_from(record_id: Option<&Value>, email: Option<&Value>) -> LeadLink {
    if let Some(id) = normalize::text(record_id) {
        return LeadLink::RecordId(id);
    }
    match normalize::email(email) {
        Some(e) => LeadLink::Email(e),
        None => LeadLink::Unresolvable,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeadSubmission {
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    pub city: Option<Value>,
    pub state: Option<Value>,
    pub organization: Option<Value>,
    pub shipping_address: Option<Value>,
    pub linkedin: Option<Value>,
    pub twitter: Option<Value>,
    pub other_social: Option<Value>,
    pub heard_from: Option<Value>,
    pub motivation: Option<Value>,
    #[serde(rename = "preferred-modes[]")]
    pub preferred_modes: Option<Value>,
    pub commitment: Option<Value>,
    pub social_review: Option<Value>,
}

impl Submission for LeadSubmission {
    const TABLE: &'static str = LEADS_TABLE;
    const KIND: &'static str = "signup";

    fn lead_link(&self) -> LeadLink {
        LeadLink::None
    }

    fn into_fields(self, today: NaiveDate, _lead_id: Option<&str>) -> Fields {
        FieldSet::new()
            .text("First Name", normalize::text(self.first_name.as_ref()))
            .text("Last Name", normalize::text(self.last_name.as_ref()))
            .text("Email", normalize::email(self.email.as_ref()))
            .text("Phone", normalize::text(self.phone.as_ref()))
            .text("City", normalize::text(self.city.as_ref()))
            .text("State", normalize::upper(self.state.as_ref()))
            .text("Organization", normalize::text(self.organization.as_ref()))
            .text("Shipping Address", normalize::text(self.shipping_address.as_ref()))
            .text("LinkedIn", normalize::text(self.linkedin.as_ref()))
            .text("X (Twitter)", normalize::text(self.twitter.as_ref()))
            .text("Other Social", normalize::text(self.other_social.as_ref()))
            .text("How did you hear about us?", normalize::text(self.heard_from.as_ref()))
            .text("Why do you want to help?", normalize::text(self.motivation.as_ref()))
            .list("Preferred Modes", normalize::string_list(self.preferred_modes.as_ref()))
            .flag("Commitment Acknowledged", normalize::flag(self.commitment.as_ref()))
            .flag("Social Review Acknowledged", normalize::flag(self.social_review.as_ref()))
            .text("Status", Some("Applied".to_string()))
            .text("Signed Up", Some(date_stamp(today)))
            .into_fields()
    }
}

/// After-action report for one outreach event.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AarSubmission {
    pub email: Option<Value>,
    #[serde(rename = "leadRef")]
    pub lead_ref: Option<Value>,
    #[serde(rename = "outreach-mode")]
    pub outreach_mode: Option<Value>,
    #[serde(rename = "sponsor-involved")]
    pub sponsor_involved: Option<Value>,
    pub event_name: Option<Value>,
    pub event_date: Option<Value>,
    pub event_type: Option<Value>,
    pub city: Option<Value>,
    pub state: Option<Value>,
    pub duration: Option<Value>,
    pub volunteers: Option<Value>,
    pub flyers: Option<Value>,
    pub conversations: Option<Value>,
    pub conversions: Option<Value>,
    pub conversion_type: Option<Value>,
    pub top_questions: Option<Value>,
    pub what_worked: Option<Value>,
    pub improvements: Option<Value>,
    pub materials_needed: Option<Value>,
    pub photo_link: Option<Value>,
    pub do_again: Option<Value>,
}

impl Submission for AarSubmission {
    const TABLE: &'static str = AARS_TABLE;
    const KIND: &'static str = "aar";

    fn lead_link(&self) -> LeadLink {
        link_from(self.lead_ref.as_ref(), self.email.as_ref())
    }

    fn into_fields(self, today: NaiveDate, lead_id: Option<&str>) -> Fields {
        FieldSet::new()
            .text("Outreach Mode", normalize::text(self.outreach_mode.as_ref()))
            .flag("Sponsor Involved", normalize::flag(self.sponsor_involved.as_ref()))
            .text("Event Name", normalize::text(self.event_name.as_ref()))
            .text("Event Date", normalize::text(self.event_date.as_ref()))
            .text("Event Type", normalize::text(self.event_type.as_ref()))
            .text("City", normalize::text(self.city.as_ref()))
            .text("State", normalize::upper(self.state.as_ref()))
            .decimal("Duration (hrs)", normalize::decimal(self.duration.as_ref()))
            .integer("Volunteers", normalize::integer(self.volunteers.as_ref()))
            .integer("Flyers Distributed", normalize::integer(self.flyers.as_ref()))
            .integer("Conversations", normalize::integer(self.conversations.as_ref()))
            .integer("Conversions", normalize::integer(self.conversions.as_ref()))
            .text("Conversion Type", normalize::text(self.conversion_type.as_ref()))
            .text("Top Questions", normalize::text(self.top_questions.as_ref()))
            .text("What Worked", normalize::text(self.what_worked.as_ref()))
            .text("Improvements", normalize::text(self.improvements.as_ref()))
            .text("Restock Request", normalize::text(self.materials_needed.as_ref()))
            .text("Photo Link", normalize::text(self.photo_link.as_ref()))
            .text("Run Again?", normalize::text(self.do_again.as_ref()))
            .text("Submitted Date", Some(date_stamp(today)))
            .link(LEAD_LINK_FIELD, lead_id)
            .into_fields()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuizSubmission {
    pub email: Option<Value>,
    #[serde(rename = "leadRef")]
    pub lead_ref: Option<Value>,
    pub score: Option<Value>,
    #[serde(rename = "totalQuestions")]
    pub total_questions: Option<Value>,
    pub tier: Option<Value>,
    pub answers: Option<Value>,
    #[serde(rename = "tshirtQualified")]
    pub tshirt_qualified: Option<Value>,
}

impl Submission for QuizSubmission {
    const TABLE: &'static str = QUIZ_RESULTS_TABLE;
    const KIND: &'static str = "quiz";

    fn lead_link(&self) -> LeadLink {
        link_from(self.lead_ref.as_ref(), self.email.as_ref())
    }

    fn into_fields(self, today: NaiveDate, lead_id: Option<&str>) -> Fields {
        // Only a literal true qualifies; the quiz client always sends a boolean.
        let qualified = matches!(self.tshirt_qualified, Some(Value::Bool(true)));
        FieldSet::new()
            .text("Email", normalize::email(self.email.as_ref()))
            .integer("Score", normalize::integer(self.score.as_ref()))
            .integer("Total Questions", normalize::integer(self.total_questions.as_ref()))
            .text("Tier", normalize::text(self.tier.as_ref()))
            .text("Answers", normalize::serialized_text(self.answers.as_ref()))
            .flag("T-Shirt Qualified", qualified)
            .text("Submitted Date", Some(date_stamp(today)))
            .link(LEAD_LINK_FIELD, lead_id)
            .into_fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn decode<S: Submission>(body: Value) -> S {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_lead_fields() {
        let lead: LeadSubmission = decode(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.org",
            "state": "ny",
            "phone": "",
            "preferred-modes[]": ["Tabling", "Flyering"],
            "commitment": "true",
            "social_review": false,
        }));
        let fields = lead.into_fields(today(), None);

        assert_eq!(fields["First Name"], "Ada");
        assert_eq!(fields["State"], "NY");
        assert_eq!(fields["Preferred Modes"], json!(["Tabling", "Flyering"]));
        assert_eq!(fields["Commitment Acknowledged"], true);
        assert_eq!(fields["Social Review Acknowledged"], false);
        assert_eq!(fields["Status"], "Applied");
        assert_eq!(fields["Signed Up"], "2026-10-18");
        assert!(!fields.contains_key("Phone"));
        assert!(!fields.contains_key("Organization"));
    }

    #[test]
    fn test_lead_single_mode_becomes_list() {
        let lead: LeadSubmission = decode(json!({ "preferred-modes[]": "Tabling" }));
        let fields = lead.into_fields(today(), None);
        assert_eq!(fields["Preferred Modes"], json!(["Tabling"]));
    }

    #[test]
    fn test_lead_never_links() {
        let lead: LeadSubmission = decode(json!({ "email": "ada@example.org" }));
        assert_eq!(lead.lead_link(), LeadLink::None);
    }

    #[test]
    fn test_aar_fields() {
        let aar: AarSubmission = decode(json!({
            "email": "ada@example.org",
            "outreach-mode": "Tabling",
            "sponsor-involved": "Yes",
            "event_name": "Farmers market",
            "state": "ca",
            "duration": "2.5",
            "volunteers": "4",
            "flyers": "120",
            "conversations": "",
            "conversions": "many",
            "materials_needed": "More flyers",
            "do_again": "Yes",
        }));
        let fields = aar.into_fields(today(), Some("recLEAD1"));

        assert_eq!(fields["Sponsor Involved"], true);
        assert_eq!(fields["State"], "CA");
        assert_eq!(fields["Duration (hrs)"], 2.5);
        assert_eq!(fields["Volunteers"], 4);
        assert_eq!(fields["Flyers Distributed"], 120);
        assert_eq!(fields["Restock Request"], "More flyers");
        assert_eq!(fields["Run Again?"], "Yes");
        assert_eq!(fields["Submitted Date"], "2026-10-18");
        assert_eq!(fields["Lead"], json!(["recLEAD1"]));
        assert!(!fields.contains_key("Conversations"));
        assert!(!fields.contains_key("Conversions"));
        assert!(!fields.contains_key("Photo Link"));
    }

    #[test]
    fn test_aar_without_link() {
        let aar: AarSubmission = decode(json!({ "event_name": "Library talk" }));
        let fields = aar.into_fields(today(), None);
        assert!(!fields.contains_key("Lead"));
        assert_eq!(fields["Sponsor Involved"], false);
    }

    #[test]
    fn test_link_prefers_record_id() {
        let quiz: QuizSubmission = decode(json!({ "leadRef": "recABC", "email": "ada@example.org" }));
        assert_eq!(quiz.lead_link(), LeadLink::RecordId("recABC".to_string()));

        let quiz: QuizSubmission = decode(json!({ "leadRef": "", "email": " ada@example.org " }));
        assert_eq!(quiz.lead_link(), LeadLink::Email("ada@example.org".to_string()));

        let aar: AarSubmission = decode(json!({ "email": "   " }));
        assert_eq!(aar.lead_link(), LeadLink::Unresolvable);
    }

    #[test]
    fn test_stored_email_matches_lookup_email() {
        let quiz: QuizSubmission = decode(json!({ "email": " ada@example.org\t" }));
        assert_eq!(quiz.lead_link(), LeadLink::Email("ada@example.org".to_string()));
        assert_eq!(quiz.into_fields(today(), None)["Email"], "ada@example.org");

        let lead: LeadSubmission = decode(json!({ "email": "ada@example.org " }));
        assert_eq!(lead.into_fields(today(), None)["Email"], "ada@example.org");

        let lead: LeadSubmission = decode(json!({ "email": "  " }));
        assert!(!lead.into_fields(today(), None).contains_key("Email"));
    }

    #[test]
    fn test_quiz_fields() {
        let quiz: QuizSubmission = decode(json!({
            "email": "ada@example.org",
            "score": 5,
            "totalQuestions": "5",
            "tier": "AI Safety Pro",
            "answers": "[]",
            "tshirtQualified": true,
        }));
        let fields = quiz.into_fields(today(), None);

        assert_eq!(fields["Score"], 5);
        assert_eq!(fields["Total Questions"], 5);
        assert_eq!(fields["Tier"], "AI Safety Pro");
        assert_eq!(fields["Answers"], "[]");
        assert_eq!(fields["T-Shirt Qualified"], true);
    }

    #[test]
    fn test_quiz_qualification_needs_literal_true() {
        let quiz: QuizSubmission = decode(json!({ "tshirtQualified": "true", "score": "abc" }));
        let fields = quiz.into_fields(today(), None);
        assert_eq!(fields["T-Shirt Qualified"], false);
        assert!(!fields.contains_key("Score"));
    }
}

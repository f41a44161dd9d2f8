use super::form::{FieldKind, FieldSpec, FormSchema};

const STATE_CODE: &str = "[A-Za-z]{2}";

/// City Lead sign-up form.
pub static LEAD_FORM: FormSchema = FormSchema {
    fields: &[
        FieldSpec::new("first_name", FieldKind::Text).required(),
        FieldSpec::new("last_name", FieldKind::Text).required(),
        FieldSpec::new("email", FieldKind::Email).required(),
        FieldSpec::new("phone", FieldKind::Tel),
        FieldSpec::new("city", FieldKind::Text).required(),
        FieldSpec::new("state", FieldKind::Text).required().pattern(STATE_CODE),
        FieldSpec::new("organization", FieldKind::Text),
        FieldSpec::new("shipping_address", FieldKind::Text),
        FieldSpec::new("linkedin", FieldKind::Url),
        FieldSpec::new("twitter", FieldKind::Text),
        FieldSpec::new("other_social", FieldKind::Text),
        FieldSpec::new("heard_from", FieldKind::Select),
        FieldSpec::new("motivation", FieldKind::Text),
        FieldSpec::new("preferred-modes[]", FieldKind::Checkbox),
        FieldSpec::new("commitment", FieldKind::Checkbox).required(),
        FieldSpec::new("social_review", FieldKind::Checkbox).required(),
    ],
};

/// After-action report form.
pub static AAR_FORM: FormSchema = FormSchema {
    fields: &[
        FieldSpec::new("email", FieldKind::Email).required(),
        FieldSpec::new("outreach-mode", FieldKind::Select).required(),
        FieldSpec::new("sponsor-involved", FieldKind::Radio),
        FieldSpec::new("event_name", FieldKind::Text).required(),
        FieldSpec::new("event_date", FieldKind::Date).required(),
        FieldSpec::new("event_type", FieldKind::Select),
        FieldSpec::new("city", FieldKind::Text).required(),
        FieldSpec::new("state", FieldKind::Text).required().pattern(STATE_CODE),
        FieldSpec::new("duration", FieldKind::Number),
        FieldSpec::new("volunteers", FieldKind::Number),
        FieldSpec::new("flyers", FieldKind::Number),
        FieldSpec::new("conversations", FieldKind::Number),
        FieldSpec::new("conversions", FieldKind::Number),
        FieldSpec::new("conversion_type", FieldKind::Select),
        FieldSpec::new("top_questions", FieldKind::Text),
        FieldSpec::new("what_worked", FieldKind::Text),
        FieldSpec::new("improvements", FieldKind::Text),
        FieldSpec::new("materials_needed", FieldKind::Text),
        FieldSpec::new("photo_link", FieldKind::Url),
        FieldSpec::new("do_again", FieldKind::Radio),
    ],
};

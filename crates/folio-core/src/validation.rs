//! Contact-form submission validation.
//!
//! Every field is trimmed and checked independently, and every failing field
//! is reported, so a form can highlight all of its problems at once. Each
//! field contributes at most one violation.

use std::{borrow::Cow, fmt};

use serde::{
  Deserialize, Deserializer, Serialize,
  de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
  Error, Result,
  contact::{NewContact, RequestOrigin},
  email,
};

const INVALID_EMAIL: &str = "Please provide a valid email address";

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
  pub field:   String,
  pub message: String,
}

impl FieldViolation {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }
}

// ─── Raw input ───────────────────────────────────────────────────────────────

/// One submitted form value.
///
/// Numbers and booleans are taken as their text form. Arrays and objects
/// cannot be meaningful form text and are kept only as [`FieldInput::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
  Text(String),
  Unsupported,
}

impl From<&str> for FieldInput {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for FieldInput {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl<'de> Deserialize<'de> for FieldInput {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(FieldInputVisitor)
  }
}

struct FieldInputVisitor;

impl<'de> Visitor<'de> for FieldInputVisitor {
  type Value = FieldInput;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a text, number or boolean value")
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldInput, E> { Ok(v.into()) }

  fn visit_string<E: de::Error>(self, v: String) -> Result<FieldInput, E> { Ok(v.into()) }

  fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldInput, E> { Ok(v.to_string().into()) }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldInput, E> { Ok(v.to_string().into()) }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldInput, E> { Ok(v.to_string().into()) }

  fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldInput, E> { Ok(v.to_string().into()) }

  fn visit_unit<E: de::Error>(self) -> Result<FieldInput, E> { Ok(FieldInput::Text(String::new())) }

  fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FieldInput, A::Error> {
    while seq.next_element::<IgnoredAny>()?.is_some() {}
    Ok(FieldInput::Unsupported)
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FieldInput, A::Error> {
    while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
    Ok(FieldInput::Unsupported)
  }
}

/// Raw contact-form input as received from a client.
///
/// Every field is optional at this stage so that a missing field is reported
/// as a validation failure rather than a decoding error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
  #[serde(default)]
  pub name:    Option<FieldInput>,
  #[serde(default)]
  pub email:   Option<FieldInput>,
  #[serde(default)]
  pub subject: Option<FieldInput>,
  #[serde(default)]
  pub message: Option<FieldInput>,
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// The trimmed submission. Lengths are counted in characters.
#[derive(Debug, Validate)]
struct ContactForm {
  #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
  name:    String,
  #[validate(custom(function = "deliverable_email"))]
  email:   String,
  #[validate(length(min = 3, max = 200, message = "Subject must be between 3 and 200 characters"))]
  subject: String,
  #[validate(length(
    min = 10,
    max = 1000,
    message = "Message must be between 10 and 1000 characters"
  ))]
  message: String,
}

fn deliverable_email(value: &str) -> Result<(), ValidationError> {
  if email::is_valid(value) && email::normalize(value).is_some() {
    return Ok(());
  }
  let mut err = ValidationError::new("email");
  err.message = Some(Cow::Borrowed(INVALID_EMAIL));
  Err(err)
}

/// First message recorded against `field`, if any.
fn rule_message(errors: &ValidationErrors, field: &str) -> Option<String> {
  errors
    .field_errors()
    .get(field)
    .and_then(|errs| errs.first())
    .and_then(|e| e.message.as_ref())
    .map(|m| m.to_string())
}

impl ContactSubmission {
  /// Trim, check and normalise the submission.
  ///
  /// On failure returns [`Error::Validation`] listing every offending field in
  /// form order (`name`, `email`, `subject`, `message`).
  pub fn validate(self, origin: RequestOrigin) -> Result<NewContact> {
    let mut unsupported = Vec::new();
    let mut text = |field: &'static str, input: Option<FieldInput>| match input {
      None => String::new(),
      Some(FieldInput::Text(s)) => s.trim().to_owned(),
      Some(FieldInput::Unsupported) => {
        unsupported.push(field);
        String::new()
      }
    };
    let form = ContactForm {
      name:    text("name", self.name),
      email:   text("email", self.email),
      subject: text("subject", self.subject),
      message: text("message", self.message),
    };

    let failed = form.validate().err();
    let fields = [
      ("name", "Name", form.name.as_str()),
      ("email", "Email", form.email.as_str()),
      ("subject", "Subject", form.subject.as_str()),
      ("message", "Message", form.message.as_str()),
    ];

    let mut violations = Vec::new();
    for (field, label, value) in fields {
      let message = if unsupported.contains(&field) {
        format!("{label} must be a text value")
      } else if value.is_empty() {
        format!("{label} is required")
      } else if let Some(m) = failed.as_ref().and_then(|e| rule_message(e, field)) {
        m
      } else {
        continue;
      };
      violations.push(FieldViolation::new(field, message));
    }
    if !violations.is_empty() {
      return Err(Error::Validation(violations));
    }

    let Some(email) = email::normalize(&form.email) else {
      return Err(Error::Validation(vec![FieldViolation::new("email", INVALID_EMAIL)]));
    };

    Ok(NewContact {
      name: form.name,
      email,
      subject: form.subject,
      message: form.message,
      ip_address: origin.ip_address,
      user_agent: origin.user_agent,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn submission(name: &str, email: &str, subject: &str, message: &str) -> ContactSubmission {
    ContactSubmission {
      name:    Some(name.into()),
      email:   Some(email.into()),
      subject: Some(subject.into()),
      message: Some(message.into()),
    }
  }

  fn valid() -> ContactSubmission {
    submission(
      "Jane Doe",
      "Jane.Doe+x@Example.com",
      "Hello there",
      "This is a test message.",
    )
  }

  fn violations(s: ContactSubmission) -> Vec<FieldViolation> {
    match s.validate(RequestOrigin::default()) {
      Err(Error::Validation(v)) => v,
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  fn fields(v: &[FieldViolation]) -> Vec<&str> {
    v.iter().map(|f| f.field.as_str()).collect()
  }

  #[test]
  fn valid_submission_is_trimmed_and_normalised() {
    let mut s = valid();
    s.name = Some("  Jane Doe \n".into());
    let origin = RequestOrigin {
      ip_address: Some("10.0.0.1".into()),
      user_agent: Some("curl/8".into()),
    };
    let c = s.validate(origin).unwrap();
    assert_eq!(c.name, "Jane Doe");
    assert_eq!(c.email, "jane.doe+x@example.com");
    assert_eq!(c.subject, "Hello there");
    assert_eq!(c.message, "This is a test message.");
    assert_eq!(c.ip_address.as_deref(), Some("10.0.0.1"));
    assert_eq!(c.user_agent.as_deref(), Some("curl/8"));
  }

  #[test]
  fn name_length_bounds() {
    let too_long = "x".repeat(101);
    for bad in ["J", too_long.as_str()] {
      let mut s = valid();
      s.name = Some(bad.into());
      let v = violations(s);
      assert_eq!(fields(&v), ["name"]);
      assert_eq!(v[0].message, "Name must be between 2 and 100 characters");
    }
    let longest = "x".repeat(100);
    for ok in ["Jo", longest.as_str()] {
      let mut s = valid();
      s.name = Some(ok.into());
      assert!(s.validate(RequestOrigin::default()).is_ok());
    }
  }

  #[test]
  fn length_counts_characters_not_bytes() {
    let mut s = valid();
    // 100 two-byte characters.
    s.name = Some("é".repeat(100).into());
    assert!(s.validate(RequestOrigin::default()).is_ok());
  }

  #[test]
  fn whitespace_only_counts_as_missing() {
    let mut s = valid();
    s.subject = Some("   ".into());
    let v = violations(s);
    assert_eq!(v, [FieldViolation::new("subject", "Subject is required")]);
  }

  #[test]
  fn reports_every_failing_field_in_form_order() {
    let v = violations(ContactSubmission::default());
    assert_eq!(fields(&v), ["name", "email", "subject", "message"]);
    assert_eq!(v[1].message, "Email is required");
    assert_eq!(v[3].message, "Message is required");

    let v = violations(submission("J", "nope", "Hi", "short"));
    assert_eq!(fields(&v), ["name", "email", "subject", "message"]);
    assert_eq!(v[1].message, "Please provide a valid email address");
    assert_eq!(v[2].message, "Subject must be between 3 and 200 characters");
    assert_eq!(v[3].message, "Message must be between 10 and 1000 characters");
  }

  #[test]
  fn email_that_folds_to_nothing_is_invalid() {
    let mut s = valid();
    s.email = Some("+tag@gmail.com".into());
    assert_eq!(fields(&violations(s)), ["email"]);
  }

  #[test]
  fn message_upper_bound() {
    let mut s = valid();
    s.message = Some("m".repeat(1001).into());
    assert_eq!(fields(&violations(s)), ["message"]);
    let mut s = valid();
    s.message = Some("m".repeat(1000).into());
    assert!(s.validate(RequestOrigin::default()).is_ok());
  }

  #[test]
  fn scalar_json_values_are_read_as_text() {
    let s: ContactSubmission = serde_json::from_str(
      r#"{"name": 12345, "email": "jane@example.com", "subject": true, "message": 1.5}"#,
    )
    .unwrap();
    assert_eq!(s.name, Some(FieldInput::Text("12345".into())));
    assert_eq!(s.subject, Some(FieldInput::Text("true".into())));

    let v = violations(s);
    // "true" is 4 characters and "1.5" is 3: only the message is too short.
    assert_eq!(fields(&v), ["message"]);
  }

  #[test]
  fn structured_json_values_are_reported_per_field() {
    let s: ContactSubmission = serde_json::from_str(
      r#"{"name": ["Jane"], "email": {"a": 1}, "subject": null, "message": "short"}"#,
    )
    .unwrap();
    let v = violations(s);
    assert_eq!(
      v,
      [
        FieldViolation::new("name", "Name must be a text value"),
        FieldViolation::new("email", "Email must be a text value"),
        FieldViolation::new("subject", "Subject is required"),
        FieldViolation::new(
          "message",
          "Message must be between 10 and 1000 characters"
        ),
      ]
    );
  }
}

//! Contact form relay: validate a submission, append it to the sheet,
//! send the notification email, and answer with a [`RelayResponse`].
//!
//! Validation failures get their own message. Anything unexpected is
//! logged and turned into one generic apology. A failed notification
//! never changes the outcome the caller sees.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use freshmath_shared::{ContactSubmission, RelayHealth, RelayResponse};
use regex::Regex;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::{Config, DEFAULT_SHEET_NAME, DEFAULT_SUBJECT_PREFIX};

pub const SHEET_HEADERS: [&str; 7] = [
    "Timestamp",
    "Name",
    "Email",
    "Subject",
    "Grade Level",
    "Message",
    "Status",
];

pub const THANK_YOU_MESSAGE: &str =
    "Thank you for contacting us! We will respond within 24-48 hours.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred. Please try again or email us directly.";
pub const HEALTH_MESSAGE: &str = "Fresh Math Contact Form Backend is running";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayRejection {
    MissingFields,
    InvalidEmail,
}

impl fmt::Display for RelayRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => f.write_str("Missing required fields"),
            Self::InvalidEmail => f.write_str("Invalid email address"),
        }
    }
}

impl std::error::Error for RelayRejection {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate(submission: &ContactSubmission) -> Result<(), RelayRejection> {
    let required = [
        &submission.name,
        &submission.email,
        &submission.message,
        &submission.subject,
    ];
    if required.iter().any(|value| value.trim().is_empty()) {
        return Err(RelayRejection::MissingFields);
    }
    if !is_valid_email(submission.email.trim()) {
        return Err(RelayRejection::InvalidEmail);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub grade: Option<String>,
    pub message: String,
    pub status: String,
}

impl SheetRow {
    pub fn from_submission(submission: &ContactSubmission, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            name: submission.name.trim().to_string(),
            email: submission.email.trim().to_string(),
            subject: submission.subject.trim().to_string(),
            grade: submission
                .grade
                .as_deref()
                .map(str::trim)
                .filter(|grade| !grade.is_empty())
                .map(str::to_string),
            message: submission.message.clone(),
            status: "New".to_string(),
        }
    }

    /// Cells in `SHEET_HEADERS` order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.timestamp.to_rfc3339(),
            self.name.clone(),
            self.email.clone(),
            self.subject.clone(),
            self.grade.clone().unwrap_or_else(|| "N/A".to_string()),
            self.message.clone(),
            self.status.clone(),
        ]
    }
}

pub trait SubmissionSheet {
    fn append(&mut self, row: &SheetRow) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub reply_to: String,
    pub text_body: String,
    pub html_body: String,
}

pub trait Notifier {
    fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub notification_email: String,
    pub subject_prefix: String,
    pub sheet_name: String,
}

impl RelaySettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            notification_email: cfg.get("relay.notification_email").unwrap_or_default(),
            subject_prefix: cfg
                .get("relay.subject_prefix")
                .unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.to_string()),
            sheet_name: cfg
                .get("relay.sheet_name")
                .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
        }
    }
}

pub fn render_notification(settings: &RelaySettings, row: &SheetRow) -> Notification {
    let grade = row.grade.as_deref().unwrap_or("Not specified");
    let submitted = row.timestamp.to_rfc2822();

    let text_body = format!(
        "New Contact Form Submission - Fresh Math\n\n\
         Name: {name}\n\
         Email: {email}\n\
         Subject: {subject}\n\
         Grade Level: {grade}\n\
         Submitted: {submitted}\n\n\
         Message:\n{message}\n\n\
         ---\n\
         Reply to: {email}\n",
        name = row.name,
        email = row.email,
        subject = row.subject,
        message = row.message,
    );

    let detail_row = |label: &str, value: &str| {
        format!(
            "<tr><td style=\"padding: 8px; border-bottom: 1px solid #e5e7eb; \
             font-weight: bold; width: 150px;\">{label}:</td>\
             <td style=\"padding: 8px; border-bottom: 1px solid #e5e7eb;\">{value}</td></tr>"
        )
    };
    let email = escape_html(&row.email);
    let html_body = format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <div style=\"background-color: #8B5CF6; color: white; padding: 20px; text-align: center;\">\
         <h2>New Contact Form Submission</h2></div>\
         <div style=\"padding: 20px; background-color: #f9fafb;\">\
         <h3 style=\"color: #374151;\">Contact Details</h3>\
         <table style=\"width: 100%; border-collapse: collapse;\">{rows}</table>\
         <h3 style=\"color: #374151; margin-top: 20px;\">Message</h3>\
         <div style=\"background-color: white; padding: 15px; border-left: 4px solid #8B5CF6; \
         white-space: pre-wrap;\">{message}</div>\
         <div style=\"margin-top: 20px; padding: 15px; background-color: #FEF3C7; border-radius: 4px;\">\
         <p style=\"margin: 0; color: #92400E;\"><strong>Quick Reply:</strong> \
         <a href=\"mailto:{email}?subject=Re: {reply_subject}\" style=\"color: #8B5CF6;\">\
         Click here to reply</a></p></div></div>\
         <div style=\"background-color: #374151; color: white; padding: 15px; text-align: center; \
         font-size: 12px;\">Fresh Math Contact Form - Automated Notification</div></div>",
        rows = [
            detail_row("Name", &escape_html(&row.name)),
            detail_row(
                "Email",
                &format!("<a href=\"mailto:{email}\">{email}</a>"),
            ),
            detail_row("Subject", &escape_html(&row.subject)),
            detail_row("Grade Level", &escape_html(grade)),
            detail_row("Submitted", &escape_html(&submitted)),
        ]
        .join(""),
        message = escape_html(&row.message),
        reply_subject = encode_uri_component(&row.subject),
    );

    Notification {
        to: settings.notification_email.clone(),
        subject: format!("{} {}", settings.subject_prefix, row.subject),
        reply_to: row.email.clone(),
        text_body,
        html_body,
    }
}

pub fn health() -> RelayHealth {
    RelayHealth {
        status: "ok".to_string(),
        message: HEALTH_MESSAGE.to_string(),
    }
}

pub struct Relay<S, N> {
    settings: RelaySettings,
    sheet: S,
    notifier: N,
}

impl<S, N> Relay<S, N>
where
    S: SubmissionSheet,
    N: Notifier,
{
    pub fn new(settings: RelaySettings, sheet: S, notifier: N) -> Self {
        Self {
            settings,
            sheet,
            notifier,
        }
    }

    pub fn sheet(&self) -> &S {
        &self.sheet
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Entry point for a raw request body.
    #[instrument(skip(self, body, now))]
    pub fn handle_raw(&mut self, body: &str, now: DateTime<Utc>) -> RelayResponse {
        match serde_json::from_str::<ContactSubmission>(body) {
            Ok(submission) => self.handle(&submission, now),
            Err(err) => {
                error!(error = %err, "error processing form: unreadable body");
                RelayResponse::new(false, GENERIC_FAILURE_MESSAGE)
            }
        }
    }

    #[instrument(skip(self, submission, now), fields(subject = %submission.subject))]
    pub fn handle(&mut self, submission: &ContactSubmission, now: DateTime<Utc>) -> RelayResponse {
        if let Err(rejection) = validate(submission) {
            info!(reason = %rejection, "rejected contact submission");
            return RelayResponse::new(false, rejection.to_string());
        }

        let row = SheetRow::from_submission(submission, now);
        if let Err(err) = self.sheet.append(&row) {
            error!(error = %format!("{err:#}"), "error processing form");
            return RelayResponse::new(false, GENERIC_FAILURE_MESSAGE);
        }

        let notification = render_notification(&self.settings, &row);
        if let Err(err) = self.notifier.send(&notification) {
            warn!(error = %format!("{err:#}"), "error sending email");
        }

        info!(email = %row.email, "stored contact submission");
        RelayResponse::new(true, THANK_YOU_MESSAGE)
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn encode_uri_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            subject: "general".to_string(),
            grade: Some("grade3".to_string()),
            message: "This is a test message.".to_string(),
        }
    }

    #[test]
    fn email_pattern_matches_simple_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@c.de"));
    }

    #[test]
    fn blank_required_fields_are_missing() {
        let mut sub = submission();
        sub.message = "   ".to_string();
        assert_eq!(validate(&sub), Err(RelayRejection::MissingFields));

        let mut sub = submission();
        sub.grade = None;
        assert_eq!(validate(&sub), Ok(()));
    }

    #[test]
    fn missing_fields_win_over_bad_email() {
        let mut sub = submission();
        sub.email = "nope".to_string();
        sub.name.clear();
        assert_eq!(validate(&sub), Err(RelayRejection::MissingFields));
    }

    #[test]
    fn row_defaults_grade_and_status() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid time");
        let mut sub = submission();
        sub.grade = Some(" ".to_string());
        let cells = SheetRow::from_submission(&sub, now).cells();
        assert_eq!(cells.len(), SHEET_HEADERS.len());
        assert_eq!(cells[0], "2026-03-01T12:00:00+00:00");
        assert_eq!(cells[4], "N/A");
        assert_eq!(cells[6], "New");
    }

    #[test]
    fn notification_escapes_markup_and_prefixes_subject() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid time");
        let mut sub = submission();
        sub.message = "<b>hi</b> & bye".to_string();
        sub.subject = "Q&A time".to_string();
        let settings = RelaySettings {
            notification_email: "owner@example.com".to_string(),
            subject_prefix: "[Fresh Math Contact]".to_string(),
            sheet_name: "Contact Form Submissions".to_string(),
        };
        let note = render_notification(&settings, &SheetRow::from_submission(&sub, now));

        assert_eq!(note.to, "owner@example.com");
        assert_eq!(note.subject, "[Fresh Math Contact] Q&A time");
        assert_eq!(note.reply_to, "test@example.com");
        assert!(note.html_body.contains("&lt;b&gt;hi&lt;/b&gt; &amp; bye"));
        assert!(note.html_body.contains("subject=Re: Q%26A%20time"));
        assert!(note.text_body.contains("Grade Level: grade3"));
        assert!(note.text_body.contains("<b>hi</b> & bye"));
    }
}

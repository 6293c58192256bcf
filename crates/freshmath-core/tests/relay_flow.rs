use std::cell::RefCell;

use chrono::{TimeZone, Utc};
use freshmath_core::datastore::SheetStore;
use freshmath_core::notify::OutboxNotifier;
use freshmath_core::relay::{
    GENERIC_FAILURE_MESSAGE, Notification, Notifier, Relay, RelaySettings, THANK_YOU_MESSAGE,
};
use tempfile::tempdir;

fn settings() -> RelaySettings {
    RelaySettings {
        notification_email: "owner@example.com".to_string(),
        subject_prefix: "[Fresh Math Contact]".to_string(),
        sheet_name: "Contact Form Submissions".to_string(),
    }
}

struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send(&self, _notification: &Notification) -> anyhow::Result<()> {
        anyhow::bail!("smtp unavailable")
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: RefCell<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        self.sent.borrow_mut().push(notification.clone());
        Ok(())
    }
}

const VALID: &str = r#"{
    "name": "Test User",
    "email": "test@example.com",
    "subject": "general",
    "message": "This is a test message."
}"#;

#[test]
fn valid_submission_is_stored_and_announced() {
    let temp = tempdir().expect("tempdir");
    let store = SheetStore::open(temp.path(), "Contact Form Submissions").expect("open sheet");
    let mut relay = Relay::new(settings(), store, RecordingNotifier::default());
    let now = Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).single().expect("valid time");

    let response = relay.handle_raw(VALID, now);
    assert!(response.success);
    assert_eq!(response.message, THANK_YOU_MESSAGE);
    assert!(response.data.is_empty());

    let rows = relay.sheet().load_rows().expect("rows");
    assert_eq!(
        rows,
        vec![vec![
            "2026-05-04T09:30:00+00:00".to_string(),
            "Test User".to_string(),
            "test@example.com".to_string(),
            "general".to_string(),
            "N/A".to_string(),
            "This is a test message.".to_string(),
            "New".to_string(),
        ]]
    );

    let sent = relay.notifier().sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[Fresh Math Contact] general");
    assert_eq!(sent[0].reply_to, "test@example.com");
    assert!(sent[0].text_body.contains("Grade Level: Not specified"));
}

#[test]
fn rejected_submissions_leave_the_sheet_alone() {
    let temp = tempdir().expect("tempdir");
    let store = SheetStore::open(temp.path(), "Contact Form Submissions").expect("open sheet");
    let mut relay = Relay::new(settings(), store, RecordingNotifier::default());
    let now = Utc::now();

    let missing = relay.handle_raw(r#"{"name":"A","email":"a@b.co","subject":"x"}"#, now);
    assert!(!missing.success);
    assert_eq!(missing.message, "Missing required fields");

    let bad_email = relay.handle_raw(
        r#"{"name":"A","email":"a@b","subject":"x","message":"hi"}"#,
        now,
    );
    assert!(!bad_email.success);
    assert_eq!(bad_email.message, "Invalid email address");

    let garbage = relay.handle_raw("not json", now);
    assert!(!garbage.success);
    assert_eq!(garbage.message, GENERIC_FAILURE_MESSAGE);

    assert!(relay.sheet().load_rows().expect("rows").is_empty());
    assert!(relay.notifier().sent.borrow().is_empty());
}

#[test]
fn null_fields_count_as_missing_and_numeric_grade_is_kept() {
    let temp = tempdir().expect("tempdir");
    let store = SheetStore::open(temp.path(), "Contact Form Submissions").expect("open sheet");
    let mut relay = Relay::new(settings(), store, RecordingNotifier::default());
    let now = Utc::now();

    let null_name = relay.handle_raw(
        r#"{"name":null,"email":"a@b.co","subject":"s","message":"m"}"#,
        now,
    );
    assert!(!null_name.success);
    assert_eq!(null_name.message, "Missing required fields");
    assert!(relay.sheet().load_rows().expect("rows").is_empty());

    let numeric_grade = relay.handle_raw(
        r#"{"name":"A","email":"a@b.co","subject":"s","grade":3,"message":"m"}"#,
        now,
    );
    assert!(numeric_grade.success);
    assert_eq!(numeric_grade.message, THANK_YOU_MESSAGE);
    let rows = relay.sheet().load_rows().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][4], "3");
}

#[test]
fn notification_failure_still_reports_success() {
    let temp = tempdir().expect("tempdir");
    let store = SheetStore::open(temp.path(), "Contact Form Submissions").expect("open sheet");
    let mut relay = Relay::new(settings(), store, FailingNotifier);

    let response = relay.handle_raw(VALID, Utc::now());
    assert!(response.success);
    assert_eq!(relay.sheet().load_rows().expect("rows").len(), 1);
}

#[test]
fn sheet_keeps_rows_across_reopen_and_outbox_collects_mail() {
    let temp = tempdir().expect("tempdir");
    let outbox = OutboxNotifier::new(temp.path().join("outbox"));
    {
        let store = SheetStore::open(temp.path(), "Contact Form Submissions").expect("open");
        let mut relay = Relay::new(settings(), store, outbox.clone());
        assert!(relay.handle_raw(VALID, Utc::now()).success);
    }

    let reopened = SheetStore::open(temp.path(), "Contact Form Submissions").expect("reopen");
    let header = std::fs::read_to_string(&reopened.sheet_path).expect("read sheet");
    assert!(header.starts_with(
        r#"["Timestamp","Name","Email","Subject","Grade Level","Message","Status"]"#
    ));

    let mut relay = Relay::new(settings(), reopened, outbox.clone());
    assert!(
        relay
            .handle_raw(
                r#"{"name":"B","email":"b@c.de","subject":"s","grade":"grade3","message":"m"}"#,
                Utc::now(),
            )
            .success
    );

    let rows = relay.sheet().load_rows().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][4], "grade3");
    assert_eq!(outbox.pending().expect("outbox").len(), 2);
}

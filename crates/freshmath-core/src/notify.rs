use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, anyhow};
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::relay::{Notification, Notifier};

/// Delivers notifications either through an external mail command or, when
/// none is configured, into `<data_dir>/outbox`.
#[derive(Debug)]
pub enum MailDelivery {
    Command(CommandNotifier),
    Outbox(OutboxNotifier),
}

impl MailDelivery {
    pub fn from_config(cfg: &Config, data_dir: &Path) -> Self {
        match cfg
            .get("relay.mail_command")
            .map(|cmd| cmd.trim().to_string())
            .filter(|cmd| !cmd.is_empty())
        {
            Some(command) => {
                debug!(command = %command, "notifications go through mail command");
                Self::Command(CommandNotifier::new(command))
            }
            None => {
                let outbox = OutboxNotifier::new(data_dir.join("outbox"));
                debug!(outbox = %outbox.dir.display(), "notifications go to outbox");
                Self::Outbox(outbox)
            }
        }
    }
}

impl Notifier for MailDelivery {
    fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        match self {
            Self::Command(inner) => inner.send(notification),
            Self::Outbox(inner) => inner.send(notification),
        }
    }
}

/// Runs `sh -c <command>` with the notification as one JSON line on stdin.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    command: String,
}

impl CommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Notifier for CommandNotifier {
    #[instrument(skip(self, notification), fields(command = %self.command))]
    fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        let payload = serde_json::to_string(notification)?;
        info!(to = %notification.to, "running mail command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to run mail command {}", self.command))?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(err) = writeln!(stdin, "{payload}")
        {
            // The command may exit without reading; its status decides.
            warn!(error = %err, "mail command did not take the message on stdin");
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for mail command {}", self.command))?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(anyhow!(
                "mail command failed with status {}: {}",
                output
                    .status
                    .code()
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                stderr
            ));
        }
        if !stderr.is_empty() {
            warn!(stderr = %stderr, "mail command wrote stderr");
        }

        Ok(())
    }
}

static OUTBOX_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Messages currently waiting in the outbox, oldest first.
    pub fn pending(&self) -> anyhow::Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read outbox {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Notifier for OutboxNotifier {
    #[instrument(skip(self, notification))]
    fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let name = format!(
            "{}-{:04}.json",
            Utc::now().format("%Y%m%dT%H%M%S%.6fZ"),
            OUTBOX_SEQ.fetch_add(1, Ordering::Relaxed) % 10_000
        );
        let path = self.dir.join(name);

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut temp, notification)?;
        writeln!(temp)?;
        temp.flush()?;
        temp.persist(&path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

        info!(file = %path.display(), to = %notification.to, "queued notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Notification {
        Notification {
            to: "owner@example.com".to_string(),
            subject: "[Fresh Math Contact] hi".to_string(),
            reply_to: "a@b.co".to_string(),
            text_body: "hello".to_string(),
            html_body: "<p>hello</p>".to_string(),
        }
    }

    #[test]
    fn outbox_writes_one_file_per_message() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outbox = OutboxNotifier::new(dir.path().join("outbox"));
        outbox.send(&note()).expect("first");
        outbox.send(&note()).expect("second");

        let files = outbox.pending().expect("pending");
        assert_eq!(files.len(), 2);
        let text = fs::read_to_string(&files[0]).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(parsed["reply_to"], "a@b.co");
    }

    #[cfg(unix)]
    #[test]
    fn mail_command_receives_json_on_stdin() {
        let dir = tempfile::tempdir().expect("tempdir");
        let captured = dir.path().join("mail.json");
        let notifier = CommandNotifier::new(format!("cat > '{}'", captured.display()));
        notifier.send(&note()).expect("send");

        let text = fs::read_to_string(&captured).expect("captured");
        let parsed: serde_json::Value = serde_json::from_str(text.trim()).expect("json");
        assert_eq!(parsed["to"], "owner@example.com");
    }

    #[cfg(unix)]
    #[test]
    fn failing_mail_command_is_an_error() {
        let notifier = CommandNotifier::new("echo nope >&2; exit 3");
        let err = notifier.send(&note()).expect_err("fails");
        assert!(format!("{err:#}").contains("status 3"));
    }

    #[cfg(unix)]
    #[test]
    fn mail_command_that_ignores_stdin_still_succeeds() {
        let mut big = note();
        big.text_body = "x".repeat(1 << 20);
        let notifier = CommandNotifier::new("exit 0");
        notifier.send(&big).expect("exit status wins");
    }

    #[test]
    fn blank_mail_command_falls_back_to_outbox() {
        let mut cfg = Config::defaults();
        cfg.apply_overrides([("relay.mail_command".to_string(), "  ".to_string())]);
        let delivery = MailDelivery::from_config(&cfg, Path::new("/tmp/fm"));
        assert!(matches!(delivery, MailDelivery::Outbox(_)));
    }
}

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use freshmath_shared::controller::PendingSubmission;
use freshmath_shared::{
  GenerationResult,
  SubmissionOutcome
};
use reqwest::Url;
use tracing::{
  debug,
  info,
  warn
};

use crate::config::Config;

/// Anything that can carry a pending submission to the generator and
/// bring back its outcome.
pub trait GenerationBackend {
  fn send(
    &self,
    pending: &PendingSubmission
  ) -> SubmissionOutcome;

  /// Absolute form of a `downloadUrl` returned by the backend.
  fn resolve_download(
    &self,
    download_url: &str
  ) -> anyhow::Result<String>;

  fn download(
    &self,
    download_url: &str,
    dest: &Path
  ) -> anyhow::Result<u64>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
  base:   Url,
  client: reqwest::blocking::Client
}

impl HttpBackend {
  pub fn new(
    base_url: &str,
    timeout: Duration
  ) -> anyhow::Result<Self> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
      anyhow::bail!(
        "backend.url is empty"
      );
    }
    let base = Url::parse(trimmed)
      .with_context(|| {
        format!(
          "invalid backend.url: \
           {trimmed}"
        )
      })?;

    let client =
      reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context(
          "failed building HTTP client \
           for worksheet backend"
        )?;

    debug!(
      base = %base,
      timeout_secs = timeout.as_secs(),
      "initialized http backend"
    );
    Ok(Self {
      base,
      client
    })
  }

  pub fn from_config(
    cfg: &Config
  ) -> anyhow::Result<Self> {
    Self::new(
      &cfg.backend_url(),
      cfg.backend_timeout()?
    )
  }

  pub fn base(&self) -> &Url {
    &self.base
  }

  fn endpoint_url(
    &self,
    path: &str
  ) -> anyhow::Result<Url> {
    self.base.join(path).with_context(
      || {
        format!(
          "failed joining {path} onto \
           {}",
          self.base
        )
      }
    )
  }

  fn post(
    &self,
    pending: &PendingSubmission
  ) -> anyhow::Result<GenerationResult> {
    let url = self
      .endpoint_url(pending.endpoint())?;
    info!(
      url = %url,
      seq = pending.ticket.seq,
      "posting generation request"
    );

    let response = self
      .client
      .post(url.clone())
      .json(&pending.request)
      .send()
      .with_context(|| {
        format!("request to {url} failed")
      })?;

    let status = response.status();
    let body =
      response.text().with_context(|| {
        format!(
          "failed reading response body \
           from {url}"
        )
      })?;
    debug!(
      status = status.as_u16(),
      bytes = body.len(),
      "received generation response"
    );

    // Error statuses still carry the
    // {success, error} body.
    serde_json::from_str::<GenerationResult>(
      &body
    )
    .map_err(|err| {
      anyhow!(
        "unexpected response (HTTP {}): \
         {err}",
        status.as_u16()
      )
    })
  }
}

impl GenerationBackend for HttpBackend {
  #[tracing::instrument(skip(
    self, pending
  ), fields(endpoint = pending.endpoint()))]
  fn send(
    &self,
    pending: &PendingSubmission
  ) -> SubmissionOutcome {
    match self.post(pending) {
      | Ok(result) => {
        SubmissionOutcome::Completed(
          result
        )
      }
      | Err(err) => {
        warn!(
          error = %format!("{err:#}"),
          "generation request failed"
        );
        SubmissionOutcome::Transport(
          format!("{err:#}")
        )
      }
    }
  }

  fn resolve_download(
    &self,
    download_url: &str
  ) -> anyhow::Result<String> {
    Ok(
      self
        .endpoint_url(download_url.trim())?
        .to_string()
    )
  }

  #[tracing::instrument(skip(self))]
  fn download(
    &self,
    download_url: &str,
    dest: &Path
  ) -> anyhow::Result<u64> {
    let url = self
      .endpoint_url(download_url.trim())?;
    let response = self
      .client
      .get(url.clone())
      .send()
      .with_context(|| {
        format!("download of {url} failed")
      })?;
    let status = response.status();
    if !status.is_success() {
      anyhow::bail!(
        "download of {url} returned HTTP \
         {}",
        status.as_u16()
      );
    }
    let bytes =
      response.bytes().with_context(
        || {
          format!(
            "failed reading download \
             body from {url}"
          )
        }
      )?;
    fs::write(dest, &bytes)
      .with_context(|| {
        format!(
          "failed to write {}",
          dest.display()
        )
      })?;
    info!(
      file = %dest.display(),
      bytes = bytes.len(),
      "saved generated file"
    );
    Ok(bytes.len() as u64)
  }
}

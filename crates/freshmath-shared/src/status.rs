//! Single-slot status banner: `idle -> loading -> success|error -> idle`.

pub const DEFAULT_DISMISS_MS: u32 =
  5_000;

/// Reads a page-supplied delay; anything that is not a positive whole
/// number of milliseconds falls back to the default.
pub fn dismiss_delay(
  raw: Option<&str>
) -> u32 {
  raw
    .and_then(|text| {
      text.trim().parse::<u32>().ok()
    })
    .filter(|ms| *ms > 0)
    .unwrap_or(DEFAULT_DISMISS_MS)
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum StatusKind {
  Loading,
  Success,
  Error
}

impl StatusKind {
  pub fn css_suffix(self) -> &'static str {
    match self {
      | Self::Loading => "loading",
      | Self::Success => "success",
      | Self::Error => "error"
    }
  }

  pub fn is_terminal(self) -> bool {
    !matches!(self, Self::Loading)
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct StatusMessage {
  pub kind: StatusKind,
  pub text: String
}

/// Handle for a scheduled auto-dismiss. Only clears the slot when no
/// newer message has been shown since it was taken.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct DismissToken {
  epoch: u64
}

impl DismissToken {
  pub fn epoch(self) -> u64 {
    self.epoch
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub struct StatusSlot {
  current: Option<StatusMessage>,
  epoch:   u64
}

impl StatusSlot {
  pub fn current(
    &self
  ) -> Option<&StatusMessage> {
    self.current.as_ref()
  }

  pub fn epoch(&self) -> u64 {
    self.epoch
  }

  pub fn is_idle(&self) -> bool {
    self.current.is_none()
  }

  pub fn is_loading(&self) -> bool {
    self.current.as_ref().is_some_and(
      |message| {
        message.kind
          == StatusKind::Loading
      }
    )
  }

  pub fn show(
    &mut self,
    kind: StatusKind,
    text: impl Into<String>
  ) {
    self.epoch =
      self.epoch.wrapping_add(1);
    let text = text.into();
    tracing::debug!(
      kind = kind.css_suffix(),
      epoch = self.epoch,
      text = %text,
      "status changed"
    );
    self.current =
      Some(StatusMessage { kind, text });
  }

  pub fn loading(
    &mut self,
    text: impl Into<String>
  ) {
    self.show(StatusKind::Loading, text);
  }

  pub fn success(
    &mut self,
    text: impl Into<String>
  ) {
    self.show(StatusKind::Success, text);
  }

  pub fn error(
    &mut self,
    text: impl Into<String>
  ) {
    self.show(StatusKind::Error, text);
  }

  /// Token for the pending auto-dismiss, if the current message is
  /// terminal. Loading stays until something replaces it.
  pub fn dismiss_token(
    &self
  ) -> Option<DismissToken> {
    self
      .current
      .as_ref()
      .filter(|message| {
        message.kind.is_terminal()
      })
      .map(|_| DismissToken {
        epoch: self.epoch
      })
  }

  pub fn dismiss(
    &mut self,
    token: DismissToken
  ) -> bool {
    if token.epoch != self.epoch
      || self.current.is_none()
    {
      return false;
    }
    self.current = None;
    true
  }
}

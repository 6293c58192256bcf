//! Toggle widgets shared by every page: expandable cards, grade
//! sections, tab strips and the mobile nav, plus the night-mode
//! preference. Each widget family is one [`WidgetConfig`]; the page
//! builds a [`ToggleSet`] per family and renders through it.

use std::collections::BTreeSet;

pub const NIGHT_MODE_STORAGE_KEY: &str =
  "freshmath.night-mode";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum WidgetKind {
  Card,
  GradeSection,
  Tab,
  MobileNav
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct WidgetConfig {
  pub kind:         WidgetKind,
  /// Class on the clickable element.
  pub trigger_class: &'static str,
  /// Class on the element whose visibility flips.
  pub target_class: &'static str,
  /// Class added while open.
  pub open_class:   &'static str,
  /// At most one member open at a time (and, once opened, never none).
  pub exclusive:    bool
}

pub const CARD: WidgetConfig =
  WidgetConfig {
    kind:          WidgetKind::Card,
    trigger_class: "card-header",
    target_class:  "card-body",
    open_class:    "expanded",
    exclusive:     false
  };

pub const GRADE_SECTION: WidgetConfig =
  WidgetConfig {
    kind:          WidgetKind::GradeSection,
    trigger_class: "grade-header",
    target_class:  "grade-content",
    open_class:    "open",
    exclusive:     false
  };

pub const TAB: WidgetConfig =
  WidgetConfig {
    kind:          WidgetKind::Tab,
    trigger_class: "tab",
    target_class:  "tab-content",
    open_class:    "active",
    exclusive:     true
  };

pub const MOBILE_NAV: WidgetConfig =
  WidgetConfig {
    kind:          WidgetKind::MobileNav,
    trigger_class: "nav-toggle",
    target_class:  "nav-links",
    open_class:    "nav-open",
    exclusive:     false
  };

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct ToggleSet {
  config: WidgetConfig,
  open:   BTreeSet<String>
}

impl ToggleSet {
  pub fn new(config: WidgetConfig) -> Self {
    Self {
      config,
      open: BTreeSet::new()
    }
  }

  pub fn with_open(
    config: WidgetConfig,
    id: &str
  ) -> Self {
    let mut set = Self::new(config);
    set.open.insert(id.to_string());
    set
  }

  pub fn config(&self) -> WidgetConfig {
    self.config
  }

  pub fn is_open(&self, id: &str) -> bool {
    self.open.contains(id)
  }

  /// Flips `id` and returns its new state. Exclusive sets activate
  /// instead of flipping.
  pub fn toggle(&mut self, id: &str) -> bool {
    if self.config.exclusive {
      self.activate(id);
      return true;
    }
    if !self.open.remove(id) {
      self.open.insert(id.to_string());
      return true;
    }
    false
  }

  pub fn activate(&mut self, id: &str) {
    if self.config.exclusive {
      self.open.clear();
    }
    self.open.insert(id.to_string());
  }

  pub fn close_all(&mut self) {
    self.open.clear();
  }

  /// Class string for a member: target class plus the open class.
  pub fn class_for(&self, id: &str) -> String {
    if self.is_open(id) {
      format!(
        "{} {}",
        self.config.target_class,
        self.config.open_class
      )
    } else {
      self.config.target_class.to_string()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum NightMode {
  Enabled,
  #[default]
  Disabled
}

impl NightMode {
  pub fn from_storage(
    value: Option<&str>
  ) -> Self {
    match value.map(str::trim) {
      | Some("enabled") => Self::Enabled,
      | _ => Self::Disabled
    }
  }

  pub fn storage_value(
    self
  ) -> &'static str {
    match self {
      | Self::Enabled => "enabled",
      | Self::Disabled => "disabled"
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      | Self::Enabled => Self::Disabled,
      | Self::Disabled => Self::Enabled
    }
  }

  pub fn is_enabled(self) -> bool {
    matches!(self, Self::Enabled)
  }

  pub fn body_class(
    self
  ) -> &'static str {
    match self {
      | Self::Enabled => "night-mode",
      | Self::Disabled => ""
    }
  }

  pub fn toggle_label(
    self
  ) -> &'static str {
    match self {
      | Self::Enabled => "Day Mode",
      | Self::Disabled => "Night Mode"
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cards_toggle_independently() {
    let mut cards = ToggleSet::new(CARD);
    assert!(cards.toggle("ratios"));
    assert!(cards.toggle("fractions"));
    assert!(cards.is_open("ratios"));
    assert!(!cards.toggle("ratios"));
    assert!(!cards.is_open("ratios"));
    assert!(cards.is_open("fractions"));
    assert_eq!(
      cards.class_for("fractions"),
      "card-body expanded"
    );
    assert_eq!(
      cards.class_for("ratios"),
      "card-body"
    );
  }

  #[test]
  fn tabs_keep_exactly_one_active() {
    let mut tabs =
      ToggleSet::with_open(TAB, "standard");
    assert!(tabs.toggle("custom"));
    assert!(tabs.is_open("custom"));
    assert!(!tabs.is_open("standard"));
    assert!(tabs.toggle("custom"));
    assert!(tabs.is_open("custom"));
  }

  #[test]
  fn mobile_nav_closes_on_demand() {
    let mut nav = ToggleSet::new(MOBILE_NAV);
    nav.toggle("main");
    assert!(nav.is_open("main"));
    nav.close_all();
    assert!(!nav.is_open("main"));
  }

  #[test]
  fn night_mode_reads_stored_preference() {
    assert_eq!(
      NightMode::from_storage(Some(
        "enabled"
      )),
      NightMode::Enabled
    );
    assert_eq!(
      NightMode::from_storage(Some("dark")),
      NightMode::Disabled
    );
    assert_eq!(
      NightMode::from_storage(None),
      NightMode::Disabled
    );
    assert_eq!(
      NightMode::Disabled
        .toggled()
        .storage_value(),
      "enabled"
    );
  }
}

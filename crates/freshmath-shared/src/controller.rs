//! Worksheet generator page state.
//!
//! `GeneratorState` owns everything the generator page shows: the active
//! tab, the three forms, the custom spec rows, and the status slot. All
//! transitions are plain methods (or [`GeneratorState::apply`] with an
//! explicit [`GeneratorEvent`]); the caller performs the network call
//! described by a [`PendingSubmission`] and feeds the answer back
//! through [`GeneratorState::complete_submission`].

use std::fmt;

use crate::catalog::{
  self,
  Topic,
  TopicChoice
};
use crate::status::{
  DismissToken,
  StatusSlot
};
use crate::{
  CustomSpec,
  CustomWorksheetRequest,
  Difficulty,
  DifficultyMix,
  GenerationRequest,
  MAX_PROBLEMS,
  MIN_PROBLEMS,
  PracticeTestRequest,
  SubmissionKind,
  SubmissionOutcome,
  WorksheetRequest
};

pub const DEFAULT_STANDARD_PROBLEMS: u32 =
  10;
pub const DEFAULT_TEST_PROBLEMS: u32 = 20;
pub const DEFAULT_PROBLEMS_PER_LEVEL: u32 =
  3;
pub const DEFAULT_ROW_PROBLEMS: u32 = 5;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum GeneratorTab {
  #[default]
  Standard,
  PracticeTest,
  Custom
}

impl GeneratorTab {
  pub const ALL: [GeneratorTab; 3] = [
    Self::Standard,
    Self::PracticeTest,
    Self::Custom
  ];

  pub fn id(self) -> &'static str {
    match self {
      | Self::Standard => "standard",
      | Self::PracticeTest => "practice",
      | Self::Custom => "custom"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Standard => {
        "Standard Worksheet"
      }
      | Self::PracticeTest => {
        "Practice Test"
      }
      | Self::Custom => "Custom Builder"
    }
  }

  pub fn from_id(
    id: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|tab| tab.id() == id.trim())
  }
}

/// A unit dropdown paired with the topic dropdown that depends on it.
#[derive(
  Debug, Clone, PartialEq, Default,
)]
pub struct TopicPicker {
  unit:     Option<String>,
  options:  &'static [Topic],
  selected: Option<TopicChoice>
}

impl TopicPicker {
  pub fn unit(&self) -> Option<&str> {
    self.unit.as_deref()
  }

  pub fn options(
    &self
  ) -> &'static [Topic] {
    self.options
  }

  pub fn selected(
    &self
  ) -> Option<&TopicChoice> {
    self.selected.as_ref()
  }

  pub fn enabled(&self) -> bool {
    !self.options.is_empty()
  }

  pub fn is_complete(&self) -> bool {
    self.unit.is_some()
      && self.selected.is_some()
  }

  fn refresh(
    &mut self,
    unit: Option<&str>
  ) {
    let unit = unit
      .map(str::trim)
      .filter(|value| !value.is_empty());
    self.unit = unit.map(str::to_string);
    self.options = unit
      .and_then(catalog::topics_for)
      .unwrap_or(&[]);
    self.selected = None;
  }

  fn select(
    &mut self,
    option_value: &str
  ) -> bool {
    self.selected =
      TopicChoice::parse_option(
        option_value
      )
      .filter(|choice| {
        self
          .options
          .iter()
          .any(|topic| choice.matches(topic))
      });
    self.selected.is_some()
  }

  fn unit_number(&self) -> Option<f64> {
    self
      .unit
      .as_deref()
      .and_then(catalog::unit_number)
  }
}

#[derive(
  Debug, Clone, PartialEq,
)]
pub struct StandardForm {
  pub picker:       TopicPicker,
  pub difficulty:   Difficulty,
  pub num_problems: u32,
  pub title:        String
}

impl Default for StandardForm {
  fn default() -> Self {
    Self {
      picker:       TopicPicker::default(),
      difficulty:   Difficulty::Medium,
      num_problems:
        DEFAULT_STANDARD_PROBLEMS,
      title:        String::new()
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
pub enum PracticeTestType {
  #[default]
  Unit,
  Cumulative,
  Spiral
}

impl PracticeTestType {
  pub const ALL: [PracticeTestType; 3] = [
    Self::Unit,
    Self::Cumulative,
    Self::Spiral
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Unit => "unit",
      | Self::Cumulative => "cumulative",
      | Self::Spiral => "spiral"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Unit => "Unit Review",
      | Self::Cumulative => {
        "Cumulative Test"
      }
      | Self::Spiral => "Spiral Review"
    }
  }

  /// Spiral tests size themselves per difficulty level instead.
  pub fn uses_problem_count(
    self
  ) -> bool {
    !matches!(self, Self::Spiral)
  }

  pub fn from_str_value(
    value: &str
  ) -> Option<Self> {
    Self::ALL.into_iter().find(|kind| {
      kind.as_str() == value.trim()
    })
  }
}

#[derive(
  Debug, Clone, PartialEq,
)]
pub struct PracticeForm {
  pub test_type:          PracticeTestType,
  pub difficulty_mix:     DifficultyMix,
  pub review_unit:        Option<String>,
  cumulative_units:       Vec<String>,
  pub num_problems:       u32,
  pub spiral:             TopicPicker,
  pub problems_per_level: u32
}

impl Default for PracticeForm {
  fn default() -> Self {
    Self {
      test_type:          PracticeTestType::Unit,
      difficulty_mix:     DifficultyMix::Balanced,
      review_unit:        None,
      cumulative_units:   Vec::new(),
      num_problems:       DEFAULT_TEST_PROBLEMS,
      spiral:             TopicPicker::default(),
      problems_per_level: DEFAULT_PROBLEMS_PER_LEVEL
    }
  }
}

impl PracticeForm {
  /// Checked cumulative units, in catalog order.
  pub fn cumulative_units(
    &self
  ) -> &[String] {
    &self.cumulative_units
  }

  pub fn is_cumulative_checked(
    &self,
    unit: &str
  ) -> bool {
    self
      .cumulative_units
      .iter()
      .any(|value| value == unit)
  }

  fn set_cumulative(
    &mut self,
    unit: &str,
    checked: bool
  ) {
    if catalog::unit(unit).is_none() {
      return;
    }
    self
      .cumulative_units
      .retain(|value| value != unit);
    if checked {
      self
        .cumulative_units
        .push(unit.to_string());
    }
    let order = |key: &String| {
      catalog::units()
        .iter()
        .position(|entry| entry.key == key)
    };
    self
      .cumulative_units
      .sort_by_key(order);
  }
}

#[derive(
  Debug, Clone, PartialEq,
)]
pub struct CustomSpecRow {
  id:                 u64,
  pub picker:         TopicPicker,
  pub difficulty:     Difficulty,
  pub problem_count:  u32
}

impl CustomSpecRow {
  fn new(id: u64) -> Self {
    Self {
      id,
      picker: TopicPicker::default(),
      difficulty: Difficulty::Medium,
      problem_count: DEFAULT_ROW_PROBLEMS
    }
  }

  pub fn id(&self) -> u64 {
    self.id
  }

  /// Wire projection; `None` while unit or topic is unset.
  pub fn to_spec(
    &self
  ) -> Option<CustomSpec> {
    let unit = self.picker.unit_number()?;
    let choice = self.picker.selected()?;
    Some(CustomSpec {
      unit,
      topic: choice.name.clone(),
      topic_type: choice.category,
      difficulty: self.difficulty,
      num_problems: self.problem_count
    })
  }
}

#[derive(
  Debug, Clone, PartialEq, Default,
)]
pub struct CustomBuilder {
  pub title: String,
  rows:      Vec<CustomSpecRow>,
  next_id:   u64
}

impl CustomBuilder {
  pub fn rows(&self) -> &[CustomSpecRow] {
    &self.rows
  }

  fn row_mut(
    &mut self,
    id: u64
  ) -> Option<&mut CustomSpecRow> {
    self
      .rows
      .iter_mut()
      .find(|row| row.id == id)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum TopicScope {
  Standard,
  Spiral,
  CustomRow(u64)
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum ValidationError {
  MissingUnitAndTopic,
  MissingReviewUnit,
  NoCumulativeUnits,
  MissingSpiralTopic,
  MissingTitle,
  NoRows,
  IncompleteRow
}

impl fmt::Display for ValidationError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    let text = match self {
      | Self::MissingUnitAndTopic => {
        "Please select both unit and \
         topic"
      }
      | Self::MissingReviewUnit => {
        "Please select a unit to review"
      }
      | Self::NoCumulativeUnits => {
        "Please select at least one unit"
      }
      | Self::MissingSpiralTopic => {
        "Please select unit and topic"
      }
      | Self::MissingTitle => {
        "Please enter a worksheet title"
      }
      | Self::NoRows => {
        "Please add at least one topic"
      }
      | Self::IncompleteRow => {
        "Please complete all fields in \
         each row"
      }
    };
    f.write_str(text)
  }
}

impl std::error::Error for ValidationError {}

/// Identifies one issued submission. Only the newest ticket of each
/// kind may still change the page.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct SubmitTicket {
  pub kind: SubmissionKind,
  pub seq:  u64
}

#[derive(
  Debug, Clone, PartialEq,
)]
pub struct PendingSubmission {
  pub ticket:  SubmitTicket,
  pub request: GenerationRequest
}

impl PendingSubmission {
  pub fn endpoint(&self) -> &'static str {
    self.request.endpoint()
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum CompletionEffect {
  Navigate(String),
  Stay,
  Discarded
}

/// Every input the page can feed into the controller.
#[derive(
  Debug, Clone, PartialEq,
)]
pub enum GeneratorEvent {
  SelectTab(String),
  ChangeUnit {
    scope: TopicScope,
    unit:  String
  },
  SelectTopic {
    scope: TopicScope,
    value: String
  },
  SetStandardDifficulty(Difficulty),
  SetStandardProblems(String),
  SetStandardTitle(String),
  SetTestType(PracticeTestType),
  SetDifficultyMix(DifficultyMix),
  SetReviewUnit(String),
  ToggleCumulativeUnit {
    unit:    String,
    checked: bool
  },
  SetTestProblems(String),
  SetProblemsPerLevel(String),
  SetCustomTitle(String),
  AddRow,
  RemoveRow(u64),
  SetRowDifficulty {
    id:         u64,
    difficulty: Difficulty
  },
  SetRowProblems {
    id:    u64,
    value: String
  },
  Submit(SubmissionKind),
  Completed {
    ticket:  SubmitTicket,
    outcome: SubmissionOutcome
  },
  DismissStatus(DismissToken)
}

/// What the edge has to do after an event.
#[derive(
  Debug, Clone, PartialEq,
)]
pub enum Reaction {
  None,
  Send(PendingSubmission),
  Navigate(String)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorState {
  active_tab:   GeneratorTab,
  pub standard: StandardForm,
  pub practice: PracticeForm,
  pub custom:   CustomBuilder,
  status:       StatusSlot,
  issued:       [u64; 3]
}

impl Default for GeneratorState {
  fn default() -> Self {
    Self::new()
  }
}

impl GeneratorState {
  /// Fresh page: standard tab, one empty custom row.
  pub fn new() -> Self {
    let mut state = Self::empty();
    state.add_custom_spec_row();
    state
  }

  /// No custom rows at all.
  pub fn empty() -> Self {
    Self {
      active_tab: GeneratorTab::Standard,
      standard:   StandardForm::default(),
      practice:   PracticeForm::default(),
      custom:     CustomBuilder::default(),
      status:     StatusSlot::default(),
      issued:     [0; 3]
    }
  }

  pub fn active_tab(
    &self
  ) -> GeneratorTab {
    self.active_tab
  }

  pub fn status(&self) -> &StatusSlot {
    &self.status
  }

  pub fn select_tab(
    &mut self,
    name: &str
  ) -> bool {
    match GeneratorTab::from_id(name) {
      | Some(tab) => {
        tracing::debug!(
          tab = tab.id(),
          "selected generator tab"
        );
        self.active_tab = tab;
        true
      }
      | None => {
        tracing::debug!(
          name,
          "ignoring unknown tab"
        );
        false
      }
    }
  }

  pub fn picker(
    &self,
    scope: TopicScope
  ) -> Option<&TopicPicker> {
    match scope {
      | TopicScope::Standard => {
        Some(&self.standard.picker)
      }
      | TopicScope::Spiral => {
        Some(&self.practice.spiral)
      }
      | TopicScope::CustomRow(id) => self
        .custom
        .rows
        .iter()
        .find(|row| row.id == id)
        .map(|row| &row.picker)
    }
  }

  fn picker_mut(
    &mut self,
    scope: TopicScope
  ) -> Option<&mut TopicPicker> {
    match scope {
      | TopicScope::Standard => {
        Some(&mut self.standard.picker)
      }
      | TopicScope::Spiral => {
        Some(&mut self.practice.spiral)
      }
      | TopicScope::CustomRow(id) => self
        .custom
        .row_mut(id)
        .map(|row| &mut row.picker)
    }
  }

  /// Repopulates the scope's topics for `unit` and clears its topic.
  pub fn refresh_topics_for(
    &mut self,
    scope: TopicScope,
    unit: Option<&str>
  ) {
    let Some(picker) =
      self.picker_mut(scope)
    else {
      tracing::debug!(
        ?scope,
        "no picker for scope"
      );
      return;
    };
    picker.refresh(unit);
    tracing::debug!(
      ?scope,
      unit = ?picker.unit(),
      options = picker.options().len(),
      "refreshed topics"
    );
  }

  pub fn select_topic(
    &mut self,
    scope: TopicScope,
    option_value: &str
  ) -> bool {
    self
      .picker_mut(scope)
      .is_some_and(|picker| {
        picker.select(option_value)
      })
  }

  pub fn add_custom_spec_row(
    &mut self
  ) -> u64 {
    self.custom.next_id += 1;
    let id = self.custom.next_id;
    self
      .custom
      .rows
      .push(CustomSpecRow::new(id));
    id
  }

  pub fn remove_custom_spec_row(
    &mut self,
    id: u64
  ) -> bool {
    let before = self.custom.rows.len();
    self
      .custom
      .rows
      .retain(|row| row.id != id);
    before != self.custom.rows.len()
  }

  pub fn set_row_difficulty(
    &mut self,
    id: u64,
    difficulty: Difficulty
  ) {
    if let Some(row) =
      self.custom.row_mut(id)
    {
      row.difficulty = difficulty;
    }
  }

  pub fn set_row_problems(
    &mut self,
    id: u64,
    raw: &str
  ) {
    if let Some(row) =
      self.custom.row_mut(id)
    {
      row.problem_count = clamp_count(
        raw,
        row.problem_count
      );
    }
  }

  pub fn set_standard_problems(
    &mut self,
    raw: &str
  ) {
    self.standard.num_problems =
      clamp_count(
        raw,
        self.standard.num_problems
      );
  }

  pub fn set_test_problems(
    &mut self,
    raw: &str
  ) {
    self.practice.num_problems =
      parse_positive(
        raw,
        self.practice.num_problems
      );
  }

  pub fn set_problems_per_level(
    &mut self,
    raw: &str
  ) {
    self.practice.problems_per_level =
      parse_positive(
        raw,
        self.practice.problems_per_level
      );
  }

  pub fn set_review_unit(
    &mut self,
    unit: &str
  ) {
    let unit = unit.trim();
    self.practice.review_unit =
      (!unit.is_empty())
        .then(|| unit.to_string());
  }

  pub fn toggle_cumulative_unit(
    &mut self,
    unit: &str,
    checked: bool
  ) {
    self
      .practice
      .set_cumulative(unit, checked);
  }

  pub fn submit_standard(
    &mut self
  ) -> Result<PendingSubmission, ValidationError>
  {
    let result = build_standard(
      &self.standard
    );
    self.issue(
      SubmissionKind::Standard,
      result
    )
  }

  pub fn submit_practice_test(
    &mut self
  ) -> Result<PendingSubmission, ValidationError>
  {
    let result = build_practice(
      &self.practice
    );
    self.issue(
      SubmissionKind::PracticeTest,
      result
    )
  }

  pub fn submit_custom(
    &mut self
  ) -> Result<PendingSubmission, ValidationError>
  {
    let result =
      build_custom(&self.custom);
    self.issue(
      SubmissionKind::Custom,
      result
    )
  }

  pub fn submit(
    &mut self,
    kind: SubmissionKind
  ) -> Result<PendingSubmission, ValidationError>
  {
    match kind {
      | SubmissionKind::Standard => {
        self.submit_standard()
      }
      | SubmissionKind::PracticeTest => {
        self.submit_practice_test()
      }
      | SubmissionKind::Custom => {
        self.submit_custom()
      }
    }
  }

  fn issue(
    &mut self,
    kind: SubmissionKind,
    result: Result<
      GenerationRequest,
      ValidationError
    >
  ) -> Result<PendingSubmission, ValidationError>
  {
    let request = match result {
      | Ok(request) => request,
      | Err(err) => {
        tracing::info!(
          kind = kind.noun(),
          error = %err,
          "rejected submission locally"
        );
        self.status.error(err.to_string());
        return Err(err);
      }
    };

    let slot = &mut self.issued[kind.index()];
    *slot = slot.wrapping_add(1);
    let ticket = SubmitTicket {
      kind,
      seq: *slot
    };
    self.status.loading(format!(
      "Generating {}...",
      kind.noun()
    ));
    tracing::info!(
      kind = kind.noun(),
      seq = ticket.seq,
      endpoint = request.endpoint(),
      "issued submission"
    );
    Ok(PendingSubmission {
      ticket,
      request
    })
  }

  pub fn is_latest(
    &self,
    ticket: SubmitTicket
  ) -> bool {
    self.issued[ticket.kind.index()]
      == ticket.seq
  }

  pub fn complete_submission(
    &mut self,
    ticket: SubmitTicket,
    outcome: SubmissionOutcome
  ) -> CompletionEffect {
    if !self.is_latest(ticket) {
      tracing::info!(
        kind = ticket.kind.noun(),
        seq = ticket.seq,
        latest =
          self.issued[ticket.kind.index()],
        "discarding stale response"
      );
      return CompletionEffect::Discarded;
    }

    let noun = ticket.kind.noun();
    match outcome {
      | SubmissionOutcome::Completed(
        result
      ) if result.success => {
        let mut noun_title =
          noun.to_string();
        if let Some(first) =
          noun_title.get_mut(..1)
        {
          first.make_ascii_uppercase();
        }
        self.status.success(format!(
          "{noun_title} generated \
           successfully! Saved to: {}",
          result
            .path
            .as_deref()
            .unwrap_or("(unknown)")
        ));
        match result.download_url {
          | Some(url)
            if !url.trim().is_empty() =>
          {
            CompletionEffect::Navigate(url)
          }
          | _ => {
            tracing::warn!(
              kind = noun,
              "success without download url"
            );
            CompletionEffect::Stay
          }
        }
      }
      | SubmissionOutcome::Completed(
        result
      ) => {
        self.status.error(format!(
          "Error: {}",
          result
            .error
            .as_deref()
            .unwrap_or("unknown error")
        ));
        CompletionEffect::Stay
      }
      | SubmissionOutcome::Transport(
        message
      ) => {
        self.status.error(format!(
          "Error generating {noun}: \
           {message}"
        ));
        CompletionEffect::Stay
      }
    }
  }

  pub fn dismiss_status(
    &mut self,
    token: DismissToken
  ) -> bool {
    self.status.dismiss(token)
  }

  /// Applies one page event. Pure apart from the returned reaction.
  pub fn apply(
    &mut self,
    event: GeneratorEvent
  ) -> Reaction {
    match event {
      | GeneratorEvent::SelectTab(name) => {
        self.select_tab(&name);
      }
      | GeneratorEvent::ChangeUnit {
        scope,
        unit
      } => {
        self.refresh_topics_for(
          scope,
          Some(&unit)
        );
      }
      | GeneratorEvent::SelectTopic {
        scope,
        value
      } => {
        self.select_topic(scope, &value);
      }
      | GeneratorEvent::SetStandardDifficulty(
        difficulty
      ) => {
        self.standard.difficulty =
          difficulty;
      }
      | GeneratorEvent::SetStandardProblems(
        raw
      ) => self.set_standard_problems(&raw),
      | GeneratorEvent::SetStandardTitle(
        title
      ) => {
        self.standard.title = title;
      }
      | GeneratorEvent::SetTestType(
        test_type
      ) => {
        self.practice.test_type =
          test_type;
      }
      | GeneratorEvent::SetDifficultyMix(
        mix
      ) => {
        self.practice.difficulty_mix = mix;
      }
      | GeneratorEvent::SetReviewUnit(
        unit
      ) => self.set_review_unit(&unit),
      | GeneratorEvent::ToggleCumulativeUnit {
        unit,
        checked
      } => self.toggle_cumulative_unit(
        &unit, checked
      ),
      | GeneratorEvent::SetTestProblems(
        raw
      ) => self.set_test_problems(&raw),
      | GeneratorEvent::SetProblemsPerLevel(
        raw
      ) => self.set_problems_per_level(&raw),
      | GeneratorEvent::SetCustomTitle(
        title
      ) => {
        self.custom.title = title;
      }
      | GeneratorEvent::AddRow => {
        self.add_custom_spec_row();
      }
      | GeneratorEvent::RemoveRow(id) => {
        self.remove_custom_spec_row(id);
      }
      | GeneratorEvent::SetRowDifficulty {
        id,
        difficulty
      } => {
        self.set_row_difficulty(
          id, difficulty
        )
      }
      | GeneratorEvent::SetRowProblems {
        id,
        value
      } => self.set_row_problems(id, &value),
      | GeneratorEvent::Submit(kind) => {
        if let Ok(pending) =
          self.submit(kind)
        {
          return Reaction::Send(pending);
        }
      }
      | GeneratorEvent::Completed {
        ticket,
        outcome
      } => {
        if let CompletionEffect::Navigate(
          url
        ) = self.complete_submission(
          ticket, outcome
        ) {
          return Reaction::Navigate(url);
        }
      }
      | GeneratorEvent::DismissStatus(
        token
      ) => {
        self.dismiss_status(token);
      }
    }
    Reaction::None
  }
}

fn build_standard(
  form: &StandardForm
) -> Result<GenerationRequest, ValidationError>
{
  let unit = form
    .picker
    .unit_number()
    .ok_or(
      ValidationError::MissingUnitAndTopic
    )?;
  let choice =
    form.picker.selected().ok_or(
      ValidationError::MissingUnitAndTopic
    )?;
  Ok(GenerationRequest::Worksheet(
    WorksheetRequest {
      unit,
      topic: choice.name.clone(),
      topic_type: choice.category,
      difficulty: form.difficulty,
      num_problems: form.num_problems,
      custom_title: form.title.clone()
    }
  ))
}

fn build_practice(
  form: &PracticeForm
) -> Result<GenerationRequest, ValidationError>
{
  let difficulty_mix = form.difficulty_mix;
  let request = match form.test_type {
    | PracticeTestType::Unit => {
      let unit = form
        .review_unit
        .as_deref()
        .and_then(catalog::unit_number)
        .ok_or(
          ValidationError::MissingReviewUnit
        )?;
      PracticeTestRequest::Unit {
        unit,
        num_problems: form.num_problems,
        difficulty_mix
      }
    }
    | PracticeTestType::Cumulative => {
      let units: Vec<f64> = form
        .cumulative_units
        .iter()
        .filter_map(|unit| {
          catalog::unit_number(unit)
        })
        .collect();
      if units.is_empty() {
        return Err(
          ValidationError::NoCumulativeUnits
        );
      }
      PracticeTestRequest::Cumulative {
        units,
        num_problems: form.num_problems,
        difficulty_mix
      }
    }
    | PracticeTestType::Spiral => {
      let unit =
        form.spiral.unit_number().ok_or(
          ValidationError::MissingSpiralTopic
        )?;
      let choice =
        form.spiral.selected().ok_or(
          ValidationError::MissingSpiralTopic
        )?;
      PracticeTestRequest::Spiral {
        unit,
        topic: choice.name.clone(),
        topic_type: choice.category,
        problems_per_level: form
          .problems_per_level,
        difficulty_mix
      }
    }
  };
  Ok(GenerationRequest::PracticeTest(
    request
  ))
}

fn build_custom(
  builder: &CustomBuilder
) -> Result<GenerationRequest, ValidationError>
{
  let title = builder.title.trim();
  if title.is_empty() {
    return Err(
      ValidationError::MissingTitle
    );
  }
  if builder.rows.is_empty() {
    return Err(ValidationError::NoRows);
  }

  let specs = builder
    .rows
    .iter()
    .map(CustomSpecRow::to_spec)
    .collect::<Option<Vec<_>>>()
    .ok_or(ValidationError::IncompleteRow)?;

  Ok(GenerationRequest::Custom(
    CustomWorksheetRequest {
      title: builder.title.clone(),
      specs
    }
  ))
}

/// Integer prefix of a field value: `"5.5"` is 5, `"12 problems"` is 12,
/// `"x5"` is nothing.
fn leading_integer(
  raw: &str
) -> Option<i64> {
  let text = raw.trim_start();
  let (sign, digits) =
    match text.strip_prefix('-') {
      | Some(rest) => (-1, rest),
      | None => (
        1,
        text
          .strip_prefix('+')
          .unwrap_or(text)
      )
    };
  let end = digits
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(digits.len());
  digits[..end]
    .parse::<i64>()
    .ok()
    .map(|value| sign * value)
}

fn clamp_count(
  raw: &str,
  current: u32
) -> u32 {
  match leading_integer(raw) {
    | Some(value) => value.clamp(
      i64::from(MIN_PROBLEMS),
      i64::from(MAX_PROBLEMS)
    ) as u32,
    | None => current
  }
}

fn parse_positive(
  raw: &str,
  current: u32
) -> u32 {
  match leading_integer(raw)
    .and_then(|value| u32::try_from(value).ok())
  {
    | Some(value) if value > 0 => value,
    | _ => current
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::GenerationResult;

  fn complete_row(
    state: &mut GeneratorState,
    unit: &str,
    topic: &str
  ) -> u64 {
    let id = state.add_custom_spec_row();
    state.refresh_topics_for(
      TopicScope::CustomRow(id),
      Some(unit)
    );
    assert!(state.select_topic(
      TopicScope::CustomRow(id),
      topic
    ));
    id
  }

  #[test]
  fn new_page_starts_with_one_default_row()
   {
    let state = GeneratorState::new();
    assert_eq!(
      state.active_tab(),
      GeneratorTab::Standard
    );
    let rows = state.custom.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(
      rows[0].difficulty,
      Difficulty::Medium
    );
    assert_eq!(rows[0].problem_count, 5);
    assert!(rows[0].picker.unit().is_none());
    assert!(!rows[0].picker.enabled());
  }

  #[test]
  fn select_tab_ignores_unknown_names() {
    let mut state = GeneratorState::new();
    assert!(state.select_tab("custom"));
    assert_eq!(
      state.active_tab(),
      GeneratorTab::Custom
    );
    assert!(!state.select_tab("reports"));
    assert_eq!(
      state.active_tab(),
      GeneratorTab::Custom
    );
  }

  #[test]
  fn refresh_populates_catalog_topics_in_order()
   {
    let mut state = GeneratorState::new();
    for entry in catalog::units() {
      state.refresh_topics_for(
        TopicScope::Standard,
        Some(entry.key)
      );
      let picker = &state.standard.picker;
      assert!(picker.enabled());
      assert_eq!(
        picker.options(),
        entry.topics
      );
      assert!(picker.selected().is_none());
    }
  }

  #[test]
  fn refresh_with_unknown_or_unset_unit_disables()
   {
    let mut state = GeneratorState::new();
    state.refresh_topics_for(
      TopicScope::Spiral,
      Some("2.0")
    );
    assert!(state.select_topic(
      TopicScope::Spiral,
      "Equations|Intro"
    ));

    state.refresh_topics_for(
      TopicScope::Spiral,
      Some("9.0")
    );
    let picker = &state.practice.spiral;
    assert!(!picker.enabled());
    assert!(picker.options().is_empty());
    assert!(picker.selected().is_none());

    state.refresh_topics_for(
      TopicScope::Spiral,
      None
    );
    assert!(
      state.practice.spiral.unit().is_none()
    );
    assert!(!state.practice.spiral.enabled());
  }

  #[test]
  fn changing_unit_clears_chosen_topic() {
    let mut state = GeneratorState::new();
    let id = complete_row(
      &mut state,
      "2.0",
      "Equations|Intro"
    );
    state.refresh_topics_for(
      TopicScope::CustomRow(id),
      Some("4.0")
    );
    let row = &state.custom.rows()[1];
    assert_eq!(row.picker.unit(), Some("4.0"));
    assert!(row.picker.selected().is_none());
    assert!(row.to_spec().is_none());
  }

  #[test]
  fn topic_from_another_unit_is_rejected()
   {
    let mut state = GeneratorState::new();
    state.refresh_topics_for(
      TopicScope::Standard,
      Some("4.0")
    );
    assert!(!state.select_topic(
      TopicScope::Standard,
      "Equations|Intro"
    ));
    assert!(
      state
        .standard
        .picker
        .selected()
        .is_none()
    );
  }

  #[test]
  fn add_then_remove_restores_rows() {
    let mut state = GeneratorState::new();
    let before = state.custom.clone();
    let id = state.add_custom_spec_row();
    assert!(state.remove_custom_spec_row(id));
    assert_eq!(
      state.custom.rows(),
      before.rows()
    );
    assert!(!state.remove_custom_spec_row(id));
    assert!(!state.remove_custom_spec_row(404));
    assert_eq!(
      state.custom.rows(),
      before.rows()
    );
  }

  #[test]
  fn row_ids_are_never_reused() {
    let mut state = GeneratorState::empty();
    let first = state.add_custom_spec_row();
    state.remove_custom_spec_row(first);
    let second = state.add_custom_spec_row();
    let third = state.add_custom_spec_row();
    assert_ne!(first, second);
    assert_ne!(second, third);
    assert!(second > first && third > second);
  }

  #[test]
  fn row_problem_count_is_clamped() {
    let mut state = GeneratorState::new();
    let id = state.custom.rows()[0].id();
    state.set_row_problems(id, "50");
    assert_eq!(
      state.custom.rows()[0].problem_count,
      20
    );
    state.set_row_problems(id, "0");
    assert_eq!(
      state.custom.rows()[0].problem_count,
      1
    );
    state.set_row_problems(id, "lots");
    assert_eq!(
      state.custom.rows()[0].problem_count,
      1
    );
  }

  #[test]
  fn counts_read_the_leading_integer() {
    let mut state = GeneratorState::new();
    let id = state.custom.rows()[0].id();
    state.set_row_problems(id, "5.5");
    assert_eq!(
      state.custom.rows()[0].problem_count,
      5
    );
    state.set_standard_problems(" 12 problems");
    assert_eq!(state.standard.num_problems, 12);
    state.set_standard_problems("-3");
    assert_eq!(state.standard.num_problems, 1);

    state.set_test_problems("25.9");
    assert_eq!(state.practice.num_problems, 25);
    state.set_problems_per_level("x4");
    let kept = state.practice.problems_per_level;
    state.set_problems_per_level("-2");
    assert_eq!(
      state.practice.problems_per_level,
      kept
    );
  }

  #[test]
  fn standard_without_topic_is_rejected_locally()
   {
    let mut state = GeneratorState::new();
    state.refresh_topics_for(
      TopicScope::Standard,
      Some("2.0")
    );
    let err = state
      .submit_standard()
      .expect_err("topic is required");
    assert_eq!(
      err,
      ValidationError::MissingUnitAndTopic
    );
    let status = state
      .status()
      .current()
      .expect("error shown");
    assert_eq!(
      status.text,
      "Please select both unit and topic"
    );
    assert!(state.is_latest(SubmitTicket {
      kind: SubmissionKind::Standard,
      seq:  0
    }));
  }

  #[test]
  fn standard_submission_serializes_form() {
    let mut state = GeneratorState::new();
    state.apply(GeneratorEvent::ChangeUnit {
      scope: TopicScope::Standard,
      unit:  "3.0".to_string()
    });
    state.apply(GeneratorEvent::SelectTopic {
      scope: TopicScope::Standard,
      value: "One-Step Inequalities|Graphing"
        .to_string()
    });
    state.apply(
      GeneratorEvent::SetStandardTitle(
        "Quiz".to_string()
      )
    );
    let Reaction::Send(pending) = state
      .apply(GeneratorEvent::Submit(
        SubmissionKind::Standard
      ))
    else {
      panic!("expected a submission");
    };

    assert_eq!(
      pending.endpoint(),
      "/api/generate-worksheet"
    );
    assert_eq!(
      serde_json::to_value(&pending.request)
        .expect("serialize"),
      json!({
        "unit": 3.0,
        "topic": "One-Step Inequalities",
        "topicType": "Graphing",
        "difficulty": "medium",
        "numProblems": 10,
        "customTitle": "Quiz"
      })
    );
    assert!(state.status().is_loading());
  }

  #[test]
  fn practice_test_rules_follow_test_type() {
    let mut state = GeneratorState::new();
    assert_eq!(
      state.submit_practice_test(),
      Err(ValidationError::MissingReviewUnit)
    );

    state.practice.test_type =
      PracticeTestType::Cumulative;
    assert_eq!(
      state.submit_practice_test(),
      Err(ValidationError::NoCumulativeUnits)
    );
    state.toggle_cumulative_unit("4.0", true);
    state.toggle_cumulative_unit("1.0", true);
    state.toggle_cumulative_unit("7.0", true);
    let pending = state
      .submit_practice_test()
      .expect("units selected");
    assert_eq!(
      pending.request,
      GenerationRequest::PracticeTest(
        PracticeTestRequest::Cumulative {
          units:          vec![1.0, 4.0],
          num_problems:   20,
          difficulty_mix:
            DifficultyMix::Balanced
        }
      )
    );

    state.practice.test_type =
      PracticeTestType::Spiral;
    state.refresh_topics_for(
      TopicScope::Spiral,
      Some("11.0")
    );
    assert_eq!(
      state.submit_practice_test(),
      Err(ValidationError::MissingSpiralTopic)
    );
    state.select_topic(
      TopicScope::Spiral,
      "Using Vertex Form|Graphing"
    );
    let pending = state
      .submit_practice_test()
      .expect("spiral complete");
    assert_eq!(pending.ticket.seq, 2);
  }

  #[test]
  fn custom_rules_report_first_failure() {
    let mut state = GeneratorState::empty();
    assert_eq!(
      state.submit_custom(),
      Err(ValidationError::MissingTitle)
    );
    state.custom.title = "Packet".into();
    assert_eq!(
      state.submit_custom(),
      Err(ValidationError::NoRows)
    );
    complete_row(
      &mut state,
      "2.0",
      "Equations|Intro"
    );
    state.add_custom_spec_row();
    assert_eq!(
      state.submit_custom(),
      Err(ValidationError::IncompleteRow)
    );
  }

  #[test]
  fn custom_submission_mirrors_rows() {
    let mut state = GeneratorState::empty();
    state.custom.title =
      "Week 3 Packet".to_string();
    complete_row(
      &mut state,
      "2.0",
      "Equations|Intro"
    );
    let second = complete_row(
      &mut state,
      "4.0",
      "Slope-Intercept Form|Graphing"
    );
    state.set_row_difficulty(
      second,
      Difficulty::Hard
    );
    state.set_row_problems(second, "8");

    let pending = state
      .submit_custom()
      .expect("complete rows");
    assert_eq!(
      pending.endpoint(),
      "/api/generate-custom"
    );
    assert_eq!(
      serde_json::to_value(&pending.request)
        .expect("serialize"),
      json!({
        "title": "Week 3 Packet",
        "specs": [
          {
            "unit": 2.0,
            "topic": "Equations",
            "topicType": "Intro",
            "difficulty": "medium",
            "numProblems": 5
          },
          {
            "unit": 4.0,
            "topic": "Slope-Intercept Form",
            "topicType": "Graphing",
            "difficulty": "hard",
            "numProblems": 8
          }
        ]
      })
    );
  }

  #[test]
  fn success_navigates_to_download_url() {
    let mut state = GeneratorState::empty();
    state.custom.title = "T".into();
    complete_row(
      &mut state,
      "3.0",
      "One-Step Inequalities|Graphing"
    );
    let pending = state
      .submit_custom()
      .expect("valid");

    let effect = state.complete_submission(
      pending.ticket,
      SubmissionOutcome::Completed(
        GenerationResult {
          success: true,
          path: Some("out/x.pdf".into()),
          download_url: Some(
            "/files/x.pdf".into()
          ),
          error: None
        }
      )
    );
    assert_eq!(
      effect,
      CompletionEffect::Navigate(
        "/files/x.pdf".to_string()
      )
    );
    let status = state
      .status()
      .current()
      .expect("success shown");
    assert_eq!(
      status.text,
      "Custom worksheet generated \
       successfully! Saved to: out/x.pdf"
    );
  }

  #[test]
  fn backend_error_is_shown_without_navigation()
   {
    let mut state = GeneratorState::new();
    state.set_review_unit("2.0");
    let pending = state
      .submit_practice_test()
      .expect("valid");

    let effect = state.complete_submission(
      pending.ticket,
      SubmissionOutcome::Completed(
        GenerationResult {
          success: false,
          error: Some("bad unit".into()),
          ..GenerationResult::default()
        }
      )
    );
    assert_eq!(effect, CompletionEffect::Stay);
    let text = &state
      .status()
      .current()
      .expect("error shown")
      .text;
    assert!(text.contains("bad unit"));

    let pending = state
      .submit_practice_test()
      .expect("valid");
    state.complete_submission(
      pending.ticket,
      SubmissionOutcome::Transport(
        "connection refused".into()
      )
    );
    assert_eq!(
      state
        .status()
        .current()
        .map(|message| message.text.as_str()),
      Some(
        "Error generating practice test: \
         connection refused"
      )
    );
  }

  #[test]
  fn stale_response_cannot_overwrite_newer_result()
   {
    let mut state = GeneratorState::new();
    state.set_review_unit("1.0");
    let first = state
      .submit_practice_test()
      .expect("valid");
    let second = state
      .submit_practice_test()
      .expect("valid");

    let reaction = state.apply(
      GeneratorEvent::Completed {
        ticket:  second.ticket,
        outcome:
          SubmissionOutcome::Transport(
            "timeout".into()
          )
      }
    );
    assert_eq!(reaction, Reaction::None);
    let shown = state.status().clone();

    let reaction = state.apply(
      GeneratorEvent::Completed {
        ticket:  first.ticket,
        outcome:
          SubmissionOutcome::Completed(
            GenerationResult {
              success: true,
              download_url: Some(
                "/files/old.pdf".into()
              ),
              ..GenerationResult::default()
            }
          )
      }
    );
    assert_eq!(reaction, Reaction::None);
    assert_eq!(state.status(), &shown);
  }

  #[test]
  fn tickets_are_tracked_per_kind() {
    let mut state = GeneratorState::empty();
    state.set_review_unit("1.0");
    state.custom.title = "T".into();
    complete_row(
      &mut state,
      "1.0",
      "Introduction to Statistics|Intro"
    );
    let practice = state
      .submit_practice_test()
      .expect("valid");
    let custom = state
      .submit_custom()
      .expect("valid");
    assert!(state.is_latest(practice.ticket));
    assert!(state.is_latest(custom.ticket));
  }

  #[test]
  fn dismiss_event_clears_terminal_status()
   {
    let mut state = GeneratorState::new();
    let _ = state.submit_standard();
    let token = state
      .status()
      .dismiss_token()
      .expect("error armed");
    state.apply(
      GeneratorEvent::DismissStatus(token)
    );
    assert!(state.status().is_idle());
  }
}

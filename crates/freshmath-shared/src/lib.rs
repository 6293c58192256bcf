pub mod catalog;
pub mod controller;
pub mod status;
pub mod widgets;

use std::fmt;
use std::str::FromStr;

use serde::{
  Deserialize,
  Serialize
};

pub const GENERATE_WORKSHEET_PATH: &str =
  "/api/generate-worksheet";
pub const GENERATE_PRACTICE_TEST_PATH:
  &str = "/api/generate-practice-test";
pub const GENERATE_CUSTOM_PATH: &str =
  "/api/generate-custom";

pub const MIN_PROBLEMS: u32 = 1;
pub const MAX_PROBLEMS: u32 = 20;

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub enum TopicCategory {
  Intro,
  Graphing
}

impl TopicCategory {
  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Intro => "Intro",
      | Self::Graphing => "Graphing"
    }
  }
}

impl fmt::Display for TopicCategory {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TopicCategory {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s.trim() {
      | "Intro" => Ok(Self::Intro),
      | "Graphing" => Ok(Self::Graphing),
      | other => Err(format!(
        "unknown topic category: \
         {other}"
      ))
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
  Challenge
}

impl Difficulty {
  pub const ALL: [Difficulty; 4] = [
    Self::Easy,
    Self::Medium,
    Self::Hard,
    Self::Challenge
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Easy => "easy",
      | Self::Medium => "medium",
      | Self::Hard => "hard",
      | Self::Challenge => "challenge"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Easy => "Easy",
      | Self::Medium => "Medium",
      | Self::Hard => "Hard",
      | Self::Challenge => "Challenge"
    }
  }
}

impl FromStr for Difficulty {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|value| {
        value.as_str()
          == s.trim().to_ascii_lowercase()
      })
      .ok_or_else(|| {
        format!(
          "unknown difficulty: {s}"
        )
      })
  }
}

/// How a practice test spreads problems across difficulty tiers.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyMix {
  Easy,
  Medium,
  Hard,
  Challenge,
  #[default]
  Balanced,
  Progressive
}

impl DifficultyMix {
  pub const ALL: [DifficultyMix; 6] = [
    Self::Balanced,
    Self::Progressive,
    Self::Easy,
    Self::Medium,
    Self::Hard,
    Self::Challenge
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | Self::Easy => "easy",
      | Self::Medium => "medium",
      | Self::Hard => "hard",
      | Self::Challenge => "challenge",
      | Self::Balanced => "balanced",
      | Self::Progressive => {
        "progressive"
      }
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Easy => "All Easy",
      | Self::Medium => "All Medium",
      | Self::Hard => "All Hard",
      | Self::Challenge => {
        "All Challenge"
      }
      | Self::Balanced => "Balanced",
      | Self::Progressive => {
        "Progressive (easy to hard)"
      }
    }
  }
}

impl FromStr for DifficultyMix {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|value| {
        value.as_str()
          == s.trim().to_ascii_lowercase()
      })
      .ok_or_else(|| {
        format!(
          "unknown difficulty mix: {s}"
        )
      })
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetRequest {
  pub unit:         f64,
  pub topic:        String,
  pub topic_type:   TopicCategory,
  pub difficulty:   Difficulty,
  pub num_problems: u32,
  pub custom_title: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(
  tag = "testType",
  rename_all = "lowercase",
  rename_all_fields = "camelCase"
)]
pub enum PracticeTestRequest {
  Unit {
    unit:           f64,
    num_problems:   u32,
    difficulty_mix: DifficultyMix
  },
  Cumulative {
    units:          Vec<f64>,
    num_problems:   u32,
    difficulty_mix: DifficultyMix
  },
  Spiral {
    unit:               f64,
    topic:              String,
    topic_type:         TopicCategory,
    problems_per_level: u32,
    difficulty_mix:     DifficultyMix
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct CustomSpec {
  pub unit:         f64,
  pub topic:        String,
  pub topic_type:   TopicCategory,
  pub difficulty:   Difficulty,
  pub num_problems: u32
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct CustomWorksheetRequest {
  pub title: String,
  pub specs: Vec<CustomSpec>
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
)]
pub enum SubmissionKind {
  Standard,
  PracticeTest,
  Custom
}

impl SubmissionKind {
  pub const ALL: [SubmissionKind; 3] = [
    Self::Standard,
    Self::PracticeTest,
    Self::Custom
  ];

  pub fn endpoint(self) -> &'static str {
    match self {
      | Self::Standard => {
        GENERATE_WORKSHEET_PATH
      }
      | Self::PracticeTest => {
        GENERATE_PRACTICE_TEST_PATH
      }
      | Self::Custom => {
        GENERATE_CUSTOM_PATH
      }
    }
  }

  /// Noun used in status messages.
  pub fn noun(self) -> &'static str {
    match self {
      | Self::Standard => "worksheet",
      | Self::PracticeTest => {
        "practice test"
      }
      | Self::Custom => {
        "custom worksheet"
      }
    }
  }

  pub(crate) fn index(self) -> usize {
    match self {
      | Self::Standard => 0,
      | Self::PracticeTest => 1,
      | Self::Custom => 2
    }
  }
}

/// Body of one outbound generation call. Serializes as the bare inner
/// shape; the endpoint is chosen by the variant.
#[derive(
  Debug, Clone, Serialize, PartialEq,
)]
#[serde(untagged)]
pub enum GenerationRequest {
  Worksheet(WorksheetRequest),
  PracticeTest(PracticeTestRequest),
  Custom(CustomWorksheetRequest)
}

impl GenerationRequest {
  pub fn kind(&self) -> SubmissionKind {
    match self {
      | Self::Worksheet(_) => {
        SubmissionKind::Standard
      }
      | Self::PracticeTest(_) => {
        SubmissionKind::PracticeTest
      }
      | Self::Custom(_) => {
        SubmissionKind::Custom
      }
    }
  }

  pub fn endpoint(&self) -> &'static str {
    self.kind().endpoint()
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
  #[serde(default)]
  pub success:      bool,
  #[serde(default)]
  pub path:         Option<String>,
  #[serde(default)]
  pub download_url: Option<String>,
  #[serde(default)]
  pub error:        Option<String>
}

/// What came back for a submission: a decoded backend result, or the
/// reason none could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
  Completed(GenerationResult),
  Transport(String)
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct ContactSubmission {
  #[serde(
    default,
    deserialize_with = "loose_text"
  )]
  pub name:    String,
  #[serde(
    default,
    deserialize_with = "loose_text"
  )]
  pub email:   String,
  #[serde(
    default,
    deserialize_with = "loose_text"
  )]
  pub subject: String,
  #[serde(
    default,
    deserialize_with = "loose_optional_text"
  )]
  pub grade:   Option<String>,
  #[serde(
    default,
    deserialize_with = "loose_text"
  )]
  pub message: String
}

/// Form posts are not strictly typed: `null` reads as empty and numbers
/// or booleans read as their text.
fn loose_text<'de, D>(
  deserializer: D
) -> Result<String, D::Error>
where
  D: serde::Deserializer<'de>
{
  Ok(
    loose_optional_text(deserializer)?
      .unwrap_or_default()
  )
}

fn loose_optional_text<'de, D>(
  deserializer: D
) -> Result<Option<String>, D::Error>
where
  D: serde::Deserializer<'de>
{
  let value =
    serde_json::Value::deserialize(
      deserializer
    )?;
  Ok(match value {
    | serde_json::Value::String(text) => {
      Some(text)
    }
    | serde_json::Value::Number(n) => {
      Some(n.to_string())
    }
    | serde_json::Value::Bool(flag) => {
      Some(flag.to_string())
    }
    | serde_json::Value::Null
    | serde_json::Value::Array(_)
    | serde_json::Value::Object(_) => None
  })
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct RelayResponse {
  pub success: bool,
  pub message: String,
  #[serde(default)]
  pub data:
    serde_json::Map<String, serde_json::Value>
}

impl RelayResponse {
  pub fn new(
    success: bool,
    message: impl Into<String>
  ) -> Self {
    Self {
      success,
      message: message.into(),
      data: serde_json::Map::new()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct RelayHealth {
  pub status:  String,
  pub message: String
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn practice_test_request_is_tagged_by_test_type()
   {
    let body = serde_json::to_value(
      GenerationRequest::PracticeTest(
        PracticeTestRequest::Spiral {
          unit:               4.0,
          topic:              "Standard Form"
            .to_string(),
          topic_type:
            TopicCategory::Graphing,
          problems_per_level: 3,
          difficulty_mix:
            DifficultyMix::Balanced
        }
      )
    )
    .expect("serialize");

    assert_eq!(
      body,
      json!({
        "testType": "spiral",
        "unit": 4.0,
        "topic": "Standard Form",
        "topicType": "Graphing",
        "problemsPerLevel": 3,
        "difficultyMix": "balanced"
      })
    );
  }

  #[test]
  fn cumulative_request_carries_unit_list()
   {
    let body = serde_json::to_value(
      PracticeTestRequest::Cumulative {
        units:          vec![1.0, 2.0],
        num_problems:   20,
        difficulty_mix:
          DifficultyMix::Progressive
      }
    )
    .expect("serialize");

    assert_eq!(body["testType"], "cumulative");
    assert_eq!(body["units"], json!([1.0, 2.0]));
    assert_eq!(body["numProblems"], 20);
    assert_eq!(
      body["difficultyMix"],
      "progressive"
    );
  }

  #[test]
  fn generation_result_tolerates_missing_fields()
   {
    let result: GenerationResult =
      serde_json::from_str(
        r#"{"success":false,"error":"bad unit"}"#
      )
      .expect("decode");
    assert!(!result.success);
    assert_eq!(
      result.error.as_deref(),
      Some("bad unit")
    );
    assert!(result.download_url.is_none());

    let result: GenerationResult =
      serde_json::from_str(
        r#"{"success":true,"path":"out/x.pdf","downloadUrl":"/files/x.pdf"}"#
      )
      .expect("decode");
    assert_eq!(
      result.download_url.as_deref(),
      Some("/files/x.pdf")
    );
  }

  #[test]
  fn difficulty_parses_case_insensitively()
   {
    assert_eq!(
      "Hard".parse::<Difficulty>(),
      Ok(Difficulty::Hard)
    );
    assert!(
      "extreme"
        .parse::<Difficulty>()
        .is_err()
    );
    assert_eq!(
      "progressive"
        .parse::<DifficultyMix>(),
      Ok(DifficultyMix::Progressive)
    );
  }

  #[test]
  fn contact_submission_defaults_missing_fields()
   {
    let submission: ContactSubmission =
      serde_json::from_str(
        r#"{"name":"Ana","email":"ana@example.com"}"#
      )
      .expect("decode");
    assert_eq!(submission.name, "Ana");
    assert!(submission.subject.is_empty());
    assert!(submission.grade.is_none());
  }

  #[test]
  fn contact_submission_reads_null_and_numbers_loosely()
   {
    let submission: ContactSubmission =
      serde_json::from_str(
        r#"{"name":null,"email":"a@b.co","subject":"s","message":"m","grade":3}"#
      )
      .expect("decode");
    assert!(submission.name.is_empty());
    assert_eq!(submission.email, "a@b.co");
    assert_eq!(
      submission.grade.as_deref(),
      Some("3")
    );

    let submission: ContactSubmission =
      serde_json::from_str(
        r#"{"name":"Ana","grade":null,"message":["x"]}"#
      )
      .expect("decode");
    assert!(submission.grade.is_none());
    assert!(submission.message.is_empty());
  }
}

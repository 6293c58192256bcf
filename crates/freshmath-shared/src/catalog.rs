//! Static unit/topic catalog backing every topic dropdown.
//!
//! Units are keyed by their decimal label (`"2.0"`), and each unit lists
//! its topics in display order. A dropdown option encodes one topic as
//! `"<display name>|<category>"`, so two topics sharing a display name
//! stay distinct when their categories differ.

use crate::TopicCategory;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct Topic {
  pub display_name: &'static str,
  pub category:     TopicCategory
}

impl Topic {
  const fn intro(
    display_name: &'static str
  ) -> Self {
    Self {
      display_name,
      category: TopicCategory::Intro
    }
  }

  const fn graphing(
    display_name: &'static str
  ) -> Self {
    Self {
      display_name,
      category: TopicCategory::Graphing
    }
  }

  pub fn option_value(&self) -> String {
    format!(
      "{}|{}",
      self.display_name,
      self.category.as_str()
    )
  }
}

#[derive(Debug, Clone, Copy)]
pub struct UnitEntry {
  pub key:    &'static str,
  pub label:  &'static str,
  pub topics: &'static [Topic]
}

static CATALOG: &[UnitEntry] = &[
  UnitEntry {
    key:    "1.0",
    label:  "Unit 1",
    topics: &[
      Topic::intro(
        "Introduction to Statistics"
      ),
      Topic::graphing(
        "Representing Data Graphically"
      ),
      Topic::intro(
        "Summarizing Quantitative Data"
      ),
      Topic::intro(
        "Modeling Data Distributions"
      )
    ]
  },
  UnitEntry {
    key:    "2.0",
    label:  "Unit 2",
    topics: &[
      Topic::intro("What Are Solutions?"),
      Topic::intro("Equations"),
      Topic::intro("Inputs and Outputs"),
      Topic::intro(
        "Property of Equality \
         (add/subtract)"
      ),
      Topic::intro(
        "Property of Equality \
         (mult/div)"
      ),
      Topic::intro(
        "Solving Multi-Step Equations"
      ),
      Topic::intro("Linear Equations"),
      Topic::intro(
        "Linear Equation Word Problems"
      ),
      Topic::intro(
        "Solving Equations with \
         Variables on Both Sides"
      )
    ]
  },
  UnitEntry {
    key:    "3.0",
    label:  "Unit 3",
    topics: &[Topic::graphing(
      "One-Step Inequalities"
    )]
  },
  UnitEntry {
    key:    "4.0",
    label:  "Unit 4",
    topics: &[
      Topic::graphing(
        "Points on a Coordinate Plane"
      ),
      Topic::graphing(
        "Line on a Coordinate Plane"
      ),
      Topic::graphing(
        "Slope-Intercept Form"
      ),
      Topic::graphing(
        "Point-Slope Form"
      ),
      Topic::graphing("Standard Form")
    ]
  },
  UnitEntry {
    key:    "5.0",
    label:  "Unit 5",
    topics: &[
      Topic::intro(
        "Systems of Equations"
      ),
      Topic::graphing(
        "Systems of Equations"
      )
    ]
  },
  UnitEntry {
    key:    "11.0",
    label:  "Unit 11",
    topics: &[Topic::graphing(
      "Using Vertex Form"
    )]
  }
];

pub fn units() -> &'static [UnitEntry] {
  CATALOG
}

pub fn unit(
  key: &str
) -> Option<&'static UnitEntry> {
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  CATALOG
    .iter()
    .find(|entry| entry.key == key)
}

pub fn topics_for(
  key: &str
) -> Option<&'static [Topic]> {
  unit(key).map(|entry| entry.topics)
}

pub fn unit_number(
  key: &str
) -> Option<f64> {
  key.trim().parse::<f64>().ok()
}

/// A concrete topic selection decoded from a dropdown value.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct TopicChoice {
  pub name:     String,
  pub category: TopicCategory
}

impl TopicChoice {
  pub fn parse_option(
    value: &str
  ) -> Option<Self> {
    let (name, category) =
      value.split_once('|')?;
    if name.is_empty() {
      return None;
    }
    Some(Self {
      name:     name.to_string(),
      category: category.parse().ok()?
    })
  }

  pub fn option_value(&self) -> String {
    format!(
      "{}|{}",
      self.name,
      self.category.as_str()
    )
  }

  pub fn matches(
    &self,
    topic: &Topic
  ) -> bool {
    self.name == topic.display_name
      && self.category == topic.category
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn units_are_listed_in_catalog_order() {
    let keys: Vec<&str> = units()
      .iter()
      .map(|entry| entry.key)
      .collect();
    assert_eq!(
      keys,
      vec![
        "1.0", "2.0", "3.0", "4.0", "5.0",
        "11.0"
      ]
    );
  }

  #[test]
  fn lookup_ignores_surrounding_whitespace()
   {
    assert_eq!(
      topics_for(" 3.0 ").map(<[_]>::len),
      Some(1)
    );
    assert!(topics_for("").is_none());
    assert!(topics_for("6.0").is_none());
  }

  #[test]
  fn option_value_roundtrips_category() {
    let systems = topics_for("5.0")
      .expect("unit 5 exists");
    let values: Vec<String> = systems
      .iter()
      .map(Topic::option_value)
      .collect();
    assert_eq!(
      values,
      vec![
        "Systems of Equations|Intro",
        "Systems of Equations|Graphing"
      ]
    );

    let choice = TopicChoice::parse_option(
      &values[1]
    )
    .expect("valid option");
    assert!(choice.matches(&systems[1]));
    assert!(!choice.matches(&systems[0]));
  }

  #[test]
  fn parse_option_rejects_partial_values()
   {
    assert!(
      TopicChoice::parse_option("")
        .is_none()
    );
    assert!(
      TopicChoice::parse_option(
        "Equations"
      )
      .is_none()
    );
    assert!(
      TopicChoice::parse_option(
        "|Intro"
      )
      .is_none()
    );
    assert!(
      TopicChoice::parse_option(
        "Equations|Algebra"
      )
      .is_none()
    );
  }

  #[test]
  fn unit_numbers_parse_decimal_keys() {
    assert_eq!(unit_number("11.0"), Some(11.0));
    assert_eq!(
      unit("2.0").map(UnitEntry::number),
      Some(2.0)
    );
    assert_eq!(unit_number("abc"), None);
  }
}

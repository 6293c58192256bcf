use freshmath_shared::catalog;
use freshmath_shared::widgets::{
  CARD,
  GRADE_SECTION,
  ToggleSet
};
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::ToggleWidget;

pub const ALGEBRA_SECTION_ID: &str =
  "algebra-1";

/// Read-only view of the catalog: one grade section holding a card per
/// unit.
#[derive(Properties, PartialEq)]
pub struct TopicBrowserProps {
  pub grades:         ToggleSet,
  pub cards:          ToggleSet,
  pub on_grade_toggle: Callback<String>,
  pub on_card_toggle:  Callback<String>
}

#[function_component(TopicBrowser)]
pub fn topic_browser(
  props: &TopicBrowserProps
) -> Html {
  html! {
      <section id="topics" class="topic-browser">
          <h2>{ "Topics by Grade" }</h2>
          <ToggleWidget
              config={GRADE_SECTION}
              id={ALGEBRA_SECTION_ID}
              title="Algebra 1"
              open={props.grades.is_open(ALGEBRA_SECTION_ID)}
              on_toggle={props.on_grade_toggle.clone()}
          >
              {
                  for catalog::units().iter().map(|entry| html! {
                      <ToggleWidget
                          key={entry.key}
                          config={CARD}
                          id={entry.key}
                          title={format!("{} ({})", entry.label, entry.key)}
                          open={props.cards.is_open(entry.key)}
                          on_toggle={props.on_card_toggle.clone()}
                      >
                          <ul class="topic-list">
                              {
                                  for entry.topics.iter().map(|topic| html! {
                                      <li>
                                          { topic.display_name }
                                          <span class="badge">{ topic.category.as_str() }</span>
                                      </li>
                                  })
                              }
                          </ul>
                      </ToggleWidget>
                  })
              }
          </ToggleWidget>
      </section>
  }
}

use freshmath_shared::catalog::{
  self,
  Topic
};
use freshmath_shared::controller::{
  GeneratorEvent,
  TopicScope
};
use yew::{
  Callback,
  Event,
  Html,
  Properties,
  function_component,
  html
};

use super::select_value;

#[derive(Properties, PartialEq)]
pub struct UnitTopicSelectProps {
  pub scope:    TopicScope,
  pub unit:     Option<String>,
  pub options:  &'static [Topic],
  /// Option value of the chosen topic.
  pub selected: Option<String>,
  pub on_event: Callback<GeneratorEvent>
}

#[function_component(UnitTopicSelect)]
pub fn unit_topic_select(
  props: &UnitTopicSelectProps
) -> Html {
  let scope = props.scope;
  let on_unit = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      on_event.emit(
        GeneratorEvent::ChangeUnit {
          scope,
          unit: select_value(&e)
        }
      )
    })
  };
  let on_topic = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      on_event.emit(
        GeneratorEvent::SelectTopic {
          scope,
          value: select_value(&e)
        }
      )
    })
  };
  let unit = props.unit.clone().unwrap_or_default();
  let selected =
    props.selected.clone().unwrap_or_default();
  let topic_key =
    topic_select_key(&unit, &selected);

  html! {
      <div class="unit-topic">
          <label>
              { "Unit" }
              <select class="unit-select" onchange={on_unit}>
                  <option value="" selected={unit.is_empty()}>{ "Select unit" }</option>
                  {
                      for catalog::units().iter().map(|entry| html! {
                          <option value={entry.key} selected={entry.key == unit}>
                              { format!("{} ({})", entry.label, entry.key) }
                          </option>
                      })
                  }
              </select>
          </label>
          <label>
              { "Topic" }
              <select
                  key={topic_key}
                  class="topic-select"
                  disabled={props.options.is_empty()}
                  onchange={on_topic}
              >
                  <option value="" selected={selected.is_empty()}>{ "Select topic" }</option>
                  {
                      for props.options.iter().map(|topic| {
                          let value = topic.option_value();
                          let is_selected = value == selected;
                          html! {
                              <option {value} selected={is_selected}>
                                  { format!("{} ({})", topic.display_name, topic.category) }
                              </option>
                          }
                      })
                  }
              </select>
          </label>
      </div>
  }
}

/// `selected` on an option only seeds a fresh node, so the topic select
/// is rebuilt whenever the unit or the chosen topic changes.
fn topic_select_key(
  unit: &str,
  selected: &str
) -> String {
  format!("{unit}/{selected}")
}

use freshmath_shared::Difficulty;
use freshmath_shared::controller::{
  CustomSpecRow,
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

use super::{
  UnitTopicSelect,
  input_value,
  select_value
};

#[derive(Properties, PartialEq)]
pub struct SpecRowViewProps {
  pub row:      CustomSpecRow,
  pub on_event: Callback<GeneratorEvent>
}

#[function_component(SpecRowView)]
pub fn spec_row_view(
  props: &SpecRowViewProps
) -> Html {
  let id = props.row.id();
  let on_difficulty = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      match select_value(&e)
        .parse::<Difficulty>()
      {
        | Ok(difficulty) => on_event.emit(
          GeneratorEvent::SetRowDifficulty {
            id,
            difficulty
          }
        ),
        | Err(error) => tracing::warn!(
          %error,
          "ignoring row difficulty"
        )
      }
    })
  };
  let on_count = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      on_event.emit(
        GeneratorEvent::SetRowProblems {
          id,
          value: input_value(&e)
        }
      )
    })
  };
  let on_remove = {
    let on_event = props.on_event.clone();
    Callback::from(move |_| {
      on_event.emit(
        GeneratorEvent::RemoveRow(id)
      )
    })
  };
  let picker = &props.row.picker;

  html! {
      <div class="spec-row" data-row-id={id.to_string()}>
          <UnitTopicSelect
              scope={TopicScope::CustomRow(id)}
              unit={picker.unit().map(str::to_string)}
              options={picker.options()}
              selected={picker.selected().map(|choice| choice.option_value())}
              on_event={props.on_event.clone()}
          />
          <label>
              { "Difficulty" }
              <select class="difficulty-select" onchange={on_difficulty}>
                  {
                      for Difficulty::ALL.iter().map(|level| html! {
                          <option
                              value={level.as_str()}
                              selected={*level == props.row.difficulty}
                          >
                              { level.label() }
                          </option>
                      })
                  }
              </select>
          </label>
          <label>
              { "Problems" }
              <input
                  type="number"
                  class="problem-count"
                  min="1"
                  max="20"
                  value={props.row.problem_count.to_string()}
                  onchange={on_count}
              />
          </label>
          <button type="button" class="remove-row" onclick={on_remove}>{ "Remove" }</button>
      </div>
  }
}

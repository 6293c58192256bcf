use freshmath_shared::controller::{
  GeneratorEvent,
  StandardForm,
  TopicScope
};
use freshmath_shared::{
  Difficulty,
  SubmissionKind
};
use yew::{
  Callback,
  Event,
  Html,
  Properties,
  SubmitEvent,
  function_component,
  html
};

use super::{
  UnitTopicSelect,
  input_value,
  select_value
};

#[derive(Properties, PartialEq)]
pub struct StandardPanelProps {
  pub form:     StandardForm,
  pub on_event: Callback<GeneratorEvent>
}

#[function_component(StandardPanel)]
pub fn standard_panel(
  props: &StandardPanelProps
) -> Html {
  let on_difficulty = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      if let Ok(difficulty) =
        select_value(&e).parse()
      {
        on_event.emit(
          GeneratorEvent::SetStandardDifficulty(
            difficulty
          )
        );
      }
    })
  };
  let on_problems = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      on_event.emit(
        GeneratorEvent::SetStandardProblems(
          input_value(&e)
        )
      )
    })
  };
  let on_title = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      on_event.emit(
        GeneratorEvent::SetStandardTitle(
          input_value(&e)
        )
      )
    })
  };
  let on_submit = {
    let on_event = props.on_event.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_event.emit(
          GeneratorEvent::Submit(
            SubmissionKind::Standard
          )
        );
      }
    )
  };
  let picker = &props.form.picker;

  html! {
      <form id="worksheetForm" class="generator-form" onsubmit={on_submit}>
          <UnitTopicSelect
              scope={TopicScope::Standard}
              unit={picker.unit().map(str::to_string)}
              options={picker.options()}
              selected={picker.selected().map(|choice| choice.option_value())}
              on_event={props.on_event.clone()}
          />
          <label>
              { "Difficulty" }
              <select id="difficulty" onchange={on_difficulty}>
                  {
                      for Difficulty::ALL.iter().map(|level| html! {
                          <option
                              value={level.as_str()}
                              selected={*level == props.form.difficulty}
                          >
                              { level.label() }
                          </option>
                      })
                  }
              </select>
          </label>
          <label>
              { "Number of problems" }
              <input
                  id="numProblems"
                  type="number"
                  min="1"
                  max="20"
                  value={props.form.num_problems.to_string()}
                  onchange={on_problems}
              />
          </label>
          <label>
              { "Custom title (optional)" }
              <input
                  id="customTitle"
                  type="text"
                  value={props.form.title.clone()}
                  onchange={on_title}
              />
          </label>
          <button type="submit" class="btn-generate">{ "Generate Worksheet" }</button>
      </form>
  }
}

use freshmath_shared::SubmissionKind;
use freshmath_shared::controller::{
  CustomBuilder,
  GeneratorEvent
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
  SpecRowView,
  input_value
};

#[derive(Properties, PartialEq)]
pub struct CustomBuilderPanelProps {
  pub builder:  CustomBuilder,
  pub on_event: Callback<GeneratorEvent>
}

#[function_component(
  CustomBuilderPanel
)]
pub fn custom_builder_panel(
  props: &CustomBuilderPanelProps
) -> Html {
  let on_title = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      on_event.emit(
        GeneratorEvent::SetCustomTitle(
          input_value(&e)
        )
      )
    })
  };
  let on_add = {
    let on_event = props.on_event.clone();
    Callback::from(move |_| {
      on_event.emit(GeneratorEvent::AddRow)
    })
  };
  let on_submit = {
    let on_event = props.on_event.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_event.emit(
          GeneratorEvent::Submit(
            SubmissionKind::Custom
          )
        );
      }
    )
  };

  html! {
      <form id="customForm" class="generator-form" onsubmit={on_submit}>
          <label>
              { "Worksheet title" }
              <input
                  id="customWorksheetTitle"
                  type="text"
                  value={props.builder.title.clone()}
                  onchange={on_title}
              />
          </label>
          <div id="customSpecs" class="spec-rows">
              {
                  for props.builder.rows().iter().cloned().map(|row| html! {
                      <SpecRowView
                          key={row.id()}
                          row={row}
                          on_event={props.on_event.clone()}
                      />
                  })
              }
          </div>
          <button type="button" class="add-row" onclick={on_add}>{ "+ Add Topic" }</button>
          <button type="submit" class="btn-generate">{ "Generate Custom Worksheet" }</button>
      </form>
  }
}

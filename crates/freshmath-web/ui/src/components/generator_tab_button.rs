use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct GeneratorTabButtonProps {
  pub tab_id:    String,
  pub label:     String,
  pub is_active: bool,
  pub onclick:   Callback<MouseEvent>
}

#[function_component(
  GeneratorTabButton
)]
pub fn generator_tab_button(
  props: &GeneratorTabButtonProps
) -> Html {
  html! {
      <button
          type="button"
          class={if props.is_active { "tab active" } else { "tab" }}
          data-tab={props.tab_id.clone()}
          onclick={props.onclick.clone()}
      >
          { props.label.clone() }
      </button>
  }
}

use freshmath_shared::widgets::WidgetConfig;
use yew::{
  Callback,
  Children,
  Html,
  Properties,
  classes,
  function_component,
  html
};

/// One member of a toggle family: a clickable header plus a body whose
/// classes come from the family's [`WidgetConfig`].
#[derive(Properties, PartialEq)]
pub struct ToggleWidgetProps {
  pub config:    WidgetConfig,
  pub id:        String,
  pub title:     String,
  pub open:      bool,
  pub on_toggle: Callback<String>,
  #[prop_or_default]
  pub children:  Children
}

#[function_component(ToggleWidget)]
pub fn toggle_widget(
  props: &ToggleWidgetProps
) -> Html {
  let onclick = {
    let on_toggle =
      props.on_toggle.clone();
    let id = props.id.clone();
    Callback::from(move |_| {
      on_toggle.emit(id.clone())
    })
  };
  let open_class = props
    .open
    .then_some(props.config.open_class);

  html! {
      <div class={classes!("toggle", open_class)} data-id={props.id.clone()}>
          <div
              class={classes!(props.config.trigger_class, open_class)}
              role="button"
              aria-expanded={props.open.to_string()}
              {onclick}
          >
              <span>{ props.title.clone() }</span>
              <span class="toggle-icon">{ if props.open { "−" } else { "+" } }</span>
          </div>
          <div class={classes!(props.config.target_class, open_class)}>
              { for props.children.iter() }
          </div>
      </div>
  }
}

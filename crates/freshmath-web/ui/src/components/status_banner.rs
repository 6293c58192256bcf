use freshmath_shared::status::StatusMessage;
use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct StatusBannerProps {
  pub status: Option<StatusMessage>
}

#[function_component(StatusBanner)]
pub fn status_banner(
  props: &StatusBannerProps
) -> Html {
  let Some(status) = &props.status else {
    return html! {
        <div id="status" class="status" style="display:none;"></div>
    };
  };

  html! {
      <div
          id="status"
          class={format!("status status-{}", status.kind.css_suffix())}
          role="status"
      >
          { status.text.clone() }
      </div>
  }
}

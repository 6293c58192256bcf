use freshmath_shared::widgets::{
  NightMode,
  ToggleSet
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  classes,
  function_component,
  html
};

pub const NAV_ID: &str = "main";

const NAV_LINKS: [(&str, &str); 3] = [
  ("#generator", "Generator"),
  ("#topics", "Topics"),
  ("#contact", "Contact")
];

#[derive(Properties, PartialEq)]
pub struct SiteHeaderProps {
  pub nav:             ToggleSet,
  pub night_mode:      NightMode,
  pub on_nav_toggle:   Callback<MouseEvent>,
  pub on_nav_link:     Callback<MouseEvent>,
  pub on_toggle_night: Callback<MouseEvent>
}

#[function_component(SiteHeader)]
pub fn site_header(
  props: &SiteHeaderProps
) -> Html {
  let config = props.nav.config();
  let open = props.nav.is_open(NAV_ID);

  html! {
      <header class="site-header">
          <div class="brand">{ "Fresh Math" }</div>
          <button
              type="button"
              class={classes!(config.trigger_class, open.then_some(config.open_class))}
              aria-expanded={open.to_string()}
              onclick={props.on_nav_toggle.clone()}
          >
              { "☰" }
          </button>
          <nav class={props.nav.class_for(NAV_ID)}>
              {
                  for NAV_LINKS.iter().map(|(href, label)| html! {
                      <a href={*href} onclick={props.on_nav_link.clone()}>{ *label }</a>
                  })
              }
              <button
                  type="button"
                  class="night-toggle"
                  onclick={props.on_toggle_night.clone()}
              >
                  { props.night_mode.toggle_label() }
              </button>
          </nav>
      </header>
  }
}

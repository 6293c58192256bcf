mod driver;
mod storage;

use freshmath_shared::controller::{
  GeneratorEvent,
  GeneratorState,
  GeneratorTab
};
use freshmath_shared::status::dismiss_delay;
use freshmath_shared::widgets::{
  CARD,
  GRADE_SECTION,
  MOBILE_NAV,
  TAB,
  ToggleSet
};
use gloo::console::log;
use yew::{
  Callback,
  Html,
  MouseEvent,
  classes,
  function_component,
  html,
  use_force_update,
  use_mut_ref,
  use_state
};

use self::driver::Driver;
use self::storage::{
  load_night_mode,
  save_night_mode
};
use crate::components::{
  CustomBuilderPanel,
  GeneratorTabButton,
  NAV_ID,
  PracticeTestPanel,
  SiteHeader,
  StandardPanel,
  StatusBanner,
  TopicBrowser
};

#[function_component(App)]
pub fn app() -> Html {
  let state =
    use_mut_ref(GeneratorState::new);
  let armed_epoch =
    use_mut_ref(|| 0_u64);
  let redraw = use_force_update();
  let dismiss_ms =
    *use_state(page_dismiss_ms);

  let night_mode =
    use_state(load_night_mode);
  let nav = use_state(|| {
    ToggleSet::new(MOBILE_NAV)
  });
  let grades = use_state(|| {
    ToggleSet::new(GRADE_SECTION)
  });
  let cards =
    use_state(|| ToggleSet::new(CARD));

  let driver = Driver::new(
    state.clone(),
    redraw,
    armed_epoch,
    dismiss_ms
  );
  let on_event = {
    Callback::from(
      move |event: GeneratorEvent| {
        driver.dispatch(event)
      }
    )
  };

  let on_toggle_night = {
    let night_mode = night_mode.clone();
    Callback::from(move |_: MouseEvent| {
      let next = (*night_mode).toggled();
      save_night_mode(next);
      ui_debug(
        "action.night_mode",
        next.storage_value()
      );
      night_mode.set(next);
    })
  };
  let on_nav_toggle = {
    let nav = nav.clone();
    Callback::from(move |_: MouseEvent| {
      let mut next = (*nav).clone();
      next.toggle(NAV_ID);
      nav.set(next);
    })
  };
  let on_nav_link = {
    let nav = nav.clone();
    Callback::from(move |_: MouseEvent| {
      let mut next = (*nav).clone();
      next.close_all();
      nav.set(next);
    })
  };
  let on_grade_toggle = {
    let grades = grades.clone();
    Callback::from(move |id: String| {
      let mut next = (*grades).clone();
      next.toggle(&id);
      grades.set(next);
    })
  };
  let on_card_toggle = {
    let cards = cards.clone();
    Callback::from(move |id: String| {
      let mut next = (*cards).clone();
      next.toggle(&id);
      cards.set(next);
    })
  };

  let snapshot = state.borrow().clone();
  let active = snapshot.active_tab();
  let tabs =
    ToggleSet::with_open(TAB, active.id());

  let tab_buttons = GeneratorTab::ALL
    .iter()
    .map(|tab| {
      let on_event = on_event.clone();
      let id = tab.id();
      let onclick =
        Callback::from(move |_: MouseEvent| {
          on_event.emit(
            GeneratorEvent::SelectTab(
              id.to_string()
            )
          )
        });
      html! {
          <GeneratorTabButton
              tab_id={id}
              label={tab.label()}
              is_active={tabs.is_open(id)}
              {onclick}
          />
      }
    })
    .collect::<Html>();

  html! {
      <div class={classes!("app", (*night_mode).body_class())}>
          <SiteHeader
              nav={(*nav).clone()}
              night_mode={*night_mode}
              on_nav_toggle={on_nav_toggle}
              on_nav_link={on_nav_link}
              on_toggle_night={on_toggle_night}
          />
          <main>
              <section id="generator" class="generator">
                  <h1>{ "Worksheet Generator" }</h1>
                  <div class="tabs">{ tab_buttons }</div>
                  <div
                      id={GeneratorTab::Standard.id()}
                      class={tabs.class_for(GeneratorTab::Standard.id())}
                  >
                      <StandardPanel
                          form={snapshot.standard.clone()}
                          on_event={on_event.clone()}
                      />
                  </div>
                  <div
                      id={GeneratorTab::PracticeTest.id()}
                      class={tabs.class_for(GeneratorTab::PracticeTest.id())}
                  >
                      <PracticeTestPanel
                          form={snapshot.practice.clone()}
                          on_event={on_event.clone()}
                      />
                  </div>
                  <div
                      id={GeneratorTab::Custom.id()}
                      class={tabs.class_for(GeneratorTab::Custom.id())}
                  >
                      <CustomBuilderPanel
                          builder={snapshot.custom.clone()}
                          on_event={on_event}
                      />
                  </div>
                  <StatusBanner status={snapshot.status().current().cloned()} />
              </section>
              <TopicBrowser
                  grades={(*grades).clone()}
                  cards={(*cards).clone()}
                  on_grade_toggle={on_grade_toggle}
                  on_card_toggle={on_card_toggle}
              />
          </main>
      </div>
  }
}

/// `<div id="app" data-dismiss-ms="...">` overrides the banner delay.
fn page_dismiss_ms() -> u32 {
  let raw = web_sys::window()
    .and_then(|window| window.document())
    .and_then(|document| {
      document.get_element_by_id("app")
    })
    .and_then(|mount| {
      mount.get_attribute("data-dismiss-ms")
    });
  dismiss_delay(raw.as_deref())
}

fn ui_debug(
  event: &str,
  detail: &str
) {
  tracing::debug!(
    event, detail, "ui-debug"
  );
  log!(format!(
    "[ui-debug] {event}: {detail}"
  ));
}

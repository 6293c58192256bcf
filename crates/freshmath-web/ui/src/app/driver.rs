use std::cell::RefCell;
use std::rc::Rc;

use freshmath_shared::controller::{
  GeneratorEvent,
  GeneratorState,
  Reaction
};
use gloo::timers::future::TimeoutFuture;
use yew::functional::UseForceUpdateHandle;

use super::ui_debug;
use crate::api::send_generation;

/// Owns the page's generator state. Every input goes through
/// [`Driver::dispatch`]; network sends, navigation and dismiss timers
/// hang off the reactions it gets back.
#[derive(Clone)]
pub struct Driver {
  state:        Rc<RefCell<GeneratorState>>,
  redraw:       UseForceUpdateHandle,
  armed_epoch:  Rc<RefCell<u64>>,
  dismiss_ms:   u32
}

impl Driver {
  pub fn new(
    state: Rc<RefCell<GeneratorState>>,
    redraw: UseForceUpdateHandle,
    armed_epoch: Rc<RefCell<u64>>,
    dismiss_ms: u32
  ) -> Self {
    Self {
      state,
      redraw,
      armed_epoch,
      dismiss_ms
    }
  }

  pub fn dispatch(
    &self,
    event: GeneratorEvent
  ) {
    let reaction =
      self.state.borrow_mut().apply(event);
    self.arm_dismiss();
    self.redraw.force_update();

    match reaction {
      | Reaction::None => {}
      | Reaction::Send(pending) => {
        ui_debug(
          "invoke.generate.begin",
          &format!(
            "endpoint={}, seq={}",
            pending.endpoint(),
            pending.ticket.seq
          )
        );
        let driver = self.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let outcome =
              send_generation(&pending)
                .await;
            driver.dispatch(
              GeneratorEvent::Completed {
                ticket: pending.ticket,
                outcome
              }
            );
          }
        );
      }
      | Reaction::Navigate(url) => {
        navigate(&url)
      }
    }
  }

  /// Starts at most one timer per status epoch.
  fn arm_dismiss(&self) {
    let Some(token) = self
      .state
      .borrow()
      .status()
      .dismiss_token()
    else {
      return;
    };
    if *self.armed_epoch.borrow()
      == token.epoch()
    {
      return;
    }
    *self.armed_epoch.borrow_mut() =
      token.epoch();

    let driver = self.clone();
    let delay = self.dismiss_ms;
    wasm_bindgen_futures::spawn_local(
      async move {
        TimeoutFuture::new(delay).await;
        driver.dispatch(
          GeneratorEvent::DismissStatus(
            token
          )
        );
      }
    );
  }
}

fn navigate(url: &str) {
  ui_debug("action.navigate", url);
  let Some(window) = web_sys::window()
  else {
    return;
  };
  if let Err(error) =
    window.location().set_href(url)
  {
    tracing::error!(
      ?error,
      url,
      "failed to open download"
    );
  }
}

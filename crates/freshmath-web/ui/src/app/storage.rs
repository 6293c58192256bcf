use freshmath_shared::widgets::{
  NIGHT_MODE_STORAGE_KEY,
  NightMode
};

fn local_storage()
-> Option<web_sys::Storage> {
  web_sys::window().and_then(|window| {
    window
      .local_storage()
      .ok()
      .flatten()
  })
}

pub(super) fn load_night_mode()
-> NightMode {
  let stored =
    local_storage().and_then(|storage| {
      storage
        .get_item(
          NIGHT_MODE_STORAGE_KEY
        )
        .ok()
        .flatten()
    });
  NightMode::from_storage(
    stored.as_deref()
  )
}

pub(super) fn save_night_mode(
  mode: NightMode
) {
  let Some(storage) = local_storage()
  else {
    tracing::warn!(
      "local storage unavailable; \
       night mode not saved"
    );
    return;
  };
  if let Err(error) = storage.set_item(
    NIGHT_MODE_STORAGE_KEY,
    mode.storage_value()
  ) {
    tracing::warn!(
      ?error,
      "failed saving night mode"
    );
  }
}

mod custom_builder;
mod generator_tab_button;
mod practice_test_form;
mod site_header;
mod spec_row;
mod standard_form;
mod status_banner;
mod toggle_widget;
mod topic_browser;
mod unit_topic_select;

pub use custom_builder::CustomBuilderPanel;
pub use generator_tab_button::GeneratorTabButton;
pub use practice_test_form::PracticeTestPanel;
pub use site_header::{
  NAV_ID,
  SiteHeader
};
pub use spec_row::SpecRowView;
pub use standard_form::StandardPanel;
pub use status_banner::StatusBanner;
pub use toggle_widget::ToggleWidget;
pub use topic_browser::TopicBrowser;
pub use unit_topic_select::UnitTopicSelect;
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement
};
use yew::{
  Event,
  TargetCast
};

pub(crate) fn select_value(
  event: &Event
) -> String {
  event
    .target_unchecked_into::<HtmlSelectElement>()
    .value()
}

pub(crate) fn input_value(
  event: &Event
) -> String {
  event
    .target_unchecked_into::<HtmlInputElement>()
    .value()
}

pub(crate) fn input_checked(
  event: &Event
) -> bool {
  event
    .target_unchecked_into::<HtmlInputElement>()
    .checked()
}

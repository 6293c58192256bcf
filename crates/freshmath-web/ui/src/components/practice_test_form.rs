use freshmath_shared::catalog;
use freshmath_shared::controller::{
  GeneratorEvent,
  PracticeForm,
  PracticeTestType,
  TopicScope
};
use freshmath_shared::{
  DifficultyMix,
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
  input_checked,
  input_value,
  select_value
};

#[derive(Properties, PartialEq)]
pub struct PracticeTestPanelProps {
  pub form:     PracticeForm,
  pub on_event: Callback<GeneratorEvent>
}

#[function_component(PracticeTestPanel)]
pub fn practice_test_panel(
  props: &PracticeTestPanelProps
) -> Html {
  let emit = |make: fn(String) -> GeneratorEvent| {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      on_event.emit(make(input_value(&e)))
    })
  };

  let on_test_type = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      if let Some(test_type) =
        PracticeTestType::from_str_value(
          &select_value(&e)
        )
      {
        on_event.emit(
          GeneratorEvent::SetTestType(
            test_type
          )
        );
      }
    })
  };
  let on_mix = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      if let Ok(mix) =
        select_value(&e).parse()
      {
        on_event.emit(
          GeneratorEvent::SetDifficultyMix(
            mix
          )
        );
      }
    })
  };
  let on_review_unit = {
    let on_event = props.on_event.clone();
    Callback::from(move |e: Event| {
      on_event.emit(
        GeneratorEvent::SetReviewUnit(
          select_value(&e)
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
            SubmissionKind::PracticeTest
          )
        );
      }
    )
  };

  let form = &props.form;
  let review_unit =
    form.review_unit.clone().unwrap_or_default();

  let type_fields = match form.test_type {
    | PracticeTestType::Unit => html! {
        <label>
            { "Unit to review" }
            <select id="reviewUnit" onchange={on_review_unit}>
                <option value="" selected={review_unit.is_empty()}>{ "Select unit" }</option>
                {
                    for catalog::units().iter().map(|entry| html! {
                        <option value={entry.key} selected={entry.key == review_unit}>
                            { entry.label }
                        </option>
                    })
                }
            </select>
        </label>
    },
    | PracticeTestType::Cumulative => html! {
        <fieldset class="cumulative-units">
            <legend>{ "Units to include" }</legend>
            {
                for catalog::units().iter().map(|entry| {
                    let on_event = props.on_event.clone();
                    let key = entry.key.to_string();
                    let onchange = Callback::from(move |e: Event| {
                        on_event.emit(GeneratorEvent::ToggleCumulativeUnit {
                            unit: key.clone(),
                            checked: input_checked(&e),
                        })
                    });
                    html! {
                        <label class="checkbox">
                            <input
                                type="checkbox"
                                value={entry.key}
                                checked={form.is_cumulative_checked(entry.key)}
                                {onchange}
                            />
                            { entry.label }
                        </label>
                    }
                })
            }
        </fieldset>
    },
    | PracticeTestType::Spiral => html! {
        <>
            <UnitTopicSelect
                scope={TopicScope::Spiral}
                unit={form.spiral.unit().map(str::to_string)}
                options={form.spiral.options()}
                selected={form.spiral.selected().map(|choice| choice.option_value())}
                on_event={props.on_event.clone()}
            />
            <label>
                { "Problems per level" }
                <input
                    id="problemsPerLevel"
                    type="number"
                    min="1"
                    value={form.problems_per_level.to_string()}
                    onchange={emit(GeneratorEvent::SetProblemsPerLevel)}
                />
            </label>
        </>
    }
  };

  let problem_count = if form
    .test_type
    .uses_problem_count()
  {
    html! {
        <label>
            { "Number of problems" }
            <input
                id="testNumProblems"
                type="number"
                min="1"
                value={form.num_problems.to_string()}
                onchange={emit(GeneratorEvent::SetTestProblems)}
            />
        </label>
    }
  } else {
    html! {}
  };

  html! {
      <form id="practiceTestForm" class="generator-form" onsubmit={on_submit}>
          <label>
              { "Test type" }
              <select id="testType" onchange={on_test_type}>
                  {
                      for PracticeTestType::ALL.iter().map(|kind| html! {
                          <option value={kind.as_str()} selected={*kind == form.test_type}>
                              { kind.label() }
                          </option>
                      })
                  }
              </select>
          </label>
          { type_fields }
          { problem_count }
          <label>
              { "Difficulty mix" }
              <select id="difficultyMix" onchange={on_mix}>
                  {
                      for DifficultyMix::ALL.iter().map(|mix| html! {
                          <option value={mix.as_str()} selected={*mix == form.difficulty_mix}>
                              { mix.label() }
                          </option>
                      })
                  }
              </select>
          </label>
          <button type="submit" class="btn-generate">{ "Generate Practice Test" }</button>
      </form>
  }
}

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::Utc;
use freshmath_shared::catalog;
use freshmath_shared::controller::{
    GeneratorEvent, GeneratorState, PracticeTestType, Reaction, TopicScope,
};
use freshmath_shared::status::{StatusKind, StatusMessage};
use freshmath_shared::SubmissionKind;
use tracing::{debug, info, instrument, warn};

use crate::backend::{GenerationBackend, HttpBackend};
use crate::cli::{Command, GenerateArgs, GenerateCommand, RelayCommand, SpecArg, TopicArg};
use crate::config::{self, Config};
use crate::datastore::SheetStore;
use crate::notify::MailDelivery;
use crate::relay::{self, Relay, RelaySettings};
use crate::render::Renderer;

/// Result of one generation round trip, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub status: Option<StatusMessage>,
    pub download_url: Option<String>,
}

impl GenerationReport {
    pub fn succeeded(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| status.kind == StatusKind::Success)
    }
}

#[instrument(skip(cfg, data_override, renderer, command))]
pub fn dispatch(
    cfg: &Config,
    data_override: Option<&Path>,
    renderer: &mut Renderer,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Topics { unit } => cmd_topics(renderer, unit.as_deref()),
        Command::Generate(args) => {
            let backend = HttpBackend::from_config(cfg)?;
            cmd_generate(&backend, renderer, args)
        }
        Command::Relay(relay_cmd) => {
            let data_dir = config::resolve_data_dir(cfg, data_override)
                .context("failed to resolve data directory")?;
            cmd_relay(cfg, &data_dir, renderer, relay_cmd)
        }
        Command::Show => renderer.print_config(cfg),
    }
}

fn cmd_topics(renderer: &mut Renderer, unit: Option<&str>) -> anyhow::Result<()> {
    match unit {
        None => renderer.print_units(),
        Some(key) => {
            let entry = catalog::unit(key).ok_or_else(|| anyhow!("unknown unit: {key}"))?;
            renderer.print_topics(entry)
        }
    }
}

#[instrument(skip(backend, renderer, args))]
fn cmd_generate<B: GenerationBackend>(
    backend: &B,
    renderer: &mut Renderer,
    args: GenerateArgs,
) -> anyhow::Result<()> {
    let mut state = GeneratorState::empty();
    let kind = fill_form(&mut state, args.kind)?;
    let report = run_generation(&mut state, kind, backend)?;

    if let Some(status) = &report.status {
        renderer.print_status(status)?;
    }
    if let Some(url) = &report.download_url {
        renderer.print_line(&format!("Download: {url}"))?;
        if let Some(dest) = &args.save {
            let dest = save_target(dest, url);
            let bytes = backend.download(url, &dest)?;
            renderer.print_line(&format!("Saved {bytes} bytes to {}", dest.display()))?;
        }
    }

    if !report.succeeded() {
        let text = report
            .status
            .map(|status| status.text)
            .unwrap_or_else(|| "generation did not complete".to_string());
        return Err(anyhow!(text));
    }
    Ok(())
}

/// Feeds command-line values into the form the same way the page does,
/// one event at a time. Returns which submission to fire.
pub fn fill_form(
    state: &mut GeneratorState,
    command: GenerateCommand,
) -> anyhow::Result<SubmissionKind> {
    match command {
        GenerateCommand::Standard {
            unit,
            topic,
            difficulty,
            problems,
            title,
        } => {
            state.apply(GeneratorEvent::SelectTab("standard".to_string()));
            choose_topic(state, TopicScope::Standard, unit.as_deref(), topic.as_ref())?;
            state.apply(GeneratorEvent::SetStandardDifficulty(difficulty));
            if let Some(raw) = problems {
                state.apply(GeneratorEvent::SetStandardProblems(raw));
            }
            state.apply(GeneratorEvent::SetStandardTitle(title));
            Ok(SubmissionKind::Standard)
        }
        GenerateCommand::Practice {
            test_type,
            units,
            topic,
            mix,
            problems,
            per_level,
        } => {
            let test_type = PracticeTestType::from(test_type);
            state.apply(GeneratorEvent::SelectTab("practice".to_string()));
            state.apply(GeneratorEvent::SetTestType(test_type));
            state.apply(GeneratorEvent::SetDifficultyMix(mix));
            match test_type {
                PracticeTestType::Unit => {
                    if units.len() > 1 {
                        warn!(count = units.len(), "unit review uses only the first --unit");
                    }
                    if let Some(unit) = units.first() {
                        state.apply(GeneratorEvent::SetReviewUnit(unit.clone()));
                    }
                }
                PracticeTestType::Cumulative => {
                    for unit in units {
                        if catalog::unit(&unit).is_none() {
                            return Err(anyhow!("unknown unit: {unit}"));
                        }
                        state.apply(GeneratorEvent::ToggleCumulativeUnit {
                            unit,
                            checked: true,
                        });
                    }
                }
                PracticeTestType::Spiral => {
                    choose_topic(
                        state,
                        TopicScope::Spiral,
                        units.first().map(String::as_str),
                        topic.as_ref(),
                    )?;
                }
            }
            if let Some(raw) = problems {
                state.apply(GeneratorEvent::SetTestProblems(raw));
            }
            if let Some(raw) = per_level {
                state.apply(GeneratorEvent::SetProblemsPerLevel(raw));
            }
            Ok(SubmissionKind::PracticeTest)
        }
        GenerateCommand::Custom { title, specs } => {
            state.apply(GeneratorEvent::SelectTab("custom".to_string()));
            state.apply(GeneratorEvent::SetCustomTitle(title));
            for spec in specs {
                add_spec_row(state, spec)?;
            }
            Ok(SubmissionKind::Custom)
        }
    }
}

fn add_spec_row(state: &mut GeneratorState, spec: SpecArg) -> anyhow::Result<()> {
    let id = state.add_custom_spec_row();
    choose_topic(
        state,
        TopicScope::CustomRow(id),
        Some(&spec.unit),
        Some(&spec.topic),
    )?;
    if let Some(difficulty) = spec.difficulty {
        state.apply(GeneratorEvent::SetRowDifficulty { id, difficulty });
    }
    if let Some(value) = spec.count {
        state.apply(GeneratorEvent::SetRowProblems { id, value });
    }
    debug!(id, unit = %spec.unit, "added custom row");
    Ok(())
}

fn choose_topic(
    state: &mut GeneratorState,
    scope: TopicScope,
    unit: Option<&str>,
    topic: Option<&TopicArg>,
) -> anyhow::Result<()> {
    let Some(unit) = unit else {
        return Ok(());
    };
    state.apply(GeneratorEvent::ChangeUnit {
        scope,
        unit: unit.to_string(),
    });
    let Some(topic) = topic else {
        return Ok(());
    };
    let value = resolve_topic_option(unit, topic)?;
    state.apply(GeneratorEvent::SelectTopic { scope, value });
    Ok(())
}

/// Maps a typed topic name onto the unit's dropdown value. A bare name
/// must be unambiguous within the unit.
pub fn resolve_topic_option(unit: &str, topic: &TopicArg) -> anyhow::Result<String> {
    let topics = catalog::topics_for(unit).ok_or_else(|| anyhow!("unknown unit: {unit}"))?;
    let matches: Vec<_> = topics
        .iter()
        .filter(|candidate| candidate.display_name.eq_ignore_ascii_case(&topic.name))
        .filter(|candidate| topic.category.is_none_or(|cat| cat == candidate.category))
        .collect();

    match matches.as_slice() {
        [only] => Ok(only.option_value()),
        [] => Err(anyhow!(
            "unit {unit} has no topic {:?}; see `freshmath topics {unit}`",
            topic.name
        )),
        several => Err(anyhow!(
            "topic {:?} is ambiguous in unit {unit}; use one of: {}",
            topic.name,
            several
                .iter()
                .map(|candidate| candidate.option_value())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

/// Submits `kind` and applies whatever comes back. Local validation
/// failures return a report with the error status and no request sent.
#[instrument(skip(state, backend))]
pub fn run_generation<B: GenerationBackend>(
    state: &mut GeneratorState,
    kind: SubmissionKind,
    backend: &B,
) -> anyhow::Result<GenerationReport> {
    let pending = match state.apply(GeneratorEvent::Submit(kind)) {
        Reaction::Send(pending) => pending,
        other => {
            debug!(?other, "submission did not produce a request");
            return Ok(GenerationReport {
                status: state.status().current().cloned(),
                download_url: None,
            });
        }
    };

    if let Some(loading) = state.status().current() {
        info!(text = %loading.text, "waiting for backend");
    }
    let outcome = backend.send(&pending);
    let reaction = state.apply(GeneratorEvent::Completed {
        ticket: pending.ticket,
        outcome,
    });

    let download_url = match reaction {
        Reaction::Navigate(url) => Some(backend.resolve_download(&url)?),
        _ => None,
    };
    Ok(GenerationReport {
        status: state.status().current().cloned(),
        download_url,
    })
}

#[instrument(skip(cfg, renderer, command))]
fn cmd_relay(
    cfg: &Config,
    data_dir: &Path,
    renderer: &mut Renderer,
    command: RelayCommand,
) -> anyhow::Result<()> {
    match command {
        RelayCommand::Status => renderer.print_json(&relay::health()),
        RelayCommand::List => {
            let settings = RelaySettings::from_config(cfg);
            let store = SheetStore::open(data_dir, &settings.sheet_name)?;
            let rows = store.load_rows()?;
            info!(count = rows.len(), "listing contact submissions");
            renderer.print_sheet(&rows)
        }
        RelayCommand::Submit { file } => {
            let body = read_submission_body(file.as_deref())?;
            let settings = RelaySettings::from_config(cfg);
            let store = SheetStore::open(data_dir, &settings.sheet_name)?;
            let delivery = MailDelivery::from_config(cfg, data_dir);
            let mut relay = Relay::new(settings, store, delivery);

            let response = relay.handle_raw(&body, Utc::now());
            renderer.print_json(&response)?;
            if !response.success {
                return Err(anyhow!(response.message));
            }
            Ok(())
        }
    }
}

fn read_submission_body(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read submission from stdin")?;
            Ok(buf)
        }
    }
}

/// Default save target when `--save` names a directory.
pub fn save_target(dest: &Path, download_url: &str) -> PathBuf {
    if !dest.is_dir() {
        return dest.to_path_buf();
    }
    let name = download_url
        .rsplit('/')
        .next()
        .map(|segment| segment.split(['?', '#']).next().unwrap_or(segment))
        .filter(|segment| !segment.is_empty())
        .unwrap_or("worksheet.pdf");
    dest.join(name)
}

#[cfg(test)]
mod tests {
    use freshmath_shared::TopicCategory;

    use super::*;

    fn topic(name: &str, category: Option<TopicCategory>) -> TopicArg {
        TopicArg {
            name: name.to_string(),
            category,
        }
    }

    #[test]
    fn bare_topic_resolves_when_unique() {
        assert_eq!(
            resolve_topic_option("4.0", &topic("standard form", None)).expect("resolve"),
            "Standard Form|Graphing"
        );
    }

    #[test]
    fn shared_names_need_a_category() {
        let err = resolve_topic_option("5.0", &topic("Systems of Equations", None))
            .expect_err("ambiguous");
        assert!(err.to_string().contains("Systems of Equations|Intro"));
        assert_eq!(
            resolve_topic_option(
                "5.0",
                &topic("Systems of Equations", Some(TopicCategory::Graphing))
            )
            .expect("resolve"),
            "Systems of Equations|Graphing"
        );
    }

    #[test]
    fn unknown_topics_and_units_are_errors() {
        assert!(resolve_topic_option("9.0", &topic("Equations", None)).is_err());
        assert!(resolve_topic_option("2.0", &topic("Slope", None)).is_err());
    }

    #[test]
    fn save_target_uses_url_file_name_for_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(
            save_target(dir.path(), "/files/x.pdf?v=2"),
            dir.path().join("x.pdf")
        );
        let file = dir.path().join("out.pdf");
        assert_eq!(save_target(&file, "/files/x.pdf"), file);
    }
}

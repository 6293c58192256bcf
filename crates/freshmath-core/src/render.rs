use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use freshmath_shared::catalog::{self, UnitEntry};
use freshmath_shared::status::{StatusKind, StatusMessage};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::relay::SHEET_HEADERS;

const MESSAGE_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self))]
    pub fn print_units(&mut self) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let headers = vec!["Unit".to_string(), "Label".to_string(), "Topics".to_string()];
        let rows = catalog::units()
            .iter()
            .map(|entry| {
                vec![
                    self.paint(entry.key, "33"),
                    entry.label.to_string(),
                    entry.topics.len().to_string(),
                ]
            })
            .collect();
        write_table(&mut out, headers, rows)
    }

    #[tracing::instrument(skip(self, entry), fields(unit = entry.key))]
    pub fn print_topics(&mut self, entry: &UnitEntry) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{} ({})", entry.label, entry.key)?;
        let headers = vec![
            "Topic".to_string(),
            "Category".to_string(),
            "Option".to_string(),
        ];
        let rows = entry
            .topics
            .iter()
            .map(|topic| {
                vec![
                    topic.display_name.to_string(),
                    self.paint(topic.category.as_str(), "36"),
                    topic.option_value(),
                ]
            })
            .collect();
        write_table(&mut out, headers, rows)
    }

    #[tracing::instrument(skip(self, rows))]
    pub fn print_sheet(&mut self, rows: &[Vec<String>]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let headers = SHEET_HEADERS.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(idx, cell)| {
                        if SHEET_HEADERS.get(idx) == Some(&"Message") {
                            preview(cell)
                        } else {
                            cell.clone()
                        }
                    })
                    .collect()
            })
            .collect();
        write_table(&mut out, headers, rows)
    }

    pub fn print_config(&mut self, cfg: &Config) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let mut entries: Vec<(&String, &String)> = cfg.iter().collect();
        entries.sort();
        let rows = entries
            .into_iter()
            .map(|(k, v)| vec![k.clone(), v.clone()])
            .collect();
        write_table(&mut out, vec!["Key".to_string(), "Value".to_string()], rows)?;
        for file in &cfg.loaded_files {
            writeln!(out, "loaded {}", file.display())?;
        }
        Ok(())
    }

    pub fn print_status(&mut self, status: &StatusMessage) -> anyhow::Result<()> {
        let code = match status.kind {
            StatusKind::Loading => "34",
            StatusKind::Success => "32",
            StatusKind::Error => "31",
        };
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.paint(&status.text, code))?;
        Ok(())
    }

    pub fn print_line(&mut self, line: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        Ok(())
    }

    pub fn print_json<T: Serialize>(&mut self, value: &T) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MESSAGE_PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(MESSAGE_PREVIEW_CHARS - 3).collect();
    format!("{cut}...")
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().take(column_count).enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = row.get(idx).map(String::as_str).unwrap_or_default();
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

pub const DEFAULT_BACKEND_URL: &str =
  "http://localhost:8080";
pub const DEFAULT_SHEET_NAME: &str =
  "Contact Form Submissions";
pub const DEFAULT_SUBJECT_PREFIX: &str =
  "[Fresh Math Contact]";

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  pub fn defaults() -> Self {
    let mut cfg = Config {
      map:          HashMap::new(),
      loaded_files: vec![]
    };
    for (key, value) in [
      ("backend.url", DEFAULT_BACKEND_URL),
      ("backend.timeout_secs", "30"),
      ("relay.data.location", "~/.freshmath"),
      ("relay.sheet_name", DEFAULT_SHEET_NAME),
      (
        "relay.notification_email",
        "your-email@example.com"
      ),
      (
        "relay.subject_prefix",
        DEFAULT_SUBJECT_PREFIX
      ),
      ("color", "on")
    ] {
      cfg.map.insert(
        key.to_string(),
        value.to_string()
      );
    }

    cfg
  }

  #[tracing::instrument(skip(
    rcfile_override
  ))]
  pub fn load(
    rcfile_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::defaults();

    let rcfile = resolve_rcfile_path(
      rcfile_override
    )?;
    if let Some(path) = rcfile {
      info!(rcfile = %path.display(), "loading freshmathrc");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no freshmathrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  pub fn get_u64(
    &self,
    key: &str
  ) -> anyhow::Result<Option<u64>> {
    self
      .map
      .get(key)
      .map(|v| {
        v.trim().parse::<u64>().map_err(
          |err| {
            anyhow!(
              "invalid number for \
               {key}: {v} ({err})"
            )
          }
        )
      })
      .transpose()
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&String, &String)>
  {
    self.map.iter()
  }

  pub fn backend_url(&self) -> String {
    self
      .get("backend.url")
      .unwrap_or_else(|| {
        DEFAULT_BACKEND_URL.to_string()
      })
  }

  pub fn backend_timeout(
    &self
  ) -> anyhow::Result<Duration> {
    let secs = self
      .get_u64("backend.timeout_secs")?
      .unwrap_or(30);
    Ok(Duration::from_secs(secs))
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

/// Directory holding the contact sheet and mail outbox.
#[tracing::instrument(skip(
  cfg,
  override_dir
))]
pub fn resolve_data_dir(
  cfg: &Config,
  override_dir: Option<&Path>
) -> anyhow::Result<PathBuf> {
  let dir = if let Some(path) =
    override_dir
  {
    path.to_path_buf()
  } else if let Some(cfg_value) =
    cfg.get("relay.data.location")
  {
    expand_tilde(Path::new(&cfg_value))
  } else {
    default_data_dir()?
  };

  if !dir.exists() {
    info!(dir = %dir.display(), "creating data directory");
    fs::create_dir_all(&dir)
      .with_context(|| {
        format!(
          "failed to create {}",
          dir.display()
        )
      })?;
  }

  Ok(dir)
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rcfile_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("FRESHMATHRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping \
       freshmathrc lookup"
    );
    return Ok(None);
  };
  let candidate =
    home.join(".freshmathrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn default_data_dir()
-> anyhow::Result<PathBuf> {
  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  Ok(home.join(".freshmath"))
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use tempfile::NamedTempFile;

  use super::*;

  #[test]
  fn rcfile_values_override_defaults() {
    let mut file =
      NamedTempFile::new().expect("temp");
    writeln!(
      file,
      "# local backend\n\
       backend.url = http://127.0.0.1:9000 # dev\n\
       backend.timeout_secs=5"
    )
    .expect("write");

    let cfg = Config::load(Some(file.path()))
      .expect("load");
    assert_eq!(
      cfg.backend_url(),
      "http://127.0.0.1:9000"
    );
    assert_eq!(
      cfg.backend_timeout().expect("number"),
      Duration::from_secs(5)
    );
    assert_eq!(
      cfg.get("relay.sheet_name").as_deref(),
      Some(DEFAULT_SHEET_NAME)
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "rc.color".to_string(),
      "off".to_string()
    )]);
    assert_eq!(cfg.get_bool("color"), Some(false));
  }

  #[test]
  fn malformed_line_is_an_error() {
    let mut file =
      NamedTempFile::new().expect("temp");
    writeln!(file, "backend.url").expect("write");
    assert!(
      Config::load(Some(file.path()))
        .is_err()
    );
  }

  #[test]
  fn bad_timeout_is_reported() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "backend.timeout_secs".to_string(),
      "soon".to_string()
    )]);
    assert!(cfg.backend_timeout().is_err());
  }
}

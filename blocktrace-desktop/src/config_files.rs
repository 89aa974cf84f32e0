use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories_next::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};

use blocktrace::settings::RenderSettings;

// -------------------------------------------------------------------------------------------------

/// Load render settings from `path`.
///
/// If `create_if_missing` is true and there is no such file, it is created containing the
/// default settings. Unreadable or invalid files are reported and replaced by defaults,
/// not treated as errors.
///
/// This does not respect command-line options. Use [`SettingsArgs`] for that.
pub fn load_config(path: &Path, create_if_missing: bool) -> RenderSettings {
    read_or_create_default_json_file(
        "render settings",
        path,
        RenderSettings::default,
        create_if_missing,
    )
}

/// Returns the path of the settings file in the platform-appropriate configuration
/// directory, creating the directory if needed.
fn default_config_path() -> Result<PathBuf, anyhow::Error> {
    if std::env::var("BLOCKTRACE_DO_NOT_USE_CONFIG_FILES_IN_TESTS").is_ok() {
        panic!(
            "tests should be hermetic and not touch user config files \
            (environment variable BLOCKTRACE_DO_NOT_USE_CONFIG_FILES_IN_TESTS set, \
            but neither --no-config-files nor --config passed)"
        );
    }

    let project_dirs = ProjectDirs::from("org.switchb", "", "blocktrace")
        .ok_or_else(|| anyhow::anyhow!("could not find configuration directory"))?;
    fs::create_dir_all(project_dirs.config_dir())?;
    Ok(project_dirs.config_dir().join("render.json"))
}

// -------------------------------------------------------------------------------------------------

/// [`clap::Args`] argument group struct for args that affect what settings are used.
#[derive(Clone, Debug, clap::Args)]
pub struct SettingsArgs {
    /// Read settings from this file instead of the one in the user configuration directory.
    #[arg(long = "config", value_name = "FILE", conflicts_with = "no_config_files")]
    pub(crate) config: Option<PathBuf>,

    /// Ignore all configuration files, using only defaults and command-line options.
    #[arg(long = "no-config-files")]
    pub(crate) no_config_files: bool,

    #[expect(clippy::doc_markdown, reason = "will be displayed in --help")]
    /// Override the value of a setting for this run, instead of taking it from files
    /// or defaults.
    ///
    /// The value is specified as a key-value pair where the key is an unquoted string, the
    /// separator is “=”, and the value is a JSON value (which, if a string, must be quoted);
    /// for example: -Smax_depth=8 or -Semitters='{"strategy":"all"}'
    ///
    /// Using this option disables writing a default settings file.
    #[arg(long = "set", short = 'S', value_parser = parse_configure, value_name="NAME=JSON")]
    pub(crate) set: Vec<(String, serde_json::Value)>,
}

impl SettingsArgs {
    /// Constructs the [`RenderSettings`] a render with these args should use.
    pub fn build_settings(self) -> Result<RenderSettings, anyhow::Error> {
        let Self {
            config,
            no_config_files,
            set: to_override,
        } = self;

        let persisted_settings = if no_config_files {
            RenderSettings::default()
        } else {
            let path = match config {
                Some(path) => path,
                None => default_config_path().context("Error loading configuration files")?,
            };
            load_config(&path, to_override.is_empty())
        };

        if to_override.is_empty() {
            return Ok(persisted_settings);
        }

        let serde_json::Value::Object(mut current_settings) =
            serde_json::to_value(&persisted_settings)
                .context("failed to convert settings to JSON")?
        else {
            anyhow::bail!("render settings did not serialize as a JSON object");
        };
        for (key, value) in to_override {
            current_settings.insert(key, value);
        }
        serde_json::from_value(serde_json::Value::Object(current_settings))
            .context("--set did not produce valid settings")
    }
}

fn parse_configure(arg: &str) -> Result<(String, serde_json::Value), anyhow::Error> {
    let (key, value) = arg.split_once('=').ok_or_else(|| anyhow::anyhow!("missing '='"))?;
    let value = serde_json::from_str(value)?;
    Ok((key.to_owned(), value))
}

// -------------------------------------------------------------------------------------------------

fn read_or_create_default_json_file<V: DeserializeOwned + Serialize>(
    description: &str,
    path: &Path,
    default: fn() -> V,
    create_if_missing: bool,
) -> V {
    match File::open(path) {
        Ok(file) => match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => {
                log::trace!(
                    "Loaded {description} from {path}",
                    path = path.to_string_lossy()
                );
                value
            }
            Err(e) => {
                log::warn!(
                    "Syntax error in {description} loaded from {path}; \
                    using default values. Error: {e}",
                    path = path.to_string_lossy(),
                );
                default()
            }
        },
        Err(open_for_read_error) if open_for_read_error.kind() == std::io::ErrorKind::NotFound => {
            let value = default();
            if create_if_missing {
                log::info!(
                    "No {description} file found; creating {path}",
                    path = path.to_string_lossy()
                );
                write_json_file(description, path, &value);
            }
            value
        }
        Err(e) => {
            log::error!(
                "Error while reading {description} file {path}: {e}",
                path = path.to_string_lossy(),
            );
            default()
        }
    }
}

fn write_json_file<V: Serialize>(description: &str, path: &Path, value: &V) {
    match File::create(path) {
        Ok(file) => match serde_json::to_writer_pretty(file, value) {
            Ok(()) => log::trace!(
                "Wrote {description} to {path}",
                path = path.to_string_lossy()
            ),
            Err(e) => {
                log::error!(
                    "Error while writing {description} file {path}: {e}",
                    path = path.to_string_lossy(),
                );
            }
        },
        Err(e) => {
            log::error!(
                "Error while opening {description} file {path}: {e}",
                path = path.to_string_lossy(),
            );
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use blocktrace::settings::EmitterSamplingStrategy;
    use pretty_assertions::assert_eq;

    fn args(config: &Path, set: &[&str]) -> SettingsArgs {
        SettingsArgs {
            config: Some(config.to_owned()),
            no_config_files: false,
            set: set.iter().map(|s| parse_configure(s).unwrap()).collect(),
        }
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");

        assert_eq!(load_config(&path, true), RenderSettings::default());

        let written: RenderSettings =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, RenderSettings::default());
    }

    #[test]
    fn syntax_error_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        fs::write(&path, "{ max_depth: ").unwrap();

        assert_eq!(load_config(&path, true), RenderSettings::default());
        // not overwritten
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ max_depth: ");
    }

    #[test]
    fn partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        fs::write(&path, r#"{"max_depth": 3}"#).unwrap();

        let settings = args(&path, &[]).build_settings().unwrap();
        assert_eq!(settings.max_depth, 3);
        assert_eq!(settings.emitters, RenderSettings::default().emitters);
    }

    #[test]
    fn set_overrides_file_and_does_not_create_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");

        let settings = args(&path, &["seed=7", r#"emitters={"strategy":"all"}"#])
            .build_settings()
            .unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.emitters.strategy, EmitterSamplingStrategy::All);
        assert!(!path.exists());
    }

    #[test]
    fn set_with_wrong_type_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        let error = args(&path, &[r#"max_depth="deep""#]).build_settings().unwrap_err();
        assert_eq!(error.to_string(), "--set did not produce valid settings");
    }

    #[test]
    fn no_config_files() {
        let settings = SettingsArgs {
            config: None,
            no_config_files: true,
            set: vec![],
        }
        .build_settings()
        .unwrap();
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn parse_configure_requires_equals() {
        assert_eq!(
            parse_configure("max_depth=2").unwrap(),
            ("max_depth".to_owned(), serde_json::json!(2))
        );
        assert!(parse_configure("max_depth").is_err());
        assert!(parse_configure("max_depth=two").is_err());
    }
}

//! Configuration for liquid tag rendering.
//!
//! Parses `lq.toml` with serde and discovers it in the current directory or
//! any parent. CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [content]
//! dir = "content"
//!
//! [tags]
//! notebook_dir = "notebooks"
//!
//! [notebook]
//! css_compiler = "lessc"
//! wrapper_id = "nb-wrapper"
//!
//! [settings]
//! theme = "dark"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `content.dir`, `tags.notebook_dir`, `notebook.css_compiler`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::env::{self, VarError};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Values passed on the command line.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the content root.
    pub content_dir: Option<PathBuf>,
    /// Override the notebook directory.
    pub notebook_dir: Option<String>,
    /// Override the CSS compiler executable.
    pub css_compiler: Option<String>,
}

/// File name looked for during discovery.
const CONFIG_FILENAME: &str = "lq.toml";

const DEFAULT_CONTENT_DIR: &str = "content";

/// Settings for a render run, loaded from `lq.toml`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content section (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Tag options.
    pub tags: TagsSection,
    /// Notebook tag options.
    pub notebook: NotebookConfig,
    /// Free-form settings passed through to tag handlers.
    pub settings: BTreeMap<String, String>,

    /// Resolved content root (set after loading).
    #[serde(skip)]
    pub content_dir: PathBuf,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    dir: Option<String>,
}

/// `[tags]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TagsSection {
    /// Notebook directory, relative to the content root.
    pub notebook_dir: String,
}

impl Default for TagsSection {
    fn default() -> Self {
        Self {
            notebook_dir: "notebooks".to_owned(),
        }
    }
}

/// `[notebook]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotebookConfig {
    /// LESS compiler executable.
    pub css_compiler: String,
    /// Id of the element notebook styles are scoped to.
    pub wrapper_id: String,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            css_compiler: "lessc".to_owned(),
            wrapper_id: "nb-wrapper".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.dir`").
        field: String,
        /// Error message (e.g., "${`SITE_ROOT`} is not set").
        message: String,
    },
}

/// Expand `value` in place. Values without `${` are left untouched, so a
/// literal `$` in a path needs no escaping.
fn expand_field(value: &mut String, field: &str) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }
    let expanded = shellexpand::env_with_context(value.as_str(), |var| match env::var(var) {
        Ok(val) => Ok(Some(val)),
        Err(VarError::NotPresent) => Err("is not set"),
        Err(VarError::NotUnicode(_)) => Err("is not valid UTF-8"),
    })
    .map(Cow::into_owned)
    .map_err(|err| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} {}", err.var_name, err.cause),
    })?;
    *value = expanded;
    Ok(())
}

/// Reject blank strings.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a value usable as an HTML id and CSS `#id` selector.
fn require_css_identifier(value: &str, field: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ConfigError::Validation(format!(
            "{field} must start with a letter and contain only letters, digits, '-' or '_'"
        )));
    }
    Ok(())
}

impl Config {
    /// Resolve the effective configuration.
    ///
    /// An explicit `config_path` must exist. Without one, the nearest
    /// `lq.toml` above the working directory is used, falling back to defaults.
    ///
    /// CLI settings win over file values and are validated again.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Overlay command-line values onto the loaded file values.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.content_dir.clone_from(content_dir);
        }
        if let Some(notebook_dir) = &settings.notebook_dir {
            self.tags.notebook_dir.clone_from(notebook_dir);
        }
        if let Some(css_compiler) = &settings.css_compiler {
            self.notebook.css_compiler.clone_from(css_compiler);
        }
    }

    /// Walk up from the working directory looking for `lq.toml`.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Defaults rooted at the working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Defaults rooted at `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfigRaw::default(),
            tags: TagsSection::default(),
            notebook: NotebookConfig::default(),
            settings: BTreeMap::new(),
            content_dir: base.join(DEFAULT_CONTENT_DIR),
            config_path: None,
        }
    }

    /// Parse, expand and resolve a single `lq.toml`.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Check values that would otherwise fail later inside a tag handler.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.tags.notebook_dir, "tags.notebook_dir")?;
        require_non_empty(&self.notebook.css_compiler, "notebook.css_compiler")?;
        require_css_identifier(&self.notebook.wrapper_id, "notebook.wrapper_id")?;
        Ok(())
    }

    /// Expand `${VAR}` references in the fields that name paths or tools.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(dir) = self.content.dir.as_mut() {
            expand_field(dir, "content.dir")?;
        }
        expand_field(&mut self.tags.notebook_dir, "tags.notebook_dir")?;
        expand_field(&mut self.notebook.css_compiler, "notebook.css_compiler")?;
        Ok(())
    }

    /// Resolve the content root against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_dir =
            config_dir.join(self.content.dir.as_deref().unwrap_or(DEFAULT_CONTENT_DIR));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/site"));
        assert_eq!(config.content_dir, PathBuf::from("/site/content"));
        assert_eq!(config.tags.notebook_dir, "notebooks");
        assert_eq!(config.notebook.css_compiler, "lessc");
        assert_eq!(config.notebook.wrapper_id, "nb-wrapper");
        assert!(config.settings.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tags.notebook_dir, "notebooks");
        assert_eq!(config.notebook.css_compiler, "lessc");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[content]
dir = "src/content"

[tags]
notebook_dir = "ipynb"

[notebook]
css_compiler = "/usr/local/bin/lessc"
wrapper_id = "notebook"

[settings]
theme = "dark"
SITEURL = "https://example.com"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.content_dir, PathBuf::from("/project/src/content"));
        assert_eq!(config.tags.notebook_dir, "ipynb");
        assert_eq!(config.notebook.css_compiler, "/usr/local/bin/lessc");
        assert_eq!(config.notebook.wrapper_id, "notebook");
        assert_eq!(config.settings.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(config.settings.len(), 2);
    }

    #[test]
    fn test_resolve_default_content_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.content_dir, PathBuf::from("/project/content"));
    }

    #[test]
    fn test_validation_empty_notebook_dir() {
        let config: Config = toml::from_str("[tags]\nnotebook_dir = \"\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("tags.notebook_dir"));
    }

    #[test]
    fn test_validation_empty_compiler() {
        let config: Config = toml::from_str("[notebook]\ncss_compiler = \" \"").unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("css_compiler"));
    }

    #[test]
    fn test_validation_wrapper_id() {
        for bad in ["", "1abc", "nb wrapper", "nb#x", "-nb"] {
            let config = Config {
                notebook: NotebookConfig {
                    wrapper_id: bad.to_owned(),
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{bad:?} should be rejected");
        }
        for good in ["nb", "nb-wrapper", "Nb_2"] {
            let config = Config {
                notebook: NotebookConfig {
                    wrapper_id: good.to_owned(),
                    ..Default::default()
                },
                ..Default::default()
            };
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/site"));
        let overrides = CliSettings {
            notebook_dir: Some("nb".to_owned()),
            css_compiler: Some("lessc-4".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.tags.notebook_dir, "nb");
        assert_eq!(config.notebook.css_compiler, "lessc-4");
        assert_eq!(config.content_dir, PathBuf::from("/site/content")); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_content_dir() {
        let mut config = Config::default_with_base(Path::new("/site"));
        let overrides = CliSettings {
            content_dir: Some(PathBuf::from("/elsewhere")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.content_dir, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lq.toml");
        fs::write(&path, "[content]\ndir = \"posts\"\n[tags]\nnotebook_dir = \"nb\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.content_dir, dir.path().join("posts"));
        assert_eq!(config.tags.notebook_dir, "nb");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let err = Config::load(Some(Path::new("/nonexistent/lq.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lq.toml");
        fs::write(&path, "[tags\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_expands_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lq.toml");
        fs::write(
            &path,
            "[notebook]\ncss_compiler = \"${LQ_CONFIG_TEST_LESSC:-npx-lessc}\"\n",
        )
        .unwrap();

        // SAFETY: variable name is unique to this test
        unsafe {
            env::remove_var("LQ_CONFIG_TEST_LESSC");
        }
        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.notebook.css_compiler, "npx-lessc");
    }

    #[test]
    fn test_expand_path_fields() {
        // SAFETY: variable names are unique to this test
        unsafe {
            env::set_var("LQ_CONFIG_TEST_SITE", "/srv/site");
            env::set_var("LQ_CONFIG_TEST_NB", "ipynb");
        }
        let mut config: Config = toml::from_str(
            "[content]\ndir = \"${LQ_CONFIG_TEST_SITE}/content\"\n\
             [tags]\nnotebook_dir = \"${LQ_CONFIG_TEST_NB}\"\n",
        )
        .unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/ignored"));

        assert_eq!(config.content_dir, PathBuf::from("/srv/site/content"));
        assert_eq!(config.tags.notebook_dir, "ipynb");
        unsafe {
            env::remove_var("LQ_CONFIG_TEST_SITE");
            env::remove_var("LQ_CONFIG_TEST_NB");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            env::remove_var("LQ_CONFIG_TEST_UNSET");
        }
        let mut config: Config =
            toml::from_str("[tags]\nnotebook_dir = \"${LQ_CONFIG_TEST_UNSET}\"\n").unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Environment variable error in tags.notebook_dir: ${LQ_CONFIG_TEST_UNSET} is not set"
        );
    }

    #[test]
    fn test_literal_dollar_kept() {
        let mut config: Config = toml::from_str("[content]\ndir = \"$site/content\"\n").unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.content.dir.as_deref(), Some("$site/content"));
    }

    #[test]
    fn test_cli_override_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lq.toml");
        fs::write(&path, "").unwrap();

        let overrides = CliSettings {
            notebook_dir: Some(String::new()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}

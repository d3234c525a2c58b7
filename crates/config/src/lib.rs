//! Layered configuration for vellum.
//!
//! Values are merged from, in increasing priority:
//! 1. built-in defaults ([`Config::default`]),
//! 2. a TOML, YAML or JSON file (`vellum.toml` in the platform config
//!    directory, or an explicit path),
//! 3. environment variables prefixed `VELLUM_`, with `__` separating nested
//!    keys (`VELLUM_CACHE__MAX_SIZE=1048576`).
//!
//! ```toml
//! [source]
//! base = "https://example.org/bible/"
//!
//! [languages.de]
//! resource = "texts/de/luther_1912.zst"
//! naming = "numbered-prefix"
//! default_book = "Mose"
//!
//! [cache]
//! max_size = 52428800
//! cleanup_threshold = 41943040
//! ```

pub mod error;
mod models;

pub use crate::models::{CacheConfig, LanguageConfig, SourceConfig, SourceLocation};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::instrument;

const ENV_PREFIX: &str = "VELLUM_";
const FILE_NAME: &str = "vellum.toml";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "vellum")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    /// Language code → translation.
    pub languages: BTreeMap<String, LanguageConfig>,
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            languages: models::default_languages(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// `vellum.toml` in the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(FILE_NAME))
    }

    /// The layered provider, before extraction and validation.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = match path {
            Some(path) if !path.is_file() => {
                exn::bail!(ErrorKind::invalid(format!("config file {} does not exist", path.display())))
            },
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Loading configuration file");
            figment = match file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
                Some("toml") | None => figment.merge(Toml::file_exact(&file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(&file)),
                Some("json") => figment.merge(Json::file_exact(&file)),
                Some(other) => {
                    exn::bail!(ErrorKind::invalid(format!("config file extension .{other}")))
                },
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the configuration.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(path)?)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            exn::bail!(ErrorKind::invalid("languages"));
        }
        for (code, language) in &self.languages {
            // Cache keys use ':' to separate a language code from the rest.
            if code.trim().is_empty() || code.contains(':') {
                exn::bail!(ErrorKind::invalid("languages.<code>"));
            }
            vellum_source::validate_resource(&language.resource)
                .or_raise(|| ErrorKind::invalid(format!("languages.{code}.resource")))?;
        }
        self.cache.validate()
    }

    pub fn language(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.get(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use vellum_cache::Location;
    use vellum_corpus::BookNaming;

    fn load_in(jail: &Jail, path: Option<&str>) -> Result<Config> {
        Config::load(path.map(|p| jail.directory().join(p)).as_deref())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.language("en").unwrap().naming, BookNaming::Identity);
        assert_eq!(config.language("de").unwrap().naming, BookNaming::NumberedPrefix);
        assert_eq!(config.language("de").unwrap().resource, "texts/de/luther_1912.zst");
        assert_eq!(config.cache.max_size, 50 * 1024 * 1024);
        assert_eq!(config.cache.cleanup_threshold, 40 * 1024 * 1024);
        assert_eq!(config.source.location(), SourceLocation::Directory(PathBuf::from(".")));
    }

    #[test]
    fn test_toml_file_merges_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "vellum.toml",
                r#"
                    [source]
                    base = "https://example.org/bible/"

                    [languages.fr]
                    resource = "texts/fr/segond.txt"

                    [languages.de]
                    resource = "texts/de/luther_1912.zst"
                    naming = "numbered-prefix"
                    default_book = "Mose"

                    [cache]
                    max_size = 1000
                    cleanup_threshold = 800
                    max_entry_size = 100
                "#,
            )?;
            let config = load_in(jail, Some("vellum.toml")).unwrap();
            assert_eq!(config.source.location(), SourceLocation::Http("https://example.org/bible/".into()));
            assert_eq!(config.languages.len(), 3);
            assert_eq!(config.language("fr").unwrap().naming, BookNaming::Identity);
            assert_eq!(config.language("de").unwrap().default_book.as_deref(), Some("Mose"));
            assert_eq!(config.cache.cleanup_threshold, 800);
            assert_eq!(config.cache.bytes_per_char, 2);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_and_json_files() {
        Jail::expect_with(|jail| {
            jail.create_file("vellum.yaml", "cache:\n  bytes_per_char: 4\n")?;
            jail.create_file("vellum.json", r#"{"cache": {"eviction_ratio": 0.5}}"#)?;
            assert_eq!(load_in(jail, Some("vellum.yaml")).unwrap().cache.bytes_per_char, 4);
            assert_eq!(load_in(jail, Some("vellum.json")).unwrap().cache.eviction_ratio, 0.5);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("vellum.toml", "[cache]\nmax_size = 1000\ncleanup_threshold = 500\nmax_entry_size = 10")?;
            jail.set_env("VELLUM_CACHE__CLEANUP_THRESHOLD", "900");
            jail.set_env("VELLUM_SOURCE__BASE", "/srv/bible");
            let config = load_in(jail, Some("vellum.toml")).unwrap();
            assert_eq!(config.cache.cleanup_threshold, 900);
            assert_eq!(config.source.location(), SourceLocation::Directory(PathBuf::from("/srv/bible")));
            Ok(())
        });
    }

    #[rstest]
    #[case("[cache]\ncleanup_threshold = 99999999999", "cache.cleanup_threshold")]
    #[case("[cache]\nbytes_per_char = 0", "cache.bytes_per_char")]
    #[case("[cache]\neviction_ratio = 1.5", "cache.eviction_ratio")]
    #[case("[cache]\neviction_ratio = 0.0", "cache.eviction_ratio")]
    #[case("[languages.xx]\nresource = \"../secrets\"", "languages.xx.resource")]
    #[case("[languages.\"pt:br\"]\nresource = \"texts/pt/almeida.zst\"", "languages.<code>")]
    fn test_invalid_values(#[case] toml: &'static str, #[case] field: &'static str) {
        Jail::expect_with(move |jail| {
            jail.create_file("vellum.toml", toml)?;
            let err = load_in(jail, Some("vellum.toml")).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(f) if f == field), "{err:?}");
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("vellum.toml", "[cache\nmax_size = ")?;
            let err = load_in(jail, Some("vellum.toml")).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Load));
            Ok(())
        });
    }

    #[test]
    fn test_wrong_type_is_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("vellum.toml", "[cache]\nmax_size = \"big\"")?;
            let err = load_in(jail, Some("vellum.toml")).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Load));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_cache_options() {
        let mut cache = CacheConfig {
            path: None,
            ..CacheConfig::default()
        };
        assert_eq!(cache.options().location, Location::Memory);
        cache.path = Some(PathBuf::from("/tmp/vellum.sqlite"));
        let options = cache.options();
        assert_eq!(options.location, Location::File(PathBuf::from("/tmp/vellum.sqlite")));
        assert_eq!(options.eviction_ratio, 0.2);
    }
}

//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RECOMMEND__TOP_N=10`). Provides helpers to expand `~` and `${VAR}` and
//! to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::PlatformMatch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub embedding: EmbeddingConfig,
    pub recommend: RecommendConfig,
    pub trends: TrendsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Raw course CSV consumed by the preprocessor.
    pub courses_csv: String,
    /// LanceDB directory holding the augmented dataset.
    pub dataset_dir: String,
    /// Directory of `survey_results_public_<year>.csv` files.
    pub surveys_dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model_dir: Option<String>,
    pub use_fake: bool,
    pub batch_size: usize,
    pub max_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    pub top_n: usize,
    pub popularity_weight: f32,
    pub platform_match: PlatformMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsConfig {
    /// Survey year to analyze; the latest loaded year when unset.
    pub year: Option<i32>,
    pub limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                courses_csv: "data/courses_cleaned_dataset.csv".to_string(),
                dataset_dir: "data/processed/courses".to_string(),
                surveys_dir: "data/surveys".to_string(),
            },
            embedding: EmbeddingConfig::default(),
            recommend: RecommendConfig { top_n: 5, popularity_weight: 0.5, platform_match: PlatformMatch::Substring },
            trends: TrendsConfig { year: None, limit: 10 },
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { model_dir: None, use_fake: false, batch_size: 32, max_len: 256 }
    }
}

impl AppConfig {
    pub fn courses_csv_path(&self) -> PathBuf { resolve_with_base(&working_dir(), &self.data.courses_csv) }

    pub fn dataset_path(&self) -> PathBuf { resolve_with_base(&working_dir(), &self.data.dataset_dir) }

    pub fn surveys_path(&self) -> PathBuf { resolve_with_base(&working_dir(), &self.data.surveys_dir) }

    pub fn model_dir_path(&self) -> Option<PathBuf> {
        self.embedding.model_dir.as_deref().map(|p| resolve_with_base(&working_dir(), p))
    }

    fn validate(&self) -> Result<(), Error> {
        if self.recommend.top_n == 0 {
            return Err(Error::InvalidConfig("recommend.top_n must be at least 1".into()));
        }
        let w = self.recommend.popularity_weight;
        if !(0.0..=1.0).contains(&w) {
            return Err(Error::InvalidConfig(format!("recommend.popularity_weight must be in [0, 1], got {w}")));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be at least 1".into()));
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be at least 1".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, env_name: env_name.to_string() };
        let settings = config.settings()?;
        config.validate_for_env(&settings)?;
        Ok(config)
    }

    pub fn env_name(&self) -> &str { &self.env_name }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The fully merged, validated settings.
    pub fn settings(&self) -> anyhow::Result<AppConfig> {
        let settings: AppConfig = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, settings: &AppConfig) -> Result<(), Error> {
        match self.env_name.as_str() {
            "prod" | "production" if settings.embedding.use_fake => Err(Error::InvalidConfig(
                "embedding.use_fake cannot be enabled in production".into(),
            )),
            _ => Ok(()),
        }
    }
}

fn working_dir() -> PathBuf { env::current_dir().unwrap_or_else(|_| PathBuf::from(".")) }

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_files() {
        Jail::expect_with(|_jail| {
            let config = Config::load_for_env("test").map_err(|e| e.to_string())?;
            let settings = config.settings().map_err(|e| e.to_string())?;
            assert_eq!(settings, AppConfig::default());
            assert_eq!(settings.recommend.platform_match, PlatformMatch::Substring);
            Ok(())
        });
    }

    #[test]
    fn env_file_and_vars_layer_over_base() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[recommend]\ntop_n = 8\npopularity_weight = 0.2\n")?;
            jail.create_file("config.test.toml", "[recommend]\nplatform_match = \"exact\"\n")?;
            jail.set_env("APP_RECOMMEND__TOP_N", "12");
            jail.set_env("APP_EMBEDDING__USE_FAKE", "true");
            let settings = Config::load_for_env("test").and_then(|c| c.settings()).map_err(|e| e.to_string())?;
            assert_eq!(settings.recommend.top_n, 12);
            assert!((settings.recommend.popularity_weight - 0.2).abs() < 1e-6);
            assert_eq!(settings.recommend.platform_match, PlatformMatch::Exact);
            assert!(settings.embedding.use_fake);
            let top_n: usize = Config::load_for_env("test").and_then(|c| c.get("recommend.top_n")).map_err(|e| e.to_string())?;
            assert_eq!(top_n, 12);
            Ok(())
        });
    }

    #[test]
    fn rejects_out_of_range_weight() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[recommend]\npopularity_weight = 1.5\n")?;
            assert!(Config::load_for_env("dev").is_err());
            Ok(())
        });
    }

    #[test]
    fn prod_refuses_fake_embeddings() {
        Jail::expect_with(|jail| {
            jail.set_env("APP_EMBEDDING__USE_FAKE", "true");
            assert!(Config::load_for_env("prod").is_err());
            assert!(Config::load_for_env("dev").is_ok());
            Ok(())
        });
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let base = Path::new("/srv/app");
        assert_eq!(resolve_with_base(base, "/data/x.csv"), PathBuf::from("/data/x.csv"));
        assert_eq!(resolve_with_base(base, "data/x.csv"), PathBuf::from("/srv/app/data/x.csv"));
    }
}

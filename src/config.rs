use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{Admits, CatalogError, LabelCatalog, Matcher, PreferenceRule};
use crate::models::ReceiverRanking;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub dataset: Option<DatasetSettings>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_identities")]
    pub identities: Vec<String>,
    #[serde(default = "default_preferences")]
    pub preferences: Vec<PreferenceRuleConfig>,
    #[serde(default)]
    pub receiver_ranking: ReceiverRanking,
    #[serde(default)]
    pub audit_stability: bool,
    /// Largest population accepted by the HTTP surface
    #[serde(default = "default_max_population")]
    pub max_population: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            identities: default_identities(),
            preferences: default_preferences(),
            receiver_ranking: ReceiverRanking::default(),
            audit_stability: false,
            max_population: default_max_population(),
        }
    }
}

impl MatchingSettings {
    pub fn catalog(&self) -> Result<LabelCatalog, CatalogError> {
        LabelCatalog::new(
            self.identities.iter().cloned(),
            self.preferences.iter().cloned().map(PreferenceRule::from),
        )
    }

    pub fn matcher(&self) -> Result<Matcher, CatalogError> {
        Ok(Matcher::new(self.catalog()?, self.receiver_ranking)
            .with_stability_audit(self.audit_stability))
    }

    /// JSON body limit large enough for a `max_population` request
    ///
    /// Budgets a fully spelled-out `f64` per score cell and a long label per
    /// participant, plus fixed slack for the envelope.
    pub fn json_limit(&self) -> usize {
        let n = self.max_population;
        n.saturating_mul(n)
            .saturating_mul(JSON_SCORE_BYTES)
            .saturating_add(n.saturating_mul(2 * JSON_LABEL_BYTES))
            .saturating_add(JSON_ENVELOPE_BYTES)
    }
}

// "-1.2345678901234567e-300," is 25 bytes
const JSON_SCORE_BYTES: usize = 26;
const JSON_LABEL_BYTES: usize = 64;
const JSON_ENVELOPE_BYTES: usize = 1024 * 1024;

/// One preference rule as written in config
///
/// ```toml
/// [[matching.preferences]]
/// label = "Men"
/// admits = ["Male"]
///
/// [[matching.preferences]]
/// label = "Bisexual"
/// admits = "any"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceRuleConfig {
    pub label: String,
    pub admits: AdmitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdmitsConfig {
    List(Vec<String>),
    Keyword(AdmitsKeyword),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmitsKeyword {
    Any,
}

impl From<PreferenceRuleConfig> for PreferenceRule {
    fn from(rule: PreferenceRuleConfig) -> Self {
        let admits = match rule.admits {
            AdmitsConfig::List(identities) => Admits::Only(identities),
            AdmitsConfig::Keyword(AdmitsKeyword::Any) => Admits::Any,
        };
        PreferenceRule::new(rule.label, admits)
    }
}

fn default_identities() -> Vec<String> {
    LabelCatalog::default().identities().to_vec()
}

fn default_preferences() -> Vec<PreferenceRuleConfig> {
    vec![
        PreferenceRuleConfig {
            label: "Men".to_string(),
            admits: AdmitsConfig::List(vec!["Male".to_string()]),
        },
        PreferenceRuleConfig {
            label: "Women".to_string(),
            admits: AdmitsConfig::List(vec!["Female".to_string()]),
        },
        PreferenceRuleConfig {
            label: "Bisexual".to_string(),
            admits: AdmitsConfig::Keyword(AdmitsKeyword::Any),
        },
    ]
}

fn default_max_population() -> usize { 2000 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSettings {
    pub dir: String,
    #[serde(default = "default_scores_file")]
    pub scores_file: String,
    #[serde(default = "default_identities_file")]
    pub identities_file: String,
    #[serde(default = "default_preferences_file")]
    pub preferences_file: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            scores_file: default_scores_file(),
            identities_file: default_identities_file(),
            preferences_file: default_preferences_file(),
        }
    }
}

fn default_scores_file() -> String { "raw_scores.txt".to_string() }
fn default_identities_file() -> String { "genders.txt".to_string() }
fn default_preferences_file() -> String { "gender_preferences.txt".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LUME)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LUME__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .build()?
            .try_deserialize()
    }
}

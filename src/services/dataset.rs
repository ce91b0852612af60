use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::DatasetSettings;
use crate::core::{MatchError, MatchOutcome, Matcher, SideSampler};

/// Errors that can occur while loading a dataset from disk
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path} line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Dataset has {population} participants, exceeding the limit of {limit}")]
    PopulationTooLarge { population: usize, limit: usize },

    #[error("Matching error: {0}")]
    Match(#[from] MatchError),
}

/// Raw population as stored on disk: a score matrix plus two label files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub scores: Vec<Vec<f64>>,
    pub identities: Vec<String>,
    pub preferences: Vec<String>,
}

impl Dataset {
    /// Load the three files named in `settings` from `settings.dir`
    ///
    /// Shapes are not checked here; the matcher rejects mismatches.
    pub fn load(settings: &DatasetSettings) -> Result<Self, DatasetError> {
        let dir = Path::new(&settings.dir);

        let scores_path = dir.join(&settings.scores_file);
        let identities_path = dir.join(&settings.identities_file);
        let preferences_path = dir.join(&settings.preferences_file);

        let dataset = Self {
            scores: parse_scores(&read(&scores_path)?, &scores_path)?,
            identities: parse_labels(&read(&identities_path)?),
            preferences: parse_labels(&read(&preferences_path)?),
        };

        tracing::info!(
            "Loaded dataset from {} ({} score rows, {} identities, {} preferences)",
            dir.display(),
            dataset.scores.len(),
            dataset.identities.len(),
            dataset.preferences.len()
        );

        Ok(dataset)
    }

    pub fn population(&self) -> usize {
        self.scores.len()
    }

    /// Fail when the dataset has more than `limit` score rows
    pub fn ensure_population_within(&self, limit: usize) -> Result<(), DatasetError> {
        let population = self.population();
        if population > limit {
            return Err(DatasetError::PopulationTooLarge { population, limit });
        }
        Ok(())
    }

    /// Run `matcher` over this dataset
    pub fn run<S: SideSampler + ?Sized>(
        &self,
        matcher: &Matcher,
        sampler: &mut S,
    ) -> Result<MatchOutcome, DatasetError> {
        Ok(matcher.run(&self.scores, &self.identities, &self.preferences, sampler)?)
    }
}

fn read(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Whitespace-separated reals, one row per line
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_scores(text: &str, path: &Path) -> Result<Vec<Vec<f64>>, DatasetError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(idx, line)| {
            line.split_whitespace()
                .map(|value| {
                    value.parse::<f64>().map_err(|e| DatasetError::Parse {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        message: format!("{:?}: {}", value, e),
                    })
                })
                .collect::<Result<Vec<f64>, DatasetError>>()
        })
        .collect()
}

/// One label per line, trailing whitespace trimmed, blank lines skipped
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

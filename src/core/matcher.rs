use crate::core::{
    assembler::assemble_matches,
    compatibility::LabelCatalog,
    engine::DeferredAcceptance,
    error::MatchError,
    partition::{RandomSampler, SidePartition, SideSampler},
    preferences::PreferenceBuilder,
    stability::blocking_pairs,
};
use crate::models::{Match, ReceiverRanking, RunStats, ScoreMatrix, Side};

/// Result of one matching run
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matches: Vec<Match>,
    pub partition: SidePartition,
    pub stats: RunStats,
}

impl MatchOutcome {
    fn empty(partition: SidePartition) -> Self {
        let stats = RunStats {
            proposers: partition.proposers().len(),
            receivers: partition.receivers().len(),
            ..RunStats::default()
        };
        Self {
            matches: Vec::new(),
            partition,
            stats,
        }
    }

    /// Participants that appear in no pair, in index order
    pub fn unmatched(&self) -> Vec<usize> {
        let mut paired = vec![false; self.partition.len()];
        for m in &self.matches {
            paired[m.proposer] = true;
            paired[m.receiver] = true;
        }
        (0..paired.len()).filter(|&i| !paired[i]).collect()
    }
}

/// Stable matching orchestrator
///
/// # Pipeline Stages
/// 1. Shape and label validation
/// 2. Side partition (random or pinned)
/// 3. Preference lists for both sides
/// 4. Deferred acceptance
/// 5. Pair assembly
#[derive(Debug, Clone)]
pub struct Matcher {
    catalog: LabelCatalog,
    ranking: ReceiverRanking,
    audit_stability: bool,
}

impl Matcher {
    pub fn new(catalog: LabelCatalog, ranking: ReceiverRanking) -> Self {
        Self {
            catalog,
            ranking,
            audit_stability: false,
        }
    }

    pub fn with_default_labels() -> Self {
        Self::new(LabelCatalog::default(), ReceiverRanking::default())
    }

    /// Re-check every result for blocking pairs and warn if any are found
    pub fn with_stability_audit(mut self, enabled: bool) -> Self {
        self.audit_stability = enabled;
        self
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    pub fn ranking(&self) -> ReceiverRanking {
        self.ranking
    }

    /// Match a population, drawing the proposer half from `sampler`
    ///
    /// # Arguments
    /// * `scores` - N x N matrix; `scores[i][j]` is i's rating of j
    /// * `identities` - N identity labels from the catalog
    /// * `preferences` - N preference labels from the catalog
    /// * `sampler` - uniform sampler used to pick the proposers
    pub fn run<I, P, S>(
        &self,
        scores: &[Vec<f64>],
        identities: &[I],
        preferences: &[P],
        sampler: &mut S,
    ) -> Result<MatchOutcome, MatchError>
    where
        I: AsRef<str>,
        P: AsRef<str>,
        S: SideSampler + ?Sized,
    {
        check_shape(scores, identities.len(), preferences.len())?;
        let partition = SidePartition::sample(scores.len(), sampler)?;
        self.run_with_partition(scores, identities, preferences, partition)
    }

    /// Match a population with a pinned proposer/receiver split
    pub fn run_with_partition<I, P>(
        &self,
        scores: &[Vec<f64>],
        identities: &[I],
        preferences: &[P],
        partition: SidePartition,
    ) -> Result<MatchOutcome, MatchError>
    where
        I: AsRef<str>,
        P: AsRef<str>,
    {
        let scores = check_shape(scores, identities.len(), preferences.len())?;
        if partition.len() != scores.len() {
            return Err(MatchError::InvalidPartition(format!(
                "partition covers {} participants, population has {}",
                partition.len(),
                scores.len()
            )));
        }

        let participants = self.catalog.resolve(identities, preferences)?;

        if partition.is_degenerate() {
            tracing::debug!(population = scores.len(), "degenerate population, nothing to match");
            return Ok(MatchOutcome::empty(partition));
        }

        let builder = PreferenceBuilder::new(scores, &participants, &self.catalog, self.ranking);
        let proposer_prefs = builder.build(partition.proposers(), partition.receivers(), Side::Proposer);
        let receiver_prefs = builder.build(partition.receivers(), partition.proposers(), Side::Receiver);

        tracing::debug!(
            proposers = partition.proposers().len(),
            receivers = partition.receivers().len(),
            proposer_entries = proposer_prefs.total_len(),
            receiver_entries = receiver_prefs.total_len(),
            "preference lists built"
        );

        let outcome = DeferredAcceptance::new(&proposer_prefs, &receiver_prefs).run(&partition);
        let matches = assemble_matches(&outcome.holders);

        if self.audit_stability {
            let blocking = blocking_pairs(&matches, &partition, &proposer_prefs, &receiver_prefs);
            if !blocking.is_empty() {
                tracing::warn!(count = blocking.len(), pairs = ?blocking, "matching has blocking pairs");
            }
        }

        tracing::debug!(stats = ?outcome.stats, "matching complete");

        Ok(MatchOutcome {
            matches,
            partition,
            stats: outcome.stats,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_labels()
    }
}

/// Lengths must agree and every row must be N wide
fn check_shape<'a>(
    scores: &'a [Vec<f64>],
    identities: usize,
    preferences: usize,
) -> Result<ScoreMatrix<'a>, MatchError> {
    if scores.len() != identities || scores.len() != preferences {
        return Err(MatchError::ShapeMismatch {
            scores: scores.len(),
            identities,
            preferences,
        });
    }
    ScoreMatrix::new(scores)
}

/// Match a population with the default labels and a random split
pub fn run_matching<I, P>(
    scores: &[Vec<f64>],
    identities: &[I],
    preferences: &[P],
) -> Result<Vec<Match>, MatchError>
where
    I: AsRef<str>,
    P: AsRef<str>,
{
    let mut sampler = RandomSampler::from_entropy();
    Matcher::with_default_labels()
        .run(scores, identities, preferences, &mut sampler)
        .map(|outcome| outcome.matches)
}

/// Like [`run_matching`] but the split is reproducible from `seed`
pub fn run_matching_seeded<I, P>(
    scores: &[Vec<f64>],
    identities: &[I],
    preferences: &[P],
    seed: u64,
) -> Result<Vec<Match>, MatchError>
where
    I: AsRef<str>,
    P: AsRef<str>,
{
    let mut sampler = RandomSampler::seeded(seed);
    Matcher::with_default_labels()
        .run(scores, identities, preferences, &mut sampler)
        .map(|outcome| outcome.matches)
}

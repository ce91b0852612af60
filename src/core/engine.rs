use std::collections::VecDeque;

use crate::core::partition::SidePartition;
use crate::core::preferences::PreferenceTable;
use crate::models::RunStats;

/// Lifecycle of a proposer during one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposerState {
    Free,
    Engaged,
    /// Proposed to every candidate without being held; terminal
    Exhausted,
}

/// Final engagement state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutcome {
    /// `holders[r]` is the proposer held by receiver `r`, indexed by participant
    pub holders: Vec<Option<usize>>,
    pub stats: RunStats,
}

/// Dense receiver-side rank lookup; one row of `n` ranks per receiver
struct RankArena {
    n: usize,
    row_of: Vec<Option<usize>>,
    ranks: Vec<u32>,
}

impl RankArena {
    const UNRANKED: u32 = u32::MAX;

    fn build(receivers: &[usize], prefs: &PreferenceTable, n: usize) -> Self {
        let mut row_of = vec![None; n];
        let mut ranks = vec![Self::UNRANKED; receivers.len() * n];

        for (row, &r) in receivers.iter().enumerate() {
            row_of[r] = Some(row);
            let base = row * n;
            for (rank, &candidate) in prefs.list(r).iter().enumerate() {
                ranks[base + candidate] = rank as u32;
            }
        }

        Self { n, row_of, ranks }
    }

    #[inline]
    fn rank(&self, receiver: usize, proposer: usize) -> u32 {
        match self.row_of[receiver] {
            Some(row) => self.ranks[row * self.n + proposer],
            None => Self::UNRANKED,
        }
    }

    /// Whether `receiver` strictly prefers `challenger` over `incumbent`
    #[inline]
    fn prefers(&self, receiver: usize, challenger: usize, incumbent: usize) -> bool {
        self.rank(receiver, challenger) < self.rank(receiver, incumbent)
    }
}

/// Proposer-initiated deferred acceptance over prebuilt preference tables
///
/// All per-run state (cursors, holders, the free queue) lives inside
/// [`run`](Self::run), so concurrent or repeated runs never share anything.
#[derive(Debug, Clone, Copy)]
pub struct DeferredAcceptance<'a> {
    proposer_prefs: &'a PreferenceTable,
    receiver_prefs: &'a PreferenceTable,
}

impl<'a> DeferredAcceptance<'a> {
    pub fn new(proposer_prefs: &'a PreferenceTable, receiver_prefs: &'a PreferenceTable) -> Self {
        Self {
            proposer_prefs,
            receiver_prefs,
        }
    }

    /// Run the proposal loop until no proposer is free
    pub fn run(&self, partition: &SidePartition) -> EngineOutcome {
        let n = partition.len();
        let ranks = RankArena::build(partition.receivers(), self.receiver_prefs, n);

        let mut cursor = vec![0usize; n];
        let mut state = vec![ProposerState::Free; n];
        let mut holders: Vec<Option<usize>> = vec![None; n];
        let mut free: VecDeque<usize> = partition.proposers().iter().copied().collect();

        let mut stats = RunStats {
            proposers: partition.proposers().len(),
            receivers: partition.receivers().len(),
            ..RunStats::default()
        };

        while let Some(p) = free.pop_front() {
            stats.iterations += 1;

            let Some(&r) = self.proposer_prefs.list(p).get(cursor[p]) else {
                state[p] = ProposerState::Exhausted;
                stats.exhausted += 1;
                tracing::trace!(proposer = p, "proposer exhausted");
                continue;
            };
            cursor[p] += 1;
            stats.proposals += 1;

            match holders[r] {
                None => {
                    holders[r] = Some(p);
                    state[p] = ProposerState::Engaged;
                }
                Some(q) if ranks.prefers(r, p, q) => {
                    holders[r] = Some(p);
                    state[p] = ProposerState::Engaged;
                    state[q] = ProposerState::Free;
                    free.push_back(q);
                    tracing::trace!(receiver = r, held = p, bumped = q, "proposer bumped");
                }
                Some(_) => free.push_back(p),
            }
        }

        debug_assert!(partition
            .proposers()
            .iter()
            .all(|&p| state[p] != ProposerState::Free));

        stats.matched = holders.iter().filter(|h| h.is_some()).count();

        EngineOutcome { holders, stats }
    }
}

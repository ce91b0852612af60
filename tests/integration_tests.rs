// Integration tests for Lume Pairing

use lume_pairing::core::{
    blocking_pairs, run_matching_seeded, DeferredAcceptance, LabelCatalog, MatchOutcome, Matcher,
    PreferenceBuilder, PreferenceTable, RandomSampler, SidePartition,
};
use lume_pairing::models::{Match, ReceiverRanking, ScoreMatrix, Side};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

const IDENTITIES: [&str; 3] = ["Male", "Female", "Non-binary"];
const PREFERENCES: [&str; 3] = ["Men", "Women", "Bisexual"];

struct Population {
    scores: Vec<Vec<f64>>,
    identities: Vec<&'static str>,
    preferences: Vec<&'static str>,
}

/// Deterministic random population; same seed, same population
fn generate_population(n: usize, seed: u64) -> Population {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let scores = (0..n)
        .map(|_| (0..n).map(|_| rng.gen_range(0.0..1.0f64)).collect())
        .collect();
    let identities = (0..n).map(|_| IDENTITIES[rng.gen_range(0..3usize)]).collect();
    let preferences = (0..n).map(|_| PREFERENCES[rng.gen_range(0..3usize)]).collect();

    Population {
        scores,
        identities,
        preferences,
    }
}

fn tables(
    population: &Population,
    partition: &SidePartition,
    ranking: ReceiverRanking,
) -> (PreferenceTable, PreferenceTable) {
    let catalog = LabelCatalog::default();
    let participants = catalog
        .resolve(&population.identities, &population.preferences)
        .unwrap();
    let scores = ScoreMatrix::new(&population.scores).unwrap();
    let builder = PreferenceBuilder::new(scores, &participants, &catalog, ranking);
    (
        builder.build(partition.proposers(), partition.receivers(), Side::Proposer),
        builder.build(partition.receivers(), partition.proposers(), Side::Receiver),
    )
}

/// Blocking pairs computed straight from the raw score matrix and the label
/// predicate, without going through preference lists
fn raw_blocking_pairs(
    population: &Population,
    outcome: &MatchOutcome,
    ranking: ReceiverRanking,
) -> Vec<(usize, usize)> {
    let catalog = LabelCatalog::default();
    let participants = catalog
        .resolve(&population.identities, &population.preferences)
        .unwrap();
    let scores = &population.scores;

    let mut partner_of = vec![None; scores.len()];
    for m in &outcome.matches {
        partner_of[m.proposer] = Some(m.receiver);
        partner_of[m.receiver] = Some(m.proposer);
    }

    // (score, index) ordering: higher score wins, lower index breaks ties
    let better = |a: (f64, usize), b: (f64, usize)| a.0 > b.0 || (a.0 == b.0 && a.1 < b.1);
    let receiver_rating = |receiver: usize, proposer: usize| match ranking {
        ReceiverRanking::ProposerRating => scores[proposer][receiver],
        ReceiverRanking::OwnRating => scores[receiver][proposer],
    };

    let mut blocking = Vec::new();
    for &p in outcome.partition.proposers() {
        for &r in outcome.partition.receivers() {
            if partner_of[p] == Some(r) || !catalog.admits(&participants[p], &participants[r]) {
                continue;
            }
            let proposer_wants = match partner_of[p] {
                None => true,
                Some(current) => better((scores[p][r], r), (scores[p][current], current)),
            };
            let receiver_wants = match partner_of[r] {
                None => true,
                Some(holder) => better(
                    (receiver_rating(r, p), p),
                    (receiver_rating(r, holder), holder),
                ),
            };
            if proposer_wants && receiver_wants {
                blocking.push((p, r));
            }
        }
    }
    blocking
}

fn run_pinned(matcher: &Matcher, population: &Population, partition: &SidePartition) -> MatchOutcome {
    matcher
        .run_with_partition(
            &population.scores,
            &population.identities,
            &population.preferences,
            partition.clone(),
        )
        .unwrap()
}

fn assert_invariants(population: &Population, outcome: &MatchOutcome, ranking: ReceiverRanking) {
    let catalog = LabelCatalog::default();
    let participants = catalog
        .resolve(&population.identities, &population.preferences)
        .unwrap();
    let partition = &outcome.partition;

    // No double booking
    let mut proposers = HashSet::new();
    let mut receivers = HashSet::new();
    for m in &outcome.matches {
        assert!(proposers.insert(m.proposer), "proposer {} matched twice", m.proposer);
        assert!(receivers.insert(m.receiver), "receiver {} matched twice", m.receiver);
        assert_eq!(partition.side_of(m.proposer), Side::Proposer);
        assert_eq!(partition.side_of(m.receiver), Side::Receiver);
    }

    // Compatibility respected
    for m in &outcome.matches {
        let p = &participants[m.proposer];
        let r = &participants[m.receiver];
        assert!(
            catalog.compatible(p.identity, p.preference, r.identity),
            "pair {:?} violates the proposer's preference",
            m
        );
    }

    // Stability
    let (p_prefs, r_prefs) = tables(population, partition, ranking);
    let blocking = blocking_pairs(&outcome.matches, partition, &p_prefs, &r_prefs);
    assert!(blocking.is_empty(), "blocking pairs found: {:?}", blocking);

    let blocking = raw_blocking_pairs(population, outcome, ranking);
    assert!(blocking.is_empty(), "blocking pairs against raw scores: {:?}", blocking);

    // Termination bound
    let bound = outcome.stats.proposers * p_prefs.max_len();
    assert!(outcome.stats.proposals <= bound);
    assert!(outcome.stats.iterations <= outcome.stats.proposals + outcome.stats.proposers);
    assert_eq!(outcome.stats.matched, outcome.matches.len());
}

#[test]
fn test_random_populations_are_stable() {
    let matcher = Matcher::with_default_labels();

    for seed in 0..200u64 {
        let n = 2 + (seed as usize % 13);
        let population = generate_population(n, seed);
        let outcome = matcher
            .run(
                &population.scores,
                &population.identities,
                &population.preferences,
                &mut RandomSampler::seeded(seed),
            )
            .unwrap();

        assert_eq!(outcome.partition.proposers().len(), n / 2);
        assert_invariants(&population, &outcome, ReceiverRanking::ProposerRating);
    }
}

#[test]
fn test_own_rating_populations_are_stable() {
    let matcher = Matcher::new(LabelCatalog::default(), ReceiverRanking::OwnRating);

    for seed in 0..100u64 {
        let population = generate_population(10, 1_000 + seed);
        let outcome = matcher
            .run(
                &population.scores,
                &population.identities,
                &population.preferences,
                &mut RandomSampler::seeded(seed),
            )
            .unwrap();

        assert_invariants(&population, &outcome, ReceiverRanking::OwnRating);
    }
}

#[test]
fn test_fixed_partition_is_deterministic() {
    let matcher = Matcher::with_default_labels();
    let population = generate_population(20, 77);
    let partition = SidePartition::sample(20, &mut RandomSampler::seeded(3)).unwrap();

    let first = run_pinned(&matcher, &population, &partition);
    for _ in 0..5 {
        let again = run_pinned(&matcher, &population, &partition);
        assert_eq!(first.matches, again.matches);
        assert_eq!(first.stats, again.stats);
    }
}

#[test]
fn test_seeded_entry_point_is_reproducible() {
    let population = generate_population(16, 5);
    let a = run_matching_seeded(&population.scores, &population.identities, &population.preferences, 11).unwrap();
    let b = run_matching_seeded(&population.scores, &population.identities, &population.preferences, 11).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_all_bisexual_mutual_top_choices() {
    let matcher = Matcher::with_default_labels();
    // each proposer's top choice is distinct and mutual
    let population = Population {
        scores: vec![
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
        ],
        identities: vec!["Male", "Female", "Non-binary", "Male"],
        preferences: vec!["Bisexual"; 4],
    };
    let partition = SidePartition::from_proposers(4, vec![0, 1]).unwrap();

    let outcome = run_pinned(&matcher, &population, &partition);
    assert_eq!(outcome.matches, vec![Match::new(0, 2), Match::new(1, 3)]);
    assert!(outcome.unmatched().is_empty());

    let own = Matcher::new(LabelCatalog::default(), ReceiverRanking::OwnRating);
    let outcome = run_pinned(&own, &population, &partition);
    assert_eq!(outcome.matches, vec![Match::new(0, 2), Match::new(1, 3)]);
}

#[test]
fn test_raw_score_check_tracks_rating_direction() {
    let matcher = Matcher::with_default_labels();
    // both proposers want 2 most; 2 rates 1 higher, but 0 rates 2 higher than 1 does
    let population = Population {
        scores: vec![
            vec![0.0, 0.0, 0.9, 0.1],
            vec![0.0, 0.0, 0.8, 0.2],
            vec![0.1, 0.9, 0.0, 0.0],
            vec![0.5, 0.5, 0.0, 0.0],
        ],
        identities: vec!["Male", "Male", "Female", "Female"],
        preferences: vec!["Women", "Women", "Men", "Men"],
    };
    let partition = SidePartition::from_proposers(4, vec![0, 1]).unwrap();

    let outcome = run_pinned(&matcher, &population, &partition);
    assert_eq!(outcome.matches, vec![Match::new(0, 2), Match::new(1, 3)]);
    assert!(raw_blocking_pairs(&population, &outcome, ReceiverRanking::ProposerRating).is_empty());
    // judged by 2's own ratings, 1 and 2 would rather be together
    assert_eq!(
        raw_blocking_pairs(&population, &outcome, ReceiverRanking::OwnRating),
        vec![(1, 2)]
    );

    let own = Matcher::new(LabelCatalog::default(), ReceiverRanking::OwnRating);
    let outcome = run_pinned(&own, &population, &partition);
    assert_eq!(outcome.matches, vec![Match::new(1, 2), Match::new(0, 3)]);
    assert_invariants(&population, &outcome, ReceiverRanking::OwnRating);
}

#[test]
fn test_incompatible_proposer_is_never_matched() {
    let matcher = Matcher::with_default_labels();
    // proposer 0 wants men; every receiver is female or non-binary
    let population = Population {
        scores: vec![vec![0.5; 5]; 5],
        identities: vec!["Female", "Male", "Female", "Non-binary", "Female"],
        preferences: vec!["Men", "Bisexual", "Bisexual", "Bisexual", "Men"],
    };
    let partition = SidePartition::from_proposers(5, vec![0, 1]).unwrap();

    let outcome = run_pinned(&matcher, &population, &partition);
    assert!(outcome
        .matches
        .iter()
        .all(|m| m.proposer != 0 && m.receiver != 0));
    assert_eq!(outcome.stats.exhausted, 1);
    assert_eq!(outcome.matches.len(), 1);
    assert_invariants(&population, &outcome, ReceiverRanking::ProposerRating);
}

#[test]
fn test_shared_top_choice_goes_to_preferred_proposer() {
    let matcher = Matcher::with_default_labels();
    // both proposers rank 2 first; 2 ranks by proposer rating, so 1 wins
    let population = Population {
        scores: vec![
            vec![0.0, 0.0, 0.9, 0.5],
            vec![0.0, 0.0, 0.95, 0.1],
            vec![0.0; 4],
            vec![0.0; 4],
        ],
        identities: vec!["Male", "Male", "Female", "Female"],
        preferences: vec!["Women", "Women", "Men", "Men"],
    };
    let partition = SidePartition::from_proposers(4, vec![0, 1]).unwrap();

    let outcome = run_pinned(&matcher, &population, &partition);
    assert_eq!(outcome.matches, vec![Match::new(1, 2), Match::new(0, 3)]);
}

#[test]
fn test_bumped_proposer_without_compatible_fallback_is_unmatched() {
    let matcher = Matcher::with_default_labels();
    // 0 only admits women and 3 is male, so once bumped from 2 it has nowhere to go
    let population = Population {
        scores: vec![
            vec![0.0, 0.0, 0.9, 0.5],
            vec![0.0, 0.0, 0.95, 0.1],
            vec![0.0; 4],
            vec![0.0; 4],
        ],
        identities: vec!["Male", "Female", "Female", "Male"],
        preferences: vec!["Women", "Bisexual", "Bisexual", "Bisexual"],
    };
    let partition = SidePartition::from_proposers(4, vec![0, 1]).unwrap();

    let outcome = run_pinned(&matcher, &population, &partition);
    assert_eq!(outcome.matches, vec![Match::new(1, 2)]);
    assert_eq!(outcome.unmatched(), vec![0, 3]);
    assert_eq!(outcome.stats.exhausted, 1);
}

#[test]
fn test_cyclic_preferences_halt_within_bound() {
    // every proposer wants receivers in the same order, every receiver
    // prefers the proposers in reverse queue order: maximal bumping
    let k = 8;
    let n = 2 * k;
    let proposers: Vec<usize> = (0..k).collect();
    let receivers: Vec<usize> = (k..n).collect();

    let mut p_lists = vec![Vec::new(); n];
    let mut r_lists = vec![Vec::new(); n];
    for &p in &proposers {
        p_lists[p] = receivers.clone();
    }
    for &r in &receivers {
        r_lists[r] = proposers.iter().rev().copied().collect();
    }

    let partition = SidePartition::from_proposers(n, proposers).unwrap();
    let p_prefs = PreferenceTable::from_lists(p_lists);
    let r_prefs = PreferenceTable::from_lists(r_lists);
    let outcome = DeferredAcceptance::new(&p_prefs, &r_prefs).run(&partition);

    assert_eq!(outcome.stats.matched, k);
    assert!(outcome.stats.proposals <= k * k);
    assert!(outcome.stats.iterations <= outcome.stats.proposals + k);

    // receiver k + i ends up with proposer k - 1 - i
    for i in 0..k {
        assert_eq!(outcome.holders[k + i], Some(k - 1 - i));
    }
}

#[test]
fn test_rotating_preferences_halt_within_bound() {
    let k = 6;
    let n = 2 * k;
    let mut p_lists = vec![Vec::new(); n];
    let mut r_lists = vec![Vec::new(); n];
    for p in 0..k {
        p_lists[p] = (0..k).map(|j| k + (p + j) % k).collect();
    }
    for r in 0..k {
        r_lists[k + r] = (0..k).map(|j| (r + 1 + j) % k).collect();
    }

    let partition = SidePartition::from_proposers(n, (0..k).collect()).unwrap();
    let p_prefs = PreferenceTable::from_lists(p_lists);
    let r_prefs = PreferenceTable::from_lists(r_lists);
    let outcome = DeferredAcceptance::new(&p_prefs, &r_prefs).run(&partition);

    assert_eq!(outcome.stats.matched, k);
    assert!(outcome.stats.proposals <= k * k);

    let matches = lume_pairing::core::assemble_matches(&outcome.holders);
    assert!(blocking_pairs(&matches, &partition, &p_prefs, &r_prefs).is_empty());
}

#[test]
fn test_odd_population_puts_extra_participant_on_receiver_side() {
    let matcher = Matcher::with_default_labels();
    let population = generate_population(7, 21);
    let outcome = matcher
        .run(
            &population.scores,
            &population.identities,
            &population.preferences,
            &mut RandomSampler::seeded(21),
        )
        .unwrap();

    assert_eq!(outcome.partition.proposers().len(), 3);
    assert_eq!(outcome.partition.receivers().len(), 4);
}

use crate::models::Match;

/// Turn the engine's receiver -> holder map into matched pairs
///
/// Receivers holding nobody are omitted, so unmatched participants on
/// either side never appear in the result. Pairs come out in receiver
/// index order.
pub fn assemble_matches(holders: &[Option<usize>]) -> Vec<Match> {
    holders
        .iter()
        .enumerate()
        .filter_map(|(receiver, holder)| holder.map(|proposer| Match::new(proposer, receiver)))
        .collect()
}

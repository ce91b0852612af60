use crate::core::partition::SidePartition;
use crate::core::preferences::PreferenceTable;
use crate::models::Match;

/// Brute-force scan for blocking pairs
///
/// A pair (p, r) blocks when they are not matched to each other, p ranks r
/// above its assignment (or is unmatched with r on its list), and r ranks p
/// above its holder (or is free with p on its list). Each side is judged by
/// its own preference list. An empty result means `matches` is stable.
pub fn blocking_pairs(
    matches: &[Match],
    partition: &SidePartition,
    proposer_prefs: &PreferenceTable,
    receiver_prefs: &PreferenceTable,
) -> Vec<(usize, usize)> {
    let n = partition.len();
    let mut partner_of_proposer = vec![None; n];
    let mut partner_of_receiver = vec![None; n];
    for m in matches {
        partner_of_proposer[m.proposer] = Some(m.receiver);
        partner_of_receiver[m.receiver] = Some(m.proposer);
    }

    let mut blocking = Vec::new();
    for &p in partition.proposers() {
        for &r in partition.receivers() {
            if partner_of_proposer[p] == Some(r) {
                continue;
            }
            if proposer_prefs.prefers(p, r, partner_of_proposer[p])
                && receiver_prefs.prefers(r, p, partner_of_receiver[r])
            {
                blocking.push((p, r));
            }
        }
    }
    blocking
}

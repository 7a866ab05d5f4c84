use rand::Rng;

use crate::catalog::StationCandidate;

/// Removes the failed candidate from the set (by station uuid, not position)
/// and picks a replacement uniformly at random from the remainder.
pub fn next_candidate(
    candidates: &mut Vec<StationCandidate>,
    failed_uuid: &str,
) -> Option<StationCandidate> {
    candidates.retain(|c| c.uuid != failed_uuid);
    if candidates.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..candidates.len());
    Some(candidates[index].clone())
}

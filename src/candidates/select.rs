//! Resolving the ranked candidate list to one company.

use crate::error::SearchError;
use crate::models::Candidate;
use crate::text::fold;

/// Pick the candidate to open.
///
/// Without a target the top-ranked candidate wins. With a target, exact
/// (case-insensitive) name matches are preferred over names merely
/// containing the target; within a class the highest score wins, ties going
/// to the earlier-ranked candidate. A target that matches nothing is an
/// error rather than a guess.
pub fn select_candidate(
    candidates: &[Candidate],
    target: Option<&str>,
) -> Result<Option<Candidate>, SearchError> {
    if candidates.is_empty() {
        return Ok(None);
    }

    let Some(raw_target) = target.filter(|t| !fold(t).is_empty()) else {
        return Ok(candidates.first().cloned());
    };
    let wanted = fold(raw_target);

    let exact = best_scoring(candidates.iter().filter(|c| c.name.to_lowercase() == wanted));
    if let Some(found) = exact {
        return Ok(Some(found.clone()));
    }

    let partial = best_scoring(
        candidates
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&wanted)),
    );
    match partial {
        Some(found) => Ok(Some(found.clone())),
        None => Err(SearchError::CompanyNotFound(raw_target.trim().to_string())),
    }
}

fn best_scoring<'a>(matches: impl Iterator<Item = &'a Candidate>) -> Option<&'a Candidate> {
    matches.fold(None, |best: Option<&Candidate>, c| match best {
        Some(b) if b.match_score >= c.match_score => Some(b),
        _ => Some(c),
    })
}

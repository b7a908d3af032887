use crate::api::error::{ProfileError, ProfileResult};

/// Targets, predictions and (when given) scores must pair up positionally.
pub(crate) fn check_lengths(targets: usize, predictions: usize, scores: Option<usize>) -> ProfileResult<()> {
    if targets != predictions || scores.is_some_and(|s| s != targets) {
        return Err(ProfileError::LengthMismatch { targets, predictions, scores });
    }
    Ok(())
}

/// Reconcile an optional column name during a merge: a name set on only one
/// side wins, two different names are a conflict.
pub(crate) fn merge_field(
    what: &str,
    left: &Option<String>,
    right: &Option<String>,
) -> ProfileResult<Option<String>> {
    match (left, right) {
        (Some(l), Some(r)) if l != r => Err(ProfileError::IncompatibleMerge(format!(
            "{what} differs: '{l}' vs '{r}'"
        ))),
        (Some(l), _) => Ok(Some(l.clone())),
        (None, r) => Ok(r.clone()),
    }
}

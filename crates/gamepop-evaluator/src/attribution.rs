//! Ranking of signed feature attributions.

use serde::{Deserialize, Serialize};

/// Number of contributors reported per prediction.
pub const DEFAULT_TOP_K: usize = 5;

/// A feature and its signed contribution to one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub feature: String,
    pub contribution: f64,
}

/// The `k` entries with the largest absolute value, largest first.
///
/// Signs are kept. Entries with equal magnitude keep their input order.
///
/// ```
/// use gamepop_evaluator::attribution::top_contributions;
///
/// let attributions = [("a", -5.0), ("b", 3.0), ("c", 1.0), ("d", -4.0)];
/// let top = top_contributions(attributions, 2);
/// assert_eq!(top, [("a", -5.0), ("d", -4.0)]);
/// ```
pub fn top_contributions<I, S>(attributions: I, k: usize) -> Vec<(S, f64)>
where
    I: IntoIterator<Item = (S, f64)>,
{
    let mut ranked = attributions.into_iter().collect::<Vec<_>>();
    ranked.sort_by(|(_, a), (_, b)| magnitude(*b).total_cmp(&magnitude(*a)));
    ranked.truncate(k);
    ranked
}

/// `|x|`, with `NaN` ranked below every real value.
fn magnitude(x: f64) -> f64 {
    if x.is_nan() { -1.0 } else { x.abs() }
}

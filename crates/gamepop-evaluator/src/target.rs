//! The training-target transform and its inverse.
//!
//! Models are trained on `ln(1 + players)`. Scores are mapped back to a
//! player count with `exp(score) - 1`; the two functions must stay paired.

/// Log-scale training target for a raw player count.
#[must_use]
pub fn log1p_target(players: f64) -> f64 {
    players.ln_1p()
}

/// Raw player count for a log-scale score: `exp(score) - 1`.
#[must_use]
pub fn inverse_target(log_score: f64) -> f64 {
    log_score.exp_m1()
}

/// Whole estimated player count, rounded and clamped at zero.
///
/// ```
/// use gamepop_evaluator::target::estimated_players;
///
/// assert_eq!(estimated_players(4.5), 89);
/// assert_eq!(estimated_players(-3.0), 0);
/// ```
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn estimated_players(log_score: f64) -> u64 {
    inverse_target(log_score).round().max(0.0) as u64
}

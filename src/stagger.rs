//! Staggered appearance timing shared by the reveal panel and the tour route.

/// Number of items visible `elapsed_ms` after a stagger started, when item `i`
/// appears at `i * step_ms`. The first item is visible immediately.
pub fn staggered_count(elapsed_ms: f32, step_ms: f32, total: usize) -> usize {
    if total == 0 || elapsed_ms < 0.0 {
        return 0;
    }
    if step_ms <= 0.0 {
        return total;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "elapsed_ms / step_ms is non-negative and bounded by total below"
    )]
    let shown = (elapsed_ms / step_ms).floor() as usize + 1;
    shown.min(total)
}

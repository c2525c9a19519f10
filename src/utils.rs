/// Rescales `value` from `[min, max]` into `[0, 1]`. Values are returned
/// unchanged while the range is empty or degenerate (`min >= max`).
#[inline]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if min < max {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        value
    }
}

/// Adds a relative perturbation of at most `epsilon / 2` to `value`, driven
/// by `random` in `[0, 1)`. Used to break exact ties randomly.
#[inline]
pub fn jitter(value: f64, epsilon: f64, random: f64) -> f64 {
    (value + epsilon) * (1.0 + epsilon * (random - 0.5))
}

use std::fmt::Display;

/// Running range of every result backpropagated through a node.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ValueBounds {
    /// The empty range `(+inf, -inf)`.
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Display for ValueBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            f.write_str("[]")
        } else {
            f.write_fmt(format_args!("[{:.4}, {:.4}]", self.min, self.max))
        }
    }
}

impl ValueBounds {
    pub const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    #[inline]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// No result has been recorded yet.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min > self.max
    }

    #[inline]
    pub fn contains(self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Extends the range to include `value`. Never narrows.
    #[inline]
    pub fn widen(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }
}

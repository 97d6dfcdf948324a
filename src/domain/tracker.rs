// ============================================================
// Layer 3 — Best Validation F1 Tracker
// ============================================================
// Decides whether an epoch earns a test-set evaluation.
// Only a strictly better validation score counts; a tie with
// the current best does not re-run the test split.

/// Best validation weighted-F1 seen so far for one dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestF1Tracker {
    best: f64,
}

impl BestF1Tracker {
    /// Starts at 0.0, so an epoch scoring exactly 0.0 never triggers a test.
    pub fn new() -> Self {
        Self { best: 0.0 }
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    /// Record a new validation score.
    /// Returns true (and updates the best) only on strict improvement.
    /// NaN never improves.
    pub fn observe(&mut self, score: f64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }
}

impl Default for BestF1Tracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_improvement_only() {
        let mut t = BestF1Tracker::new();
        assert!(t.observe(0.61));
        // Equal score must not retrigger
        assert!(!t.observe(0.61));
        assert!(!t.observe(0.55));
        assert!(t.observe(0.70));
        assert_eq!(t.best(), 0.70);
    }

    #[test]
    fn test_zero_and_nan_never_trigger() {
        let mut t = BestF1Tracker::new();
        assert!(!t.observe(0.0));
        assert!(!t.observe(f64::NAN));
        assert_eq!(t.best(), 0.0);
    }
}

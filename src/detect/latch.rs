//! Per-key alert latch
//!
//! A latch keeps a detector from re-alerting while its condition holds. The
//! reset policy is a declared property, not an accident of code path: the
//! brute force detector re-arms when the count subsides, the scan and flood
//! detectors stay fired for the rest of the run.

/// How a latch behaves once its condition stops holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    /// Clears when the condition subsides, allowing a later re-fire.
    AutoReset,
    /// Never re-arms for the lifetime of the run.
    OneShot,
}

/// Per-key boolean alert state.
#[derive(Debug, Clone)]
pub struct AlertLatch {
    policy: ResetPolicy,
    active: bool,
}

impl AlertLatch {
    pub fn new(policy: ResetPolicy) -> Self {
        Self {
            policy,
            active: false,
        }
    }

    /// Feed the latch the current condition. Returns true exactly when the
    /// caller should raise an alert: on the inactive-to-active transition.
    pub fn observe(&mut self, triggered: bool) -> bool {
        if triggered {
            if self.active {
                return false;
            }
            self.active = true;
            return true;
        }
        if self.active && self.policy == ResetPolicy::AutoReset {
            self.active = false;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_reset_refires_after_clear() {
        let mut latch = AlertLatch::new(ResetPolicy::AutoReset);
        assert!(latch.observe(true));
        assert!(!latch.observe(true));
        assert!(!latch.observe(false));
        assert!(!latch.is_active());
        assert!(latch.observe(true));
    }

    #[test]
    fn test_one_shot_never_rearms() {
        let mut latch = AlertLatch::new(ResetPolicy::OneShot);
        assert!(latch.observe(true));
        assert!(!latch.observe(false));
        assert!(latch.is_active());
        assert!(!latch.observe(true));
    }

    #[test]
    fn test_no_alert_below_condition() {
        let mut latch = AlertLatch::new(ResetPolicy::AutoReset);
        assert!(!latch.observe(false));
        assert!(!latch.is_active());
    }
}

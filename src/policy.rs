//! Load-factor bounds and resize targets.

use crate::Error;

/// Smallest number of slots a table ever has.
pub const MIN_SIZE: usize = 17;

/// Load factor at or above which an insertion grows the table.
pub const GROW_AT: f64 = 0.7;

/// Load factor at or below which a removal shrinks the table.
pub const SHRINK_AT: f64 = GROW_AT / 4.0;

/// Multiplier applied to the slot count on growth, divisor on shrink.
pub const RESIZE_FACTOR: usize = 2;

/// Controls when a [`HashMap`](crate::HashMap) resizes and by how much.
///
/// Load factor always means `(entries + tombstones) / slots`. Tombstones count
/// toward both thresholds since they lengthen probe sequences exactly like
/// live entries do, and a resize is the only thing that clears them.
///
/// # Examples
///
/// ```rust
/// use closed_hash::HashMap;
/// use closed_hash::ResizePolicy;
/// use closed_hash::key_codec::Crc32;
///
/// let policy = ResizePolicy::default().with_min_size(64).with_grow_at(0.5);
/// let map: HashMap<u32, u32, _> = HashMap::with_policy_and_hasher(policy, Crc32).unwrap();
/// assert_eq!(map.size(), 64);
///
/// let bad = ResizePolicy::default().with_shrink_at(0.9);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePolicy {
    min_size: usize,
    grow_at: f64,
    shrink_at: f64,
    factor: usize,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            min_size: MIN_SIZE,
            grow_at: GROW_AT,
            shrink_at: SHRINK_AT,
            factor: RESIZE_FACTOR,
        }
    }
}

impl ResizePolicy {
    /// Sets the minimum (and initial) slot count.
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Sets the growth threshold.
    pub fn with_grow_at(mut self, grow_at: f64) -> Self {
        self.grow_at = grow_at;
        self
    }

    /// Sets the shrink threshold.
    pub fn with_shrink_at(mut self, shrink_at: f64) -> Self {
        self.shrink_at = shrink_at;
        self
    }

    /// Sets the resize factor.
    pub fn with_factor(mut self, factor: usize) -> Self {
        self.factor = factor;
        self
    }

    /// The minimum slot count.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// The growth threshold.
    pub fn grow_at(&self) -> f64 {
        self.grow_at
    }

    /// The shrink threshold.
    pub fn shrink_at(&self) -> f64 {
        self.shrink_at
    }

    /// The resize factor.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Checks that the thresholds leave room for a resize to land inside them.
    ///
    /// Requires `min_size >= 2`, `factor >= 2`, `0 < shrink_at < grow_at < 1`,
    /// and `shrink_at * factor < grow_at`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.min_size < 2 {
            return Err(Error::InvalidPolicy("min_size must be at least 2"));
        }
        if self.factor < 2 {
            return Err(Error::InvalidPolicy("factor must be at least 2"));
        }
        if !(self.grow_at > 0.0 && self.grow_at < 1.0) {
            return Err(Error::InvalidPolicy("grow_at must lie in (0, 1)"));
        }
        if !(self.shrink_at > 0.0 && self.shrink_at < self.grow_at) {
            return Err(Error::InvalidPolicy("shrink_at must lie in (0, grow_at)"));
        }
        if self.shrink_at * self.factor as f64 >= self.grow_at {
            return Err(Error::InvalidPolicy(
                "shrink_at * factor must stay below grow_at",
            ));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn should_grow(&self, used: usize, size: usize) -> bool {
        used as f64 / size as f64 >= self.grow_at
    }

    #[inline]
    pub(crate) fn should_shrink(&self, used: usize, size: usize) -> bool {
        used as f64 / size as f64 <= self.shrink_at
    }

    /// Adjusts a requested resize target so that `live` entries, with no
    /// tombstones, sit inside the load-factor bounds.
    ///
    /// Sizes below `floor` (itself never below the minimum) are clamped; at
    /// the floor the lower bound is not enforced.
    pub(crate) fn fit(&self, live: usize, target: usize, floor: usize) -> usize {
        let floor = floor.max(self.min_size);
        let mut size = target.max(floor);
        while size > floor && self.should_shrink(live, size) {
            size = (size / self.factor).max(floor);
        }
        while self.should_grow(live, size) {
            match size.checked_mul(self.factor) {
                Some(next) => size = next,
                None => break,
            }
        }
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let policy = ResizePolicy::default();
        assert_eq!(policy.min_size(), 17);
        assert_eq!(policy.grow_at(), 0.7);
        assert_eq!(policy.shrink_at(), 0.175);
        assert_eq!(policy.factor(), 2);
        assert_eq!(policy.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_policies() {
        let base = ResizePolicy::default();
        assert!(base.with_min_size(1).validate().is_err());
        assert!(base.with_factor(1).validate().is_err());
        assert!(base.with_grow_at(1.0).validate().is_err());
        assert!(base.with_grow_at(f64::NAN).validate().is_err());
        assert!(base.with_shrink_at(0.0).validate().is_err());
        assert!(base.with_shrink_at(0.7).validate().is_err());
        assert!(base.with_shrink_at(0.35).validate().is_err());
        assert!(base.with_factor(4).validate().is_err());
        assert!(base.with_factor(3).validate().is_ok());
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let policy = ResizePolicy::default();
        // 7 / 10 == 0.7
        assert!(policy.should_grow(7, 10));
        assert!(!policy.should_grow(6, 10));
        assert!(policy.should_shrink(7, 40));
        assert!(!policy.should_shrink(8, 40));
    }

    #[test]
    fn test_fit_clamps_to_minimum() {
        let policy = ResizePolicy::default();
        assert_eq!(policy.fit(0, 8, 17), 17);
        assert_eq!(policy.fit(0, 1 << 20, 17), 17);
        assert_eq!(policy.fit(11, 17, 17), 17);
    }

    #[test]
    fn test_fit_grows_until_below_threshold() {
        let policy = ResizePolicy::default();
        // 12 / 17 is past 0.7, 12 / 34 is not.
        assert_eq!(policy.fit(12, 17, 17), 34);
        assert_eq!(policy.fit(1000, 17, 17), 17 * 128);
    }

    #[test]
    fn test_fit_keeps_live_entries_above_shrink_threshold() {
        let policy = ResizePolicy::default();
        for live in 0..2000usize {
            let size = policy.fit(live, 17 * 256, 17);
            assert!(!policy.should_grow(live, size), "{live} in {size}");
            if size > policy.min_size() {
                assert!(!policy.should_shrink(live, size), "{live} in {size}");
            }
        }
    }

    #[test]
    fn test_fit_stops_at_floor() {
        let policy = ResizePolicy::default();
        // 0 live entries would collapse to 17 without a floor.
        assert_eq!(policy.fit(0, 17 * 8, 17 * 16), 17 * 16);
        assert_eq!(policy.fit(1, 17, 17 * 16), 17 * 16);
        // Above the floor the lower bound applies as usual.
        assert_eq!(policy.fit(10, 17 * 64, 17 * 2), 34);
        // A floor below the minimum is raised to it.
        assert_eq!(policy.fit(0, 0, 3), 17);
    }
}

/// A capacity-bounded allocation target.
///
/// Tracks how much of its capacity is committed and whether it is online.
/// An offline substation reports zero available capacity, so it is never
/// chosen for new allocations.
///
/// # Invariants
///
/// - `0 <= used_mw <= capacity_mw`
/// - `available_mw() == capacity_mw - used_mw` while online, `0` while offline
///
/// # Examples
///
/// ```
/// use grid_dr::grid::substation::Substation;
///
/// let mut sub = Substation::new("S01", 50.0);
/// assert!(sub.allocate(30.0));
/// assert!(!sub.allocate(25.0));
/// assert_eq!(sub.available_mw(), 20.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Substation {
    id: String,
    capacity_mw: f64,
    used_mw: f64,
    online: bool,
}

impl Substation {
    /// Creates an online substation with nothing allocated.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_mw` is negative or not finite. The scheduler
    /// validates capacity before calling this.
    pub fn new(id: impl Into<String>, capacity_mw: f64) -> Self {
        assert!(capacity_mw.is_finite() && capacity_mw >= 0.0);

        Self {
            id: id.into(),
            capacity_mw,
            used_mw: 0.0,
            online: true,
        }
    }

    /// Returns the substation id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the total capacity in MW.
    pub fn capacity_mw(&self) -> f64 {
        self.capacity_mw
    }

    /// Returns the committed power in MW.
    pub fn used_mw(&self) -> f64 {
        self.used_mw
    }

    /// Returns `true` when the substation can take new allocations.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Capacity still available for allocation; zero while offline.
    pub fn available_mw(&self) -> f64 {
        if self.online {
            self.capacity_mw - self.used_mw
        } else {
            0.0
        }
    }

    /// Fraction of capacity committed (`0.0` for a zero-capacity substation).
    pub fn utilization(&self) -> f64 {
        if self.capacity_mw > 0.0 {
            self.used_mw / self.capacity_mw
        } else {
            0.0
        }
    }

    /// Commits `mw` if it fits in the available capacity.
    ///
    /// Returns `false` and leaves the substation unchanged otherwise.
    pub fn allocate(&mut self, mw: f64) -> bool {
        if self.available_mw() >= mw {
            // Clamp absorbs float rounding in `capacity - used >= mw`.
            self.used_mw = (self.used_mw + mw).min(self.capacity_mw);
            true
        } else {
            false
        }
    }

    /// Releases `mw` of committed power, never going below zero.
    pub fn deallocate(&mut self, mw: f64) {
        self.used_mw = (self.used_mw - mw).max(0.0);
    }

    pub(crate) fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_substation_is_online_and_empty() {
        let sub = Substation::new("S01", 50.0);
        assert_eq!(sub.id(), "S01");
        assert!(sub.is_online());
        assert_eq!(sub.used_mw(), 0.0);
        assert_eq!(sub.available_mw(), 50.0);
    }

    #[test]
    #[should_panic]
    fn negative_capacity_panics() {
        Substation::new("S01", -1.0);
    }

    #[test]
    fn allocate_within_capacity() {
        let mut sub = Substation::new("S01", 50.0);
        assert!(sub.allocate(30.0));
        assert_eq!(sub.used_mw(), 30.0);
        assert_eq!(sub.available_mw(), 20.0);
    }

    #[test]
    fn allocate_exact_fit() {
        let mut sub = Substation::new("S01", 40.0);
        assert!(sub.allocate(40.0));
        assert_eq!(sub.available_mw(), 0.0);
    }

    #[test]
    fn allocate_over_capacity_changes_nothing() {
        let mut sub = Substation::new("S01", 50.0);
        assert!(sub.allocate(30.0));
        assert!(!sub.allocate(45.0));
        assert_eq!(sub.used_mw(), 30.0);
    }

    #[test]
    fn offline_has_no_available_capacity() {
        let mut sub = Substation::new("S01", 50.0);
        sub.set_online(false);
        assert_eq!(sub.available_mw(), 0.0);
        assert!(!sub.allocate(1.0));
        assert_eq!(sub.used_mw(), 0.0);
    }

    #[test]
    fn deallocate_floors_at_zero() {
        let mut sub = Substation::new("S01", 50.0);
        assert!(sub.allocate(10.0));
        sub.deallocate(4.0);
        assert_eq!(sub.used_mw(), 6.0);
        sub.deallocate(100.0);
        assert_eq!(sub.used_mw(), 0.0);
    }

    #[test]
    fn used_never_exceeds_capacity() {
        let mut sub = Substation::new("S01", 0.3);
        while sub.allocate(0.1) {}
        assert!(sub.used_mw() <= sub.capacity_mw());
        assert!(sub.available_mw() >= 0.0);
    }

    #[test]
    fn utilization_fraction() {
        let mut sub = Substation::new("S01", 40.0);
        assert!(sub.allocate(10.0));
        assert!((sub.utilization() - 0.25).abs() < 1e-12);
        assert_eq!(Substation::new("Z", 0.0).utilization(), 0.0);
    }
}

/// Hands out timestep indices strictly in order, each exactly once.
///
/// The engine advances only through [`Clock::tick`], so no timestep can be
/// skipped, repeated or reordered.
///
/// # Examples
///
/// ```
/// use solar_bess_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(3);
/// let mut steps = Vec::new();
///
/// clock.run(|step| steps.push(step));
/// assert_eq!(steps, vec![0, 1, 2]);
/// assert!(clock.is_finished());
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Next step to hand out.
    next: usize,
    /// Total steps in the horizon.
    total: usize,
}

impl Clock {
    /// Creates a clock over `total` steps.
    pub fn new(total: usize) -> Self {
        Self { next: 0, total }
    }

    /// Returns the next step index, or `None` once the horizon is exhausted.
    pub fn tick(&mut self) -> Option<usize> {
        if self.next < self.total {
            let step = self.next;
            self.next += 1;
            Some(step)
        } else {
            None
        }
    }

    /// Calls `f` with every remaining step index, in order.
    pub fn run(&mut self, mut f: impl FnMut(usize)) {
        while let Some(step) = self.tick() {
            f(step);
        }
    }

    /// Number of steps already handed out.
    pub fn elapsed(&self) -> usize {
        self.next
    }

    /// Number of steps not yet handed out.
    pub fn remaining(&self) -> usize {
        self.total - self.next
    }

    /// Total steps in the horizon.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns `true` once every step has been handed out.
    pub fn is_finished(&self) -> bool {
        self.next >= self.total
    }
}

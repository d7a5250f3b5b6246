//! Creation-time configuration for [`ContiguousRingBuffer`](crate::ContiguousRingBuffer).

/// What a put does when the request exceeds the unused space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Reject the put with `InsufficientSpace`.
    #[default]
    Fixed,
    /// Reallocate the backing storage, keeping unread bytes in order.
    Growable,
}

/// Settings fixed when a buffer is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Initial backing storage size in bytes.
    pub capacity: usize,
    /// What to do when a put does not fit.
    pub growth: GrowthPolicy,
    /// Upper bound for growth. `None` grows until allocation fails.
    pub max_capacity: Option<usize>,
}

impl BufferConfig {
    /// Creates a fixed-size config with no growth ceiling.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            growth: GrowthPolicy::Fixed,
            max_capacity: None,
        }
    }

    /// Shorthand for a config with [`GrowthPolicy::Growable`].
    pub fn growable(capacity: usize) -> Self {
        Self::new(capacity).with_growth(GrowthPolicy::Growable)
    }

    /// Sets the growth policy.
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Sets the upper bound for growth.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// Returns true if puts may reallocate the storage.
    pub fn is_growable(&self) -> bool {
        self.growth == GrowthPolicy::Growable
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CAPACITY)
    }
}

// buffer configuration.

/// Configuration for a [`Buffer`](crate::Buffer)
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct BufferConfig {
    /// Capacity of the inbound channel producers send into
    ///
    /// With a capacity of 0, each send waits until the inbound worker takes the value.
    pub inbound_capacity: usize,
    /// Capacity of the outbound channel consumers receive from
    ///
    /// With a capacity of 0, the outbound worker waits for a consumer on every value, while the
    /// internal queue keeps absorbing values from the inbound side.
    pub outbound_capacity: usize,
    /// Prefix for the names of the worker threads
    pub thread_name: String,
}

impl BufferConfig {
    /// Construct with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Ownership-chaining setter for both channel capacities
    pub fn with_capacity(self, capacity: usize) -> Self {
        self.with_inbound_capacity(capacity).with_outbound_capacity(capacity)
    }

    /// Ownership-chaining setter for [`inbound_capacity`](Self::inbound_capacity)
    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    /// Ownership-chaining setter for [`outbound_capacity`](Self::outbound_capacity)
    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Ownership-chaining setter for [`thread_name`](Self::thread_name)
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            inbound_capacity: 0,
            outbound_capacity: 0,
            thread_name: "cistern-buffer".to_owned(),
        }
    }
}

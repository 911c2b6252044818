/// Configuration for batch loading operations
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of parent keys bound into a single query; larger key
    /// sets are split into consecutive chunks
    pub max_batch_size: usize,
    /// Dispatch the per-relationship queries concurrently
    pub parallel_execution: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            parallel_execution: true,
        }
    }
}

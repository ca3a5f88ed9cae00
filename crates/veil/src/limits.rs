//! Dispatch limits

/// Default maximum number of nested hook dispatches
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 128;

/// Limits applied while dispatching operations on a class's handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of handle dispatches on the current thread
    ///
    /// Reached when a hook keeps re-entering handles (typically its own),
    /// at which point the operation fails with a RangeError.
    pub max_dispatch_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
        }
    }
}

impl Limits {
    /// Create limits with a specific dispatch depth
    pub fn with_max_dispatch_depth(max_dispatch_depth: usize) -> Self {
        Self { max_dispatch_depth }
    }

    /// No depth limit (a runaway hook overflows the native stack)
    pub fn unlimited() -> Self {
        Self::with_max_dispatch_depth(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Limits::default().max_dispatch_depth, DEFAULT_MAX_DISPATCH_DEPTH);
        assert_eq!(Limits::with_max_dispatch_depth(4).max_dispatch_depth, 4);
        assert_eq!(Limits::unlimited().max_dispatch_depth, usize::MAX);
    }
}

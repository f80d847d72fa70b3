use thiserror::Error;

// -----------------------------------------------------------------------------
// StackError

/// Misuse of a [`StackPool`](crate::StackPool) detected before any node is touched.
///
/// The panicking operations of the pool funnel these through
/// [`StackError::handle_error`]; the `try_*` operations hand them back instead.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StackError {
    #[error("Trying to get value from an invalid stack")]
    EmptyValue,

    #[error("Trying to pop from an empty stack")]
    EmptyPop,

    #[error("Storage length {len} does not fit in the handle type")]
    HandleOverflow { len: usize },
}

impl StackError {
    /// Reports the error and diverts control flow.
    #[cold]
    #[inline(never)]
    pub fn handle_error(&self) -> ! {
        log::error!("{self}");
        panic!("{self}");
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::StackError;
    use alloc::string::ToString;

    #[test]
    fn messages() {
        assert_eq!(
            StackError::EmptyValue.to_string(),
            "Trying to get value from an invalid stack"
        );
        assert_eq!(
            StackError::EmptyPop.to_string(),
            "Trying to pop from an empty stack"
        );
        assert_eq!(
            StackError::HandleOverflow { len: 256 }.to_string(),
            "Storage length 256 does not fit in the handle type"
        );
    }

    #[test]
    #[should_panic(expected = "Trying to pop from an empty stack")]
    fn handle_error_panics() {
        StackError::EmptyPop.handle_error();
    }
}

use core::fmt::{Debug, Display};
use core::hash::Hash;

// -----------------------------------------------------------------------------
// StackIndex

/// An unsigned integer used as a node handle inside a [`StackPool`].
///
/// The value `0` is reserved: it never addresses a node and stands for
/// "empty stack" as well as "end of iteration". Any other value `h` refers to
/// the node stored at slot `h - 1` of the pool.
///
/// Handles carry no ownership. Which chain a node belongs to is decided only
/// by the head handles the caller keeps around.
///
/// # Examples
///
/// ```
/// use sp_pool::StackIndex;
///
/// assert!(u32::END.is_end());
/// assert_eq!(3u16.to_slot(), 2);
/// assert_eq!(u8::from_len(255), Some(255));
/// assert_eq!(u8::from_len(256), None);
/// ```
///
/// [`StackPool`]: crate::StackPool
pub trait StackIndex: Copy + Eq + Ord + Hash + Debug + Display + 'static {
    /// The sentinel handle, equal to zero.
    const END: Self;

    /// Returns `true` if this is the sentinel.
    fn is_end(self) -> bool;

    /// Converts a non-sentinel handle to its 0-based storage slot.
    ///
    /// The result is meaningless for [`END`](Self::END).
    fn to_slot(self) -> usize;

    /// Converts a storage length into the handle of the last node.
    ///
    /// Returns `None` if `len` cannot be represented by this type.
    fn from_len(len: usize) -> Option<Self>;
}

macro_rules! impl_stack_index {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StackIndex for $ty {
                const END: Self = 0;

                #[inline(always)]
                fn is_end(self) -> bool {
                    self == 0
                }

                #[inline(always)]
                fn to_slot(self) -> usize {
                    debug_assert!(self != 0);
                    (self - 1) as usize
                }

                #[inline]
                fn from_len(len: usize) -> Option<Self> {
                    <$ty>::try_from(len).ok()
                }
            }
        )*
    };
}

impl_stack_index!(u8, u16, u32, u64, usize);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::StackIndex;

    #[test]
    fn sentinel_is_zero() {
        assert_eq!(u8::END, 0);
        assert_eq!(u64::END, 0);
        assert_eq!(usize::END, 0);
        assert!(!1usize.is_end());
    }

    #[test]
    fn slot_is_offset_by_one() {
        assert_eq!(1u32.to_slot(), 0);
        assert_eq!(10usize.to_slot(), 9);
        assert_eq!(u16::MAX.to_slot(), u16::MAX as usize - 1);
    }

    #[test]
    fn from_len_rejects_overflow() {
        assert_eq!(u16::from_len(65_535), Some(u16::MAX));
        assert_eq!(u16::from_len(65_536), None);
        assert_eq!(usize::from_len(usize::MAX), Some(usize::MAX));
    }
}

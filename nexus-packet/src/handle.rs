//! Sentinel-based packet handles.
//!
//! Every packet carries the handle of its successor inline. A reserved
//! sentinel (e.g. `u32::MAX`) marks the end of a chain, so the link field is
//! no wider than the handle itself and "null" costs nothing extra.

/// A copyable packet handle with a sentinel "null" value.
///
/// # Example
///
/// ```
/// use nexus_packet::Handle;
///
/// let packet: u32 = 5;
/// let end: u32 = u32::NONE;
///
/// assert!(packet.is_some());
/// assert!(end.is_none());
/// assert_eq!(end.into_option(), None);
/// ```
pub trait Handle: Copy + Eq {
    /// Sentinel value terminating a chain.
    const NONE: Self;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this refers to a packet.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Maps the sentinel to `None`.
    #[inline]
    fn into_option(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }

    /// Returns the handle as a slot position.
    fn as_usize(self) -> usize;

    /// Creates a handle from a slot position.
    fn from_usize(val: usize) -> Self;
}

macro_rules! impl_handle_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Handle for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }
            }
        )*
    };
}

impl_handle_for_unsigned!(u8, u16, u32, u64, usize);

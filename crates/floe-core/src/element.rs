//! The [`Element`] marker trait.

#![allow(unsafe_code)]

/// A fixed-size value that may be stored in a sliced buffer.
///
/// Slices are raw blocks handed out by a [`SliceAllocator`](crate::SliceAllocator)
/// and are only ever viewed as `[T]`. Byte-level operations (`zero()`)
/// write straight into that memory, so the element type has to tolerate
/// it.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - the all-zero byte pattern is a valid value of the type;
/// - the type contains no padding bytes;
/// - the type has no drop glue (enforced by the `Copy` bound).
pub unsafe trait Element: Copy + Send + Sync + 'static {}

macro_rules! impl_element {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive scalar, no padding, zero is a valid value.
            unsafe impl Element for $ty {}
        )*
    };
}

impl_element!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char,
);

// SAFETY: arrays have no inter-element padding and inherit the zero
// validity of their element type.
unsafe impl<T: Element, const N: usize> Element for [T; N] {}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_element<T: Element>() {}

    #[test]
    fn primitives_and_arrays_are_elements() {
        assert_element::<u8>();
        assert_element::<f64>();
        assert_element::<bool>();
        assert_element::<char>();
        assert_element::<[u32; 4]>();
        assert_element::<[[f32; 3]; 2]>();
    }
}

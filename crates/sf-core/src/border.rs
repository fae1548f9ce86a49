/// Policy for kernel windows that extend past the buffer edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Padding {
    /// No extension; only windows that fit inside the input are produced.
    None,
    /// Out-of-range samples read as `0.0`.
    #[default]
    Zero,
    /// Out-of-range coordinates clamp to the nearest edge row/column.
    Replicate,
}

impl Padding {
    /// Leading padding for a kernel of length `k` along one axis.
    ///
    /// Uses `(k - 1) / 2`, so even kernels get one less cell of padding on
    /// the trailing side than on the leading side.
    pub fn extent(self, k: usize) -> usize {
        match self {
            Padding::None => 0,
            Padding::Zero | Padding::Replicate => k.saturating_sub(1) / 2,
        }
    }
}

/// Maps a possibly out-of-range coordinate onto `[0, len)`.
///
/// Returns `None` when the sample should read as zero, which is every
/// out-of-range coordinate under `Zero` and `None` padding.
pub fn map_index(i: isize, len: usize, mode: Padding) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }

    match mode {
        Padding::None | Padding::Zero => None,
        Padding::Replicate => {
            if i < 0 {
                Some(0)
            } else {
                Some(len - 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Padding, map_index};

    #[test]
    fn replicate_mapping_handles_negative_and_overflow() {
        let mode = Padding::Replicate;

        assert_eq!(map_index(-3, 5, mode), Some(0));
        assert_eq!(map_index(-1, 5, mode), Some(0));
        assert_eq!(map_index(0, 5, mode), Some(0));
        assert_eq!(map_index(4, 5, mode), Some(4));
        assert_eq!(map_index(5, 5, mode), Some(4));
        assert_eq!(map_index(99, 5, mode), Some(4));
    }

    #[test]
    fn zero_and_none_reject_out_of_range() {
        for mode in [Padding::Zero, Padding::None] {
            assert_eq!(map_index(-1, 5, mode), None);
            assert_eq!(map_index(5, 5, mode), None);
            assert_eq!(map_index(2, 5, mode), Some(2));
        }
        assert_eq!(map_index(0, 0, Padding::Replicate), None);
    }

    #[test]
    fn extent_biases_even_kernels() {
        assert_eq!(Padding::None.extent(5), 0);
        assert_eq!(Padding::Zero.extent(1), 0);
        assert_eq!(Padding::Zero.extent(3), 1);
        assert_eq!(Padding::Replicate.extent(4), 1);
        assert_eq!(Padding::Replicate.extent(5), 2);
        assert_eq!(Padding::Zero.extent(0), 0);
    }
}

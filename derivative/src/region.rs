use std::fmt;

/// Axis-aligned box in integer index space.
///
/// `index` is the first sample of the box along every axis and `size` the
/// number of samples, so the box covers `index[a]..index[a] + size[a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region<const D: usize> {
    index: [isize; D],
    size: [usize; D],
}

impl<const D: usize> Region<D> {
    pub fn new(index: [isize; D], size: [usize; D]) -> Self {
        Region { index, size }
    }

    /// Region starting at the origin of index space.
    pub fn from_size(size: [usize; D]) -> Self {
        Region {
            index: [0; D],
            size,
        }
    }

    pub fn index(&self) -> [isize; D] {
        self.index
    }

    pub fn size(&self) -> [usize; D] {
        self.size
    }

    /// One past the last index along every axis.
    pub fn upper(&self) -> [isize; D] {
        let mut upper = self.index;
        for (u, &s) in upper.iter_mut().zip(self.size.iter()) {
            *u += s as isize;
        }
        upper
    }

    pub fn is_empty(&self) -> bool {
        self.size.iter().any(|&s| s == 0)
    }

    pub fn num_samples(&self) -> usize {
        self.size.iter().product()
    }

    pub fn contains_index(&self, index: [isize; D]) -> bool {
        let upper = self.upper();
        (0..D).all(|a| index[a] >= self.index[a] && index[a] < upper[a])
    }

    /// Grows the region by `radius` samples on both sides of `axis`; the
    /// other axes are left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= D`.
    pub fn padded_along(&self, axis: usize, radius: usize) -> Self {
        let mut padded = *self;
        padded.index[axis] -= radius as isize;
        padded.size[axis] += 2 * radius;
        padded
    }

    /// Inverse of [`Region::padded_along`]. Returns `None` when the region
    /// is not wider than `2 * radius` along `axis`.
    pub fn shrunk_along(&self, axis: usize, radius: usize) -> Option<Self> {
        let size = self.size.get(axis)?.checked_sub(2 * radius)?;
        if size == 0 {
            return None;
        }

        let mut shrunk = *self;
        shrunk.index[axis] += radius as isize;
        shrunk.size[axis] = size;
        Some(shrunk)
    }

    /// Intersection of two regions, `None` when they do not overlap.
    pub fn crop(&self, other: &Self) -> Option<Self> {
        let upper = self.upper();
        let other_upper = other.upper();
        let mut cropped = *self;

        for a in 0..D {
            let lo = self.index[a].max(other.index[a]);
            let hi = upper[a].min(other_upper[a]);
            if hi <= lo {
                return None;
            }
            cropped.index[a] = lo;
            cropped.size[a] = (hi - lo) as usize;
        }

        Some(cropped)
    }

    /// True when `other` is non-empty and lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        !other.is_empty() && self.crop(other).as_ref() == Some(other)
    }

    /// Offset of `other`'s origin relative to this region's origin.
    pub(crate) fn offset_of(&self, other: &Self) -> [usize; D] {
        let mut offset = [0; D];
        for a in 0..D {
            offset[a] = (other.index[a] - self.index[a]) as usize;
        }
        offset
    }
}

impl<const D: usize> fmt::Display for Region<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} + {:?}", self.index, self.size)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_padding_touches_one_axis() {
        let region = Region::new([2, 3, 4], [5, 6, 7]);
        let padded = region.padded_along(1, 2);

        assert_eq!(padded.index(), [2, 1, 4]);
        assert_eq!(padded.size(), [5, 10, 7]);
        assert_eq!(padded.shrunk_along(1, 2), Some(region));
    }

    #[test]
    fn test_shrinking_too_far() {
        let region = Region::from_size([4, 9]);

        assert_eq!(region.shrunk_along(0, 2), None);
        assert_eq!(region.shrunk_along(0, 3), None);
        assert_eq!(region.shrunk_along(2, 1), None);
        assert_eq!(
            region.shrunk_along(1, 4),
            Some(Region::new([0, 4], [4, 1]))
        );
    }

    #[test]
    fn test_crop() {
        let a = Region::new([-2, 0], [6, 4]);
        let b = Region::from_size([3, 10]);

        assert_eq!(a.crop(&b), Some(Region::new([0, 0], [3, 4])));
        assert_eq!(a.crop(&Region::new([4, 0], [2, 2])), None);
        assert!(!b.contains(&a));
        assert!(b.contains(&Region::new([1, 2], [2, 8])));
        assert!(!b.contains(&Region::new([1, 2], [0, 8])));
    }

    #[test]
    fn test_bounds() {
        let region = Region::new([-1, 2], [3, 2]);

        assert_eq!(region.upper(), [2, 4]);
        assert_eq!(region.num_samples(), 6);
        assert!(region.contains_index([-1, 3]));
        assert!(!region.contains_index([2, 3]));
        assert_eq!(region.to_string(), "[-1, 2] + [3, 2]");
    }
}

use crate::error::Result;
use crate::field::{Field, Pixel};
use crate::region::Region;

/// Upstream end of a pipeline stage.
pub trait ImageSource<T: Pixel, const D: usize> {
    /// Every index the source can ever produce.
    fn largest_possible_region(&self) -> Region<D>;

    /// Announces the region a downstream stage will ask for next.
    ///
    /// Sources that negotiate with their own upstream do it here, so a
    /// region they cannot serve is reported before any data is pulled.
    fn set_requested_region(&mut self, region: Region<D>) -> Result<()>;

    /// Produces the samples of `region`, or fails when they do not exist.
    fn data(&mut self, region: &Region<D>) -> Result<Field<T, D>>;
}

impl<T: Pixel, const D: usize, S: ImageSource<T, D> + ?Sized> ImageSource<T, D> for &mut S {
    fn largest_possible_region(&self) -> Region<D> {
        (**self).largest_possible_region()
    }

    fn set_requested_region(&mut self, region: Region<D>) -> Result<()> {
        (**self).set_requested_region(region)
    }

    fn data(&mut self, region: &Region<D>) -> Result<Field<T, D>> {
        (**self).data(region)
    }
}

/// Source backed by a field held in memory.
#[derive(Debug, Clone)]
pub struct FieldSource<T, const D: usize> {
    field: Field<T, D>,
    requested_region: Option<Region<D>>,
}

impl<T: Pixel, const D: usize> FieldSource<T, D> {
    pub fn new(field: Field<T, D>) -> Self {
        FieldSource {
            field,
            requested_region: None,
        }
    }

    pub fn field(&self) -> &Field<T, D> {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Field<T, D> {
        &mut self.field
    }

    /// Last region announced by a downstream stage.
    pub fn requested_region(&self) -> Option<&Region<D>> {
        self.requested_region.as_ref()
    }

    pub fn into_field(self) -> Field<T, D> {
        self.field
    }
}

impl<T: Pixel, const D: usize> From<Field<T, D>> for FieldSource<T, D> {
    fn from(field: Field<T, D>) -> Self {
        FieldSource::new(field)
    }
}

impl<T: Pixel, const D: usize> ImageSource<T, D> for FieldSource<T, D> {
    fn largest_possible_region(&self) -> Region<D> {
        *self.field.buffered_region()
    }

    fn set_requested_region(&mut self, region: Region<D>) -> Result<()> {
        self.requested_region = Some(region);
        Ok(())
    }

    fn data(&mut self, region: &Region<D>) -> Result<Field<T, D>> {
        self.field.crop(region)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DerivativeError;

    #[test]
    fn test_field_source() {
        let field = Field::from_samples(vec![1.0f64, 2.0, 3.0, 4.0], 0.25).unwrap();
        let mut source = FieldSource::from(field);

        assert_eq!(source.largest_possible_region(), Region::from_size([4]));
        assert_eq!(source.requested_region(), None);

        source.set_requested_region(Region::new([1], [2])).unwrap();
        assert_eq!(source.requested_region(), Some(&Region::new([1], [2])));

        let data = source.data(&Region::new([1], [2])).unwrap();
        assert_eq!(data.data().iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0]);
        assert_eq!(data.spacing(), [0.25]);

        assert!(matches!(
            source.data(&Region::new([3], [2])),
            Err(DerivativeError::RegionUnavailable { .. })
        ));
    }

    #[test]
    fn test_borrowed_source() {
        fn announce<S: ImageSource<f32, 1>>(mut source: S) -> Region<1> {
            source.set_requested_region(Region::new([0], [1])).unwrap();
            source.largest_possible_region()
        }

        let field = Field::from_samples(vec![1.0f32, 2.0], 1.0).unwrap();
        let mut source = FieldSource::new(field);

        assert_eq!(announce(&mut source), Region::from_size([2]));
        assert_eq!(source.requested_region(), Some(&Region::new([0], [1])));
    }
}

use std::fmt::Debug;

use ndarray::{ArrayD, ArrayViewD, IxDyn, Slice};
use num::{Float, Signed};

use crate::error::{DerivativeError, Result};
use crate::region::Region;

/// Sample type a derivative can be written to.
///
/// Derivatives change sign, so only signed floating point samples qualify.
pub trait Pixel: Float + Signed + Send + Sync + Debug + 'static {}

impl<T> Pixel for T where T: Float + Signed + Send + Sync + Debug + 'static {}

/// N-dimensional sampled scalar field.
///
/// The samples cover `region`, ndarray axis `a` being index axis `a`, and
/// `spacing[a]` is the physical distance between two neighbors along `a`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T, const D: usize> {
    region: Region<D>,
    spacing: [f64; D],
    data: ArrayD<T>,
}

impl<T: Pixel, const D: usize> Field<T, D> {
    pub fn new(region: Region<D>, spacing: [f64; D], data: ArrayD<T>) -> Result<Self> {
        check_spacing(&spacing)?;

        if data.shape() != &region.size()[..] {
            return Err(DerivativeError::ShapeMismatch {
                expected: region.size().to_vec(),
                actual: data.shape().to_vec(),
            });
        }

        Ok(Field {
            region,
            spacing,
            data,
        })
    }

    /// Builds the field by evaluating `f` at every index of `region`.
    pub fn from_shape_fn<F>(region: Region<D>, spacing: [f64; D], mut f: F) -> Result<Self>
    where
        F: FnMut([isize; D]) -> T,
    {
        let origin = region.index();
        let data = ArrayD::from_shape_fn(IxDyn(&region.size()), |local: IxDyn| {
            let mut index = origin;
            for (a, i) in index.iter_mut().enumerate() {
                *i += local[a] as isize;
            }
            f(index)
        });

        Field::new(region, spacing, data)
    }

    pub fn zeros(region: Region<D>, spacing: [f64; D]) -> Result<Self> {
        Field::new(region, spacing, ArrayD::zeros(IxDyn(&region.size())))
    }

    pub fn buffered_region(&self) -> &Region<D> {
        &self.region
    }

    pub fn spacing(&self) -> [f64; D] {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: [f64; D]) -> Result<()> {
        check_spacing(&spacing)?;
        self.spacing = spacing;
        Ok(())
    }

    /// Sample at an absolute index, `None` outside the buffered region.
    pub fn get(&self, index: [isize; D]) -> Option<&T> {
        if !self.region.contains_index(index) {
            return None;
        }

        let origin = self.region.index();
        let local: Vec<usize> = (0..D).map(|a| (index[a] - origin[a]) as usize).collect();
        self.data.get(&local[..])
    }

    pub fn data(&self) -> ArrayViewD<'_, T> {
        self.data.view()
    }

    pub fn data_mut(&mut self) -> &mut ArrayD<T> {
        &mut self.data
    }

    pub fn into_data(self) -> ArrayD<T> {
        self.data
    }

    /// View of the samples inside `region`, which must be buffered.
    pub(crate) fn window(&self, region: &Region<D>) -> Result<ArrayViewD<'_, T>> {
        if !self.region.contains(region) {
            return Err(DerivativeError::RegionUnavailable {
                requested: region.to_string(),
                available: self.region.to_string(),
            });
        }

        let offset = self.region.offset_of(region);
        let size = region.size();
        Ok(self.data.slice_each_axis(|desc| {
            let a = desc.axis.index();
            let start = offset[a] as isize;
            Slice::from(start..start + size[a] as isize)
        }))
    }

    /// Copies the samples inside `region` into a new field with the same
    /// spacing.
    pub fn crop(&self, region: &Region<D>) -> Result<Self> {
        let data = self.window(region)?.to_owned();

        Ok(Field {
            region: *region,
            spacing: self.spacing,
            data,
        })
    }

    /// Multiplies every sample by `factor`.
    pub fn scale(&mut self, factor: T) {
        #[cfg(not(feature = "parallel"))]
        self.data.mapv_inplace(|v| v * factor);

        #[cfg(feature = "parallel")]
        self.data.par_mapv_inplace(|v| v * factor);
    }
}

impl<T: Pixel> Field<T, 1> {
    /// One-dimensional field over `0..samples.len()`.
    pub fn from_samples(samples: Vec<T>, spacing: f64) -> Result<Self> {
        let region = Region::from_size([samples.len()]);
        let data = ArrayD::from_shape_vec(IxDyn(&[samples.len()]), samples).map_err(|_| {
            DerivativeError::ShapeMismatch {
                expected: region.size().to_vec(),
                actual: vec![],
            }
        })?;

        Field::new(region, [spacing], data)
    }
}

fn check_spacing(spacing: &[f64]) -> Result<()> {
    match spacing
        .iter()
        .enumerate()
        .find(|&(_, &s)| !(s.is_finite() && s > 0.0))
    {
        Some((axis, &spacing)) => Err(DerivativeError::InvalidSpacing { axis, spacing }),
        None => Ok(()),
    }
}

use ndarray::{ArrayD, Axis, IxDyn, Slice, Zip};
use num::NumCast;

use crate::error::{DerivativeError, Result};
use crate::field::{Field, Pixel};
use crate::region::Region;
use crate::stencil::Stencil;

/// Applies a one-dimensional stencil along one axis of a field.
pub trait ConvolutionEngine<T: Pixel, const D: usize> {
    /// Produces a field covering exactly `output_region` where every sample
    /// is the dot product of the stencil with the input samples centered on
    /// it along `axis`.
    ///
    /// The input must already buffer `stencil.radius()` extra samples on
    /// both sides of `output_region` along `axis`.
    fn convolve(
        &self,
        input: &Field<T, D>,
        stencil: &Stencil,
        axis: usize,
        output_region: &Region<D>,
    ) -> Result<Field<T, D>>;
}

/// Shift-and-accumulate convolution over ndarray windows.
///
/// For each non-zero tap the input window is shifted along the axis and
/// added into the output with the tap's weight. With the `parallel` feature
/// the accumulation is split across rayon workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighborhoodConvolution;

impl<T: Pixel, const D: usize> ConvolutionEngine<T, D> for NeighborhoodConvolution {
    fn convolve(
        &self,
        input: &Field<T, D>,
        stencil: &Stencil,
        axis: usize,
        output_region: &Region<D>,
    ) -> Result<Field<T, D>> {
        if axis >= D {
            return Err(DerivativeError::AxisOutOfRange { axis, dimension: D });
        }

        let radius = stencil.radius();
        let required = output_region.padded_along(axis, radius);
        if !input.buffered_region().contains(&required) {
            return Err(DerivativeError::InsufficientHalo {
                axis,
                radius,
                input: input.buffered_region().to_string(),
                output: output_region.to_string(),
            });
        }

        let window = input.window(&required)?;
        let len = output_region.size()[axis] as isize;
        let mut output = ArrayD::<T>::zeros(IxDyn(&output_region.size()));

        for (tap, &weight) in stencil.coefficients().iter().enumerate() {
            if weight == 0.0 {
                continue;
            }

            let weight = <T as NumCast>::from(weight)
                .ok_or(DerivativeError::PixelCast { value: weight })?;
            let tap = tap as isize;
            let shifted = window.slice_axis(Axis(axis), Slice::from(tap..tap + len));
            log::trace!("accumulating tap {} along axis {}", tap - radius as isize, axis);

            #[cfg(not(feature = "parallel"))]
            Zip::from(&mut output)
                .and(&shifted)
                .for_each(|o, &v| *o = *o + weight * v);

            #[cfg(feature = "parallel")]
            Zip::from(&mut output)
                .and(&shifted)
                .par_for_each(|o, &v| *o = *o + weight * v);
        }

        Field::new(*output_region, input.spacing(), output)
    }
}

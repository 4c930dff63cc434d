use nalgebra::{DMatrix, DVector};

use crate::error::{DerivativeError, Result};

/// Weights below this fraction of the largest weight are rounding noise.
const FLUSH_TO_ZERO: f64 = 1e-12;

/// Widest stencil whose weights still resolve in double precision.
pub const MAX_RADIUS: usize = 10;

/// One-dimensional finite difference stencil oriented along `axis`.
///
/// `coefficients[i]` weighs the sample at offset `i - radius`, and a derivative
/// estimate is the dot product of the weights with the `2 * radius + 1`
/// samples centered on the output location.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    order: u32,
    order_of_accuracy: u32,
    axis: usize,
    radius: usize,
    coefficients: Vec<f64>,
}

impl Stencil {
    /// Wraps externally computed weights, which must have odd length.
    pub fn new(
        order: u32,
        order_of_accuracy: u32,
        axis: usize,
        coefficients: Vec<f64>,
    ) -> Result<Self> {
        if coefficients.len() % 2 == 0 {
            return Err(DerivativeError::StencilConstruction {
                order,
                order_of_accuracy,
                reason: format!("stencil must be centered, got {} weights", coefficients.len()),
            });
        }

        Ok(Stencil {
            order,
            order_of_accuracy,
            axis,
            radius: coefficients.len() / 2,
            coefficients,
        })
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn order_of_accuracy(&self) -> u32 {
        self.order_of_accuracy
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn coefficient(&self, offset: isize) -> Option<f64> {
        let i = offset + self.radius as isize;
        usize::try_from(i)
            .ok()
            .and_then(|i| self.coefficients.get(i).copied())
    }

    /// `(offset, weight)` pairs from `-radius` to `+radius`.
    pub fn taps(&self) -> impl Iterator<Item = (isize, f64)> + '_ {
        let radius = self.radius as isize;
        self.coefficients
            .iter()
            .enumerate()
            .map(move |(i, &w)| (i as isize - radius, w))
    }
}

/// Source of derivative stencils.
pub trait StencilFactory {
    /// Half width of the stencil `build_stencil` would return, without
    /// computing any weight.
    fn radius(&self, order: u32, order_of_accuracy: u32) -> Result<usize>;

    fn build_stencil(&self, order: u32, order_of_accuracy: u32, axis: usize) -> Result<Stencil>;
}

impl<F: StencilFactory + ?Sized> StencilFactory for &F {
    fn radius(&self, order: u32, order_of_accuracy: u32) -> Result<usize> {
        (**self).radius(order, order_of_accuracy)
    }

    fn build_stencil(&self, order: u32, order_of_accuracy: u32, axis: usize) -> Result<Stencil> {
        (**self).build_stencil(order, order_of_accuracy, axis)
    }
}

/// Centered stencils whose truncation error is `O(h^(2 * order_of_accuracy))`
/// for first and second derivatives.
///
/// The radius is `(order + 1) / 2 + order_of_accuracy - 1`, the smallest
/// symmetric support on which the requested accuracy is reachable. The weights
/// solve the moment equations
///
/// ```text
/// sum_j w_j * j^m = order! * delta(m, order),   m = 0..=2 * radius
/// ```
///
/// so that the stencil differentiates every polynomial of degree up to
/// `2 * radius` exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct HigherOrderAccurate;

impl StencilFactory for HigherOrderAccurate {
    fn radius(&self, order: u32, order_of_accuracy: u32) -> Result<usize> {
        if order_of_accuracy < 1 {
            return Err(DerivativeError::InvalidAccuracy { order_of_accuracy });
        }

        let half_order = order as usize / 2 + order as usize % 2;
        half_order
            .checked_add(order_of_accuracy as usize - 1)
            .filter(|r| r.checked_mul(2).and_then(|w| w.checked_add(1)).is_some())
            .ok_or_else(|| DerivativeError::StencilConstruction {
                order,
                order_of_accuracy,
                reason: "stencil width overflows".to_string(),
            })
    }

    fn build_stencil(&self, order: u32, order_of_accuracy: u32, axis: usize) -> Result<Stencil> {
        let radius = self.radius(order, order_of_accuracy)?;
        let failure = |reason: String| DerivativeError::StencilConstruction {
            order,
            order_of_accuracy,
            reason,
        };

        if radius > MAX_RADIUS {
            return Err(failure(format!(
                "radius {} exceeds the supported maximum of {}",
                radius, MAX_RADIUS
            )));
        }

        // Offsets are scaled into [-1, 1] to keep the moment matrix well
        // conditioned; the weights are scaled back by radius^-order below.
        let width = 2 * radius + 1;
        let scale = radius.max(1) as f64;
        let node = |j: usize| (j as f64 - radius as f64) / scale;
        let moments = DMatrix::from_fn(width, width, |m, j| node(j).powi(m as i32));

        let factorial: f64 = (1..=order).map(f64::from).product();
        let target = DVector::from_fn(width, |m, _| {
            if m == order as usize {
                factorial
            } else {
                0.0
            }
        });

        let weights = moments
            .lu()
            .solve(&target)
            .ok_or_else(|| failure("moment system is singular".to_string()))?
            / scale.powi(order as i32);

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(failure("weights are not finite".to_string()));
        }

        let largest = weights.amax();
        let coefficients = weights
            .iter()
            .map(|&w| if w.abs() < FLUSH_TO_ZERO * largest { 0.0 } else { w })
            .collect();

        log::trace!(
            "built stencil: order = {}, accuracy = {}, radius = {}",
            order,
            order_of_accuracy,
            radius
        );

        Ok(Stencil {
            order,
            order_of_accuracy,
            axis,
            radius,
            coefficients,
        })
    }
}

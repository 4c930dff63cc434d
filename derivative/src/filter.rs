use std::fmt;

use num::NumCast;

use crate::config::DerivativeParameters;
use crate::convolution::{ConvolutionEngine, NeighborhoodConvolution};
use crate::error::{DerivativeError, Result};
use crate::field::{Field, Pixel};
use crate::pipeline::PipelineStage;
use crate::region::Region;
use crate::source::ImageSource;
use crate::stencil::{HigherOrderAccurate, StencilFactory};

/// Regions agreed on during input negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Negotiation<const D: usize> {
    input: Region<D>,
    output: Region<D>,
}

/// Higher order accurate directional derivative of a field.
///
/// The derivative of order `order` along `axis` is computed by convolving the
/// upstream field with a centered stencil accurate to
/// `O(h^(2 * order_of_accuracy))`. Before convolving, the requested output
/// region is grown by the stencil radius along `axis`, and the whole grown
/// region has to exist upstream: output samples are never computed from
/// clamped or extrapolated neighbors.
///
/// With `use_spacing` on, the result is divided by `spacing[axis]^order` so
/// the derivative is expressed per unit of physical distance.
///
/// ```
/// use accurate_derivative::{DerivativeFilter, Field, FieldSource, Region};
///
/// let parabola: Vec<f64> = (0..9).map(|i| (i * i) as f64).collect();
/// let source = FieldSource::new(Field::from_samples(parabola, 1.0).unwrap());
///
/// let mut filter = DerivativeFilter::new(source);
/// filter.set_order(2);
/// filter.set_order_of_accuracy(1);
/// filter.set_requested_region(Region::new([1], [7]));
///
/// let output = filter.update().unwrap();
/// assert!(output.data().iter().all(|&v| (v - 2.0).abs() < 1e-12));
/// ```
#[derive(Debug)]
pub struct DerivativeFilter<
    T,
    const D: usize,
    S,
    F = HigherOrderAccurate,
    E = NeighborhoodConvolution,
> {
    source: S,
    factory: F,
    engine: E,
    parameters: DerivativeParameters,
    requested_region: Option<Region<D>>,
    negotiated: Option<Negotiation<D>>,
    output: Option<Field<T, D>>,
}

impl<T: Pixel, const D: usize, S: ImageSource<T, D>> DerivativeFilter<T, D, S> {
    pub fn new(source: S) -> Self {
        DerivativeFilter::with_collaborators(source, HigherOrderAccurate, NeighborhoodConvolution)
    }
}

impl<T, const D: usize, S, F, E> DerivativeFilter<T, D, S, F, E>
where
    T: Pixel,
    S: ImageSource<T, D>,
    F: StencilFactory,
    E: ConvolutionEngine<T, D>,
{
    pub fn with_collaborators(source: S, factory: F, engine: E) -> Self {
        DerivativeFilter {
            source,
            factory,
            engine,
            parameters: DerivativeParameters::default(),
            requested_region: None,
            negotiated: None,
            output: None,
        }
    }

    pub fn order(&self) -> u32 {
        self.parameters.order
    }

    pub fn set_order(&mut self, order: u32) {
        self.parameters.order = order;
        self.modified();
    }

    pub fn order_of_accuracy(&self) -> u32 {
        self.parameters.order_of_accuracy
    }

    /// Values below 1 are accepted here and rejected when the filter runs.
    pub fn set_order_of_accuracy(&mut self, order_of_accuracy: u32) {
        self.parameters.order_of_accuracy = order_of_accuracy;
        self.modified();
    }

    pub fn axis(&self) -> usize {
        self.parameters.axis
    }

    /// Axes outside `0..D` are accepted here and rejected when the filter
    /// runs.
    pub fn set_axis(&mut self, axis: usize) {
        self.parameters.axis = axis;
        self.modified();
    }

    pub fn use_spacing(&self) -> bool {
        self.parameters.use_spacing
    }

    pub fn set_use_spacing(&mut self, use_spacing: bool) {
        self.parameters.use_spacing = use_spacing;
        self.modified();
    }

    /// Derivatives in physical space. This is the default.
    pub fn enable_spacing(&mut self) {
        self.set_use_spacing(true);
    }

    /// Derivatives in index space, one sample being one unit.
    pub fn disable_spacing(&mut self) {
        self.set_use_spacing(false);
    }

    pub fn parameters(&self) -> &DerivativeParameters {
        &self.parameters
    }

    pub fn set_parameters(&mut self, parameters: DerivativeParameters) {
        self.parameters = parameters;
        self.modified();
    }

    /// Output region of the next execution; the largest possible region
    /// unless a downstream consumer asked for something else.
    pub fn requested_region(&self) -> Region<D> {
        self.requested_region
            .unwrap_or_else(|| self.source.largest_possible_region())
    }

    pub fn set_requested_region(&mut self, region: Region<D>) {
        self.requested_region = Some(region);
        self.modified();
    }

    /// Largest output region the current parameters can produce from the
    /// upstream data, i.e. the largest possible region minus the stencil
    /// halo along the axis.
    pub fn valid_output_region(&self) -> Result<Region<D>> {
        let axis = self.checked_axis()?;
        let radius = self.radius()?;
        let largest = self.source.largest_possible_region();

        largest
            .shrunk_along(axis, radius)
            .ok_or_else(|| DerivativeError::RegionUnavailable {
                requested: largest.padded_along(axis, radius).to_string(),
                available: largest.to_string(),
            })
    }

    /// Result of the last successful execution.
    pub fn output(&self) -> Option<&Field<T, D>> {
        self.output.as_ref()
    }

    pub fn take_output(&mut self) -> Option<Field<T, D>> {
        self.output.take()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.modified();
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Runs both pipeline phases and returns the fresh output.
    pub fn update(&mut self) -> Result<&Field<T, D>> {
        self.generate_input_requested_region()?;
        let output = self.compute()?;
        Ok(self.output.insert(output))
    }

    fn modified(&mut self) {
        self.negotiated = None;
    }

    fn checked_axis(&self) -> Result<usize> {
        match self.parameters.axis {
            axis if axis < D => Ok(axis),
            axis => Err(DerivativeError::AxisOutOfRange { axis, dimension: D }),
        }
    }

    fn radius(&self) -> Result<usize> {
        self.factory
            .radius(self.parameters.order, self.parameters.order_of_accuracy)
    }

    /// Consumes the pending negotiation and convolves the negotiated input.
    fn compute(&mut self) -> Result<Field<T, D>> {
        let Negotiation {
            input: input_region,
            output: output_region,
        } = self
            .negotiated
            .take()
            .ok_or(DerivativeError::RegionNotNegotiated)?;
        let DerivativeParameters {
            order,
            order_of_accuracy,
            axis,
            use_spacing,
        } = self.parameters;

        let input = self.source.data(&input_region)?;
        let stencil = self.factory.build_stencil(order, order_of_accuracy, axis)?;
        let mut output = self.engine.convolve(&input, &stencil, axis, &output_region)?;

        if use_spacing {
            let factor = input.spacing()[axis].powi(order as i32).recip();
            log::debug!("scaling derivative by {:e}", factor);
            output.scale(
                <T as NumCast>::from(factor).ok_or(DerivativeError::PixelCast { value: factor })?,
            );
        }

        Ok(output)
    }
}

impl<T, const D: usize, S, F, E> PipelineStage for DerivativeFilter<T, D, S, F, E>
where
    T: Pixel,
    S: ImageSource<T, D>,
    F: StencilFactory,
    E: ConvolutionEngine<T, D>,
{
    fn generate_input_requested_region(&mut self) -> Result<()> {
        self.negotiated = None;
        self.output = None;

        let axis = self.checked_axis()?;
        let radius = self.radius()?;
        let largest = self.source.largest_possible_region();
        let output = self.requested_region.unwrap_or(largest);
        let input = output.padded_along(axis, radius);

        if largest.crop(&input) != Some(input) {
            log::warn!(
                "input region {} for output region {} exceeds available data {}",
                input,
                output,
                largest
            );
            return Err(DerivativeError::RegionUnavailable {
                requested: input.to_string(),
                available: largest.to_string(),
            });
        }

        log::debug!(
            "requesting input region {} (radius {} along axis {})",
            input,
            radius,
            axis
        );

        self.source.set_requested_region(input)?;
        self.negotiated = Some(Negotiation { input, output });
        Ok(())
    }

    fn generate_data(&mut self) -> Result<()> {
        self.output = None;
        self.output = Some(self.compute()?);
        Ok(())
    }
}

/// Lets filters feed each other: pulling a region runs this filter for it.
impl<T, const D: usize, S, F, E> ImageSource<T, D> for DerivativeFilter<T, D, S, F, E>
where
    T: Pixel,
    S: ImageSource<T, D>,
    F: StencilFactory,
    E: ConvolutionEngine<T, D>,
{
    fn largest_possible_region(&self) -> Region<D> {
        self.source.largest_possible_region()
    }

    /// Negotiates with the upstream chain right away, so an unreachable
    /// halo anywhere upstream fails the downstream negotiation.
    fn set_requested_region(&mut self, region: Region<D>) -> Result<()> {
        self.requested_region = Some(region);
        self.generate_input_requested_region()
    }

    fn data(&mut self, region: &Region<D>) -> Result<Field<T, D>> {
        self.requested_region = Some(*region);
        self.update().map(Field::clone)
    }
}

impl<T, const D: usize, S, F, E> fmt::Display for DerivativeFilter<T, D, S, F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DerivativeFilter ({}-dimensional)", D)?;
        writeln!(f, "{}", self.parameters)?;
        match &self.requested_region {
            Some(region) => write!(f, "RequestedRegion: {}", region),
            None => write!(f, "RequestedRegion: largest possible"),
        }
    }
}

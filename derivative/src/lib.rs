//! Directional derivatives of sampled N-dimensional fields with selectable
//! order of accuracy.
//!
//! A [`DerivativeFilter`] pulls a field from an [`ImageSource`], convolves it
//! along one axis with a stencil from a [`StencilFactory`], and rescales the
//! result by the grid spacing. Execution follows the two phases of
//! [`PipelineStage`]: the input region is negotiated first (grown by the
//! stencil radius along the axis), then the data is computed.

pub mod config;
pub mod convert;
pub mod convolution;
pub mod error;
pub mod field;
pub mod filter;
pub mod pipeline;
pub mod region;
pub mod source;
pub mod stencil;

#[cfg(test)]
mod test_util;

pub use config::{read_parameter_table, DerivativeParameters};
pub use convolution::{ConvolutionEngine, NeighborhoodConvolution};
pub use error::{DerivativeError, Result};
pub use field::{Field, Pixel};
pub use filter::DerivativeFilter;
pub use pipeline::{update, PipelineStage};
pub use region::Region;
pub use source::{FieldSource, ImageSource};
pub use stencil::{HigherOrderAccurate, Stencil, StencilFactory};

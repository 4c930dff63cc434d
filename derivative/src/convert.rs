use image::{GrayImage, ImageBuffer, Luma, Pixel as _};
use ndarray::{Array, IxDyn};
use num::NumCast;

use crate::error::Result;
use crate::field::{Field, Pixel};
use crate::region::Region;

pub type MatrixAsImage = ImageBuffer<Luma<f32>, Vec<<Luma<f32> as image::Pixel>::Subpixel>>;

/// Grayscale image as a unit-spaced field with samples in `[0, 1]`.
///
/// Axis 0 runs along rows (y), axis 1 along columns (x).
pub fn field_from_gray(image: &GrayImage) -> Result<Field<f32, 2>> {
    let embedded: MatrixAsImage = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[0] as f32 / 255.0])
    });
    field_from_luma_f32(&embedded)
}

pub fn field_from_luma_f32(image: &MatrixAsImage) -> Result<Field<f32, 2>> {
    let (width, height) = image.dimensions();
    let size = [height as usize, width as usize];
    let data = Array::from_shape_fn(IxDyn(&size), |index: IxDyn| {
        image.get_pixel(index[1] as u32, index[0] as u32).channels()[0]
    });

    Field::new(Region::from_size(size), [1.0, 1.0], data)
}

/// Maps the sample range of a field onto `0..=255` for display.
///
/// Constant fields come out black.
pub fn field_to_gray<T: Pixel>(field: &Field<T, 2>) -> GrayImage {
    let data = field.data();
    let [height, width] = field.buffered_region().size();

    let to_f64 = |v: T| <f64 as NumCast>::from(v).unwrap_or(0.0);
    let (lo, hi) = data.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &v| {
        let v = to_f64(v);
        (lo.min(v), hi.max(v))
    });
    let range = hi - lo;

    ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        if range <= 0.0 {
            return Luma([0]);
        }
        let v = to_f64(data[&[y as usize, x as usize][..]]);
        Luma([((v - lo) / range * 255.0).round() as u8])
    })
}

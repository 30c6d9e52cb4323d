use flowviz_image::{Image, ImageError};

use crate::parallel;

/// Normalize an image to a target range using its global min and max.
///
/// Applies the transformation `(pixel - min) / (max - min) * (max_val - min_val) + min_val`.
/// A constant image maps to `min_val` everywhere.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output normalized image.
/// * `min_val` - The lower bound of the target range.
/// * `max_val` - The upper bound of the target range.
///
/// # Example
///
/// ```
/// use flowviz_image::{Image, ImageSize};
/// use flowviz_imgproc::normalize::normalize_min_max;
///
/// let image = Image::<f32, 1>::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     vec![1.0, 3.0],
/// )
/// .unwrap();
///
/// let mut normalized = Image::<f32, 1>::from_size_val(image.size(), 0.0).unwrap();
///
/// normalize_min_max(&image, &mut normalized, 0.0, 255.0).unwrap();
///
/// assert_eq!(normalized.as_slice(), &[0.0, 255.0]);
/// ```
pub fn normalize_min_max<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    min_val: f32,
    max_val: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (lo, hi) = src
        .as_slice()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = hi - lo;
    if !(range > f32::EPSILON) {
        dst.as_slice_mut().fill(min_val);
        return Ok(());
    }

    let scale = (max_val - min_val) / range;

    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = (src_val - lo) * scale + min_val;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowviz_image::ImageSize;

    #[test]
    fn normalize_min_max_smoke() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 1,
            },
            vec![0.0, 1.0, 2.0, 4.0],
        )?;

        let mut normalized = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;

        normalize_min_max(&image, &mut normalized, 0.0, 255.0)?;

        let expected = [0.0, 63.75, 127.5, 255.0];
        for (a, b) in normalized.as_slice().iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-4, "got {a}, expected {b}");
        }

        Ok(())
    }

    #[test]
    fn normalize_min_max_constant_input() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 3,
            },
            42.0,
        )?;

        let mut normalized = Image::<f32, 1>::from_size_val(image.size(), 1.0)?;

        normalize_min_max(&image, &mut normalized, 0.0, 255.0)?;

        for val in normalized.as_slice() {
            assert_eq!(*val, 0.0);
        }

        Ok(())
    }
}

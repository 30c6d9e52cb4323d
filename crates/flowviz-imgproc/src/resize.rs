use flowviz_image::{Image, ImageError};
use rayon::prelude::*;

use crate::interpolation::{bilinear_sample, nearest_sample, InterpolationMode};

/// Resize an image to the size of the destination image.
///
/// The source grid is sampled at evenly spaced coordinates so that the corner
/// pixels of the source and destination line up.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, pre-allocated with the target size.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use flowviz_image::{Image, ImageSize};
/// use flowviz_imgproc::interpolation::InterpolationMode;
/// use flowviz_imgproc::resize::resize_native;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0f32; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let mut resized = Image::<f32, 3>::from_size_val(
///     ImageSize {
///         width: 2,
///         height: 3,
///     },
///     0.0,
/// )
/// .unwrap();
///
/// resize_native(&image, &mut resized, InterpolationMode::Bilinear).unwrap();
///
/// assert_eq!(resized.size().width, 2);
/// assert_eq!(resized.size().height, 3);
/// ```
pub fn resize_native<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size() == dst.size() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());

    let scale_x = if dst_cols > 1 {
        (src.cols() - 1) as f32 / (dst_cols - 1) as f32
    } else {
        0.0
    };
    let scale_y = if dst_rows > 1 {
        (src.rows() - 1) as f32 / (dst_rows - 1) as f32
    } else {
        0.0
    };

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let v = y as f32 * scale_y;
            for x in 0..dst_cols {
                let u = x as f32 * scale_x;
                let pixel = match interpolation {
                    InterpolationMode::Bilinear => bilinear_sample(src, u, v),
                    InterpolationMode::Nearest => nearest_sample(src, u, v),
                };
                dst_row[x * C..x * C + C].copy_from_slice(&pixel);
            }
        });

    Ok(())
}

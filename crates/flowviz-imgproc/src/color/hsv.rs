use crate::parallel;
use flowviz_image::{Image, ImageError};

/// Convert an HSV image to an RGB image.
///
/// # Arguments
///
/// * `src` - The input HSV image with the following channels:
///   * H: The hue channel in degrees in the range [0, 360).
///   * S: The saturation channel in the range [0, 1].
///   * V: The value channel in the range [0, 1].
/// * `dst` - The output RGB image with all channels in the range [0, 1].
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use flowviz_image::{Image, ImageSize};
/// use flowviz_imgproc::color::rgb_from_hsv;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize {
///        width: 4,
///        height: 5,
///     },
///     vec![0f32; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let mut rgb = Image::<f32, 3>::from_size_val(image.size(), 0.0).unwrap();
///
/// rgb_from_hsv(&image, &mut rgb).unwrap();
///
/// assert_eq!(rgb.num_channels(), 3);
/// ```
pub fn rgb_from_hsv(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let h = src_pixel[0].rem_euclid(360.0);
        let s = src_pixel[1].clamp(0.0, 1.0);
        let v = src_pixel[2].clamp(0.0, 1.0);

        let c = v * s;
        let h_prime = h / 60.0;
        let x = c * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match h_prime as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        dst_pixel[0] = r + m;
        dst_pixel[1] = g + m;
        dst_pixel[2] = b + m;
    });

    Ok(())
}

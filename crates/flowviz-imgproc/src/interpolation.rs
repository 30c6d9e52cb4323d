use flowviz_image::Image;

/// Interpolation modes for sampling images at non-integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Bilinear interpolation between the four neighboring pixels.
    Bilinear,
    /// Nearest neighbor sampling.
    Nearest,
}

/// Sample an image at the given coordinates with bilinear interpolation.
///
/// Coordinates are clamped to the image bounds, so samples outside the image
/// replicate the nearest edge pixel.
///
/// # Arguments
///
/// * `image` - The input image.
/// * `u` - The x coordinate of the sample.
/// * `v` - The y coordinate of the sample.
///
/// # Returns
///
/// The interpolated pixel values.
pub fn bilinear_sample<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> [f32; C] {
    let (rows, cols) = (image.rows(), image.cols());

    let u = u.clamp(0.0, (cols - 1) as f32);
    let v = v.clamp(0.0, (rows - 1) as f32);

    let iu0 = u.floor() as usize;
    let iv0 = v.floor() as usize;
    let iu1 = (iu0 + 1).min(cols - 1);
    let iv1 = (iv0 + 1).min(rows - 1);

    let frac_u = u - iu0 as f32;
    let frac_v = v - iv0 as f32;

    let w00 = (1.0 - frac_u) * (1.0 - frac_v);
    let w01 = frac_u * (1.0 - frac_v);
    let w10 = (1.0 - frac_u) * frac_v;
    let w11 = frac_u * frac_v;

    let data = image.as_slice();
    let base00 = (iv0 * cols + iu0) * C;
    let base01 = (iv0 * cols + iu1) * C;
    let base10 = (iv1 * cols + iu0) * C;
    let base11 = (iv1 * cols + iu1) * C;

    let mut pixel = [0.0; C];
    for (k, out) in pixel.iter_mut().enumerate() {
        *out = data[base00 + k] * w00
            + data[base01 + k] * w01
            + data[base10 + k] * w10
            + data[base11 + k] * w11;
    }

    pixel
}

/// Sample an image at the given coordinates with nearest neighbor sampling.
///
/// Coordinates are clamped to the image bounds.
pub fn nearest_sample<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> [f32; C] {
    let (rows, cols) = (image.rows(), image.cols());

    let iu = (u.round().max(0.0) as usize).min(cols - 1);
    let iv = (v.round().max(0.0) as usize).min(rows - 1);

    let data = image.as_slice();
    let base = (iv * cols + iu) * C;

    let mut pixel = [0.0; C];
    pixel.copy_from_slice(&data[base..base + C]);
    pixel
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowviz_image::{ImageError, ImageSize};

    #[test]
    fn bilinear_sample_center() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;

        let pixel = bilinear_sample(&image, 0.5, 0.5);
        assert!((pixel[0] - 1.5).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn bilinear_sample_clamps_outside() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;

        assert_eq!(bilinear_sample(&image, -5.0, -5.0)[0], 0.0);
        assert_eq!(bilinear_sample(&image, 5.0, 5.0)[0], 3.0);

        Ok(())
    }

    #[test]
    fn nearest_sample_rounds() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;

        assert_eq!(nearest_sample(&image, 0.9, 0.0)[0], 1.0);
        assert_eq!(nearest_sample(&image, 0.2, 0.8)[0], 2.0);

        Ok(())
    }
}

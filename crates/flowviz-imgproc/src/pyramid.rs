use flowviz_image::{Image, ImageError, ImageSize};

use crate::filter::gaussian_blur;
use crate::interpolation::InterpolationMode;
use crate::resize::resize_native;

/// Build a Gaussian scale pyramid with an arbitrary per-level scale factor.
///
/// Each level is produced by smoothing the base image with a Gaussian whose
/// sigma grows with the downscale factor and resizing the result with
/// bilinear interpolation. The base image itself is the first level.
///
/// Levels stop early once the next level would fall below `min_dim` pixels in
/// either dimension, so the returned pyramid may be shorter than `levels`.
///
/// # Arguments
///
/// * `src` - The base image of the pyramid.
/// * `scale` - The per-level scale factor, in the open interval (0, 1).
/// * `levels` - The maximum number of levels, including the base.
/// * `min_dim` - The minimum width and height a level is allowed to have.
pub fn build_pyramid<const C: usize>(
    src: &Image<f32, C>,
    scale: f32,
    levels: usize,
    min_dim: usize,
) -> Result<Vec<Image<f32, C>>, ImageError> {
    if !(scale > 0.0 && scale < 1.0) {
        return Err(ImageError::InvalidScale(scale));
    }

    let mut pyramid = Vec::with_capacity(levels.max(1));
    pyramid.push(src.clone());

    for k in 1..levels {
        let level_scale = scale.powi(k as i32);
        let width = ((src.width() as f32 * level_scale).round() as usize).max(1);
        let height = ((src.height() as f32 * level_scale).round() as usize).max(1);

        if width < min_dim || height < min_dim {
            break;
        }

        // smooth the base image proportionally to the downscale factor
        let sigma = (1.0 / level_scale - 1.0) * 0.5;
        let kernel_size = (((sigma * 5.0).round() as usize) | 1).max(3);

        let mut blurred = Image::from_size_val(src.size(), 0.0)?;
        gaussian_blur(src, &mut blurred, kernel_size, sigma)?;

        let mut level = Image::from_size_val(ImageSize { width, height }, 0.0)?;
        resize_native(&blurred, &mut level, InterpolationMode::Bilinear)?;

        pyramid.push(level);
    }

    Ok(pyramid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyramid_level_sizes() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 64,
                height: 64,
            },
            1.0,
        )?;

        let pyramid = build_pyramid(&src, 0.5, 3, 16)?;

        assert_eq!(pyramid.len(), 3);
        assert_eq!(pyramid[0].size().width, 64);
        assert_eq!(pyramid[1].size().width, 32);
        assert_eq!(pyramid[2].size().width, 16);

        Ok(())
    }

    #[test]
    fn pyramid_caps_at_min_dim() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 64,
                height: 64,
            },
            1.0,
        )?;

        let pyramid = build_pyramid(&src, 0.5, 10, 32)?;

        assert_eq!(pyramid.len(), 2);

        Ok(())
    }

    #[test]
    fn pyramid_constant_image_stays_constant() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 32,
                height: 32,
            },
            7.0,
        )?;

        let pyramid = build_pyramid(&src, 0.5, 3, 8)?;

        for level in &pyramid {
            for val in level.as_slice() {
                assert!((val - 7.0).abs() < 1e-4);
            }
        }

        Ok(())
    }

    #[test]
    fn pyramid_invalid_scale() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            0.0,
        )?;

        assert!(matches!(
            build_pyramid(&src, 1.0, 3, 4),
            Err(ImageError::InvalidScale(_))
        ));
        assert!(matches!(
            build_pyramid(&src, 0.0, 3, 4),
            Err(ImageError::InvalidScale(_))
        ));

        Ok(())
    }
}

use flowviz_image::{Image, ImageError};
use rayon::prelude::*;

/// Convert a two-channel vector field to polar coordinates.
///
/// # Arguments
///
/// * `src` - The input vector field with (x, y) components per pixel.
/// * `mag` - The output magnitude per pixel.
/// * `ang` - The output angle per pixel, in radians in the range [0, 2π).
///
/// # Example
///
/// ```
/// use flowviz_image::{Image, ImageSize};
/// use flowviz_imgproc::polar::cart_to_polar;
///
/// let size = ImageSize { width: 1, height: 1 };
/// let field = Image::<f32, 2>::new(size, vec![3.0, 4.0]).unwrap();
///
/// let mut mag = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
/// let mut ang = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
///
/// cart_to_polar(&field, &mut mag, &mut ang).unwrap();
///
/// assert!((mag.as_slice()[0] - 5.0).abs() < 1e-6);
/// ```
pub fn cart_to_polar(
    src: &Image<f32, 2>,
    mag: &mut Image<f32, 1>,
    ang: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    for dst_size in [mag.size(), ang.size()] {
        if src.size() != dst_size {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst_size.width,
                dst_size.height,
            ));
        }
    }

    let cols = src.cols();
    src.as_slice()
        .par_chunks_exact(2 * cols)
        .zip(mag.as_slice_mut().par_chunks_exact_mut(cols))
        .zip(ang.as_slice_mut().par_chunks_exact_mut(cols))
        .for_each(|((src_row, mag_row), ang_row)| {
            src_row
                .chunks_exact(2)
                .zip(mag_row.iter_mut().zip(ang_row.iter_mut()))
                .for_each(|(vec, (mag_val, ang_val))| {
                    let (dx, dy) = (vec[0], vec[1]);
                    *mag_val = (dx * dx + dy * dy).sqrt();
                    let angle = dy.atan2(dx);
                    *ang_val = if angle < 0.0 {
                        angle + 2.0 * std::f32::consts::PI
                    } else {
                        angle
                    };
                });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowviz_image::ImageSize;
    use std::f32::consts::PI;

    #[test]
    fn cart_to_polar_cardinal_directions() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        #[rustfmt::skip]
        let field = Image::<f32, 2>::new(
            size,
            vec![
                1.0, 0.0,
                0.0, 1.0,
                -1.0, 0.0,
                0.0, -1.0,
            ],
        )?;

        let mut mag = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut ang = Image::<f32, 1>::from_size_val(size, 0.0)?;

        cart_to_polar(&field, &mut mag, &mut ang)?;

        for m in mag.as_slice() {
            assert!((m - 1.0).abs() < 1e-6);
        }

        let expected_angles = [0.0, PI / 2.0, PI, 3.0 * PI / 2.0];
        for (a, b) in ang.as_slice().iter().zip(expected_angles.iter()) {
            assert!((a - b).abs() < 1e-5, "got {a}, expected {b}");
        }

        Ok(())
    }

    #[test]
    fn cart_to_polar_magnitude() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 1,
            height: 1,
        };
        let field = Image::<f32, 2>::new(size, vec![3.0, 4.0])?;

        let mut mag = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut ang = Image::<f32, 1>::from_size_val(size, 0.0)?;

        cart_to_polar(&field, &mut mag, &mut ang)?;

        assert!((mag.as_slice()[0] - 5.0).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn cart_to_polar_size_mismatch() -> Result<(), ImageError> {
        let field = Image::<f32, 2>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0.0,
        )?;
        let mut mag = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0.0,
        )?;
        let mut ang = Image::<f32, 1>::from_size_val(field.size(), 0.0)?;

        assert!(cart_to_polar(&field, &mut mag, &mut ang).is_err());

        Ok(())
    }
}

use std::str::FromStr;

use flowviz_image::Image;
use flowviz_imgproc::color::{rgb_from_gray, rgb_from_hsv};
use flowviz_imgproc::normalize::normalize_min_max;
use flowviz_imgproc::parallel;
use flowviz_imgproc::polar::cart_to_polar;

use crate::error::FlowError;

/// How a flow field is mapped to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowColorMode {
    /// Motion magnitude rendered as intensity, direction discarded.
    #[default]
    Grayscale,
    /// Motion direction rendered as hue, magnitude as value.
    Hsv,
}

impl FromStr for FlowColorMode {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grayscale" => Ok(Self::Grayscale),
            "hsv" => Ok(Self::Hsv),
            _ => Err(FlowError::InvalidColorMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for FlowColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Grayscale => write!(f, "grayscale"),
            Self::Hsv => write!(f, "hsv"),
        }
    }
}

/// Render a dense flow field as an RGB image.
///
/// The flow is converted to polar coordinates and the magnitude is min-max
/// normalized over the frame, so a frame without motion renders black.
///
/// # Arguments
///
/// * `flow` - The input flow field with the (dx, dy) displacement per pixel.
/// * `mode` - The color mapping to apply.
pub fn render_flow(flow: &Image<f32, 2>, mode: FlowColorMode) -> Result<Image<u8, 3>, FlowError> {
    let size = flow.size();

    let mut mag = Image::<f32, 1>::from_size_val(size, 0.0)?;
    let mut ang = Image::<f32, 1>::from_size_val(size, 0.0)?;
    cart_to_polar(flow, &mut mag, &mut ang)?;

    let mut mag_norm = Image::<f32, 1>::from_size_val(size, 0.0)?;
    normalize_min_max(&mag, &mut mag_norm, 0.0, 255.0)?;

    let mut rgb = Image::<u8, 3>::from_size_val(size, 0)?;

    match mode {
        FlowColorMode::Grayscale => {
            let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
            parallel::par_iter_rows_val(&mag_norm, &mut gray, |&mag_val, gray_val| {
                *gray_val = mag_val.round().clamp(0.0, 255.0) as u8;
            });
            rgb_from_gray(&gray, &mut rgb)?;
        }
        FlowColorMode::Hsv => {
            let mut hsv = Image::<f32, 3>::from_size_val(size, 0.0)?;
            parallel::par_iter_rows_two(&ang, &mag_norm, &mut hsv, |ang_px, mag_px, hsv_px| {
                hsv_px[0] = ang_px[0].to_degrees();
                hsv_px[1] = 1.0;
                hsv_px[2] = mag_px[0] / 255.0;
            });

            let mut rgb_f32 = Image::<f32, 3>::from_size_val(size, 0.0)?;
            rgb_from_hsv(&hsv, &mut rgb_f32)?;

            parallel::par_iter_rows_val(&rgb_f32, &mut rgb, |&rgb_val, out_val| {
                *out_val = (rgb_val * 255.0).round().clamp(0.0, 255.0) as u8;
            });
        }
    }

    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowviz_image::ImageSize;

    #[test]
    fn color_mode_from_str() {
        assert_eq!(
            "grayscale".parse::<FlowColorMode>().unwrap(),
            FlowColorMode::Grayscale
        );
        assert_eq!("HSV".parse::<FlowColorMode>().unwrap(), FlowColorMode::Hsv);
        assert!(matches!(
            "sepia".parse::<FlowColorMode>(),
            Err(FlowError::InvalidColorMode(_))
        ));
    }

    #[test]
    fn render_zero_flow_is_black() -> Result<(), FlowError> {
        let flow = Image::<f32, 2>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0.0,
        )?;

        for mode in [FlowColorMode::Grayscale, FlowColorMode::Hsv] {
            let rgb = render_flow(&flow, mode)?;
            assert!(rgb.as_slice().iter().all(|&v| v == 0));
        }

        Ok(())
    }

    #[test]
    fn render_grayscale_magnitude() -> Result<(), FlowError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        // one still pixel, one moving with magnitude 5
        let flow = Image::<f32, 2>::new(size, vec![0.0, 0.0, 3.0, 4.0])?;

        let rgb = render_flow(&flow, FlowColorMode::Grayscale)?;

        assert_eq!(rgb.as_slice(), &[0, 0, 0, 255, 255, 255]);

        Ok(())
    }

    #[test]
    fn render_hsv_direction_as_hue() -> Result<(), FlowError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        // rightward motion next to a still pixel
        let flow = Image::<f32, 2>::new(size, vec![0.0, 0.0, 2.0, 0.0])?;

        let rgb = render_flow(&flow, FlowColorMode::Hsv)?;

        // still pixel renders black, rightward motion renders red
        assert_eq!(&rgb.as_slice()[0..3], &[0, 0, 0]);
        assert_eq!(&rgb.as_slice()[3..6], &[255, 0, 0]);

        Ok(())
    }

    #[test]
    fn render_hsv_downward_motion() -> Result<(), FlowError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let flow = Image::<f32, 2>::new(size, vec![0.0, 0.0, 0.0, 2.0])?;

        let rgb = render_flow(&flow, FlowColorMode::Hsv)?;

        // downward motion maps to a 90 degree hue
        let pixel = &rgb.as_slice()[3..6];
        assert!((pixel[0] as i32 - 128).abs() <= 1, "r: {}", pixel[0]);
        assert_eq!(pixel[1], 255);
        assert_eq!(pixel[2], 0);

        Ok(())
    }
}

use rayon::prelude::*;

use flowviz_image::{Image, ImageError};
use flowviz_imgproc::filter::box_blur;
use flowviz_imgproc::interpolation::{bilinear_sample, InterpolationMode};
use flowviz_imgproc::pyramid::build_pyramid;
use flowviz_imgproc::resize::resize_native;

use crate::error::FlowError;

/// Pyramid levels are capped so that no level falls below this dimension.
const MIN_LEVEL_DIM: usize = 16;

/// A 2x2 system whose determinant falls below this threshold keeps the
/// previous flow estimate instead of being solved.
const DET_EPS: f32 = 1e-6;

/// Parameters for the Farneback dense optical flow estimator.
///
/// The defaults match the common starting point for the algorithm: a
/// half-scale three-level pyramid, a 15 pixel averaging window and a 5 pixel
/// polynomial neighborhood.
#[derive(Debug, Clone, PartialEq)]
pub struct FarnebackParams {
    /// Scale between consecutive pyramid levels, in the open interval (0, 1).
    pub pyr_scale: f32,
    /// Maximum number of pyramid levels, including the base image.
    pub levels: usize,
    /// Side of the square window used to average the flow constraints, odd.
    pub winsize: usize,
    /// Number of constraint update iterations per pyramid level.
    pub iterations: usize,
    /// Side of the pixel neighborhood used for the polynomial expansion,
    /// 5 or 7.
    pub poly_n: usize,
    /// Standard deviation of the Gaussian weighting the polynomial fit.
    pub poly_sigma: f32,
}

impl Default for FarnebackParams {
    fn default() -> Self {
        Self {
            pyr_scale: 0.5,
            levels: 3,
            winsize: 15,
            iterations: 3,
            poly_n: 5,
            poly_sigma: 1.2,
        }
    }
}

impl FarnebackParams {
    /// Check that all parameters are in their valid ranges.
    pub fn validate(&self) -> Result<(), FlowError> {
        if !(self.pyr_scale > 0.0 && self.pyr_scale < 1.0) {
            return Err(FlowError::InvalidParameter {
                name: "pyr_scale",
                reason: format!("must be in (0, 1), got {}", self.pyr_scale),
            });
        }
        if self.levels == 0 {
            return Err(FlowError::InvalidParameter {
                name: "levels",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.winsize < 3 || self.winsize % 2 == 0 {
            return Err(FlowError::InvalidParameter {
                name: "winsize",
                reason: format!("must be odd and at least 3, got {}", self.winsize),
            });
        }
        if self.iterations == 0 {
            return Err(FlowError::InvalidParameter {
                name: "iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.poly_n != 5 && self.poly_n != 7 {
            return Err(FlowError::InvalidParameter {
                name: "poly_n",
                reason: format!("must be 5 or 7, got {}", self.poly_n),
            });
        }
        if !self.poly_sigma.is_finite() || self.poly_sigma <= 0.0 {
            return Err(FlowError::InvalidParameter {
                name: "poly_sigma",
                reason: format!("must be a positive finite number, got {}", self.poly_sigma),
            });
        }
        Ok(())
    }
}

/// Compute dense optical flow between two grayscale images.
///
/// Implements Farneback's polynomial expansion method: each pyramid level is
/// approximated by per-pixel quadratic polynomials, and the displacement field
/// is solved from the polynomial coefficients, averaged over a window and
/// refined coarse to fine.
///
/// The input images are expected in the [0, 255] intensity range.
///
/// # Arguments
///
/// * `prev` - The first grayscale image.
/// * `next` - The second grayscale image, same size as `prev`.
/// * `flow` - The output flow field, same size as the inputs, with the
///   (dx, dy) displacement per pixel. The previous content is ignored.
/// * `params` - The estimator parameters.
pub fn calc_optical_flow_farneback(
    prev: &Image<f32, 1>,
    next: &Image<f32, 1>,
    flow: &mut Image<f32, 2>,
    params: &FarnebackParams,
) -> Result<(), FlowError> {
    params.validate()?;

    if prev.size() != next.size() {
        return Err(ImageError::InvalidImageSize(
            next.cols(),
            next.rows(),
            prev.cols(),
            prev.rows(),
        )
        .into());
    }
    if prev.size() != flow.size() {
        return Err(ImageError::InvalidImageSize(
            flow.cols(),
            flow.rows(),
            prev.cols(),
            prev.rows(),
        )
        .into());
    }
    if prev.width() < params.poly_n || prev.height() < params.poly_n {
        return Err(FlowError::ImageTooSmall(
            prev.width(),
            prev.height(),
            params.poly_n,
        ));
    }

    let prev_pyr = build_pyramid(prev, params.pyr_scale, params.levels, MIN_LEVEL_DIM)?;
    let next_pyr = build_pyramid(next, params.pyr_scale, params.levels, MIN_LEVEL_DIM)?;

    let mut level_flow: Option<Image<f32, 2>> = None;

    for (prev_level, next_level) in prev_pyr.iter().zip(next_pyr.iter()).rev() {
        let size = prev_level.size();

        let mut lf = match level_flow.take() {
            None => Image::from_size_val(size, 0.0)?,
            Some(coarser) => {
                // displacement vectors grow with the spatial upsampling
                let mut up = Image::from_size_val(size, 0.0)?;
                resize_native(&coarser, &mut up, InterpolationMode::Bilinear)?;
                up.as_slice_mut()
                    .iter_mut()
                    .for_each(|v| *v /= params.pyr_scale);
                up
            }
        };

        let r0 = poly_exp(prev_level, params.poly_n, params.poly_sigma)?;
        let r1 = poly_exp(next_level, params.poly_n, params.poly_sigma)?;

        for _ in 0..params.iterations {
            update_flow(&r0, &r1, &mut lf, params.winsize)?;
        }

        level_flow = Some(lf);
    }

    if let Some(lf) = level_flow {
        flow.as_slice_mut().copy_from_slice(lf.as_slice());
    }

    Ok(())
}

/// Expand an image into per-pixel quadratic polynomials.
///
/// The local signal model is `f(x) ~ x^T A x + b^T x + c` with a Gaussian
/// applicability of size `poly_n` and standard deviation `sigma`. The output
/// has five channels per pixel: `[bx, by, axx, ayy, axy]`.
fn poly_exp(src: &Image<f32, 1>, poly_n: usize, sigma: f32) -> Result<Image<f32, 5>, ImageError> {
    let n = (poly_n / 2) as isize;

    // normalized Gaussian applicability over [-n, n]
    let s2 = (sigma as f64) * (sigma as f64);
    let mut g = vec![0f64; poly_n];
    let mut sum = 0.0;
    for (i, gv) in g.iter_mut().enumerate() {
        let k = (i as isize - n) as f64;
        *gv = (-k * k / (2.0 * s2)).exp();
        sum += *gv;
    }
    g.iter_mut().for_each(|gv| *gv /= sum);

    // second and fourth moments of the applicability
    let (mut m2, mut m4) = (0.0f64, 0.0f64);
    for (i, gv) in g.iter().enumerate() {
        let k = (i as isize - n) as f64;
        m2 += gv * k * k;
        m4 += gv * k * k * k * k;
    }

    // dual basis coefficients; the cross coupling between the x^2 and y^2
    // terms cancels for a separable applicability
    let ig11 = 1.0 / m2;
    let ig33 = 1.0 / (m4 - m2 * m2);
    let ig03 = -m2 * ig33;
    let ig55 = 1.0 / (m2 * m2);

    let (rows, cols) = (src.rows(), src.cols());
    let src_data = src.as_slice();

    let mut dst = Image::<f32, 5>::from_size_val(src.size(), 0.0)?;

    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * 5)
        .enumerate()
        .for_each(|(y, dst_row)| {
            // vertical correlations: projections onto {1, y, y^2}
            let mut row = vec![0f64; cols * 3];
            for (i, &gv) in g.iter().enumerate() {
                let k = i as isize - n;
                let yy = (y as isize + k).clamp(0, rows as isize - 1) as usize;
                let src_row = &src_data[yy * cols..(yy + 1) * cols];
                let kf = k as f64;
                for (x, &src_val) in src_row.iter().enumerate() {
                    let v = src_val as f64 * gv;
                    row[x * 3] += v;
                    row[x * 3 + 1] += v * kf;
                    row[x * 3 + 2] += v * kf * kf;
                }
            }

            // horizontal correlations and projection onto the dual basis
            for x in 0..cols {
                let mut b = [0f64; 6];
                for (i, &gv) in g.iter().enumerate() {
                    let k = i as isize - n;
                    let xx = ((x as isize + k).clamp(0, cols as isize - 1)) as usize;
                    let kf = k as f64;
                    let p0 = row[xx * 3];
                    let p1 = row[xx * 3 + 1];
                    let p2 = row[xx * 3 + 2];
                    b[0] += gv * p0; // <f, 1>
                    b[1] += gv * p1; // <f, y>
                    b[2] += gv * kf * p0; // <f, x>
                    b[3] += gv * p2; // <f, y^2>
                    b[4] += gv * kf * kf * p0; // <f, x^2>
                    b[5] += gv * kf * p1; // <f, x y>
                }

                let out = &mut dst_row[x * 5..x * 5 + 5];
                out[0] = (b[2] * ig11) as f32;
                out[1] = (b[1] * ig11) as f32;
                out[2] = (b[0] * ig03 + b[4] * ig33) as f32;
                out[3] = (b[0] * ig03 + b[3] * ig33) as f32;
                out[4] = (b[5] * ig55) as f32;
            }
        });

    Ok(dst)
}

/// Refine a flow field from the polynomial expansions of two images.
///
/// Builds the windowed least squares system `G d = h` per pixel and solves it,
/// where the constraints come from the difference of the linear polynomial
/// terms, warped by the current flow estimate.
fn update_flow(
    r0: &Image<f32, 5>,
    r1: &Image<f32, 5>,
    flow: &mut Image<f32, 2>,
    winsize: usize,
) -> Result<(), ImageError> {
    let (rows, cols) = (r0.rows(), r0.cols());
    debug_assert_eq!(rows, flow.rows());
    debug_assert_eq!(cols, flow.cols());

    let mut m = Image::<f32, 5>::from_size_val(r0.size(), 0.0)?;

    {
        let flow_data = flow.as_slice();
        let r0_data = r0.as_slice();

        m.as_slice_mut()
            .par_chunks_exact_mut(cols * 5)
            .enumerate()
            .for_each(|(y, m_row)| {
                for x in 0..cols {
                    let fidx = (y * cols + x) * 2;
                    let dx = flow_data[fidx];
                    let dy = flow_data[fidx + 1];

                    let r0p = &r0_data[(y * cols + x) * 5..(y * cols + x) * 5 + 5];
                    let r1p = bilinear_sample(r1, x as f32 + dx, y as f32 + dy);

                    let a11 = (r0p[2] + r1p[2]) * 0.5;
                    let a12 = (r0p[4] + r1p[4]) * 0.25;
                    let a22 = (r0p[3] + r1p[3]) * 0.5;

                    // constraint A d = db, shifted by the current estimate so
                    // the solve yields the total displacement
                    let mut db1 = (r0p[0] - r1p[0]) * 0.5;
                    let mut db2 = (r0p[1] - r1p[1]) * 0.5;
                    db1 += a11 * dx + a12 * dy;
                    db2 += a12 * dx + a22 * dy;

                    let out = &mut m_row[x * 5..x * 5 + 5];
                    out[0] = a11 * a11 + a12 * a12;
                    out[1] = a12 * (a11 + a22);
                    out[2] = a22 * a22 + a12 * a12;
                    out[3] = a11 * db1 + a12 * db2;
                    out[4] = a12 * db1 + a22 * db2;
                }
            });
    }

    // average the constraints over the window
    let mut m_blur = Image::<f32, 5>::from_size_val(r0.size(), 0.0)?;
    box_blur(&m, &mut m_blur, winsize)?;

    // solve the 2x2 system per pixel
    let m_data = m_blur.as_slice();
    flow.as_slice_mut()
        .par_chunks_exact_mut(cols * 2)
        .enumerate()
        .for_each(|(y, flow_row)| {
            for x in 0..cols {
                let mp = &m_data[(y * cols + x) * 5..(y * cols + x) * 5 + 5];
                let (g11, g12, g22, h1, h2) = (mp[0], mp[1], mp[2], mp[3], mp[4]);

                let det = g11 * g22 - g12 * g12;
                if det.abs() > DET_EPS {
                    let inv = 1.0 / det;
                    flow_row[x * 2] = (g22 * h1 - g12 * h2) * inv;
                    flow_row[x * 2 + 1] = (g11 * h2 - g12 * h1) * inv;
                }
                // near-singular systems keep the previous estimate
            }
        });

    Ok(())
}

use flowviz_image::{Image, ImageError};
use rayon::prelude::*;

/// Create a normalized 1D Gaussian kernel.
///
/// # Arguments
///
/// * `size` - The length of the kernel, must be odd.
/// * `sigma` - The standard deviation of the Gaussian.
pub fn gaussian_kernel_1d(size: usize, sigma: f32) -> Vec<f32> {
    let half = (size / 2) as isize;
    let mut kernel = Vec::with_capacity(size);
    let mut sum = 0.0f32;

    for i in -half..=half {
        let x = i as f32;
        let val = (-x * x / (2.0 * sigma * sigma)).exp();
        kernel.push(val);
        sum += val;
    }

    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Create a normalized 1D box kernel.
///
/// # Arguments
///
/// * `size` - The length of the kernel, must be odd.
pub fn box_kernel_1d(size: usize) -> Vec<f32> {
    vec![1.0 / size as f32; size]
}

/// Apply a separable 2D correlation to an image.
///
/// The horizontal and vertical 1D kernels are applied sequentially. Samples
/// outside the image bounds are replicated from the nearest edge pixel.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `kernel_x` - The horizontal 1D kernel, must have odd length.
/// * `kernel_y` - The vertical 1D kernel, must have odd length.
pub fn separable_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    for kernel in [kernel_x, kernel_y] {
        if kernel.is_empty() || kernel.len() % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(kernel.len()));
        }
    }

    let rows = src.rows();
    let cols = src.cols();
    let row_len = cols * C;
    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;

    // horizontal pass into an intermediate buffer
    let mut tmp = vec![0.0f32; src.as_slice().len()];
    tmp.par_chunks_exact_mut(row_len)
        .zip(src.as_slice().par_chunks_exact(row_len))
        .for_each(|(tmp_row, src_row)| {
            for x in 0..cols {
                let mut acc = [0.0f32; C];
                for (i, &k) in kernel_x.iter().enumerate() {
                    let xi = (x as isize + i as isize - half_x).clamp(0, cols as isize - 1);
                    let idx = xi as usize * C;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += src_row[idx + ch] * k;
                    }
                }
                tmp_row[x * C..x * C + C].copy_from_slice(&acc);
            }
        });

    // vertical pass into the destination
    dst.as_slice_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for x in 0..cols {
                let mut acc = [0.0f32; C];
                for (i, &k) in kernel_y.iter().enumerate() {
                    let yi = (y as isize + i as isize - half_y).clamp(0, rows as isize - 1);
                    let idx = yi as usize * row_len + x * C;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += tmp[idx + ch] * k;
                    }
                }
                dst_row[x * C..x * C + C].copy_from_slice(&acc);
            }
        });

    Ok(())
}

/// Blur an image with a Gaussian kernel.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `kernel_size` - The length of the kernel, must be odd.
/// * `sigma` - The standard deviation of the Gaussian, must be positive.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_size: usize,
    sigma: f32,
) -> Result<(), ImageError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ImageError::InvalidSigma(sigma));
    }

    let kernel = gaussian_kernel_1d(kernel_size, sigma);
    separable_filter(src, dst, &kernel, &kernel)
}

/// Blur an image with a box kernel.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image.
/// * `kernel_size` - The length of the kernel, must be odd.
pub fn box_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    let kernel = box_kernel_1d(kernel_size);
    separable_filter(src, dst, &kernel, &kernel)
}

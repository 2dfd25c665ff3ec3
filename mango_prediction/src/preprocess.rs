use image::RgbImage;
use ndarray::{Array, Ix4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Error reading image: {0}")]
    Read(#[from] std::io::Error),
    #[error("Error decoding image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes `image_data` into a `[1, size, size, 3]` RGB tensor scaled to `[0, 1]`.
pub fn image_to_tensor(
    image_data: &[u8],
    size: u32,
) -> Result<Array<f32, Ix4>, PreprocessError> {
    let image_reader =
        image::ImageReader::new(std::io::Cursor::new(image_data)).with_guessed_format()?;

    let original_img = image_reader.decode()?;
    tracing::debug!(
        "Decoded {}x{} image",
        original_img.width(),
        original_img.height()
    );

    let input = resize_bilinear(&original_img.into_rgb8(), size as usize).mapv(|v| v / 255.);

    Ok(input)
}

/// Bilinear resize without corner alignment or half-pixel centers: output
/// pixel `x` samples source coordinate `x * in / out` and blends only its two
/// neighbours per axis.
fn resize_bilinear(img: &RgbImage, size: usize) -> Array<f32, Ix4> {
    let axis_samples = |input_len: u32| -> Vec<(usize, usize, f64)> {
        let ratio = input_len as f64 / size as f64;
        (0..size)
            .map(|i| {
                let frac = ratio * i as f64;
                let floor = frac.floor() as usize;
                let ceil = (frac.ceil() as usize).min((input_len as usize).saturating_sub(1));
                (floor, ceil, frac - floor as f64)
            })
            .collect()
    };
    let rows = axis_samples(img.height());
    let cols = axis_samples(img.width());

    Array::from_shape_fn((1, size, size, 3), |(_, y, x, c)| {
        let (top, bottom, row_lerp) = rows[y];
        let (left, right, col_lerp) = cols[x];
        let px = |yy: usize, xx: usize| img.get_pixel(xx as u32, yy as u32).0[c] as f64;

        let top_value = px(top, left) + (px(top, right) - px(top, left)) * col_lerp;
        let bottom_value = px(bottom, left) + (px(bottom, right) - px(bottom, left)) * col_lerp;
        (top_value + (bottom_value - top_value) * row_lerp) as f32
    })
}

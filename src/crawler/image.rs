//! Featured image normalisation
//!
//! Images arrive in whatever encoding the site serves. They are decoded,
//! flattened onto a white background and re-encoded as PNG so the renderer
//! only ever deals with one format.

use crate::{DigestError, Result};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Downloads smaller than this are error pages or tracking pixels
pub const MIN_IMAGE_BYTES: usize = 100;

/// Converts raw image bytes into an opaque PNG
///
/// # Arguments
///
/// * `url` - Where the bytes came from, used in error messages
/// * `bytes` - The downloaded image
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PNG bytes
/// * `Err(DigestError::Image)` - Too small, or not a decodable image
pub fn normalize_image(url: &str, bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(DigestError::Image {
            url: url.to_string(),
            message: format!("only {} bytes, likely invalid", bytes.len()),
        });
    }

    let decoded = image::load_from_memory(bytes).map_err(|e| DigestError::Image {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flattened = RgbImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        flattened.put_pixel(x, y, Rgb([over_white(r, a), over_white(g, a), over_white(b, a)]));
    }

    let mut out = Cursor::new(Vec::new());
    flattened
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| DigestError::Image {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    Ok(out.into_inner())
}

/// Composites one channel over white
fn over_white(channel: u8, alpha: u8) -> u8 {
    let c = channel as u32;
    let a = alpha as u32;
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

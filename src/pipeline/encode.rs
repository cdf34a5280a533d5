//! Image encoding: archive PNG entry → displayable [`ImagePayload`].
//!
//! Only the PNG header is decoded, to learn the pixel size an interface
//! needs to lay the image out. A PNG whose header cannot be read is still
//! kept; it simply has no dimensions.

use crate::output::ImagePayload;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::{debug, warn};

/// Wrap raw PNG bytes from entry `name` as an image payload.
pub fn encode_png(name: &str, bytes: Vec<u8>) -> ImagePayload {
    let dimensions = ImageReader::with_format(Cursor::new(&bytes), ImageFormat::Png)
        .into_dimensions()
        .map_err(|e| warn!("Could not read PNG header of '{}': {}", name, e))
        .ok();

    debug!("Image '{}': {} bytes, {:?}", name, bytes.len(), dimensions);

    ImagePayload {
        name: name.to_string(),
        mime_type: "image/png".to_string(),
        width: dimensions.map(|(w, _)| w),
        height: dimensions.map(|(_, h)| h),
        bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode should succeed");
        buf
    }

    #[test]
    fn encode_small_png() {
        let payload = encode_png("page_1.png", png_bytes(10, 7));
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.width, Some(10));
        assert_eq!(payload.height, Some(7));
        assert!(payload.data_uri().starts_with("data:image/png;base64,iVBOR"));
    }

    #[test]
    fn unreadable_png_is_kept_without_dimensions() {
        let payload = encode_png("broken.png", b"not a png".to_vec());
        assert_eq!(payload.width, None);
        assert_eq!(payload.height, None);
        assert_eq!(payload.len(), 9);
    }
}

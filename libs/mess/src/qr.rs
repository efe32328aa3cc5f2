//! QR image rendering for issued credentials

use anyhow::{Context, Result};
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

const MAX_DIMENSIONS: u32 = 640;

/// Render a signed credential payload as a PNG QR image
///
/// Medium error correction, black on white, sized for a phone screen.
pub fn render_png(payload: &str) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
        .context("failed to build QR code from payload")?;

    let qr_image = code
        .render::<Luma<u8>>()
        .max_dimensions(MAX_DIMENSIONS, MAX_DIMENSIONS)
        .build();

    let mut buffer = Cursor::new(Vec::new());
    qr_image
        .write_to(&mut buffer, ImageFormat::Png)
        .context("failed to encode QR image as PNG")?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_produces_png_bytes() {
        let png = render_png("1|8b1117cc-92ab-4819-97a1-6f0061e23a10|1767225600|4fa1c29e77d0|deadbeef")
            .expect("render");
        assert!(png.len() > 100);
        // PNG magic number
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}

//! Pixel work behind the edit flow: tone, border, size and metadata
//! extraction.
//!
//! Edits are applied in a fixed order (tone, then border, then size) and
//! the result is always re-encoded as JPEG.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pixly_core::{Border, EditParams, Error, ImageSize, Result, Tone};

/// Shift applied to the red/blue channels by the warm and cool tones.
const TEMPERATURE_SHIFT: i16 = 24;

/// Descriptive facts pulled from uploaded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescription {
    pub width: u32,
    pub height: u32,
    /// Upper-case format name, e.g. `PNG`.
    pub format: String,
    pub mime_type: String,
    /// Pixel layout as reported by the decoder, e.g. `Rgba8`.
    pub color_type: String,
    pub file_size: usize,
}

impl ImageDescription {
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Metadata rows recorded for a fresh upload.
    pub fn metadata_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("resolution", self.resolution()),
            ("format", self.format.clone()),
            ("color_type", self.color_type.clone()),
            ("file_size", self.file_size.to_string()),
        ]
    }
}

/// Decode bytes, failing with [`Error::Image`] when they are not an image.
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(data).map_err(|e| Error::Image(format!("Failed to decode image: {e}")))
}

/// Decode `data` and describe it.
pub fn describe(data: &[u8]) -> Result<ImageDescription> {
    let format = image::guess_format(data)
        .map_err(|e| Error::Image(format!("Unrecognized image format: {e}")))?;
    let img = decode(data)?;

    Ok(ImageDescription {
        width: img.width(),
        height: img.height(),
        format: format_name(format),
        mime_type: format.to_mime_type().to_string(),
        color_type: format!("{:?}", img.color()),
        file_size: data.len(),
    })
}

fn format_name(format: ImageFormat) -> String {
    format!("{format:?}").to_uppercase()
}

/// Apply tone, border and size to a decoded image.
pub fn apply(img: DynamicImage, params: &EditParams) -> DynamicImage {
    let toned = apply_tone(img.to_rgb8(), params.tone);
    let bordered = apply_border(toned, params.border);
    apply_size(DynamicImage::ImageRgb8(bordered), params.size)
}

/// Decode, edit and re-encode as JPEG.
pub fn render_jpeg(data: &[u8], params: &EditParams) -> Result<Vec<u8>> {
    let edited = apply(decode(data)?, params);
    encode_jpeg(&edited)
}

/// Encode as JPEG, dropping any alpha channel first.
pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| Error::Image(format!("Failed to encode image as JPEG: {e}")))?;
    Ok(buf.into_inner())
}

fn apply_tone(mut img: RgbImage, tone: Tone) -> RgbImage {
    match tone {
        Tone::Original => return img,
        Tone::Grayscale => return DynamicImage::ImageRgb8(img).grayscale().to_rgb8(),
        Tone::Sepia | Tone::Warm | Tone::Cool => {}
    }

    for pixel in img.pixels_mut() {
        let [r, g, b] = pixel.0;
        *pixel = match tone {
            Tone::Sepia => sepia(r, g, b),
            Tone::Warm => shift(r, g, b, TEMPERATURE_SHIFT),
            Tone::Cool => shift(r, g, b, -TEMPERATURE_SHIFT),
            Tone::Original | Tone::Grayscale => *pixel,
        };
    }
    img
}

fn sepia(r: u8, g: u8, b: u8) -> Rgb<u8> {
    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    Rgb([
        channel(0.393 * r + 0.769 * g + 0.189 * b),
        channel(0.349 * r + 0.686 * g + 0.168 * b),
        channel(0.272 * r + 0.534 * g + 0.131 * b),
    ])
}

/// Positive `delta` warms (more red, less blue), negative cools.
fn shift(r: u8, g: u8, b: u8, delta: i16) -> Rgb<u8> {
    let channel = |v: u8, d: i16| (i16::from(v) + d).clamp(0, 255) as u8;
    Rgb([channel(r, delta), g, channel(b, -delta)])
}

fn apply_border(img: RgbImage, border: Border) -> RgbImage {
    let width = border.width_px();
    if width == 0 {
        return img;
    }

    let mut canvas = RgbImage::from_pixel(
        img.width() + 2 * width,
        img.height() + 2 * width,
        Rgb([0, 0, 0]),
    );
    image::imageops::overlay(&mut canvas, &img, i64::from(width), i64::from(width));
    canvas
}

fn apply_size(img: DynamicImage, size: ImageSize) -> DynamicImage {
    match size.target_width() {
        // Only ever downscale.
        Some(target) if img.width() > target => img.resize(target, u32::MAX, FilterType::Lanczos3),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn params(tone: Tone, border: Border, size: ImageSize) -> EditParams {
        EditParams { tone, border, size }
    }

    #[test]
    fn describe_png() {
        let data = png_bytes(40, 20, [10, 20, 30]);
        let desc = describe(&data).unwrap();
        assert_eq!(desc.resolution(), "40x20");
        assert_eq!(desc.format, "PNG");
        assert_eq!(desc.mime_type, "image/png");
        assert_eq!(desc.color_type, "Rgb8");
        assert_eq!(desc.file_size, data.len());

        let rows = desc.metadata_rows();
        assert_eq!(rows[0], ("resolution", "40x20".to_string()));
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn describe_rejects_garbage() {
        let err = describe(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::Image(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([200, 50, 10])));
        let out = apply(img, &params(Tone::Grayscale, Border::None, ImageSize::Original)).to_rgb8();
        let [r, g, b] = out.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn sepia_clamps_white() {
        assert_eq!(sepia(255, 255, 255), Rgb([255, 255, 239]));
        assert_eq!(sepia(0, 0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn warm_and_cool_shift_opposite_channels() {
        assert_eq!(shift(100, 100, 100, TEMPERATURE_SHIFT), Rgb([124, 100, 76]));
        assert_eq!(shift(100, 100, 100, -TEMPERATURE_SHIFT), Rgb([76, 100, 124]));
        assert_eq!(shift(250, 0, 5, TEMPERATURE_SHIFT), Rgb([255, 0, 0]));
    }

    #[test]
    fn border_grows_canvas_and_paints_black() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([255, 255, 255])));
        let out = apply(img, &params(Tone::Original, Border::Thin, ImageSize::Original)).to_rgb8();
        assert_eq!(out.dimensions(), (60, 40));
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(30, 20).0, [255, 255, 255]);
    }

    #[test]
    fn size_downscales_but_never_enlarges() {
        let big = DynamicImage::ImageRgb8(RgbImage::new(800, 400));
        let out = apply(big, &params(Tone::Original, Border::None, ImageSize::Small));
        assert_eq!(out.width(), 300);
        assert_eq!(out.height(), 150);

        let small = DynamicImage::ImageRgb8(RgbImage::new(100, 50));
        let out = apply(small, &params(Tone::Original, Border::None, ImageSize::Large));
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn border_applies_before_resize() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(570, 270));
        let out = apply(img, &params(Tone::Sepia, Border::Thick, ImageSize::Medium));
        // 630x330 after the border, then scaled to 600 wide.
        assert_eq!(out.width(), 600);
        assert!((313..=315).contains(&out.height()));
    }

    #[test]
    fn render_jpeg_handles_alpha_sources() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(16, 8));
        let mut buf = Cursor::new(Vec::new());
        rgba.write_to(&mut buf, ImageFormat::Png).unwrap();

        let jpeg = render_jpeg(buf.get_ref(), &EditParams::default()).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = decode(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}

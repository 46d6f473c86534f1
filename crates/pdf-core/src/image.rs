//! Image handling for PDF documents

use crate::graphics::fmt_num;
use crate::{PdfError, Result};
use image::{DynamicImage, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Image XObject for PDF embedding
///
/// Colour samples and the optional alpha channel are stored FlateDecode
/// compressed; the alpha channel becomes a soft mask so rasterized text
/// does not hide the rules drawn underneath it.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray")
    pub color_space: &'static str,
    /// Compressed colour samples
    pub data: Vec<u8>,
    /// Compressed 8-bit alpha samples, when the source has transparency
    pub alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Decode PNG (or JPEG) bytes into an XObject
    pub fn from_encoded(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let image = reader.decode()?;
        Self::from_image(&image)
    }

    /// Build an XObject from an already decoded image
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(PdfError::ImageError("Image has no pixels".to_string()));
        }

        let (raw, color_space, alpha) = if image.color().has_color() {
            if image.color().has_alpha() {
                let rgba = image.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha.push(pixel.0[3]);
                }
                (rgb, "DeviceRGB", opaque_or(alpha))
            } else {
                (image.to_rgb8().into_raw(), "DeviceRGB", None)
            }
        } else if image.color().has_alpha() {
            let la = image.to_luma_alpha8();
            let mut gray = Vec::with_capacity((width * height) as usize);
            let mut alpha = Vec::with_capacity((width * height) as usize);
            for pixel in la.pixels() {
                gray.push(pixel.0[0]);
                alpha.push(pixel.0[1]);
            }
            (gray, "DeviceGray", opaque_or(alpha))
        } else {
            (image.to_luma8().into_raw(), "DeviceGray", None)
        };

        Ok(Self {
            width,
            height,
            color_space,
            data: deflate(&raw)?,
            alpha: alpha.map(|a| deflate(&a)).transpose()?,
        })
    }

    /// Soft mask stream for the alpha channel, if any
    pub fn to_smask_stream(&self) -> Option<Stream> {
        self.alpha
            .as_ref()
            .map(|alpha| image_stream(self.width, self.height, "DeviceGray", alpha))
    }

    /// Convert to lopdf Stream object; the caller links `SMask` after adding the mask
    pub fn to_pdf_stream(&self) -> Stream {
        image_stream(self.width, self.height, self.color_space, &self.data)
    }
}

/// Drop an alpha channel that is fully opaque
fn opaque_or(alpha: Vec<u8>) -> Option<Vec<u8>> {
    if alpha.iter().all(|&a| a == 255) {
        None
    } else {
        Some(alpha)
    }
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

fn image_stream(width: u32, height: u32, color_space: &str, data: &[u8]) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", width as i64);
    dict.set("Height", height as i64);
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", 8);
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    Stream::new(dict, data.to_vec())
}

/// Generate operators to draw an image
///
/// The image's bottom-left corner lands on `(x, y)`; a non-zero `angle`
/// (degrees, counter-clockwise) rotates it around that corner.
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    angle: f64,
) -> Vec<u8> {
    let (sin, cos) = if angle == 0.0 {
        (0.0, 1.0)
    } else {
        angle.to_radians().sin_cos()
    };
    format!(
        "q\n{} {} {} {} {} {} cm\n/{image_name} Do\nQ\n",
        fmt_num(width * cos),
        fmt_num(width * sin),
        fmt_num(-height * sin),
        fmt_num(height * cos),
        fmt_num(x),
        fmt_num(y)
    )
    .into_bytes()
}

//! Decoding fetched payloads and encoding the canonical output.
//!
//! Every saved file is RGB in the configured output format, regardless of
//! what the origin served. A payload that does not decode is a per-extension
//! failure, same as a network error.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageFormat};
use thiserror::Error;

use crate::config::{OutputConfig, OutputFormat, ReencodeMode};

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Body was not a decodable image (HTML error page, truncated file, ...).
    #[error("not a decodable image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("encode {format:?}: {source}")]
    Encode {
        format: OutputFormat,
        #[source]
        source: image::ImageError,
    },
}

/// Result of normalizing one payload.
#[derive(Debug, Clone)]
pub struct Canonical {
    /// Bytes to persist, in the configured output format.
    pub bytes: Vec<u8>,
    /// Format sniffed from the payload, if recognized.
    pub source_format: Option<ImageFormat>,
    /// Color model of the decoded payload before conversion.
    pub source_color: ColorType,
    /// False only when the payload was kept byte-for-byte.
    pub reencoded: bool,
}

impl Canonical {
    /// True when the source differed from the output in format or color model.
    pub fn converted(&self, output: OutputFormat) -> bool {
        let same_format = matches!(
            (self.source_format, output),
            (Some(ImageFormat::Jpeg), OutputFormat::Jpeg) | (Some(ImageFormat::Png), OutputFormat::Png)
        );
        !same_format || self.source_color != ColorType::Rgb8
    }
}

/// Decodes `body` and produces the canonical encoding described by `output`.
pub fn canonicalize(body: &[u8], output: &OutputConfig) -> Result<Canonical, ConvertError> {
    let source_format = image::guess_format(body).ok();
    let img = image::load_from_memory(body).map_err(ConvertError::Decode)?;
    let source_color = img.color();

    let keep_verbatim = output.reencode == ReencodeMode::NonJpeg
        && output.format == OutputFormat::Jpeg
        && source_format == Some(ImageFormat::Jpeg)
        && source_color == ColorType::Rgb8;
    if keep_verbatim {
        return Ok(Canonical {
            bytes: body.to_vec(),
            source_format,
            source_color,
            reencoded: false,
        });
    }

    let bytes = encode(&img, output)?;
    Ok(Canonical {
        bytes,
        source_format,
        source_color,
        reencoded: true,
    })
}

fn encode(img: &DynamicImage, output: &OutputConfig) -> Result<Vec<u8>, ConvertError> {
    let rgb = img.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    let res = match output.format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, output.jpeg_quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Png => rgb.write_with_encoder(PngEncoder::new(&mut buf)),
    };
    res.map_err(|source| ConvertError::Encode {
        format: output.format,
        source,
    })?;
    Ok(buf.into_inner())
}

/// Short lowercase name of a sniffed format, for progress messages.
pub fn format_name(format: Option<ImageFormat>) -> &'static str {
    match format {
        Some(ImageFormat::Jpeg) => "jpeg",
        Some(ImageFormat::Png) => "png",
        Some(ImageFormat::WebP) => "webp",
        Some(_) => "image",
        None => "unknown",
    }
}

use crate::refs::{ObjectReferences, RefType};
use base64::Engine;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] image::ImageError),

    #[error("image data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("expected a base64 `data:` URL")]
    NotDataUrl,
}

pub enum RasterImage {
    /// Baseline RGB JPEG data that PDF viewers can decode as-is
    Jpeg(Vec<u8>),
    Decoded(DynamicImage),
}

/// A raster image that can be embedded in a document and drawn on any page
pub struct Image {
    pub image: RasterImage,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

struct EncodeOutput<'a> {
    filter: Filter,
    bytes: std::borrow::Cow<'a, [u8]>,
    mask: Option<Vec<u8>>,
}

impl Image {
    pub fn new_from_disk<P: AsRef<Path>>(path: P) -> Result<Image, ImageError> {
        let data = std::fs::read(path.as_ref())?;
        Image::from_bytes(data)
    }

    /// Decode an image from the bytes of an encoded file (PNG, JPEG, ...)
    pub fn from_bytes(data: Vec<u8>) -> Result<Image, ImageError> {
        let format = image::guess_format(&data)?;
        let image = image::load_from_memory_with_format(&data, format)?;

        match (format, image.color()) {
            (ImageFormat::Jpeg, ColorType::Rgb8) => Ok(Image {
                width: image.width() as f32,
                height: image.height() as f32,
                image: RasterImage::Jpeg(data),
            }),
            _ => Ok(Image::new_raster(image)),
        }
    }

    /// Decode an image embedded in a `data:image/...;base64,` URL, the form
    /// screenshots are stored in. A bare base64 payload is accepted as well.
    pub fn from_data_url(url: &str) -> Result<Image, ImageError> {
        let url = url.trim();
        let payload = match url.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or(ImageError::NotDataUrl)?;
                if !header.ends_with(";base64") {
                    return Err(ImageError::NotDataUrl);
                }
                payload
            }
            None if url.is_empty() => return Err(ImageError::NotDataUrl),
            None => url,
        };

        let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
        Image::from_bytes(bytes)
    }

    /// Re-encode the image file in `data` as a PNG `data:` URL, the form
    /// screenshots are stored in
    pub fn png_data_url(data: &[u8]) -> Result<String, ImageError> {
        let image = image::load_from_memory(data)?;
        let mut png = std::io::Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png.into_inner())
        ))
    }

    pub fn new_raster(image: DynamicImage) -> Image {
        let width = image.width() as f32;
        let height = image.height() as f32;
        Image {
            image: RasterImage::Decoded(image),
            width,
            height,
        }
    }

    /// Height of the image when drawn `width` wide, keeping its aspect ratio
    pub fn scaled_height(&self, width: crate::Pt) -> crate::Pt {
        if self.width <= 0.0 {
            return crate::Pt::ZERO;
        }
        width * (self.height / self.width)
    }

    fn encode(&self) -> EncodeOutput<'_> {
        match &self.image {
            RasterImage::Jpeg(bytes) => EncodeOutput {
                filter: Filter::DctDecode,
                bytes: bytes.as_slice().into(),
                mask: None,
            },
            RasterImage::Decoded(image) => {
                let level = CompressionLevel::DefaultLevel as u8;

                let mask = image.color().has_alpha().then(|| {
                    let alphas: Vec<u8> = image.pixels().map(|p| (p.2).0[3]).collect();
                    compress_to_vec_zlib(&alphas, level)
                });

                EncodeOutput {
                    filter: Filter::FlateDecode,
                    bytes: compress_to_vec_zlib(image.to_rgb8().as_raw(), level).into(),
                    mask,
                }
            }
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, image_index: usize, writer: &mut Pdf) {
        let id = refs.gen(RefType::Image(image_index));
        let encoded = self.encode();
        let mask_id = encoded
            .mask
            .as_ref()
            .map(|_| refs.gen(RefType::ImageMask(image_index)));

        let mut image = writer.image_xobject(id, &encoded.bytes);
        image.filter(encoded.filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        if let (Some(mask_id), Some(mask)) = (mask_id, encoded.mask.as_ref()) {
            let mut s_mask = writer.image_xobject(mask_id, mask);
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_data_url() -> String {
        let img = RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 128]));
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        )
    }

    #[test]
    fn decodes_data_urls() {
        let image = Image::from_data_url(&png_data_url()).unwrap();
        assert_eq!((image.width, image.height), (4.0, 2.0));
        assert_eq!(image.scaled_height(crate::Pt(100.0)), crate::Pt(50.0));
        assert!(image.encode().mask.is_some());
    }

    #[test]
    fn files_become_png_data_urls() {
        let mut jpeg = Vec::new();
        DynamicImage::new_rgb8(6, 3)
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let url = Image::png_data_url(&jpeg).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let image = Image::from_data_url(&url).unwrap();
        assert_eq!((image.width, image.height), (6.0, 3.0));

        assert!(matches!(Image::png_data_url(b"not an image"), Err(ImageError::Decode(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(Image::from_data_url(""), Err(ImageError::NotDataUrl)));
        assert!(matches!(
            Image::from_data_url("data:image/png,abc"),
            Err(ImageError::NotDataUrl)
        ));
        assert!(matches!(
            Image::from_data_url("data:image/png;base64,@@@"),
            Err(ImageError::Base64(_))
        ));
        assert!(matches!(
            Image::from_data_url("data:image/png;base64,aGVsbG8="),
            Err(ImageError::Decode(_))
        ));
    }
}

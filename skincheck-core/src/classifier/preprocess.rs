use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;

use super::ClassificationFailure;

/// Side length of the square RGB tensor the model consumes.
pub const MODEL_INPUT_SIZE: u32 = 224;

/// A decoded `data:image/<type>;base64,<data>` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Normalized RGB pixels in row-major HWC order, each channel in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl InlineImage {
    pub fn parse(payload: &str) -> Result<Self, ClassificationFailure> {
        let rest = payload.strip_prefix("data:").ok_or_else(|| {
            ClassificationFailure::MalformedPayload("missing data: scheme".into())
        })?;
        let (header, data) = rest.split_once(',').ok_or_else(|| {
            ClassificationFailure::MalformedPayload(
                "missing ',' before image data".into(),
            )
        })?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default();
        if !media_type.starts_with("image/") {
            return Err(ClassificationFailure::MalformedPayload(format!(
                "unsupported media type '{media_type}'"
            )));
        }
        if !params.any(|param| param.eq_ignore_ascii_case("base64")) {
            return Err(ClassificationFailure::MalformedPayload(
                "only base64 payloads are supported".into(),
            ));
        }

        // Clients occasionally wrap long base64 bodies.
        let compact: String = data
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| ClassificationFailure::Decode(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ClassificationFailure::MalformedPayload(
                "empty image body".into(),
            ));
        }

        Ok(Self {
            media_type: media_type.to_string(),
            bytes,
        })
    }

    /// Decode, center-crop to a square of [`MODEL_INPUT_SIZE`] and scale
    /// every channel to `[-1, 1]`.
    pub fn preprocess(&self) -> Result<ModelInput, ClassificationFailure> {
        let decoded = image::load_from_memory(&self.bytes)
            .map_err(|e| ClassificationFailure::Decode(e.to_string()))?;
        let fitted = decoded
            .resize_to_fill(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, FilterType::Lanczos3)
            .to_rgb8();

        let data = fitted
            .as_raw()
            .iter()
            .map(|&channel| f32::from(channel) / 127.5 - 1.0)
            .collect();

        Ok(ModelInput {
            width: fitted.width(),
            height: fitted.height(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_images::png_data_uri;

    #[test]
    fn parses_media_type_and_body() {
        let image = InlineImage::parse("data:image/jpeg;base64,aGk=").unwrap();
        assert_eq!(image.media_type, "image/jpeg");
        assert_eq!(image.bytes, b"hi");
    }

    #[test]
    fn tolerates_wrapped_base64() {
        let image =
            InlineImage::parse("data:image/png;base64,aG\nVs\r\nbG8=").unwrap();
        assert_eq!(image.bytes, b"hello");
    }

    #[test]
    fn rejects_non_image_media_types() {
        let err = InlineImage::parse("data:text/plain;base64,aGk=").unwrap_err();
        assert!(matches!(err, ClassificationFailure::MalformedPayload(_)));
    }

    #[test]
    fn preprocess_produces_square_normalized_tensor() {
        let image = InlineImage::parse(&png_data_uri(40, 20)).unwrap();
        let input = image.preprocess().unwrap();

        assert_eq!(input.width, MODEL_INPUT_SIZE);
        assert_eq!(input.height, MODEL_INPUT_SIZE);
        assert_eq!(
            input.data.len(),
            (MODEL_INPUT_SIZE * MODEL_INPUT_SIZE * 3) as usize
        );
        assert!(input.data.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn preprocess_rejects_non_image_bytes() {
        let image = InlineImage::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert!(matches!(
            image.preprocess(),
            Err(ClassificationFailure::Decode(_))
        ));
    }
}

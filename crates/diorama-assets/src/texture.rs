use tracing::debug;

/// Pixel format of a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8,
}

/// A texture embedded in or referenced by a model, with raw pixel data.
#[derive(Debug, Clone)]
pub struct TextureAsset {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub format: TextureFormat,
}

impl TextureAsset {
    /// Convert decoded glTF image data to RGBA8. Returns `None` for formats
    /// that cannot be expressed as 8-bit RGBA.
    pub(crate) fn from_gltf(image_data: &gltf::image::Data) -> Option<Self> {
        let (width, height) = (image_data.width, image_data.height);
        let data = match image_data.format {
            gltf::image::Format::R8G8B8A8 => image_data.pixels.clone(),
            gltf::image::Format::R8G8B8 => {
                let mut rgba = Vec::with_capacity(image_data.pixels.len() / 3 * 4);
                for chunk in image_data.pixels.chunks(3) {
                    rgba.extend_from_slice(chunk);
                    rgba.push(255);
                }
                rgba
            }
            gltf::image::Format::R8 => image::GrayImage::from_raw(width, height, image_data.pixels.clone())
                .map(|gray| image::DynamicImage::ImageLuma8(gray).to_rgba8().into_raw())?,
            other => {
                debug!("Skipping unsupported glTF image format {:?}", other);
                return None;
            }
        };

        Some(Self {
            width,
            height,
            data,
            format: TextureFormat::Rgba8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_expanded_to_rgba() {
        let data = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let tex = TextureAsset::from_gltf(&data).unwrap();
        assert_eq!(tex.data, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn gray_is_expanded_to_rgba() {
        let data = gltf::image::Data {
            pixels: vec![7],
            format: gltf::image::Format::R8,
            width: 1,
            height: 1,
        };
        let tex = TextureAsset::from_gltf(&data).unwrap();
        assert_eq!(tex.data, vec![7, 7, 7, 255]);
    }
}

//! Source texture management and image loading.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, info};

/// Errors produced while loading a source image.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Failed to read image {path}: {source}")]
    Io {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file was read but could not be decoded as an image.
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying decode error.
        source: image::ImageError,
    },
}

/// Decode an image file into RGBA pixels.
///
/// The caller decides what to do with the result; on failure the previous
/// texture stays in place.
pub fn load_image(path: &Path) -> std::result::Result<RgbaImage, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    info!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "image loaded"
    );
    Ok(rgba)
}

/// A GPU texture holding RGBA pixel data.
///
/// Used both for the warp source image and for the CPU-rendered preview.
/// Uploads replace the contents wholesale; the texture is recreated when
/// the dimensions change.
pub struct RgbaTexture {
    texture: wgpu::Texture,
    view: Arc<wgpu::TextureView>,
    width: u32,
    height: u32,
    label: &'static str,
}

impl RgbaTexture {
    /// Create a texture of the given size with undefined contents.
    pub fn new(device: &wgpu::Device, width: u32, height: u32, label: &'static str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = Arc::new(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        Self {
            texture,
            view,
            width,
            height,
            label,
        }
    }

    /// A 1x1 opaque blue texture, shown until the first image loads.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let mut tex = Self::new(device, 1, 1, "Source Texture");
        tex.upload_pixels(device, queue, &[0, 0, 255, 255], 1, 1);
        tex
    }

    /// Replace the texture contents with a decoded image.
    pub fn upload_image(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage) {
        self.upload_pixels(device, queue, image.as_raw(), image.width(), image.height());
    }

    /// Replace the texture contents with raw RGBA pixels.
    pub fn upload_pixels(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
    ) {
        if width != self.width || height != self.height {
            debug!(label = self.label, width, height, "recreating texture");
            *self = Self::new(device, width, height, self.label);
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// The texture view for binding.
    pub fn view(&self) -> &Arc<wgpu::TextureView> {
        &self.view
    }

    /// Texture width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Texture height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_image_reports_missing_file() {
        let err = load_image(Path::new("/nonexistent/image.png")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn load_image_reports_undecodable_data() {
        let dir = std::env::temp_dir().join("texwarp-texture-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("not_an_image.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }
}

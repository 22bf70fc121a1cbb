//! Offscreen render target with synchronous readback.
//!
//! The warp output is rendered into this target every frame; a capture
//! request reads back whatever the last render pass produced, so the saved
//! image matches the on-screen result at the moment of the request.

use image::RgbaImage;
use tracing::info;

use crate::{RenderError, Result};

/// Buffer row alignment required by `copy_texture_to_buffer`.
const ROW_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// Bytes per padded readback row for a given pixel width.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    (unpadded + ROW_ALIGNMENT - 1) / ROW_ALIGNMENT * ROW_ALIGNMENT
}

/// Offscreen RGBA render target that can be read back to the CPU.
pub struct FrameCapture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl FrameCapture {
    /// The texture format used for capture targets.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Create a capture target of the given size.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// The view to render into (and to blit onto the window surface).
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Target width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Target height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read the current target contents back into an image.
    ///
    /// Blocks until the copy completes. Rows are padded to the wgpu copy
    /// alignment on the GPU side and stripped here.
    pub fn read_to_image(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<RgbaImage> {
        let padded_row = padded_bytes_per_row(self.width);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback Buffer"),
            size: (padded_row * self.height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| RenderError::ReadbackError(e.to_string()))?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((self.width * self.height * 4) as usize);
        for row in data.chunks(padded_row as usize) {
            pixels.extend_from_slice(&row[..(self.width * 4) as usize]);
        }
        drop(data);
        buffer.unmap();

        let image = RgbaImage::from_raw(self.width, self.height, pixels).ok_or_else(|| {
            RenderError::ReadbackError("readback buffer size mismatch".to_string())
        })?;
        info!(width = self.width, height = self.height, "frame captured");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_padding_rounds_up_to_alignment() {
        // 2048 px * 4 bytes is already aligned.
        assert_eq!(padded_bytes_per_row(2048), 2048 * 4);
        // 1 px needs a full alignment block.
        assert_eq!(padded_bytes_per_row(1), ROW_ALIGNMENT);
        // 100 px * 4 = 400 -> next multiple of 256 is 512.
        assert_eq!(padded_bytes_per_row(100), 512);
    }
}

//! wgpu backend initialization.

use std::sync::Arc;

use tracing::info;

use crate::{RenderError, Result};

/// Owns the wgpu instance, device and queue.
pub struct WgpuBackend {
    /// The wgpu instance the surface must be created from.
    pub instance: Arc<wgpu::Instance>,
    /// The logical device.
    pub device: Arc<wgpu::Device>,
    /// The command queue.
    pub queue: Arc<wgpu::Queue>,
    /// Info about the selected adapter.
    pub adapter_info: wgpu::AdapterInfo,
}

impl WgpuBackend {
    /// Create a new wgpu backend.
    ///
    /// Tries the non-GL backends first; GL initialization can abort eagerly
    /// on headless systems, so it is only used as a fallback.
    pub async fn new() -> Result<Self> {
        let safe_backends = wgpu::Backends::all() & !wgpu::Backends::GL;
        match Self::new_with_backends(safe_backends).await {
            Ok(backend) => Ok(backend),
            Err(_) => {
                info!("Primary backend initialization failed, attempting GL fallback...");
                Self::new_with_backends(wgpu::Backends::GL).await
            }
        }
    }

    /// Create a backend restricted to the given wgpu backends.
    pub async fn new_with_backends(backends: wgpu::Backends) -> Result<Self> {
        info!("Initializing wgpu backend");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        // Prefer discrete over integrated over software adapters.
        let mut adapter = None;
        let mut best_score = -1;
        for a in instance.enumerate_adapters(backends) {
            let score = match a.get_info().device_type {
                wgpu::DeviceType::DiscreteGpu => 3,
                wgpu::DeviceType::IntegratedGpu => 2,
                wgpu::DeviceType::VirtualGpu => 1,
                wgpu::DeviceType::Cpu | wgpu::DeviceType::Other => 0,
            };
            if score > best_score {
                best_score = score;
                adapter = Some(a);
            }
        }

        if adapter.is_none() {
            adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok();
        }

        let adapter =
            adapter.ok_or_else(|| RenderError::DeviceError("No adapter found".to_string()))?;

        let adapter_info = adapter.get_info();
        info!(
            "Selected adapter: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("TexWarp Device"),
                ..Default::default()
            })
            .await
            .map_err(|e: wgpu::RequestDeviceError| RenderError::DeviceError(e.to_string()))?;

        info!("Device created successfully");

        Ok(Self {
            instance: Arc::new(instance),
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Create a surface for a window using the backend's instance.
    pub fn create_surface(
        &self,
        window: Arc<winit::window::Window>,
    ) -> Result<wgpu::Surface<'static>> {
        self.instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceError(format!("Failed to create surface: {e}")))
    }

    /// Get a reference to the device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get a reference to the queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

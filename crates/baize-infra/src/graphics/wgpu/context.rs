// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::anyhow;
use anyhow::Result;
use baize_core::renderer::ResourceError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Errors reported by wgpu outside of a call, waiting to be collected.
pub(crate) type ErrorSink = Arc<Mutex<VecDeque<ResourceError>>>;

/// Holds the WGPU state objects needed to own textures without a window.
///
/// The texture cache never presents anything, so no surface is created; the
/// context only wraps an adapter, its logical device and the command queue.
#[derive(Debug)]
pub struct WgpuHeadlessContext {
    #[allow(dead_code)]
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    // Store info for easy access
    pub adapter_name: String,
    pub adapter_backend: wgpu::Backend,
    pub active_device_features: wgpu::Features,
    pub device_limits: wgpu::Limits,
    pub anisotropy_supported: bool,

    pub(crate) errors: ErrorSink,
}

impl WgpuHeadlessContext {
    /// Selects the default adapter and creates a logical device on it.
    ///
    /// ## Returns
    /// * `Result<Self>` - The initialized context, or an error if no adapter
    ///   is available or the device request fails.
    pub fn new() -> Result<Self> {
        log::info!("Initializing headless WGPU context...");

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .map_err(|e| anyhow!("No suitable graphics adapter found: {}", e))?;
        Self::from_adapter(adapter)
    }

    /// Creates the logical device and queue on a pre-selected adapter.
    pub fn from_adapter(adapter: wgpu::Adapter) -> Result<Self> {
        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        // Border clamping is optional; the sampler falls back to edge clamping without it.
        let features_to_enable = adapter.features() & wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Baize Texture Device"),
            required_features: features_to_enable,
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;
        log::info!("Logical device and command queue created.");

        let errors: ErrorSink = Arc::new(Mutex::new(VecDeque::new()));
        let sink = Arc::clone(&errors);
        let handler: Box<dyn wgpu::UncapturedErrorHandler> = Box::new(move |e: wgpu::Error| {
            log::error!("WGPU Uncaptured Error: {e:?}");
            if let Ok(mut queue) = sink.lock() {
                queue.push_back(ResourceError::BackendError(e.to_string()));
            }
        });
        device.on_uncaptured_error(handler.into());

        let anisotropy_supported = adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::ANISOTROPIC_FILTERING);

        let active_device_features = device.features();
        let device_limits = device.limits();
        log::info!("Active device features: {active_device_features:?}");
        log::debug!("Device limits: {device_limits:?}");

        Ok(Self {
            adapter,
            device,
            queue,
            adapter_name: adapter_info.name,
            adapter_backend: adapter_info.backend,
            active_device_features,
            device_limits,
            anisotropy_supported,
            errors,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns `true` if samplers may use `ClampToBorder`.
    pub fn supports_border_clamp(&self) -> bool {
        self.active_device_features
            .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER)
    }
}

//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Surfaceの破棄の処理まで行うSurfaceHandleを定義する。

use crate::{Error, Result};
use ash::{extensions::khr, vk};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

/// vk::SurfaceKHRと、その破棄に使うloader
pub struct Surface {
    instance: crate::InstanceHandle,
    surface_loader: khr::Surface,
    surface: vk::SurfaceKHR,
}
impl Surface {
    pub(crate) fn create(
        instance: crate::InstanceHandle,
        raw_display_handle: RawDisplayHandle,
        raw_window_handle: RawWindowHandle,
    ) -> Result<crate::SurfaceHandle> {
        // surfaceの作成
        let (surface_loader, surface) = unsafe {
            let surface_loader = khr::Surface::new(instance.entry_raw(), instance.instance_raw());
            let surface = ash_window::create_surface(
                instance.entry_raw(),
                instance.instance_raw(),
                raw_display_handle,
                raw_window_handle,
                None,
            )
            .map_err(Error::creation("surface"))?;
            (surface_loader, surface)
        };

        Ok(crate::SharedHandle::new(Self {
            instance,
            surface_loader,
            surface,
        }))
    }
}
impl crate::Resource for Surface {
    type Raw = vk::SurfaceKHR;
    const NAME: &'static str = "surface";

    fn raw(&self) -> &vk::SurfaceKHR {
        &self.surface
    }

    unsafe fn destroy(&mut self) {
        self.surface_loader.destroy_surface(self.surface, None);
    }
}

/// vk::SurfaceKHRを参照カウントで管理するためのハンドル
pub type SurfaceHandle = crate::SharedHandle<Surface>;

impl SurfaceHandle {
    // surfaceの関数

    /// PhysicalDeviceがSurfaceをサポートしているか確認する
    pub fn get_physical_device_surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool> {
        let surface = self.resource();
        unsafe {
            surface.surface_loader.get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                surface.surface,
            )
        }
        .map_err(Error::vulkan("vkGetPhysicalDeviceSurfaceSupportKHR"))
    }

    /// Surfaceのcapabilitiesを取得する
    pub fn get_physical_device_surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<vk::SurfaceCapabilitiesKHR> {
        let surface = self.resource();
        unsafe {
            surface
                .surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface.surface)
        }
        .map_err(Error::vulkan("vkGetPhysicalDeviceSurfaceCapabilitiesKHR"))
    }

    /// Surfaceのフォーマットを取得する
    pub fn get_physical_device_surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Vec<vk::SurfaceFormatKHR>> {
        let surface = self.resource();
        unsafe {
            surface
                .surface_loader
                .get_physical_device_surface_formats(physical_device, surface.surface)
        }
        .map_err(Error::vulkan("vkGetPhysicalDeviceSurfaceFormatsKHR"))
    }

    /// Surfaceのpresent modeを取得する
    pub fn get_physical_device_surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Vec<vk::PresentModeKHR>> {
        let surface = self.resource();
        unsafe {
            surface
                .surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface.surface)
        }
        .map_err(Error::vulkan("vkGetPhysicalDeviceSurfacePresentModesKHR"))
    }

    /// InstanceHandleを取得する
    pub fn instance(&self) -> crate::InstanceHandle {
        self.resource().instance.clone()
    }
}

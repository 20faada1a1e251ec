//! 参照カウンタで管理して、参照がすべて破棄された際に
//! Instanceの破棄の処理まで行うInstanceHandleを定義する。

use crate::{AshDevice, Error, Result};
use ash::{extensions::ext::DebugUtils, vk};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::ffi::{CStr, CString};

#[cfg(feature = "validation")]
const ENABLE_VALIDATION_LAYERS: bool = true;
#[cfg(not(feature = "validation"))]
const ENABLE_VALIDATION_LAYERS: bool = false;

const VALIDATION_LAYER: &[u8] = b"VK_LAYER_KHRONOS_validation\0";

// debug utilsのコールバック関数
// validation layerのメッセージをtracingのレベルに振り分ける
unsafe extern "system" fn vulkan_debug_utils_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_types: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message).to_string_lossy();
    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            tracing::error!(target: "vulkan", "{:?} {}", message_types, message)
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            tracing::warn!(target: "vulkan", "{:?} {}", message_types, message)
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
            tracing::info!(target: "vulkan", "{:?} {}", message_types, message)
        }
        _ => tracing::trace!(target: "vulkan", "{:?} {}", message_types, message),
    }
    vk::FALSE
}

/// Instanceの作成のパラメータ
#[derive(Debug, Clone)]
pub struct InstanceDesc {
    /// アプリケーション名
    pub application_name: String,
    /// 使用するVulkanのAPIバージョン
    pub api_version: u32,
    /// surfaceを作る場合はdisplay handleを渡す。必要な拡張が有効になる。
    pub display_handle: Option<RawDisplayHandle>,
    /// validation layerとdebug messengerを有効にするかどうか
    pub enable_validation: bool,
    /// 追加で有効にするinstance拡張
    pub extensions: Vec<CString>,
}
impl Default for InstanceDesc {
    fn default() -> Self {
        Self {
            application_name: "ashkeeper".to_string(),
            api_version: vk::API_VERSION_1_3,
            display_handle: None,
            enable_validation: ENABLE_VALIDATION_LAYERS,
            extensions: vec![],
        }
    }
}

/// ash::InstanceとDebugUtilsのmessenger
pub struct Instance {
    entry: ash::Entry,
    instance: ash::Instance,
    handle: vk::Instance,
    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}
impl crate::Resource for Instance {
    type Raw = vk::Instance;
    const NAME: &'static str = "instance";

    fn raw(&self) -> &vk::Instance {
        &self.handle
    }

    unsafe fn destroy(&mut self) {
        if let Some((loader, messenger)) = self.debug_utils.take() {
            loader.destroy_debug_utils_messenger(messenger, None);
        }
        self.instance.destroy_instance(None);
    }
}

/// vk::Instanceを参照カウントで管理するためのハンドル
pub type InstanceHandle = crate::SharedHandle<Instance>;

impl InstanceHandle {
    /// Vulkanのローダーを読み込んでInstanceを作成する
    ///
    /// application_nameに途中のNULが含まれている場合はローダーを読み込む前に`InvalidName`を返す。
    pub fn create(desc: &InstanceDesc) -> Result<Self> {
        let app_name = CString::new(desc.application_name.as_str())?;
        let entry = unsafe { ash::Entry::load()? };

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(&app_name)
            .api_version(desc.api_version);

        let mut debug_utils_messenger_create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
            )
            .pfn_user_callback(Some(vulkan_debug_utils_callback))
            .build();

        // 拡張
        let mut extension_names = desc
            .extensions
            .iter()
            .map(|name| name.as_ptr())
            .collect::<Vec<_>>();
        if let Some(display_handle) = desc.display_handle {
            let required = ash_window::enumerate_required_extensions(display_handle)
                .map_err(Error::creation("instance"))?;
            extension_names.extend_from_slice(required);
        }
        if desc.enable_validation {
            extension_names.push(DebugUtils::name().as_ptr());
        }
        let layer_names = [VALIDATION_LAYER.as_ptr() as *const std::ffi::c_char];

        let instance_create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_names);
        let instance_create_info = if desc.enable_validation {
            instance_create_info
                .push_next(&mut debug_utils_messenger_create_info)
                .enabled_layer_names(&layer_names)
        } else {
            instance_create_info
        };
        let instance = unsafe { entry.create_instance(&instance_create_info, None) }
            .map_err(Error::creation("instance"))?;

        let mut pending = crate::PendingHandle::new(Instance {
            handle: instance.handle(),
            entry,
            instance,
            debug_utils: None,
        });

        // setup debug utils
        if desc.enable_validation {
            let instance = pending.resource_mut();
            let loader = DebugUtils::new(&instance.entry, &instance.instance);
            let messenger = unsafe {
                loader.create_debug_utils_messenger(&debug_utils_messenger_create_info, None)
            }
            .map_err(Error::creation("debug utils messenger"))?;
            instance.debug_utils = Some((loader, messenger));
        }

        Ok(pending.share())
    }

    // create系

    /// DeviceHandleを作成する
    pub fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        device_create_info: &vk::DeviceCreateInfo,
    ) -> Result<crate::DeviceHandle> {
        let raw = unsafe {
            AshDevice::new(
                &self.resource().instance,
                physical_device,
                device_create_info,
            )
        }
        .map_err(Error::creation("device"))?;
        Ok(crate::DeviceHandle::with_instance(self.clone(), raw))
    }

    /// SurfaceHandleを作成する
    pub fn create_surface(
        &self,
        raw_display_handle: RawDisplayHandle,
        raw_window_handle: RawWindowHandle,
    ) -> Result<crate::SurfaceHandle> {
        crate::Surface::create(self.clone(), raw_display_handle, raw_window_handle)
    }

    // instanceの各関数

    /// PhysicalDeviceを列挙する
    pub fn enumerate_physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>> {
        unsafe { self.resource().instance.enumerate_physical_devices() }
            .map_err(Error::vulkan("vkEnumeratePhysicalDevices"))
    }

    /// PhysicalDeviceのプロパティを取得する
    pub fn get_physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        unsafe {
            self.resource()
                .instance
                .get_physical_device_properties(physical_device)
        }
    }

    /// PhysicalDeviceのキューファミリーのプロパティを取得する
    pub fn get_physical_device_queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        unsafe {
            self.resource()
                .instance
                .get_physical_device_queue_family_properties(physical_device)
        }
    }

    /// PhysicalDeviceのメモリのプロパティを取得する
    pub fn get_physical_device_memory_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceMemoryProperties {
        unsafe {
            self.resource()
                .instance
                .get_physical_device_memory_properties(physical_device)
        }
    }

    // raw

    /// ash::Entryを取得する
    /// ## Safety
    /// 参照カウントの管理から中身を取り出すので注意。
    /// Handleが破棄されると、この関数で取り出したash::Entryで作ったオブジェクトは無効になる。
    pub unsafe fn entry_raw(&self) -> &ash::Entry {
        &self.resource().entry
    }

    /// ash::Instanceを取得する
    /// ## Safety
    /// 参照カウントの管理から中身を取り出すので注意。
    /// Handleが破棄されると、この関数で取り出したash::Instanceは無効になる。
    pub unsafe fn instance_raw(&self) -> &ash::Instance {
        &self.resource().instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_name_with_nul_is_rejected() {
        let err = InstanceHandle::create(&InstanceDesc {
            application_name: "bad\0name".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
    }
}

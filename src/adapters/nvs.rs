//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ProfileStore`] and [`ConfigPort`] for the oven controller.
//!
//! - The profile selection is a single byte under the `"profile"` key, so
//!   the oven wakes up in the profile it was last used with.
//! - The controller configuration is a postcard blob under `"ovencfg"`,
//!   range-checked before every write.
//!
//! Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`; the
//! in-memory simulation backend achieves this trivially.

use crate::app::ports::{ConfigError, ConfigPort, ProfileStore, StoreError};
use crate::config::OvenConfig;
use crate::profile::Profile;
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const NAMESPACE: &str = "ovenpilot";
const KEY_PROFILE: &str = "profile";
const KEY_CONFIG: &str = "ovencfg";

#[allow(dead_code)] // sized for the ESP-IDF blob read path
const MAX_BLOB_SIZE: usize = 1024;

#[derive(Default)]
pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new adapter and initialise NVS flash.
    ///
    /// On first boot or after a partition-version mismatch the NVS partition
    /// is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                log::warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self::default())
    }

    // ── Blob primitives ───────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, key: &str) -> Option<Vec<u8>> {
        self.store
            .borrow()
            .get(&format!("{}::{}", NAMESPACE, key))
            .cloned()
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, key: &str, data: &[u8]) -> bool {
        self.store
            .borrow_mut()
            .insert(format!("{}::{}", NAMESPACE, key), data.to_vec());
        true
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, key: &str) -> Option<Vec<u8>> {
        let mut key_buf = [0u8; 16];
        let kb = key.as_bytes();
        let len = kb.len().min(15);
        key_buf[..len].copy_from_slice(&kb[..len]);

        Self::with_nvs_handle(false, |handle| {
            let mut size: usize = MAX_BLOB_SIZE;
            let mut buf = vec![0u8; MAX_BLOB_SIZE];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            buf.truncate(size);
            Ok(buf)
        })
        .ok()
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&self, key: &str, data: &[u8]) -> bool {
        let mut key_buf = [0u8; 16];
        let kb = key.as_bytes();
        let len = kb.len().min(15);
        key_buf[..len].copy_from_slice(&kb[..len]);

        Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    data.as_ptr() as *const _,
                    data.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        })
        .is_ok()
    }
}

// ── ProfileStore implementation ───────────────────────────────

impl ProfileStore for NvsAdapter {
    fn load(&self) -> Result<Profile, StoreError> {
        let blob = self.read_blob(KEY_PROFILE).ok_or(StoreError::NotFound)?;
        let id = *blob.first().ok_or(StoreError::Corrupted)?;
        Profile::from_id(id).ok_or(StoreError::Corrupted)
    }

    fn save(&mut self, profile: Profile) -> Result<(), StoreError> {
        if self.write_blob(KEY_PROFILE, &[profile.id()]) {
            info!("profile {:?} persisted", profile);
            Ok(())
        } else {
            Err(StoreError::IoError)
        }
    }
}

// ── ConfigPort implementation ─────────────────────────────────

fn validate_config(cfg: &OvenConfig) -> Result<(), ConfigError> {
    if !(100..=10_000).contains(&cfg.window_size_ms) {
        return Err(ConfigError::ValidationFailed(
            "window_size_ms must be 100–10000",
        ));
    }
    if !(100..=5_000).contains(&cfg.sensor_sampling_ms) {
        return Err(ConfigError::ValidationFailed(
            "sensor_sampling_ms must be 100–5000",
        ));
    }
    if !(10..=1_000).contains(&cfg.debounce_period_ms) {
        return Err(ConfigError::ValidationFailed(
            "debounce_period_ms must be 10–1000",
        ));
    }
    if cfg.room_temp_c <= 0.0 || cfg.room_temp_c >= cfg.cool_min_c {
        return Err(ConfigError::ValidationFailed(
            "room_temp_c must be positive and below cool_min_c",
        ));
    }
    if cfg.cool_min_c >= cfg.soak_min_c {
        return Err(ConfigError::ValidationFailed(
            "cool_min_c must be below soak_min_c",
        ));
    }
    if !(1.0..=25.0).contains(&cfg.soak_step_c) {
        return Err(ConfigError::ValidationFailed("soak_step_c must be 1–25"));
    }
    for gains in [
        cfg.preheat_gains,
        cfg.soak_gains,
        cfg.reflow_gains,
        cfg.bake_gains,
    ] {
        if gains.kp < 0.0 || gains.ki < 0.0 || gains.kd < 0.0 {
            return Err(ConfigError::ValidationFailed("gains must be non-negative"));
        }
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<OvenConfig, ConfigError> {
        let blob = self.read_blob(KEY_CONFIG).ok_or(ConfigError::NotFound)?;
        let cfg: OvenConfig =
            postcard::from_bytes(&blob).map_err(|_| ConfigError::Corrupted)?;
        validate_config(&cfg)?;
        Ok(cfg)
    }

    fn save(&self, config: &OvenConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let blob = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if self.write_blob(KEY_CONFIG, &blob) {
            Ok(())
        } else {
            Err(ConfigError::IoError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_round_trips_through_storage() {
        let mut nvs = NvsAdapter::new().unwrap();
        ProfileStore::save(&mut nvs, Profile::Leaded).unwrap();
        assert_eq!(ProfileStore::load(&nvs), Ok(Profile::Leaded));
    }

    #[test]
    fn missing_profile_reports_not_found() {
        let nvs = NvsAdapter::new().unwrap();
        assert_eq!(ProfileStore::load(&nvs), Err(StoreError::NotFound));
    }

    #[test]
    fn garbage_profile_byte_reports_corrupted() {
        let nvs = NvsAdapter::new().unwrap();
        assert!(nvs.write_blob(KEY_PROFILE, &[7]));
        assert_eq!(ProfileStore::load(&nvs), Err(StoreError::Corrupted));
    }

    #[test]
    fn config_round_trips_through_storage() {
        let nvs = NvsAdapter::new().unwrap();
        let mut cfg = OvenConfig::default();
        cfg.bake_temp_c = 110.0;
        ConfigPort::save(&nvs, &cfg).unwrap();
        let loaded = ConfigPort::load(&nvs).unwrap();
        assert_eq!(loaded.bake_temp_c, 110.0);
    }

    #[test]
    fn invalid_config_is_rejected_not_clamped() {
        let nvs = NvsAdapter::new().unwrap();
        let mut cfg = OvenConfig::default();
        cfg.room_temp_c = 500.0; // would disable the too-hot guard
        assert!(matches!(
            ConfigPort::save(&nvs, &cfg),
            Err(ConfigError::ValidationFailed(_))
        ));
    }
}

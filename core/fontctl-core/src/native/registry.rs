use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS, WIN32_ERROR};
use windows::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegEnumValueW, RegOpenKeyExW, RegQueryValueExW,
    RegSetValueExW, HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE,
    REG_EXPAND_SZ, REG_SZ, REG_VALUE_TYPE,
};

use super::wide;
use crate::error::{FontCtlError, Result};
use crate::registry::{FontsKey, RegistryBackend, Scope, FONTS_KEY_PATH};
use crate::resource::decode_utf16z;

/// Longest value name the registry allows, plus the terminator.
const MAX_VALUE_NAME: usize = 16_384;

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsRegistry;

impl RegistryBackend for WindowsRegistry {
    fn open_fonts_key(&self, scope: Scope) -> Result<Box<dyn FontsKey + '_>> {
        let root = match scope {
            Scope::User => HKEY_CURRENT_USER,
            Scope::Machine => HKEY_LOCAL_MACHINE,
        };
        let subkey = wide(FONTS_KEY_PATH);
        let mut hkey = HKEY::default();
        // SAFETY: `subkey` is NUL terminated, `hkey` is a valid out pointer.
        let status = unsafe {
            RegOpenKeyExW(
                root,
                PCWSTR(subkey.as_ptr()),
                0,
                KEY_QUERY_VALUE | KEY_SET_VALUE,
                &mut hkey,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(FontCtlError::RegistryAccessDenied {
                key: format!(r"{}\{FONTS_KEY_PATH}", scope.hive()),
                native: status.0,
            });
        }
        Ok(Box::new(NativeFontsKey { hkey }))
    }
}

struct NativeFontsKey {
    hkey: HKEY,
}

impl Drop for NativeFontsKey {
    fn drop(&mut self) {
        // SAFETY: the handle was opened by us and is closed exactly once.
        let _ = unsafe { RegCloseKey(self.hkey) };
    }
}

fn check(status: WIN32_ERROR, op: &'static str, name: &str) -> Result<()> {
    if status == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(FontCtlError::Registry {
            op,
            name: name.to_string(),
            native: status.0,
        })
    }
}

impl FontsKey for NativeFontsKey {
    fn value_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut buf = vec![0u16; MAX_VALUE_NAME];
        for index in 0u32.. {
            let mut len = buf.len() as u32;
            // SAFETY: `buf` holds `len` UTF-16 units.
            let status = unsafe {
                RegEnumValueW(
                    self.hkey,
                    index,
                    PWSTR(buf.as_mut_ptr()),
                    &mut len,
                    None,
                    None,
                    None,
                    None,
                )
            };
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            check(status, "enumerate", "")?;
            names.push(String::from_utf16_lossy(&buf[..len as usize]));
        }
        Ok(names)
    }

    fn string_value(&self, name: &str) -> Result<String> {
        let value_name = wide(name);
        let mut kind = REG_VALUE_TYPE::default();
        let mut size = 0u32;
        // SAFETY: size query, no data pointer.
        let status = unsafe {
            RegQueryValueExW(
                self.hkey,
                PCWSTR(value_name.as_ptr()),
                None,
                Some(&mut kind as *mut REG_VALUE_TYPE),
                None,
                Some(&mut size as *mut u32),
            )
        };
        if status != ERROR_SUCCESS && status != ERROR_MORE_DATA {
            check(status, "read", name)?;
        }
        if kind != REG_SZ && kind != REG_EXPAND_SZ {
            return Err(FontCtlError::Registry {
                op: "read string",
                name: name.to_string(),
                native: 0,
            });
        }

        let mut data = vec![0u8; size as usize];
        // SAFETY: `data` holds `size` bytes.
        let status = unsafe {
            RegQueryValueExW(
                self.hkey,
                PCWSTR(value_name.as_ptr()),
                None,
                None,
                Some(data.as_mut_ptr()),
                Some(&mut size as *mut u32),
            )
        };
        check(status, "read", name)?;
        data.truncate(size as usize);
        Ok(decode_utf16z(&data))
    }

    fn set_string_value(&mut self, name: &str, value: &str) -> Result<()> {
        let value_name = wide(name);
        let data: Vec<u8> = wide(value)
            .into_iter()
            .flat_map(u16::to_le_bytes)
            .collect();
        // SAFETY: both buffers outlive the call.
        let status = unsafe {
            RegSetValueExW(
                self.hkey,
                PCWSTR(value_name.as_ptr()),
                0,
                REG_SZ,
                Some(data.as_slice()),
            )
        };
        check(status, "set", name)
    }

    fn delete_value(&mut self, name: &str) -> Result<()> {
        let value_name = wide(name);
        // SAFETY: `value_name` is NUL terminated.
        let status = unsafe { RegDeleteValueW(self.hkey, PCWSTR(value_name.as_ptr())) };
        check(status, "delete", name)
    }
}

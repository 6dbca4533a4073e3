use crate::position::OffsetEncoding;
use serde::{Deserialize, Serialize};

/// Default permission bits for files written by the engine
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Settings shared by every apply call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplyConfig {
    /// Unit of `Position::character`
    pub encoding: OffsetEncoding,
    /// Permission bits for created files (Unix only)
    pub file_mode: u32,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            encoding: OffsetEncoding::default(),
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

/// Parse an octal permission string such as `644` or `0o600`
pub fn parse_file_mode(value: &str) -> Result<u32, String> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|e| format!("invalid octal file mode `{value}`: {e}"))?;
    if mode > 0o7777 {
        return Err(format!("file mode `{value}` is out of range"));
    }
    Ok(mode)
}

use crate::error::{CanisterError, Result};
use serde::Deserialize;

const DEFAULT_MAX_DEPTH: usize = 256;
const MAX_DEPTH_LIMIT: usize = 4096;

/// Engine settings.
///
/// `detect_cycles` reports a key that is requested again inside its own
/// resolution chain as [`CanisterError::CyclicDependency`]. With detection off,
/// runaway recursion is still cut at `max_depth`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanisterConfig {
    pub max_depth: usize,
    pub detect_cycles: bool,
}

impl Default for CanisterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detect_cycles: true,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    max_depth: Option<usize>,
    detect_cycles: Option<bool>,
}

impl CanisterConfig {
    /// Parse JSON or TOML. Missing fields keep their defaults.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = parse_raw(bytes)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text)
            .map_err(|err| CanisterError::Config(format!("TOML parse error: {err}")))?;
        Ok(Self::from_raw(raw))
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = clamp_depth(max_depth);
        self
    }

    #[must_use]
    pub fn with_cycle_detection(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }

    fn from_raw(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            max_depth: clamp_depth(raw.max_depth.unwrap_or(defaults.max_depth)),
            detect_cycles: raw.detect_cycles.unwrap_or(defaults.detect_cycles),
        }
    }
}

fn clamp_depth(raw: usize) -> usize {
    raw.clamp(1, MAX_DEPTH_LIMIT)
}

fn parse_raw(bytes: &[u8]) -> Result<RawConfig> {
    match serde_json::from_slice(bytes) {
        Ok(raw) => Ok(raw),
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes)
                .map_err(|err| CanisterError::Config(format!("{json_err}; {err}")))?;
            toml::from_str(utf8).map_err(|toml_err| {
                CanisterError::Config(format!(
                    "Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                ))
            })
        }
    }
}

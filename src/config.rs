// SPDX-License-Identifier: GPL-3.0-only

use tracing::debug;

const DEFAULT_SEAT_NAME: &str = "seat0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SEATMUX_SEAT_NAME must not be empty")]
    EmptySeatName,
    #[error("SEATMUX_SEAT_NAME is not valid unicode")]
    NotUnicode,
}

/// Seat configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatConfig {
    /// Name advertised through `wl_seat.name`
    pub seat_name: String,
}

impl Default for SeatConfig {
    fn default() -> Self {
        Self {
            seat_name: DEFAULT_SEAT_NAME.to_string(),
        }
    }
}

impl SeatConfig {
    /// Read the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Result<String, std::env::VarError>,
    ) -> Result<Self, ConfigError> {
        let seat_name = match lookup("SEATMUX_SEAT_NAME") {
            Ok(name) if name.trim().is_empty() => return Err(ConfigError::EmptySeatName),
            Ok(name) => name.trim().to_string(),
            Err(std::env::VarError::NotPresent) => DEFAULT_SEAT_NAME.to_string(),
            Err(std::env::VarError::NotUnicode(_)) => return Err(ConfigError::NotUnicode),
        };

        debug!(%seat_name, "Loaded seat configuration");
        Ok(Self { seat_name })
    }
}

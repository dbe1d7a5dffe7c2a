use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Chart kind selected on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotType {
    #[default]
    Close,
    Volume,
    MovingAverage,
    VolumeWeighted,
}

impl PlotType {
    pub const ALL: [Self; 4] = [
        Self::Close,
        Self::Volume,
        Self::MovingAverage,
        Self::VolumeWeighted,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Volume => "volume",
            Self::MovingAverage => "moving_average",
            Self::VolumeWeighted => "volume_weighted",
        }
    }
}

impl Display for PlotType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|plot_type| plot_type.as_str() == normalized)
            .ok_or(ValidationError::InvalidPlotType { value: normalized })
    }
}

/// Moving-average window in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u16")]
pub struct MaWindow(u16);

impl MaWindow {
    pub const MIN: u16 = 10;
    pub const MAX: u16 = 300;
    /// Window the service applies when none is sent; the client always sends one.
    pub const DEFAULT: Self = Self(20);

    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value < u32::from(Self::MIN) || value > u32::from(Self::MAX) {
            return Err(ValidationError::WindowOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value as u16))
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl Default for MaWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for MaWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for MaWindow {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaWindow> for u16 {
    fn from(value: MaWindow) -> Self {
        value.0
    }
}

/// Request-side plot selection; only the moving average carries a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotSpec {
    Close,
    Volume,
    MovingAverage { window: MaWindow },
    VolumeWeighted,
}

impl PlotSpec {
    pub fn new(plot_type: PlotType, window: MaWindow) -> Self {
        match plot_type {
            PlotType::Close => Self::Close,
            PlotType::Volume => Self::Volume,
            PlotType::MovingAverage => Self::MovingAverage { window },
            PlotType::VolumeWeighted => Self::VolumeWeighted,
        }
    }

    pub const fn plot_type(self) -> PlotType {
        match self {
            Self::Close => PlotType::Close,
            Self::Volume => PlotType::Volume,
            Self::MovingAverage { .. } => PlotType::MovingAverage,
            Self::VolumeWeighted => PlotType::VolumeWeighted,
        }
    }

    pub const fn window(self) -> Option<MaWindow> {
        match self {
            Self::MovingAverage { window } => Some(window),
            _ => None,
        }
    }
}

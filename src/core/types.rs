use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

const SIZE_EPSILON: f64 = 1e-9;

/// Width/height pair in host pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    /// `true` when at least one dimension is non-zero.
    #[must_use]
    pub fn has_area_hint(self) -> bool {
        self.width != 0.0 || self.height != 0.0
    }

    #[must_use]
    pub fn same_as(self, other: Self) -> bool {
        (self.width - other.width).abs() <= SIZE_EPSILON
            && (self.height - other.height).abs() <= SIZE_EPSILON
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ChartError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Axis-aligned component bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive hit test, matching how pointer positions on the edge count as inside.
    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Configured chart dimension: an explicit number or the `auto` sentinel
/// meaning "track the container".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(try_from = "SizeOptionRepr", into = "SizeOptionRepr")]
pub enum SizeOption {
    #[default]
    Auto,
    Fixed(f64),
}

impl SizeOption {
    #[must_use]
    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    #[must_use]
    pub fn fixed(self) -> Option<f64> {
        match self {
            Self::Auto => None,
            Self::Fixed(value) => Some(value),
        }
    }

    /// Resolves the effective dimension against the observed container dimension.
    #[must_use]
    pub fn resolve(self, container: f64) -> f64 {
        match self {
            Self::Auto => container,
            Self::Fixed(value) => value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SizeOptionRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<SizeOptionRepr> for SizeOption {
    type Error = String;

    fn try_from(value: SizeOptionRepr) -> Result<Self, Self::Error> {
        match value {
            SizeOptionRepr::Number(number) if number.is_finite() && number >= 0.0 => {
                Ok(Self::Fixed(number))
            }
            SizeOptionRepr::Number(number) => Err(format!("invalid chart dimension `{number}`")),
            SizeOptionRepr::Text(text) if text == "auto" => Ok(Self::Auto),
            SizeOptionRepr::Text(text) => Err(format!("unsupported size sentinel `{text}`")),
        }
    }
}

impl From<SizeOption> for SizeOptionRepr {
    fn from(value: SizeOption) -> Self {
        match value {
            SizeOption::Auto => Self::Text("auto".to_owned()),
            SizeOption::Fixed(number) => Self::Number(number),
        }
    }
}

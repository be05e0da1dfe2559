// SPDX-License-Identifier: GPL-3.0-only

//! Visual filters
//!
//! A [`FilterSpec`] is an ordered chain of [`FilterOp`]s written in the same
//! syntax as CSS filter functions, e.g. `"sepia(100%) blur(3px)"`. The empty
//! chain is spelled `none`.
//!
//! The live UI owns the "current" filter and may change it between shots of a
//! burst. Captures read it through a [`FilterProvider`] at the moment of the
//! shot, so every photo carries the filter that was selected when it was taken.

pub mod cpu;

pub use cpu::apply_filter;

use crate::errors::FilterParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;

/// A single filter function
///
/// Amounts follow CSS conventions: `1.0` is "100%".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// Desaturate towards luminance (0.0 - 1.0)
    Grayscale(f32),
    /// Warm brownish tone (0.0 - 1.0)
    Sepia(f32),
    /// Gaussian blur, standard deviation in pixels
    Blur(f32),
    /// Linear brightness multiplier (1.0 = unchanged)
    Brightness(f32),
    /// Contrast around mid-gray (1.0 = unchanged)
    Contrast(f32),
    /// Invert colours (0.0 - 1.0)
    Invert(f32),
    /// Rotate hue, in degrees
    HueRotate(f32),
    /// Saturation multiplier (1.0 = unchanged)
    Saturate(f32),
}

impl FilterOp {
    fn name(&self) -> &'static str {
        match self {
            FilterOp::Grayscale(_) => "grayscale",
            FilterOp::Sepia(_) => "sepia",
            FilterOp::Blur(_) => "blur",
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Invert(_) => "invert",
            FilterOp::HueRotate(_) => "hue-rotate",
            FilterOp::Saturate(_) => "saturate",
        }
    }

    fn parse(name: &str, arg: &str) -> Result<Self, FilterParseError> {
        let invalid = || FilterParseError::InvalidArgument {
            function: name.to_string(),
            argument: arg.to_string(),
        };

        let op = match name {
            "grayscale" => FilterOp::Grayscale(parse_amount(arg).ok_or_else(invalid)?),
            "sepia" => FilterOp::Sepia(parse_amount(arg).ok_or_else(invalid)?),
            "invert" => FilterOp::Invert(parse_amount(arg).ok_or_else(invalid)?),
            "brightness" => FilterOp::Brightness(parse_amount(arg).ok_or_else(invalid)?),
            "contrast" => FilterOp::Contrast(parse_amount(arg).ok_or_else(invalid)?),
            "saturate" => FilterOp::Saturate(parse_amount(arg).ok_or_else(invalid)?),
            "blur" => FilterOp::Blur(parse_length(arg).ok_or_else(invalid)?),
            "hue-rotate" => FilterOp::HueRotate(parse_angle(arg).ok_or_else(invalid)?),
            other => return Err(FilterParseError::UnknownFunction(other.to_string())),
        };
        Ok(op)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterOp::Grayscale(a) | FilterOp::Sepia(a) | FilterOp::Invert(a) => {
                write!(f, "{}({}%)", self.name(), a * 100.0)
            }
            FilterOp::Brightness(a) | FilterOp::Contrast(a) | FilterOp::Saturate(a) => {
                write!(f, "{}({})", self.name(), a)
            }
            FilterOp::Blur(px) => write!(f, "blur({}px)", px),
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", deg),
        }
    }
}

/// `"100%"` → 1.0, `"1.5"` → 1.5; negative amounts are invalid
fn parse_amount(arg: &str) -> Option<f32> {
    let value = match arg.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f32>().ok()? / 100.0,
        None => arg.parse::<f32>().ok()?,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// `"3px"` or `"3"`
fn parse_length(arg: &str) -> Option<f32> {
    let value = arg.strip_suffix("px").unwrap_or(arg).trim().parse::<f32>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// `"90deg"`, `"0.25turn"`, `"1.57rad"` or a bare number of degrees
fn parse_angle(arg: &str) -> Option<f32> {
    let (number, scale) = if let Some(n) = arg.strip_suffix("deg") {
        (n, 1.0)
    } else if let Some(n) = arg.strip_suffix("turn") {
        (n, 360.0)
    } else if let Some(n) = arg.strip_suffix("rad") {
        (n, 180.0 / std::f32::consts::PI)
    } else {
        (arg, 1.0)
    };
    let value = number.trim().parse::<f32>().ok()? * scale;
    value.is_finite().then_some(value)
}

/// Composable filter description
///
/// Immutable once attached to a captured photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilterSpec {
    ops: Vec<FilterOp>,
}

impl FilterSpec {
    /// The identity filter (`none`)
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    pub fn is_none(&self) -> bool {
        self.ops.is_empty()
    }
}

impl FromStr for FilterSpec {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            return Ok(Self::none());
        }

        let mut ops = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| FilterParseError::Malformed(text.to_string()))?;
            let close = rest
                .find(')')
                .filter(|&close| close > open)
                .ok_or_else(|| FilterParseError::Malformed(text.to_string()))?;

            let name = rest[..open].trim().to_ascii_lowercase();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(FilterParseError::Malformed(text.to_string()));
            }
            let arg = rest[open + 1..close].trim();
            ops.push(FilterOp::parse(&name, arg)?);

            rest = rest[close + 1..].trim_start();
        }

        Ok(Self { ops })
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for FilterSpec {
    type Error = FilterParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterSpec> for String {
    fn from(spec: FilterSpec) -> Self {
        spec.to_string()
    }
}

impl From<FilterOp> for FilterSpec {
    fn from(op: FilterOp) -> Self {
        Self { ops: vec![op] }
    }
}

/// Named filters offered in the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterPreset {
    /// No filter applied
    #[default]
    Normal,
    Grayscale,
    Sepia,
    Blur,
    /// Brightness boost
    Bright,
    /// High contrast
    Contrast,
    Invert,
    /// Quarter-turn hue shift
    HueRotate,
}

impl FilterPreset {
    /// All presets in picker order
    pub const ALL: [FilterPreset; 8] = [
        FilterPreset::Normal,
        FilterPreset::Grayscale,
        FilterPreset::Sepia,
        FilterPreset::Blur,
        FilterPreset::Bright,
        FilterPreset::Contrast,
        FilterPreset::Invert,
        FilterPreset::HueRotate,
    ];

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterPreset::Normal => "Normal",
            FilterPreset::Grayscale => "Grayscale",
            FilterPreset::Sepia => "Sepia",
            FilterPreset::Blur => "Blur",
            FilterPreset::Bright => "Bright",
            FilterPreset::Contrast => "Contrast",
            FilterPreset::Invert => "Invert",
            FilterPreset::HueRotate => "Hue Rotate",
        }
    }

    /// The filter chain this preset stands for
    pub fn spec(&self) -> FilterSpec {
        match self {
            FilterPreset::Normal => FilterSpec::none(),
            FilterPreset::Grayscale => FilterOp::Grayscale(1.0).into(),
            FilterPreset::Sepia => FilterOp::Sepia(1.0).into(),
            FilterPreset::Blur => FilterOp::Blur(3.0).into(),
            FilterPreset::Bright => FilterOp::Brightness(1.5).into(),
            FilterPreset::Contrast => FilterOp::Contrast(2.0).into(),
            FilterPreset::Invert => FilterOp::Invert(1.0).into(),
            FilterPreset::HueRotate => FilterOp::HueRotate(90.0).into(),
        }
    }

    /// Case-insensitive lookup by display name, ignoring spaces and dashes
    pub fn from_name(name: &str) -> Option<Self> {
        let key = |s: &str| {
            s.chars()
                .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
                .collect::<String>()
                .to_ascii_lowercase()
        };
        let wanted = key(name);
        Self::ALL
            .into_iter()
            .find(|p| key(p.display_name()) == wanted)
            .or_else(|| (wanted == "none").then_some(FilterPreset::Normal))
    }
}

/// Accessor for the currently selected filter
///
/// Called once per shot, immediately before the frame is drawn.
pub trait FilterProvider: Send + Sync {
    fn current_filter(&self) -> FilterSpec;
}

/// A fixed filter for the whole burst
impl FilterProvider for FilterSpec {
    fn current_filter(&self) -> FilterSpec {
        self.clone()
    }
}

/// Live filter published by the UI through a watch channel
impl FilterProvider for watch::Receiver<FilterSpec> {
    fn current_filter(&self) -> FilterSpec {
        self.borrow().clone()
    }
}

/// Adapter for closures returning the current filter
pub struct FnFilterProvider<F>(pub F);

impl<F> FilterProvider for FnFilterProvider<F>
where
    F: Fn() -> FilterSpec + Send + Sync,
{
    fn current_filter(&self) -> FilterSpec {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_none() {
        assert!("none".parse::<FilterSpec>().unwrap().is_none());
        assert!("".parse::<FilterSpec>().unwrap().is_none());
    }

    #[test]
    fn test_parse_chain() {
        let spec: FilterSpec = "sepia(100%) blur(3px) hue-rotate(0.25turn)".parse().unwrap();
        assert_eq!(
            spec.ops(),
            &[
                FilterOp::Sepia(1.0),
                FilterOp::Blur(3.0),
                FilterOp::HueRotate(90.0)
            ]
        );
    }

    #[test]
    fn test_display_matches_css() {
        assert_eq!(FilterPreset::Sepia.spec().to_string(), "sepia(100%)");
        assert_eq!(FilterPreset::Bright.spec().to_string(), "brightness(1.5)");
        assert_eq!(FilterPreset::HueRotate.spec().to_string(), "hue-rotate(90deg)");
        assert_eq!(FilterPreset::Normal.spec().to_string(), "none");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "wobble(2)".parse::<FilterSpec>(),
            Err(FilterParseError::UnknownFunction(_))
        ));
        assert!(matches!(
            "blur(lots)".parse::<FilterSpec>(),
            Err(FilterParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            "sepia(100%".parse::<FilterSpec>(),
            Err(FilterParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(FilterPreset::from_name("hue-rotate"), Some(FilterPreset::HueRotate));
        assert_eq!(FilterPreset::from_name("SEPIA"), Some(FilterPreset::Sepia));
        assert_eq!(FilterPreset::from_name("none"), Some(FilterPreset::Normal));
        assert_eq!(FilterPreset::from_name("vintage"), None);
    }

    #[test]
    fn test_watch_provider_reads_latest() {
        let (tx, rx) = watch::channel(FilterSpec::none());
        assert!(rx.current_filter().is_none());
        tx.send_replace(FilterPreset::Sepia.spec());
        assert_eq!(rx.current_filter(), FilterPreset::Sepia.spec());
    }
}

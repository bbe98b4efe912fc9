//! Animation and export settings, plus the persisted studio configuration.

use std::fmt;
use std::str::FromStr;

use crate::sizing::DEFAULT_FONT_SIZE;
use crate::surface::GridType;
use crate::SourceType;

pub const MIN_FRAME_RATE: u32 = 1;
pub const MAX_FRAME_RATE: u32 = 60;

/// Playback settings edited in the animation panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimationSettings {
    /// Number of frames exported for animated sources
    pub animation_length: usize,
    /// Playback rate in frames per second
    pub frame_rate: u32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            animation_length: 60,
            frame_rate: 30,
        }
    }
}

/// Partial update of [`AnimationSettings`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub animation_length: Option<usize>,
    pub frame_rate: Option<u32>,
}

impl SettingsUpdate {
    /// Update from the raw text of the animation length field.
    pub fn animation_length_input(input: &str) -> Self {
        Self {
            animation_length: Some(parse_numeric_field(input) as usize),
            ..Self::default()
        }
    }

    /// Update from the raw text of the frame rate field.
    pub fn frame_rate_input(input: &str) -> Self {
        Self {
            frame_rate: Some(parse_numeric_field(input)),
            ..Self::default()
        }
    }
}

impl AnimationSettings {
    /// Apply the fields present in `update`, keeping values in range.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(length) = update.animation_length {
            self.animation_length = length.max(1);
        }
        if let Some(rate) = update.frame_rate {
            self.frame_rate = rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE);
        }
    }

    /// Copy with every field clamped to its valid range.
    pub fn normalized(self) -> Self {
        let mut settings = Self::default();
        settings.apply(SettingsUpdate {
            animation_length: Some(self.animation_length),
            frame_rate: Some(self.frame_rate),
        });
        settings
    }
}

/// Parse a numeric text field.
///
/// Reads the leading integer (after optional whitespace and sign) and falls
/// back to 1 for empty, non-numeric, zero, or negative input.
///
/// ```rust
/// use ascii_studio_core::settings::parse_numeric_field;
///
/// assert_eq!(parse_numeric_field("24"), 24);
/// assert_eq!(parse_numeric_field(" 12fps"), 12);
/// assert_eq!(parse_numeric_field(""), 1);
/// assert_eq!(parse_numeric_field("-3"), 1);
/// ```
pub fn parse_numeric_field(input: &str) -> u32 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let leading: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if negative || leading.is_empty() {
        return 1;
    }
    match leading.parse::<u32>() {
        Ok(0) => 1,
        Ok(value) => value,
        // Only digits, so the value overflowed
        Err(_) => u32::MAX,
    }
}

/// Output format of an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExportFormat {
    /// Zip of numbered PNG frames
    Frames,
    Png,
    Svg,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Frames => "frames",
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    /// Label shown in the format selector.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Frames => "PNGs",
            ExportFormat::Png => "PNG",
            ExportFormat::Svg => "SVG",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frames" => Ok(ExportFormat::Frames),
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raster scale factor of PNG exports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExportScale {
    #[cfg_attr(feature = "serde", serde(rename = "1x"))]
    X1,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "2x"))]
    X2,
    #[cfg_attr(feature = "serde", serde(rename = "3x"))]
    X3,
    #[cfg_attr(feature = "serde", serde(rename = "4x"))]
    X4,
}

impl ExportScale {
    /// Options offered in the quality selector.
    pub const ALL: [ExportScale; 4] = [
        ExportScale::X1,
        ExportScale::X2,
        ExportScale::X3,
        ExportScale::X4,
    ];

    #[inline]
    pub fn factor(self) -> u32 {
        match self {
            ExportScale::X1 => 1,
            ExportScale::X2 => 2,
            ExportScale::X3 => 3,
            ExportScale::X4 => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportScale::X1 => "1x",
            ExportScale::X2 => "2x",
            ExportScale::X3 => "3x",
            ExportScale::X4 => "4x",
        }
    }
}

impl FromStr for ExportScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1x" => Ok(ExportScale::X1),
            "2x" => Ok(ExportScale::X2),
            "3x" => Ok(ExportScale::X3),
            "4x" => Ok(ExportScale::X4),
            other => Err(format!("unknown export scale: {other}")),
        }
    }
}

impl fmt::Display for ExportScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats offered for a source.
///
/// Multi-frame code and gif sources only export frame archives; everything
/// else exports a single SVG or PNG.
pub fn available_formats(source: SourceType, animation_length: usize) -> &'static [ExportFormat] {
    if matches!(source, SourceType::Code | SourceType::Gif) && animation_length > 1 {
        &[ExportFormat::Frames]
    } else {
        &[ExportFormat::Svg, ExportFormat::Png]
    }
}

/// Format selected whenever the source type or animation length changes.
pub fn default_format(source: SourceType, animation_length: usize) -> ExportFormat {
    if source.is_animated() && animation_length > 1 {
        ExportFormat::Frames
    } else {
        ExportFormat::Svg
    }
}

/// Label of the export button.
pub fn export_label(source: SourceType, format: ExportFormat) -> &'static str {
    match (source.is_animated(), format) {
        (true, ExportFormat::Frames) => "Export Frames",
        (true, _) => "Export Frame",
        (false, _) => "Export Image",
    }
}

/// Persisted studio configuration.
///
/// All fields default when missing so older files keep loading.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StudioConfig {
    pub animation: AnimationSettings,
    /// Preferred format; derived from the source when unset
    pub export_format: Option<ExportFormat>,
    pub export_scale: ExportScale,
    pub grid: GridType,
    pub font_size: f64,
    /// CSS color of the glyphs
    pub color: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            animation: AnimationSettings::default(),
            export_format: None,
            export_scale: ExportScale::default(),
            grid: GridType::None,
            font_size: DEFAULT_FONT_SIZE,
            color: "white".to_string(),
        }
    }
}

impl StudioConfig {
    /// Parse a TOML document, clamping out-of-range values.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let mut config: StudioConfig = toml::from_str(s)?;
        config.animation = config.animation.normalized();
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// Returns the default config if the file doesn't exist and an error if
    /// it exists but cannot be read or parsed.
    #[cfg(feature = "toml")]
    pub fn load(path: &std::path::Path) -> Result<Self, crate::error::ConfigError> {
        use crate::error::ConfigError;

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Format to use for `source`: the configured one if offered, else the default.
    pub fn format_for(&self, source: SourceType) -> ExportFormat {
        let length = self.animation.animation_length;
        match self.export_format {
            Some(format) if available_formats(source, length).contains(&format) => format,
            _ => default_format(source, length),
        }
    }
}

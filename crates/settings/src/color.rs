use std::fmt;

/// 24 位元 RGB 顏色。 / A 24-bit RGB color as stored in preference values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from the low 24 bits of `value` (`0xRRGGBB`).
    pub const fn from_rgb(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub const fn to_rgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// 解析 `#rrggbb` 格式。 / Parses the strict `#rrggbb` form used by color preferences.
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let hex = input
            .strip_prefix('#')
            .ok_or(ColorParseError::MissingHashPrefix)?;
        if hex.len() != 6 {
            return Err(ColorParseError::InvalidLength);
        }
        parse_digits(hex)
    }

    /// Parses the looser form used by syntax styles: an optional `#` followed
    /// by hexadecimal digits that fit in an `i32`; the low 24 bits are the color.
    pub fn from_style_token(input: &str) -> Result<Self, ColorParseError> {
        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.is_empty() || hex.len() > 8 {
            return Err(ColorParseError::InvalidLength);
        }
        parse_digits(hex)
    }

    /// 以 `#rrggbb` 輸出，每個通道固定兩位。 / Formats as `#rrggbb`, two digits per channel.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorParseError {
    MissingHashPrefix,
    InvalidLength,
    InvalidHex,
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorParseError::MissingHashPrefix => write!(f, "missing leading '#'"),
            ColorParseError::InvalidLength => write!(f, "unexpected number of hexadecimal digits"),
            ColorParseError::InvalidHex => write!(f, "contains non-hexadecimal digits"),
        }
    }
}

impl std::error::Error for ColorParseError {}

fn parse_digits(hex: &str) -> Result<Color, ColorParseError> {
    // from_str_radix tolerates a leading '+', which is not a hex digit here.
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(ColorParseError::InvalidHex);
    }
    // Values above i32::MAX are rejected, so `ffffffff` is not a color.
    let value = i32::from_str_radix(hex, 16).map_err(|_| ColorParseError::InvalidHex)?;
    Ok(Color::from_rgb(value as u32))
}

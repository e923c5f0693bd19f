use std::fmt;

use crate::color::{Color, ColorParseError};

/// Point size used when the size field of a font spec does not parse.
pub const DEFAULT_FONT_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub const PLAIN: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };

    /// 掃描樣式欄位中的 `bold`/`italic` 子字串（區分大小寫）。 / Scans for `bold` and `italic` substrings, case-sensitively.
    pub fn from_flags(flags: &str) -> Self {
        Self {
            bold: flags.contains("bold"),
            italic: flags.contains("italic"),
        }
    }

    pub fn is_plain(self) -> bool {
        !self.bold && !self.italic
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.bold, self.italic) {
            (false, false) => f.write_str("plain"),
            (true, false) => f.write_str("bold"),
            (false, true) => f.write_str("italic"),
            (true, true) => f.write_str("bolditalic"),
        }
    }
}

/// 編輯器字型描述。 / Editor font descriptor stored as `name,styleflags,size`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub name: String,
    pub style: FontStyle,
    pub size: u32,
}

impl FontSpec {
    /// Parses `name,styleflags,size`. Returns `None` unless there are exactly
    /// three comma-separated fields; an unparsable size becomes
    /// [`DEFAULT_FONT_SIZE`].
    pub fn parse(value: &str) -> Option<Self> {
        let pieces: Vec<&str> = value.split(',').collect();
        let [name, flags, size] = pieces.as_slice() else {
            return None;
        };
        Some(Self {
            name: (*name).to_string(),
            style: FontStyle::from_flags(flags),
            size: size.trim().parse().unwrap_or(DEFAULT_FONT_SIZE),
        })
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.name, self.style, self.size)
    }
}

/// Replaces only the size field of a three-field font spec, leaving the name
/// and style text exactly as stored.
pub fn replace_font_size(spec: &str, size: i32) -> Option<String> {
    let mut pieces: Vec<String> = spec.split(',').map(str::to_string).collect();
    if pieces.len() != 3 {
        return None;
    }
    pieces[2] = size.to_string();
    Some(pieces.join(","))
}

/// 語法高亮樣式。 / Color and emphasis for one syntax token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxStyle {
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleParseError {
    MissingColor,
    MissingFlags,
    InvalidColor(ColorParseError),
}

impl fmt::Display for StyleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleParseError::MissingColor => write!(f, "missing color token"),
            StyleParseError::MissingFlags => write!(f, "missing style token"),
            StyleParseError::InvalidColor(err) => write!(f, "invalid color: {err}"),
        }
    }
}

impl std::error::Error for StyleParseError {}

impl SyntaxStyle {
    /// Parses `color,styleflags`; empty tokens between commas are skipped.
    pub fn parse(value: &str) -> Result<Self, StyleParseError> {
        let mut tokens = value.split(',').filter(|token| !token.is_empty());
        let color_token = tokens.next().ok_or(StyleParseError::MissingColor)?;
        let color = Color::from_style_token(color_token).map_err(StyleParseError::InvalidColor)?;
        let flags = tokens.next().ok_or(StyleParseError::MissingFlags)?;
        let style = FontStyle::from_flags(flags);
        Ok(Self {
            color,
            bold: style.bold,
            italic: style.italic,
        })
    }
}

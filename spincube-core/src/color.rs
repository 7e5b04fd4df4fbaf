/// RGB colors and the color literal parser used by configuration
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while_m_n},
    combinator::{all_consuming, map, map_res, opt},
    sequence::tuple,
    IResult,
};
use serde::{Deserialize, Deserializer};

use crate::config::ConfigError;

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value. Bits above 24 are ignored.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse `#rrggbb`, `#rgb`, `0xrrggbb` or a bare `rrggbb`
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        match all_consuming(color_literal)(input.trim()) {
            Ok((_, color)) => Ok(color),
            Err(_) => Err(ConfigError::InvalidColor(input.to_string())),
        }
    }

    /// Component-wise product, used to tint texels by the material color
    pub fn modulate(self, texel: [u8; 4]) -> [u8; 4] {
        let scale = |c: u8, t: u8| ((c as u16 * t as u16 + 127) / 255) as u8;
        [
            scale(self.r, texel[0]),
            scale(self.g, texel[1]),
            scale(self.b, texel[2]),
            255,
        ]
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

fn color_literal(input: &str) -> IResult<&str, Color> {
    let (input, _) = opt(alt((tag("#"), tag_no_case("0x"))))(input)?;
    alt((long_form, short_form))(input)
}

fn long_form(input: &str) -> IResult<&str, Color> {
    map(
        tuple((hex_pair, hex_pair, hex_pair)),
        |(r, g, b)| Color::new(r, g, b),
    )(input)
}

fn short_form(input: &str) -> IResult<&str, Color> {
    // #abc expands to #aabbcc
    map(
        tuple((hex_nibble, hex_nibble, hex_nibble)),
        |(r, g, b)| Color::new(r * 17, g * 17, b * 17),
    )(input)
}

fn hex_pair(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |s| {
        u8::from_str_radix(s, 16)
    })(input)
}

fn hex_nibble(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(1, 1, |c: char| c.is_ascii_hexdigit()), |s| {
        u8::from_str_radix(s, 16)
    })(input)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Packed(u32),
    Literal(String),
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match ColorRepr::deserialize(deserializer)? {
            ColorRepr::Packed(hex) => Ok(Color::from_hex(hex)),
            ColorRepr::Literal(text) => Color::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}

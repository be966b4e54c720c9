//! Tile names on the wire: `1w`..`9w`, `1b`..`9b`, `1t`..`9t` and the honors
//! `dong nan xi bei zhong fa bai`.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{RoomError, RoomResult};
use crate::tile::{Suit, Tile, TILE_NAMES};

pub fn parse_tile(text: &str) -> RoomResult<Tile> {
    let trimmed = text.trim();
    if let Some(pos) = TILE_NAMES.iter().position(|&name| name == trimmed) {
        // TILE_NAMES has exactly 34 entries
        return Tile::new(pos as u8).ok_or_else(|| parse_error(text, "rank out of range"));
    }

    let mut chars = trimmed.chars();
    let (Some(digit), Some(suffix), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(parse_error(text, "expected a tile name like 5b or zhong"));
    };
    let number = digit
        .to_digit(10)
        .ok_or_else(|| parse_error(text, "tile number must be a digit"))?;
    let suit = match suffix {
        'w' => Suit::Wan,
        'b' => Suit::Tong,
        't' => Suit::Tiao,
        _ => return Err(parse_error(text, "unknown suit suffix")),
    };
    Tile::numbered(suit, number as u8).ok_or_else(|| parse_error(text, "tile number must be 1-9"))
}

/// Parses a whitespace- or comma-separated list of tiles, e.g.
/// `"1w 1w 1w dong, dong"`.
pub fn parse_tiles(text: &str) -> RoomResult<Vec<Tile>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(parse_tile)
        .collect()
}

/// Renders tiles as their wire names separated by single spaces.
pub fn tiles_to_string(tiles: &[Tile]) -> String {
    tiles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_error(input: &str, message: &str) -> RoomError {
    RoomError::Parse {
        input: input.to_string(),
        message: message.to_string(),
    }
}

impl FromStr for Tile {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tile(s)
    }
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TileVisitor;

        impl Visitor<'_> for TileVisitor {
            type Value = Tile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a tile name such as \"3w\" or \"fa\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Tile, E> {
                parse_tile(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TileVisitor)
    }
}

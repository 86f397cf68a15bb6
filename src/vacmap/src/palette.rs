//! Category colors

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::classify::SemanticCell;
use crate::Error;

/// RGBA color, written as `#rrggbb` or `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color([r, g, b, a])
    }

    /// Color from HSV components in 0.0..=1.0
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = h.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        let channel = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        Color::rgb(channel(r), channel(g), channel(b))
    }

    pub fn with_alpha(self, alpha: u8) -> Self {
        let [r, g, b, _] = self.0;
        Color([r, g, b, alpha])
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba(self.0)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| Error::InvalidColor(s.to_string()))?;

        match bytes.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

/// Room colors used by the vendor app, in room-id order
pub const APP_ROOM_COLORS: [Color; 5] = [
    Color::rgb(255, 195, 0),
    Color::rgb(200, 80, 80),
    Color::rgb(30, 144, 255),
    Color::rgb(0, 230, 170),
    Color::rgb(100, 210, 255),
];

/// Hues cycled through once the room list runs out
const EXTRA_ROOM_HUES: usize = 12;

/// Colors for every category and overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub free: Color,
    pub wall: Color,
    pub unknown: Color,
    pub forbidden: Color,
    pub charger: Color,
    pub charger_ring: Color,
    pub no_go_fill: Color,
    pub no_go_outline: Color,
    pub no_mop_fill: Color,
    pub no_mop_outline: Color,
    pub room_outline: Color,
    pub rooms: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            free: Color::rgb(255, 255, 255),
            wall: Color::rgb(0, 0, 0),
            unknown: Color::rgb(200, 200, 200),
            forbidden: Color::rgb(255, 150, 150),
            charger: Color::rgb(255, 0, 0),
            charger_ring: Color::rgba(255, 255, 0, 200),
            no_go_fill: Color::rgba(255, 0, 0, 80),
            no_go_outline: Color::rgba(255, 0, 0, 200),
            no_mop_fill: Color::rgba(0, 0, 255, 80),
            no_mop_outline: Color::rgba(0, 0, 255, 200),
            room_outline: Color::rgb(0, 0, 255),
            rooms: APP_ROOM_COLORS.to_vec(),
        }
    }
}

impl Palette {
    /// Color of a classified cell
    pub fn color_of(&self, cell: SemanticCell) -> Color {
        match cell {
            SemanticCell::Free => self.free,
            SemanticCell::Wall => self.wall,
            SemanticCell::Unknown => self.unknown,
            SemanticCell::ForbiddenZone => self.forbidden,
            SemanticCell::Charger => self.charger,
            SemanticCell::Room(id) => self.room_color(id),
        }
    }

    /// Color for a room id. Ids start at 1; the configured list is used
    /// first, then evenly spaced hues.
    pub fn room_color(&self, id: i64) -> Color {
        let index = id.unsigned_abs().saturating_sub(1) as usize;
        if let Some(color) = self.rooms.get(index) {
            return *color;
        }

        let extra = (index - self.rooms.len()) % EXTRA_ROOM_HUES;
        Color::from_hsv(extra as f64 / EXTRA_ROOM_HUES as f64, 0.8, 0.9)
    }
}

/// Color for rank `rank` of `count` distinct values, dark blue through yellow
pub fn spread_color(rank: usize, count: usize) -> Color {
    let t = if count > 1 {
        rank as f64 / (count - 1) as f64
    } else {
        0.0
    };
    Color::from_hsv(0.7 - 0.55 * t, 0.8, 0.35 + 0.6 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!("#ff8000".parse::<Color>().unwrap(), Color::rgb(255, 128, 0));
        assert_eq!("00000080".parse::<Color>().unwrap(), Color::rgba(0, 0, 0, 128));
        assert!("#fff".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(255, 128, 0).to_string(), "#ff8000");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hsv(1.0 / 3.0, 1.0, 1.0), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hsv(2.0 / 3.0, 1.0, 1.0), Color::rgb(0, 0, 255));
        assert_eq!(Color::from_hsv(0.5, 0.0, 1.0), Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_room_colors() {
        let palette = Palette::default();
        assert_eq!(palette.room_color(1), APP_ROOM_COLORS[0]);
        assert_eq!(palette.room_color(5), APP_ROOM_COLORS[4]);
        // Past the list: deterministic and distinct from its neighbour
        assert_eq!(palette.room_color(6), palette.room_color(6));
        assert_ne!(palette.room_color(6), palette.room_color(7));
        // Wraps after the extra hues
        assert_eq!(palette.room_color(6), palette.room_color(6 + 12));
    }

    #[test]
    fn test_color_of() {
        let palette = Palette::default();
        assert_eq!(palette.color_of(SemanticCell::Free), palette.free);
        assert_eq!(palette.color_of(SemanticCell::Room(2)), APP_ROOM_COLORS[1]);
    }

    #[test]
    fn test_spread_color_endpoints_differ() {
        assert_ne!(spread_color(0, 4), spread_color(3, 4));
        assert_eq!(spread_color(0, 1), spread_color(0, 1));
    }

    #[test]
    fn test_palette_partial_toml() {
        let palette: Palette = toml::from_str("wall = \"#282828\"").unwrap();
        assert_eq!(palette.wall, Color::rgb(40, 40, 40));
        assert_eq!(palette.free, Palette::default().free);
    }
}

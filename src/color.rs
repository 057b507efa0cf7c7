use std::fmt;

use indexmap::IndexMap;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Rgb – renderer-neutral colour
// ---------------------------------------------------------------------------

/// An opaque sRGB colour. Serializes as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_hex(0xffffff);
    pub const LIGHT_GRAY: Rgb = Rgb::from_hex(0xd3d3d3);
    pub const GRAY: Rgb = Rgb::from_hex(0x808080);
    /// Plot area behind charts that have a selection.
    pub const PLOT_BACKGROUND: Rgb = Rgb::from_hex(0xe5ecf6);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Plotly's default qualitative sequence.
pub const QUALITATIVE: [Rgb; 10] = [
    Rgb::from_hex(0x636efa),
    Rgb::from_hex(0xef553b),
    Rgb::from_hex(0x00cc96),
    Rgb::from_hex(0xab63fa),
    Rgb::from_hex(0xffa15a),
    Rgb::from_hex(0x19d3f3),
    Rgb::from_hex(0xff6692),
    Rgb::from_hex(0xb6e880),
    Rgb::from_hex(0xff97ff),
    Rgb::from_hex(0xfecb52),
];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgb {
                r: (rgb.red * 255.0) as u8,
                g: (rgb.green * 255.0) as u8,
                b: (rgb.blue * 255.0) as u8,
            }
        })
        .collect()
}

/// `n` discrete colours: the qualitative sequence first, generated hues after.
pub fn discrete_colors(n: usize) -> Vec<Rgb> {
    let mut colors: Vec<Rgb> = QUALITATIVE.iter().copied().take(n).collect();
    if n > QUALITATIVE.len() {
        colors.extend(generate_palette(n - QUALITATIVE.len()));
    }
    colors
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Rgb
// ---------------------------------------------------------------------------

/// Maps category labels to distinct colours in a fixed order, so the same
/// label always gets the same colour for a given category list.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: IndexMap<String, Rgb>,
    default_color: Rgb,
}

impl ColorMap {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = categories.into_iter().map(Into::into).collect();
        let palette = discrete_colors(labels.len());
        ColorMap {
            mapping: labels.into_iter().zip(palette).collect(),
            default_color: Rgb::GRAY,
        }
    }

    /// Look up the colour for a label; unknown labels get gray.
    pub fn color_for(&self, label: &str) -> Rgb {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_display() {
        assert_eq!(Rgb::PLOT_BACKGROUND.to_string(), "#e5ecf6");
        assert_eq!(QUALITATIVE[0].to_string(), "#636efa");
    }

    #[test]
    fn discrete_colors_extend_past_qualitative_sequence() {
        let colors = discrete_colors(12);
        assert_eq!(colors.len(), 12);
        assert_eq!(&colors[..10], &QUALITATIVE[..]);
        assert_ne!(colors[10], colors[11]);
        assert_eq!(discrete_colors(3), QUALITATIVE[..3].to_vec());
    }

    #[test]
    fn color_map_is_positional_and_falls_back_to_gray() {
        let map = ColorMap::new(["b", "a"]);
        assert_eq!(map.color_for("b"), QUALITATIVE[0]);
        assert_eq!(map.color_for("a"), QUALITATIVE[1]);
        assert_eq!(map.color_for("zzz"), Rgb::GRAY);
    }
}

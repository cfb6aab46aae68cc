use eframe::egui::Color32;
use palette::{named, Srgb};

// ---------------------------------------------------------------------------
// Cluster marker colours
// ---------------------------------------------------------------------------

/// A marker colour with the CSS name the map legend shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerColor {
    pub name: &'static str,
    pub color: Color32,
}

impl MarkerColor {
    fn named(name: &'static str, rgb: Srgb<u8>) -> Self {
        Self {
            name,
            color: Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        }
    }
}

/// Number of clusters with a dedicated colour.
pub const PALETTE_SIZE: usize = 10;

/// Fixed palette indexed by cluster number.
pub fn cluster_palette() -> [MarkerColor; PALETTE_SIZE] {
    [
        MarkerColor::named("red", named::RED),
        MarkerColor::named("blue", named::BLUE),
        MarkerColor::named("orange", named::ORANGE),
        MarkerColor::named("green", named::GREEN),
        MarkerColor::named("purple", named::PURPLE),
        MarkerColor::named("lightgray", named::LIGHTGRAY),
        MarkerColor::named("cadetblue", named::CADETBLUE),
        MarkerColor::named("pink", named::PINK),
        MarkerColor::named("beige", named::BEIGE),
        MarkerColor::named("darkred", named::DARKRED),
    ]
}

/// Colour for clusters outside the palette.
pub fn fallback_color() -> MarkerColor {
    MarkerColor::named("gray", named::GRAY)
}

/// Look up the marker colour for a cluster.
pub fn cluster_color(cluster: u32) -> MarkerColor {
    usize::try_from(cluster)
        .ok()
        .and_then(|i| cluster_palette().get(i).copied())
        .unwrap_or_else(fallback_color)
}

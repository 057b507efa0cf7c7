use eframe::egui::Color32;

use crate::color::Rgb;

pub mod panels;
pub mod plot;

pub(crate) fn to_color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

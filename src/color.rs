use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Chart series colours
// ---------------------------------------------------------------------------

/// Starting hue; keeps the first series in the blue range of the wheel.
const BASE_HUE: f32 = 200.0;

/// `n` distinct colours for bar series, hues spread evenly from [`BASE_HUE`].
pub fn series_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (BASE_HUE + (i as f32 / n as f32) * 360.0) % 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.7, 0.6).into_color();
            Color32::from_rgb(to_byte(rgb.red), to_byte(rgb.green), to_byte(rgb.blue))
        })
        .collect()
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let colours = series_palette(3);
        assert_eq!(colours.len(), 3);
        assert_ne!(colours[0], colours[1]);
        assert_ne!(colours[1], colours[2]);
        assert!(series_palette(0).is_empty());
    }
}

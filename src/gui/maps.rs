use crate::api::{CrimeRecord, Hotspot};
use eframe::egui::{self, Color32, Stroke};
use egui_plot::{MarkerShape, Plot, PlotPoints, Points, Polygon};

/// Default view center (India), matching the original dashboard.
pub const MAP_CENTER: (f64, f64) = (20.5937, 78.9629);

pub const PREVIEW_HOTSPOT_RADIUS_M: f64 = 1200.0;
pub const PREDICTION_HOTSPOT_RADIUS_M: f64 = 2000.0;

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Approximates a metre-radius circle as a lat/lng outline. Good enough for
/// hotspot overlays; this is not a geodesic.
pub fn circle_outline(lat: f64, lng: f64, radius_m: f64) -> Vec<[f64; 2]> {
    let dlat = radius_m / METERS_PER_DEGREE_LAT;
    let dlng = dlat / lat.to_radians().cos().abs().max(1e-6);
    let segments = 48;
    (0..=segments)
        .map(|i| {
            let angle = std::f64::consts::TAU * (i as f64 / segments as f64);
            [lng + dlng * angle.cos(), lat + dlat * angle.sin()]
        })
        .collect()
}

/// Hotspot overlay map used by both the dashboard preview and the prediction
/// panel; the two differ only in circle radius.
pub fn render_hotspot_map(
    ui: &mut egui::Ui,
    id: &str,
    hotspots: &[Hotspot],
    radius_m: f64,
    height: f32,
) {
    let fill = Color32::from_rgba_unmultiplied(0xef, 0x44, 0x44, 90);
    let stroke = Stroke::new(1.0, Color32::from_rgb(0xef, 0x44, 0x44));

    Plot::new(id.to_string())
        .height(height)
        .data_aspect(1.0)
        .include_x(MAP_CENTER.1 - 8.0)
        .include_x(MAP_CENTER.1 + 8.0)
        .include_y(MAP_CENTER.0 - 8.0)
        .include_y(MAP_CENTER.0 + 8.0)
        .show(ui, |plot_ui| {
            for (i, spot) in hotspots.iter().enumerate() {
                let outline = circle_outline(spot.lat, spot.lng, radius_m);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(outline))
                        .fill_color(fill)
                        .stroke(stroke)
                        .name(format!("Hotspot #{}", i + 1)),
                );
            }
        });
}

/// Full map: one marker per crime record. Clicking near a marker selects the
/// record; the caller renders the popup content beside the plot.
pub fn render_crime_map(
    ui: &mut egui::Ui,
    crimes: &[CrimeRecord],
    selected: &mut Option<i64>,
    height: f32,
) {
    let markers: Vec<(i64, [f64; 2])> = crimes
        .iter()
        .filter_map(|c| match (c.latitude, c.longitude) {
            (Some(lat), Some(lng)) => Some((c.crime_id, [lng, lat])),
            _ => None,
        })
        .collect();

    let coords: Vec<[f64; 2]> = markers.iter().map(|(_, p)| *p).collect();
    let points = Points::new(PlotPoints::from(coords))
        .radius(5.0)
        .shape(MarkerShape::Circle)
        .color(Color32::from_rgb(0x3b, 0x82, 0xf6))
        .name("Crime records");

    Plot::new("full_map")
        .height(height)
        .data_aspect(1.0)
        .include_x(MAP_CENTER.1 - 8.0)
        .include_x(MAP_CENTER.1 + 8.0)
        .include_y(MAP_CENTER.0 - 8.0)
        .include_y(MAP_CENTER.0 + 8.0)
        .show(ui, |plot_ui| {
            plot_ui.points(points);

            if plot_ui.response().clicked() {
                if let Some(pointer) = plot_ui.pointer_coordinate() {
                    let bounds = plot_ui.plot_bounds();
                    let tolerance = bounds.width().max(bounds.height()) * 0.02;
                    *selected = nearest_marker(&markers, pointer.x, pointer.y, tolerance);
                }
            }
        });
}

fn nearest_marker(
    markers: &[(i64, [f64; 2])],
    x: f64,
    y: f64,
    tolerance: f64,
) -> Option<i64> {
    let mut best: Option<(i64, f64)> = None;
    for (id, [mx, my]) in markers {
        let dist = ((mx - x).powi(2) + (my - y).powi(2)).sqrt();
        if dist <= tolerance && best.map(|(_, d)| dist < d).unwrap_or(true) {
            best = Some((*id, dist));
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_outline_is_closed_and_centered() {
        let outline = circle_outline(28.6, 77.2, 1200.0);
        assert_eq!(outline.first(), outline.last());

        let n = (outline.len() - 1) as f64;
        let mean_lng: f64 = outline[..outline.len() - 1].iter().map(|p| p[0]).sum::<f64>() / n;
        let mean_lat: f64 = outline[..outline.len() - 1].iter().map(|p| p[1]).sum::<f64>() / n;
        assert!((mean_lng - 77.2).abs() < 1e-6);
        assert!((mean_lat - 28.6).abs() < 1e-6);
    }

    #[test]
    fn prediction_circles_are_larger_than_preview() {
        let preview = circle_outline(28.6, 77.2, PREVIEW_HOTSPOT_RADIUS_M);
        let prediction = circle_outline(28.6, 77.2, PREDICTION_HOTSPOT_RADIUS_M);
        // Compare the northernmost latitude of each outline.
        let top = |pts: &[[f64; 2]]| pts.iter().map(|p| p[1]).fold(f64::MIN, f64::max);
        assert!(top(&prediction) > top(&preview));
    }

    #[test]
    fn nearest_marker_respects_tolerance() {
        let markers = vec![(1, [77.2, 28.6]), (2, [72.8, 19.0])];
        assert_eq!(nearest_marker(&markers, 77.21, 28.61, 0.1), Some(1));
        assert_eq!(nearest_marker(&markers, 50.0, 10.0, 0.1), None);
    }
}

use crate::settings::SafetyThresholds;
use crate::theme::ThemeConfig;
use eframe::egui::{self, Color32, Stroke, Vec2};
use egui_plot::{Legend, Line, Plot, PlotPoints};

/// Static illustrative series shown on the Trends panel. Stub pending a real
/// time-series endpoint; the backend does not serve trend data yet.
pub const TREND_YEARS: [f64; 6] = [2019.0, 2020.0, 2021.0, 2022.0, 2023.0, 2024.0];
pub const TREND_SERIES: [f64; 6] = [420_000.0, 450_000.0, 410_000.0, 480_000.0, 520_000.0, 490_000.0];

/// Fixed palette the type-distribution donut cycles through.
pub const TYPE_PALETTE: [Color32; 7] = [
    Color32::from_rgb(0x3b, 0x82, 0xf6),
    Color32::from_rgb(0x22, 0xc5, 0x5e),
    Color32::from_rgb(0xef, 0x44, 0x44),
    Color32::from_rgb(0xf5, 0x9e, 0x0b),
    Color32::from_rgb(0x8b, 0x5c, 0xf6),
    Color32::from_rgb(0x06, 0xb6, 0xd4),
    Color32::from_rgb(0xec, 0x48, 0x99),
];

/// Maps a safety score to its severity band color. Thresholds come from
/// settings so operators can retune the bands without a rebuild.
pub fn severity_color(score: f64, thresholds: &SafetyThresholds, theme: &ThemeConfig) -> Color32 {
    if score < thresholds.high_alert_below {
        theme.danger_color()
    } else if score < thresholds.moderate_below {
        theme.warning_color()
    } else {
        theme.success_color()
    }
}

pub fn render_trend_chart(ui: &mut egui::Ui, theme: &ThemeConfig, height: f32) {
    let points: Vec<[f64; 2]> = TREND_YEARS
        .iter()
        .zip(TREND_SERIES.iter())
        .map(|(year, value)| [*year, *value])
        .collect();

    let line = Line::new(PlotPoints::from(points))
        .name("National crime statistics")
        .color(theme.accent_color())
        .fill(0.0)
        .width(2.0);

    Plot::new("trend_chart")
        .height(height)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .include_y(0.0)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

/// Painter-drawn donut of the type-count aggregate. Rebuilt from the current
/// aggregate every frame, so a refresh can never leave a stale ring behind.
pub fn render_type_donut(ui: &mut egui::Ui, theme: &ThemeConfig, type_counts: &[(String, usize)]) {
    let total: usize = type_counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        ui.label(
            egui::RichText::new("No data yet")
                .color(theme.muted_color()),
        );
        return;
    }

    let (rect, _) = ui.allocate_exact_size(Vec2::splat(200.0), egui::Sense::hover());
    let center = rect.center();
    let outer = rect.width() * 0.48;
    let inner = outer * 0.58;
    let painter = ui.painter_at(rect);

    let point_at = |angle: f32, radius: f32| {
        center + Vec2::new(angle.cos(), angle.sin()) * radius
    };

    let mut start = -std::f32::consts::FRAC_PI_2;
    for (i, (_, count)) in type_counts.iter().enumerate() {
        let sweep = (*count as f32 / total as f32) * std::f32::consts::TAU;
        let color = TYPE_PALETTE[i % TYPE_PALETTE.len()];
        let steps = ((sweep / 0.08).ceil() as usize).max(1);
        let mut prev = start;
        for step in 1..=steps {
            let angle = start + sweep * (step as f32 / steps as f32);
            painter.add(egui::Shape::convex_polygon(
                vec![
                    point_at(prev, inner),
                    point_at(prev, outer),
                    point_at(angle, outer),
                    point_at(angle, inner),
                ],
                color,
                Stroke::NONE,
            ));
            prev = angle;
        }
        start += sweep;
    }

    painter.text(
        center,
        egui::Align2::CENTER_CENTER,
        total.to_string(),
        egui::FontId::proportional(20.0),
        theme.text_color(),
    );

    ui.add_space(4.0);
    for (i, (label, count)) in type_counts.iter().enumerate() {
        let color = TYPE_PALETTE[i % TYPE_PALETTE.len()];
        ui.horizontal(|ui| {
            let (dot, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
            ui.painter().circle_filled(dot.center(), 5.0, color);
            ui.label(format!("{label} ({count})"));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::default_presets;

    #[test]
    fn severity_bands_follow_thresholds() {
        let theme = &default_presets()[0];
        let thresholds = SafetyThresholds::default();

        assert_eq!(
            severity_color(2.0, &thresholds, theme),
            theme.danger_color()
        );
        assert_eq!(
            severity_color(4.5, &thresholds, theme),
            theme.warning_color()
        );
        assert_eq!(
            severity_color(6.0, &thresholds, theme),
            theme.warning_color()
        );
        assert_eq!(
            severity_color(7.5, &thresholds, theme),
            theme.success_color()
        );
        assert_eq!(
            severity_color(9.9, &thresholds, theme),
            theme.success_color()
        );
    }

    #[test]
    fn trend_series_is_aligned() {
        assert_eq!(TREND_YEARS.len(), TREND_SERIES.len());
    }
}

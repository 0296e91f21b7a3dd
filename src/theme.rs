use eframe::egui::{self, Color32, Context, Rounding};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    pub surface: String,
    pub panel: String,
    pub text: String,
    pub muted_text: String,
    pub accent: String,
    pub accent_soft: String,
    pub danger: String,
    pub success: String,
    pub warning: String,
    pub border: String,
    pub radius: f32,
    pub font_size_base: f32,
}

pub fn themes_dir(base: &Path) -> PathBuf {
    base.join("themes")
}

pub fn theme_file(base: &Path) -> PathBuf {
    themes_dir(base).join("theme.json")
}

pub fn presets_file(base: &Path) -> PathBuf {
    themes_dir(base).join("presets.json")
}

pub fn ensure_theme_files(base: &Path) -> io::Result<()> {
    let dir = themes_dir(base);
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    let presets_path = presets_file(base);
    if !presets_path.exists() {
        let presets = default_presets();
        let json = serde_json::to_string_pretty(&presets)?;
        fs::write(&presets_path, json)?;
    }

    let active_path = theme_file(base);
    if !active_path.exists() {
        let default_theme = default_presets()
            .into_iter()
            .find(|t| t.name == "midnight_ops")
            .unwrap_or_else(|| default_presets()[0].clone());
        let json = serde_json::to_string_pretty(&default_theme)?;
        fs::write(&active_path, json)?;
    }

    Ok(())
}

pub fn load_presets(base: &Path) -> Vec<ThemeConfig> {
    let presets_path = presets_file(base);
    if let Ok(contents) = fs::read_to_string(&presets_path) {
        if let Ok(list) = serde_json::from_str::<Vec<ThemeConfig>>(&contents) {
            return list;
        }
    }
    default_presets()
}

pub fn load_theme(base: &Path, preferred: Option<&str>) -> ThemeConfig {
    let presets = load_presets(base);
    if let Some(name) = preferred {
        if let Some(found) = presets.iter().find(|p| p.name == name) {
            return found.clone();
        }
    }

    let active_path = theme_file(base);
    if let Ok(contents) = fs::read_to_string(&active_path) {
        if let Ok(theme) = serde_json::from_str::<ThemeConfig>(&contents) {
            return theme;
        }
    }

    presets
        .into_iter()
        .find(|t| t.name == "midnight_ops")
        .unwrap_or_else(|| default_presets()[0].clone())
}

pub fn save_theme(base: &Path, theme: &ThemeConfig) -> io::Result<()> {
    let json = serde_json::to_string_pretty(theme)?;
    fs::write(theme_file(base), json)?;
    Ok(())
}

pub fn apply_theme(theme: &ThemeConfig, ctx: &Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = if is_dark(theme) {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    visuals.panel_fill = parse_color(&theme.panel);
    visuals.window_fill = parse_color(&theme.surface);
    visuals.widgets.noninteractive.bg_fill = parse_color(&theme.surface);
    visuals.widgets.noninteractive.fg_stroke.color = parse_color(&theme.text);
    visuals.widgets.inactive.bg_fill = parse_color(&theme.surface);
    visuals.widgets.inactive.fg_stroke.color = parse_color(&theme.text);
    visuals.widgets.inactive.bg_stroke.color = parse_color(&theme.border);

    visuals.widgets.hovered.bg_fill = parse_color(&theme.accent_soft);
    visuals.widgets.hovered.bg_stroke.color = parse_color(&theme.accent);
    visuals.widgets.hovered.fg_stroke.color = parse_color(&theme.text);

    visuals.widgets.active.bg_fill = parse_color(&theme.accent_soft);
    visuals.widgets.active.bg_stroke.color = parse_color(&theme.accent);
    visuals.widgets.active.fg_stroke.color = parse_color(&theme.text);

    visuals.selection.bg_fill = parse_color(&theme.accent_soft);
    visuals.hyperlink_color = parse_color(&theme.accent);

    visuals.window_rounding = Rounding::same(theme.radius);
    visuals.widgets.noninteractive.rounding = Rounding::same(theme.radius);
    visuals.widgets.inactive.rounding = Rounding::same(theme.radius);
    visuals.widgets.hovered.rounding = Rounding::same(theme.radius);
    visuals.widgets.active.rounding = Rounding::same(theme.radius);

    style.text_styles = [
        (
            egui::TextStyle::Small,
            egui::FontId::proportional(theme.font_size_base - 2.0),
        ),
        (
            egui::TextStyle::Body,
            egui::FontId::proportional(theme.font_size_base),
        ),
        (
            egui::TextStyle::Button,
            egui::FontId::proportional(theme.font_size_base),
        ),
        (
            egui::TextStyle::Heading,
            egui::FontId::proportional(theme.font_size_base + 6.0),
        ),
        (
            egui::TextStyle::Monospace,
            egui::FontId::monospace(theme.font_size_base - 1.0),
        ),
    ]
    .into();
    style.visuals = visuals;
    ctx.set_style(style);
}

impl ThemeConfig {
    pub fn text_color(&self) -> Color32 {
        parse_color(&self.text)
    }

    pub fn muted_color(&self) -> Color32 {
        parse_color(&self.muted_text)
    }

    pub fn accent_color(&self) -> Color32 {
        parse_color(&self.accent)
    }

    pub fn surface_color(&self) -> Color32 {
        parse_color(&self.surface)
    }

    pub fn border_color(&self) -> Color32 {
        parse_color(&self.border)
    }

    pub fn danger_color(&self) -> Color32 {
        parse_color(&self.danger)
    }

    pub fn success_color(&self) -> Color32 {
        parse_color(&self.success)
    }

    pub fn warning_color(&self) -> Color32 {
        parse_color(&self.warning)
    }
}

fn is_dark(theme: &ThemeConfig) -> bool {
    let bg = parse_color(&theme.panel);
    // Simple luminance check; lower means darker.
    let luminance = 0.2126 * (bg.r() as f32) + 0.7152 * (bg.g() as f32) + 0.0722 * (bg.b() as f32);
    luminance < 128.0
}

pub fn parse_color(hex: &str) -> Color32 {
    let h = hex.trim_start_matches('#');
    if h.len() == 6 {
        if let Ok(rgb) = u32::from_str_radix(h, 16) {
            let r = ((rgb >> 16) & 0xFF) as u8;
            let g = ((rgb >> 8) & 0xFF) as u8;
            let b = (rgb & 0xFF) as u8;
            return Color32::from_rgb(r, g, b);
        }
    } else if h.len() == 8 {
        if let Ok(rgba) = u32::from_str_radix(h, 16) {
            let r = ((rgba >> 24) & 0xFF) as u8;
            let g = ((rgba >> 16) & 0xFF) as u8;
            let b = ((rgba >> 8) & 0xFF) as u8;
            let a = (rgba & 0xFF) as u8;
            return Color32::from_rgba_premultiplied(r, g, b, a);
        }
    }
    Color32::LIGHT_GRAY
}

pub fn default_presets() -> Vec<ThemeConfig> {
    vec![
        // Matches the slate/blue look of the original dashboard.
        ThemeConfig {
            name: "midnight_ops".to_string(),
            surface: "#1e293b".to_string(),
            panel: "#0f172a".to_string(),
            text: "#e2e8f0".to_string(),
            muted_text: "#94a3b8".to_string(),
            accent: "#3b82f6".to_string(),
            accent_soft: "#1e3a8a".to_string(),
            danger: "#ef4444".to_string(),
            success: "#22c55e".to_string(),
            warning: "#f59e0b".to_string(),
            border: "#334155".to_string(),
            radius: 6.0,
            font_size_base: 15.0,
        },
        ThemeConfig {
            name: "daylight".to_string(),
            surface: "#f1f5f9".to_string(),
            panel: "#ffffff".to_string(),
            text: "#0f172a".to_string(),
            muted_text: "#64748b".to_string(),
            accent: "#2563eb".to_string(),
            accent_soft: "#dbeafe".to_string(),
            danger: "#dc2626".to_string(),
            success: "#16a34a".to_string(),
            warning: "#d97706".to_string(),
            border: "#cbd5e1".to_string(),
            radius: 6.0,
            font_size_base: 15.0,
        },
    ]
}

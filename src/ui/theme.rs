use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

use crate::schedule::{block_gradient, Rgb};

/// Font family for filled Phosphor icons
pub fn phosphor_fill_family() -> FontFamily {
    FontFamily::Name("phosphor-fill".into())
}

pub const ACCENT: Color32 = Color32::from_rgb(19, 152, 244);
pub const ERROR: Color32 = Color32::from_rgb(224, 108, 117);
pub const HEART: Color32 = Color32::from_rgb(0xdc, 0x26, 0x7f);

pub fn setup_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    // Phosphor Regular icons as fallback in the Proportional family
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    // Phosphor Fill as its own family, with the default UI font behind it so
    // mixed icon + text strings still render
    fonts.font_data.insert(
        "phosphor-fill".into(),
        egui_phosphor::Variant::Fill.font_data(),
    );
    let mut fill_family = vec!["phosphor-fill".to_owned()];
    if let Some(proportional) = fonts.families.get(&FontFamily::Proportional) {
        fill_family.extend(proportional.iter().cloned());
    }
    fonts.families.insert(phosphor_fill_family(), fill_family);

    ctx.set_fonts(fonts);
}

pub fn setup_theme(ctx: &egui::Context) {
    let mut style = Style::default();

    let mut visuals = Visuals::dark();

    let bg = Color32::from_rgb(10, 12, 20);
    visuals.panel_fill = bg;
    visuals.window_fill = Color32::from_rgb(16, 18, 28);
    visuals.faint_bg_color = Color32::from_rgb(20, 22, 32);
    visuals.extreme_bg_color = Color32::from_rgb(6, 8, 14);

    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(30, 34, 48);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(176, 180, 196));

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(40, 46, 64);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(210, 214, 228));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(60, 68, 92);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.selection.bg_fill = ACCENT;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = ACCENT;

    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);
    visuals.widgets.active.rounding = Rounding::same(6.0);
    visuals.window_rounding = Rounding::same(8.0);

    style.visuals = visuals;

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(20.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(14.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(20.0);

    ctx.set_style(style);
}

fn to_color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// (top, bottom) gradient colors for a block starting at `start_minutes`
pub fn block_colors(start_minutes: i32) -> (Color32, Color32) {
    let (top, bottom) = block_gradient(start_minutes);
    (to_color(top), to_color(bottom))
}

/// Returns (bg_color, text_color) for a selectable pill
pub fn pill_colors(selected: bool) -> (Color32, Color32) {
    if selected {
        (ACCENT, Color32::WHITE)
    } else {
        (Color32::from_rgb(40, 46, 64), Color32::from_rgb(200, 204, 220))
    }
}

/// Returns (bg_color, border_color, secondary_text_color) for board cards
pub fn card_colors() -> (Color32, Color32, Color32) {
    (
        Color32::from_rgb(18, 20, 32),
        Color32::from_rgb(44, 50, 70),
        Color32::from_rgb(150, 156, 176),
    )
}

/// Returns (column_bg, hour_line, hour_label) for the day column
pub fn column_colors() -> (Color32, Color32, Color32) {
    (
        Color32::from_rgb(14, 16, 26),
        Color32::from_rgb(40, 44, 60),
        Color32::from_rgb(112, 118, 140),
    )
}

/// Returns (bg, text) for the trash strip, brighter while a block hovers it
pub fn trash_colors(armed: bool) -> (Color32, Color32) {
    if armed {
        (Color32::from_rgb(90, 30, 36), Color32::WHITE)
    } else {
        (Color32::from_rgb(36, 20, 24), ERROR)
    }
}

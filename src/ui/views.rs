use egui::{Color32, RichText, Ui};

use crate::api::{BlockKind, Comment};
use crate::plan::selector::{self, StagedText};
use crate::plan::Plan;
use crate::schedule::{
    format_hour_label, format_time_label, minutes_to_top, BlockStore, DragOutcome, TimelineEditor,
    ACTIVITY_DURATIONS, BASICS, COLUMN_HEIGHT, DAY_END, DAY_MINUTES, DAY_START, MEAL_DURATION,
    TRASH_HEIGHT,
};
use crate::social::PostCard;
use super::theme::{self, block_colors, card_colors, column_colors, pill_colors, trash_colors};

/// Painted pill button; returns true when clicked
pub fn pill(ui: &mut Ui, text: &str, selected: bool) -> bool {
    let (bg, fg) = pill_colors(selected);
    let font_id = egui::FontId::proportional(14.0);
    let padding = egui::vec2(14.0, 6.0);
    let text_size = ui.fonts(|f| f.layout_no_wrap(text.to_string(), font_id.clone(), fg).size());
    let (rect, response) = ui.allocate_exact_size(text_size + padding * 2.0, egui::Sense::click());

    let fill = if response.hovered() && !selected {
        Color32::from_rgb(60, 68, 92)
    } else {
        bg
    };
    ui.painter().rect_filled(rect, egui::Rounding::same(rect.height() / 2.0), fill);
    ui.painter().text(rect.center(), egui::Align2::CENTER_CENTER, text, font_id, fg);

    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    response.clicked()
}

fn group_header(ui: &mut Ui, title: &str, subtitle: &str) {
    ui.label(RichText::new(title).size(17.0).strong());
    if !subtitle.is_empty() {
        ui.label(RichText::new(subtitle).color(card_colors().2));
    }
    ui.add_space(4.0);
}

/// One-value option group (the vibe). Returns the new value when it changed.
pub fn render_single_group(
    ui: &mut Ui,
    title: &str,
    subtitle: &str,
    options: &[&str],
    value: &str,
    placeholder: &str,
) -> Option<String> {
    let mut changed = None;
    let is_custom = selector::is_custom_single(options, value);

    group_header(ui, title, subtitle);
    ui.horizontal_wrapped(|ui| {
        for opt in options {
            if pill(ui, opt, value == *opt) {
                changed = Some(opt.to_string());
            }
        }
        if pill(ui, "Other", is_custom) {
            changed = selector::other_clicked(options, value);
        }
    });

    ui.horizontal(|ui| {
        ui.label(RichText::new("Or type your own:").color(card_colors().2));
        let mut text = if is_custom { value.to_string() } else { String::new() };
        let response = ui.add(
            egui::TextEdit::singleline(&mut text)
                .hint_text(placeholder)
                .desired_width(320.0),
        );
        if response.changed() {
            changed = Some(text);
        }
    });

    changed
}

/// Multi-value option group (activities, foods). Free text is committed on
/// Enter. Returns the new selection when it changed.
pub fn render_multi_group(
    ui: &mut Ui,
    title: &str,
    subtitle: &str,
    options: &[&str],
    selected: &[String],
    staged: &mut StagedText,
    placeholder: &str,
) -> Option<Vec<String>> {
    let mut changed = None;
    let has_custom = !selector::custom_values(options, selected).is_empty();

    group_header(ui, title, subtitle);
    ui.horizontal_wrapped(|ui| {
        for opt in selector::pill_options(options, selected) {
            let is_selected = selected.contains(&opt);
            if pill(ui, &opt, is_selected) {
                changed = Some(selector::toggle(selected, &opt));
            }
        }
        // "Other" is only an indicator in multi mode; typing is the way in
        pill(ui, "Other", has_custom);
    });

    ui.horizontal(|ui| {
        ui.label(RichText::new("Or type your own:").color(card_colors().2));
        let response = ui.add(
            egui::TextEdit::singleline(&mut staged.text)
                .hint_text(placeholder)
                .desired_width(320.0),
        );
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            if let Some(next) = staged.confirm(selected) {
                changed = Some(next);
            }
            response.request_focus();
        }
    });

    changed
}

/// Palette on the left of the schedule view. Returns (kind, label, minutes)
/// for the item whose "Add" was clicked.
pub fn render_palette(
    ui: &mut Ui,
    plan: &Plan,
    activity_duration: &mut i32,
) -> Option<(BlockKind, String, i32)> {
    let mut added = None;
    let muted = card_colors().2;

    ui.label(RichText::new("From what we do").strong());
    egui::ComboBox::from_label("Duration for activities")
        .selected_text(
            ACTIVITY_DURATIONS
                .iter()
                .find(|(m, _)| *m == *activity_duration)
                .map(|(_, l)| *l)
                .unwrap_or("1 hour"),
        )
        .show_ui(ui, |ui| {
            for (minutes, label) in ACTIVITY_DURATIONS {
                ui.selectable_value(activity_duration, minutes, label);
            }
        });
    if plan.activities.is_empty() {
        ui.label(RichText::new("No activities selected yet in the planner.").color(muted));
    }
    for act in &plan.activities {
        if palette_row(ui, act) {
            added = Some((BlockKind::Do, act.clone(), *activity_duration));
        }
    }

    ui.add_space(12.0);
    ui.label(RichText::new("From what we eat").strong());
    ui.label(RichText::new("Meals are set to 1.5 hours.").color(muted));
    if plan.foods.is_empty() {
        ui.label(RichText::new("No food picks yet in the planner.").color(muted));
    }
    for food in &plan.foods {
        if palette_row(ui, food) {
            added = Some((BlockKind::Eat, food.clone(), MEAL_DURATION));
        }
    }

    ui.add_space(12.0);
    ui.label(RichText::new("Basics").strong());
    for (kind, label, palette_label, minutes) in BASICS {
        if palette_row(ui, palette_label) {
            added = Some((kind, label.to_string(), minutes));
        }
    }

    added
}

fn palette_row(ui: &mut Ui, text: &str) -> bool {
    ui.horizontal(|ui| {
        ui.label(text);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.button(format!("{} Add", egui_phosphor::regular::PLUS)).clicked()
        })
        .inner
    })
    .inner
}

fn paint_gradient(painter: &egui::Painter, rect: egui::Rect, top: Color32, bottom: Color32) {
    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(rect.left_top(), top);
    mesh.colored_vertex(rect.right_top(), top);
    mesh.colored_vertex(rect.left_bottom(), bottom);
    mesh.colored_vertex(rect.right_bottom(), bottom);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(1, 3, 2);
    painter.add(egui::Shape::mesh(mesh));
}

/// The day column: hour grid, blocks, and the trash strip. Drives the
/// editor from pointer input and returns the outcome of a finished drag.
pub fn render_schedule_column(
    ui: &mut Ui,
    blocks: &mut BlockStore,
    editor: &mut TimelineEditor,
) -> Option<DragOutcome> {
    let label_width = 56.0;
    let width = ui.available_width().min(520.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, COLUMN_HEIGHT), egui::Sense::hover());
    let column =
        egui::Rect::from_min_max(egui::pos2(rect.min.x + label_width, rect.min.y), rect.max);

    let (column_bg, hour_line, hour_label) = column_colors();
    let painter = ui.painter_at(rect);
    painter.rect_filled(column, 6.0, column_bg);

    // Hour lines, 8 AM through midnight
    for hour in (DAY_START / 60)..=(DAY_END / 60) {
        let y = column.min.y + minutes_to_top(hour * 60);
        painter.line_segment(
            [egui::pos2(column.min.x, y), egui::pos2(column.max.x, y)],
            egui::Stroke::new(1.0, hour_line),
        );
        painter.text(
            egui::pos2(column.min.x - 8.0, y),
            egui::Align2::RIGHT_CENTER,
            format_hour_label(hour),
            egui::FontId::proportional(11.0),
            hour_label,
        );
    }

    let trash_rect = egui::Rect::from_min_size(
        egui::pos2(column.min.x, column.min.y + DAY_MINUTES as f32),
        egui::vec2(column.width(), TRASH_HEIGHT),
    );
    if !editor.read_only() {
        let armed = editor
            .drag()
            .is_some_and(|d| d.latest_top + d.duration as f32 >= DAY_MINUTES as f32);
        let (bg, fg) = trash_colors(armed);
        painter.rect_filled(trash_rect, 6.0, bg);
        painter.text(
            trash_rect.center(),
            egui::Align2::CENTER_CENTER,
            format!("{} Drag here to delete", egui_phosphor::regular::TRASH),
            egui::FontId::proportional(13.0),
            fg,
        );
    }

    let block_rect = |top: f32, height: f32| {
        egui::Rect::from_min_size(
            egui::pos2(column.min.x + 6.0, column.min.y + top),
            egui::vec2(column.width() - 12.0, height.max(12.0)),
        )
    };

    for block in blocks.blocks() {
        let dragging = editor.is_dragging(&block.id);
        // The dragged block follows the pointer, trash strip included
        let top = match editor.drag() {
            Some(d) if dragging => d.latest_top,
            _ => minutes_to_top(block.start_minutes),
        };
        let r = block_rect(top, block.duration() as f32);
        let (top_color, bottom_color) = block_colors(block.start_minutes);
        paint_gradient(&painter, r, top_color, bottom_color);
        if dragging {
            painter.rect_stroke(r, 4.0, egui::Stroke::new(2.0, Color32::WHITE));
        }

        let text_color = if block.start_minutes > DAY_START + DAY_MINUTES / 2 {
            Color32::WHITE
        } else {
            Color32::from_rgb(10, 20, 50)
        };
        painter.text(
            egui::pos2(r.min.x + 8.0, r.min.y + 4.0),
            egui::Align2::LEFT_TOP,
            &block.label,
            egui::FontId::proportional(13.0),
            text_color,
        );
        if dragging {
            painter.text(
                egui::pos2(r.max.x - 8.0, r.min.y + 4.0),
                egui::Align2::RIGHT_TOP,
                format!(
                    "{} – {}",
                    format_time_label(block.start_minutes),
                    format_time_label(block.end_minutes)
                ),
                egui::FontId::proportional(12.0),
                text_color,
            );
        }
    }

    if editor.read_only() {
        return None;
    }

    // Pointer handling
    let (pressed, down, released, pos) = ui.ctx().input(|i| {
        (
            i.pointer.button_pressed(egui::PointerButton::Primary),
            i.pointer.button_down(egui::PointerButton::Primary),
            i.pointer.button_released(egui::PointerButton::Primary),
            i.pointer.latest_pos(),
        )
    });

    if editor.drag().is_none() {
        if let Some(pos) = pos.filter(|p| column.contains(*p)) {
            let hit = blocks
                .blocks()
                .iter()
                .rev()
                .find(|b| {
                    block_rect(minutes_to_top(b.start_minutes), b.duration() as f32).contains(pos)
                })
                .cloned();
            if let Some(block) = hit {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                if pressed {
                    editor.press(&block, pos.y - column.min.y);
                }
            }
        }
        return None;
    }

    ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    match pos {
        Some(p) if !column.contains(p) => editor.pointer_left(blocks),
        _ if released || !down => editor.release(blocks),
        Some(p) => {
            editor.drag_to(p.y - column.min.y, blocks);
            ui.ctx().request_repaint();
            None
        }
        None => editor.pointer_left(blocks),
    }
}

/// Comment list plus input. Returns true when Send was clicked (or Enter).
pub fn render_comments(ui: &mut Ui, comments: &[Comment], draft: &mut String) -> bool {
    let muted = card_colors().2;
    for c in comments {
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(c.author()).strong());
            ui.label(RichText::new(&c.content).color(muted));
        });
    }

    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(draft)
                .hint_text("Add a little note…")
                .desired_width(280.0),
        );
        let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        ui.button("Send").clicked() || entered
    })
    .inner
}

pub fn like_button(ui: &mut Ui, liked: bool) -> bool {
    let (icon, text, color) = if liked {
        (egui_phosphor::fill::HEART, "Liked", theme::HEART)
    } else {
        (egui_phosphor::regular::HEART, "Like", card_colors().2)
    };
    let family = if liked { theme::phosphor_fill_family() } else { egui::FontFamily::Proportional };
    ui.horizontal(|ui| {
        let heart = ui.add(
            egui::Label::new(RichText::new(icon).family(family).size(16.0).color(color))
                .sense(egui::Sense::click()),
        );
        let label = ui.add(
            egui::Label::new(RichText::new(text).color(color)).sense(egui::Sense::click()),
        );
        if heart.hovered() || label.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        heart.clicked() || label.clicked()
    })
    .inner
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    ToggleLike,
    Open,
    Delete,
    SendComment,
}

pub fn render_post_card(
    ui: &mut Ui,
    card: &mut PostCard,
    direction_label: &str,
) -> Option<CardAction> {
    let (bg, border, muted) = card_colors();
    let mut action = None;

    egui::Frame::none()
        .fill(bg)
        .stroke(egui::Stroke::new(1.0, border))
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(egui::Margin::same(14.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            let title = card
                .post
                .title
                .clone()
                .unwrap_or_else(|| format!("{} • {}", card.post.day_label, direction_label));
            ui.label(RichText::new(title).size(16.0).strong());

            let mut meta = format!("{} · {}", card.post.day_label, direction_label);
            if let Some(author) = &card.post.author_name {
                meta.push_str(&format!(" · Made by {}", author));
            }
            ui.label(RichText::new(meta).color(muted));
            if let Some(note) = &card.post.note {
                ui.label(note);
            }

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if like_button(ui, card.liked) {
                    action = Some(CardAction::ToggleLike);
                }
                if ui.button("Open this day").clicked() {
                    action = Some(CardAction::Open);
                }
                if ui
                    .button(
                        RichText::new(format!("{} Delete", egui_phosphor::regular::TRASH))
                            .color(theme::ERROR),
                    )
                    .clicked()
                {
                    action = Some(CardAction::Delete);
                }
            });

            ui.add_space(4.0);
            if render_comments(ui, &card.comments, &mut card.draft) {
                action = Some(CardAction::SendComment);
            }
        });
    ui.add_space(10.0);

    action
}

/// Spinner row shown while a view's first fetch is outstanding
pub fn loading_row(ui: &mut Ui, text: &str) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(RichText::new(text).color(card_colors().2));
    });
}

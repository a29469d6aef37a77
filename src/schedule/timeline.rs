//! Day timeline geometry and the drag-to-reschedule state machine.
//!
//! The column maps one minute to one logical pixel, starting at `DAY_START`.
//! A trash strip of `TRASH_HEIGHT` pixels hangs below the last hour; a block
//! dropped with its bottom edge in that strip is deleted instead of moved.

use crate::api::{Block, BlockTimes, RowId};
use super::blocks::BlockStore;

pub const DAY_START: i32 = 8 * 60;
pub const DAY_END: i32 = 24 * 60;
pub const DAY_MINUTES: i32 = DAY_END - DAY_START;
pub const TRASH_HEIGHT: f32 = 40.0;
pub const COLUMN_HEIGHT: f32 = DAY_MINUTES as f32 + TRASH_HEIGHT;

const FIRST_BLOCK_START: i32 = 9 * 60;
const GAP_AFTER_LAST: i32 = 15;

pub fn minutes_to_top(minutes: i32) -> f32 {
    (minutes - DAY_START) as f32
}

/// Pixel top of a dragged block. The block may travel into the trash strip
/// but never past the bottom of the column.
pub fn pixel_to_trash_aware_top(pointer_y: f32, offset_y: f32, duration: i32) -> f32 {
    let max_top = COLUMN_HEIGHT - duration as f32;
    let mut top = pointer_y - offset_y;
    if top < 0.0 {
        top = 0.0;
    }
    if top > max_top {
        top = max_top;
    }
    top
}

/// Minute range for a pixel top, ignoring the trash strip
pub fn pixel_to_clamped_minutes(top: f32, duration: i32) -> (i32, i32) {
    let clamped = top.min((DAY_MINUTES - duration) as f32).max(0.0);
    let start = DAY_START + clamped.round() as i32;
    (start, start + duration)
}

pub fn is_in_trash(top: f32, duration: i32) -> bool {
    top + duration as f32 >= DAY_MINUTES as f32
}

/// Where a newly added block of `duration` minutes lands: 15 minutes after
/// the last block, never before 9 AM, always inside the day.
pub fn compute_default_start(duration: i32, blocks: &[Block]) -> i32 {
    let wanted = match blocks.last() {
        Some(last) => FIRST_BLOCK_START.max(last.end_minutes + GAP_AFTER_LAST),
        None => FIRST_BLOCK_START,
    };
    wanted.max(DAY_START).min(DAY_END - duration)
}

fn twelve_hour(hour: i32) -> (i32, &'static str) {
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    (((hour + 11) % 12) + 1, suffix)
}

/// "9:05 AM"
pub fn format_time_label(minutes: i32) -> String {
    let (hour, suffix) = twelve_hour(minutes / 60);
    format!("{}:{:02} {}", hour, minutes % 60, suffix)
}

/// Axis label, "9 AM". Midnight at the end of the day reads "12 PM" the way
/// the hour arithmetic falls out.
pub fn format_hour_label(hour: i32) -> String {
    let (display, suffix) = twelve_hour(hour);
    format!("{} {}", display, suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const LIGHT_TOP: Rgb = Rgb(147, 197, 253);
const LIGHT_BOTTOM: Rgb = Rgb(125, 180, 252);
const DARK_TOP: Rgb = Rgb(30, 58, 138);
const DARK_BOTTOM: Rgb = Rgb(16, 41, 121);

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    Rgb(lerp_channel(a.0, b.0, t), lerp_channel(a.1, b.1, t), lerp_channel(a.2, b.2, t))
}

/// Two gradient stops for a block, light blue in the morning shading to deep
/// blue at midnight.
pub fn block_gradient(start_minutes: i32) -> (Rgb, Rgb) {
    let clamped = start_minutes.clamp(DAY_START, DAY_END);
    let t = (clamped - DAY_START) as f32 / DAY_MINUTES as f32;
    (lerp_rgb(LIGHT_TOP, DARK_TOP, t), lerp_rgb(LIGHT_BOTTOM, DARK_BOTTOM, t))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub block_id: RowId,
    pub offset_y: f32,
    pub duration: i32,
    pub latest_top: f32,
}

/// What to tell the backend once a drag ends
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Delete(RowId),
    Reschedule(RowId, BlockTimes),
}

#[derive(Debug, Default)]
pub struct TimelineEditor {
    drag: Option<DragState>,
    read_only: bool,
}

impl TimelineEditor {
    pub fn new(read_only: bool) -> Self {
        Self { drag: None, read_only }
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self, block_id: &RowId) -> bool {
        self.drag.as_ref().is_some_and(|d| &d.block_id == block_id)
    }

    /// Pointer went down on `block`; `pointer_y` is relative to the column top.
    pub fn press(&mut self, block: &Block, pointer_y: f32) -> bool {
        if self.read_only || self.drag.is_some() {
            return false;
        }
        let start_top = minutes_to_top(block.start_minutes);
        self.drag = Some(DragState {
            block_id: block.id.clone(),
            offset_y: pointer_y - start_top,
            duration: block.duration(),
            latest_top: start_top,
        });
        true
    }

    /// Follow the pointer, writing the new times into the local list only
    pub fn drag_to(&mut self, pointer_y: f32, blocks: &mut BlockStore) {
        if self.read_only {
            return;
        }
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let top = pixel_to_trash_aware_top(pointer_y, drag.offset_y, drag.duration);
        let (start, end) = pixel_to_clamped_minutes(top, drag.duration);
        blocks.set_times(&drag.block_id, start, end);
        drag.latest_top = top;
    }

    /// Pointer released: decide between deleting and rescheduling
    pub fn release(&mut self, blocks: &mut BlockStore) -> Option<DragOutcome> {
        let drag = self.drag.take()?;
        if self.read_only {
            return None;
        }
        let block = blocks.get(&drag.block_id)?.clone();

        if is_in_trash(drag.latest_top, drag.duration) {
            blocks.remove(&block.id);
            return Some(DragOutcome::Delete(block.id));
        }

        blocks.sort();
        Some(DragOutcome::Reschedule(
            block.id,
            BlockTimes {
                start_minutes: block.start_minutes,
                end_minutes: block.end_minutes,
            },
        ))
    }

    /// Leaving the column mid-drag commits exactly like a release
    pub fn pointer_left(&mut self, blocks: &mut BlockStore) -> Option<DragOutcome> {
        if self.drag.is_none() {
            return None;
        }
        self.release(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BlockKind;
    use proptest::prelude::*;

    fn block(id: i64, start: i32, end: i32) -> Block {
        Block {
            id: RowId::Int(id),
            schedule_id: RowId::Int(1),
            label: format!("block {}", id),
            kind: BlockKind::Do,
            day_index: 0,
            start_minutes: start,
            end_minutes: end,
        }
    }

    #[test]
    fn default_start_for_empty_day_is_nine() {
        let start = compute_default_start(60, &[]);
        assert_eq!((start, start + 60), (540, 600));
    }

    #[test]
    fn default_start_follows_last_block() {
        assert_eq!(compute_default_start(60, &[block(1, 540, 610)]), 625);
        // Early blocks still push nothing before 9 AM
        assert_eq!(compute_default_start(30, &[block(1, 480, 490)]), 540);
    }

    #[test]
    fn default_start_never_overflows_the_day() {
        assert_eq!(compute_default_start(90, &[block(1, 1300, 1400)]), DAY_END - 90);
    }

    #[test]
    fn bottom_past_day_window_is_trash() {
        // 60 minute block with top at 910 px -> bottom 970 px
        assert!(is_in_trash(910.0, 60));
        assert!(is_in_trash(900.0, 60));
        assert!(!is_in_trash(899.0, 60));
    }

    #[test]
    fn time_clamp_ignores_trash_strip() {
        let top = pixel_to_trash_aware_top(2000.0, 0.0, 60);
        assert_eq!(top, COLUMN_HEIGHT - 60.0);
        assert_eq!(pixel_to_clamped_minutes(top, 60), (DAY_END - 60, DAY_END));
    }

    #[test]
    fn labels_use_twelve_hour_clock() {
        assert_eq!(format_time_label(540), "9:00 AM");
        assert_eq!(format_time_label(12 * 60 + 5), "12:05 PM");
        assert_eq!(format_time_label(0), "12:00 AM");
        assert_eq!(format_time_label(23 * 60 + 45), "11:45 PM");
        assert_eq!(format_hour_label(8), "8 AM");
        assert_eq!(format_hour_label(13), "1 PM");
    }

    #[test]
    fn gradient_endpoints_match_anchors() {
        assert_eq!(block_gradient(480), (Rgb(147, 197, 253), Rgb(125, 180, 252)));
        assert_eq!(block_gradient(1440), (Rgb(30, 58, 138), Rgb(16, 41, 121)));
        // Out of range clamps to the anchors
        assert_eq!(block_gradient(0), block_gradient(480));
    }

    #[test]
    fn drag_moves_block_and_commits_times() {
        let mut blocks = BlockStore::from_rows(vec![block(1, 540, 600)]);
        let mut editor = TimelineEditor::new(false);

        // Grab 10 px below the block top (top = 60)
        assert!(editor.press(&blocks.blocks()[0].clone(), 70.0));
        editor.drag_to(190.0, &mut blocks);
        assert_eq!(blocks.blocks()[0].start_minutes, 660);
        assert_eq!(blocks.blocks()[0].end_minutes, 720);

        let outcome = editor.release(&mut blocks);
        assert_eq!(
            outcome,
            Some(DragOutcome::Reschedule(
                RowId::Int(1),
                BlockTimes {
                    start_minutes: 660,
                    end_minutes: 720,
                },
            ))
        );
        assert!(editor.drag().is_none());
    }

    #[test]
    fn drop_in_trash_deletes_locally() {
        let mut blocks = BlockStore::from_rows(vec![block(1, 540, 600), block(2, 700, 760)]);
        let mut editor = TimelineEditor::new(false);
        editor.press(&blocks.blocks()[0].clone(), 60.0);
        editor.drag_to(970.0, &mut blocks);

        // Time math stays inside the day even while the pixel is in the trash
        let dragged = blocks.get(&RowId::Int(1)).unwrap();
        assert!(dragged.end_minutes <= DAY_END);

        assert_eq!(editor.release(&mut blocks), Some(DragOutcome::Delete(RowId::Int(1))));
        assert_eq!(blocks.blocks().len(), 1);
    }

    #[test]
    fn pointer_leave_commits_like_release() {
        let mut blocks = BlockStore::from_rows(vec![block(1, 540, 600)]);
        let mut editor = TimelineEditor::new(false);
        editor.press(&blocks.blocks()[0].clone(), 60.0);
        editor.drag_to(120.0, &mut blocks);
        assert!(matches!(editor.pointer_left(&mut blocks), Some(DragOutcome::Reschedule(..))));
        assert_eq!(editor.pointer_left(&mut blocks), None);
    }

    #[test]
    fn read_only_never_drags() {
        let mut blocks = BlockStore::from_rows(vec![block(1, 540, 600)]);
        let mut editor = TimelineEditor::new(true);
        assert!(!editor.press(&blocks.blocks()[0].clone(), 60.0));
        editor.drag_to(300.0, &mut blocks);
        assert_eq!(blocks.blocks()[0].start_minutes, 540);
        assert_eq!(editor.release(&mut blocks), None);
    }

    #[test]
    fn release_after_block_vanished_is_silent() {
        let mut blocks = BlockStore::from_rows(vec![block(1, 540, 600)]);
        let mut editor = TimelineEditor::new(false);
        editor.press(&blocks.blocks()[0].clone(), 60.0);
        blocks.replace_all(Vec::new());
        assert_eq!(editor.release(&mut blocks), None);
        assert!(editor.drag().is_none());
    }

    proptest! {
        #[test]
        fn prop_default_start_stays_in_day(
            duration in 15i32..=150,
            last_end in prop::option::of(DAY_START + 15..=DAY_END),
        ) {
            let existing: Vec<Block> = last_end
                .map(|end| vec![block(1, end - 15, end)])
                .unwrap_or_default();
            let start = compute_default_start(duration, &existing);
            prop_assert!(start >= DAY_START);
            prop_assert!(start <= DAY_END - duration);
            if let Some(end) = last_end {
                prop_assert!(start >= (end + 15).min(DAY_END - duration));
            }
        }

        #[test]
        fn prop_drag_keeps_times_in_day(
            duration in 15i32..=150,
            pointer_y in -500.0f32..2000.0,
            offset_y in 0.0f32..150.0,
        ) {
            let top = pixel_to_trash_aware_top(pointer_y, offset_y, duration);
            prop_assert!(top >= 0.0);
            prop_assert!(top + duration as f32 <= COLUMN_HEIGHT);
            let (start, end) = pixel_to_clamped_minutes(top, duration);
            prop_assert!(start >= DAY_START);
            prop_assert!(end <= DAY_END);
            prop_assert_eq!(end - start, duration);
        }

        #[test]
        fn prop_gradient_darkens_through_the_day(
            a in DAY_START..=DAY_END,
            b in DAY_START..=DAY_END,
        ) {
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let (e1, e2) = block_gradient(early);
            let (l1, l2) = block_gradient(late);
            prop_assert!(l1.0 <= e1.0 && l1.1 <= e1.1 && l1.2 <= e1.2);
            prop_assert!(l2.0 <= e2.0 && l2.1 <= e2.1 && l2.2 <= e2.2);
        }
    }
}

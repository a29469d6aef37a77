mod blocks;
mod timeline;

pub use blocks::BlockStore;
pub use timeline::*;

use crate::api::{BlockKind, NewBlock, RowId};

pub const DAY_LABEL: &str = "Day 1";

/// Durations offered for activities, in minutes
pub const ACTIVITY_DURATIONS: [(i32, &str); 5] = [
    (30, "30 min"),
    (60, "1 hour"),
    (90, "1.5 hours"),
    (120, "2 hours"),
    (150, "2.5 hours"),
];
pub const DEFAULT_ACTIVITY_DURATION: i32 = 60;
pub const MEAL_DURATION: i32 = 90;

/// Fixed palette entries: (kind, block label, palette label, minutes)
pub const BASICS: [(BlockKind, &str, &str, i32); 4] = [
    (BlockKind::Shower, "Shower", "Shower (30 min)", 30),
    (BlockKind::Goodmorning, "Say goodmorning", "Say goodmorning (15 min)", 15),
    (BlockKind::Goodnight, "Say goodnight", "Say goodnight (15 min)", 15),
    (BlockKind::Getready, "Get ready", "Get ready (30 min)", 30),
];

/// Row for a palette "Add", placed after the current last block
pub fn new_block(
    schedule_id: &RowId,
    kind: BlockKind,
    label: &str,
    duration: i32,
    blocks: &BlockStore,
) -> NewBlock {
    let start = compute_default_start(duration, blocks.blocks());
    NewBlock {
        schedule_id: schedule_id.clone(),
        label: label.to_string(),
        kind,
        day_index: 0,
        start_minutes: start,
        end_minutes: start + duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_add_appends_after_last_block() {
        let sid = RowId::Int(5);
        let mut blocks = BlockStore::new();
        let first = new_block(&sid, BlockKind::Eat, "Thai", MEAL_DURATION, &blocks);
        assert_eq!((first.start_minutes, first.end_minutes), (540, 630));

        blocks.insert(crate::api::Block {
            id: RowId::Int(1),
            schedule_id: sid.clone(),
            label: first.label.clone(),
            kind: first.kind,
            day_index: 0,
            start_minutes: first.start_minutes,
            end_minutes: first.end_minutes,
        });
        let (kind, label, _, minutes) = BASICS[0];
        let second = new_block(&sid, kind, label, minutes, &blocks);
        assert_eq!((second.start_minutes, second.end_minutes), (645, 675));
        assert_eq!(second.label, "Shower");
    }
}

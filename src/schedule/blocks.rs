use crate::api::{Block, RowId};

/// Local copy of one schedule's blocks, kept in start-time order.
///
/// Edits land here first; the backend write follows. A fresh fetch replaces
/// everything, which is the only reconciliation with the server.
#[derive(Debug, Default, Clone)]
pub struct BlockStore {
    blocks: Vec<Block>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Block>) -> Self {
        let mut store = Self { blocks: rows };
        store.sort();
        store
    }

    pub fn replace_all(&mut self, rows: Vec<Block>) {
        self.blocks = rows;
        self.sort();
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, id: &RowId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// Add a row the server just created
    pub fn insert(&mut self, block: Block) {
        self.blocks.push(block);
        self.sort();
    }

    /// Returns false when the block isn't here (deleted mid-drag)
    pub fn set_times(&mut self, id: &RowId, start_minutes: i32, end_minutes: i32) -> bool {
        match self.blocks.iter_mut().find(|b| &b.id == id) {
            Some(block) => {
                block.start_minutes = start_minutes;
                block.end_minutes = end_minutes;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &RowId) -> Option<Block> {
        let idx = self.blocks.iter().position(|b| &b.id == id)?;
        Some(self.blocks.remove(idx))
    }

    /// Stable sort, so blocks starting together keep their relative order
    pub fn sort(&mut self) {
        self.blocks.sort_by_key(|b| b.start_minutes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BlockKind;
    use pretty_assertions::assert_eq;

    fn block(id: i64, start: i32) -> Block {
        Block {
            id: RowId::Int(id),
            schedule_id: RowId::Int(1),
            label: format!("b{}", id),
            kind: BlockKind::Eat,
            day_index: 0,
            start_minutes: start,
            end_minutes: start + 30,
        }
    }

    fn ids(store: &BlockStore) -> Vec<RowId> {
        store.blocks().iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn insert_keeps_start_order() {
        let mut store = BlockStore::from_rows(vec![block(1, 600), block(2, 540)]);
        store.insert(block(3, 570));
        assert_eq!(ids(&store), vec![RowId::Int(2), RowId::Int(3), RowId::Int(1)]);
    }

    #[test]
    fn set_times_on_missing_block_is_noop() {
        let mut store = BlockStore::from_rows(vec![block(1, 600)]);
        assert!(!store.set_times(&RowId::Int(9), 0, 10));
        assert!(store.set_times(&RowId::Int(1), 620, 650));
        assert_eq!(store.get(&RowId::Int(1)).map(|b| b.start_minutes), Some(620));
    }

    #[test]
    fn remove_returns_the_block() {
        let mut store = BlockStore::from_rows(vec![block(1, 600), block(2, 660)]);
        assert_eq!(store.remove(&RowId::Int(1)).map(|b| b.label), Some("b1".to_string()));
        assert_eq!(store.remove(&RowId::Int(1)), None);
        assert_eq!(store.blocks().len(), 1);
    }

    #[test]
    fn refetch_replaces_local_state() {
        let mut store = BlockStore::from_rows(vec![block(1, 600)]);
        store.set_times(&RowId::Int(1), 900, 930);
        store.replace_all(vec![block(1, 600), block(4, 500)]);
        assert_eq!(ids(&store), vec![RowId::Int(4), RowId::Int(1)]);
        assert_eq!(store.get(&RowId::Int(1)).map(|b| b.start_minutes), Some(600));
    }
}

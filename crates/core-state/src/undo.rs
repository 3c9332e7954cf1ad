use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Default number of snapshots retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 100;

/// Snapshot classification controlling coalescing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Start of a coalesced typing run.
    InsertRun,
    /// Discrete edit (delete, paste, selection replacement, value set).
    Edit,
}

/// Committed content plus selection at capture time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSnapshot {
    pub kind: SnapshotKind,
    pub text: String,
    pub anchor: usize,
    pub caret: usize,
    /// Content hash at capture, used to skip duplicate snapshots.
    pub hash: u64,
}

impl EditSnapshot {
    pub fn capture(kind: SnapshotKind, text: String, anchor: usize, caret: usize) -> Self {
        let hash = text_hash(&text);
        Self {
            kind,
            text,
            anchor,
            caret,
            hash,
        }
    }
}

/// Insert run state tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertRun {
    Inactive,
    Active { edits: u32 },
}

pub struct UndoEngine {
    undo_stack: Vec<EditSnapshot>,
    redo_stack: Vec<EditSnapshot>,
    insert_run: InsertRun,
    capacity: usize,
    /// Count of snapshots skipped due to identical successive content.
    undo_snapshots_skipped: AtomicU64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_MAX)
    }
}

impl UndoEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            insert_run: InsertRun::Inactive,
            capacity: capacity.max(1),
            undo_snapshots_skipped: AtomicU64::new(0),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn insert_run(&self) -> &InsertRun {
        &self.insert_run
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.undo_snapshots_skipped.load(Ordering::Relaxed)
    }

    pub fn push_snapshot(&mut self, snap: EditSnapshot) {
        if let Some(last) = self.undo_stack.last()
            && last.hash == snap.hash
        {
            self.undo_snapshots_skipped.fetch_add(1, Ordering::Relaxed);
            trace!(
                target: "state.undo",
                undo_depth = self.undo_stack.len(),
                redo_depth = self.redo_stack.len(),
                hash = snap.hash,
                "snapshot_dedupe_skip"
            );
            return;
        }
        let hash = snap.hash;
        self.undo_stack.push(snap);
        trace!(
            target: "state.undo",
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            hash,
            "push_snapshot"
        );
        if self.undo_stack.len() > self.capacity {
            let _ = self.undo_stack.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
    }

    /// Snapshot once at the start of a typing run; later inserts in the run
    /// share it.
    pub fn begin_insert_coalescing(&mut self, snap: EditSnapshot) {
        match self.insert_run {
            InsertRun::Inactive => {
                self.push_snapshot(EditSnapshot {
                    kind: SnapshotKind::InsertRun,
                    ..snap
                });
                self.insert_run = InsertRun::Active { edits: 0 };
            }
            InsertRun::Active { .. } => {}
        }
    }

    pub fn end_insert_coalescing(&mut self) {
        self.insert_run = InsertRun::Inactive;
    }

    pub fn push_discrete_edit_snapshot(&mut self, snap: EditSnapshot) {
        self.end_insert_coalescing();
        self.push_snapshot(snap);
    }

    pub fn note_insert_edit(&mut self) {
        if let InsertRun::Active { edits } = &mut self.insert_run {
            *edits += 1;
        }
    }

    /// Swap `current` for the newest undo snapshot.
    pub fn undo(&mut self, current: EditSnapshot) -> Option<EditSnapshot> {
        self.end_insert_coalescing();
        let last = self.undo_stack.pop()?;
        trace!(
            target: "state.undo",
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "undo_pop"
        );
        self.redo_stack.push(current);
        Some(last)
    }

    pub fn redo(&mut self, current: EditSnapshot) -> Option<EditSnapshot> {
        self.end_insert_coalescing();
        let next = self.redo_stack.pop()?;
        trace!(
            target: "state.undo",
            redo_depth = self.redo_stack.len(),
            undo_depth = self.undo_stack.len(),
            "redo_pop"
        );
        self.undo_stack.push(current);
        Some(next)
    }

    /// Put back a snapshot taken by `undo`/`redo` whose application was vetoed.
    pub fn revert_undo(&mut self, taken: EditSnapshot) {
        self.redo_stack.pop();
        self.undo_stack.push(taken);
    }

    pub fn revert_redo(&mut self, taken: EditSnapshot) {
        self.undo_stack.pop();
        self.redo_stack.push(taken);
    }
}

fn text_hash(text: &str) -> u64 {
    let mut h = DefaultHasher::new();
    h.write(text.as_bytes());
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(text: &str, caret: usize) -> EditSnapshot {
        EditSnapshot::capture(SnapshotKind::Edit, text.to_string(), caret, caret)
    }

    #[test]
    fn typing_run_coalesces_into_one_snapshot() {
        let mut u = UndoEngine::default();
        u.begin_insert_coalescing(snap("", 0));
        u.note_insert_edit();
        u.begin_insert_coalescing(snap("a", 1));
        u.note_insert_edit();
        assert_eq!(u.undo_depth(), 1);
        assert_eq!(u.insert_run(), &InsertRun::Active { edits: 2 });
        let restored = u.undo(snap("ab", 2)).unwrap();
        assert_eq!(restored.text, "");
        assert_eq!(restored.kind, SnapshotKind::InsertRun);
        assert_eq!(u.redo_depth(), 1);
    }

    #[test]
    fn duplicate_content_is_skipped() {
        let mut u = UndoEngine::default();
        u.push_discrete_edit_snapshot(snap("abc", 3));
        u.push_discrete_edit_snapshot(snap("abc", 1));
        assert_eq!(u.undo_depth(), 1);
        assert_eq!(u.snapshots_skipped(), 1);
    }

    #[test]
    fn history_is_capped() {
        let mut u = UndoEngine::new(3);
        for i in 0..5 {
            u.push_discrete_edit_snapshot(snap(&"x".repeat(i), i));
        }
        assert_eq!(u.undo_depth(), 3);
        let oldest_kept = (0..3).fold(None, |_, _| u.undo(snap("cur", 0)));
        assert_eq!(oldest_kept.unwrap().text, "xx");
    }

    #[test]
    fn redo_round_trip_and_new_edit_clears_redo() {
        let mut u = UndoEngine::default();
        u.push_discrete_edit_snapshot(snap("a", 1));
        let back = u.undo(snap("ab", 2)).unwrap();
        assert_eq!(back.text, "a");
        let fwd = u.redo(back).unwrap();
        assert_eq!(fwd.text, "ab");
        u.undo(fwd).unwrap();
        u.push_discrete_edit_snapshot(snap("a!", 2));
        assert_eq!(u.redo_depth(), 0);
        assert!(u.redo(snap("a!", 2)).is_none());
    }

    #[test]
    fn vetoed_undo_is_reverted() {
        let mut u = UndoEngine::default();
        u.push_discrete_edit_snapshot(snap("a", 1));
        let taken = u.undo(snap("ab", 2)).unwrap();
        u.revert_undo(taken);
        assert_eq!((u.undo_depth(), u.redo_depth()), (1, 0));
    }
}

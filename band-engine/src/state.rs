//! FILENAME: band-engine/src/state.rs
//! PURPOSE: The mutable state of one run.
//! CONTEXT: Owned exclusively by a single `BandProcessor`, created when the
//! run starts and dropped with it. Nothing here outlives or is shared
//! between runs.

use std::sync::Arc;
use smallvec::{smallvec, SmallVec};
use report_model::{Record, Value};
use crate::group_break::GroupKey;
use crate::variables::VariableManager;

/// What is known about one group level while it is open.
#[derive(Debug, Clone, Default)]
pub struct GroupLevelState {
    /// Key component the level was opened with.
    pub key: Value,
    /// Driving record that opened the level (reprinted headers use it).
    pub record: Option<Arc<Record>>,
}

/// Page, column, group and accumulator state of a run.
#[derive(Debug)]
pub struct RunState {
    /// Current page number (1-based).
    pub page: u32,
    /// Pages started so far, including the first.
    pub pages_started: u32,
    /// Current column (0-based).
    pub column: u32,

    /// Per-level state, sized from the declared level count.
    pub levels: SmallVec<[GroupLevelState; 8]>,
    /// Number of group levels whose header has been emitted and whose
    /// footer has not. Levels 0..open_levels are open.
    pub open_levels: usize,
    /// Key tuple of the most recently planned driving record.
    pub current_key: GroupKey,
    /// Driving record most recently pulled from the cursor.
    pub last_record: Option<Arc<Record>>,

    pub variables: VariableManager,

    pub records_processed: u64,
    pub events_emitted: u64,

    /// A content band has been placed on the current page / column.
    pub page_has_content: bool,
    pub column_has_content: bool,
    /// The next page break restarts numbering at 1.
    pub reset_page_pending: bool,
}

impl RunState {
    pub fn new(level_count: usize, variables: VariableManager) -> Self {
        RunState {
            page: 1,
            pages_started: 1,
            column: 0,
            levels: smallvec![GroupLevelState::default(); level_count],
            open_levels: 0,
            current_key: GroupKey::new(),
            last_record: None,
            variables,
            records_processed: 0,
            events_emitted: 0,
            page_has_content: false,
            column_has_content: false,
            reset_page_pending: false,
        }
    }

    /// Moves to the top of the next page.
    pub fn advance_page(&mut self) {
        self.page = if self.reset_page_pending { 1 } else { self.page + 1 };
        self.reset_page_pending = false;
        self.pages_started += 1;
        self.column = 0;
        self.page_has_content = false;
        self.column_has_content = false;
    }

    /// Moves to the top of the next column on the same page.
    pub fn advance_column(&mut self) {
        self.column += 1;
        self.column_has_content = false;
    }

    pub fn open_group(&mut self, level: usize, key: Value, record: Arc<Record>) {
        if let Some(slot) = self.levels.get_mut(level) {
            slot.key = key;
            slot.record = Some(record);
        }
    }
}

//! Board core: the client-held board state for one project, the drag
//! reconciliation that runs on every hover tick, and the commit planning
//! that turns a finished gesture into a Reorder Batch.
//!
//! Everything here is pure and synchronous. Storage is only touched by the
//! caller, which submits the returned batch through `TaskStore::reorder_tasks`.

use crate::db::models::{BoardSnapshot, ReorderEntry, Task, TaskPriority, TaskStatus};

/// Task summary as held on the board. Carries just enough to render a card
/// and replay the arrangement; full records stay in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardTask {
    pub id: i64,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub position: i64,
}

impl From<&Task> for BoardTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            status: task.status,
            priority: task.priority,
            position: task.position,
        }
    }
}

/// What the pointer is over: another task's card, or empty lane space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Task(i64),
    Lane(TaskStatus),
}

/// Ordered view of one project's tasks, lanes derived by `status`.
///
/// The sequence is the board's source of truth during a gesture: within each
/// lane, sequence order is display order. Positions are only rewritten by
/// [`GestureSession::finish`], which renumbers every lane from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub project_id: i64,
    /// Board version the arrangement was fetched at; echoed into every
    /// commit batch so concurrent reorders are detected instead of
    /// overwritten.
    pub version: i64,
    tasks: Vec<BoardTask>,
}

/// A Reorder Batch plus the context needed to submit it: one entry per task
/// on the board (the whole arrangement is resent), stamped with the version
/// the client built it against.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderBatch {
    pub project_id: i64,
    pub version: i64,
    pub entries: Vec<ReorderEntry>,
}

/// One drag gesture, pickup to drop. Holding the active id in a session
/// value (rather than ambient state) makes the lifecycle explicit: a session
/// is created by [`BoardState::begin_gesture`] and consumed by
/// [`GestureSession::finish`].
#[derive(Debug)]
pub struct GestureSession {
    active_id: i64,
}

impl BoardState {
    /// Bootstrap the board from store records. Stable sort on `position`,
    /// so ties (possible only for data created outside the reorder path)
    /// keep arrival order.
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        let mut tasks: Vec<BoardTask> = snapshot.tasks.iter().map(BoardTask::from).collect();
        tasks.sort_by_key(|t| t.position);
        Self {
            project_id: snapshot.project_id,
            version: snapshot.version,
            tasks,
        }
    }

    pub fn tasks(&self) -> &[BoardTask] {
        &self.tasks
    }

    /// Tasks of one lane, in display order.
    pub fn lane(&self, status: TaskStatus) -> Vec<&BoardTask> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Task ids of one lane, in display order.
    pub fn lane_ids(&self, status: TaskStatus) -> Vec<i64> {
        self.lane(status).iter().map(|t| t.id).collect()
    }

    fn index_of(&self, id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Start tracking a gesture. Yields nothing if the task is not on the
    /// board (e.g. concurrently deleted); only one session exists at a time
    /// because the caller holds it by value.
    pub fn begin_gesture(&self, active_id: i64) -> Option<GestureSession> {
        self.index_of(active_id).map(|_| GestureSession { active_id })
    }

    /// Record a confirmed commit: storage incremented its stamp, so the
    /// client-held version follows, keeping an immediately started next
    /// gesture submittable without a refetch.
    pub fn confirm_commit(&mut self) {
        self.version += 1;
    }

    /// Rewrite every task's position as its zero-based index within its
    /// lane. Total, not incremental: no gaps or duplicates can survive.
    fn renumber(&mut self) -> Vec<ReorderEntry> {
        let mut counters = [0i64; TaskStatus::ALL.len()];
        let mut entries = Vec::with_capacity(self.tasks.len());
        for task in &mut self.tasks {
            let slot = lane_ordinal(task.status);
            task.position = counters[slot];
            counters[slot] += 1;
            entries.push(ReorderEntry {
                id: task.id,
                status: task.status,
                position: task.position,
            });
        }
        entries
    }
}

fn lane_ordinal(status: TaskStatus) -> usize {
    match status {
        TaskStatus::Todo => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Review => 2,
        TaskStatus::Done => 3,
    }
}

/// Move the task at `active_idx` out of the sequence, give it `status`, and
/// reinsert it immediately before `over_id` (single-element move, not a swap).
fn splice_before(tasks: &mut Vec<BoardTask>, active_idx: usize, over_id: i64, status: TaskStatus) {
    let mut moved = tasks.remove(active_idx);
    moved.status = status;
    let insert_at = tasks
        .iter()
        .position(|t| t.id == over_id)
        .unwrap_or(tasks.len());
    tasks.insert(insert_at, moved);
}

impl GestureSession {
    pub fn active_id(&self) -> i64 {
        self.active_id
    }

    /// Hover-tick reconciliation: produce the board the drop would leave
    /// behind, for live feedback. Pure and idempotent; runs on every input
    /// event and never touches storage.
    ///
    /// Same-lane hovers do not reindex (placement within a lane is decided
    /// at drop time); cross-lane hovers move the task so the preview matches
    /// the final arrangement. Events naming ids absent from the board are
    /// ignored.
    pub fn reconcile(&self, board: &BoardState, over: DropTarget) -> BoardState {
        let Some(active_idx) = board.index_of(self.active_id) else {
            return board.clone();
        };

        match over {
            DropTarget::Lane(lane) => {
                if board.tasks[active_idx].status == lane {
                    return board.clone();
                }
                // Relocate in place: lane changes, index within the
                // sequence does not.
                let mut next = board.clone();
                next.tasks[active_idx].status = lane;
                next
            },
            DropTarget::Task(over_id) => {
                if over_id == self.active_id {
                    return board.clone();
                }
                let Some(over_idx) = board.index_of(over_id) else {
                    return board.clone();
                };
                if board.tasks[active_idx].status == board.tasks[over_idx].status {
                    return board.clone();
                }
                let status = board.tasks[over_idx].status;
                let mut next = board.clone();
                splice_before(&mut next.tasks, active_idx, over_id, status);
                next
            },
        }
    }

    /// Terminal drop: resolve the final arrangement, renumber every lane
    /// from zero, and build the Reorder Batch (every task's id/status/order).
    ///
    /// Consumes the session; a gesture ends exactly once. Returns `None`
    /// when the gesture is cancelled (`over` absent) or a referenced id has
    /// left the board, in which case nothing may be mutated or submitted.
    pub fn finish(self, board: &BoardState, over: Option<DropTarget>) -> Option<(BoardState, ReorderBatch)> {
        let over = over?;
        let active_idx = board.index_of(self.active_id)?;

        let mut next = board.clone();
        match over {
            DropTarget::Lane(lane) => {
                next.tasks[active_idx].status = lane;
            },
            DropTarget::Task(over_id) if over_id == self.active_id => {
                // Dropped back onto itself: arrangement unchanged, but the
                // renumber below still runs so the batch stays total.
            },
            DropTarget::Task(over_id) => {
                let over_idx = next.index_of(over_id)?;
                let status = next.tasks[over_idx].status;
                splice_before(&mut next.tasks, active_idx, over_id, status);
            },
        }

        let entries = next.renumber();
        let batch = ReorderBatch {
            project_id: next.project_id,
            version: next.version,
            entries,
        };
        Some((next, batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i64, title: &str, status: TaskStatus, position: i64) -> Task {
        Task {
            id,
            project_id: 1,
            title: title.to_string(),
            description: None,
            status,
            priority: TaskPriority::Medium,
            position,
            due_date: None,
            created_at: Utc::now(),
            assignees: vec![],
        }
    }

    fn board(tasks: Vec<Task>) -> BoardState {
        BoardState::from_snapshot(&BoardSnapshot {
            project_id: 1,
            version: 0,
            tasks,
        })
    }

    /// todo=[1,2], in_progress=[3], review=[], done=[4]
    fn sample_board() -> BoardState {
        board(vec![
            record(1, "Research competitors", TaskStatus::Todo, 0),
            record(2, "Draft requirements", TaskStatus::Todo, 1),
            record(3, "Set up repo", TaskStatus::InProgress, 0),
            record(4, "Initial kickoff", TaskStatus::Done, 0),
        ])
    }

    fn lane_positions(b: &BoardState, status: TaskStatus) -> Vec<i64> {
        b.lane(status).iter().map(|t| t.position).collect()
    }

    #[test]
    fn test_bootstrap_sorts_by_position_stable() {
        let b = board(vec![
            record(5, "c", TaskStatus::Todo, 2),
            record(6, "a", TaskStatus::Todo, 0),
            record(7, "b", TaskStatus::Todo, 0),
        ]);
        // Ties keep arrival order (6 before 7)
        assert_eq!(b.lane_ids(TaskStatus::Todo), vec![6, 7, 5]);
    }

    #[test]
    fn test_begin_gesture_requires_present_task() {
        let b = sample_board();
        assert!(b.begin_gesture(1).is_some());
        assert!(b.begin_gesture(99).is_none());
    }

    #[test]
    fn test_reconcile_self_target_is_noop() {
        let b = sample_board();
        let session = b.begin_gesture(1).unwrap();
        let next = session.reconcile(&b, DropTarget::Task(1));
        assert_eq!(next, b);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let b = sample_board();
        let session = b.begin_gesture(1).unwrap();
        let once = session.reconcile(&b, DropTarget::Task(3));
        let twice = session.reconcile(&b, DropTarget::Task(3));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reconcile_lane_target_changes_status_only() {
        let b = sample_board();
        let session = b.begin_gesture(1).unwrap();
        let next = session.reconcile(&b, DropTarget::Lane(TaskStatus::Review));

        assert_eq!(next.lane_ids(TaskStatus::Review), vec![1]);
        assert_eq!(next.lane_ids(TaskStatus::Todo), vec![2]);
        // No positions were rewritten during the hover
        assert_eq!(next.tasks()[0].position, 0);
    }

    #[test]
    fn test_reconcile_same_lane_hover_does_not_reindex() {
        let b = sample_board();
        let session = b.begin_gesture(2).unwrap();
        let next = session.reconcile(&b, DropTarget::Task(1));
        assert_eq!(next, b);
    }

    #[test]
    fn test_reconcile_cross_lane_splices_before_target() {
        let b = sample_board();
        let session = b.begin_gesture(1).unwrap();
        let next = session.reconcile(&b, DropTarget::Task(3));

        assert_eq!(next.lane_ids(TaskStatus::Todo), vec![2]);
        assert_eq!(next.lane_ids(TaskStatus::InProgress), vec![1, 3]);
    }

    #[test]
    fn test_reconcile_ignores_vanished_target() {
        let b = sample_board();
        let session = b.begin_gesture(1).unwrap();
        let next = session.reconcile(&b, DropTarget::Task(42));
        assert_eq!(next, b);
    }

    #[test]
    fn test_reconcile_ignores_vanished_active() {
        let b = sample_board();
        let session = b.begin_gesture(1).unwrap();
        // Simulate concurrent deletion: rebuild a board without task 1
        let shrunk = board(vec![
            record(2, "Draft requirements", TaskStatus::Todo, 0),
            record(3, "Set up repo", TaskStatus::InProgress, 0),
        ]);
        let next = session.reconcile(&shrunk, DropTarget::Task(3));
        assert_eq!(next, shrunk);
    }

    #[test]
    fn test_finish_cancelled_gesture_yields_nothing() {
        let b = sample_board();
        let session = b.begin_gesture(1).unwrap();
        assert!(session.finish(&b, None).is_none());
    }

    #[test]
    fn test_finish_cross_lane_over_task() {
        // todo=[T1,T2], in_progress=[T3]; drag T1 onto T3.
        let b = sample_board();
        let session = b.begin_gesture(1).unwrap();
        let (next, batch) = session.finish(&b, Some(DropTarget::Task(3))).unwrap();

        assert_eq!(next.lane_ids(TaskStatus::Todo), vec![2]);
        assert_eq!(lane_positions(&next, TaskStatus::Todo), vec![0]);
        assert_eq!(next.lane_ids(TaskStatus::InProgress), vec![1, 3]);
        assert_eq!(lane_positions(&next, TaskStatus::InProgress), vec![0, 1]);

        // Whole board resent
        assert_eq!(batch.entries.len(), 4);
        let moved = batch.entries.iter().find(|e| e.id == 1).unwrap();
        assert_eq!(moved.status, TaskStatus::InProgress);
        assert_eq!(moved.position, 0);
    }

    #[test]
    fn test_finish_same_lane_inserts_before_target() {
        // todo=[T1,T2,T3]; drag T3 before T1.
        let b = board(vec![
            record(1, "a", TaskStatus::Todo, 0),
            record(2, "b", TaskStatus::Todo, 1),
            record(3, "c", TaskStatus::Todo, 2),
        ]);
        let session = b.begin_gesture(3).unwrap();
        let (next, _) = session.finish(&b, Some(DropTarget::Task(1))).unwrap();

        assert_eq!(next.lane_ids(TaskStatus::Todo), vec![3, 1, 2]);
        assert_eq!(lane_positions(&next, TaskStatus::Todo), vec![0, 1, 2]);
    }

    #[test]
    fn test_finish_lane_target_appends_nothing_but_status() {
        let b = sample_board();
        let session = b.begin_gesture(2).unwrap();
        let (next, batch) = session
            .finish(&b, Some(DropTarget::Lane(TaskStatus::Review)))
            .unwrap();

        assert_eq!(next.lane_ids(TaskStatus::Todo), vec![1]);
        assert_eq!(next.lane_ids(TaskStatus::Review), vec![2]);
        assert_eq!(batch.entries.len(), 4);
    }

    #[test]
    fn test_finish_self_drop_preserves_arrangement() {
        let b = sample_board();
        let session = b.begin_gesture(2).unwrap();
        let (next, batch) = session.finish(&b, Some(DropTarget::Task(2))).unwrap();

        assert_eq!(next.lane_ids(TaskStatus::Todo), b.lane_ids(TaskStatus::Todo));
        assert_eq!(
            next.lane_ids(TaskStatus::InProgress),
            b.lane_ids(TaskStatus::InProgress)
        );
        assert_eq!(batch.entries.len(), 4);
    }

    #[test]
    fn test_finish_renumbers_every_lane_contiguously() {
        // Positions with gaps and duplicates, as bulk-imported data may have
        let b = board(vec![
            record(1, "a", TaskStatus::Todo, 0),
            record(2, "b", TaskStatus::Todo, 0),
            record(3, "c", TaskStatus::Todo, 7),
            record(4, "d", TaskStatus::Done, 3),
        ]);
        let session = b.begin_gesture(1).unwrap();
        let (next, batch) = session.finish(&b, Some(DropTarget::Task(1))).unwrap();

        for status in TaskStatus::ALL {
            let positions = lane_positions(&next, status);
            let expected: Vec<i64> = (0..positions.len() as i64).collect();
            assert_eq!(positions, expected, "lane {status} not contiguous");
        }
        assert_eq!(batch.entries.len(), 4);
    }

    #[test]
    fn test_round_trip_restores_original_board() {
        let b = sample_board();

        // Gesture 1: T1 from todo onto T3 (in_progress)
        let session = b.begin_gesture(1).unwrap();
        let (moved, _) = session.finish(&b, Some(DropTarget::Task(3))).unwrap();

        // Gesture 2: T1 back before T2, its original successor in todo
        let session = moved.begin_gesture(1).unwrap();
        let (restored, _) = session.finish(&moved, Some(DropTarget::Task(2))).unwrap();

        for status in TaskStatus::ALL {
            assert_eq!(restored.lane_ids(status), b.lane_ids(status));
            assert_eq!(lane_positions(&restored, status), lane_positions(&b, status));
        }
    }

    #[test]
    fn test_batch_carries_board_version() {
        let mut b = sample_board();
        b.version = 5;
        let session = b.begin_gesture(1).unwrap();
        let (mut next, batch) = session.finish(&b, Some(DropTarget::Task(3))).unwrap();

        assert_eq!(batch.version, 5);
        assert_eq!(batch.project_id, 1);

        next.confirm_commit();
        assert_eq!(next.version, 6);
    }
}

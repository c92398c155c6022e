//! 髒標記追蹤與延遲儲存

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// 髒標記追蹤器
///
/// 記錄自上次儲存後被修改的零件與參數，以及最後一次修改的時間。
/// 連續修改會重新起算延遲，停止修改滿 `debounce` 後才到期。
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    dirty_components: BTreeSet<u32>,
    parameters_dirty: bool,
    last_change: Option<Instant>,
    debounce: Duration,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new(debounce: Duration) -> Self {
        Self {
            dirty_components: BTreeSet::new(),
            parameters_dirty: false,
            last_change: None,
            debounce,
        }
    }

    /// 標記零件為髒
    pub fn mark_component(&mut self, component_id: u32, now: Instant) {
        self.dirty_components.insert(component_id);
        self.touch(now);
    }

    /// 標記全域參數為髒
    pub fn mark_parameters(&mut self, now: Instant) {
        self.parameters_dirty = true;
        self.touch(now);
    }

    /// 整批變更（還原、匯入、批次操作）
    pub fn mark_all(&mut self, component_ids: impl IntoIterator<Item = u32>, now: Instant) {
        self.dirty_components.extend(component_ids);
        self.parameters_dirty = true;
        self.touch(now);
    }

    /// 是否有未儲存的變更
    pub fn is_dirty(&self) -> bool {
        self.last_change.is_some()
    }

    /// 檢查零件是否為髒
    pub fn is_component_dirty(&self, component_id: u32) -> bool {
        self.dirty_components.contains(&component_id)
    }

    pub fn parameters_dirty(&self) -> bool {
        self.parameters_dirty
    }

    /// 延遲時間是否已過
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_change {
            Some(changed) => now.saturating_duration_since(changed) >= self.debounce,
            None => false,
        }
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_components.clear();
        self.parameters_dirty = false;
        self.last_change = None;
    }

    /// 獲取所有髒零件（依 ID 排序）
    pub fn dirty_components(&self) -> Vec<u32> {
        self.dirty_components.iter().copied().collect()
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    fn touch(&mut self, now: Instant) {
        self.last_change = Some(match self.last_change {
            Some(previous) => previous.max(now),
            None => now,
        });
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_clear() {
        let now = Instant::now();
        let mut tracker = DirtyTracker::default();
        assert!(!tracker.is_dirty());

        tracker.mark_component(3, now);
        tracker.mark_component(1, now);
        tracker.mark_component(3, now);

        assert!(tracker.is_dirty());
        assert!(tracker.is_component_dirty(3));
        assert!(!tracker.parameters_dirty());
        assert_eq!(tracker.dirty_components(), vec![1, 3]);

        tracker.clear();
        assert!(!tracker.is_dirty());
        assert!(tracker.dirty_components().is_empty());
    }

    #[test]
    fn test_debounce_restarts_on_each_change() {
        let start = Instant::now();
        let mut tracker = DirtyTracker::new(Duration::from_millis(1000));

        tracker.mark_parameters(start);
        assert!(!tracker.is_due(start + Duration::from_millis(999)));

        tracker.mark_component(1, start + Duration::from_millis(800));
        assert!(!tracker.is_due(start + Duration::from_millis(1500)));
        assert!(tracker.is_due(start + Duration::from_millis(1800)));
    }

    #[test]
    fn test_mark_all() {
        let mut tracker = DirtyTracker::default();
        tracker.mark_all([2, 1], Instant::now());

        assert!(tracker.parameters_dirty());
        assert_eq!(tracker.dirty_components(), vec![1, 2]);
    }

    #[test]
    fn test_clean_tracker_is_never_due() {
        let tracker = DirtyTracker::default();
        assert!(!tracker.is_due(Instant::now() + Duration::from_secs(60)));
    }
}

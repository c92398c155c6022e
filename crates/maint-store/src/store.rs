//! 設定儲存
//!
//! 以固定鍵寫入設定快照。儲存與載入的失敗不會往外傳遞，
//! 而是記錄日誌並產生 [`Notice`] 供介面層顯示；匯入失敗則回傳錯誤。

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use maint_core::{
    ConfigSnapshot, GlobalParameters, MaintError, ParameterDefaults, Registry, Result,
};
use serde::{Deserialize, Serialize};

use crate::backend::PersistenceBackend;
use crate::dirty_tracking::DirtyTracker;

/// 預設儲存鍵
pub const STORAGE_KEY: &str = "rodamientos_config";

/// 可讀取的快照主版本
const SUPPORTED_MAJOR_VERSION: &str = "2";

/// 儲存設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// 儲存鍵
    pub key: String,

    /// 最後一次修改後延遲多久自動儲存
    pub debounce: Duration,

    /// 是否啟用自動儲存
    pub autosave: bool,
}

impl StoreOptions {
    /// 建構器模式：設置儲存鍵
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// 建構器模式：設置延遲時間
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// 建構器模式：設置自動儲存
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: STORAGE_KEY.to_string(),
            debounce: Duration::from_secs(1),
            autosave: true,
        }
    }
}

/// 提示等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 給介面層的提示訊息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// 載入結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 已套用儲存的設定
    Loaded,
    /// 沒有儲存的設定
    Missing,
    /// 後端不可用、解析失敗或格式不符；記憶體中的狀態保持不變
    Failed,
}

/// 設定儲存
pub struct ConfigurationStore<B: PersistenceBackend> {
    backend: B,
    options: StoreOptions,
    defaults: ParameterDefaults,
    tracker: DirtyTracker,
    notices: Vec<Notice>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl<B: PersistenceBackend> ConfigurationStore<B> {
    /// 創建新的設定儲存
    pub fn new(backend: B, options: StoreOptions, defaults: ParameterDefaults) -> Self {
        let tracker = DirtyTracker::new(options.debounce);
        Self {
            backend,
            options,
            defaults,
            tracker,
            notices: Vec::new(),
            last_saved_at: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn defaults(&self) -> &ParameterDefaults {
        &self.defaults
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    /// 最近一次成功儲存（或載入的快照）的時間
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// 取出並清空提示
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// 零件修改後標記
    pub fn mark_component_dirty(&mut self, component_id: u32, now: Instant) {
        self.tracker.mark_component(component_id, now);
    }

    /// 參數修改後標記
    pub fn mark_parameters_dirty(&mut self, now: Instant) {
        self.tracker.mark_parameters(now);
    }

    /// 整批修改後標記
    pub fn mark_all_dirty(&mut self, registry: &Registry, now: Instant) {
        self.tracker
            .mark_all(registry.records().iter().map(|r| r.id), now);
    }

    /// 延遲時間已過則自動儲存，回傳是否有寫入
    pub fn flush_if_due(
        &mut self,
        now: Instant,
        registry: &Registry,
        params: &GlobalParameters,
    ) -> bool {
        if !self.options.autosave || !self.tracker.is_due(now) {
            return false;
        }

        tracing::debug!(
            "自動儲存：零件 {:?}，參數變更 {}",
            self.tracker.dirty_components(),
            self.tracker.parameters_dirty()
        );
        self.save(registry, params)
    }

    /// 儲存目前狀態
    ///
    /// 失敗時記錄並產生提示，回傳 `false`；未儲存的標記保留，下次再試。
    pub fn save(&mut self, registry: &Registry, params: &GlobalParameters) -> bool {
        if !self.backend.is_available() {
            self.notify(NoticeLevel::Warning, "儲存功能在此環境不可用");
            return false;
        }

        let saved_at = Utc::now();
        let snapshot = ConfigSnapshot::from_state(registry.records(), params).with_saved_at(saved_at);
        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("設定序列化失敗: {}", e));
                return false;
            }
        };

        match self.backend.set_item(&self.options.key, &json) {
            Ok(()) => {
                self.tracker.clear();
                self.last_saved_at = Some(saved_at);
                tracing::info!("設定已儲存：零件 {} 筆", registry.len());
                self.notify(NoticeLevel::Success, "設定已儲存");
                true
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("儲存設定失敗: {}", e));
                false
            }
        }
    }

    /// 載入儲存的設定
    ///
    /// 成功時整批替換登錄簿與參數；其他情況保留記憶體中的狀態，由呼叫端以目前資料重新計算。
    pub fn load(&mut self, registry: &mut Registry, params: &mut GlobalParameters) -> LoadOutcome {
        if !self.backend.is_available() {
            self.notify(NoticeLevel::Warning, "載入功能在此環境不可用");
            return LoadOutcome::Failed;
        }

        let raw = match self.backend.get_item(&self.options.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.notify(NoticeLevel::Info, "沒有已儲存的設定");
                return LoadOutcome::Missing;
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("讀取設定失敗: {}", e));
                return LoadOutcome::Failed;
            }
        };

        let applied = ConfigSnapshot::from_json(&raw)
            .and_then(|snapshot| check_version(&snapshot).map(|_| snapshot))
            .and_then(|snapshot| self.apply(&snapshot, registry, params).map(|_| snapshot));

        match applied {
            Ok(snapshot) => {
                self.tracker.clear();
                self.last_saved_at = snapshot.saved_at;
                tracing::info!("設定已載入：零件 {} 筆", registry.len());
                self.notify(NoticeLevel::Success, "設定已載入");
                LoadOutcome::Loaded
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("載入設定失敗: {}", e));
                LoadOutcome::Failed
            }
        }
    }

    /// 還原初始資料與預設參數，並排程儲存
    pub fn restore_defaults(
        &mut self,
        registry: &mut Registry,
        params: &mut GlobalParameters,
        now: Instant,
    ) {
        registry.restore_defaults();
        *params = GlobalParameters::from_defaults(&self.defaults);
        self.mark_all_dirty(registry, now);

        tracing::info!("已還原預設值");
        self.notify(NoticeLevel::Info, "已還原預設值");
    }

    /// 匯出設定（格式化 JSON，含匯出時間）
    pub fn export(&self, registry: &Registry, params: &GlobalParameters) -> Result<String> {
        ConfigSnapshot::from_state(registry.records(), params)
            .with_exported_at(Utc::now())
            .to_json_pretty()
    }

    /// 匯出設定至檔案
    pub fn export_file(
        &mut self,
        path: &Path,
        registry: &Registry,
        params: &GlobalParameters,
    ) -> Result<()> {
        let json = self.export(registry, params)?;
        std::fs::write(path, json)?;

        tracing::info!("設定已匯出至 {}", path.display());
        self.notify(NoticeLevel::Success, "設定已匯出");
        Ok(())
    }

    /// 匯入設定
    ///
    /// 必須包含零件資料與預設品牌；所有記錄與參數都通過檢查後才套用，
    /// 任何錯誤都不會改變目前狀態。成功後立即儲存。
    pub fn import(
        &mut self,
        json: &str,
        registry: &mut Registry,
        params: &mut GlobalParameters,
    ) -> Result<()> {
        let result = ConfigSnapshot::from_json(json).and_then(|snapshot| {
            snapshot.require_complete()?;
            check_version(&snapshot)?;
            self.apply(&snapshot, registry, params)
        });

        if let Err(e) = result {
            self.notify(NoticeLevel::Error, format!("設定檔無效: {}", e));
            return Err(e);
        }

        tracing::info!("設定已匯入：零件 {} 筆", registry.len());
        self.notify(NoticeLevel::Success, "設定已匯入");
        self.save(registry, params);
        Ok(())
    }

    /// 從檔案匯入設定
    pub fn import_file(
        &mut self,
        path: &Path,
        registry: &mut Registry,
        params: &mut GlobalParameters,
    ) -> Result<()> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("無法讀取設定檔: {}", e));
                return Err(e.into());
            }
        };
        self.import(&json, registry, params)
    }

    /// 驗證快照後整批套用
    fn apply(
        &self,
        snapshot: &ConfigSnapshot,
        registry: &mut Registry,
        params: &mut GlobalParameters,
    ) -> Result<()> {
        let records = snapshot.records()?;
        let new_params = snapshot.parameters(&self.defaults)?;

        registry.replace_all(records)?;
        *params = new_params;
        Ok(())
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice::new(level, message);
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::debug!("{}", notice.message),
            NoticeLevel::Warning | NoticeLevel::Error => tracing::warn!("{}", notice.message),
        }
        self.notices.push(notice);
    }
}

/// 接受 2.x 版（未標版本視為相容）
fn check_version(snapshot: &ConfigSnapshot) -> Result<()> {
    match snapshot.version.as_deref() {
        None => Ok(()),
        Some(version) if version.split('.').next() == Some(SUPPORTED_MAJOR_VERSION) => Ok(()),
        Some(version) => Err(MaintError::InvalidSnapshot(format!(
            "不支援的版本 {}",
            version
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use maint_core::ComponentUpdate;

    fn store() -> ConfigurationStore<MemoryBackend> {
        ConfigurationStore::new(
            MemoryBackend::new(),
            StoreOptions::default(),
            ParameterDefaults::default(),
        )
    }

    #[test]
    fn test_save_then_load() {
        let mut store = store();
        let mut registry = Registry::plant_default();
        let params = GlobalParameters::default().with_safety_margin(2.0);
        registry.update(2, ComponentUpdate::Rpm(400.0)).unwrap();

        assert!(store.save(&registry, &params));
        assert!(store.last_saved_at().is_some());

        let mut loaded_registry = Registry::plant_default();
        let mut loaded_params = GlobalParameters::default();
        assert_eq!(
            store.load(&mut loaded_registry, &mut loaded_params),
            LoadOutcome::Loaded
        );

        assert_eq!(loaded_registry.get(2).unwrap().rpm, 400.0);
        assert_eq!(loaded_params, params);
    }

    #[test]
    fn test_load_missing_keeps_state() {
        let mut store = store();
        let mut registry = Registry::plant_default();
        registry.update(1, ComponentUpdate::Quantity(9)).unwrap();
        let mut params = GlobalParameters::default();

        assert_eq!(store.load(&mut registry, &mut params), LoadOutcome::Missing);
        assert_eq!(registry.get(1).unwrap().quantity, 9);
        assert_eq!(store.notices().last().unwrap().level, NoticeLevel::Info);
    }

    #[test]
    fn test_load_corrupt_data_keeps_state() {
        let mut store = store();
        store.backend_mut().set_item(STORAGE_KEY, "{not json").unwrap();
        let mut registry = Registry::plant_default();
        let mut params = GlobalParameters::default();

        assert_eq!(store.load(&mut registry, &mut params), LoadOutcome::Failed);
        assert_eq!(registry.len(), 26);
        assert_eq!(store.notices().last().unwrap().level, NoticeLevel::Error);
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let mut store = store();
        store
            .backend_mut()
            .set_item(STORAGE_KEY, r#"{"componentesData": [], "version": "3.0"}"#)
            .unwrap();
        let mut registry = Registry::plant_default();
        let mut params = GlobalParameters::default();

        assert_eq!(store.load(&mut registry, &mut params), LoadOutcome::Failed);
        assert_eq!(registry.len(), 26);
    }

    #[test]
    fn test_save_on_disabled_backend_never_fails() {
        let mut store = ConfigurationStore::new(
            MemoryBackend::disabled(),
            StoreOptions::default(),
            ParameterDefaults::default(),
        );
        let registry = Registry::plant_default();

        assert!(!store.save(&registry, &GlobalParameters::default()));
        assert_eq!(store.notices()[0].level, NoticeLevel::Warning);
    }

    #[test]
    fn test_save_over_quota_keeps_dirty_flag() {
        let mut store = ConfigurationStore::new(
            MemoryBackend::new().with_quota(64),
            StoreOptions::default(),
            ParameterDefaults::default(),
        );
        let registry = Registry::plant_default();
        store.mark_component_dirty(1, Instant::now());

        assert!(!store.save(&registry, &GlobalParameters::default()));
        assert!(store.tracker().is_dirty());
        let notices = store.drain_notices();
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.contains("配額"));
        assert!(store.notices().is_empty());
    }

    #[test]
    fn test_debounced_autosave() {
        let mut store = store();
        let registry = Registry::plant_default();
        let params = GlobalParameters::default();
        let start = Instant::now();

        store.mark_parameters_dirty(start);
        assert!(!store.flush_if_due(start + Duration::from_millis(500), &registry, &params));
        assert!(store.backend().is_empty());

        assert!(store.flush_if_due(start + Duration::from_secs(1), &registry, &params));
        assert_eq!(store.backend().len(), 1);
        assert!(!store.tracker().is_dirty());

        // 沒有新的修改不再寫入
        assert!(!store.flush_if_due(start + Duration::from_secs(5), &registry, &params));
    }

    #[test]
    fn test_autosave_disabled() {
        let mut store = ConfigurationStore::new(
            MemoryBackend::new(),
            StoreOptions::default().with_autosave(false),
            ParameterDefaults::default(),
        );
        let registry = Registry::plant_default();
        let start = Instant::now();
        store.mark_parameters_dirty(start);

        assert!(!store.flush_if_due(
            start + Duration::from_secs(10),
            &registry,
            &GlobalParameters::default()
        ));
    }

    #[test]
    fn test_restore_defaults_schedules_save() {
        let mut store = store();
        let mut registry = Registry::plant_default();
        let mut params = GlobalParameters::default().with_work_calendar(6, 48);
        registry.update(1, ComponentUpdate::Rpm(999.0)).unwrap();
        let now = Instant::now();

        store.restore_defaults(&mut registry, &mut params, now);

        assert_eq!(registry.get(1).unwrap().rpm, 300.0);
        assert_eq!(params, GlobalParameters::default());
        assert!(store.tracker().is_dirty());
        assert!(store.flush_if_due(now + Duration::from_secs(1), &registry, &params));
    }

    #[test]
    fn test_import_requires_components() {
        let mut store = store();
        let mut registry = Registry::plant_default();
        let mut params = GlobalParameters::default();
        let before = registry.records().to_vec();

        let result = store.import(r#"{"fabricanteGlobal": "SKF"}"#, &mut registry, &mut params);

        assert!(matches!(result, Err(MaintError::InvalidSnapshot(_))));
        assert_eq!(registry.records(), before.as_slice());
        assert_eq!(params.default_brand, "NSK");
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_import_with_invalid_record_changes_nothing() {
        let mut store = store();
        let mut registry = Registry::plant_default();
        let mut params = GlobalParameters::default();
        let json = r#"{"componentesData": [
            {"id": 1, "tipo": "6204", "categoria": "Rodamiento", "cantidad": 2, "rpm": 100,
             "carga": 0.5, "horas_diarias": 2, "criticidad": 1, "marca": "SKF"},
            {"id": 2, "tipo": "6205", "categoria": "Rodamiento", "cantidad": 2, "rpm": 0,
             "carga": 0.5, "horas_diarias": 2, "criticidad": 1, "marca": "SKF"}
        ], "fabricanteGlobal": "SKF", "margenSeguridad": "2"}"#;

        assert!(store.import(json, &mut registry, &mut params).is_err());
        assert_eq!(registry.len(), 26);
        assert_eq!(params.safety_margin, 1.5);
    }

    #[test]
    fn test_import_applies_and_saves() {
        let source = store();
        let mut registry = Registry::plant_default();
        registry
            .update(5, ComponentUpdate::Brand("TIMKEN".to_string()))
            .unwrap();
        let params = GlobalParameters::default().with_environment_factor(1.1);
        let exported = source.export(&registry, &params).unwrap();
        assert!(exported.contains("fechaExportacion"));

        let mut target = store();
        let mut target_registry = Registry::plant_default();
        let mut target_params = GlobalParameters::default();
        target
            .import(&exported, &mut target_registry, &mut target_params)
            .unwrap();

        assert_eq!(target_registry.records(), registry.records());
        assert_eq!(target_params, params);
        assert_eq!(target.backend().len(), 1);
    }

    #[test]
    fn test_export_and_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configuracion.json");
        let mut store = store();
        let mut registry = Registry::plant_default();
        let mut params = GlobalParameters::default();

        store.export_file(&path, &registry, &params).unwrap();
        registry.raise_all_criticality();
        store.import_file(&path, &mut registry, &mut params).unwrap();

        assert_eq!(registry.records(), Registry::plant_default().records());
        assert!(store
            .import_file(&dir.path().join("missing.json"), &mut registry, &mut params)
            .is_err());
    }
}

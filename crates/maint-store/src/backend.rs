//! 持久化後端
//!
//! 鍵值式儲存：`get_item` / `set_item` / `is_available`。
//! 內建記憶體後端（可設定配額或停用，用於測試與無儲存環境）與檔案後端（每個鍵一個 JSON 檔）。

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// 後端錯誤
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("儲存空間不可用")]
    Unavailable,

    #[error("超出儲存配額：需要 {needed} 位元組，上限 {quota} 位元組")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("無效的儲存鍵: {0}")]
    InvalidKey(String),

    #[error("I/O 錯誤: {0}")]
    Io(#[from] std::io::Error),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// 持久化後端
pub trait PersistenceBackend {
    /// 讀取鍵值，不存在時回傳 `None`
    fn get_item(&self, key: &str) -> BackendResult<Option<String>>;

    /// 寫入鍵值
    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()>;

    /// 後端目前是否可用
    fn is_available(&self) -> bool;
}

/// 記憶體後端
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    items: HashMap<String, String>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：限制所有值的總大小
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// 不可用的後端（模擬瀏覽器停用儲存）
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl PersistenceBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        if self.disabled {
            return Err(BackendError::Unavailable);
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()> {
        if self.disabled {
            return Err(BackendError::Unavailable);
        }
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key) + key.len() + value.len();
            if needed > quota {
                return Err(BackendError::QuotaExceeded { needed, quota });
            }
        }

        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.disabled
    }
}

/// 檔案後端：`<目錄>/<鍵>.json`
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// 開啟（必要時建立）儲存目錄
    pub fn open(dir: impl Into<PathBuf>) -> BackendResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> BackendResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl PersistenceBackend for FileBackend {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        // 先寫暫存檔再改名，寫到一半失敗時舊檔仍完整
        let mut file = fs::File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;

        tracing::debug!("已寫入 {}", path.display());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

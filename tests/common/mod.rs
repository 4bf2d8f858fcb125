//! 集成测试共享的内存存储实现

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use upload_relay::config::Config;
use upload_relay::storage::{Connector, Folder, StorageError, StorageSession};
use upload_relay::{AppState, app};

/// 内存中的存储账户，记录每类调用的次数
#[derive(Default)]
pub struct MemoryStorage {
    pub folders: Mutex<BTreeMap<String, Vec<(String, Vec<u8>)>>>,
    pub connects: AtomicUsize,
    pub finds: AtomicUsize,
    pub creates: AtomicUsize,
    pub uploads: AtomicUsize,
    pub fail_auth: bool,
    pub fail_upload: Option<String>,
    pub fail_upload_io: bool,
    pub delay: Duration,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_folder(name: &str) -> Arc<Self> {
        let storage = Self::default();
        storage
            .folders
            .lock()
            .unwrap()
            .insert(name.to_string(), Vec::new());
        Arc::new(storage)
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn folder_names(&self) -> Vec<String> {
        self.folders.lock().unwrap().keys().cloned().collect()
    }

    pub fn file(&self, folder: &str, name: &str) -> Option<Vec<u8>> {
        self.folders
            .lock()
            .unwrap()
            .get(folder)?
            .iter()
            .find(|(file, _)| file == name)
            .map(|(_, data)| data.clone())
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// 把共享的 `MemoryStorage` 同时作为连接器与会话使用
pub struct MemoryConnector(pub Arc<MemoryStorage>);

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn StorageSession>, StorageError> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        self.0.pause().await;
        if self.0.fail_auth {
            return Err(StorageError::Authentication("invalid credentials".to_string()));
        }
        Ok(Arc::new(MemorySession(Arc::clone(&self.0))))
    }
}

pub struct MemorySession(Arc<MemoryStorage>);

#[async_trait]
impl StorageSession for MemorySession {
    async fn find_folder(&self, name: &str) -> Result<Option<Folder>, StorageError> {
        self.0.finds.fetch_add(1, Ordering::SeqCst);
        self.0.pause().await;
        let folders = self.0.folders.lock().unwrap();
        Ok(folders.contains_key(name).then(|| Folder::new(name)))
    }

    async fn create_folder(&self, name: &str) -> Result<Folder, StorageError> {
        self.0.creates.fetch_add(1, Ordering::SeqCst);
        self.0.pause().await;
        self.0
            .folders
            .lock()
            .unwrap()
            .insert(name.to_string(), Vec::new());
        Ok(Folder::new(name))
    }

    async fn upload(
        &self,
        folder: &Folder,
        file_name: &str,
        source: &Path,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.0.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.0.fail_upload {
            return Err(StorageError::Provider(message.clone()));
        }
        if self.0.fail_upload_io {
            return Err(StorageError::Io(std::io::Error::other("temp file unreadable")));
        }
        let data = tokio::fs::read(source).await?;
        let mut folders = self.0.folders.lock().unwrap();
        let files = folders
            .get_mut(folder.name())
            .ok_or_else(|| StorageError::Provider("folder does not exist".to_string()))?;
        files.push((file_name.to_string(), data));
        Ok(folder.key_for(file_name))
    }

    async fn list(&self, folder: &Folder) -> Result<Vec<String>, StorageError> {
        let folders = self.0.folders.lock().unwrap();
        let mut names: Vec<String> = folders
            .get(folder.name())
            .map(|files| files.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        Ok(names)
    }
}

/// 测试服务器及其临时目录
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MemoryStorage>,
    pub tmp_dir: TempDir,
}

impl TestApp {
    pub fn new(storage: Arc<MemoryStorage>) -> Self {
        Self::with_config(storage, Config::default())
    }

    /// 使用给定的配置创建测试服务器，临时目录总是替换为独立的新目录
    pub fn with_config(storage: Arc<MemoryStorage>, config: Config) -> Self {
        let tmp_dir = tempfile::tempdir().unwrap();
        let config = Config {
            tmp_dir: tmp_dir.path().to_path_buf(),
            storage_timeout: Duration::from_secs(5),
            ..config
        };
        let state = AppState::new(config, Arc::new(MemoryConnector(Arc::clone(&storage))));
        let server = TestServer::new(app(state)).unwrap();

        Self {
            server,
            storage,
            tmp_dir,
        }
    }

    /// 临时目录中残留的文件数
    pub fn leftover_temp_files(&self) -> usize {
        std::fs::read_dir(self.tmp_dir.path()).unwrap().count()
    }
}

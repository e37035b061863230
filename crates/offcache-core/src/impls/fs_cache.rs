//! FsCacheStore - JSON ファイルに永続化するキャッシュストア
//!
//! # 実装詳細
//! - `{root}/cache-storage.json` に全バケットを作成順で保存
//! - メモリ上にコピーを持たず、操作のたびにファイルを読み直す
//! - `{root}/cache-storage.lock` のアドバイザリロックで他プロセスと排他する
//!   （読み取りは共有ロック、更新は排他ロック）
//! - 更新は「読み込み → 適用 → 一時ファイルに書く → rename」。書き込みに失敗しても
//!   元のファイルはそのまま残る

use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use super::buckets::Buckets;
use crate::domain::{CacheError, CacheKey, CachedResponse};
use crate::ports::CacheStore;

const STORE_FILE: &str = "cache-storage.json";
const LOCK_FILE: &str = "cache-storage.lock";

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// FsCacheStore は 1 つのディレクトリを複数プロセスで共有できるキャッシュストア
///
/// 同じディレクトリを指すインスタンスがいくつあっても、各操作は直前に
/// 確定したファイルの内容に対して行われる。
pub struct FsCacheStore {
    root: PathBuf,
    path: PathBuf,
    /// プロセス内の直列化。プロセス間はロックファイルが担う
    gate: RwLock<()>,
}

impl FsCacheStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            path: root.join(STORE_FILE),
            root,
            gate: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ロックファイルを開いてロックを取る。返した `File` を drop すると解放される
    async fn lock(&self, mode: LockMode) -> Result<File, CacheError> {
        fs::create_dir_all(&self.root).await?;
        let path = self.root.join(LOCK_FILE);
        let locked = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)?;
            match mode {
                LockMode::Shared => file.lock_shared()?,
                LockMode::Exclusive => file.lock()?,
            }
            Ok(file)
        })
        .await
        .map_err(|e| CacheError::Backend(format!("storage lock task failed: {e}")))??;
        Ok(locked)
    }

    async fn load(&self) -> Result<Buckets, CacheError> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                debug!(path = %self.path.display(), "loaded cache storage");
                Ok(serde_json::from_slice(&bytes)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Buckets::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, buckets: &Buckets) -> Result<(), CacheError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(buckets)?).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&Buckets) -> T) -> Result<T, CacheError> {
        let _gate = self.gate.read().await;
        let _lock = self.lock(LockMode::Shared).await?;
        let buckets = self.load().await?;
        Ok(f(&buckets))
    }

    async fn write<T>(
        &self,
        f: impl FnOnce(&mut Buckets) -> Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        let _gate = self.gate.write().await;
        let _lock = self.lock(LockMode::Exclusive).await?;
        let mut buckets = self.load().await?;
        let out = f(&mut buckets)?;
        self.persist(&buckets).await?;
        Ok(out)
    }
}

#[async_trait]
impl CacheStore for FsCacheStore {
    async fn open(&self, bucket: &str) -> Result<(), CacheError> {
        let exists = self.read(|b| b.names().iter().any(|n| n == bucket)).await?;
        if exists {
            return Ok(());
        }
        self.write(|b| Ok(b.open(bucket))).await.map(|_| ())
    }

    async fn match_in(
        &self,
        bucket: &str,
        key: &CacheKey,
    ) -> Result<Option<CachedResponse>, CacheError> {
        self.read(|b| b.match_in(bucket, key)).await
    }

    async fn match_any(&self, key: &CacheKey) -> Result<Option<CachedResponse>, CacheError> {
        self.read(|b| b.match_any(key)).await
    }

    async fn put(
        &self,
        bucket: &str,
        key: CacheKey,
        entry: CachedResponse,
    ) -> Result<(), CacheError> {
        self.write(|b| b.put(bucket, key, entry)).await
    }

    async fn put_all(
        &self,
        bucket: &str,
        entries: Vec<(CacheKey, CachedResponse)>,
    ) -> Result<(), CacheError> {
        self.write(|b| b.put_all(bucket, entries)).await
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        self.write(|b| Ok(b.delete(bucket))).await
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.read(|b| b.names()).await
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<CacheKey>, CacheError> {
        self.read(|b| b.entries(bucket)).await
    }
}

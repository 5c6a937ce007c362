//! Key-value storage that survives restarts.

use std::{
    collections::{BTreeMap, HashMap},
    io,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use tokio::fs;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> io::Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> io::Result<()>;

    async fn remove(&self, key: &str) -> io::Result<()>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> io::Result<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        (**self).remove(key).await
    }
}

/// Storage kept in a single JSON object file. A missing file reads as empty.
pub struct File {
    path: PathBuf,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> io::Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents).await
    }
}

#[async_trait]
impl Storage for File {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> io::Result<()> {
        let mut entries = self.load().await?;
        entries.insert(key.to_owned(), value);
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

/// Storage that lives as long as the process.
#[derive(Default)]
pub struct Memory(Mutex<HashMap<String, String>>);

#[async_trait]
impl Storage for Memory {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> io::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

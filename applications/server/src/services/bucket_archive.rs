/// Bucket archive - JSON snapshots of finished playlists on disk
use async_trait::async_trait;
use dj_core::{DjError, PlaylistArchive, PlaylistRecord};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Writes each playlist to `{base}/playlists/{user_id}/{playlist_id}.json`
#[derive(Debug, Clone)]
pub struct BucketArchive {
    base_path: PathBuf,
}

/// Reject IDs that would escape their directory
fn path_component(id: &str) -> dj_core::Result<&str> {
    let unsafe_id = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(|c: char| matches!(c, '/' | '\\' | '\0'));

    if unsafe_id {
        return Err(DjError::storage(format!("Invalid path component: {:?}", id)));
    }
    Ok(id)
}

impl BucketArchive {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Where a record is stored
    pub fn path_for(&self, record: &PlaylistRecord) -> dj_core::Result<PathBuf> {
        let user = path_component(record.user_id.as_str())?;
        let playlist = path_component(record.playlist_id.as_str())?;

        Ok(self
            .base_path
            .join("playlists")
            .join(user)
            .join(format!("{}.json", playlist)))
    }

    /// Read a stored snapshot back
    pub async fn load(&self, record: &PlaylistRecord) -> dj_core::Result<PlaylistRecord> {
        let path = self.path_for(record)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| DjError::storage(format!("Failed to read {:?}: {}", path, e)))?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[async_trait]
impl PlaylistArchive for BucketArchive {
    async fn archive(&self, record: &PlaylistRecord) -> dj_core::Result<()> {
        let path = self.path_for(record)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DjError::storage(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        let data = serde_json::to_vec_pretty(record)?;
        fs::write(&path, data)
            .await
            .map_err(|e| DjError::storage(format!("Failed to write {:?}: {}", path, e)))?;

        tracing::debug!(playlist_id = %record.playlist_id, path = ?path, "Playlist archived");
        Ok(())
    }
}

//! Per-tenant, per-type cache artifacts on local disk.
//!
//! Each object type owns a content file (`{tenant}_{resource}.json`, a JSON
//! array of records) and, for delta-capable types, a continuation file
//! (`{tenant}_{resource}_deltaLink.json`) whose modification time is the
//! token's age. Every write goes to a temporary sibling that is renamed into
//! place, so readers never observe a half-written artifact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{SyncError, SyncResult};
use crate::object_type::ObjectType;
use crate::record::{Record, RecordSet};
use crate::staleness::{self, CacheCheck};

/// On-disk shape of a continuation file.
#[derive(Debug, Serialize, Deserialize)]
struct ContinuationFile {
    #[serde(rename = "continuationToken", alias = "@odata.deltaLink")]
    continuation_token: String,
}

/// A continuation token read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDeltaLink {
    pub link: String,
    pub age: Duration,
}

/// File-based store for one tenant's cache artifacts.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    tenant_id: String,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>, tenant_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            tenant_id: tenant_id.into(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    #[must_use]
    pub fn content_path(&self, object_type: ObjectType) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", self.tenant_id, object_type.resource()))
    }

    #[must_use]
    pub fn delta_link_path(&self, object_type: ObjectType) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_deltaLink.json",
            self.tenant_id,
            object_type.resource()
        ))
    }

    /// Staleness check of the content file for `object_type`.
    #[must_use]
    pub fn check(&self, object_type: ObjectType, max_age: Duration) -> CacheCheck {
        staleness::check_local_cache(&self.content_path(object_type), max_age)
    }

    /// Loads the content file regardless of age; absent or malformed reads as empty.
    #[must_use]
    pub fn load_content(&self, object_type: ObjectType) -> RecordSet {
        staleness::load_records(&self.content_path(object_type)).unwrap_or_default()
    }

    /// Reads the stored continuation token and its age.
    #[must_use]
    pub fn load_delta_link(&self, object_type: ObjectType) -> Option<StoredDeltaLink> {
        let path = self.delta_link_path(object_type);
        let bytes = fs::read(&path).ok()?;
        let file: ContinuationFile = match serde_json::from_slice(&bytes) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring malformed delta link file");
                return None;
            }
        };
        if file.continuation_token.is_empty() {
            return None;
        }
        let age = staleness::file_age(&path, SystemTime::now())?;
        Some(StoredDeltaLink {
            link: file.continuation_token,
            age,
        })
    }

    /// Number of records in the content file, 0 if absent or unreadable.
    #[must_use]
    pub fn count_local(&self, object_type: ObjectType) -> usize {
        staleness::load_records(&self.content_path(object_type)).map_or(0, |r| r.len())
    }

    /// Replaces the content file.
    pub fn save_content(&self, object_type: ObjectType, records: &[Record]) -> SyncResult<()> {
        self.commit(object_type, records, None)
    }

    /// Replaces the content file and, when given, the continuation token.
    ///
    /// Both payloads are staged before either is renamed into place. The
    /// previous content file is kept aside until the continuation token is
    /// published and restored if that fails, so an error leaves the prior
    /// artifact pair as it was.
    #[instrument(skip(self, records, delta_link), fields(records = records.len()))]
    pub fn commit(
        &self,
        object_type: ObjectType,
        records: &[Record],
        delta_link: Option<&str>,
    ) -> SyncResult<()> {
        self.ensure_dir()?;

        let content_path = self.content_path(object_type);
        let content = serde_json::to_vec_pretty(records)?;
        let content_tmp = stage(&content_path, &content)?;

        let link_tmp = match delta_link {
            Some(link) => {
                let link_path = self.delta_link_path(object_type);
                let payload = serde_json::to_vec_pretty(&ContinuationFile {
                    continuation_token: link.to_string(),
                })?;
                match stage(&link_path, &payload) {
                    Ok(tmp) => Some((tmp, link_path)),
                    Err(e) => {
                        let _ = fs::remove_file(&content_tmp);
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        match link_tmp {
            None => publish(&content_tmp, &content_path)?,
            Some((tmp, link_path)) => {
                let backup = backup_path(&content_path);
                let had_content = match fs::rename(&content_path, &backup) {
                    Ok(()) => true,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => false,
                    Err(e) => {
                        let _ = fs::remove_file(&content_tmp);
                        let _ = fs::remove_file(&tmp);
                        return Err(SyncError::persist(&content_path, e));
                    }
                };

                let published = publish(&content_tmp, &content_path)
                    .inspect_err(|_| {
                        let _ = fs::remove_file(&tmp);
                    })
                    .and_then(|()| publish(&tmp, &link_path));
                if let Err(e) = published {
                    restore(&backup, &content_path, had_content);
                    return Err(e);
                }
                if had_content {
                    let _ = fs::remove_file(&backup);
                }
            }
        }

        debug!(path = %content_path.display(), "Cache artifact written");
        Ok(())
    }

    /// Removes the content and continuation files of one type.
    ///
    /// Returns how many files were removed.
    pub fn clear(&self, object_type: ObjectType) -> SyncResult<usize> {
        let mut removed = 0;
        for path in [
            self.content_path(object_type),
            self.delta_link_path(object_type),
        ] {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(SyncError::persist(path, e)),
            }
        }
        Ok(removed)
    }

    /// Removes every artifact of this tenant.
    pub fn clear_all(&self) -> SyncResult<usize> {
        ObjectType::ALL
            .into_iter()
            .try_fold(0, |total, t| Ok(total + self.clear(t)?))
    }

    /// Cached records of any type whose UUID field equals `uuid`, ignoring case.
    #[must_use]
    pub fn find_by_uuid(&self, uuid: &str) -> Vec<(ObjectType, Record)> {
        ObjectType::ALL
            .into_iter()
            .flat_map(|t| {
                self.load_content(t)
                    .into_iter()
                    .filter(move |r| r.text(t.uuid_field()).eq_ignore_ascii_case(uuid))
                    .map(move |r| (t, r))
            })
            .collect()
    }

    fn ensure_dir(&self) -> SyncResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| SyncError::persist(&self.dir, e))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Puts the content file back the way it was before a failed commit.
fn restore(backup: &Path, path: &Path, had_content: bool) {
    let result = if had_content {
        fs::rename(backup, path)
    } else {
        fs::remove_file(path)
    };
    if let Err(e) = result.or_else(|e| match e.kind() {
        io::ErrorKind::NotFound if !had_content => Ok(()),
        _ => Err(e),
    }) {
        warn!(path = %path.display(), error = %e, "Failed to restore cache artifact");
    }
}

fn stage(path: &Path, contents: &[u8]) -> SyncResult<PathBuf> {
    let tmp = tmp_path(path);
    fs::write(&tmp, contents).map_err(|e| SyncError::persist(&tmp, e))?;
    Ok(tmp)
}

fn publish(tmp: &Path, path: &Path) -> SyncResult<()> {
    fs::rename(tmp, path).map_err(|e| {
        let _ = fs::remove_file(tmp);
        SyncError::persist(path, e)
    })
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stored object references and the upload/listing policy.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Key and size of an object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub size: i64,
}

/// User-scoped categories files can live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Backups,
    Configs,
    Mods,
}

impl FileCategory {
    pub const ALL: [FileCategory; 3] = [Self::Backups, Self::Configs, Self::Mods];

    /// Parse a prefix query parameter. A single trailing `/` is accepted.
    pub fn parse(prefix: &str) -> Option<Self> {
        match prefix.strip_suffix('/').unwrap_or(prefix) {
            "backups" => Some(Self::Backups),
            "configs" => Some(Self::Configs),
            "mods" => Some(Self::Mods),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backups => "backups",
            Self::Configs => "configs",
            Self::Mods => "mods",
        }
    }

    /// `{category}/{discord_id}/`. Every key a user owns starts with this.
    pub fn user_prefix(&self, discord_id: &str) -> String {
        format!("{}/{}/", self.as_str(), discord_id)
    }

    /// `{category}/{discord_id}/{filename}`
    pub fn user_key(&self, discord_id: &str, filename: &str) -> String {
        format!("{}{}", self.user_prefix(discord_id), filename)
    }

    /// Additional prefixes listed alongside the user's own files.
    pub fn extra_sources(&self, discord_id: &str) -> Vec<String> {
        match self {
            Self::Mods => vec!["mods/general/".to_string()],
            Self::Backups => vec![format!("valheim-backups-auto/{}/", discord_id)],
            Self::Configs => Vec::new(),
        }
    }
}

/// Upload rules, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct FilePolicy {
    extensions: BTreeSet<&'static str>,
    max_upload_bytes: usize,
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self {
            extensions: ["fwl", "db", "zip", "cfg"].into_iter().collect(),
            max_upload_bytes: 30 << 20,
        }
    }
}

impl FilePolicy {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn check_size(&self, size: usize) -> Result<(), AppError> {
        if size > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "file too large. Maximum size is {}MB",
                self.max_upload_bytes >> 20
            )));
        }
        Ok(())
    }

    /// Validate the filename's extension, returning it without the dot.
    ///
    /// The extension is whatever follows the last `.` of the final path
    /// segment, so a bare `.cfg` has extension `cfg`.
    pub fn check_extension<'a>(&self, filename: &'a str) -> Result<&'a str, AppError> {
        let name = filename.rsplit('/').next().unwrap_or(filename);
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "file name must end with a valid extension: {}",
                    self.extensions
                        .iter()
                        .map(|e| format!("*.{}", e))
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;

        if !self.extensions.contains(ext) {
            return Err(AppError::Validation(format!("invalid extension: {}", ext)));
        }
        Ok(ext)
    }

    pub fn check_category(&self, prefix: &str) -> Result<FileCategory, AppError> {
        FileCategory::parse(prefix)
            .ok_or_else(|| AppError::Validation(format!("invalid prefix: {}", prefix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(FileCategory::parse("mods"), Some(FileCategory::Mods));
        assert_eq!(FileCategory::parse("mods/"), Some(FileCategory::Mods));
        assert_eq!(FileCategory::parse("configs/"), Some(FileCategory::Configs));
        assert_eq!(FileCategory::parse("backups"), Some(FileCategory::Backups));
        assert_eq!(FileCategory::parse("mods//"), None);
        assert_eq!(FileCategory::parse("Mods"), None);
        assert_eq!(FileCategory::parse(""), None);
        assert_eq!(FileCategory::parse("valheim-backups-auto"), None);
    }

    #[test]
    fn test_user_key_is_prefixed_by_discord_id() {
        for category in FileCategory::ALL {
            let key = category.user_key("4242", "world.db");
            assert!(key.starts_with(&category.user_prefix("4242")));
            assert_eq!(key, format!("{}/4242/world.db", category.as_str()));
        }
    }

    #[test]
    fn test_extra_sources() {
        assert_eq!(
            FileCategory::Mods.extra_sources("1"),
            vec!["mods/general/".to_string()]
        );
        assert_eq!(
            FileCategory::Backups.extra_sources("1"),
            vec!["valheim-backups-auto/1/".to_string()]
        );
        assert!(FileCategory::Configs.extra_sources("1").is_empty());
    }

    #[test]
    fn test_extension_checks() {
        let policy = FilePolicy::default();
        assert_eq!(policy.check_extension("world.fwl").unwrap(), "fwl");
        assert_eq!(policy.check_extension("mods.tar.zip").unwrap(), "zip");

        let err = policy.check_extension("virus.exe").unwrap_err();
        assert_eq!(err.to_string(), "invalid extension: exe");

        let err = policy.check_extension("noext").unwrap_err();
        assert!(err.to_string().starts_with("file name must end with a valid extension"));

        let err = policy.check_extension("saves.d/noext").unwrap_err();
        assert!(err.to_string().starts_with("file name must end with a valid extension"));
    }

    #[test]
    fn test_extension_of_dotfile_and_trailing_dot() {
        let policy = FilePolicy::default();
        assert_eq!(policy.check_extension(".cfg").unwrap(), "cfg");

        let err = policy.check_extension("world.").unwrap_err();
        assert_eq!(err.to_string(), "invalid extension: ");
    }

    #[test]
    fn test_size_limit() {
        let policy = FilePolicy::default();
        assert!(policy.check_size(30 << 20).is_ok());
        let err = policy.check_size((30 << 20) + 1).unwrap_err();
        assert_eq!(err.to_string(), "file too large. Maximum size is 30MB");
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::auth::password::hash_password;
use crate::auth::types::User;
use crate::error::AppError;

const MAX_USERNAME_LENGTH: usize = 64;

#[derive(Debug, Default)]
struct Directory {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

impl Directory {
    fn from_users(users: Vec<User>) -> Self {
        let next_id = users.iter().map(|u| u.id).max().map_or(1, |max| max + 1);
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            next_id,
        }
    }

    fn find_by_username(&self, username: &str) -> Option<&User> {
        let wanted = username.to_lowercase();
        self.users
            .values()
            .find(|u| u.username.to_lowercase() == wanted)
    }
}

/// Outcome of [`UserStore::initialize_default_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(User),
    UsersExist,
    MissingPassword,
}

/// User directory with JSON file persistence.
///
/// Every mutation holds the write lock across id assignment and the file
/// rewrite, so ids stay monotonic and usernames stay unique under
/// concurrent callers.
#[derive(Debug)]
pub struct UserStore {
    directory: RwLock<Directory>,
    path: Option<PathBuf>,
}

impl UserStore {
    /// A directory that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            directory: RwLock::new(Directory {
                users: BTreeMap::new(),
                next_id: 1,
            }),
            path: None,
        }
    }

    /// Loads the directory from `path`; a missing file is an empty directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        let users: Vec<User> = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                AppError::Storage(format!("Failed to read {}: {}", path.display(), e))
            })?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    AppError::Storage(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), count = users.len(), "Loaded user directory");

        Ok(Self {
            directory: RwLock::new(Directory::from_users(users)),
            path: Some(path),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Directory>, AppError> {
        self.directory
            .read()
            .map_err(|e| AppError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Directory>, AppError> {
        self.directory
            .write()
            .map_err(|e| AppError::Internal(format!("Failed to acquire write lock: {}", e)))
    }

    fn persist(&self, directory: &Directory) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let records: Vec<&User> = directory.users.values().collect();
        let content = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, content).map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    pub fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
        is_admin: bool,
    ) -> Result<User, AppError> {
        validate_username(username)?;

        let mut directory = self.write()?;
        if directory.find_by_username(username).is_some() {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let user = User {
            id: directory.next_id,
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
            is_active: true,
            is_admin,
        };

        directory.users.insert(user.id, user.clone());
        directory.next_id += 1;

        if let Err(e) = self.persist(&directory) {
            // Keep memory and disk in agreement.
            directory.users.remove(&user.id);
            directory.next_id -= 1;
            return Err(e);
        }

        tracing::info!(user_id = user.id, username = %user.username, "Created user");
        Ok(user)
    }

    pub fn get_user_by_id(&self, id: u64) -> Result<User, AppError> {
        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Case-insensitive lookup.
    pub fn get_user_by_username(&self, username: &str) -> Result<User, AppError> {
        self.read()?
            .find_by_username(username)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))
    }

    pub fn set_active(&self, id: u64, is_active: bool) -> Result<User, AppError> {
        self.update(id, |user| user.is_active = is_active)
    }

    pub fn set_admin(&self, id: u64, is_admin: bool) -> Result<User, AppError> {
        self.update(id, |user| user.is_admin = is_admin)
    }

    fn update(&self, id: u64, edit: impl FnOnce(&mut User)) -> Result<User, AppError> {
        let mut directory = self.write()?;

        let user = directory
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        let previous = user.clone();
        edit(user);
        let updated = user.clone();

        if let Err(e) = self.persist(&directory) {
            directory.users.insert(id, previous);
            return Err(e);
        }

        Ok(updated)
    }

    pub fn len(&self) -> Result<usize, AppError> {
        Ok(self.read()?.users.len())
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.read()?.users.is_empty())
    }

    pub fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    /// Creates the administrator on an empty directory.
    ///
    /// The password is hashed before the write lock is taken; emptiness is
    /// checked again under the lock so that two concurrent bootstraps cannot
    /// both succeed. A missing password is not an error: bootstrap is
    /// skipped with a warning.
    pub fn initialize_default_admin(
        &self,
        admin_username: &str,
        admin_password: Option<&str>,
    ) -> Result<BootstrapOutcome, AppError> {
        if !self.is_empty()? {
            tracing::debug!("Users already exist, skipping admin bootstrap");
            return Ok(BootstrapOutcome::UsersExist);
        }

        let Some(password) = admin_password.filter(|p| !p.is_empty()) else {
            tracing::warn!("ADMIN_PASSWORD not set, admin user will not be created");
            return Ok(BootstrapOutcome::MissingPassword);
        };

        validate_username(admin_username)?;
        let hashed_password = hash_password(password)?;

        let mut directory = self.write()?;
        if !directory.users.is_empty() {
            tracing::debug!("Users appeared during bootstrap, skipping admin creation");
            return Ok(BootstrapOutcome::UsersExist);
        }

        let user = User {
            id: directory.next_id,
            username: admin_username.to_string(),
            hashed_password,
            is_active: true,
            is_admin: true,
        };
        directory.users.insert(user.id, user.clone());
        directory.next_id += 1;

        if let Err(e) = self.persist(&directory) {
            directory.users.remove(&user.id);
            directory.next_id -= 1;
            return Err(e);
        }

        tracing::info!(username = %user.username, "Admin user created");
        Ok(BootstrapOutcome::Created(user))
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.trim().is_empty() {
        return Err(AppError::validation("Username must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AppError::validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if username.chars().any(char::is_control) {
        return Err(AppError::validation(
            "Username must not contain control characters",
        ));
    }
    Ok(())
}

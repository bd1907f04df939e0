//! Ownership resolution from the system configuration database.
//!
//! The configuration database is a SQLite store with two tables of
//! interest: `groups (gid, name)` and `users (uid, username, groupname)`.
//! IDs in the store are 1-based while filesystem IDs are 0-based, so every
//! loaded value is decremented by one. This offset is an external format
//! contract, not a choice made here.
//!
//! Ownership precision is a nicety, not a requirement for a bootable
//! image: if the store cannot be opened or does not carry the expected
//! schema, resolution degrades to a root-only table with a notice instead
//! of failing the build.

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeMap;
use std::path::Path;

/// User and group identities known to the image.
#[derive(Debug, Clone)]
pub struct Identities {
    /// username -> (uid, gid)
    users: BTreeMap<String, (u32, u32)>,
    /// group name -> gid
    groups: BTreeMap<String, u32>,
}

impl Identities {
    /// The built-in fallback: root only, uid 0 / gid 0.
    pub fn root_only() -> Self {
        let mut users = BTreeMap::new();
        users.insert("root".to_string(), (0, 0));
        let mut groups = BTreeMap::new();
        groups.insert("root".to_string(), 0);
        Self { users, groups }
    }

    /// Load identities from the configuration database.
    ///
    /// An unreachable or unreadable store degrades to [`root_only`]
    /// (soft failure). A store that opens and carries the schema is
    /// consumed in one pass; a user row naming an unknown group is a
    /// contract violation and surfaces as an error.
    ///
    /// [`root_only`]: Identities::root_only
    pub fn load(store_path: &Path) -> Result<Self> {
        let conn = match Connection::open_with_flags(
            store_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        ) {
            Ok(conn) => conn,
            Err(err) => {
                eprintln!(
                    "[WARN] Configuration database {} unavailable ({}); \
                     file ownership will default to root.",
                    store_path.display(),
                    err
                );
                return Ok(Self::root_only());
            }
        };

        let mut identities = Self::root_only();

        let mut group_query = match conn.prepare("select gid, name from groups") {
            Ok(stmt) => stmt,
            Err(err) => {
                // Opened, but not a database we understand (corrupt file or
                // missing schema). Same degradation as an unreachable store.
                eprintln!(
                    "[WARN] Configuration database {} has no usable group table ({}); \
                     file ownership will default to root.",
                    store_path.display(),
                    err
                );
                return Ok(Self::root_only());
            }
        };

        let group_rows = group_query
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .context("Failed to query group table")?;
        for row in group_rows {
            let (gid, name) = row.context("Failed to read group row")?;
            // Store IDs are 1-based; filesystem IDs are 0-based.
            identities.groups.insert(name, (gid - 1) as u32);
        }
        drop(group_query);

        let mut user_query = conn
            .prepare("select uid, username, groupname from users")
            .context("Failed to query user table")?;
        let user_rows = user_query
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("Failed to query user table")?;
        for row in user_rows {
            let (uid, username, groupname) = row.context("Failed to read user row")?;
            let gid = identities.groups.get(&groupname).copied().with_context(|| {
                format!(
                    "User '{}' references unknown group '{}' in {}",
                    username,
                    groupname,
                    store_path.display()
                )
            })?;
            identities.users.insert(username, ((uid - 1) as u32, gid));
        }

        Ok(identities)
    }

    /// Register an identity directly, bypassing the store.
    pub fn add_user(&mut self, username: &str, uid: u32, gid: u32) {
        self.users.insert(username.to_string(), (uid, gid));
    }

    /// Look up a username, returning its (uid, gid) pair.
    pub fn lookup(&self, username: &str) -> Option<(u32, u32)> {
        self.users.get(username).copied()
    }

    /// Number of known users (always at least 1: root).
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

//! Typed JSON file persistence
//!
//! A [`FileStore`] owns one value of a declared type and mirrors it to a
//! JSON file. Saving goes through a sibling temporary file and a rename, so
//! a crash mid-write leaves the previous file intact.

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::compile::{deserialize, serialize};
use crate::descriptor::TypeExpr;
use crate::error::{Error, Result};
use crate::runtime::Value;

/// A typed value backed by a JSON file
#[derive(Debug)]
pub struct FileStore {
    ty: TypeExpr,
    path: PathBuf,
    data: Value,
}

impl FileStore {
    /// Open the store at `path`, deserializing its contents as `ty`
    ///
    /// A missing file is not an error; the store starts from `default()`
    /// and the file appears on the first save. Any other read, parse, or
    /// decode failure propagates.
    pub fn open(
        ty: TypeExpr,
        path: impl Into<PathBuf>,
        default: impl FnOnce() -> Value,
    ) -> Result<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) => {
                let wire: serde_json::Value = serde_json::from_str(&text).map_err(storage)?;
                deserialize(&wire, &ty)?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file absent, using default");
                default()
            }
            Err(e) => return Err(storage(e)),
        };
        Ok(FileStore { ty, path, data })
    }

    /// The stored value
    pub fn get(&self) -> &Value {
        &self.data
    }

    /// Mutable access to the stored value; call [`save`](Self::save) to
    /// persist changes
    pub fn get_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    /// Replace the stored value
    pub fn set(&mut self, data: Value) {
        self.data = data;
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the value to the backing file
    pub fn save(&self) -> Result<()> {
        self.save_to(&self.path)
    }

    /// Persist the value to an arbitrary path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let wire = serialize(&self.data, Some(&self.ty))?;
        let text = serde_json::to_string_pretty(&wire).map_err(storage)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, text).map_err(storage)?;
        fs::rename(&tmp, path).map_err(storage)?;
        debug!(path = %path.display(), "store saved");
        Ok(())
    }
}

fn storage(e: impl Display) -> Error {
    Error::Storage {
        message: e.to_string(),
    }
}

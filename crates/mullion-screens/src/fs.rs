//! Filesystem boundary for the screens.
//!
//! Windows never touch `std::fs` directly; they talk to a [`DirLister`].
//! [`MemoryLister`] backs the tests, [`OsLister`] the real binary.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::rc::Rc;

/// One directory row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

impl Entry {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            is_dir: true,
        }
    }
}

/// The filesystem as the screens see it: listing and reading for the panes
/// and the viewer, plus the per-item operations the menus drive. Directory
/// copy and removal are recursive.
pub trait DirLister {
    fn list(&self, path: &str) -> io::Result<Vec<Entry>>;
    fn read_file(&self, path: &str) -> io::Result<String>;
    fn exists(&self, path: &str) -> bool;
    /// Copies `source` into `dest_dir` under its own name.
    fn copy(&self, source: &str, dest_dir: &str) -> io::Result<()>;
    /// Moves `source` into `dest_dir` under its own name.
    fn move_to(&self, source: &str, dest_dir: &str) -> io::Result<()>;
    fn rename(&self, from: &str, to: &str) -> io::Result<()>;
    fn remove(&self, path: &str) -> io::Result<()>;
    fn make_dir(&self, path: &str) -> io::Result<()>;
}

/// Shared handle the panes and windows pass around.
pub type ListerRef = Rc<dyn DirLister>;

/// Joins a directory and a child name without doubling the root slash.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Splits `path` into its parent directory and final component.
/// `/media/data` -> (`/media`, `data`); `/data` -> (`/`, `data`).
pub fn split_last(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("/", path),
    }
}

/// Final component of `path`.
pub fn file_name(path: &str) -> &str {
    split_last(path).1
}

fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such path: {path}"))
}

fn check_not_into_self(source: &str, dest_dir: &str) -> io::Result<()> {
    if dest_dir == source || dest_dir.starts_with(&join(source, "")) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot copy {source} into itself"),
        ));
    }
    Ok(())
}

/// In-memory tree used by tests and headless scripts. Interior mutability
/// keeps the trait object shareable through `Rc<dyn DirLister>`.
#[derive(Default)]
pub struct MemoryLister {
    dirs: RefCell<BTreeSet<String>>,
    files: RefCell<BTreeMap<String, String>>,
}

impl MemoryLister {
    pub fn new() -> Self {
        let lister = Self::default();
        lister.dirs.borrow_mut().insert("/".to_owned());
        lister
    }

    /// Creates `path` and any missing ancestors.
    pub fn add_dir(&self, path: &str) {
        let mut dirs = self.dirs.borrow_mut();
        let mut at = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            at.push('/');
            at.push_str(part);
            dirs.insert(at.clone());
        }
        dirs.insert("/".to_owned());
    }

    /// Creates a file with the given contents, and its parent directories.
    pub fn add_file(&self, path: &str, contents: &str) {
        let (dir, _) = split_last(path);
        self.add_dir(dir);
        self.files
            .borrow_mut()
            .insert(path.to_owned(), contents.to_owned());
    }

    fn is_dir(&self, path: &str) -> bool {
        self.dirs.borrow().contains(path)
    }

    fn child_of<'a>(parent: &str, full: &'a str) -> Option<&'a str> {
        let rest = if parent == "/" {
            full.strip_prefix('/')?
        } else {
            full.strip_prefix(parent)?.strip_prefix('/')?
        };
        (!rest.is_empty() && !rest.contains('/')).then_some(rest)
    }

    fn copy_tree(&self, source: &str, dest: &str) -> io::Result<()> {
        if self.is_dir(source) {
            self.add_dir(dest);
            let children: Vec<String> = {
                let dirs = self.dirs.borrow();
                let files = self.files.borrow();
                dirs.iter()
                    .chain(files.keys())
                    .filter_map(|p| Self::child_of(source, p))
                    .map(str::to_owned)
                    .collect()
            };
            for name in children {
                self.copy_tree(&join(source, &name), &join(dest, &name))?;
            }
            Ok(())
        } else {
            // The read borrow must end before the insert below re-borrows.
            let contents = self.files.borrow().get(source).cloned();
            if let Some(contents) = contents {
                self.files.borrow_mut().insert(dest.to_owned(), contents);
                Ok(())
            } else {
                Err(not_found(source))
            }
        }
    }

    fn remove_tree(&self, path: &str) -> io::Result<()> {
        if self.is_dir(path) {
            let prefix = join(path, "");
            self.dirs
                .borrow_mut()
                .retain(|p| p != path && !p.starts_with(&prefix));
            self.files.borrow_mut().retain(|p, _| !p.starts_with(&prefix));
            Ok(())
        } else if self.files.borrow_mut().remove(path).is_some() {
            Ok(())
        } else {
            Err(not_found(path))
        }
    }
}

impl DirLister for MemoryLister {
    fn list(&self, path: &str) -> io::Result<Vec<Entry>> {
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        let dirs = self.dirs.borrow();
        let files = self.files.borrow();
        let mut entries: Vec<Entry> = dirs
            .iter()
            .filter_map(|p| Self::child_of(path, p))
            .map(Entry::dir)
            .collect();
        entries.extend(
            files
                .iter()
                .filter_map(|(p, c)| Self::child_of(path, p).map(|name| (name, c)))
                .map(|(name, c)| Entry::file(name, c.len() as u64)),
        );
        sort_entries(&mut entries);
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<String> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn exists(&self, path: &str) -> bool {
        self.is_dir(path) || self.files.borrow().contains_key(path)
    }

    fn copy(&self, source: &str, dest_dir: &str) -> io::Result<()> {
        if !self.is_dir(dest_dir) {
            return Err(not_found(dest_dir));
        }
        check_not_into_self(source, dest_dir)?;
        self.copy_tree(source, &join(dest_dir, file_name(source)))
    }

    fn move_to(&self, source: &str, dest_dir: &str) -> io::Result<()> {
        self.copy(source, dest_dir)?;
        self.remove_tree(source)
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        self.copy_tree(from, to)?;
        self.remove_tree(from)
    }

    fn remove(&self, path: &str) -> io::Result<()> {
        self.remove_tree(path)
    }

    fn make_dir(&self, path: &str) -> io::Result<()> {
        let (parent, _) = split_last(path);
        if !self.is_dir(parent) {
            return Err(not_found(parent));
        }
        if self.exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("already exists: {path}"),
            ));
        }
        self.dirs.borrow_mut().insert(path.to_owned());
        Ok(())
    }
}

/// `std::fs`-backed lister the real binary runs on.
pub struct OsLister;

impl OsLister {
    fn copy_path(source: &str, dest: &str) -> io::Result<()> {
        let meta = std::fs::metadata(source)?;
        if meta.is_dir() {
            std::fs::create_dir_all(dest)?;
            for child in std::fs::read_dir(source)? {
                let child = child?;
                let name = child.file_name().to_string_lossy().into_owned();
                Self::copy_path(&join(source, &name), &join(dest, &name))?;
            }
        } else {
            std::fs::copy(source, dest)?;
        }
        Ok(())
    }

    fn remove_path(path: &str) -> io::Result<()> {
        if std::fs::metadata(path)?.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }
}

impl DirLister for OsLister {
    fn list(&self, path: &str) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            entries.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                is_dir: meta.is_dir(),
            });
        }
        sort_entries(&mut entries);
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn exists(&self, path: &str) -> bool {
        std::fs::metadata(path).is_ok()
    }

    fn copy(&self, source: &str, dest_dir: &str) -> io::Result<()> {
        check_not_into_self(source, dest_dir)?;
        Self::copy_path(source, &join(dest_dir, file_name(source)))
    }

    fn move_to(&self, source: &str, dest_dir: &str) -> io::Result<()> {
        check_not_into_self(source, dest_dir)?;
        let dest = join(dest_dir, file_name(source));
        // Plain rename first; falls back to copy + remove across devices.
        if std::fs::rename(source, &dest).is_err() {
            Self::copy_path(source, &dest)?;
            Self::remove_path(source)?;
        }
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove(&self, path: &str) -> io::Result<()> {
        Self::remove_path(path)
    }

    fn make_dir(&self, path: &str) -> io::Result<()> {
        std::fs::create_dir(path)
    }
}

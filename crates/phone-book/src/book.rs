//! The phone book file
//!
//! A JSON object mapping seven digit numbers to SIP addresses. Several
//! processes may share the file (the daemon and the `phone-book` command), so
//! every operation takes the lock file and reloads when the file changed.

use crate::config::PhoneBookConfig;
use crate::error::{PhoneBookError, PhoneBookResult};
use crate::lock::FileLock;
use fetap_dial_core::{find_similar_numbers, resolve_unique, PhoneNumber, MIN_DISTANCE};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Resolves dialed numbers to SIP addresses and back
pub trait AddressLookup: Send + Sync {
    fn get_address(&self, number: &PhoneNumber) -> PhoneBookResult<Option<String>>;

    fn get_number(&self, address: &str) -> PhoneBookResult<Option<PhoneNumber>>;
}

/// Modification time and size; timestamps alone are too coarse on some filesystems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

#[derive(Debug, Default, Clone)]
struct Entries {
    by_number: BTreeMap<PhoneNumber, String>,
    by_address: HashMap<String, PhoneNumber>,
    /// File stamp when it was last read or written
    loaded: Option<FileStamp>,
}

impl Entries {
    fn replace(&mut self, by_number: BTreeMap<PhoneNumber, String>) {
        self.by_address = by_number
            .iter()
            .map(|(number, address)| (address.clone(), *number))
            .collect();
        self.by_number = by_number;
    }
}

/// Phone book backed by a JSON file
#[derive(Debug)]
pub struct PhoneBook {
    path: PathBuf,
    lock_path: PathBuf,
    staging_path: PathBuf,
    fuzzy_lookup: bool,
    entries: Mutex<Entries>,
}

impl PhoneBook {
    /// Open the phone book at `path`, creating an empty one if missing
    pub fn open(path: impl Into<PathBuf>) -> PhoneBookResult<Self> {
        let path = path.into();
        let sibling = |suffix: &str| {
            let mut name = OsString::from(path.as_os_str());
            name.push(suffix);
            PathBuf::from(name)
        };

        let book = Self {
            lock_path: sibling(".lock"),
            staging_path: sibling(".tmp"),
            path,
            fuzzy_lookup: false,
            entries: Mutex::new(Entries::default()),
        };

        let _lock = book.lock()?;
        let mut entries = book.entries.lock();
        if book.path.exists() {
            book.reload_if_changed(&mut entries)?;
        } else {
            info!("Creating empty phone book at {}", book.path.display());
            book.save(&mut entries)?;
        }
        drop(entries);

        Ok(book)
    }

    /// Open using a [`PhoneBookConfig`]
    pub fn from_config(config: &PhoneBookConfig) -> PhoneBookResult<Self> {
        Ok(Self::open(&config.path)?.with_fuzzy_lookup(config.fuzzy_lookup))
    }

    pub fn with_fuzzy_lookup(mut self, enabled: bool) -> Self {
        self.fuzzy_lookup = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register `number` for `address`
    ///
    /// Unless `force` is set, numbers that a few miscounted pulses could turn
    /// into an existing entry are refused.
    pub fn insert(&self, number: PhoneNumber, address: &str, force: bool) -> PhoneBookResult<()> {
        self.modify(|entries| {
            if entries.by_address.contains_key(address) {
                return Err(PhoneBookError::AddressExists {
                    address: address.to_string(),
                });
            }
            if entries.by_number.contains_key(&number) {
                return Err(PhoneBookError::NumberExists { number });
            }
            if !force {
                let existing: Vec<PhoneNumber> = entries.by_number.keys().copied().collect();
                let similar: Vec<PhoneNumber> =
                    find_similar_numbers(&number, &existing, MIN_DISTANCE)
                        .into_iter()
                        .map(|(similar, _)| similar)
                        .collect();
                if !similar.is_empty() {
                    return Err(PhoneBookError::SimilarNumberExists { number, similar });
                }
            }

            entries.by_number.insert(number, address.to_string());
            entries.by_address.insert(address.to_string(), number);
            info!("Added {} -> {}", number, address);
            Ok(())
        })
    }

    /// Remove `number`, returning the address it pointed to
    pub fn remove_number(&self, number: &PhoneNumber) -> PhoneBookResult<String> {
        self.modify(|entries| {
            let address = entries
                .by_number
                .remove(number)
                .ok_or(PhoneBookError::NumberNotFound { number: *number })?;
            entries.by_address.remove(&address);
            info!("Removed {}", number);
            Ok(address)
        })
    }

    /// Remove `address`, returning the number it had
    pub fn remove_address(&self, address: &str) -> PhoneBookResult<PhoneNumber> {
        self.modify(|entries| {
            let number = entries.by_address.remove(address).ok_or_else(|| {
                PhoneBookError::AddressNotFound {
                    address: address.to_string(),
                }
            })?;
            entries.by_number.remove(&number);
            info!("Removed {}", address);
            Ok(number)
        })
    }

    /// Every entry, ordered by number
    pub fn list_all(&self) -> PhoneBookResult<Vec<(PhoneNumber, String)>> {
        self.read(|entries| {
            entries
                .by_number
                .iter()
                .map(|(number, address)| (*number, address.clone()))
                .collect()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Entries) -> T) -> PhoneBookResult<T> {
        let _lock = self.lock()?;
        let mut entries = self.entries.lock();
        self.reload_if_changed(&mut entries)?;
        Ok(f(&entries))
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Entries) -> PhoneBookResult<T>) -> PhoneBookResult<T> {
        let _lock = self.lock()?;
        let mut entries = self.entries.lock();
        self.reload_if_changed(&mut entries)?;

        // Only a change that reached the file becomes visible
        let mut staged = entries.clone();
        let result = f(&mut staged)?;
        self.save(&mut staged)?;
        *entries = staged;
        Ok(result)
    }

    fn lock(&self) -> PhoneBookResult<FileLock> {
        FileLock::acquire(&self.lock_path)
    }

    fn stamp(&self) -> PhoneBookResult<FileStamp> {
        std::fs::metadata(&self.path)
            .and_then(|m| {
                Ok(FileStamp {
                    modified: m.modified()?,
                    len: m.len(),
                })
            })
            .map_err(|e| PhoneBookError::io(&self.path, e))
    }

    fn reload_if_changed(&self, entries: &mut Entries) -> PhoneBookResult<()> {
        let stamp = self.stamp()?;
        if entries.loaded == Some(stamp) {
            return Ok(());
        }

        let raw = std::fs::read(&self.path).map_err(|e| PhoneBookError::io(&self.path, e))?;
        let by_number: BTreeMap<PhoneNumber, String> =
            serde_json::from_slice(&raw).map_err(|source| PhoneBookError::Format {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            "Loaded {} entries from {}",
            by_number.len(),
            self.path.display()
        );

        entries.replace(by_number);
        entries.loaded = Some(stamp);
        Ok(())
    }

    fn save(&self, entries: &mut Entries) -> PhoneBookResult<()> {
        let json = serde_json::to_vec_pretty(&entries.by_number).map_err(|source| {
            PhoneBookError::Format {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.staging_path, json)
            .map_err(|e| PhoneBookError::io(&self.staging_path, e))?;
        std::fs::rename(&self.staging_path, &self.path)
            .map_err(|e| PhoneBookError::io(&self.path, e))?;
        entries.loaded = Some(self.stamp()?);
        Ok(())
    }
}

impl AddressLookup for PhoneBook {
    fn get_address(&self, number: &PhoneNumber) -> PhoneBookResult<Option<String>> {
        let fuzzy = self.fuzzy_lookup;
        self.read(|entries| {
            if let Some(address) = entries.by_number.get(number) {
                return Some(address.clone());
            }
            if !fuzzy {
                return None;
            }

            let known: Vec<PhoneNumber> = entries.by_number.keys().copied().collect();
            let (closest, distance) =
                resolve_unique(&number.to_pulse_counts(), &known, MIN_DISTANCE)?;
            info!(
                "Dialed {} resolved to {} ({} pulses off)",
                number, closest, distance
            );
            entries.by_number.get(&closest).cloned()
        })
    }

    fn get_number(&self, address: &str) -> PhoneBookResult<Option<PhoneNumber>> {
        self.read(|entries| entries.by_address.get(address).copied())
    }
}

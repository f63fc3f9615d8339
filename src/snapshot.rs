//! Snapshots

use std::{cell::RefCell, fs, io, path::PathBuf, rc::Rc};

use thiserror::Error;
use tracing::{debug, warn};

use crate::cart::Cart;

/// Well-known key of the durable slot holding the cart snapshot.
pub const CART_SLOT_KEY: &str = "cart";

/// Errors surfaced by durable slot backends.
///
/// Only slot implementors see these; [`SnapshotStore`] swallows them and
/// keeps the in-memory cart authoritative.
#[derive(Debug, Error)]
pub enum SlotError {
    /// IO error reading or writing the slot.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The backend refused the write (quota exceeded, storage disabled).
    #[error("slot rejected the write: {0}")]
    Rejected(String),
}

/// A durable key-value slot holding at most one serialized snapshot.
///
/// Writes must be atomic: a concurrent reader observes either the previous
/// value or the complete new one, never a partial write.
pub trait SnapshotSlot {
    /// Reads the current slot value, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SlotError`] if the backend cannot be read.
    fn read(&self) -> Result<Option<String>, SlotError>;

    /// Replaces the slot value.
    ///
    /// # Errors
    ///
    /// Returns a [`SlotError`] if the backend refuses the write.
    fn write(&mut self, value: &str) -> Result<(), SlotError>;
}

/// In-memory slot backed by a shared cell.
///
/// Clones share the same underlying cell, so two stores opened over clones
/// of one `MemorySlot` model two execution contexts sharing one durable
/// slot (for example, two browser tabs).
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    cell: Rc<RefCell<Option<String>>>,
}

impl MemorySlot {
    /// Creates an empty in-memory slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        Ok(self.cell.borrow().clone())
    }

    fn write(&mut self, value: &str) -> Result<(), SlotError> {
        *self.cell.borrow_mut() = Some(value.to_string());

        Ok(())
    }
}

/// File-backed slot.
///
/// Writes go to a temporary sibling file first and are renamed into place,
/// so readers never observe a partially written snapshot.
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Creates a slot backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.as_os_str().to_owned();

        staging.push(".tmp");

        PathBuf::from(staging)
    }
}

impl SnapshotSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SlotError::Io(err)),
        }
    }

    fn write(&mut self, value: &str) -> Result<(), SlotError> {
        let staging = self.staging_path();

        fs::write(&staging, value)?;
        fs::rename(&staging, &self.path)?;

        Ok(())
    }
}

/// Serializes a cart snapshot to its text encoding.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the cart cannot be serialized.
pub fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(cart)
}

/// Decodes a snapshot, treating unreadable input as an empty cart.
#[must_use]
pub fn decode(raw: &str) -> Cart {
    match serde_json::from_str(raw) {
        Ok(cart) => cart,
        Err(err) => {
            debug!(%err, "discarding unreadable cart snapshot");

            Cart::new()
        }
    }
}

/// Best-effort persistence adapter around a durable slot.
#[derive(Debug)]
pub struct SnapshotStore<S> {
    slot: S,
}

impl<S: SnapshotSlot> SnapshotStore<S> {
    /// Wraps a slot.
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// Writes the cart snapshot to the slot.
    ///
    /// Failures are logged and swallowed; the in-memory cart stays
    /// authoritative for the active session.
    pub fn save(&mut self, cart: &Cart) {
        let encoded = match encode(cart) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(%err, "failed to serialize cart snapshot");

                return;
            }
        };

        if let Err(err) = self.slot.write(&encoded) {
            warn!(%err, "failed to persist cart snapshot");
        }
    }

    /// Reads the persisted cart, or an empty cart if the slot is absent,
    /// unreadable, or fails to parse.
    pub fn load(&self) -> Cart {
        match self.slot.read() {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => Cart::new(),
            Err(err) => {
                warn!(%err, "failed to read cart snapshot");

                Cart::new()
            }
        }
    }

    /// Returns the underlying slot.
    pub fn slot(&self) -> &S {
        &self.slot
    }
}

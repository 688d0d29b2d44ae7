//! Actuator registry
//!
//! The registry is the single owner of the mover records for a run. It is
//! populated once, after bring-up reaches Ready, and then only read; the
//! dispatcher and choreography driver borrow it instead of looking movers
//! up through any global.

use core::fmt;
use core::ptr;

use heapless::Vec;

use crate::traits::{MoverId, MAX_MOVERS};

/// Registry error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Id already registered with a different link
    #[error("mover {0} already registered with a different link")]
    DuplicateIdentity(MoverId),
    /// Id not registered
    #[error("mover {0} not registered")]
    NotFound(MoverId),
    /// Registry holds `MAX_MOVERS` movers already
    #[error("registry full")]
    Full,
}

/// A mover record: its identity and, optionally, the link that drives it
///
/// A mover without a link is a logical record only; motion aimed at it is
/// reported, not sent.
pub struct Mover<'l, L: ?Sized> {
    id: MoverId,
    link: Option<&'l L>,
}

impl<'l, L: ?Sized> Mover<'l, L> {
    /// Create a mover record
    pub const fn new(id: MoverId, link: Option<&'l L>) -> Self {
        Self { id, link }
    }

    /// Mover identity
    pub fn id(&self) -> MoverId {
        self.id
    }

    /// Bound link, if any
    pub fn link(&self) -> Option<&'l L> {
        self.link
    }

    /// Check if a link is bound
    pub fn is_bound(&self) -> bool {
        self.link.is_some()
    }

    fn same_link(&self, other: Option<&L>) -> bool {
        match (self.link, other) {
            (None, None) => true,
            (Some(a), Some(b)) => ptr::eq(a, b),
            _ => false,
        }
    }
}

impl<L: ?Sized> Clone for Mover<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: ?Sized> Copy for Mover<'_, L> {}

impl<L: ?Sized> fmt::Debug for Mover<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mover")
            .field("id", &self.id)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Movers known for this run, sorted by ascending id
pub struct MoverRegistry<'l, L: ?Sized> {
    movers: Vec<Mover<'l, L>, MAX_MOVERS>,
}

impl<L: ?Sized> Default for MoverRegistry<'_, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for MoverRegistry<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.movers.iter()).finish()
    }
}

impl<'l, L: ?Sized> MoverRegistry<'l, L> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self { movers: Vec::new() }
    }

    /// Register a mover, or return the existing record for the same id and link
    pub fn register(&mut self, id: MoverId, link: Option<&'l L>) -> Result<Mover<'l, L>, RegistryError> {
        match self.movers.binary_search_by_key(&id, |m| m.id) {
            Ok(index) => {
                let existing = self.movers[index];
                if existing.same_link(link) {
                    Ok(existing)
                } else {
                    Err(RegistryError::DuplicateIdentity(id))
                }
            }
            Err(index) => {
                let mover = Mover::new(id, link);
                self.movers
                    .insert(index, mover)
                    .map_err(|_| RegistryError::Full)?;
                Ok(mover)
            }
        }
    }

    /// Register every id against one link
    ///
    /// Returns the number of movers newly added.
    pub fn populate(&mut self, link: &'l L, ids: &[MoverId]) -> Result<usize, RegistryError> {
        let before = self.movers.len();
        for &id in ids {
            self.register(id, Some(link))?;
        }
        Ok(self.movers.len() - before)
    }

    /// Look up a mover
    pub fn get(&self, id: MoverId) -> Result<Mover<'l, L>, RegistryError> {
        self.movers
            .binary_search_by_key(&id, |m| m.id)
            .map(|index| self.movers[index])
            .map_err(|_| RegistryError::NotFound(id))
    }

    /// All movers in ascending id order
    pub fn all(&self) -> &[Mover<'l, L>] {
        &self.movers
    }

    /// Ids of all movers in ascending order
    pub fn ids(&self) -> impl Iterator<Item = MoverId> + '_ {
        self.movers.iter().map(|m| m.id)
    }

    /// Number of registered movers
    pub fn len(&self) -> usize {
        self.movers.len()
    }

    /// Check if no movers are registered
    pub fn is_empty(&self) -> bool {
        self.movers.is_empty()
    }
}

//! Body identifiers and the body arena.
//!
//! A [`BodyId`] is a 64-bit handle that packs a *generation* counter in the
//! high 32 bits and a slot *index* in the low 32 bits. Removing a body bumps
//! the slot's generation, so a handle kept past removal is detected as stale
//! instead of silently aliasing whichever body reuses the slot.
//!
//! [`BodySet`] owns every [`Body`] of a world. Ride-graph edges are stored as
//! `BodyId` values inside the bodies themselves, never as references.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::body::Body;

// ---------------------------------------------------------------------------
// BodyId
// ---------------------------------------------------------------------------

/// A generational body identifier.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(u64);

impl BodyId {
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The slot index (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// BodySet
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Generational arena of bodies.
///
/// Iteration ([`ids`](BodySet::ids), [`iter`](BodySet::iter)) runs in
/// ascending slot index. Every pass of the simulation uses that order, which
/// keeps a tick reproducible regardless of insertion history.
///
/// Free slots are recycled FIFO so that generations spread across slots
/// instead of piling onto one hot index.
#[derive(Debug, Default)]
pub struct BodySet {
    slots: Vec<Slot>,
    free: VecDeque<u32>,
    len: usize,
}

impl BodySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a body and return its handle.
    pub fn insert(&mut self, body: Body) -> BodyId {
        self.len += 1;
        if let Some(index) = self.free.pop_front() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.body.is_none(), "free slot {index} is occupied");
            slot.body = Some(body);
            BodyId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyId::new(index, 0)
        }
    }

    /// Take a body out of the arena. Returns `None` for stale or unknown
    /// handles.
    ///
    /// This does not touch ride edges of other bodies; use
    /// [`World::remove`](crate::world::World::remove) for that.
    pub(crate) fn take(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push_back(id.index());
        self.len -= 1;
        Some(body)
    }

    /// Whether `id` refers to a body currently stored in the arena.
    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.body.as_mut()
    }

    /// Mutable access to two distinct bodies at once.
    ///
    /// # Panics
    ///
    /// Panics if `a == b`.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
        assert_ne!(a.index(), b.index(), "pair_mut called with the same slot {a}");
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (ia, ib) = (a.index() as usize, b.index() as usize);
        let (first, second) = if ia < ib {
            let (lo, hi) = self.slots.split_at_mut(ib);
            (&mut lo[ia], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(ia);
            (&mut hi[0], &mut lo[ib])
        };
        Some((first.body.as_mut()?, second.body.as_mut()?))
    }

    /// Number of stored bodies.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handles of every stored body in ascending index order.
    pub fn ids(&self) -> Vec<BodyId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Iterate `(id, body)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body
                .as_ref()
                .map(|body| (BodyId::new(index as u32, slot.generation), body))
        })
    }
}

impl std::ops::Index<BodyId> for BodySet {
    type Output = Body;

    fn index(&self, id: BodyId) -> &Body {
        match self.get(id) {
            Some(body) => body,
            None => panic!("body {id} does not exist (stale or never inserted)"),
        }
    }
}

impl std::ops::IndexMut<BodyId> for BodySet {
    fn index_mut(&mut self, id: BodyId) -> &mut Body {
        match self.get_mut(id) {
            Some(body) => body,
            None => panic!("body {id} does not exist (stale or never inserted)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#![forbid(unsafe_code)]

//! Generational arena holding per-panel state.
//!
//! Slots are reused after removal; each reuse bumps the slot's generation so
//! a [`PanelId`] held past its panel's lifetime never resolves to the panel
//! that took its slot.

use std::fmt;

/// Handle to a panel owned by an overlay manager.
///
/// Cheap to copy; resolves to `None` once the panel has closed and been
/// destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId {
    index: u32,
    generation: u32,
}

impl PanelId {
    /// Slot index (diagnostics only).
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    /// Odd while occupied, even while free.
    generation: u32,
    value: Option<T>,
}

/// Arena of `T` addressed by [`PanelId`].
#[derive(Debug, Clone)]
pub struct PanelArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for PanelArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PanelArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value built from its own id.
    pub fn insert_with(&mut self, build: impl FnOnce(PanelId) -> T) -> PanelId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let id = PanelId {
            index,
            generation: slot.generation,
        };
        slot.value = Some(build(id));
        self.len += 1;
        id
    }

    pub fn get(&self, id: PanelId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: PanelId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    #[inline]
    pub fn contains(&self, id: PanelId) -> bool {
        self.get(id).is_some()
    }

    /// Remove and return the value; the id becomes permanently stale.
    pub fn remove(&mut self, id: PanelId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PanelId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    PanelId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut arena = PanelArena::new();
        let a = arena.insert_with(|_| "a");
        let b = arena.insert_with(|_| "b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn reused_slot_does_not_alias_stale_id() {
        let mut arena = PanelArena::new();
        let old = arena.insert_with(|_| 1);
        arena.remove(old);
        let new = arena.insert_with(|_| 2);
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get(new), Some(&2));
        assert_eq!(arena.remove(old), None);
    }

    #[test]
    fn builder_sees_its_id() {
        let mut arena = PanelArena::new();
        let id = arena.insert_with(|id| id);
        assert_eq!(arena.get(id), Some(&id));
    }

    #[test]
    fn iter_skips_free_slots() {
        let mut arena = PanelArena::new();
        let a = arena.insert_with(|_| 'a');
        let _b = arena.insert_with(|_| 'b');
        arena.remove(a);
        let values: Vec<char> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!['b']);
    }

    #[test]
    fn display_is_compact() {
        let mut arena = PanelArena::new();
        let id = arena.insert_with(|_| ());
        assert_eq!(id.to_string(), "panel#0v1");
    }
}

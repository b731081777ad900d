use super::entity::Entity;

/// Ordered entity collection that tolerates spawns and removals mid-pass.
///
/// A pass walks the slot indices captured when it started. The entity being
/// driven is lifted out of its slot for the duration of its call, so it can be
/// handed the level that owns this very list. Spawns wait in `pending` and
/// expired entities stay in place until [`EntityList::compact`] runs once the
/// frame's passes are over.
pub struct EntityList<P> {
    slots: Vec<Option<Box<dyn Entity<P>>>>,
    pending: Vec<Box<dyn Entity<P>>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactStats {
    pub removed: usize,
    pub spawned: usize,
}

impl CompactStats {
    pub fn merge(self, other: CompactStats) -> CompactStats {
        CompactStats {
            removed: self.removed + other.removed,
            spawned: self.spawned + other.spawned,
        }
    }
}

impl<P> Default for EntityList<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> EntityList<P> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Appends directly, bypassing the pending queue. Meant for level
    /// construction, before any pass runs.
    pub fn push(&mut self, entity: Box<dyn Entity<P>>) {
        self.slots.push(Some(entity));
    }

    /// Queues an entity; it joins the list at the next compaction.
    pub fn spawn(&mut self, entity: Box<dyn Entity<P>>) {
        self.pending.push(entity);
    }

    /// Entities currently in the list, expired ones included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Entities that will still be around after the next compaction.
    pub fn live_count(&self) -> usize {
        let settled = self
            .slots
            .iter()
            .flatten()
            .filter(|entity| !entity.is_expired())
            .count();
        settled + self.pending.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Entity<P>> + '_ {
        self.slots.iter().flatten().map(|entity| entity.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Entity<P> + 'static)> + '_ {
        self.slots.iter_mut().flatten().map(|entity| entity.as_mut())
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn take(&mut self, index: usize) -> Option<Box<dyn Entity<P>>> {
        self.slots.get_mut(index)?.take()
    }

    pub(crate) fn restore(&mut self, index: usize, entity: Box<dyn Entity<P>>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(entity);
        }
    }

    pub fn compact(&mut self) -> CompactStats {
        let before = self.slots.len();
        self.slots
            .retain(|slot| slot.as_ref().is_some_and(|entity| !entity.is_expired()));
        let removed = before - self.slots.len();
        let spawned = self.pending.len();
        self.slots.extend(self.pending.drain(..).map(Some));
        CompactStats { removed, spawned }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::{CallLog, Probe, ProbePlayer};

    #[test]
    fn compact_drops_expired_and_appends_pending_in_order() {
        let log = CallLog::default();
        let mut list: EntityList<ProbePlayer> = EntityList::new();
        list.push(Probe::boxed("a", &log));
        list.push(Probe::expired("b", &log));
        list.push(Probe::boxed("c", &log));
        list.spawn(Probe::boxed("d", &log));
        list.spawn(Probe::boxed("e", &log));

        assert_eq!(list.len(), 3);
        assert_eq!(list.live_count(), 4);

        let stats = list.compact();

        assert_eq!(stats, CompactStats { removed: 1, spawned: 2 });
        assert_eq!(list.pending_len(), 0);
        let names: Vec<_> = list.iter().map(|entity| entity.debug_name()).collect();
        assert_eq!(names, vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn taken_slot_is_invisible_until_restored() {
        let log = CallLog::default();
        let mut list: EntityList<ProbePlayer> = EntityList::new();
        list.push(Probe::boxed("a", &log));
        list.push(Probe::boxed("b", &log));

        let taken = list.take(0).expect("slot 0");
        assert_eq!(list.len(), 1);
        assert!(list.take(0).is_none());

        list.restore(0, taken);
        let names: Vec<_> = list.iter().map(|entity| entity.debug_name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn restore_past_the_end_is_dropped() {
        let log = CallLog::default();
        let mut list: EntityList<ProbePlayer> = EntityList::new();

        list.restore(4, Probe::boxed("ghost", &log));

        assert!(list.is_empty());
        assert_eq!(list.slot_count(), 0);
    }
}

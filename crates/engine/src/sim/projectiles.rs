use super::entity::Entity;
use super::entity_list::{CompactStats, EntityList};

/// Player-spawned projectiles, kept in spawn order.
///
/// Spawned entries join at the end of the frame; entries that expire on
/// impact or timeout are gone after that same compaction.
pub struct ProjectileSet<P> {
    list: EntityList<P>,
}

impl<P> Default for ProjectileSet<P> {
    fn default() -> Self {
        Self {
            list: EntityList::new(),
        }
    }
}

impl<P> ProjectileSet<P> {
    pub fn spawn(&mut self, projectile: Box<dyn Entity<P>>) {
        self.list.spawn(projectile);
    }

    /// Projectiles in flight or about to be, excluding ones already spent.
    pub fn live_count(&self) -> usize {
        self.list.live_count()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Entity<P>> + '_ {
        self.list.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Entity<P> + 'static)> + '_ {
        self.list.iter_mut()
    }

    pub(crate) fn list_mut(&mut self) -> &mut EntityList<P> {
        &mut self.list
    }

    pub(crate) fn compact(&mut self) -> CompactStats {
        self.list.compact()
    }

    pub(crate) fn clear(&mut self) {
        self.list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::{CallLog, Probe, ProbePlayer};

    #[test]
    fn spawned_projectiles_join_in_fifo_order() {
        let log = CallLog::default();
        let mut fireballs: ProjectileSet<ProbePlayer> = ProjectileSet::default();
        fireballs.spawn(Probe::boxed("first", &log));
        fireballs.spawn(Probe::boxed("second", &log));

        assert!(fireballs.is_empty());
        assert_eq!(fireballs.live_count(), 2);

        fireballs.compact();

        let names: Vec<_> = fireballs.iter().map(|entity| entity.debug_name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn spent_projectiles_do_not_count_as_live() {
        let log = CallLog::default();
        let mut fireballs: ProjectileSet<ProbePlayer> = ProjectileSet::default();
        fireballs.list_mut().push(Probe::expired("spent", &log));
        fireballs.list_mut().push(Probe::boxed("flying", &log));

        assert_eq!(fireballs.len(), 2);
        assert_eq!(fireballs.live_count(), 1);

        let stats = fireballs.compact();
        assert_eq!(stats.removed, 1);
        assert_eq!(fireballs.len(), 1);
    }
}

//! Widget pool keyed by resource identity

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use super::item::{ItemFactory, ListItem, ResourceId};

new_key_type! {
    /// Handle to a pooled widget
    pub struct WidgetId;
}

/// Pool churn counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecyclerStats {
    /// Widgets built by the factory
    pub created: u64,
    /// Widgets handed back to the factory
    pub destroyed: u64,
    /// Acquisitions satisfied from the free list
    pub reused: u64,
    /// Widgets returned to the free list
    pub released: u64,
}

impl RecyclerStats {
    /// Counters accumulated since `earlier`
    pub fn since(&self, earlier: &RecyclerStats) -> RecyclerStats {
        RecyclerStats {
            created: self.created - earlier.created,
            destroyed: self.destroyed - earlier.destroyed,
            reused: self.reused - earlier.reused,
            released: self.released - earlier.released,
        }
    }
}

struct PooledItem<T> {
    resource: ResourceId,
    item: T,
    live: bool,
}

/// Owns every widget a list has created
pub struct ItemRecycler<F: ItemFactory> {
    factory: F,
    items: SlotMap<WidgetId, PooledItem<F::Item>>,
    free: FxHashMap<ResourceId, SmallVec<[WidgetId; 4]>>,
    stats: RecyclerStats,
}

impl<F: ItemFactory> ItemRecycler<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            items: SlotMap::with_key(),
            free: FxHashMap::default(),
            stats: RecyclerStats::default(),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn stats(&self) -> RecyclerStats {
        self.stats
    }

    /// Take a widget for `resource`, reusing a pooled one when possible
    pub fn acquire(&mut self, resource: &ResourceId) -> WidgetId {
        if let Some(id) = self.free.get_mut(resource).and_then(|ids| ids.pop()) {
            if let Some(pooled) = self.items.get_mut(id) {
                pooled.live = true;
                pooled.item.set_visible(true);
                self.stats.reused += 1;
                return id;
            }
        }

        let mut item = self.factory.create(resource);
        item.set_visible(true);
        self.stats.created += 1;
        tracing::debug!("recycler created widget for {resource}");
        self.items.insert(PooledItem {
            resource: resource.clone(),
            item,
            live: true,
        })
    }

    /// Return a live widget to the pool
    pub fn release(&mut self, id: WidgetId) {
        let Some(pooled) = self.items.get_mut(id) else {
            return;
        };
        if !pooled.live {
            return;
        }
        pooled.live = false;
        pooled.item.set_visible(false);
        self.free
            .entry(pooled.resource.clone())
            .or_default()
            .push(id);
        self.stats.released += 1;
    }

    pub fn resource(&self, id: WidgetId) -> Option<&ResourceId> {
        self.items.get(id).map(|pooled| &pooled.resource)
    }

    pub fn get(&self, id: WidgetId) -> Option<&F::Item> {
        self.items.get(id).map(|pooled| &pooled.item)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut F::Item> {
        self.items.get_mut(id).map(|pooled| &mut pooled.item)
    }

    pub fn is_live(&self, id: WidgetId) -> bool {
        self.items.get(id).is_some_and(|pooled| pooled.live)
    }

    /// Destroy every pooled (not live) widget
    pub fn clear_pool(&mut self) {
        for (resource, ids) in self.free.drain() {
            for id in ids {
                if let Some(pooled) = self.items.remove(id) {
                    self.factory.destroy(&resource, pooled.item);
                    self.stats.destroyed += 1;
                }
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.items.values().filter(|pooled| pooled.live).count()
    }

    pub fn pooled_count(&self) -> usize {
        self.free.values().map(|ids| ids.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::item::{Positionable, Resizable};
    use glide_core::Vec2;

    #[derive(Default)]
    struct Cell {
        visible: bool,
    }

    impl Resizable for Cell {
        fn size(&self) -> Vec2 {
            Vec2::new(100.0, 50.0)
        }
        fn set_size(&mut self, _size: Vec2) {}
    }

    impl Positionable for Cell {
        fn position(&self) -> Vec2 {
            Vec2::ZERO
        }
        fn set_position(&mut self, _position: Vec2) {}
    }

    impl ListItem for Cell {
        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
    }

    struct CellFactory;

    impl ItemFactory for CellFactory {
        type Item = Cell;

        fn create(&mut self, _resource: &ResourceId) -> Cell {
            Cell::default()
        }
    }

    #[test]
    fn test_release_then_reuse() {
        let mut recycler = ItemRecycler::new(CellFactory);
        let row: ResourceId = "row".into();
        let a = recycler.acquire(&row);
        assert!(recycler.get(a).unwrap().visible);

        recycler.release(a);
        recycler.release(a);
        assert!(!recycler.get(a).unwrap().visible);
        assert_eq!(recycler.pooled_count(), 1);

        let b = recycler.acquire(&row);
        assert_eq!(a, b);
        let stats = recycler.stats();
        assert_eq!((stats.created, stats.reused, stats.released), (1, 1, 1));
    }

    #[test]
    fn test_pool_is_keyed_by_resource() {
        let mut recycler = ItemRecycler::new(CellFactory);
        let row: ResourceId = "row".into();
        let header: ResourceId = "header".into();
        let a = recycler.acquire(&row);
        recycler.release(a);

        let h = recycler.acquire(&header);
        assert_ne!(a, h);
        assert_eq!(recycler.resource(h), Some(&header));
        assert_eq!(recycler.live_count(), 1);
    }

    #[test]
    fn test_clear_pool_destroys_free_only() {
        let mut recycler = ItemRecycler::new(CellFactory);
        let row: ResourceId = "row".into();
        let a = recycler.acquire(&row);
        let b = recycler.acquire(&row);
        recycler.release(a);
        recycler.clear_pool();

        assert!(recycler.get(a).is_none());
        assert!(recycler.is_live(b));
        assert_eq!(recycler.stats().destroyed, 1);
    }
}

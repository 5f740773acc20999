//! Owned items, equipment slots and inventory fusion.

use std::collections::BTreeMap;

use gem_defence_core::{
    ActiveGemKind, ArtifactKind, BossArtifactKind, CommandError, ItemId, ItemInstance,
    ItemTemplate, Leveled, Loadout, LoadoutSnapshot, Slot, SupportGemKind, INVENTORY_CAPACITY,
    SUPPORT_SLOTS,
};

/// Result of adding a new item to the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Acquired {
    /// A fresh instance joined the inventory.
    New(ItemId),
    /// An identical unequipped instance absorbed the pickup.
    Fused { item: ItemId, level: u32 },
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Equipment {
    items: BTreeMap<ItemId, ItemInstance>,
    slots: BTreeMap<Slot, ItemId>,
    next_id: u32,
}

impl Equipment {
    pub(crate) fn slot_of(&self, item: ItemId) -> Option<Slot> {
        self.slots
            .iter()
            .find_map(|(slot, occupant)| (*occupant == item).then_some(*slot))
    }

    pub(crate) fn occupant(&self, slot: Slot) -> Option<&ItemInstance> {
        self.slots.get(&slot).and_then(|item| self.items.get(item))
    }

    fn is_equipped(&self, item: ItemId) -> bool {
        self.slots.values().any(|occupant| *occupant == item)
    }

    /// Unequipped items in identity order.
    pub(crate) fn inventory(&self) -> Vec<ItemInstance> {
        self.items
            .values()
            .filter(|instance| !self.is_equipped(instance.id))
            .copied()
            .collect()
    }

    pub(crate) fn inventory_len(&self) -> usize {
        self.items.len() - self.slots.len()
    }

    /// Equipped items in slot order.
    pub(crate) fn equipped(&self) -> Vec<(Slot, ItemInstance)> {
        self.slots
            .iter()
            .filter_map(|(slot, item)| self.items.get(item).map(|instance| (*slot, *instance)))
            .collect()
    }

    /// Adds an item, fusing it into an identical unequipped instance if one exists.
    pub(crate) fn acquire(
        &mut self,
        template: ItemTemplate,
        level: u32,
    ) -> Result<Acquired, CommandError> {
        let level = level.max(1);
        let partner = self
            .items
            .values()
            .find(|instance| {
                instance.template == template
                    && instance.level == level
                    && !self.is_equipped(instance.id)
            })
            .map(|instance| instance.id);

        if let Some(partner) = partner {
            if let Some(instance) = self.items.get_mut(&partner) {
                instance.level += 1;
                return Ok(Acquired::Fused {
                    item: partner,
                    level: instance.level,
                });
            }
        }

        if self.inventory_len() >= INVENTORY_CAPACITY {
            return Err(CommandError::InventoryFull);
        }

        self.next_id += 1;
        let id = ItemId::new(self.next_id);
        let _ = self.items.insert(
            id,
            ItemInstance {
                id,
                template,
                level,
            },
        );
        Ok(Acquired::New(id))
    }

    /// Reports whether `acquire` would succeed without changing anything.
    pub(crate) fn can_accept(&self, template: ItemTemplate, level: u32) -> bool {
        self.inventory_len() < INVENTORY_CAPACITY
            || self.items.values().any(|instance| {
                instance.template == template
                    && instance.level == level.max(1)
                    && !self.is_equipped(instance.id)
            })
    }

    /// Moves an owned item into `slot`, swapping with any occupant.
    ///
    /// The occupant takes the item's previous slot when it had one, otherwise
    /// it returns to the inventory.
    pub(crate) fn equip(&mut self, item: ItemId, slot: Slot) -> Result<(), CommandError> {
        let instance = *self.items.get(&item).ok_or(CommandError::UnknownItem(item))?;
        if !slot.in_range() {
            return Err(CommandError::SlotOutOfRange(slot));
        }
        if !instance.template.fits(slot) {
            return Err(CommandError::IncompatibleSlot { item, slot });
        }

        let previous = self.slot_of(item);
        if previous == Some(slot) {
            return Ok(());
        }

        if let Some(previous) = previous {
            let _ = self.slots.remove(&previous);
        }
        let displaced = self.slots.insert(slot, item);

        if let (Some(displaced), Some(previous)) = (displaced, previous) {
            let _ = self.slots.insert(previous, displaced);
        }
        Ok(())
    }

    pub(crate) fn unequip(&mut self, item: ItemId) -> Result<(), CommandError> {
        if !self.items.contains_key(&item) {
            return Err(CommandError::UnknownItem(item));
        }
        let slot = self.slot_of(item).ok_or(CommandError::ItemNotEquipped(item))?;
        if self.inventory_len() >= INVENTORY_CAPACITY {
            return Err(CommandError::InventoryFull);
        }
        let _ = self.slots.remove(&slot);
        Ok(())
    }

    pub(crate) fn loadout(&self, loadout: Loadout) -> LoadoutSnapshot {
        let active = self
            .occupant(Slot::Active(loadout))
            .and_then(|instance| match instance.template {
                ItemTemplate::ActiveGem(kind) => Some(Leveled::<ActiveGemKind> {
                    kind,
                    level: instance.level,
                }),
                _ => None,
            });
        let supports = (0..SUPPORT_SLOTS)
            .filter_map(|index| self.occupant(Slot::Support(loadout, index)))
            .filter_map(|instance| match instance.template {
                ItemTemplate::SupportGem(kind) => Some(Leveled::<SupportGemKind> {
                    kind,
                    level: instance.level,
                }),
                _ => None,
            })
            .collect();
        LoadoutSnapshot {
            loadout,
            active,
            supports,
        }
    }

    pub(crate) fn artifacts(&self) -> Vec<Leveled<ArtifactKind>> {
        self.equipped()
            .into_iter()
            .filter_map(|(_, instance)| match instance.template {
                ItemTemplate::Artifact(kind) => Some(Leveled {
                    kind,
                    level: instance.level,
                }),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn boss_artifacts(&self) -> Vec<BossArtifactKind> {
        self.equipped()
            .into_iter()
            .filter_map(|(_, instance)| match instance.template {
                ItemTemplate::BossArtifact(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem(kind: ActiveGemKind) -> ItemTemplate {
        ItemTemplate::ActiveGem(kind)
    }

    fn new_item(equipment: &mut Equipment, template: ItemTemplate) -> ItemId {
        match equipment.acquire(template, 1).expect("space") {
            Acquired::New(id) => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn moving_between_slots_swaps_occupants() {
        let mut equipment = Equipment::default();
        let spark = new_item(&mut equipment, gem(ActiveGemKind::Spark));
        let ember = new_item(&mut equipment, gem(ActiveGemKind::Ember));

        equipment.equip(spark, Slot::Active(Loadout::Main)).expect("equip");
        equipment
            .equip(ember, Slot::Active(Loadout::Alternate))
            .expect("equip");
        equipment.equip(ember, Slot::Active(Loadout::Main)).expect("swap");

        assert_eq!(equipment.slot_of(ember), Some(Slot::Active(Loadout::Main)));
        assert_eq!(
            equipment.slot_of(spark),
            Some(Slot::Active(Loadout::Alternate))
        );
        assert_eq!(equipment.equipped().len(), 2);
    }

    #[test]
    fn equipping_from_inventory_returns_occupant_to_inventory() {
        let mut equipment = Equipment::default();
        let spark = new_item(&mut equipment, gem(ActiveGemKind::Spark));
        let volt = new_item(&mut equipment, gem(ActiveGemKind::Volt));

        equipment.equip(spark, Slot::Active(Loadout::Main)).expect("equip");
        equipment.equip(volt, Slot::Active(Loadout::Main)).expect("equip");

        assert_eq!(equipment.slot_of(spark), None);
        assert_eq!(equipment.inventory().len(), 1);
    }

    #[test]
    fn rejects_wrong_slot_kind_and_range() {
        let mut equipment = Equipment::default();
        let spark = new_item(&mut equipment, gem(ActiveGemKind::Spark));

        assert_eq!(
            equipment.equip(spark, Slot::Accessory(0)),
            Err(CommandError::IncompatibleSlot {
                item: spark,
                slot: Slot::Accessory(0)
            })
        );
        let lens = new_item(&mut equipment, ItemTemplate::Artifact(ArtifactKind::SharpLens));
        assert_eq!(
            equipment.equip(lens, Slot::Accessory(9)),
            Err(CommandError::SlotOutOfRange(Slot::Accessory(9)))
        );
        assert_eq!(
            equipment.equip(ItemId::new(99), Slot::Accessory(0)),
            Err(CommandError::UnknownItem(ItemId::new(99)))
        );
    }

    #[test]
    fn identical_pickups_fuse() {
        let mut equipment = Equipment::default();
        let first = new_item(&mut equipment, gem(ActiveGemKind::Frost));
        let fused = equipment
            .acquire(gem(ActiveGemKind::Frost), 1)
            .expect("fusion");
        assert_eq!(
            fused,
            Acquired::Fused {
                item: first,
                level: 2
            }
        );
        assert_eq!(equipment.inventory().len(), 1);
    }

    #[test]
    fn full_inventory_blocks_pickups_unless_they_fuse() {
        let mut equipment = Equipment::default();
        for index in 0..INVENTORY_CAPACITY {
            let level = index as u32 + 1;
            let _ = equipment
                .acquire(gem(ActiveGemKind::Spark), level)
                .expect("space");
        }
        assert_eq!(equipment.inventory_len(), INVENTORY_CAPACITY);
        assert_eq!(
            equipment.acquire(gem(ActiveGemKind::Ember), 1),
            Err(CommandError::InventoryFull)
        );
        assert!(!equipment.can_accept(gem(ActiveGemKind::Ember), 1));
        assert!(equipment.can_accept(gem(ActiveGemKind::Spark), 3));
        assert!(matches!(
            equipment.acquire(gem(ActiveGemKind::Spark), 3),
            Ok(Acquired::Fused { level: 4, .. })
        ));
    }

    #[test]
    fn loadout_snapshot_lists_supports_in_slot_order() {
        let mut equipment = Equipment::default();
        let spark = new_item(&mut equipment, gem(ActiveGemKind::Spark));
        let haste = new_item(&mut equipment, ItemTemplate::SupportGem(SupportGemKind::Haste));
        let pierce = new_item(&mut equipment, ItemTemplate::SupportGem(SupportGemKind::Pierce));

        equipment.equip(spark, Slot::Active(Loadout::Main)).expect("equip");
        equipment
            .equip(pierce, Slot::Support(Loadout::Main, 2))
            .expect("equip");
        equipment
            .equip(haste, Slot::Support(Loadout::Main, 0))
            .expect("equip");

        let snapshot = equipment.loadout(Loadout::Main);
        assert_eq!(snapshot.active.map(|gem| gem.kind), Some(ActiveGemKind::Spark));
        let kinds: Vec<_> = snapshot.supports.iter().map(|gem| gem.kind).collect();
        assert_eq!(kinds, vec![SupportGemKind::Haste, SupportGemKind::Pierce]);
    }
}

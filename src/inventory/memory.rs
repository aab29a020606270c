use crate::inventory::traits::{InventoryProvider, InventoryResult};
use crate::inventory::Inventory;

/// Inventory provider backed by a snapshot held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    inventory: Inventory,
}

impl StaticInventory {
    pub fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }
}

impl InventoryProvider for StaticInventory {
    fn load_inventory(&self) -> InventoryResult<Inventory> {
        Ok(self.inventory.clone())
    }
}

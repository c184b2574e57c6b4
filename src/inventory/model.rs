//! Reference inventory implementation.

use super::{Inventory, StockMap};
use crate::error::SubmissionError;

/// In-memory inventory backed by an ordered map.
///
/// Updating an item that was never added leaves the inventory unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryModel {
    items: StockMap,
}

impl InventoryModel {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the current stock.
    pub fn items(&self) -> &StockMap {
        &self.items
    }
}

impl Inventory for InventoryModel {
    fn add_item(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError> {
        if let Some(stock) = self.items.get_mut(name) {
            *stock += quantity;
        } else {
            self.items.insert(name.to_string(), quantity);
        }
        Ok(self.items.clone())
    }

    fn update_stock(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError> {
        if let Some(stock) = self.items.get_mut(name) {
            *stock = quantity;
        }
        Ok(self.items.clone())
    }

    fn get_item_stock(&self, name: &str) -> Result<u64, SubmissionError> {
        let stock = if let Some(stock) = self.items.get(name) {
            *stock
        } else {
            0
        };
        Ok(stock)
    }

    fn get_available_items(&self) -> Result<Vec<String>, SubmissionError> {
        let mut available = Vec::new();
        for (name, stock) in &self.items {
            if *stock > 0 {
                available.push(name.clone());
            }
        }
        Ok(available)
    }
}

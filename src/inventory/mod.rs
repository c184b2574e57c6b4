//! The inventory contract graded by the harness.
//!
//! A submission is any type implementing [`Inventory`]: a map of item name to
//! non-negative quantity with add, update, lookup and listing operations.
//! [`InventoryModel`] is the reference implementation; its own source text is
//! bundled as [`REFERENCE_SOURCE`] so the harness can grade itself.

mod model;

pub use model::InventoryModel;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;

/// Source text of the reference implementation.
pub const REFERENCE_SOURCE: &str = include_str!("model.rs");

/// Snapshot of an inventory: item name to quantity.
pub type StockMap = BTreeMap<String, u64>;

/// Operations every submission exposes.
pub trait Inventory {
    /// Add `quantity` units of `name`, accumulating onto any existing stock.
    fn add_item(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError>;

    /// Overwrite the stock of an existing item.
    fn update_stock(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError>;

    /// Current stock of `name`, zero when the item is unknown.
    fn get_item_stock(&self, name: &str) -> Result<u64, SubmissionError>;

    /// Names of all items with stock strictly greater than zero.
    fn get_available_items(&self) -> Result<Vec<String>, SubmissionError>;
}

impl<T: Inventory + ?Sized> Inventory for Box<T> {
    fn add_item(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError> {
        (**self).add_item(name, quantity)
    }

    fn update_stock(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError> {
        (**self).update_stock(name, quantity)
    }

    fn get_item_stock(&self, name: &str) -> Result<u64, SubmissionError> {
        (**self).get_item_stock(name)
    }

    fn get_available_items(&self) -> Result<Vec<String>, SubmissionError> {
        (**self).get_available_items()
    }
}

/// Identifies one inventory operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AddItem,
    UpdateStock,
    GetItemStock,
    GetAvailableItems,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Operation; 4] = [
        Operation::AddItem,
        Operation::UpdateStock,
        Operation::GetItemStock,
        Operation::GetAvailableItems,
    ];

    /// Function name a submission uses for this operation.
    pub fn function_name(&self) -> &'static str {
        match self {
            Operation::AddItem => "add_item",
            Operation::UpdateStock => "update_stock",
            Operation::GetItemStock => "get_item_stock",
            Operation::GetAvailableItems => "get_available_items",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.function_name())
    }
}

//! Randomized probe run once per suite execution.
//!
//! The probe drives a fresh submission with a random item name and random
//! quantities. Operations that misbehave land in a [`RandomizedFailureSet`]
//! that vetoes every case targeting them.

use std::collections::BTreeSet;

use rand::RngExt;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::guarded;
use crate::error::SubmissionError;
use crate::inventory::{Inventory, Operation};

/// Length of the random item name.
const NAME_LEN: usize = 6;

/// Operations that failed the randomized probe. Read-only once computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizedFailureSet {
    failed: BTreeSet<Operation>,
}

impl RandomizedFailureSet {
    /// A set with no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set in which every operation failed.
    pub fn all() -> Self {
        Self {
            failed: Operation::ALL.into_iter().collect(),
        }
    }

    pub fn contains(&self, op: Operation) -> bool {
        self.failed.contains(&op)
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failed.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        self.failed.iter().copied()
    }

    fn insert(&mut self, op: Operation) {
        self.failed.insert(op);
    }
}

impl FromIterator<Operation> for RandomizedFailureSet {
    fn from_iter<T: IntoIterator<Item = Operation>>(iter: T) -> Self {
        Self {
            failed: iter.into_iter().collect(),
        }
    }
}

/// Random inputs for one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeInputs {
    pub name: String,
    /// Quantity first added, in `10..=20`
    pub quantity: u64,
    /// Quantity the item is updated to, in `25..=35`
    pub update: u64,
}

impl ProbeInputs {
    /// Draws probe inputs from `rng`.
    pub fn generate(rng: &mut ChaCha8Rng) -> Self {
        let name = (0..NAME_LEN)
            .map(|_| char::from(rng.random_range(b'a'..=b'z')))
            .collect();
        Self {
            name,
            quantity: rng.random_range(10..=20),
            update: rng.random_range(25..=35),
        }
    }
}

/// Probes a fresh `inventory` with random inputs.
///
/// An error or panic from the submission fails every operation.
pub fn probe<I: Inventory>(inventory: I, inputs: &ProbeInputs) -> RandomizedFailureSet {
    let mut inventory = inventory;
    match guarded(|| run_probe(&mut inventory, inputs)) {
        Ok(failures) => {
            debug!(failed = failures.len(), item = %inputs.name, "Randomized probe finished");
            failures
        }
        Err(e) => {
            warn!(error = %e, "Randomized probe crashed; failing all operations");
            RandomizedFailureSet::all()
        }
    }
}

fn run_probe<I: Inventory>(
    inventory: &mut I,
    inputs: &ProbeInputs,
) -> Result<RandomizedFailureSet, SubmissionError> {
    let mut failures = RandomizedFailureSet::new();

    inventory.add_item(&inputs.name, inputs.quantity)?;
    if inventory.get_item_stock(&inputs.name)? != inputs.quantity {
        failures.insert(Operation::AddItem);
        failures.insert(Operation::GetItemStock);
    }

    inventory.update_stock(&inputs.name, inputs.update)?;
    if inventory.get_item_stock(&inputs.name)? != inputs.update {
        failures.insert(Operation::UpdateStock);
    }

    if !inventory.get_available_items()?.contains(&inputs.name) {
        failures.insert(Operation::GetAvailableItems);
    }

    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{InventoryModel, StockMap};
    use rand::SeedableRng;

    /// Update silently ignores its argument.
    #[derive(Default)]
    struct FrozenUpdate(InventoryModel);

    impl Inventory for FrozenUpdate {
        fn add_item(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError> {
            self.0.add_item(name, quantity)
        }
        fn update_stock(&mut self, _name: &str, _quantity: u64) -> Result<StockMap, SubmissionError> {
            Ok(self.0.items().clone())
        }
        fn get_item_stock(&self, name: &str) -> Result<u64, SubmissionError> {
            self.0.get_item_stock(name)
        }
        fn get_available_items(&self) -> Result<Vec<String>, SubmissionError> {
            self.0.get_available_items()
        }
    }

    /// Listing panics.
    #[derive(Default)]
    struct PanickyListing(InventoryModel);

    impl Inventory for PanickyListing {
        fn add_item(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError> {
            self.0.add_item(name, quantity)
        }
        fn update_stock(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError> {
            self.0.update_stock(name, quantity)
        }
        fn get_item_stock(&self, name: &str) -> Result<u64, SubmissionError> {
            self.0.get_item_stock(name)
        }
        fn get_available_items(&self) -> Result<Vec<String>, SubmissionError> {
            panic!("listing exploded")
        }
    }

    fn inputs() -> ProbeInputs {
        ProbeInputs::generate(&mut ChaCha8Rng::seed_from_u64(42))
    }

    #[test]
    fn test_generated_inputs_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let inputs = ProbeInputs::generate(&mut rng);
            assert_eq!(inputs.name.len(), NAME_LEN);
            assert!(inputs.name.chars().all(|c| c.is_ascii_lowercase()));
            assert!((10..=20).contains(&inputs.quantity));
            assert!((25..=35).contains(&inputs.update));
        }
    }

    #[test]
    fn test_seeded_inputs_are_reproducible() {
        assert_eq!(inputs(), inputs());
    }

    #[test]
    fn test_reference_model_passes_probe() {
        let failures = probe(InventoryModel::new(), &inputs());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_frozen_update_fails_only_update() {
        let failures = probe(FrozenUpdate::default(), &inputs());
        assert_eq!(failures.iter().collect::<Vec<_>>(), vec![Operation::UpdateStock]);
    }

    #[test]
    fn test_panic_fails_everything() {
        let failures = probe(PanickyListing::default(), &inputs());
        assert_eq!(failures, RandomizedFailureSet::all());
        assert_eq!(failures.len(), 4);
    }
}

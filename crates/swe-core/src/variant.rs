//! Named grid variants with copy-on-write sharing.
//!
//! A [`Network`] owns one working [`Grid`] plus any number of parked
//! variants. Every variant is an `Arc<Grid>`: cloning a variant only bumps a
//! reference count, and the first mutation through [`Network::grid_mut`]
//! copies the grid if another variant still shares it. Trial mutations
//! therefore run on a scratch variant and are either copied back over the
//! original id (commit) or dropped (discard).
//!
//! Variant operations take `&mut self`, so one network's variants can never
//! be manipulated from two threads at once. Independent directions each own
//! a cloned `Network`.

use crate::{Grid, SweError, SweResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Id of the variant a network starts with.
pub const INITIAL_VARIANT_ID: &str = "InitialState";

#[derive(Debug, Clone)]
pub struct Network {
    id: String,
    working_id: String,
    working: Arc<Grid>,
    parked: BTreeMap<String, Arc<Grid>>,
}

impl Network {
    /// Create an empty network.
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_grid(id, Grid::new())
    }

    pub fn from_grid(id: impl Into<String>, grid: Grid) -> Self {
        Self {
            id: id.into(),
            working_id: INITIAL_VARIANT_ID.to_string(),
            working: Arc::new(grid),
            parked: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The working variant.
    pub fn grid(&self) -> &Grid {
        &self.working
    }

    /// Mutable access to the working variant, copying it first if shared.
    pub fn grid_mut(&mut self) -> &mut Grid {
        Arc::make_mut(&mut self.working)
    }

    pub fn working_variant_id(&self) -> &str {
        &self.working_id
    }

    pub fn variant_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.parked.keys().map(String::as_str).collect();
        ids.push(&self.working_id);
        ids.sort_unstable();
        ids
    }

    pub fn has_variant(&self, id: &str) -> bool {
        id == self.working_id || self.parked.contains_key(id)
    }

    fn shared(&self, id: &str) -> SweResult<&Arc<Grid>> {
        if id == self.working_id {
            return Ok(&self.working);
        }
        self.parked
            .get(id)
            .ok_or_else(|| SweError::Variant(format!("variant '{id}' does not exist")))
    }

    /// Read access to any variant.
    pub fn variant(&self, id: &str) -> SweResult<&Grid> {
        self.shared(id).map(Arc::as_ref)
    }

    /// True when both variants still point at the same underlying grid.
    pub fn shares_state(&self, a: &str, b: &str) -> SweResult<bool> {
        Ok(Arc::ptr_eq(self.shared(a)?, self.shared(b)?))
    }

    /// Create `target` as a copy of `source`. Fails if `target` exists.
    pub fn clone_variant(&mut self, source: &str, target: &str) -> SweResult<()> {
        if self.has_variant(target) {
            return Err(SweError::Variant(format!(
                "variant '{target}' already exists"
            )));
        }
        self.clone_variant_overwrite(source, target)
    }

    /// Copy `source` into `target`, replacing `target` if it exists.
    pub fn clone_variant_overwrite(&mut self, source: &str, target: &str) -> SweResult<()> {
        let grid = Arc::clone(self.shared(source)?);
        if target == self.working_id {
            self.working = grid;
        } else {
            self.parked.insert(target.to_string(), grid);
        }
        Ok(())
    }

    pub fn set_working_variant(&mut self, id: &str) -> SweResult<()> {
        if id == self.working_id {
            return Ok(());
        }
        let next = self
            .parked
            .remove(id)
            .ok_or_else(|| SweError::Variant(format!("variant '{id}' does not exist")))?;
        let previous = std::mem::replace(&mut self.working, next);
        let previous_id = std::mem::replace(&mut self.working_id, id.to_string());
        self.parked.insert(previous_id, previous);
        Ok(())
    }

    /// Drop a parked variant. The working variant cannot be removed.
    pub fn remove_variant(&mut self, id: &str) -> SweResult<()> {
        if id == self.working_id {
            return Err(SweError::Variant(format!(
                "cannot remove working variant '{id}'"
            )));
        }
        self.parked
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SweError::Variant(format!("variant '{id}' does not exist")))
    }
}

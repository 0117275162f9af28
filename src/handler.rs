use crate::diffable::Diffable;
use crate::error::PatchResult;
use crate::patch::Operation;
use crate::pointer::Pointer;

/// Turns a decision of the walker into concrete patch operations.
///
/// A handler may return several operations for one decision, or none.
pub trait Handler {
    fn add(&self, pointer: &Pointer, modified: &dyn Diffable) -> PatchResult<Vec<Operation>>;

    fn remove(&self, pointer: &Pointer, current: &dyn Diffable) -> PatchResult<Vec<Operation>>;

    fn replace(
        &self,
        pointer: &Pointer,
        modified: &dyn Diffable,
        current: &dyn Diffable,
    ) -> PatchResult<Vec<Operation>>;
}

/// Emits exactly one operation per decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHandler;

impl Handler for DefaultHandler {
    fn add(&self, pointer: &Pointer, modified: &dyn Diffable) -> PatchResult<Vec<Operation>> {
        // Adds into an existing object member replace it.
        Ok(vec![Operation::add(pointer.to_string(), modified.to_json()?)])
    }

    fn remove(&self, pointer: &Pointer, _current: &dyn Diffable) -> PatchResult<Vec<Operation>> {
        Ok(vec![Operation::remove(pointer.to_string())])
    }

    fn replace(
        &self,
        pointer: &Pointer,
        modified: &dyn Diffable,
        _current: &dyn Diffable,
    ) -> PatchResult<Vec<Operation>> {
        Ok(vec![Operation::replace(
            pointer.to_string(),
            modified.to_json()?,
        )])
    }
}

use crate::diffable::Diffable;
use crate::pointer::Pointer;

/// Decides whether a candidate operation is recorded.
///
/// Returning `false` from [`Predicate::replace`] for a record or a sequence also
/// stops the walker from descending into it.
pub trait Predicate {
    fn add(&self, pointer: &Pointer, modified: &dyn Diffable) -> bool;

    fn remove(&self, pointer: &Pointer, current: &dyn Diffable) -> bool;

    fn replace(&self, pointer: &Pointer, modified: &dyn Diffable, current: &dyn Diffable) -> bool;
}

/// Allows every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Predicate for AllowAll {
    fn add(&self, _pointer: &Pointer, _modified: &dyn Diffable) -> bool {
        true
    }

    fn remove(&self, _pointer: &Pointer, _current: &dyn Diffable) -> bool {
        true
    }

    fn replace(&self, _pointer: &Pointer, _modified: &dyn Diffable, _current: &dyn Diffable) -> bool {
        true
    }
}

type AddFn = Box<dyn Fn(&Pointer, &dyn Diffable) -> bool>;
type RemoveFn = Box<dyn Fn(&Pointer, &dyn Diffable) -> bool>;
type ReplaceFn = Box<dyn Fn(&Pointer, &dyn Diffable, &dyn Diffable) -> bool>;

/// A [`Predicate`] assembled from closures. Decisions without a closure allow.
#[derive(Default)]
pub struct PredicateFns {
    add: Option<AddFn>,
    remove: Option<RemoveFn>,
    replace: Option<ReplaceFn>,
}

impl PredicateFns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_add(mut self, f: impl Fn(&Pointer, &dyn Diffable) -> bool + 'static) -> Self {
        self.add = Some(Box::new(f));
        self
    }

    pub fn on_remove(mut self, f: impl Fn(&Pointer, &dyn Diffable) -> bool + 'static) -> Self {
        self.remove = Some(Box::new(f));
        self
    }

    pub fn on_replace(
        mut self,
        f: impl Fn(&Pointer, &dyn Diffable, &dyn Diffable) -> bool + 'static,
    ) -> Self {
        self.replace = Some(Box::new(f));
        self
    }
}

impl Predicate for PredicateFns {
    fn add(&self, pointer: &Pointer, modified: &dyn Diffable) -> bool {
        self.add.as_ref().map_or(true, |f| f(pointer, modified))
    }

    fn remove(&self, pointer: &Pointer, current: &dyn Diffable) -> bool {
        self.remove.as_ref().map_or(true, |f| f(pointer, current))
    }

    fn replace(&self, pointer: &Pointer, modified: &dyn Diffable, current: &dyn Diffable) -> bool {
        self.replace
            .as_ref()
            .map_or(true, |f| f(pointer, modified, current))
    }
}

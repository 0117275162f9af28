//! The comparison engine.
//!
//! The walker descends two values of the same shape in lockstep and records
//! add/remove/replace decisions. Each decision is offered to the configured
//! [`Predicate`] first and then materialized by the [`Handler`].

use crate::diffable::{Diffable, Field, Node, Shape};
use crate::error::{PatchError, PatchResult};
use crate::handler::Handler;
use crate::options::{IgnorePattern, Options};
use crate::patch::Operation;
use crate::pointer::Pointer;
use crate::predicate::Predicate;
use std::collections::{BTreeMap, HashMap, HashSet};

type Entry<'a> = (&'a dyn Diffable, &'a dyn Diffable);

pub(crate) struct Walker<'o> {
    predicate: &'o dyn Predicate,
    handler: &'o dyn Handler,
    ignored: &'o [IgnorePattern],
    max_depth: usize,
    patches: Vec<Operation>,
}

impl<'o> Walker<'o> {
    pub(crate) fn new(options: &'o Options) -> Self {
        Self {
            predicate: &*options.predicate,
            handler: &*options.handler,
            ignored: &options.ignored,
            max_depth: options.max_depth,
            patches: Vec::new(),
        }
    }

    pub(crate) fn walk(
        &mut self,
        modified: &dyn Diffable,
        current: &dyn Diffable,
        pointer: &Pointer,
    ) -> PatchResult<()> {
        self.walk_at(modified, current, pointer, 0)
    }

    /// Hand out the recorded operations and reset for another pass.
    pub(crate) fn take_patches(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.patches)
    }

    fn walk_at(
        &mut self,
        modified: &dyn Diffable,
        current: &dyn Diffable,
        pointer: &Pointer,
        depth: usize,
    ) -> PatchResult<()> {
        if depth > self.max_depth {
            return Err(PatchError::DepthExceeded {
                path: pointer.to_string(),
                limit: self.max_depth,
            });
        }

        let (m, c) = (modified.node(), current.node());
        if m.shape() != c.shape() {
            return Err(shape_mismatch(pointer, m.shape(), c.shape()));
        }

        match (m, c) {
            (Node::Record(m), Node::Record(c)) => {
                self.process_record(modified, current, &m, &c, pointer, depth)
            }
            (Node::Optional(m), Node::Optional(c)) => self.process_optional(m, c, pointer, depth),
            (Node::Sequence(m), Node::Sequence(c)) => {
                self.process_sequence(modified, current, &m, &c, pointer, depth)
            }
            (Node::Mapping(m), Node::Mapping(c)) => {
                self.process_mapping(modified, &m, &c, pointer, depth)
            }
            (Node::Dynamic(m), Node::Dynamic(c)) => self.process_dynamic(m, c, pointer, depth),
            (Node::Text(m), Node::Text(c)) => {
                if m != c {
                    if m.is_empty() {
                        self.remove(pointer, current)?;
                    } else if c.is_empty() {
                        self.add(pointer, modified)?;
                    } else {
                        self.replace(pointer, modified, current)?;
                    }
                }
                Ok(())
            }
            (Node::Bool(m), Node::Bool(c)) => {
                if m != c {
                    self.replace(pointer, modified, current)?;
                }
                Ok(())
            }
            (m, c) if m.shape() == Shape::Number => {
                if !numbers_equal(&m, &c) {
                    self.replace(pointer, modified, current)?;
                }
                Ok(())
            }
            (Node::Unsupported(name), _) => Err(PatchError::UnsupportedShape {
                path: pointer.to_string(),
                name,
            }),
            (m, c) => Err(shape_mismatch(pointer, m.shape(), c.shape())),
        }
    }

    fn process_record(
        &mut self,
        modified: &dyn Diffable,
        current: &dyn Diffable,
        m: &[Field<'_>],
        c: &[Field<'_>],
        pointer: &Pointer,
        depth: usize,
    ) -> PatchResult<()> {
        if !self.predicate.replace(pointer, modified, current) {
            log::trace!("skipping record at `{pointer}`: replace refused by predicate");
            return Ok(());
        }

        // Both sides come from the same type, so fields line up by position.
        if m.len() != c.len() || m.iter().zip(c).any(|(a, b)| a.name != b.name) {
            return Err(shape_mismatch(pointer, Shape::Record, Shape::Record));
        }

        for (mf, cf) in m.iter().zip(c) {
            self.walk_at(mf.value, cf.value, &pointer.append(mf.name), depth + 1)?;
        }

        Ok(())
    }

    fn process_optional(
        &mut self,
        modified: Option<&dyn Diffable>,
        current: Option<&dyn Diffable>,
        pointer: &Pointer,
        depth: usize,
    ) -> PatchResult<()> {
        match (modified, current) {
            // Unwrapping does not add a path segment.
            (Some(m), Some(c)) => self.walk_at(m, c, pointer, depth + 1),
            (Some(m), None) => self.add(pointer, m).map(|_| ()),
            (None, Some(c)) => self.remove(pointer, c).map(|_| ()),
            (None, None) => Ok(()),
        }
    }

    fn process_dynamic(
        &mut self,
        modified: Option<&dyn Diffable>,
        current: Option<&dyn Diffable>,
        pointer: &Pointer,
        depth: usize,
    ) -> PatchResult<()> {
        match (modified, current) {
            (Some(m), Some(c)) => self.walk_at(m, c, pointer, depth + 1),
            (None, None) => Ok(()),
            (m, c) => Err(shape_mismatch(
                pointer,
                m.map_or(Shape::Absent, |v| v.node().shape()),
                c.map_or(Shape::Absent, |v| v.node().shape()),
            )),
        }
    }

    fn process_mapping(
        &mut self,
        modified: &dyn Diffable,
        m: &[Entry<'_>],
        c: &[Entry<'_>],
        pointer: &Pointer,
        depth: usize,
    ) -> PatchResult<()> {
        let m = text_keyed(m, pointer)?;
        let c = text_keyed(c, pointer)?;

        if !m.is_empty() && c.is_empty() {
            self.add(pointer, modified)?;
            return Ok(());
        }

        for (key, mv) in &m {
            let child = pointer.append(key);
            match c.get(key) {
                Some(cv) => self.walk_at(*mv, *cv, &child, depth + 1)?,
                None => {
                    self.add(&child, *mv)?;
                }
            }
        }
        for (key, cv) in &c {
            if !m.contains_key(key) {
                self.remove(&pointer.append(key), *cv)?;
            }
        }

        Ok(())
    }

    fn process_sequence(
        &mut self,
        modified: &dyn Diffable,
        current: &dyn Diffable,
        m: &[&dyn Diffable],
        c: &[&dyn Diffable],
        pointer: &Pointer,
        depth: usize,
    ) -> PatchResult<()> {
        if !self.predicate.replace(pointer, modified, current) {
            log::trace!("skipping sequence at `{pointer}`: replace refused by predicate");
            return Ok(());
        }

        if !m.is_empty() && c.is_empty() {
            self.add(pointer, modified)?;
            return Ok(());
        }

        let ignored = self.ignored;
        match ignored.iter().find(|rule| pointer.matches(&rule.pattern)) {
            Some(rule) => {
                let key_field = rule.key_field.as_deref();
                self.process_unordered(m, c, key_field, pointer, depth)
            }
            None => self.process_positional(m, c, pointer, depth),
        }
    }

    fn process_positional(
        &mut self,
        m: &[&dyn Diffable],
        c: &[&dyn Diffable],
        pointer: &Pointer,
        depth: usize,
    ) -> PatchResult<()> {
        for (j, (mv, cv)) in m.iter().zip(c).enumerate() {
            self.walk_at(*mv, *cv, &pointer.append(&j.to_string()), depth + 1)?;
        }

        if m.len() > c.len() {
            let mut idx = c.len();
            for mv in &m[c.len()..] {
                if self.add(&pointer.append(&idx.to_string()), *mv)? {
                    idx += 1;
                }
            }
        } else if m.len() < c.len() {
            // Highest index first, so earlier removals do not shift later ones.
            for j in (m.len()..c.len()).rev() {
                self.remove(&pointer.append(&j.to_string()), c[j])?;
            }
        }

        Ok(())
    }

    fn process_unordered(
        &mut self,
        m: &[&dyn Diffable],
        c: &[&dyn Diffable],
        key_field: Option<&str>,
        pointer: &Pointer,
        depth: usize,
    ) -> PatchResult<()> {
        let m_keys = identity_keys(m, key_field, pointer)?;
        let c_keys = identity_keys(c, key_field, pointer)?;

        let c_index: HashMap<&str, usize> = c_keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i))
            .collect();
        let m_present: HashSet<&str> = m_keys.iter().map(String::as_str).collect();

        // Existing elements are updated in place and new ones only appended, so
        // no index computed here is invalidated before the removals below.
        let mut next = c.len();
        for (j, key) in m_keys.iter().enumerate() {
            match c_index.get(key.as_str()) {
                Some(&i) => self.walk_at(m[j], c[i], &pointer.append(&i.to_string()), depth + 1)?,
                None => {
                    if self.add(&pointer.append(&next.to_string()), m[j])? {
                        next += 1;
                    }
                }
            }
        }

        for (i, key) in c_keys.iter().enumerate().rev() {
            if !m_present.contains(key.as_str()) {
                self.remove(&pointer.append(&i.to_string()), c[i])?;
            }
        }

        Ok(())
    }

    fn add(&mut self, pointer: &Pointer, modified: &dyn Diffable) -> PatchResult<bool> {
        if !self.predicate.add(pointer, modified) {
            log::trace!("add at `{pointer}` refused by predicate");
            return Ok(false);
        }
        log::trace!("add at `{pointer}`");
        let ops = self.handler.add(pointer, modified)?;
        self.patches.extend(ops);
        Ok(true)
    }

    fn remove(&mut self, pointer: &Pointer, current: &dyn Diffable) -> PatchResult<bool> {
        if !self.predicate.remove(pointer, current) {
            log::trace!("remove at `{pointer}` refused by predicate");
            return Ok(false);
        }
        log::trace!("remove at `{pointer}`");
        let ops = self.handler.remove(pointer, current)?;
        self.patches.extend(ops);
        Ok(true)
    }

    fn replace(
        &mut self,
        pointer: &Pointer,
        modified: &dyn Diffable,
        current: &dyn Diffable,
    ) -> PatchResult<bool> {
        if !self.predicate.replace(pointer, modified, current) {
            log::trace!("replace at `{pointer}` refused by predicate");
            return Ok(false);
        }
        log::trace!("replace at `{pointer}`");
        let ops = self.handler.replace(pointer, modified, current)?;
        self.patches.extend(ops);
        Ok(true)
    }
}

fn shape_mismatch(pointer: &Pointer, modified: Shape, current: Shape) -> PatchError {
    PatchError::ShapeMismatch {
        path: pointer.to_string(),
        modified,
        current,
    }
}

fn numbers_equal(a: &Node<'_>, b: &Node<'_>) -> bool {
    match (a, b) {
        (Node::Int(x), Node::Int(y)) => x == y,
        (Node::Uint(x), Node::Uint(y)) => x == y,
        (Node::Int(x), Node::Uint(y)) | (Node::Uint(y), Node::Int(x)) => {
            i128::from(*x) == i128::from(*y)
        }
        (a, b) => as_f64(a) == as_f64(b),
    }
}

fn as_f64(n: &Node<'_>) -> f64 {
    match n {
        Node::Int(i) => *i as f64,
        Node::Uint(u) => *u as f64,
        Node::Float(f) => *f,
        _ => f64::NAN,
    }
}

/// Index mapping entries by their text keys, sorted for a stable output order.
fn text_keyed<'a>(
    entries: &[Entry<'a>],
    pointer: &Pointer,
) -> PatchResult<BTreeMap<&'a str, &'a dyn Diffable>> {
    let mut map = BTreeMap::new();
    for &(key, value) in entries {
        match key.node() {
            Node::Text(k) => {
                map.insert(k, value);
            }
            other => {
                return Err(PatchError::UnsupportedKeyType {
                    path: pointer.to_string(),
                    key: other.shape(),
                })
            }
        }
    }
    Ok(map)
}

fn identity_keys(
    elements: &[&dyn Diffable],
    key_field: Option<&str>,
    pointer: &Pointer,
) -> PatchResult<Vec<String>> {
    let mut seen = HashSet::with_capacity(elements.len());
    let mut keys = Vec::with_capacity(elements.len());
    for element in elements {
        let key = identity_key(*element, key_field);
        if !seen.insert(key.clone()) {
            return Err(PatchError::DuplicateKey {
                path: pointer.to_string(),
                key,
            });
        }
        keys.push(key);
    }
    Ok(keys)
}

/// The value identifying an element of an order-insensitive sequence. Elements
/// without a usable key yield an empty string.
fn identity_key(element: &dyn Diffable, key_field: Option<&str>) -> String {
    match element.node() {
        Node::Record(fields) => fields
            .iter()
            .find(|f| Some(f.name) == key_field)
            .map(|f| identity_key(f.value, None))
            .unwrap_or_default(),
        Node::Mapping(entries) => entries
            .iter()
            .find(|(k, _)| matches!(k.node(), Node::Text(t) if Some(t) == key_field))
            .map(|(_, v)| identity_key(*v, None))
            .unwrap_or_default(),
        Node::Optional(Some(inner)) | Node::Dynamic(Some(inner)) => identity_key(inner, key_field),
        node => node.scalar_text().unwrap_or_default(),
    }
}

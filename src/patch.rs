//! RFC 6902 operations, the encoded patch list, and the entry points.

use crate::diffable::Diffable;
use crate::error::PatchResult;
use crate::options::Options;
use crate::walker::Walker;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Add,
    Remove,
    Replace,
}

impl Display for OpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
        };
        f.write_str(s)
    }
}

/// A single JSON Patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub op: OpKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Operation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: OpKind::Add,
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: OpKind::Remove,
            path: path.into(),
            value: None,
        }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: OpKind::Replace,
            path: path.into(),
            value: Some(value),
        }
    }
}

/// Ordered operations together with their JSON encoding.
///
/// An empty list encodes to `""` rather than `[]`, so "no changes" can be
/// checked without parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchList {
    operations: Vec<Operation>,
    raw: String,
}

impl PatchList {
    pub(crate) fn encode(operations: Vec<Operation>) -> PatchResult<Self> {
        if operations.is_empty() {
            return Ok(Self::default());
        }
        let raw = serde_json::to_string(&operations)?;
        Ok(Self { operations, raw })
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn raw(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl Display for PatchList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl IntoIterator for PatchList {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatchList {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Compare `modified` with `current` and return the operations that turn
/// `current` into `modified`.
pub fn create_json_patch<T: Diffable>(
    modified: &T,
    current: &T,
    options: Options,
) -> PatchResult<PatchList> {
    let mut walker = Walker::new(&options);
    walker.walk(modified, current, &options.prefix)?;
    let operations = walker.take_patches();
    log::debug!(
        "created json patch at `{}` with {} operations",
        options.prefix,
        operations.len()
    );
    PatchList::encode(operations)
}

/// Three-way patch: additions and changes relative to `current`, followed by
/// the removals relative to `original`.
///
/// A value that `current` holds but `original` never had is therefore kept.
pub fn create_three_way_json_patch<T: Diffable>(
    modified: &T,
    current: &T,
    original: &T,
    options: Options,
) -> PatchResult<PatchList> {
    let mut walker = Walker::new(&options);

    walker.walk(modified, current, &options.prefix)?;
    let mut operations: Vec<Operation> = walker
        .take_patches()
        .into_iter()
        .filter(|op| op.op != OpKind::Remove)
        .collect();

    walker.walk(modified, original, &options.prefix)?;
    operations.extend(
        walker
            .take_patches()
            .into_iter()
            .filter(|op| op.op == OpKind::Remove),
    );

    log::debug!(
        "created three-way json patch at `{}` with {} operations",
        options.prefix,
        operations.len()
    );
    PatchList::encode(operations)
}

/// Recording mutation scope over a JSON document.
///
/// Every write goes through `apply_op`, so the draft always knows the exact
/// forward operation and its inverse. Writes that leave the document equal
/// record nothing, and a scope whose edits cancel out reports no patches at
/// all, which keeps no-op actions out of the history.
use anyhow::{anyhow, Result};
use serde_json::Value;

use rewind_mod_history::Patches;

use super::patch::{apply_op, rollback, JsonPatch};

#[derive(Debug)]
pub struct Draft<'a> {
    root: &'a mut Value,
    forward: Vec<JsonPatch>,
    /// Inverses in application order; reversed when finished.
    inverse: Vec<JsonPatch>,
    /// The document as it was before the first recorded edit.
    base: Option<Value>,
}

impl<'a> Draft<'a> {
    pub(crate) fn new(root: &'a mut Value) -> Self {
        Self {
            root,
            forward: Vec::new(),
            inverse: Vec::new(),
            base: None,
        }
    }

    /// The current document, including edits made so far.
    pub fn value(&self) -> &Value {
        &*self.root
    }

    /// Reads the value at `pointer`.
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.root.pointer(pointer)
    }

    /// Reads an integer at `pointer`.
    pub fn get_i64(&self, pointer: &str) -> Option<i64> {
        self.get(pointer).and_then(Value::as_i64)
    }

    /// Reads a string at `pointer`.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.get(pointer).and_then(Value::as_str)
    }

    /// Writes `value` at `pointer`, creating the member if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent does not exist.
    pub fn set(&mut self, pointer: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let op = match self.root.pointer(pointer) {
            Some(current) if *current == value => return Ok(()),
            Some(_) => JsonPatch::Replace {
                path: pointer.to_string(),
                value,
            },
            None => JsonPatch::Add {
                path: pointer.to_string(),
                value,
            },
        };
        self.record(op)
    }

    /// Inserts `value` at `pointer`, shifting later array elements.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent does not exist or the index is out of range.
    pub fn insert(&mut self, pointer: &str, value: impl Into<Value>) -> Result<()> {
        self.record(JsonPatch::Add {
            path: pointer.to_string(),
            value: value.into(),
        })
    }

    /// Appends `value` to the array at `pointer`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no array at `pointer`.
    pub fn push(&mut self, pointer: &str, value: impl Into<Value>) -> Result<()> {
        if !self.get(pointer).is_some_and(Value::is_array) {
            return Err(anyhow!("no array at {pointer:?}"));
        }
        self.record(JsonPatch::Add {
            path: format!("{pointer}/-"),
            value: value.into(),
        })
    }

    /// Removes the value at `pointer` and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing exists at `pointer`.
    pub fn remove(&mut self, pointer: &str) -> Result<Value> {
        let old = self
            .get(pointer)
            .cloned()
            .ok_or_else(|| anyhow!("nothing to remove at {pointer:?}"))?;
        self.record(JsonPatch::Remove {
            path: pointer.to_string(),
        })?;
        Ok(old)
    }

    /// Replaces the whole document.
    pub fn replace(&mut self, value: impl Into<Value>) {
        let value = value.into();
        if *self.root == value {
            return;
        }
        let op = JsonPatch::Replace {
            path: String::new(),
            value,
        };
        // The root always exists, so replacing it cannot fail
        if let Err(e) = self.record(op) {
            tracing::warn!("Root replacement failed: {e:#}");
        }
    }

    fn record(&mut self, op: JsonPatch) -> Result<()> {
        if self.base.is_none() {
            self.base = Some(self.root.clone());
        }
        let inverse = apply_op(self.root, op.clone())?;
        self.forward.push(op);
        self.inverse.push(inverse);
        Ok(())
    }

    /// Ends the scope, returning the recorded patches.
    ///
    /// Empty when the document ended up equal to where it started.
    pub(crate) fn finish(self) -> Patches<JsonPatch> {
        if self.base.as_ref() == Some(&*self.root) {
            return Patches::default();
        }
        let mut inverse = self.inverse;
        inverse.reverse();
        Patches::new(self.forward, inverse)
    }

    /// Ends the scope, reverting every edit made through it.
    pub(crate) fn abort(self) {
        rollback(self.root, self.inverse);
    }
}

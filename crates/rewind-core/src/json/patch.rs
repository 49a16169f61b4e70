// JSON edit operations addressed by RFC 6901 pointers.
//
// A subset of RFC 6902 (add / remove / replace). Every applied operation
// yields its exact inverse, which is what drafts record and what rollback
// replays.
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single atomic edit of a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum JsonPatch {
    /// Inserts into an object or array. `-` as the last token appends.
    Add { path: String, value: Value },
    /// Removes an existing object member or array element.
    Remove { path: String },
    /// Overwrites an existing value. The empty path is the whole document.
    Replace { path: String, value: Value },
}

impl JsonPatch {
    pub fn path(&self) -> &str {
        match self {
            JsonPatch::Add { path, .. }
            | JsonPatch::Remove { path }
            | JsonPatch::Replace { path, .. } => path,
        }
    }
}

/// Applies `op` to `root` and returns the operation that reverts it.
///
/// # Errors
///
/// Returns an error if the target or its parent does not exist, or an array
/// index is out of range. `root` is unchanged on error.
pub fn apply_op(root: &mut Value, op: JsonPatch) -> Result<JsonPatch> {
    match op {
        JsonPatch::Replace { path, value } => {
            let target = root
                .pointer_mut(&path)
                .ok_or_else(|| anyhow!("replace target {path:?} does not exist"))?;
            let old = std::mem::replace(target, value);
            Ok(JsonPatch::Replace { path, value: old })
        }
        JsonPatch::Add { path, value } => {
            if path.is_empty() {
                let old = std::mem::replace(root, value);
                return Ok(JsonPatch::Replace { path, value: old });
            }
            let (parent_path, token) = split_pointer(&path)?;
            match parent_mut(root, parent_path)? {
                Value::Object(map) => match map.insert(token, value) {
                    Some(old) => Ok(JsonPatch::Replace { path, value: old }),
                    None => Ok(JsonPatch::Remove { path }),
                },
                Value::Array(items) => {
                    let index = if token == "-" {
                        items.len()
                    } else {
                        parse_index(&token, items.len() + 1)?
                    };
                    items.insert(index, value);
                    Ok(JsonPatch::Remove {
                        path: format!("{parent_path}/{index}"),
                    })
                }
                other => bail!("cannot add {path:?} into a {}", type_name(other)),
            }
        }
        JsonPatch::Remove { path } => {
            if path.is_empty() {
                bail!("cannot remove the document root");
            }
            let (parent_path, token) = split_pointer(&path)?;
            match parent_mut(root, parent_path)? {
                Value::Object(map) => {
                    let old = map
                        .remove(&token)
                        .ok_or_else(|| anyhow!("remove target {path:?} does not exist"))?;
                    Ok(JsonPatch::Add { path, value: old })
                }
                Value::Array(items) => {
                    let index = parse_index(&token, items.len())?;
                    let old = items.remove(index);
                    Ok(JsonPatch::Add { path, value: old })
                }
                other => bail!("cannot remove {path:?} from a {}", type_name(other)),
            }
        }
    }
}

/// Applies `ops` in order, all or nothing.
///
/// # Errors
///
/// Returns the first failing operation's error after rolling back the
/// operations already applied.
pub fn apply_all(root: &mut Value, ops: &[JsonPatch]) -> Result<()> {
    let mut applied: Vec<JsonPatch> = Vec::with_capacity(ops.len());
    for (i, op) in ops.iter().enumerate() {
        match apply_op(root, op.clone()) {
            Ok(inverse) => applied.push(inverse),
            Err(e) => {
                rollback(root, applied);
                return Err(e)
                    .with_context(|| format!("Failed to apply patch #{i} at {:?}", op.path()));
            }
        }
    }
    Ok(())
}

/// Replays recorded inverse operations newest first.
pub(crate) fn rollback(root: &mut Value, applied: Vec<JsonPatch>) {
    for inverse in applied.into_iter().rev() {
        if let Err(e) = apply_op(root, inverse) {
            // Inverses of successfully applied ops always fit
            tracing::warn!("Rollback of JSON patch failed: {e:#}");
        }
    }
}

/// Escapes a single reference token for use in a pointer.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Splits a pointer into its (still escaped) parent and its last token.
fn split_pointer(path: &str) -> Result<(&str, String)> {
    let (parent, last) = path
        .rsplit_once('/')
        .ok_or_else(|| anyhow!("invalid JSON pointer {path:?}"))?;
    Ok((parent, unescape_token(last)))
}

fn parent_mut<'a>(root: &'a mut Value, parent_path: &str) -> Result<&'a mut Value> {
    root.pointer_mut(parent_path)
        .ok_or_else(|| anyhow!("parent {parent_path:?} does not exist"))
}

/// Parses an array index that must be strictly below `bound`.
fn parse_index(token: &str, bound: usize) -> Result<usize> {
    if token.len() > 1 && token.starts_with('0') {
        bail!("array index {token:?} has a leading zero");
    }
    let index: usize = token
        .parse()
        .with_context(|| format!("invalid array index {token:?}"))?;
    if index >= bound {
        bail!("array index {index} out of range");
    }
    Ok(index)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

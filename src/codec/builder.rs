//! Token-push builder for gtype values.
//!
//! The builder keeps a stack of partially-built containers. Closing an
//! object sorts its pairs and resolves duplicate keys last-write-wins;
//! the finished tree serializes through `serialize::serialize_root`.

use crate::codec::{Gtype, MAX_NESTING_DEPTH};
use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

/// One token of the build stream.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildToken {
    BeginArray,
    BeginObject,
    Key(String),
    /// Object member value.
    Value(GtypeValue),
    /// Array element.
    Elem(GtypeValue),
    EndArray,
    EndObject,
}

enum Frame {
    Array {
        elems: Vec<GtypeValue>,
        raw_scalar: bool,
    },
    Object {
        // (key, value, observed order) until uniquified on close
        pairs: Vec<(String, GtypeValue, u32)>,
        pending_key: Option<String>,
        seq: u32,
    },
}

/// Stack-based builder driven by begin/key/value/end calls.
pub struct Builder {
    stack: Vec<Frame>,
    result: Option<GtypeValue>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            stack: Vec::new(),
            result: None,
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.result.is_some() {
            return Err(GraphError::Internal(
                "builder already produced a root value".into(),
            ));
        }
        Ok(())
    }

    fn check_depth(&self) -> Result<()> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(GraphError::LimitExceeded(format!(
                "value nesting exceeds {} levels",
                MAX_NESTING_DEPTH
            )));
        }
        Ok(())
    }

    pub fn begin_array(&mut self) -> Result<()> {
        self.begin_array_with(false)
    }

    /// Open an array, optionally flagged as the raw-scalar wrapper.
    pub fn begin_array_with(&mut self, raw_scalar: bool) -> Result<()> {
        self.check_open()?;
        self.check_depth()?;
        self.stack.push(Frame::Array {
            elems: Vec::new(),
            raw_scalar,
        });
        Ok(())
    }

    pub fn begin_object(&mut self) -> Result<()> {
        self.check_open()?;
        self.check_depth()?;
        self.stack.push(Frame::Object {
            pairs: Vec::new(),
            pending_key: None,
            seq: 0,
        });
        Ok(())
    }

    pub fn key(&mut self, key: impl Into<String>) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Object { pending_key, .. }) if pending_key.is_none() => {
                *pending_key = Some(key.into());
                Ok(())
            }
            Some(Frame::Object { .. }) => Err(GraphError::Internal(
                "key pushed while another key is pending".into(),
            )),
            _ => Err(GraphError::Internal("key pushed outside an object".into())),
        }
    }

    /// Push a scalar or completed value into the current container, or as
    /// the root result when the stack is empty.
    pub fn value(&mut self, value: GtypeValue) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                self.check_open()?;
                self.result = Some(value);
                Ok(())
            }
            Some(Frame::Array { elems, .. }) => {
                elems.push(value);
                Ok(())
            }
            Some(Frame::Object {
                pairs,
                pending_key,
                seq,
            }) => {
                let key = pending_key.take().ok_or_else(|| {
                    GraphError::Internal("object value pushed without a key".into())
                })?;
                pairs.push((key, value, *seq));
                *seq += 1;
                Ok(())
            }
        }
    }

    pub fn end_array(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Array { elems, raw_scalar }) => {
                if raw_scalar && elems.len() != 1 {
                    return Err(GraphError::Internal(
                        "raw scalar array must hold exactly one element".into(),
                    ));
                }
                self.value(GtypeValue::Array { elems, raw_scalar })
            }
            _ => Err(GraphError::Internal("end_array without begin_array".into())),
        }
    }

    pub fn end_object(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Object {
                pairs,
                pending_key: None,
                ..
            }) => self.value(GtypeValue::Object(uniquify(pairs))),
            Some(Frame::Object { .. }) => Err(GraphError::Internal(
                "end_object with a dangling key".into(),
            )),
            _ => Err(GraphError::Internal(
                "end_object without begin_object".into(),
            )),
        }
    }

    pub fn push(&mut self, token: BuildToken) -> Result<()> {
        match token {
            BuildToken::BeginArray => self.begin_array(),
            BuildToken::BeginObject => self.begin_object(),
            BuildToken::Key(k) => self.key(k),
            BuildToken::Value(v) | BuildToken::Elem(v) => self.value(v),
            BuildToken::EndArray => self.end_array(),
            BuildToken::EndObject => self.end_object(),
        }
    }

    /// Close the build and return the value tree.
    pub fn finish(mut self) -> Result<GtypeValue> {
        if !self.stack.is_empty() {
            return Err(GraphError::Internal(format!(
                "builder finished with {} open containers",
                self.stack.len()
            )));
        }
        self.result
            .take()
            .ok_or_else(|| GraphError::Internal("builder finished with no value".into()))
    }

    /// Close the build and serialize to a blob in one step.
    pub fn finish_blob(self) -> Result<Gtype> {
        Gtype::from_value(&self.finish()?)
    }
}

/// Sort pairs by key; among duplicates the last observed wins.
fn uniquify(mut pairs: Vec<(String, GtypeValue, u32)>) -> Vec<(String, GtypeValue)> {
    pairs.sort_by(|a, b| a.0.cmp(&b.0).then(b.2.cmp(&a.2)));
    pairs.dedup_by(|dup, keep| dup.0 == keep.0);
    pairs.into_iter().map(|(k, v, _)| (k, v)).collect()
}

/// Build a blob from a token stream.
pub fn build_tokens(tokens: impl IntoIterator<Item = BuildToken>) -> Result<Gtype> {
    let mut b = Builder::new();
    for t in tokens {
        b.push(t)?;
    }
    b.finish_blob()
}

/// `build_list`: a list value from its elements.
pub fn build_list(elems: Vec<GtypeValue>) -> GtypeValue {
    GtypeValue::Array {
        elems,
        raw_scalar: false,
    }
}

/// `build_map`: a map value from key/value arguments, canonicalised
/// (sorted keys, duplicates resolved last-write-wins).
pub fn build_map(pairs: Vec<(String, GtypeValue)>) -> GtypeValue {
    let ordered: Vec<(String, GtypeValue, u32)> = pairs
        .into_iter()
        .enumerate()
        .map(|(i, (k, v))| (k, v, i as u32))
        .collect();
    GtypeValue::Object(uniquify(ordered))
}

//! Frame-stack iterator over serialized containers.
//!
//! Yields the same token stream the builder consumes, so
//! `build(tokens(iterate(blob)))` reproduces the blob byte-for-byte.
//! `next(skip_nested = true)` returns nested containers atomically as
//! BINARY values instead of descending into them.

use crate::codec::binary::{
    decode_container, entry_type, ContainerRef, Gtype, BINARY_SUBTYPE_MASK, ENTRY_IS_CONTAINER,
};
use crate::codec::builder::Builder;
use crate::codec::MAX_NESTING_DEPTH;
use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

/// One token of the iteration stream.
#[derive(Debug, Clone, PartialEq)]
pub enum IterToken {
    BeginArray { count: usize, raw_scalar: bool },
    BeginObject { count: usize },
    Key(String),
    /// Object member value.
    Value(GtypeValue),
    /// Array element.
    Elem(GtypeValue),
    EndArray,
    EndObject,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum IterState {
    ArrayStart,
    ArrayElem,
    ObjectStart,
    ObjectKey,
    ObjectValue,
}

struct Frame<'a> {
    container: ContainerRef<'a>,
    state: IterState,
    index: usize,
}

/// Iterator borrowing a gtype buffer. Must not outlive the blob.
pub struct GtypeIterator<'a> {
    stack: Vec<Frame<'a>>,
    /// Set for a BINARY-rooted blob, which yields a single value token.
    pending_binary: Option<GtypeValue>,
}

impl<'a> GtypeIterator<'a> {
    pub fn new(blob: &'a Gtype) -> Self {
        let root = blob.root();
        if root.is_binary() {
            return GtypeIterator {
                stack: Vec::new(),
                pending_binary: Some(GtypeValue::Binary {
                    flags: root.header() & BINARY_SUBTYPE_MASK,
                    bytes: root.bytes().to_vec(),
                }),
            };
        }
        let state = if root.is_object() {
            IterState::ObjectStart
        } else {
            IterState::ArrayStart
        };
        GtypeIterator {
            stack: vec![Frame {
                container: root,
                state,
                index: 0,
            }],
            pending_binary: None,
        }
    }

    fn push_child(&mut self, child: ContainerRef<'a>) -> Result<()> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(GraphError::LimitExceeded(format!(
                "iterator nesting exceeds {} levels",
                MAX_NESTING_DEPTH
            )));
        }
        let state = if child.is_object() {
            IterState::ObjectStart
        } else {
            IterState::ArrayStart
        };
        self.stack.push(Frame {
            container: child,
            state,
            index: 0,
        });
        Ok(())
    }

    /// Decode child `i`; with `skip_nested` a container child comes back
    /// as a BINARY value, otherwise the caller descends.
    fn child_value(
        &mut self,
        i: usize,
        skip_nested: bool,
    ) -> Result<ChildStep<'a>> {
        let frame = self.stack.last().expect("child_value with empty stack");
        let c = frame.container;
        let e = c.entry(i)?;
        if entry_type(e) == ENTRY_IS_CONTAINER {
            let bytes = c.child_bytes(i)?;
            let nested = ContainerRef { bytes };
            if nested.is_binary() || skip_nested {
                return Ok(ChildStep::Value(GtypeValue::Binary {
                    flags: nested.header() & BINARY_SUBTYPE_MASK,
                    bytes: bytes.to_vec(),
                }));
            }
            return Ok(ChildStep::Descend(nested));
        }
        Ok(ChildStep::Value(c.decode_child(i, 0)?))
    }

    /// Produce the next token, or None when iteration is complete.
    pub fn next(&mut self, skip_nested: bool) -> Result<Option<IterToken>> {
        if let Some(v) = self.pending_binary.take() {
            return Ok(Some(IterToken::Elem(v)));
        }
        let frame = match self.stack.last_mut() {
            Some(f) => f,
            None => return Ok(None),
        };
        match frame.state {
            IterState::ArrayStart => {
                frame.state = IterState::ArrayElem;
                frame.index = 0;
                Ok(Some(IterToken::BeginArray {
                    count: frame.container.count(),
                    raw_scalar: frame.container.is_scalar(),
                }))
            }
            IterState::ArrayElem => {
                if frame.index >= frame.container.count() {
                    self.stack.pop();
                    return Ok(Some(IterToken::EndArray));
                }
                let i = frame.index;
                frame.index += 1;
                match self.child_value(i, skip_nested)? {
                    ChildStep::Value(v) => Ok(Some(IterToken::Elem(v))),
                    ChildStep::Descend(nested) => {
                        self.push_child(nested)?;
                        self.next(skip_nested)
                    }
                }
            }
            IterState::ObjectStart => {
                frame.state = IterState::ObjectKey;
                frame.index = 0;
                Ok(Some(IterToken::BeginObject {
                    count: frame.container.count(),
                }))
            }
            IterState::ObjectKey => {
                if frame.index >= frame.container.count() {
                    self.stack.pop();
                    return Ok(Some(IterToken::EndObject));
                }
                let key = match frame.container.decode_child(frame.index, 0)? {
                    GtypeValue::String(s) => s,
                    other => {
                        return Err(GraphError::Internal(format!(
                            "object key decoded as {}",
                            other.type_name()
                        )))
                    }
                };
                frame.state = IterState::ObjectValue;
                Ok(Some(IterToken::Key(key)))
            }
            IterState::ObjectValue => {
                let count = frame.container.count();
                let i = count + frame.index;
                frame.index += 1;
                frame.state = IterState::ObjectKey;
                match self.child_value(i, skip_nested)? {
                    ChildStep::Value(v) => Ok(Some(IterToken::Value(v))),
                    ChildStep::Descend(nested) => {
                        self.push_child(nested)?;
                        self.next(skip_nested)
                    }
                }
            }
        }
    }

    /// Drain the remaining tokens without descending into containers.
    pub fn collect_shallow(&mut self) -> Result<Vec<IterToken>> {
        let mut out = Vec::new();
        while let Some(t) = self.next(true)? {
            out.push(t);
        }
        Ok(out)
    }
}

enum ChildStep<'a> {
    Value(GtypeValue),
    Descend(ContainerRef<'a>),
}

/// Round-trip a blob through its token stream: iterate, feed the builder,
/// serialize. The output is byte-identical to the input.
pub fn rebuild_via_tokens(blob: &Gtype) -> Result<Gtype> {
    let mut it = GtypeIterator::new(blob);
    let mut b = Builder::new();
    while let Some(token) = it.next(false)? {
        match token {
            IterToken::BeginArray { raw_scalar, .. } => b.begin_array_with(raw_scalar)?,
            IterToken::BeginObject { .. } => b.begin_object()?,
            IterToken::Key(k) => b.key(k)?,
            IterToken::Value(v) | IterToken::Elem(v) => b.value(v)?,
            IterToken::EndArray => b.end_array()?,
            IterToken::EndObject => b.end_object()?,
        }
    }
    b.finish_blob()
}

/// Decode a whole blob by iterating it (used where the caller holds only
/// a container reference).
pub fn container_to_value(c: &ContainerRef<'_>) -> Result<GtypeValue> {
    decode_container(c, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(v: &GtypeValue) -> Gtype {
        Gtype::from_value(v).unwrap()
    }

    #[test]
    fn test_token_stream_for_object() {
        let g = blob(&GtypeValue::Object(vec![
            ("a".to_string(), GtypeValue::Integer(1)),
            ("b".to_string(), GtypeValue::Bool(false)),
        ]));
        let mut it = GtypeIterator::new(&g);
        let mut tokens = Vec::new();
        while let Some(t) = it.next(false).unwrap() {
            tokens.push(t);
        }
        assert_eq!(
            tokens,
            vec![
                IterToken::BeginObject { count: 2 },
                IterToken::Key("a".into()),
                IterToken::Value(GtypeValue::Integer(1)),
                IterToken::Key("b".into()),
                IterToken::Value(GtypeValue::Bool(false)),
                IterToken::EndObject,
            ]
        );
    }

    #[test]
    fn test_skip_nested_yields_binary() {
        let g = blob(&GtypeValue::Array {
            elems: vec![
                GtypeValue::Integer(1),
                GtypeValue::Array {
                    elems: vec![GtypeValue::Integer(2)],
                    raw_scalar: false,
                },
            ],
            raw_scalar: false,
        });
        let mut it = GtypeIterator::new(&g);
        let tokens = it.collect_shallow().unwrap();
        assert_eq!(tokens.len(), 4); // begin, elem, binary elem, end
        match &tokens[2] {
            IterToken::Elem(GtypeValue::Binary { bytes, .. }) => {
                // the atom is itself a decodable container
                let nested = ContainerRef {
                    bytes: bytes.as_slice(),
                };
                assert!(nested.is_array());
                assert_eq!(nested.count(), 1);
            }
            other => panic!("expected binary elem, got {:?}", other),
        }
    }

    #[test]
    fn test_descend_into_nested() {
        let g = blob(&GtypeValue::Array {
            elems: vec![GtypeValue::Array {
                elems: vec![GtypeValue::Integer(7)],
                raw_scalar: false,
            }],
            raw_scalar: false,
        });
        let mut it = GtypeIterator::new(&g);
        let mut tokens = Vec::new();
        while let Some(t) = it.next(false).unwrap() {
            tokens.push(t);
        }
        assert_eq!(
            tokens,
            vec![
                IterToken::BeginArray {
                    count: 1,
                    raw_scalar: false
                },
                IterToken::BeginArray {
                    count: 1,
                    raw_scalar: false
                },
                IterToken::Elem(GtypeValue::Integer(7)),
                IterToken::EndArray,
                IterToken::EndArray,
            ]
        );
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let values = [
            GtypeValue::Integer(42),
            GtypeValue::Object(vec![
                (
                    "list".to_string(),
                    GtypeValue::Array {
                        elems: vec![GtypeValue::Null, GtypeValue::Float(1.5)],
                        raw_scalar: false,
                    },
                ),
                ("name".to_string(), GtypeValue::String("x".into())),
            ]),
            GtypeValue::Timestamp(55),
        ];
        for v in values {
            let g = blob(&v);
            let rebuilt = rebuild_via_tokens(&g).unwrap();
            assert_eq!(g.as_bytes(), rebuilt.as_bytes());
        }
    }

    #[test]
    fn test_raw_scalar_root_tokens() {
        let g = blob(&GtypeValue::Integer(9));
        let mut it = GtypeIterator::new(&g);
        assert_eq!(
            it.next(false).unwrap(),
            Some(IterToken::BeginArray {
                count: 1,
                raw_scalar: true
            })
        );
        assert_eq!(
            it.next(false).unwrap(),
            Some(IterToken::Elem(GtypeValue::Integer(9)))
        );
        assert_eq!(it.next(false).unwrap(), Some(IterToken::EndArray));
        assert_eq!(it.next(false).unwrap(), None);
    }
}

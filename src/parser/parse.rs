//! Recursive-descent parser over the lexer's token stream.
//!
//! Grammar states mirror the error-reporting contexts: value, array
//! start/next, object start/label/next/comma, end. Scalars accept an
//! optional `:: type` annotation which retypes the lexeme. A single bare
//! scalar parses to a raw-scalar array at serialization time.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::codec::{Gtype, MAX_NESTING_DEPTH};
use crate::error::{GraphError, Result};
use crate::parser::lexer::{Lexer, Token};
use crate::scalar::{network, temporal};
use crate::value::GtypeValue;

/// Parse the text form into a value tree.
pub fn parse(input: &str) -> Result<GtypeValue> {
    let mut lex = Lexer::new(input);
    let value = parse_value(&mut lex, 0)?;
    let trailing = lex.next()?;
    if trailing != Token::End {
        return Err(lex.error(format!(
            "expected end of input, found {}",
            trailing.describe()
        )));
    }
    Ok(value)
}

/// Parse directly to a serialized blob.
pub fn parse_to_gtype(input: &str) -> Result<Gtype> {
    Gtype::from_value(&parse(input)?)
}

fn parse_value(lex: &mut Lexer<'_>, depth: usize) -> Result<GtypeValue> {
    if depth > MAX_NESTING_DEPTH {
        return Err(GraphError::LimitExceeded(format!(
            "input nesting exceeds {} levels",
            MAX_NESTING_DEPTH
        )));
    }
    let token = lex.next()?;
    match token {
        Token::ArrayStart => parse_array(lex, depth),
        Token::ObjectStart => parse_object(lex, depth),
        Token::End => Err(lex.error("expected a value, found end of input")),
        scalar => {
            let value = scalar_value(lex, scalar)?;
            maybe_annotate(lex, value)
        }
    }
}

fn scalar_value(lex: &mut Lexer<'_>, token: Token) -> Result<Scalar> {
    let s = match token {
        Token::True => Scalar::Plain(GtypeValue::Bool(true)),
        Token::False => Scalar::Plain(GtypeValue::Bool(false)),
        Token::Null => Scalar::Plain(GtypeValue::Null),
        Token::String(s) => Scalar::Text(s),
        Token::Integer { value, text } => Scalar::Number(GtypeValue::Integer(value), text),
        Token::Float { value, text } => Scalar::Number(GtypeValue::Float(value), text),
        Token::Inet(text) => Scalar::InetLiteral(text),
        other => {
            return Err(lex.error(format!("expected a value, found {}", other.describe())))
        }
    };
    Ok(s)
}

/// A scalar token plus the lexeme detail an annotation needs.
enum Scalar {
    Plain(GtypeValue),
    /// String content.
    Text(String),
    /// Numeric value plus its literal text.
    Number(GtypeValue, String),
    /// Bare dotted-quad literal.
    InetLiteral(String),
}

fn maybe_annotate(lex: &mut Lexer<'_>, scalar: Scalar) -> Result<GtypeValue> {
    let annotation = match lex.peek()? {
        Token::Annotation(_) => match lex.next()? {
            Token::Annotation(name) => Some(name),
            _ => unreachable!("peeked annotation"),
        },
        _ => None,
    };
    match annotation {
        None => Ok(match scalar {
            Scalar::Plain(v) | Scalar::Number(v, _) => v,
            Scalar::Text(s) => GtypeValue::String(s),
            Scalar::InetLiteral(text) => GtypeValue::Inet(
                network::parse_inet(&text).map_err(|e| lex.error(e.to_string()))?,
            ),
        }),
        Some(name) => apply_annotation(lex, scalar, &name),
    }
}

/// Retype a scalar lexeme per its `:: type` annotation.
fn apply_annotation(lex: &mut Lexer<'_>, scalar: Scalar, name: &str) -> Result<GtypeValue> {
    // the literal text an annotation operates on
    let text: String = match &scalar {
        Scalar::Text(s) => s.clone(),
        Scalar::Number(_, text) => text.clone(),
        Scalar::InetLiteral(text) => text.clone(),
        Scalar::Plain(v) => {
            return Err(lex.error(format!(
                "type annotation not allowed on {}",
                v.type_name()
            )))
        }
    };
    let annotated = match name {
        "numeric" => Decimal::from_str(&text)
            .map(GtypeValue::Numeric)
            .map_err(|_| lex.error(format!("invalid numeric literal \"{}\"", text))),
        "integer" => match &scalar {
            Scalar::Number(GtypeValue::Float(f), _) => Ok(GtypeValue::Integer(*f as i64)),
            _ => text
                .parse::<i64>()
                .map(GtypeValue::Integer)
                .map_err(|_| lex.error(format!("invalid integer literal \"{}\"", text))),
        },
        "float" => text
            .parse::<f64>()
            .map(GtypeValue::Float)
            .map_err(|_| lex.error(format!("invalid float literal \"{}\"", text))),
        "timestamp" => match &scalar {
            // an integer literal is taken as epoch microseconds
            Scalar::Number(GtypeValue::Integer(i), _) => Ok(GtypeValue::Timestamp(*i)),
            _ => temporal::parse_timestamp(&text)
                .map(GtypeValue::Timestamp)
                .map_err(|e| lex.error(e.to_string())),
        },
        "timestamptz" => match &scalar {
            Scalar::Number(GtypeValue::Integer(i), _) => Ok(GtypeValue::TimestampTz(*i)),
            _ => temporal::parse_timestamptz(&text)
                .map(GtypeValue::TimestampTz)
                .map_err(|e| lex.error(e.to_string())),
        },
        "date" => temporal::parse_date(&text)
            .map(GtypeValue::Date)
            .map_err(|e| lex.error(e.to_string())),
        "time" => temporal::parse_time(&text)
            .map(GtypeValue::Time)
            .map_err(|e| lex.error(e.to_string())),
        "timetz" => temporal::parse_timetz(&text)
            .map(|(micros, offset_secs)| GtypeValue::TimeTz {
                micros,
                offset_secs,
            })
            .map_err(|e| lex.error(e.to_string())),
        "interval" => temporal::parse_interval(&text)
            .map(GtypeValue::IntervalValue)
            .map_err(|e| lex.error(e.to_string())),
        "inet" => network::parse_inet(&text)
            .map(GtypeValue::Inet)
            .map_err(|e| lex.error(e.to_string())),
        "cidr" => network::parse_cidr(&text)
            .map(GtypeValue::Cidr)
            .map_err(|e| lex.error(e.to_string())),
        "macaddr" => network::parse_mac(&text)
            .map(GtypeValue::Mac)
            .map_err(|e| lex.error(e.to_string())),
        "macaddr8" => network::parse_mac8(&text)
            .map(GtypeValue::Mac8)
            .map_err(|e| lex.error(e.to_string())),
        other => Err(lex.error(format!("unknown type annotation \"{}\"", other))),
    }?;
    Ok(annotated)
}

fn parse_array(lex: &mut Lexer<'_>, depth: usize) -> Result<GtypeValue> {
    let mut elems = Vec::new();
    // array start: value or "]"
    if *lex.peek()? == Token::ArrayEnd {
        lex.next()?;
        return Ok(GtypeValue::Array {
            elems,
            raw_scalar: false,
        });
    }
    loop {
        elems.push(parse_value(lex, depth + 1)?);
        // array next: "," or "]"
        match lex.next()? {
            Token::Comma => continue,
            Token::ArrayEnd => break,
            other => {
                return Err(lex.error(format!(
                    "expected \",\" or \"]\", found {}",
                    other.describe()
                )))
            }
        }
    }
    Ok(GtypeValue::Array {
        elems,
        raw_scalar: false,
    })
}

fn parse_object(lex: &mut Lexer<'_>, depth: usize) -> Result<GtypeValue> {
    let mut pairs: Vec<(String, GtypeValue, u32)> = Vec::new();
    let mut seq = 0u32;
    // object start: label or "}"
    if *lex.peek()? == Token::ObjectEnd {
        lex.next()?;
        return Ok(GtypeValue::Object(Vec::new()));
    }
    loop {
        // object label
        let key = match lex.next()? {
            Token::String(s) => s,
            other => {
                return Err(lex.error(format!(
                    "expected string key, found {}",
                    other.describe()
                )))
            }
        };
        match lex.next()? {
            Token::Colon => {}
            other => {
                return Err(lex.error(format!("expected \":\", found {}", other.describe())))
            }
        }
        let value = parse_value(lex, depth + 1)?;
        pairs.push((key, value, seq));
        seq += 1;
        // object next: "," or "}"
        match lex.next()? {
            Token::Comma => continue,
            Token::ObjectEnd => break,
            other => {
                return Err(lex.error(format!(
                    "expected \",\" or \"}}\", found {}",
                    other.describe()
                )))
            }
        }
    }
    // sorted, unique, last write wins
    pairs.sort_by(|a, b| a.0.cmp(&b.0).then(b.2.cmp(&a.2)));
    pairs.dedup_by(|dup, keep| dup.0 == keep.0);
    Ok(GtypeValue::Object(
        pairs.into_iter().map(|(k, v, _)| (k, v)).collect(),
    ))
}

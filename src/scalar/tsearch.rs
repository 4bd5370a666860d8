//! Text-search scalar families: tsvector and tsquery.
//!
//! A tsvector is a sorted list of lexemes with optional positions; a
//! tsquery is a boolean expression tree over lexemes with `&`, `|`, `!`
//! and the phrase operator `<->` / `<N>`.

use std::cmp::Ordering;
use std::fmt::Write as _;

use crate::error::{GraphError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lexeme {
    pub word: String,
    pub positions: Vec<u16>,
}

/// Sorted, deduplicated lexeme list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TsVector {
    pub lexemes: Vec<Lexeme>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TsQuery {
    Lexeme(String),
    Not(Box<TsQuery>),
    And(Box<TsQuery>, Box<TsQuery>),
    Or(Box<TsQuery>, Box<TsQuery>),
    /// Phrase operator with a distance (`<->` is distance 1).
    Phrase(Box<TsQuery>, Box<TsQuery>, u16),
}

// ── tsvector ───────────────────────────────────────────────────────

impl TsVector {
    pub fn new(mut lexemes: Vec<Lexeme>) -> Self {
        lexemes.sort_by(|a, b| a.word.cmp(&b.word));
        lexemes.dedup_by(|dup, keep| {
            if dup.word == keep.word {
                keep.positions.append(&mut dup.positions);
                keep.positions.sort_unstable();
                keep.positions.dedup();
                true
            } else {
                false
            }
        });
        TsVector { lexemes }
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.lexemes
            .binary_search_by(|l| l.word.as_str().cmp(word))
            .is_ok()
    }

    fn positions_of(&self, word: &str) -> &[u16] {
        match self.lexemes.binary_search_by(|l| l.word.as_str().cmp(word)) {
            Ok(i) => &self.lexemes[i].positions,
            Err(_) => &[],
        }
    }
}

fn bad(target: &'static str, s: &str) -> GraphError {
    GraphError::InvalidInput {
        target,
        input: s.to_string(),
    }
}

/// Parse `'fat':2,4 'cat':3` or bare whitespace-separated words.
pub fn parse_tsvector(s: &str) -> Result<TsVector> {
    let mut lexemes = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        let (word, tail) = if let Some(r) = rest.strip_prefix('\'') {
            let end = r.find('\'').ok_or_else(|| bad("tsvector", s))?;
            (&r[..end], &r[end + 1..])
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == ':')
                .unwrap_or(rest.len());
            (&rest[..end], &rest[end..])
        };
        if word.is_empty() {
            return Err(bad("tsvector", s));
        }
        let mut positions = Vec::new();
        let tail = if let Some(t) = tail.strip_prefix(':') {
            let end = t
                .find(|c: char| c.is_whitespace())
                .unwrap_or(t.len());
            for part in t[..end].split(',') {
                positions.push(part.parse::<u16>().map_err(|_| bad("tsvector", s))?);
            }
            &t[end..]
        } else {
            tail
        };
        lexemes.push(Lexeme {
            word: word.to_string(),
            positions,
        });
        rest = tail.trim_start();
    }
    Ok(TsVector::new(lexemes))
}

pub fn render_tsvector(v: &TsVector) -> String {
    let mut out = String::new();
    for (i, l) in v.lexemes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "'{}'", l.word);
        for (j, p) in l.positions.iter().enumerate() {
            out.push(if j == 0 { ':' } else { ',' });
            let _ = write!(out, "{}", p);
        }
    }
    out
}

// ── tsquery ────────────────────────────────────────────────────────

struct QueryParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> QueryParser<'a> {
    fn err(&self) -> GraphError {
        bad("tsquery", self.src)
    }

    fn skip_ws(&mut self) {
        while self.src[self.pos..].starts_with(' ') {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    // or-expr := and-expr ('|' and-expr)*
    fn parse_or(&mut self) -> Result<TsQuery> {
        let mut left = self.parse_and()?;
        while self.peek() == Some('|') {
            self.bump('|');
            let right = self.parse_and()?;
            left = TsQuery::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // and-expr := phrase-expr ('&' phrase-expr)*
    fn parse_and(&mut self) -> Result<TsQuery> {
        let mut left = self.parse_phrase()?;
        while self.peek() == Some('&') {
            self.bump('&');
            let right = self.parse_phrase()?;
            left = TsQuery::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // phrase-expr := unary ('<->' | '<N>' unary)*
    fn parse_phrase(&mut self) -> Result<TsQuery> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some('<') {
            self.bump('<');
            let dist = if self.src[self.pos..].starts_with('-') {
                self.bump('-');
                1u16
            } else {
                let end = self.src[self.pos..]
                    .find('>')
                    .ok_or_else(|| self.err())?;
                let n = self.src[self.pos..self.pos + end]
                    .parse::<u16>()
                    .map_err(|_| self.err())?;
                self.pos += end;
                n
            };
            if !self.src[self.pos..].starts_with('>') {
                return Err(self.err());
            }
            self.bump('>');
            let right = self.parse_unary()?;
            left = TsQuery::Phrase(Box::new(left), Box::new(right), dist);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<TsQuery> {
        match self.peek() {
            Some('!') => {
                self.bump('!');
                Ok(TsQuery::Not(Box::new(self.parse_unary()?)))
            }
            Some('(') => {
                self.bump('(');
                let inner = self.parse_or()?;
                if self.peek() != Some(')') {
                    return Err(self.err());
                }
                self.bump(')');
                Ok(inner)
            }
            Some('\'') => {
                self.bump('\'');
                let end = self.src[self.pos..].find('\'').ok_or_else(|| self.err())?;
                let word = self.src[self.pos..self.pos + end].to_string();
                self.pos += end + 1;
                if word.is_empty() {
                    return Err(self.err());
                }
                Ok(TsQuery::Lexeme(word))
            }
            Some(c) if c.is_alphanumeric() || c == '_' => {
                let start = self.pos;
                while self.src[self.pos..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_')
                {
                    self.pos += 1;
                }
                Ok(TsQuery::Lexeme(self.src[start..self.pos].to_string()))
            }
            _ => Err(self.err()),
        }
    }
}

pub fn parse_tsquery(s: &str) -> Result<TsQuery> {
    let mut p = QueryParser {
        src: s.trim(),
        pos: 0,
    };
    let q = p.parse_or()?;
    p.skip_ws();
    if p.pos != p.src.len() {
        return Err(p.err());
    }
    Ok(q)
}

pub fn render_tsquery(q: &TsQuery) -> String {
    match q {
        TsQuery::Lexeme(w) => format!("'{}'", w),
        TsQuery::Not(inner) => format!("!{}", render_group(inner)),
        TsQuery::And(l, r) => format!("{} & {}", render_group(l), render_group(r)),
        TsQuery::Or(l, r) => format!("{} | {}", render_group(l), render_group(r)),
        TsQuery::Phrase(l, r, 1) => format!("{} <-> {}", render_group(l), render_group(r)),
        TsQuery::Phrase(l, r, n) => format!("{} <{}> {}", render_group(l), n, render_group(r)),
    }
}

fn render_group(q: &TsQuery) -> String {
    match q {
        TsQuery::Lexeme(_) | TsQuery::Not(_) => render_tsquery(q),
        _ => format!("( {} )", render_tsquery(q)),
    }
}

// ── match (`@@`) ───────────────────────────────────────────────────

/// Evaluate a tsquery against a tsvector. Phrase matching falls back to
/// plain conjunction when either side lacks position data.
pub fn ts_match(v: &TsVector, q: &TsQuery) -> bool {
    match_positions(v, q).is_some()
}

/// Returns the match positions (possibly empty for non-positional matches),
/// or None when the query does not match.
fn match_positions(v: &TsVector, q: &TsQuery) -> Option<Vec<u16>> {
    match q {
        TsQuery::Lexeme(w) => {
            if v.contains_word(w) {
                Some(v.positions_of(w).to_vec())
            } else {
                None
            }
        }
        TsQuery::Not(inner) => {
            if match_positions(v, inner).is_none() {
                Some(Vec::new())
            } else {
                None
            }
        }
        TsQuery::And(l, r) => {
            let lp = match_positions(v, l)?;
            let rp = match_positions(v, r)?;
            let mut all = lp;
            all.extend(rp);
            Some(all)
        }
        TsQuery::Or(l, r) => match (match_positions(v, l), match_positions(v, r)) {
            (None, None) => None,
            (a, b) => {
                let mut all = a.unwrap_or_default();
                all.extend(b.unwrap_or_default());
                Some(all)
            }
        },
        TsQuery::Phrase(l, r, dist) => {
            let lp = match_positions(v, l)?;
            let rp = match_positions(v, r)?;
            if lp.is_empty() || rp.is_empty() {
                // no positional data: degrade to conjunction
                return Some(Vec::new());
            }
            let hits: Vec<u16> = rp
                .iter()
                .copied()
                .filter(|rpos| lp.iter().any(|lpos| *rpos == lpos.saturating_add(*dist)))
                .collect();
            if hits.is_empty() {
                None
            } else {
                Some(hits)
            }
        }
    }
}

pub fn cmp_tsvector(a: &TsVector, b: &TsVector) -> Ordering {
    for (la, lb) in a.lexemes.iter().zip(b.lexemes.iter()) {
        let o = la
            .word
            .cmp(&lb.word)
            .then_with(|| la.positions.cmp(&lb.positions));
        if o != Ordering::Equal {
            return o;
        }
    }
    a.lexemes.len().cmp(&b.lexemes.len())
}

pub fn cmp_tsquery(a: &TsQuery, b: &TsQuery) -> Ordering {
    render_tsquery(a).cmp(&render_tsquery(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsvector_sorts_and_dedups() {
        let v = parse_tsvector("'fat':2,4 'cat':3 'fat':5").unwrap();
        assert_eq!(render_tsvector(&v), "'cat':3 'fat':2,4,5");
    }

    #[test]
    fn test_tsvector_bare_words() {
        let v = parse_tsvector("cat fat rat").unwrap();
        assert_eq!(render_tsvector(&v), "'cat' 'fat' 'rat'");
    }

    #[test]
    fn test_tsquery_roundtrip() {
        let q = parse_tsquery("'fat' & ( 'cat' | 'rat' )").unwrap();
        assert_eq!(render_tsquery(&q), "'fat' & ( 'cat' | 'rat' )");
        let q = parse_tsquery("!'dog'").unwrap();
        assert_eq!(render_tsquery(&q), "!'dog'");
    }

    #[test]
    fn test_match_boolean() {
        let v = parse_tsvector("'cat':3 'fat':2,4").unwrap();
        assert!(ts_match(&v, &parse_tsquery("'cat' & 'fat'").unwrap()));
        assert!(!ts_match(&v, &parse_tsquery("'cat' & 'dog'").unwrap()));
        assert!(ts_match(&v, &parse_tsquery("'dog' | 'fat'").unwrap()));
        assert!(ts_match(&v, &parse_tsquery("!'dog'").unwrap()));
    }

    #[test]
    fn test_match_phrase() {
        let v = parse_tsvector("'fat':2 'cat':3").unwrap();
        assert!(ts_match(&v, &parse_tsquery("'fat' <-> 'cat'").unwrap()));
        assert!(!ts_match(&v, &parse_tsquery("'cat' <-> 'fat'").unwrap()));
        let v2 = parse_tsvector("'fat':2 'rat':4").unwrap();
        assert!(ts_match(&v2, &parse_tsquery("'fat' <2> 'rat'").unwrap()));
    }
}

//! Orderability comparison, structural containment, and stable hashing.
//!
//! The comparison is a total order compatible with equality: kinds are
//! ranked (NULL < BOOL < STRING < numeric family < … < ARRAY < OBJECT <
//! BINARY), the numeric family compares as arbitrary-precision reals,
//! arrays compare lexicographically, objects by (key, value) pairs in
//! sorted order, composites by their embedded id sequences.

use std::cmp::Ordering;

use ipnet::IpNet;

use crate::entity::path::cmp_id_sequence;
use crate::scalar::temporal::{interval_cmp_key, MICROS_PER_DAY};
use crate::scalar::{geometric, numeric, range, tsearch, vector};
use crate::value::GtypeValue;

/// Total order over gtype values.
pub fn compare_values(a: &GtypeValue, b: &GtypeValue) -> Ordering {
    use GtypeValue::*;

    if a.is_numeric_family() && b.is_numeric_family() {
        return numeric::compare(a, b);
    }

    let rank = a.kind_rank().cmp(&b.kind_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Bool(x), Bool(y)) => x.cmp(y),
        (String(x), String(y)) => x.cmp(y),

        // the datetime family compares on a shared microsecond timeline
        (x, y) if x.kind_rank() == 4 => datetime_micros(x).cmp(&datetime_micros(y)),

        (Time(x), Time(y)) => x.cmp(y),
        (
            TimeTz {
                micros: xm,
                offset_secs: xo,
            },
            TimeTz {
                micros: ym,
                offset_secs: yo,
            },
        ) => {
            let xu = *xm - *xo as i64 * 1_000_000;
            let yu = *ym - *yo as i64 * 1_000_000;
            xu.cmp(&yu).then(xo.cmp(yo))
        }
        (IntervalValue(x), IntervalValue(y)) => interval_cmp_key(x).cmp(&interval_cmp_key(y)),

        (x, y) if x.kind_rank() == 8 => cmp_net(net_of(x), net_of(y)),

        (Mac(x), Mac(y)) => x.cmp(y),
        (Mac8(x), Mac8(y)) => x.cmp(y),

        (Point(x), Point(y)) => geometric::cmp_point(x, y),
        (LSeg(x), LSeg(y)) => geometric::cmp_lseg(x, y),
        (Line(x), Line(y)) => geometric::cmp_line(x, y),
        (GBox(x), GBox(y)) => geometric::cmp_box(x, y),
        (GPath(x), GPath(y)) => x
            .closed
            .cmp(&y.closed)
            .then_with(|| geometric::cmp_points(&x.points, &y.points)),
        (Polygon(x), Polygon(y)) => geometric::cmp_points(&x.points, &y.points),
        (Circle(x), Circle(y)) => geometric::cmp_circle(x, y),
        (Box2D(x), Box2D(y)) => f64s(&[x.xmin, x.ymin, x.xmax, x.ymax], &[y.xmin, y.ymin, y.xmax, y.ymax]),
        (Box3D(x), Box3D(y)) => f64s(
            &[x.xmin, x.ymin, x.zmin, x.xmax, x.ymax, x.zmax],
            &[y.xmin, y.ymin, y.zmin, y.xmax, y.ymax, y.zmax],
        ),
        (Spheroid(x), Spheroid(y)) => f64s(&[x.a, x.b], &[y.a, y.b]),
        (Gserialized(x), Gserialized(y)) => x.cmp(y),

        (TsVector(x), TsVector(y)) => tsearch::cmp_tsvector(x, y),
        (TsQuery(x), TsQuery(y)) => tsearch::cmp_tsquery(x, y),
        (Bytea(x), Bytea(y)) => x.cmp(y),
        (Range(x), Range(y)) => range::cmp_range(x, y),
        (MultiRange(x), MultiRange(y)) => range::cmp_multirange(x, y),
        (Vector(x), Vector(y)) => vector::cmp_vector(x, y),

        (Vertex(x), Vertex(y)) => x.id.cmp(&y.id),
        (Edge(x), Edge(y)) => x.id.cmp(&y.id),
        (Path(x), Path(y)) => cmp_id_sequence(x, y),
        (PartialPath(x), PartialPath(y)) => cmp_id_sequence(x, y),

        (
            Array { elems: xs, .. },
            Array { elems: ys, .. },
        ) => {
            for (x, y) in xs.iter().zip(ys.iter()) {
                let o = compare_values(x, y);
                if o != Ordering::Equal {
                    return o;
                }
            }
            xs.len().cmp(&ys.len())
        }
        (Object(xs), Object(ys)) => {
            for ((kx, vx), (ky, vy)) in xs.iter().zip(ys.iter()) {
                let o = kx.cmp(ky).then_with(|| compare_values(vx, vy));
                if o != Ordering::Equal {
                    return o;
                }
            }
            xs.len().cmp(&ys.len())
        }
        (
            Binary { bytes: xb, .. },
            Binary { bytes: yb, .. },
        ) => xb.cmp(yb),

        // same rank guarantees same family; unreachable otherwise
        _ => Ordering::Equal,
    }
}

/// Timestamp / timestamptz / date projected onto one micros timeline.
fn datetime_micros(v: &GtypeValue) -> i64 {
    match v {
        GtypeValue::Timestamp(t) | GtypeValue::TimestampTz(t) => *t,
        GtypeValue::Date(d) => *d as i64 * MICROS_PER_DAY,
        _ => 0,
    }
}

fn net_of(v: &GtypeValue) -> &IpNet {
    match v {
        GtypeValue::Inet(n) | GtypeValue::Cidr(n) => n,
        _ => unreachable!("rank 8 is the network family"),
    }
}

fn cmp_net(a: &IpNet, b: &IpNet) -> Ordering {
    let fam = |n: &IpNet| match n {
        IpNet::V4(_) => 4u8,
        IpNet::V6(_) => 6u8,
    };
    let bits = |n: &IpNet| match n {
        IpNet::V4(v) => u32::from(v.addr()) as u128,
        IpNet::V6(v) => u128::from(v.addr()),
    };
    fam(a)
        .cmp(&fam(b))
        .then_with(|| bits(a).cmp(&bits(b)))
        .then_with(|| a.prefix_len().cmp(&b.prefix_len()))
}

fn f64s(a: &[f64], b: &[f64]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let o = x.total_cmp(y);
        if o != Ordering::Equal {
            return o;
        }
    }
    Ordering::Equal
}

// ── Structural containment ─────────────────────────────────────────

/// Recursive deep containment (`doc @> pattern`).
///
/// Objects: every pattern key must exist in the document with a matching
/// or contained value. Arrays: every pattern element must find an
/// equal-or-contained element. Scalars match by order equality.
pub fn deep_contains(doc: &GtypeValue, pattern: &GtypeValue) -> bool {
    match (doc, pattern) {
        (GtypeValue::Object(_), GtypeValue::Object(pp)) => pp.iter().all(|(k, pv)| {
            doc.object_get(k)
                .map(|dv| contains_value(dv, pv))
                .unwrap_or(false)
        }),
        (
            GtypeValue::Array { elems: de, .. },
            GtypeValue::Array { elems: pe, .. },
        ) => pe
            .iter()
            .all(|pv| de.iter().any(|dv| contains_value(dv, pv))),
        _ => {
            doc.is_scalar()
                && pattern.is_scalar()
                && compare_values(doc, pattern) == Ordering::Equal
        }
    }
}

/// Element-level rule: containers recurse, scalars compare equal.
fn contains_value(doc: &GtypeValue, pattern: &GtypeValue) -> bool {
    match (doc, pattern) {
        (GtypeValue::Object(_), GtypeValue::Object(_))
        | (GtypeValue::Array { .. }, GtypeValue::Array { .. }) => deep_contains(doc, pattern),
        (GtypeValue::Object(_), _) | (_, GtypeValue::Object(_)) => false,
        (GtypeValue::Array { .. }, _) | (_, GtypeValue::Array { .. }) => false,
        _ => compare_values(doc, pattern) == Ordering::Equal,
    }
}

// ── Stable hashing ─────────────────────────────────────────────────

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// container boundary tokens folded into the running hash
const HASH_BEGIN_ARRAY: u64 = 0x5b;
const HASH_END_ARRAY: u64 = 0x5d;
const HASH_BEGIN_OBJECT: u64 = 0x7b;
const HASH_END_OBJECT: u64 = 0x7d;

fn fnv(h: u64, bytes: &[u8]) -> u64 {
    let mut h = h;
    for b in bytes {
        h ^= *b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

fn mix(hash: u64, item: u64) -> u64 {
    hash.rotate_left(1) ^ item
}

/// Stable seeded hash. Equal values hash equal; the numeric family
/// hashes through its decimal form so `2 == 2.0` holds for hashing too.
pub fn hash_value(v: &GtypeValue, seed: u64) -> u64 {
    let mut h = FNV_OFFSET ^ seed;
    h = hash_into(v, h);
    h
}

fn hash_into(v: &GtypeValue, hash: u64) -> u64 {
    match v {
        GtypeValue::Array { elems, raw_scalar } => {
            if *raw_scalar && elems.len() == 1 {
                return hash_into(&elems[0], hash);
            }
            let mut h = mix(hash, HASH_BEGIN_ARRAY);
            for e in elems {
                h = hash_into(e, h);
            }
            mix(h, HASH_END_ARRAY)
        }
        GtypeValue::Object(pairs) => {
            let mut h = mix(hash, HASH_BEGIN_OBJECT);
            for (k, val) in pairs {
                h = fnv(h, k.as_bytes());
                h = hash_into(val, h);
            }
            mix(h, HASH_END_OBJECT)
        }
        scalar => mix(hash, hash_scalar(scalar)),
    }
}

fn hash_scalar(v: &GtypeValue) -> u64 {
    use GtypeValue::*;
    match v {
        Null => 0x01,
        Bool(b) => {
            if *b {
                0x02
            } else {
                0x03
            }
        }
        String(s) => fnv(FNV_OFFSET, s.as_bytes()),
        // hash the numeric family through its canonical decimal form
        Integer(_) | Float(_) | Numeric(_) => hash_numeric(v),
        Timestamp(t) | TimestampTz(t) => fnv(FNV_OFFSET, &t.to_le_bytes()),
        Date(d) => fnv(FNV_OFFSET, &(*d as i64 * MICROS_PER_DAY).to_le_bytes()),
        Time(t) => fnv(FNV_OFFSET, &t.to_le_bytes()),
        TimeTz { micros, offset_secs } => {
            fnv(fnv(FNV_OFFSET, &micros.to_le_bytes()), &offset_secs.to_le_bytes())
        }
        IntervalValue(iv) => fnv(FNV_OFFSET, &interval_cmp_key(iv).to_le_bytes()),
        Inet(n) | Cidr(n) => fnv(FNV_OFFSET, n.to_string().as_bytes()),
        Mac(m) => fnv(FNV_OFFSET, m),
        Mac8(m) => fnv(FNV_OFFSET, m),
        Bytea(b) | Gserialized(b) => fnv(FNV_OFFSET, b),
        Vertex(v) => fnv(FNV_OFFSET, &v.id.to_le_bytes()),
        Edge(e) => fnv(FNV_OFFSET, &e.id.to_le_bytes()),
        Path(elems) | PartialPath(elems) => {
            let mut h = FNV_OFFSET;
            for id in crate::entity::path::path_id_sequence(elems) {
                h = fnv(h, &id.to_le_bytes());
            }
            h
        }
        Binary { bytes, .. } => fnv(FNV_OFFSET, bytes),
        // remaining families hash through their text form
        other => fnv(
            FNV_OFFSET,
            crate::parser::render::render_scalar_text(other).as_bytes(),
        ),
    }
}

fn hash_numeric(v: &GtypeValue) -> u64 {
    use rust_decimal::prelude::*;
    let d = match v {
        GtypeValue::Integer(i) => Some(Decimal::from(*i)),
        GtypeValue::Float(f) => Decimal::from_f64(*f),
        GtypeValue::Numeric(d) => Some(*d),
        _ => None,
    };
    match d {
        Some(d) => fnv(FNV_OFFSET, &d.normalize().serialize()),
        // non-finite floats hash their bit pattern
        None => match v {
            GtypeValue::Float(f) => fnv(FNV_OFFSET, &f.to_bits().to_le_bytes()),
            _ => 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(elems: Vec<GtypeValue>) -> GtypeValue {
        GtypeValue::Array {
            elems,
            raw_scalar: false,
        }
    }

    #[test]
    fn test_rank_order_between_kinds() {
        assert_eq!(
            compare_values(&GtypeValue::Null, &GtypeValue::Bool(false)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&GtypeValue::Bool(true), &GtypeValue::String("a".into())),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&GtypeValue::String("z".into()), &GtypeValue::Integer(0)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&GtypeValue::Integer(9), &arr(vec![])),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&arr(vec![]), &GtypeValue::Object(vec![])),
            Ordering::Less
        );
    }

    #[test]
    fn test_array_lexicographic() {
        let a = arr(vec![GtypeValue::Integer(1), GtypeValue::Integer(2)]);
        let b = arr(vec![GtypeValue::Integer(1), GtypeValue::Integer(3)]);
        let c = arr(vec![GtypeValue::Integer(1)]);
        assert_eq!(compare_values(&a, &b), Ordering::Less);
        assert_eq!(compare_values(&c, &a), Ordering::Less);
        assert_eq!(compare_values(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_object_pairwise() {
        let a = GtypeValue::Object(vec![("a".into(), GtypeValue::Integer(1))]);
        let b = GtypeValue::Object(vec![("a".into(), GtypeValue::Integer(2))]);
        let c = GtypeValue::Object(vec![("b".into(), GtypeValue::Integer(1))]);
        assert_eq!(compare_values(&a, &b), Ordering::Less);
        assert_eq!(compare_values(&a, &c), Ordering::Less);
    }

    #[test]
    fn test_cross_numeric_family() {
        use rust_decimal::Decimal;
        assert_eq!(
            compare_values(&GtypeValue::Integer(2), &GtypeValue::Numeric(Decimal::from(2))),
            Ordering::Equal
        );
        assert_eq!(
            compare_values(&GtypeValue::Float(2.5), &GtypeValue::Integer(2)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_timestamp_date_shared_timeline() {
        let d = GtypeValue::Date(1);
        let ts = GtypeValue::Timestamp(MICROS_PER_DAY);
        assert_eq!(compare_values(&d, &ts), Ordering::Equal);
    }

    #[test]
    fn test_deep_contains_objects() {
        let doc: GtypeValue =
            serde_json::json!({"a": 1, "b": {"c": 2, "d": 3}, "e": [1, 2]}).into();
        let pat: GtypeValue = serde_json::json!({"b": {"c": 2}}).into();
        assert!(deep_contains(&doc, &pat));
        let bad: GtypeValue = serde_json::json!({"b": {"c": 9}}).into();
        assert!(!deep_contains(&doc, &bad));
        let missing: GtypeValue = serde_json::json!({"z": 1}).into();
        assert!(!deep_contains(&doc, &missing));
    }

    #[test]
    fn test_deep_contains_arrays() {
        let doc: GtypeValue = serde_json::json!([1, 2, [3, 4], {"k": 5}]).into();
        assert!(deep_contains(&doc, &serde_json::json!([2]).into()));
        assert!(deep_contains(&doc, &serde_json::json!([[3]]).into()));
        assert!(deep_contains(&doc, &serde_json::json!([{"k": 5}]).into()));
        assert!(!deep_contains(&doc, &serde_json::json!([9]).into()));
    }

    #[test]
    fn test_deep_contains_empty_pattern() {
        let doc: GtypeValue = serde_json::json!({"a": 1}).into();
        assert!(deep_contains(&doc, &serde_json::json!({}).into()));
        let arr_doc: GtypeValue = serde_json::json!([1]).into();
        assert!(deep_contains(&arr_doc, &serde_json::json!([]).into()));
    }

    #[test]
    fn test_hash_respects_equality() {
        use rust_decimal::Decimal;
        assert_eq!(
            hash_value(&GtypeValue::Integer(2), 0),
            hash_value(&GtypeValue::Float(2.0), 0)
        );
        assert_eq!(
            hash_value(&GtypeValue::Integer(2), 0),
            hash_value(&GtypeValue::Numeric(Decimal::from(2)), 0)
        );
        assert_ne!(
            hash_value(&GtypeValue::Integer(2), 0),
            hash_value(&GtypeValue::Integer(3), 0)
        );
    }

    #[test]
    fn test_hash_seed_changes_output() {
        let v: GtypeValue = serde_json::json!({"a": [1, 2]}).into();
        assert_ne!(hash_value(&v, 0), hash_value(&v, 1));
        assert_eq!(hash_value(&v, 7), hash_value(&v.clone(), 7));
    }

    #[test]
    fn test_hash_distinguishes_structure() {
        let flat: GtypeValue = serde_json::json!([1, 2]).into();
        let nested: GtypeValue = serde_json::json!([[1], 2]).into();
        assert_ne!(hash_value(&flat, 0), hash_value(&nested, 0));
    }
}

//! Geometric scalar families: point, lseg, line, box, path, polygon,
//! circle, plus the 2D/3D bounding boxes and spheroid carried for the
//! geometry bridge.
//!
//! Text forms follow the PostgreSQL shapes: `(x,y)`, `[(x1,y1),(x2,y2)]`,
//! `{a,b,c}`, `(x1,y1),(x2,y2)`, `((…))` / `[(…)]` paths, `<(x,y),r>`.

use std::cmp::Ordering;

use crate::error::{GraphError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LSeg {
    pub p0: Point,
    pub p1: Point,
}

/// Infinite line `ax + by + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Axis-aligned box stored as (high, low) corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GBox {
    pub high: Point,
    pub low: Point,
}

/// Open or closed point chain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GPath {
    pub closed: bool,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Box2D {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Box3D {
    pub xmin: f64,
    pub ymin: f64,
    pub zmin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmax: f64,
}

/// Reference ellipsoid: semi-major and semi-minor axes in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spheroid {
    pub a: f64,
    pub b: f64,
}

// ── Parsing ────────────────────────────────────────────────────────

struct Cursor<'a> {
    src: &'a str,
    target: &'static str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(target: &'static str, src: &'a str) -> Self {
        Cursor { src, target, pos: 0 }
    }

    fn err(&self) -> GraphError {
        GraphError::InvalidInput {
            target: self.target,
            input: self.src.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while self.src[self.pos..].starts_with(' ') {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> Result<()> {
        self.skip_ws();
        if self.src[self.pos..].starts_with(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(self.err())
        }
    }

    fn try_eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_ws();
        let rest = &self.src[self.pos..];
        let end = rest
            .char_indices()
            .take_while(|(i, c)| {
                c.is_ascii_digit()
                    || *c == '.'
                    || *c == 'e'
                    || *c == 'E'
                    || ((*c == '-' || *c == '+')
                        && (*i == 0 || matches!(rest.as_bytes()[i - 1], b'e' | b'E')))
            })
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .ok_or_else(|| self.err())?;
        let n: f64 = rest[..end].parse().map_err(|_| self.err())?;
        self.pos += end;
        Ok(n)
    }

    fn point(&mut self) -> Result<Point> {
        let parens = self.try_eat('(');
        let x = self.number()?;
        self.eat(',')?;
        let y = self.number()?;
        if parens {
            self.eat(')')?;
        }
        Ok(Point { x, y })
    }

    fn finish(&mut self) -> Result<()> {
        self.skip_ws();
        if self.pos == self.src.len() {
            Ok(())
        } else {
            Err(self.err())
        }
    }
}

pub fn parse_point(s: &str) -> Result<Point> {
    let mut c = Cursor::new("point", s.trim());
    let p = c.point()?;
    c.finish()?;
    Ok(p)
}

pub fn parse_lseg(s: &str) -> Result<LSeg> {
    let mut c = Cursor::new("lseg", s.trim());
    let bracketed = c.try_eat('[');
    let p0 = c.point()?;
    c.eat(',')?;
    let p1 = c.point()?;
    if bracketed {
        c.eat(']')?;
    }
    c.finish()?;
    Ok(LSeg { p0, p1 })
}

pub fn parse_line(s: &str) -> Result<Line> {
    let mut c = Cursor::new("line", s.trim());
    c.eat('{')?;
    let a = c.number()?;
    c.eat(',')?;
    let b = c.number()?;
    c.eat(',')?;
    let cc = c.number()?;
    c.eat('}')?;
    c.finish()?;
    if a == 0.0 && b == 0.0 {
        return Err(GraphError::Domain("invalid line specification: A and B cannot both be zero".into()));
    }
    Ok(Line { a, b, c: cc })
}

pub fn parse_box(s: &str) -> Result<GBox> {
    let mut c = Cursor::new("box", s.trim());
    let p0 = c.point()?;
    c.eat(',')?;
    let p1 = c.point()?;
    c.finish()?;
    // normalise corners so high dominates low
    Ok(GBox {
        high: Point {
            x: p0.x.max(p1.x),
            y: p0.y.max(p1.y),
        },
        low: Point {
            x: p0.x.min(p1.x),
            y: p0.y.min(p1.y),
        },
    })
}

pub fn parse_path(s: &str) -> Result<GPath> {
    let s = s.trim();
    let mut c = Cursor::new("path", s);
    let closed = if c.try_eat('[') {
        false
    } else {
        c.eat('(')?;
        true
    };
    let mut points = vec![c.point()?];
    while c.try_eat(',') {
        points.push(c.point()?);
    }
    c.eat(if closed { ')' } else { ']' })?;
    c.finish()?;
    Ok(GPath { closed, points })
}

pub fn parse_polygon(s: &str) -> Result<Polygon> {
    let mut c = Cursor::new("polygon", s.trim());
    c.eat('(')?;
    let mut points = vec![c.point()?];
    while c.try_eat(',') {
        points.push(c.point()?);
    }
    c.eat(')')?;
    c.finish()?;
    Ok(Polygon { points })
}

pub fn parse_circle(s: &str) -> Result<Circle> {
    let mut c = Cursor::new("circle", s.trim());
    c.eat('<')?;
    let center = c.point()?;
    c.eat(',')?;
    let radius = c.number()?;
    c.eat('>')?;
    c.finish()?;
    if radius < 0.0 {
        return Err(GraphError::Domain("circle radius cannot be negative".into()));
    }
    Ok(Circle { center, radius })
}

// ── Rendering ──────────────────────────────────────────────────────

fn fmt_point(p: &Point) -> String {
    format!("({},{})", p.x, p.y)
}

pub fn render_point(p: &Point) -> String {
    fmt_point(p)
}

pub fn render_lseg(l: &LSeg) -> String {
    format!("[{},{}]", fmt_point(&l.p0), fmt_point(&l.p1))
}

pub fn render_line(l: &Line) -> String {
    format!("{{{},{},{}}}", l.a, l.b, l.c)
}

pub fn render_box(b: &GBox) -> String {
    format!("{},{}", fmt_point(&b.high), fmt_point(&b.low))
}

pub fn render_path(p: &GPath) -> String {
    let inner: Vec<String> = p.points.iter().map(fmt_point).collect();
    if p.closed {
        format!("({})", inner.join(","))
    } else {
        format!("[{}]", inner.join(","))
    }
}

pub fn render_polygon(p: &Polygon) -> String {
    let inner: Vec<String> = p.points.iter().map(fmt_point).collect();
    format!("({})", inner.join(","))
}

pub fn render_circle(c: &Circle) -> String {
    format!("<{},{}>", fmt_point(&c.center), c.radius)
}

pub fn render_box2d(b: &Box2D) -> String {
    format!("BOX({} {},{} {})", b.xmin, b.ymin, b.xmax, b.ymax)
}

pub fn render_box3d(b: &Box3D) -> String {
    format!(
        "BOX3D({} {} {},{} {} {})",
        b.xmin, b.ymin, b.zmin, b.xmax, b.ymax, b.zmax
    )
}

pub fn render_spheroid(s: &Spheroid) -> String {
    format!("SPHEROID({},{})", s.a, s.b)
}

// ── Comparison ─────────────────────────────────────────────────────

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

pub fn cmp_point(a: &Point, b: &Point) -> Ordering {
    cmp_f64(a.x, b.x).then(cmp_f64(a.y, b.y))
}

pub fn cmp_lseg(a: &LSeg, b: &LSeg) -> Ordering {
    cmp_point(&a.p0, &b.p0).then(cmp_point(&a.p1, &b.p1))
}

pub fn cmp_line(a: &Line, b: &Line) -> Ordering {
    cmp_f64(a.a, b.a)
        .then(cmp_f64(a.b, b.b))
        .then(cmp_f64(a.c, b.c))
}

pub fn cmp_box(a: &GBox, b: &GBox) -> Ordering {
    cmp_point(&a.high, &b.high).then(cmp_point(&a.low, &b.low))
}

pub fn cmp_points(a: &[Point], b: &[Point]) -> Ordering {
    for (pa, pb) in a.iter().zip(b.iter()) {
        let o = cmp_point(pa, pb);
        if o != Ordering::Equal {
            return o;
        }
    }
    a.len().cmp(&b.len())
}

pub fn cmp_circle(a: &Circle, b: &Circle) -> Ordering {
    cmp_point(&a.center, &b.center).then(cmp_f64(a.radius, b.radius))
}

// ── Accessors ──────────────────────────────────────────────────────

pub fn box_area(b: &GBox) -> f64 {
    (b.high.x - b.low.x) * (b.high.y - b.low.y)
}

pub fn box_center(b: &GBox) -> Point {
    Point {
        x: (b.high.x + b.low.x) / 2.0,
        y: (b.high.y + b.low.y) / 2.0,
    }
}

pub fn circle_area(c: &Circle) -> f64 {
    std::f64::consts::PI * c.radius * c.radius
}

pub fn point_distance(a: &Point, b: &Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

//! Text form: a JSON superset with `::type` annotations and bare inet
//! literals. The lexer produces annotated tokens, the recursive-descent
//! parser drives the builder, and `render` produces the inverse text
//! form.

pub mod lexer;
pub mod parse;
pub mod render;

pub use parse::{parse, parse_to_gtype};
pub use render::render;

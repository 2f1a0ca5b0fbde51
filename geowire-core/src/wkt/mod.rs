//! Well-Known Text and its PostGIS extension EWKT.
//!
//! Reading accepts an optional `SRID=<int>;` prefix, an optional `M` after
//! the type keyword, and both `EMPTY` spellings. Writing is canonical:
//! no blanks after commas, a single blank between ordinates and the `M`
//! suffix only on the outermost keyword of 2D measured data.

mod parser;
mod tokenizer;
mod writer;

pub use parser::parse_wkt;
pub use writer::{write_ewkt, write_wkt, Ewkt, Wkt};

pub(crate) use parser::parse_position;
pub(crate) use writer::write_point as write_position;
pub(crate) use tokenizer::{split_srid, split_top_level, strip_parens};

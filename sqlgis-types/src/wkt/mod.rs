//! Well-Known Text reading and writing.
//!
//! The reader is lenient in the same places the database admin UI has always been lenient:
//!
//! * keywords are case-insensitive and whitespace between tokens is ignored;
//! * a coordinate tuple with a missing or unparsable component is still read, the component is just absent
//!   (see [`WktCoord`]);
//! * text after a complete geometry is ignored.
//!
//! The raw parse result [`WktGeometry`] keeps absent components so that the legacy structured format
//! ([`GisData`](crate::params::GisData)) can reproduce them. Converting it into a
//! [`Geometry`](crate::Geometry) replaces any point with a missing component by `(0, 0)`.

use lazy_static::lazy_static;
use regex::Regex;

mod reader;
mod writer;

pub use reader::{parse, WktCoord, WktGeometry};

lazy_static! {
    static ref QUOTED_WITH_SRID: Regex =
        Regex::new(r"(?s)^\s*'(.*)'\s*,\s*(\d+)\s*$").expect("valid regex");
}

/// Splits a value written as `'WKT',SRID` into its parts. Anything else is returned as is with SRID `0`.
pub fn split_srid(value: &str) -> (&str, u32) {
    match QUOTED_WITH_SRID.captures(value) {
        Some(captures) => {
            let (Some(wkt), Some(srid)) = (captures.get(1), captures.get(2)) else {
                return (value, 0);
            };
            (wkt.as_str(), srid.as_str().parse().unwrap_or(0))
        }
        None => (value, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_srid_quoted() {
        assert_eq!(
            split_srid("'POLYGON((0 0,1 1,1 0,0 0))',124"),
            ("POLYGON((0 0,1 1,1 0,0 0))", 124)
        );
        assert_eq!(split_srid(" 'POINT(1 2)' , 4326 "), ("POINT(1 2)", 4326));
    }

    #[test]
    fn split_srid_bare() {
        assert_eq!(split_srid("POINT(1 2)"), ("POINT(1 2)", 0));
        assert_eq!(split_srid("'POINT(1 2)'"), ("'POINT(1 2)'", 0));
        assert_eq!(split_srid("'POINT(1 2)',abc"), ("'POINT(1 2)',abc", 0));
    }
}

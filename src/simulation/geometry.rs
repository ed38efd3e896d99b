//! Conflict geometry
//!
//! Lanes sit at integer positions around the boundary of the intersection.
//! A movement draws a straight chord from its source to each destination;
//! two movements conflict when any of their chords cross.

use super::lane::{Lane, LaneDestinationMapping};

/// A chord between two boundary positions
pub type Chord = (i32, i32);

fn strictly_between(x: i32, (a, b): Chord) -> bool {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    lo < x && x < hi
}

/// One endpoint sits strictly inside `other` while its partner does not
fn straddles((p, q): Chord, other: Chord) -> bool {
    (strictly_between(p, other) && !strictly_between(q, other))
        || (strictly_between(q, other) && !strictly_between(p, other))
}

/// Whether two chords cross
///
/// Chords that only share an endpoint do not cross, unless the other
/// endpoint of one of them lies strictly inside the span of the other.
///
/// Placements are read as points on a line, not on a circle: spans never
/// wrap around. For disjoint endpoints that gives the same answer as the
/// circular test, but for chords sharing an endpoint the result can change
/// when every placement is rotated, e.g. `(4, 5)` against `(6, 5)` does not
/// cross while `(9, 0)` against `(1, 0)` does.
pub fn chords_cross(first: Chord, second: Chord) -> bool {
    straddles(first, second) || straddles(second, first)
}

/// Whether the chord `s1 -> d1` crosses the chord `s2 -> d2`
pub fn lanes_intersect(s1: &Lane, d1: &Lane, s2: &Lane, d2: &Lane) -> bool {
    chords_cross(
        (s1.placement(), d1.placement()),
        (s2.placement(), d2.placement()),
    )
}

/// Whether any chord of `m1` crosses any chord of `m2`
pub fn mappings_intersect(m1: &LaneDestinationMapping, m2: &LaneDestinationMapping) -> bool {
    m1.chords().any(|(s1, d1)| {
        m2.chords()
            .any(|(s2, d2)| lanes_intersect(s1, d1, s2, d2))
    })
}

/// Whether any movement in `first` conflicts with any movement in `second`
pub fn any_mappings_intersect(
    first: &[LaneDestinationMapping],
    second: &[LaneDestinationMapping],
) -> bool {
    first
        .iter()
        .any(|m1| second.iter().any(|m2| mappings_intersect(m1, m2)))
}


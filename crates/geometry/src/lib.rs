//! # Geometry
//!
//! Planar primitives and the per-scale geometry algorithms of the generator.
//!
//! | Module        | Purpose                                                  |
//! |---------------|----------------------------------------------------------|
//! | [`point`]     | `PointD`, `RectD`                                        |
//! | [`distance`]  | Pluggable point-to-segment metrics                       |
//! | [`simplify`]  | Recursive point reduction against a squared tolerance    |
//! | [`scales`]    | Per-level epsilons and the "big enough for level" test   |
//! | [`polygon`]   | Ring predicates: closure, containment, diagonal checks   |
//! | [`strip`]     | Single triangle-strip search over a simple ring          |
//! | [`tesselate`] | Triangle-list fallback for rings with holes              |

pub mod distance;
pub mod point;
pub mod polygon;
pub mod scales;
pub mod simplify;
pub mod strip;
pub mod tesselate;

pub use distance::{RectBoundedDistance, SegmentDistance, SquaredSegmentDistance};
pub use point::{PointD, RectD};
pub use simplify::simplify_points;
pub use strip::{find_single_strip, MAX_STRIP_POINTS};
pub use tesselate::{triangulate, Triangle};

#[cfg(test)]
mod tests;

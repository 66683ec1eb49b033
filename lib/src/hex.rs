//! # Axial hex coordinates
//!
//! The board is a pointy-top hex grid addressed by axial `(q, r)` pairs. The
//! derived cube coordinate `z = -q - r` only shows up in the distance and
//! rotation math. Equality and ordering are structural, which keeps map
//! iteration deterministic.

/// The six axial direction vectors, starting east and walking counter-clockwise.
pub const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// A hex addressed by axial coordinates.
#[derive(
  Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Hex {
  pub q: i32,
  pub r: i32,
}

impl Hex {
  pub fn new(q: i32, r: i32) -> Self {
    Self { q, r }
  }

  /// The derived cube z coordinate.
  #[inline]
  pub fn z(self) -> i32 {
    -self.q - self.r
  }

  /// The six directly neighboring hexes.
  pub fn neighbors(self) -> [Hex; 6] {
    let mut out = [Hex::default(); 6];
    for (i, (dq, dr)) in DIRECTIONS.iter().enumerate() {
      out[i] = Hex::new(self.q + dq, self.r + dr);
    }
    out
  }

  /// Hex distance: `(|dq| + |dr| + |dz|) / 2`.
  pub fn distance(self, other: Hex) -> i32 {
    let dq = (self.q - other.q).abs();
    let dr = (self.r - other.r).abs();
    let dz = (self.z() - other.z()).abs();
    (dq + dr + dz) / 2
  }

  /// True when the two hexes share an edge.
  #[inline]
  pub fn is_neighbor(self, other: Hex) -> bool {
    self.distance(other) == 1
  }

  /// One 60 degree rotation about the origin, `(x, y, z) -> (-z, -x, -y)`
  /// in cube space. Applied to displacement vectors when matching bridge
  /// orientations.
  pub fn rotated(self) -> Hex {
    Hex::new(-self.r, self.q + self.r)
  }

  /// All six rotations of this vector, starting with the vector itself.
  pub fn rotations(self) -> [Hex; 6] {
    let mut out = [self; 6];
    for i in 1..6 {
      out[i] = out[i - 1].rotated();
    }
    out
  }

  #[inline]
  pub fn offset(self, d: Hex) -> Hex {
    Hex::new(self.q + d.q, self.r + d.r)
  }

  #[inline]
  pub fn delta(self, other: Hex) -> Hex {
    Hex::new(other.q - self.q, other.r - self.r)
  }
}

impl std::fmt::Display for Hex {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "({},{})", self.q, self.r)
  }
}

#[macro_export]
macro_rules! hex {
  ($q:expr, $r:expr) => {
    $crate::hex::Hex::new($q, $r)
  };
}

#[cfg(test)]
mod tests {
  use crate::hex::*;

  #[test]
  fn cube_coordinates_sum_to_zero() {
    let h = hex!(3, -5);
    assert_eq!(h.q + h.r + h.z(), 0);
  }

  #[test]
  fn distance_is_symmetric() {
    let a = hex!(0, 0);
    let b = hex!(2, -1);
    assert_eq!(a.distance(b), 2);
    assert_eq!(b.distance(a), 2);
  }

  #[test]
  fn neighbors_are_at_distance_one() {
    let h = hex!(4, 2);
    for n in h.neighbors().iter() {
      assert_eq!(h.distance(*n), 1);
      assert!(h.is_neighbor(*n));
    }
  }

  #[test]
  fn six_rotations_return_to_start() {
    let v = hex!(1, -2);
    let mut r = v;
    for _ in 0..6 {
      r = r.rotated();
    }
    assert_eq!(r, v);
  }

  #[test]
  fn rotations_preserve_length() {
    let v = hex!(1, -2);
    let origin = hex!(0, 0);
    for r in v.rotations().iter() {
      assert_eq!(origin.distance(*r), origin.distance(v));
    }
  }
}

//! Precomputed, process-wide, allocation-free-at-query-time geometry
//! tables: rays, jumps, and pawn tables indexed by square.

use static_init::Lazy;

use crate::board::{Color, Square};

/// Ray directions, ordered the way the spec names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
    NorthEast = 4,
    SouthEast = 5,
    SouthWest = 6,
    NorthWest = 7,
}

impl Direction {
    const ORTHOGONAL: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];
    const DIAGONAL: [Direction; 4] =
        [Direction::NorthEast, Direction::SouthEast, Direction::SouthWest, Direction::NorthWest];

    const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
            Direction::NorthWest => (-1, 1),
        }
    }
}

const KNIGHT_DELTAS: [(i8, i8); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];

const KING_DELTAS: [(i8, i8); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

/// A ray in one direction away from a source square, nearest square first.
pub type Ray = Vec<Square>;

pub struct Geometry {
    orthogonal_rays: [[Ray; 4]; 64],
    diagonal_rays: [[Ray; 4]; 64],
    knight_jumps: [Ray; 64],
    king_neighbors: [Ray; 64],
    /// Push targets for each color, one entry when the single push is
    /// available, two when starting from the home rank.
    pawn_pushes: [[Ray; 64]; 2],
    pawn_captures: [[Ray; 64]; 2],
}

impl Geometry {
    fn build() -> Self {
        let mut orthogonal_rays: [[Ray; 4]; 64] = std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));
        let mut diagonal_rays: [[Ray; 4]; 64] = std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));
        let mut knight_jumps: [Ray; 64] = std::array::from_fn(|_| Vec::new());
        let mut king_neighbors: [Ray; 64] = std::array::from_fn(|_| Vec::new());
        let mut pawn_pushes: [[Ray; 64]; 2] = std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));
        let mut pawn_captures: [[Ray; 64]; 2] = std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));

        for ix in 0..64u8 {
            let sq = Square::new(ix);

            for (slot, dir) in Direction::ORTHOGONAL.iter().enumerate() {
                orthogonal_rays[ix as usize][slot] = cast_ray(sq, *dir);
            }
            for (slot, dir) in Direction::DIAGONAL.iter().enumerate() {
                diagonal_rays[ix as usize][slot] = cast_ray(sq, *dir);
            }

            knight_jumps[ix as usize] =
                KNIGHT_DELTAS.iter().filter_map(|&(df, dr)| sq.offset(df, dr)).collect();
            king_neighbors[ix as usize] =
                KING_DELTAS.iter().filter_map(|&(df, dr)| sq.offset(df, dr)).collect();

            for color in [Color::White, Color::Black] {
                let dir = color.pawn_dir();
                let mut pushes = Vec::new();
                if let Some(one) = sq.offset(0, dir) {
                    pushes.push(one);
                    if sq.rank() == color.pawn_home_rank() {
                        if let Some(two) = sq.offset(0, 2 * dir) {
                            pushes.push(two);
                        }
                    }
                }
                pawn_pushes[color.ix()][ix as usize] = pushes;

                pawn_captures[color.ix()][ix as usize] =
                    [sq.offset(-1, dir), sq.offset(1, dir)].into_iter().flatten().collect();
            }
        }

        Self {
            orthogonal_rays,
            diagonal_rays,
            knight_jumps,
            king_neighbors,
            pawn_pushes,
            pawn_captures,
        }
    }

    #[inline]
    pub fn orthogonal_rays(&self, sq: Square) -> &[Ray; 4] {
        &self.orthogonal_rays[sq.ix()]
    }

    #[inline]
    pub fn diagonal_rays(&self, sq: Square) -> &[Ray; 4] {
        &self.diagonal_rays[sq.ix()]
    }

    #[inline]
    pub fn knight_jumps(&self, sq: Square) -> &[Square] {
        &self.knight_jumps[sq.ix()]
    }

    #[inline]
    pub fn king_neighbors(&self, sq: Square) -> &[Square] {
        &self.king_neighbors[sq.ix()]
    }

    #[inline]
    pub fn pawn_pushes(&self, color: Color, sq: Square) -> &[Square] {
        &self.pawn_pushes[color.ix()][sq.ix()]
    }

    #[inline]
    pub fn pawn_captures(&self, color: Color, sq: Square) -> &[Square] {
        &self.pawn_captures[color.ix()][sq.ix()]
    }
}

fn cast_ray(from: Square, dir: Direction) -> Ray {
    let (df, dr) = dir.delta();
    let mut ray = Vec::new();
    let mut cur = from;
    while let Some(next) = cur.offset(df, dr) {
        ray.push(next);
        cur = next;
    }
    ray
}

pub static GEOMETRY: Lazy<Geometry> = Lazy::new(Geometry::build);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_two_orthogonal_rays() {
        let rays = GEOMETRY.orthogonal_rays(Square::A1);
        let non_empty = rays.iter().filter(|r| !r.is_empty()).count();
        assert_eq!(non_empty, 2);
    }

    #[test]
    fn knight_in_corner_has_two_jumps() {
        assert_eq!(GEOMETRY.knight_jumps(Square::A1).len(), 2);
    }

    #[test]
    fn pawn_home_rank_has_two_pushes() {
        assert_eq!(GEOMETRY.pawn_pushes(Color::White, Square::from_file_rank(4, 1)).len(), 2);
        assert_eq!(GEOMETRY.pawn_pushes(Color::White, Square::from_file_rank(4, 2)).len(), 1);
    }
}

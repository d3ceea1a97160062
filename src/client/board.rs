//! Local Board
//!
//! The player's private half of the commit-reveal protocol: ship layout,
//! one salt per cell, and the commitments derived from them. Nothing here
//! leaves the client except commitments and single-cell reveals.

use rand::{CryptoRng, Rng, RngCore};

use crate::authority::CellReveal;
use crate::core::coord::Coord;
use crate::proof::commitment::{
    commit_board, commitment_root, resolution_proof_hash, BoardCommitment, CellSecret, Commitment, CommitmentError, Salt,
};
use crate::{BOARD_CELLS, BOARD_SIZE};

/// Standard fleet: carrier, battleship, cruiser, submarine, destroyer.
pub const STANDARD_FLEET: [u32; 5] = [5, 4, 3, 3, 2];

/// A player's secret board.
#[derive(Clone, Debug)]
pub struct LocalBoard {
    cells: Vec<CellSecret>,
    commitment: BoardCommitment,
    ship_cells: u32,
}

impl LocalBoard {
    /// Build from explicit per-cell secrets.
    pub fn from_cells(cells: Vec<CellSecret>) -> Result<Self, CommitmentError> {
        let commitment = commit_board(&cells)?;
        let ship_cells = cells.iter().filter(|c| c.is_ship).count() as u32;
        Ok(Self {
            cells,
            commitment,
            ship_cells,
        })
    }

    /// Board with ships on exactly `ships` (duplicates ignored), fresh salts.
    pub fn with_ships<R: RngCore + CryptoRng>(rng: &mut R, ships: &[Coord]) -> Self {
        let cells: Vec<CellSecret> = Coord::all()
            .map(|coord| CellSecret {
                salt: Salt::random(rng),
                is_ship: ships.contains(&coord),
            })
            .collect();
        let ship_cells = cells.iter().filter(|c| c.is_ship).count() as u32;
        let commitments: Vec<Commitment> = cells.iter().map(CellSecret::commitment).collect();
        let root = commitment_root(&commitments);
        Self {
            cells,
            commitment: BoardCommitment { commitments, root },
            ship_cells,
        }
    }

    /// Random placement of [`STANDARD_FLEET`] with no overlaps.
    pub fn random_fleet<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut occupied = [false; BOARD_CELLS as usize];

        for &length in STANDARD_FLEET.iter() {
            loop {
                let horizontal: bool = rng.gen();
                let (max_x, max_y) = if horizontal {
                    (BOARD_SIZE - length, BOARD_SIZE - 1)
                } else {
                    (BOARD_SIZE - 1, BOARD_SIZE - length)
                };
                let x0 = rng.gen_range(0..=max_x);
                let y0 = rng.gen_range(0..=max_y);

                let span: Vec<usize> = (0..length)
                    .map(|i| {
                        let (x, y) = if horizontal { (x0 + i, y0) } else { (x0, y0 + i) };
                        (y * BOARD_SIZE + x) as usize
                    })
                    .collect();

                if span.iter().all(|&i| !occupied[i]) {
                    for i in span {
                        occupied[i] = true;
                    }
                    break;
                }
            }
        }

        let ships: Vec<Coord> = Coord::all().filter(|c| occupied[c.index() as usize]).collect();
        Self::with_ships(rng, &ships)
    }

    /// Secret for one cell.
    pub fn secret_at(&self, coord: Coord) -> CellSecret {
        self.cells[coord.index() as usize]
    }

    /// Whether a ship sits on `coord`.
    pub fn is_ship(&self, coord: Coord) -> bool {
        self.secret_at(coord).is_ship
    }

    /// Public reveal for `coord` (no signature attached).
    pub fn reveal(&self, coord: Coord) -> CellReveal {
        let secret = self.secret_at(coord);
        CellReveal {
            is_ship: secret.is_ship,
            salt: secret.salt,
            proof_hash: resolution_proof_hash(secret.is_ship, &secret.salt, coord),
            signature: None,
        }
    }

    /// Commitment for `coord`.
    pub fn commitment_at(&self, coord: Coord) -> Commitment {
        self.commitment.commitments[coord.index() as usize]
    }

    /// All commitments plus root.
    pub fn commitment(&self) -> &BoardCommitment {
        &self.commitment
    }

    /// Number of ship cells.
    pub fn ship_cells(&self) -> u32 {
        self.ship_cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::commitment::verify_cell_reveal;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_with_ships() {
        let mut rng = StdRng::seed_from_u64(1);
        let ship = Coord::new(4, 2).unwrap();
        let board = LocalBoard::with_ships(&mut rng, &[ship, ship]);

        assert_eq!(board.ship_cells(), 1);
        assert!(board.is_ship(ship));
        assert!(!board.is_ship(Coord::new(0, 0).unwrap()));
        assert_eq!(board.commitment().commitments.len(), BOARD_CELLS as usize);
    }

    #[test]
    fn test_random_fleet_has_seventeen_cells() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = LocalBoard::random_fleet(&mut rng);
            assert_eq!(board.ship_cells(), STANDARD_FLEET.iter().sum::<u32>());
            assert_eq!(board.ship_cells(), crate::DEFAULT_SHIP_CELLS);
        }
    }

    #[test]
    fn test_reveal_opens_commitment() {
        let mut rng = StdRng::seed_from_u64(2);
        let board = LocalBoard::random_fleet(&mut rng);
        for coord in Coord::all() {
            let reveal = board.reveal(coord);
            assert!(verify_cell_reveal(&board.commitment_at(coord), reveal.is_ship, &reveal.salt));
        }
    }

    #[test]
    fn test_from_cells_matches_with_ships() {
        let mut rng = StdRng::seed_from_u64(3);
        let board = LocalBoard::with_ships(&mut rng, &[Coord::new(0, 0).unwrap()]);
        let rebuilt = LocalBoard::from_cells((0..BOARD_CELLS).map(|i| board.cells[i as usize]).collect()).unwrap();
        assert_eq!(rebuilt.commitment(), board.commitment());
        assert!(LocalBoard::from_cells(Vec::new()).is_err());
    }
}

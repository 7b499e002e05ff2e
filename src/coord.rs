//! Coordinate-level cube representation.
//!
//! A coordinate is a lossy integer projection of the cubie cube, used as
//! an index into the precomputed move and pruning tables. The solved cube
//! is 0 in every coordinate except `ub_to_df` (114).

use crate::cubie::CubieCube;

/// 3^7 corner orientation patterns.
pub const N_TWIST: usize = 2187;
/// 2^11 edge orientation patterns.
pub const N_FLIP: usize = 2048;
/// C(12,4) positions of the four equator edges (phase 1).
pub const N_SLICE1: usize = 495;
/// 4! permutations of the equator edges within the slice (phase 2).
pub const N_SLICE2: usize = 24;
/// Permutation parities.
pub const N_PARITY: usize = 2;
/// 12!/8! positions+permutations of the four equator edges.
pub const N_FR_TO_BR: usize = 11_880;
/// 8!/2! permutations of the six corners URF..DLF.
pub const N_URF_TO_DLF: usize = 20_160;
/// 12!/9! permutations of a three-edge subset.
pub const N_UR_TO_UL: usize = 1320;
/// Same cardinality for the UB,DR,DF subset.
pub const N_UB_TO_DF: usize = 1320;
/// 8!/2! permutations of the six U/D edges in phase 2.
pub const N_UR_TO_DF: usize = 20_160;
/// Three-edge coordinate values with all three edges outside the slice;
/// only these can occur at the phase boundary, so the merge table covers
/// exactly this square.
pub const N_MERGE: usize = 336;
/// Faces times turn powers.
pub const N_MOVE: usize = 18;

/// How each of the 18 moves changes the permutation parity. Quarter turns
/// toggle it, half turns preserve it.
pub const PARITY_MOVE: [[u8; N_MOVE]; 2] = [
    [1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1],
    [0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0],
];

/// The full coordinate projection of a cube state.
///
/// Holds every coordinate the two-phase search tracks; the cube state is
/// recoverable only from the union of them.
#[derive(Clone, Copy, Debug)]
pub struct CoordCube {
    pub twist: u16,
    pub flip: u16,
    pub parity: u8,
    pub fr_to_br: u16,
    pub urf_to_dlf: u16,
    pub ur_to_ul: u16,
    pub ub_to_df: u16,
}

impl CoordCube {
    /// Projects a cubie cube onto all search coordinates.
    pub fn from_cubie(cube: &CubieCube) -> CoordCube {
        CoordCube {
            twist: cube.twist(),
            flip: cube.flip(),
            parity: cube.corner_parity(),
            fr_to_br: cube.fr_to_br(),
            urf_to_dlf: cube.urf_to_dlf(),
            ur_to_ul: cube.ur_to_ul(),
            ub_to_df: cube.ub_to_df(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solved_projection() {
        let c = CoordCube::from_cubie(&CubieCube::solved());
        assert_eq!(c.twist, 0);
        assert_eq!(c.flip, 0);
        assert_eq!(c.parity, 0);
        assert_eq!(c.fr_to_br, 0);
        assert_eq!(c.urf_to_dlf, 0);
        assert_eq!(c.ur_to_ul, 0);
        // UB, DR, DF sit in positions 3, 4, 5 of the solved cube
        assert_eq!(c.ub_to_df, 114);
    }

    #[test]
    fn test_parity_move_toggles_quarter_turns() {
        for mv in 0..N_MOVE {
            let toggles = mv % 3 != 1;
            assert_eq!(PARITY_MOVE[0][mv] == 1, toggles);
            assert_eq!(PARITY_MOVE[1][mv] == 0, toggles);
        }
    }
}

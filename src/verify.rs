//! Facelet-string validation.
//!
//! Checks run from cheapest to most structural: length and alphabet while
//! parsing, then color counts, then cubie conversion, then the group
//! invariants on the cubie level. The first failing check wins, so a
//! string with both a bad color count and a twisted corner reports the
//! color count.

use std::str::FromStr;

use crate::cubie::CubieCube;
use crate::facelet::FaceCube;
use crate::CubeError;

/// Validates a 54-facelet string and returns the cubie cube it denotes.
pub fn verify(facelets: &str) -> Result<CubieCube, CubeError> {
    let face_cube = FaceCube::from_str(facelets)?;
    if face_cube.color_counts() != [9; 6] {
        return Err(CubeError::WrongColorCounts);
    }
    let cube = face_cube.to_cubie()?;
    cube.verify_state()?;
    Ok(cube)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facelet::Face;

    const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

    #[test]
    fn test_solved_string_verifies() {
        let cube = verify(SOLVED).unwrap();
        assert_eq!(cube, CubieCube::solved());
    }

    #[test]
    fn test_scrambled_but_valid_string_verifies() {
        let mut cube = CubieCube::solved();
        for &(face, turns) in &[(Face::R, 1), (Face::U, 2), (Face::B, 3), (Face::D, 1)] {
            cube.apply_move(face, turns);
        }
        let rendered = FaceCube::from(&cube).to_string();
        assert_eq!(verify(&rendered), Ok(cube));
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(verify("UUU"), Err(CubeError::WrongLength(3)));
    }

    #[test]
    fn test_invalid_letter() {
        let mut s = String::from(SOLVED);
        s.replace_range(0..1, "X");
        assert_eq!(verify(&s), Err(CubeError::InvalidFacelet('X')));
    }

    #[test]
    fn test_color_count_imbalance() {
        // one D sticker recolored U: 10 U stickers, 8 D stickers
        let mut s = String::from(SOLVED);
        s.replace_range(28..29, "U");
        assert_eq!(verify(&s), Err(CubeError::WrongColorCounts));
    }

    #[test]
    fn test_twisted_corner() {
        let mut cube = CubieCube::solved();
        cube.co[0] = 1;
        let rendered = FaceCube::from(&cube).to_string();
        // counts still balance, the twist invariant fails
        assert_eq!(verify(&rendered), Err(CubeError::CornerTwistError));
    }

    #[test]
    fn test_flipped_edge() {
        let mut cube = CubieCube::solved();
        cube.eo[0] = 1;
        let rendered = FaceCube::from(&cube).to_string();
        assert_eq!(verify(&rendered), Err(CubeError::EdgeFlipError));
    }

    #[test]
    fn test_swapped_edge_pair_fails_parity() {
        let mut cube = CubieCube::solved();
        cube.ep.swap(0, 1);
        let rendered = FaceCube::from(&cube).to_string();
        assert_eq!(verify(&rendered), Err(CubeError::ParityError));
    }
}

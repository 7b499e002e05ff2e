//! Facelet-level cube representation.
//!
//! A cube is described by 54 stickers, 9 per face, in face order
//! U, R, F, D, L, B and row-major (top-left to bottom-right) within each
//! face. The center sticker of each face names its color, so the sticker
//! alphabet is the face alphabet {U, R, F, D, L, B}.

use std::fmt;
use std::str::FromStr;

use crate::cubie::{CubieCube, Corner, Edge};
use crate::CubeError;

/// A face of the cube, which doubles as a sticker color.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Face {
    U = 0,
    R = 1,
    F = 2,
    D = 3,
    L = 4,
    B = 5,
}

/// The six faces in facelet-string order.
pub const FACES: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

impl Face {
    /// Parses a single sticker letter.
    pub fn from_char(c: char) -> Result<Face, CubeError> {
        match c {
            'U' => Ok(Face::U),
            'R' => Ok(Face::R),
            'F' => Ok(Face::F),
            'D' => Ok(Face::D),
            'L' => Ok(Face::L),
            'B' => Ok(Face::B),
            _ => Err(CubeError::InvalidFacelet(c)),
        }
    }

    /// The sticker letter for this face.
    pub fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Sticker positions of the 8 corners, in corner order URF..DRB.
///
/// Each corner lists its three sticker indices clockwise, starting with
/// the sticker on the U or D face.
pub const CORNER_FACELETS: [[usize; 3]; 8] = [
    [8, 9, 20],   // URF: U9 R1 F3
    [6, 18, 38],  // UFL: U7 F1 L3
    [0, 36, 47],  // ULB: U1 L1 B3
    [2, 45, 11],  // UBR: U3 B1 R3
    [29, 26, 15], // DFR: D3 F9 R7
    [27, 44, 24], // DLF: D1 L9 F7
    [33, 53, 42], // DBL: D7 B9 L7
    [35, 17, 51], // DRB: D9 R9 B7
];

/// Sticker colors of the 8 corners on a solved cube, same order and
/// rotation as [`CORNER_FACELETS`].
pub const CORNER_COLORS: [[Face; 3]; 8] = [
    [Face::U, Face::R, Face::F],
    [Face::U, Face::F, Face::L],
    [Face::U, Face::L, Face::B],
    [Face::U, Face::B, Face::R],
    [Face::D, Face::F, Face::R],
    [Face::D, Face::L, Face::F],
    [Face::D, Face::B, Face::L],
    [Face::D, Face::R, Face::B],
];

/// Sticker positions of the 12 edges, in edge order UR..BR.
pub const EDGE_FACELETS: [[usize; 2]; 12] = [
    [5, 10],  // UR: U6 R2
    [7, 19],  // UF: U8 F2
    [3, 37],  // UL: U4 L2
    [1, 46],  // UB: U2 B2
    [32, 16], // DR: D6 R8
    [28, 25], // DF: D2 F8
    [30, 43], // DL: D4 L8
    [34, 52], // DB: D8 B8
    [23, 12], // FR: F6 R4
    [21, 41], // FL: F4 L6
    [50, 39], // BL: B6 L4
    [48, 14], // BR: B4 R6
];

/// Sticker colors of the 12 edges on a solved cube.
pub const EDGE_COLORS: [[Face; 2]; 12] = [
    [Face::U, Face::R],
    [Face::U, Face::F],
    [Face::U, Face::L],
    [Face::U, Face::B],
    [Face::D, Face::R],
    [Face::D, Face::F],
    [Face::D, Face::L],
    [Face::D, Face::B],
    [Face::F, Face::R],
    [Face::F, Face::L],
    [Face::B, Face::L],
    [Face::B, Face::R],
];

/// A cube described sticker by sticker.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FaceCube {
    pub facelets: [Face; 54],
}

impl FaceCube {
    /// The solved cube.
    pub fn solved() -> FaceCube {
        let mut facelets = [Face::U; 54];
        for (face_index, &face) in FACES.iter().enumerate() {
            for sticker in 0..9 {
                facelets[face_index * 9 + sticker] = face;
            }
        }
        FaceCube { facelets }
    }

    /// Counts how often each sticker color occurs.
    pub fn color_counts(&self) -> [usize; 6] {
        let mut counts = [0usize; 6];
        for &face in &self.facelets {
            counts[face as usize] += 1;
        }
        counts
    }

    /// Converts the sticker description to the cubie representation.
    ///
    /// Each corner is identified by rotating its three stickers until the
    /// U/D sticker comes first and matching the remaining two against the
    /// solved-cube templates; the rotation amount is the corner twist.
    /// Edges likewise match their two stickers directly (flip 0) or
    /// swapped (flip 1). A sticker combination matching no piece at all
    /// yields [`CubeError::MalformedFacelets`].
    pub fn to_cubie(&self) -> Result<CubieCube, CubeError> {
        let mut cube = CubieCube::solved();

        for corner in 0..8 {
            let slot = CORNER_FACELETS[corner];
            // rotate until the U or D sticker is first
            let mut ori = 0;
            while ori < 3 {
                let color = self.facelets[slot[ori]];
                if color == Face::U || color == Face::D {
                    break;
                }
                ori += 1;
            }
            if ori == 3 {
                return Err(CubeError::MalformedFacelets);
            }
            let col1 = self.facelets[slot[(ori + 1) % 3]];
            let col2 = self.facelets[slot[(ori + 2) % 3]];
            let piece = (0..8).find(|&j| {
                col1 == CORNER_COLORS[j][1] && col2 == CORNER_COLORS[j][2]
            });
            match piece {
                Some(j) => {
                    cube.cp[corner] = Corner::ALL[j];
                    cube.co[corner] = ori as u8;
                }
                None => return Err(CubeError::MalformedFacelets),
            }
        }

        for edge in 0..12 {
            let slot = EDGE_FACELETS[edge];
            let a = self.facelets[slot[0]];
            let b = self.facelets[slot[1]];
            let mut matched = false;
            for j in 0..12 {
                if a == EDGE_COLORS[j][0] && b == EDGE_COLORS[j][1] {
                    cube.ep[edge] = Edge::ALL[j];
                    cube.eo[edge] = 0;
                    matched = true;
                    break;
                }
                if a == EDGE_COLORS[j][1] && b == EDGE_COLORS[j][0] {
                    cube.ep[edge] = Edge::ALL[j];
                    cube.eo[edge] = 1;
                    matched = true;
                    break;
                }
            }
            if !matched {
                return Err(CubeError::MalformedFacelets);
            }
        }

        Ok(cube)
    }
}

impl From<&CubieCube> for FaceCube {
    /// Renders a cubie cube back to stickers (inverse of [`FaceCube::to_cubie`]).
    fn from(cube: &CubieCube) -> FaceCube {
        let mut fc = FaceCube::solved();
        for slot in 0..8 {
            let piece = cube.cp[slot] as usize;
            let ori = cube.co[slot] as usize;
            for n in 0..3 {
                fc.facelets[CORNER_FACELETS[slot][(n + ori) % 3]] = CORNER_COLORS[piece][n];
            }
        }
        for slot in 0..12 {
            let piece = cube.ep[slot] as usize;
            let ori = cube.eo[slot] as usize;
            for n in 0..2 {
                fc.facelets[EDGE_FACELETS[slot][(n + ori) % 2]] = EDGE_COLORS[piece][n];
            }
        }
        fc
    }
}

impl FromStr for FaceCube {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<FaceCube, CubeError> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 54 {
            return Err(CubeError::WrongLength(chars.len()));
        }
        let mut facelets = [Face::U; 54];
        for (i, &c) in chars.iter().enumerate() {
            facelets[i] = Face::from_char(c)?;
        }
        Ok(FaceCube { facelets })
    }
}

impl fmt::Display for FaceCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &face in &self.facelets {
            write!(f, "{}", face.letter())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubie::CubieCube;

    pub const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

    #[test]
    fn test_solved_string_parses() {
        let fc: FaceCube = SOLVED.parse().unwrap();
        assert_eq!(fc, FaceCube::solved());
        assert_eq!(fc.to_string(), SOLVED);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_eq!(
            "UUU".parse::<FaceCube>().unwrap_err(),
            CubeError::WrongLength(3)
        );
    }

    #[test]
    fn test_unknown_letter_rejected() {
        let mut s = String::from(SOLVED);
        s.replace_range(0..1, "X");
        assert_eq!(s.parse::<FaceCube>().unwrap_err(), CubeError::InvalidFacelet('X'));
    }

    #[test]
    fn test_solved_round_trip() {
        let fc: FaceCube = SOLVED.parse().unwrap();
        let cube = fc.to_cubie().unwrap();
        assert_eq!(cube, CubieCube::solved());
        assert_eq!(FaceCube::from(&cube), fc);
    }

    #[test]
    fn test_scrambled_round_trip() {
        // R U F applied to the solved cube
        let mut cube = CubieCube::solved();
        cube.apply_move(Face::R, 1);
        cube.apply_move(Face::U, 1);
        cube.apply_move(Face::F, 1);

        let fc = FaceCube::from(&cube);
        assert_eq!(fc.to_cubie().unwrap(), cube);
        assert_eq!(FaceCube::from(&fc.to_cubie().unwrap()).to_string(), fc.to_string());
    }

    #[test]
    fn test_u_turn_render() {
        let mut cube = CubieCube::solved();
        cube.apply_move(Face::U, 1);
        insta::assert_snapshot!(FaceCube::from(&cube).to_string());
    }

    #[test]
    fn test_malformed_corner_rejected() {
        // two identical colors on one corner can match no piece
        let mut s: Vec<char> = SOLVED.chars().collect();
        s[8] = 'R'; // URF corner now shows R R F
        let fc: FaceCube = s.iter().collect::<String>().parse().unwrap();
        assert_eq!(fc.to_cubie().unwrap_err(), CubeError::MalformedFacelets);
    }
}

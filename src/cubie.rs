//! Cubie-level cube representation and group operations.
//!
//! A cube state is a permutation of the 8 corner pieces with a twist in
//! {0,1,2} each, plus a permutation of the 12 edge pieces with a flip in
//! {0,1} each. Applying a face turn is multiplication by one of six fixed
//! permutations. All coordinate ranking/unranking used by the move and
//! pruning tables lives here as well.

use rand::Rng;

use crate::facelet::Face;
use crate::CubeError;

/// The 8 corner positions (and pieces), named by their three faces.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Corner {
    URF = 0,
    UFL = 1,
    ULB = 2,
    UBR = 3,
    DFR = 4,
    DLF = 5,
    DBL = 6,
    DRB = 7,
}

impl Corner {
    /// All corners in index order.
    pub const ALL: [Corner; 8] = [
        Corner::URF,
        Corner::UFL,
        Corner::ULB,
        Corner::UBR,
        Corner::DFR,
        Corner::DLF,
        Corner::DBL,
        Corner::DRB,
    ];
}

/// The 12 edge positions (and pieces), named by their two faces.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Edge {
    UR = 0,
    UF = 1,
    UL = 2,
    UB = 3,
    DR = 4,
    DF = 5,
    DL = 6,
    DB = 7,
    FR = 8,
    FL = 9,
    BL = 10,
    BR = 11,
}

impl Edge {
    /// All edges in index order.
    pub const ALL: [Edge; 12] = [
        Edge::UR,
        Edge::UF,
        Edge::UL,
        Edge::UB,
        Edge::DR,
        Edge::DF,
        Edge::DL,
        Edge::DB,
        Edge::FR,
        Edge::FL,
        Edge::BL,
        Edge::BR,
    ];
}

use Corner::*;
use Edge::*;

/// Cube state on the cubie level.
///
/// `cp[i]` is the corner piece sitting in position `i`, `co[i]` its twist;
/// `ep`/`eo` likewise for edges.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CubieCube {
    pub cp: [Corner; 8],
    pub co: [u8; 8],
    pub ep: [Edge; 12],
    pub eo: [u8; 12],
}

/// The six basic clockwise face turns as cube states, in face order
/// U, R, F, D, L, B. Double and counterclockwise turns are powers of these.
pub const MOVE_CUBES: [CubieCube; 6] = [
    // U
    CubieCube {
        cp: [UBR, URF, UFL, ULB, DFR, DLF, DBL, DRB],
        co: [0, 0, 0, 0, 0, 0, 0, 0],
        ep: [UB, UR, UF, UL, DR, DF, DL, DB, FR, FL, BL, BR],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // R
    CubieCube {
        cp: [DFR, UFL, ULB, URF, DRB, DLF, DBL, UBR],
        co: [2, 0, 0, 1, 1, 0, 0, 2],
        ep: [FR, UF, UL, UB, BR, DF, DL, DB, DR, FL, BL, UR],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // F
    CubieCube {
        cp: [UFL, DLF, ULB, UBR, URF, DFR, DBL, DRB],
        co: [1, 2, 0, 0, 2, 1, 0, 0],
        ep: [UR, FL, UL, UB, DR, FR, DL, DB, UF, DF, BL, BR],
        eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    },
    // D
    CubieCube {
        cp: [URF, UFL, ULB, UBR, DLF, DBL, DRB, DFR],
        co: [0, 0, 0, 0, 0, 0, 0, 0],
        ep: [UR, UF, UL, UB, DF, DL, DB, DR, FR, FL, BL, BR],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // L
    CubieCube {
        cp: [URF, ULB, DBL, UBR, DFR, UFL, DLF, DRB],
        co: [0, 1, 2, 0, 0, 2, 1, 0],
        ep: [UR, UF, BL, UB, DR, DF, FL, DB, FR, UL, DL, BR],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // B
    CubieCube {
        cp: [URF, UFL, UBR, DRB, DFR, DLF, ULB, DBL],
        co: [0, 0, 1, 2, 0, 0, 2, 1],
        ep: [UR, UF, UL, BR, DR, DF, DL, BL, FR, FL, UB, DB],
        eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    },
];

/// Binomial coefficient C(n, k) for the small values used in ranking.
pub(crate) fn c_nk(n: usize, mut k: usize) -> i32 {
    if n < k {
        return 0;
    }
    if k > n / 2 {
        k = n - k;
    }
    let mut s: i64 = 1;
    let mut i = n as i64;
    let mut j: i64 = 1;
    while i != (n - k) as i64 {
        s *= i;
        s /= j;
        i -= 1;
        j += 1;
    }
    s as i32
}

/// Rotates `arr[l..=r]` one step left (element at `l` moves to `r`).
fn rotate_left<T: Copy>(arr: &mut [T], l: usize, r: usize) {
    let temp = arr[l];
    for i in l..r {
        arr[i] = arr[i + 1];
    }
    arr[r] = temp;
}

/// Rotates `arr[l..=r]` one step right (element at `r` moves to `l`).
fn rotate_right<T: Copy>(arr: &mut [T], l: usize, r: usize) {
    let temp = arr[r];
    let mut i = r;
    while i > l {
        arr[i] = arr[i - 1];
        i -= 1;
    }
    arr[l] = temp;
}

impl CubieCube {
    /// The identity (solved) cube.
    pub fn solved() -> CubieCube {
        CubieCube {
            cp: Corner::ALL,
            co: [0; 8],
            ep: Edge::ALL,
            eo: [0; 12],
        }
    }

    /// Multiplies the corner part of `self` by `b` (applies `b` after `self`).
    pub fn corner_multiply(&mut self, b: &CubieCube) {
        let mut cp = [URF; 8];
        let mut co = [0u8; 8];
        for i in 0..8 {
            let from = b.cp[i] as usize;
            cp[i] = self.cp[from];
            co[i] = (self.co[from] + b.co[i]) % 3;
        }
        self.cp = cp;
        self.co = co;
    }

    /// Multiplies the edge part of `self` by `b`.
    pub fn edge_multiply(&mut self, b: &CubieCube) {
        let mut ep = [UR; 12];
        let mut eo = [0u8; 12];
        for i in 0..12 {
            let from = b.ep[i] as usize;
            ep[i] = self.ep[from];
            eo[i] = (self.eo[from] + b.eo[i]) % 2;
        }
        self.ep = ep;
        self.eo = eo;
    }

    /// Full group product: corners and edges.
    pub fn multiply(&mut self, b: &CubieCube) {
        self.corner_multiply(b);
        self.edge_multiply(b);
    }

    /// Applies a face turn, `turns` quarter turns clockwise (1..=3).
    pub fn apply_move(&mut self, face: Face, turns: u8) {
        let basic = &MOVE_CUBES[face as usize];
        for _ in 0..turns {
            self.multiply(basic);
        }
    }

    // ---------------------------------------------------------------
    // Orientation coordinates
    // ---------------------------------------------------------------

    /// Corner orientation coordinate: the first 7 twists as a base-3
    /// number. The 8th twist is fixed by the mod-3 invariant.
    pub fn twist(&self) -> u16 {
        let mut ret = 0u16;
        for i in 0..7 {
            ret = 3 * ret + self.co[i] as u16;
        }
        ret
    }

    /// Sets the corner orientations from a twist coordinate (0..2187).
    pub fn set_twist(&mut self, mut twist: u16) {
        let mut parity = 0u16;
        for i in (0..7).rev() {
            self.co[i] = (twist % 3) as u8;
            parity += twist % 3;
            twist /= 3;
        }
        self.co[7] = ((3 - parity % 3) % 3) as u8;
    }

    /// Edge orientation coordinate: the first 11 flips as a base-2 number.
    pub fn flip(&self) -> u16 {
        let mut ret = 0u16;
        for i in 0..11 {
            ret = 2 * ret + self.eo[i] as u16;
        }
        ret
    }

    /// Sets the edge orientations from a flip coordinate (0..2048).
    pub fn set_flip(&mut self, mut flip: u16) {
        let mut parity = 0u16;
        for i in (0..11).rev() {
            self.eo[i] = (flip % 2) as u8;
            parity += flip % 2;
            flip /= 2;
        }
        self.eo[11] = ((2 - parity % 2) % 2) as u8;
    }

    // ---------------------------------------------------------------
    // Permutation parity
    // ---------------------------------------------------------------

    /// Parity of the corner permutation.
    pub fn corner_parity(&self) -> u8 {
        let mut s = 0;
        for i in (1..8).rev() {
            for j in 0..i {
                if self.cp[j] > self.cp[i] {
                    s += 1;
                }
            }
        }
        (s % 2) as u8
    }

    /// Parity of the edge permutation. Equal to the corner parity on any
    /// physically reachable cube.
    pub fn edge_parity(&self) -> u8 {
        let mut s = 0;
        for i in (1..12).rev() {
            for j in 0..i {
                if self.ep[j] > self.ep[i] {
                    s += 1;
                }
            }
        }
        (s % 2) as u8
    }

    // ---------------------------------------------------------------
    // Permutation coordinates
    // ---------------------------------------------------------------

    /// Position and permutation of the four equator edges FR, FL, BL, BR
    /// (0..11880). Zero on the solved cube; below 24 exactly when all four
    /// sit in the equator slice.
    pub fn fr_to_br(&self) -> u16 {
        let mut a = 0i32;
        let mut x = 0usize;
        let mut edge4 = [FR; 4];
        // combination index over the edge positions, scanning right to left
        for j in (0..12).rev() {
            if self.ep[j] >= FR {
                a += c_nk(11 - j, x + 1);
                edge4[3 - x] = self.ep[j];
                x += 1;
            }
        }
        // rank the permutation of the four slice edges
        let mut b = 0i32;
        for j in (1..4).rev() {
            let mut k = 0;
            while edge4[j] as usize != j + 8 {
                rotate_left(&mut edge4, 0, j);
                k += 1;
            }
            b = (j as i32 + 1) * b + k;
        }
        (24 * a + b) as u16
    }

    /// Inverse of [`CubieCube::fr_to_br`]. Positions not holding a slice
    /// edge are filled with the remaining edges in order.
    pub fn set_fr_to_br(&mut self, idx: u16) {
        let mut b = (idx % 24) as i32;
        let mut a = (idx / 24) as i32;
        let mut slice_edge = [FR, FL, BL, BR];
        let other_edge = [UR, UF, UL, UB, DR, DF, DL, DB];
        self.ep = [DB; 12]; // invalidate
        for j in 1..4 {
            let mut k = b % (j as i32 + 1);
            b /= j as i32 + 1;
            while k > 0 {
                rotate_right(&mut slice_edge, 0, j);
                k -= 1;
            }
        }
        let mut x = 3i32;
        for j in 0..12 {
            if a - c_nk(11 - j, (x + 1) as usize) >= 0 {
                self.ep[j] = slice_edge[(3 - x) as usize];
                a -= c_nk(11 - j, (x + 1) as usize);
                x -= 1;
            }
        }
        let mut x = 0usize;
        for j in 0..12 {
            if self.ep[j] == DB {
                self.ep[j] = other_edge[x];
                x += 1;
            }
        }
    }

    /// Permutation of the six corners URF..DLF (0..20160). The last two
    /// corner positions are determined by parity.
    pub fn urf_to_dlf(&self) -> u16 {
        let mut a = 0i32;
        let mut x = 0usize;
        let mut corner6 = [URF; 6];
        for j in 0..8 {
            if self.cp[j] <= DLF {
                a += c_nk(j, x + 1);
                corner6[x] = self.cp[j];
                x += 1;
            }
        }
        let mut b = 0i32;
        for j in (1..6).rev() {
            let mut k = 0;
            while corner6[j] as usize != j {
                rotate_left(&mut corner6, 0, j);
                k += 1;
            }
            b = (j as i32 + 1) * b + k;
        }
        (720 * a + b) as u16
    }

    /// Inverse of [`CubieCube::urf_to_dlf`].
    pub fn set_urf_to_dlf(&mut self, idx: u16) {
        let mut b = (idx % 720) as i32;
        let mut a = (idx / 720) as i32;
        let mut corner6 = [URF, UFL, ULB, UBR, DFR, DLF];
        let other_corner = [DBL, DRB];
        self.cp = [DRB; 8]; // invalidate
        for j in 1..6 {
            let mut k = b % (j as i32 + 1);
            b /= j as i32 + 1;
            while k > 0 {
                rotate_right(&mut corner6, 0, j);
                k -= 1;
            }
        }
        let mut x = 5i32;
        for j in (0..8).rev() {
            if a - c_nk(j, (x + 1) as usize) >= 0 {
                self.cp[j] = corner6[x as usize];
                a -= c_nk(j, (x + 1) as usize);
                x -= 1;
            }
        }
        let mut x = 0usize;
        for j in 0..8 {
            if self.cp[j] == DRB {
                self.cp[j] = other_corner[x];
                x += 1;
            }
        }
    }

    /// Permutation of the six edges UR..DF over all 12 positions. Below
    /// 20160 exactly when none of them sits in the equator slice; this is
    /// the phase-2 edge coordinate.
    pub fn ur_to_df(&self) -> u32 {
        let mut a = 0i32;
        let mut x = 0usize;
        let mut edge6 = [UR; 6];
        for j in 0..12 {
            if self.ep[j] <= DF {
                a += c_nk(j, x + 1);
                edge6[x] = self.ep[j];
                x += 1;
            }
        }
        let mut b = 0i32;
        for j in (1..6).rev() {
            let mut k = 0;
            while edge6[j] as usize != j {
                rotate_left(&mut edge6, 0, j);
                k += 1;
            }
            b = (j as i32 + 1) * b + k;
        }
        (720 * a + b) as u32
    }

    /// Inverse of [`CubieCube::ur_to_df`] for phase-2 values (0..20160).
    pub fn set_ur_to_df(&mut self, idx: u32) {
        let mut b = (idx % 720) as i32;
        let mut a = (idx / 720) as i32;
        let mut edge6 = [UR, UF, UL, UB, DR, DF];
        let other_edge = [DL, DB, FR, FL, BL, BR];
        self.ep = [BR; 12]; // invalidate
        for j in 1..6 {
            let mut k = b % (j as i32 + 1);
            b /= j as i32 + 1;
            while k > 0 {
                rotate_right(&mut edge6, 0, j);
                k -= 1;
            }
        }
        let mut x = 5i32;
        for j in (0..12).rev() {
            if a - c_nk(j, (x + 1) as usize) >= 0 {
                self.ep[j] = edge6[x as usize];
                a -= c_nk(j, (x + 1) as usize);
                x -= 1;
            }
        }
        let mut x = 0usize;
        for j in 0..12 {
            if self.ep[j] == BR {
                self.ep[j] = other_edge[x];
                x += 1;
            }
        }
    }

    /// Permutation of the three edges UR, UF, UL (0..1320). Used only to
    /// seed the phase-2 edge coordinate at the phase boundary.
    pub fn ur_to_ul(&self) -> u16 {
        let mut a = 0i32;
        let mut x = 0usize;
        let mut edge3 = [UR; 3];
        for j in 0..12 {
            if self.ep[j] <= UL {
                a += c_nk(j, x + 1);
                edge3[x] = self.ep[j];
                x += 1;
            }
        }
        let mut b = 0i32;
        for j in (1..3).rev() {
            let mut k = 0;
            while edge3[j] as usize != j {
                rotate_left(&mut edge3, 0, j);
                k += 1;
            }
            b = (j as i32 + 1) * b + k;
        }
        (6 * a + b) as u16
    }

    /// Inverse of [`CubieCube::ur_to_ul`].
    pub fn set_ur_to_ul(&mut self, idx: u16) {
        let mut b = (idx % 6) as i32;
        let mut a = (idx / 6) as i32;
        let mut edge3 = [UR, UF, UL];
        self.ep = [BR; 12]; // invalidate
        for j in 1..3 {
            let mut k = b % (j as i32 + 1);
            b /= j as i32 + 1;
            while k > 0 {
                rotate_right(&mut edge3, 0, j);
                k -= 1;
            }
        }
        let mut x = 2i32;
        for j in (0..12).rev() {
            if a - c_nk(j, (x + 1) as usize) >= 0 {
                self.ep[j] = edge3[x as usize];
                a -= c_nk(j, (x + 1) as usize);
                x -= 1;
            }
        }
    }

    /// Permutation of the three edges UB, DR, DF (0..1320). The other
    /// phase-2 seed coordinate.
    pub fn ub_to_df(&self) -> u16 {
        let mut a = 0i32;
        let mut x = 0usize;
        let mut edge3 = [UB; 3];
        for j in 0..12 {
            if UB <= self.ep[j] && self.ep[j] <= DF {
                a += c_nk(j, x + 1);
                edge3[x] = self.ep[j];
                x += 1;
            }
        }
        let mut b = 0i32;
        for j in (1..3).rev() {
            let mut k = 0;
            while edge3[j] as usize != UB as usize + j {
                rotate_left(&mut edge3, 0, j);
                k += 1;
            }
            b = (j as i32 + 1) * b + k;
        }
        (6 * a + b) as u16
    }

    /// Inverse of [`CubieCube::ub_to_df`].
    pub fn set_ub_to_df(&mut self, idx: u16) {
        let mut b = (idx % 6) as i32;
        let mut a = (idx / 6) as i32;
        let mut edge3 = [UB, DR, DF];
        self.ep = [BR; 12]; // invalidate
        for j in 1..3 {
            let mut k = b % (j as i32 + 1);
            b /= j as i32 + 1;
            while k > 0 {
                rotate_right(&mut edge3, 0, j);
                k -= 1;
            }
        }
        let mut x = 2i32;
        for j in (0..12).rev() {
            if a - c_nk(j, (x + 1) as usize) >= 0 {
                self.ep[j] = edge3[x as usize];
                a -= c_nk(j, (x + 1) as usize);
                x -= 1;
            }
        }
    }

    /// Rank of the full corner permutation (0..40320).
    pub fn urf_to_dlb(&self) -> u32 {
        let mut perm = self.cp;
        let mut b = 0i64;
        for j in (1..8).rev() {
            let mut k = 0;
            while perm[j] as usize != j {
                rotate_left(&mut perm, 0, j);
                k += 1;
            }
            b = (j as i64 + 1) * b + k;
        }
        b as u32
    }

    /// Sets the full corner permutation from its rank.
    pub fn set_urf_to_dlb(&mut self, mut idx: u32) {
        let mut perm = Corner::ALL;
        for j in 1..8 {
            let mut k = idx % (j as u32 + 1);
            idx /= j as u32 + 1;
            while k > 0 {
                rotate_right(&mut perm, 0, j);
                k -= 1;
            }
        }
        self.cp = perm;
    }

    /// Rank of the full edge permutation (0..479001600).
    pub fn ur_to_br(&self) -> u32 {
        let mut perm = self.ep;
        let mut b = 0i64;
        for j in (1..12).rev() {
            let mut k = 0;
            while perm[j] as usize != j {
                rotate_left(&mut perm, 0, j);
                k += 1;
            }
            b = (j as i64 + 1) * b + k;
        }
        b as u32
    }

    /// Sets the full edge permutation from its rank.
    pub fn set_ur_to_br(&mut self, mut idx: u32) {
        let mut perm = Edge::ALL;
        for j in 1..12 {
            let mut k = idx % (j as u32 + 1);
            idx /= j as u32 + 1;
            while k > 0 {
                rotate_right(&mut perm, 0, j);
                k -= 1;
            }
        }
        self.ep = perm;
    }

    // ---------------------------------------------------------------
    // Structural validity
    // ---------------------------------------------------------------

    /// Checks that this state is physically reachable by face turns.
    ///
    /// Check order matches the error enumeration: edge permutation, edge
    /// flip sum, corner permutation, corner twist sum, permutation parity
    /// agreement. The first violated check wins.
    pub fn verify_state(&self) -> Result<(), CubeError> {
        let mut edge_count = [0u8; 12];
        for &e in &self.ep {
            edge_count[e as usize] += 1;
        }
        if edge_count.iter().any(|&c| c != 1) {
            return Err(CubeError::BadEdgePermutation);
        }
        if self.eo.iter().map(|&o| o as u32).sum::<u32>() % 2 != 0 {
            return Err(CubeError::EdgeFlipError);
        }
        let mut corner_count = [0u8; 8];
        for &c in &self.cp {
            corner_count[c as usize] += 1;
        }
        if corner_count.iter().any(|&c| c != 1) {
            return Err(CubeError::BadCornerPermutation);
        }
        if self.co.iter().map(|&o| o as u32).sum::<u32>() % 3 != 0 {
            return Err(CubeError::CornerTwistError);
        }
        if self.edge_parity() != self.corner_parity() {
            return Err(CubeError::ParityError);
        }
        Ok(())
    }
}

/// Generates a uniformly random reachable cube state.
///
/// Orientations and permutations are drawn independently; permutation
/// pairs are redrawn until corner and edge parity agree.
pub fn random_cube<R: Rng + ?Sized>(rng: &mut R) -> CubieCube {
    let mut cube = CubieCube::solved();
    cube.set_flip(rng.random_range(0..2048));
    cube.set_twist(rng.random_range(0..2187));
    loop {
        cube.set_urf_to_dlb(rng.random_range(0..40_320));
        cube.set_ur_to_br(rng.random_range(0..479_001_600));
        if cube.edge_parity() == cube.corner_parity() {
            break;
        }
    }
    cube
}

//! The two-phase IDA* search.
//!
//! Phase 1 drives an arbitrary cube into the subgroup H (orientations
//! solved, equator edges in the equator) under all 18 moves; phase 2
//! finishes inside H using the ten subgroup-preserving moves. Both phases
//! are iterative-deepening searches over fixed-size frame arrays — no
//! recursion, so the timeout can be polled cheaply at move expansions and
//! at every depth boundary.

use std::fmt;
use std::time::{Duration, Instant};

use crate::coord::{CoordCube, PARITY_MOVE};
use crate::cubie::CubieCube;
use crate::facelet::{Face, FACES};
use crate::tables::Tables;
use crate::verify;
use crate::CubeError;

/// Frame arrays cover phase-1 plus phase-2 moves; depths are clamped so
/// the total can never outgrow them.
const MAX_FRAMES: usize = 32;

/// Check the wall clock once per this many node expansions.
const NODES_PER_CLOCK_CHECK: u64 = 8192;

/// One face turn of the solution, `turns` quarter turns clockwise.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Move {
    pub face: Face,
    pub turns: u8,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.turns {
            1 => write!(f, "{}", self.face),
            2 => write!(f, "{}2", self.face),
            _ => write!(f, "{}'", self.face),
        }
    }
}

/// Search budget and output options.
#[derive(Clone, Copy, Debug)]
pub struct SolveOptions {
    /// Upper bound on the total move count tried (clamped to 30).
    pub max_depth: u8,
    /// Wall-clock budget for the whole search.
    pub timeout: Duration,
    /// Insert a `.` marker between the phase-1 and phase-2 moves of the
    /// rendered solution string.
    pub use_separator: bool,
}

impl Default for SolveOptions {
    fn default() -> SolveOptions {
        SolveOptions {
            max_depth: 22,
            timeout: Duration::from_millis(6000),
            use_separator: false,
        }
    }
}

/// A found solution with its phase split and timing.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Moves in execution order; the first `phase1_len` belong to phase 1.
    pub moves: Vec<Move>,
    pub phase1_len: usize,
    pub elapsed: Duration,
}

impl Solution {
    /// Number of phase-2 moves.
    pub fn phase2_len(&self) -> usize {
        self.moves.len() - self.phase1_len
    }

    /// The move string with a `.` marking the phase boundary.
    pub fn separated_string(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.moves.len() + 1);
        for (i, mv) in self.moves.iter().enumerate() {
            if i == self.phase1_len {
                parts.push(".".to_string());
            }
            parts.push(mv.to_string());
        }
        if self.phase1_len == self.moves.len() {
            parts.push(".".to_string());
        }
        parts.join(" ")
    }

    /// Human-readable account of the search result.
    pub fn diagnostics(&self) -> String {
        format!(
            "phase 1: {} moves, phase 2: {} moves, {} total, solved in {} ms",
            self.phase1_len,
            self.phase2_len(),
            self.moves.len(),
            self.elapsed.as_millis()
        )
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.moves.iter().map(Move::to_string).collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// What the search produced. Exhaustion is an expected outcome, not an
/// error: the caller may retry with a larger budget.
#[derive(Clone, Debug)]
pub enum SolveOutcome {
    Solved(Solution),
    /// The depth bound was exhausted before a solution appeared.
    NoSolutionWithinBudget,
    /// The wall clock ran out first; retrying with more time may succeed.
    Timeout,
}

impl SolveOutcome {
    /// The solution, if one was found.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Verifies a facelet string and searches for a solution.
pub fn solve(
    facelets: &str,
    tables: &Tables,
    options: &SolveOptions,
) -> Result<SolveOutcome, CubeError> {
    let cube = verify::verify(facelets)?;
    Ok(solve_cubie(&cube, tables, options))
}

/// Searches from an already validated cubie cube.
pub fn solve_cubie(cube: &CubieCube, tables: &Tables, options: &SolveOptions) -> SolveOutcome {
    let start = Instant::now();

    if *cube == CubieCube::solved() {
        return SolveOutcome::Solved(Solution {
            moves: Vec::new(),
            phase1_len: 0,
            elapsed: start.elapsed(),
        });
    }

    let max_depth = i32::from(options.max_depth).min(MAX_FRAMES as i32 - 2);
    let mut search = Search::new(tables, CoordCube::from_cubie(cube), start, options.timeout);
    search.run(max_depth)
}

/// Outcome of one phase-2 attempt below a fixed phase-1 solution.
enum Phase2 {
    Found(i32),
    NotFound,
    TimedOut,
}

/// Frame state of the iterative search. Index `n` is the current depth in
/// the move sequence; coordinate arrays hold the value *after* the move
/// at each index was applied.
struct Search<'a> {
    tables: &'a Tables,
    axis: [i32; MAX_FRAMES],
    power: [i32; MAX_FRAMES],
    flip: [u16; MAX_FRAMES],
    twist: [u16; MAX_FRAMES],
    slice1: [u16; MAX_FRAMES],
    parity: [u8; MAX_FRAMES],
    urf_to_dlf: [u16; MAX_FRAMES],
    fr_to_br: [u16; MAX_FRAMES],
    ur_to_ul: [u16; MAX_FRAMES],
    ub_to_df: [u16; MAX_FRAMES],
    ur_to_df: [u16; MAX_FRAMES],
    min_dist_phase1: [u8; MAX_FRAMES],
    min_dist_phase2: [u8; MAX_FRAMES],
    start: Instant,
    timeout: Duration,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(tables: &'a Tables, coord: CoordCube, start: Instant, timeout: Duration) -> Search<'a> {
        let mut search = Search {
            tables,
            axis: [0; MAX_FRAMES],
            power: [0; MAX_FRAMES],
            flip: [0; MAX_FRAMES],
            twist: [0; MAX_FRAMES],
            slice1: [0; MAX_FRAMES],
            parity: [0; MAX_FRAMES],
            urf_to_dlf: [0; MAX_FRAMES],
            fr_to_br: [0; MAX_FRAMES],
            ur_to_ul: [0; MAX_FRAMES],
            ub_to_df: [0; MAX_FRAMES],
            ur_to_df: [0; MAX_FRAMES],
            min_dist_phase1: [0; MAX_FRAMES],
            min_dist_phase2: [0; MAX_FRAMES],
            start,
            timeout,
            nodes: 0,
        };
        search.flip[0] = coord.flip;
        search.twist[0] = coord.twist;
        search.slice1[0] = coord.fr_to_br / 24;
        search.parity[0] = coord.parity;
        search.urf_to_dlf[0] = coord.urf_to_dlf;
        search.fr_to_br[0] = coord.fr_to_br;
        search.ur_to_ul[0] = coord.ur_to_ul;
        search.ub_to_df[0] = coord.ub_to_df;
        search
    }

    fn clock_exhausted(&self) -> bool {
        self.start.elapsed() >= self.timeout
    }

    /// Counts one expansion and polls the clock at a bounded rate.
    fn expansion_timed_out(&mut self) -> bool {
        self.nodes += 1;
        self.nodes % NODES_PER_CLOCK_CHECK == 0 && self.clock_exhausted()
    }

    /// Phase-1 iterative deepening; calls into phase 2 whenever a
    /// sequence ends exactly on the subgroup.
    fn run(&mut self, max_depth: i32) -> SolveOutcome {
        let mut n: usize = 0;
        let mut busy = false;
        let mut depth_phase1: i32 = 1;

        self.axis[0] = 0;
        self.power[0] = 0;
        self.min_dist_phase1[1] = 1; // nonzero, so depth 1 starts by expanding

        loop {
            // advance to the next node in depth-first order
            loop {
                if depth_phase1 - n as i32 > self.min_dist_phase1[n + 1] as i32 && !busy {
                    // budget left below this node: deepen, starting on an
                    // axis different from the predecessor's
                    let prev = self.axis[n];
                    n += 1;
                    self.axis[n] = if prev == 0 || prev == 3 { 1 } else { 0 };
                    self.power[n] = 1;
                } else {
                    self.power[n] += 1;
                    if self.power[n] > 3 {
                        // powers exhausted: advance the axis, skipping
                        // same-face repeats and non-canonical U/D, R/L,
                        // F/B orders
                        loop {
                            self.axis[n] += 1;
                            if self.axis[n] > 5 {
                                if n == 0 {
                                    if self.clock_exhausted() {
                                        return SolveOutcome::Timeout;
                                    }
                                    if depth_phase1 >= max_depth {
                                        return SolveOutcome::NoSolutionWithinBudget;
                                    }
                                    depth_phase1 += 1;
                                    self.axis[0] = 0;
                                    self.power[0] = 1;
                                    busy = false;
                                    break;
                                }
                                n -= 1;
                                busy = true;
                                break;
                            }
                            self.power[n] = 1;
                            busy = false;
                            if n == 0
                                || (self.axis[n - 1] != self.axis[n]
                                    && self.axis[n - 1] - 3 != self.axis[n])
                            {
                                break;
                            }
                        }
                    } else {
                        busy = false;
                    }
                }
                if !busy {
                    break;
                }
            }

            // apply the chosen move on the phase-1 coordinates
            let mv = (3 * self.axis[n] + self.power[n] - 1) as usize;
            self.flip[n + 1] = self.tables.flip_move(self.flip[n], mv);
            self.twist[n + 1] = self.tables.twist_move(self.twist[n], mv);
            self.slice1[n + 1] = self.tables.slice1_move(self.slice1[n], mv);
            self.min_dist_phase1[n + 1] = self
                .tables
                .slice_flip_prune(self.slice1[n + 1], self.flip[n + 1])
                .max(
                    self.tables
                        .slice_twist_prune(self.slice1[n + 1], self.twist[n + 1]),
                );

            if self.expansion_timed_out() {
                return SolveOutcome::Timeout;
            }

            if self.min_dist_phase1[n + 1] == 0 && n as i32 >= depth_phase1 - 5 {
                // inside H; block deepening straight through the subgroup
                self.min_dist_phase1[n + 1] = 10;
                if n as i32 == depth_phase1 - 1 {
                    match self.phase2(depth_phase1, max_depth) {
                        Phase2::Found(total) => {
                            let dp1 = depth_phase1 as usize;
                            // reject a phase-2 start on the phase-1 end axis
                            if total == depth_phase1
                                || (self.axis[dp1 - 1] != self.axis[dp1]
                                    && self.axis[dp1 - 1] != self.axis[dp1] + 3)
                            {
                                return SolveOutcome::Solved(
                                    self.build_solution(total as usize, dp1),
                                );
                            }
                        }
                        Phase2::NotFound => {}
                        Phase2::TimedOut => return SolveOutcome::Timeout,
                    }
                }
            }
        }
    }

    /// Phase-2 search below the phase-1 sequence currently in the frames.
    fn phase2(&mut self, depth_phase1: i32, max_depth: i32) -> Phase2 {
        let dp1 = depth_phase1 as usize;
        let max_depth_phase2 = 10.min(max_depth - depth_phase1);

        // roll the phase-2 coordinates forward along the phase-1 moves
        for i in 0..dp1 {
            let mv = (3 * self.axis[i] + self.power[i] - 1) as usize;
            self.urf_to_dlf[i + 1] = self.tables.urf_to_dlf_move(self.urf_to_dlf[i], mv);
            self.fr_to_br[i + 1] = self.tables.fr_to_br_move(self.fr_to_br[i], mv);
            self.parity[i + 1] = PARITY_MOVE[self.parity[i] as usize][mv];
        }
        let d1 = self.tables.slice_urf_to_dlf_parity_prune(
            self.fr_to_br[dp1] % 24,
            self.urf_to_dlf[dp1],
            self.parity[dp1],
        );
        if i32::from(d1) > max_depth_phase2 {
            return Phase2::NotFound;
        }

        for i in 0..dp1 {
            let mv = (3 * self.axis[i] + self.power[i] - 1) as usize;
            self.ur_to_ul[i + 1] = self.tables.ur_to_ul_move(self.ur_to_ul[i], mv);
            self.ub_to_df[i + 1] = self.tables.ub_to_df_move(self.ub_to_df[i], mv);
        }
        self.ur_to_df[dp1] = self
            .tables
            .merge_ur_to_df(self.ur_to_ul[dp1], self.ub_to_df[dp1]);
        let d2 = self.tables.slice_ur_to_df_parity_prune(
            self.fr_to_br[dp1] % 24,
            self.ur_to_df[dp1],
            self.parity[dp1],
        );
        if i32::from(d2) > max_depth_phase2 {
            return Phase2::NotFound;
        }

        self.min_dist_phase2[dp1] = d1.max(d2);
        if self.min_dist_phase2[dp1] == 0 {
            // phase 1 landed on the solved cube
            return Phase2::Found(depth_phase1);
        }

        // IDA* inside H; quarter turns only on U/D, half turns elsewhere
        let mut depth_phase2: i32 = 1;
        let mut n = dp1;
        let mut busy = false;
        self.axis[dp1] = 0;
        self.power[dp1] = 0;
        self.min_dist_phase2[n + 1] = 1;

        loop {
            loop {
                if depth_phase1 + depth_phase2 - n as i32 > self.min_dist_phase2[n + 1] as i32
                    && !busy
                {
                    let prev = self.axis[n];
                    n += 1;
                    if prev == 0 || prev == 3 {
                        self.axis[n] = 1;
                        self.power[n] = 2;
                    } else {
                        self.axis[n] = 0;
                        self.power[n] = 1;
                    }
                } else {
                    let exhausted = if self.axis[n] == 0 || self.axis[n] == 3 {
                        self.power[n] += 1;
                        self.power[n] > 3
                    } else {
                        self.power[n] += 2;
                        self.power[n] > 3
                    };
                    if exhausted {
                        loop {
                            self.axis[n] += 1;
                            if self.axis[n] > 5 {
                                if n == dp1 {
                                    if self.clock_exhausted() {
                                        return Phase2::TimedOut;
                                    }
                                    if depth_phase2 >= max_depth_phase2 {
                                        return Phase2::NotFound;
                                    }
                                    depth_phase2 += 1;
                                    self.axis[n] = 0;
                                    self.power[n] = 1;
                                    busy = false;
                                    break;
                                }
                                n -= 1;
                                busy = true;
                                break;
                            }
                            self.power[n] = if self.axis[n] == 0 || self.axis[n] == 3 {
                                1
                            } else {
                                2
                            };
                            busy = false;
                            if n == dp1
                                || (self.axis[n - 1] != self.axis[n]
                                    && self.axis[n - 1] - 3 != self.axis[n])
                            {
                                break;
                            }
                        }
                    } else {
                        busy = false;
                    }
                }
                if !busy {
                    break;
                }
            }

            let mv = (3 * self.axis[n] + self.power[n] - 1) as usize;
            self.urf_to_dlf[n + 1] = self.tables.urf_to_dlf_move(self.urf_to_dlf[n], mv);
            self.fr_to_br[n + 1] = self.tables.fr_to_br_move(self.fr_to_br[n], mv);
            self.parity[n + 1] = PARITY_MOVE[self.parity[n] as usize][mv];
            self.ur_to_df[n + 1] = self.tables.ur_to_df_move(self.ur_to_df[n], mv);
            self.min_dist_phase2[n + 1] = self
                .tables
                .slice_ur_to_df_parity_prune(
                    self.fr_to_br[n + 1] % 24,
                    self.ur_to_df[n + 1],
                    self.parity[n + 1],
                )
                .max(self.tables.slice_urf_to_dlf_parity_prune(
                    self.fr_to_br[n + 1] % 24,
                    self.urf_to_dlf[n + 1],
                    self.parity[n + 1],
                ));

            if self.expansion_timed_out() {
                return Phase2::TimedOut;
            }
            if self.min_dist_phase2[n + 1] == 0 {
                break;
            }
        }
        Phase2::Found(depth_phase1 + depth_phase2)
    }

    fn build_solution(&self, total: usize, phase1_len: usize) -> Solution {
        let moves = (0..total)
            .map(|i| Move {
                face: FACES[self.axis[i] as usize],
                turns: self.power[i] as u8,
            })
            .collect();
        Solution {
            moves,
            phase1_len,
            elapsed: self.start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubie::random_cube;
    use crate::tables::test_tables;

    const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

    fn apply_solution(cube: &mut CubieCube, solution: &Solution) {
        for mv in &solution.moves {
            cube.apply_move(mv.face, mv.turns);
        }
    }

    fn scrambled(moves: &[(Face, u8)]) -> CubieCube {
        let mut cube = CubieCube::solved();
        for &(face, turns) in moves {
            cube.apply_move(face, turns);
        }
        cube
    }

    #[test]
    fn test_solved_cube_solves_to_empty_sequence() {
        let outcome = solve(SOLVED, test_tables(), &SolveOptions::default()).unwrap();
        let solution = outcome.solution().expect("solved cube must solve");
        assert!(solution.moves.is_empty());
        assert_eq!(solution.phase1_len, 0);
        assert_eq!(solution.to_string(), "");
    }

    #[test]
    fn test_single_u_turn_solves_in_one_move() {
        let cube = scrambled(&[(Face::U, 1)]);
        let outcome = solve_cubie(&cube, test_tables(), &SolveOptions::default());
        let solution = outcome.solution().expect("one quarter turn must solve");
        assert_eq!(
            solution.moves,
            vec![Move {
                face: Face::U,
                turns: 3
            }]
        );
        assert_eq!(solution.to_string(), "U'");
    }

    #[test]
    fn test_invalid_string_never_searches() {
        let mut s = String::from(SOLVED);
        // a D sticker turned into U: 10 U stickers, 8 D stickers
        s.replace_range(28..29, "U");
        let err = solve(&s, test_tables(), &SolveOptions::default()).unwrap_err();
        assert_eq!(err, CubeError::WrongColorCounts);
    }

    #[test]
    fn test_fixed_scrambles_solve_and_reapply() {
        let tables = test_tables();
        let scrambles: &[&[(Face, u8)]] = &[
            &[(Face::R, 1), (Face::U, 1), (Face::F, 1)],
            &[(Face::R, 1), (Face::U, 1), (Face::R, 3), (Face::U, 3)],
            &[
                (Face::U, 1),
                (Face::R, 2),
                (Face::F, 1),
                (Face::B, 3),
                (Face::L, 2),
                (Face::D, 1),
                (Face::F, 2),
                (Face::U, 3),
            ],
        ];
        for moves in scrambles {
            let mut cube = scrambled(moves);
            let outcome = solve_cubie(&cube, tables, &SolveOptions::default());
            let solution = outcome.solution().expect("scramble must solve");
            assert!(solution.moves.len() <= 22);
            apply_solution(&mut cube, solution);
            assert_eq!(cube, CubieCube::solved());
        }
    }

    #[test]
    fn test_random_cubes_solve_and_reapply() {
        let tables = test_tables();
        let mut rng = rand::rng();
        for _ in 0..5 {
            let mut cube = random_cube(&mut rng);
            let outcome = solve_cubie(&cube, tables, &SolveOptions::default());
            let solution = outcome.solution().expect("random valid cube must solve");
            assert!(solution.moves.len() <= 22);
            apply_solution(&mut cube, solution);
            assert_eq!(cube, CubieCube::solved());
        }
    }

    #[test]
    fn test_depth_budget_exhaustion() {
        // R U F has no solution in two moves
        let cube = scrambled(&[(Face::R, 1), (Face::U, 1), (Face::F, 1)]);
        let options = SolveOptions {
            max_depth: 2,
            ..SolveOptions::default()
        };
        let outcome = solve_cubie(&cube, test_tables(), &options);
        assert!(matches!(outcome, SolveOutcome::NoSolutionWithinBudget));
    }

    #[test]
    fn test_zero_time_budget_reports_timeout() {
        let cube = scrambled(&[
            (Face::R, 1),
            (Face::U, 1),
            (Face::F, 1),
            (Face::L, 1),
            (Face::D, 1),
            (Face::B, 1),
        ]);
        let options = SolveOptions {
            timeout: Duration::ZERO,
            ..SolveOptions::default()
        };
        let outcome = solve_cubie(&cube, test_tables(), &options);
        assert!(matches!(outcome, SolveOutcome::Timeout));
    }

    #[test]
    fn test_separator_marks_phase_boundary() {
        let mut cube = scrambled(&[
            (Face::F, 1),
            (Face::R, 1),
            (Face::U, 2),
            (Face::B, 3),
            (Face::L, 1),
        ]);
        let solution = solve_cubie(&cube, test_tables(), &SolveOptions::default());
        let solution = solution.solution().expect("scramble must solve");
        let separated = solution.separated_string();
        assert_eq!(separated.split_whitespace().filter(|t| *t == ".").count(), 1);
        // the marker is presentation only, the moves still solve the cube
        apply_solution(&mut cube, solution);
        assert_eq!(cube, CubieCube::solved());
    }

    #[test]
    fn test_concurrent_searches_share_tables() {
        let tables = test_tables();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    scope.spawn(move || {
                        let mut cube = CubieCube::solved();
                        cube.apply_move(FACES[i], 1);
                        cube.apply_move(FACES[(i + 2) % 6], 2);
                        let outcome = solve_cubie(&cube, tables, &SolveOptions::default());
                        let solution = outcome.solution().expect("must solve");
                        apply_solution(&mut cube, solution);
                        assert_eq!(cube, CubieCube::solved());
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });
    }

    #[test]
    fn test_diagnostics_reports_phase_lengths() {
        let cube = scrambled(&[(Face::R, 2), (Face::D, 1)]);
        let outcome = solve_cubie(&cube, test_tables(), &SolveOptions::default());
        let solution = outcome.solution().expect("must solve");
        let text = solution.diagnostics();
        assert!(text.contains("phase 1:"));
        assert!(text.contains("phase 2:"));
        assert!(text.contains(&format!("{} total", solution.moves.len())));
    }
}

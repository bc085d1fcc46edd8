// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The sequence manager: over-approximation sequences of blocking-cube
//! frames (O) and under-approximation sequences of discovered states (U).
//!
//! An Osequence approximates, per level `k`, the states that cannot reach
//! its target within `k` transition steps: a state is blocked at level `k`
//! when it satisfies some cube of frame `k`. Frames are only ever grown —
//! with subsumption maintenance so no cube implies another within a frame —
//! or truncated once a fixpoint level is found. Beyond the committed frames
//! each sequence keeps one pending frame, populated by failures of the
//! current round and committed as the next level when the round ends.

use crate::hashmap::HashMap;
use crate::state::StateId;
use aig::cube::{implies, Cube, Lit};
use std::fmt;

/// A set of blocking cubes at one level.
pub type Frame = Vec<Cube>;

/// One search direction. `Forward` explores predecessors of the violating
/// states (transition used backward, assumptions primed); `Backward`
/// explores successors of the initial states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Direction {
    /// From the violating states toward the initial states.
    Forward,
    /// From the initial states toward the violating states.
    Backward,
}

impl Direction {
    /// The other direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Index into per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }

    /// Does this direction prime its assumptions (and leave frame clauses
    /// unprimed)?
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// What an Osequence is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The property-violating states (the backward primary).
    Bad,
    /// The initial states (the forward primary).
    Init,
    /// One concretely discovered state (auxiliary, for the bidirectional
    /// exchange).
    State(StateId),
}

/// Identifier of an Osequence in the [`OseqStore`]. Never reused, so stale
/// activation-literal tables cannot alias a later sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OseqId(u32);

impl fmt::Display for OseqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

/// The result of inserting a cube into a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The cube went in, displacing `dropped` less general cubes.
    Added {
        /// How many existing cubes the new one displaced.
        dropped: usize,
    },
    /// An existing cube already covers the new one; nothing changed.
    Subsumed,
}

/// An ordered sequence of frames anchored to one target.
#[derive(Debug)]
pub struct Osequence {
    target: Target,
    direction: Direction,
    frames: Vec<Frame>,
    pending: Frame,
    /// Lowest level strengthened since the last invariant sweep; levels
    /// below it need no re-check.
    fresh_level: usize,
    disposed: bool,
}

impl Osequence {
    fn new(target: Target, direction: Direction, level0: Frame) -> Self {
        Osequence {
            target,
            direction,
            frames: vec![level0],
            pending: Frame::new(),
            fresh_level: 0,
            disposed: false,
        }
    }

    /// The anchor of this sequence.
    pub fn target(&self) -> Target {
        self.target
    }

    /// The priming convention of this sequence's solver clauses.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of committed frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frame has been committed (only possible after disposal).
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frame at `level`; `level == len()` addresses the pending frame.
    /// Anything beyond is a broken sequence invariant.
    pub fn frame(&self, level: usize) -> &Frame {
        if level < self.frames.len() {
            &self.frames[level]
        } else if level == self.frames.len() {
            &self.pending
        } else {
            panic!("frame level {level} does not exist (len {})", self.frames.len());
        }
    }

    /// Lowest level strengthened since the last invariant sweep.
    pub fn fresh_level(&self) -> usize {
        self.fresh_level
    }

    /// Is the latch cube blocked at `level` (satisfies some cube there)?
    pub fn blocked_in(&self, latches: &[Lit], level: usize) -> bool {
        self.frame(level).iter().any(|uc| implies(latches, uc))
    }

    /// First level in `min..=max` where the cube is not blocked; `max + 1`
    /// when blocked everywhere in the range (empty ranges return `min`).
    pub fn min_not_blocked(&self, latches: &[Lit], min: usize, max: isize) -> usize {
        let mut level = min;
        while (level as isize) <= max {
            if !self.blocked_in(latches, level) {
                break;
            }
            level += 1;
        }
        level
    }

    /// Insert a cube at `level` (the pending frame when `level == len()`),
    /// maintaining the subsumption invariant: drop existing cubes the new
    /// one generalizes, skip the insert when an existing cube already
    /// covers it.
    pub fn add_cube(&mut self, level: usize, cube: Cube) -> AddOutcome {
        if level < self.fresh_level {
            self.fresh_level = level;
        }
        let len = self.frames.len();
        let frame = if level < len {
            &mut self.frames[level]
        } else if level == len {
            &mut self.pending
        } else {
            panic!("cube added at level {level} beyond the pending frame (len {len})");
        };
        if frame.iter().any(|old| implies(&cube, old)) {
            return AddOutcome::Subsumed;
        }
        let before = frame.len();
        frame.retain(|old| !implies(old, &cube));
        let dropped = before - frame.len();
        frame.push(cube);
        AddOutcome::Added { dropped }
    }

    /// Commit the pending frame as the next level and start a fresh one.
    /// Returns the new top level.
    pub fn commit_pending(&mut self) -> usize {
        let frame = std::mem::take(&mut self.pending);
        self.frames.push(frame);
        self.frames.len() - 1
    }

    /// Keep only frames `0..level`: the fixpoint has been located.
    pub fn truncate(&mut self, level: usize) {
        self.frames.truncate(level);
        self.pending.clear();
    }

    /// Mark every level as seen by the invariant sweep.
    pub fn reset_fresh(&mut self) {
        self.fresh_level = self.frames.len();
    }

    /// Committed frames, for certificate emission.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// Owns every Osequence of a run; ids are never reused.
#[derive(Debug, Default)]
pub struct OseqStore {
    seqs: Vec<Osequence>,
}

impl OseqStore {
    /// Create a sequence with the given level-0 frame.
    pub fn alloc(&mut self, target: Target, direction: Direction, level0: Frame) -> OseqId {
        self.seqs.push(Osequence::new(target, direction, level0));
        OseqId(self.seqs.len() as u32 - 1)
    }

    /// Read access; disposed sequences are a protocol error.
    pub fn get(&self, id: OseqId) -> &Osequence {
        let o = &self.seqs[id.0 as usize];
        assert!(!o.disposed, "osequence {id} used after disposal");
        o
    }

    /// Write access; disposed sequences are a protocol error.
    pub fn get_mut(&mut self, id: OseqId) -> &mut Osequence {
        let o = &mut self.seqs[id.0 as usize];
        assert!(!o.disposed, "osequence {id} used after disposal");
        o
    }

    /// Drop the frames of a finished auxiliary sequence. Its activation
    /// literals stay allocated but are never asserted again.
    pub fn dispose(&mut self, id: OseqId) {
        let o = &mut self.seqs[id.0 as usize];
        o.frames.clear();
        o.pending.clear();
        o.disposed = true;
    }
}

/// Levels of discovered states, indexed by distance from the search's start
/// set.
pub type Usequence = Vec<Vec<StateId>>;

/// Per-direction predecessor links for counterexample reconstruction.
pub type Trail = HashMap<StateId, Option<StateId>>;

/// Insert a state at `level`, growing the level array, and record its trail
/// predecessor.
pub fn update_u(u: &mut Usequence, trail: &mut Trail, s: StateId, level: usize, prior: Option<StateId>) {
    while u.len() <= level {
        u.push(vec![]);
    }
    trail.insert(s, prior);
    u[level].push(s);
}

/// Remove a permanently blocked state and every state whose discovery chain
/// passes through it. Best-effort memory reclamation; correctness does not
/// depend on it.
pub fn evict_with_descendants(u: &mut Usequence, trail: &mut Trail, root: StateId) {
    let mut children: HashMap<StateId, Vec<StateId>> = HashMap::default();
    for (&child, &prior) in trail.iter() {
        if let Some(p) = prior {
            children.entry(p).or_default().push(child);
        }
    }
    let mut doomed = crate::hashmap::HashSet::default();
    let mut queue = vec![root];
    while let Some(s) = queue.pop() {
        if !doomed.insert(s) {
            continue;
        }
        if let Some(kids) = children.get(&s) {
            queue.extend(kids.iter().copied());
        }
    }
    for level in u.iter_mut() {
        level.retain(|s| !doomed.contains(s));
    }
    for s in &doomed {
        trail.swap_remove(s);
    }
}

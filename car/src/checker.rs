// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The bidirectional CAR search engine.
//!
//! Two search halves run in alternation. The backward half grows a
//! Usequence of states reachable from the initial states and strengthens an
//! Osequence targeting the bad states; the forward half grows a Usequence
//! of states that can reach a violation (its level 0 enumerated lazily from
//! the start solver) and strengthens an Osequence targeting the initial
//! states. Each round may first raise auxiliary obligations: states
//! discovered by the opposite half become targets of their own small
//! Osequences, and proving one unreachable lets the engine block it
//! permanently, while reaching one completes a counterexample through both
//! trails.

use crate::hashmap::{HashMap, HashSet};
use crate::heuristics::{intersection_hints, RotationState};
use crate::options::{Options, PickStrategy};
use crate::sequence::{
    evict_with_descendants, update_u, AddOutcome, Direction, Frame, OseqId, OseqStore, Target,
    Trail, Usequence,
};
use crate::solvers::{InvSolver, MainSolver, PartialSolver, StartSolver};
use crate::state::{StateArena, StateId};
use crate::witness::{Certificate, Outcome, Trace};
use aig::cube::{contains, var, Cube, Lit};
use aig::TransitionSystem;
use itertools::Itertools;
use solver::{CadicalSolver, IncrementalSolver};

/// One direction's share of the search state.
#[derive(Default)]
struct SearchHalf {
    u: Usequence,
    trail: Trail,
    /// Head of this direction's counterexample chain, once one is found.
    cex_start: Option<StateId>,
}

/// What one call to [`Checker::try_satisfy`] concluded.
enum TryResult {
    /// A full counterexample was found; the trail maps hold the chains.
    Cex,
    /// An obligation was vacuously safe (empty generalized core).
    SafeReported,
    /// Every obligation is blocked through the top frame; a new frame was
    /// committed.
    Exhausted,
    /// The query budget ran out.
    Limit,
}

/// The bidirectional CAR checker.
pub struct Checker<'a, S: IncrementalSolver = CadicalSolver> {
    sys: &'a TransitionSystem,
    opts: Options,
    arena: StateArena,
    /// Indexed by [`Direction::index`].
    halves: [SearchHalf; 2],
    oseqs: OseqStore,
    /// The backward primary (targets the bad states).
    onp: OseqId,
    /// The forward primary (targets the initial states).
    oi: OseqId,
    /// Auxiliary Osequence of each still-open opposite-direction state.
    so_map: HashMap<StateId, OseqId>,
    /// States proven unreachable and excluded from every future model.
    blocked: HashSet<StateId>,
    main: MainSolver<S>,
    start: StartSolver<S>,
    partial: PartialSolver<S>,
    rotation: RotationState,
    dir: Direction,
    init: StateId,
    queries: usize,
}

impl<'a, S: IncrementalSolver> Checker<'a, S> {
    /// Set up solvers, seed states and primary sequences.
    pub fn new(sys: &'a TransitionSystem, opts: Options) -> Self {
        let main = MainSolver::new(sys);
        let start = StartSolver::new(sys);
        let partial = PartialSolver::new(sys);

        let mut arena = StateArena::default();
        let init = arena.alloc(sys.initial_cube().clone(), Cube::new());
        let negp = arena.alloc_negated_property();

        let mut halves = [SearchHalf::default(), SearchHalf::default()];
        {
            let fh = &mut halves[Direction::Forward.index()];
            update_u(&mut fh.u, &mut fh.trail, negp, 0, None);
            let bh = &mut halves[Direction::Backward.index()];
            update_u(&mut bh.u, &mut bh.trail, init, 0, None);
        }

        let mut oseqs = OseqStore::default();
        let onp = oseqs.alloc(Target::Bad, Direction::Backward, Frame::new());
        let init_frame: Frame = sys.initial_cube().iter().map(|&l| vec![-l]).collect();
        let oi = oseqs.alloc(Target::Init, Direction::Forward, init_frame.clone());

        let mut rotation = RotationState::default();
        rotation.seed(sys.initial_cube().clone());

        let dir = opts.direction;
        let mut checker = Checker {
            sys,
            opts,
            arena,
            halves,
            oseqs,
            onp,
            oi,
            so_map: HashMap::default(),
            blocked: HashSet::default(),
            main,
            start,
            partial,
            rotation,
            dir,
            init,
            queries: 0,
        };
        checker
            .main
            .register_frame(sys, oi, 0, &init_frame, Direction::Forward);
        checker
    }

    /// Number of solver queries issued so far.
    pub fn num_queries(&self) -> usize {
        self.queries
    }

    /// Decide the property.
    pub fn check(&mut self) -> Outcome {
        if let Some(out) = self.trivial_check() {
            return out;
        }
        if let Some(out) = self.immediate_check() {
            return out;
        }
        // one probe of the start enumerator: if nothing satisfies the bad
        // predicate under the constraints, the property holds outright.
        // This also guarantees every later round processes at least one
        // obligation, so committed frames are never empty.
        self.queries += 1;
        if self.start.enumerate(self.sys).is_none() {
            log::info!("no state satisfies the bad predicate under the constraints");
            return Outcome::Safe { certificate: None };
        }
        self.start.reset();
        let mut rounds = 0usize;
        loop {
            if self.opts.max_rounds.is_some_and(|max| rounds >= max) {
                log::info!("round budget exhausted after {rounds} rounds");
                return Outcome::Unknown;
            }
            rounds += 1;
            let dir = self.dir;
            log::debug!("round {rounds}: {dir} search");
            if self.opts.bidirectional {
                if let Some(out) = self.auxiliary_obligations(dir) {
                    return out;
                }
            }
            let primary = self.primary(dir);
            match self.try_satisfy(dir, primary) {
                TryResult::Cex => {
                    return Outcome::Unsafe {
                        trace: self.reconstruct_trace(),
                    }
                }
                TryResult::SafeReported => return Outcome::Safe { certificate: None },
                TryResult::Limit => return Outcome::Unknown,
                TryResult::Exhausted => {}
            }
            if let Some(level) = self.invariant_found(primary) {
                self.oseqs.get_mut(primary).truncate(level);
                let o = self.oseqs.get(primary);
                return Outcome::Safe {
                    certificate: Some(Certificate {
                        direction: o.direction(),
                        frames: o.frames().to_vec(),
                    }),
                };
            }
            if self.opts.bidirectional {
                self.dir = dir.opposite();
            }
        }
    }

    fn primary(&self, dir: Direction) -> OseqId {
        match dir {
            Direction::Forward => self.oi,
            Direction::Backward => self.onp,
        }
    }

    fn budget_exhausted(&self) -> bool {
        self.opts.max_queries.is_some_and(|max| self.queries >= max)
    }

    /// Constant bad outputs need no search at all.
    fn trivial_check(&self) -> Option<Outcome> {
        let bad = self.sys.bad_lit();
        if bad == self.sys.true_var() {
            log::info!("bad output is constant true");
            let initial = self.sys.initial_cube().iter().map(|&l| l > 0).collect();
            Some(Outcome::Unsafe {
                trace: Trace {
                    initial,
                    inputs: vec![vec![false; self.sys.num_inputs()]],
                },
            })
        } else if bad == self.sys.false_var() {
            log::info!("bad output is constant false");
            Some(Outcome::Safe { certificate: None })
        } else {
            None
        }
    }

    /// Can the initial state trigger the violation outright? While it
    /// cannot, accumulate the distinct cores into level 0 of the bad-target
    /// sequence, rotating untouched initial literals to the front of the
    /// assumption to coax out further cores.
    fn immediate_check(&mut self) -> Option<Outcome> {
        let bad = self.sys.bad_lit();
        let init_latches = self.sys.initial_cube().clone();
        let mut assumption = init_latches.clone();
        let mut last_max = 0;
        let mut seen: HashSet<Cube> = HashSet::default();
        loop {
            self.queries += 1;
            if self.main.solve_with_bad(&assumption, bad) {
                let inputs = self.main.model_inputs(self.sys);
                let hit = self.arena.alloc(init_latches.clone(), inputs);
                let half = &mut self.halves[Direction::Backward.index()];
                half.trail.insert(hit, Some(self.init));
                half.cex_start = Some(hit);
                log::info!("the initial state violates the property");
                return Some(Outcome::Unsafe {
                    trace: self.reconstruct_trace(),
                });
            }
            let uc = self.main.conflict_without_bad(bad);
            if uc.is_empty() {
                log::info!("the bad output is unsatisfiable on its own");
                return Some(Outcome::Safe { certificate: None });
            }
            let max = var(*uc.last().expect("nonempty core"));
            if !seen.insert(uc.clone()) || max <= last_max {
                break;
            }
            last_max = max;
            self.add_uc(self.onp, 0, uc, Direction::Backward);
            let (mut beyond, touched): (Vec<Lit>, Vec<Lit>) =
                assumption.iter().copied().partition(|&l| var(l) > last_max);
            beyond.extend(touched);
            assumption = beyond;
        }
        None
    }

    /// Try to block every not-yet-blocked state the opposite direction has
    /// discovered. Returns a final outcome when one of the obligations
    /// crosses the search frontiers.
    fn auxiliary_obligations(&mut self, dir: Direction) -> Option<Outcome> {
        let opp = dir.opposite();
        let candidates: Vec<StateId> = {
            let u = &self.halves[opp.index()].u;
            let mut c = vec![];
            for level in (1..u.len()).rev() {
                c.extend(u[level].iter().rev().copied());
            }
            c
        };
        for s in candidates {
            if self.blocked.contains(&s) || !self.halves[opp.index()].trail.contains_key(&s) {
                continue;
            }
            // if this obligation crosses, s heads the opposite chain
            self.halves[opp.index()].cex_start = Some(s);
            let os = self.aux_oseq(s, dir);
            log::debug!("auxiliary obligation: {s} ({os}) against the {dir} search");
            match self.try_satisfy(dir, os) {
                TryResult::Cex => {
                    return Some(Outcome::Unsafe {
                        trace: self.reconstruct_trace(),
                    })
                }
                TryResult::Limit => return Some(Outcome::Unknown),
                TryResult::SafeReported => self.block_state(s, os, opp),
                TryResult::Exhausted => {
                    if self.invariant_found(os).is_some() {
                        self.block_state(s, os, opp);
                    }
                }
            }
        }
        self.halves[opp.index()].cex_start = None;
        None
    }

    /// The auxiliary sequence of `s`, reusing an open one: level 0 is the
    /// exact negation of `s`, one singleton cube per latch literal.
    fn aux_oseq(&mut self, s: StateId, dir: Direction) -> OseqId {
        if let Some(&os) = self.so_map.get(&s) {
            return os;
        }
        let frame: Frame = self.arena[s].latches.iter().map(|&l| vec![-l]).collect();
        let os = self.oseqs.alloc(Target::State(s), dir, frame.clone());
        self.main.register_frame(self.sys, os, 0, &frame, dir);
        self.so_map.insert(s, os);
        os
    }

    /// Permanently block a state proven unreachable: exclude its valuation
    /// from every future model, retire its auxiliary sequence, and evict it
    /// (with its trail descendants) from the sequence it lives in.
    fn block_state(&mut self, s: StateId, os: OseqId, home: Direction) {
        self.blocked.insert(s);
        let latches = self.arena[s].latches.clone();
        self.main.block_state(&latches);
        self.oseqs.dispose(os);
        self.so_map.swap_remove(&s);
        let half = &mut self.halves[home.index()];
        evict_with_descendants(&mut half.u, &mut half.trail, s);
        log::debug!("{s} proven unreachable and blocked ({} so far)", self.blocked.len());
    }

    /// The inner loop: drain the direction's Usequence through an explicit
    /// obligation stack against the target sequence `oid`.
    fn try_satisfy(&mut self, dir: Direction, oid: OseqId) -> TryResult {
        if dir.is_forward() {
            self.start.reset();
        }
        let snapshot: Vec<usize> = self.halves[dir.index()].u.iter().map(Vec::len).collect();
        let mut picker = Picker::new(snapshot, self.opts.pick);
        while let Some((missionary, state_level)) = self.pick_state(&mut picker, dir) {
            let top = self.oseqs.get(oid).len() as isize - 1;
            let mut stack: Vec<(StateId, usize, isize)> = vec![(missionary, state_level, top)];
            while let Some(&(s, src, dst)) = stack.last() {
                let (already_blocked, retry_level, committed) = {
                    let o = self.oseqs.get(oid);
                    let latches = &self.arena[s].latches;
                    let blocked = o.blocked_in(latches, (dst + 1) as usize);
                    let retry = if blocked {
                        o.min_not_blocked(latches, (dst + 2) as usize, o.len() as isize - 1)
                    } else {
                        0
                    };
                    (blocked, retry, o.len())
                };
                if already_blocked {
                    stack.pop();
                    if retry_level <= committed {
                        stack.push((s, src, retry_level as isize - 1));
                    }
                    continue;
                }
                if self.budget_exhausted() {
                    log::info!("query budget exhausted after {} queries", self.queries);
                    return TryResult::Limit;
                }
                if self.sat_assume(dir, oid, s, dst) {
                    if dst == -1 {
                        return TryResult::Cex;
                    }
                    let t = self.extract_state(dir, s);
                    {
                        let half = &mut self.halves[dir.index()];
                        update_u(&mut half.u, &mut half.trail, t, src + 1, Some(s));
                    }
                    let jump = {
                        let o = self.oseqs.get(oid);
                        o.min_not_blocked(&self.arena[t].latches, 0, dst - 1)
                    };
                    if (jump as isize) <= dst {
                        stack.push((t, src + 1, jump as isize - 1));
                    }
                } else {
                    stack.pop();
                    if self.update_o(dir, oid, dst, s) {
                        return TryResult::SafeReported;
                    }
                    let (retry_level, committed) = {
                        let o = self.oseqs.get(oid);
                        let latches = &self.arena[s].latches;
                        (
                            o.min_not_blocked(latches, (dst + 2) as usize, o.len() as isize - 1),
                            o.len(),
                        )
                    };
                    if retry_level <= committed {
                        stack.push((s, src, retry_level as isize - 1));
                    }
                }
            }
        }
        let o_dir = self.oseqs.get(oid).direction();
        let new_top = self.oseqs.get_mut(oid).commit_pending();
        let frame = self.oseqs.get(oid).frame(new_top).clone();
        {
            let o = self.oseqs.get(oid);
            log::debug!(
                "{oid}: committed frame {new_top}, shape [{}]",
                (0..o.len()).map(|l| o.frame(l).len()).join(", ")
            );
        }
        self.main.register_frame(self.sys, oid, new_top, &frame, o_dir);
        TryResult::Exhausted
    }

    /// Pull the next obligation seed from the Usequence. Hitting the
    /// negated-property pseudo-state enumerates a fresh start state instead
    /// (staying put until the enumeration round runs dry).
    fn pick_state(&mut self, picker: &mut Picker, dir: Direction) -> Option<(StateId, usize)> {
        loop {
            let (level, pos) = picker.peek()?;
            let sid = self.halves[dir.index()].u[level][pos];
            if self.arena[sid].negated_property {
                debug_assert!(dir.is_forward(), "the pseudo-state lives in the forward half");
                if let Some(fresh) = self.enumerate_start_state(dir) {
                    return Some((fresh, 0));
                }
                picker.advance();
                continue;
            }
            picker.advance();
            log::trace!("pick {sid} at level {level}");
            return Some((sid, level));
        }
    }

    /// One fresh start state from the enumerator, generalized when partial
    /// states are enabled, inserted at level 0 of the forward half.
    fn enumerate_start_state(&mut self, dir: Direction) -> Option<StateId> {
        self.queries += 1;
        let full = self.start.enumerate(self.sys)?;
        let ni = self.sys.num_inputs();
        let inputs: Cube = full[..ni].to_vec();
        let latches: Cube = full[ni..].to_vec();
        let sid = if self.opts.partial_states {
            self.queries += 1;
            match self.partial.generalize_start(self.sys, &full) {
                Some((generalized, _)) => self.arena.alloc(generalized, inputs),
                None => self.arena.alloc(latches, inputs),
            }
        } else {
            self.arena.alloc(latches, inputs)
        };
        let half = &mut self.halves[dir.index()];
        update_u(&mut half.u, &mut half.trail, sid, 0, None);
        log::trace!("enumerated start state {sid}");
        Some(sid)
    }

    /// One reachability query: is `s`, under direction-appropriate priming,
    /// consistent with frame `dst` of the target? Level −1 is the boundary
    /// case.
    fn sat_assume(&mut self, dir: Direction, oid: OseqId, s: StateId, dst: isize) -> bool {
        if dst < 0 {
            return self.last_check(dir, oid, s);
        }
        let level = dst as usize;
        let latches = self.arena[s].latches.clone();
        let mut hints: Vec<Cube> = vec![];
        if self.opts.hints.intersections > 0 {
            let o = self.oseqs.get(oid);
            hints.extend(intersection_hints(
                &latches,
                o.frame(level + 1),
                self.opts.hints.intersections,
            ));
        }
        if self.opts.hints.rotation {
            hints.extend(self.rotation.hints(&latches, level + 1));
        }
        self.queries += 1;
        let res = self
            .main
            .solve_frame_query(self.sys, oid, level, &latches, dir, &hints);
        if !res && self.opts.hints.rotation {
            self.rotation.refresh(&latches, level + 1);
        }
        res
    }

    /// The boundary check at level −1. The init and auxiliary targets keep
    /// exact negations at level 0, so surviving them means the state is
    /// compatible with the target and the chains join; the bad target's
    /// level 0 is core-approximate and needs the one-step output check.
    fn last_check(&mut self, dir: Direction, oid: OseqId, s: StateId) -> bool {
        match self.oseqs.get(oid).target() {
            Target::Init | Target::State(_) => {
                self.halves[dir.index()].cex_start = Some(s);
                log::debug!("{dir} search reached its target through {s}");
                true
            }
            Target::Bad => {
                self.queries += 1;
                let latches = self.arena[s].latches.clone();
                if self.main.solve_with_bad(&latches, self.sys.bad_lit()) {
                    let inputs = self.main.model_inputs(self.sys);
                    let hit = self.arena.alloc(latches, inputs);
                    let half = &mut self.halves[dir.index()];
                    half.trail.insert(hit, Some(s));
                    half.cex_start = Some(hit);
                    log::debug!("bad output triggered from {s}");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// After SAT: allocate the discovered state, generalizing forward
    /// discoveries against the state they step into.
    fn extract_state(&mut self, dir: Direction, prior: StateId) -> StateId {
        let (latches, inputs) = self.main.take_state(self.sys, dir);
        if dir.is_forward() && self.opts.partial_states {
            let full = self.main.full_assignment(self.sys);
            let prior_latches = self.arena[prior].latches.clone();
            self.queries += 1;
            if let Some((generalized, _)) =
                self.partial
                    .generalize_from_prior(self.sys, &full, &prior_latches)
            {
                // the latch cube shrinks; the inputs stay full so replay
                // remains deterministic
                return self.arena.alloc(generalized, inputs);
            }
        }
        self.arena.alloc(latches, inputs)
    }

    /// After UNSAT: turn the core into a blocking cube at `dst + 1`. An
    /// empty generalized core means the obligation was vacuously safe.
    fn update_o(&mut self, dir: Direction, oid: OseqId, dst: isize, s: StateId) -> bool {
        let source = self.arena[s].latches.clone();
        let (uc, exact) = self.main.conflict(self.sys, dir, &source);
        if !exact {
            log::trace!("core dropped literals outside the latch alphabet");
        }
        if uc.is_empty() {
            log::debug!("{oid}: empty core at level {}, vacuously safe", dst + 1);
            return true;
        }
        self.add_uc(oid, (dst + 1) as usize, uc, dir);
        false
    }

    /// Insert a blocking cube with subsumption maintenance and mirror it
    /// into the solvers.
    fn add_uc(&mut self, oid: OseqId, level: usize, uc: Cube, dir: Direction) {
        let committed = self.oseqs.get(oid).len();
        match self.oseqs.get_mut(oid).add_cube(level, uc.clone()) {
            AddOutcome::Subsumed => return,
            AddOutcome::Added { dropped } => {
                if dropped > 0 {
                    log::trace!("{oid}: cube at level {level} displaced {dropped} cubes");
                }
            }
        }
        if level < committed {
            let o_dir = self.oseqs.get(oid).direction();
            self.main.add_blocking_cube(self.sys, oid, level, &uc, o_dir);
        } else if dir.is_forward() {
            // pending-level knowledge prunes this round's enumeration
            self.start.block_cube(&uc);
        }
    }

    /// Scan the sequence bottom-up for a level subsumed by the union of the
    /// levels below it, skipping levels untouched since the last sweep. A
    /// fresh invariant solver per sweep keeps constraint toggling honest.
    fn invariant_found(&mut self, oid: OseqId) -> Option<usize> {
        let mut sweep_queries = 0;
        let found = {
            let o = self.oseqs.get(oid);
            let mut inv: InvSolver<S> = InvSolver::new(self.sys);
            let fresh = o.fresh_level();
            let mut found = None;
            for level in 0..o.len() {
                if level < fresh {
                    inv.add_or_frame(o.frame(level));
                    continue;
                }
                inv.add_and_frame(o.frame(level));
                sweep_queries += 1;
                let fixpoint = !inv.solve();
                inv.release_and();
                if fixpoint {
                    found = Some(level);
                    break;
                }
                inv.add_or_frame(o.frame(level));
            }
            found
        };
        self.queries += sweep_queries;
        self.oseqs.get_mut(oid).reset_fresh();
        if let Some(level) = found {
            log::info!("{oid}: inductive invariant at level {level}");
        }
        found
    }

    /// Join the two trails into one input sequence: the backward chain
    /// reversed (initial state first), then the forward chain (ending at a
    /// violating start state). Latch valuations are recomputed from the
    /// inputs by simulation, so only the inputs are emitted.
    fn reconstruct_trace(&self) -> Trace {
        let ni = self.sys.num_inputs() as Lit;
        let input_bools = |sid: StateId| -> Vec<bool> {
            let cube = &self.arena[sid].inputs;
            (1..=ni).map(|v| contains(cube, v)).collect()
        };
        let mut inputs: Vec<Vec<bool>> = vec![];
        let backward = &self.halves[Direction::Backward.index()];
        if let Some(head) = backward.cex_start {
            let mut rev = vec![];
            let mut cur = head;
            while let Some(prior) = backward.trail[&cur] {
                rev.push(input_bools(cur));
                cur = prior;
            }
            rev.reverse();
            inputs.extend(rev);
        }
        let forward = &self.halves[Direction::Forward.index()];
        if let Some(head) = forward.cex_start {
            let mut cur = head;
            loop {
                inputs.push(input_bools(cur));
                match forward.trail[&cur] {
                    Some(next) => cur = next,
                    None => break,
                }
            }
        }
        let initial = self.sys.initial_cube().iter().map(|&l| l > 0).collect();
        log::info!("counterexample with {} input steps", inputs.len());
        Trace { initial, inputs }
    }
}

/// Single-pass cursor over a snapshot of a Usequence's level sizes. States
/// appended after the snapshot belong to the next round; every snapshotted
/// entry is offered exactly once.
struct Picker {
    lens: Vec<usize>,
    strategy: PickStrategy,
    level: isize,
    pos: isize,
}

impl Picker {
    fn new(lens: Vec<usize>, strategy: PickStrategy) -> Self {
        let (level, pos) = match strategy {
            PickStrategy::RecentFirst => {
                let level = lens.len() as isize - 1;
                let pos = if level >= 0 {
                    lens[level as usize] as isize - 1
                } else {
                    -1
                };
                (level, pos)
            }
            PickStrategy::OldestFirst => (0, 0),
        };
        let mut picker = Picker {
            lens,
            strategy,
            level,
            pos,
        };
        picker.normalize();
        picker
    }

    /// Move to the next existing entry, if the cursor is off one.
    fn normalize(&mut self) {
        match self.strategy {
            PickStrategy::RecentFirst => {
                while self.level >= 0 && self.pos < 0 {
                    self.level -= 1;
                    self.pos = if self.level >= 0 {
                        self.lens[self.level as usize] as isize - 1
                    } else {
                        -1
                    };
                }
            }
            PickStrategy::OldestFirst => {
                while (self.level as usize) < self.lens.len()
                    && self.pos >= self.lens[self.level as usize] as isize
                {
                    self.level += 1;
                    self.pos = 0;
                }
            }
        }
    }

    fn peek(&self) -> Option<(usize, usize)> {
        match self.strategy {
            PickStrategy::RecentFirst if self.level >= 0 => {
                Some((self.level as usize, self.pos as usize))
            }
            PickStrategy::OldestFirst if (self.level as usize) < self.lens.len() => {
                Some((self.level as usize, self.pos as usize))
            }
            _ => None,
        }
    }

    fn advance(&mut self) {
        match self.strategy {
            PickStrategy::RecentFirst => self.pos -= 1,
            PickStrategy::OldestFirst => self.pos += 1,
        }
        self.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_first_walks_top_down() {
        let mut p = Picker::new(vec![2, 0, 3], PickStrategy::RecentFirst);
        let mut seen = vec![];
        while let Some(x) = p.peek() {
            seen.push(x);
            p.advance();
        }
        assert_eq!(seen, vec![(2, 2), (2, 1), (2, 0), (0, 1), (0, 0)]);
    }

    #[test]
    fn oldest_first_walks_bottom_up() {
        let mut p = Picker::new(vec![1, 0, 2], PickStrategy::OldestFirst);
        let mut seen = vec![];
        while let Some(x) = p.peek() {
            seen.push(x);
            p.advance();
        }
        assert_eq!(seen, vec![(0, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn empty_snapshot_yields_nothing() {
        assert!(Picker::new(vec![], PickStrategy::RecentFirst).peek().is_none());
        assert!(Picker::new(vec![0, 0], PickStrategy::OldestFirst).peek().is_none());
    }
}

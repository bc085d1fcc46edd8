// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Literals and cubes.
//!
//! A literal is a non-zero `i32` in the DIMACS convention: the magnitude
//! names a Boolean variable, the sign its polarity. A cube is a conjunction
//! of literals kept sorted by variable magnitude with unique variables, so
//! that containment and intersection are linear merges. Sortedness is an
//! invariant maintained by the producers of cubes, not re-established here.

/// A signed literal.
pub type Lit = i32;

/// A variable (always positive).
pub type Var = i32;

/// A conjunction of literals, sorted by variable magnitude.
pub type Cube = Vec<Lit>;

/// The variable of a literal.
#[inline]
pub fn var(lit: Lit) -> Var {
    lit.abs()
}

/// Compare two literals by variable magnitude.
#[inline]
pub fn var_cmp(a: &Lit, b: &Lit) -> std::cmp::Ordering {
    var(*a).cmp(&var(*b))
}

fn debug_assert_sorted(cube: &[Lit]) {
    debug_assert!(
        cube.windows(2).all(|w| var(w[0]) < var(w[1])),
        "cube is not sorted by variable: {cube:?}"
    );
}

/// Does `a` imply `b`? For cubes this is containment: every literal of `b`
/// occurs, with the same sign, in `a`. Both cubes must be sorted.
pub fn implies(a: &[Lit], b: &[Lit]) -> bool {
    debug_assert_sorted(a);
    debug_assert_sorted(b);
    if a.len() < b.len() {
        return false;
    }
    let mut ai = a.iter();
    'outer: for &lb in b {
        for &la in ai.by_ref() {
            if la == lb {
                continue 'outer;
            } else if var(la) >= var(lb) {
                return false;
            }
        }
        return false;
    }
    true
}

/// The literals common to `a` and `b` with identical sign.
pub fn intersect(a: &[Lit], b: &[Lit]) -> Cube {
    debug_assert_sorted(a);
    debug_assert_sorted(b);
    let mut res = Cube::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if var(a[i]) == var(b[j]) {
            if a[i] == b[j] {
                res.push(a[i]);
            }
            i += 1;
            j += 1;
        } else if var(a[i]) < var(b[j]) {
            i += 1;
        } else {
            j += 1;
        }
    }
    res
}

/// The literals of `a` not matched (same variable, same sign) in `b`.
pub fn minus(a: &[Lit], b: &[Lit]) -> Cube {
    debug_assert_sorted(a);
    debug_assert_sorted(b);
    let mut res = Cube::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if var(a[i]) == var(b[j]) {
            if a[i] != b[j] {
                res.push(a[i]);
            }
            i += 1;
            j += 1;
        } else if var(a[i]) < var(b[j]) {
            res.push(a[i]);
            i += 1;
        } else {
            j += 1;
        }
    }
    res.extend_from_slice(&a[i..]);
    res
}

/// Flip every literal. The result is sorted iff the input was.
pub fn negate(cube: &[Lit]) -> Cube {
    cube.iter().map(|&l| -l).collect()
}

/// Does `a` contain the literal `lit`? Binary search by variable.
pub fn contains(a: &[Lit], lit: Lit) -> bool {
    debug_assert_sorted(a);
    a.binary_search_by(|probe| var(*probe).cmp(&var(lit)))
        .map(|idx| a[idx] == lit)
        .unwrap_or(false)
}

/// Split `reference` against `a`: the literals of `reference` found in `a`
/// (in `reference`'s own order), and the literals of `a` not matched.
/// `reference` need not be sorted; `a` must be. Used by the rotation
/// heuristic, which deliberately preserves the reference cube's order.
pub fn split_by_reference(a: &[Lit], reference: &[Lit]) -> (Cube, Cube) {
    debug_assert_sorted(a);
    let mut hit = Cube::new();
    for &l in reference {
        if contains(a, l) {
            hit.push(l);
        }
    }
    let mut sorted_hit = hit.clone();
    sorted_hit.sort_unstable_by(var_cmp);
    let rest = minus(a, &sorted_hit);
    (hit, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implies_is_containment() {
        assert!(implies(&[-1, 2, -3], &[-1, -3]));
        assert!(implies(&[-1, 2, -3], &[]));
        assert!(implies(&[-1, 2, -3], &[-1, 2, -3]));
        assert!(!implies(&[-1, 2, -3], &[1]));
        assert!(!implies(&[-1, -3], &[-1, 2, -3]));
        assert!(!implies(&[2, -3], &[-1]));
    }

    #[test]
    fn intersect_keeps_matching_signs() {
        assert_eq!(intersect(&[-1, 2, -3, 4], &[-1, -2, -3, 5]), vec![-1, -3]);
        assert_eq!(intersect(&[1, 2], &[3, 4]), Vec::<Lit>::new());
    }

    #[test]
    fn minus_drops_matches_only() {
        assert_eq!(minus(&[-1, 2, -3, 4], &[-1, -2, 4]), vec![2, -3]);
        assert_eq!(minus(&[-1, 2], &[]), vec![-1, 2]);
    }

    #[test]
    fn split_preserves_reference_order() {
        let (hit, rest) = split_by_reference(&[-1, 2, -3, 4], &[4, -3, 1]);
        assert_eq!(hit, vec![4, -3]);
        assert_eq!(rest, vec![-1, 2]);
    }

    #[test]
    fn negate_flips() {
        assert_eq!(negate(&[-1, 2]), vec![1, -2]);
    }
}

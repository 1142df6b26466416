// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Constraint Generator: walks the [`Network`] and emits the five constraint families (Range,
//! Periodicity, Contention-free, Path-order, End-to-end) into an [`IntegerSolver`], in
//! deterministic frame/link/instance/replica order.
//!
//! Every family is a free function taking the network, the variable lookup table, and the
//! solver, rather than a method on either, so the generator stays the only thing that knows how
//! the five families combine; [`crate::driver`] calls them in the fixed order R, P, C, O, E.

use std::collections::HashMap;

use good_lp::Variable;
use itertools::Itertools;
use log::debug;

use crate::error::EncodingError;
use crate::network::Network;
use crate::solver::{Atom, IntegerSolver};

/// Lookup table from `(frame id, link id, instance, replica)` to the solver variable encoding
/// that offset's transmission start time. Built once by [`declare_variables`] and consumed by
/// every other family, and later by `crate::extract`.
pub type VarTable = HashMap<(usize, usize, u32, u32), Variable>;

/// Declare one integer variable per `(frame, link, instance, replica)` quadruple, named
/// `O_<frameId>_<instance>_<replica>_<linkId>` per the variable naming convention, and return the
/// lookup table every other family and the extractor use instead of re-parsing names.
pub fn declare_variables<S: IntegerSolver>(net: &Network, solver: &mut S) -> VarTable {
    let mut vars = VarTable::new();
    for frame in &net.frames {
        for (link, offset) in frame.offsets() {
            for instance in 0..offset.instances {
                for replica in 0..=offset.replicas {
                    let name = format!("O_{}_{instance}_{replica}_{link}", frame.id);
                    let var = solver.declare(name);
                    vars.insert((frame.id, link, instance, replica), var);
                }
            }
        }
    }
    debug!("declared {} offset variables", vars.len());
    vars
}

/// Look up the variable declared for one `(frame, link, instance, replica)` quadruple.
fn var(
    vars: &VarTable,
    frame: usize,
    link: usize,
    instance: u32,
    replica: u32,
) -> Result<Variable, EncodingError> {
    vars.get(&(frame, link, instance, replica)).copied().ok_or_else(|| {
        EncodingError::UndeclaredVariable(format!("O_{frame}_{instance}_{replica}_{link}"))
    })
}

/// (R) Range, base instance only, and (P) periodicity for every other instance/replica.
///
/// `0 < x(o,0,0) <= D(f) - T(o)` for the base instance, and
/// `x(o,i,r) = x(o,0,0) + i*P(f)` for every `(i,r) != (0,0)`.
pub fn assert_range_and_periodicity<S: IntegerSolver>(
    net: &Network,
    vars: &VarTable,
    solver: &mut S,
) -> Result<(), EncodingError> {
    let mut count = 0;
    for frame in &net.frames {
        for (link, offset) in frame.offsets() {
            let base = var(vars, frame.id, link, 0, 0)?;
            solver.assert_atom(Atom::gt(base, 0))?;
            solver.assert_atom(Atom::le(base, frame.deadline - offset.duration))?;
            count += 2;
            for instance in 0..offset.instances {
                for replica in 0..=offset.replicas {
                    if (instance, replica) == (0, 0) {
                        continue;
                    }
                    let x = var(vars, frame.id, link, instance, replica)?;
                    solver.assert_atom(Atom::diff_eq(x, base, instance as i64 * frame.period))?;
                    count += 1;
                }
            }
        }
    }
    debug!("asserted {count} range/periodicity constraints");
    Ok(())
}

/// Two instance windows `[i*P1+1, (i+1)*P1]` and `[j*P2+1, (j+1)*P2]` can overlap iff
/// `min1 <= max2 && min2 <= max1`. Disjoint windows can never collide, so no contention
/// disjunction is needed for them — this is the dominant pruning of the family.
fn windows_may_overlap(i1: u32, p1: i64, i2: u32, p2: i64) -> bool {
    let min1 = i1 as i64 * p1 + 1;
    let max1 = (i1 as i64 + 1) * p1;
    let min2 = i2 as i64 * p2 + 1;
    let max2 = (i2 as i64 + 1) * p2;
    min1 <= max2 && min2 <= max1
}

/// (C) Contention-free: for every ordered pair of distinct frames `(f1, f2)` with
/// `f1.id < f2.id` sharing a link, for every pair of instance windows that can possibly overlap,
/// the two transmissions must not overlap on that link.
///
/// Frames are visited in id order and, within a frame, links in id order (via
/// [`crate::network::Frame::offsets`]), so two runs over the same input emit identical
/// constraints in identical order.
pub fn assert_contention_free<S: IntegerSolver>(
    net: &Network,
    vars: &VarTable,
    solver: &mut S,
) -> Result<(), EncodingError> {
    let mut count = 0;
    for (i, f1) in net.frames.iter().enumerate() {
        for f2 in net.frames.iter().skip(i + 1) {
            for (link, o1) in f1.offsets() {
                let Some(o2) = f2.offset(link) else { continue };
                for i1 in 0..o1.instances {
                    for r1 in 0..=o1.replicas {
                        for i2 in 0..o2.instances {
                            for r2 in 0..=o2.replicas {
                                if !windows_may_overlap(i1, f1.period, i2, f2.period) {
                                    continue;
                                }
                                let x1 = var(vars, f1.id, link, i1, r1)?;
                                let x2 = var(vars, f2.id, link, i2, r2)?;
                                solver.assert_disjunction(
                                    Atom::diff_le(x1, x2, -o1.duration),
                                    Atom::diff_le(x2, x1, -o2.duration),
                                )?;
                                count += 1;
                            }
                        }
                    }
                }
            }
        }
    }
    debug!("asserted {count} contention-free disjunctions");
    Ok(())
}

/// (O) Path order: for every path, for each adjacent pair `(o_k, o_{k+1})` of offsets along it,
/// `x(o_{k+1},0,0) >= x(o_k,0,0) + T(o_k) + delta + 1`. Only base instance/replica constraints are
/// emitted; periodicity (family P) propagates the relation to every other instance.
pub fn assert_path_order<S: IntegerSolver>(
    net: &Network,
    vars: &VarTable,
    solver: &mut S,
) -> Result<(), EncodingError> {
    let mut count = 0;
    for frame in &net.frames {
        for path in &frame.paths {
            for (link_a, link_b) in path.iter().copied().tuple_windows() {
                let duration_a = frame
                    .offset(link_a)
                    .expect("every path link has an offset")
                    .duration;
                let x_a = var(vars, frame.id, link_a, 0, 0)?;
                let x_b = var(vars, frame.id, link_b, 0, 0)?;
                solver.assert_atom(Atom::diff_ge(
                    x_b,
                    x_a,
                    duration_a + net.hop_delay + 1,
                ))?;
                count += 1;
            }
        }
    }
    debug!("asserted {count} path-order constraints");
    Ok(())
}

/// (E) End-to-end delay: for every path, `x(o_last,0,0) + T(o_last) - x(o_first,0,0) <= E(f)`.
pub fn assert_end_to_end<S: IntegerSolver>(
    net: &Network,
    vars: &VarTable,
    solver: &mut S,
) -> Result<(), EncodingError> {
    let mut count = 0;
    for frame in &net.frames {
        for path in &frame.paths {
            let first = *path.first().expect("Network::validate rejects empty paths");
            let last = *path.last().expect("Network::validate rejects empty paths");
            let duration_last = frame.offset(last).expect("path link has an offset").duration;
            let x_first = var(vars, frame.id, first, 0, 0)?;
            let x_last = var(vars, frame.id, last, 0, 0)?;
            solver.assert_atom(Atom::diff_le(
                x_last,
                x_first,
                frame.end_to_end - duration_last,
            ))?;
            count += 1;
        }
    }
    debug!("asserted {count} end-to-end constraints");
    Ok(())
}

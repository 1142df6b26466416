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

//! Correctness Verifier: independently re-checks every timing invariant on an extracted
//! [`Network`], without going anywhere near the solver that produced it.
//!
//! The contention-free check is the one pairwise-quadratic pass in this module, so it is the one
//! place this crate spins up a thread pool: it runs over `rayon`'s `par_iter`, unless the
//! `singlethread-verify` feature forces the sequential fallback (useful for deterministic
//! debugging and for comparing the two paths against each other in tests).

use std::collections::HashMap;

use itertools::Itertools;

use crate::error::VerificationError;
use crate::network::Network;

/// Run every invariant check in turn. Any single violation is reported immediately; this mirrors
/// the original synthesizer's "any violation is fatal" contract (see the error handling design).
pub fn verify(net: &Network) -> Result<(), VerificationError> {
    check_deadlines(net)?;
    check_periodicity(net)?;
    check_contention_free(net)?;
    check_path_order(net)?;
    check_end_to_end(net)?;
    Ok(())
}

/// (R) Every base offset must finish at or before its frame's deadline.
fn check_deadlines(net: &Network) -> Result<(), VerificationError> {
    for frame in &net.frames {
        for (link, offset) in frame.offsets() {
            let start = offset.base().expect("extracted schedule has every base offset set");
            let end = start + offset.duration;
            if end > frame.deadline {
                return Err(VerificationError::DeadlineViolated {
                    frame: frame.id,
                    link,
                    instance: 0,
                    end,
                    deadline: frame.deadline,
                });
            }
        }
    }
    Ok(())
}

/// (P) Every base-replica instance must be spaced exactly one period apart from the previous one.
fn check_periodicity(net: &Network) -> Result<(), VerificationError> {
    for frame in &net.frames {
        for (link, offset) in frame.offsets() {
            for instance in 1..offset.instances {
                let cur = offset.at(instance, 0).expect("extracted");
                let prev = offset.at(instance - 1, 0).expect("extracted");
                let actual = cur - prev;
                if actual != frame.period {
                    return Err(VerificationError::PeriodicityViolated {
                        frame: frame.id,
                        link,
                        instance,
                        actual,
                        expected: frame.period,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Every unordered pair of frames `(a, b)` with `a < b` that share a link, paired with that link.
/// Each entry is independent of every other, which is what lets [`check_contention_free`] fan
/// them out across a thread pool.
fn contending_pairs(net: &Network) -> Vec<(usize, usize, usize)> {
    let mut by_link: HashMap<usize, Vec<usize>> = HashMap::new();
    for frame in &net.frames {
        for (link, _) in frame.offsets() {
            by_link.entry(link).or_default().push(frame.id);
        }
    }
    let mut pairs = Vec::new();
    for (link, frame_ids) in by_link {
        for (a, b) in frame_ids.into_iter().sorted().tuple_combinations() {
            pairs.push((link, a, b));
        }
    }
    pairs
}

/// (C) Check one frame pair's every instance/replica combination on the shared `link` for an
/// overlapping transmission window.
fn check_contending_pair(net: &Network, link: usize, a: usize, b: usize) -> Result<(), VerificationError> {
    let frame_a = &net.frames[a];
    let frame_b = &net.frames[b];
    let offset_a = frame_a.offset(link).expect("link shared by construction");
    let offset_b = frame_b.offset(link).expect("link shared by construction");
    for i1 in 0..offset_a.instances {
        for r1 in 0..=offset_a.replicas {
            let start_a = offset_a.at(i1, r1).expect("extracted");
            let end_a = start_a + offset_a.duration;
            for i2 in 0..offset_b.instances {
                for r2 in 0..=offset_b.replicas {
                    let start_b = offset_b.at(i2, r2).expect("extracted");
                    let end_b = start_b + offset_b.duration;
                    if start_a < end_b && start_b < end_a {
                        return Err(VerificationError::ContentionViolated {
                            frame_a: frame_a.id,
                            frame_b: frame_b.id,
                            link,
                            start_a,
                            end_a,
                            start_b,
                            end_b,
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(not(feature = "singlethread-verify"))]
fn check_contention_free(net: &Network) -> Result<(), VerificationError> {
    use rayon::prelude::*;
    contending_pairs(net)
        .into_par_iter()
        .try_for_each(|(link, a, b)| check_contending_pair(net, link, a, b))
}

#[cfg(feature = "singlethread-verify")]
fn check_contention_free(net: &Network) -> Result<(), VerificationError> {
    contending_pairs(net)
        .into_iter()
        .try_for_each(|(link, a, b)| check_contending_pair(net, link, a, b))
}

fn check_path_order(net: &Network) -> Result<(), VerificationError> {
    for frame in &net.frames {
        for path in &frame.paths {
            for (link_a, link_b) in path.iter().copied().tuple_windows() {
                let start_a = frame
                    .offset(link_a)
                    .expect("path link has an offset")
                    .base()
                    .expect("extracted");
                let start_b = frame
                    .offset(link_b)
                    .expect("path link has an offset")
                    .base()
                    .expect("extracted");
                if start_b < start_a + net.hop_delay {
                    return Err(VerificationError::PathOrderViolated {
                        frame: frame.id,
                        link_a,
                        link_b,
                        start_a,
                        start_b,
                        hop_delay: net.hop_delay,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_end_to_end(net: &Network) -> Result<(), VerificationError> {
    for frame in &net.frames {
        for path in &frame.paths {
            let first = *path.first().expect("Network::validate rejects empty paths");
            let last = *path.last().expect("Network::validate rejects empty paths");
            let offset_first = frame.offset(first).expect("path link has an offset");
            let offset_last = frame.offset(last).expect("path link has an offset");
            let start_first = offset_first.base().expect("extracted");
            let start_last = offset_last.base().expect("extracted");
            let actual = start_last + offset_last.duration - start_first;
            if actual > frame.end_to_end {
                return Err(VerificationError::EndToEndViolated {
                    frame: frame.id,
                    actual,
                    budget: frame.end_to_end,
                });
            }
        }
    }
    Ok(())
}

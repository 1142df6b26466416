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

//! # ttsynth — a time-triggered transmission schedule synthesizer
//!
//! Given a network description (links with speed and medium, switches with a fixed relay delay)
//! and a set of periodic traffic flows (frames with period, deadline, size, end-to-end delay and
//! one or more link paths), this crate computes an integer transmission start time, in
//! nanoseconds, for every traversal of every link by every instance of every frame within the
//! schedule's hyperperiod, such that every timing constraint is satisfied.
//!
//! ## Structure
//! - [`network`] is the in-memory Network Model: [`network::Link`], [`network::Frame`],
//!   [`network::Offset`] and [`network::Network`], along with the invariants ingestion must
//!   satisfy and the per-offset bookkeeping ([`network::Network::initialize`]) the rest of the
//!   pipeline depends on.
//! - [`solver`] abstracts the integer-arithmetic decision backend behind
//!   [`solver::IntegerSolver`], with a `good_lp`/CBC-backed [`solver::CbcSolver`] adapter.
//! - [`constraints`] is the Constraint Generator: it walks a [`network::Network`] and asserts the
//!   five constraint families (range, periodicity, contention-free, path-order, end-to-end) into
//!   an [`solver::IntegerSolver`].
//! - [`extract`] is the Schedule Extractor, reading a satisfying model back into a
//!   [`network::Network`]'s start-time tables.
//! - [`verify`] is the Correctness Verifier, an independent re-check of every timing invariant on
//!   an already-extracted network.
//! - [`driver`] is the Synthesizer Driver tying all of the above into the strictly sequential
//!   Loaded -> Initialised -> Encoded -> Solved -> Extracted -> Verified pipeline
//!   ([`driver::synthesize`]).
//! - [`xml`] is the ambient XML ingestion/emission boundary, and [`error`] is the layered error
//!   taxonomy every fallible operation above returns into.

#![deny(
    missing_docs,
    clippy::missing_docs_in_private_items,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::result_large_err)]

pub mod constraints;
pub mod driver;
pub mod error;
pub mod extract;
pub mod network;
pub mod solver;
#[cfg(test)]
mod test;
pub mod verify;
pub mod xml;

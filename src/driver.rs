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

//! Synthesizer Driver: orchestrates the strictly sequential
//! Loaded -> Initialised -> Encoded -> Solved -> Extracted -> Verified pipeline.
//!
//! There is no state to revisit and no suspension point inside a run (see the concurrency model):
//! [`synthesize`] is a single straight-line function, logging the wall-clock duration of each
//! transition at `info` level the way the original timed each phase with `gettimeofday`.

use std::time::Instant;

use good_lp::ResolutionError;
use log::info;

use crate::constraints;
use crate::error::{EncodingError, SchedulerError};
use crate::extract;
use crate::network::Network;
use crate::solver::{CbcSolver, IntegerSolver};
use crate::verify;

/// Run Initialise -> Encode -> Solve -> Extract -> Verify over an already-Loaded `net` (i.e. one
/// produced by ingestion but not yet [`Network::initialize`]d), consuming it and returning the
/// same network with every offset's start-time table filled in and independently re-verified.
///
/// `cbc_seconds` bounds the CBC solve; `None` lets it run to completion.
pub fn synthesize(mut net: Network, cbc_seconds: Option<u32>) -> Result<Network, SchedulerError> {
    let total = Instant::now();

    let t = Instant::now();
    net.initialize()?;
    info!("Initialised: {} links, {} frames ({:?})", net.links.len(), net.frames.len(), t.elapsed());

    let t = Instant::now();
    let mut solver = CbcSolver::new(net.hyperperiod, cbc_seconds);
    let vars = constraints::declare_variables(&net, &mut solver);
    constraints::assert_range_and_periodicity(&net, &vars, &mut solver)?;
    constraints::assert_contention_free(&net, &vars, &mut solver)?;
    constraints::assert_path_order(&net, &vars, &mut solver)?;
    constraints::assert_end_to_end(&net, &vars, &mut solver)?;
    info!("Encoded: {} offset variables ({:?})", vars.len(), t.elapsed());

    let t = Instant::now();
    let model = solver.check().map_err(|e| match e {
        ResolutionError::Infeasible => SchedulerError::Infeasible,
        other => SchedulerError::Encoding(EncodingError::Backend(other.to_string())),
    })?;
    info!("Solved: SAT ({:?})", t.elapsed());

    let t = Instant::now();
    extract::extract(&mut net, &vars, model.as_ref())?;
    info!("Extracted ({:?})", t.elapsed());

    let t = Instant::now();
    verify::verify(&net)?;
    info!("Verified ({:?})", t.elapsed());

    info!("Total synthesis time: {:?}", total.elapsed());
    Ok(net)
}

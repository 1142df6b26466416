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

//! Schedule Extractor: on SAT, reads every offset's variable value back out of the solver's model
//! and into the [`Network`]'s start-time tables.

use log::debug;

use crate::constraints::VarTable;
use crate::error::ExtractionError;
use crate::network::Network;
use crate::solver::Model;

/// Fill in every offset's start-time table from `model`, using `vars` to find each offset's
/// variables. After this returns, every offset of every frame has a value for every
/// `(instance, replica)` pair.
pub fn extract(net: &mut Network, vars: &VarTable, model: &dyn Model) -> Result<(), ExtractionError> {
    let mut written = 0;
    for frame in &mut net.frames {
        let frame_id = frame.id;
        for (link, offset) in frame.offsets_mut() {
            for instance in 0..offset.instances {
                for replica in 0..=offset.replicas {
                    let var = *vars
                        .get(&(frame_id, link, instance, replica))
                        .ok_or_else(|| {
                            ExtractionError::MissingValue(format!(
                                "O_{frame_id}_{instance}_{replica}_{link}"
                            ))
                        })?;
                    let value = model.value(var)?;
                    offset.set(instance, replica, value);
                    written += 1;
                }
            }
        }
    }
    debug!("extracted {written} offset start times");
    Ok(())
}

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

//! Small, allocation-cheap constructors for building a [`Network`] directly in test code, without
//! round-tripping through XML.

use crate::error::ModelError;
use crate::network::{Frame, Link, Medium, Network};

/// A wired link with the given id and speed in MB/s.
pub(crate) fn link(id: usize, speed_mbps: i64) -> Link {
    Link {
        id,
        medium: Medium::Wired,
        speed_mbps,
    }
}

/// A single-path, non-multicast frame.
#[allow(clippy::too_many_arguments)]
pub(crate) fn one_path_frame(
    id: usize,
    period: i64,
    deadline: i64,
    size: i64,
    end_to_end: i64,
    path: Vec<usize>,
) -> Frame {
    Frame::new(id, period, deadline, size, end_to_end, 0, vec![path], Vec::new())
}

/// Build and validate a network with no protocol reservation and zero minimum inter-frame gap.
pub(crate) fn net(
    links: Vec<Link>,
    frames: Vec<Frame>,
    hyperperiod: i64,
    hop_delay: i64,
) -> Result<Network, ModelError> {
    Network::new(links, frames, hyperperiod, hop_delay, 0, 0, 0)
}

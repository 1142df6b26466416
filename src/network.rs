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

//! The in-memory network model: links, frames, paths and the per-link transmission offsets.
//!
//! Link identifiers are not carried in the input document; a link's id is its zero-based position
//! in document order, matching the original scheduler's convention.

use crate::error::ModelError;

/// The physical medium of a [`Link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Medium {
    /// A wired link; never retransmitted.
    Wired,
    /// A wireless link; reserved for future retransmission support.
    Wireless,
}

/// A single hop of the network, identified by its position in the input document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    /// Zero-based position in document order.
    pub id: usize,
    /// Physical medium.
    pub medium: Medium,
    /// Link speed in megabytes per second.
    pub speed_mbps: i64,
}

impl Link {
    /// Transmission duration, in nanoseconds, of `size_bytes` bytes over this link: `size` bytes
    /// at `speed` megabytes per second takes `size / (speed * 1e6)` seconds, i.e.
    /// `size * 1000 / speed` nanoseconds, rounded up.
    pub fn duration_ns(&self, size_bytes: i64) -> i64 {
        let num = size_bytes * 1_000;
        let denom = self.speed_mbps;
        (num + denom - 1) / denom
    }
}

/// The per-link transmission record of one frame.
///
/// `table[instance][replica]` holds the transmission start time, in nanoseconds, once the
/// schedule has been extracted. Before extraction every entry is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    /// Link this offset transmits on.
    pub link: usize,
    /// Transmission duration in nanoseconds.
    pub duration: i64,
    /// Number of periods within the hyperperiod.
    pub instances: u32,
    /// Number of retransmission replicas beyond the primary transmission (0 for wired links, and
    /// currently always 0 — see the design notes on wireless replicas).
    pub replicas: u32,
    /// Start times, `table[instance][replica]`, `None` until extracted.
    pub table: Vec<Vec<Option<i64>>>,
}

impl Offset {
    fn new(link: usize) -> Self {
        Offset {
            link,
            duration: 0,
            instances: 0,
            replicas: 0,
            table: Vec::new(),
        }
    }

    /// Allocate `table` for `instances` instances and `replicas` replicas (table width =
    /// `replicas + 1`).
    fn allocate(&mut self, instances: u32, replicas: u32) {
        self.instances = instances;
        self.replicas = replicas;
        self.table = (0..instances)
            .map(|_| vec![None; replicas as usize + 1])
            .collect();
    }

    /// Start time of the base instance/replica (instance 0, replica 0), once set.
    pub fn base(&self) -> Option<i64> {
        self.table.first().and_then(|row| row.first().copied().flatten())
    }

    /// Start time of a given `(instance, replica)`, once set.
    pub fn at(&self, instance: u32, replica: u32) -> Option<i64> {
        self.table
            .get(instance as usize)
            .and_then(|row| row.get(replica as usize).copied().flatten())
    }

    /// Write the start time of a given `(instance, replica)`.
    pub fn set(&mut self, instance: u32, replica: u32, value: i64) {
        self.table[instance as usize][replica as usize] = Some(value);
    }
}

/// A periodic traffic flow.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Frame identifier (its position in document order).
    pub id: usize,
    /// Period, in nanoseconds. Must be positive.
    pub period: i64,
    /// Deadline, in nanoseconds. Must satisfy `0 < deadline <= period`.
    pub deadline: i64,
    /// Size, in bytes.
    pub size: i64,
    /// End-to-end delay budget, in nanoseconds. Must be `>= deadline`.
    pub end_to_end: i64,
    /// Lower bound on the base transmission time, parsed but not wired into any constraint (see
    /// the design note on the ambiguous `Starting` field).
    pub starting: i64,
    /// Ordered sequences of link ids, one per source-to-destination traversal.
    pub paths: Vec<Vec<usize>>,
    /// Multicast split points, each a sequence of link ids, as read from the input document and
    /// round-tripped losslessly; the scheduler does not interpret them beyond path membership.
    pub splits: Vec<Vec<usize>>,
    /// Per-link offsets, in link-id order (not document order) for O(1) lookup by id.
    offsets: Vec<Option<Offset>>,
    /// `true` for the synthetic protocol-reservation frame, which is excluded from schedule
    /// output.
    pub is_protocol: bool,
}

impl Frame {
    /// Construct a new frame with no paths or offsets yet.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        period: i64,
        deadline: i64,
        size: i64,
        end_to_end: i64,
        starting: i64,
        paths: Vec<Vec<usize>>,
        splits: Vec<Vec<usize>>,
    ) -> Self {
        Frame {
            id,
            period,
            deadline,
            size,
            end_to_end,
            starting,
            paths,
            splits,
            offsets: Vec::new(),
            is_protocol: false,
        }
    }

    /// Every distinct link id referenced by any of this frame's paths, in first-seen order.
    pub fn links(&self) -> Vec<usize> {
        let mut seen = Vec::new();
        for path in &self.paths {
            for &link in path {
                if !seen.contains(&link) {
                    seen.push(link);
                }
            }
        }
        seen
    }

    /// Look up the offset for `link`, if this frame traverses it.
    pub fn offset(&self, link: usize) -> Option<&Offset> {
        self.offsets.get(link).and_then(|o| o.as_ref())
    }

    /// Ensure an (empty) offset exists for `link`.
    fn ensure_offset(&mut self, link: usize) {
        if link >= self.offsets.len() {
            self.offsets.resize_with(link + 1, || None);
        }
        if self.offsets[link].is_none() {
            self.offsets[link] = Some(Offset::new(link));
        }
    }

    /// Iterate over all `(link id, &Offset)` pairs traversed by this frame, in link-id order.
    pub fn offsets(&self) -> impl Iterator<Item = (usize, &Offset)> {
        self.offsets
            .iter()
            .enumerate()
            .filter_map(|(id, o)| o.as_ref().map(|o| (id, o)))
    }

    /// Mutably iterate over all `(link id, &mut Offset)` pairs traversed by this frame, in
    /// link-id order.
    pub fn offsets_mut(&mut self) -> impl Iterator<Item = (usize, &mut Offset)> {
        self.offsets
            .iter_mut()
            .enumerate()
            .filter_map(|(id, o)| o.as_mut().map(|o| (id, o)))
    }
}

/// The full network: every link, every frame, and the schedule-wide timing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Network {
    /// Every link, indexed by id.
    pub links: Vec<Link>,
    /// Every frame, indexed by id (the protocol frame, if injected, is last).
    pub frames: Vec<Frame>,
    /// Hyperperiod, in nanoseconds: least common multiple of all frame periods.
    pub hyperperiod: i64,
    /// Minimum relay delay at a switch, in nanoseconds.
    pub hop_delay: i64,
    /// Protocol reservation period, in nanoseconds. Zero disables protocol reservation.
    pub protocol_period: i64,
    /// Protocol reservation duration, in nanoseconds.
    pub protocol_time: i64,
    /// Minimum gap required between any two frames, in nanoseconds (0 if unused).
    pub min_inter_frame_gap: i64,
}

impl Network {
    /// Construct a network from its ingested parts, validating every structural invariant.
    pub fn new(
        links: Vec<Link>,
        mut frames: Vec<Frame>,
        hyperperiod: i64,
        hop_delay: i64,
        protocol_period: i64,
        protocol_time: i64,
        min_inter_frame_gap: i64,
    ) -> Result<Self, ModelError> {
        for frame in &mut frames {
            for link in frame.links() {
                frame.ensure_offset(link);
            }
        }

        let mut net = Network {
            links,
            frames,
            hyperperiod,
            hop_delay,
            protocol_period,
            protocol_time,
            min_inter_frame_gap,
        };
        net.validate()?;
        Ok(net)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.hyperperiod <= 0 {
            return Err(ModelError::NonPositiveHyperperiod(self.hyperperiod));
        }
        for link in &self.links {
            if link.speed_mbps <= 0 {
                return Err(ModelError::NonPositiveLinkSpeed(link.id, link.speed_mbps));
            }
        }
        for frame in &self.frames {
            if frame.period <= 0 {
                return Err(ModelError::NonPositivePeriod(frame.id, frame.period));
            }
            if frame.deadline <= 0 || frame.deadline > frame.period {
                return Err(ModelError::DeadlineExceedsPeriod(
                    frame.id,
                    frame.deadline,
                    frame.period,
                ));
            }
            if frame.end_to_end < frame.deadline {
                return Err(ModelError::EndToEndBelowDeadline(
                    frame.id,
                    frame.end_to_end,
                    frame.deadline,
                ));
            }
            if frame.size < 0 {
                return Err(ModelError::NegativeSize(frame.id, frame.size));
            }
            if frame.paths.is_empty() {
                return Err(ModelError::NoPaths(frame.id));
            }
            for (idx, path) in frame.paths.iter().enumerate() {
                if path.is_empty() {
                    return Err(ModelError::EmptyPath(frame.id, idx));
                }
                for &link in path {
                    if link >= self.links.len() {
                        return Err(ModelError::UndeclaredLink(frame.id, link));
                    }
                }
            }
            if self.hyperperiod % frame.period != 0 {
                return Err(ModelError::HyperperiodMismatch(
                    self.hyperperiod,
                    frame.id,
                    frame.period,
                ));
            }
        }
        Ok(())
    }

    /// Populate every offset's duration, instance count, replica count, and start-time table, and
    /// inject the optional synthetic protocol-reservation frame. Must run exactly once, after
    /// ingestion and before constraint generation.
    pub fn initialize(&mut self) -> Result<(), ModelError> {
        if self.protocol_period > 0 {
            self.inject_protocol_frame()?;
        }

        for frame in &mut self.frames {
            let instances = (self.hyperperiod / frame.period) as u32;
            for (link, offset) in frame.offsets.iter_mut().enumerate() {
                let Some(offset) = offset else { continue };
                let link_model = &self.links[link];
                offset.duration = if frame.is_protocol {
                    self.protocol_time + 1
                } else {
                    link_model.duration_ns(frame.size)
                };
                let replicas = match link_model.medium {
                    Medium::Wired => 0,
                    // The input format carries no field through which to request additional
                    // replicas; see the design note on wireless replicas.
                    Medium::Wireless => 0,
                };
                offset.allocate(instances, replicas);
                if offset.duration >= frame.deadline {
                    return Err(ModelError::NoSlackBeforeDeadline(
                        frame.id,
                        link,
                        offset.duration,
                        frame.deadline,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Inject the synthetic protocol-reservation frame, subject to the same hyperperiod-divides-
    /// period invariant `validate` enforces for every user frame (per-link instance counts are
    /// computed the same way for the protocol frame as for any other, so a non-dividing period
    /// would otherwise truncate its last, partial window silently).
    fn inject_protocol_frame(&mut self) -> Result<(), ModelError> {
        if self.hyperperiod % self.protocol_period != 0 {
            return Err(ModelError::HyperperiodMismatch(
                self.hyperperiod,
                self.frames.len(),
                self.protocol_period,
            ));
        }
        let id = self.frames.len();
        let paths: Vec<Vec<usize>> = (0..self.links.len()).map(|l| vec![l]).collect();
        let mut frame = Frame::new(
            id,
            self.protocol_period,
            self.protocol_period,
            0,
            self.protocol_period + 1,
            0,
            paths,
            Vec::new(),
        );
        frame.is_protocol = true;
        for link in frame.links() {
            frame.ensure_offset(link);
        }
        self.frames.push(frame);
        Ok(())
    }

    /// The frame with the given id, if any.
    pub fn frame(&self, id: usize) -> Option<&Frame> {
        self.frames.get(id)
    }

    /// Every frame that is not the synthetic protocol frame, in id order. This is the iteration
    /// order used by schedule output.
    pub fn user_frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter(|f| !f.is_protocol)
    }
}

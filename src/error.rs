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

//! Error taxonomy for the synthesizer, layered by the phase that can raise it.

use thiserror::Error;

/// Something is wrong with the input XML document: missing element, unparsable value, or an
/// attribute outside its known domain.
#[derive(Debug, Error)]
pub enum InputError {
    /// A required XML element is missing.
    #[error("missing XML element {0:?} under {1}")]
    MissingElement(&'static str, String),
    /// A required XML attribute is missing.
    #[error("missing XML attribute {0:?} on <{1}>")]
    MissingAttribute(&'static str, &'static str),
    /// An element was found but carries no text content.
    #[error("element {0:?} has no text content")]
    NoText(&'static str),
    /// A `category` attribute on a `Link` is neither `Wired` nor `Wireless`.
    #[error("unknown link category {0:?}, expected \"Wired\" or \"Wireless\"")]
    UnknownLinkCategory(String),
    /// An integer field could not be parsed.
    #[error("cannot parse integer in element {0:?}: {1}")]
    IntParse(&'static str, #[source] std::num::ParseIntError),
    /// A path or split referenced a link id that does not exist.
    #[error("frame {0} references undeclared link {1}")]
    UnknownLink(usize, usize),
    /// A declared element count (`NumberFrames`/`NumberLinks`) does not match the number of
    /// `<Frame>`/`<Link>` elements actually present in the document.
    #[error("GeneralInformation/{0} declares {1}, but the document has {2} <{3}> elements")]
    CountMismatch(&'static str, i64, usize, &'static str),
    /// The XML document itself could not be parsed.
    #[error("XML parse error: {0}")]
    Xml(#[from] xmltree::ParseError),
    /// The document could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The network model failed one of its structural invariants after ingestion.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A frame's deadline exceeds its period.
    #[error("frame {0}: deadline {1} exceeds period {2}")]
    DeadlineExceedsPeriod(usize, i64, i64),
    /// A frame's end-to-end delay is smaller than its deadline.
    #[error("frame {0}: end-to-end delay {1} is smaller than deadline {2}")]
    EndToEndBelowDeadline(usize, i64, i64),
    /// A frame declares a non-positive period.
    #[error("frame {0}: period must be positive, got {1}")]
    NonPositivePeriod(usize, i64),
    /// A frame's transmission duration leaves no room before the deadline.
    #[error("frame {0} on link {1}: duration {2} leaves no slack before deadline {3}")]
    NoSlackBeforeDeadline(usize, usize, i64, i64),
    /// A frame declares no paths at all.
    #[error("frame {0} has no paths")]
    NoPaths(usize),
    /// A path is empty.
    #[error("frame {0}: path {1} is empty")]
    EmptyPath(usize, usize),
    /// A path references a link id outside the declared link range.
    #[error("frame {0} references undeclared link {1}")]
    UndeclaredLink(usize, usize),
    /// The hyperperiod is not a multiple of some frame's period.
    #[error("hyperperiod {0} is not a multiple of frame {1}'s period {2}")]
    HyperperiodMismatch(i64, usize, i64),
    /// The network declares a non-positive hyperperiod.
    #[error("hyperperiod must be positive, got {0}")]
    NonPositiveHyperperiod(i64),
    /// A frame declares a negative size.
    #[error("frame {0}: size must be non-negative, got {1}")]
    NegativeSize(usize, i64),
    /// A link declares a non-positive speed.
    #[error("link {0}: speed must be positive, got {1}")]
    NonPositiveLinkSpeed(usize, i64),
}

/// The solver backend rejected an assertion. This indicates an internal bug in the constraint
/// generator or the solver adapter, not a problem with the input.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A variable was asserted on before being declared.
    #[error("variable {0:?} was never declared with the solver")]
    UndeclaredVariable(String),
    /// The backend rejected adding a constraint.
    #[error("solver backend rejected a constraint: {0}")]
    Backend(String),
}

/// The solver backend's model is missing a value the extractor expected.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A declared variable has no value in the model returned by the solver.
    #[error("no value for variable {0:?} in the solver's model")]
    MissingValue(String),
}

/// The extracted schedule violates one of the invariants it is supposed to satisfy. This
/// indicates an internal bug in the constraint generator or the extractor.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// A frame instance completes after its deadline.
    #[error("frame {frame} link {link} instance {instance}: transmission ends at {end}, deadline is {deadline}")]
    DeadlineViolated {
        /// Offending frame id.
        frame: usize,
        /// Offending link id.
        link: usize,
        /// Offending instance index.
        instance: u32,
        /// Computed end time.
        end: i64,
        /// Declared deadline.
        deadline: i64,
    },
    /// Two instances are not spaced exactly one period apart.
    #[error("frame {frame} link {link}: instance {instance} is not exactly one period after the previous instance (got {actual}, expected {expected})")]
    PeriodicityViolated {
        /// Offending frame id.
        frame: usize,
        /// Offending link id.
        link: usize,
        /// Offending instance index.
        instance: u32,
        /// Observed spacing.
        actual: i64,
        /// Required spacing.
        expected: i64,
    },
    /// Two frames transmit on the same link at overlapping times.
    #[error("frames {frame_a} and {frame_b} contend on link {link}: windows [{start_a}, {end_a}) and [{start_b}, {end_b}) overlap")]
    ContentionViolated {
        /// First offending frame id.
        frame_a: usize,
        /// Second offending frame id.
        frame_b: usize,
        /// Shared link id.
        link: usize,
        /// First window start.
        start_a: i64,
        /// First window end (exclusive).
        end_a: i64,
        /// Second window start.
        start_b: i64,
        /// Second window end (exclusive).
        end_b: i64,
    },
    /// A frame is transmitted on its next hop before the previous hop could have relayed it.
    #[error("frame {frame}: link {link_b} starts at {start_b}, before link {link_a} (start {start_a}) plus hop delay {hop_delay}")]
    PathOrderViolated {
        /// Offending frame id.
        frame: usize,
        /// Earlier link in the path.
        link_a: usize,
        /// Later link in the path.
        link_b: usize,
        /// Start time of the earlier link.
        start_a: i64,
        /// Start time of the later link.
        start_b: i64,
        /// Hop delay that should separate them.
        hop_delay: i64,
    },
    /// A frame's path exceeds its end-to-end delay budget.
    #[error("frame {frame}: end-to-end delay {actual} exceeds budget {budget}")]
    EndToEndViolated {
        /// Offending frame id.
        frame: usize,
        /// Observed end-to-end delay.
        actual: i64,
        /// Declared budget.
        budget: i64,
    },
}

/// Top-level error returned by the synthesizer driver, composing every phase's error type.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Failure while reading the input document.
    #[error("input error: {0}")]
    Input(#[from] InputError),
    /// Failure while validating the ingested model.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    /// Failure while asserting constraints with the solver.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
    /// The solver proved the constraints unsatisfiable.
    #[error("no schedule satisfies the constraints")]
    Infeasible,
    /// Failure while reading the solver's model back into the schedule.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),
    /// The extracted schedule failed an independent correctness check.
    #[error("verification error: {0}")]
    Verification(#[from] VerificationError),
}

impl SchedulerError {
    /// Map this error onto a process exit code, so that a caller can distinguish failure
    /// categories without scraping the error message.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchedulerError::Input(_) => 1,
            SchedulerError::Model(_) => 2,
            SchedulerError::Encoding(_) => 3,
            SchedulerError::Infeasible => 4,
            SchedulerError::Extraction(_) => 5,
            SchedulerError::Verification(_) => 6,
        }
    }
}

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

//! Parses the network description and traffic information document into the raw parts a
//! [`crate::network::Network`] is built from.
//!
//! Link ids are not present in the document; a link's id is its zero-based position among
//! `<Link>` elements, and a frame's id is its zero-based position among `<Frame>` elements,
//! matching the original scheduler's convention (confirmed by its `IOInterface.c` reader, which
//! indexes both by loop counter rather than reading an id attribute).

use std::io::Read;

use xmltree::Element;

use crate::error::InputError;
use crate::network::{Frame, Link, Medium};

/// The raw, un-validated parts read from an input document. Handed to
/// [`crate::network::Network::new`] by the caller, which is where structural invariants (not
/// merely "does this element exist") are enforced.
#[derive(Debug)]
pub struct RawNetwork {
    /// Every declared link, in document order (document order is the id).
    pub links: Vec<Link>,
    /// Every declared frame, in document order (document order is the id).
    pub frames: Vec<Frame>,
    /// `GeneralInformation/HyperPeriod`.
    pub hyperperiod: i64,
    /// `GeneralInformation/MinimumTimeSwitch`.
    pub hop_delay: i64,
    /// `GeneralInformation/PeriodProtocol`, default 0.
    pub protocol_period: i64,
    /// `GeneralInformation/TimeProtocol`, default 0.
    pub protocol_time: i64,
    /// `GeneralInformation/TimeBetweenFrames`, default 0.
    pub min_inter_frame_gap: i64,
}

/// Parse a [`RawNetwork`] from an XML document read from `reader`.
pub fn load<R: Read>(reader: R) -> Result<RawNetwork, InputError> {
    let root = Element::parse(reader)?;

    let general = require_child(&root, "GeneralInformation")?;
    let number_links = int_child(general, "NumberLinks")?;
    let number_frames = int_child(general, "NumberFrames")?;
    let hyperperiod = int_child(general, "HyperPeriod")?;
    let hop_delay = int_child(general, "MinimumTimeSwitch")?;
    let protocol_period = optional_int_child(general, "PeriodProtocol")?;
    let protocol_time = optional_int_child(general, "TimeProtocol")?;
    let min_inter_frame_gap = optional_int_child(general, "TimeBetweenFrames")?;

    let links = load_links(&root)?;
    if links.len() as i64 != number_links {
        return Err(InputError::CountMismatch("NumberLinks", number_links, links.len(), "Link"));
    }
    let frames = load_frames(&root, links.len())?;
    if frames.len() as i64 != number_frames {
        return Err(InputError::CountMismatch(
            "NumberFrames",
            number_frames,
            frames.len(),
            "Frame",
        ));
    }

    Ok(RawNetwork {
        links,
        frames,
        hyperperiod,
        hop_delay,
        protocol_period,
        protocol_time,
        min_inter_frame_gap,
    })
}

/// Get a required child element, or an [`InputError::MissingElement`] naming it and its parent.
fn require_child<'a>(el: &'a Element, name: &'static str) -> Result<&'a Element, InputError> {
    el.get_child(name)
        .ok_or_else(|| InputError::MissingElement(name, el.name.clone()))
}

/// Get an element's text content, or an [`InputError::NoText`] naming it.
fn text<'a>(el: &'a Element, name: &'static str) -> Result<std::borrow::Cow<'a, str>, InputError> {
    el.get_text().ok_or(InputError::NoText(name))
}

/// Get a required child element's text content parsed as an integer.
fn int_child(el: &Element, name: &'static str) -> Result<i64, InputError> {
    let child = require_child(el, name)?;
    text(child, name)?
        .trim()
        .parse::<i64>()
        .map_err(|e| InputError::IntParse(name, e))
}

/// Get an optional child element's text content parsed as an integer, defaulting to 0 if the
/// element is absent (per `GeneralInformation/{PeriodProtocol,TimeProtocol,TimeBetweenFrames}`).
fn optional_int_child(el: &Element, name: &'static str) -> Result<i64, InputError> {
    match el.get_child(name) {
        None => Ok(0),
        Some(child) => text(child, name)?
            .trim()
            .parse::<i64>()
            .map_err(|e| InputError::IntParse(name, e)),
    }
}

/// Iterate over every direct child element named `name`, in document order.
fn elements<'a>(el: &'a Element, name: &'static str) -> impl Iterator<Item = &'a Element> {
    el.children
        .iter()
        .filter_map(|n| n.as_element())
        .filter(move |e| e.name == name)
}

/// Parse every `<Link>` under `/Network/NetworkDescription/Links`, assigning ids by document
/// order.
fn load_links(root: &Element) -> Result<Vec<Link>, InputError> {
    let network_description = require_child(root, "NetworkDescription")?;
    let links_el = require_child(network_description, "Links")?;
    elements(links_el, "Link")
        .enumerate()
        .map(|(id, link_el)| {
            let category = link_el
                .attributes
                .get("category")
                .ok_or(InputError::MissingAttribute("category", "Link"))?;
            let medium = match category.as_str() {
                "Wired" => Medium::Wired,
                "Wireless" => Medium::Wireless,
                other => return Err(InputError::UnknownLinkCategory(other.to_string())),
            };
            let speed_mbps = int_child(link_el, "Speed")?;
            Ok(Link { id, medium, speed_mbps })
        })
        .collect()
}

/// Parse a semicolon-separated list of link ids, rejecting any id outside `[0, links_len)` with
/// the offending frame's id attached (the Model layer re-checks this independently for networks
/// built without going through XML at all). `element` names the caller's element (`"Path"` or
/// `"Split"`) so a malformed entry's [`InputError::IntParse`] names the element it actually came
/// from.
fn parse_link_list(
    s: &str,
    element: &'static str,
    frame_id: usize,
    links_len: usize,
) -> Result<Vec<usize>, InputError> {
    s.split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            let id: usize = t.parse().map_err(|e| InputError::IntParse(element, e))?;
            if id >= links_len {
                return Err(InputError::UnknownLink(frame_id, id));
            }
            Ok(id)
        })
        .collect()
}

/// Parse every `<Frame>` under `/Network/TrafficInformation/Frames`, assigning ids by document
/// order.
fn load_frames(root: &Element, links_len: usize) -> Result<Vec<Frame>, InputError> {
    let traffic_information = require_child(root, "TrafficInformation")?;
    let frames_el = require_child(traffic_information, "Frames")?;
    elements(frames_el, "Frame")
        .enumerate()
        .map(|(id, frame_el)| load_frame(id, frame_el, links_len))
        .collect()
}

/// Parse one `<Frame>` element's general fields, paths and splits.
fn load_frame(id: usize, el: &Element, links_len: usize) -> Result<Frame, InputError> {
    let period = int_child(el, "Period")?;
    let deadline = int_child(el, "Deadline")?;
    let size = int_child(el, "Size")?;
    let end_to_end = int_child(el, "EndToEnd")?;
    let starting = optional_int_child(el, "Starting")?;

    let paths_el = require_child(el, "Paths")?;
    let paths = elements(paths_el, "Path")
        .map(|path_el| {
            let list = text(path_el, "Path")?;
            parse_link_list(&list, "Path", id, links_len)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let splits = match el.get_child("Splits") {
        None => Vec::new(),
        Some(splits_el) => elements(splits_el, "Split")
            .map(|split_el| {
                let list = text(split_el, "Split")?;
                parse_link_list(&list, "Split", id, links_len)
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(Frame::new(id, period, deadline, size, end_to_end, starting, paths, splits))
}

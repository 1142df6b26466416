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

//! Serialises a solved [`Network`] into the schedule document, excluding any injected protocol
//! frame, via the same `xmltree` DOM-tree style [`super::input`] reads with.

use std::io::Write;

use xmltree::{Element, XMLNode};

use crate::error::InputError;
use crate::network::Network;

/// Write the schedule document for every user frame of `net` (i.e. excluding the synthetic
/// protocol-reservation frame, if one was injected) to `writer`.
///
/// Every offset referenced by a path must already carry start times for all of its instances;
/// call this only after [`crate::driver::synthesize`] has returned successfully.
pub fn write<W: Write>(net: &Network, writer: W) -> Result<(), InputError> {
    let mut root = Element::new("Schedule");
    let mut frames_el = Element::new("FramesTransmission");

    for frame in net.user_frames() {
        let mut frame_el = Element::new("Frame");
        push_text(&mut frame_el, "FrameID", frame.id.to_string());
        push_text(&mut frame_el, "Period", frame.period.to_string());
        push_text(&mut frame_el, "Starting", frame.starting.to_string());
        push_text(&mut frame_el, "Deadline", frame.deadline.to_string());
        push_text(&mut frame_el, "Size", frame.size.to_string());
        push_text(&mut frame_el, "EndToEnd", frame.end_to_end.to_string());

        for path in &frame.paths {
            let mut path_el = Element::new("Path");
            for &link in path {
                let offset = frame.offset(link).expect("path link has an offset");
                let mut link_el = Element::new("Link");
                push_text(&mut link_el, "LinkID", link.to_string());

                for instance in 0..offset.instances {
                    let start = offset
                        .at(instance, 0)
                        .expect("offset was extracted before writing the schedule");
                    let mut instance_el = Element::new("Instance");
                    push_text(&mut instance_el, "InstanceID", instance.to_string());
                    push_text(&mut instance_el, "TransmissionTime", start.to_string());
                    push_text(
                        &mut instance_el,
                        "EndingTime",
                        (start + offset.duration - 1).to_string(),
                    );
                    link_el.children.push(XMLNode::Element(instance_el));
                }
                path_el.children.push(XMLNode::Element(link_el));
            }
            frame_el.children.push(XMLNode::Element(path_el));
        }

        frames_el.children.push(XMLNode::Element(frame_el));
    }

    root.children.push(XMLNode::Element(frames_el));
    root.write(writer)
        .map_err(|e| InputError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

/// Append a `<name>value</name>` child element.
fn push_text(el: &mut Element, name: &'static str, value: String) {
    let mut child = Element::new(name);
    child.children.push(XMLNode::Text(value));
    el.children.push(XMLNode::Element(child));
}

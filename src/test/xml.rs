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

//! XML ingestion edge cases: required `NumberLinks`/`NumberFrames` element validation and
//! per-element error naming for malformed `Path`/`Split` entries.

use test_log::test;

use crate::error::InputError;
use crate::xml;

fn doc(number_links: &str, number_frames: &str, links: &str, frames: &str) -> String {
    format!(
        r#"<Network>
  <GeneralInformation>
    <NumberFrames>{number_frames}</NumberFrames>
    <NumberLinks>{number_links}</NumberLinks>
    <MinimumTimeSwitch>0</MinimumTimeSwitch>
    <HyperPeriod>1000</HyperPeriod>
  </GeneralInformation>
  <NetworkDescription>
    <Links>{links}</Links>
  </NetworkDescription>
  <TrafficInformation>
    <Frames>{frames}</Frames>
  </TrafficInformation>
</Network>"#
    )
}

const ONE_LINK: &str = r#"<Link category="Wired"><Speed>100</Speed></Link>"#;

fn one_path_frame(path: &str) -> String {
    format!(r#"<Frame><Period>1000</Period><Deadline>1000</Deadline><Size>10</Size><EndToEnd>1000</EndToEnd><Paths><Path>{path}</Path></Paths></Frame>"#)
}

#[test]
fn missing_number_links_is_rejected() {
    let xml = doc("1", "1", ONE_LINK, &one_path_frame("0"));
    let xml = xml.replace("<NumberLinks>1</NumberLinks>", "");
    let err = xml::load(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, InputError::MissingElement("NumberLinks", _)), "got {err:?}");
}

#[test]
fn missing_number_frames_is_rejected() {
    let xml = doc("1", "1", ONE_LINK, &one_path_frame("0"));
    let xml = xml.replace("<NumberFrames>1</NumberFrames>", "");
    let err = xml::load(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, InputError::MissingElement("NumberFrames", _)), "got {err:?}");
}

#[test]
fn declared_link_count_mismatching_actual_links_is_rejected() {
    // declares 2 links but only one <Link> element is present
    let xml = doc("2", "1", ONE_LINK, &one_path_frame("0"));
    let err = xml::load(xml.as_bytes()).unwrap_err();
    match err {
        InputError::CountMismatch("NumberLinks", 2, 1, "Link") => {}
        other => panic!("expected a NumberLinks/Link count mismatch, got {other:?}"),
    }
}

#[test]
fn declared_frame_count_mismatching_actual_frames_is_rejected() {
    let xml = doc("1", "2", ONE_LINK, &one_path_frame("0"));
    let err = xml::load(xml.as_bytes()).unwrap_err();
    match err {
        InputError::CountMismatch("NumberFrames", 2, 1, "Frame") => {}
        other => panic!("expected a NumberFrames/Frame count mismatch, got {other:?}"),
    }
}

#[test]
fn malformed_path_entry_names_path_not_split() {
    let frame = r#"<Frame><Period>1000</Period><Deadline>1000</Deadline><Size>10</Size><EndToEnd>1000</EndToEnd><Paths><Path>not-a-number</Path></Paths></Frame>"#;
    let xml = doc("1", "1", ONE_LINK, frame);
    let err = xml::load(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, InputError::IntParse("Path", _)), "got {err:?}");
}

#[test]
fn malformed_split_entry_names_split_not_path() {
    let frame = r#"<Frame><Period>1000</Period><Deadline>1000</Deadline><Size>10</Size><EndToEnd>1000</EndToEnd><Paths><Path>0</Path></Paths><Splits><Split>not-a-number</Split></Splits></Frame>"#;
    let xml = doc("1", "1", ONE_LINK, frame);
    let err = xml::load(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, InputError::IntParse("Split", _)), "got {err:?}");
}

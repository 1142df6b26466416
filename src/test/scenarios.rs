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

use test_log::test;

use crate::driver::synthesize;
use crate::error::SchedulerError;
use crate::network::Network;
use crate::test::{link, net, one_path_frame};

#[test]
fn single_link_trivially_feasible() {
    let links = vec![link(0, 100)];
    let frames = vec![one_path_frame(0, 1000, 1000, 10, 1000, vec![0])];
    let network = net(links, frames, 1000, 0).unwrap();

    let solved = synthesize(network, None).unwrap();
    let frame = solved.frame(0).unwrap();
    let offset = frame.offset(0).unwrap();
    assert_eq!(offset.duration, 100);
    let start = offset.base().unwrap();
    assert!((1..=900).contains(&start), "start {start} out of [1, 900]");
}

#[test]
fn contention_forces_separation() {
    let links = vec![link(0, 100)];
    let frames = vec![
        one_path_frame(0, 500, 500, 10, 500, vec![0]),
        one_path_frame(1, 500, 500, 10, 500, vec![0]),
    ];
    let network = net(links, frames, 1000, 0).unwrap();

    let solved = synthesize(network, None).unwrap();
    let f0 = solved.frame(0).unwrap();
    let f1 = solved.frame(1).unwrap();
    let o0 = f0.offset(0).unwrap();
    let o1 = f1.offset(0).unwrap();

    for i0 in 0..o0.instances {
        let (s0, e0) = (o0.at(i0, 0).unwrap(), o0.at(i0, 0).unwrap() + o0.duration);
        for i1 in 0..o1.instances {
            let (s1, e1) = (o1.at(i1, 0).unwrap(), o1.at(i1, 0).unwrap() + o1.duration);
            assert!(s0 >= e1 || s1 >= e0, "windows [{s0},{e0}) and [{s1},{e1}) overlap");
        }
    }
}

#[test]
fn path_order_respects_hop_delay_and_duration() {
    let links = vec![link(0, 100), link(1, 100)];
    let frames = vec![one_path_frame(0, 1000, 1000, 10, 400, vec![0, 1])];
    let network = net(links, frames, 1000, 50).unwrap();

    let solved = synthesize(network, None).unwrap();
    let frame = solved.frame(0).unwrap();
    let o0 = frame.offset(0).unwrap();
    let o1 = frame.offset(1).unwrap();
    let x0 = o0.base().unwrap();
    let x1 = o1.base().unwrap();

    assert!(x1 >= x0 + 151, "x1={x1} should be at least x0(={x0}) + 151");
    assert!(x1 + o1.duration - x0 <= 400);
}

#[test]
fn end_to_end_budget_too_tight_is_infeasible() {
    let links = vec![link(0, 100), link(1, 100)];
    let frames = vec![one_path_frame(0, 1000, 1000, 10, 200, vec![0, 1])];
    let network = net(links, frames, 1000, 50).unwrap();

    let err = synthesize(network, None).unwrap_err();
    assert!(matches!(err, SchedulerError::Infeasible), "expected Infeasible, got {err:?}");
}

#[test]
fn periodicity_spaces_instances_by_exactly_one_period() {
    let links = vec![link(0, 100)];
    let frames = vec![one_path_frame(0, 1000, 1000, 10, 1000, vec![0])];
    let network = net(links, frames, 2000, 0).unwrap();

    let solved = synthesize(network, None).unwrap();
    let offset = solved.frame(0).unwrap().offset(0).unwrap();
    assert_eq!(offset.instances, 2);
    let base = offset.at(0, 0).unwrap();
    assert_eq!(offset.at(1, 0).unwrap(), base + 1000);
}

#[test]
fn protocol_reservation_leaves_room_for_user_frames() {
    let links = vec![link(0, 100), link(1, 100)];
    let frames = vec![
        one_path_frame(0, 500, 500, 10, 500, vec![0]),
        one_path_frame(1, 500, 500, 10, 500, vec![1]),
    ];
    let mut network = Network::new(links, frames, 1000, 0, 500, 100, 0).unwrap();
    network.initialize().unwrap();

    // the synthetic protocol frame reserves a 101 ns window on every link every 500 ns.
    let protocol = network
        .frames
        .iter()
        .find(|f| f.is_protocol)
        .expect("protocol frame injected");
    assert_eq!(protocol.period, 500);
    assert_eq!(protocol.paths.len(), 2);
    for (_, offset) in protocol.offsets() {
        assert_eq!(offset.duration, 101);
    }
    assert!(network.user_frames().count() == 2);
}

#[test]
fn model_rejects_protocol_period_not_dividing_hyperperiod() {
    let links = vec![link(0, 100), link(1, 100)];
    let frames = vec![
        one_path_frame(0, 500, 500, 10, 500, vec![0]),
        one_path_frame(1, 500, 500, 10, 500, vec![1]),
    ];
    let mut network = Network::new(links, frames, 1000, 0, 300, 100, 0).unwrap();
    let err = network.initialize().unwrap_err();
    assert!(
        matches!(err, crate::error::ModelError::HyperperiodMismatch(1000, _, 300)),
        "got {err:?}"
    );
}

#[test]
fn model_rejects_duration_that_leaves_no_slack() {
    // a 1-byte frame over a 1 MB/s link takes far longer to transmit than its 1 ns deadline
    // allows, leaving no room for a strictly positive start time.
    let links = vec![link(0, 1)];
    let frames = vec![one_path_frame(0, 1, 1, 1, 1, vec![0])];
    let mut network = net(links, frames, 1, 0).unwrap();
    let err = network.initialize().unwrap_err();
    assert!(matches!(err, crate::error::ModelError::NoSlackBeforeDeadline(..)));
}

#[test]
fn model_rejects_deadline_exceeding_period() {
    let links = vec![link(0, 100)];
    let frames = vec![one_path_frame(0, 1000, 1500, 10, 1500, vec![0])];
    let err = net(links, frames, 1000, 0).unwrap_err();
    assert!(matches!(err, crate::error::ModelError::DeadlineExceedsPeriod(..)));
}

#[test]
fn model_rejects_non_positive_hyperperiod() {
    let links = vec![link(0, 100)];
    let frames = vec![one_path_frame(0, 1000, 1000, 10, 1000, vec![0])];
    let err = net(links, frames, 0, 0).unwrap_err();
    assert!(matches!(err, crate::error::ModelError::NonPositiveHyperperiod(0)));
}

#[test]
fn model_rejects_non_positive_link_speed() {
    let links = vec![link(0, 0)];
    let frames = vec![one_path_frame(0, 1000, 1000, 10, 1000, vec![0])];
    let err = net(links, frames, 1000, 0).unwrap_err();
    assert!(matches!(err, crate::error::ModelError::NonPositiveLinkSpeed(0, 0)));
}

#[test]
fn model_rejects_negative_frame_size() {
    let links = vec![link(0, 100)];
    let frames = vec![one_path_frame(0, 1000, 1000, -1, 1000, vec![0])];
    let err = net(links, frames, 1000, 0).unwrap_err();
    assert!(matches!(err, crate::error::ModelError::NegativeSize(0, -1)));
}

#[test]
fn two_runs_over_identical_input_agree_on_variable_count() {
    let build = || {
        let links = vec![link(0, 100), link(1, 100)];
        let frames = vec![
            one_path_frame(0, 1000, 1000, 10, 1000, vec![0, 1]),
            one_path_frame(1, 500, 500, 10, 500, vec![0]),
        ];
        let mut network = net(links, frames, 1000, 10).unwrap();
        network.initialize().unwrap();
        network
    };

    let a = build();
    let b = build();
    let vars_a = crate::constraints::declare_variables(&a, &mut crate::solver::CbcSolver::new(a.hyperperiod, None));
    let vars_b = crate::constraints::declare_variables(&b, &mut crate::solver::CbcSolver::new(b.hyperperiod, None));
    let keys_a: std::collections::BTreeSet<_> = vars_a.keys().collect();
    let keys_b: std::collections::BTreeSet<_> = vars_b.keys().collect();
    pretty_assertions_sorted::assert_eq!(keys_a, keys_b);
}

#[test]
fn verifying_a_synthesized_schedule_always_passes() {
    let links = vec![link(0, 100)];
    let frames = vec![one_path_frame(0, 1000, 1000, 10, 1000, vec![0])];
    let network = net(links, frames, 1000, 0).unwrap();
    let solved = synthesize(network, None).unwrap();
    crate::verify::verify(&solved).expect("an already-verified schedule must re-verify cleanly");
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use repograph::graph::build_graph;
use repograph::types::RepoSnapshot;

fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = serde_json::from_slice::<RepoSnapshot>(data) {
        let graph = build_graph(&snapshot);
        assert_eq!(graph.node_count(), snapshot.branches.len() + snapshot.deployments.len());
        assert!(graph.validate().is_empty());
    }
});

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use repograph::github::parse_repo_url;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok((owner, name)) = parse_repo_url(text) {
            assert!(!owner.is_empty() && !name.is_empty());
            assert!(!owner.contains('/') && !name.contains('/'));
        }
    }
});

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use repograph::share;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Some(state) = share::from_url(text) {
            if state.is_well_formed() {
                let token = share::encode(&state).expect("decoded state re-encodes");
                assert_eq!(share::decode(&token), Some(state));
            }
        }
    }
});

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Share links - view state packed into a URL query parameter
//!
//! A token is the JSON form of a [`ShareableState`], base64 encoded and then
//! percent encoded. Tokens carry no version, signature or compression; they
//! only ever seed client-side view state.

use crate::types::ShareableState;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Query parameter that carries the token
pub const SHARE_PARAM: &str = "share";

/// Errors producing a share token or link
#[derive(Debug, Error)]
pub enum ShareError {
    /// Zoom or position would not survive a round-trip
    #[error("shareable state is not well-formed: {0}")]
    InvalidState(String),
    /// State could not be serialized
    #[error("failed to serialize shareable state")]
    Serialize(#[from] serde_json::Error),
    /// Origin is not an absolute URL
    #[error("invalid origin {origin:?}")]
    InvalidOrigin {
        /// Origin as given
        origin: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },
}

/// Encode a view state into a URL-safe token
pub fn encode(state: &ShareableState) -> Result<String, ShareError> {
    if !state.is_well_formed() {
        return Err(ShareError::InvalidState(format!(
            "zoom={:?} position={:?}",
            state.zoom, state.position
        )));
    }
    let json = serde_json::to_string(state)?;
    let token = urlencoding::encode(&STANDARD.encode(json)).into_owned();
    debug!(repo = %state.repo_url, len = token.len(), "encoded share token");
    Ok(token)
}

/// Decode a token back into a view state.
///
/// Broken or tampered tokens yield `None`; the failure is logged, never
/// returned.
#[must_use]
pub fn decode(token: &str) -> Option<ShareableState> {
    let base64_text = match urlencoding::decode(token) {
        Ok(text) => text,
        Err(e) => {
            warn!("share token is not valid percent-encoding: {}", e);
            return None;
        }
    };

    let json = match STANDARD.decode(base64_text.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("share token is not valid base64: {}", e);
            return None;
        }
    };

    match serde_json::from_slice::<ShareableState>(&json) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!("share token does not hold a view state: {}", e);
            None
        }
    }
}

/// Build a full share link: `origin` with the token under [`SHARE_PARAM`]
pub fn create_shareable_url(origin: &str, state: &ShareableState) -> Result<String, ShareError> {
    let mut url = Url::parse(origin).map_err(|source| ShareError::InvalidOrigin {
        origin: origin.to_string(),
        source,
    })?;
    let token = encode(state)?;
    url.set_query(Some(&format!("{SHARE_PARAM}={token}")));
    Ok(url.into())
}

/// Restore the view state carried by a share link, if any.
///
/// Accepts either a full URL or a bare token.
#[must_use]
pub fn from_url(link: &str) -> Option<ShareableState> {
    let Ok(url) = Url::parse(link) else {
        return decode(link);
    };

    // The raw query is used so the token goes through a single percent-decode.
    let token = url.query()?.split('&').find_map(|pair| {
        pair.strip_prefix(SHARE_PARAM)
            .and_then(|rest| rest.strip_prefix('='))
    });

    match token {
        Some(token) => decode(token),
        None => {
            debug!("link carries no {} parameter", SHARE_PARAM);
            None
        }
    }
}

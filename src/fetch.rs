// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Authenticated GET requests against the GitHub REST API
//!
//! [`AuthFetch`] attaches the stored bearer token to every request. When the
//! API answers 401, or 403 with a rate-limit message, it asks an injected
//! [`AuthPrompt`] for a new token, stores it and retries the request. The
//! number of such re-authentications per request is bounded.

use crate::credentials::{CredentialError, CredentialProvider};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Accept header sent with every request
pub const ACCEPT: &str = "application/vnd.github.v3+json";

/// Re-authentications allowed per request unless configured otherwise
pub const DEFAULT_MAX_REAUTH: u32 = 1;

/// Errors from the fetch layer
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, propagated untouched
    #[error("request to {url} failed")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Non-success status where a success was required
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
    /// Body did not match the expected shape
    #[error("unexpected response body from {url}")]
    Decode {
        /// Requested URL
        url: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },
    /// The token store could not be updated
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

/// A GET request as handed to a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Target URL
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(&'static str, String)>,
}

impl ApiRequest {
    /// Value of a header, if present
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl ApiResponse {
    /// Response with the given status and body
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes GET requests
pub trait Transport: Send + Sync {
    /// Perform one request; only network-level failures are errors
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError>;
}

/// Blocking `reqwest` transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Client identifying itself with `user_agent`, as GitHub requires
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                source: Box::new(e),
            })?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let transport_err = |e: reqwest::Error| FetchError::Transport {
            url: request.url.clone(),
            source: Box::new(e),
        };

        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        let response = builder.send().map_err(transport_err)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_err)?;
        Ok(ApiResponse { status, body })
    }
}

/// Why a new token is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// HTTP 401, the stored token was rejected and has been cleared
    Unauthorized,
    /// HTTP 403 with a rate-limit message
    RateLimited,
}

impl AuthFailure {
    fn classify(response: &ApiResponse) -> Option<Self> {
        match response.status {
            401 => Some(Self::Unauthorized),
            403 if response.body.to_lowercase().contains("rate limit") => Some(Self::RateLimited),
            _ => None,
        }
    }
}

/// Supplies a replacement token when the API refuses a request.
/// Returning `None` or an empty string declines.
pub trait AuthPrompt {
    /// Ask for a token
    fn request_token(&self, failure: AuthFailure) -> Option<String>;
}

impl<F> AuthPrompt for F
where
    F: Fn(AuthFailure) -> Option<String>,
{
    fn request_token(&self, failure: AuthFailure) -> Option<String> {
        self(failure)
    }
}

/// Prompt that always declines
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl AuthPrompt for NoPrompt {
    fn request_token(&self, _failure: AuthFailure) -> Option<String> {
        None
    }
}

/// GET wrapper with bearer-token injection and interactive re-authentication
pub struct AuthFetch {
    transport: Box<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    prompt: Box<dyn AuthPrompt>,
    max_reauth: u32,
}

impl AuthFetch {
    /// Wrapper that never prompts
    pub fn new(transport: impl Transport + 'static, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            transport: Box::new(transport),
            credentials,
            prompt: Box::new(NoPrompt),
            max_reauth: DEFAULT_MAX_REAUTH,
        }
    }

    /// Use `prompt` to recover from authorization failures
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl AuthPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Allow at most `attempts` re-authentications per request
    #[must_use]
    pub fn with_max_reauth(mut self, attempts: u32) -> Self {
        self.max_reauth = attempts;
        self
    }

    fn request(&self, url: &str) -> ApiRequest {
        let mut headers = vec![("Accept", ACCEPT.to_string())];
        if let Some(token) = self.credentials.get() {
            headers.push(("Authorization", format!("Bearer {token}")));
        }
        ApiRequest {
            url: url.to_string(),
            headers,
        }
    }

    /// GET `url`.
    ///
    /// Any status is returned as-is except 401 and rate-limited 403, which
    /// trigger the prompt. If the prompt declines or the budget is spent,
    /// the last refused response is returned unmodified.
    pub fn get(&self, url: &str) -> Result<ApiResponse, FetchError> {
        debug!("GET {}", url);
        let mut response = self.transport.get(&self.request(url))?;
        let mut reauths = 0;

        while let Some(failure) = AuthFailure::classify(&response) {
            if reauths >= self.max_reauth {
                warn!(
                    "{} still refused after {} re-authentication(s), giving up",
                    url, reauths
                );
                break;
            }

            if failure == AuthFailure::Unauthorized {
                self.credentials.clear()?;
            }
            info!("{} answered HTTP {}, requesting a new token", url, response.status);

            let token = self
                .prompt
                .request_token(failure)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            let Some(token) = token else {
                debug!("token prompt declined");
                break;
            };

            self.credentials.set(&token)?;
            reauths += 1;
            response = self.transport.get(&self.request(url))?;
        }

        Ok(response)
    }

    /// GET `url` and decode a successful JSON body
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.get(url)?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
                body: response.body,
            });
        }
        serde_json::from_str(&response.body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{ApiRequest, ApiResponse, FetchError, Transport};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned responses and records every request
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedTransport {
        responses: Arc<Mutex<VecDeque<ApiResponse>>>,
        requests: Arc<Mutex<Vec<ApiRequest>>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(responses: Vec<ApiResponse>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into())),
                requests: Arc::default(),
            }
        }

        pub(crate) fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| FetchError::Transport {
                    url: request.url.clone(),
                    source: "connection refused".into(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::ScriptedTransport;
    use crate::credentials::MemoryCredentials;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const URL: &str = "https://api.github.com/repos/a/b";
    const RATE_LIMITED: &str = r#"{"message":"API rate limit exceeded for 127.0.0.1."}"#;

    fn counting_prompt(
        answers: Vec<Option<&'static str>>,
    ) -> (impl AuthPrompt, Arc<Mutex<Vec<AuthFailure>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let answers = Mutex::new(VecDeque::from(answers));
        let log = Arc::clone(&seen);
        let prompt = move |failure: AuthFailure| {
            log.lock().unwrap().push(failure);
            answers.lock().unwrap().pop_front().flatten().map(String::from)
        };
        (prompt, seen)
    }

    #[test]
    fn test_headers_without_token() {
        let transport = ScriptedTransport::new(vec![ApiResponse::new(200, "{}")]);
        let fetch = AuthFetch::new(transport.clone(), Arc::new(MemoryCredentials::new()));

        fetch.get(URL).unwrap();
        let sent = &transport.requests()[0];
        assert_eq!(sent.header("accept"), Some(ACCEPT));
        assert_eq!(sent.header("Authorization"), None);
    }

    #[test]
    fn test_headers_with_token() {
        let transport = ScriptedTransport::new(vec![ApiResponse::new(200, "{}")]);
        let fetch = AuthFetch::new(transport.clone(), Arc::new(MemoryCredentials::with_token("t0")));

        fetch.get(URL).unwrap();
        assert_eq!(transport.requests()[0].header("Authorization"), Some("Bearer t0"));
    }

    #[test]
    fn test_other_statuses_pass_through() {
        for status in [200, 404, 500] {
            let transport = ScriptedTransport::new(vec![ApiResponse::new(status, "body")]);
            let (prompt, seen) = counting_prompt(vec![Some("never")]);
            let fetch = AuthFetch::new(transport.clone(), Arc::new(MemoryCredentials::new()))
                .with_prompt(prompt);

            let response = fetch.get(URL).unwrap();
            assert_eq!(response, ApiResponse::new(status, "body"));
            assert_eq!(transport.requests().len(), 1);
            assert!(seen.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn test_unauthorized_clears_then_retries() {
        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(401, r#"{"message":"Bad credentials"}"#),
            ApiResponse::new(200, "ok"),
        ]);
        let credentials = Arc::new(MemoryCredentials::with_token("stale"));
        let (prompt, seen) = counting_prompt(vec![Some("  fresh\n")]);
        let fetch = AuthFetch::new(transport.clone(), credentials.clone()).with_prompt(prompt);

        let response = fetch.get(URL).unwrap();
        assert_eq!(response.body, "ok");
        assert_eq!(*seen.lock().unwrap(), vec![AuthFailure::Unauthorized]);
        assert_eq!(credentials.get().as_deref(), Some("fresh"));

        let requests = transport.requests();
        assert_eq!(requests[0].header("Authorization"), Some("Bearer stale"));
        assert_eq!(requests[1].header("Authorization"), Some("Bearer fresh"));
    }

    #[test]
    fn test_unauthorized_declined_returns_original() {
        let transport = ScriptedTransport::new(vec![ApiResponse::new(401, "nope")]);
        let credentials = Arc::new(MemoryCredentials::with_token("stale"));
        let (prompt, _) = counting_prompt(vec![Some("")]);
        let fetch = AuthFetch::new(transport.clone(), credentials.clone()).with_prompt(prompt);

        let response = fetch.get(URL).unwrap();
        assert_eq!(response, ApiResponse::new(401, "nope"));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(credentials.get(), None);
    }

    #[test]
    fn test_rate_limited_retries_with_new_token() {
        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(403, RATE_LIMITED),
            ApiResponse::new(200, "[]"),
        ]);
        let credentials = Arc::new(MemoryCredentials::new());
        let (prompt, seen) = counting_prompt(vec![Some("ghp_new")]);
        let fetch = AuthFetch::new(transport.clone(), credentials.clone()).with_prompt(prompt);

        assert!(fetch.get(URL).unwrap().is_success());
        assert_eq!(*seen.lock().unwrap(), vec![AuthFailure::RateLimited]);
        assert_eq!(transport.requests()[1].header("Authorization"), Some("Bearer ghp_new"));
    }

    #[test]
    fn test_rate_limited_declined_keeps_token() {
        let transport = ScriptedTransport::new(vec![ApiResponse::new(403, RATE_LIMITED)]);
        let credentials = Arc::new(MemoryCredentials::with_token("kept"));
        let fetch = AuthFetch::new(transport, credentials.clone());

        assert_eq!(fetch.get(URL).unwrap().status, 403);
        assert_eq!(credentials.get().as_deref(), Some("kept"));
    }

    #[test]
    fn test_plain_forbidden_is_not_retried() {
        let transport = ScriptedTransport::new(vec![ApiResponse::new(403, "Resource not accessible")]);
        let (prompt, seen) = counting_prompt(vec![Some("unused")]);
        let fetch = AuthFetch::new(transport.clone(), Arc::new(MemoryCredentials::new()))
            .with_prompt(prompt);

        assert_eq!(fetch.get(URL).unwrap().status, 403);
        assert_eq!(transport.requests().len(), 1);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reauth_budget_is_bounded() {
        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(401, "first"),
            ApiResponse::new(401, "second"),
            ApiResponse::new(401, "third"),
        ]);
        let (prompt, seen) = counting_prompt(vec![Some("bad1"), Some("bad2"), Some("bad3")]);
        let fetch = AuthFetch::new(transport.clone(), Arc::new(MemoryCredentials::new()))
            .with_prompt(prompt);

        let response = fetch.get(URL).unwrap();
        assert_eq!(response.body, "second");
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_larger_budget() {
        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(401, "first"),
            ApiResponse::new(401, "second"),
            ApiResponse::new(200, "third"),
        ]);
        let (prompt, _) = counting_prompt(vec![Some("bad"), Some("good")]);
        let fetch = AuthFetch::new(transport.clone(), Arc::new(MemoryCredentials::new()))
            .with_prompt(prompt)
            .with_max_reauth(3);

        assert_eq!(fetch.get(URL).unwrap().body, "third");
        assert_eq!(transport.requests()[2].header("Authorization"), Some("Bearer good"));
    }

    #[test]
    fn test_transport_errors_propagate() {
        let fetch = AuthFetch::new(ScriptedTransport::new(vec![]), Arc::new(MemoryCredentials::new()));
        assert!(matches!(fetch.get(URL), Err(FetchError::Transport { .. })));
    }

    #[test]
    fn test_get_json() {
        #[derive(serde::Deserialize)]
        struct Repo {
            name: String,
        }

        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(200, r#"{"name":"b"}"#),
            ApiResponse::new(404, r#"{"message":"Not Found"}"#),
            ApiResponse::new(200, "<html>"),
        ]);
        let fetch = AuthFetch::new(transport, Arc::new(MemoryCredentials::new()));

        assert_eq!(fetch.get_json::<Repo>(URL).unwrap().name, "b");
        assert!(matches!(
            fetch.get_json::<Repo>(URL),
            Err(FetchError::Status { status: 404, .. })
        ));
        assert!(matches!(fetch.get_json::<Repo>(URL), Err(FetchError::Decode { .. })));
    }
}

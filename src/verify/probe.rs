// src/verify/probe.rs
use async_trait::async_trait;
use reqwest::{header, redirect, Client};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::VerifyError;

pub const LINK_CHECK_USER_AGENT: &str = "BizAI-LinkChecker/1.0 (Educational Purpose)";

/// Request shape of one liveness attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeShape {
    /// HEAD, 5 s timeout, up to 3 redirects. Any status below 500 classifies.
    Head,
    /// GET of the first KiB, 3 s timeout, up to 2 redirects. Only 2xx classifies.
    RangedGet,
}

#[async_trait]
pub trait LinkProbe: Send + Sync {
    /// HTTP status the attempt settled on, or why it could not classify.
    async fn probe(&self, url: &str, shape: ProbeShape) -> Result<u16, VerifyError>;
}

pub struct HttpProbe {
    head: Client,
    get: Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, VerifyError> {
        let head = Client::builder()
            .user_agent(LINK_CHECK_USER_AGENT)
            .timeout(Duration::from_secs(5))
            .redirect(redirect::Policy::limited(3))
            .build()?;
        let get = Client::builder()
            .user_agent(LINK_CHECK_USER_AGENT)
            .timeout(Duration::from_secs(3))
            .redirect(redirect::Policy::limited(2))
            .build()?;
        Ok(Self { head, get })
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn probe(&self, url: &str, shape: ProbeShape) -> Result<u16, VerifyError> {
        match shape {
            ProbeShape::Head => {
                let status = self.head.head(url).send().await?.status().as_u16();
                if status >= 500 {
                    return Err(VerifyError::Status(status));
                }
                Ok(status)
            }
            ProbeShape::RangedGet => {
                let resp = self
                    .get
                    .get(url)
                    .header(header::RANGE, "bytes=0-1023")
                    .send()
                    .await?;
                let status = resp.status().as_u16();
                // Dropping the response aborts the body transfer.
                drop(resp);
                if !(200..300).contains(&status) {
                    return Err(VerifyError::Status(status));
                }
                Ok(status)
            }
        }
    }
}

type ProbeFn = dyn Fn(&str, ProbeShape) -> Result<u16, VerifyError> + Send + Sync;

/// Closure-backed probe for tests; records every attempt.
pub struct FnProbe {
    respond: Box<ProbeFn>,
    calls: Mutex<Vec<(String, ProbeShape)>>,
}

impl FnProbe {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str, ProbeShape) -> Result<u16, VerifyError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every url answers `status` on HEAD.
    pub fn always(status: u16) -> Self {
        Self::new(move |_, _| Ok(status))
    }

    pub fn calls(&self) -> Vec<(String, ProbeShape)> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[async_trait]
impl LinkProbe for FnProbe {
    async fn probe(&self, url: &str, shape: ProbeShape) -> Result<u16, VerifyError> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((url.to_string(), shape));
        (self.respond)(url, shape)
    }
}

//! Test doubles shared across modules.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::net::{HttpFetch, HttpResponse, TransportError};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a status and body.
    Respond(u16, Vec<u8>),
    /// Never respond.
    Hang,
    /// Fail at the transport layer.
    Broken(&'static str),
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Reply::Respond(200, body.into())
    }

    pub fn status(status: u16) -> Self {
        Reply::Respond(status, Vec::new())
    }
}

/// [`HttpFetch`] that replays a fixed script and records every request.
///
/// Once the script runs out the last reply repeats. Panics if it was empty,
/// since that means the test did not expect network traffic.
pub struct ScriptedFetch {
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedFetch {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A fetcher that must never be called.
    pub fn offline() -> Self {
        Self::new([])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn header(&self, index: usize, name: &str) -> Option<String> {
        self.requests.lock().unwrap()[index]
            .1
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl HttpFetch for ScriptedFetch {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push((
            url.to_string(),
            headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        ));

        let reply = {
            let next = self.script.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            match next {
                Some(reply) => {
                    *last = Some(reply.clone());
                    reply
                }
                None => last
                    .clone()
                    .unwrap_or_else(|| panic!("unexpected request to {}", url)),
            }
        };

        match reply {
            Reply::Respond(status, body) => Ok(HttpResponse { status, body }),
            Reply::Hang => std::future::pending().await,
            Reply::Broken(message) => Err(TransportError {
                url: url.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

//! Transport seam and response envelope

use log::trace;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{SceneError, SceneResult};

/// Status text of a successful command
pub const STATUS_OK: &str = "ok";

/// Blocking request/response transport to the simulator
///
/// Implementations send one text command and wait for its reply. Timeouts
/// and retries belong to the implementation.
pub trait RequestClient {
    /// Send `command` and return the raw reply
    fn request(&mut self, command: &str) -> SceneResult<String>;
}

impl<T: RequestClient + ?Sized> RequestClient for &mut T {
    fn request(&mut self, command: &str) -> SceneResult<String> {
        (**self).request(command)
    }
}

/// Reply envelope `{status, outputs}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response<T> {
    /// `"ok"` or an error description
    pub status: String,
    /// Command payload, absent on most failures
    #[serde(default)]
    pub outputs: Option<T>,
}

impl<T> Response<T> {
    /// Whether the simulator reported success
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Simulator handle holding its transport
#[derive(Debug)]
pub struct Simulator<C: RequestClient> {
    client: C,
}

impl<C: RequestClient> Simulator<C> {
    /// Wrap a transport
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Borrow the transport
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Unwrap the transport
    pub fn into_inner(self) -> C {
        self.client
    }

    fn exchange(&mut self, command: &str) -> SceneResult<Option<Value>> {
        trace!("-> {command}");
        let reply = self.client.request(command)?;
        trace!("<- {reply}");
        let response: Response<Value> = serde_json::from_str(&reply).map_err(|err| {
            SceneError::malformed(format!("reply to `{command}` is not a status envelope: {err}"))
        })?;
        if response.is_ok() {
            Ok(response.outputs)
        } else {
            Err(SceneError::CollaboratorFault { command: command.to_string(), status: response.status })
        }
    }

    /// Issue a command whose reply carries only a status
    pub(crate) fn call_status(&mut self, command: &str) -> SceneResult<()> {
        self.exchange(command).map(|_| ())
    }

    /// Issue a command and decode its `outputs`
    pub(crate) fn call<T: DeserializeOwned>(&mut self, command: &str) -> SceneResult<T> {
        let outputs = self
            .exchange(command)?
            .ok_or_else(|| SceneError::malformed(format!("reply to `{command}` carries no outputs")))?;
        T::deserialize(outputs)
            .map_err(|err| SceneError::malformed(format!("outputs of `{command}`: {err}")))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Transport replaying canned replies and recording commands
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedClient {
        pub replies: VecDeque<String>,
        pub sent: Vec<String>,
    }

    impl ScriptedClient {
        pub(crate) fn with_replies(replies: &[&str]) -> Self {
            Self { replies: replies.iter().map(|r| (*r).to_string()).collect(), sent: Vec::new() }
        }
    }

    impl RequestClient for ScriptedClient {
        fn request(&mut self, command: &str) -> SceneResult<String> {
            self.sent.push(command.to_string());
            self.replies
                .pop_front()
                .ok_or_else(|| SceneError::not_found("scripted reply"))
        }
    }

    #[test]
    fn test_status_is_checked_before_outputs() {
        let mut sim = Simulator::new(ScriptedClient::with_replies(&[
            r#"{"status": "object not found", "outputs": "chair"}"#,
        ]));
        let result: SceneResult<Vec<i32>> = sim.call("lych obj get_aabb chair");
        match result {
            Err(SceneError::CollaboratorFault { command, status }) => {
                assert_eq!(command, "lych obj get_aabb chair");
                assert_eq!(status, "object not found");
            }
            other => panic!("expected a collaborator fault, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_envelope_and_missing_outputs() {
        let mut sim = Simulator::new(ScriptedClient::with_replies(&["not json", r#"{"status": "ok"}"#]));
        assert!(matches!(sim.call::<Vec<i32>>("a"), Err(SceneError::Malformed(_))));
        assert!(matches!(sim.call::<Vec<i32>>("b"), Err(SceneError::Malformed(_))));
    }

    #[test]
    fn test_status_only_reply() {
        let mut sim = Simulator::new(ScriptedClient::with_replies(&[r#"{"status": "ok"}"#]));
        sim.call_status("lych obj del chair").unwrap();
        assert_eq!(sim.client().sent, vec!["lych obj del chair"]);

        let client = sim.into_inner();
        assert!(client.replies.is_empty());
        assert_eq!(client.sent.len(), 1);
    }
}

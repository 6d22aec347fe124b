//! Host health ping.

use courier_protocol::{WorkerStatusRequest, WorkerStatusResponse};

use crate::handler::Execute;

/// Answers health pings; the status envelope alone is the reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerStatusHandler;

impl Execute for WorkerStatusHandler {
    type Request = WorkerStatusRequest;
    type Response = WorkerStatusResponse;

    fn execute(
        &mut self,
        _request: &WorkerStatusRequest,
        _response: &mut WorkerStatusResponse,
    ) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

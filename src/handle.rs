//! Async front door to a [`Machine`] owned by a single task.
//!
//! Callers share a cloneable [`MachineHandle`]; the machine itself lives in
//! one spawned task and applies calls in arrival order.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use crate::machine::Machine;
use crate::model::Request;
use crate::protocol::Response;

const CHANNEL_CAPACITY: usize = 16;

/// A request paired with where to send its response.
#[derive(Debug)]
pub struct Call {
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

#[derive(Debug, Error)]
pub enum HandleError {
    #[error("machine task is no longer running")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct MachineHandle {
    sender: mpsc::Sender<Call>,
}

impl MachineHandle {
    /// Move `machine` into its own task.
    ///
    /// The task ends once every handle is dropped and hands the machine back.
    pub fn spawn(machine: Machine) -> (Self, JoinHandle<Machine>) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(async move {
            let mut machine = machine;
            machine.run(ReceiverStream::new(receiver)).await;
            machine
        });
        (Self { sender }, task)
    }

    pub async fn call(&self, request: Request) -> Result<Response, HandleError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Call { request, reply })
            .await
            .map_err(|_| HandleError::Closed)?;
        response.await.map_err(|_| HandleError::Closed)
    }
}

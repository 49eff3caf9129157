//! A single thread owns the strips. Everything else talks to it through a
//! queue, so a command always renders, masks and flushes every strip before
//! the next one starts.

use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Error};
use log::{error, info};
use tokio::sync::{mpsc, oneshot};

use super::{LightCommand, LightController};

const QUEUE_DEPTH: usize = 100;

struct Request {
    command: LightCommand,
    reply: oneshot::Sender<Result<(), Error>>,
}

/// Cheap to clone; every clone feeds the same worker
#[derive(Clone)]
pub struct LightHandle {
    queue: mpsc::Sender<Request>,
}

impl LightHandle {
    /// Queue a command and wait until it has been shown
    pub async fn send(&self, command: LightCommand) -> Result<(), Error> {
        let (reply, done) = oneshot::channel();
        self.queue
            .send(Request { command, reply })
            .await
            .map_err(|_| anyhow!("light worker has stopped"))?;
        done.await
            .map_err(|_| anyhow!("light worker dropped the {:?} command", command))?
    }
}

pub struct LightWorker {
    handle: LightHandle,
    thread: JoinHandle<()>,
}

impl LightWorker {
    /// Start the worker thread and build the controller on it. Returns once
    /// the hardware is up, or with the error that stopped it.
    pub async fn spawn<F>(open: F) -> Result<Self, Error>
    where
        F: FnOnce() -> Result<LightController, Error> + Send + 'static,
    {
        let (queue, requests) = mpsc::channel(QUEUE_DEPTH);
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread = thread::Builder::new()
            .name("lights".to_string())
            .spawn(move || match open() {
                Ok(lights) => {
                    let _ = ready_tx.send(Ok(()));
                    run(lights, requests);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .context("spawning light worker")?;

        ready_rx
            .await
            .map_err(|_| anyhow!("light worker exited during startup"))?
            .context("initializing strips")?;

        Ok(Self {
            handle: LightHandle { queue },
            thread,
        })
    }

    pub fn handle(&self) -> LightHandle {
        self.handle.clone()
    }

    /// Close the queue and wait for the worker to clear the strips and
    /// release the hardware. Outstanding handles must be dropped first or
    /// this waits for them.
    pub async fn shutdown(self) -> Result<(), Error> {
        let Self { handle, thread } = self;
        drop(handle);

        tokio::task::spawn_blocking(move || thread.join())
            .await?
            .map_err(|_| anyhow!("light worker panicked"))
    }
}

fn run(mut lights: LightController, mut requests: mpsc::Receiver<Request>) {
    info!("Light worker running");

    while let Some(Request { command, reply }) = requests.blocking_recv() {
        let result = lights.execute(command);
        if let Err(e) = &result {
            error!("{:?} failed: {:#}", command, e);
        }
        // The requester may have given up
        let _ = reply.send(result);
    }

    info!("Light worker stopping, clearing strips");
    if let Err(e) = lights.clear_all() {
        error!("Failed to clear strips on shutdown: {:#}", e);
    }
    // Dropping the controller releases the hardware
}

use anyhow::{anyhow, Context, Result};
use crossbeam::channel::{self, Receiver, Sender};
use netscope_layout::{LayoutEngine, LayoutError, PositionMap, Subgraph};
use std::thread::JoinHandle;
use tracing::{debug, info};

struct Job {
    subgraph: Subgraph,
    reply: Sender<Result<PositionMap, LayoutError>>,
}

/// Runs layout requests one at a time on a dedicated thread
///
/// Requests go through a rendezvous channel: [`LayoutWorker::submit`] blocks
/// until the worker is idle, so at most one layout is in flight and a new
/// request waits for the previous one to finish. Running requests are never
/// cancelled.
pub struct LayoutWorker {
    tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl LayoutWorker {
    pub fn spawn<E>(engine: E) -> Result<Self>
    where
        E: LayoutEngine + Send + 'static,
    {
        let (tx, rx) = channel::bounded::<Job>(0);
        let handle = std::thread::Builder::new()
            .name("layout".to_string())
            .spawn(move || {
                for job in rx {
                    debug!(
                        "Layout of {} nodes started",
                        job.subgraph.node_count()
                    );
                    let result = engine.layout(&job.subgraph);
                    // The requester may have given up on the answer
                    let _ = job.reply.send(result);
                }
                debug!("Layout worker stopped");
            })
            .context("Failed to spawn the layout thread")?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Hand `subgraph` to the worker, waiting until it is free
    pub fn submit(&self, subgraph: Subgraph) -> Result<Receiver<Result<PositionMap, LayoutError>>> {
        let (reply, result) = channel::bounded(1);
        let tx = self.tx.as_ref().ok_or_else(|| anyhow!("Layout worker is shut down"))?;
        tx.send(Job { subgraph, reply })
            .map_err(|_| anyhow!("Layout worker has stopped"))?;
        Ok(result)
    }

    /// Lay out `subgraph` and wait for the positions
    pub fn layout(&self, subgraph: Subgraph) -> Result<PositionMap> {
        let nodes = subgraph.node_count();
        let positions = self
            .submit(subgraph)?
            .recv()
            .context("Layout worker dropped the request")??;
        info!("Layout ready for {nodes} nodes");
        Ok(positions)
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

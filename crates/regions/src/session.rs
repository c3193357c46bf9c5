//! The editing session: a single task owning the [`TraceBuilder`].
//!
//! Requests travel through a bounded channel and are handled strictly one
//! after another, which is what keeps the builder free of locks. Every change
//! to the trace publishes a fresh [`TraceSnapshot`] for renderers.

use capture::{InputEvent, TraceBuilder, TraceOptions, TraceSnapshot};
use model::Region;
use tokio::sync::{mpsc, oneshot, watch};

use crate::{client::Client, database::Database, RequestResult};

#[derive(Debug)]
pub enum Request {
    Input {
        event: InputEvent,
        responder: oneshot::Sender<TraceSnapshot>,
    },
    Snapshot {
        responder: oneshot::Sender<TraceSnapshot>,
    },
    Finalize {
        responder: oneshot::Sender<RequestResult<Region>>,
    },
}

/// Cheap to clone; all clones talk to the same session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Request>,
    updates: watch::Receiver<TraceSnapshot>,
}

impl SessionHandle {
    pub async fn input(&self, event: InputEvent) -> RequestResult<TraceSnapshot> {
        let (responder, response) = oneshot::channel();
        self.sender.send(Request::Input { event, responder }).await?;
        Ok(response.await?)
    }

    pub async fn snapshot(&self) -> RequestResult<TraceSnapshot> {
        let (responder, response) = oneshot::channel();
        self.sender.send(Request::Snapshot { responder }).await?;
        Ok(response.await?)
    }

    /// Finalizes the trace and stores the resulting region. If storing fails
    /// the trace is kept so nothing the user drew is lost.
    pub async fn finalize(&self) -> RequestResult<Region> {
        let (responder, response) = oneshot::channel();
        self.sender.send(Request::Finalize { responder }).await?;
        response.await?
    }

    /// Receives a snapshot after every change to the trace. The snapshot is
    /// published before the request that caused it is answered.
    pub fn subscribe(&self) -> watch::Receiver<TraceSnapshot> {
        self.updates.clone()
    }
}

struct EditingSession<D>
where
    D: Database,
{
    builder: TraceBuilder,
    client: Client<D>,
    updates: watch::Sender<TraceSnapshot>,
}

impl<D> EditingSession<D>
where
    D: Database,
{
    async fn handle(&mut self, request: Request) {
        match request {
            Request::Input { event, responder } => {
                self.builder.apply(event);
                let snapshot = self.publish();
                respond(responder, snapshot);
            }
            Request::Snapshot { responder } => {
                respond(responder, self.builder.snapshot());
            }
            Request::Finalize { responder } => {
                let result = self.finalize().await;
                self.publish();
                respond(responder, result);
            }
        }
    }

    fn publish(&self) -> TraceSnapshot {
        let snapshot = self.builder.snapshot();
        self.updates.send_replace(snapshot.clone());
        snapshot
    }

    async fn finalize(&mut self) -> RequestResult<Region> {
        let unsaved = self.builder.clone();
        let region = self.builder.finalize()?;
        if let Err(why) = self.client.save_region(&region).await {
            log::warn!("keeping trace, saving region {} failed: {}", region.id, why);
            self.builder = unsaved;
            return Err(why);
        }
        Ok(region)
    }
}

fn respond<T>(responder: oneshot::Sender<T>, value: T) {
    responder
        .send(value)
        .unwrap_or_else(|_| log::error!("Can not respond to request!"));
}

/// Starts an editing session on the current tokio runtime.
pub fn spawn<D: Database>(client: Client<D>, options: TraceOptions) -> SessionHandle {
    let (sender, mut requests) = mpsc::channel(32);
    let (updates, updates_rx) = watch::channel(TraceSnapshot::default());
    let mut session = EditingSession {
        builder: TraceBuilder::new(options),
        client,
        updates,
    };

    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            session.handle(request).await;
        }
        log::debug!("editing session stopped");
    });

    SessionHandle {
        sender,
        updates: updates_rx,
    }
}

//! The actor runtime contract: mailboxes, `send`/`ask`, spawn/stop, and
//! the `Started`/`Stopping`/`Stopped` lifecycle every actor observes.
//! There is no scheduler of our own here — actors are plain Tokio tasks,
//! each owning a single-consumer mailbox, with an mpsc/oneshot "ask"
//! pattern for request/response calls. This module provides the generic
//! spawn/stop/system-message plumbing so every actor in this crate (ball,
//! paddle, room, broadcaster, manager) gets the same lifecycle guarantees
//! instead of five hand-rolled copies of it.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// What a handler returns after processing one message: keep going, or
/// begin a graceful stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Continue,
    Stop,
}

/// The three system messages every actor observes. `Started`
/// fires once before the mailbox loop begins; `Stopping` fires once the
/// actor has been asked to stop, before the mailbox is drained; `Stopped`
/// fires once the mailbox is empty and the task is about to exit.
pub enum SystemMessage {
    Started,
    Stopping,
    Stopped,
}

/// Implemented by the concrete state machine behind an actor. `handle` is
/// async so actors that must perform I/O in their handler (the
/// broadcaster, writing to websockets) can do so without blocking the
/// runtime's other tasks.
pub trait Actor: Send + 'static {
    type Message: Send + 'static;

    /// Reacts to a system lifecycle message. Default is a no-op so most
    /// actors only need to implement `handle`.
    fn on_system(&mut self, _msg: SystemMessage) -> impl Future<Output = ()> + Send {
        async {}
    }

    fn handle(&mut self, msg: Self::Message) -> impl Future<Output = Directive> + Send;
}

/// Error returned when a message couldn't be delivered because the
/// actor's mailbox has already been dropped.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("actor mailbox closed")]
pub struct SendError;

/// Error returned by [`ActorRef::ask`].
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum AskError {
    #[error("actor mailbox closed")]
    MailboxClosed,
    #[error("ask timed out")]
    Timeout,
}

enum Envelope<M> {
    User(M),
    Stop,
}

/// A cheaply-clonable handle to a spawned actor's mailbox.
pub struct ActorRef<M: Send + 'static> {
    sender: mpsc::Sender<Envelope<M>>,
}

impl<M: Send + 'static> Clone for ActorRef<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M: Send + 'static> fmt::Debug for ActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRef").finish_non_exhaustive()
    }
}

impl<M: Send + 'static> ActorRef<M> {
    /// Enqueues a message. Delivery is at-most-once and FIFO with respect
    /// to this sender; if the actor has already stopped the message is
    /// dropped and `SendError` is returned rather than panicking the
    /// caller — callers that don't care can ignore it.
    pub async fn send(&self, msg: M) -> Result<(), SendError> {
        self.sender
            .send(Envelope::User(msg))
            .await
            .map_err(|_| SendError)
    }

    /// Non-blocking best-effort send, used from contexts (e.g. a timer
    /// callback) that cannot await.
    pub fn try_send(&self, msg: M) -> Result<(), SendError> {
        self.sender
            .try_send(Envelope::User(msg))
            .map_err(|_| SendError)
    }

    /// Request-reply: builds a message carrying a reply channel via
    /// `make`, sends it, and waits up to `timeout` for the actor to call
    /// `reply.send(value)` from within its message loop.
    pub async fn ask<R, F>(&self, make: F, timeout: Duration) -> Result<R, AskError>
    where
        F: FnOnce(oneshot::Sender<R>) -> M,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let msg = make(reply_tx);
        self.sender
            .send(Envelope::User(msg))
            .await
            .map_err(|_| AskError::MailboxClosed)?;

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(AskError::MailboxClosed),
            Err(_) => Err(AskError::Timeout),
        }
    }

    /// Requests a graceful stop: the actor receives `Stopping`, drains any
    /// messages already queued ahead of the stop request, then `Stopped`,
    /// then its task exits.
    pub async fn stop(&self) {
        let _ = self.sender.send(Envelope::Stop).await;
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The default mailbox capacity for actors in this crate that don't have a
/// specific reason to size it differently.
pub const DEFAULT_MAILBOX_SIZE: usize = 256;

/// Spawns `actor` on its own Tokio task with a bounded mailbox of
/// `mailbox_size`. Returns a handle for sending/asking/stopping it, and
/// the task's `JoinHandle`, which resolves once the actor has fully
/// stopped (the moment a caller can treat as the "Stopped" terminal
/// callback having fired).
pub fn spawn<A: Actor>(actor: A, mailbox_size: usize) -> (ActorRef<A::Message>, JoinHandle<()>) {
    spawn_with(mailbox_size, move |_self_ref| actor)
}

/// Like [`spawn`], but `build` receives the actor's own [`ActorRef`] before
/// the task starts running. Actors that need to hand a reference to
/// themselves to a ticker task or to a child actor (the room actor, the
/// broadcaster) are constructed this way instead.
pub fn spawn_with<A: Actor>(
    mailbox_size: usize,
    build: impl FnOnce(ActorRef<A::Message>) -> A,
) -> (ActorRef<A::Message>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Envelope<A::Message>>(mailbox_size);
    let self_ref = ActorRef { sender: tx.clone() };
    let mut actor = build(self_ref);

    let join = tokio::spawn(async move {
        actor.on_system(SystemMessage::Started).await;

        while let Some(envelope) = rx.recv().await {
            match envelope {
                Envelope::User(msg) => {
                    if run_handler(&mut actor, msg).await == Directive::Stop {
                        break;
                    }
                }
                Envelope::Stop => {
                    actor.on_system(SystemMessage::Stopping).await;
                    // Drain whatever is still queued ahead of the stop
                    // request before finishing up.
                    while let Ok(envelope) = rx.try_recv() {
                        if let Envelope::User(msg) = envelope {
                            let _ = run_handler(&mut actor, msg).await;
                        }
                    }
                    break;
                }
            }
        }

        actor.on_system(SystemMessage::Stopped).await;
    });

    (ActorRef { sender: tx }, join)
}

/// Runs one handler invocation, catching any panic so a bug in one
/// actor's logic cannot take down the runtime. On panic this is treated
/// as a request to stop the actor.
async fn run_handler<A: Actor>(actor: &mut A, msg: A::Message) -> Directive {
    match AssertUnwindSafe(actor.handle(msg)).catch_unwind().await {
        Ok(directive) => directive,
        Err(panic) => {
            let message = panic_message(&panic);
            tracing::error!(panic = %message, "actor handler panicked, stopping actor");
            Directive::Stop
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

//! Cooperative pause/resume wrapper around a resolver body
//!
//! A [`Coroutine`] runs a request body on its own thread, but never
//! concurrently with the driver: every [`Coroutine::run`] hands control to
//! the body and blocks until the body either pauses (through
//! [`crate::executor::RequestContext::pause_coroutine`]) or finishes. The
//! two rendezvous channels have no buffer, so exactly one side is running at
//! any time.

use std::{
    panic::{catch_unwind, resume_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender},
        Arc, Mutex,
    },
    thread::JoinHandle,
    time::Duration,
};

use crate::{error::FieldError, FieldResult};

/// What the driver sends to a paused body.
enum Signal {
    Run,
    Stop,
}

/// What the body reports back to the driver.
enum Step {
    Paused,
    Done(FieldResult),
    Panicked(Box<dyn std::any::Any + Send>),
}

/// Outcome of one [`Coroutine::run`] call.
#[derive(Debug)]
pub enum CoroutineStep {
    /// The body called pause and is waiting for the next `run`.
    Paused,
    /// The body returned; the coroutine is finished.
    Done(FieldResult),
}

/// The body-side handle, attached to a request context so resolvers can
/// pause from anywhere inside the execution tree.
pub struct CoroutineControl {
    step_tx: SyncSender<Step>,
    signal_rx: Mutex<Receiver<Signal>>,
    stopped: AtomicBool,
}

impl CoroutineControl {
    /// Yields control back to the driver and blocks until it calls `run`
    /// again
    ///
    /// Returns an error when the coroutine was stopped, or when the driver
    /// side went away entirely. The body should propagate that error out.
    pub fn pause(&self) -> Result<(), FieldError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(FieldError::coroutine_stopped());
        }
        if self.step_tx.send(Step::Paused).is_err() {
            self.stopped.store(true, Ordering::SeqCst);
            return Err(FieldError::coroutine_stopped());
        }

        let signal = self
            .signal_rx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .recv();
        match signal {
            Ok(Signal::Run) => Ok(()),
            Ok(Signal::Stop) | Err(_) => {
                self.stopped.store(true, Ordering::SeqCst);
                Err(FieldError::coroutine_stopped())
            }
        }
    }
}

enum State {
    Idle,
    Running(JoinHandle<()>),
    Finished,
    Stopped,
}

/// Driver-side handle over a pausable request body
///
/// The body does not start until the first [`Coroutine::run`]. After the
/// body finishes or the coroutine is stopped, further `run` calls report a
/// terminal [`CoroutineStep::Done`].
pub struct Coroutine {
    control: Arc<CoroutineControl>,
    step_rx: Receiver<Step>,
    signal_tx: SyncSender<Signal>,
    body: Option<Box<dyn FnOnce() -> FieldResult + Send>>,
    state: State,
}

impl Coroutine {
    /// Wraps `body` without starting it.
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce() -> FieldResult + Send + 'static,
    {
        // Rendezvous channels: a send blocks until the other side receives,
        // so driver and body alternate instead of overlapping.
        let (step_tx, step_rx) = sync_channel(0);
        let (signal_tx, signal_rx) = sync_channel(0);

        Self {
            control: Arc::new(CoroutineControl {
                step_tx,
                signal_rx: Mutex::new(signal_rx),
                stopped: AtomicBool::new(false),
            }),
            step_rx,
            signal_tx,
            body: Some(Box::new(body)),
            state: State::Idle,
        }
    }

    /// The body-side handle, for attaching to a request context.
    pub fn control(&self) -> Arc<CoroutineControl> {
        Arc::clone(&self.control)
    }

    /// Starts or resumes the body and blocks until it pauses or finishes.
    pub fn run(&mut self) -> CoroutineStep {
        if self.advance().is_none() {
            return self.terminal_step();
        }
        let step = self.run_step();
        self.receive(step)
    }

    /// Like [`Coroutine::run`], but gives up after `wait`
    ///
    /// `None` means the body did not report back in time; the coroutine is
    /// stopped and its thread is left to unwind on its own once it next
    /// touches the channels.
    pub fn run_timeout(&mut self, wait: Duration) -> Option<CoroutineStep> {
        if self.advance().is_none() {
            return Some(self.terminal_step());
        }
        match self.step_rx.recv_timeout(wait) {
            Ok(step) => Some(self.receive(Ok(step))),
            Err(RecvTimeoutError::Timeout) => {
                self.control.stopped.store(true, Ordering::SeqCst);
                self.state = State::Stopped;
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                Some(self.receive(Err(std::sync::mpsc::RecvError)))
            }
        }
    }

    /// Stops the coroutine
    ///
    /// A body that never ran will never run. A paused body is woken up once
    /// so it can observe the stop, and its thread is joined. Calling `stop`
    /// again is a no-op.
    pub fn stop(&mut self) {
        match std::mem::replace(&mut self.state, State::Stopped) {
            State::Idle => {
                self.body = None;
            }
            State::Running(handle) => {
                self.control.stopped.store(true, Ordering::SeqCst);
                // The body is blocked inside pause; wake it with the stop
                // signal, then drain whatever it still reports.
                if self.signal_tx.send(Signal::Stop).is_ok() {
                    let _ = self.step_rx.recv();
                }
                let _ = handle.join();
            }
            State::Finished | State::Stopped => {}
        }
    }

    /// Hands control to the body, `None` when the coroutine is already
    /// terminal. The blocking receive happens in the caller so
    /// `run_timeout` can bound it.
    fn advance(&mut self) -> Option<()> {
        match &self.state {
            State::Idle => {
                let Some(body) = self.body.take() else {
                    self.state = State::Finished;
                    return None;
                };
                let control = Arc::clone(&self.control);
                let handle = std::thread::spawn(move || {
                    let result = catch_unwind(AssertUnwindSafe(body));
                    let step = match result {
                        Ok(result) => Step::Done(result),
                        Err(payload) => Step::Panicked(payload),
                    };
                    let _ = control.step_tx.send(step);
                });
                self.state = State::Running(handle);
                Some(())
            }
            State::Running(_) => {
                if self.signal_tx.send(Signal::Run).is_err() {
                    // Body thread died without reporting; treat as stopped.
                    self.state = State::Stopped;
                    return None;
                }
                Some(())
            }
            State::Finished | State::Stopped => None,
        }
    }

    fn receive(&mut self, step: Result<Step, std::sync::mpsc::RecvError>) -> CoroutineStep {
        match step {
            Ok(Step::Paused) => CoroutineStep::Paused,
            Ok(Step::Done(result)) => {
                self.finish();
                CoroutineStep::Done(result)
            }
            Ok(Step::Panicked(payload)) => {
                self.finish();
                resume_unwind(payload)
            }
            Err(_) => {
                self.state = State::Stopped;
                CoroutineStep::Done(Err(FieldError::coroutine_stopped()))
            }
        }
    }

    fn run_step(&mut self) -> Result<Step, std::sync::mpsc::RecvError> {
        self.step_rx.recv()
    }

    fn finish(&mut self) {
        if let State::Running(handle) = std::mem::replace(&mut self.state, State::Finished) {
            let _ = handle.join();
        }
    }

    fn terminal_step(&mut self) -> CoroutineStep {
        match self.state {
            State::Stopped => CoroutineStep::Done(Err(FieldError::coroutine_stopped())),
            _ => CoroutineStep::Done(Err(FieldError::internal(
                "coroutine already finished",
            ))),
        }
    }
}

impl Drop for Coroutine {
    fn drop(&mut self) {
        self.stop();
    }
}

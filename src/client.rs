//! The client loop.
//!
//! One task owns the [`Dispatcher`], the socket and the UI. Server lines,
//! user input and cancellation are merged with `tokio::select!` so messages
//! are dispatched strictly one at a time, in arrival order. Cancellation is
//! polled first, then the socket, then input, and every socket write races
//! the cancellation token.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::config::ClientConfig;
use crate::encode::encode_action;
use crate::error::{ClientError, ConnectionError, ParseError};
use crate::event::Event;
use crate::input::interpret;
use crate::message::Message;
use crate::state::Dispatcher;
use crate::transport::Transport;
use crate::ui::Ui;

/// Longest wait for queued lines to drain when closing after a quit.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// What the loop does after handling user input.
enum Flow {
    Continue,
    Quit,
}

/// A single-server IRC client.
pub struct Client<U> {
    config: ClientConfig,
    dispatcher: Dispatcher,
    ui: U,
}

impl<U: Ui> Client<U> {
    /// Prepare a client; nothing is dialled yet.
    pub fn new(config: ClientConfig, ui: U) -> Self {
        let dispatcher = Dispatcher::new(&config);
        Self {
            config,
            dispatcher,
            ui,
        }
    }

    /// Read-only access to the dispatcher and its session.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Connect, register and run until the session ends.
    ///
    /// Returns `Ok(())` when the session was closed locally (quit, input
    /// closed or cancelled) and the terminal error otherwise. Either way the
    /// UI has already seen the `Disconnected` event.
    pub async fn run(
        &mut self,
        input: mpsc::Receiver<String>,
        cancel: CancellationToken,
    ) -> Result<(), ConnectionError> {
        let addr = self.config.address();
        info!(%addr, "connecting");
        let transport = match Transport::connect(&addr).await {
            Ok(transport) => transport,
            Err(err) => {
                self.finish(err.clone());
                return Err(err);
            }
        };
        self.run_on(transport, input, cancel).await
    }

    /// Run on an already connected transport.
    pub async fn run_on(
        &mut self,
        mut transport: Transport,
        mut input: mpsc::Receiver<String>,
        cancel: CancellationToken,
    ) -> Result<(), ConnectionError> {
        let server = self.config.address();
        self.emit(vec![Event::Connected { server }]);

        let register = self.config.register_action();
        let reason = match self.perform(&mut transport, register, &cancel).await {
            Ok(_) => self.event_loop(&mut transport, &mut input, &cancel).await,
            Err(err) => err,
        };

        // A peer that stopped reading must not hold up shutdown.
        tokio::select! {
            biased;

            _ = cancel.cancelled() => debug!("dropping connection without flushing"),
            closed = timeout(CLOSE_TIMEOUT, transport.close()) => match closed {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!(error = %err, "error while closing connection"),
                Err(_) => warn!("timed out flushing connection"),
            },
        }
        drop(transport);
        self.finish(reason.clone());

        match reason {
            ConnectionError::Cancelled => Ok(()),
            err => Err(err),
        }
    }

    async fn event_loop(
        &mut self,
        transport: &mut Transport,
        input: &mut mpsc::Receiver<String>,
        cancel: &CancellationToken,
    ) -> ConnectionError {
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("cancelled");
                    return ConnectionError::Cancelled;
                }

                frame = transport.read_line() => match frame {
                    Some(Ok(line)) => {
                        if let Err(err) = self.handle_line(transport, &line, cancel).await {
                            return err;
                        }
                    }
                    Some(Err(err)) => return err,
                    None => return ConnectionError::Closed,
                },

                line = input.recv() => {
                    let Some(line) = line else {
                        info!("input closed");
                        return ConnectionError::Cancelled;
                    };
                    match self.handle_input(transport, &line, cancel).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => return ConnectionError::Cancelled,
                        Err(err) => return err,
                    }
                }
            }
        }
    }

    async fn handle_input(
        &mut self,
        transport: &mut Transport,
        line: &str,
        cancel: &CancellationToken,
    ) -> Result<Flow, ConnectionError> {
        let action = match interpret(line, self.dispatcher.session()) {
            Ok(action) => action,
            Err(err) => {
                self.emit(vec![Event::Error(err.into())]);
                return Ok(Flow::Continue);
            }
        };

        let quit = matches!(action, Action::Quit(_));
        let sent = self.perform(transport, action, cancel).await?;
        Ok(if quit && sent { Flow::Quit } else { Flow::Continue })
    }

    async fn handle_line(
        &mut self,
        transport: &mut Transport,
        line: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ConnectionError> {
        debug!(line, "received");
        let msg = match Message::parse(line) {
            Ok(msg) => msg,
            Err(ParseError::EmptyMessage) => return Ok(()),
            Err(err) => {
                warn!(error = %err, "discarding unparsable line");
                self.emit(vec![Event::Error(ClientError::Parse(err))]);
                return Ok(());
            }
        };

        let dispatch = self.dispatcher.dispatch(&msg);
        self.emit(dispatch.events);
        for reply in dispatch.replies {
            self.perform(transport, reply, cancel).await?;
        }
        Ok(())
    }

    /// Encode, write and record one action. Returns false when the action
    /// was rejected before anything was written.
    /// A write still pending when `cancel` fires is abandoned.
    async fn perform(
        &mut self,
        transport: &mut Transport,
        action: Action,
        cancel: &CancellationToken,
    ) -> Result<bool, ConnectionError> {
        let lines = match encode_action(&action) {
            Ok(lines) => lines,
            Err(err) => {
                warn!(action = action.name(), error = %err, "rejected outgoing action");
                self.emit(vec![Event::Error(err.into())]);
                return Ok(false);
            }
        };

        for line in &lines {
            debug!(line = line.trim_end(), "sent");
        }
        if !lines.is_empty() {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!(action = action.name(), "cancelled while writing");
                    return Err(ConnectionError::Cancelled);
                }
                written = transport.write_lines(lines) => written?,
            }
        }

        let events = self.dispatcher.record_sent(&action);
        self.emit(events);
        Ok(true)
    }

    fn finish(&mut self, reason: ConnectionError) {
        let events = self.dispatcher.disconnect(reason);
        self.emit(events);
    }

    fn emit(&mut self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        for event in &events {
            self.ui.render(event);
        }
        self.ui.present(&self.dispatcher.snapshot());
    }
}

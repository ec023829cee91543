use super::machine::{Command, Envelope, Step, transition};
use super::options::ProbeOptions;
use super::reply::ReplyBuffer;
use super::slot::ResultSlot;
use super::types::{ProbeFailure, ProbeResult};

/// Something that happened on the probe's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// Bytes arrived; may hold a partial reply or several replies.
    Data(&'a [u8]),
    /// The session budget ran out.
    TimedOut,
    /// The transport failed; carries the error description.
    Failed(String),
    /// The peer (or we) closed the connection.
    Closed,
}

/// Work the owner of the connection must carry out, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(Command),
    Close,
}

/// Outcome of handling one [`Event`]. `settled` is `Some` only for the event
/// that produced the verdict.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reaction {
    pub actions: Vec<Action>,
    pub settled: Option<ProbeResult>,
}

/// One probe against one exchanger. Owns the reply buffer and the verdict
/// slot; the connection itself stays with whoever feeds the events.
#[derive(Debug)]
pub struct ProbeSession {
    host: String,
    domain: String,
    envelope: Envelope,
    step: Option<Step>,
    buffer: ReplyBuffer,
    slot: ResultSlot,
    closing: bool,
    closed: bool,
}

impl ProbeSession {
    pub fn new(host: &str, domain: &str, recipient: &str, options: &ProbeOptions) -> Self {
        let envelope = Envelope {
            helo: options.helo_domain(domain).into_owned(),
            sender: options.envelope_sender(domain),
            recipient: recipient.to_string(),
        };
        Self {
            host: host.to_string(),
            domain: domain.to_string(),
            envelope,
            step: Some(Step::Greeting),
            buffer: ReplyBuffer::new(),
            slot: ResultSlot::new(),
            closing: false,
            closed: false,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The reply currently awaited, or `None` once the dialogue is over.
    pub fn step(&self) -> Option<Step> {
        self.step
    }

    pub fn outcome(&self) -> Option<&ProbeResult> {
        self.slot.get()
    }

    /// Shared handle on the verdict slot, for signal sources living outside
    /// the event loop.
    pub fn slot(&self) -> &ResultSlot {
        &self.slot
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn handle(&mut self, event: Event<'_>) -> Reaction {
        if self.closed {
            tracing::trace!(host = %self.host, ?event, "event after close ignored");
            return Reaction::default();
        }
        match event {
            Event::Data(chunk) => self.on_data(chunk),
            Event::TimedOut => self.abort(ProbeFailure::Timeout),
            Event::Failed(message) => {
                tracing::warn!(host = %self.host, error = %message, "transport failure");
                self.abort(ProbeFailure::Transport(message))
            }
            Event::Closed => self.on_closed(),
        }
    }

    fn on_data(&mut self, chunk: &[u8]) -> Reaction {
        let mut reaction = Reaction::default();
        if self.closing {
            tracing::trace!(host = %self.host, len = chunk.len(), "data while closing ignored");
            return reaction;
        }
        if self.slot.is_settled() {
            // decided elsewhere; nothing more goes on the wire
            self.begin_close(&mut reaction);
            return reaction;
        }

        let mut replies = self.buffer.push(chunk).into_iter().peekable();
        while let Some(reply) = replies.next() {
            let Some(step) = self.step else { break };
            tracing::debug!(
                host = %self.host,
                ?step,
                code = reply.code,
                line = reply.first_line(),
                "reply"
            );

            let next = transition(step, reply.code, reply.first_line(), &self.envelope);
            if next.result.is_none() {
                if let Some(early) = replies.peek() {
                    // answers a command not yet sent
                    tracing::warn!(
                        host = %self.host,
                        code = early.code,
                        line = early.first_line(),
                        "reply ahead of its command"
                    );
                    let failure = ProbeFailure::UnexpectedReplyCode {
                        code: early.code,
                        line: early.first_line().to_string(),
                    };
                    if self.settle(failure.into(), &mut reaction) {
                        reaction.actions.push(Action::Send(Command::Quit));
                    }
                    self.step = None;
                    self.begin_close(&mut reaction);
                    break;
                }
            }
            if let Some(result) = next.result {
                if !self.settle(result, &mut reaction) {
                    self.begin_close(&mut reaction);
                    break;
                }
            }
            if let Some(command) = next.command {
                let wire = command.to_string();
                tracing::debug!(host = %self.host, command = wire.trim_end(), "send");
                reaction.actions.push(Action::Send(command));
            }
            self.step = next.next;
            if self.step.is_none() {
                self.begin_close(&mut reaction);
                break;
            }
        }
        reaction
    }

    fn abort(&mut self, failure: ProbeFailure) -> Reaction {
        let mut reaction = Reaction::default();
        self.settle(failure.into(), &mut reaction);
        self.step = None;
        self.begin_close(&mut reaction);
        reaction
    }

    fn on_closed(&mut self) -> Reaction {
        let mut reaction = Reaction::default();
        self.settle(ProbeFailure::PrematureClose.into(), &mut reaction);
        self.step = None;
        self.closing = true;
        self.closed = true;
        tracing::debug!(host = %self.host, "connection closed");
        reaction
    }

    fn settle(&mut self, result: ProbeResult, reaction: &mut Reaction) -> bool {
        if self.slot.offer(result.clone()) {
            tracing::info!(
                host = %self.host,
                accepted = result.accepted,
                message = %result.message,
                "probe settled"
            );
            reaction.settled = Some(result);
            true
        } else {
            tracing::trace!(host = %self.host, message = %result.message, "verdict already settled");
            false
        }
    }

    fn begin_close(&mut self, reaction: &mut Reaction) {
        if !self.closing {
            self.closing = true;
            reaction.actions.push(Action::Close);
        }
    }
}

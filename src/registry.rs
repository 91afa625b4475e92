//! Live client channels and the requests they carry.

use crate::blocked::BlockedSet;
use crate::channel::{write_record, Channel};
use crate::pcb::{ChannelId, Pcb};
use crate::scheduler::Scheduler;
use crate::wire::{Message, Pid, Request, WireError, RECORD_LEN};
use std::collections::BTreeMap;
use std::io;
use tracing::{debug, warn};

/// Requests a client is allowed to send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Submit {
    Run,
    Block,
}

impl TryFrom<Request> for Submit {
    type Error = WireError;

    fn try_from(request: Request) -> Result<Self, WireError> {
        match request {
            Request::Run => Ok(Submit::Run),
            Request::Block => Ok(Submit::Block),
            other => Err(WireError::Unexpected(other)),
        }
    }
}

/// What one non-blocking read produced.
enum Inbound {
    Idle,
    Closed,
    Request {
        pid: Pid,
        submit: Submit,
        time_ms: u32,
    },
}

struct Connection<C> {
    channel: C,
    requests: u64,
}

/// Tracks every connected client. Channels are polled in accept order,
/// once per tick, for at most one record each.
pub struct Registry<C: Channel> {
    conns: BTreeMap<ChannelId, Connection<C>>,
    next_id: ChannelId,
}

impl<C: Channel> Registry<C> {
    pub fn new() -> Self {
        Self {
            conns: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn attach(&mut self, channel: C) -> ChannelId {
        let id = self.next_id;
        self.next_id += 1;
        self.conns.insert(
            id,
            Connection {
                channel,
                requests: 0,
            },
        );
        debug!(channel = id, "client connected");
        id
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    /// Reads at most one record from every channel. Each accepted request is
    /// acknowledged, then turned into a PCB: CPU bursts go to `scheduler`,
    /// I/O waits to `blocked`.
    ///
    /// Returns the channels that were closed during this poll.
    pub fn poll(
        &mut self,
        now_ms: u32,
        scheduler: &mut dyn Scheduler,
        blocked: &mut BlockedSet,
    ) -> Vec<ChannelId> {
        let mut closed = Vec::new();
        for (&id, conn) in self.conns.iter_mut() {
            let (pid, submit, time_ms) = match read_request(id, &mut conn.channel) {
                Inbound::Idle => continue,
                Inbound::Closed => {
                    closed.push(id);
                    continue;
                }
                Inbound::Request {
                    pid,
                    submit,
                    time_ms,
                } => (pid, submit, time_ms),
            };
            if let Err(e) = write_record(&mut conn.channel, &Message::ack(pid, now_ms)) {
                warn!(channel = id, pid, error = %e, "failed to send ACK, closing");
                closed.push(id);
                continue;
            }
            conn.requests += 1;
            debug!(channel = id, pid, request = ?submit, time_ms, now_ms, "request");
            match submit {
                Submit::Run => scheduler.push(Pcb::cpu(pid, id, time_ms, now_ms)),
                Submit::Block => blocked.push(Pcb::io(pid, id, time_ms, now_ms)),
            }
        }
        for id in &closed {
            if let Some(conn) = self.conns.remove(id) {
                debug!(channel = id, requests = conn.requests, "client disconnected");
            }
        }
        closed
    }

    /// Sends one record to `id`. Failures are logged and otherwise ignored;
    /// a broken channel is noticed and closed by the next poll.
    pub fn send(&mut self, id: ChannelId, msg: Message) {
        match self.conns.get_mut(&id) {
            Some(conn) => {
                if let Err(e) = write_record(&mut conn.channel, &msg) {
                    warn!(channel = id, pid = msg.pid, request = %msg.request, error = %e, "write failed");
                }
            }
            None => debug!(channel = id, pid = msg.pid, "channel already closed, dropping message"),
        }
    }

    /// Closes every channel.
    pub fn close_all(&mut self) -> usize {
        let n = self.conns.len();
        self.conns.clear();
        n
    }
}

impl<C: Channel> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn read_request<C: Channel>(id: ChannelId, channel: &mut C) -> Inbound {
    let mut buf = [0u8; RECORD_LEN];
    let n = match channel.try_read(&mut buf) {
        Ok(0) => {
            debug!(channel = id, "peer closed channel");
            return Inbound::Closed;
        }
        Ok(n) => n,
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
            return Inbound::Idle;
        }
        Err(e) => {
            warn!(channel = id, error = %e, "read failed, closing");
            return Inbound::Closed;
        }
    };
    let decoded = Message::decode(&buf[..n])
        .and_then(|msg| Submit::try_from(msg.request).map(|submit| (msg, submit)));
    match decoded {
        Ok((msg, submit)) => Inbound::Request {
            pid: msg.pid,
            submit,
            time_ms: msg.time_ms,
        },
        Err(e) => {
            warn!(channel = id, error = %e, "protocol error, closing");
            Inbound::Closed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::MockChannel;
    use crate::scheduler::{Fifo, Mlfq};

    #[test]
    fn test_run_and_block_are_acked_and_queued() {
        let mut registry = Registry::new();
        let mut scheduler = Fifo::new();
        let mut blocked = BlockedSet::new();
        let client = MockChannel::new();
        let id = registry.attach(client.clone());

        client.send(Message::new(5, Request::Run, 300));
        assert!(registry.poll(40, &mut scheduler, &mut blocked).is_empty());
        assert_eq!(client.received(), vec![Message::ack(5, 40)]);
        assert_eq!(scheduler.len(), 1);

        // one record per channel per tick
        client.send(Message::new(5, Request::Block, 200));
        client.send(Message::new(5, Request::Run, 10));
        registry.poll(50, &mut scheduler, &mut blocked);
        assert_eq!(blocked.len(), 1);
        assert_eq!(scheduler.len(), 1);
        let pcb = blocked.iter().next().unwrap();
        assert_eq!((pcb.pid(), pcb.channel(), pcb.requested_ms()), (5, id, 200));
        registry.poll(60, &mut scheduler, &mut blocked);
        assert_eq!(scheduler.len(), 2);
        assert_eq!(client.received().len(), 3);
    }

    #[test]
    fn test_idle_channel_is_skipped() {
        let mut registry = Registry::new();
        let mut scheduler = Fifo::new();
        let mut blocked = BlockedSet::new();
        let quiet = MockChannel::new();
        let busy = MockChannel::new();
        registry.attach(quiet.clone());
        registry.attach(busy.clone());
        busy.send(Message::new(2, Request::Run, 10));
        assert!(registry.poll(0, &mut scheduler, &mut blocked).is_empty());
        assert!(quiet.received().is_empty());
        assert_eq!(busy.received().len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_closed_and_malformed_channels_are_dropped() {
        let mut registry = Registry::new();
        let mut scheduler = Mlfq::new(3, 500);
        let mut blocked = BlockedSet::new();
        let gone = MockChannel::new();
        let short = MockChannel::new();
        let bogus = MockChannel::new();
        let server_only = MockChannel::new();
        let reset = MockChannel::new();
        let ids: Vec<_> = [&gone, &short, &bogus, &server_only, &reset]
            .into_iter()
            .map(|c| registry.attach(c.clone()))
            .collect();

        gone.close();
        short.send_raw(vec![1, 2, 3]);
        let mut raw = Message::new(1, Request::Run, 10).encode();
        raw[4..8].copy_from_slice(&42u32.to_ne_bytes());
        bogus.send_raw(raw.to_vec());
        server_only.send(Message::done(1, 0));
        reset.break_pipe();

        let closed = registry.poll(0, &mut scheduler, &mut blocked);
        assert_eq!(closed, ids);
        assert!(registry.is_empty());
        assert_eq!(scheduler.len(), 0);
        assert!(short.received().is_empty());
        assert!(bogus.received().is_empty());
    }

    #[test]
    fn test_failed_ack_creates_no_pcb() {
        let mut registry = Registry::new();
        let mut scheduler = Fifo::new();
        let mut blocked = BlockedSet::new();
        let client = MockChannel::new();
        let id = registry.attach(client.clone());
        client.send(Message::new(1, Request::Run, 10));
        // peer has hung up after sending its request
        client.close();
        assert_eq!(registry.poll(0, &mut scheduler, &mut blocked), vec![id]);
        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn test_failed_ack_does_not_stop_later_channels() {
        let mut registry = Registry::new();
        let mut scheduler = Fifo::new();
        let mut blocked = BlockedSet::new();
        let hung_up = MockChannel::new();
        let healthy = MockChannel::new();
        let bad = registry.attach(hung_up.clone());
        let good = registry.attach(healthy.clone());

        hung_up.send(Message::new(1, Request::Run, 10));
        hung_up.close();
        healthy.send(Message::new(2, Request::Block, 200));

        assert_eq!(registry.poll(30, &mut scheduler, &mut blocked), vec![bad]);
        assert_eq!(healthy.received(), vec![Message::ack(2, 30)]);
        assert_eq!(scheduler.len(), 0);
        assert_eq!(blocked.len(), 1);
        let pcb = blocked.iter().next().unwrap();
        assert_eq!((pcb.pid(), pcb.channel()), (2, good));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_submit_rejects_server_replies() {
        assert_eq!(Submit::try_from(Request::Run), Ok(Submit::Run));
        assert_eq!(Submit::try_from(Request::Block), Ok(Submit::Block));
        assert_eq!(
            Submit::try_from(Request::Ack),
            Err(WireError::Unexpected(Request::Ack))
        );
    }

    #[test]
    fn test_send_to_unknown_channel_is_dropped() {
        let mut registry: Registry<MockChannel> = Registry::new();
        registry.send(99, Message::done(1, 0));
        let client = MockChannel::new();
        let id = registry.attach(client.clone());
        registry.send(id, Message::done(1, 30));
        assert_eq!(client.received(), vec![Message::done(1, 30)]);
        assert_eq!(registry.close_all(), 1);
        assert!(registry.is_empty());
        registry.send(id, Message::done(1, 40));
        assert_eq!(client.received().len(), 1);
    }
}

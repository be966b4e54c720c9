//! One tokio task per room.
//!
//! The task owns its [`Room`] outright; everything else talks to it through
//! a bounded command queue and gets answers back on oneshot channels. Room
//! events go out on a shared unbounded channel as [`Outbound`] records,
//! tagged with the room they came from.
//!
//! The task also owns the claim timer. Whenever the room has an open claim
//! window the loop races the next command against that window's deadline;
//! if the deadline wins the window is expired by sequence number, so a
//! timer for a window that has already closed is harmless.

use std::future::pending;

use anyhow::{anyhow, Context};
use mahjong_engine::action::{Intent, PlayerId};
use mahjong_engine::errors::{RoomError, RoomResult};
use mahjong_engine::event::{Delivery, RoomEvent};
use mahjong_engine::state::legal_actions::RoomLegalActions;
use mahjong_engine::state::Room;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// A delivery leaving a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub room_id: String,
    pub delivery: Delivery,
}

#[derive(Debug)]
pub enum RoomCommand {
    Join {
        player: PlayerId,
        name: String,
        reply: oneshot::Sender<RoomResult<()>>,
    },
    /// Replies with the number of seats still connected.
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<usize>,
    },
    Act {
        player: PlayerId,
        intent: Intent,
        reply: oneshot::Sender<RoomResult<()>>,
    },
    GetLegalIntents {
        player: PlayerId,
        reply: oneshot::Sender<Vec<Intent>>,
    },
    Snapshot {
        reply: oneshot::Sender<Room>,
    },
}

#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: String,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// True once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> anyhow::Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|_| anyhow!("room {} is closed", self.room_id))?;
        rx.await
            .with_context(|| format!("room {} dropped the request", self.room_id))
    }

    pub async fn join(&self, player: PlayerId, name: String) -> anyhow::Result<()> {
        self.request(|reply| RoomCommand::Join {
            player,
            name,
            reply,
        })
        .await??;
        Ok(())
    }

    /// Returns how many seats are still connected afterwards.
    pub async fn leave(&self, player: PlayerId) -> anyhow::Result<usize> {
        self.request(|reply| RoomCommand::Leave { player, reply })
            .await
    }

    /// Rule rejections come back as a [`RoomError`] inside the `anyhow`
    /// error.
    pub async fn act(&self, player: PlayerId, intent: Intent) -> anyhow::Result<()> {
        self.request(|reply| RoomCommand::Act {
            player,
            intent,
            reply,
        })
        .await??;
        Ok(())
    }

    pub async fn legal_intents(&self, player: PlayerId) -> anyhow::Result<Vec<Intent>> {
        self.request(|reply| RoomCommand::GetLegalIntents { player, reply })
            .await
    }

    /// A copy of the room as it stands.
    pub async fn snapshot(&self) -> anyhow::Result<Room> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }
}

pub fn spawn_room_actor(
    room: Room,
    queue_capacity: usize,
    outbound: mpsc::UnboundedSender<Outbound>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(queue_capacity);
    let handle = RoomHandle {
        room_id: room.room_id.clone(),
        sender: tx,
    };
    tokio::spawn(run_room(room, rx, outbound));
    handle
}

struct RoomActor {
    room: Room,
    outbound: mpsc::UnboundedSender<Outbound>,
    /// Open window's sequence number and when it times out.
    deadline: Option<(u64, Instant)>,
}

async fn run_room(
    room: Room,
    mut rx: mpsc::Receiver<RoomCommand>,
    outbound: mpsc::UnboundedSender<Outbound>,
) {
    info!(room_id = %room.room_id, "room actor started");
    let mut actor = RoomActor {
        room,
        outbound,
        deadline: None,
    };

    loop {
        let deadline = actor.deadline;
        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                if !actor.handle(cmd) {
                    break;
                }
            }
            _ = wait_for(deadline) => actor.on_timeout(),
        }
        actor.rearm();
    }

    info!(room_id = %actor.room.room_id, "room actor stopped");
}

async fn wait_for(deadline: Option<(u64, Instant)>) {
    match deadline {
        Some((_, at)) => sleep_until(at).await,
        None => pending().await,
    }
}

impl RoomActor {
    fn emit(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            let out = Outbound {
                room_id: self.room.room_id.clone(),
                delivery,
            };
            if self.outbound.send(out).is_err() {
                debug!(room_id = %self.room.room_id, "outbound channel closed, dropping event");
            }
        }
    }

    fn reject(&self, player: &PlayerId, err: &RoomError) {
        debug!(room_id = %self.room.room_id, player = %player, error = %err, "intent rejected");
        self.emit(vec![Delivery::to(player, RoomEvent::Error {
            message: err.to_string(),
        })]);
    }

    /// Applies one command. Returns false once the room should shut down.
    fn handle(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player,
                name,
                reply,
            } => {
                let result = self.room.add_player(player.clone(), name);
                let _ = reply.send(self.settle(&player, result));
            }
            RoomCommand::Leave { player, reply } => {
                match self.room.remove_player(&player) {
                    Ok(deliveries) => self.emit(deliveries),
                    Err(err) => debug!(room_id = %self.room.room_id, error = %err, "leave ignored"),
                }
                let connected = self.room.connected_count();
                let _ = reply.send(connected);
                if connected == 0 {
                    return false;
                }
            }
            RoomCommand::Act {
                player,
                intent,
                reply,
            } => {
                debug!(room_id = %self.room.room_id, player = %player, intent = intent.name(), "intent");
                let result = self.room.apply(&player, intent);
                let _ = reply.send(self.settle(&player, result));
            }
            RoomCommand::GetLegalIntents { player, reply } => {
                let _ = reply.send(self.room.legal_intents(&player));
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.clone());
            }
        }
        true
    }

    /// Sends accepted events out, or an `error` event to the requester.
    fn settle(&self, player: &PlayerId, result: RoomResult<Vec<Delivery>>) -> RoomResult<()> {
        match result {
            Ok(deliveries) => {
                self.emit(deliveries);
                Ok(())
            }
            Err(err) => {
                self.reject(player, &err);
                Err(err)
            }
        }
    }

    fn on_timeout(&mut self) {
        let Some((seq, _)) = self.deadline.take() else {
            return;
        };
        match self.room.expire_claim_window(seq) {
            Ok(deliveries) => self.emit(deliveries),
            Err(err) => warn!(room_id = %self.room.room_id, seq, error = %err, "stale claim timer"),
        }
    }

    fn rearm(&mut self) {
        self.deadline = match (self.room.open_claim_seq(), self.deadline) {
            (Some(seq), Some((armed, at))) if armed == seq => Some((armed, at)),
            (Some(seq), _) => Some((seq, Instant::now() + self.room.rule.claim_timeout())),
            (None, _) => None,
        };
    }
}

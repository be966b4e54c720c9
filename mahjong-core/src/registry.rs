//! The set of live rooms.
//!
//! The registry is a cheap cloneable handle shared by whatever reads client
//! connections. It spawns an actor per room on `create_room`, forwards
//! everything else to the right actor, and drops rooms once their last
//! player has disconnected.
//!
//! The room map sits behind a synchronous lock that is only held for
//! lookups and bookkeeping, never across an await, so a slow room never
//! holds up routing to the others.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use mahjong_engine::action::{Intent, PlayerId};
use mahjong_engine::event::{Delivery, RoomEvent};
use mahjong_engine::state::Room;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, Request};
use crate::room_actor::{spawn_room_actor, Outbound, RoomHandle};
use crate::seeding::SessionRng;

#[derive(Clone)]
pub struct RoomRegistry {
    shared: Arc<Shared>,
}

struct Shared {
    config: ServerConfig,
    outbound: mpsc::UnboundedSender<Outbound>,
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    rooms: HashMap<String, RoomHandle>,
    /// Rooms each player sits in, for disconnect fan-out.
    memberships: HashMap<PlayerId, Vec<String>>,
    session: Option<SessionRng>,
}

impl RoomRegistry {
    pub fn new(config: ServerConfig, outbound: mpsc::UnboundedSender<Outbound>) -> Self {
        let tables = Tables {
            session: config.session_rng(),
            ..Tables::default()
        };
        Self {
            shared: Arc::new(Shared {
                config,
                outbound,
                tables: RwLock::new(tables),
            }),
        }
    }

    // The tables hold no invariant a panicking writer could break halfway,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.shared.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.shared.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().rooms.is_empty()
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.read().rooms.contains_key(room_id)
    }

    pub fn get(&self, room_id: &str) -> Option<RoomHandle> {
        self.read().rooms.get(room_id).cloned()
    }

    /// Routes one client message. Errors are also delivered to the player
    /// as an `error` event.
    pub async fn dispatch(&self, player: &PlayerId, message: ClientMessage) -> anyhow::Result<()> {
        let room_id = message.room_id().to_string();
        let request = match message.into_request() {
            Ok((_, request)) => request,
            Err(err) => return Err(self.reject(&room_id, player, err.to_string())),
        };
        match request {
            Request::Create { name } => self.create_room(&room_id, player, name),
            Request::Join { name } => self.join_room(&room_id, player, name).await,
            Request::Act(intent) => self.act(&room_id, player, intent).await,
        }
    }

    /// Creating a room needs no round trip to an actor, so this is
    /// synchronous.
    pub fn create_room(&self, room_id: &str, player: &PlayerId, name: String) -> anyhow::Result<()> {
        let (created, rooms) = {
            let mut tables = self.write();
            if tables.rooms.contains_key(room_id) {
                drop(tables);
                return Err(self.reject(room_id, player, "房间已存在"));
            }
            let seed = tables.session.as_mut().map(SessionRng::next_room_seed);
            let room = Room::new(room_id, player.clone(), name, self.shared.config.rule, seed);
            let created = room.created_event();

            let handle = spawn_room_actor(
                room,
                self.shared.config.room_queue_capacity,
                self.shared.outbound.clone(),
            );
            tables.rooms.insert(room_id.to_string(), handle);
            remember(&mut tables, player, room_id);
            (created, tables.rooms.len())
        };
        self.emit(room_id, created);
        info!(room_id, host = %player, rooms, "room created");
        Ok(())
    }

    pub async fn join_room(&self, room_id: &str, player: &PlayerId, name: String) -> anyhow::Result<()> {
        let handle = self.room(room_id, player)?;
        handle.join(player.clone(), name).await?;
        remember(&mut self.write(), player, room_id);
        Ok(())
    }

    pub async fn act(&self, room_id: &str, player: &PlayerId, intent: Intent) -> anyhow::Result<()> {
        self.room(room_id, player)?.act(player.clone(), intent).await
    }

    /// Removes `player` from every room it sits in; rooms left with no
    /// connected player are dropped.
    pub async fn disconnect(&self, player: &PlayerId) {
        let Some(room_ids) = self.write().memberships.remove(player) else {
            return;
        };
        for room_id in room_ids {
            let Some(handle) = self.get(&room_id) else {
                continue;
            };
            match handle.leave(player.clone()).await {
                Ok(0) | Err(_) => self.forget_room(&room_id),
                Ok(connected) => {
                    debug!(room_id = %room_id, player = %player, connected, "player disconnected")
                }
            }
        }
    }

    fn room(&self, room_id: &str, player: &PlayerId) -> anyhow::Result<RoomHandle> {
        self.get(room_id)
            .ok_or_else(|| self.reject(room_id, player, "房间不存在"))
    }

    fn forget_room(&self, room_id: &str) {
        let mut tables = self.write();
        if tables.rooms.remove(room_id).is_some() {
            info!(room_id, rooms = tables.rooms.len(), "room closed");
        }
        for rooms in tables.memberships.values_mut() {
            rooms.retain(|r| r != room_id);
        }
        tables.memberships.retain(|_, rooms| !rooms.is_empty());
    }

    fn emit(&self, room_id: &str, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            let _ = self.shared.outbound.send(Outbound {
                room_id: room_id.to_string(),
                delivery,
            });
        }
    }

    /// Sends `message` to `player` as an `error` event and returns it as an
    /// error.
    fn reject(&self, room_id: &str, player: &PlayerId, message: impl Into<String>) -> anyhow::Error {
        let message = message.into();
        debug!(room_id, player = %player, %message, "request rejected");
        self.emit(room_id, vec![Delivery::to(player, RoomEvent::Error {
            message: message.clone(),
        })]);
        anyhow!(message)
    }
}

fn remember(tables: &mut Tables, player: &PlayerId, room_id: &str) {
    let rooms = tables.memberships.entry(player.clone()).or_default();
    if !rooms.iter().any(|r| r == room_id) {
        rooms.push(room_id.to_string());
    }
}

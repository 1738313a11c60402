// SPDX-License-Identifier: Apache-2.0

use crate::auth::{bearer_token, verify_token, PrincipalKind};
use crate::http::respond::respond;
use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::Utc;
use lendhub_api::ApiError;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct WsQuery {
    #[serde(default)]
    token: Option<String>,
}

/// Messages a client may send on the notification socket: delivery acks and
/// foreground/background presence marks.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Ack { seq: u64 },
    Presence { state: PresenceMark },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PresenceMark {
    Active,
    Background,
}

/// `GET /api/me/ws` — borrower notification socket. Browsers cannot set an
/// Authorization header on a WebSocket handshake, so the token may also come
/// in as a query parameter.
pub(crate) async fn user_ws(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let token = params
        .token
        .as_deref()
        .or_else(|| bearer_token(&headers))
        .map(ToString::to_string);
    let claims = token
        .as_deref()
        .and_then(|t| verify_token(&state.config.token_secret, t, Utc::now()).ok())
        .filter(|c| c.kind == PrincipalKind::User);
    let Some(claims) = claims else {
        return respond::<()>(&state, &headers, Err(ApiError::unauthorized()));
    };
    ws.on_upgrade(move |socket| socket_session(state, claims.sub, socket))
}

fn set_online_flag(state: &AppState, user_id: &str, online: bool) {
    match state.store.get_user(user_id) {
        Ok(mut user) => {
            let now = Utc::now();
            user.is_online = online;
            user.last_seen_at = Some(now);
            user.updated_at = now;
            if let Err(err) = state.store.put_user(&user) {
                warn!(user = user_id, %err, "failed to persist online flag");
            }
        }
        Err(err) => warn!(user = user_id, %err, "failed to load user for online flag"),
    }
}

async fn socket_session(state: AppState, user_id: String, mut socket: WebSocket) {
    let socket_id = state.presence.connect(&user_id);
    set_online_flag(&state, &user_id, true);
    let (mut rx, backlog) = state.hub.subscribe(&user_id);
    debug!(user = %user_id, socket = socket_id, backlog = backlog.len(), "socket attached");

    // Replay everything not yet acknowledged, oldest first, then go live.
    for notification in backlog {
        if let Ok(body) = serde_json::to_string(&notification) {
            if socket.send(Message::Text(body.into())).await.is_err() {
                break;
            }
        }
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(message)) = incoming else { break };
                match message {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(ClientMessage::Ack { seq }) => state.hub.ack(&user_id, seq),
                        Ok(ClientMessage::Presence { state: mark }) => {
                            let active = matches!(mark, PresenceMark::Active);
                            state.presence.set_active(&user_id, socket_id, active);
                        }
                        Err(err) => debug!(user = %user_id, %err, "ignoring unparseable client message"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            outgoing = rx.recv() => {
                let Some(notification) = outgoing else { break };
                let Ok(body) = serde_json::to_string(&notification) else { continue };
                if socket.send(Message::Text(body.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    let remaining = state.presence.disconnect(&user_id, socket_id);
    if remaining == 0 {
        state.hub.detach(&user_id);
        set_online_flag(&state, &user_id, false);
    }
    debug!(user = %user_id, socket = socket_id, remaining, "socket detached");
}

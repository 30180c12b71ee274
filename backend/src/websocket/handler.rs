use crate::{
    error::{AppError, AppResult},
    game::{PuzzleSession, SelectionOutcome},
    models::SelectionView,
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// WebSocket upgrade handler for a puzzle session's drag channel
pub async fn handle_websocket(
    Path(id): Path<Uuid>,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> AppResult<impl IntoResponse> {
    if !state.sessions.contains_key(&id) {
        return Err(AppError::SessionNotFound(id));
    }
    tracing::info!("WebSocket upgrade for puzzle session {}", id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, id)))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, id: Uuid) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    tracing::info!("WebSocket connection established for puzzle session {}", id);

    match state.puzzle_view(id) {
        Ok(puzzle) => {
            let _ = tx.send(ServerMessage::PuzzleState { puzzle }).await;
        }
        Err(e) => {
            tracing::warn!("Session vanished before socket opened: {}", e);
            return;
        }
    }

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from the client
    let state_for_recv = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Err(e) =
                            handle_client_message(client_msg, &state_for_recv, &tx, id).await
                        {
                            tracing::error!("Error handling message: {}", e);
                            let error_msg = ServerMessage::Error {
                                message: e.to_string(),
                            };
                            let _ = tx.send(error_msg).await;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client disconnected from puzzle session {}", id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    // A drag never outlives its connection
    if let Err(e) = state.with_session(id, |session| session.drag_end()) {
        tracing::debug!("No drag to release on close: {}", e);
    }

    tracing::info!("WebSocket connection closed for puzzle session {}", id);
}

/// Handle individual client messages
pub(crate) async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
    id: Uuid,
) -> anyhow::Result<()> {
    match msg {
        ClientMessage::DragStart { x, y } => {
            apply(state, tx, id, |session| match session.position(x, y) {
                Some(pos) => session.drag_start(pos),
                None => SelectionOutcome::Ignored,
            })
            .await?;
        }
        ClientMessage::DragMove { x, y } => {
            apply(state, tx, id, |session| match session.position(x, y) {
                Some(pos) => session.drag_move(pos),
                None => SelectionOutcome::Ignored,
            })
            .await?;
        }
        ClientMessage::DragEnd => {
            apply(state, tx, id, PuzzleSession::drag_end).await?;
        }
        ClientMessage::DragCancel => {
            apply(state, tx, id, PuzzleSession::drag_cancel).await?;
        }
        ClientMessage::Click { x, y } => {
            apply(state, tx, id, |session| match session.position(x, y) {
                Some(pos) => session.click(pos),
                None => SelectionOutcome::Ignored,
            })
            .await?;
        }
        ClientMessage::Clear => {
            apply(state, tx, id, PuzzleSession::clear_selection).await?;
        }
        ClientMessage::Regenerate { category } => {
            tracing::info!(
                "Regenerating puzzle session {} (category: {:?})",
                id,
                category
            );
            let puzzle = state.regenerate(id, category.as_deref())?;
            tx.send(ServerMessage::PuzzleState { puzzle }).await?;
        }
        ClientMessage::Sync => {
            let puzzle = state.puzzle_view(id)?;
            tx.send(ServerMessage::PuzzleState { puzzle }).await?;
        }
    }

    Ok(())
}

/// Run one selection step and report the result. The session entry is released
/// before anything is sent.
async fn apply(
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
    id: Uuid,
    step: impl FnOnce(&mut PuzzleSession) -> SelectionOutcome,
) -> anyhow::Result<()> {
    let (outcome, selection) = state.with_session(id, |session| {
        let outcome = step(session);
        let selection = SelectionView::from_session(session, Some(outcome.clone()));
        (outcome, selection)
    })?;

    if outcome == SelectionOutcome::Ignored {
        tracing::debug!("Ignored input for puzzle session {}", id);
    }

    let found = selection.found.clone();
    let all_found = selection.all_found;
    tx.send(ServerMessage::Selection { selection }).await?;

    if let SelectionOutcome::Matched { word, newly_found } = outcome {
        tracing::info!("Puzzle session {} found {}", id, word);
        tx.send(ServerMessage::WordFound {
            word,
            newly_found,
            found,
            all_found,
        })
        .await?;

        if newly_found && all_found {
            tx.send(ServerMessage::PuzzleComplete).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{net::SocketAddr, time::Duration};
    use tokio_tungstenite::{connect_async, tungstenite};

    async fn serve(state: Arc<AppState>) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, crate::app(state)).await.unwrap();
        });
        addr
    }

    fn is_dragging(state: &AppState, id: Uuid) -> bool {
        state
            .with_session(id, |session| session.selection().is_dragging())
            .unwrap()
    }

    fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    #[tokio::test]
    async fn test_drag_selects_every_word() {
        let state = crate::test_state();
        let id = state.create_session(Some("elements")).unwrap().id;
        let placements = state
            .with_session(id, |session| session.placements().to_vec())
            .unwrap();
        let (tx, mut rx) = mpsc::channel(100);

        for (i, placement) in placements.iter().enumerate() {
            let start = placement.start;
            let end = placement.positions().last().unwrap();

            handle_client_message(
                ClientMessage::DragStart {
                    x: start.x as i64,
                    y: start.y as i64,
                },
                &state,
                &tx,
                id,
            )
            .await
            .unwrap();
            handle_client_message(
                ClientMessage::DragMove {
                    x: end.x as i64,
                    y: end.y as i64,
                },
                &state,
                &tx,
                id,
            )
            .await
            .unwrap();

            let messages = drain(&mut rx);
            let found = messages.iter().find_map(|m| match m {
                ServerMessage::WordFound { word, found, .. } => Some((word.clone(), found.len())),
                _ => None,
            });
            assert_eq!(found, Some((placement.word.clone(), i + 1)));
        }

        let complete = state.with_session(id, |session| session.all_found()).unwrap();
        assert!(complete);
    }

    #[tokio::test]
    async fn test_completion_is_announced_once() {
        let state = crate::test_state();
        let id = state.create_session(Some("athletes")).unwrap().id;
        let placements = state
            .with_session(id, |session| session.placements().to_vec())
            .unwrap();
        let (tx, mut rx) = mpsc::channel(100);

        let mut completions = 0;
        for placement in placements.iter().chain(placements.first()) {
            let start = placement.start;
            let end = placement.positions().last().unwrap();
            for msg in [
                ClientMessage::Click {
                    x: start.x as i64,
                    y: start.y as i64,
                },
                ClientMessage::Click {
                    x: end.x as i64,
                    y: end.y as i64,
                },
            ] {
                handle_client_message(msg, &state, &tx, id).await.unwrap();
            }
            completions += drain(&mut rx)
                .iter()
                .filter(|m| matches!(m, ServerMessage::PuzzleComplete))
                .count();
        }

        assert_eq!(completions, 1);
    }

    #[tokio::test]
    async fn test_drag_move_without_start_is_ignored() {
        let state = crate::test_state();
        let id = state.create_session(None).unwrap().id;
        let (tx, mut rx) = mpsc::channel(10);

        handle_client_message(ClientMessage::DragMove { x: 2, y: 2 }, &state, &tx, id)
            .await
            .unwrap();
        handle_client_message(ClientMessage::DragStart { x: -3, y: 0 }, &state, &tx, id)
            .await
            .unwrap();

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 2);
        for msg in messages {
            match msg {
                ServerMessage::Selection { selection } => {
                    assert_eq!(selection.outcome, Some(SelectionOutcome::Ignored));
                    assert!(selection.cells.is_empty());
                }
                other => panic!("unexpected message {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_regenerate_and_sync_send_puzzle_state() {
        let state = crate::test_state();
        let id = state.create_session(None).unwrap().id;
        let (tx, mut rx) = mpsc::channel(10);

        handle_client_message(
            ClientMessage::Regenerate {
                category: Some("countries".to_string()),
            },
            &state,
            &tx,
            id,
        )
        .await
        .unwrap();
        handle_client_message(ClientMessage::Sync, &state, &tx, id)
            .await
            .unwrap();

        let categories: Vec<String> = drain(&mut rx)
            .into_iter()
            .map(|m| match m {
                ServerMessage::PuzzleState { puzzle } => puzzle.category,
                other => panic!("unexpected message {:?}", other),
            })
            .collect();
        assert_eq!(categories, vec!["countries", "countries"]);
    }

    #[tokio::test]
    async fn test_unknown_session_errors() {
        let state = crate::test_state();
        let (tx, _rx) = mpsc::channel(10);

        let result =
            handle_client_message(ClientMessage::Sync, &state, &tx, Uuid::new_v4()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_socket_close_releases_drag() {
        let state = crate::test_state();
        let id = state.create_session(None).unwrap().id;
        let addr = serve(state.clone()).await;

        let (mut socket, _) = connect_async(format!("ws://{}/ws/{}", addr, id))
            .await
            .unwrap();
        socket
            .send(tungstenite::Message::Text(
                r#"{"type":"drag_start","x":0,"y":0}"#.into(),
            ))
            .await
            .unwrap();

        // Initial puzzle state, then the selection for the drag start
        for _ in 0..2 {
            socket.next().await.unwrap().unwrap();
        }
        assert!(is_dragging(&state, id));

        socket.close(None).await.unwrap();
        let released = async {
            while is_dragging(&state, id) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), released)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upgrade_for_unknown_session_is_not_found() {
        let addr = serve(crate::test_state()).await;

        let err = connect_async(format!("ws://{}/ws/{}", addr, Uuid::new_v4()))
            .await
            .unwrap_err();
        match err {
            tungstenite::Error::Http(response) => assert_eq!(response.status().as_u16(), 404),
            other => panic!("unexpected error {:?}", other),
        }
    }
}

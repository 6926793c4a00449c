//! Card deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, auth::UserID, card::delete_card, database_id::CardId,
};

/// The state needed for deleting a card.
#[derive(Debug, Clone)]
pub struct DeleteCardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle card deletion, which also deletes the card's transactions.
pub async fn delete_card_endpoint(
    Path(card_id): Path<CardId>,
    State(state): State<DeleteCardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_card(user_id, card_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Card deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingCard) => Error::DeleteMissingCard.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting card {card_id}: {error}");
            error.into_alert_response()
        }
    }
}

//! Budget deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, auth::UserID, budget::delete_budget, database_id::BudgetId,
};

/// The state needed for deleting a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn delete_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<DeleteBudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_budget(user_id, budget_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Budget deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingBudget) => Error::DeleteMissingBudget.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting budget {budget_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        budget::{Budget, create_budget, get_budgets},
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{DeleteBudgetState, delete_budget_endpoint};

    #[tokio::test]
    async fn can_delete_budget() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let budget = create_budget(
            user.id,
            Budget::build("Food", 10.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31)),
            &connection,
        )
        .unwrap();
        let state = DeleteBudgetState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            delete_budget_endpoint(Path(budget.id), State(state.clone()), Extension(user.id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_budgets(user.id, &state.db_connection.lock().unwrap()),
            Ok(vec![])
        );
    }

    #[tokio::test]
    async fn delete_missing_budget_is_not_found() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let state = DeleteBudgetState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_budget_endpoint(Path(3), State(state), Extension(user.id)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

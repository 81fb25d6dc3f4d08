//! Registration endpoints

use axum::{extract::State, Json};

use super::AppState;
use crate::middleware::CurrentUser;
use crate::models::RegistrationView;
use crate::utils::errors::Result;

/// GET /registrations/mine
pub async fn my_registrations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<RegistrationView>>> {
    Ok(Json(state.services.lifecycle.my_registrations(&user).await?))
}

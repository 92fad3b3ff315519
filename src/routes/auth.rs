use crate::{
    error::AppError,
    middleware::auth::LOGIN_PATH,
    models::LoginForm,
    routes::{form_or_default, AppState},
};
use axum::{
    extract::{rejection::FormRejection, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::json;

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    // Already signed in: nothing to do here
    if state.auth.get_current_user(&headers).await.is_some() {
        return Redirect::to("/").into_response();
    }

    Json(json!({})).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    // Unreadable body counts as empty fields -> 400 JSON
    let form = form_or_default(form);
    let set_cookie = state.auth.login(&form.email, &form.password).await?;

    Ok(([(SET_COOKIE, set_cookie)], Redirect::to("/")).into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let clear_cookie = state.auth.logout(&headers).await;

    ([(SET_COOKIE, clear_cookie)], Redirect::to(LOGIN_PATH)).into_response()
}

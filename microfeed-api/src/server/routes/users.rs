use crate::server::{
    Result, ServerRouter,
    auth::session_cookie,
    json::Json,
};
use axum::extract::State;
use axum_extra::{
    extract::cookie::CookieJar,
    routing::{RouterExt, TypedPath},
};
use microfeed_common::model::user::{Credentials, Registration, User, Username};
use microfeed_db::{
    backend::Backend,
    store::{Store, StoreError},
};
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(register)
        .typed_post(login)
}

#[derive(TypedPath)]
#[typed_path("/register")]
struct RegisterPath;

async fn register(
    RegisterPath: RegisterPath,
    State(store): State<Arc<Backend>>,
    Json(registration): Json<Registration>,
) -> Result<Json<User>> {
    let user = store
        .create_user(registration.username, registration.password)
        .await?;

    info!(user_id = %user.id, "Registered user");
    Ok(Json(user))
}

#[derive(TypedPath)]
#[typed_path("/login")]
struct LoginPath;

async fn login(
    LoginPath: LoginPath,
    State(store): State<Arc<Backend>>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<User>)> {
    let username =
        Username::new(credentials.username).map_err(|_| StoreError::InvalidCredentials)?;
    let user = store
        .authenticate(&username, &credentials.password)
        .await?;

    let jar = jar.add(session_cookie(user.id));
    Ok((jar, Json(user)))
}

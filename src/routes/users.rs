use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use tracing::info;

use super::{layout, render};
use crate::{
    AppState,
    error::AppResult,
    accounts::RegisterOutcome,
    forms::{FieldErrors, LoginForm, ProfileForm, RegisterForm},
    models::Flash,
    session::{self, CurrentUser, MaybeUser, safe_next},
    templates,
};

pub async fn home(MaybeUser(user): MaybeUser, jar: SignedCookieJar) -> Response {
    let (jar, layout) = layout(jar, user.as_ref());
    render(jar, templates::home_page(&layout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    next: Option<String>,
}

pub async fn login_form(
    MaybeUser(user): MaybeUser,
    jar: SignedCookieJar,
    Query(query): Query<NextQuery>,
) -> Response {
    let (jar, layout) = layout(jar, user.as_ref());
    let next = safe_next(query.next.as_deref());
    render(jar, templates::login_page(&layout, "", next))
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if let Some(user) = state.accounts.authenticate(&form.username, &form.password).await? {
        info!(user_id = user.id, "user logged in");
        let jar = session::login(jar, user.id, state.config.session_days);
        let jar = session::flash(jar, Flash::success(format!("You are logged in as {}.", user.username)));
        let target = safe_next(form.next.as_deref()).unwrap_or("/movies");
        return Ok((jar, Redirect::to(target)).into_response());
    }

    let (jar, mut layout) = layout(jar, None);
    layout.flashes.push(Flash::error("An error occurred while trying to login."));
    let next = safe_next(form.next.as_deref());
    Ok(render(jar, templates::login_page(&layout, form.username.trim(), next)))
}

pub async fn logout(CurrentUser(user): CurrentUser, jar: SignedCookieJar) -> impl IntoResponse {
    info!(user_id = user.id, "user logged out");
    (session::logout(jar), Redirect::to("/"))
}

pub async fn register_form(MaybeUser(user): MaybeUser, jar: SignedCookieJar) -> Response {
    let (jar, layout) = layout(jar, user.as_ref());
    render(jar, templates::register_page(&layout, &RegisterForm::default(), &FieldErrors::default()))
}

pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let errors = match form.validate() {
        Ok(registration) => match state.accounts.register(registration).await? {
            RegisterOutcome::Registered(user) => {
                let jar = session::login(jar, user.id, state.config.session_days);
                let jar = session::flash(
                    jar,
                    Flash::success(format!("User {} registered successfully.", user.username)),
                );
                return Ok((jar, Redirect::to("/profile")).into_response());
            },
            RegisterOutcome::UsernameTaken => {
                let mut errors = FieldErrors::default();
                errors.add("username", "A user with that username already exists.");
                errors
            },
        },
        Err(errors) => errors,
    };

    let (jar, mut layout) = layout(jar, None);
    layout.flashes.push(Flash::error("An error occurred while trying to register."));
    Ok(render(jar, templates::register_page(&layout, &form, &errors)))
}

pub async fn profile_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let profile = state.accounts.profile(user.id).await?;
    let form = templates::profile_form(&user, &profile);
    let (jar, layout) = layout(jar, Some(&user));
    Ok(render(jar, templates::profile_page(&layout, &user, &form, &FieldErrors::default())))
}

/// All three parts validate before anything is written.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    match form.validate() {
        Ok(update) => {
            state.accounts.update_profile(&user, update).await?;
            let jar = session::flash(jar, Flash::success("Profile updated successfully!"));
            Ok((jar, Redirect::to("/movies")).into_response())
        },
        Err(errors) => {
            let (jar, mut layout) = layout(jar, Some(&user));
            layout.flashes.push(Flash::error("Error updating profile!"));
            Ok(render(jar, templates::profile_page(&layout, &user, &form, &errors)))
        },
    }
}

use axum::{
    Json,
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use super::{layout, render};
use crate::{
    AppState,
    catalog::{CreateOutcome, RateOutcome, SHELF_SIZE},
    error::{AppError, AppResult},
    forms::{CommentForm, FieldErrors, MovieForm, MovieUpdateForm, RatingForm},
    models::{FavoriteStatus, Flash, Genre},
    session::{self, CurrentUser, MaybeUser},
    templates,
};

const MOVIE: &str = "movie";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenreQuery {
    genre: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    q: String,
    genre: Option<String>,
}

fn genre_param(raw: Option<&str>) -> Option<Genre> {
    raw.and_then(|slug| Genre::from_slug(slug.trim()))
}

pub async fn list(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: SignedCookieJar,
    Query(query): Query<GenreQuery>,
) -> AppResult<Response> {
    let genre = genre_param(query.genre.as_deref());
    let movies = state.catalog.list(genre).await?;
    let (jar, layout) = layout(jar, user.as_ref());
    Ok(render(jar, templates::movie_list_page(&layout, &movies, genre)))
}

pub async fn search(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: SignedCookieJar,
    Query(query): Query<SearchQuery>,
) -> Response {
    let genre = genre_param(query.genre.as_deref());
    let movies = match state.catalog.search(&query.q, genre).await {
        Ok(movies) => movies,
        Err(err) => {
            warn!(error = %err, q = %query.q, "movie search failed");
            let body = templates::error_page("An error occurred while querying the database.");
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response();
        },
    };

    let message = (movies.is_empty() && !query.q.trim().is_empty()).then_some("No movies found!");
    let (jar, layout) = layout(jar, user.as_ref());
    render(jar, templates::search_results_page(&layout, query.q.trim(), &movies, message))
}

pub async fn favorites(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let movies = state.catalog.favorites().await?;
    let (jar, layout) = layout(jar, user.as_ref());
    Ok(render(jar, templates::favorites_page(&layout, &movies)))
}

/// Browsers always send `Origin` on cross-site POSTs; a mismatch with `Host`
/// is refused.
fn same_origin(headers: &HeaderMap) -> bool {
    let Some(origin) = headers.get(header::ORIGIN) else {
        return true;
    };
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let origin_host = origin.to_str().ok().and_then(|o| o.split_once("://")).map(|(_, rest)| rest);
    matches!((origin_host, host), (Some(o), Some(h)) if o.eq_ignore_ascii_case(h))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> AppResult<Response> {
    if !same_origin(&headers) {
        warn!(movie_id = id, origin = ?headers.get(header::ORIGIN), "cross-site favorite toggle refused");
        return Ok(StatusCode::FORBIDDEN.into_response());
    }
    let is_favorite = state.catalog.toggle_favorite(id).await?.ok_or(AppError::NotFound(MOVIE))?;
    Ok(Json(FavoriteStatus::success(is_favorite)).into_response())
}

pub async fn most_liked(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let ranked = state.catalog.most_liked(SHELF_SIZE).await?;
    let (jar, layout) = layout(jar, user.as_ref());
    Ok(render(jar, templates::most_liked_page(&layout, &ranked)))
}

pub async fn newest(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let movies = state.catalog.newest(SHELF_SIZE).await?;
    let (jar, layout) = layout(jar, user.as_ref());
    Ok(render(jar, templates::newest_page(&layout, &movies)))
}

pub async fn genres(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let shelves = state.catalog.by_genre(SHELF_SIZE).await?;
    let (jar, layout) = layout(jar, user.as_ref());
    Ok(render(jar, templates::genres_page(&layout, &shelves)))
}

pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let detail = state.catalog.detail(id, user.id).await?.ok_or(AppError::NotFound(MOVIE))?;
    let (jar, layout) = layout(jar, Some(&user));
    Ok(render(jar, templates::movie_detail_page(&layout, &detail)))
}

/// Always lands back on the detail page; the outcome travels as a flash.
pub async fn rate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
    Form(form): Form<RatingForm>,
) -> AppResult<Response> {
    state.catalog.get(id).await?.ok_or(AppError::NotFound(MOVIE))?;
    let back = Redirect::to(&format!("/movies/{id}"));

    let value = match form.validate() {
        Ok(value) => value,
        Err(errors) => {
            let message = errors.get("value").unwrap_or("Invalid rating.").to_string();
            return Ok((session::flash(jar, Flash::error(message)), back).into_response());
        },
    };

    let message = match state.catalog.rate(id, user.id, value).await {
        Ok(RateOutcome::Created) => Flash::success("Rating submitted successfully"),
        Ok(RateOutcome::AlreadyRated) => {
            Flash::error("You have already submitted a rating for this movie.")
        },
        Err(err) => {
            warn!(error = %err, movie_id = id, user_id = user.id, "rating submission failed");
            Flash::error("An error occurred during rating submission")
        },
    };
    Ok((session::flash(jar, message), back).into_response())
}

pub async fn add_form(CurrentUser(user): CurrentUser, jar: SignedCookieJar) -> Response {
    let (jar, layout) = layout(jar, Some(&user));
    render(jar, templates::add_movie_page(&layout, &MovieForm::default(), &FieldErrors::default()))
}

pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Form(form): Form<MovieForm>,
) -> AppResult<Response> {
    let errors = match form.validate() {
        Ok(input) => match state.catalog.create(user.id, input).await? {
            CreateOutcome::Created(_) => {
                let jar = session::flash(jar, Flash::success("Movie added successfully!"));
                return Ok((jar, Redirect::to("/movies")).into_response());
            },
            CreateOutcome::TitleTaken => {
                let mut errors = FieldErrors::default();
                errors.add("title", "Movie with this title already exists.");
                errors
            },
        },
        Err(errors) => errors,
    };

    let (jar, mut layout) = layout(jar, Some(&user));
    layout.flashes.push(Flash::error("Form is not valid. Please check the input."));
    Ok(render(jar, templates::add_movie_page(&layout, &form, &errors)))
}

pub async fn update_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let movie = state.catalog.get(id).await?.ok_or(AppError::NotFound(MOVIE))?;
    let form = MovieUpdateForm {
        description: movie.description.clone(),
        release_date: movie.release_date.clone(),
        cover_image: String::new(),
    };
    let (jar, layout) = layout(jar, Some(&user));
    Ok(render(jar, templates::update_movie_page(&layout, &movie, &form, &FieldErrors::default())))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
    Form(form): Form<MovieUpdateForm>,
) -> AppResult<Response> {
    let movie = state.catalog.get(id).await?.ok_or(AppError::NotFound(MOVIE))?;

    match form.validate() {
        Ok(changes) => {
            state.catalog.update(id, changes).await?.ok_or(AppError::NotFound(MOVIE))?;
            let jar = session::flash(jar, Flash::success("Movie updated successfully!"));
            Ok((jar, Redirect::to("/movies")).into_response())
        },
        Err(errors) => {
            let (jar, mut layout) = layout(jar, Some(&user));
            layout.flashes.push(Flash::error("Error updating movie. Please check the form."));
            Ok(render(jar, templates::update_movie_page(&layout, &movie, &form, &errors)))
        },
    }
}

pub async fn delete_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let movie = state.catalog.get(id).await?.ok_or(AppError::NotFound(MOVIE))?;
    let (jar, layout) = layout(jar, Some(&user));
    Ok(render(jar, templates::delete_movie_page(&layout, &movie)))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    if !state.catalog.delete(id).await? {
        return Err(AppError::NotFound(MOVIE));
    }
    info!(movie_id = id, user_id = user.id, "movie deleted");
    Ok(Redirect::to("/movies"))
}

pub async fn comment_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let movie = state.catalog.get(id).await?.ok_or(AppError::NotFound(MOVIE))?;
    let (jar, layout) = layout(jar, Some(&user));
    Ok(render(
        jar,
        templates::add_comment_page(&layout, &movie, &CommentForm::default(), &FieldErrors::default()),
    ))
}

pub async fn comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let movie = state.catalog.get(id).await?.ok_or(AppError::NotFound(MOVIE))?;

    let (errors, failure) = match form.validate() {
        Ok(text) => match state.catalog.add_comment(id, user.id, text).await {
            Ok(_) => {
                let jar = session::flash(jar, Flash::success("Comment submitted successfully"));
                return Ok((jar, Redirect::to(&format!("/movies/{id}"))).into_response());
            },
            Err(err) => {
                warn!(error = %err, movie_id = id, user_id = user.id, "comment submission failed");
                (
                    FieldErrors::default(),
                    Some(Flash::error("An error occurred during comment submission.")),
                )
            },
        },
        Err(errors) => (errors, None),
    };

    let (jar, mut layout) = layout(jar, Some(&user));
    layout.flashes.extend(failure);
    Ok(render(jar, templates::add_comment_page(&layout, &movie, &form, &errors)))
}

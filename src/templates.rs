use maud::{DOCTYPE, Markup, PreEscaped, html};
use sea_orm::Iterable;

use crate::{
    accounts::Profile,
    entities::{movie, user},
    forms::{CommentForm, FieldErrors, MovieForm, MovieUpdateForm, ProfileForm, RATING_RANGE, RegisterForm},
    models::{City, Flash, FlashLevel, Genre, GenreShelf, MovieDetail, RankedMovie},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

const FAVORITE_SCRIPT: &str = r#"
document.addEventListener("click", async (ev) => {
  const btn = ev.target.closest("[data-favorite]");
  if (!btn) return;
  const res = await fetch(btn.dataset.favorite, { method: "POST" });
  if (!res.ok) return;
  const body = await res.json();
  btn.textContent = body.is_favorite ? "★ Favorite" : "☆ Add to favorites";
});
"#;

/// Per-request page chrome: who is logged in and which messages to show.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub username: Option<String>,
    pub flashes: Vec<Flash>,
}

impl Layout {
    pub fn new(user: Option<&user::Model>, flashes: Vec<Flash>) -> Self {
        Self { username: user.map(|u| u.username.clone()), flashes }
    }
}

pub fn home_page(layout: &Layout) -> String {
    page(
        "Movie Shelf",
        layout,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-3xl font-bold text-gray-900" { "Movie Shelf" }
                p class="mt-2 text-gray-600" { "Catalogue, rate and discuss the movies you love." }
                div class="mt-8 grid gap-4 sm:grid-cols-2" {
                    (home_link("/movies", "Browse the catalogue"))
                    (home_link("/movies/newest", "Newest releases"))
                    (home_link("/movies/liked", "Most liked"))
                    (home_link("/movies/genres", "By genre"))
                }
            }
        },
    )
}

fn home_link(href: &str, label: &str) -> Markup {
    html! {
        a class="block rounded-md border border-gray-200 p-4 font-medium text-blue-600 hover:bg-gray-50" href=(href) { (label) }
    }
}

pub fn movie_list_page(layout: &Layout, movies: &[movie::Model], selected: Option<Genre>) -> String {
    page(
        "Movies",
        layout,
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-3xl font-bold text-gray-900" { "Movies" }
                @if layout.username.is_some() {
                    a class=(BUTTON_CLASS) href="/movies/add" { "Add movie" }
                }
            }
            div class="mt-6 flex flex-wrap gap-2" {
                (genre_chip("/movies", "All", selected.is_none()))
                @for genre in Genre::iter() {
                    (genre_chip(
                        &format!("/movies?genre={}", urlencoding::encode(&genre.slug())),
                        genre.label(),
                        selected == Some(genre),
                    ))
                }
            }
            (movie_grid(movies, "No movies yet."))
        },
    )
}

fn genre_chip(href: &str, label: &str, active: bool) -> Markup {
    let class = if active {
        "rounded-full bg-blue-600 px-3 py-1 text-sm text-white"
    } else {
        "rounded-full bg-gray-200 px-3 py-1 text-sm text-gray-700 hover:bg-gray-300"
    };
    html! { a class=(class) href=(href) { (label) } }
}

pub fn search_results_page(
    layout: &Layout,
    query: &str,
    movies: &[movie::Model],
    message: Option<&str>,
) -> String {
    page(
        "Search",
        layout,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Search results" }
            @if !query.is_empty() {
                p class="mt-2 text-gray-600" { "for “" (query) "”" }
            }
            @if let Some(message) = message {
                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { (message) }
                }
            } @else {
                (movie_grid(movies, "No movies found!"))
            }
        },
    )
}

pub fn favorites_page(layout: &Layout, movies: &[movie::Model]) -> String {
    page(
        "Favorites",
        layout,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Favorite movies" }
            (movie_grid(movies, "No favorites yet."))
        },
    )
}

pub fn most_liked_page(layout: &Layout, ranked: &[RankedMovie]) -> String {
    page(
        "Most liked",
        layout,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Most liked" }
            ol class="mt-8 space-y-4" {
                @for entry in ranked {
                    li class="bg-white shadow rounded-lg p-6 flex items-center justify-between" {
                        (movie_summary(&entry.movie))
                        span class="text-sm text-gray-500" { (entry.rating_count) " ratings" }
                    }
                }
            }
        },
    )
}

pub fn newest_page(layout: &Layout, movies: &[movie::Model]) -> String {
    page(
        "Newest",
        layout,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Newest releases" }
            (movie_grid(movies, "No movies yet."))
        },
    )
}

pub fn genres_page(layout: &Layout, shelves: &[GenreShelf]) -> String {
    page(
        "Genres",
        layout,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "By genre" }
            @if shelves.is_empty() {
                p class="mt-8 text-gray-600" { "No movies yet." }
            }
            @for shelf in shelves {
                section class="mt-10" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        a class="hover:text-blue-700" href=(format!("/movies?genre={}", urlencoding::encode(&shelf.genre.slug()))) {
                            (shelf.genre.label())
                        }
                    }
                    (movie_grid(&shelf.movies, ""))
                }
            }
        },
    )
}

pub fn movie_detail_page(layout: &Layout, detail: &MovieDetail) -> String {
    let movie = &detail.movie;
    page(
        &movie.title,
        layout,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                div class="flex items-start justify-between gap-6" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                        p class="mt-1 text-gray-600" {
                            (movie.director) " · " (movie.genre.label()) " · " (movie.release_date)
                        }
                    }
                    (favorite_button(movie))
                }
                @if !movie.cover_image.is_empty() {
                    img class="mt-6 max-h-96 rounded" src=(format!("/{}", movie.cover_image)) alt=(movie.title);
                }
                @if !movie.description.is_empty() {
                    p class="mt-6 text-gray-700 whitespace-pre-line" { (movie.description) }
                }
                p class="mt-6 text-sm text-gray-700" {
                    "Average rating: "
                    span class="font-semibold" {
                        @match detail.average_rating {
                            Some(avg) => { (format!("{avg:.1}")) " / " (RATING_RANGE.end()) " (" (detail.rating_count) ")" },
                            None => "No ratings yet",
                        }
                    }
                }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/movies/{}/update", movie.id)) { "Edit" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/movies/{}/delete", movie.id)) { "Delete" }
                }
            }

            div class="mt-6 bg-white shadow rounded-lg p-8" {
                h2 class="text-xl font-semibold text-gray-900" { "Rate this movie" }
                @if detail.rated_by_viewer {
                    p class="mt-2 text-sm text-gray-500" { "You have rated this movie." }
                } @else {
                    form class="mt-4 flex items-end gap-4" method="post" action=(format!("/movies/{}", movie.id)) {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="value" { "Rating" }
                            select class=(INPUT_CLASS) name="value" id="value" {
                                @for v in RATING_RANGE {
                                    option value=(v) { (v) }
                                }
                            }
                        }
                        button class=(BUTTON_CLASS) type="submit" { "Rate" }
                    }
                }
            }

            div class="mt-6 bg-white shadow rounded-lg p-8" {
                div class="flex items-center justify-between" {
                    h2 class="text-xl font-semibold text-gray-900" { "Comments" }
                    a class="text-sm text-blue-600 hover:text-blue-800" href=(format!("/movies/{}/comment", movie.id)) { "Add comment" }
                }
                @if detail.comments.is_empty() {
                    p class="mt-4 text-sm text-gray-500" { "No comments yet." }
                }
                ul class="mt-4 space-y-4" {
                    @for view in &detail.comments {
                        li class="border-l-4 border-blue-500 pl-4" {
                            p class="text-sm font-medium text-gray-900" {
                                (view.username)
                                span class="ml-2 font-normal text-gray-500" { (format_timestamp(view.comment.created_at)) }
                            }
                            p class="mt-1 text-gray-700 whitespace-pre-line" { (view.comment.text) }
                        }
                    }
                }
            }
        },
    )
}

fn favorite_button(movie: &movie::Model) -> Markup {
    html! {
        button class="rounded-md border border-yellow-400 px-3 py-1 text-sm text-yellow-700 hover:bg-yellow-50" type="button" data-favorite=(format!("/movies/{}/favorite", movie.id)) {
            @if movie.is_favorite { "★ Favorite" } @else { "☆ Add to favorites" }
        }
    }
}

pub fn add_movie_page(layout: &Layout, form: &MovieForm, errors: &FieldErrors) -> String {
    page(
        "Add movie",
        layout,
        html! {
            (card_form("Add movie", "/movies/add", "Add Movie", html! {
                (text_field("Title", "title", &form.title, errors, true))
                (textarea_field("Description", "description", &form.description, errors))
                (date_field("Release date", "release_date", &form.release_date, errors))
                (text_field("Director", "director", &form.director, errors, true))
                div {
                    label class="block text-sm font-medium text-gray-700" for="genre" { "Genre" }
                    select class=(INPUT_CLASS) name="genre" id="genre" required {
                        option value="" { "---------" }
                        @for genre in Genre::iter() {
                            option value=(genre.slug()) selected[form.genre == genre.slug()] { (genre.label()) }
                        }
                    }
                    (field_error(errors, "genre"))
                }
                (text_field("Cover image", "cover_image", &form.cover_image, errors, false))
            }))
        },
    )
}

pub fn update_movie_page(
    layout: &Layout,
    movie: &movie::Model,
    form: &MovieUpdateForm,
    errors: &FieldErrors,
) -> String {
    page(
        "Update movie",
        layout,
        html! {
            (card_form(&format!("Update “{}”", movie.title), &format!("/movies/{}/update", movie.id), "Save", html! {
                (textarea_field("Description", "description", &form.description, errors))
                (date_field("Release date", "release_date", &form.release_date, errors))
                (text_field("Cover image", "cover_image", &form.cover_image, errors, false))
                @if !movie.cover_image.is_empty() {
                    p class="text-xs text-gray-500" { "Current: " (movie.cover_image) }
                }
            }))
        },
    )
}

pub fn delete_movie_page(layout: &Layout, movie: &movie::Model) -> String {
    page(
        "Delete movie",
        layout,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Delete “" (movie.title) "”?" }
                p class="mt-4 text-gray-700" { "Its ratings and comments will be deleted as well." }
                form class="mt-6 flex gap-4" method="post" action=(format!("/movies/{}/delete", movie.id)) {
                    button class="rounded-md bg-red-600 px-4 py-2 font-semibold text-white hover:bg-red-700" type="submit" { "Delete" }
                    a class="px-4 py-2 text-gray-700" href=(format!("/movies/{}", movie.id)) { "Cancel" }
                }
            }
        },
    )
}

pub fn add_comment_page(
    layout: &Layout,
    movie: &movie::Model,
    form: &CommentForm,
    errors: &FieldErrors,
) -> String {
    page(
        "Add comment",
        layout,
        html! {
            (card_form(&format!("Comment on “{}”", movie.title), &format!("/movies/{}/comment", movie.id), "Submit", html! {
                (textarea_field("Comment", "text", &form.text, errors))
            }))
        },
    )
}

pub fn register_page(layout: &Layout, form: &RegisterForm, errors: &FieldErrors) -> String {
    page(
        "Register",
        layout,
        html! {
            (card_form("Register", "/register", "Register", html! {
                (text_field("Username", "username", &form.username, errors, true))
                (password_field("Password", "password1", errors))
                (password_field("Password confirmation", "password2", errors))
            }))
        },
    )
}

pub fn login_page(layout: &Layout, username: &str, next: Option<&str>) -> String {
    page(
        "Login",
        layout,
        html! {
            (card_form("Login", "/login", "Login", html! {
                @if let Some(next) = next {
                    input type="hidden" name="next" value=(next);
                }
                (text_field("Username", "username", username, &FieldErrors::default(), true))
                (password_field("Password", "password", &FieldErrors::default()))
                p class="text-sm text-gray-600" {
                    "No account? " a class="text-blue-600 hover:text-blue-800" href="/register" { "Register" }
                }
            }))
        },
    )
}

pub fn profile_page(layout: &Layout, user: &user::Model, form: &ProfileForm, errors: &FieldErrors) -> String {
    page(
        "Profile",
        layout,
        html! {
            (card_form("Profile", "/profile", "Save profile", html! {
                fieldset class="space-y-4" {
                    legend class="text-lg font-semibold text-gray-900" { "Account" }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="username" { "Username" }
                        input class=(INPUT_CLASS) id="username" value=(user.username) disabled;
                    }
                    (text_field("First name", "first_name", &form.first_name, errors, false))
                    (text_field("Last name", "last_name", &form.last_name, errors, false))
                    (text_field("Email", "email", &form.email, errors, false))
                }
                fieldset class="space-y-4" {
                    legend class="text-lg font-semibold text-gray-900" { "Contact" }
                    (text_field("Phone number", "phone_number", &form.phone_number, errors, false))
                    (text_field("Photo", "photo_profile", &form.photo_profile, errors, false))
                }
                fieldset class="space-y-4" {
                    legend class="text-lg font-semibold text-gray-900" { "Location" }
                    (text_field("Address 1", "address_1", &form.address_1, errors, true))
                    (text_field("Address 2", "address_2", &form.address_2, errors, false))
                    div {
                        label class="block text-sm font-medium text-gray-700" for="city" { "City" }
                        select class=(INPUT_CLASS) name="city" id="city" {
                            @for city in City::iter() {
                                option value=(city.name()) selected[form.city == city.name()] { (city.name()) }
                            }
                        }
                        (field_error(errors, "city"))
                    }
                }
            }))
        },
    )
}

/// Profile form prefilled from what is stored.
pub fn profile_form(user: &user::Model, profile: &Profile) -> ProfileForm {
    let location = profile.location.as_ref();
    ProfileForm {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        phone_number: profile.profile.phone_number.clone(),
        photo_profile: String::new(),
        address_1: location.map(|l| l.address_1.clone()).unwrap_or_default(),
        address_2: location.map(|l| l.address_2.clone()).unwrap_or_default(),
        city: location.map(|l| l.city).unwrap_or_default().name(),
    }
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        &Layout::default(),
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Error" }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
            }
        },
    )
}

fn page(title: &str, layout: &Layout, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Movie Shelf" }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (nav(layout))
                main class="max-w-4xl mx-auto px-6 py-10" {
                    (flashes(&layout.flashes))
                    (body)
                }
                script { (PreEscaped(FAVORITE_SCRIPT)) }
            }
        }
    }
    .into_string()
}

fn nav(layout: &Layout) -> Markup {
    html! {
        nav class="bg-white shadow" {
            div class="max-w-4xl mx-auto px-6 py-4 flex flex-wrap items-center gap-4" {
                a class="font-bold text-gray-900" href="/" { "Movie Shelf" }
                a class="text-sm text-gray-600 hover:text-gray-900" href="/movies" { "Movies" }
                a class="text-sm text-gray-600 hover:text-gray-900" href="/movies/favorites" { "Favorites" }
                form class="ml-auto flex gap-2" method="get" action="/movies/search" {
                    input class="rounded-md border border-gray-300 px-2 py-1 text-sm" type="search" name="q" placeholder="Title or director";
                }
                @match &layout.username {
                    Some(username) => {
                        a class="text-sm text-gray-600 hover:text-gray-900" href="/profile" { (username) }
                        a class="text-sm text-gray-600 hover:text-gray-900" href="/logout" { "Logout" }
                    },
                    None => {
                        a class="text-sm text-gray-600 hover:text-gray-900" href="/login" { "Login" }
                        a class="text-sm text-gray-600 hover:text-gray-900" href="/register" { "Register" }
                    },
                }
            }
        }
    }
}

fn flashes(messages: &[Flash]) -> Markup {
    html! {
        @for flash in messages {
            @let class = match flash.level {
                FlashLevel::Success => "mb-6 rounded-md bg-green-50 border border-green-200 px-4 py-3 text-green-800",
                FlashLevel::Error => "mb-6 rounded-md bg-red-50 border border-red-200 px-4 py-3 text-red-800",
            };
            div class=(class) role="alert" { (flash.message) }
        }
    }
}

fn movie_grid(movies: &[movie::Model], empty: &str) -> Markup {
    html! {
        @if movies.is_empty() {
            @if !empty.is_empty() {
                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { (empty) }
                }
            }
        } @else {
            div class="mt-8 grid gap-4 md:grid-cols-2" {
                @for movie in movies {
                    div class="bg-white shadow rounded-lg p-6 flex items-start justify-between gap-4" {
                        (movie_summary(movie))
                        (favorite_button(movie))
                    }
                }
            }
        }
    }
}

fn movie_summary(movie: &movie::Model) -> Markup {
    html! {
        div {
            a class="text-lg font-semibold text-gray-900 hover:text-blue-700" href=(format!("/movies/{}", movie.id)) { (movie.title) }
            p class="mt-1 text-sm text-gray-500" {
                (movie.director) " · " (movie.genre.label()) " · " (movie.release_date)
            }
        }
    }
}

fn card_form(heading: &str, action: &str, submit: &str, fields: Markup) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-8" {
            h1 class="text-2xl font-bold text-gray-900" { (heading) }
            form class="mt-8 space-y-6" method="post" action=(action) {
                (fields)
                button class=(format!("w-full {BUTTON_CLASS}")) type="submit" { (submit) }
            }
        }
    }
}

fn text_field(label: &str, name: &str, value: &str, errors: &FieldErrors, required: bool) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class=(INPUT_CLASS) type="text" name=(name) id=(name) value=(value) required[required];
            (field_error(errors, name))
        }
    }
}

fn password_field(label: &str, name: &str, errors: &FieldErrors) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class=(INPUT_CLASS) type="password" name=(name) id=(name) required;
            (field_error(errors, name))
        }
    }
}

fn date_field(label: &str, name: &str, value: &str, errors: &FieldErrors) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class=(INPUT_CLASS) type="date" name=(name) id=(name) value=(value) required;
            (field_error(errors, name))
        }
    }
}

fn textarea_field(label: &str, name: &str, value: &str, errors: &FieldErrors) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            textarea class=(INPUT_CLASS) name=(name) id=(name) rows="4" { (value) }
            (field_error(errors, name))
        }
    }
}

fn field_error(errors: &FieldErrors, name: &str) -> Markup {
    html! {
        @if let Some(message) = errors.get(name) {
            p class="mt-2 text-sm text-red-600" { (message) }
        }
    }
}

fn format_timestamp(secs: i64) -> String {
    jiff::Timestamp::from_second(secs)
        .map(|ts| ts.strftime("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

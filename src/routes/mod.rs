mod movies;
mod users;

use axum::{
    Router,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::SignedCookieJar;

use crate::{AppState, entities::user, session, templates::Layout};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(users::home))
        .route("/login", get(users::login_form).post(users::login))
        .route("/register", get(users::register_form).post(users::register))
        .route("/logout", get(users::logout))
        .route("/profile", get(users::profile_form).post(users::update_profile))
        .route("/movies", get(movies::list))
        .route("/movies/search", get(movies::search))
        .route("/movies/favorites", get(movies::favorites))
        .route("/movies/liked", get(movies::most_liked))
        .route("/movies/newest", get(movies::newest))
        .route("/movies/genres", get(movies::genres))
        .route("/movies/add", get(movies::add_form).post(movies::add))
        .route("/movies/{id}", get(movies::detail).post(movies::rate))
        .route("/movies/{id}/update", get(movies::update_form).post(movies::update))
        .route("/movies/{id}/delete", get(movies::delete_form).post(movies::delete))
        .route("/movies/{id}/comment", get(movies::comment_form).post(movies::comment))
        .route("/movies/{id}/favorite", post(movies::toggle_favorite))
        .with_state(state)
}

/// Drains pending flash messages into the page chrome.
fn layout(jar: SignedCookieJar, user: Option<&user::Model>) -> (SignedCookieJar, Layout) {
    let (jar, flashes) = session::take_flashes(jar);
    (jar, Layout::new(user, flashes))
}

fn render(jar: SignedCookieJar, body: String) -> Response {
    (jar, Html(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use axum_extra::extract::cookie::Key;
    use sea_orm::{EntityTrait, PaginatorTrait};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::Config,
        entities::rating,
        forms::Registration,
        models::Genre,
        test_support::{insert_movie, memory_db},
    };

    async fn test_app() -> (Router, AppState) {
        let config = Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "sqlite::memory:".into(),
            secret_key: None,
            session_days: 1,
        };
        let state = AppState::new(Arc::new(config), memory_db().await, Key::generate());
        (router(state.clone()), state)
    }

    /// Minimal client-side cookie jar.
    #[derive(Default)]
    struct Cookies(HashMap<String, String>);

    impl Cookies {
        fn store(&mut self, resp: &Response) {
            for value in resp.headers().get_all(header::SET_COOKIE) {
                let Some(pair) = value.to_str().unwrap().split(';').next() else {
                    continue;
                };
                let (name, value) = pair.split_once('=').unwrap();
                if value.is_empty() {
                    self.0.remove(name);
                } else {
                    self.0.insert(name.to_string(), value.to_string());
                }
            }
        }

        fn header(&self) -> String {
            self.0.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("; ")
        }
    }

    async fn send(app: &Router, cookies: &mut Cookies, mut req: Request<Body>) -> Response {
        if !cookies.0.is_empty() {
            req.headers_mut().insert(header::COOKIE, cookies.header().parse().unwrap());
        }
        let resp = app.clone().oneshot(req).await.unwrap();
        cookies.store(&resp);
        resp
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(resp: &Response) -> &str {
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
    }

    async fn logged_in(app: &Router, state: &AppState, username: &str) -> (Cookies, user::Model) {
        let registration =
            Registration { username: username.into(), password: "testpassword".into() };
        let crate::accounts::RegisterOutcome::Registered(user) =
            state.accounts.register(registration).await.unwrap()
        else {
            panic!("registration failed");
        };

        let mut cookies = Cookies::default();
        let body = format!("username={username}&password=testpassword");
        let resp = send(app, &mut cookies, post_form("/login", &body)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/movies");
        (cookies, user)
    }

    #[tokio::test]
    async fn anonymous_visitor_is_sent_to_login() {
        let (app, state) = test_app().await;
        let movie = insert_movie(state.catalog.db(), "Heat", "Michael Mann", Genre::Crime, "1995-12-15").await;

        let mut cookies = Cookies::default();
        let uri = format!("/movies/{}", movie.id);
        let resp = send(&app, &mut cookies, get_req(&uri)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), format!("/login?next=%2Fmovies%2F{}", movie.id));

        let resp = send(&app, &mut cookies, get_req("/movies")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Heat"));
    }

    #[tokio::test]
    async fn login_honours_next() {
        let (app, state) = test_app().await;
        let registration = Registration { username: "alice".into(), password: "testpassword".into() };
        state.accounts.register(registration).await.unwrap();

        let mut cookies = Cookies::default();
        let resp = send(
            &app,
            &mut cookies,
            post_form("/login", "username=alice&password=testpassword&next=%2Fmovies%2Fadd"),
        )
        .await;
        assert_eq!(location(&resp), "/movies/add");

        let resp = send(&app, &mut cookies, get_req("/movies/add")).await;
        let body = body_text(resp).await;
        assert!(body.contains("You are logged in as alice."));
    }

    #[tokio::test]
    async fn failed_login_redisplays_with_message() {
        let (app, _state) = test_app().await;
        let mut cookies = Cookies::default();
        let resp = send(&app, &mut cookies, post_form("/login", "username=ghost&password=nope")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!cookies.0.contains_key("movieshelf_session"));
        assert!(body_text(resp).await.contains("An error occurred while trying to login."));
    }

    #[tokio::test]
    async fn register_logs_in_and_redirects_to_profile() {
        let (app, _state) = test_app().await;
        let mut cookies = Cookies::default();
        let resp = send(
            &app,
            &mut cookies,
            post_form("/register", "username=newuser&password1=testpassword&password2=testpassword"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/profile");
        assert!(cookies.0.contains_key("movieshelf_session"));

        let resp = send(&app, &mut cookies, get_req("/profile")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("User newuser registered successfully."));

        let resp = send(
            &app,
            &mut cookies,
            post_form("/register", "username=newuser&password1=testpassword&password2=testpassword"),
        )
        .await;
        let body = body_text(resp).await;
        assert!(body.contains("A user with that username already exists."));
        assert!(body.contains("An error occurred while trying to register."));
    }

    #[tokio::test]
    async fn second_rating_is_rejected() {
        let (app, state) = test_app().await;
        let movie = insert_movie(state.catalog.db(), "Heat", "Michael Mann", Genre::Crime, "1995-12-15").await;
        let (mut cookies, _user) = logged_in(&app, &state, "rater").await;
        let uri = format!("/movies/{}", movie.id);

        let resp = send(&app, &mut cookies, post_form(&uri, "value=7")).await;
        assert_eq!(location(&resp), uri);
        let resp = send(&app, &mut cookies, get_req(&uri)).await;
        let body = body_text(resp).await;
        assert!(body.contains("Rating submitted successfully"));
        assert!(body.contains("7.0"));

        let resp = send(&app, &mut cookies, post_form(&uri, "value=3")).await;
        assert_eq!(location(&resp), uri);
        let resp = send(&app, &mut cookies, get_req(&uri)).await;
        assert!(body_text(resp).await.contains("You have already submitted a rating for this movie."));

        assert_eq!(rating::Entity::find().count(state.catalog.db()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_not_stored() {
        let (app, state) = test_app().await;
        let movie = insert_movie(state.catalog.db(), "Heat", "Michael Mann", Genre::Crime, "1995-12-15").await;
        let (mut cookies, _user) = logged_in(&app, &state, "rater").await;
        let uri = format!("/movies/{}", movie.id);

        let resp = send(&app, &mut cookies, post_form(&uri, "value=11")).await;
        assert_eq!(location(&resp), uri);
        assert_eq!(rating::Entity::find().count(state.catalog.db()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn favorite_toggle_returns_json() {
        let (app, state) = test_app().await;
        let movie = insert_movie(state.catalog.db(), "Heat", "Michael Mann", Genre::Crime, "1995-12-15").await;
        let mut cookies = Cookies::default();
        let uri = format!("/movies/{}/favorite", movie.id);

        let resp = send(&app, &mut cookies, post_form(&uri, "")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "is_favorite": true}));

        let resp = send(&app, &mut cookies, post_form(&uri, "")).await;
        let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(json["is_favorite"], false);

        let resp = send(&app, &mut cookies, post_form("/movies/9999/favorite", "")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cross_site_favorite_toggle_is_refused() {
        let (app, state) = test_app().await;
        let movie = insert_movie(state.catalog.db(), "Heat", "Michael Mann", Genre::Crime, "1995-12-15").await;
        let mut cookies = Cookies::default();
        let uri = format!("/movies/{}/favorite", movie.id);

        let mut req = post_form(&uri, "");
        req.headers_mut().insert(header::HOST, "movieshelf.test".parse().unwrap());
        req.headers_mut().insert(header::ORIGIN, "https://evil.example".parse().unwrap());
        let resp = send(&app, &mut cookies, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(!state.catalog.get(movie.id).await.unwrap().unwrap().is_favorite);

        let mut req = post_form(&uri, "");
        req.headers_mut().insert(header::HOST, "movieshelf.test".parse().unwrap());
        req.headers_mut().insert(header::ORIGIN, "http://movieshelf.test".parse().unwrap());
        let resp = send(&app, &mut cookies, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.catalog.get(movie.id).await.unwrap().unwrap().is_favorite);
    }

    #[tokio::test]
    async fn search_without_matches_says_so() {
        let (app, state) = test_app().await;
        insert_movie(state.catalog.db(), "Heat", "Michael Mann", Genre::Crime, "1995-12-15").await;
        let mut cookies = Cookies::default();

        let resp = send(&app, &mut cookies, get_req("/movies/search?q=zzz")).await;
        assert!(body_text(resp).await.contains("No movies found!"));

        let resp = send(&app, &mut cookies, get_req("/movies/search?q=MANN&genre=crime")).await;
        assert!(body_text(resp).await.contains("Heat"));
    }

    #[tokio::test]
    async fn add_movie_rejects_duplicate_title() {
        let (app, state) = test_app().await;
        let (mut cookies, user) = logged_in(&app, &state, "curator").await;
        let body = "title=Heat&director=Michael+Mann&genre=crime&release_date=1995-12-15&cover_image=heat.jpg";

        let resp = send(&app, &mut cookies, post_form("/movies/add", body)).await;
        assert_eq!(location(&resp), "/movies");
        let stored = state.catalog.list(None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, Some(user.id));
        assert_eq!(stored[0].cover_image, format!("uploads/user_{}/heat.jpg", user.id));

        let resp = send(&app, &mut cookies, post_form("/movies/add", body)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page = body_text(resp).await;
        assert!(page.contains("Movie with this title already exists."));
        assert!(page.contains("Form is not valid. Please check the input."));
    }

    #[tokio::test]
    async fn delete_cascades_and_redirects() {
        let (app, state) = test_app().await;
        let movie = insert_movie(state.catalog.db(), "Heat", "Michael Mann", Genre::Crime, "1995-12-15").await;
        let (mut cookies, user) = logged_in(&app, &state, "curator").await;
        state.catalog.rate(movie.id, user.id, 5).await.unwrap();

        let uri = format!("/movies/{}/delete", movie.id);
        let resp = send(&app, &mut cookies, post_form(&uri, "")).await;
        assert_eq!(location(&resp), "/movies");
        assert!(state.catalog.get(movie.id).await.unwrap().is_none());
        assert_eq!(rating::Entity::find().count(state.catalog.db()).await.unwrap(), 0);

        let resp = send(&app, &mut cookies, get_req(&uri)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn comment_is_attached_to_author() {
        let (app, state) = test_app().await;
        let movie = insert_movie(state.catalog.db(), "Heat", "Michael Mann", Genre::Crime, "1995-12-15").await;
        let (mut cookies, _user) = logged_in(&app, &state, "critic").await;
        let uri = format!("/movies/{}/comment", movie.id);

        let resp = send(&app, &mut cookies, post_form(&uri, "text=")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("This field is required."));

        let resp = send(&app, &mut cookies, post_form(&uri, "text=Great+movie")).await;
        let detail = format!("/movies/{}", movie.id);
        assert_eq!(location(&resp), detail);

        let resp = send(&app, &mut cookies, get_req(&detail)).await;
        let body = body_text(resp).await;
        assert!(body.contains("Comment submitted successfully"));
        assert!(body.contains("Great movie"));
        assert!(body.contains("critic"));
    }

    #[tokio::test]
    async fn profile_update_is_all_or_nothing() {
        let (app, state) = test_app().await;
        let (mut cookies, user) = logged_in(&app, &state, "testuser").await;

        let invalid = "first_name=Ada&email=newemail%40example.com&phone_number=1234567890&address_1=&city=Sofia";
        let resp = send(&app, &mut cookies, post_form("/profile", invalid)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Error updating profile!"));
        let stored = state.accounts.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "");

        let valid = "first_name=Ada&email=newemail%40example.com&phone_number=1234567890&address_1=Street+1&city=Varna";
        let resp = send(&app, &mut cookies, post_form("/profile", valid)).await;
        assert_eq!(location(&resp), "/movies");
        let stored = state.accounts.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "newemail@example.com");

        let resp = send(&app, &mut cookies, get_req("/profile")).await;
        let body = body_text(resp).await;
        assert!(body.contains("Profile updated successfully!"));
        assert!(body.contains("Street 1"));
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let (app, state) = test_app().await;
        let (mut cookies, _user) = logged_in(&app, &state, "leaver").await;

        let resp = send(&app, &mut cookies, get_req("/logout")).await;
        assert_eq!(location(&resp), "/");
        assert!(!cookies.0.contains_key("movieshelf_session"));

        let resp = send(&app, &mut cookies, get_req("/profile")).await;
        assert_eq!(location(&resp), "/login?next=%2Fprofile");
    }
}

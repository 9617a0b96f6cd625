use crate::catalog::Catalog;
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::database::{Registration, UserDb, WatchedDb};
use crate::error::QueryError;
use crate::model::Movie;
use crate::query;
use crate::watched::WatchHistoryStore;
use actix_identity::Identity;
use actix_web::{error, http::header, web, HttpRequest, HttpResponse};
use log::{debug, warn};
use serde::Deserialize;
use std::sync::Mutex;

pub struct AppState {
    pub catalog: Catalog,
    pub users: Mutex<CredentialStore>,
    pub watched: Mutex<WatchHistoryStore>,
}

impl AppState {
    pub fn open(config: &Config) -> AppState {
        let catalog = Catalog::load(&config.movies_file);
        if catalog.is_empty() {
            warn!("No movies available; every search will come back empty");
        }
        AppState {
            catalog,
            users: Mutex::new(CredentialStore::open(
                &config.users_file,
                config.password_storage,
            )),
            watched: Mutex::new(WatchHistoryStore::open(&config.watched_file)),
        }
    }
}

type Tera = web::Data<tera::Tera>;
type State = web::Data<AppState>;

pub fn templates() -> Result<tera::Tera, tera::Error> {
    tera::Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/login", web::get().to(login))
        .route("/login", web::post().to(login_post))
        .route("/register", web::post().to(register_post))
        .route("/logout", web::get().to(logout))
        .route("/movies/genre", web::get().to(genre_search))
        .route("/movies/actor", web::get().to(actor_search))
        .route("/movies/rating", web::get().to(rating_search))
        .route("/movies/top", web::get().to(top_rated))
        .route("/watched", web::get().to(watched_list))
        .route("/watched", web::post().to(watched_post));
}

fn log_error<E: std::fmt::Debug>(err: E, message: &'static str) -> error::Error {
    debug!("{:?}", err);
    error::ErrorInternalServerError(message)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn not_logged_in() -> error::Error {
    error::InternalError::from_response("Not logged in", redirect("/login")).into()
}

/// The logged-in username. Identities naming no registered user are
/// forgotten and sent back to the login page.
fn require_login(id: &Identity, state: &AppState) -> actix_web::Result<String> {
    let username = id.identity().ok_or_else(not_logged_in)?;
    let known = state
        .users
        .lock()
        .map_err(|err| log_error(err, "Store unavailable"))?
        .contains(&username);
    if !known {
        debug!("Unknown user in identity cookie: {}", username);
        id.forget();
        return Err(not_logged_in());
    }
    Ok(username)
}

/// Where to go after recording a movie from a search page. Only the search
/// routes are accepted.
fn search_redirect(next: Option<&str>) -> Option<&str> {
    let next = next?;
    let allowed = ["/movies/genre", "/movies/actor", "/movies/rating", "/movies/top"]
        .iter()
        .any(|route| next == *route || next.starts_with(&format!("{}?", route)));
    if allowed && !next.contains('\\') && !next.contains("//") {
        Some(next)
    } else {
        None
    }
}

fn render(
    tera: &tera::Tera,
    template: &str,
    ctx: &tera::Context,
) -> actix_web::Result<HttpResponse> {
    let body = tera
        .render(template, ctx)
        .map_err(|err| log_error(err, "Template error"))?;
    Ok(HttpResponse::Ok().content_type("text/html").body(body))
}

#[derive(Deserialize)]
struct Notice {
    notice: Option<String>,
}

impl Notice {
    fn message(&self) -> Option<&'static str> {
        Some(match self.notice.as_deref()? {
            "wrong_password" => "Invalid credentials! Try again.",
            "registered" => "User registered successfully! You can now log in.",
            "exists" => "Username already exists. Please try another.",
            "empty" => "Username and password cannot be empty!",
            "logout" => "You have been logged out.",
            "recorded" => "Movie recorded successfully!",
            "empty_title" => "Movie title cannot be empty!",
            _ => return None,
        })
    }
}

async fn index(
    id: Identity,
    tera: Tera,
    state: State,
    notice: web::Query<Notice>,
) -> actix_web::Result<HttpResponse> {
    let username = require_login(&id, &state)?;
    let mut ctx = tera::Context::new();
    ctx.insert("username", &username);
    ctx.insert("message", &notice.message());
    render(&tera, "index.html", &ctx)
}

async fn login(tera: Tera, notice: web::Query<Notice>) -> actix_web::Result<HttpResponse> {
    let mut ctx = tera::Context::new();
    ctx.insert("message", &notice.message());
    render(&tera, "login.html", &ctx)
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login_post(
    params: web::Form<Credentials>,
    id: Identity,
    state: State,
) -> actix_web::Result<HttpResponse> {
    let authenticated = state
        .users
        .lock()
        .map_err(|err| log_error(err, "Store unavailable"))?
        .authenticate(&params.username, &params.password);
    if authenticated {
        id.remember(params.username.clone());
        return Ok(redirect("/"));
    }
    Ok(redirect("/login?notice=wrong_password"))
}

async fn register_post(
    params: web::Form<Credentials>,
    state: State,
) -> actix_web::Result<HttpResponse> {
    if params.username.trim().is_empty() || params.password.is_empty() {
        return Ok(redirect("/login?notice=empty"));
    }
    let storage = {
        let users = state
            .users
            .lock()
            .map_err(|err| log_error(err, "Store unavailable"))?;
        if users.contains(&params.username) {
            return Ok(redirect("/login?notice=exists"));
        }
        users.storage()
    };
    let password = params.password.clone();
    let encoded = web::block(move || storage.encode(&password))
        .await
        .map_err(|err| log_error(err, "Could not hash password"))?
        .map_err(|err| log_error(err, "Could not hash password"))?;
    let registration = state
        .users
        .lock()
        .map_err(|err| log_error(err, "Store unavailable"))?
        .insert_encoded(&params.username, encoded)
        .map_err(|err| log_error(err, "Could not save user"))?;
    Ok(match registration {
        Registration::Created => redirect("/login?notice=registered"),
        Registration::AlreadyExists => redirect("/login?notice=exists"),
    })
}

async fn logout(id: Identity) -> HttpResponse {
    id.forget();
    redirect("/login?notice=logout")
}

/// Context for `movies.html`: either the matching movies or the reason
/// there are none.
fn results_context(
    heading: &str,
    result: Result<Vec<&Movie>, QueryError>,
    req: &HttpRequest,
) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("heading", heading);
    ctx.insert("current_url", &req.uri().to_string());
    match result {
        Ok(movies) if movies.is_empty() => {
            ctx.insert("message", "No movies found matching your criteria.");
        }
        Ok(movies) => ctx.insert("movies", &movies),
        Err(err) => ctx.insert("message", &err.to_string()),
    }
    ctx
}

#[derive(Deserialize)]
struct GenreQuery {
    #[serde(default)]
    genre: String,
}

async fn genre_search(
    req: HttpRequest,
    id: Identity,
    tera: Tera,
    state: State,
    params: web::Query<GenreQuery>,
) -> actix_web::Result<HttpResponse> {
    let username = require_login(&id, &state)?;
    let watched = state
        .watched
        .lock()
        .map_err(|err| log_error(err, "Store unavailable"))?
        .get_watched(&username)
        .to_vec();
    let result = query::by_genre(state.catalog.movies(), &params.genre, &watched);
    let mut ctx = results_context("Movies by Genre", result, &req);
    ctx.insert("watch_buttons", &true);
    render(&tera, "movies.html", &ctx)
}

#[derive(Deserialize)]
struct ActorQuery {
    #[serde(default)]
    actor: String,
}

async fn actor_search(
    req: HttpRequest,
    id: Identity,
    tera: Tera,
    state: State,
    params: web::Query<ActorQuery>,
) -> actix_web::Result<HttpResponse> {
    require_login(&id, &state)?;
    let result = query::by_actor(state.catalog.movies(), &params.actor);
    render(&tera, "movies.html", &results_context("Movies by Actor", result, &req))
}

#[derive(Deserialize)]
struct RatingQuery {
    #[serde(default)]
    min: String,
}

async fn rating_search(
    req: HttpRequest,
    id: Identity,
    tera: Tera,
    state: State,
    params: web::Query<RatingQuery>,
) -> actix_web::Result<HttpResponse> {
    require_login(&id, &state)?;
    let result = query::by_min_rating(state.catalog.movies(), &params.min);
    render(&tera, "movies.html", &results_context("Movies by Rating", result, &req))
}

async fn top_rated(
    req: HttpRequest,
    id: Identity,
    tera: Tera,
    state: State,
) -> actix_web::Result<HttpResponse> {
    require_login(&id, &state)?;
    let movies = query::top_rated(state.catalog.movies(), query::TOP_RATED_LIMIT);
    render(
        &tera,
        "movies.html",
        &results_context("Top-Rated Movies", Ok(movies), &req),
    )
}

async fn watched_list(id: Identity, tera: Tera, state: State) -> actix_web::Result<HttpResponse> {
    let username = require_login(&id, &state)?;
    let watched = state
        .watched
        .lock()
        .map_err(|err| log_error(err, "Store unavailable"))?
        .get_watched(&username)
        .to_vec();
    let mut ctx = tera::Context::new();
    ctx.insert("watched", &watched);
    render(&tera, "watched.html", &ctx)
}

#[derive(Deserialize)]
struct WatchedForm {
    title: String,
    next: Option<String>,
}

async fn watched_post(
    form: web::Form<WatchedForm>,
    id: Identity,
    state: State,
) -> actix_web::Result<HttpResponse> {
    let username = require_login(&id, &state)?;
    let title = form.title.trim();
    if title.is_empty() {
        return Ok(redirect("/?notice=empty_title"));
    }
    if state.catalog.find(title).is_none() {
        debug!("{:?} is not in the catalog", title);
    }
    state
        .watched
        .lock()
        .map_err(|err| log_error(err, "Store unavailable"))?
        .record_watched(&username, title)
        .map_err(|err| log_error(err, "Could not save watched movies"))?;
    let location = search_redirect(form.next.as_deref()).unwrap_or("/?notice=recorded");
    Ok(redirect(location))
}

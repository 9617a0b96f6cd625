use crate::model::Movie;
use log::{debug, error, info, warn};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::mem;
use std::path::Path;

const TITLE_TAG: &str = "Title:";
const GENRE_TAG: &str = "Genre:";
const RATING_TAG: &str = "Rating:";
const ACTORS_TAG: &str = "Main Actors:";
const ACTOR_SEPARATOR: &str = ", ";

/// The read-only movie catalog, loaded once from the tagged text format:
///
/// ```text
/// Title: Inception
/// Genre: Sci-Fi
/// Rating: 8.8
/// Main Actors: Leonardo DiCaprio, Joseph Gordon-Levitt
/// ```
///
/// `Main Actors:` terminates a record.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    /// Loads the catalog at `path`. A missing or unreadable file yields an
    /// empty (or partial) catalog and a logged diagnostic, never an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Catalog {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("Movies file not found: {}", path.display());
                return Catalog::default();
            }
            Err(err) => {
                error!("Error loading movie database {}: {}", path.display(), err);
                return Catalog::default();
            }
        };
        let mut parser = Parser::default();
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    error!("Error loading movie database {}: {}", path.display(), err);
                    break;
                }
            };
            let line = String::from_utf8_lossy(&line);
            if let Cow::Owned(_) = line {
                warn!("Invalid UTF-8 on line {} of {}", index + 1, path.display());
            }
            parser.feed(index + 1, line.trim_end_matches('\r'));
        }
        let catalog = parser.finish();
        for movie in catalog.movies() {
            debug!("{}", movie);
        }
        info!("Loaded {} movies from {}", catalog.len(), path.display());
        catalog
    }

    pub fn parse(text: &str) -> Catalog {
        let mut parser = Parser::default();
        for (index, line) in text.lines().enumerate() {
            parser.feed(index + 1, line);
        }
        parser.finish()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn find(&self, title: &str) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.title == title)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[derive(Default)]
struct PendingMovie {
    title: String,
    genre: String,
    rating: f64,
    // line of the last unparsable `Rating:`
    bad_rating: Option<usize>,
}

#[derive(Default)]
struct Parser {
    pending: PendingMovie,
    movies: Vec<Movie>,
}

impl Parser {
    fn feed(&mut self, line_no: usize, line: &str) {
        if let Some(value) = line.strip_prefix(TITLE_TAG) {
            self.pending.title = value.trim().to_owned();
        } else if let Some(value) = line.strip_prefix(GENRE_TAG) {
            self.pending.genre = value.trim().to_owned();
        } else if let Some(value) = line.strip_prefix(RATING_TAG) {
            match value.trim().parse::<f64>() {
                Ok(rating) => {
                    self.pending.rating = rating;
                    self.pending.bad_rating = None;
                }
                Err(_) => self.pending.bad_rating = Some(line_no),
            }
        } else if let Some(value) = line.strip_prefix(ACTORS_TAG) {
            let pending = mem::take(&mut self.pending);
            self.finalize(line_no, pending, value.trim());
        }
    }

    fn finalize(&mut self, line_no: usize, pending: PendingMovie, actors: &str) {
        if let Some(rating_line) = pending.bad_rating {
            warn!(
                "Skipping movie {:?}: invalid rating on line {}",
                pending.title, rating_line
            );
            return;
        }
        let actors: Vec<String> = actors
            .split(ACTOR_SEPARATOR)
            .filter(|actor| !actor.is_empty())
            .map(str::to_owned)
            .collect();
        if pending.title.is_empty() || pending.genre.is_empty() || actors.is_empty() {
            warn!("Skipping incomplete movie record ending on line {}", line_no);
            return;
        }
        self.movies.push(Movie {
            title: pending.title,
            genre: pending.genre,
            rating: pending.rating,
            actors,
        });
    }

    fn finish(self) -> Catalog {
        Catalog {
            movies: self.movies,
        }
    }
}

use crate::error::QueryError;
use crate::model::Movie;

pub const TOP_RATED_LIMIT: usize = 5;

fn required<'a>(input: &'a str, field: &'static str) -> Result<&'a str, QueryError> {
    let input = input.trim();
    if input.is_empty() {
        Err(QueryError::EmptyField(field))
    } else {
        Ok(input)
    }
}

/// Movies of `genre` (case-insensitive) that are not in `watched`.
pub fn by_genre<'a>(
    movies: &'a [Movie],
    genre: &str,
    watched: &[String],
) -> Result<Vec<&'a Movie>, QueryError> {
    let genre = required(genre, "Genre")?.to_lowercase();
    Ok(movies
        .iter()
        .filter(|movie| movie.genre.to_lowercase() == genre)
        .filter(|movie| !watched.contains(&movie.title))
        .collect())
}

pub fn by_actor<'a>(movies: &'a [Movie], actor: &str) -> Result<Vec<&'a Movie>, QueryError> {
    let actor = required(actor, "Actor")?;
    Ok(movies.iter().filter(|movie| movie.has_actor(actor)).collect())
}

pub fn parse_rating(input: &str) -> Result<f64, QueryError> {
    input
        .trim()
        .parse()
        .map_err(|_| QueryError::InvalidRating(input.to_owned()))
}

/// Movies rated at least `min_rating`, parsed from user input.
pub fn by_min_rating<'a>(
    movies: &'a [Movie],
    min_rating: &str,
) -> Result<Vec<&'a Movie>, QueryError> {
    let min_rating = parse_rating(min_rating)?;
    Ok(movies
        .iter()
        .filter(|movie| movie.rating >= min_rating)
        .collect())
}

/// The `limit` best rated movies, best first. Ties keep catalog order.
pub fn top_rated(movies: &[Movie], limit: usize) -> Vec<&Movie> {
    let mut sorted: Vec<&Movie> = movies.iter().collect();
    sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, genre: &str, rating: f64, actors: &[&str]) -> Movie {
        Movie {
            title: title.to_owned(),
            genre: genre.to_owned(),
            rating,
            actors: actors.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn catalog() -> Vec<Movie> {
        vec![
            movie("Inception", "Sci-Fi", 8.8, &["Leonardo DiCaprio"]),
            movie("Up", "Animation", 8.3, &["Ed Asner"]),
        ]
    }

    fn titles(movies: &[&Movie]) -> Vec<String> {
        movies.iter().map(|m| m.title.clone()).collect()
    }

    #[test]
    fn genre_is_case_insensitive() {
        let movies = catalog();
        for genre in &["sci-fi", "SCI-FI", "Sci-Fi", " sci-fi "] {
            let found = by_genre(&movies, genre, &[]).unwrap();
            assert_eq!(found, vec![&movies[0]]);
        }
        assert!(by_genre(&movies, "Sci", &[]).unwrap().is_empty());
    }

    #[test]
    fn genre_excludes_watched() {
        let mut movies = catalog();
        movies.push(movie("Interstellar", "Sci-Fi", 8.6, &["Matthew McConaughey"]));
        let watched = vec!["Inception".to_owned()];
        let found = by_genre(&movies, "sci-fi", &watched).unwrap();
        assert_eq!(titles(&found), vec!["Interstellar"]);
    }

    #[test]
    fn empty_query_is_rejected() {
        let movies = catalog();
        assert_eq!(
            by_genre(&movies, "  ", &[]),
            Err(QueryError::EmptyField("Genre"))
        );
        assert_eq!(by_actor(&movies, ""), Err(QueryError::EmptyField("Actor")));
    }

    #[test]
    fn actor_is_exact() {
        let movies = catalog();
        assert_eq!(titles(&by_actor(&movies, "Ed Asner").unwrap()), vec!["Up"]);
        assert!(by_actor(&movies, "ed asner").unwrap().is_empty());
        assert!(by_actor(&movies, "Ed").unwrap().is_empty());
    }

    #[test]
    fn min_rating_is_inclusive() {
        let movies = catalog();
        assert_eq!(titles(&by_min_rating(&movies, "8.3").unwrap()).len(), 2);
        assert_eq!(
            titles(&by_min_rating(&movies, "8.5").unwrap()),
            vec!["Inception"]
        );
        assert!(by_min_rating(&movies, "9").unwrap().is_empty());
        assert_eq!(
            by_min_rating(&movies, "high"),
            Err(QueryError::InvalidRating("high".to_owned()))
        );
    }

    #[test]
    fn top_rated_limit_and_order() {
        let movies: Vec<Movie> = [7.0, 9.0, 8.0, 9.0, 6.0, 8.5, 5.0]
            .iter()
            .enumerate()
            .map(|(i, r)| movie(&format!("M{}", i), "Drama", *r, &["A"]))
            .collect();
        let top = top_rated(&movies, TOP_RATED_LIMIT);
        assert_eq!(titles(&top), vec!["M1", "M3", "M5", "M2", "M0"]);
        assert!(top.windows(2).all(|w| w[0].rating >= w[1].rating));
        assert_eq!(top_rated(&movies[..2], TOP_RATED_LIMIT).len(), 2);
    }
}

use serde::Serialize;
use std::fmt;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Movie {
    pub title: String,
    pub genre: String,
    pub rating: f64,
    pub actors: Vec<String>,
}

impl Movie {
    pub fn has_actor(&self, actor: &str) -> bool {
        self.actors.iter().any(|a| a == actor)
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<30} | {:<10} | {:<4.1} | {}",
            self.title,
            self.genre,
            self.rating,
            self.actors.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_row() {
        let movie = Movie {
            title: "Up".to_owned(),
            genre: "Animation".to_owned(),
            rating: 8.3,
            actors: vec!["Ed Asner".to_owned(), "Jordan Nagai".to_owned()],
        };
        assert_eq!(
            movie.to_string(),
            "Up                             | Animation  | 8.3  | Ed Asner, Jordan Nagai"
        );
        assert!(movie.has_actor("Ed Asner"));
        assert!(!movie.has_actor("ed asner"));
    }
}

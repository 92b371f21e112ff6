//! Parser for the catalog data files.
//!
//! All three files are `::`-separated, one record per line:
//! - users.dat: userId::username::includeLocal
//! - movies.dat: movieId::title::year::runtime::genres::externalRating::localRating::isLocal::isFeatured
//! - ratings.dat: userId::movieId::rating::timestamp
//!
//! Optional numeric fields (year, runtime, critic ratings, rating value) may be
//! left empty. Genres are pipe-separated display names ("Action|Sci-Fi").
//! Flags are `0`/`1` (or `true`/`false`).

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::path::Path;
use std::str::FromStr;

/// Read a data file into trimmed, non-empty lines paired with 1-based line numbers.
fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    Ok(content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect())
}

/// Splits one record and reports which field is missing or malformed.
struct Fields<'a> {
    file: &'static str,
    line: usize,
    parts: std::str::Split<'a, &'static str>,
}

impl<'a> Fields<'a> {
    fn new(file: &'static str, line: usize, raw: &'a str) -> Self {
        Self {
            file,
            line,
            parts: raw.split("::"),
        }
    }

    fn error(&self, reason: String) -> DataLoadError {
        DataLoadError::ParseError {
            file: self.file.to_string(),
            line: self.line,
            reason,
        }
    }

    fn next_raw(&mut self, name: &str) -> Result<&'a str> {
        match self.parts.next() {
            Some(value) => Ok(value.trim()),
            None => Err(self.error(format!("Missing {}", name))),
        }
    }

    fn required<T>(&mut self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.next_raw(name)?;
        raw.parse()
            .map_err(|e| self.error(format!("Invalid {}: {}", name, e)))
    }

    fn optional<T>(&mut self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.next_raw(name)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|e| self.error(format!("Invalid {}: {}", name, e)))
    }

    fn flag(&mut self, name: &str) -> Result<bool> {
        let raw = self.next_raw(name)?;
        parse_flag(raw).ok_or_else(|| self.error(format!("Invalid {}: {}", name, raw)))
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Parse pipe-separated genres
///
/// Example: "Action|Adventure|Sci-Fi" -> vec![Genre::Action, Genre::Adventure, Genre::SciFi]
fn parse_genres(s: &str) -> Result<Vec<Genre>> {
    let mut genres = Vec::new();
    for name in s.split('|').map(str::trim).filter(|n| !n.is_empty()) {
        let genre = Genre::from_name(name).ok_or_else(|| DataLoadError::InvalidValue {
            field: "genre".to_string(),
            value: name.to_string(),
        })?;
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    Ok(genres)
}

pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    let mut users = Vec::new();
    for (line_no, line) in read_lines(path)? {
        let mut fields = Fields::new("users.dat", line_no, &line);
        users.push(User {
            id: fields.required("userId")?,
            username: fields.next_raw("username")?.to_string(),
            include_local_movies: fields.flag("includeLocal")?,
        });
    }
    Ok(users)
}

pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let mut movies = Vec::new();
    for (line_no, line) in read_lines(path)? {
        let mut fields = Fields::new("movies.dat", line_no, &line);
        let id = fields.required("movieId")?;
        let title = fields.next_raw("title")?.to_string();
        let year = fields.optional("year")?;
        let runtime = fields.optional("runtime")?;
        let genres = parse_genres(fields.next_raw("genres")?)?;
        let external_rating = fields.optional("externalRating")?;
        let local_rating = fields.optional("localRating")?;
        let is_local = fields.flag("isLocal")?;
        let is_featured = fields.flag("isFeatured")?;

        movies.push(Movie {
            id,
            title,
            year,
            runtime,
            genres,
            external_rating,
            local_rating,
            is_local,
            is_featured,
        });
    }
    Ok(movies)
}

pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let mut ratings = Vec::new();
    for (line_no, line) in read_lines(path)? {
        let mut fields = Fields::new("ratings.dat", line_no, &line);
        ratings.push(Rating {
            user_id: fields.required("userId")?,
            movie_id: fields.required("movieId")?,
            rating: fields.optional("rating")?,
            timestamp: fields.required("timestamp")?,
        });
    }
    Ok(ratings)
}

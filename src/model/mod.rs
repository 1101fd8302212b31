//! Core data models for the music ledger.
//!
//! Defines the primary entities: [`User`], [`Rating`], [`Track`] and
//! [`AlbumIdentity`]. A [`Track`] is the fully-shaped form of one sheet
//! row, produced once at load by [`crate::sheet::normalize`].
//!
//! # Sheet schema
//!
//! Rows map to the fixed column set in [`COLUMNS`]:
//! - `trackNumber`, `title`, `artists`, `album`, `year`, `composers`
//! - one `rating_<user>` column per [`User`]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec;

/// Lowest accepted release year.
pub const MIN_YEAR: i32 = 1900;
/// Highest accepted release year.
pub const MAX_YEAR: i32 = 2100;

pub const COL_TRACK_NUMBER: &str = "trackNumber";
pub const COL_TITLE: &str = "title";
pub const COL_ARTISTS: &str = "artists";
pub const COL_ALBUM: &str = "album";
pub const COL_YEAR: &str = "year";
pub const COL_COMPOSERS: &str = "composers";

/// Canonical column order used for every write-back.
pub const COLUMNS: [&str; 9] = [
    COL_TRACK_NUMBER,
    COL_TITLE,
    COL_ARTISTS,
    COL_ALBUM,
    COL_YEAR,
    COL_COMPOSERS,
    "rating_jom",
    "rating_jov",
    "rating_job",
];

/// One of the three fixed ledger users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum User {
    Jom,
    Jov,
    Job,
}

impl User {
    /// Every user, in column order.
    pub const ALL: [User; 3] = [User::Jom, User::Jov, User::Job];

    pub fn as_str(&self) -> &'static str {
        match self {
            User::Jom => "jom",
            User::Jov => "jov",
            User::Job => "job",
        }
    }

    /// Name of this user's rating column.
    pub fn rating_column(&self) -> &'static str {
        match self {
            User::Jom => "rating_jom",
            User::Jov => "rating_jov",
            User::Job => "rating_job",
        }
    }

    fn index(&self) -> usize {
        match self {
            User::Jom => 0,
            User::Jov => 1,
            User::Job => 2,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a name is not one of the fixed users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user '{0}' (expected one of: jom, jov, job)")]
pub struct UnknownUser(pub String);

impl FromStr for User {
    type Err = UnknownUser;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jom" => Ok(User::Jom),
            "jov" => Ok(User::Jov),
            "job" => Ok(User::Job),
            other => Err(UnknownUser(other.to_string())),
        }
    }
}

/// A score in `[0.0, 10.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 10.0;

    /// Returns `None` for non-finite or out-of-range scores.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (Self::MIN..=Self::MAX).contains(&value)).then_some(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or_else(|| format!("rating {value} outside 0-10"))
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Per-user ratings of one track. A missing entry means "not rated".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratings([Option<Rating>; 3]);

impl Ratings {
    /// All users unrated.
    pub fn unrated() -> Self {
        Self::default()
    }

    pub fn get(&self, user: User) -> Option<Rating> {
        self.0[user.index()]
    }

    pub fn set(&mut self, user: User, rating: Option<Rating>) {
        self.0[user.index()] = rating;
    }
}

/// A track (one sheet row) in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Position on the album (missing when the cell was unparsable)
    pub track_number: Option<u32>,
    /// Track title
    pub title: String,
    /// Credited artists, in order
    pub artists: Vec<String>,
    /// Album title
    pub album: String,
    /// Release year (missing when the cell was unparsable)
    pub year: Option<i32>,
    /// Composers, in order (may be empty)
    pub composers: Vec<String>,
    /// One optional score per user
    pub ratings: Ratings,
}

impl Track {
    /// The artist list as it is stored in the sheet.
    pub fn artists_cell(&self) -> String {
        codec::encode(&self.artists)
    }

    /// The composer list as it is stored in the sheet.
    pub fn composers_cell(&self) -> String {
        codec::encode(&self.composers)
    }

    pub fn rating(&self, user: User) -> Option<Rating> {
        self.ratings.get(user)
    }

    /// The `(album, artists)` pair used to target album edits.
    pub fn identity(&self) -> AlbumIdentity {
        AlbumIdentity {
            album: self.album.clone(),
            artists: self.artists.clone(),
        }
    }
}

/// Album title plus artist list; the key an album edit is addressed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumIdentity {
    pub album: String,
    pub artists: Vec<String>,
}

impl AlbumIdentity {
    pub fn new(album: impl Into<String>, artists: Vec<String>) -> Self {
        Self {
            album: album.into(),
            artists,
        }
    }

    /// Compares decoded artist lists, so cell whitespace does not matter.
    pub fn matches(&self, track: &Track) -> bool {
        track.album == self.album && track.artists == self.artists
    }
}

impl fmt::Display for AlbumIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.album, codec::encode(&self.artists))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_parse_accepts_only_fixed_names() {
        assert_eq!("jom".parse::<User>().unwrap(), User::Jom);
        assert_eq!("job".parse::<User>().unwrap(), User::Job);
        assert!("JOM".parse::<User>().is_err());
        assert!("".parse::<User>().is_err());
    }

    #[test]
    fn test_rating_columns_match_schema() {
        for user in User::ALL {
            assert!(COLUMNS.contains(&user.rating_column()));
        }
    }

    #[test]
    fn test_rating_range() {
        assert!(Rating::new(0.0).is_some());
        assert!(Rating::new(10.0).is_some());
        assert!(Rating::new(10.5).is_none());
        assert!(Rating::new(-0.1).is_none());
        assert!(Rating::new(f64::NAN).is_none());
    }

    #[test]
    fn test_ratings_are_per_user() {
        let mut ratings = Ratings::unrated();
        ratings.set(User::Jov, Rating::new(9.0));
        assert_eq!(ratings.get(User::Jov).map(|r| r.value()), Some(9.0));
        assert!(ratings.get(User::Jom).is_none());
        assert!(ratings.get(User::Job).is_none());
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("7.5").is_ok());
        assert!(serde_json::from_str::<Rating>("11").is_err());
    }
}

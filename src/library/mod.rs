//! The in-memory track table and its mutations.
//!
//! Every mutation validates its whole input first and only then touches the
//! table, so a rejected call leaves [`Library`] exactly as it was. Writing
//! the result back to the sheet store is the session's job
//! ([`crate::session::Session::commit`]).

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result, ValidationError};
use crate::filter;
use crate::model::{AlbumIdentity, MAX_YEAR, MIN_YEAR, Rating, Ratings, Track, User};
use crate::sheet::{self, RawTable};

/// One track of an album being added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackDraft {
    pub title: String,
    #[serde(default)]
    pub composers: Vec<String>,
}

impl TrackDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            composers: Vec::new(),
        }
    }
}

/// A whole album to add.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAlbum {
    pub title: String,
    pub year: i32,
    pub artists: Vec<String>,
    /// Free-text artist appended when not already listed
    #[serde(default)]
    pub extra_artist: Option<String>,
    pub tracks: Vec<TrackDraft>,
}

/// A single track to add to a new or existing album.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTrack {
    pub artists: Vec<String>,
    pub album: String,
    /// Required for a new album; ignored when the album already exists
    pub year: Option<i32>,
    pub title: String,
    pub track_number: u32,
    #[serde(default)]
    pub composers: Vec<String>,
}

/// The acting user's choice for one track in an album edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum RatingInput {
    /// Explicit "no rating"
    #[default]
    Unrated,
    Score(f64),
}

impl RatingInput {
    fn resolve(self) -> std::result::Result<Option<Rating>, ValidationError> {
        match self {
            RatingInput::Unrated => Ok(None),
            RatingInput::Score(value) => Rating::new(value)
                .map(Some)
                .ok_or(ValidationError::RatingOutOfRange(value)),
        }
    }
}

impl From<Option<f64>> for RatingInput {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RatingInput::Unrated, RatingInput::Score)
    }
}

impl From<RatingInput> for Option<f64> {
    fn from(input: RatingInput) -> Self {
        match input {
            RatingInput::Unrated => None,
            RatingInput::Score(value) => Some(value),
        }
    }
}

/// One submitted track of an album edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEdit {
    /// Missing when the stored cell was unreadable; must be set to save
    #[serde(default)]
    pub track_number: Option<u32>,
    pub title: String,
    #[serde(default)]
    pub composers: Vec<String>,
    #[serde(default)]
    pub rating: RatingInput,
}

/// Replacement metadata and tracks for an existing album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumEdit {
    pub title: String,
    pub artists: Vec<String>,
    /// Missing when no row of the album has a readable year; must be set to save
    #[serde(default)]
    pub year: Option<i32>,
    pub tracks: Vec<TrackEdit>,
}

/// The loaded track table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Library {
    tracks: Vec<Track>,
}

impl Library {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Normalize a raw worksheet into a library.
    pub fn from_raw(raw: &RawTable) -> Self {
        Self::new(sheet::normalize(raw))
    }

    /// The canonical grid to hand to the store.
    pub fn to_raw(&self) -> RawTable {
        sheet::to_raw(&self.tracks)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Rows of one album ordered by track number; unnumbered rows last.
    pub fn album_tracks(&self, identity: &AlbumIdentity) -> Vec<&Track> {
        let mut rows: Vec<&Track> = self.tracks.iter().filter(|t| identity.matches(t)).collect();
        rows.sort_by_key(|t| (t.track_number.is_none(), t.track_number));
        rows
    }

    /// Year of an existing album by any of `artists`, if one is recorded.
    ///
    /// Same-titled albums by different artists in `artists` are not told
    /// apart: the first matching row with a year wins.
    pub fn existing_year(&self, album: &str, artists: &[String]) -> Option<i32> {
        filter::filter_by_artists(&self.tracks, artists)
            .iter()
            .filter(|t| t.album == album)
            .find_map(|t| t.year)
    }

    /// Add every titled draft as a new album. Returns the rows added.
    pub fn insert_album(&mut self, album: NewAlbum) -> Result<usize> {
        let mut artists = clean_names(album.artists);
        if let Some(extra) = album.extra_artist.map(|a| a.trim().to_string())
            && !extra.is_empty()
            && !artists.contains(&extra)
        {
            artists.push(extra);
        }
        if artists.is_empty() {
            return Err(ValidationError::NoArtists.into());
        }
        let title = required(&album.title, ValidationError::EmptyAlbumTitle)?;
        check_year(album.year)?;
        if album.tracks.is_empty() {
            return Err(ValidationError::NoTracks.into());
        }

        let rows: Vec<Track> = album
            .tracks
            .into_iter()
            .enumerate()
            .filter(|(_, draft)| !draft.title.trim().is_empty())
            .map(|(i, draft)| Track {
                track_number: Some(i as u32 + 1),
                title: draft.title.trim().to_string(),
                artists: artists.clone(),
                album: title.clone(),
                year: Some(album.year),
                composers: clean_names(draft.composers),
                ratings: Ratings::unrated(),
            })
            .collect();
        if rows.is_empty() {
            return Err(ValidationError::NoTitledTracks.into());
        }

        let added = rows.len();
        self.tracks.extend(rows);
        info!(album = %title, year = album.year, tracks = added, "Inserted album");
        Ok(added)
    }

    /// Add one track. Returns the year the track was stored with.
    pub fn insert_track(&mut self, track: NewTrack) -> Result<i32> {
        let artists = clean_names(track.artists);
        if artists.is_empty() {
            return Err(ValidationError::NoArtists.into());
        }
        let album = required(&track.album, ValidationError::EmptyAlbumTitle)?;
        let title = required(&track.title, ValidationError::EmptyTrackTitle)?;
        if track.track_number < 1 {
            return Err(ValidationError::InvalidTrackNumber.into());
        }

        let year = match self.existing_year(&album, &artists) {
            Some(existing) => {
                if let Some(submitted) = track.year
                    && submitted != existing
                {
                    warn!(
                        album = %album,
                        submitted,
                        existing,
                        "Ignoring year for existing album"
                    );
                }
                existing
            }
            None => {
                let year = track.year.ok_or(ValidationError::MissingYear)?;
                check_year(year)?;
                year
            }
        };

        self.tracks.push(Track {
            track_number: Some(track.track_number),
            title: title.clone(),
            artists,
            album: album.clone(),
            year: Some(year),
            composers: clean_names(track.composers),
            ratings: Ratings::unrated(),
        });
        info!(album = %album, title = %title, year, "Inserted track");
        Ok(year)
    }

    /// Current state of an album as an edit the acting user can change.
    ///
    /// Unreadable year or track numbers stay empty in the template, so
    /// saving it unchanged is rejected rather than inventing a value.
    pub fn edit_template(&self, identity: &AlbumIdentity, acting: User) -> Result<AlbumEdit> {
        let rows = self.album_tracks(identity);
        let first = rows
            .first()
            .ok_or_else(|| Error::AlbumNotFound(identity.clone()))?;

        Ok(AlbumEdit {
            title: first.album.clone(),
            artists: first.artists.clone(),
            year: rows.iter().find_map(|t| t.year),
            tracks: rows
                .iter()
                .map(|t| TrackEdit {
                    track_number: t.track_number,
                    title: t.title.clone(),
                    composers: t.composers.clone(),
                    rating: RatingInput::from(t.rating(acting).map(|r| r.value())),
                })
                .collect(),
        })
    }

    /// Delete every row of `identity` and insert the edited tracks.
    ///
    /// Old rows, ordered by track number, pair with submitted tracks by
    /// position. Other users' ratings carry over from the paired row (none
    /// when the edit has more tracks than before); the acting user's rating
    /// comes from the edit. Returns the rows inserted.
    pub fn replace_album(
        &mut self,
        identity: &AlbumIdentity,
        edit: AlbumEdit,
        acting: User,
    ) -> Result<usize> {
        let previous: Vec<Ratings> = self
            .album_tracks(identity)
            .iter()
            .map(|t| t.ratings)
            .collect();
        if previous.is_empty() {
            return Err(Error::AlbumNotFound(identity.clone()));
        }

        let artists = clean_names(edit.artists);
        if artists.is_empty() {
            return Err(ValidationError::NoArtists.into());
        }
        let title = required(&edit.title, ValidationError::EmptyAlbumTitle)?;
        let year = edit.year.ok_or(ValidationError::MissingYear)?;
        check_year(year)?;
        if edit.tracks.is_empty() {
            return Err(ValidationError::NoTracks.into());
        }

        let mut rows = Vec::with_capacity(edit.tracks.len());
        for (i, track) in edit.tracks.into_iter().enumerate() {
            let track_title = required(&track.title, ValidationError::EmptyTrackTitle)?;
            let track_number = match track.track_number {
                None => return Err(ValidationError::MissingTrackNumber.into()),
                Some(0) => return Err(ValidationError::InvalidTrackNumber.into()),
                Some(n) => n,
            };
            let mut ratings = previous.get(i).copied().unwrap_or_default();
            ratings.set(acting, track.rating.resolve()?);

            rows.push(Track {
                track_number: Some(track_number),
                title: track_title,
                artists: artists.clone(),
                album: title.clone(),
                year: Some(year),
                composers: clean_names(track.composers),
                ratings,
            });
        }

        let removed = previous.len();
        let inserted = rows.len();
        self.tracks.retain(|t| !identity.matches(t));
        self.tracks.extend(rows);
        info!(
            album = %identity,
            user = %acting,
            removed,
            inserted,
            "Replaced album"
        );
        Ok(inserted)
    }
}

/// Trim names and drop blanks.
fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

fn required(value: &str, err: ValidationError) -> std::result::Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(err);
    }
    Ok(value.to_string())
}

fn check_year(year: i32) -> std::result::Result<(), ValidationError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::YearOutOfRange(year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{album_tracks, rate};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn new_album() -> NewAlbum {
        NewAlbum {
            title: "X".to_string(),
            year: 2000,
            artists: strings(&["A"]),
            extra_artist: None,
            tracks: vec![TrackDraft::new("T1"), TrackDraft::new("T2")],
        }
    }

    fn validation(err: Error) -> ValidationError {
        match err {
            Error::Validation(v) => v,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_insert_album_numbers_tracks_and_leaves_unrated() {
        let mut library = Library::default();
        assert_eq!(library.insert_album(new_album()).unwrap(), 2);

        let tracks = library.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].track_number, Some(1));
        assert_eq!(tracks[1].track_number, Some(2));
        for track in tracks {
            assert_eq!(track.ratings, Ratings::unrated());
            assert_eq!(track.year, Some(2000));
            assert_eq!(track.artists, vec!["A"]);
        }
    }

    #[test]
    fn test_insert_album_drops_untitled_drafts() {
        let mut library = Library::default();
        let album = NewAlbum {
            tracks: vec![
                TrackDraft::new("T1"),
                TrackDraft::new(" "),
                TrackDraft::new("T3"),
            ],
            ..new_album()
        };
        assert_eq!(library.insert_album(album).unwrap(), 2);
        let numbers: Vec<_> = library.tracks().iter().map(|t| t.track_number).collect();
        assert_eq!(numbers, vec![Some(1), Some(3)]);
    }

    #[test]
    fn test_insert_album_rejections_leave_table_unchanged() {
        let mut library = Library::new(album_tracks("Old", &["B"], 1999, 1));
        let before = library.clone();

        let cases = vec![
            (NewAlbum { artists: vec![], ..new_album() }, ValidationError::NoArtists),
            (NewAlbum { title: "".into(), ..new_album() }, ValidationError::EmptyAlbumTitle),
            (NewAlbum { tracks: vec![], ..new_album() }, ValidationError::NoTracks),
            (
                NewAlbum { tracks: vec![TrackDraft::new(""), TrackDraft::new("")], ..new_album() },
                ValidationError::NoTitledTracks,
            ),
            (NewAlbum { year: 1850, ..new_album() }, ValidationError::YearOutOfRange(1850)),
        ];

        for (album, expected) in cases {
            let err = library.insert_album(album).unwrap_err();
            assert_eq!(validation(err), expected);
            assert_eq!(library, before);
        }
    }

    #[test]
    fn test_insert_album_extra_artist() {
        let mut library = Library::default();
        let album = NewAlbum {
            artists: vec![],
            extra_artist: Some("New Band".into()),
            ..new_album()
        };
        library.insert_album(album).unwrap();
        assert_eq!(library.tracks()[0].artists, vec!["New Band"]);

        let album = NewAlbum {
            extra_artist: Some("A".into()),
            title: "Y".into(),
            ..new_album()
        };
        library.insert_album(album).unwrap();
        assert_eq!(library.tracks()[2].artists, vec!["A"]);
    }

    #[test]
    fn test_insert_track_into_existing_album_keeps_its_year() {
        let mut library = Library::new(album_tracks("X", &["A"], 1995, 2));
        let stored = library
            .insert_track(NewTrack {
                artists: strings(&["A"]),
                album: "X".into(),
                year: Some(2020),
                title: "Bonus".into(),
                track_number: 3,
                composers: vec![],
            })
            .unwrap();

        assert_eq!(stored, 1995);
        assert_eq!(library.tracks()[2].year, Some(1995));
    }

    #[test]
    fn test_insert_track_new_album_requires_year() {
        let mut library = Library::default();
        let track = NewTrack {
            artists: strings(&["A"]),
            album: "Fresh".into(),
            year: None,
            title: "One".into(),
            track_number: 1,
            composers: vec![],
        };
        let err = library.insert_track(track.clone()).unwrap_err();
        assert_eq!(validation(err), ValidationError::MissingYear);
        assert!(library.is_empty());

        let stored = library
            .insert_track(NewTrack {
                year: Some(2011),
                ..track
            })
            .unwrap();
        assert_eq!(stored, 2011);
    }

    #[test]
    fn test_insert_track_requires_fields() {
        let mut library = Library::default();
        let base = NewTrack {
            artists: strings(&["A"]),
            album: "X".into(),
            year: Some(2000),
            title: "T".into(),
            track_number: 1,
            composers: vec![],
        };
        let cases = vec![
            (NewTrack { artists: vec![], ..base.clone() }, ValidationError::NoArtists),
            (NewTrack { album: "".into(), ..base.clone() }, ValidationError::EmptyAlbumTitle),
            (NewTrack { title: "".into(), ..base.clone() }, ValidationError::EmptyTrackTitle),
            (NewTrack { track_number: 0, ..base.clone() }, ValidationError::InvalidTrackNumber),
        ];
        for (track, expected) in cases {
            assert_eq!(validation(library.insert_track(track).unwrap_err()), expected);
        }
        assert!(library.is_empty());
    }

    #[test]
    fn test_replace_album_unrated_sentinel_clears_only_acting_user() {
        let mut tracks = album_tracks("X", &["A"], 2000, 2);
        rate(&mut tracks[0], User::Jov, 9.0);
        rate(&mut tracks[0], User::Jom, 7.0);
        rate(&mut tracks[0], User::Job, 5.5);
        let mut library = Library::new(tracks);
        let identity = AlbumIdentity::new("X", strings(&["A"]));

        let mut edit = library.edit_template(&identity, User::Jov).unwrap();
        assert_eq!(edit.tracks[0].rating, RatingInput::Score(9.0));
        edit.tracks[0].rating = RatingInput::Unrated;

        library.replace_album(&identity, edit, User::Jov).unwrap();

        let rows = library.album_tracks(&identity);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].rating(User::Jov).is_none());
        assert_eq!(rows[0].rating(User::Jom).map(|r| r.value()), Some(7.0));
        assert_eq!(rows[0].rating(User::Job).map(|r| r.value()), Some(5.5));
    }

    #[test]
    fn test_replace_album_pairs_by_track_number_order() {
        let mut tracks = album_tracks("X", &["A"], 2000, 3);
        tracks.reverse();
        rate(&mut tracks[0], User::Jom, 3.0); // track 3
        let mut other = album_tracks("Y", &["B"], 2010, 1);
        tracks.append(&mut other);
        let mut library = Library::new(tracks);
        let identity = AlbumIdentity::new("X", strings(&["A"]));

        let edit = AlbumEdit {
            title: "X (Remaster)".into(),
            artists: strings(&["A"]),
            year: Some(2001),
            tracks: (1..=3)
                .map(|n| TrackEdit {
                    track_number: Some(n),
                    title: format!("New {n}"),
                    composers: vec![],
                    rating: RatingInput::Score(n as f64),
                })
                .collect(),
        };
        assert_eq!(library.replace_album(&identity, edit, User::Jov).unwrap(), 3);

        assert!(library.album_tracks(&identity).is_empty());
        let renamed = AlbumIdentity::new("X (Remaster)", strings(&["A"]));
        let rows = library.album_tracks(&renamed);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].rating(User::Jom).map(|r| r.value()), Some(3.0));
        assert!(rows[0].rating(User::Jom).is_none());
        assert_eq!(rows[1].rating(User::Jov).map(|r| r.value()), Some(2.0));
        assert_eq!(rows[0].year, Some(2001));
        assert_eq!(library.len(), 4);
    }

    #[test]
    fn test_replace_album_with_extra_track_has_no_foreign_ratings() {
        let mut tracks = album_tracks("X", &["A"], 2000, 1);
        rate(&mut tracks[0], User::Job, 8.0);
        let mut library = Library::new(tracks);
        let identity = AlbumIdentity::new("X", strings(&["A"]));

        let mut edit = library.edit_template(&identity, User::Jom).unwrap();
        edit.tracks.push(TrackEdit {
            track_number: Some(2),
            title: "Hidden".into(),
            composers: vec![],
            rating: RatingInput::Unrated,
        });
        library.replace_album(&identity, edit, User::Jom).unwrap();

        let rows = library.album_tracks(&identity);
        assert_eq!(rows[0].rating(User::Job).map(|r| r.value()), Some(8.0));
        assert!(rows[1].rating(User::Job).is_none());
    }

    #[test]
    fn test_replace_missing_album_fails() {
        let mut library = Library::new(album_tracks("X", &["A"], 2000, 1));
        let identity = AlbumIdentity::new("Nope", strings(&["A"]));
        let edit = AlbumEdit {
            title: "Nope".into(),
            artists: strings(&["A"]),
            year: Some(2000),
            tracks: vec![],
        };
        let err = library.replace_album(&identity, edit, User::Jom).unwrap_err();
        assert!(matches!(err, Error::AlbumNotFound(_)));
    }

    #[test]
    fn test_replace_album_rejects_bad_rating_without_changes() {
        let mut library = Library::new(album_tracks("X", &["A"], 2000, 2));
        let before = library.clone();
        let identity = AlbumIdentity::new("X", strings(&["A"]));

        let mut edit = library.edit_template(&identity, User::Jom).unwrap();
        edit.tracks[1].rating = RatingInput::Score(12.0);

        let err = library.replace_album(&identity, edit, User::Jom).unwrap_err();
        assert_eq!(validation(err), ValidationError::RatingOutOfRange(12.0));
        assert_eq!(library, before);
    }

    #[test]
    fn test_rating_input_json() {
        let edit: TrackEdit =
            serde_json::from_str(r#"{"track_number":1,"title":"T","rating":null}"#).unwrap();
        assert_eq!(edit.rating, RatingInput::Unrated);
        let edit: TrackEdit =
            serde_json::from_str(r#"{"track_number":1,"title":"T","rating":6.5}"#).unwrap();
        assert_eq!(edit.rating, RatingInput::Score(6.5));
        let edit: TrackEdit = serde_json::from_str(r#"{"track_number":1,"title":"T"}"#).unwrap();
        assert_eq!(edit.rating, RatingInput::Unrated);
    }

    #[test]
    fn test_unchanged_template_without_year_is_rejected() {
        let mut tracks = album_tracks("X", &["A"], 2000, 2);
        for track in &mut tracks {
            track.year = None;
        }
        let mut library = Library::new(tracks);
        let before = library.clone();
        let identity = AlbumIdentity::new("X", strings(&["A"]));

        let edit = library.edit_template(&identity, User::Jom).unwrap();
        assert_eq!(edit.year, None);

        let err = library.replace_album(&identity, edit.clone(), User::Jom).unwrap_err();
        assert_eq!(validation(err), ValidationError::MissingYear);
        assert_eq!(library, before);
        assert!(library.tracks().iter().all(|t| t.year.is_none()));

        let fixed = AlbumEdit {
            year: Some(1999),
            ..edit
        };
        library.replace_album(&identity, fixed, User::Jom).unwrap();
        assert!(library.tracks().iter().all(|t| t.year == Some(1999)));
    }

    #[test]
    fn test_unchanged_template_without_track_number_is_rejected() {
        let mut tracks = album_tracks("X", &["A"], 2000, 2);
        tracks[1].track_number = None;
        let mut library = Library::new(tracks);
        let before = library.clone();
        let identity = AlbumIdentity::new("X", strings(&["A"]));

        let edit = library.edit_template(&identity, User::Jom).unwrap();
        assert_eq!(edit.tracks[1].track_number, None);

        let err = library.replace_album(&identity, edit, User::Jom).unwrap_err();
        assert_eq!(validation(err), ValidationError::MissingTrackNumber);
        assert_eq!(library, before);
    }

    #[test]
    fn test_existing_year_takes_first_matching_row() {
        let mut tracks = album_tracks("Live", &["A"], 1990, 1);
        tracks.extend(album_tracks("Live", &["B"], 2005, 1));
        let library = Library::new(tracks);

        assert_eq!(library.existing_year("Live", &strings(&["A", "B"])), Some(1990));
        assert_eq!(library.existing_year("Live", &strings(&["B", "A"])), Some(1990));
        assert_eq!(library.existing_year("Live", &strings(&["B"])), Some(2005));
        assert_eq!(library.existing_year("Live", &strings(&["C"])), None);
    }
}

//! Per-album statistics for one user.
//!
//! Tracks are grouped by `(album, artists, year)` with exact equality (no
//! case folding). Groups keep first-appearance order, and the derived views
//! sort stably so ties stay in that order.
//!
//! Rows with a blank album, no artists or a missing year belong to no
//! group.
//!
//! Artists compare as decoded lists, not as raw cell text: `"A;B"` and
//! `"A; B"` are one group. Write-back re-encodes every cell canonically,
//! so the raw variants only differ in freshly imported sheets.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Track, User};

/// Aggregate of one album group for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumStats {
    pub album: String,
    pub artists: Vec<String>,
    pub year: i32,
    /// Rows in the group (always at least 1)
    pub total_tracks: usize,
    /// Rows the user has rated
    pub rated_tracks: usize,
    /// Mean of the user's ratings; `None` when nothing is rated
    pub avg_rating: Option<f64>,
    /// `rated_tracks / total_tracks * 100`
    pub completion_perc: f64,
}

impl AlbumStats {
    pub fn is_complete(&self) -> bool {
        self.rated_tracks == self.total_tracks
    }
}

#[derive(Hash, PartialEq, Eq)]
struct GroupKey<'a> {
    album: &'a str,
    artists: &'a [String],
    year: i32,
}

#[derive(Default)]
struct Accumulator {
    total: usize,
    rated: usize,
    sum: f64,
}

/// One [`AlbumStats`] per album group, in first-appearance order.
pub fn album_stats(tracks: &[Track], user: User) -> Vec<AlbumStats> {
    let mut index: HashMap<GroupKey<'_>, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey<'_>, Accumulator)> = Vec::new();

    for track in tracks {
        let Some(year) = track.year else { continue };
        if track.album.is_empty() || track.artists.is_empty() {
            continue;
        }
        let key = GroupKey {
            album: &track.album,
            artists: &track.artists,
            year,
        };
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((
                GroupKey {
                    album: &track.album,
                    artists: &track.artists,
                    year,
                },
                Accumulator::default(),
            ));
            groups.len() - 1
        });

        let acc = &mut groups[slot].1;
        acc.total += 1;
        if let Some(rating) = track.rating(user) {
            acc.rated += 1;
            acc.sum += rating.value();
        }
    }

    groups
        .into_iter()
        .map(|(key, acc)| AlbumStats {
            album: key.album.to_string(),
            artists: key.artists.to_vec(),
            year: key.year,
            total_tracks: acc.total,
            rated_tracks: acc.rated,
            avg_rating: (acc.rated > 0).then(|| acc.sum / acc.rated as f64),
            completion_perc: acc.rated as f64 / acc.total as f64 * 100.0,
        })
        .collect()
}

/// Albums the user has not finished rating, most complete first.
pub fn in_progress(tracks: &[Track], user: User) -> Vec<AlbumStats> {
    let mut albums: Vec<_> = album_stats(tracks, user)
        .into_iter()
        .filter(|a| !a.is_complete())
        .collect();
    albums.sort_by(|a, b| b.completion_perc.total_cmp(&a.completion_perc));
    albums
}

/// Albums the user has rated in full, best average first.
pub fn completed(tracks: &[Track], user: User) -> Vec<AlbumStats> {
    let mut albums: Vec<_> = album_stats(tracks, user)
        .into_iter()
        .filter(AlbumStats::is_complete)
        .collect();
    albums.sort_by(|a, b| {
        let a = a.avg_rating.unwrap_or(f64::NEG_INFINITY);
        let b = b.avg_rating.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    albums
}

/// Mean of the user's ratings over any set of tracks.
pub fn user_average<'a>(tracks: impl IntoIterator<Item = &'a Track>, user: User) -> Option<f64> {
    let (count, sum) = tracks
        .into_iter()
        .filter_map(|t| t.rating(user))
        .fold((0usize, 0.0), |(n, s), r| (n + 1, s + r.value()));
    (count > 0).then(|| sum / count as f64)
}

/// Qualitative band for an average rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTier {
    Terrible,
    Poor,
    Fair,
    Good,
    Great,
    Excellent,
}

impl RatingTier {
    pub fn from_average(avg: f64) -> Self {
        if avg < 5.0 {
            RatingTier::Terrible
        } else if avg < 6.0 {
            RatingTier::Poor
        } else if avg < 7.0 {
            RatingTier::Fair
        } else if avg < 8.5 {
            RatingTier::Good
        } else if avg < 9.5 {
            RatingTier::Great
        } else {
            RatingTier::Excellent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingTier::Terrible => "Terrible",
            RatingTier::Poor => "Poor",
            RatingTier::Fair => "Fair",
            RatingTier::Good => "Good",
            RatingTier::Great => "Great",
            RatingTier::Excellent => "Excellent",
        }
    }

    /// Display color name.
    pub fn color(&self) -> &'static str {
        match self {
            RatingTier::Terrible => "red",
            RatingTier::Poor => "orange",
            RatingTier::Fair => "gray",
            RatingTier::Good => "blue",
            RatingTier::Great => "green",
            RatingTier::Excellent => "violet",
        }
    }
}

//! Membership filters over tracks and album aggregates.
//!
//! Every filter treats an empty selection as "no filter" and returns a new
//! vector, leaving its input untouched. [`Selection`] composes them in the
//! order artist -> album -> year.

use std::collections::BTreeSet;

use crate::model::Track;
use crate::stats::AlbumStats;

/// Anything that carries an album's artists, title and year.
pub trait AlbumKeyed {
    fn artists(&self) -> &[String];
    fn album(&self) -> &str;
    fn year(&self) -> Option<i32>;
}

impl AlbumKeyed for Track {
    fn artists(&self) -> &[String] {
        &self.artists
    }

    fn album(&self) -> &str {
        &self.album
    }

    fn year(&self) -> Option<i32> {
        self.year
    }
}

impl AlbumKeyed for AlbumStats {
    fn artists(&self) -> &[String] {
        &self.artists
    }

    fn album(&self) -> &str {
        &self.album
    }

    fn year(&self) -> Option<i32> {
        Some(self.year)
    }
}

/// Keep items credited to at least one selected artist.
pub fn filter_by_artists<T: AlbumKeyed + Clone>(items: &[T], selected: &[String]) -> Vec<T> {
    if selected.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| item.artists().iter().any(|a| selected.contains(a)))
        .cloned()
        .collect()
}

/// Keep items whose album title is selected.
pub fn filter_by_albums<T: AlbumKeyed + Clone>(items: &[T], selected: &[String]) -> Vec<T> {
    if selected.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| selected.iter().any(|s| s == item.album()))
        .cloned()
        .collect()
}

/// Keep items whose year is selected.
pub fn filter_by_years<T: AlbumKeyed + Clone>(items: &[T], selected: &[i32]) -> Vec<T> {
    if selected.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| item.year().is_some_and(|y| selected.contains(&y)))
        .cloned()
        .collect()
}

/// A combined artist/album/year selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub artists: Vec<String>,
    pub albums: Vec<String>,
    pub years: Vec<i32>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.albums.is_empty() && self.years.is_empty()
    }

    /// Apply every non-empty part, artist first.
    pub fn apply<T: AlbumKeyed + Clone>(&self, items: &[T]) -> Vec<T> {
        let view = filter_by_artists(items, &self.artists);
        let view = filter_by_albums(&view, &self.albums);
        filter_by_years(&view, &self.years)
    }
}

/// Every artist credited anywhere, sorted and deduplicated.
pub fn distinct_artists<T: AlbumKeyed>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.artists().iter().cloned())
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Every composer credited on any track, sorted and deduplicated.
pub fn distinct_composers(tracks: &[Track]) -> Vec<String> {
    tracks
        .iter()
        .flat_map(|t| t.composers.iter().cloned())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Album titles available for an artist selection (all albums when empty).
pub fn albums_for_artists<T: AlbumKeyed + Clone>(items: &[T], selected: &[String]) -> Vec<String> {
    filter_by_artists(items, selected)
        .iter()
        .map(|item| item.album().to_string())
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Years present, ascending.
pub fn distinct_years<T: AlbumKeyed>(items: &[T]) -> Vec<i32> {
    items
        .iter()
        .filter_map(|item| item.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

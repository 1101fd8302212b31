//! Row normalization and write-back shaping.
//!
//! [`normalize`] is the one-time schema migration run at load: it locates
//! the known columns, synthesizes any missing rating column as all-unrated
//! and parses every cell into a fully-shaped [`Track`]. A bad cell never
//! fails the load; it becomes a missing value.
//!
//! [`to_raw`] is the inverse used before every overwrite. It always emits
//! the canonical [`COLUMNS`] in order.

use tracing::{debug, info};

use super::RawTable;
use crate::codec;
use crate::model::{
    COL_ALBUM, COL_ARTISTS, COL_COMPOSERS, COL_TITLE, COL_TRACK_NUMBER, COL_YEAR, COLUMNS,
    Rating, Ratings, Track, User,
};

/// What normalization did to a raw grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Tracks produced
    pub tracks: usize,
    /// Rows skipped because every cell was blank
    pub empty_rows: usize,
    /// Non-blank cells that could not be parsed and were read as missing
    pub degraded_cells: usize,
    /// Rating columns absent from the grid and filled as unrated
    pub synthesized_columns: Vec<&'static str>,
}

/// Column positions resolved once per load.
struct Layout {
    track_number: Option<usize>,
    title: Option<usize>,
    artists: Option<usize>,
    album: Option<usize>,
    year: Option<usize>,
    composers: Option<usize>,
    ratings: [(User, Option<usize>); 3],
}

impl Layout {
    fn resolve(raw: &RawTable) -> Self {
        Self {
            track_number: raw.column_index(COL_TRACK_NUMBER),
            title: raw.column_index(COL_TITLE),
            artists: raw.column_index(COL_ARTISTS),
            album: raw.column_index(COL_ALBUM),
            year: raw.column_index(COL_YEAR),
            composers: raw.column_index(COL_COMPOSERS),
            ratings: User::ALL.map(|u| (u, raw.column_index(u.rating_column()))),
        }
    }
}

/// Normalize a raw grid into tracks, logging a summary.
pub fn normalize(raw: &RawTable) -> Vec<Track> {
    let (tracks, report) = normalize_with_report(raw);
    info!(
        tracks = report.tracks,
        empty_rows = report.empty_rows,
        degraded_cells = report.degraded_cells,
        synthesized = ?report.synthesized_columns,
        "Normalized worksheet"
    );
    tracks
}

/// Normalize a raw grid into tracks and report what was degraded.
pub fn normalize_with_report(raw: &RawTable) -> (Vec<Track>, LoadReport) {
    let layout = Layout::resolve(raw);
    let mut report = LoadReport {
        synthesized_columns: layout
            .ratings
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(u, _)| u.rating_column())
            .collect(),
        ..Default::default()
    };

    let mut tracks = Vec::with_capacity(raw.len());
    for row in 0..raw.len() {
        if (0..raw.columns.len()).all(|col| raw.cell(row, col).is_none()) {
            report.empty_rows += 1;
            continue;
        }
        tracks.push(normalize_row(raw, row, &layout, &mut report.degraded_cells));
    }

    report.tracks = tracks.len();
    (tracks, report)
}

fn normalize_row(raw: &RawTable, row: usize, layout: &Layout, degraded: &mut usize) -> Track {
    let mut reader = RowReader { raw, row, degraded };

    let track_number = reader.parse(COL_TRACK_NUMBER, layout.track_number, parse_track_number);
    let year = reader.parse(COL_YEAR, layout.year, parse_year);

    let mut ratings = Ratings::unrated();
    for (user, col) in layout.ratings {
        ratings.set(user, reader.parse(user.rating_column(), col, parse_rating));
    }

    Track {
        track_number,
        title: reader.text(layout.title).unwrap_or_default().to_string(),
        artists: codec::decode_opt(reader.text(layout.artists)),
        album: reader.text(layout.album).unwrap_or_default().to_string(),
        year,
        composers: codec::decode_opt(reader.text(layout.composers)),
        ratings,
    }
}

struct RowReader<'a> {
    raw: &'a RawTable,
    row: usize,
    degraded: &'a mut usize,
}

impl<'a> RowReader<'a> {
    fn text(&self, col: Option<usize>) -> Option<&'a str> {
        col.and_then(|c| self.raw.cell(self.row, c))
    }

    /// Parse a cell, counting a non-blank cell that fails as degraded.
    fn parse<T>(
        &mut self,
        column: &str,
        col: Option<usize>,
        parse: fn(&str) -> Option<T>,
    ) -> Option<T> {
        let cell = self.text(col)?;
        let value = parse(cell);
        if value.is_none() {
            debug!(row = self.row, column, cell, "Unparsable cell read as missing");
            *self.degraded += 1;
        }
        value
    }
}

/// Parse an integer cell, accepting integral floats such as `"3.0"`.
fn parse_integer(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<i64>() {
        return Some(n);
    }
    let f = cell.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn parse_track_number(cell: &str) -> Option<u32> {
    parse_integer(cell)
        .filter(|n| *n >= 1)
        .and_then(|n| u32::try_from(n).ok())
}

fn parse_year(cell: &str) -> Option<i32> {
    parse_integer(cell).and_then(|n| i32::try_from(n).ok())
}

fn parse_rating(cell: &str) -> Option<Rating> {
    cell.trim().parse::<f64>().ok().and_then(Rating::new)
}

/// Shape tracks into the canonical grid for an overwrite.
pub fn to_raw(tracks: &[Track]) -> RawTable {
    let mut table = RawTable::new(COLUMNS.iter().map(|c| c.to_string()).collect());
    table.rows = tracks.iter().map(track_to_row).collect();
    table
}

fn track_to_row(track: &Track) -> Vec<Option<String>> {
    let non_empty = |s: String| (!s.is_empty()).then_some(s);

    let mut row = vec![
        track.track_number.map(|n| n.to_string()),
        non_empty(track.title.clone()),
        non_empty(track.artists_cell()),
        non_empty(track.album.clone()),
        track.year.map(|y| y.to_string()),
        non_empty(track.composers_cell()),
    ];
    row.extend(
        User::ALL
            .iter()
            .map(|u| track.rating(*u).map(|r| r.value().to_string())),
    );
    row
}

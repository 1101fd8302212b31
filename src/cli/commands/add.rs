//! Adding albums and single tracks.

use super::Context;
use crate::codec;
use crate::library::{NewAlbum, NewTrack, TrackDraft};

/// Add a whole album. Each `--track` becomes one draft track, numbered in
/// the order given.
pub fn cmd_add_album(
    ctx: &Context,
    title: &str,
    year: i32,
    artists: &[String],
    new_artist: Option<&str>,
    tracks: &[String],
) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        for entry in tracks {
            session.add_draft_track(parse_track(entry));
        }

        let album = NewAlbum {
            title: title.to_string(),
            year,
            artists: artists.to_vec(),
            extra_artist: new_artist.map(str::to_string),
            tracks: Vec::new(),
        };
        let added = session.submit_draft(album).await?;

        println!("Added {added} track(s) to '{title}' ({year}).");
        Ok::<_, anyhow::Error>(())
    })
}

/// Add one track. An existing album keeps its stored year.
pub fn cmd_add_track(
    ctx: &Context,
    title: &str,
    album: &str,
    artists: &[String],
    year: Option<i32>,
    number: u32,
    composers: &[String],
) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        let stored_year = session
            .add_track(NewTrack {
                artists: artists.to_vec(),
                album: album.to_string(),
                year,
                title: title.to_string(),
                track_number: number,
                composers: composers.to_vec(),
            })
            .await?;

        println!("Added '{title}' as track {number} of '{album}' ({stored_year}).");
        Ok::<_, anyhow::Error>(())
    })
}

/// `"Title"` or `"Title|Composer A; Composer B"`.
fn parse_track(entry: &str) -> TrackDraft {
    match entry.split_once('|') {
        Some((title, composers)) => TrackDraft {
            title: title.trim().to_string(),
            composers: codec::decode(composers)
                .into_iter()
                .filter(|c| !c.is_empty())
                .collect(),
        },
        None => TrackDraft::new(entry.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_title_only() {
        assert_eq!(parse_track("  Come Together "), TrackDraft::new("Come Together"));
    }

    #[test]
    fn test_parse_track_with_composers() {
        let draft = parse_track("Something|George Harrison; ");
        assert_eq!(draft.title, "Something");
        assert_eq!(draft.composers, vec!["George Harrison"]);
    }

    #[test]
    fn test_parse_track_blank_title_stays_blank() {
        assert!(parse_track("|Lennon").title.is_empty());
    }
}

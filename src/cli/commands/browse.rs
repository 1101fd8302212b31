//! Read-only views: library listing, option lists and album progress.

use super::Context;
use crate::filter::{self, Selection};
use crate::model::{Track, User};
use crate::stats::{self, AlbumStats, RatingTier};

/// List tracks with every user's rating, then each user's average.
pub fn cmd_library(ctx: &Context, artists: &[String], albums: &[String]) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        let selection = Selection {
            artists: artists.to_vec(),
            albums: albums.to_vec(),
            years: Vec::new(),
        };
        let tracks = selection.apply(session.library().await?.tracks());

        if tracks.is_empty() {
            println!("No tracks found.");
            return Ok::<_, anyhow::Error>(());
        }

        println!(
            "{:>3}  {:<32} {:<24} {:<28} {:>4}  {:>4} {:>4} {:>4}",
            "#", "Title", "Artists", "Album", "Year", "JOM", "JOV", "JOB"
        );
        for track in &tracks {
            print_track(track);
        }

        println!();
        for user in User::ALL {
            match stats::user_average(&tracks, user) {
                Some(avg) => println!(
                    "{:<4} average {:.2} ({})",
                    user.as_str().to_uppercase(),
                    avg,
                    RatingTier::from_average(avg).label()
                ),
                None => println!("{:<4} no ratings", user.as_str().to_uppercase()),
            }
        }
        println!("{} track(s)", tracks.len());
        Ok::<_, anyhow::Error>(())
    })
}

/// List every credited artist.
pub fn cmd_artists(ctx: &Context) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        for artist in filter::distinct_artists(session.library().await?.tracks()) {
            println!("{artist}");
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// List every credited composer.
pub fn cmd_composers(ctx: &Context) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        for composer in filter::distinct_composers(session.library().await?.tracks()) {
            println!("{composer}");
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// List album titles, narrowed to some artists when given.
pub fn cmd_albums(ctx: &Context, artists: &[String]) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        for album in filter::albums_for_artists(session.library().await?.tracks(), artists) {
            println!("{album}");
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// List every release year, oldest first.
pub fn cmd_years(ctx: &Context) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        for year in filter::distinct_years(session.library().await?.tracks()) {
            println!("{year}");
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Albums the user has started or not yet rated, most complete first.
pub fn cmd_in_progress(ctx: &Context, artists: &[String], years: &[i32]) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        let albums = session.in_progress().await?;
        print_albums(&narrow(&albums, artists, years), "No albums in progress.");
        Ok::<_, anyhow::Error>(())
    })
}

/// Albums the user has rated in full, best first.
pub fn cmd_completed(ctx: &Context, artists: &[String], years: &[i32]) -> anyhow::Result<()> {
    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        let albums = session.completed().await?;
        print_albums(&narrow(&albums, artists, years), "No completed albums.");
        Ok::<_, anyhow::Error>(())
    })
}

fn narrow(albums: &[AlbumStats], artists: &[String], years: &[i32]) -> Vec<AlbumStats> {
    Selection {
        artists: artists.to_vec(),
        albums: Vec::new(),
        years: years.to_vec(),
    }
    .apply(albums)
}

fn print_track(track: &Track) {
    let number = track
        .track_number
        .map(|n| n.to_string())
        .unwrap_or_default();
    let year = track.year.map(|y| y.to_string()).unwrap_or_default();
    let ratings: Vec<String> = User::ALL
        .iter()
        .map(|&user| {
            track
                .rating(user)
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string())
        })
        .collect();

    println!(
        "{:>3}  {:<32} {:<24} {:<28} {:>4}  {:>4} {:>4} {:>4}",
        number,
        truncate(&track.title, 32),
        truncate(&track.artists_cell(), 24),
        truncate(&track.album, 28),
        year,
        ratings[0],
        ratings[1],
        ratings[2]
    );
}

fn print_albums(albums: &[AlbumStats], empty: &str) {
    if albums.is_empty() {
        println!("{empty}");
        return;
    }

    for album in albums {
        let avg = match album.avg_rating {
            Some(avg) => {
                let tier = RatingTier::from_average(avg);
                format!("{avg:.2} {} ({})", tier.label(), tier.color())
            }
            None => "-".to_string(),
        };
        println!(
            "{:<28} {:<24} {:>4}  {:>3}/{:<3} {:>5.1}%  {}",
            truncate(&album.album, 28),
            truncate(&crate::codec::encode(&album.artists), 24),
            album.year,
            album.rated_tracks,
            album.total_tracks,
            album.completion_perc,
            avg
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

//! Album editing through a JSON edit file.
//!
//! Without `--apply` the current album is printed as an edit file with the
//! acting user's ratings filled in. Edit it and pass it back with `--apply`
//! to replace the album; other users' ratings follow the tracks by position.

use std::path::PathBuf;

use anyhow::Context as _;

use super::Context;
use crate::library::AlbumEdit;
use crate::model::AlbumIdentity;

/// Print or apply an album edit.
pub fn cmd_edit_album(
    ctx: &Context,
    album: &str,
    artists: &[String],
    apply: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let edit: Option<AlbumEdit> = match apply {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read edit file {}", path.display()))?;
            Some(serde_json::from_str(&contents).with_context(|| {
                format!("edit file {} is not a valid album edit", path.display())
            })?)
        }
        None => None,
    };

    ctx.rt.block_on(async {
        let mut session = ctx.session().await?;
        let identity = AlbumIdentity::new(album, artists.to_vec());
        let template = session.begin_edit(identity.clone()).await?;

        let Some(edit) = edit else {
            println!("{}", serde_json::to_string_pretty(&template)?);
            session.cancel_edit();
            return Ok::<_, anyhow::Error>(());
        };

        let inserted = session.save_edit(edit).await?;
        println!("Replaced {identity} with {inserted} track(s).");
        Ok::<_, anyhow::Error>(())
    })
}

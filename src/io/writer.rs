//! Result writer: one line per tuplet, point ids separated by single spaces.

use std::io::Write;
use std::path::Path;

use tracing::info;

/// Write `tuplets` to `out`, one newline-terminated line each.
pub fn write_tuplets<W: Write>(out: &mut W, tuplets: &[Vec<u32>]) -> std::io::Result<()> {
    for tuplet in tuplets {
        let mut ids = tuplet.iter();
        if let Some(first) = ids.next() {
            write!(out, "{first}")?;
            for id in ids {
                write!(out, " {id}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write `tuplets` to a file, replacing any existing content.
pub fn save_tuplets_to_file<P: AsRef<Path>>(path: P, tuplets: &[Vec<u32>]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    let mut out = std::io::BufWriter::new(file);
    write_tuplets(&mut out, tuplets)?;
    out.flush()?;
    info!("Wrote {} tuplets to {}", tuplets.len(), path.display());
    Ok(())
}

use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use tracing::debug;

/// Read the duration from the container headers. `None` when the file can't
/// be parsed or reports no length.
///
/// The format is sniffed from the content, since stored blobs carry no
/// extension.
pub fn probe_duration(path: &Path) -> Option<Duration> {
    let tagged = Probe::open(path)
        .and_then(|p| p.guess_file_type().map_err(Into::into))
        .and_then(|p| p.read());

    match tagged {
        Ok(tagged) => {
            let d = tagged.properties().duration();
            (!d.is_zero()).then_some(d)
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "duration probe failed");
            None
        }
    }
}

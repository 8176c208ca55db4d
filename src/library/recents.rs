use super::model::RecentEntry;

pub const RECENTS_CAP: usize = 8;

/// Most-recently-played tracks, newest first, unique by id.
#[derive(Debug, Default, Clone)]
pub struct Recents {
    entries: Vec<RecentEntry>,
}

impl Recents {
    /// Build from saved entries, dropping duplicates and anything past the cap.
    pub fn from_saved(saved: Vec<RecentEntry>) -> Self {
        let mut entries: Vec<RecentEntry> = Vec::with_capacity(RECENTS_CAP);
        for entry in saved {
            if entries.len() == RECENTS_CAP {
                break;
            }
            if !entries.iter().any(|e| e.id == entry.id) {
                entries.push(entry);
            }
        }
        Self { entries }
    }

    /// Put `entry` at the front, removing any older entry with the same id.
    pub fn record(&mut self, entry: RecentEntry) {
        self.entries.retain(|e| e.id != entry.id);
        self.entries.insert(0, entry);
        self.entries.truncate(RECENTS_CAP);
    }

    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

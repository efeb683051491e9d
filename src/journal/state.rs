//! Mutable per-journal decoder state.

use super::opcode::Dictionary;
use super::{JournalError, JournalResult};

/// Dictionaries and rolling context one journal's events decode against.
///
/// Constructed empty at journal start and discarded at end-of-journal;
/// nothing persists across journals. Dictionary entries are append-only
/// with dense 0-based indices in definition order.
#[derive(Debug, Default)]
pub struct DecoderState {
    hosts: Vec<String>,
    sources: Vec<String>,
    sourcetypes: Vec<String>,
    active_host: Option<usize>,
    active_source: Option<usize>,
    active_sourcetype: Option<usize>,
    base_time: Option<u64>,
}

impl DecoderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a dictionary entry.
    pub fn define(&mut self, dictionary: Dictionary, value: String) {
        self.entries_mut(dictionary).push(value);
    }

    /// Selects the active entry for `dictionary`; the index must reference
    /// an existing entry.
    pub fn set_active(
        &mut self,
        dictionary: Dictionary,
        index: u64,
        offset: u64,
    ) -> JournalResult<()> {
        let len = self.entries(dictionary).len();
        let valid = usize::try_from(index).ok().filter(|&idx| idx < len);
        let Some(idx) = valid else {
            return Err(JournalError::OutOfRange {
                dictionary,
                index,
                len,
                offset,
            });
        };
        *self.active_slot_mut(dictionary) = Some(idx);
        Ok(())
    }

    pub fn set_base_time(&mut self, secs: u64) {
        self.base_time = Some(secs);
    }

    pub fn base_time(&self) -> Option<u64> {
        self.base_time
    }

    /// Currently-active entry, or `None` before the first `SetActive`.
    pub fn active(&self, dictionary: Dictionary) -> Option<&str> {
        let idx = self.active_slot(dictionary)?;
        self.entries(dictionary).get(idx).map(String::as_str)
    }

    /// Number of entries defined for `dictionary`.
    pub fn entry_count(&self, dictionary: Dictionary) -> usize {
        self.entries(dictionary).len()
    }

    fn entries(&self, dictionary: Dictionary) -> &[String] {
        match dictionary {
            Dictionary::Host => &self.hosts,
            Dictionary::Source => &self.sources,
            Dictionary::Sourcetype => &self.sourcetypes,
        }
    }

    fn entries_mut(&mut self, dictionary: Dictionary) -> &mut Vec<String> {
        match dictionary {
            Dictionary::Host => &mut self.hosts,
            Dictionary::Source => &mut self.sources,
            Dictionary::Sourcetype => &mut self.sourcetypes,
        }
    }

    fn active_slot(&self, dictionary: Dictionary) -> Option<usize> {
        match dictionary {
            Dictionary::Host => self.active_host,
            Dictionary::Source => self.active_source,
            Dictionary::Sourcetype => self.active_sourcetype,
        }
    }

    fn active_slot_mut(&mut self, dictionary: Dictionary) -> &mut Option<usize> {
        match dictionary {
            Dictionary::Host => &mut self.active_host,
            Dictionary::Source => &mut self.active_source,
            Dictionary::Sourcetype => &mut self.active_sourcetype,
        }
    }
}

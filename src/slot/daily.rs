//! Per-day completion marks for daily project routines.

use super::{DAILY_TASKS_KEY, LocalSlot};
use crate::error::Result;
use crate::model::DailyTask;

/// Reads and flips daily completion state held in the slot.
#[derive(Debug, Clone, Copy)]
pub struct DailyTracker<'a> {
    slot: &'a LocalSlot,
}

impl<'a> DailyTracker<'a> {
    #[must_use]
    pub const fn new(slot: &'a LocalSlot) -> Self {
        Self { slot }
    }

    /// Every stored entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    pub fn all(&self) -> Result<Vec<DailyTask>> {
        self.slot.get(DAILY_TASKS_KEY, Vec::new())
    }

    /// Entries recorded for `date` (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    pub fn for_date(&self, date: &str) -> Result<Vec<DailyTask>> {
        let mut entries = self.all()?;
        entries.retain(|entry| entry.date == date);
        Ok(entries)
    }

    /// Whether `wallet` finished `project` on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    pub fn is_completed(&self, date: &str, project: &str, wallet: &str) -> Result<bool> {
        Ok(self.all()?.iter().any(|entry| {
            entry.date == date
                && entry.project == project
                && entry.completed_wallets.iter().any(|w| w == wallet)
        }))
    }

    /// Flip completion for one wallet and return the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or written.
    pub fn toggle(&self, date: &str, project: &str, wallet: &str) -> Result<bool> {
        let mut entries = self.all()?;
        let completed =
            match entries
                .iter_mut()
                .find(|entry| entry.date == date && entry.project == project)
            {
                Some(entry) => {
                    if let Some(pos) = entry.completed_wallets.iter().position(|w| w == wallet) {
                        entry.completed_wallets.remove(pos);
                        false
                    } else {
                        entry.completed_wallets.push(wallet.to_string());
                        true
                    }
                }
                None => {
                    entries.push(DailyTask {
                        date: date.to_string(),
                        project: project.to_string(),
                        completed_wallets: vec![wallet.to_string()],
                    });
                    true
                }
            };
        self.slot.set(DAILY_TASKS_KEY, &entries)?;
        tracing::debug!(date, project, wallet, completed, "Toggled daily task");
        Ok(completed)
    }

    /// Union `incoming` into the stored entries. Returns how many wallet
    /// marks were new.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or written.
    pub fn merge(&self, incoming: &[DailyTask]) -> Result<usize> {
        let mut entries = self.all()?;
        let mut added = 0;
        for task in incoming {
            let index = if let Some(index) = entries
                .iter()
                .position(|entry| entry.date == task.date && entry.project == task.project)
            {
                index
            } else {
                entries.push(DailyTask {
                    date: task.date.clone(),
                    project: task.project.clone(),
                    completed_wallets: Vec::new(),
                });
                entries.len() - 1
            };
            let entry = &mut entries[index];
            for wallet in &task.completed_wallets {
                if !entry.completed_wallets.contains(wallet) {
                    entry.completed_wallets.push(wallet.clone());
                    added += 1;
                }
            }
        }
        self.slot.set(DAILY_TASKS_KEY, &entries)?;
        Ok(added)
    }
}

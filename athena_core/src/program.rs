//! Multi-week program tracking with atomic persistence.
//!
//! The tracker remembers which program the user follows and which day
//! comes next. State lives in a small JSON file written via temp file and
//! rename, guarded with file locks against concurrent writers.

use crate::catalog::Catalog;
use crate::{ActiveProgramState, Error, Program, ProgramDay, Result};
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Progress through the active program, if any
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgramTracker {
    pub active: Option<ActiveProgramState>,
    #[serde(default)]
    pub complete: bool,
}

impl ProgramTracker {
    /// Begin `program_id` at week 1, day 1, replacing any active program
    pub fn start(&mut self, catalog: &Catalog, program_id: &str) -> Result<&ActiveProgramState> {
        let program = lookup(catalog, program_id)?;

        tracing::info!("Starting program {}", program.name);
        self.complete = false;
        Ok(&*self.active.insert(ActiveProgramState {
            program_id: program.id.clone(),
            current_week: 1,
            current_day: 1,
            started_date: Utc::now(),
        }))
    }

    /// Mark today's training day done and move to the next one
    ///
    /// The week rolls over once the day passes the week's training days.
    /// Completing the last day of the last week leaves the position in
    /// place and flags the program complete.
    pub fn complete_day(&mut self, catalog: &Catalog) -> Result<()> {
        if self.complete {
            return Ok(());
        }
        let state = self
            .active
            .as_mut()
            .ok_or_else(|| Error::Program("No active program".into()))?;
        let program = lookup(catalog, &state.program_id)?;

        let mut next_day = state.current_day + 1;
        let mut next_week = state.current_week;

        let days_in_week = program
            .weeks
            .iter()
            .find(|w| w.week == next_week)
            .map(|w| w.training_days() as u32)
            .unwrap_or(0);

        if next_day > days_in_week {
            next_day = 1;
            next_week += 1;
        }

        if next_week > program.duration_weeks {
            tracing::info!("Program {} complete", program.name);
            self.complete = true;
            return Ok(());
        }

        tracing::debug!("Advancing {} to week {} day {}", program.id, next_week, next_day);
        state.current_week = next_week;
        state.current_day = next_day;
        Ok(())
    }

    /// Drop the active program
    pub fn quit(&mut self) {
        if let Some(state) = self.active.take() {
            tracing::info!("Quit program {}", state.program_id);
        }
        self.complete = false;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The program day the user should train next, if any
    pub fn current_day<'a>(&self, catalog: &'a Catalog) -> Option<&'a ProgramDay> {
        if self.complete {
            return None;
        }
        let state = self.active.as_ref()?;
        catalog
            .find_program(&state.program_id)?
            .weeks
            .iter()
            .find(|w| w.week == state.current_week)?
            .days
            .iter()
            .find(|d| d.day == state.current_day)
    }

    /// Training days finished so far in the active program
    pub fn completed_days(&self, catalog: &Catalog) -> usize {
        let Some(state) = &self.active else {
            return 0;
        };
        let Some(program) = catalog.find_program(&state.program_id) else {
            return 0;
        };
        if self.complete {
            return total_training_days(program);
        }
        let earlier_weeks: usize = program
            .weeks
            .iter()
            .filter(|w| w.week < state.current_week)
            .map(|w| w.training_days())
            .sum();
        earlier_weeks + state.current_day.saturating_sub(1) as usize
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Load tracker state with shared locking
    ///
    /// A missing or unreadable file means no active program.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No program file found, no active program");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open program file {:?}: {}. Ignoring.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock program file {:?}: {}. Ignoring.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read program file {:?}: {}. Ignoring.", path, e);
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<ProgramTracker>(&contents) {
            Ok(tracker) => {
                tracing::debug!("Loaded program state from {:?}", path);
                Ok(tracker)
            }
            Err(e) => {
                tracing::warn!("Failed to parse program file {:?}: {}. Ignoring.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save tracker state atomically (temp file, fsync, rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Other(format!("Program path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved program state to {:?}", path);
        Ok(())
    }

    /// Load, modify and save back in one step
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut ProgramTracker) -> Result<()>,
    {
        let mut tracker = Self::load(path)?;
        f(&mut tracker)?;
        tracker.save(path)?;
        Ok(tracker)
    }
}

fn lookup<'a>(catalog: &'a Catalog, program_id: &str) -> Result<&'a Program> {
    catalog
        .find_program(program_id)
        .ok_or_else(|| Error::Program(format!("Unknown program: {}", program_id)))
}

/// Training days across every week of a program
pub fn total_training_days(program: &Program) -> usize {
    program.weeks.iter().map(|w| w.training_days()).sum()
}

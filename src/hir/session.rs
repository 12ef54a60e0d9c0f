//! REPL sessions: units submitted one at a time, each resolved against the
//! scope left behind by the last successful one.
//!
//! Lines are strictly sequential. A line must be marked successful or failed
//! before the next one is submitted, because scope construction reads the
//! session's last-successful cursor.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::file_scope::{FileScopeProvider, FileScopes};
use super::input::SourceUnit;
use super::scope::LexicalScope;

/// Index of a line within its session.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LineId(u32);

impl LineId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

/// Lifecycle of a line. Both outcomes are terminal.
#[derive(Clone, Debug)]
pub enum LineState {
    Submitted,
    /// Holds the scope available after the line ran: everything the line
    /// declared plus what it imported.
    Successful(Arc<LexicalScope>),
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown session line {0:?}")]
    UnknownLine(LineId),

    #[error("session line {0:?} is already finalized")]
    AlreadyFinalized(LineId),

    #[error("session line {0:?} is still pending")]
    LinePending(LineId),
}

/// One submitted unit.
#[derive(Debug)]
pub struct SessionLine {
    id: LineId,
    unit: SourceUnit,
    state: LineState,
    previous_successful: Option<LineId>,
    scopes: Option<Arc<FileScopes>>,
}

impl SessionLine {
    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn unit(&self) -> &SourceUnit {
        &self.unit
    }

    pub fn state(&self) -> &LineState {
        &self.state
    }

    /// The last successful line at the time this one was submitted.
    pub fn previous_successful(&self) -> Option<LineId> {
        self.previous_successful
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, LineState::Submitted)
    }

    pub fn post_resolution_scope(&self) -> Option<&Arc<LexicalScope>> {
        match &self.state {
            LineState::Successful(scope) => Some(scope),
            _ => None,
        }
    }
}

/// A sequence of incrementally submitted units sharing cumulative scope.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    lines: Vec<SessionLine>,
    last_successful: Option<LineId>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            lines: Vec::new(),
            last_successful: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn last_successful(&self) -> Option<LineId> {
        self.last_successful
    }

    pub fn line(&self, id: LineId) -> Option<&SessionLine> {
        self.lines.get(id.index())
    }

    pub fn lines(&self) -> &[SessionLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, id: LineId) -> Result<&mut SessionLine, SessionError> {
        self.lines.get_mut(id.index()).ok_or(SessionError::UnknownLine(id))
    }

    pub fn submit_unit(&mut self, unit: SourceUnit) -> Result<LineId, SessionError> {
        if let Some(pending) = self.lines.last().filter(|line| line.is_pending()) {
            return Err(SessionError::LinePending(pending.id));
        }
        let id = LineId(self.lines.len() as u32);
        tracing::debug!(session = %self.id, line = ?id, previous = ?self.last_successful, "line submitted");
        self.lines.push(SessionLine {
            id,
            unit,
            state: LineState::Submitted,
            previous_successful: self.last_successful,
            scopes: None,
        });
        Ok(id)
    }

    /// Scopes for resolving `line`. Without a previous successful line these
    /// are the unit's ordinary scopes; otherwise the unit's imports are
    /// grafted onto the previous line's post-resolution scope, and the result
    /// is installed in `provider` for the unit's file.
    pub fn scope_for_unit(
        &mut self,
        line: LineId,
        provider: &FileScopeProvider,
    ) -> Result<Arc<FileScopes>, SessionError> {
        let previous_scope = {
            let current = self.line(line).ok_or(SessionError::UnknownLine(line))?;
            if let Some(scopes) = &current.scopes {
                return Ok(Arc::clone(scopes));
            }
            current
                .previous_successful
                .and_then(|prev| self.line(prev))
                .and_then(SessionLine::post_resolution_scope)
                .cloned()
        };

        let entry = self.line_mut(line)?;
        let scopes = match previous_scope {
            None => provider.file_scopes(&entry.unit),
            Some(previous) => {
                let scopes = Arc::new(provider.factory().create_scopes_over(&entry.unit, &previous));
                provider.install_custom(entry.unit.file(), Arc::clone(&scopes));
                scopes
            }
        };
        entry.scopes = Some(Arc::clone(&scopes));
        Ok(scopes)
    }

    fn finalize(&mut self, line: LineId, state: LineState) -> Result<(), SessionError> {
        let entry = self.line_mut(line)?;
        if !entry.is_pending() {
            return Err(SessionError::AlreadyFinalized(line));
        }
        entry.state = state;
        Ok(())
    }

    /// Record that `line` analyzed cleanly; `post_scope` becomes the base
    /// for later lines.
    pub fn mark_successful(&mut self, line: LineId, post_scope: Arc<LexicalScope>) -> Result<(), SessionError> {
        self.finalize(line, LineState::Successful(post_scope))?;
        self.last_successful = Some(line);
        tracing::debug!(session = %self.id, line = ?line, "line successful");
        Ok(())
    }

    pub fn mark_failed(&mut self, line: LineId) -> Result<(), SessionError> {
        self.finalize(line, LineState::Failed)?;
        tracing::debug!(session = %self.id, line = ?line, "line failed");
        Ok(())
    }
}

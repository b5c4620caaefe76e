// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history built from recordable commands.
//!
//! A command captures whatever it needs to reverse itself while it is
//! applied. The recorder owns executed commands on two bounded stacks; there
//! is one recorder per editing session.
//!
//! Commands can also be gathered into an open transaction with
//! [`CommandRecorder::begin_transaction`]. A committed transaction becomes a
//! single undo entry; a rolled-back one is undone and never reaches history.

use montage_timeline::TimeRange;
use std::collections::VecDeque;

/// Maximum undo history depth
pub const MAX_HISTORY: usize = 100;

/// An edit that can be applied, undone and redone on a target
pub trait RecordableCommand<T>: Send {
    /// Human-readable description, shown in undo/redo menus
    fn description(&self) -> &str;

    /// Perform the edit
    fn apply(&mut self, target: &mut T);

    /// Reverse the edit
    fn undo(&mut self, target: &mut T);

    /// Perform the edit again after an undo
    fn redo(&mut self, target: &mut T) {
        self.apply(target);
    }

    /// Time ranges whose rendering is invalidated by this edit
    fn affected_ranges(&self) -> Vec<TimeRange> {
        Vec::new()
    }
}

/// Several commands recorded as one history entry
pub struct CompositeCommand<T> {
    description: String,
    commands: Vec<Box<dyn RecordableCommand<T>>>,
}

impl<T> CompositeCommand<T> {
    /// Create an empty composite
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            commands: Vec::new(),
        }
    }

    /// Append a command
    pub fn push(&mut self, command: impl RecordableCommand<T> + 'static) {
        self.commands.push(Box::new(command));
    }

    /// Append a command, builder style
    pub fn with(mut self, command: impl RecordableCommand<T> + 'static) -> Self {
        self.push(command);
        self
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the composite has no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn from_commands(description: impl Into<String>, commands: Vec<Box<dyn RecordableCommand<T>>>) -> Self {
        Self {
            description: description.into(),
            commands,
        }
    }
}

impl<T> std::fmt::Debug for CompositeCommand<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeCommand")
            .field("description", &self.description)
            .field("len", &self.commands.len())
            .finish()
    }
}

impl<T> RecordableCommand<T> for CompositeCommand<T> {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&mut self, target: &mut T) {
        for command in &mut self.commands {
            command.apply(target);
        }
    }

    fn undo(&mut self, target: &mut T) {
        for command in self.commands.iter_mut().rev() {
            command.undo(target);
        }
    }

    fn redo(&mut self, target: &mut T) {
        for command in &mut self.commands {
            command.redo(target);
        }
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.commands.iter().flat_map(|c| c.affected_ranges()).collect()
    }
}

/// History statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    /// Commands in the undo stack
    pub undo_count: usize,
    /// Commands in the redo stack
    pub redo_count: usize,
    /// Maximum history depth
    pub max_depth: usize,
    /// Commands recorded in the open transaction
    pub pending_count: usize,
}

/// Undo/redo stacks of executed commands
pub struct CommandRecorder<T> {
    undo_stack: VecDeque<Box<dyn RecordableCommand<T>>>,
    redo_stack: VecDeque<Box<dyn RecordableCommand<T>>>,
    transaction: Option<Vec<Box<dyn RecordableCommand<T>>>>,
    max_depth: usize,
}

impl<T: 'static> CommandRecorder<T> {
    /// Create a recorder with the default depth
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            transaction: None,
            max_depth,
        }
    }

    /// Change the depth bound, dropping the oldest entries if needed
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
        self.enforce_depth();
    }

    /// Apply `command` to `target` and push it onto the undo stack.
    ///
    /// Recording a new command discards everything that could be redone.
    /// While a transaction is open the command joins it instead.
    pub fn do_and_record(&mut self, mut command: Box<dyn RecordableCommand<T>>, target: &mut T) {
        command.apply(target);

        if let Some(pending) = &mut self.transaction {
            tracing::debug!(description = command.description(), "command recorded in transaction");
            pending.push(command);
            return;
        }

        tracing::debug!(description = command.description(), "command executed");
        self.push_executed(command);
    }

    /// Open a transaction; false if one is already open
    pub fn begin_transaction(&mut self) -> bool {
        if self.transaction.is_some() {
            return false;
        }
        self.transaction = Some(Vec::new());
        tracing::trace!("transaction opened");
        true
    }

    /// Whether a transaction is open
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Apply `command` as part of the open transaction, opening one if needed
    pub fn record(&mut self, command: Box<dyn RecordableCommand<T>>, target: &mut T) {
        self.begin_transaction();
        self.do_and_record(command, target);
    }

    /// Close the open transaction and push it as one undo entry.
    ///
    /// Returns `None` without touching history when no transaction is open or
    /// nothing was recorded in it.
    pub fn commit(&mut self, description: impl Into<String>) -> Option<&dyn RecordableCommand<T>> {
        let commands = self.transaction.take()?;
        if commands.is_empty() {
            tracing::trace!("empty transaction discarded");
            return None;
        }

        let composite = CompositeCommand::from_commands(description, commands);
        tracing::debug!(description = composite.description(), len = composite.len(), "transaction committed");
        self.push_executed(Box::new(composite));
        self.undo_stack.back().map(|c| c.as_ref())
    }

    /// Undo everything recorded in the open transaction, newest first, and
    /// close it.
    ///
    /// The undone commands are returned so callers can see what changed.
    pub fn rollback(&mut self, target: &mut T) -> Option<CompositeCommand<T>> {
        let commands = self.transaction.take()?;
        let mut composite = CompositeCommand::from_commands("Rollback", commands);
        composite.undo(target);
        tracing::debug!(len = composite.len(), "transaction rolled back");
        Some(composite)
    }

    /// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// If a transaction is already open, `f` joins it and the outer owner
    /// decides its fate.
    pub fn execute_in_transaction<R, E>(
        &mut self,
        target: &mut T,
        description: impl Into<String>,
        f: impl FnOnce(&mut Self, &mut T) -> Result<R, E>,
    ) -> Result<R, E> {
        if !self.begin_transaction() {
            return f(self, target);
        }

        match f(self, target) {
            Ok(result) => {
                self.commit(description);
                Ok(result)
            }
            Err(e) => {
                self.rollback(target);
                Err(e)
            }
        }
    }

    /// Undo the last command; `None` when there is nothing to undo or a
    /// transaction is open
    pub fn undo(&mut self, target: &mut T) -> Option<&dyn RecordableCommand<T>> {
        if self.in_transaction() {
            tracing::warn!("undo ignored while a transaction is open");
            return None;
        }
        let mut command = self.undo_stack.pop_back()?;
        command.undo(target);
        tracing::debug!(description = command.description(), "command undone");

        self.redo_stack.push_back(command);
        self.redo_stack.back().map(|c| c.as_ref())
    }

    /// Redo the last undone command; `None` when there is nothing to redo or
    /// a transaction is open
    pub fn redo(&mut self, target: &mut T) -> Option<&dyn RecordableCommand<T>> {
        if self.in_transaction() {
            tracing::warn!("redo ignored while a transaction is open");
            return None;
        }
        let mut command = self.redo_stack.pop_back()?;
        command.redo(target);
        tracing::debug!(description = command.description(), "command redone");

        self.undo_stack.push_back(command);
        self.undo_stack.back().map(|c| c.as_ref())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history and drop the open transaction without undoing it
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.transaction = None;
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            max_depth: self.max_depth,
            pending_count: self.transaction.as_ref().map_or(0, Vec::len),
        }
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|c| c.description())
    }

    fn push_executed(&mut self, command: Box<dyn RecordableCommand<T>>) {
        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        self.enforce_depth();
    }

    fn enforce_depth(&mut self) {
        while self.undo_stack.len() > self.max_depth {
            if let Some(old) = self.undo_stack.pop_front() {
                tracing::trace!(description = old.description(), "dropped oldest history entry");
            }
        }
    }
}

impl<T: 'static> Default for CommandRecorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for CommandRecorder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRecorder").field("stats", &self.stats()).finish()
    }
}

//! Variable scopes
//!
//! Frames live in an arena owned by one invocation. Each frame points at its
//! parent by index; lookups and assignments for names a frame does not
//! declare walk up the chain, so inner blocks can update outer variables.
//! Frames are pushed on block entry and truncated away on block exit.

use indexmap::IndexMap;

use prog_types::Value;

use crate::error::ExecutionFault;

/// Index of a frame in a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(usize);

#[derive(Debug)]
struct Frame {
    parent: Option<FrameId>,
    vars: IndexMap<String, Value>,
}

/// Stack-disciplined arena of scope frames.
#[derive(Debug, Default)]
pub struct ScopeArena {
    frames: Vec<Frame>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the top-level frame of an invocation.
    pub fn root(&mut self) -> FrameId {
        self.frames.push(Frame {
            parent: None,
            vars: IndexMap::new(),
        });
        FrameId(self.frames.len() - 1)
    }

    /// Push a block frame chained to `parent`.
    pub fn push(&mut self, parent: FrameId) -> FrameId {
        self.frames.push(Frame {
            parent: Some(parent),
            vars: IndexMap::new(),
        });
        FrameId(self.frames.len() - 1)
    }

    /// Discard `frame` and everything pushed after it.
    pub fn pop(&mut self, frame: FrameId) {
        self.frames.truncate(frame.0);
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in `frame` itself.
    pub fn declare(&mut self, frame: FrameId, name: &str, value: Value) {
        self.frames[frame.0]
            .vars
            .insert(name.to_ascii_lowercase(), value);
    }

    /// Find the frame that binds `name`, starting at `frame`.
    fn owner(&self, frame: FrameId, name: &str) -> Option<FrameId> {
        let mut current = Some(frame);
        while let Some(id) = current {
            let frame = &self.frames[id.0];
            if frame.vars.contains_key(name) {
                return Some(id);
            }
            current = frame.parent;
        }
        None
    }

    pub fn get(&self, frame: FrameId, name: &str) -> Option<&Value> {
        let key = name.to_ascii_lowercase();
        let owner = self.owner(frame, &key)?;
        self.frames[owner.0].vars.get(&key)
    }

    /// Update an existing binding wherever in the chain it lives.
    pub fn assign(&mut self, frame: FrameId, name: &str, value: Value) -> Result<(), ExecutionFault> {
        let key = name.to_ascii_lowercase();
        let owner = self
            .owner(frame, &key)
            .ok_or_else(|| ExecutionFault::UndefinedVariable(name.to_string()))?;
        self.frames[owner.0].vars.insert(key, value);
        Ok(())
    }
}

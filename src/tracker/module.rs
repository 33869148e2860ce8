use std::fmt;

use crate::{container::ContainerHeader, engine::ModuleHandle, File, Result};

/// Index of a module inside its [`crate::tracker::ModuleTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) usize);

impl ModuleId {
    /// Position of the module in the tracker's arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a cached module has no compiled handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The module lies on a dependency cycle
    DependencyCycle,
    /// The named dependency failed to resolve
    Dependency(String),
    /// The engine rejected the code segment
    Collaborator,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::DependencyCycle => f.write_str("dependency cycle"),
            FailureReason::Dependency(name) => write!(f, "dependency '{name}' failed"),
            FailureReason::Collaborator => f.write_str("rejected by the engine"),
        }
    }
}

/// Resolution state of a cached module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleState {
    /// Inserted, dependencies still being resolved
    Loading,
    /// Submitted to the engine
    Resolved(ModuleHandle),
    /// Resolution failed; the module stays cached without a handle
    Failed(FailureReason),
}

/// One module owned by the tracker: its bytes, its parsed header and its resolution state.
pub struct Module {
    pub(crate) name: String,
    pub(crate) file: File,
    pub(crate) header: ContainerHeader,
    pub(crate) state: ModuleState,
}

impl Module {
    pub(crate) fn new(name: &str, file: File, header: ContainerHeader) -> Self {
        Module {
            name: name.to_string(),
            file,
            header,
            state: ModuleState::Loading,
        }
    }

    /// The name the module was requested under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed container header.
    #[must_use]
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Declared dependency names, in container order.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.header.dependencies
    }

    /// The complete container bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.file.data()
    }

    /// The code segment.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header does not fit the data.
    pub fn code(&self) -> Result<&[u8]> {
        self.header.code(self.file.data())
    }

    /// Current resolution state.
    #[must_use]
    pub fn state(&self) -> &ModuleState {
        &self.state
    }

    /// The engine handle, once the module is resolved.
    #[must_use]
    pub fn handle(&self) -> Option<ModuleHandle> {
        match self.state {
            ModuleState::Resolved(handle) => Some(handle),
            _ => None,
        }
    }

    /// Whether the module was submitted to the engine.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.handle().is_some()
    }

    /// Whether the module was found on a dependency cycle.
    #[must_use]
    pub fn is_cycle_involved(&self) -> bool {
        matches!(self.state, ModuleState::Failed(FailureReason::DependencyCycle))
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("len", &self.file.len())
            .field("header", &self.header)
            .field("state", &self.state)
            .finish()
    }
}

//! The script engine collaborator.
//!
//! asfscope does not execute or compile scripts. Everything that depends on the engine that
//! produced a module - loading a code segment into a module, the opcode metadata table, the
//! names behind type and function handles - is reached through the [`ScriptEngine`] trait.
//! An application embedding a real engine implements it over its binding; [`MemoryEngine`] is a
//! complete in-memory implementation for tests, tooling and offline snapshots.
//!
//! Engine diagnostics arrive out of band as [`MessageInfo`] values through the message callback.
//! Unless a callback is installed they are forwarded to the `log` facade by [`log_message`].

mod memory;
mod metadata;

use std::{borrow::Cow, fmt};

use log::{error, info, warn};

pub use memory::MemoryEngine;
pub use metadata::{
    EnumInfo, EnumValue, FunctionInfo, ImportInfo, ModuleInfo, ObjectTypeInfo, TypeFlags,
    TypedefInfo,
};

use crate::{bytecode::OpcodeTable, host::Registration, Result};

/// Opaque reference to a module the engine has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleHandle(pub u32);

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Severity of an engine diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Informational
    Information,
    /// Warning
    Warning,
    /// Error
    Error,
}

impl MessageKind {
    /// The fixed-width tag used in message lines.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            MessageKind::Information => "INFO",
            MessageKind::Warning => "WARN",
            MessageKind::Error => "ERR ",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// An engine diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    /// Section (module or file) the message refers to
    pub section: String,
    /// Row, 0 when not applicable
    pub row: i32,
    /// Column, 0 when not applicable
    pub col: i32,
    /// Severity
    pub kind: MessageKind,
    /// Message text
    pub message: String,
}

impl fmt::Display for MessageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) : {} : {}",
            self.section, self.row, self.col, self.kind, self.message
        )
    }
}

/// The default message sink: forwards to `info!`, `warn!` or `error!` by severity.
pub fn log_message(message: &MessageInfo) {
    match message.kind {
        MessageKind::Information => info!("{message}"),
        MessageKind::Warning => warn!("{message}"),
        MessageKind::Error => error!("{message}"),
    }
}

/// A boxed message callback.
pub type MessageCallback = Box<dyn FnMut(&MessageInfo)>;

/// Symbol lookups needed while rendering instructions.
///
/// Every lookup is optional; an unanswered lookup renders as a placeholder.
pub trait SymbolResolver {
    /// Raw bytes of the constant string at `index`.
    fn constant_string(&self, index: u16) -> Option<Cow<'_, [u8]>>;

    /// Name of the registered type behind a type handle.
    fn type_name(&self, handle: u64) -> Option<Cow<'_, str>>;

    /// Declaration of the type with this type id.
    fn type_declaration(&self, type_id: i32) -> Option<Cow<'_, str>>;

    /// Full declaration of the function with this function id.
    fn function_declaration(&self, function_id: i32) -> Option<Cow<'_, str>>;

    /// Full declaration of the function behind a function handle.
    fn function_pointer_declaration(&self, handle: u64) -> Option<Cow<'_, str>>;
}

/// The capabilities asfscope needs from a script engine.
pub trait ScriptEngine: SymbolResolver {
    /// Load a precompiled code segment as a module called `name`.
    ///
    /// Rejections are also reported through the message callback.
    ///
    /// # Errors
    /// Returns [`crate::Error::CollaboratorLoadFailure`] if the engine rejects the code.
    fn load_precompiled(&mut self, name: &str, code: &[u8]) -> Result<ModuleHandle>;

    /// Metadata snapshot of a loaded module.
    fn module_info(&self, handle: ModuleHandle) -> Option<&ModuleInfo>;

    /// The engine's opcode metadata table.
    fn opcode_table(&self) -> &OpcodeTable;

    /// Replace the diagnostic message callback.
    fn set_message_callback(&mut self, callback: MessageCallback);

    /// Register one piece of host API.
    ///
    /// # Errors
    /// Returns [`crate::Error::RegistrationFailure`] if the engine rejects the item.
    fn register(&mut self, registration: &Registration<'_>) -> Result<()>;
}

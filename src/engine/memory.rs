use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    fmt,
};

use log::debug;

use crate::{
    bytecode::{OpcodeTable, PointerWidth},
    engine::{
        log_message, MessageCallback, MessageInfo, MessageKind, ModuleHandle, ModuleInfo,
        ScriptEngine, SymbolResolver,
    },
    host::Registration,
    Error, Result,
};

/// A script engine held entirely in memory.
///
/// The module a name loads as is prepared up front with [`MemoryEngine::with_image`], and the
/// symbols behind handles and ids with the other `with_*` builders. Loading a name without an
/// image is rejected the way a real engine rejects a bad code segment: an `ERR ` diagnostic
/// through the message callback and a [`crate::Error::CollaboratorLoadFailure`].
///
/// Every load request and every accepted registration is recorded, so callers can check what
/// reached the engine.
///
/// # Examples
///
/// ```rust
/// use asfscope::engine::{FunctionInfo, MemoryEngine, ModuleInfo, ScriptEngine};
/// use asfscope::bytecode::PointerWidth;
///
/// let mut engine = MemoryEngine::new(PointerWidth::Bits32).with_image(
///     "main",
///     ModuleInfo {
///         functions: vec![FunctionInfo::new("void main()", vec![10])],
///         ..Default::default()
///     },
/// );
///
/// let handle = engine.load_precompiled("main", &[])?;
/// assert_eq!(engine.module_info(handle).unwrap().functions.len(), 1);
/// assert!(engine.load_precompiled("missing", &[]).is_err());
/// assert_eq!(engine.submissions(), ["main", "missing"]);
/// # Ok::<(), asfscope::Error>(())
/// ```
pub struct MemoryEngine {
    table: OpcodeTable,
    images: HashMap<String, ModuleInfo>,
    modules: Vec<ModuleInfo>,
    submissions: Vec<String>,
    strings: HashMap<u16, Vec<u8>>,
    type_names: HashMap<u64, String>,
    type_declarations: HashMap<i32, String>,
    function_declarations: HashMap<i32, String>,
    function_pointers: HashMap<u64, String>,
    declared: HashSet<String>,
    registrations: Vec<String>,
    callback: Option<MessageCallback>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new(PointerWidth::Bits64)
    }
}

impl fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("images", &self.images.len())
            .field("modules", &self.modules.len())
            .field("submissions", &self.submissions)
            .field("registrations", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

impl MemoryEngine {
    /// Create an empty engine with the standard opcode table for `width`.
    #[must_use]
    pub fn new(width: PointerWidth) -> Self {
        MemoryEngine {
            table: OpcodeTable::standard(width),
            images: HashMap::new(),
            modules: Vec::new(),
            submissions: Vec::new(),
            strings: HashMap::new(),
            type_names: HashMap::new(),
            type_declarations: HashMap::new(),
            function_declarations: HashMap::new(),
            function_pointers: HashMap::new(),
            declared: HashSet::new(),
            registrations: Vec::new(),
            callback: None,
        }
    }

    /// Replace the opcode table.
    #[must_use]
    pub fn with_table(mut self, table: OpcodeTable) -> Self {
        self.table = table;
        self
    }

    /// Prepare the module that loading `name` produces.
    #[must_use]
    pub fn with_image(mut self, name: impl Into<String>, info: ModuleInfo) -> Self {
        self.images.insert(name.into(), info);
        self
    }

    /// Add a constant string.
    #[must_use]
    pub fn with_constant_string(mut self, index: u16, bytes: impl Into<Vec<u8>>) -> Self {
        self.strings.insert(index, bytes.into());
        self
    }

    /// Name the type behind a type handle.
    #[must_use]
    pub fn with_type_name(mut self, handle: u64, name: impl Into<String>) -> Self {
        self.type_names.insert(handle, name.into());
        self
    }

    /// Declare the type with a type id.
    #[must_use]
    pub fn with_type_declaration(mut self, type_id: i32, declaration: impl Into<String>) -> Self {
        self.type_declarations.insert(type_id, declaration.into());
        self
    }

    /// Declare the function with a function id.
    #[must_use]
    pub fn with_function_declaration(
        mut self,
        function_id: i32,
        declaration: impl Into<String>,
    ) -> Self {
        self.function_declarations
            .insert(function_id, declaration.into());
        self
    }

    /// Declare the function behind a function handle.
    #[must_use]
    pub fn with_function_pointer(mut self, handle: u64, declaration: impl Into<String>) -> Self {
        self.function_pointers.insert(handle, declaration.into());
        self
    }

    /// Names passed to [`ScriptEngine::load_precompiled`], in call order.
    #[must_use]
    pub fn submissions(&self) -> &[String] {
        &self.submissions
    }

    /// How often `name` was passed to [`ScriptEngine::load_precompiled`].
    #[must_use]
    pub fn submission_count(&self, name: &str) -> usize {
        self.submissions.iter().filter(|n| *n == name).count()
    }

    /// Accepted registrations, rendered as text, in registration order.
    #[must_use]
    pub fn registrations(&self) -> &[String] {
        &self.registrations
    }

    fn emit(&mut self, message: &MessageInfo) {
        match self.callback.as_mut() {
            Some(callback) => callback(message),
            None => log_message(message),
        }
    }
}

impl SymbolResolver for MemoryEngine {
    fn constant_string(&self, index: u16) -> Option<Cow<'_, [u8]>> {
        self.strings
            .get(&index)
            .map(|bytes| Cow::Borrowed(bytes.as_slice()))
    }

    fn type_name(&self, handle: u64) -> Option<Cow<'_, str>> {
        self.type_names.get(&handle).map(|s| Cow::Borrowed(s.as_str()))
    }

    fn type_declaration(&self, type_id: i32) -> Option<Cow<'_, str>> {
        self.type_declarations
            .get(&type_id)
            .map(|s| Cow::Borrowed(s.as_str()))
    }

    fn function_declaration(&self, function_id: i32) -> Option<Cow<'_, str>> {
        self.function_declarations
            .get(&function_id)
            .map(|s| Cow::Borrowed(s.as_str()))
    }

    fn function_pointer_declaration(&self, handle: u64) -> Option<Cow<'_, str>> {
        self.function_pointers
            .get(&handle)
            .map(|s| Cow::Borrowed(s.as_str()))
    }
}

impl ScriptEngine for MemoryEngine {
    fn load_precompiled(&mut self, name: &str, code: &[u8]) -> Result<ModuleHandle> {
        debug!("Loading '{}' ({} bytes of code)", name, code.len());
        self.submissions.push(name.to_string());

        let Some(info) = self.images.get(name).cloned() else {
            let message = "No precompiled image is available for this module".to_string();
            self.emit(&MessageInfo {
                section: name.to_string(),
                row: 0,
                col: 0,
                kind: MessageKind::Error,
                message: message.clone(),
            });
            return Err(Error::CollaboratorLoadFailure {
                name: name.to_string(),
                message,
            });
        };

        let handle = u32::try_from(self.modules.len())
            .map(ModuleHandle)
            .map_err(|_| Error::Error("Module handle space exhausted".to_string()))?;
        self.modules.push(info);
        Ok(handle)
    }

    fn module_info(&self, handle: ModuleHandle) -> Option<&ModuleInfo> {
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| self.modules.get(index))
    }

    fn opcode_table(&self) -> &OpcodeTable {
        &self.table
    }

    fn set_message_callback(&mut self, callback: MessageCallback) {
        self.callback = Some(callback);
    }

    fn register(&mut self, registration: &Registration<'_>) -> Result<()> {
        let item = registration.to_string();

        if let Some(key) = registration.declared_name() {
            if !self.declared.insert(key) {
                let message = "Name already registered".to_string();
                self.emit(&MessageInfo {
                    section: String::new(),
                    row: 0,
                    col: 0,
                    kind: MessageKind::Error,
                    message: format!("{item}: {message}"),
                });
                return Err(Error::RegistrationFailure { item, message });
            }
        }

        self.registrations.push(item);
        Ok(())
    }
}

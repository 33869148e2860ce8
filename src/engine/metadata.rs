use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Object type flags as reported by the engine
    ///
    /// Bits without a name are kept as they are.
    pub struct TypeFlags : u32 {
        /// Reference type
        const REF = 1 << 0;
        /// Value type
        const VALUE = 1 << 1;
        /// Garbage collected
        const GC = 1 << 2;
        /// Plain old data
        const POD = 1 << 3;
        /// No handles allowed
        const NOHANDLE = 1 << 4;
        /// Scoped reference type
        const SCOPED = 1 << 5;
        /// Template type
        const TEMPLATE = 1 << 6;
        /// Value type acting as a handle
        const ASHANDLE = 1 << 7;
        /// Application class
        const APP_CLASS = 1 << 8;
        /// Application class with constructor
        const APP_CLASS_CONSTRUCTOR = 1 << 9;
        /// Application class with destructor
        const APP_CLASS_DESTRUCTOR = 1 << 10;
        /// Application class with assignment operator
        const APP_CLASS_ASSIGNMENT = 1 << 11;
        /// Application class with copy constructor
        const APP_CLASS_COPY_CONSTRUCTOR = 1 << 12;
        /// Application primitive
        const APP_PRIMITIVE = 1 << 13;
        /// Application float
        const APP_FLOAT = 1 << 14;
        /// Application array
        const APP_ARRAY = 1 << 15;
        /// Application class with only integer members
        const APP_CLASS_ALLINTS = 1 << 16;
        /// Application class with only float members
        const APP_CLASS_ALLFLOATS = 1 << 17;
        /// Reference type without reference counting
        const NOCOUNT = 1 << 18;
        /// Application class aligned to 8 bytes
        const APP_CLASS_ALIGN8 = 1 << 19;
        /// Implicit handle
        const IMPLICIT_HANDLE = 1 << 20;
        /// Declared in script
        const SCRIPT_OBJECT = 1 << 21;
        /// Shared between modules
        const SHARED = 1 << 22;
        /// Cannot be inherited
        const NOINHERIT = 1 << 23;
        /// Function definition
        const FUNCDEF = 1 << 24;
        /// List pattern
        const LIST_PATTERN = 1 << 25;
        /// Enumeration
        const ENUM = 1 << 26;
        /// Template subtype
        const TEMPLATE_SUBTYPE = 1 << 27;
        /// Type alias
        const TYPEDEF = 1 << 28;
        /// Abstract class
        const ABSTRACT = 1 << 29;
        /// Application class aligned to 16 bytes
        const APP_ALIGN16 = 1 << 30;

        /// Value class with constructor, destructor, assignment and copy constructor
        const APP_CLASS_CDAK = Self::APP_CLASS.bits()
            | Self::APP_CLASS_CONSTRUCTOR.bits()
            | Self::APP_CLASS_DESTRUCTOR.bits()
            | Self::APP_CLASS_ASSIGNMENT.bits()
            | Self::APP_CLASS_COPY_CONSTRUCTOR.bits();
    }
}

impl Default for TypeFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl TypeFlags {
    /// Interpret raw engine flags, keeping unknown bits.
    #[must_use]
    pub fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

/// One named enumeration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Value name
    pub name: String,
    /// Numeric value
    pub value: i32,
}

/// An enumeration declared by a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumInfo {
    /// Enumeration name
    pub name: String,
    /// Declaring namespace, empty for the global namespace
    pub namespace: String,
    /// Name of the underlying registered type, if the engine knows one
    pub type_name: Option<String>,
    /// Values in declaration order
    pub values: Vec<EnumValue>,
}

/// A type alias declared by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefInfo {
    /// Alias name
    pub name: String,
    /// Type id of the aliased type
    pub type_id: i32,
}

/// An object type declared by a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectTypeInfo {
    /// Type name
    pub name: String,
    /// Size in bytes
    pub size: u32,
    /// Type flags
    pub flags: TypeFlags,
    /// Property declarations
    pub properties: Vec<String>,
}

/// A function imported from another module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Function declaration
    pub declaration: String,
    /// Name of the module the function is bound from
    pub source_module: String,
}

/// A script function and its bytecode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Full declaration, including namespace and parameter names
    pub declaration: String,
    /// Code words of the function body
    pub bytecode: Vec<u32>,
}

impl FunctionInfo {
    /// Create a function from its declaration and code words.
    pub fn new(declaration: impl Into<String>, bytecode: Vec<u32>) -> Self {
        FunctionInfo {
            declaration: declaration.into(),
            bytecode,
        }
    }
}

/// Snapshot of everything a loaded module declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Enumerations
    pub enums: Vec<EnumInfo>,
    /// Type aliases
    pub typedefs: Vec<TypedefInfo>,
    /// Object types
    pub object_types: Vec<ObjectTypeInfo>,
    /// Global variable declarations
    pub globals: Vec<String>,
    /// Imported functions
    pub imports: Vec<ImportInfo>,
    /// Script functions
    pub functions: Vec<FunctionInfo>,
}

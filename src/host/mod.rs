//! Host API registration.
//!
//! A precompiled module can only be loaded into an engine that exposes the same application
//! interface the module was compiled against: the same namespaces, object types, methods and
//! globals. The host describes that interface in a JSON manifest; [`HostManifest`] reads it and
//! turns it into an ordered sequence of [`Registration`] items for [`crate::engine::ScriptEngine::register`].
//!
//! # Manifest format
//!
//! Every section is optional and every entry carries the namespace it is registered in:
//!
//! ```json
//! {
//!     "namespaces":        [{ "namespace": "game" }],
//!     "enums":             [{ "namespace": "game", "name": "Team", "values": [{ "name": "Red", "value": 0 }] }],
//!     "object_types":      [{ "namespace": "game", "object_name": "Actor", "size": 0, "flags": 1 }],
//!     "object_properties": [{ "namespace": "game", "object_name": "Actor", "declaration": "int hp", "offset": 8 }],
//!     "object_behaviours": [{ "namespace": "game", "object_name": "Actor", "behaviour": 3, "declaration": "void f()", "calling_convention": 2 }],
//!     "object_methods":    [{ "namespace": "game", "object_name": "Actor", "declaration": "void kill()", "global": 0 }],
//!     "global_functions":  [{ "namespace": "game", "declaration": "Actor@ spawn()" }],
//!     "global_properties": [{ "namespace": "", "declaration": "int frame" }]
//! }
//! ```

use std::{fmt, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    engine::{ScriptEngine, TypeFlags},
    Error, Result,
};

/// Type aliases every host registers, globally and again inside each manifest namespace.
pub const STANDARD_TYPEDEFS: &[(&str, &str)] = &[
    ("f64", "double"),
    ("f32", "float"),
    ("s64", "int64"),
    ("u64", "uint64"),
    ("s32", "int"),
    ("u32", "uint"),
    ("s16", "int16"),
    ("u16", "uint16"),
    ("s8", "int8"),
    ("u8", "uint8"),
    ("AsHandle", "uint64"),
    ("OSTime", "int64"),
];

/// A namespace that receives its own copy of [`STANDARD_TYPEDEFS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    /// Namespace name
    pub namespace: String,
}

/// A named enumeration value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueEntry {
    /// Value name
    pub name: String,
    /// Numeric value
    pub value: i32,
}

/// An enumeration with its values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumEntry {
    /// Namespace
    pub namespace: String,
    /// Enumeration name
    pub name: String,
    /// Values
    pub values: Vec<EnumValueEntry>,
}

/// An application object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectTypeEntry {
    /// Namespace
    pub namespace: String,
    /// Type name
    pub object_name: String,
    /// Size in bytes, 0 for reference types
    pub size: i32,
    /// Raw engine type flags
    pub flags: u32,
}

/// A property of an object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPropertyEntry {
    /// Namespace
    pub namespace: String,
    /// Owning type
    pub object_name: String,
    /// Property declaration
    pub declaration: String,
    /// Byte offset inside the object
    pub offset: i32,
}

/// A behaviour (constructor, factory, reference counting, ...) of an object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectBehaviourEntry {
    /// Namespace
    pub namespace: String,
    /// Owning type
    pub object_name: String,
    /// Engine behaviour id
    pub behaviour: u32,
    /// Function declaration
    pub declaration: String,
    /// Engine calling convention id
    pub calling_convention: u32,
}

/// A method of an object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectMethodEntry {
    /// Namespace
    pub namespace: String,
    /// Owning type
    pub object_name: String,
    /// Method declaration
    pub declaration: String,
    /// Non-zero if the method is implemented by a global function taking the object
    pub global: i32,
}

/// A global function or property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalEntry {
    /// Namespace
    pub namespace: String,
    /// Declaration
    pub declaration: String,
}

/// The host API description a module was compiled against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostManifest {
    /// Namespaces
    pub namespaces: Vec<NamespaceEntry>,
    /// Enumerations
    pub enums: Vec<EnumEntry>,
    /// Object types
    pub object_types: Vec<ObjectTypeEntry>,
    /// Object properties
    pub object_properties: Vec<ObjectPropertyEntry>,
    /// Object behaviours
    pub object_behaviours: Vec<ObjectBehaviourEntry>,
    /// Object methods
    pub object_methods: Vec<ObjectMethodEntry>,
    /// Global functions
    pub global_functions: Vec<GlobalEntry>,
    /// Global properties
    pub global_properties: Vec<GlobalEntry>,
}

impl HostManifest {
    /// Parse a manifest from JSON text.
    ///
    /// # Errors
    /// Returns [`crate::Error::Manifest`] if the text is not a valid manifest.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Manifest(e.to_string()))
    }

    /// Read a manifest from a JSON file.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read and
    /// [`crate::Error::Manifest`] if it is not a valid manifest.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Every registration the manifest describes, in registration order.
    ///
    /// The standard typedefs come first, followed by the per-namespace typedefs, enumerations
    /// with their values, object types, properties, behaviours, methods, global functions and
    /// global properties.
    #[must_use]
    pub fn registrations(&self) -> Vec<Registration<'_>> {
        let mut items = Vec::new();

        let namespaces =
            std::iter::once("").chain(self.namespaces.iter().map(|n| n.namespace.as_str()));
        for namespace in namespaces {
            items.extend(
                STANDARD_TYPEDEFS
                    .iter()
                    .map(|&(name, aliased)| Registration::Typedef {
                        namespace,
                        name,
                        aliased,
                    }),
            );
        }

        for entry in &self.enums {
            items.push(Registration::Enum {
                namespace: &entry.namespace,
                name: &entry.name,
            });
            items.extend(entry.values.iter().map(|value| Registration::EnumValue {
                namespace: &entry.namespace,
                enum_name: &entry.name,
                name: &value.name,
                value: value.value,
            }));
        }

        items.extend(self.object_types.iter().map(|e| Registration::ObjectType {
            namespace: &e.namespace,
            name: &e.object_name,
            size: e.size,
            flags: TypeFlags::from_raw(e.flags),
        }));
        items.extend(
            self.object_properties
                .iter()
                .map(|e| Registration::ObjectProperty {
                    namespace: &e.namespace,
                    object: &e.object_name,
                    declaration: &e.declaration,
                    offset: e.offset,
                }),
        );
        items.extend(
            self.object_behaviours
                .iter()
                .map(|e| Registration::ObjectBehaviour {
                    namespace: &e.namespace,
                    object: &e.object_name,
                    behaviour: e.behaviour,
                    declaration: &e.declaration,
                    calling_convention: e.calling_convention,
                }),
        );
        items.extend(self.object_methods.iter().map(|e| Registration::ObjectMethod {
            namespace: &e.namespace,
            object: &e.object_name,
            declaration: &e.declaration,
            global: e.global != 0,
        }));
        items.extend(
            self.global_functions
                .iter()
                .map(|e| Registration::GlobalFunction {
                    namespace: &e.namespace,
                    declaration: &e.declaration,
                }),
        );
        items.extend(
            self.global_properties
                .iter()
                .map(|e| Registration::GlobalProperty {
                    namespace: &e.namespace,
                    declaration: &e.declaration,
                }),
        );

        items
    }

    /// Register everything with `engine`, stopping at the first rejection.
    ///
    /// Returns the number of registered items.
    ///
    /// # Errors
    /// Returns the engine's error for the first rejected item.
    pub fn apply(&self, engine: &mut dyn ScriptEngine) -> Result<usize> {
        let items = self.registrations();
        for item in &items {
            engine.register(item)?;
        }

        debug!("Registered {} host API items", items.len());
        Ok(items.len())
    }
}

/// One piece of host API, borrowed from a [`HostManifest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration<'a> {
    /// A type alias
    Typedef {
        /// Namespace
        namespace: &'a str,
        /// Alias name
        name: &'a str,
        /// Aliased type
        aliased: &'a str,
    },
    /// An enumeration
    Enum {
        /// Namespace
        namespace: &'a str,
        /// Enumeration name
        name: &'a str,
    },
    /// A value of a previously registered enumeration
    EnumValue {
        /// Namespace
        namespace: &'a str,
        /// Enumeration name
        enum_name: &'a str,
        /// Value name
        name: &'a str,
        /// Numeric value
        value: i32,
    },
    /// An object type
    ObjectType {
        /// Namespace
        namespace: &'a str,
        /// Type name
        name: &'a str,
        /// Size in bytes
        size: i32,
        /// Type flags
        flags: TypeFlags,
    },
    /// An object property
    ObjectProperty {
        /// Namespace
        namespace: &'a str,
        /// Owning type
        object: &'a str,
        /// Declaration
        declaration: &'a str,
        /// Byte offset
        offset: i32,
    },
    /// An object behaviour
    ObjectBehaviour {
        /// Namespace
        namespace: &'a str,
        /// Owning type
        object: &'a str,
        /// Behaviour id
        behaviour: u32,
        /// Declaration
        declaration: &'a str,
        /// Calling convention id
        calling_convention: u32,
    },
    /// An object method
    ObjectMethod {
        /// Namespace
        namespace: &'a str,
        /// Owning type
        object: &'a str,
        /// Declaration
        declaration: &'a str,
        /// Implemented by a global function taking the object
        global: bool,
    },
    /// A global function
    GlobalFunction {
        /// Namespace
        namespace: &'a str,
        /// Declaration
        declaration: &'a str,
    },
    /// A global property
    GlobalProperty {
        /// Namespace
        namespace: &'a str,
        /// Declaration
        declaration: &'a str,
    },
}

impl Registration<'_> {
    /// The namespace the item is registered in.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            Registration::Typedef { namespace, .. }
            | Registration::Enum { namespace, .. }
            | Registration::EnumValue { namespace, .. }
            | Registration::ObjectType { namespace, .. }
            | Registration::ObjectProperty { namespace, .. }
            | Registration::ObjectBehaviour { namespace, .. }
            | Registration::ObjectMethod { namespace, .. }
            | Registration::GlobalFunction { namespace, .. }
            | Registration::GlobalProperty { namespace, .. } => *namespace,
        }
    }

    /// The qualified type name this item declares, for items that declare a type.
    #[must_use]
    pub fn declared_name(&self) -> Option<String> {
        match self {
            Registration::Typedef {
                namespace, name, ..
            }
            | Registration::Enum { namespace, name }
            | Registration::ObjectType {
                namespace, name, ..
            } => Some(Qualified(namespace, name).to_string()),
            _ => None,
        }
    }
}

struct Qualified<'a>(&'a str, &'a str);

impl fmt::Display for Qualified<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str(self.1)
        } else {
            write!(f, "{}::{}", self.0, self.1)
        }
    }
}

impl fmt::Display for Registration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Typedef {
                namespace,
                name,
                aliased,
            } => write!(f, "typedef {aliased} {}", Qualified(namespace, name)),
            Registration::Enum { namespace, name } => {
                write!(f, "enum {}", Qualified(namespace, name))
            }
            Registration::EnumValue {
                namespace,
                enum_name,
                name,
                value,
            } => write!(
                f,
                "enum {}::{name} = {value}",
                Qualified(namespace, enum_name)
            ),
            Registration::ObjectType {
                namespace,
                name,
                size,
                flags,
            } => write!(
                f,
                "object {} {size} {:08x}",
                Qualified(namespace, name),
                flags.bits()
            ),
            Registration::ObjectProperty {
                namespace,
                object,
                declaration,
                offset,
            } => write!(
                f,
                "property {} {declaration} @{offset}",
                Qualified(namespace, object)
            ),
            Registration::ObjectBehaviour {
                namespace,
                object,
                behaviour,
                declaration,
                calling_convention,
            } => write!(
                f,
                "behaviour {} {behaviour} {declaration} conv:{calling_convention}",
                Qualified(namespace, object)
            ),
            Registration::ObjectMethod {
                namespace,
                object,
                declaration,
                global,
            } => {
                write!(f, "method {} {declaration}", Qualified(namespace, object))?;
                if *global {
                    f.write_str(" (global)")?;
                }
                Ok(())
            }
            Registration::GlobalFunction {
                namespace,
                declaration,
            } => write!(f, "function {}", Qualified(namespace, declaration)),
            Registration::GlobalProperty {
                namespace,
                declaration,
            } => write!(f, "global {}", Qualified(namespace, declaration)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;

    const MANIFEST: &str = r#"{
        "namespaces": [{ "namespace": "game" }],
        "object_types": [
            { "namespace": "game", "object_name": "Actor", "size": 0, "flags": 1 }
        ],
        "object_properties": [
            { "namespace": "game", "object_name": "Actor", "declaration": "int hp", "offset": 8 }
        ],
        "object_behaviours": [
            { "namespace": "game", "object_name": "Actor", "behaviour": 4, "declaration": "void f()", "calling_convention": 3 }
        ],
        "object_methods": [
            { "namespace": "game", "object_name": "Actor", "declaration": "void kill()", "global": 1 }
        ],
        "global_functions": [{ "namespace": "game", "declaration": "Actor@ spawn()" }],
        "global_properties": [{ "namespace": "", "declaration": "int frame" }]
    }"#;

    #[test]
    fn registration_order() {
        let manifest = HostManifest::from_json(MANIFEST).unwrap();
        let items: Vec<String> = manifest
            .registrations()
            .iter()
            .map(ToString::to_string)
            .collect();

        let typedefs = STANDARD_TYPEDEFS.len();
        assert_eq!(items.len(), typedefs * 2 + 6);
        assert_eq!(items[0], "typedef double f64");
        assert_eq!(items[typedefs], "typedef double game::f64");
        assert_eq!(
            &items[typedefs * 2..],
            [
                "object game::Actor 0 00000001",
                "property game::Actor int hp @8",
                "behaviour game::Actor 4 void f() conv:3",
                "method game::Actor void kill() (global)",
                "function game::Actor@ spawn()",
                "global int frame",
            ]
        );
    }

    #[test]
    fn enums_with_values() {
        let manifest = HostManifest {
            enums: vec![EnumEntry {
                namespace: String::new(),
                name: "Team".to_string(),
                values: vec![
                    EnumValueEntry {
                        name: "Red".to_string(),
                        value: 0,
                    },
                    EnumValueEntry {
                        name: "Blue".to_string(),
                        value: 1,
                    },
                ],
            }],
            ..Default::default()
        };

        let items = manifest.registrations();
        let tail: Vec<String> = items[STANDARD_TYPEDEFS.len()..]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(tail, ["enum Team", "enum Team::Red = 0", "enum Team::Blue = 1"]);
    }

    #[test]
    fn apply_to_engine() {
        let manifest = HostManifest::from_json(MANIFEST).unwrap();
        let mut engine = MemoryEngine::default();

        let count = manifest.apply(&mut engine).unwrap();
        assert_eq!(count, engine.registrations().len());
        assert_eq!(engine.registrations().last().unwrap(), "global int frame");
    }

    #[test]
    fn apply_stops_on_rejection() {
        let manifest = HostManifest::from_json(
            r#"{ "object_types": [
                { "namespace": "", "object_name": "Actor", "size": 0, "flags": 1 },
                { "namespace": "", "object_name": "Actor", "size": 0, "flags": 1 }
            ], "global_properties": [{ "declaration": "int frame" }] }"#,
        )
        .unwrap();
        let mut engine = MemoryEngine::default();

        assert!(matches!(
            manifest.apply(&mut engine),
            Err(Error::RegistrationFailure { .. })
        ));
        assert!(!engine.registrations().iter().any(|r| r == "global int frame"));
    }

    #[test]
    fn empty_and_invalid() {
        let manifest = HostManifest::from_json("{}").unwrap();
        assert_eq!(manifest.registrations().len(), STANDARD_TYPEDEFS.len());

        assert!(matches!(
            HostManifest::from_json("{ \"object_types\": 3 }"),
            Err(Error::Manifest(_))
        ));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.json");
        std::fs::write(&path, MANIFEST).unwrap();

        let manifest = HostManifest::from_file(&path).unwrap();
        assert_eq!(manifest.object_types[0].object_name, "Actor");

        assert!(matches!(
            HostManifest::from_file(&dir.path().join("missing.json")),
            Err(Error::FileError(_))
        ));
    }
}

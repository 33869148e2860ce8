use thiserror::Error;

use crate::engine::ModuleHandle;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! malformed_container {
    ($msg:expr) => {
        crate::Error::MalformedContainer {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::MalformedContainer {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants fall into three groups: container and file level failures raised while a module
/// is read and parsed, resolution failures raised by the [`crate::tracker::ModuleTracker`], and
/// decoding failures raised while an instruction stream is turned into text.
///
/// # Examples
///
/// ```rust
/// use asfscope::{container::ContainerHeader, Error};
///
/// match ContainerHeader::parse(b"MZ\x90\x00") {
///     Err(Error::MalformedContainer { message, .. }) => println!("rejected: {message}"),
///     Err(other) => println!("unexpected: {other}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The container could not be parsed.
    ///
    /// Raised for a wrong magic marker, a header or dependency table that runs past the end of
    /// the buffer, or a code segment that lies outside the buffer.
    #[error("Malformed container - {file}:{line}: {message}")]
    MalformedContainer {
        /// The message to be printed for the malformed container
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Damaged instruction stream or opcode metadata.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A read would have gone past the end of the buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The bytes of a named module could not be loaded from its source.
    #[error("Module '{name}' could not be loaded: {source}")]
    DependencyNotFound {
        /// Name of the module that was requested
        name: String,
        /// The underlying I/O failure
        source: std::io::Error,
    },

    /// A module transitively requested itself while it was still being resolved.
    ///
    /// The chain starts and ends with the module that was found mid-resolution.
    #[error("Dependency cycle detected: {}", cycle.join(" -> "))]
    DependencyCycle {
        /// The chain of module names forming the cycle
        cycle: Vec<String>,
    },

    /// A cached module whose earlier resolution failed was requested again.
    #[error("Module '{name}' is cached but failed to resolve")]
    ModuleUnavailable {
        /// Name of the failed module
        name: String,
    },

    /// The script engine rejected a code segment.
    #[error("Engine rejected module '{name}': {message}")]
    CollaboratorLoadFailure {
        /// Name of the rejected module
        name: String,
        /// Reason reported by the engine
        message: String,
    },

    /// The script engine rejected a host registration.
    #[error("Engine rejected registration '{item}': {message}")]
    RegistrationFailure {
        /// The rejected item
        item: String,
        /// Reason reported by the engine
        message: String,
    },

    /// An opcode declares an operand shape that the decoder does not know.
    ///
    /// This aborts the whole disassembly run.
    #[error("Opcode 0x{opcode:02x} at {position:04x} declares unknown operand shape {shape}")]
    UnknownInstructionShape {
        /// The opcode value
        opcode: u8,
        /// The raw shape tag from the opcode table
        shape: u8,
        /// Word position of the instruction
        position: usize,
    },

    /// The opcode metadata table failed start-up validation.
    #[error("Invalid opcode table - {0}")]
    OpcodeTable(String),

    /// The engine does not own a module with this handle.
    #[error("Unknown module handle {0}")]
    UnknownModule(ModuleHandle),

    /// A host registration manifest could not be read.
    #[error("Invalid host manifest - {0}")]
    Manifest(String),

    /// Generic I/O failure.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

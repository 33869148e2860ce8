// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # asfscope
//!
//! Loader, dependency resolver and disassembler for precompiled AngelScript modules packaged in
//! ASF containers.
//!
//! An ASF container holds one precompiled module plus the names of the modules it depends on.
//! `asfscope` parses the container, resolves the dependency tree through a single module cache,
//! submits every code segment to a script engine and renders the loaded modules as text.
//!
//! ## Features
//!
//! - **Container parsing** - Bounds-checked header and dependency table parsing, plus a builder
//!   for writing containers
//! - **Dependency resolution** - One cached load per module name, with explicit cycle reporting
//! - **Bytecode decoding** - Every operand layout of the engine's instruction set, with
//!   opcode-specific rendering of strings, floats, symbols and jumps
//! - **Engine independence** - Everything engine specific sits behind [`engine::ScriptEngine`]
//! - **Memory-mapped access** - Modules on disk are mapped rather than read
//!
//! ## Quick Start
//!
//! ```rust
//! use asfscope::prelude::*;
//!
//! let source = MemorySource::new()
//!     .with("main.asf", ContainerBuilder::new().dependency("lib.asf").build()?)
//!     .with("lib.asf", ContainerBuilder::new().build()?);
//! let engine = MemoryEngine::default()
//!     .with_image("main.asf", ModuleInfo::default())
//!     .with_image("lib.asf", ModuleInfo::default());
//!
//! let mut tracker = ModuleTracker::builder().source(source).build(engine);
//! let main = tracker.resolve("main.asf")?;
//! let handle = tracker.module(main).and_then(Module::handle).unwrap();
//!
//! let report = Disassembler::new(tracker.engine())?.render(handle)?;
//! print!("{report}");
//! # Ok::<(), asfscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`container`] - The ASF container format
//! - [`tracker`] - Module cache, dependency resolution and graph discovery
//! - [`engine`] - The script engine collaborator and an in-memory engine
//! - [`host`] - Host API registration manifests
//! - [`bytecode`] - Instruction decoding and rendering
//! - [`disassembler`] - Whole module dumps
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result`], carrying an [`Error`] that names what went wrong:
//! malformed containers, missing modules, dependency cycles, engine rejections and damaged
//! instruction streams.
//!
//! ## Logging
//!
//! The library logs through the [`log`](https://docs.rs/log) facade. Cache hits, parses and
//! engine submissions are logged at `debug`, cycles and unresolved symbols at `warn`, and every
//! decoded instruction at `trace`.
#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use asfscope::prelude::*;
///
/// let bytes = ContainerBuilder::new().dependency("common.asf").build()?;
/// let header = ContainerHeader::parse(&bytes)?;
/// assert_eq!(header.dependencies, ["common.asf"]);
/// # Ok::<(), asfscope::Error>(())
/// ```
pub mod prelude;

/// The ASF module container format.
///
/// [`container::ContainerHeader::parse`] validates and parses a container;
/// [`container::ContainerBuilder`] writes one.
pub mod container;

/// The script engine collaborator.
pub mod engine;

/// Host API registration manifests.
pub mod host;

/// Module cache and dependency resolution.
pub mod tracker;

/// Bytecode decoding.
///
/// # Key Types
///
/// - [`bytecode::Opcode`] - The recognized opcode set
/// - [`bytecode::OpcodeTable`] - Engine supplied opcode metadata
/// - [`bytecode::Instruction`] - A decoded instruction
///
/// # Main Functions
///
/// - [`bytecode::decode_instruction`] - Decode a single instruction
/// - [`bytecode::decode_one`] - Decode and render a single instruction
/// - [`bytecode::decode_function`] - Decode and render a function body
pub mod bytecode;

/// Module dumps.
pub mod disassembler;

/// `asfscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use asfscope::{container::ContainerHeader, Result};
///
/// fn dependencies(bytes: &[u8]) -> Result<Vec<String>> {
///     Ok(ContainerHeader::parse(bytes)?.dependencies)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `asfscope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use asfscope::{tracker::{MemorySource, ModuleTracker}, engine::MemoryEngine, Error};
///
/// let mut tracker = ModuleTracker::builder()
///     .source(MemorySource::new())
///     .build(MemoryEngine::default());
///
/// match tracker.resolve("missing.asf") {
///     Err(Error::DependencyNotFound { name, .. }) => println!("{name} not found"),
///     Err(Error::DependencyCycle { cycle }) => println!("cycle: {}", cycle.join(" -> ")),
///     Err(e) => println!("Error: {}", e),
///     Ok(_) => println!("Loaded"),
/// }
/// ```
pub use error::Error;

/// Low-level file access and the byte cursor used by the container parser.
///
/// # Example
///
/// ```rust
/// use asfscope::Parser;
///
/// let mut parser = Parser::new(&[0x07, 0x00, 0x00, 0x00]);
/// assert_eq!(parser.read_le::<u32>()?, 7);
/// # Ok::<(), asfscope::Error>(())
/// ```
pub use file::{parser::Parser, File};

/// Bounds-checked little-endian reads and writes at an explicit offset.
///
/// # Example
///
/// ```rust
/// use asfscope::{read_le_at, write_le_at};
///
/// let mut buffer = [0u8; 4];
/// let mut offset = 0;
/// write_le_at(&mut buffer, &mut offset, 0x0403_0201_u32)?;
///
/// let mut offset = 0;
/// assert_eq!(read_le_at::<u16>(&buffer, &mut offset)?, 0x0201);
/// assert_eq!(offset, 2);
/// # Ok::<(), asfscope::Error>(())
/// ```
pub use file::io::{read_le_at, write_le_at, ByteIO};

//! Module cache and dependency resolution.
//!
//! [`ModuleTracker`] is the single owner of every [`Module`] loaded during a run. Resolving a name
//! parses its container, resolves each declared dependency through the same tracker and finally
//! submits the code segment to the [`ScriptEngine`]. Each name is parsed and submitted at most
//! once; later requests return the cached [`ModuleId`].
//!
//! A module is cached as [`ModuleState::Loading`] before its dependencies are resolved. A module
//! that is requested again while still loading closes a cycle, which is reported as
//! [`crate::Error::DependencyCycle`]. Every module on the cycle stays cached as
//! `Failed(FailureReason::DependencyCycle)` and can be listed with
//! [`ModuleTracker::cycle_involved`].
//!
//! [`DependencyGraph`] walks the same containers without an engine, for inspection.
//!
//! # Examples
//!
//! ```rust
//! use asfscope::container::ContainerBuilder;
//! use asfscope::engine::{MemoryEngine, ModuleInfo};
//! use asfscope::tracker::{MemorySource, ModuleTracker};
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
//! assert!(tracker.module(main).unwrap().is_resolved());
//! assert_eq!(tracker.engine().submissions(), ["lib.asf", "main.asf"]);
//! # Ok::<(), asfscope::Error>(())
//! ```

mod graph;
mod module;
mod source;

use std::{collections::HashMap, marker::PhantomData, path::PathBuf};

use log::{debug, warn};

pub use graph::{DependencyGraph, GraphNode, NodeStatus};
pub use module::{FailureReason, Module, ModuleId, ModuleState};
pub use source::{DirectorySource, MemorySource, ModuleSource};

use crate::{container::ContainerHeader, engine::ScriptEngine, Error, Result};

/// Loads modules by name, resolves their dependencies and hands them to the engine.
pub struct ModuleTracker<E: ScriptEngine> {
    engine: E,
    source: Box<dyn ModuleSource>,
    modules: Vec<Module>,
    names: HashMap<String, ModuleId>,
}

/// A module waiting on its dependencies during [`ModuleTracker::resolve`].
struct Frame {
    id: ModuleId,
    /// Index of the next dependency to resolve
    next: usize,
}

impl<E: ScriptEngine> ModuleTracker<E> {
    /// A tracker reading modules from files below `root`.
    pub fn new(engine: E, root: impl Into<PathBuf>) -> Self {
        TrackerBuilder::new().root(root).build(engine)
    }

    /// Start configuring a tracker.
    #[must_use]
    pub fn builder() -> TrackerBuilder<E> {
        TrackerBuilder::new()
    }

    /// Resolve `name` and everything it depends on, dependencies first.
    ///
    /// The walk keeps its own stack of loading modules, so a chain of any depth resolves
    /// without recursion.
    ///
    /// # Errors
    /// - [`crate::Error::DependencyNotFound`] if the source cannot open `name` or a dependency
    /// - [`crate::Error::MalformedContainer`] if a container does not parse; nothing is cached
    /// - [`crate::Error::DependencyCycle`] if `name` transitively depends on itself
    /// - [`crate::Error::ModuleUnavailable`] if `name` is cached from an earlier failure
    /// - [`crate::Error::CollaboratorLoadFailure`] if the engine rejects a code segment
    pub fn resolve(&mut self, name: &str) -> Result<ModuleId> {
        if let Some(&id) = self.names.get(name) {
            return self.cached(id, &[]);
        }

        let root = self.load(name)?;
        let mut stack = vec![Frame { id: root, next: 0 }];

        while let Some(frame) = stack.last_mut() {
            let id = frame.id;
            let Some(dependency) = self.modules[id.0].header.dependencies.get(frame.next).cloned()
            else {
                stack.pop();
                if let Err(error) = self.submit(id) {
                    let rejected = self.modules[id.0].name.clone();
                    return Err(self.unwind(stack, rejected, error));
                }
                if stack.is_empty() {
                    return Ok(id);
                }
                continue;
            };
            frame.next += 1;

            let step = match self.names.get(&dependency).copied() {
                Some(cached) => self.cached(cached, &stack).map(|_| None),
                None => self.load(&dependency).map(Some),
            };
            match step {
                Ok(Some(loaded)) => stack.push(Frame { id: loaded, next: 0 }),
                Ok(None) => {}
                Err(error) => return Err(self.unwind(stack, dependency, error)),
            }
        }

        Ok(root)
    }

    /// Open and parse `name`, then cache it as [`ModuleState::Loading`].
    fn load(&mut self, name: &str) -> Result<ModuleId> {
        let file = self.source.open(name).map_err(|error| match error {
            Error::FileError(source) => Error::DependencyNotFound {
                name: name.to_string(),
                source,
            },
            other => other,
        })?;
        let header = ContainerHeader::parse(file.data())?;
        debug!(
            "Parsed '{}': {} dependencies, {} bytes of code",
            name,
            header.dependencies.len(),
            header.code_size
        );

        let id = ModuleId(self.modules.len());
        self.modules.push(Module::new(name, file, header));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Hand the code segment of a module whose dependencies all resolved to the engine.
    fn submit(&mut self, id: ModuleId) -> Result<()> {
        let module = &self.modules[id.0];
        let submitted = module.header.code(module.file.data()).and_then(|code| {
            debug!(
                "Submitting '{}' ({} bytes) to the engine",
                module.name,
                code.len()
            );
            self.engine.load_precompiled(&module.name, code)
        });

        match submitted {
            Ok(handle) => {
                self.modules[id.0].state = ModuleState::Resolved(handle);
                Ok(())
            }
            Err(error) => {
                warn!("Engine failed to load '{}': {}", module.name, error);
                self.modules[id.0].state = ModuleState::Failed(FailureReason::Collaborator);
                Err(error)
            }
        }
    }

    /// Mark every module still loading as failed, innermost first, and pass `error` on.
    ///
    /// `failed` names the dependency the innermost loading module was waiting for.
    fn unwind(&mut self, mut stack: Vec<Frame>, mut failed: String, error: Error) -> Error {
        while let Some(frame) = stack.pop() {
            let module = &mut self.modules[frame.id.0];
            let on_cycle = matches!(
                &error,
                Error::DependencyCycle { cycle } if cycle.iter().any(|n| *n == module.name)
            );
            module.state = ModuleState::Failed(if on_cycle {
                FailureReason::DependencyCycle
            } else {
                FailureReason::Dependency(failed)
            });
            failed = module.name.clone();
        }
        error
    }

    fn cached(&self, id: ModuleId, stack: &[Frame]) -> Result<ModuleId> {
        let module = &self.modules[id.0];
        match module.state {
            ModuleState::Resolved(_) => {
                debug!("Cache hit for '{}'", module.name);
                Ok(id)
            }
            ModuleState::Loading => {
                let start = stack.iter().position(|f| f.id == id).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..]
                    .iter()
                    .map(|f| self.modules[f.id.0].name.clone())
                    .collect();
                cycle.push(module.name.clone());
                warn!("Dependency cycle: {}", cycle.join(" -> "));
                Err(Error::DependencyCycle { cycle })
            }
            ModuleState::Failed(_) => Err(Error::ModuleUnavailable {
                name: module.name.clone(),
            }),
        }
    }

    /// The module with this id.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.0)
    }

    /// The cached module called `name`, whatever its state.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Module> {
        self.names.get(name).and_then(|&id| self.module(id))
    }

    /// The id of the cached module called `name`.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<ModuleId> {
        self.names.get(name).copied()
    }

    /// Number of cached modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether nothing was cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All cached modules in the order they were first requested.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(index, module)| (ModuleId(index), module))
    }

    /// Cached modules that were found on a dependency cycle.
    pub fn cycle_involved(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|m| m.is_cycle_involved())
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Drop the cache and hand the engine back.
    pub fn into_engine(self) -> E {
        self.engine
    }
}

/// Configuration for a [`ModuleTracker`].
///
/// The engine type is fixed by [`TrackerBuilder::build`].
pub struct TrackerBuilder<E> {
    source: Option<Box<dyn ModuleSource>>,
    engine: PhantomData<fn() -> E>,
}

impl<E> Default for TrackerBuilder<E> {
    fn default() -> Self {
        TrackerBuilder {
            source: None,
            engine: PhantomData,
        }
    }
}

impl<E: ScriptEngine> TrackerBuilder<E> {
    /// A builder that reads from the current directory unless told otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read modules from files below `root`.
    #[must_use]
    pub fn root(self, root: impl Into<PathBuf>) -> Self {
        self.source(DirectorySource::new(root))
    }

    /// Read modules from `source`.
    #[must_use]
    pub fn source(mut self, source: impl ModuleSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Build the tracker around `engine`.
    pub fn build(self, engine: E) -> ModuleTracker<E> {
        ModuleTracker {
            engine,
            source: self
                .source
                .unwrap_or_else(|| Box::new(DirectorySource::default())),
            modules: Vec::new(),
            names: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        container::ContainerBuilder,
        engine::{MemoryEngine, ModuleInfo},
    };

    fn container(dependencies: &[&str]) -> Vec<u8> {
        ContainerBuilder::new()
            .dependencies(dependencies.iter().copied())
            .code(vec![0x5A; 4])
            .build()
            .unwrap()
    }

    fn engine_for(names: &[&str]) -> MemoryEngine {
        names.iter().fold(MemoryEngine::default(), |engine, name| {
            engine.with_image(*name, ModuleInfo::default())
        })
    }

    #[test]
    fn cache_hit_returns_same_module() {
        let source = MemorySource::new()
            .with("main", container(&["lib", "lib"]))
            .with("lib", container(&[]));
        let mut tracker = ModuleTracker::builder()
            .source(source)
            .build(engine_for(&["main", "lib"]));

        let first = tracker.resolve("main").unwrap();
        let second = tracker.resolve("main").unwrap();
        assert_eq!(first, second);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.engine().submission_count("lib"), 1);
        assert_eq!(tracker.engine().submission_count("main"), 1);
    }

    #[test]
    fn missing_module_not_cached() {
        let mut tracker = ModuleTracker::builder()
            .source(MemorySource::new())
            .build(MemoryEngine::default());

        match tracker.resolve("ghost") {
            Err(Error::DependencyNotFound { name, .. }) => assert_eq!(name, "ghost"),
            other => panic!("Expected DependencyNotFound, got {other:?}"),
        }
        assert!(tracker.is_empty());
    }

    #[test]
    fn malformed_module_not_cached() {
        let source = MemorySource::new().with("bad", b"MZ\x90\x00".to_vec());
        let mut tracker = ModuleTracker::builder()
            .source(source)
            .build(MemoryEngine::default());

        assert!(matches!(
            tracker.resolve("bad"),
            Err(Error::MalformedContainer { .. })
        ));
        assert!(tracker.get("bad").is_none());
    }

    #[test]
    fn cycle_is_reported_and_cached() {
        let source = MemorySource::new()
            .with("a", container(&["b"]))
            .with("b", container(&["a"]));
        let mut tracker = ModuleTracker::builder()
            .source(source)
            .build(engine_for(&["a", "b"]));

        match tracker.resolve("a") {
            Err(Error::DependencyCycle { cycle }) => assert_eq!(cycle, ["a", "b", "a"]),
            other => panic!("Expected DependencyCycle, got {other:?}"),
        }

        let involved: Vec<&str> = tracker.cycle_involved().map(Module::name).collect();
        assert_eq!(involved, ["a", "b"]);
        assert!(tracker.engine().submissions().is_empty());

        assert!(matches!(
            tracker.resolve("b"),
            Err(Error::ModuleUnavailable { .. })
        ));
    }

    #[test]
    fn module_above_cycle_fails_on_dependency() {
        let source = MemorySource::new()
            .with("top", container(&["a"]))
            .with("a", container(&["a"]));
        let mut tracker = ModuleTracker::builder()
            .source(source)
            .build(engine_for(&["top", "a"]));

        assert!(tracker.resolve("top").is_err());
        assert_eq!(
            tracker.get("top").unwrap().state(),
            &ModuleState::Failed(FailureReason::Dependency("a".to_string()))
        );
        assert!(tracker.get("a").unwrap().is_cycle_involved());
    }

    #[test]
    fn engine_rejection() {
        let source = MemorySource::new().with("main", container(&[]));
        let mut tracker = ModuleTracker::builder()
            .source(source)
            .build(MemoryEngine::default());

        assert!(matches!(
            tracker.resolve("main"),
            Err(Error::CollaboratorLoadFailure { .. })
        ));
        assert_eq!(
            tracker.get("main").unwrap().state(),
            &ModuleState::Failed(FailureReason::Collaborator)
        );
    }

    #[test]
    fn failure_propagates_through_each_dependent() {
        let source = MemorySource::new()
            .with("top", container(&["mid"]))
            .with("mid", container(&["leaf", "gone"]))
            .with("leaf", container(&[]));
        let mut tracker = ModuleTracker::builder()
            .source(source)
            .build(engine_for(&["top", "mid", "leaf"]));

        assert!(matches!(
            tracker.resolve("top"),
            Err(Error::DependencyNotFound { ref name, .. }) if name == "gone"
        ));
        assert_eq!(
            tracker.get("top").unwrap().state(),
            &ModuleState::Failed(FailureReason::Dependency("mid".to_string()))
        );
        assert_eq!(
            tracker.get("mid").unwrap().state(),
            &ModuleState::Failed(FailureReason::Dependency("gone".to_string()))
        );
        assert!(tracker.get("leaf").unwrap().is_resolved());
        assert!(tracker.get("gone").is_none());
        assert_eq!(tracker.engine().submissions(), ["leaf"]);
    }

    #[test]
    fn deep_chain_resolves() {
        let depth = 20_000;
        let names: Vec<String> = (0..depth).map(|i| format!("m{i}")).collect();
        let mut source = MemorySource::new();
        for (i, name) in names.iter().enumerate() {
            let dependencies: Vec<&str> = names.get(i + 1).map(String::as_str).into_iter().collect();
            source.insert(name.clone(), container(&dependencies));
        }
        let engine = names.iter().fold(MemoryEngine::default(), |engine, name| {
            engine.with_image(name.as_str(), ModuleInfo::default())
        });
        let mut tracker = TrackerBuilder::new().source(source).build(engine);

        let root = tracker.resolve("m0").unwrap();
        assert_eq!(root.index(), 0);
        assert_eq!(tracker.len(), depth);
        assert!(tracker.modules().all(|(_, module)| module.is_resolved()));
        assert_eq!(tracker.engine().submissions().first().map(String::as_str), Some("m19999"));
        assert_eq!(tracker.engine().submissions().last().map(String::as_str), Some("m0"));
    }
}

//! Program registry and active-selection bookkeeping.
//!
//! Every compiled program is keyed by name; the registry also owns the single
//! mutable selection field and the one-shot deep-link override applied at
//! startup. After registration finishes the descriptor set is read-only.

use tracing::{debug, info};

use crate::error::{CompileError, UnknownProgramError};
use crate::schema::UniformSchema;

/// Opaque compilation capability supplied by the GPU shell.
///
/// The engine never sees shader internals; it hands vertex/fragment source to
/// the compiler and stores whatever handle comes back.
pub trait ProgramCompiler {
    type Handle;

    /// Compiles a vertex/fragment pair. The schema is supplied so GPU shells
    /// can derive the uniform-block layout the program will be fed through.
    fn compile(
        &mut self,
        vertex: &str,
        fragment: &str,
        schema: &UniformSchema,
    ) -> Result<Self::Handle, CompileError>;
}

/// A compiled, linked program addressable by name.
#[derive(Debug)]
pub struct ProgramDescriptor<H> {
    pub name: String,
    pub handle: H,
    pub schema: UniformSchema,
}

/// Name-keyed program table plus the active selection.
#[derive(Debug)]
pub struct ProgramRegistry<H> {
    programs: Vec<ProgramDescriptor<H>>,
    active: String,
}

impl<H> ProgramRegistry<H> {
    /// Creates an empty registry with the configured default selection.
    pub fn new(default_name: &str) -> Self {
        Self {
            programs: Vec::new(),
            active: default_name.to_string(),
        }
    }

    /// Compiles and registers a program under a unique name.
    ///
    /// A [`CompileError`] propagates to the caller and is fatal at startup:
    /// the gallery cannot render without its programs.
    pub fn register<C>(
        &mut self,
        compiler: &mut C,
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
        schema: UniformSchema,
    ) -> Result<(), CompileError>
    where
        C: ProgramCompiler<Handle = H>,
    {
        assert!(
            self.lookup(name).is_none(),
            "duplicate program name '{name}'"
        );
        let handle = compiler.compile(vertex_source, fragment_source, &schema)?;
        debug!(program = name, uniforms = schema.len(), "registered program");
        self.programs.push(ProgramDescriptor {
            name: name.to_string(),
            handle,
            schema,
        });
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        self.programs.iter().position(|p| p.name == name)
    }

    /// Resolves a program by name. Callers must not draw with a failed
    /// resolution.
    pub fn resolve(&self, name: &str) -> Result<&ProgramDescriptor<H>, UnknownProgramError> {
        self.lookup(name)
            .map(|index| &self.programs[index])
            .ok_or_else(|| UnknownProgramError(name.to_string()))
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.programs.iter().map(|p| p.name.as_str())
    }

    /// Name of the currently selected program.
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Descriptor of the currently selected program.
    pub fn active_descriptor(&self) -> Result<&ProgramDescriptor<H>, UnknownProgramError> {
        self.resolve(&self.active)
    }

    /// Switches the selection; fails if the name was never registered.
    pub fn select(&mut self, name: &str) -> Result<(), UnknownProgramError> {
        self.resolve(name)?;
        self.active = name.to_string();
        Ok(())
    }

    /// One-shot startup override from a deep link.
    ///
    /// Advisory: applies only when the candidate resolves, otherwise the
    /// configured default stays untouched and no error is raised. Returns
    /// whether the override applied.
    pub fn apply_deep_link_override(&mut self, candidate: &str) -> bool {
        match self.resolve(candidate) {
            Ok(_) => {
                info!(program = candidate, "deep link selected program");
                self.active = candidate.to_string();
                true
            }
            Err(_) => {
                debug!(program = candidate, "ignoring deep link to unknown program");
                false
            }
        }
    }

    /// Cycles the selection forward in registration order.
    pub fn select_next(&mut self) {
        self.cycle(1);
    }

    /// Cycles the selection backward in registration order.
    pub fn select_prev(&mut self) {
        self.cycle(-1);
    }

    fn cycle(&mut self, step: isize) {
        if self.programs.is_empty() {
            return;
        }
        let len = self.programs.len() as isize;
        let current = self.lookup(&self.active).unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(len) as usize;
        self.active = self.programs[next].name.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::UniformType;

    /// Compiles nothing; hands back the concatenated source lengths so tests
    /// can observe that both stages reached the compiler.
    struct StubCompiler {
        fail_with: Option<String>,
    }

    impl StubCompiler {
        fn ok() -> Self {
            Self { fail_with: None }
        }
    }

    impl ProgramCompiler for StubCompiler {
        type Handle = usize;

        fn compile(
            &mut self,
            vertex: &str,
            fragment: &str,
            _schema: &UniformSchema,
        ) -> Result<usize, CompileError> {
            match &self.fail_with {
                Some(log) => Err(CompileError::new(log.clone())),
                None => Ok(vertex.len() + fragment.len()),
            }
        }
    }

    fn schema() -> UniformSchema {
        UniformSchema::new().field("time", UniformType::Float)
    }

    fn registry_with(names: &[&str]) -> ProgramRegistry<usize> {
        let mut compiler = StubCompiler::ok();
        let mut registry = ProgramRegistry::new(names.first().copied().unwrap_or("none"));
        for name in names {
            registry
                .register(&mut compiler, name, "vert", "frag", schema())
                .unwrap();
        }
        registry
    }

    #[test]
    fn register_and_resolve() {
        let registry = registry_with(&["mandelbulb", "kleinian"]);
        assert_eq!(registry.resolve("kleinian").unwrap().name, "kleinian");
        assert_eq!(
            registry.resolve("doesNotExist").unwrap_err(),
            UnknownProgramError("doesNotExist".into())
        );
    }

    #[test]
    fn compile_failure_propagates() {
        let mut compiler = StubCompiler {
            fail_with: Some("0:12 undeclared identifier".into()),
        };
        let mut registry: ProgramRegistry<usize> = ProgramRegistry::new("broken");
        let err = registry
            .register(&mut compiler, "broken", "vert", "frag", schema())
            .unwrap_err();
        assert!(err.log.contains("undeclared identifier"));
        assert_eq!(registry.names().count(), 0);
    }

    #[test]
    fn names_keep_insertion_order() {
        let registry = registry_with(&["basicCubes", "mandelbox", "mandelbulb"]);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["basicCubes", "mandelbox", "mandelbulb"]);
    }

    #[test]
    fn deep_link_applies_only_for_known_names() {
        let mut registry = registry_with(&["basicCubes", "mandelbulb"]);
        assert_eq!(registry.active(), "basicCubes");

        assert!(registry.apply_deep_link_override("mandelbulb"));
        assert_eq!(registry.active(), "mandelbulb");

        assert!(!registry.apply_deep_link_override("doesNotExist"));
        assert_eq!(registry.active(), "mandelbulb");
    }

    #[test]
    fn select_rejects_unknown_names() {
        let mut registry = registry_with(&["basicCubes"]);
        assert!(registry.select("nope").is_err());
        assert_eq!(registry.active(), "basicCubes");
    }

    #[test]
    fn cycling_wraps_in_registration_order() {
        let mut registry = registry_with(&["a", "b", "c"]);
        registry.select_next();
        assert_eq!(registry.active(), "b");
        registry.select_next();
        registry.select_next();
        assert_eq!(registry.active(), "a");
        registry.select_prev();
        assert_eq!(registry.active(), "c");
    }
}

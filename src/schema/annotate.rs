//! Appends the Go package declaration to each included schema file.
//!
//! The declaration is a single line,
//! `option go_package = "<module-path>";`, placed at the end of the file.
//! Files are opened for append only; existing content is never rewritten.
//! A newline is inserted first when the file does not already end in one.

use anyhow::{Context, Result};

use crate::schema::{ModulePath, ModuleResolver, SchemaFile};
use crate::utils::fs::append_to_file;

/// The declaration line for a module, without a trailing newline.
#[must_use]
pub fn module_directive(module: &ModulePath) -> String {
    format!("option go_package = \"{module}\";")
}

/// Resolves and writes module declarations for included files.
#[derive(Debug, Clone)]
pub struct AnnotationWriter {
    resolver: ModuleResolver,
}

impl AnnotationWriter {
    #[must_use]
    pub const fn new(resolver: ModuleResolver) -> Self {
        Self {
            resolver,
        }
    }

    /// Resolves `file`'s module path and appends its declaration.
    ///
    /// `file.contents` is updated to match what is now on disk.
    pub fn annotate(&self, file: &mut SchemaFile) -> Result<ModulePath> {
        let module = self.resolver.resolve(&file.relative);

        let mut text = String::new();
        if !file.contents.is_empty() && !file.contents.ends_with(b"\n") {
            text.push('\n');
        }
        text.push_str(&module_directive(&module));
        text.push('\n');

        append_to_file(&file.absolute, text.as_bytes()).with_context(|| {
            format!("Failed to annotate {} with module {module}", file.relative.display())
        })?;
        file.contents.extend_from_slice(text.as_bytes());

        tracing::debug!("{} -> {}", file.relative.display(), module);
        Ok(module)
    }
}

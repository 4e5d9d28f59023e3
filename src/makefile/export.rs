use std::{io::Write, path::{Path, PathBuf}};

use crate::makefile::Makefile;

/// Makefile text fragments, one entry per variable and per target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contents {
    pub variables: Vec<String>,
    pub targets: Vec<String>,
}

impl Makefile {
    pub fn format_contents(&self) -> Contents {
        let variables = self
            .variables
            .values()
            .map(|variable| {
                format!(
                    "{} {} {}",
                    variable.name,
                    variable.operator,
                    variable.value.join(" ")
                )
            })
            .collect();

        let targets = self
            .targets
            .values()
            .map(|target| {
                let statements = target
                    .statements
                    .iter()
                    .map(|statement| {
                        if statement.starts_with('\t') {
                            statement.clone()
                        } else {
                            format!("\t{statement}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "{}: {}\n{}\n",
                    target.name,
                    target.dependencies.join(" "),
                    statements
                )
            })
            .collect();

        Contents { variables, targets }
    }

    /// Serializes the variables and targets back to Makefile syntax.
    ///
    /// Comments are not written. Parsing the result gives back the same tables.
    pub fn to_makefile_string(&self) -> String {
        let contents = self.format_contents();
        let mut out = String::new();
        for variable in &contents.variables {
            out.push_str(variable);
            out.push('\n');
        }
        out.push('\n');
        for target in &contents.targets {
            out.push_str(target);
            out.push('\n');
        }
        out
    }

    /// Writes the Makefile to `path`, which must not exist yet.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => ExportError::AlreadyExists(path.to_path_buf()),
                _ => ExportError::Io(path.to_path_buf(), e),
            })?;
        file.write_all(self.to_makefile_string().as_bytes())
            .map_err(|e| ExportError::Io(path.to_path_buf(), e))?;
        log::debug!(
            "exported {} variables and {} targets to {}",
            self.variables.len(),
            self.targets.len(),
            path.display()
        );
        Ok(())
    }

    /// Strips surrounding whitespace from every value token, dependency and statement
    pub fn trim(&mut self) {
        for (_, variable) in self.variables.iter_mut() {
            for token in &mut variable.value {
                *token = token.trim().to_string();
            }
        }
        for (_, target) in self.targets.iter_mut() {
            for dependency in &mut target.dependencies {
                *dependency = dependency.trim().to_string();
            }
            for statement in &mut target.statements {
                *statement = statement.trim().to_string();
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Makefile {} already exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("Failed to write Makefile {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
}

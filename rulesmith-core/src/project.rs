// Project host abstraction
//
// The host IDE owns the project lifecycle and its nature tags. The configurator
// only needs the project directory and a way to query and toggle natures.

use crate::error::{ConfigureError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::{Path, PathBuf};

pub const JAVA_NATURE: &str = "org.eclipse.jdt.core.javanature";
pub const PMD_NATURE: &str = "net.sourceforge.pmd.eclipse.plugin.pmdNature";

pub trait ProjectHost {
    fn root(&self) -> &Path;
    fn has_nature(&self, nature: &str) -> bool;
    fn add_nature(&mut self, nature: &str) -> Result<()>;
    fn remove_nature(&mut self, nature: &str) -> Result<()>;
}

/// Project backed by a directory. Natures are read from an Eclipse `.project`
/// descriptor when one exists; changes are tracked in memory for the host to
/// persist.
#[derive(Debug, Clone)]
pub struct LocalProject {
    root: PathBuf,
    natures: Vec<String>,
}

impl LocalProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            natures: Vec::new(),
        }
    }

    pub fn with_natures<I, S>(mut self, natures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for nature in natures {
            let nature = nature.into();
            if !self.natures.contains(&nature) {
                self.natures.push(nature);
            }
        }
        self
    }

    /// Open a project directory, reading natures from `.project` if present
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let descriptor = root.join(".project");
        let natures = if descriptor.is_file() {
            let content = fs::read_to_string(&descriptor)?;
            read_natures(&content).map_err(|e| ConfigureError::Nature {
                nature: "*".to_string(),
                reason: format!("{}: {e}", descriptor.display()),
            })?
        } else {
            Vec::new()
        };
        Ok(Self::new(root).with_natures(natures))
    }

    pub fn natures(&self) -> &[String] {
        &self.natures
    }
}

impl ProjectHost for LocalProject {
    fn root(&self) -> &Path {
        &self.root
    }

    fn has_nature(&self, nature: &str) -> bool {
        self.natures.iter().any(|n| n == nature)
    }

    fn add_nature(&mut self, nature: &str) -> Result<()> {
        if !self.has_nature(nature) {
            self.natures.push(nature.to_string());
        }
        Ok(())
    }

    fn remove_nature(&mut self, nature: &str) -> Result<()> {
        self.natures.retain(|n| n != nature);
        Ok(())
    }
}

fn read_natures(content: &str) -> quick_xml::Result<Vec<String>> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut natures = Vec::new();
    let mut in_nature = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => in_nature = e.local_name().as_ref() == b"nature",
            Event::End(_) => in_nature = false,
            Event::Text(t) if in_nature => natures.push(t.unescape()?.trim().to_string()),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(natures)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<projectDescription>
    <name>app</name>
    <buildSpec>
        <buildCommand><name>org.eclipse.jdt.core.javabuilder</name></buildCommand>
    </buildSpec>
    <natures>
        <nature>org.eclipse.jdt.core.javanature</nature>
        <nature>org.eclipse.m2e.core.maven2Nature</nature>
    </natures>
</projectDescription>
"#;

    #[test]
    fn test_open_reads_natures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".project"), DESCRIPTOR).unwrap();

        let project = LocalProject::open(dir.path()).unwrap();
        assert!(project.has_nature(JAVA_NATURE));
        assert_eq!(project.natures().len(), 2);
        assert!(!project.has_nature(PMD_NATURE));
    }

    #[test]
    fn test_open_without_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let project = LocalProject::open(dir.path()).unwrap();
        assert!(project.natures().is_empty());
    }

    #[test]
    fn test_add_and_remove_nature() {
        let mut project = LocalProject::new("/tmp/app").with_natures([JAVA_NATURE]);
        project.add_nature(PMD_NATURE).unwrap();
        project.add_nature(PMD_NATURE).unwrap();
        assert_eq!(project.natures().len(), 2);
        project.remove_nature(PMD_NATURE).unwrap();
        project.remove_nature(PMD_NATURE).unwrap();
        assert_eq!(project.natures(), &[JAVA_NATURE.to_string()]);
    }
}

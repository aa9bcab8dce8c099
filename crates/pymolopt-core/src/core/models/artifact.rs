use super::structure::StructureRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// An atomic structure produced by a step, linked to the structure it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomStructArtifact {
    path: PathBuf,
    derived_from: StructureRef,
}

impl AtomStructArtifact {
    pub fn new(path: impl Into<PathBuf>, derived_from: StructureRef) -> Self {
        Self {
            path: path.into(),
            derived_from,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn derived_from(&self) -> &StructureRef {
        &self.derived_from
    }
}

/// A lineage edge from an input structure to a named output of the step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRelation {
    pub source: StructureRef,
    pub output: String,
    pub path: PathBuf,
}

/// Everything a step publishes back to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutputs {
    outputs: BTreeMap<String, AtomStructArtifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    relations: Vec<SourceRelation>,
}

impl StepOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `artifact` under `name`, replacing any previous output of that name.
    pub fn define_output(&mut self, name: &str, artifact: AtomStructArtifact) {
        self.outputs.insert(name.to_string(), artifact);
    }

    /// Records that output `name` was derived from `source`.
    ///
    /// Does nothing if no output of that name has been defined.
    pub fn define_source_relation(&mut self, source: &StructureRef, name: &str) {
        let Some(artifact) = self.outputs.get(name) else {
            return;
        };
        let relation = SourceRelation {
            source: source.clone(),
            output: name.to_string(),
            path: artifact.path().to_path_buf(),
        };
        if !self.relations.contains(&relation) {
            self.relations.push(relation);
        }
    }

    pub fn get(&self, name: &str) -> Option<&AtomStructArtifact> {
        self.outputs.get(name)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn relations(&self) -> &[SourceRelation] {
        &self.relations
    }

    pub fn to_manifest_string(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn write_manifest(&self, path: &Path) -> Result<(), ManifestError> {
        std::fs::write(path, self.to_manifest_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_outputs() -> (StepOutputs, StructureRef) {
        let input = StructureRef::new("/data/in.pdb");
        let mut outputs = StepOutputs::new();
        outputs.define_output(
            "outputPDB",
            AtomStructArtifact::new("/work/extra/optimized.pdb", input.clone()),
        );
        (outputs, input)
    }

    #[test]
    fn source_relation_points_from_input_to_output_path() {
        let (mut outputs, input) = sample_outputs();
        outputs.define_source_relation(&input, "outputPDB");

        assert_eq!(outputs.relations().len(), 1);
        let rel = &outputs.relations()[0];
        assert_eq!(rel.source, input);
        assert_eq!(rel.output, "outputPDB");
        assert_eq!(rel.path, PathBuf::from("/work/extra/optimized.pdb"));
    }

    #[test]
    fn duplicate_relation_is_recorded_once() {
        let (mut outputs, input) = sample_outputs();
        outputs.define_source_relation(&input, "outputPDB");
        outputs.define_source_relation(&input, "outputPDB");
        assert_eq!(outputs.relations().len(), 1);
    }

    #[test]
    fn relation_to_undefined_output_is_ignored() {
        let (mut outputs, input) = sample_outputs();
        outputs.define_source_relation(&input, "missing");
        assert!(outputs.relations().is_empty());
    }

    #[test]
    fn manifest_lists_outputs_and_relations() {
        let (mut outputs, input) = sample_outputs();
        outputs.define_source_relation(&input, "outputPDB");

        let text = outputs.to_manifest_string().unwrap();
        assert!(text.contains("outputPDB"));
        assert!(text.contains("/work/extra/optimized.pdb"));
        assert!(text.contains("/data/in.pdb"));

        let parsed: StepOutputs = toml::from_str(&text).unwrap();
        assert_eq!(parsed, outputs);
    }

    #[test]
    fn write_manifest_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("outputs.toml");
        let (outputs, _) = sample_outputs();

        outputs.write_manifest(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("optimized.pdb"));
    }
}

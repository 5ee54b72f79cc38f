//! Knowledge base
//!
//! Every component reads one JSON dataset. Defaults are compiled into the
//! binary; a data directory may override any of them file by file.

pub mod keywords;
pub mod merge;
pub mod text;

pub use keywords::{KeywordIndex, MatchText};
pub use merge::merge_patch;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::adaptability::context::AdaptationData;
use crate::adaptability::industry::IndustryData;
use crate::adaptability::role::RoleData;
use crate::adaptability::size::SizeData;
use crate::error::{PitchwiseError, Result};
use crate::marketing::capabilities::CapabilityData;
use crate::marketing::differentiators::DifferentiatorData;
use crate::marketing::propositions::PropositionData;
use crate::marketing::roi::RoiData;
use crate::marketing::trust::TrustData;

pub const DATASET_NAMES: [&str; 9] = [
    IndustryData::NAME,
    SizeData::NAME,
    RoleData::NAME,
    AdaptationData::NAME,
    PropositionData::NAME,
    RoiData::NAME,
    CapabilityData::NAME,
    DifferentiatorData::NAME,
    TrustData::NAME,
];

/// A JSON dataset with an embedded default
pub trait Dataset: Serialize + DeserializeOwned + Sized {
    const NAME: &'static str;
    const EMBEDDED: &'static str;

    /// Check the entries the engine falls back on
    fn validate(&self) -> Result<()>;

    fn file_name() -> String {
        format!("{}.json", Self::NAME)
    }

    fn from_json(content: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(content)
            .map_err(|e| PitchwiseError::invalid_dataset(Self::NAME, e.to_string()))?;
        data.validate()?;
        Ok(data)
    }

    fn embedded() -> Result<Self> {
        Self::from_json(Self::EMBEDDED)
    }

    /// Load from `dir` when the file exists and parses, else the embedded default
    fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(path) = dir.map(|d| d.join(Self::file_name())) else {
            return Self::embedded();
        };
        if !path.exists() {
            log::debug!("{} not found, using built-in {} data", path.display(), Self::NAME);
            return Self::embedded();
        }

        let content = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(data) => {
                data.validate()?;
                log::info!("loaded {} data from {}", Self::NAME, path.display());
                Ok(data)
            }
            Err(e) => {
                log::warn!(
                    "could not parse {} ({}), using built-in {} data",
                    path.display(),
                    e,
                    Self::NAME
                );
                Self::embedded()
            }
        }
    }

    fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Self::file_name());
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// The dataset with `patch` merged in; `self` is left untouched on error
    fn merged(&self, patch: &Value) -> Result<Self> {
        let mut value = serde_json::to_value(self)?;
        merge_patch(&mut value, patch);
        let data: Self = serde_json::from_value(value)
            .map_err(|e| PitchwiseError::invalid_dataset(Self::NAME, e.to_string()))?;
        data.validate()?;
        Ok(data)
    }
}

/// All datasets, loaded once and handed to the components that own them
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub industries: IndustryData,
    pub sizes: SizeData,
    pub roles: RoleData,
    pub adaptation: AdaptationData,
    pub propositions: PropositionData,
    pub roi: RoiData,
    pub capabilities: CapabilityData,
    pub differentiators: DifferentiatorData,
    pub trust: TrustData,
}

impl KnowledgeBase {
    pub fn embedded() -> Result<Self> {
        Self::load(None)
    }

    pub fn load(dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            industries: IndustryData::load(dir)?,
            sizes: SizeData::load(dir)?,
            roles: RoleData::load(dir)?,
            adaptation: AdaptationData::load(dir)?,
            propositions: PropositionData::load(dir)?,
            roi: RoiData::load(dir)?,
            capabilities: CapabilityData::load(dir)?,
            differentiators: DifferentiatorData::load(dir)?,
            trust: TrustData::load(dir)?,
        })
    }

    /// Write every dataset to `dir`
    pub fn export(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(vec![
            self.industries.save(dir)?,
            self.sizes.save(dir)?,
            self.roles.save(dir)?,
            self.adaptation.save(dir)?,
            self.propositions.save(dir)?,
            self.roi.save(dir)?,
            self.capabilities.save(dir)?,
            self.differentiators.save(dir)?,
            self.trust.save(dir)?,
        ])
    }

    /// One dataset as JSON
    pub fn dataset(&self, name: &str) -> Result<Value> {
        let value = match name {
            IndustryData::NAME => serde_json::to_value(&self.industries)?,
            SizeData::NAME => serde_json::to_value(&self.sizes)?,
            RoleData::NAME => serde_json::to_value(&self.roles)?,
            AdaptationData::NAME => serde_json::to_value(&self.adaptation)?,
            PropositionData::NAME => serde_json::to_value(&self.propositions)?,
            RoiData::NAME => serde_json::to_value(&self.roi)?,
            CapabilityData::NAME => serde_json::to_value(&self.capabilities)?,
            DifferentiatorData::NAME => serde_json::to_value(&self.differentiators)?,
            TrustData::NAME => serde_json::to_value(&self.trust)?,
            other => return Err(unknown(other)),
        };
        Ok(value)
    }

    /// Merge `patch` into the named dataset in memory
    pub fn update(&mut self, name: &str, patch: &Value) -> Result<()> {
        match name {
            IndustryData::NAME => self.industries = self.industries.merged(patch)?,
            SizeData::NAME => self.sizes = self.sizes.merged(patch)?,
            RoleData::NAME => self.roles = self.roles.merged(patch)?,
            AdaptationData::NAME => self.adaptation = self.adaptation.merged(patch)?,
            PropositionData::NAME => self.propositions = self.propositions.merged(patch)?,
            RoiData::NAME => self.roi = self.roi.merged(patch)?,
            CapabilityData::NAME => self.capabilities = self.capabilities.merged(patch)?,
            DifferentiatorData::NAME => {
                self.differentiators = self.differentiators.merged(patch)?
            }
            TrustData::NAME => self.trust = self.trust.merged(patch)?,
            other => return Err(unknown(other)),
        }
        log::info!("updated {} data", name);
        Ok(())
    }

    /// Persist the named dataset to `dir`
    pub fn save_dataset(&self, name: &str, dir: &Path) -> Result<PathBuf> {
        match name {
            IndustryData::NAME => self.industries.save(dir),
            SizeData::NAME => self.sizes.save(dir),
            RoleData::NAME => self.roles.save(dir),
            AdaptationData::NAME => self.adaptation.save(dir),
            PropositionData::NAME => self.propositions.save(dir),
            RoiData::NAME => self.roi.save(dir),
            CapabilityData::NAME => self.capabilities.save(dir),
            DifferentiatorData::NAME => self.differentiators.save(dir),
            TrustData::NAME => self.trust.save(dir),
            other => Err(unknown(other)),
        }
    }
}

fn unknown(name: &str) -> PitchwiseError {
    PitchwiseError::UnknownDataset {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_embedded_datasets_are_valid() {
        let kb = KnowledgeBase::embedded().unwrap();
        assert_eq!(kb.industries.industries.len(), 8);
        for name in DATASET_NAMES {
            assert!(kb.dataset(name).unwrap().is_object(), "{} is not an object", name);
        }
    }

    #[test]
    fn test_export_then_load_from_dir() {
        let dir = tempdir().unwrap();
        let kb = KnowledgeBase::embedded().unwrap();
        let written = kb.export(dir.path()).unwrap();
        assert_eq!(written.len(), DATASET_NAMES.len());
        assert!(dir.path().join("industries.json").exists());

        let loaded = KnowledgeBase::load(Some(dir.path())).unwrap();
        assert_eq!(
            loaded.dataset("roi_metrics").unwrap(),
            kb.dataset("roi_metrics").unwrap()
        );
    }

    #[test]
    fn test_unparseable_file_falls_back_to_embedded() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("industries.json"), "{ not json").unwrap();
        let data = IndustryData::load(Some(dir.path())).unwrap();
        assert!(data.industry("retail").is_some());
    }

    #[test]
    fn test_file_failing_validation_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("industries.json"), r#"{"industries": []}"#).unwrap();
        let result = IndustryData::load(Some(dir.path()));
        assert!(matches!(result, Err(PitchwiseError::InvalidDataset { .. })));
    }

    #[test]
    fn test_update_extends_keywords() {
        let mut kb = KnowledgeBase::embedded().unwrap();
        kb.update(
            "industries",
            &json!({"industries": [{"id": "retail", "keywords": ["boutique", "retail"]}]}),
        )
        .unwrap();

        let retail = kb.industries.industry("retail").unwrap();
        assert!(retail.keywords.iter().any(|k| k == "boutique"));
        assert_eq!(retail.keywords.iter().filter(|k| *k == "retail").count(), 1);
    }

    #[test]
    fn test_update_adds_new_entry() {
        let mut kb = KnowledgeBase::embedded().unwrap();
        kb.update(
            "industries",
            &json!({"industries": [{
                "id": "agriculture",
                "name": "Agriculture",
                "description": "Farming and food production",
                "keywords": ["farm", "crop", "harvest"],
                "sub_industries": []
            }]}),
        )
        .unwrap();
        assert_eq!(kb.industries.industries.len(), 9);
        assert!(kb.industries.industry("agriculture").is_some());
    }

    #[test]
    fn test_invalid_update_is_rejected() {
        let mut kb = KnowledgeBase::embedded().unwrap();
        let before = kb.dataset("roi_metrics").unwrap();
        let result = kb.update("roi_metrics", &json!({"annual_subscription": {"amount": "lots"}}));
        assert!(result.is_err());
        assert_eq!(kb.dataset("roi_metrics").unwrap(), before);
    }

    #[test]
    fn test_unknown_dataset() {
        let mut kb = KnowledgeBase::embedded().unwrap();
        assert!(matches!(
            kb.update("weather", &json!({})),
            Err(PitchwiseError::UnknownDataset { .. })
        ));
        assert!(kb.dataset("weather").is_err());
    }

    #[test]
    fn test_save_single_dataset() {
        let dir = tempdir().unwrap();
        let kb = KnowledgeBase::embedded().unwrap();
        let path = kb.save_dataset("trust", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("trust.json"));
        let reloaded = TrustData::load(Some(dir.path())).unwrap();
        assert_eq!(reloaded.commitments, kb.trust.commitments);
    }
}

//! Optimizer-updatable parameter sets and their serializable bundles

use crate::error::{Error, Result};
use crate::Tensor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A network with a fixed, ordered set of named trainable tensors
///
/// The order returned by [`Parametrized::named_parameters_mut`] must be stable
/// across calls: optimizers key their per-parameter state by position.
pub trait Parametrized {
    fn named_parameters(&self) -> Vec<(String, &Tensor)>;

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)>;

    fn parameters(&self) -> Vec<&Tensor> {
        self.named_parameters().into_iter().map(|(_, t)| t).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.named_parameters_mut().into_iter().map(|(_, t)| t).collect()
    }

    /// Total number of scalar weights
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|t| t.len()).sum()
    }

    /// Snapshot every parameter by name
    fn export(&self) -> ParameterBundle {
        let tensors = self
            .named_parameters()
            .into_iter()
            .map(|(name, t)| (name, t.data().to_vec()))
            .collect();
        ParameterBundle { tensors }
    }

    /// Overwrite parameters from a bundle
    ///
    /// Every parameter must be present with its exact length; extra entries in
    /// the bundle are rejected too, so a bundle cannot silently target a
    /// differently shaped network.
    fn import(&mut self, bundle: &ParameterBundle) -> Result<()> {
        let mut params = self.named_parameters_mut();
        if params.len() != bundle.tensors.len() {
            return Err(Error::BundleMismatch(format!(
                "expected {} tensors, bundle holds {}",
                params.len(),
                bundle.tensors.len()
            )));
        }
        for (name, param) in &mut params {
            let values = bundle
                .tensors
                .get(name.as_str())
                .ok_or_else(|| Error::BundleMismatch(format!("missing tensor `{name}`")))?;
            if values.len() != param.len() {
                return Err(Error::BundleMismatch(format!(
                    "`{name}` has {} values, expected {}",
                    values.len(),
                    param.len()
                )));
            }
            param.data_mut().assign(&ndarray::ArrayView1::from(values.as_slice()));
        }
        Ok(())
    }
}

/// Named flat weights of one network
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterBundle {
    pub tensors: BTreeMap<String, Vec<f32>>,
}

impl ParameterBundle {
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Generator and discriminator weights saved together
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub generator: ParameterBundle,
    pub discriminator: ParameterBundle,
}

impl ModelBundle {
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        w: Tensor,
        b: Tensor,
    }

    impl Parametrized for Pair {
        fn named_parameters(&self) -> Vec<(String, &Tensor)> {
            vec![("w".into(), &self.w), ("b".into(), &self.b)]
        }

        fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
            vec![("w".into(), &mut self.w), ("b".into(), &mut self.b)]
        }
    }

    fn pair(w: Vec<f32>, b: Vec<f32>) -> Pair {
        Pair { w: Tensor::from_vec(w, true), b: Tensor::from_vec(b, true) }
    }

    #[test]
    fn test_export_import_through_json_file() {
        let source = pair(vec![1.0, 2.0], vec![3.0]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.json");
        source.export().save_json(&path).unwrap();

        let mut target = pair(vec![0.0, 0.0], vec![0.0]);
        target.import(&ParameterBundle::load_json(&path).unwrap()).unwrap();
        assert_eq!(target.w.data().to_vec(), vec![1.0, 2.0]);
        assert_eq!(target.b.data().to_vec(), vec![3.0]);
        assert_eq!(target.num_parameters(), 3);
    }

    #[test]
    fn test_import_rejects_wrong_length() {
        let mut target = pair(vec![0.0, 0.0], vec![0.0]);
        let mut bundle = target.export();
        bundle.tensors.insert("w".into(), vec![1.0]);
        assert!(matches!(target.import(&bundle), Err(Error::BundleMismatch(_))));
    }

    #[test]
    fn test_import_rejects_missing_name() {
        let mut target = pair(vec![0.0], vec![0.0]);
        let mut bundle = target.export();
        let values = bundle.tensors.remove("b").unwrap();
        bundle.tensors.insert("bias".into(), values);
        assert!(matches!(target.import(&bundle), Err(Error::BundleMismatch(_))));
    }
}

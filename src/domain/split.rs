// ============================================================
// Layer 3 — Dataset Split Paths
// ============================================================
// Every dataset lives in its own directory under the indices
// root, with one file per split:
//
//   <indices_root>/<name>/<name>.train
//   <indices_root>/<name>/<name>.dev
//   <indices_root>/<name>/<name>.test
//
// The matching embedding matrix is <weights_root>/<name>.npy.

use std::path::{Path, PathBuf};

/// Which partition of a dataset a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Dev,
    Test,
}

impl Split {
    pub fn extension(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Dev => "dev",
            Split::Test => "test",
        }
    }
}

/// Resolved file locations for one named dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub name: String,
    pub train: PathBuf,
    pub dev: PathBuf,
    pub test: PathBuf,
    pub embeddings: PathBuf,
}

impl DatasetPaths {
    pub fn resolve(
        name: &str,
        indices_root: impl AsRef<Path>,
        weights_root: impl AsRef<Path>,
    ) -> Self {
        let dir = indices_root.as_ref().join(name);
        let split_path = |split: Split| dir.join(format!("{name}.{}", split.extension()));

        Self {
            name: name.to_string(),
            train: split_path(Split::Train),
            dev: split_path(Split::Dev),
            test: split_path(Split::Test),
            embeddings: weights_root.as_ref().join(format!("{name}.npy")),
        }
    }

    pub fn split(&self, split: Split) -> &Path {
        match split {
            Split::Train => &self.train,
            Split::Dev => &self.dev,
            Split::Test => &self.test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_split_files() {
        let paths = DatasetPaths::resolve("yelp_hotel", "../../data_indices", "../../data/weight");
        assert_eq!(
            paths.train,
            PathBuf::from("../../data_indices/yelp_hotel/yelp_hotel.train")
        );
        assert_eq!(
            paths.split(Split::Dev),
            Path::new("../../data_indices/yelp_hotel/yelp_hotel.dev")
        );
        assert_eq!(paths.test.extension().and_then(|e| e.to_str()), Some("test"));
        assert_eq!(paths.embeddings, PathBuf::from("../../data/weight/yelp_hotel.npy"));
    }
}

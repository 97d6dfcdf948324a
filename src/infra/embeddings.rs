// ============================================================
// Layer 6 — Embedding Weight Loader
// ============================================================
// Reads a pretrained embedding matrix from a NumPy .npy file
// of shape (vocab_size, dim).
//
// float32 is the expected dtype. float64 files are accepted
// and narrowed, since both come out of common word2vec
// export scripts.
//
// Reference: ndarray-npy crate documentation

use anyhow::{anyhow, Context, Result};
use ndarray::Array2;
use ndarray_npy::{read_npy, ReadNpyError};
use std::path::Path;

use crate::domain::embedding::EmbeddingMatrix;

pub fn load_embeddings(path: &Path) -> Result<EmbeddingMatrix> {
    let array: Array2<f32> = match read_npy::<_, Array2<f32>>(path) {
        Ok(a) => a,
        Err(ReadNpyError::WrongDescriptor(_)) => {
            tracing::debug!("'{}' is not float32, trying float64", path.display());
            read_npy::<_, Array2<f64>>(path)
                .map_err(|e| anyhow!("{e}"))
                .with_context(|| format!("Cannot read embeddings from '{}'", path.display()))?
                .mapv(|v| v as f32)
        }
        Err(e) => {
            return Err(anyhow!("{e}"))
                .with_context(|| format!("Cannot read embeddings from '{}'", path.display()))
        }
    };

    let (vocab_size, dim) = array.dim();
    // iter() walks in logical row-major order whatever the file layout
    let values: Vec<f32> = array.iter().copied().collect();

    tracing::info!(
        "Loaded embeddings from '{}': {} x {}",
        path.display(),
        vocab_size,
        dim
    );
    EmbeddingMatrix::new(vocab_size, dim, values)
}

use burn::{
    module::Param,
    nn::{
        conv::{Conv1d, Conv1dConfig},
        pool::{MaxPool1d, MaxPool1dConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        PaddingConfig1d,
    },
    prelude::*,
    tensor::{
        activation::{relu, sigmoid},
        TensorData,
    },
};

use crate::domain::embedding::EmbeddingMatrix;

/// Lower bound applied to probabilities before taking logs in the loss.
const PROB_EPSILON: f64 = 1e-7;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct KimCnnConfig {
    /// Fixed number of token positions per document
    #[config(default = 50)]
    pub seq_len: usize,
    #[config(default = "vec![3, 4, 5]")]
    pub kernel_sizes: Vec<usize>,
    /// Filters per convolution branch
    #[config(default = 100)]
    pub filters: usize,
    #[config(default = 100)]
    pub hidden: usize,
    #[config(default = 0.2)]
    pub dropout: f64,
    /// L2 penalty on the convolution kernels
    #[config(default = 0.03)]
    pub l2: f64,
}

impl KimCnnConfig {
    /// Width of the flattened feature vector fed to the hidden layer.
    pub fn flat_features(&self) -> usize {
        (self.seq_len / 2) * self.filters * self.kernel_sizes.len()
    }

    /// Reject shapes the network cannot be built with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.seq_len >= 2, "seq_len must be at least 2 (got {})", self.seq_len);
        anyhow::ensure!(!self.kernel_sizes.is_empty(), "kernel_sizes must not be empty");
        if let Some(k) = self.kernel_sizes.iter().find(|&&k| k == 0 || k > self.seq_len) {
            anyhow::bail!("kernel size {k} must be between 1 and seq_len ({})", self.seq_len);
        }
        anyhow::ensure!(self.filters > 0, "filters must be at least 1");
        anyhow::ensure!(self.hidden > 0, "hidden must be at least 1");
        anyhow::ensure!(
            (0.0..1.0).contains(&self.dropout),
            "dropout must be in [0, 1) (got {})",
            self.dropout
        );
        anyhow::ensure!(self.l2 >= 0.0, "l2 must not be negative (got {})", self.l2);
        Ok(())
    }

    /// Build the model with its embedding table taken from `weights`.
    pub fn init<B: Backend>(&self, weights: &EmbeddingMatrix, device: &B::Device) -> KimCnn<B> {
        let mut embedding = EmbeddingConfig::new(weights.vocab_size(), weights.dim()).init(device);
        let table = Tensor::<B, 2>::from_data(
            TensorData::new(weights.values().to_vec(), [weights.vocab_size(), weights.dim()]),
            device,
        );
        embedding.weight = Param::from_tensor(table);

        let branches = self
            .kernel_sizes
            .iter()
            .map(|&k| ConvBranch::new(weights.dim(), self.filters, k, device))
            .collect();

        KimCnn {
            embedding,
            branches,
            hidden: LinearConfig::new(self.flat_features(), self.hidden).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            output: LinearConfig::new(self.hidden, 1).init(device),
            seq_len: self.seq_len,
            l2: self.l2,
        }
    }
}

/// One convolution width: same-padded Conv1d followed by max-pooling.
///
/// Padding is applied by hand rather than with `PaddingConfig1d::Same`
/// so even kernel widths work: `(k-1)/2` zeros on the left and the
/// rest on the right.
#[derive(Module, Debug)]
pub struct ConvBranch<B: Backend> {
    pub conv: Conv1d<B>,
    pub pool: MaxPool1d,
    pub pad_left: usize,
    pub pad_right: usize,
}

impl<B: Backend> ConvBranch<B> {
    fn new(channels_in: usize, filters: usize, kernel_size: usize, device: &B::Device) -> Self {
        let conv = Conv1dConfig::new(channels_in, filters, kernel_size)
            .with_padding(PaddingConfig1d::Valid)
            .init(device);
        let pool = MaxPool1dConfig::new(2).with_stride(2).init();
        let pad_left = (kernel_size - 1) / 2;
        Self {
            conv,
            pool,
            pad_left,
            pad_right: kernel_size - 1 - pad_left,
        }
    }

    /// [batch, channels, len] → [batch, filters, len / 2]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = same_pad(x, self.pad_left, self.pad_right);
        self.pool.forward(self.conv.forward(x))
    }

    /// Σ w² over the kernel (bias excluded).
    pub fn l2_penalty(&self) -> Tensor<B, 1> {
        let w = self.conv.weight.val();
        (w.clone() * w).sum()
    }
}

/// Zero-pad the last dimension.
fn same_pad<B: Backend>(x: Tensor<B, 3>, left: usize, right: usize) -> Tensor<B, 3> {
    let [batch, channels, _] = x.dims();
    let device = x.device();

    let mut parts = Vec::with_capacity(3);
    if left > 0 {
        parts.push(Tensor::zeros([batch, channels, left], &device));
    }
    parts.push(x);
    if right > 0 {
        parts.push(Tensor::zeros([batch, channels, right], &device));
    }
    Tensor::cat(parts, 2)
}

#[derive(Module, Debug)]
pub struct KimCnn<B: Backend> {
    pub embedding: Embedding<B>,
    pub branches: Vec<ConvBranch<B>>,
    pub hidden: Linear<B>,
    pub dropout: Dropout,
    pub output: Linear<B>,
    pub seq_len: usize,
    pub l2: f64,
}

impl<B: Backend> KimCnn<B> {
    /// tokens: [batch, seq_len] → positive-class probability: [batch, 1]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        // [batch, seq_len, dim] → channels-first for Conv1d
        let x = self.embedding.forward(tokens).swap_dims(1, 2);

        let pooled: Vec<Tensor<B, 3>> = self
            .branches
            .iter()
            .map(|branch| branch.forward(x.clone()))
            .collect();

        // Concatenate on the feature axis, then flatten position-major
        let merged = Tensor::cat(pooled, 1).swap_dims(1, 2);
        let flat: Tensor<B, 2> = merged.flatten(1, 2);

        let h = self.dropout.forward(relu(self.hidden.forward(flat)));
        sigmoid(self.output.forward(h))
    }

    /// Class-weighted binary cross-entropy plus the L2 kernel penalty.
    ///
    /// Each example's loss is scaled by `weights.negative` or
    /// `weights.positive` according to its label, then averaged.
    pub fn forward_loss(
        &self,
        tokens: Tensor<B, 2, Int>,
        labels: Tensor<B, 2>,
        weights: ClassWeights,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let probs = self.forward(tokens);
        let loss = weighted_bce(probs.clone(), labels, weights)
            + self.l2_penalty().mul_scalar(self.l2);
        (loss, probs)
    }

    pub fn l2_penalty(&self) -> Tensor<B, 1> {
        let device = self.embedding.weight.val().device();
        self.branches
            .iter()
            .fold(Tensor::zeros([1], &device), |acc, b| acc + b.l2_penalty())
    }
}

/// Per-class loss multipliers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClassWeights {
    pub negative: f64,
    pub positive: f64,
}

impl Default for ClassWeights {
    fn default() -> Self {
        Self {
            negative: 1.2,
            positive: 1.0,
        }
    }
}

/// mean_i( w_i · -[y_i·ln p_i + (1-y_i)·ln(1-p_i)] )
pub fn weighted_bce<B: Backend>(
    probs: Tensor<B, 2>,
    labels: Tensor<B, 2>,
    weights: ClassWeights,
) -> Tensor<B, 1> {
    let p = probs.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);
    let not_p = p.clone().neg().add_scalar(1.0);
    let not_y = labels.clone().neg().add_scalar(1.0);

    let bce = (labels.clone() * p.log() + not_y * not_p.log()).neg();
    let w = labels
        .mul_scalar(weights.positive - weights.negative)
        .add_scalar(weights.negative);

    (w * bce).mean()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_config() -> KimCnnConfig {
        KimCnnConfig::new()
            .with_seq_len(8)
            .with_filters(4)
            .with_hidden(5)
    }

    fn tiny_embeddings() -> EmbeddingMatrix {
        let values = (0..20 * 6).map(|i| (i as f32) * 0.01).collect();
        EmbeddingMatrix::new(20, 6, values).unwrap()
    }

    #[test]
    fn test_defaults_match_architecture() {
        let cfg = KimCnnConfig::new();
        assert_eq!(cfg.seq_len, 50);
        assert_eq!(cfg.kernel_sizes, vec![3, 4, 5]);
        assert_eq!(cfg.filters, 100);
        // 25 pooled positions * 100 filters * 3 widths
        assert_eq!(cfg.flat_features(), 7500);
    }

    #[test]
    fn test_validate_rejects_unbuildable_shapes() {
        assert!(KimCnnConfig::new().validate().is_ok());
        assert!(KimCnnConfig::new().with_kernel_sizes(vec![3, 0]).validate().is_err());
        assert!(KimCnnConfig::new().with_kernel_sizes(vec![]).validate().is_err());
        assert!(KimCnnConfig::new().with_seq_len(1).validate().is_err());
        assert!(KimCnnConfig::new().with_seq_len(4).with_kernel_sizes(vec![5]).validate().is_err());
        assert!(KimCnnConfig::new().with_filters(0).validate().is_err());
        assert!(KimCnnConfig::new().with_dropout(1.0).validate().is_err());
    }

    #[test]
    fn test_forward_loss_adds_l2_penalty() {
        let device = Default::default();
        let model: KimCnn<TestBackend> = tiny_config().with_l2(0.5).init(&tiny_embeddings(), &device);

        let tokens = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new((0..16).map(|i| (i % 20) as i64).collect::<Vec<_>>(), [2, 8]),
            &device,
        );
        let labels = Tensor::<TestBackend, 2>::from_data(TensorData::new(vec![1.0f32, 0.0], [2, 1]), &device);

        let (loss, probs) = model.forward_loss(tokens, labels.clone(), ClassWeights::default());
        let loss: f32 = loss.into_scalar();
        let bce: f32 = weighted_bce(probs, labels, ClassWeights::default()).into_scalar();

        // Σ w² over every conv kernel, computed outside the model
        let sum_sq: f32 = model
            .branches
            .iter()
            .flat_map(|b| b.conv.weight.val().into_data().to_vec::<f32>().unwrap())
            .map(|w| w * w)
            .sum();
        assert!(sum_sq > 0.0);

        let expected = bce + 0.5 * sum_sq;
        assert!((loss - expected).abs() < 1e-3 * expected.max(1.0), "loss {loss}, expected {expected}");
        assert!(loss > bce);
    }

    #[test]
    fn test_same_padding_keeps_length() {
        let device = Default::default();
        for k in [3, 4, 5] {
            let branch = ConvBranch::<TestBackend>::new(6, 4, k, &device);
            let x = Tensor::<TestBackend, 3>::ones([2, 6, 8], &device);
            // 8 positions, same-padded, then pooled by 2
            assert_eq!(branch.forward(x).dims(), [2, 4, 4]);
        }
    }

    #[test]
    fn test_forward_outputs_probabilities() {
        let device = Default::default();
        let model: KimCnn<TestBackend> = tiny_config().init(&tiny_embeddings(), &device);

        let tokens = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new((0..24).map(|i| (i % 20) as i64).collect::<Vec<_>>(), [3, 8]),
            &device,
        );
        let probs = model.forward(tokens);
        assert_eq!(probs.dims(), [3, 1]);

        let values: Vec<f32> = probs.into_data().to_vec().unwrap();
        assert!(values.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_embedding_initialised_from_matrix() {
        let device = Default::default();
        let weights = tiny_embeddings();
        let model: KimCnn<TestBackend> = tiny_config().init(&weights, &device);

        let table: Vec<f32> = model.embedding.weight.val().into_data().to_vec().unwrap();
        assert_eq!(table, weights.values());
    }

    #[test]
    fn test_weighted_bce_scales_negatives() {
        let device = Default::default();
        let probs = Tensor::<TestBackend, 2>::from_data(TensorData::new(vec![0.5f32, 0.5], [2, 1]), &device);
        let labels = Tensor::<TestBackend, 2>::from_data(TensorData::new(vec![1.0f32, 0.0], [2, 1]), &device);

        let loss: f32 = weighted_bce(probs, labels, ClassWeights::default()).into_scalar();
        // ln 2 * (1.0 + 1.2) / 2
        let expected = std::f32::consts::LN_2 * 1.1;
        assert!((loss - expected).abs() < 1e-4, "loss {loss}, expected {expected}");
    }
}

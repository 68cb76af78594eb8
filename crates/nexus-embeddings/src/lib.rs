//! # nexus-embeddings
//!
//! Image embeddings for similarity search over `Midia.Dado`, using the CLIP
//! ViT-B/32 vision model through fastembed (ONNX runtime).
//!
//! Vectors are L2-normalised, so cosine similarity and dot product agree.
//!
//! ## Async usage
//!
//! The ONNX runtime is synchronous. From async code, move the embedder into
//! [`tokio::task::spawn_blocking`]:
//!
//! ```ignore
//! let (embedder, vector) = tokio::task::spawn_blocking(move || {
//!     let vector = embedder.embed_image(&bytes);
//!     (embedder, vector)
//! }).await?;
//! ```

pub mod error;
pub mod similarity;

use std::path::{Path, PathBuf};

pub use error::EmbeddingError;
use fastembed::{ImageEmbedding, ImageEmbeddingModel, ImageInitOptions};
pub use similarity::{Ranked, cosine_similarity, l2_normalize, rank_top_k};

/// Local CLIP image embedder.
///
/// Model files are downloaded on first use (~350MB) and cached under the
/// configured directory, or `~/.cache/nexus-bio/fastembed/` by default.
///
/// [`ImageEmbedding::embed_bytes`] needs `&mut self`; share an embedder
/// across threads behind a `Mutex`.
pub struct ImageEmbedder {
    model: ImageEmbedding,
}

/// Default model cache directory.
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir().map_or_else(
        || PathBuf::from(".fastembed_cache"),
        |dir| dir.join("nexus-bio").join("fastembed"),
    )
}

impl ImageEmbedder {
    /// Load the CLIP ViT-B/32 vision model.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if model download or ONNX
    /// initialization fails.
    pub fn new(cache_dir: Option<&Path>) -> Result<Self, EmbeddingError> {
        let cache_dir = cache_dir.map_or_else(default_cache_dir, Path::to_path_buf);
        tracing::debug!(cache_dir = %cache_dir.display(), "loading CLIP image model");

        let model = ImageEmbedding::try_new(
            ImageInitOptions::new(ImageEmbeddingModel::ClipVitB32)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(true),
        )
        .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self { model })
    }

    /// Embed encoded images (PNG, JPEG, ...). One normalised vector per input.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if any image cannot be decoded
    /// or inference fails.
    pub fn embed_images(&mut self, images: &[&[u8]]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.model
            .embed_bytes(images, None)
            .map(|vectors| vectors.into_iter().map(l2_normalize).collect())
            .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))
    }

    /// Embed one encoded image.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if decoding or inference fails,
    /// or [`EmbeddingError::EmptyResult`] if the model returns nothing.
    pub fn embed_image(&mut self, image: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
        let mut results = self.embed_images(&[image])?;
        results.pop().ok_or(EmbeddingError::EmptyResult)
    }

    /// Embedding dimensionality of CLIP ViT-B/32.
    #[must_use]
    pub const fn dimension() -> usize {
        512
    }
}

#[cfg(test)]
mod tests {
    use nexus_media::placeholder_png;
    use pretty_assertions::assert_eq;

    use super::*;

    fn embedder() -> ImageEmbedder {
        ImageEmbedder::new(None).expect("model should load")
    }

    #[test]
    fn cache_dir_is_namespaced() {
        let dir = default_cache_dir();
        assert!(dir.ends_with("fastembed"));
    }

    #[test]
    #[ignore = "downloads the CLIP model"]
    fn embeds_png_to_unit_vector() {
        let png = placeholder_png("Panthera onca", Some("animal"), 224, 224).unwrap();
        let vector = embedder().embed_image(&png).unwrap();
        assert_eq!(vector.len(), ImageEmbedder::dimension());
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3, "norm was {norm}");
    }

    #[test]
    #[ignore = "downloads the CLIP model"]
    fn identical_images_rank_first() {
        let mut model = embedder();
        let plant = placeholder_png("Ipê", Some("plant"), 224, 224).unwrap();
        let animal = placeholder_png("Onça", Some("animal"), 224, 224).unwrap();
        let vectors = model.embed_images(&[&plant, &animal]).unwrap();
        let query = model.embed_image(&plant).unwrap();

        let ranked = rank_top_k(&query, vec![("animal", vectors[1].clone()), ("plant", vectors[0].clone())], 2);
        assert_eq!(ranked[0].key, "plant");
        assert!(ranked[0].score > 0.99);
    }

    #[test]
    #[ignore = "downloads the CLIP model"]
    fn garbage_bytes_fail_cleanly() {
        let err = embedder().embed_image(b"not an image").unwrap_err();
        assert!(matches!(err, EmbeddingError::EmbedFailed(_)));
    }
}

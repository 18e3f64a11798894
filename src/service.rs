use std::sync::Arc;

use tracing::{info, warn};

use crate::chart::{self, ChartLoader, ContainerImage, Document};
use crate::error::AppError;
use crate::registry::ImageRegistry;

/// Load a document, find its images, and size each one through the registry.
#[derive(Clone)]
pub struct ChartService {
    loader: ChartLoader,
    registry: Arc<dyn ImageRegistry>,
}

impl ChartService {
    pub fn new(loader: ChartLoader, registry: Arc<dyn ImageRegistry>) -> Self {
        Self { loader, registry }
    }

    pub async fn load_document(&self, url: &str) -> Result<Document, AppError> {
        Ok(self.loader.load(url).await?)
    }

    pub fn find_images(&self, document: &Document) -> Vec<ContainerImage> {
        chart::find_images(document)
    }

    /// Fill in size and layers for every image, one lookup at a time.
    ///
    /// Stops at the first failed lookup; `on_lookup` is called before each one
    /// with the image's index.
    pub async fn enrich(
        &self,
        images: &mut [ContainerImage],
        mut on_lookup: impl FnMut(usize, &ContainerImage) + Send,
    ) -> Result<(), AppError> {
        for (i, image) in images.iter_mut().enumerate() {
            on_lookup(i, image);
            let info = self
                .registry
                .image_info(&image.name)
                .await
                .map_err(|source| {
                    warn!(image = %image.name, error = %source, "registry lookup failed");
                    AppError::Enrich {
                        image: image.name.clone(),
                        source,
                    }
                })?;
            image.size = info.size;
            image.layers = info.layers;
        }
        Ok(())
    }

    /// The whole pipeline. Any failure discards the images found so far.
    pub async fn load_images(&self, url: &str) -> Result<Vec<ContainerImage>, AppError> {
        let document = self.load_document(url).await?;
        let mut images = self.find_images(&document);
        drop(document);

        info!(url, count = images.len(), "found container images");
        self.enrich(&mut images, |_, _| {}).await?;
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::Router;
    use axum::routing::get;

    use super::*;
    use crate::registry::{ImageInfo, RegistryError};
    use crate::testutil::spawn_stub;

    /// Answers from a fixed table and records every lookup.
    struct TableRegistry {
        sizes: Vec<(&'static str, &'static str)>,
        calls: Mutex<Vec<String>>,
    }

    impl TableRegistry {
        fn new(sizes: Vec<(&'static str, &'static str)>) -> Arc<Self> {
            Arc::new(Self {
                sizes,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ImageRegistry for TableRegistry {
        async fn image_info(&self, image: &str) -> Result<ImageInfo, RegistryError> {
            self.calls.lock().unwrap().push(image.to_string());
            self.sizes
                .iter()
                .find(|(name, _)| *name == image)
                .map(|(_, size)| ImageInfo {
                    size: size.to_string(),
                    layers: 0,
                })
                .ok_or(RegistryError::MissingSize)
        }
    }

    async fn serve_yaml(yaml: &'static str) -> String {
        let router = Router::new().route("/values.yaml", get(move || async move { yaml }));
        let base = spawn_stub(router).await;
        format!("{base}/values.yaml")
    }

    fn service(registry: Arc<dyn ImageRegistry>) -> ChartService {
        ChartService::new(ChartLoader::new(reqwest::Client::new()), registry)
    }

    #[tokio::test]
    async fn enriches_every_image_in_order() {
        let url = serve_yaml(
            "image:\n  repository: nginx\ncontainers:\n  - name: cache\n    image: redis:7\n",
        )
        .await;
        let registry =
            TableRegistry::new(vec![("nginx:latest", "100.00 MB"), ("redis:7", "40.00 MB")]);

        let images = service(registry.clone()).load_images(&url).await.unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].name, "nginx:latest");
        assert_eq!(images[0].size, "100.00 MB");
        assert_eq!(images[1].container, "cache");
        assert_eq!(images[1].size, "40.00 MB");
        assert_eq!(*registry.calls.lock().unwrap(), ["nginx:latest", "redis:7"]);
    }

    #[tokio::test]
    async fn first_failure_aborts_without_partial_results() {
        let url =
            serve_yaml("a:\n  image: nginx:latest\nb:\n  image: ghost:1.0\nc:\n  image: redis:7\n")
                .await;
        let registry =
            TableRegistry::new(vec![("nginx:latest", "1.00 MB"), ("redis:7", "1.00 MB")]);

        let err = service(registry.clone()).load_images(&url).await.unwrap_err();

        assert!(matches!(&err, AppError::Enrich { image, .. } if image == "ghost:1.0"));
        assert!(err.to_string().starts_with("Failed to get size for image ghost:1.0:"));
        assert_eq!(*registry.calls.lock().unwrap(), ["nginx:latest", "ghost:1.0"]);
    }

    #[tokio::test]
    async fn no_images_means_no_lookups() {
        let url = serve_yaml("replicaCount: 2\nservice:\n  port: 80\n").await;
        let registry = TableRegistry::new(vec![]);

        let images = service(registry.clone()).load_images(&url).await.unwrap();

        assert!(images.is_empty());
        assert!(registry.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_failure_skips_the_registry() {
        let url = serve_yaml("image: [").await;
        let registry = TableRegistry::new(vec![]);

        let err = service(registry.clone()).load_images(&url).await.unwrap_err();

        assert!(matches!(err, AppError::Load(_)), "{err:?}");
        assert!(registry.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn on_lookup_sees_each_image() {
        let registry = TableRegistry::new(vec![("a", "1 B"), ("b", "2 B")]);
        let mut images = vec![ContainerImage::new("a", ""), ContainerImage::new("b", "")];
        let mut seen = Vec::new();

        service(registry)
            .enrich(&mut images, |i, image| seen.push((i, image.name.clone())))
            .await
            .unwrap();

        assert_eq!(seen, [(0, "a".to_string()), (1, "b".to_string())]);
        assert_eq!(images[1].size, "2 B");
    }
}

use crate::domain::model::{AssetPath, ModelRequest, ModelResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait AssetStore: Send + Sync {
    fn read_asset(
        &self,
        asset: &AssetPath,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_asset(
        &self,
        relative_path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// External generative image model. One call, one response, no retries.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse>;
}

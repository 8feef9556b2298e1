use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::ConfigLoader;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;

use crate::models::file::{ImageUpload, StoredFile};
use crate::utils::storage::{new_key, ImageStore, ImageStoreError};

/// Builds a client from the default credential chain. `None` leaves the
/// region to the chain as well.
pub async fn create_s3_client(region: Option<String>) -> S3Client {
    let aws_config = ConfigLoader::default()
        .region(region.map(Region::new))
        .behavior_version(BehaviorVersion::latest())
        .load()
        .await;

    S3Client::new(&aws_config)
}

/// Uploads images to a bucket; they are served by S3 directly.
pub struct S3ImageStore {
    client: S3Client,
    bucket: String,
}

impl S3ImageStore {
    #[must_use]
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    fn uri_for(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, key)
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put(&self, upload: ImageUpload) -> Result<StoredFile, ImageStoreError> {
        let key = new_key(&upload);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(upload.content_type)
            .body(ByteStream::from(upload.bytes))
            .send()
            .await
            .map_err(|err| ImageStoreError::S3(err.to_string()))?;

        Ok(StoredFile {
            uri: self.uri_for(&key),
            key,
        })
    }

    async fn get(&self, _key: &str) -> Result<Option<(Vec<u8>, String)>, ImageStoreError> {
        Ok(None)
    }

    async fn remove(&self, key: &str) -> Result<(), ImageStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| ImageStoreError::S3(err.to_string()))?;
        Ok(())
    }
}

use qdrant_client::qdrant::alias_operations::Action;
use qdrant_client::qdrant::collections_client::CollectionsClient;
use qdrant_client::qdrant::{
    AliasOperations, ChangeAliases, CountPointsBuilder, CreateAlias, CreateCollectionBuilder,
    DeleteAlias, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use super::error::VectorDbError;
use super::model::{SearchResult, VectorPoint};

#[derive(Clone)]
/// Direct Qdrant client wrapper.
pub struct QdrantClient {
    client: Qdrant,
    url: String,
}

impl QdrantClient {
    /// Creates a client for `url`.
    pub fn new(url: &str) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Creates a collection with cosine distance.
    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorDbError> {
        let vectors_config = VectorParamsBuilder::new(vector_size, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(vectors_config)
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        debug!(collection = name, vector_size, "Created collection");
        Ok(())
    }

    /// Drops a collection with all of its points.
    pub async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        self.client.delete_collection(name).await.map_err(|e| {
            VectorDbError::DeleteCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })?;

        debug!(collection = name, "Deleted collection");
        Ok(())
    }

    /// Returns `true` if the collection exists.
    pub async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.client
            .collection_exists(name)
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })
    }

    /// Names of every collection on the server.
    pub async fn list_collections(&self) -> Result<Vec<String>, VectorDbError> {
        let response =
            self.client
                .list_collections()
                .await
                .map_err(|e| VectorDbError::ListFailed {
                    message: e.to_string(),
                })?;

        Ok(response.collections.into_iter().map(|c| c.name).collect())
    }

    /// Upserts points into a collection, returning once they are searchable.
    pub async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorDbError> {
        if points.is_empty() {
            return Ok(());
        }

        let qdrant_points = points
            .into_iter()
            .map(|p| {
                let json = serde_json::to_value(&p.payload).map_err(|e| {
                    VectorDbError::InvalidPayload {
                        id: p.id,
                        message: e.to_string(),
                    }
                })?;
                let payload =
                    Payload::try_from(json).map_err(|e| VectorDbError::InvalidPayload {
                        id: p.id,
                        message: e.to_string(),
                    })?;

                Ok(PointStruct::new(p.id, p.vector, payload))
            })
            .collect::<Result<Vec<_>, VectorDbError>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, qdrant_points).wait(true))
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Searches a collection by vector similarity.
    pub async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        let search_result = self
            .client
            .search_points(SearchPointsBuilder::new(collection, query, limit).with_payload(true))
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        let results = search_result
            .result
            .into_iter()
            .filter_map(SearchResult::from_scored_point)
            .collect();

        Ok(results)
    }

    /// Exact number of points in a collection.
    pub async fn count_points(&self, collection: &str) -> Result<u64, VectorDbError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(|e| VectorDbError::CountFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    /// Collection currently behind `alias`, if any.
    pub async fn resolve_alias(&self, alias: &str) -> Result<Option<String>, VectorDbError> {
        let response = self
            .client
            .list_aliases()
            .await
            .map_err(|e| VectorDbError::AliasFailed {
                alias: alias.to_string(),
                message: e.to_string(),
            })?;

        Ok(response
            .aliases
            .into_iter()
            .find(|a| a.alias_name == alias)
            .map(|a| a.collection_name))
    }

    /// Points `alias` at `collection` in a single alias update.
    ///
    /// The high-level client only sends one alias action per request, so the delete and
    /// create go out together through the raw collections service.
    pub async fn swap_alias(&self, alias: &str, collection: &str) -> Result<(), VectorDbError> {
        let alias_failed = |message: String| VectorDbError::AliasFailed {
            alias: alias.to_string(),
            message,
        };

        let mut actions = Vec::with_capacity(2);

        if self.resolve_alias(alias).await?.is_some() {
            actions.push(AliasOperations {
                action: Some(Action::DeleteAlias(DeleteAlias {
                    alias_name: alias.to_string(),
                })),
            });
        }

        actions.push(AliasOperations {
            action: Some(Action::CreateAlias(CreateAlias {
                collection_name: collection.to_string(),
                alias_name: alias.to_string(),
            })),
        });

        let mut collections = CollectionsClient::connect(self.url.clone())
            .await
            .map_err(|e| alias_failed(e.to_string()))?;

        let response = collections
            .update_aliases(ChangeAliases {
                actions,
                timeout: None,
            })
            .await
            .map_err(|e| alias_failed(e.message().to_string()))?
            .into_inner();

        if !response.result {
            return Err(alias_failed("alias update was not applied".to_string()));
        }

        debug!(alias, collection, "Alias switched");
        Ok(())
    }
}

/// Async interface over the vector store used by the index, indexer and retriever.
pub trait VectorDbClient: Send + Sync {
    /// Creates a new, empty collection.
    fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Drops a collection.
    fn delete_collection(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Returns `true` if the collection exists.
    fn collection_exists(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<bool, VectorDbError>> + Send;

    /// Lists collection names.
    fn list_collections(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, VectorDbError>> + Send;

    /// Upserts points.
    fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Searches for similar points, best match first.
    fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, VectorDbError>> + Send;

    /// Counts points exactly.
    fn count_points(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<u64, VectorDbError>> + Send;

    /// Resolves an alias to its collection.
    fn resolve_alias(
        &self,
        alias: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, VectorDbError>> + Send;

    /// Atomically repoints an alias.
    fn swap_alias(
        &self,
        alias: &str,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;
}

impl VectorDbClient for QdrantClient {
    async fn create_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        self.create_collection(name, vector_size).await
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        self.delete_collection(name).await
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.collection_exists(name).await
    }

    async fn list_collections(&self) -> Result<Vec<String>, VectorDbError> {
        self.list_collections().await
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorDbError> {
        self.upsert_points(collection, points).await
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        self.search(collection, query, limit).await
    }

    async fn count_points(&self, collection: &str) -> Result<u64, VectorDbError> {
        self.count_points(collection).await
    }

    async fn resolve_alias(&self, alias: &str) -> Result<Option<String>, VectorDbError> {
        self.resolve_alias(alias).await
    }

    async fn swap_alias(&self, alias: &str, collection: &str) -> Result<(), VectorDbError> {
        self.swap_alias(alias, collection).await
    }
}

use super::{Profile, ProfileStore, ProfileUpdate, StoreError};
use crate::BoxFuture;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local profile store for tests and local development.
///
/// Documents live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    documents: RwLock<HashMap<String, Profile>>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn put<'a>(&'a self, profile: &'a Profile) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.documents
                .write()
                .await
                .insert(profile.user_id.clone(), profile.clone());
            Ok(())
        })
    }

    fn get<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<Profile>, StoreError>> {
        Box::pin(async move { Ok(self.documents.read().await.get(user_id).cloned()) })
    }

    fn update<'a>(
        &'a self,
        user_id: &'a str,
        update: &'a ProfileUpdate,
    ) -> BoxFuture<'a, Result<Option<Profile>, StoreError>> {
        Box::pin(async move {
            let mut documents = self.documents.write().await;
            Ok(documents.get_mut(user_id).map(|profile| {
                profile.apply(update);
                profile.clone()
            }))
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async { Ok(()) })
    }
}

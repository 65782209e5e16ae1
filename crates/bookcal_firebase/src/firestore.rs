//! Cloud Firestore client
//!
//! Implements [`DocumentStore`] on the Firestore v1 REST API. Requests carry
//! the signed-in user's id token, so the project's security rules apply
//! exactly as they would for the web SDK.

use crate::client::{FirebaseError, SessionHandle};
use crate::codec::{decode_fields, encode_fields, encode_value};
use crate::models::{
    CollectionSelector, CommitRequest, FieldFilter, FieldReference, FirestoreDocument,
    ListDocumentsResponse, QueryFilter, RunQueryRequest, RunQueryResponseItem, StructuredQuery,
    Write,
};
use bookcal_common::http::describe_failure;
use bookcal_common::{BoxFuture, Document, DocumentStore, StoreWrite, StoredDocument};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

/// Page size used when listing a whole collection.
const LIST_PAGE_SIZE: u32 = 300;

/// Client for the Cloud Firestore REST API
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    /// `projects/{project}/databases/{database}`
    database_path: String,
    session: SessionHandle,
}

impl FirestoreClient {
    pub fn new(
        http: Client,
        base_url: &str,
        project_id: &str,
        database_id: &str,
        session: SessionHandle,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            database_path: format!("projects/{project_id}/databases/{database_id}"),
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Full resource name of a document.
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database_path, collection, id)
    }

    fn documents_url(&self) -> String {
        format!("{}/v1/{}/documents", self.base_url, self.database_path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.id_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn checked(response: Response) -> Result<Response, FirebaseError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(FirebaseError::ApiError(describe_failure(response).await))
        }
    }

    fn stored(document: FirestoreDocument) -> Result<StoredDocument, FirebaseError> {
        let id = document
            .document_id()
            .ok_or_else(|| FirebaseError::DecodeError("document without a name".to_string()))?
            .to_string();
        Ok(StoredDocument {
            id,
            fields: decode_fields(&document.fields)?,
        })
    }

    async fn list_page(
        &self,
        collection: &str,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse, FirebaseError> {
        let url = format!("{}/{}", self.documents_url(), collection);
        let mut request = self
            .http
            .get(url)
            .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        let response = Self::checked(self.authorized(request).send().await?).await?;
        Ok(response.json().await?)
    }
}

impl DocumentStore for FirestoreClient {
    type Error = FirebaseError;

    fn insert(&self, collection: &str, fields: Document) -> BoxFuture<'_, String, Self::Error> {
        let url = format!("{}/{}", self.documents_url(), collection);
        Box::pin(async move {
            let body = FirestoreDocument {
                fields: encode_fields(&fields),
                ..FirestoreDocument::default()
            };
            let request = self.http.post(url).json(&body);
            let response = Self::checked(self.authorized(request).send().await?).await?;
            let created: FirestoreDocument = response.json().await?;
            let id = created
                .document_id()
                .ok_or_else(|| FirebaseError::DecodeError("created document has no name".to_string()))?
                .to_string();
            debug!("created document {}", id);
            Ok(id)
        })
    }

    fn query_all(&self, collection: &str) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
        let collection = collection.to_string();
        Box::pin(async move {
            let mut documents = Vec::new();
            let mut page_token: Option<String> = None;
            loop {
                let page = self.list_page(&collection, page_token.as_deref()).await?;
                for document in page.documents {
                    documents.push(Self::stored(document)?);
                }
                match page.next_page_token.filter(|token| !token.is_empty()) {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }
            debug!("listed {} documents from {}", documents.len(), collection);
            Ok(documents)
        })
    }

    fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
        let body = RunQueryRequest {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: collection.to_string(),
                }],
                filter: QueryFilter {
                    field_filter: FieldFilter {
                        field: FieldReference {
                            field_path: field.to_string(),
                        },
                        op: "EQUAL",
                        value: encode_value(value),
                    },
                },
            },
        };
        let url = format!("{}:runQuery", self.documents_url());
        Box::pin(async move {
            let request = self.http.post(url).json(&body);
            let response = Self::checked(self.authorized(request).send().await?).await?;
            let items: Vec<RunQueryResponseItem> = response.json().await?;
            items
                .into_iter()
                .filter_map(|item| item.document)
                .map(Self::stored)
                .collect()
        })
    }

    fn delete_by_id(&self, collection: &str, id: &str) -> BoxFuture<'_, (), Self::Error> {
        let url = format!("{}/{}/{}", self.documents_url(), collection, id);
        Box::pin(async move {
            let request = self.http.delete(url);
            Self::checked(self.authorized(request).send().await?).await?;
            Ok(())
        })
    }

    fn commit(
        &self,
        collection: &str,
        writes: Vec<StoreWrite>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let body = CommitRequest {
            writes: writes
                .into_iter()
                .map(|write| match write {
                    StoreWrite::Set { id, fields } => Write::Update(FirestoreDocument {
                        name: Some(self.document_name(collection, &id)),
                        fields: encode_fields(&fields),
                        ..FirestoreDocument::default()
                    }),
                    StoreWrite::Delete { id } => Write::Delete(self.document_name(collection, &id)),
                })
                .collect(),
        };
        let url = format!("{}/v1/{}/documents:commit", self.base_url, self.database_path);
        let collection = collection.to_string();
        Box::pin(async move {
            if body.writes.is_empty() {
                debug!("empty commit on {}, nothing to do", collection);
                return Ok(());
            }
            let request = self.http.post(url).json(&body);
            Self::checked(self.authorized(request).send().await?).await?;
            debug!("committed {} writes", body.writes.len());
            Ok(())
        })
    }
}

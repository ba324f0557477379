//! Request building and response decoding for cached queries.

use std::sync::Arc;

use bookify_core::QueryKey;
use bookify_types::{Book, BorrowSummary, DataEnvelope, Page, ServerErrorBody};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::Resource;
use crate::error::FetchError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// The GET request a query key resolves to.
pub(crate) fn request_for(key: &QueryKey) -> ApiRequest {
    ApiRequest::get(key.path()).with_query(key.query_pairs())
}

/// Fetch and decode the resource for `key`.
pub(crate) async fn fetch<T: Transport + ?Sized>(
    transport: &T,
    key: &QueryKey,
) -> Result<Resource, FetchError> {
    let response = transport.execute(request_for(key)).await?;
    let body = check_status(response)?;

    match key {
        QueryKey::BookList(_) => {
            let page: Page<Book> = decode(body)?;
            Ok(Resource::BookPage(Arc::new(page)))
        }
        QueryKey::Book(_) => {
            let envelope: DataEnvelope<Option<Book>> = decode(body)?;
            envelope
                .data
                .map(|book| Resource::Book(Arc::new(book)))
                .ok_or(FetchError::NotFound)
        }
        QueryKey::BorrowSummary(_) => {
            let page: Page<BorrowSummary> = decode(body)?;
            Ok(Resource::SummaryPage(Arc::new(page)))
        }
    }
}

fn check_status(response: ApiResponse) -> Result<Value, FetchError> {
    match response.status {
        404 => Err(FetchError::NotFound),
        _ if response.is_success() => Ok(response.body),
        status => Err(FetchError::Server {
            status,
            message: error_message(&response.body)
                .unwrap_or_else(|| format!("request failed with status {status}")),
        }),
    }
}

pub(crate) fn decode<D: DeserializeOwned>(body: Value) -> Result<D, FetchError> {
    serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// The displayable message of an error body, if it has one.
pub(crate) fn error_message(body: &Value) -> Option<String> {
    let message = match body {
        Value::String(text) => Some(text.clone()),
        _ => ServerErrorBody::from_value(body).message,
    };
    message.filter(|m| !m.trim().is_empty())
}

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Key;
use diesel::{
    SqliteConnection,
    connection::TransactionManager,
    r2d2::{ConnectionManager, Pool, PooledConnection},
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{storage::ObjectStore, util_resp::FailureResponse};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: DbPool,
    pub key: Key,
    pub store: ObjectStore,
}

/// The connection checked out for the current request (if any), along with
/// whether a transaction was opened on it.
#[derive(Clone, Default)]
struct RequestConn(Arc<Mutex<Option<(bool, Arc<Mutex<PooledConn>>)>>>);

/// Commits the transaction opened for a request once the handler has
/// produced a response, or rolls it back if the response is an error.
pub async fn tx_commit(mut req: Request, next: Next) -> Response {
    let slot = RequestConn::default();
    req.extensions_mut().insert(slot.clone());

    let res = next.run(req).await;

    let taken = slot.0.lock().await.take();
    if let Some((true, conn)) = taken {
        let mut conn = conn.lock().await;

        let keep = res.status().is_success()
            || res.status().is_redirection()
            || res.status().is_informational();

        let outcome = if keep {
            <PooledConn as diesel::Connection>::TransactionManager::commit_transaction(&mut *conn)
        } else {
            <PooledConn as diesel::Connection>::TransactionManager::rollback_transaction(&mut *conn)
        };

        if let Err(e) = outcome {
            tracing::error!("failed to finish request transaction: {e}");
            return FailureResponse::ServerError(()).into_response();
        }
    }

    res
}

#[derive(Clone)]
pub struct ThreadSafeConn<const TX: bool> {
    pub inner: Arc<Mutex<PooledConn>>,
}

#[async_trait]
impl<S, const TX: bool> FromRequestParts<S> for ThreadSafeConn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let slot = parts
            .extensions
            .get::<RequestConn>()
            .cloned()
            .unwrap_or_default();

        let mut slot = slot.0.lock().await;
        if let Some((_, conn)) = slot.as_ref() {
            return Ok(ThreadSafeConn {
                inner: conn.clone(),
            });
        }

        let pool = DbPool::from_ref(state);
        let mut conn = tokio::task::spawn_blocking(move || pool.get())
            .await
            .map_err(|e| {
                tracing::error!("connection checkout task failed: {e}");
                FailureResponse::ServerError(())
            })?
            .map_err(|e| {
                tracing::error!("could not check out a connection: {e}");
                FailureResponse::ServerError(())
            })?;

        if TX {
            <PooledConn as diesel::Connection>::TransactionManager::begin_transaction(&mut conn)?;
        }

        let inner = Arc::new(Mutex::new(conn));
        *slot = Some((TX, inner.clone()));

        Ok(ThreadSafeConn { inner })
    }
}

pub struct Conn<const TX: bool> {
    inner: OwnedMutexGuard<PooledConn>,
}

impl<const TX: bool> Deref for Conn<TX> {
    type Target = PooledConn;

    fn deref(&self) -> &Self::Target {
        self.inner.deref()
    }
}

impl<const TX: bool> DerefMut for Conn<TX> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.deref_mut()
    }
}

#[async_trait]
impl<S, const TX: bool> FromRequestParts<S> for Conn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let conn = ThreadSafeConn::<TX>::from_request_parts(parts, state).await?;

        Ok(Conn {
            inner: conn.inner.lock_owned().await,
        })
    }
}

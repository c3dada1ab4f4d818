//! `PostgreSQL` repository implementation for task storage.
//!
//! Every mutation runs in a single transaction that first takes a
//! transaction-scoped advisory lock keyed by the owner. Mutations for one
//! owner are therefore serialized, while different owners never contend.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        OwnerId, PersistedTaskData, ReorderRequest, Task, TaskId, TaskText, plan_pending_order,
        position_at, rotate_to_tail,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use std::collections::HashSet;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url` holding at most `max_size`
/// connections.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when the pool cannot open its
/// initial connections.
pub fn build_pool(database_url: &str, max_size: u32) -> TaskRepositoryResult<TaskPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(TaskRepositoryError::persistence)
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }

    /// Runs `f` in a transaction holding the owner's advisory lock.
    async fn run_locked<F, T>(&self, owner: &OwnerId, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection, &OwnerId) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let locked_owner = owner.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx_conn| {
                lock_owner(tx_conn, &locked_owner)?;
                f(tx_conn, &locked_owner)
            })
        })
        .await
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn list_pending(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let lookup_owner = owner.clone();
        self.run_blocking(move |connection| load_pending(connection, &lookup_owner))
            .await
    }

    async fn list_completed(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let lookup_owner = owner.clone();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(lookup_owner.as_str()))
                .filter(tasks::completed_at.is_not_null())
                .filter(tasks::archived_at.is_null())
                .order((tasks::completed_at.asc(), tasks::created_at.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_archived(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let lookup_owner = owner.clone();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(lookup_owner.as_str()))
                .filter(tasks::archived_at.is_not_null())
                .order((tasks::archived_at.asc(), tasks::created_at.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let lookup_owner = owner.clone();
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::owner_id.eq(lookup_owner.as_str()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn create(
        &self,
        owner: &OwnerId,
        text: &TaskText,
        created_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        let task_text = text.clone();
        self.run_locked(owner, move |connection, locked_owner| {
            let position = pending_count(connection, locked_owner)?;
            let task = Task::new(locked_owner.clone(), task_text, position, created_at);
            let new_row = new_task_row(&task)?;

            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _,
                    ) => TaskRepositoryError::DuplicateTask(task.id()),
                    other => TaskRepositoryError::persistence(other),
                })?;
            row_to_task(row)
        })
        .await
    }

    async fn complete(
        &self,
        owner: &OwnerId,
        id: TaskId,
        completed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.run_locked(owner, move |connection, locked_owner| {
            let row = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::owner_id.eq(locked_owner.as_str()))
                    .filter(tasks::completed_at.is_null())
                    .filter(tasks::archived_at.is_null()),
            )
            .set(tasks::completed_at.eq(Some(completed_at)))
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(connection)
            .optional()?
            .ok_or(TaskRepositoryError::NotFound(id))?;

            let remaining = pending_ids(connection, locked_owner)?;
            renumber(connection, &remaining)?;
            row_to_task(row)
        })
        .await
    }

    async fn reorder(&self, owner: &OwnerId, request: &ReorderRequest) -> TaskRepositoryResult<()> {
        let requested = request.clone();
        self.run_locked(owner, move |connection, locked_owner| {
            let requested_uuids: Vec<Uuid> =
                requested.ids().iter().map(|id| id.into_inner()).collect();
            let owned: HashSet<Uuid> = tasks::table
                .filter(tasks::owner_id.eq(locked_owner.as_str()))
                .filter(tasks::id.eq_any(requested_uuids))
                .select(tasks::id)
                .load::<Uuid>(connection)?
                .into_iter()
                .collect();
            if let Some(unknown) = requested
                .ids()
                .iter()
                .find(|id| !owned.contains(&id.into_inner()))
            {
                return Err(TaskRepositoryError::UnknownTaskInOrder(*unknown));
            }

            let current = pending_ids(connection, locked_owner)?;
            renumber(connection, &plan_pending_order(&current, &requested))
        })
        .await
    }

    async fn rotate_pending(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_locked(owner, move |connection, locked_owner| {
            let current = pending_ids(connection, locked_owner)?;
            if current.len() > 1 {
                renumber(connection, &rotate_to_tail(current))?;
            }
            load_pending(connection, locked_owner)
        })
        .await
    }

    async fn archive_completed(
        &self,
        owner: &OwnerId,
        archived_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<u64> {
        self.run_locked(owner, move |connection, locked_owner| {
            let archived = diesel::update(
                tasks::table
                    .filter(tasks::owner_id.eq(locked_owner.as_str()))
                    .filter(tasks::completed_at.is_not_null())
                    .filter(tasks::archived_at.is_null()),
            )
            .set(tasks::archived_at.eq(Some(archived_at)))
            .execute(connection)?;
            Ok(affected(archived))
        })
        .await
    }

    async fn restore(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<Task> {
        self.run_locked(owner, move |connection, locked_owner| {
            let tail = pending_count(connection, locked_owner)?;
            let row = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::owner_id.eq(locked_owner.as_str()))
                    .filter(tasks::archived_at.is_not_null()),
            )
            .set((
                tasks::completed_at.eq(None::<DateTime<Utc>>),
                tasks::archived_at.eq(None::<DateTime<Utc>>),
                tasks::position.eq(stored_position(tail)?),
            ))
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(connection)
            .optional()?
            .ok_or(TaskRepositoryError::NotFound(id))?;
            row_to_task(row)
        })
        .await
    }

    async fn permanent_delete(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_locked(owner, move |connection, locked_owner| {
            let deleted = diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::owner_id.eq(locked_owner.as_str()))
                    .filter(tasks::archived_at.is_not_null()),
            )
            .execute(connection)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn empty_bin(&self, owner: &OwnerId) -> TaskRepositoryResult<u64> {
        self.run_locked(owner, move |connection, locked_owner| {
            let deleted = diesel::delete(
                tasks::table
                    .filter(tasks::owner_id.eq(locked_owner.as_str()))
                    .filter(tasks::archived_at.is_not_null()),
            )
            .execute(connection)?;
            Ok(affected(deleted))
        })
        .await
    }
}

/// Serializes mutations for one owner until the surrounding transaction ends.
fn lock_owner(connection: &mut PgConnection, owner: &OwnerId) -> TaskRepositoryResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind::<diesel::sql_types::Text, _>(owner.as_str())
        .execute(connection)?;
    Ok(())
}

fn load_pending(connection: &mut PgConnection, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
    let rows = tasks::table
        .filter(tasks::owner_id.eq(owner.as_str()))
        .filter(tasks::completed_at.is_null())
        .filter(tasks::archived_at.is_null())
        .order((tasks::position.asc(), tasks::created_at.asc()))
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)?;
    rows.into_iter().map(row_to_task).collect()
}

fn pending_count(connection: &mut PgConnection, owner: &OwnerId) -> TaskRepositoryResult<u32> {
    let count: i64 = tasks::table
        .filter(tasks::owner_id.eq(owner.as_str()))
        .filter(tasks::completed_at.is_null())
        .filter(tasks::archived_at.is_null())
        .count()
        .get_result(connection)?;
    u32::try_from(count).map_err(TaskRepositoryError::persistence)
}

fn pending_ids(connection: &mut PgConnection, owner: &OwnerId) -> TaskRepositoryResult<Vec<TaskId>> {
    let ids = tasks::table
        .filter(tasks::owner_id.eq(owner.as_str()))
        .filter(tasks::completed_at.is_null())
        .filter(tasks::archived_at.is_null())
        .order((tasks::position.asc(), tasks::created_at.asc()))
        .select(tasks::id)
        .load::<Uuid>(connection)?;
    Ok(ids.into_iter().map(TaskId::from_uuid).collect())
}

/// Assigns positions `0..N-1` following `order`.
fn renumber(connection: &mut PgConnection, order: &[TaskId]) -> TaskRepositoryResult<()> {
    for (index, id) in order.iter().enumerate() {
        diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
            .set(tasks::position.eq(stored_position(position_at(index))?))
            .execute(connection)?;
    }
    Ok(())
}

fn new_task_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner_id().as_str().to_owned(),
        text: task.text().as_str().to_owned(),
        position: stored_position(task.position())?,
        created_at: task.created_at(),
    })
}

fn stored_position(position: u32) -> TaskRepositoryResult<i32> {
    i32::try_from(position).map_err(TaskRepositoryError::persistence)
}

fn affected(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id: stored_owner,
        text: stored_text,
        position: raw_position,
        created_at,
        completed_at,
        archived_at,
    } = row;

    let owner_id = OwnerId::new(stored_owner).map_err(TaskRepositoryError::persistence)?;
    // Stored text was validated on the way in; the limit may have changed since.
    let text =
        TaskText::with_limit(stored_text, usize::MAX).map_err(TaskRepositoryError::persistence)?;
    let position = u32::try_from(raw_position).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner_id,
        text,
        position,
        created_at,
        completed_at,
        archived_at,
    }))
}

//! In-memory repository for task lists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        OwnerId, ReorderRequest, Task, TaskId, TaskText, plan_pending_order, position_at,
        rotate_to_tail,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Every mutation holds the write lock for its whole duration, so each call
/// is atomic and calls for the same owner are serialized.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    fn owned_mut(&mut self, owner: &OwnerId, id: TaskId) -> Option<&mut Task> {
        self.tasks
            .get_mut(&id)
            .filter(|task| task.owner_id() == owner)
    }

    fn collect_sorted<K, F>(&self, owner: &OwnerId, include: F, key: K) -> Vec<Task>
    where
        F: Fn(&Task) -> bool,
        K: Fn(&Task) -> (Option<DateTime<Utc>>, u32, DateTime<Utc>),
    {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| task.owner_id() == owner && include(*task))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| key(task));
        tasks
    }

    fn pending(&self, owner: &OwnerId) -> Vec<Task> {
        self.collect_sorted(owner, Task::is_pending, |task| {
            (None, task.position(), task.created_at())
        })
    }

    fn pending_ids(&self, owner: &OwnerId) -> Vec<TaskId> {
        self.pending(owner).iter().map(Task::id).collect()
    }

    /// Assigns positions `0..N-1` following `order`.
    fn renumber(&mut self, order: &[TaskId]) {
        for (index, id) in order.iter().enumerate() {
            if let Some(task) = self.tasks.get_mut(id) {
                task.reposition(position_at(index));
            }
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list_pending(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        Ok(self.read()?.pending(owner))
    }

    async fn list_completed(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state.collect_sorted(
            owner,
            |task| task.completed_at().is_some() && !task.is_archived(),
            |task| (task.completed_at(), task.position(), task.created_at()),
        ))
    }

    async fn list_archived(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state.collect_sorted(owner, Task::is_archived, |task| {
            (task.archived_at(), task.position(), task.created_at())
        }))
    }

    async fn find(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .get(&id)
            .filter(|task| task.owner_id() == owner)
            .cloned())
    }

    async fn create(
        &self,
        owner: &OwnerId,
        text: &TaskText,
        created_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let position = position_at(state.pending(owner).len());
        let task = Task::new(owner.clone(), text.clone(), position, created_at);

        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(task)
    }

    async fn complete(
        &self,
        owner: &OwnerId,
        id: TaskId,
        completed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let task = state
            .owned_mut(owner, id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        task.mark_completed(completed_at)
            .map_err(|_| TaskRepositoryError::NotFound(id))?;
        let completed = task.clone();

        let remaining = state.pending_ids(owner);
        state.renumber(&remaining);
        Ok(completed)
    }

    async fn reorder(&self, owner: &OwnerId, request: &ReorderRequest) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let owned: HashSet<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.owner_id() == owner)
            .map(Task::id)
            .collect();
        if let Some(unknown) = request.ids().iter().find(|id| !owned.contains(*id)) {
            return Err(TaskRepositoryError::UnknownTaskInOrder(*unknown));
        }

        let planned = plan_pending_order(&state.pending_ids(owner), request);
        state.renumber(&planned);
        Ok(())
    }

    async fn rotate_pending(&self, owner: &OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let mut state = self.write()?;
        let current = state.pending_ids(owner);
        if current.len() > 1 {
            state.renumber(&rotate_to_tail(current));
        }
        Ok(state.pending(owner))
    }

    async fn archive_completed(
        &self,
        owner: &OwnerId,
        archived_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let mut archived = 0_u64;
        for task in state
            .tasks
            .values_mut()
            .filter(|task| task.owner_id() == owner)
        {
            if task.mark_archived(archived_at).is_ok() {
                archived += 1;
            }
        }
        Ok(archived)
    }

    async fn restore(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let tail = position_at(state.pending(owner).len());
        let task = state
            .owned_mut(owner, id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        task.restore(tail)
            .map_err(|_| TaskRepositoryError::NotFound(id))?;
        Ok(task.clone())
    }

    async fn permanent_delete(&self, owner: &OwnerId, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let task = state
            .owned_mut(owner, id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        task.ensure_deletable()
            .map_err(|_| TaskRepositoryError::NotFound(id))?;
        state.tasks.remove(&id);
        Ok(())
    }

    async fn empty_bin(&self, owner: &OwnerId) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let before = state.tasks.len();
        state
            .tasks
            .retain(|_, task| task.owner_id() != owner || !task.is_archived());
        Ok(u64::try_from(before - state.tasks.len()).unwrap_or(u64::MAX))
    }
}

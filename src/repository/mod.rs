//! CRUD access to employee records.
//!
//! Not-found is an ordinary `None`/`false` outcome, never an error. The
//! trait methods return boxed futures so the repository stays usable behind
//! `Arc<dyn EmployeeRepository>` across handler closures.

use std::{future::Future, pin::Pin};

use tokio::sync::RwLock;

use crate::employee::{Employee, EmployeeDraft};

/// Boxed future returned by repository operations.
pub type RepoFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The abstraction owning CRUD access to the employee collection.
pub trait EmployeeRepository: Send + Sync {
    /// Returns every employee.
    fn list(&self) -> RepoFuture<'_, Vec<Employee>>;

    /// Returns the employee with the given id, if present.
    fn get(&self, id: u64) -> RepoFuture<'_, Option<Employee>>;

    /// Stores a new employee under a freshly assigned id and returns it.
    fn add(&self, draft: EmployeeDraft) -> RepoFuture<'_, Employee>;

    /// Replaces the fields of the employee with the given id, returning the
    /// updated record, or `None` when the id is unknown.
    fn update(&self, id: u64, draft: EmployeeDraft) -> RepoFuture<'_, Option<Employee>>;

    /// Deletes the employee with the given id. Returns `false` when the id
    /// is unknown.
    fn remove(&self, id: u64) -> RepoFuture<'_, bool>;
}

// Records and the id watermark live under one lock so concurrent adds
// serialize and ids stay unique and strictly increasing.
struct Inner {
    records: Vec<Employee>,
    next_id: u64,
}

/// In-memory, process-lifetime employee store.
///
/// Safe for concurrent readers and writers; racing updates to the same id
/// resolve last-write-wins. Ids are assigned one past the highest id ever
/// stored, so deleting a record never makes its id available again.
pub struct InMemoryEmployeeRepository {
    inner: RwLock<Inner>,
}

impl InMemoryEmployeeRepository {
    /// Creates a repository over the given initial records.
    pub fn new(records: Vec<Employee>) -> Self {
        let next_id = records.iter().map(|e| e.id).max().map_or(1, |max| max + 1);
        Self {
            inner: RwLock::new(Inner { records, next_id }),
        }
    }

    /// Creates an empty repository.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Creates a repository with the canonical sample data set.
    pub fn seeded() -> Self {
        Self::new(vec![
            Employee {
                id: 1,
                name: "John Doe".to_owned(),
                position: "Software Engineer".to_owned(),
                salary: 60_000.0,
            },
            Employee {
                id: 2,
                name: "Jane Smith".to_owned(),
                position: "Project Manager".to_owned(),
                salary: 80_000.0,
            },
        ])
    }
}

impl EmployeeRepository for InMemoryEmployeeRepository {
    fn list(&self) -> RepoFuture<'_, Vec<Employee>> {
        Box::pin(async move { self.inner.read().await.records.clone() })
    }

    fn get(&self, id: u64) -> RepoFuture<'_, Option<Employee>> {
        Box::pin(async move {
            self.inner
                .read()
                .await
                .records
                .iter()
                .find(|e| e.id == id)
                .cloned()
        })
    }

    fn add(&self, draft: EmployeeDraft) -> RepoFuture<'_, Employee> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            let id = inner.next_id;
            inner.next_id = id + 1;
            let employee = draft.into_employee(id);
            inner.records.push(employee.clone());
            employee
        })
    }

    fn update(&self, id: u64, draft: EmployeeDraft) -> RepoFuture<'_, Option<Employee>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            let record = inner.records.iter_mut().find(|e| e.id == id)?;
            record.name = draft.name;
            record.position = draft.position;
            record.salary = draft.salary;
            Some(record.clone())
        })
    }

    fn remove(&self, id: u64) -> RepoFuture<'_, bool> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            match inner.records.iter().position(|e| e.id == id) {
                Some(index) => {
                    inner.records.remove(index);
                    true
                }
                None => false,
            }
        })
    }
}

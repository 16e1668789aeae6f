//! Roster store: the employee collection, persisted as a full snapshot on every change.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::StorageError;
use crate::models::{Employee, EmployeePatch, EmployeeStatus, NewEmployee};
use crate::notify::Notice;
use crate::storage::EMPLOYEES;
use crate::Backend;

pub struct RosterStore {
    backend: Backend,
    employees: RwLock<Vec<Employee>>,
    in_flight: AtomicUsize,
}

/// Marks a mutation as in flight until dropped.
struct Loading<'a>(&'a AtomicUsize);

impl<'a> Loading<'a> {
    fn begin(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RosterStore {
    /// Load the persisted roster verbatim, or seed and persist the bootstrap set.
    pub fn initialize(backend: Backend) -> Result<Self, StorageError> {
        let employees = match backend.storage.get::<Vec<Employee>>(EMPLOYEES)? {
            Some(employees) => {
                tracing::info!(count = employees.len(), "roster loaded");
                employees
            }
            None => {
                let employees = bootstrap();
                backend.storage.put(EMPLOYEES, &employees)?;
                tracing::info!(count = employees.len(), "roster seeded with bootstrap set");
                employees
            }
        };
        Ok(Self {
            backend,
            employees: RwLock::new(employees),
            in_flight: AtomicUsize::new(0),
        })
    }

    /// Snapshot of the roster in insertion order.
    pub fn employees(&self) -> Vec<Employee> {
        self.employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_employee(&self, id: &str) -> Option<Employee> {
        self.employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|employee| employee.id == id)
            .cloned()
    }

    /// True while any add/update/delete is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Case-insensitive match on full name, email, department or role.
    pub fn search(&self, term: &str) -> Vec<Employee> {
        let needle = term.to_lowercase();
        self.employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|employee| {
                employee.full_name().to_lowercase().contains(&needle)
                    || employee.email.to_lowercase().contains(&needle)
                    || employee.department.to_lowercase().contains(&needle)
                    || employee.role.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub async fn add_employee(&self, employee: NewEmployee) -> bool {
        let _loading = Loading::begin(&self.in_flight);
        let mut employees = self.employees();
        self.backend.latency.wait().await;

        let id = self
            .backend
            .ids
            .mint_unique(|id| employees.iter().any(|employee| employee.id == id));
        let description = format!(
            "{} {} has been added successfully.",
            employee.first_name, employee.last_name
        );
        employees.push(employee.into_employee(id.clone()));

        if let Err(e) = self.save(employees) {
            return self.fault("Failed to add employee. Please try again.", e);
        }
        tracing::info!(employee_id = %id, "employee added");
        self.notify(Notice::info("Employee Added", description));
        true
    }

    /// Merge `patch` over the record with `id`. An unknown id leaves the
    /// roster unchanged and still succeeds.
    pub async fn update_employee(&self, id: &str, patch: &EmployeePatch) -> bool {
        let _loading = Loading::begin(&self.in_flight);
        let mut employees = self.employees();
        self.backend.latency.wait().await;

        match employees.iter_mut().find(|employee| employee.id == id) {
            Some(employee) => employee.apply(patch),
            None => tracing::debug!(employee_id = id, "update targets no employee"),
        }

        if let Err(e) = self.save(employees) {
            return self.fault("Failed to update employee. Please try again.", e);
        }
        tracing::info!(employee_id = id, "employee updated");
        self.notify(Notice::info(
            "Employee Updated",
            "Employee information has been updated successfully.",
        ));
        true
    }

    /// Remove the record with `id`; deleting an unknown id still succeeds.
    pub async fn delete_employee(&self, id: &str) -> bool {
        let _loading = Loading::begin(&self.in_flight);
        let mut employees = self.employees();
        self.backend.latency.wait().await;

        let before = employees.len();
        employees.retain(|employee| employee.id != id);
        if employees.len() == before {
            tracing::debug!(employee_id = id, "delete targets no employee");
        }

        if let Err(e) = self.save(employees) {
            return self.fault("Failed to delete employee. Please try again.", e);
        }
        tracing::info!(employee_id = id, "employee deleted");
        self.notify(Notice::info(
            "Employee Deleted",
            "Employee has been removed successfully.",
        ));
        true
    }

    /// Persist the whole collection, then make it current.
    fn save(&self, employees: Vec<Employee>) -> Result<(), StorageError> {
        self.backend.storage.put(EMPLOYEES, &employees)?;
        *self.employees.write().unwrap_or_else(PoisonError::into_inner) = employees;
        Ok(())
    }

    fn notify(&self, notice: Notice) {
        self.backend.notifier.notify(notice);
    }

    fn fault(&self, description: &str, error: StorageError) -> bool {
        tracing::error!(error = %error, "roster operation failed");
        self.notify(Notice::destructive("Error", description));
        false
    }
}

/// Sample roster seeded into a fresh environment.
pub fn bootstrap() -> Vec<Employee> {
    vec![
        Employee {
            id: "1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@company.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            department: "Engineering".to_string(),
            role: "Senior Developer".to_string(),
            status: EmployeeStatus::Active,
            date_joined: "2023-01-15".to_string(),
            avatar: None,
        },
        Employee {
            id: "2".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            email: "jane.smith@company.com".to_string(),
            phone: "+1 (555) 234-5678".to_string(),
            department: "Marketing".to_string(),
            role: "Marketing Manager".to_string(),
            status: EmployeeStatus::Active,
            date_joined: "2023-03-20".to_string(),
            avatar: None,
        },
        Employee {
            id: "3".to_string(),
            first_name: "Mike".to_string(),
            last_name: "Johnson".to_string(),
            email: "mike.johnson@company.com".to_string(),
            phone: "+1 (555) 345-6789".to_string(),
            department: "Sales".to_string(),
            role: "Sales Representative".to_string(),
            status: EmployeeStatus::Inactive,
            date_joined: "2023-02-10".to_string(),
            avatar: None,
        },
    ]
}

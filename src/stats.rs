//! Dashboard figures derived from a roster snapshot.

use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Employee, EmployeeStatus};

/// How many employees the "recent" list shows.
pub const RECENT_LIMIT: usize = 5;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DepartmentCount {
    pub name: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Distinct departments in first-seen order.
    pub departments: Vec<DepartmentCount>,
    /// Latest joiners first, at most [`RECENT_LIMIT`].
    pub recent: Vec<Employee>,
}

impl DashboardStats {
    /// Computed on a copy: the caller's roster order is never touched.
    pub fn compute(employees: &[Employee]) -> Self {
        let count_status = |status: EmployeeStatus| {
            employees
                .iter()
                .filter(|employee| employee.status == status)
                .count()
        };

        let mut departments: Vec<DepartmentCount> = Vec::new();
        for employee in employees {
            match departments
                .iter_mut()
                .find(|department| department.name == employee.department)
            {
                Some(department) => department.count += 1,
                None => departments.push(DepartmentCount {
                    name: employee.department.clone(),
                    count: 1,
                }),
            }
        }

        let mut recent = employees.to_vec();
        // Stable: equal dates keep roster order. Unparseable dates sort last.
        recent.sort_by_cached_key(|employee| Reverse(joined_on(employee)));
        recent.truncate(RECENT_LIMIT);

        Self {
            total: employees.len(),
            active: count_status(EmployeeStatus::Active),
            inactive: count_status(EmployeeStatus::Inactive),
            departments,
            recent,
        }
    }

    pub fn department_count(&self) -> usize {
        self.departments.len()
    }
}

fn joined_on(employee: &Employee) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&employee.date_joined, "%Y-%m-%d").ok()
}

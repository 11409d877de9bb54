use crate::models::{Employee, EmployeeFilter, ServiceError};
use crate::repositories::EmployeeRepository;
use std::sync::Arc;

/// Thin facade over the employee directory: lookups for handlers and login
/// code assignment with duplicate protection.
pub struct EmployeeService {
    employees: Arc<dyn EmployeeRepository>,
}

impl EmployeeService {
    pub fn new(employees: Arc<dyn EmployeeRepository>) -> Self {
        Self { employees }
    }

    pub async fn lookup(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ServiceError> {
        self.employees.lookup(filter).await
    }

    pub async fn find(&self, id: i64) -> Result<Option<Employee>, ServiceError> {
        self.employees.find_by_id(id).await
    }

    pub async fn set_login_code(
        &self,
        employee_id: i64,
        login_code: &str,
    ) -> Result<Employee, ServiceError> {
        if login_code.is_empty() {
            return Err(ServiceError::Validation("Invalid login code".to_string()));
        }
        if let Some(existing) = self.employees.find_by_login_code(login_code).await? {
            if existing.id != employee_id {
                return Err(ServiceError::Validation(format!(
                    "Login code '{}' is already in use.",
                    login_code
                )));
            }
        }
        self.employees
            .update_login_code(employee_id, login_code)
            .await?;
        self.employees
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {} not found", employee_id)))
    }
}

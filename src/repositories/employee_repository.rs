use crate::models::{Employee, EmployeeFilter, ServiceError};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Employee directory collaborator. Pay method and active status returned
/// here gate salary reconciliation; login codes identify punch-clock users.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, ServiceError>;
    /// Active employees only; the punch clock refuses inactive login codes.
    async fn find_by_login_code(&self, login_code: &str)
        -> Result<Option<Employee>, ServiceError>;
    async fn lookup(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ServiceError>;
    async fn update_login_code(&self, id: i64, login_code: &str) -> Result<(), ServiceError>;
}

pub struct SqliteEmployeeRepository {
    pool: SqlitePool,
}

impl SqliteEmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const EMPLOYEE_SELECT: &str = "SELECT id, employee_key, first_name, last_name, department, \
     employee_number, login_code, pay_method, status FROM employees";

#[async_trait]
impl EmployeeRepository for SqliteEmployeeRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, ServiceError> {
        let employee = sqlx::query_as::<_, Employee>(&format!("{} WHERE id = ?", EMPLOYEE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn find_by_login_code(
        &self,
        login_code: &str,
    ) -> Result<Option<Employee>, ServiceError> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "{} WHERE login_code = ? AND status = 'A'",
            EMPLOYEE_SELECT
        ))
        .bind(login_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn lookup(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ServiceError> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            "{} WHERE (? IS NULL OR id = ?) \
             AND (? IS NULL OR login_code = ?) \
             AND (? IS NULL OR department = ?) \
             AND (? IS NULL OR employee_number = ?) \
             ORDER BY first_name, last_name, employee_number",
            EMPLOYEE_SELECT
        ))
        .bind(filter.id)
        .bind(filter.id)
        .bind(&filter.login_code)
        .bind(&filter.login_code)
        .bind(&filter.department)
        .bind(&filter.department)
        .bind(&filter.employee_number)
        .bind(&filter.employee_number)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn update_login_code(&self, id: i64, login_code: &str) -> Result<(), ServiceError> {
        sqlx::query("UPDATE employees SET login_code = ? WHERE id = ?")
            .bind(login_code)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Employee directory record. `pay_method` is "H" (hourly) or "S"
/// (salaried); `status` is "A" while the employee is active. Both feed the
/// salary reconciliation gate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub employee_key: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub employee_number: String,
    pub login_code: Option<String>,
    pub pay_method: String,
    pub status: String,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == "A"
    }

    pub fn is_salaried(&self) -> bool {
        self.pay_method == "S"
    }
}

/// Directory lookup filter: by id, by login code, or by department +
/// employee number. An empty filter matches everyone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    pub id: Option<i64>,
    pub login_code: Option<String>,
    pub department: Option<String>,
    pub employee_number: Option<String>,
}

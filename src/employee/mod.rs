//! The employee record and its field constraints.

use serde::{Deserialize, Serialize};

use crate::middleware::validation::Validate;

/// Inclusive salary bounds enforced on create and update.
pub const SALARY_MIN: f64 = 30_000.0;
pub const SALARY_MAX: f64 = 200_000.0;

const NAME_MAX_LEN: usize = 100;
const POSITION_MAX_LEN: usize = 50;

/// A stored employee record.
///
/// Wire shape: `{"Id": 1, "Name": "...", "Position": "...", "Salary": 60000.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub position: String,
    pub salary: f64,
}

/// An employee payload without an identifier, as bound from POST and PUT
/// bodies. Any client-supplied `Id` field is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmployeeDraft {
    pub name: String,
    pub position: String,
    pub salary: f64,
}

impl EmployeeDraft {
    /// Materializes the draft into a record under the given id.
    pub fn into_employee(self, id: u64) -> Employee {
        Employee {
            id,
            name: self.name,
            position: self.position,
            salary: self.salary,
        }
    }
}

impl Validate for EmployeeDraft {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push("Name is required".to_owned());
        } else if self.name.chars().count() > NAME_MAX_LEN {
            violations.push(format!("Name cannot exceed {NAME_MAX_LEN} characters"));
        }

        if self.position.trim().is_empty() {
            violations.push("Position is required".to_owned());
        } else if self.position.chars().count() > POSITION_MAX_LEN {
            violations.push(format!(
                "Position cannot exceed {POSITION_MAX_LEN} characters"
            ));
        }

        if !(SALARY_MIN..=SALARY_MAX).contains(&self.salary) {
            violations.push(format!(
                "Salary must be between {SALARY_MIN} and {SALARY_MAX}"
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{EmployeeStore, StoreError, UserStore};
use crate::models::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::models::file::StoredFile;
use crate::models::user::User;

/// In-process store with the same contract as [`super::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    employees: Mutex<Vec<Employee>>,
    users: Mutex<Vec<User>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Matches the `LOWER(email)` unique index, including non-ASCII addresses.
fn email_taken(employees: &[Employee], email: &str, except: Option<Uuid>) -> bool {
    let email = email.to_lowercase();
    employees
        .iter()
        .any(|e| Some(e.id) != except && e.email.to_lowercase() == email)
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert_employee(
        &self,
        employee: NewEmployee,
        image: Option<StoredFile>,
    ) -> Result<Employee, StoreError> {
        let mut employees = lock(&self.employees);
        if email_taken(&employees, &employee.email, None) {
            return Err(StoreError::DuplicateEmail(employee.email));
        }

        let now = Utc::now();
        let record = Employee {
            id: Uuid::new_v4(),
            name: employee.name,
            email: employee.email,
            mobile: employee.mobile,
            designation: employee.designation,
            course: employee.course,
            gender: employee.gender,
            image: image.as_ref().map(|file| file.uri.clone()),
            image_key: image.map(|file| file.key),
            created_at: now,
            updated_at: now,
        };
        employees.push(record.clone());
        Ok(record)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(lock(&self.employees).clone())
    }

    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        Ok(lock(&self.employees).iter().find(|e| e.id == id).cloned())
    }

    async fn update_employee(
        &self,
        id: Uuid,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, StoreError> {
        let mut employees = lock(&self.employees);
        let Some(index) = employees.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(email) = &update.email {
            if email_taken(&employees, email, Some(id)) {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
        }

        let employee = &mut employees[index];
        update.apply_to(employee, Utc::now());
        Ok(Some(employee.clone()))
    }

    async fn delete_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        let mut employees = lock(&self.employees);
        Ok(employees
            .iter()
            .position(|e| e.id == id)
            .map(|index| employees.remove(index)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::employee::{Course, Designation, Gender};
    use pretty_assertions::assert_eq;

    fn new_employee(email: &str) -> NewEmployee {
        NewEmployee {
            name: "Jo".to_string(),
            email: email.to_string(),
            mobile: "5551234".to_string(),
            designation: Designation::Developer,
            course: [Course::Bca].into_iter().collect(),
            gender: Gender::Male,
        }
    }

    #[test_log::test(tokio::test)]
    async fn lists_in_insertion_order() {
        let store = MemoryStore::new();
        for email in ["c@x.com", "a@x.com", "b@x.com"] {
            store.insert_employee(new_employee(email), None).await.unwrap();
        }

        let emails = store
            .list_employees()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.email)
            .collect::<Vec<_>>();
        assert_eq!(emails, vec!["c@x.com", "a@x.com", "b@x.com"]);
    }

    #[test_log::test(tokio::test)]
    async fn email_uniqueness_ignores_case() {
        let store = MemoryStore::new();
        store.insert_employee(new_employee("jo@x.com"), None).await.unwrap();

        let err = store
            .insert_employee(new_employee("JO@X.com"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
        assert_eq!(store.list_employees().await.unwrap().len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn update_keeps_own_email_and_rejects_anothers() {
        let store = MemoryStore::new();
        let jo = store.insert_employee(new_employee("jo@x.com"), None).await.unwrap();
        store.insert_employee(new_employee("al@x.com"), None).await.unwrap();

        let same = EmployeeUpdate {
            email: Some("JO@x.com".to_string()),
            course: Some(BTreeSet::new()),
            ..EmployeeUpdate::default()
        };
        let updated = store.update_employee(jo.id, &same).await.unwrap().unwrap();
        assert_eq!(updated.email, "JO@x.com");
        assert!(updated.course.is_empty());
        assert_eq!(updated.id, jo.id);

        let taken = EmployeeUpdate {
            email: Some("al@x.com".to_string()),
            ..EmployeeUpdate::default()
        };
        assert!(matches!(
            store.update_employee(jo.id, &taken).await,
            Err(StoreError::DuplicateEmail(_))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn email_uniqueness_folds_non_ascii_case() {
        let store = MemoryStore::new();
        store
            .insert_employee(new_employee("élodie@exämple.com"), None)
            .await
            .unwrap();

        let err = store
            .insert_employee(new_employee("ÉLODIE@EXÄMPLE.COM"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    #[test_log::test(tokio::test)]
    async fn update_of_missing_record_is_not_found_before_email_check() {
        let store = MemoryStore::new();
        store.insert_employee(new_employee("al@x.com"), None).await.unwrap();

        let update = EmployeeUpdate {
            email: Some("al@x.com".to_string()),
            ..EmployeeUpdate::default()
        };
        assert_eq!(store.update_employee(Uuid::new_v4(), &update).await.unwrap(), None);
    }

    #[test_log::test(tokio::test)]
    async fn delete_returns_removed_record_once() {
        let store = MemoryStore::new();
        let jo = store.insert_employee(new_employee("jo@x.com"), None).await.unwrap();

        assert_eq!(store.delete_employee(jo.id).await.unwrap(), Some(jo.clone()));
        assert_eq!(store.delete_employee(jo.id).await.unwrap(), None);
        assert_eq!(store.get_employee(jo.id).await.unwrap(), None);
    }

    #[test_log::test(tokio::test)]
    async fn usernames_are_unique() {
        let store = MemoryStore::new();
        store.insert_user("admin", "hash").await.unwrap();

        assert!(matches!(
            store.insert_user("admin", "other").await,
            Err(StoreError::DuplicateUsername(_))
        ));
        assert_eq!(
            store.find_user("admin").await.unwrap().unwrap().password_hash,
            "hash"
        );
    }
}

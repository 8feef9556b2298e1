use std::collections::BTreeSet;

use super::{ClientError, CreateEmployeeRequest, EmployeeApi, ImageFile, Session};
use crate::models::employee::{Course, Designation, Employee, Gender};
use crate::utils::validation::is_mobile_prefix;

pub const SUCCESS_MESSAGE: &str = "Employee added successfully!";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to add employee";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
    Succeeded(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Employee),
    /// Required fields were empty; nothing was sent.
    Invalid(Vec<&'static str>),
    Failed(String),
    /// The service rejected the session's token.
    Unauthorized(String),
    /// A submission is already pending.
    Busy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: Option<Designation>,
    pub course: BTreeSet<Course>,
    pub gender: Option<Gender>,
}

/// The add-employee form.
///
/// Editing moves to submitting on submit, then to succeeded (fields reset)
/// or failed (fields kept). Any further input returns it to editing.
#[derive(Debug, Clone)]
pub struct EmployeeForm {
    fields: FormFields,
    image: Option<ImageFile>,
    status: FormStatus,
}

impl Default for EmployeeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: FormFields::default(),
            image: None,
            status: FormStatus::Editing,
        }
    }

    #[must_use]
    pub const fn fields(&self) -> &FormFields {
        &self.fields
    }

    #[must_use]
    pub const fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    #[must_use]
    pub const fn status(&self) -> &FormStatus {
        &self.status
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        !matches!(self.status, FormStatus::Submitting)
    }

    fn touch(&mut self) {
        if matches!(self.status, FormStatus::Succeeded(_) | FormStatus::Failed(_)) {
            self.status = FormStatus::Editing;
        }
    }

    pub fn set_name(&mut self, value: &str) {
        self.touch();
        self.fields.name = value.to_string();
    }

    pub fn set_email(&mut self, value: &str) {
        self.touch();
        self.fields.email = value.to_string();
    }

    /// Applies a keystroke to the mobile field. A value with a non-digit or
    /// more than 15 characters is dropped and the field keeps its old value.
    pub fn input_mobile(&mut self, value: &str) -> bool {
        if !is_mobile_prefix(value) {
            return false;
        }
        self.touch();
        self.fields.mobile = value.to_string();
        true
    }

    pub fn set_designation(&mut self, value: Option<Designation>) {
        self.touch();
        self.fields.designation = value;
    }

    pub fn set_gender(&mut self, value: Option<Gender>) {
        self.touch();
        self.fields.gender = value;
    }

    /// Checkbox change for `course`.
    pub fn toggle_course(&mut self, course: Course, checked: bool) {
        self.touch();
        if checked {
            self.fields.course.insert(course);
        } else {
            self.fields.course.remove(&course);
        }
    }

    pub fn set_image(&mut self, image: Option<ImageFile>) {
        self.touch();
        self.image = image;
    }

    /// Names of required fields that are still empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let f = &self.fields;
        [
            ("name", f.name.trim().is_empty()),
            ("email", f.email.trim().is_empty()),
            ("mobile", f.mobile.is_empty()),
            ("designation", f.designation.is_none()),
            ("gender", f.gender.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, missing)| missing.then_some(field))
        .collect()
    }

    /// Moves to submitting and returns the request to send.
    pub fn begin_submit(&mut self) -> Result<CreateEmployeeRequest, SubmitOutcome> {
        if !self.can_submit() {
            return Err(SubmitOutcome::Busy);
        }

        let missing = self.missing_fields();
        let (Some(designation), Some(gender), true) =
            (self.fields.designation, self.fields.gender, missing.is_empty())
        else {
            self.status = FormStatus::Editing;
            return Err(SubmitOutcome::Invalid(missing));
        };

        self.status = FormStatus::Submitting;
        Ok(CreateEmployeeRequest {
            name: self.fields.name.trim().to_string(),
            email: self.fields.email.trim().to_string(),
            mobile: self.fields.mobile.clone(),
            designation,
            course: self.fields.course.clone(),
            gender,
            image: self.image.clone(),
        })
    }

    /// Applies the service response to a submitting form.
    pub fn finish_submit(&mut self, result: Result<Employee, ClientError>) -> SubmitOutcome {
        match result {
            Ok(employee) => {
                self.fields = FormFields::default();
                self.image = None;
                self.status = FormStatus::Succeeded(SUCCESS_MESSAGE.to_string());
                SubmitOutcome::Created(employee)
            }
            Err(err) => {
                log::error!("Failed to add employee: {err}");
                let message = err
                    .server_message()
                    .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                    .to_string();
                self.status = FormStatus::Failed(message.clone());
                if err.is_unauthorized() {
                    SubmitOutcome::Unauthorized(message)
                } else {
                    SubmitOutcome::Failed(message)
                }
            }
        }
    }

    /// Validates, sends once, and applies the response.
    pub async fn submit(&mut self, api: &dyn EmployeeApi, session: &Session) -> SubmitOutcome {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let result = api.create_employee(session, &request).await;
        self.finish_submit(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeApi;
    use pretty_assertions::assert_eq;

    fn filled() -> EmployeeForm {
        let mut form = EmployeeForm::new();
        form.set_name("Jo");
        form.set_email("jo@x.com");
        for (i, _) in "5551234".char_indices() {
            assert!(form.input_mobile(&"5551234"[..=i]));
        }
        form.set_designation(Some(Designation::Developer));
        form.toggle_course(Course::Bca, true);
        form.set_gender(Some(Gender::Male));
        form
    }

    #[test]
    fn mobile_keystrokes_keep_only_digits() {
        let mut form = EmployeeForm::new();
        let keystrokes = ["5", "55", "55a", "55", "555", "555-", "5551", "", "9"];
        for value in keystrokes {
            form.input_mobile(value);
            assert!(form.fields().mobile.bytes().all(|b| b.is_ascii_digit()));
        }
        assert_eq!(form.fields().mobile, "9");

        let mut form = EmployeeForm::new();
        form.input_mobile("123456789012345");
        assert!(!form.input_mobile("1234567890123456"));
        assert_eq!(form.fields().mobile, "123456789012345");
    }

    #[test]
    fn course_toggles_track_checked_boxes() {
        let mut form = EmployeeForm::new();
        form.toggle_course(Course::Mca, true);
        form.toggle_course(Course::Mca, true);
        form.toggle_course(Course::Bca, true);
        form.toggle_course(Course::Bsc, false);
        form.toggle_course(Course::Mca, false);
        form.toggle_course(Course::Bsc, true);

        let expected: BTreeSet<_> = [Course::Bca, Course::Bsc].into_iter().collect();
        assert_eq!(form.fields().course, expected);
    }

    #[test_log::test(tokio::test)]
    async fn empty_required_field_skips_the_service() {
        let api = FakeApi::default();
        let mut form = filled();
        form.set_email("   ");
        form.set_gender(None);

        let outcome = form.submit(&api, &Session::with_token("t")).await;

        assert_eq!(outcome, SubmitOutcome::Invalid(vec!["email", "gender"]));
        assert_eq!(api.calls(), 0);
        assert_eq!(form.status(), &FormStatus::Editing);
        assert_eq!(form.fields().name, "Jo");
    }

    #[test_log::test(tokio::test)]
    async fn success_resets_the_form() {
        let api = FakeApi::default();
        let mut form = filled();
        form.set_image(Some(ImageFile {
            file_name: "jo.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![1, 2, 3],
        }));

        let outcome = form.submit(&api, &Session::with_token("t")).await;

        let SubmitOutcome::Created(employee) = outcome else {
            panic!("expected a created employee, got {outcome:?}");
        };
        assert_eq!(employee.email, "jo@x.com");
        assert_eq!(api.calls(), 1);
        assert_eq!(form.fields(), &FormFields::default());
        assert_eq!(form.image(), None);
        assert_eq!(
            form.status(),
            &FormStatus::Succeeded(SUCCESS_MESSAGE.to_string())
        );
    }

    #[test_log::test(tokio::test)]
    async fn failure_keeps_fields_and_shows_server_message() {
        let api = FakeApi::failing_with(409, Some("Email already exists"));
        let mut form = filled();
        let before = form.fields().clone();

        let outcome = form.submit(&api, &Session::with_token("t")).await;

        assert_eq!(outcome, SubmitOutcome::Failed("Email already exists".to_string()));
        assert_eq!(form.fields(), &before);
        assert_eq!(
            form.status(),
            &FormStatus::Failed("Email already exists".to_string())
        );
        assert!(form.can_submit());
    }

    #[test_log::test(tokio::test)]
    async fn failure_without_message_uses_default() {
        let api = FakeApi::failing_with(500, None);
        let mut form = filled();

        let outcome = form.submit(&api, &Session::with_token("t")).await;

        assert_eq!(outcome, SubmitOutcome::Failed(DEFAULT_FAILURE_MESSAGE.to_string()));
    }

    #[test_log::test(tokio::test)]
    async fn rejected_token_is_reported_as_unauthorized() {
        let api = FakeApi::failing_with(401, Some("Invalid or expired token"));
        let mut form = filled();

        let outcome = form.submit(&api, &Session::with_token("t")).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Unauthorized("Invalid or expired token".to_string())
        );
        assert_eq!(form.fields().name, "Jo");
    }

    #[test]
    fn pending_submission_blocks_another() {
        let mut form = filled();
        let request = form.begin_submit().unwrap();
        assert_eq!(request.course, BTreeSet::from([Course::Bca]));
        assert!(!form.can_submit());

        assert_eq!(form.begin_submit(), Err(SubmitOutcome::Busy));

        form.finish_submit(Err(ClientError::NotLoggedIn));
        assert!(form.can_submit());
    }

    #[test]
    fn input_after_result_returns_to_editing() {
        let mut form = filled();
        form.begin_submit().unwrap();
        form.finish_submit(Err(ClientError::NotLoggedIn));

        form.set_name("Joanna");
        assert_eq!(form.status(), &FormStatus::Editing);
    }
}

use super::form::{EmployeeForm, SubmitOutcome};
use super::{ClientError, EmployeeApi, Session};
use crate::models::employee::Employee;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
}

/// Where to go instead of the dashboard, with the session as it now stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub route: Route,
    pub session: Session,
}

/// The dashboard screen. It owns the session while mounted.
#[derive(Debug)]
pub struct Dashboard {
    session: Session,
    username: String,
    add_panel_visible: bool,
    added: Vec<Employee>,
}

impl Dashboard {
    /// Enters the dashboard if the session's token is accepted by the server.
    ///
    /// A token the server rejects is cleared. Any other failure redirects
    /// but keeps the token so a later attempt can reuse it.
    pub async fn mount(mut session: Session, api: &dyn EmployeeApi) -> Result<Self, Redirect> {
        if !session.is_authenticated() {
            return Err(Redirect {
                route: Route::Login,
                session,
            });
        }

        match api.verify(&session).await {
            Ok(verified) => Ok(Self {
                session,
                username: verified.username,
                add_panel_visible: false,
                added: Vec::new(),
            }),
            Err(err) => {
                log::warn!("Token verification failed: {err}");
                if err.is_unauthorized() {
                    session.logout();
                }
                Err(Redirect {
                    route: Route::Login,
                    session,
                })
            }
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn is_add_panel_visible(&self) -> bool {
        self.add_panel_visible
    }

    pub fn open_add_panel(&mut self) {
        self.add_panel_visible = true;
    }

    pub fn close_add_panel(&mut self) {
        self.add_panel_visible = false;
    }

    /// Employees added during this session, oldest first.
    #[must_use]
    pub fn added_employees(&self) -> &[Employee] {
        &self.added
    }

    pub fn on_employee_added(&mut self, employee: Employee) {
        self.add_panel_visible = false;
        self.added.push(employee);
    }

    /// Submits `form` with this dashboard's session and records a success.
    ///
    /// A rejected token ends the session: it is cleared and the caller is
    /// sent to the login screen.
    pub async fn submit_form(
        &mut self,
        form: &mut EmployeeForm,
        api: &dyn EmployeeApi,
    ) -> Result<SubmitOutcome, Redirect> {
        let outcome = form.submit(api, &self.session).await;
        match &outcome {
            SubmitOutcome::Created(employee) => self.on_employee_added(employee.clone()),
            SubmitOutcome::Unauthorized(message) => {
                log::warn!("Session rejected while adding an employee: {message}");
                self.session.logout();
                return Err(Redirect {
                    route: Route::Login,
                    session: std::mem::take(&mut self.session),
                });
            }
            SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) | SubmitOutcome::Busy => {}
        }
        Ok(outcome)
    }

    /// The authoritative list from the service. Not called after adds.
    pub async fn fetch_directory(
        &self,
        api: &dyn EmployeeApi,
    ) -> Result<Vec<Employee>, ClientError> {
        api.list_employees(&self.session).await
    }

    pub fn logout(mut self) -> Redirect {
        self.session.logout();
        Redirect {
            route: Route::Login,
            session: self.session,
        }
    }
}

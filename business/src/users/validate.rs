//! Pre-flight checks. A payload that fails here is never sent.

use crate::directory::{CreateClientUserRequest, CreateUserRequest, UserPatch};
use crate::error::ValidationError;

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// `local@domain`, one `@`, both sides non-empty, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let invalid = || ValidationError::InvalidEmail(email.to_owned());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_create(request: &CreateUserRequest) -> Result<(), ValidationError> {
    required("email", &request.email)?;
    required("full_name", &request.full_name)?;
    validate_email(&request.email)
}

pub fn validate_patch(patch: &UserPatch) -> Result<(), ValidationError> {
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }
    if let Some(full_name) = &patch.full_name {
        required("full_name", full_name)?;
    }
    if let Some(email) = &patch.email {
        required("email", email)?;
        validate_email(email)?;
    }
    Ok(())
}

pub fn validate_client_create(request: &CreateClientUserRequest) -> Result<(), ValidationError> {
    if request.client_id == 0 {
        return Err(ValidationError::MissingField("client_id"));
    }
    required("email", &request.email)?;
    required("full_name", &request.full_name)?;
    required("password", &request.password)?;
    validate_email(&request.email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Role;

    #[test]
    fn accepts_plain_addresses() {
        assert_eq!(validate_email("ann@example.com"), Ok(()));
        assert_eq!(validate_email("  bo@x.io "), Ok(()));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["ann", "@x.io", "ann@", "a@b@c", "a b@c.d"] {
            assert!(validate_email(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn create_reports_first_missing_field() {
        let request = CreateUserRequest::new("", "", Role::Admin);
        assert_eq!(
            validate_create(&request),
            Err(ValidationError::MissingField("email"))
        );

        let request = CreateUserRequest::new("ann@x.io", "   ", Role::Admin);
        assert_eq!(
            validate_create(&request),
            Err(ValidationError::MissingField("full_name"))
        );
    }

    #[test]
    fn create_accepts_complete_payload() {
        let request = CreateUserRequest::new("ann@x.io", "Ann", Role::Recruiter);
        assert_eq!(validate_create(&request), Ok(()));
    }

    #[test]
    fn patch_must_change_something() {
        assert_eq!(
            validate_patch(&UserPatch::default()),
            Err(ValidationError::EmptyPatch)
        );
    }

    #[test]
    fn patch_checks_present_fields_only() {
        let patch = UserPatch {
            is_active: Some(false),
            ..UserPatch::default()
        };
        assert_eq!(validate_patch(&patch), Ok(()));

        let patch = UserPatch {
            email: Some("not-an-email".to_owned()),
            ..UserPatch::default()
        };
        assert_eq!(
            validate_patch(&patch),
            Err(ValidationError::InvalidEmail("not-an-email".to_owned()))
        );

        let patch = UserPatch {
            full_name: Some(String::new()),
            ..UserPatch::default()
        };
        assert_eq!(
            validate_patch(&patch),
            Err(ValidationError::MissingField("full_name"))
        );
    }

    #[test]
    fn client_create_requires_password_and_client() {
        let mut request = CreateClientUserRequest {
            client_id: 0,
            email: "c@client.io".to_owned(),
            full_name: "Cat".to_owned(),
            password: "hunter22".to_owned(),
            send_welcome_email: true,
        };
        assert_eq!(
            validate_client_create(&request),
            Err(ValidationError::MissingField("client_id"))
        );

        request.client_id = 7;
        request.password.clear();
        assert_eq!(
            validate_client_create(&request),
            Err(ValidationError::MissingField("password"))
        );

        request.password = "hunter22".to_owned();
        assert_eq!(validate_client_create(&request), Ok(()));
    }
}

// File: src/registration.rs
// Purpose: The user registration form schema

use std::fmt;

use regform_rules::EMAIL_REGEX;

use crate::config::RegformConfig;
use crate::error::SchemaError;
use crate::field::{FieldDescriptor, Transform};
use crate::rule::{CrossFieldRule, Rule};
use crate::schema::Schema;
use crate::value::FieldKind;

/// Literal messages shown by the registration form.
pub mod messages {
    pub const NAME_REQUIRED: &str = "Enter your name";
    pub const FIELD_REQUIRED: &str = "This field is required";
    pub const EMAIL_INVALID: &str = "Enter a valid email";
    pub const PASSWORD_UPPERCASE: &str = "Password must contain at least one uppercase Latin letter";
    pub const CONFIRM_REQUIRED: &str = "Please confirm your password";
    pub const PASSWORDS_MISMATCH: &str = "Passwords do not match";
    pub const BIRTHDAY_REQUIRED: &str = "Please select your date of birth";
    pub const BIRTHDAY_INVALID: &str = "Enter a valid date";
    pub const GENDER_REQUIRED: &str = "Please specify your gender";
    pub const GENDER_INVALID: &str = "Select one of the offered options";
    pub const PHONE_REQUIRED: &str = "Please enter your phone number";
    pub const PHONE_INCOMPLETE: &str = "Enter the full phone number";

    pub fn password_too_short(min: usize) -> String {
        format!("Password must be at least {} characters", min)
    }

    /// `+XXXXXXXXXXXX` for a fixed digit count, a range description otherwise.
    pub fn phone_format(min_digits: usize, max_digits: usize) -> String {
        if min_digits == max_digits {
            format!("Enter the number in the format +{}", "X".repeat(max_digits))
        } else {
            format!(
                "Enter the number as + followed by {} to {} digits",
                min_digits, max_digits
            )
        }
    }
}

/// The closed set of registration fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationField {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Birthday,
    Gender,
    Phone,
}

impl RegistrationField {
    pub const ALL: [RegistrationField; 7] = [
        RegistrationField::Name,
        RegistrationField::Email,
        RegistrationField::Password,
        RegistrationField::ConfirmPassword,
        RegistrationField::Birthday,
        RegistrationField::Gender,
        RegistrationField::Phone,
    ];

    /// Record key of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationField::Name => "name",
            RegistrationField::Email => "email",
            RegistrationField::Password => "password",
            RegistrationField::ConfirmPassword => "confirmPassword",
            RegistrationField::Birthday => "birthday",
            RegistrationField::Gender => "gender",
            RegistrationField::Phone => "phone",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegistrationField::Name => "Name",
            RegistrationField::Email => "Email",
            RegistrationField::Password => "Password",
            RegistrationField::ConfirmPassword => "Confirm password",
            RegistrationField::Birthday => "Date of birth",
            RegistrationField::Gender => "Gender",
            RegistrationField::Phone => "Phone",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            RegistrationField::Name | RegistrationField::Email => FieldKind::Text,
            RegistrationField::Password | RegistrationField::ConfirmPassword => FieldKind::Password,
            RegistrationField::Birthday => FieldKind::Date,
            RegistrationField::Gender => FieldKind::Choice,
            RegistrationField::Phone => FieldKind::Phone,
        }
    }

    fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor::new(self.as_str(), self.kind()).label(self.label())
    }
}

impl fmt::Display for RegistrationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the registration schema.
///
/// Fails only on bad configuration (e.g. inverted phone digit bounds).
pub fn registration_schema(config: &RegformConfig) -> Result<Schema, SchemaError> {
    use RegistrationField::*;

    let phone_shape = config.phone.shape()?;
    let phone_format = messages::phone_format(phone_shape.min_digits, phone_shape.max_digits);
    let too_short = messages::password_too_short(config.password.min_length);

    let mut password = Password
        .descriptor()
        .rule(Rule::required(messages::FIELD_REQUIRED))
        .rule(Rule::min_length(config.password.min_length, too_short.clone()));
    if config.password.require_uppercase {
        password = password.rule(Rule::pattern("[A-Z]", messages::PASSWORD_UPPERCASE)?);
    }

    Schema::builder()
        .field(
            Name.descriptor()
                .transform(Transform::trim(FieldKind::Text))
                .rule(Rule::required(messages::NAME_REQUIRED)),
        )
        .field(
            Email
                .descriptor()
                .transform(Transform::trim(FieldKind::Text))
                .rule(Rule::required(messages::FIELD_REQUIRED))
                .rule(Rule::regex((*EMAIL_REGEX).clone(), messages::EMAIL_INVALID)),
        )
        .field(password)
        .field(
            ConfirmPassword
                .descriptor()
                .rule(Rule::required(messages::CONFIRM_REQUIRED))
                .rule(Rule::min_length(config.password.min_length, too_short)),
        )
        .field(
            Birthday
                .descriptor()
                .transform(Transform::date(config.date.formats.clone(), messages::BIRTHDAY_INVALID))
                .rule(Rule::date_required(messages::BIRTHDAY_REQUIRED)),
        )
        .field(
            Gender
                .descriptor()
                .transform(Transform::trim(FieldKind::Choice))
                .rule(Rule::required(messages::GENDER_REQUIRED))
                .rule(Rule::one_of(config.gender.options.clone(), messages::GENDER_INVALID)),
        )
        .field(
            Phone
                .descriptor()
                .transform(Transform::phone_mask())
                .rule(Rule::required(messages::PHONE_REQUIRED))
                .rule(Rule::phone_format(phone_shape, messages::PHONE_INCOMPLETE, phone_format)),
        )
        .cross_field(CrossFieldRule::equals_field(
            ConfirmPassword.as_str(),
            Password.as_str(),
            messages::PASSWORDS_MISMATCH,
        ))
        .build()
}

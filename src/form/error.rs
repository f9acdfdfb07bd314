use std::fmt;

/// Why a value failed a format rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatIssue {
    Email,
    PhoneNumber,
    UserNameType,
    UserNameCharset,
    NumberShape,
    NumberRange,
    PriceShape,
    PriceRange,
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            FormatIssue::Email => "Email format is invalid.",
            FormatIssue::PhoneNumber => "Phone number format is invalid.",
            FormatIssue::UserNameType => "Invalid user name.",
            FormatIssue::UserNameCharset => {
                "User name can only contain \"a~z\", numbers and \"_\"."
            }
            FormatIssue::NumberShape => "Please enter a valid number.",
            FormatIssue::NumberRange => "Please enter a number between 0-999.",
            FormatIssue::PriceShape => {
                "Please enter a valid number with only digits or a decimal."
            }
            FormatIssue::PriceRange => "Please enter a number between 0-9999.",
        };
        f.write_str(message)
    }
}

/// A submission rejected by the reconciler. The display form is the
/// user-facing notice text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Field is required: \"{field}\"")]
    MissingRequiredField { field: String },
    #[error("Error for \"{field}\": {reason}")]
    FormatInvalid { field: String, reason: FormatIssue },
    #[error("Error for \"{field}\": needs to be shorter than {max} characters")]
    LengthExceeded { field: String, max: usize },
    #[error("Error for \"{field}\": please check the box.")]
    Unchecked { field: String },
    #[error("Title, Content, and Photo are required for {field}.")]
    IncompleteArticle { field: String },
    #[error(
        "Title{} and Images are required for {field}.",
        showcase_extras(.social_profile)
    )]
    IncompleteShowcase { field: String, social_profile: bool },
    #[error("Please make sure the {field} section has no more than {max} photos.")]
    TooManyPhotos { field: String, max: usize },
}

fn showcase_extras(social_profile: &bool) -> &'static str {
    if *social_profile {
        ", Handle, Profile URL, Profile Photo,"
    } else {
        ""
    }
}

impl SubmitError {
    /// Display name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            SubmitError::MissingRequiredField { field }
            | SubmitError::FormatInvalid { field, .. }
            | SubmitError::LengthExceeded { field, .. }
            | SubmitError::Unchecked { field }
            | SubmitError::IncompleteArticle { field }
            | SubmitError::IncompleteShowcase { field, .. }
            | SubmitError::TooManyPhotos { field, .. } => field,
        }
    }
}

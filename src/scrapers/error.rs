use thiserror::Error;

/// Page structure did not match what the parser expects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("label cell '{label}' or its value cell not found")]
    MissingLabel { label: &'static str },

    #[error("listing item {item}: {what} not found")]
    MissingElement { item: usize, what: &'static str },
}

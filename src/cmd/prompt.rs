//! Interactive secret entry.

use std::io;

use crate::errors::{ShellError, ShellResult};

/// Source of secrets typed by the operator.
pub trait SecretPrompt {
    fn read_secret(&self, label: &str) -> io::Result<String>;
}

/// Reads from the controlling terminal without echo.
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn read_secret(&self, label: &str) -> io::Result<String> {
        rpassword::prompt_password(label)
    }
}

/// Ask for a new password twice; the two entries must match.
pub fn confirm_new_password(prompt: &dyn SecretPrompt) -> ShellResult<String> {
    let first = prompt
        .read_secret("New Password: ")
        .map_err(|e| ShellError::Other(e.into()))?;
    let second = prompt
        .read_secret("Repeat New Password: ")
        .map_err(|e| ShellError::Other(e.into()))?;
    if first != second {
        return Err(ShellError::ConfirmationMismatch);
    }
    Ok(first)
}


#[cfg(test)]
mod tests {
    use super::scripted::ScriptedPrompt;
    use super::*;

    #[test]
    fn matching_entries_return_password() {
        let p = ScriptedPrompt::new(&["s3cret", "s3cret"]);
        assert_eq!(confirm_new_password(&p).unwrap(), "s3cret");
        assert_eq!(p.asked.borrow().len(), 2);
    }

    #[test]
    fn mismatch_is_classified() {
        let p = ScriptedPrompt::new(&["one", "two"]);
        let err = confirm_new_password(&p).unwrap_err();
        assert!(matches!(err, ShellError::ConfirmationMismatch));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn closed_input_is_an_error() {
        let p = ScriptedPrompt::new(&["only-one"]);
        assert!(matches!(
            confirm_new_password(&p).unwrap_err(),
            ShellError::Other(_)
        ));
    }
}

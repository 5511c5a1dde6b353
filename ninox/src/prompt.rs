//! Terminal [`Prompter`] built on `dialoguer`.

use dialoguer::{Confirm, Editor};

use ninox_core::contract::{CollaboratorError, Prompter};

pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn notify(&self, message: &str) {
        println!("{message}");
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CollaboratorError> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn edit(&self, text: &str) -> Result<Option<String>, CollaboratorError> {
        Ok(Editor::new().edit(text)?)
    }
}

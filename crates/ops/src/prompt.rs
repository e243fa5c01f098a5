use dialoguer::{Confirm, Input};

/// Yes/no gate for a destructive command. `assume_yes` skips the prompt.
pub fn confirm(assume_yes: bool, prompt: &str) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Stronger gate: the operator has to type `phrase` exactly.
pub fn confirm_phrase(assume_yes: bool, prompt: &str, phrase: &str) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let answer: String = Input::new()
        .with_prompt(format!("{prompt} Type \"{phrase}\" to confirm"))
        .allow_empty(true)
        .interact_text()?;
    Ok(answer.trim() == phrase)
}

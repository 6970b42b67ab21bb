mod prompt;

pub use prompt::prompt_confirm;

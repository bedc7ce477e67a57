//! Command shell interface.
//!
//! The unit's command interpreter executes arbitrary textual commands and
//! returns text output. Failures are reported in-band as output text (for
//! example "Unrecognised command"), never as a fault; there are no retries.

use std::collections::BTreeMap;

/// Executes one textual device command synchronously.
pub trait ShellExecutor: Send + Sync {
    fn execute(&self, command: &str) -> String;
}

/// Canned-output shell for tests and bench setups: a command → output table
/// with the interpreter's standard fallback for unknown commands.
#[derive(Default)]
pub struct ScriptedShell {
    outputs: BTreeMap<String, String>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, command: &str, output: &str) -> Self {
        self.outputs.insert(command.to_string(), output.to_string());
        self
    }
}

impl ShellExecutor for ScriptedShell {
    fn execute(&self, command: &str) -> String {
        match self.outputs.get(command) {
            Some(output) => output.clone(),
            None => format!("Unrecognised command: {}\n", command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_outputs_and_fallback() {
        let shell = ScriptedShell::new().with_output("stat", "Not charging\nSOC: 73%\n");
        assert_eq!(shell.execute("stat"), "Not charging\nSOC: 73%\n");
        assert!(shell.execute("bogus").starts_with("Unrecognised command"));
    }
}

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::models::{CoreError, CoreErrorKind, CoreResult, RunCommand};

pub const SHELL_PROGRAM: &str = "sh";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            working_dir: None,
        }
    }

    pub fn shell(line: impl Into<String>) -> Self {
        Self::new(SHELL_PROGRAM).arg("-c").arg(line)
    }

    pub fn from_run_command(command: &RunCommand) -> CoreResult<Self> {
        match command {
            RunCommand::Shell(line) if !line.trim().is_empty() => Ok(Self::shell(line.clone())),
            RunCommand::Argv(argv) if !argv.is_empty() => {
                Ok(Self::new(argv[0].as_str()).args(argv[1..].iter().cloned()))
            }
            _ => Err(CoreError::new(
                CoreErrorKind::InvalidInput,
                "run command must not be empty",
            )),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<'a>(mut self, vars: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.program.as_os_str().is_empty() {
            return Err(invalid_input("command program path must not be empty"));
        }

        if self.args.iter().any(|arg| arg.contains('\0')) {
            return Err(invalid_input("command args must not contain NUL bytes"));
        }

        if self
            .env
            .iter()
            .any(|(key, value)| key.is_empty() || key.contains('\0') || value.contains('\0'))
        {
            return Err(invalid_input(
                "environment keys must be non-empty and keys and values must not contain NUL bytes",
            ));
        }

        Ok(())
    }

    /// Shell-style rendering for display; not meant to be fed back to a shell.
    pub fn display(&self) -> String {
        let mut argv = vec![self.program.to_string_lossy().into_owned()];
        argv.extend(self.args.iter().cloned());
        RunCommand::Argv(argv).display()
    }
}

fn invalid_input(message: &str) -> CoreError {
    CoreError::new(CoreErrorKind::InvalidInput, message)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::CommandSpec;
    use crate::models::{CoreErrorKind, RunCommand};

    #[test]
    fn argv_run_command_splits_program_and_args() {
        let command = CommandSpec::from_run_command(&RunCommand::Argv(vec![
            "streamlit".to_string(),
            "run".to_string(),
            "main.py".to_string(),
        ]))
        .unwrap();

        assert_eq!(command.program, PathBuf::from("streamlit"));
        assert_eq!(command.args, vec!["run", "main.py"]);
        assert!(command.validate().is_ok());
    }

    #[test]
    fn shell_run_command_goes_through_sh() {
        let command =
            CommandSpec::from_run_command(&RunCommand::Shell("python main.py".to_string()))
                .unwrap();

        assert_eq!(command.program, PathBuf::from("sh"));
        assert_eq!(command.args, vec!["-c", "python main.py"]);
        assert_eq!(command.display(), "sh -c 'python main.py'");
    }

    #[test]
    fn empty_run_command_is_rejected() {
        let error = CommandSpec::from_run_command(&RunCommand::Argv(Vec::new())).unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    }

    #[test]
    fn validate_rejects_nul_and_empty_env_keys() {
        let with_nul = CommandSpec::new("echo").arg("a\0b");
        assert_eq!(
            with_nul.validate().unwrap_err().kind,
            CoreErrorKind::InvalidInput
        );

        let empty_key = CommandSpec::new("echo").env("", "value");
        assert!(empty_key.validate().is_err());

        let empty_program = CommandSpec::new("");
        assert!(empty_program.validate().is_err());
    }
}

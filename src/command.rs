//! The command registry: name-to-handler bindings.
//!
//! Commands are process-global, not scoped to call frames. Lookup is a
//! linear first-match scan; registering an existing name replaces its
//! handler in place rather than appending a shadow entry, so there is
//! never more than one command with a given name to disambiguate.

use crate::error::InterpError;
use crate::interp::{Code, Interp};

/// A native command implementation.
pub type BuiltinFn = fn(&mut Interp, &[String]) -> Result<Code, InterpError>;

/// What a registered name actually invokes.
#[derive(Clone)]
pub enum Handler {
    Builtin(BuiltinFn),
    Proc { arglist: String, body: String },
}

pub struct Command {
    pub name: String,
    pub handler: Handler,
}

/// The full set of registered commands for one interpreter instance.
#[derive(Default)]
pub struct Registry {
    commands: Vec<Command>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            commands: Vec::new(),
        }
    }

    /// Registers `name`, replacing any prior handler under that name.
    pub fn register(&mut self, name: &str, handler: Handler) {
        match self.commands.iter_mut().find(|c| c.name == name) {
            Some(cmd) => cmd.handler = handler,
            None => self.commands.push(Command {
                name: name.to_string(),
                handler,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<Handler> {
        self.commands
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.handler.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Interp, _: &[String]) -> Result<Code, InterpError> {
        Ok(Code::Ok)
    }

    #[test]
    fn register_then_get_round_trips() {
        let mut reg = Registry::new();
        reg.register("noop", Handler::Builtin(noop));
        assert!(matches!(reg.get("noop"), Some(Handler::Builtin(_))));
    }

    #[test]
    fn re_registering_replaces_in_place() {
        let mut reg = Registry::new();
        reg.register("p", Handler::Proc { arglist: "a".into(), body: "b".into() });
        reg.register("p", Handler::Builtin(noop));
        assert!(matches!(reg.get("p"), Some(Handler::Builtin(_))));
    }

    #[test]
    fn unknown_command_is_none() {
        let reg = Registry::new();
        assert!(reg.get("nope").is_none());
    }
}

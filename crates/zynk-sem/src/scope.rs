//! The runtime environment: a stack of lexical blocks.
//!
//! Blocks are pushed when execution enters the program, a function body or
//! a control-flow body, and popped on exit. Popping a block drops its
//! bindings; nothing else owns them. Function declarations are shared
//! through `Rc` so a call can traverse the body while the stack keeps the
//! declaring block alive below it.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use zynk_par::ast::{FunctionDecl, ValueType};
use zynk_util::{Result, ZynkError};

/// A variable binding: the declared type plus the current value text.
///
/// `None` is the value of a variable that was declared without an
/// initializer; it reads back as the text `null`.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    /// The type the variable was declared with.
    pub declared: ValueType,
    /// The current value in its rendered textual form.
    pub value: Option<String>,
}

impl Binding {
    /// The rendered text of the current value (`null` when unset).
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("null")
    }
}

/// One lexical scope: independent variable and function tables.
#[derive(Debug, Default)]
pub struct Block {
    variables: FxHashMap<String, Binding>,
    functions: FxHashMap<String, Rc<FunctionDecl>>,
}

/// The block stack plus the call-depth counter.
#[derive(Debug, Default)]
pub struct Environment {
    blocks: Vec<Block>,
    call_depth: usize,
}

impl Environment {
    /// Nested function calls beyond this depth raise a `RecursionError`.
    pub const MAX_DEPTH: usize = 1000;

    /// Creates an environment with no blocks. Callers push the first block
    /// when execution starts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a fresh block. `increase_depth` is set when entering a
    /// function body, never for control-flow bodies.
    pub fn enter_block(&mut self, increase_depth: bool) {
        if increase_depth {
            self.call_depth += 1;
        }
        self.blocks.push(Block::default());
    }

    /// Pops the current block, dropping its bindings. No-op when empty.
    pub fn exit_block(&mut self, decrease_depth: bool) {
        if self.blocks.is_empty() {
            return;
        }
        if decrease_depth {
            self.call_depth -= 1;
        }
        self.blocks.pop();
    }

    /// True once the call depth has reached the ceiling.
    pub fn recursion_exceeded(&self) -> bool {
        self.call_depth >= Self::MAX_DEPTH
    }

    /// The number of nested function bodies currently on the stack.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Declares a variable in the current block.
    ///
    /// Only the current block is checked for duplicates: shadowing an outer
    /// variable is allowed, redeclaring in the same block is not.
    pub fn declare_variable(
        &mut self,
        name: &str,
        binding: Binding,
        line: u32,
    ) -> Result<()> {
        if self.is_variable_declared(name, false) {
            return Err(ZynkError::duplicate_declaration(
                format!("Variable '{name}' is already declared."),
                line,
            ));
        }
        let Some(block) = self.blocks.last_mut() else {
            panic!("declare_variable called with no active block");
        };
        block.variables.insert(name.to_owned(), binding);
        Ok(())
    }

    /// Resolves a variable, walking from the innermost block outward.
    pub fn get_variable(&self, name: &str, line: u32) -> Result<&Binding> {
        self.blocks
            .iter()
            .rev()
            .find_map(|block| block.variables.get(name))
            .ok_or_else(|| {
                ZynkError::not_defined(format!("Variable named '{name}' is not defined."), line)
            })
    }

    /// Mutable variant of [`Environment::get_variable`], used by assignment.
    pub fn get_variable_mut(&mut self, name: &str, line: u32) -> Result<&mut Binding> {
        self.blocks
            .iter_mut()
            .rev()
            .find_map(|block| block.variables.get_mut(name))
            .ok_or_else(|| {
                ZynkError::not_defined(format!("Variable named '{name}' is not defined."), line)
            })
    }

    /// True if `name` resolves to a variable; `deep` controls whether outer
    /// blocks are searched.
    pub fn is_variable_declared(&self, name: &str, deep: bool) -> bool {
        match self.blocks.last() {
            Some(block) if block.variables.contains_key(name) => true,
            Some(_) if deep => self
                .blocks
                .iter()
                .rev()
                .skip(1)
                .any(|block| block.variables.contains_key(name)),
            _ => false,
        }
    }

    /// Declares a function in the current block.
    ///
    /// Unlike variables, the duplicate check is deep: a function name may
    /// not be reused anywhere in the reachable scope chain.
    pub fn declare_function(&mut self, func: Rc<FunctionDecl>) -> Result<()> {
        if self.is_function_declared(&func.name) {
            return Err(ZynkError::duplicate_declaration(
                format!("Function '{}' is already declared.", func.name),
                func.line,
            ));
        }
        let Some(block) = self.blocks.last_mut() else {
            panic!("declare_function called with no active block");
        };
        block.functions.insert(func.name.clone(), func);
        Ok(())
    }

    /// Resolves a function, walking from the innermost block outward.
    pub fn get_function(&self, name: &str, line: u32) -> Result<Rc<FunctionDecl>> {
        self.blocks
            .iter()
            .rev()
            .find_map(|block| block.functions.get(name))
            .cloned()
            .ok_or_else(|| {
                ZynkError::not_defined(format!("Function named '{name}' is not defined."), line)
            })
    }

    /// True if `name` resolves to a function anywhere in the scope chain.
    pub fn is_function_declared(&self, name: &str) -> bool {
        self.blocks
            .iter()
            .rev()
            .any(|block| block.functions.contains_key(name))
    }

    /// Number of variables bound in the current block.
    pub fn current_variable_count(&self) -> usize {
        self.blocks.last().map(|b| b.variables.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_binding(value: &str) -> Binding {
        Binding {
            declared: ValueType::Integer,
            value: Some(value.to_owned()),
        }
    }

    fn function(name: &str) -> Rc<FunctionDecl> {
        Rc::new(FunctionDecl {
            name: name.to_owned(),
            params: Vec::new(),
            return_type: ValueType::None,
            body: Vec::new(),
            line: 1,
        })
    }

    #[test]
    fn test_declare_and_get_variable() {
        let mut env = Environment::new();
        env.enter_block(false);
        env.declare_variable("x", int_binding("42"), 1).unwrap();

        let binding = env.get_variable("x", 1).unwrap();
        assert_eq!(binding.declared, ValueType::Integer);
        assert_eq!(binding.text(), "42");
    }

    #[test]
    fn test_duplicate_variable_in_same_block() {
        let mut env = Environment::new();
        env.enter_block(false);
        env.declare_variable("x", int_binding("1"), 1).unwrap();
        let err = env.declare_variable("x", int_binding("2"), 2).unwrap_err();
        assert_eq!(err.to_string(), "Error[DuplicateDeclarationError]: At line: 2. Variable 'x' is already declared.");
    }

    #[test]
    fn test_shadowing_and_unshadowing() {
        let mut env = Environment::new();
        env.enter_block(false);
        env.declare_variable("x", int_binding("1"), 1).unwrap();

        env.enter_block(false);
        env.declare_variable("x", int_binding("2"), 2).unwrap();
        assert_eq!(env.get_variable("x", 2).unwrap().text(), "2");

        env.exit_block(false);
        assert_eq!(env.get_variable("x", 3).unwrap().text(), "1");
    }

    #[test]
    fn test_deep_lookup_and_mutation() {
        let mut env = Environment::new();
        env.enter_block(false);
        env.declare_variable("x", int_binding("1"), 1).unwrap();
        env.enter_block(false);

        let binding = env.get_variable_mut("x", 2).unwrap();
        binding.value = Some("99".to_owned());
        env.exit_block(false);

        assert_eq!(env.get_variable("x", 3).unwrap().text(), "99");
    }

    #[test]
    fn test_variable_not_defined() {
        let mut env = Environment::new();
        env.enter_block(false);
        let err = env.get_variable("ghost", 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error[NotDefinedError]: At line: 4. Variable named 'ghost' is not defined."
        );
    }

    #[test]
    fn test_block_exit_drops_bindings() {
        let mut env = Environment::new();
        env.enter_block(false);
        env.enter_block(false);
        env.declare_variable("temp", int_binding("5"), 1).unwrap();
        env.exit_block(false);
        assert!(env.get_variable("temp", 2).is_err());
    }

    #[test]
    fn test_function_declaration_and_lookup() {
        let mut env = Environment::new();
        env.enter_block(false);
        env.declare_function(function("main")).unwrap();

        let func = env.get_function("main", 1).unwrap();
        assert_eq!(func.name, "main");
        assert!(env.get_function("missing", 1).is_err());
    }

    #[test]
    fn test_function_duplicate_check_is_deep() {
        let mut env = Environment::new();
        env.enter_block(false);
        env.declare_function(function("main")).unwrap();
        env.enter_block(false);

        // Variables may shadow; functions may not.
        let err = env.declare_function(function("main")).unwrap_err();
        assert_eq!(err.kind, zynk_util::ErrorKind::DuplicateDeclaration);
    }

    #[test]
    fn test_recursion_depth_accounting() {
        let mut env = Environment::new();
        env.enter_block(false);
        assert_eq!(env.call_depth(), 0);

        env.enter_block(true);
        env.enter_block(false); // control-flow block, depth unchanged
        assert_eq!(env.call_depth(), 1);

        env.exit_block(false);
        env.exit_block(true);
        assert_eq!(env.call_depth(), 0);
        assert!(!env.recursion_exceeded());
    }

    #[test]
    fn test_recursion_ceiling() {
        let mut env = Environment::new();
        env.enter_block(false);
        for _ in 0..Environment::MAX_DEPTH {
            env.enter_block(true);
        }
        assert!(env.recursion_exceeded());
    }

    #[test]
    fn test_exit_on_empty_stack_is_noop() {
        let mut env = Environment::new();
        env.exit_block(false);
        assert_eq!(env.current_variable_count(), 0);
    }

    #[test]
    fn test_uninitialized_binding_reads_null() {
        let binding = Binding {
            declared: ValueType::Integer,
            value: None,
        };
        assert_eq!(binding.text(), "null");
    }
}

//! Built-in spreadsheet functions

pub mod aggregate;
pub mod criteria;
pub mod lookup;
pub mod math;
pub mod statistical;

use crate::error::{FormulaError, FormulaResult};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use tally_sheets_core::Value;

/// Function implementation signature
pub type FunctionImpl = fn(&[Value]) -> FormulaResult<Value>;

/// Function definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    fn arity(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..={}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}

static GLOBAL: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::new);

/// Function registry
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_statistical_functions();
        registry.register_lookup_functions();

        registry
    }

    /// Shared registry of the built-in functions
    pub fn global() -> &'static FunctionRegistry {
        &GLOBAL
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function, replacing any previous definition with the same name
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    /// Call a function by name after checking its argument count
    pub fn call(&self, name: &str, args: &[Value]) -> FormulaResult<Value> {
        let def = self
            .get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

        let too_many = def.max_args.map_or(false, |max| args.len() > max);
        if args.len() < def.min_args || too_many {
            return Err(FormulaError::ArgumentCount {
                function: def.name.to_string(),
                expected: def.arity(),
                actual: args.len(),
            });
        }

        tracing::trace!(function = def.name, args = args.len(), "calling function");
        (def.implementation)(args)
    }

    fn register_math_functions(&mut self) {
        // SUMIF
        self.register(FunctionDef {
            name: "SUMIF",
            min_args: 2,
            max_args: Some(3),
            implementation: math::fn_sumif,
        });

        // SUMIFS
        self.register(FunctionDef {
            name: "SUMIFS",
            min_args: 3,
            max_args: None,
            implementation: math::fn_sumifs,
        });
    }

    fn register_statistical_functions(&mut self) {
        // COUNTIF
        self.register(FunctionDef {
            name: "COUNTIF",
            min_args: 2,
            max_args: Some(2),
            implementation: statistical::fn_countif,
        });

        // COUNTIFS
        self.register(FunctionDef {
            name: "COUNTIFS",
            min_args: 2,
            max_args: None,
            implementation: statistical::fn_countifs,
        });

        // AVERAGEIF
        self.register(FunctionDef {
            name: "AVERAGEIF",
            min_args: 2,
            max_args: Some(3),
            implementation: statistical::fn_averageif,
        });

        // AVERAGEIFS
        self.register(FunctionDef {
            name: "AVERAGEIFS",
            min_args: 3,
            max_args: None,
            implementation: statistical::fn_averageifs,
        });
    }

    fn register_lookup_functions(&mut self) {
        // MATCH
        self.register(FunctionDef {
            name: "MATCH",
            min_args: 2,
            max_args: Some(3),
            implementation: lookup::fn_match,
        });

        // VLOOKUP
        self.register(FunctionDef {
            name: "VLOOKUP",
            min_args: 3,
            max_args: Some(4),
            implementation: lookup::fn_vlookup,
        });

        // HLOOKUP
        self.register(FunctionDef {
            name: "HLOOKUP",
            min_args: 3,
            max_args: Some(4),
            implementation: lookup::fn_hlookup,
        });
    }
}

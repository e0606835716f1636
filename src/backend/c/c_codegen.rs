//! C Code Generator
//!
//! Implements [`Backend`] by building C99 source text. Arrays are wrapped in
//! single-member structs so they can be passed, returned and assigned by
//! value.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::backend::codegen::Backend;
use crate::hir::{ArithmeticOrLogicalOp, ComparisonOp, LazyBooleanOp};
use crate::utils::{Error, Result};

/// A C type
#[derive(Debug, Clone, PartialEq)]
pub enum CType {
    Void,
    /// Scalar, struct or array wrapper, spelled as-is
    Named(String),
    Function {
        params: Vec<(String, CType)>,
        ret: Box<CType>,
    },
}

impl CType {
    fn spelling(&self) -> &str {
        match self {
            CType::Void => "void",
            CType::Named(name) => name.as_str(),
            CType::Function { ret, .. } => ret.spelling(),
        }
    }

    /// `T name`
    fn declare(&self, name: &str) -> String {
        format!("{} {}", self.spelling(), name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarId(usize);

#[derive(Debug, Clone)]
pub enum CStmt {
    Line(String),
    Block(BlockId),
    If {
        condition: String,
        then_block: BlockId,
        else_block: Option<BlockId>,
    },
}

#[derive(Debug)]
struct CFunction {
    name: String,
    ret: CType,
    params: Vec<VarId>,
    body: Option<BlockId>,
    /// Local names already taken, for shadowed bindings
    used_names: HashSet<String>,
}

#[derive(Debug)]
struct CVariable {
    name: String,
    ty: CType,
    /// Initializer and mutability of globals
    global: Option<(String, bool)>,
}

/// C code generator
pub struct CBackend {
    target_triple: String,
    output: String,
    indent: usize,
    /// Struct and array wrapper definitions in creation order, which places
    /// every type after its components
    type_definitions: Vec<String>,
    struct_names: HashSet<String>,
    array_types: HashMap<(String, String), CType>,
    constants: HashMap<String, (CType, String)>,
    functions: Vec<CFunction>,
    variables: Vec<CVariable>,
    blocks: Vec<Vec<CStmt>>,
}

impl CBackend {
    pub fn new(target: &str) -> Self {
        Self {
            target_triple: target.to_string(),
            output: String::new(),
            indent: 0,
            type_definitions: Vec::new(),
            struct_names: HashSet::new(),
            array_types: HashMap::new(),
            constants: HashMap::new(),
            functions: Vec::new(),
            variables: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Write indented line
    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn unique_local(&mut self, func: &FunctionId, name: &str) -> String {
        let used = &mut self.functions[func.0].used_names;
        let mut candidate = name.to_string();
        let mut n = 1;
        while used.contains(&candidate) {
            candidate = format!("{}_{}", name, n);
            n += 1;
        }
        used.insert(candidate.clone());
        candidate
    }

    fn prototype(&self, func: &CFunction) -> String {
        let params: Vec<String> = func
            .params
            .iter()
            .map(|p| {
                let var = &self.variables[p.0];
                var.ty.declare(&var.name)
            })
            .collect();
        let params_str = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        format!("{} {}({})", func.ret.spelling(), func.name, params_str)
    }

    fn write_block(&mut self, block: BlockId) {
        let stmts = self.blocks[block.0].clone();
        for stmt in stmts {
            match stmt {
                CStmt::Line(line) => self.writeln(&line),
                CStmt::Block(inner) => {
                    self.writeln("{");
                    self.write_nested(inner);
                    self.writeln("}");
                }
                CStmt::If {
                    condition,
                    then_block,
                    else_block,
                } => {
                    self.writeln(&format!("if ({}) {{", condition));
                    self.write_nested(then_block);
                    if let Some(else_block) = else_block {
                        self.writeln("} else {");
                        self.write_nested(else_block);
                    }
                    self.writeln("}");
                }
            }
        }
    }

    fn write_nested(&mut self, block: BlockId) {
        self.indent += 1;
        self.write_block(block);
        self.indent -= 1;
    }

    /// Get the generated C source
    pub fn source(&self) -> &str {
        &self.output
    }

    /// Compile the generated source to an object file using clang/gcc
    pub fn compile_to_object(&self, obj_file: &Path) -> Result<()> {
        let c_file = std::env::temp_dir().join("tyir_temp.c");
        fs::write(&c_file, &self.output).map_err(|e| Error::Io(e.to_string()))?;

        // Try clang first, then gcc
        let compilers = ["clang", "gcc", "cc"];
        let mut last_error = String::new();

        for compiler in &compilers {
            let result = Command::new(compiler)
                .args(["-std=c99", "-c", "-o"])
                .arg(obj_file)
                .arg(&c_file)
                .output();

            match result {
                Ok(output) if output.status.success() => {
                    log::info!("compiled {} with {}", obj_file.display(), compiler);
                    let _ = fs::remove_file(&c_file);
                    return Ok(());
                }
                Ok(output) => {
                    last_error = String::from_utf8_lossy(&output.stderr).to_string();
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }
        }

        let _ = fs::remove_file(&c_file);
        Err(Error::CodeGen(format!("Failed to compile C code: {}", last_error)))
    }
}

impl Backend for CBackend {
    type Type = CType;
    type Expression = String;
    type Statement = CStmt;
    type Block = BlockId;
    type Function = FunctionId;
    type Variable = VarId;

    fn name(&self) -> &str {
        "C"
    }

    fn bool_type(&mut self) -> CType {
        CType::Named("bool".to_string())
    }

    fn integer_type(&mut self, is_unsigned: bool, bits: u32) -> CType {
        let name = match (is_unsigned, bits) {
            (false, 128) => "__int128".to_string(),
            (true, 128) => "unsigned __int128".to_string(),
            (false, bits) => format!("int{}_t", bits),
            (true, bits) => format!("uint{}_t", bits),
        };
        CType::Named(name)
    }

    fn float_type(&mut self, bits: u32) -> CType {
        match bits {
            32 => CType::Named("float".to_string()),
            _ => CType::Named("double".to_string()),
        }
    }

    fn array_type(&mut self, element: &CType, length: &String) -> CType {
        let key = (element.spelling().to_string(), length.clone());
        if let Some(ty) = self.array_types.get(&key) {
            return ty.clone();
        }

        let name = format!("__array_{}", self.array_types.len());
        self.type_definitions.push(format!(
            "typedef struct {{ {}; }} {};",
            element.declare(&format!("v[{}]", length)),
            name
        ));
        let ty = CType::Named(name);
        self.array_types.insert(key, ty.clone());
        ty
    }

    fn struct_type(&mut self, name: &str, fields: &[(String, CType)]) -> CType {
        let mut def = format!("struct {} {{\n", name);
        for (field, ty) in fields {
            def.push_str(&format!("    {};\n", ty.declare(field)));
        }
        def.push_str("};");
        self.type_definitions.push(def);
        self.struct_names.insert(name.to_string());
        CType::Named(name.to_string())
    }

    fn function_type(&mut self, params: &[(String, CType)], ret: Option<&CType>) -> CType {
        CType::Function {
            params: params.to_vec(),
            ret: Box::new(ret.cloned().unwrap_or(CType::Void)),
        }
    }

    fn integer_constant_expression(&mut self, ty: &CType, value: i128) -> String {
        match ty.spelling() {
            "int32_t" => value.to_string(),
            spelling => format!("(({}){})", spelling, value),
        }
    }

    fn float_constant_expression(&mut self, ty: &CType, value: f64) -> String {
        match ty.spelling() {
            "float" => format!("{:?}f", value as f32),
            _ => format!("{:?}", value),
        }
    }

    fn boolean_constant_expression(&mut self, value: bool) -> String {
        value.to_string()
    }

    fn unit_expression(&mut self) -> String {
        "((void)0)".to_string()
    }

    fn named_constant_expression(&mut self, ty: &CType, name: &str, value: String) -> String {
        self.constants.insert(name.to_string(), (ty.clone(), value));
        name.to_string()
    }

    fn var_expression(&mut self, var: &VarId) -> String {
        self.variables[var.0].name.clone()
    }

    fn arithmetic_or_logical_expression(&mut self, op: ArithmeticOrLogicalOp, lhs: String, rhs: String) -> String {
        format!("({} {} {})", lhs, op, rhs)
    }

    fn comparison_expression(&mut self, op: ComparisonOp, lhs: String, rhs: String) -> String {
        format!("({} {} {})", lhs, op, rhs)
    }

    fn lazy_boolean_expression(&mut self, op: LazyBooleanOp, lhs: String, rhs: String) -> String {
        format!("({} {} {})", lhs, op, rhs)
    }

    fn call_expression(&mut self, func: &FunctionId, args: Vec<String>) -> String {
        format!("{}({})", self.functions[func.0].name, args.join(", "))
    }

    fn array_index_expression(&mut self, array: String, index: String) -> String {
        format!("{}.v[{}]", array, index)
    }

    fn array_constructor_expression(&mut self, ty: &CType, values: Vec<String>) -> String {
        format!("({}){{ {{ {} }} }}", ty.spelling(), values.join(", "))
    }

    fn constructor_expression(&mut self, ty: &CType, fields: Vec<String>) -> String {
        format!("({}){{ {} }}", ty.spelling(), fields.join(", "))
    }

    fn function(&mut self, name: &str, fntype: &CType) -> Result<FunctionId> {
        let CType::Function { ret, .. } = fntype else {
            return Err(Error::internal(format!("{} is not a function type", fntype.spelling())));
        };
        let id = FunctionId(self.functions.len());
        self.functions.push(CFunction {
            name: name.to_string(),
            ret: (**ret).clone(),
            params: Vec::new(),
            body: None,
            used_names: HashSet::new(),
        });
        Ok(id)
    }

    fn parameter_variable(&mut self, func: &FunctionId, name: &str, ty: &CType) -> VarId {
        let name = self.unique_local(func, name);
        let id = VarId(self.variables.len());
        self.variables.push(CVariable {
            name,
            ty: ty.clone(),
            global: None,
        });
        self.functions[func.0].params.push(id);
        id
    }

    fn local_variable(&mut self, func: &FunctionId, name: &str, ty: &CType) -> VarId {
        let name = self.unique_local(func, name);
        let id = VarId(self.variables.len());
        self.variables.push(CVariable {
            name,
            ty: ty.clone(),
            global: None,
        });
        id
    }

    fn global_variable(&mut self, name: &str, ty: &CType, init: String, mutable: bool) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(CVariable {
            name: name.to_string(),
            ty: ty.clone(),
            global: Some((init, mutable)),
        });
        id
    }

    fn function_set_body(&mut self, func: &FunctionId, body: &BlockId) -> Result<()> {
        let func = self
            .functions
            .get_mut(func.0)
            .ok_or_else(|| Error::internal("unknown function handle"))?;
        func.body = Some(*body);
        Ok(())
    }

    fn block(&mut self, _func: &FunctionId, _enclosing: Option<&BlockId>) -> BlockId {
        self.blocks.push(Vec::new());
        BlockId(self.blocks.len() - 1)
    }

    fn block_add_statements(&mut self, block: &BlockId, stmts: Vec<CStmt>) {
        self.blocks[block.0].extend(stmts);
    }

    fn block_statement(&mut self, block: &BlockId) -> CStmt {
        CStmt::Block(*block)
    }

    fn expression_statement(&mut self, expr: String) -> CStmt {
        CStmt::Line(format!("{};", expr))
    }

    fn init_statement(&mut self, var: &VarId, init: Option<String>) -> CStmt {
        let var = &self.variables[var.0];
        let decl = var.ty.declare(&var.name);
        match init {
            Some(init) => CStmt::Line(format!("{} = {};", decl, init)),
            None => CStmt::Line(format!("{};", decl)),
        }
    }

    fn assignment_statement(&mut self, lhs: String, rhs: String) -> CStmt {
        CStmt::Line(format!("{} = {};", lhs, rhs))
    }

    fn return_statement(&mut self, _func: &FunctionId, value: Option<String>) -> CStmt {
        match value {
            Some(value) => CStmt::Line(format!("return {};", value)),
            None => CStmt::Line("return;".to_string()),
        }
    }

    fn if_statement(&mut self, condition: String, then_block: &BlockId, else_block: Option<&BlockId>) -> CStmt {
        CStmt::If {
            condition,
            then_block: *then_block,
            else_block: else_block.copied(),
        }
    }

    fn write_global_definitions(
        &mut self,
        types: &[CType],
        constants: &[String],
        functions: &[FunctionId],
        variables: &[VarId],
    ) -> Result<()> {
        self.output.clear();
        self.indent = 0;

        // Header
        let banner = format!("/* Generated by the tyir C backend for {} */", self.target_triple);
        self.writeln(&banner);
        self.writeln("#include <stdint.h>");
        self.writeln("#include <stdbool.h>");
        self.writeln("");

        for ty in types {
            if let CType::Named(name) = ty {
                if self.struct_names.contains(name) {
                    self.writeln(&format!("typedef struct {} {};", name, name));
                }
            }
        }
        for def in self.type_definitions.clone() {
            self.writeln(&def);
        }
        self.writeln("");

        for name in constants {
            let (ty, value) = self
                .constants
                .get(name)
                .cloned()
                .ok_or_else(|| Error::internal(format!("undeclared constant {}", name)))?;
            self.writeln(&format!("static const {} = {};", ty.declare(name), value));
        }
        for var in variables {
            let var = &self.variables[var.0];
            let Some((init, mutable)) = &var.global else {
                return Err(Error::internal(format!("{} is not a global", var.name)));
            };
            let qualifier = if *mutable { "static" } else { "static const" };
            let line = format!("{} {} = {};", qualifier, var.ty.declare(&var.name), init);
            self.writeln(&line);
        }
        self.writeln("");

        // Forward declarations
        for func in functions {
            let proto = self.prototype(&self.functions[func.0]);
            self.writeln(&format!("{};", proto));
        }
        self.writeln("");

        // Function definitions
        for func in functions {
            let Some(body) = self.functions[func.0].body else {
                continue;
            };
            let proto = self.prototype(&self.functions[func.0]);
            self.writeln(&format!("{} {{", proto));
            self.write_nested(body);
            self.writeln("}");
            self.writeln("");
        }

        log::info!(
            "emitted {} functions to C ({} bytes)",
            functions.len(),
            self.output.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_types() {
        let mut c = CBackend::new("x86_64-unknown-linux-gnu");
        assert_eq!(c.integer_type(false, 32), CType::Named("int32_t".into()));
        assert_eq!(c.integer_type(true, 8), CType::Named("uint8_t".into()));
        assert_eq!(c.integer_type(false, 128), CType::Named("__int128".into()));
        assert_eq!(c.float_type(64), CType::Named("double".into()));
    }

    #[test]
    fn test_array_types_are_shared() {
        let mut c = CBackend::new("x86_64-unknown-linux-gnu");
        let i32_ty = c.integer_type(false, 32);
        let len = c.integer_constant_expression(&i32_ty, 3);
        let a = c.array_type(&i32_ty, &len);
        let b = c.array_type(&i32_ty, &len);
        assert_eq!(a, b);
        assert_eq!(c.type_definitions, vec!["typedef struct { int32_t v[3]; } __array_0;"]);
    }

    #[test]
    fn test_function_definition() {
        let mut c = CBackend::new("x86_64-unknown-linux-gnu");
        let i32_ty = c.integer_type(false, 32);
        let params = vec![("a".to_string(), i32_ty.clone()), ("b".to_string(), i32_ty.clone())];
        let fntype = c.function_type(&params, Some(&i32_ty));
        let func = c.function("add", &fntype).unwrap();
        let a = c.parameter_variable(&func, "a", &i32_ty);
        let b = c.parameter_variable(&func, "b", &i32_ty);

        let body = c.block(&func, None);
        let lhs = c.var_expression(&a);
        let rhs = c.var_expression(&b);
        let sum = c.arithmetic_or_logical_expression(ArithmeticOrLogicalOp::Add, lhs, rhs);
        let ret = c.return_statement(&func, Some(sum));
        c.block_add_statements(&body, vec![ret]);
        c.function_set_body(&func, &body).unwrap();
        c.write_global_definitions(&[], &[], &[func], &[]).unwrap();

        let source = c.source();
        assert!(source.contains("int32_t add(int32_t a, int32_t b);"));
        assert!(source.contains("int32_t add(int32_t a, int32_t b) {\n    return (a + b);\n}"));
    }

    #[test]
    fn test_shadowed_locals_get_distinct_names() {
        let mut c = CBackend::new("x86_64-unknown-linux-gnu");
        let fntype = c.function_type(&[], None);
        let func = c.function("main", &fntype).unwrap();
        let ty = c.bool_type();
        let first = c.local_variable(&func, "x", &ty);
        let second = c.local_variable(&func, "x", &ty);
        assert_eq!(c.var_expression(&first), "x");
        assert_eq!(c.var_expression(&second), "x_1");
    }

    #[test]
    fn test_if_statement_layout() {
        let mut c = CBackend::new("x86_64-unknown-linux-gnu");
        let fntype = c.function_type(&[], None);
        let func = c.function("f", &fntype).unwrap();
        let body = c.block(&func, None);
        let then_block = c.block(&func, Some(&body));
        let else_block = c.block(&func, Some(&body));
        let ret = c.return_statement(&func, None);
        c.block_add_statements(&then_block, vec![ret]);
        let cond = c.boolean_constant_expression(true);
        let stmt = c.if_statement(cond, &then_block, Some(&else_block));
        c.block_add_statements(&body, vec![stmt]);
        c.function_set_body(&func, &body).unwrap();
        c.write_global_definitions(&[], &[], &[func], &[]).unwrap();

        assert!(c
            .source()
            .contains("void f(void) {\n    if (true) {\n        return;\n    } else {\n    }\n}"));
    }

    #[test]
    fn test_non_function_type_is_rejected() {
        let mut c = CBackend::new("x86_64-unknown-linux-gnu");
        let ty = c.bool_type();
        assert!(c.function("f", &ty).unwrap_err().is_internal());
    }
}

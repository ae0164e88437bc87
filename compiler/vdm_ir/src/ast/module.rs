//! Modules, classes and the module list.

use super::{Definition, Expr, Stmt};
use crate::visitor::{walk_expr, walk_stmt, Visitor};
use crate::{Location, Name};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Module,
    Class,
}

/// An ordered collection of definitions.
#[derive(Clone, Debug)]
pub struct Module {
    pub name: Name,
    pub kind: ModuleKind,
    /// Source files contributing to this module.
    pub files: Vec<Name>,
    pub definitions: Vec<Definition>,
    pub location: Location,
}

impl Module {
    pub fn new(name: Name, kind: ModuleKind, definitions: Vec<Definition>) -> Self {
        let files = definitions
            .iter()
            .map(|d| d.location.file)
            .filter(|f| *f != Name::EMPTY)
            .fold(Vec::new(), |mut acc, f| {
                if !acc.contains(&f) {
                    acc.push(f);
                }
                acc
            });
        Module {
            name,
            kind,
            files,
            definitions,
            location: Location::DUMMY,
        }
    }

    pub fn is_class(&self) -> bool {
        self.kind == ModuleKind::Class
    }

    pub fn find_definition(&self, name: Name) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }
}

/// The modules and classes of one specification, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ModuleList {
    pub modules: Vec<Module>,
}

impl ModuleList {
    pub fn new(modules: Vec<Module>) -> Self {
        ModuleList { modules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Module> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Distinct source files across all modules, in first-seen order.
    pub fn source_files(&self) -> Vec<Name> {
        let mut files = Vec::new();
        for file in self.modules.iter().flat_map(|m| m.files.iter()) {
            if !files.contains(file) {
                files.push(*file);
            }
        }
        files
    }

    pub fn find_module(&self, name: Name) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// First statement (in tree order) starting on `line` of `file`.
    pub fn find_statement(&self, file: Name, line: u32) -> Option<&Stmt> {
        let mut finder = LineFinder {
            file,
            line,
            stmt: None,
            expr: None,
        };
        for module in &self.modules {
            finder.visit_module(module);
            if finder.stmt.is_some() {
                break;
            }
        }
        finder.stmt
    }

    /// First expression (in tree order) starting on `line` of `file`.
    pub fn find_expression(&self, file: Name, line: u32) -> Option<&Expr> {
        let mut finder = LineFinder {
            file,
            line,
            stmt: None,
            expr: None,
        };
        for module in &self.modules {
            finder.visit_module(module);
            if finder.expr.is_some() {
                break;
            }
        }
        finder.expr
    }
}

impl<'a> IntoIterator for &'a ModuleList {
    type Item = &'a Module;
    type IntoIter = std::slice::Iter<'a, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

struct LineFinder<'ast> {
    file: Name,
    line: u32,
    stmt: Option<&'ast Stmt>,
    expr: Option<&'ast Expr>,
}

impl LineFinder<'_> {
    fn starts_here(&self, location: &Location) -> bool {
        location.file == self.file && location.start_line == self.line
    }
}

impl<'ast> Visitor<'ast> for LineFinder<'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if self.stmt.is_none() && self.starts_here(&stmt.location) {
            self.stmt = Some(stmt);
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if self.expr.is_none() && self.starts_here(&expr.location) {
            self.expr = Some(expr);
        }
        walk_expr(self, expr);
    }
}

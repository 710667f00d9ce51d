//! Two-level scoping for Jack variables.
//!
//! Class scope holds `static` and `field` bindings and lives for one class.
//! Subroutine scope holds arguments and locals and is flushed at the start of
//! every subroutine. Lookups try the subroutine scope first, so a local named
//! like a field shadows it.
//!
//! Every kind numbers its bindings from zero in declaration order; that
//! ordinal is the index into the kind's VM segment. Redefining a name in the
//! same scope replaces the binding and still consumes a fresh ordinal.

use std::{collections::HashMap, fmt};

use tracing::trace;

use crate::codegen::vm::Segment;

/// Declaration category of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
	Static,
	Field,
	Argument,
	Local,
}

impl Kind {
	/// The VM segment backing this kind of variable.
	pub fn segment(self) -> Segment {
		match self {
			Kind::Static => Segment::Static,
			Kind::Field => Segment::This,
			Kind::Argument => Segment::Argument,
			Kind::Local => Segment::Local,
		}
	}

	fn is_class_level(self) -> bool { matches!(self, Kind::Static | Kind::Field) }
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Kind::Static => "static",
			Kind::Field => "field",
			Kind::Argument => "argument",
			Kind::Local => "local",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
	pub declared_type: &'a str,
	pub kind:          Kind,
	pub index:         u32,
}

#[derive(Debug, Default)]
pub struct SymbolTable<'a> {
	class_scope:      HashMap<&'a str, Entry<'a>>,
	subroutine_scope: HashMap<&'a str, Entry<'a>>,
	statics:          u32,
	fields:           u32,
	arguments:        u32,
	locals:           u32,
}

impl<'a> SymbolTable<'a> {
	pub fn new() -> Self { Self::default() }

	/// Bind `name` in the scope owning `kind` and return its ordinal.
	pub fn define(&mut self, name: &'a str, declared_type: &'a str, kind: Kind) -> u32 {
		let counter = self.counter_mut(kind);
		let index = *counter;
		*counter += 1;

		let entry = Entry { declared_type, kind, index };
		let scope = if kind.is_class_level() { &mut self.class_scope } else { &mut self.subroutine_scope };
		scope.insert(name, entry);
		trace!(name, declared_type, %kind, index, "defined symbol");
		index
	}

	/// Forget arguments and locals; statics and fields stay.
	pub fn flush_subroutine_scope(&mut self) {
		self.subroutine_scope.clear();
		self.arguments = 0;
		self.locals = 0;
	}

	/// Number of ordinals handed out for `kind` in its current scope.
	pub fn var_count(&self, kind: Kind) -> u32 {
		match kind {
			Kind::Static => self.statics,
			Kind::Field => self.fields,
			Kind::Argument => self.arguments,
			Kind::Local => self.locals,
		}
	}

	pub fn lookup(&self, name: &str) -> Option<Entry<'a>> {
		self.subroutine_scope.get(name).or_else(|| self.class_scope.get(name)).copied()
	}

	pub fn kind_of(&self, name: &str) -> Option<Kind> { self.lookup(name).map(|entry| entry.kind) }

	pub fn type_of(&self, name: &str) -> Option<&'a str> { self.lookup(name).map(|entry| entry.declared_type) }

	pub fn index_of(&self, name: &str) -> Option<u32> { self.lookup(name).map(|entry| entry.index) }

	fn counter_mut(&mut self, kind: Kind) -> &mut u32 {
		match kind {
			Kind::Static => &mut self.statics,
			Kind::Field => &mut self.fields,
			Kind::Argument => &mut self.arguments,
			Kind::Local => &mut self.locals,
		}
	}
}
